use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use fusion_core::health::{database_ready, healthz};
use fusion_core::middleware::{REQUEST_ID_HEADER, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{change_password, login, logout, refresh, register, reset_password, verify_email},
    cart::{add_to_cart, get_cart, remove_from_cart},
    categories::{create_category, delete_category, list_categories},
    orders::{create_order, delete_order, get_order, list_orders, update_order_status},
    products::{
        add_favorite, create_product, create_review, delete_product, get_product, list_products,
        remove_favorite, remove_review, update_product,
    },
    users::{delete_me, get_me, get_user, list_favorites, update_me, upload_avatar},
};
use crate::infra::storage::UPLOADS_PREFIX;
use crate::state::AppState;

/// Headroom for multipart framing on top of the avatar size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_ready(&state.db).await
}

pub fn build_router(state: AppState) -> Router {
    let avatar_limit = state.max_avatar_bytes + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(&state.blobs.root);

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/change-password", post(change_password))
        .route("/auth/verify-email", post(verify_email))
        // Users
        .route(
            "/users/me",
            get(get_me).patch(update_me).delete(delete_me),
        )
        .route(
            "/users/me/avatar",
            put(upload_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
        .route("/users/me/favorites", get(list_favorites))
        .route("/users/{id}", get(get_user))
        // Products
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/products/{id}/reviews",
            post(create_review).delete(remove_review),
        )
        .route(
            "/products/{id}/favorites",
            post(add_favorite).delete(remove_favorite),
        )
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        // Cart
        .route(
            "/cart",
            get(get_cart).post(add_to_cart).delete(remove_from_cart),
        )
        // Orders
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order_status).delete(delete_order),
        )
        // Uploaded files
        .nest_service(UPLOADS_PREFIX, uploads)
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(request_id_layer())
}
