use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Cart;
use crate::error::ShopError;
use crate::extract::JsonBody;
use crate::guard::CurrentUser;
use crate::state::AppState;
use crate::usecase::cart::{
    AddToCartInput, AddToCartUseCase, GetCartUseCase, RemoveFromCartUseCase,
};

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItemResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// ── GET /cart ────────────────────────────────────────────────────────────────

pub async fn get_cart(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>, ShopError> {
    let usecase = GetCartUseCase {
        carts: state.cart_repo(),
    };
    let cart = usecase.execute(current.id()).await?;
    Ok(Json(cart.into()))
}

// ── POST /cart ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
}

pub async fn add_to_cart(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ShopError> {
    let usecase = AddToCartUseCase {
        products: state.product_repo(),
        carts: state.cart_repo(),
    };
    let cart = usecase
        .execute(
            current.id(),
            AddToCartInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

// ── DELETE /cart ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: Uuid,
}

pub async fn remove_from_cart(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RemoveFromCartRequest>,
) -> Result<StatusCode, ShopError> {
    let usecase = RemoveFromCartUseCase {
        carts: state.cart_repo(),
    };
    usecase.execute(current.id(), body.product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
