use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;

use crate::domain::types::Order;
use crate::error::ShopError;
use crate::extract::{JsonBody, PathParam};
use crate::guard::CurrentUser;
use crate::state::AppState;
use crate::usecase::order::{
    CreateOrderUseCase, DeleteOrderUseCase, GetOrderUseCase, ListOrdersUseCase,
    UpdateOrderStatusUseCase,
};

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    #[serde(serialize_with = "fusion_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "fusion_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// ── GET /orders ──────────────────────────────────────────────────────────────

pub async fn list_orders(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, ShopError> {
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase.execute(current.id()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

// ── POST /orders ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub product_ids: Vec<Uuid>,
}

pub async fn create_order(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ShopError> {
    let usecase = CreateOrderUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(current.id(), body.product_ids).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

// ── GET /orders/{id} ─────────────────────────────────────────────────────────

pub async fn get_order(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<OrderResponse>, ShopError> {
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(id, current.id()).await?;
    Ok(Json(order.into()))
}

// ── PUT /orders/{id} ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ShopError> {
    let usecase = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(id, current.id(), &body.status).await?;
    Ok(Json(order.into()))
}

// ── DELETE /orders/{id} ──────────────────────────────────────────────────────

pub async fn delete_order(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    let usecase = DeleteOrderUseCase {
        orders: state.order_repo(),
    };
    usecase.execute(id, current.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
