use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;

use crate::domain::repository::OrderRepository;
use crate::domain::types::Order;
use crate::error::ShopError;

/// Load an order and check that `user_id` owns it.
async fn owned_order<O: OrderRepository>(
    orders: &O,
    id: Uuid,
    user_id: Uuid,
) -> Result<Order, ShopError> {
    let order = orders
        .find_by_id(id)
        .await?
        .ok_or(ShopError::OrderNotFound)?;
    if order.user_id != user_id {
        return Err(ShopError::Forbidden);
    }
    Ok(order)
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

pub struct CreateOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CreateOrderUseCase<O> {
    /// Move the selected cart lines into the caller's staging order.
    pub async fn execute(&self, user_id: Uuid, product_ids: Vec<Uuid>) -> Result<Order, ShopError> {
        if product_ids.is_empty() {
            return Err(ShopError::InvalidField("product_ids"));
        }
        let mut product_ids = product_ids;
        product_ids.sort_unstable();
        product_ids.dedup();

        let order = self.orders.checkout(user_id, &product_ids).await?;
        tracing::info!(
            %user_id,
            order_id = %order.id,
            items = order.items.len(),
            "cart items moved to order"
        );
        Ok(order)
    }
}

// ── ListOrders / GetOrder ────────────────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Order>, ShopError> {
        self.orders.list_by_user(user_id).await
    }
}

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<Order, ShopError> {
        owned_order(&self.orders, id, user_id).await
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    /// Owner-only status overwrite.
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: &str,
    ) -> Result<Order, ShopError> {
        let status: OrderStatus = status
            .parse()
            .map_err(|_| ShopError::InvalidField("status"))?;
        let current = owned_order(&self.orders, id, user_id).await?;
        let order = self.orders.update_status(id, status).await?;
        tracing::info!(order_id = %id, from = %current.status, to = %status, "order status updated");
        Ok(order)
    }
}

// ── DeleteOrder ──────────────────────────────────────────────────────────────

pub struct DeleteOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> DeleteOrderUseCase<O> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), ShopError> {
        owned_order(&self.orders, id, user_id).await?;
        if !self.orders.delete(id).await? {
            return Err(ShopError::OrderNotFound);
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }
}
