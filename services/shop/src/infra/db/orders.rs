use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;
use fusion_shop_schema::{cart_items, order_items, orders};

use crate::domain::repository::OrderRepository;
use crate::domain::types::{Order, OrderItem};
use crate::error::ShopError;
use crate::infra::db::cart::lock_cart;
use crate::infra::db::from_tx;

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn checkout(&self, user_id: Uuid, product_ids: &[Uuid]) -> Result<Order, ShopError> {
        let product_ids = product_ids.to_vec();
        self.db
            .transaction::<_, Order, ShopError>(|txn| {
                Box::pin(async move {
                    let cart = lock_cart(txn, user_id)
                        .await?
                        .ok_or(ShopError::CartNotFound)?;
                    let now = Utc::now();

                    let staging = orders::Entity::find()
                        .filter(orders::Column::UserId.eq(user_id))
                        .filter(orders::Column::Status.eq(OrderStatus::Staging.as_i16()))
                        .order_by_asc(orders::Column::CreatedAt)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock staging order")?;
                    let order = match staging {
                        Some(order) => order,
                        None => orders::ActiveModel {
                            id: Set(Uuid::now_v7()),
                            user_id: Set(user_id),
                            status: Set(OrderStatus::Staging.as_i16()),
                            created_at: Set(now),
                            updated_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .context("create staging order")?,
                    };

                    let selected = cart_items::Entity::find()
                        .filter(cart_items::Column::CartId.eq(cart.id))
                        .filter(cart_items::Column::ProductId.is_in(product_ids))
                        .all(txn)
                        .await
                        .context("load selected cart items")?;

                    for item in selected {
                        move_item(txn, order.id, &item)
                            .await
                            .context("move cart item into order")?;
                    }

                    let order_id = order.id;
                    let mut touched = order.into_active_model();
                    touched.updated_at = Set(now);
                    touched.update(txn).await.context("touch order")?;

                    load_order(txn, order_id)
                        .await?
                        .ok_or(ShopError::OrderNotFound)
                })
            })
            .await
            .map_err(|e| from_tx(e, "checkout cart"))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ShopError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders by user")?;
        with_items(&self.db, models).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopError> {
        load_order(&self.db, id).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ShopError> {
        let result = orders::ActiveModel {
            id: Set(id),
            status: Set(status.as_i16()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        match result {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(ShopError::OrderNotFound),
            Err(e) => return Err(anyhow::Error::new(e).context("update order status").into()),
        }
        load_order(&self.db, id)
            .await?
            .ok_or(ShopError::OrderNotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError> {
        let result = orders::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete order")?;
        Ok(result.rows_affected > 0)
    }
}

/// Insert or merge the cart line into the order, then drop it from the cart.
async fn move_item<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    item: &cart_items::Model,
) -> Result<(), DbErr> {
    let existing = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .filter(order_items::Column::ProductId.eq(item.product_id))
        .one(db)
        .await?;
    match existing {
        Some(line) => {
            let quantity = line.quantity + item.quantity;
            let mut line = line.into_active_model();
            line.quantity = Set(quantity);
            line.update(db).await?;
        }
        None => {
            order_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
            }
            .insert(db)
            .await?;
        }
    }
    cart_items::Entity::delete_by_id(item.id).exec(db).await?;
    Ok(())
}

async fn load_order<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Order>, ShopError> {
    let Some(model) = orders::Entity::find_by_id(id)
        .one(db)
        .await
        .context("find order by id")?
    else {
        return Ok(None);
    };
    Ok(with_items(db, vec![model]).await?.pop())
}

async fn with_items<C: ConnectionTrait>(
    db: &C,
    models: Vec<orders::Model>,
) -> Result<Vec<Order>, ShopError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let rows = order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(ids))
        .all(db)
        .await
        .context("load order items")?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        by_order.entry(row.order_id).or_default().push(OrderItem {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
        });
    }

    models
        .into_iter()
        .map(|m| {
            let status = OrderStatus::from_i16(m.status)
                .with_context(|| format!("order {} has unknown status {}", m.id, m.status))?;
            Ok(Order {
                id: m.id,
                user_id: m.user_id,
                status,
                items: by_order.remove(&m.id).unwrap_or_default(),
                created_at: m.created_at,
                updated_at: m.updated_at,
            })
        })
        .collect()
}
