use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use fusion_shop_schema::{cart_items, carts};

use crate::domain::repository::CartRepository;
use crate::domain::types::{Cart, CartItem};
use crate::error::ShopError;
use crate::infra::db::from_tx;

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopError> {
        let Some(cart) = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find cart by user")?
        else {
            return Ok(None);
        };
        Ok(Some(load_items(&self.db, cart).await?))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ShopError> {
        self.db
            .transaction::<_, Cart, ShopError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    // Concurrent first adds race on the unique user_id; the
                    // loser's insert is a no-op and both lock the same row.
                    carts::Entity::insert(carts::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        user_id: Set(user_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                    })
                    .on_conflict(
                        OnConflict::column(carts::Column::UserId)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await
                    .context("create cart")?;

                    let cart = lock_cart(txn, user_id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("cart missing after upsert"))?;

                    let existing = cart_items::Entity::find()
                        .filter(cart_items::Column::CartId.eq(cart.id))
                        .filter(cart_items::Column::ProductId.eq(product_id))
                        .one(txn)
                        .await
                        .context("find cart item")?;
                    if existing.is_some() {
                        return Err(ShopError::ProductAlreadyInCart);
                    }

                    cart_items::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        cart_id: Set(cart.id),
                        product_id: Set(product_id),
                        quantity: Set(quantity),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .context("insert cart item")?;

                    let mut touched: carts::ActiveModel = cart.clone().into();
                    touched.updated_at = Set(now);
                    touched.update(txn).await.context("touch cart")?;

                    load_items(txn, cart).await
                })
            })
            .await
            .map_err(|e| from_tx(e, "add cart item"))
    }

    async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError> {
        self.db
            .transaction::<_, (), ShopError>(|txn| {
                Box::pin(async move {
                    let Some(cart) = lock_cart(txn, user_id).await? else {
                        return Ok(());
                    };
                    cart_items::Entity::delete_many()
                        .filter(cart_items::Column::CartId.eq(cart.id))
                        .filter(cart_items::Column::ProductId.eq(product_id))
                        .exec(txn)
                        .await
                        .context("delete cart item")?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| from_tx(e, "remove cart item"))
    }
}

/// `SELECT ... FOR UPDATE` on the user's cart row.
pub(super) async fn lock_cart<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<carts::Model>, ShopError> {
    let cart = carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(db)
        .await
        .context("lock cart")?;
    Ok(cart)
}

async fn load_items<C: ConnectionTrait>(db: &C, cart: carts::Model) -> Result<Cart, ShopError> {
    let items = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(db)
        .await
        .context("load cart items")?;
    Ok(Cart {
        id: cart.id,
        user_id: cart.user_id,
        items: items
            .into_iter()
            .map(|item| CartItem {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
    })
}
