use uuid::Uuid;

use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::types::{Cart, MAX_CART_QUANTITY};
use crate::error::ShopError;

pub struct GetCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> GetCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Cart, ShopError> {
        self.carts
            .find_by_user(user_id)
            .await?
            .ok_or(ShopError::CartNotFound)
    }
}

pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
}

pub struct AddToCartUseCase<P: ProductRepository, C: CartRepository> {
    pub products: P,
    pub carts: C,
}

impl<P: ProductRepository, C: CartRepository> AddToCartUseCase<P, C> {
    /// Add one line to the caller's cart, creating the cart on first use.
    pub async fn execute(&self, user_id: Uuid, input: AddToCartInput) -> Result<Cart, ShopError> {
        let quantity = input.quantity.unwrap_or(1);
        if !(1..=MAX_CART_QUANTITY).contains(&quantity) {
            return Err(ShopError::InvalidField("quantity"));
        }
        self.products
            .find_by_id(input.product_id)
            .await?
            .ok_or(ShopError::ProductNotFound)?;

        let cart = self
            .carts
            .add_item(user_id, input.product_id, quantity)
            .await?;
        tracing::info!(%user_id, product_id = %input.product_id, quantity, "added to cart");
        Ok(cart)
    }
}

pub struct RemoveFromCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> RemoveFromCartUseCase<C> {
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError> {
        self.carts.remove_item(user_id, product_id).await?;
        tracing::debug!(%user_id, %product_id, "removed from cart");
        Ok(())
    }
}
