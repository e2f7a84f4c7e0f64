#![allow(async_fn_in_trait)]

use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;
use fusion_domain::pagination::PageRequest;
use fusion_domain::permission::PermissionSet;
use fusion_domain::verification::VerificationKind;

use crate::domain::types::{
    Cart, Category, ConsumeOutcome, NewProduct, Order, OutgoingMail, Product, ProductDetail,
    ProductPatch, ProfilePatch, Review, Session, User, Verification, VerificationEffect,
};
use crate::error::ShopError;

/// Repository for user accounts and their permission links.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ShopError>;

    async fn permissions(&self, user_id: Uuid) -> Result<PermissionSet, ShopError>;

    /// Insert the user and its first verification in one transaction.
    /// A unique-key collision maps to `UserAlreadyExists`.
    async fn create_with_verification(
        &self,
        user: &User,
        verification: &Verification,
    ) -> Result<(), ShopError>;

    /// Overwrite the credentials of a still-unverified user and add a fresh
    /// verification, in one transaction.
    async fn replace_unverified(
        &self,
        user_id: Uuid,
        username: &str,
        password_hash: &str,
        verification: &Verification,
    ) -> Result<(), ShopError>;

    /// Apply a profile patch and return the updated user.
    /// A username collision maps to `UsernameTaken`.
    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch)
    -> Result<User, ShopError>;

    async fn set_avatar(&self, user_id: Uuid, avatar: &str) -> Result<(), ShopError>;

    /// Hard delete; dependent rows cascade. Returns `false` if absent.
    async fn delete(&self, user_id: Uuid) -> Result<bool, ShopError>;
}

/// Repository for refresh-token sessions.
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), ShopError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, ShopError>;

    /// Delete the session if it belongs to `user_id`. Returns `true` if deleted.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ShopError>;
}

/// Repository for single-use verification tokens.
pub trait VerificationRepository: Send + Sync {
    async fn create(&self, verification: &Verification) -> Result<(), ShopError>;

    /// Lock the row matching `token` and `kind`, apply `effect` to its owner
    /// and delete it, all in one transaction. Expired rows are left in place.
    async fn consume(
        &self,
        token: &str,
        kind: VerificationKind,
        effect: &VerificationEffect,
    ) -> Result<ConsumeOutcome, ShopError>;
}

/// Repository for products and their category links. Soft-deleted products
/// are invisible to every read.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        page: PageRequest,
        category: Option<&str>,
    ) -> Result<Vec<Product>, ShopError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopError>;

    /// Product with categories and reviews.
    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ShopError>;

    /// Insert the product, finding or creating its categories by name.
    async fn create(&self, product: &NewProduct) -> Result<Product, ShopError>;

    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<Product, ShopError>;

    async fn soft_delete(&self, id: Uuid) -> Result<(), ShopError>;
}

pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, ShopError>;

    /// A name collision maps to `CategoryAlreadyExists`.
    async fn create(&self, category: &Category) -> Result<(), ShopError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError>;
}

pub trait ReviewRepository: Send + Sync {
    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>, ShopError>;

    /// A second review by the same user maps to `ReviewAlreadyExists`.
    async fn create(&self, review: &Review) -> Result<(), ShopError>;

    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool, ShopError>;
}

pub trait FavoriteRepository: Send + Sync {
    /// Idempotent: adding an existing favorite is a no-op.
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError>;

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ShopError>;

    async fn list_products(&self, user_id: Uuid) -> Result<Vec<Product>, ShopError>;
}

/// Repository for carts. Writes lock the cart row for the transaction.
pub trait CartRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopError>;

    /// Create the cart on demand and add one line.
    /// A product already in the cart maps to `ProductAlreadyInCart`.
    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ShopError>;

    /// Remove the line for `product_id`. No-op when absent or without a cart.
    async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError>;
}

pub trait OrderRepository: Send + Sync {
    /// Move the selected cart lines into the user's staging order (created on
    /// demand) in one transaction. Missing selections are skipped.
    /// No cart maps to `CartNotFound`.
    async fn checkout(&self, user_id: Uuid, product_ids: &[Uuid]) -> Result<Order, ShopError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ShopError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ShopError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError>;
}

/// Outgoing mail port.
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ShopError>;
}

/// Binary object storage port.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL path.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ShopError>;

    async fn remove(&self, key: &str) -> Result<(), ShopError>;

    /// Inverse of `put`: the key behind a URL this store produced.
    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str>;
}
