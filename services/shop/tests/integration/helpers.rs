#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;
use fusion_domain::pagination::PageRequest;
use fusion_domain::permission::PermissionSet;
use fusion_domain::verification::VerificationKind;
use fusion_shop::domain::repository::{
    BlobStore, CartRepository, CategoryRepository, FavoriteRepository, Mailer, OrderRepository,
    ProductRepository, ReviewRepository, SessionRepository, UserRepository,
    VerificationRepository,
};
use fusion_shop::domain::types::{
    Cart, CartItem, Category, ConsumeOutcome, NewProduct, Order, OrderItem, OutgoingMail,
    Product, ProductDetail, ProductPatch, ProfilePatch, Review, Session, User, Verification,
    VerificationEffect,
};
use fusion_shop::error::ShopError;
use fusion_shop::password::hash_password;
use fusion_shop::usecase::auth::TokenSettings;

pub use fusion_testing::auth::{TEST_JWT_SECRET, TestAuth};

pub const TEST_PASSWORD: &str = "longenough1";
pub const TEST_REDIRECT: &str = "https://shop.example.com/verify";

pub fn test_tokens() -> TokenSettings {
    TokenSettings {
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        access_ttl: Duration::from_secs(900),
        refresh_ttl: Duration::from_secs(3600),
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(username: &str, verified: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        is_email_verified: verified,
        avatar: None,
        phone: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_product(seller_id: Uuid, name: &str) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::now_v7(),
        seller_id,
        name: name.to_owned(),
        description: String::new(),
        price: Decimal::new(1999, 2),
        stock: 10,
        image: None,
        categories: vec![],
        created_at: now,
        updated_at: now,
    }
}

// ── MockDb ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockState {
    pub users: Vec<User>,
    pub permissions: HashMap<Uuid, PermissionSet>,
    pub sessions: Vec<Session>,
    pub verifications: Vec<Verification>,
    pub products: Vec<Product>,
    pub deleted_products: HashSet<Uuid>,
    pub categories: Vec<Category>,
    pub reviews: Vec<Review>,
    pub favorites: Vec<(Uuid, Uuid)>,
    pub carts: Vec<Cart>,
    pub orders: Vec<Order>,
}

/// In-memory store implementing every repository trait over shared state.
#[derive(Clone, Default)]
pub struct MockDb {
    pub state: Arc<Mutex<MockState>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_user(self, user: User) -> Self {
        self.lock().users.push(user);
        self
    }

    pub fn with_permissions(self, user_id: Uuid, permissions: PermissionSet) -> Self {
        self.lock().permissions.insert(user_id, permissions);
        self
    }

    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.push(product);
        self
    }

    pub fn with_session(self, session: Session) -> Self {
        self.lock().sessions.push(session);
        self
    }

    pub fn with_verification(self, verification: Verification) -> Self {
        self.lock().verifications.push(verification);
        self
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn verifications_for(&self, user_id: Uuid, kind: VerificationKind) -> Vec<Verification> {
        self.lock()
            .verifications
            .iter()
            .filter(|v| v.user_id == user_id && v.kind == kind)
            .cloned()
            .collect()
    }

    pub fn cart_of(&self, user_id: Uuid) -> Option<Cart> {
        self.lock()
            .carts
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned()
    }
}

impl MockState {
    fn live_product(&self, id: Uuid) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id && !self.deleted_products.contains(&p.id))
    }

    fn resolve_categories(&mut self, names: &[String]) -> Vec<Category> {
        names
            .iter()
            .map(|name| {
                if let Some(c) = self.categories.iter().find(|c| &c.name == name) {
                    return c.clone();
                }
                let category = Category {
                    id: Uuid::now_v7(),
                    name: name.clone(),
                    description: String::new(),
                };
                self.categories.push(category.clone());
                category
            })
            .collect()
    }
}

impl UserRepository for MockDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopError> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ShopError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn permissions(&self, user_id: Uuid) -> Result<PermissionSet, ShopError> {
        Ok(self
            .lock()
            .permissions
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_with_verification(
        &self,
        user: &User,
        verification: &Verification,
    ) -> Result<(), ShopError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(ShopError::UserAlreadyExists);
        }
        state.users.push(user.clone());
        state.verifications.push(verification.clone());
        Ok(())
    }

    async fn replace_unverified(
        &self,
        user_id: Uuid,
        username: &str,
        password_hash: &str,
        verification: &Verification,
    ) -> Result<(), ShopError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|u| u.username == username && u.id != user_id)
        {
            return Err(ShopError::UsernameTaken);
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id && !u.is_email_verified)
            .ok_or(ShopError::UserAlreadyExists)?;
        user.username = username.to_owned();
        user.password_hash = password_hash.to_owned();
        user.updated_at = Utc::now();
        state
            .verifications
            .retain(|v| !(v.user_id == user_id && v.kind == VerificationKind::EmailVerify));
        state.verifications.push(verification.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<User, ShopError> {
        let mut state = self.lock();
        if let Some(username) = &patch.username {
            if state
                .users
                .iter()
                .any(|u| &u.username == username && u.id != user_id)
            {
                return Err(ShopError::UsernameTaken);
            }
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(ShopError::UserNotFound)?;
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(phone) = &patch.phone {
            user.phone = Some(phone.clone());
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_avatar(&self, user_id: Uuid, avatar: &str) -> Result<(), ShopError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(ShopError::UserNotFound)?;
        user.avatar = Some(avatar.to_owned());
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.users.len();
        state.users.retain(|u| u.id != user_id);
        state.sessions.retain(|s| s.user_id != user_id);
        state.verifications.retain(|v| v.user_id != user_id);
        state.carts.retain(|c| c.user_id != user_id);
        state.orders.retain(|o| o.user_id != user_id);
        Ok(state.users.len() < before)
    }
}

impl SessionRepository for MockDb {
    async fn create(&self, session: &Session) -> Result<(), ShopError> {
        self.lock().sessions.push(session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, ShopError> {
        Ok(self.lock().sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(state.sessions.len() < before)
    }
}

impl VerificationRepository for MockDb {
    async fn create(&self, verification: &Verification) -> Result<(), ShopError> {
        self.lock().verifications.push(verification.clone());
        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        kind: VerificationKind,
        effect: &VerificationEffect,
    ) -> Result<ConsumeOutcome, ShopError> {
        let mut state = self.lock();
        let Some(idx) = state
            .verifications
            .iter()
            .position(|v| v.token == token && v.kind == kind)
        else {
            return Ok(ConsumeOutcome::NotFound);
        };
        if state.verifications[idx].is_expired(Utc::now()) {
            return Ok(ConsumeOutcome::Expired);
        }
        let verification = state.verifications.remove(idx);
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == verification.user_id)
            .ok_or(ShopError::UserNotFound)?;
        match effect {
            VerificationEffect::MarkEmailVerified => user.is_email_verified = true,
            VerificationEffect::SetPasswordHash(hash) => user.password_hash = hash.clone(),
        }
        Ok(ConsumeOutcome::Consumed {
            user_id: verification.user_id,
        })
    }
}

impl ProductRepository for MockDb {
    async fn list(
        &self,
        page: PageRequest,
        category: Option<&str>,
    ) -> Result<Vec<Product>, ShopError> {
        let state = self.lock();
        Ok(state
            .products
            .iter()
            .filter(|p| !state.deleted_products.contains(&p.id))
            .filter(|p| category.is_none_or(|name| p.categories.iter().any(|c| c.name == name)))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopError> {
        Ok(self.lock().live_product(id).cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ShopError> {
        let state = self.lock();
        Ok(state.live_product(id).cloned().map(|product| {
            let reviews = state
                .reviews
                .iter()
                .filter(|r| r.product_id == id)
                .cloned()
                .collect();
            ProductDetail { product, reviews }
        }))
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, ShopError> {
        let mut state = self.lock();
        let categories = state.resolve_categories(&product.category_names);
        let created = Product {
            id: product.id,
            seller_id: product.seller_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            image: product.image.clone(),
            categories,
            created_at: product.created_at,
            updated_at: product.created_at,
        };
        state.products.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<Product, ShopError> {
        let mut state = self.lock();
        let categories = patch
            .category_names
            .as_ref()
            .map(|names| state.resolve_categories(names));
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ShopError::ProductNotFound)?;
        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(image) = &patch.image {
            product.image = Some(image.clone());
        }
        if let Some(categories) = categories {
            product.categories = categories;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), ShopError> {
        self.lock().deleted_products.insert(id);
        Ok(())
    }
}

impl CategoryRepository for MockDb {
    async fn list(&self) -> Result<Vec<Category>, ShopError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create(&self, category: &Category) -> Result<(), ShopError> {
        let mut state = self.lock();
        if state.categories.iter().any(|c| c.name == category.name) {
            return Err(ShopError::CategoryAlreadyExists);
        }
        state.categories.push(category.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }
}

impl ReviewRepository for MockDb {
    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>, ShopError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.product_id == product_id && r.user_id == user_id)
            .cloned())
    }

    async fn create(&self, review: &Review) -> Result<(), ShopError> {
        let mut state = self.lock();
        if state
            .reviews
            .iter()
            .any(|r| r.product_id == review.product_id && r.user_id == review.user_id)
        {
            return Err(ShopError::ReviewAlreadyExists);
        }
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.reviews.len();
        state
            .reviews
            .retain(|r| !(r.product_id == product_id && r.user_id == user_id));
        Ok(state.reviews.len() < before)
    }
}

impl FavoriteRepository for MockDb {
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError> {
        let mut state = self.lock();
        if !state.favorites.contains(&(user_id, product_id)) {
            state.favorites.push((user_id, product_id));
        }
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.favorites.len();
        state.favorites.retain(|f| *f != (user_id, product_id));
        Ok(state.favorites.len() < before)
    }

    async fn list_products(&self, user_id: Uuid) -> Result<Vec<Product>, ShopError> {
        let state = self.lock();
        Ok(state
            .favorites
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, p)| state.live_product(*p).cloned())
            .collect())
    }
}

impl CartRepository for MockDb {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, ShopError> {
        Ok(self.cart_of(user_id))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ShopError> {
        let mut state = self.lock();
        if !state.carts.iter().any(|c| c.user_id == user_id) {
            state.carts.push(Cart {
                id: Uuid::now_v7(),
                user_id,
                items: vec![],
            });
        }
        let cart = state
            .carts
            .iter_mut()
            .find(|c| c.user_id == user_id)
            .ok_or(ShopError::CartNotFound)?;
        if cart.items.iter().any(|i| i.product_id == product_id) {
            return Err(ShopError::ProductAlreadyInCart);
        }
        cart.items.push(CartItem {
            id: Uuid::now_v7(),
            product_id,
            quantity,
        });
        Ok(cart.clone())
    }

    async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError> {
        let mut state = self.lock();
        if let Some(cart) = state.carts.iter_mut().find(|c| c.user_id == user_id) {
            cart.items.retain(|i| i.product_id != product_id);
        }
        Ok(())
    }
}

impl OrderRepository for MockDb {
    async fn checkout(&self, user_id: Uuid, product_ids: &[Uuid]) -> Result<Order, ShopError> {
        let mut state = self.lock();
        let cart = state
            .carts
            .iter_mut()
            .find(|c| c.user_id == user_id)
            .ok_or(ShopError::CartNotFound)?;
        let (moved, kept): (Vec<CartItem>, Vec<CartItem>) = cart
            .items
            .drain(..)
            .partition(|i| product_ids.contains(&i.product_id));
        cart.items = kept;

        let now = Utc::now();
        if !state
            .orders
            .iter()
            .any(|o| o.user_id == user_id && o.status == OrderStatus::Staging)
        {
            state.orders.push(Order {
                id: Uuid::now_v7(),
                user_id,
                status: OrderStatus::Staging,
                items: vec![],
                created_at: now,
                updated_at: now,
            });
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.user_id == user_id && o.status == OrderStatus::Staging)
            .ok_or(ShopError::OrderNotFound)?;
        for item in moved {
            match order
                .items
                .iter_mut()
                .find(|i| i.product_id == item.product_id)
            {
                Some(line) => line.quantity += item.quantity,
                None => order.items.push(OrderItem {
                    id: Uuid::now_v7(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                }),
            }
        }
        order.updated_at = now;
        Ok(order.clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ShopError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ShopError> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ShopError> {
        let mut state = self.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(ShopError::OrderNotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        Ok(state.orders.len() < before)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for MockMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ShopError> {
        if self.fail {
            return Err(anyhow::anyhow!("smtp unavailable").into());
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// ── MockBlobStore ────────────────────────────────────────────────────────────

pub const MOCK_BLOB_PREFIX: &str = "mem://";

#[derive(Clone, Default)]
pub struct MockBlobStore {
    pub blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockBlobStore {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl BlobStore for MockBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ShopError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_owned(), bytes.to_vec());
        Ok(format!("{MOCK_BLOB_PREFIX}{key}"))
    }

    async fn remove(&self, key: &str) -> Result<(), ShopError> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(MOCK_BLOB_PREFIX)
    }
}
