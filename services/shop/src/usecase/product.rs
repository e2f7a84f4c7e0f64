use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use fusion_domain::pagination::PageRequest;

use crate::domain::repository::{FavoriteRepository, ProductRepository, ReviewRepository};
use crate::domain::types::{
    CATEGORY_NAME_MAX_LEN, NewProduct, PRODUCT_NAME_MAX_LEN, Product, ProductDetail,
    ProductPatch, RATING_MAX, RATING_MIN, REVIEW_COMMENT_MAX_LEN, Review,
};
use crate::error::ShopError;

fn validate_name(name: &str) -> Result<String, ShopError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > PRODUCT_NAME_MAX_LEN {
        return Err(ShopError::InvalidField("name"));
    }
    Ok(name.to_owned())
}

fn validate_price(price: Decimal) -> Result<Decimal, ShopError> {
    if price < Decimal::ZERO {
        return Err(ShopError::InvalidField("price"));
    }
    Ok(price.round_dp(2))
}

fn validate_stock(stock: i32) -> Result<i32, ShopError> {
    if stock < 0 {
        return Err(ShopError::InvalidField("stock"));
    }
    Ok(stock)
}

/// Trim, drop blanks and deduplicate while keeping first-seen order.
fn normalize_category_names(names: Vec<String>) -> Result<Vec<String>, ShopError> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > CATEGORY_NAME_MAX_LEN {
            return Err(ShopError::InvalidField("categories"));
        }
        if !out.iter().any(|n| n == name) {
            out.push(name.to_owned());
        }
    }
    Ok(out)
}

/// Load a live product and check that `seller_id` owns it.
async fn owned_product<P: ProductRepository>(
    products: &P,
    id: Uuid,
    seller_id: Uuid,
) -> Result<Product, ShopError> {
    let product = products
        .find_by_id(id)
        .await?
        .ok_or(ShopError::ProductNotFound)?;
    if product.seller_id != seller_id {
        return Err(ShopError::Forbidden);
    }
    Ok(product)
}

async fn ensure_product<P: ProductRepository>(products: &P, id: Uuid) -> Result<(), ShopError> {
    products
        .find_by_id(id)
        .await?
        .map(|_| ())
        .ok_or(ShopError::ProductNotFound)
}

// ── ListProducts ─────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    pub async fn execute(
        &self,
        page: PageRequest,
        category: Option<String>,
    ) -> Result<Vec<Product>, ShopError> {
        let category = category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        self.products.list(page.clamped(), category).await
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<ProductDetail, ShopError> {
        self.products
            .find_detail(id)
            .await?
            .ok_or(ShopError::ProductNotFound)
    }
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub categories: Vec<String>,
}

pub struct CreateProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> CreateProductUseCase<P> {
    pub async fn execute(
        &self,
        seller_id: Uuid,
        input: CreateProductInput,
    ) -> Result<Product, ShopError> {
        let new = NewProduct {
            id: Uuid::now_v7(),
            seller_id,
            name: validate_name(&input.name)?,
            description: input.description,
            price: validate_price(input.price)?,
            stock: validate_stock(input.stock)?,
            image: input.image,
            category_names: normalize_category_names(input.categories)?,
            created_at: Utc::now(),
        };
        let product = self.products.create(&new).await?;
        tracing::info!(product_id = %product.id, %seller_id, "product created");
        Ok(product)
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub categories: Option<Vec<String>>,
}

pub struct UpdateProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> UpdateProductUseCase<P> {
    /// Partial update by the owning seller. Provided categories replace the
    /// current set.
    pub async fn execute(
        &self,
        id: Uuid,
        seller_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<Product, ShopError> {
        owned_product(&self.products, id, seller_id).await?;

        let patch = ProductPatch {
            name: input.name.as_deref().map(validate_name).transpose()?,
            description: input.description,
            price: input.price.map(validate_price).transpose()?,
            stock: input.stock.map(validate_stock).transpose()?,
            image: input.image,
            category_names: input
                .categories
                .map(normalize_category_names)
                .transpose()?,
        };
        let product = self.products.update(id, &patch).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

pub struct DeleteProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> DeleteProductUseCase<P> {
    pub async fn execute(&self, id: Uuid, seller_id: Uuid) -> Result<(), ShopError> {
        owned_product(&self.products, id, seller_id).await?;
        self.products.soft_delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

pub struct CreateReviewInput {
    pub rating: i16,
    pub comment: String,
}

pub struct CreateReviewUseCase<P: ProductRepository, R: ReviewRepository> {
    pub products: P,
    pub reviews: R,
}

impl<P: ProductRepository, R: ReviewRepository> CreateReviewUseCase<P, R> {
    pub async fn execute(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        input: CreateReviewInput,
    ) -> Result<Review, ShopError> {
        if !(RATING_MIN..=RATING_MAX).contains(&input.rating) {
            return Err(ShopError::InvalidField("rating"));
        }
        let comment = input.comment.trim().to_owned();
        if comment.chars().count() > REVIEW_COMMENT_MAX_LEN {
            return Err(ShopError::InvalidField("comment"));
        }
        ensure_product(&self.products, product_id).await?;
        if self.reviews.find(product_id, user_id).await?.is_some() {
            return Err(ShopError::ReviewAlreadyExists);
        }

        let review = Review {
            id: Uuid::now_v7(),
            product_id,
            user_id,
            rating: input.rating,
            comment,
            created_at: Utc::now(),
        };
        self.reviews.create(&review).await?;
        tracing::info!(%product_id, %user_id, rating = review.rating, "review created");
        Ok(review)
    }
}

pub struct RemoveReviewUseCase<R: ReviewRepository> {
    pub reviews: R,
}

impl<R: ReviewRepository> RemoveReviewUseCase<R> {
    pub async fn execute(&self, product_id: Uuid, user_id: Uuid) -> Result<(), ShopError> {
        let removed = self.reviews.delete(product_id, user_id).await?;
        tracing::debug!(%product_id, %user_id, removed, "review removed");
        Ok(())
    }
}

// ── Favorites ────────────────────────────────────────────────────────────────

pub struct AddFavoriteUseCase<P: ProductRepository, F: FavoriteRepository> {
    pub products: P,
    pub favorites: F,
}

impl<P: ProductRepository, F: FavoriteRepository> AddFavoriteUseCase<P, F> {
    pub async fn execute(&self, product_id: Uuid, user_id: Uuid) -> Result<(), ShopError> {
        ensure_product(&self.products, product_id).await?;
        self.favorites.add(user_id, product_id).await
    }
}

pub struct RemoveFavoriteUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> RemoveFavoriteUseCase<F> {
    pub async fn execute(&self, product_id: Uuid, user_id: Uuid) -> Result<(), ShopError> {
        self.favorites.remove(user_id, product_id).await?;
        Ok(())
    }
}
