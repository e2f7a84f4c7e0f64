use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel as _, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use fusion_domain::pagination::PageRequest;
use fusion_shop_schema::{categories, favorites, product_categories, products, reviews};

use crate::domain::repository::{
    CategoryRepository, FavoriteRepository, ProductRepository, ReviewRepository,
};
use crate::domain::types::{
    Category, NewProduct, Product, ProductDetail, ProductPatch, Review,
};
use crate::error::ShopError;
use crate::infra::db::{from_tx, is_unique_violation};

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        page: PageRequest,
        category: Option<&str>,
    ) -> Result<Vec<Product>, ShopError> {
        let mut query = products::Entity::find()
            .filter(products::Column::DeletedAt.is_null())
            .order_by_desc(products::Column::CreatedAt)
            .order_by_asc(products::Column::Id);
        if let Some(name) = category {
            query = query
                .join(
                    JoinType::InnerJoin,
                    products::Relation::ProductCategories.def(),
                )
                .join(
                    JoinType::InnerJoin,
                    product_categories::Relation::Category.def(),
                )
                .filter(categories::Column::Name.eq(name));
        }
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list products")?;
        with_categories(&self.db, models).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ShopError> {
        load_product(&self.db, id).await
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ProductDetail>, ShopError> {
        let Some(product) = load_product(&self.db, id).await? else {
            return Ok(None);
        };
        let reviews = reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list product reviews")?;
        Ok(Some(ProductDetail {
            product,
            reviews: reviews.into_iter().map(review_from_model).collect(),
        }))
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, ShopError> {
        let new = product.clone();
        self.db
            .transaction::<_, Product, ShopError>(|txn| {
                Box::pin(async move {
                    products::ActiveModel {
                        id: Set(new.id),
                        seller_id: Set(new.seller_id),
                        name: Set(new.name),
                        description: Set(new.description),
                        price: Set(new.price),
                        stock: Set(new.stock),
                        image: Set(new.image),
                        created_at: Set(new.created_at),
                        updated_at: Set(new.created_at),
                        deleted_at: Set(None),
                    }
                    .insert(txn)
                    .await
                    .context("insert product")?;
                    link_categories(txn, new.id, &new.category_names).await?;
                    load_product(txn, new.id)
                        .await?
                        .ok_or(ShopError::ProductNotFound)
                })
            })
            .await
            .map_err(|e| from_tx(e, "create product"))
    }

    async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<Product, ShopError> {
        let patch = patch.clone();
        self.db
            .transaction::<_, Product, ShopError>(|txn| {
                Box::pin(async move {
                    let existing = products::Entity::find_by_id(id)
                        .filter(products::Column::DeletedAt.is_null())
                        .one(txn)
                        .await
                        .context("find product for update")?
                        .ok_or(ShopError::ProductNotFound)?;

                    let mut model = existing.into_active_model();
                    if let Some(name) = patch.name {
                        model.name = Set(name);
                    }
                    if let Some(description) = patch.description {
                        model.description = Set(description);
                    }
                    if let Some(price) = patch.price {
                        model.price = Set(price);
                    }
                    if let Some(stock) = patch.stock {
                        model.stock = Set(stock);
                    }
                    if let Some(image) = patch.image {
                        model.image = Set(Some(image));
                    }
                    model.updated_at = Set(Utc::now());
                    model.update(txn).await.context("update product")?;

                    if let Some(names) = patch.category_names {
                        product_categories::Entity::delete_many()
                            .filter(product_categories::Column::ProductId.eq(id))
                            .exec(txn)
                            .await
                            .context("unlink product categories")?;
                        link_categories(txn, id, &names).await?;
                    }

                    load_product(txn, id)
                        .await?
                        .ok_or(ShopError::ProductNotFound)
                })
            })
            .await
            .map_err(|e| from_tx(e, "update product"))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), ShopError> {
        let now = Utc::now();
        products::ActiveModel {
            id: Set(id),
            deleted_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("soft delete product")?;
        Ok(())
    }
}

async fn load_product<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Product>, ShopError> {
    let model = products::Entity::find_by_id(id)
        .filter(products::Column::DeletedAt.is_null())
        .one(db)
        .await
        .context("find product by id")?;
    let Some(model) = model else {
        return Ok(None);
    };
    Ok(with_categories(db, vec![model]).await?.pop())
}

async fn with_categories<C: ConnectionTrait>(
    db: &C,
    models: Vec<products::Model>,
) -> Result<Vec<Product>, ShopError> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut by_product = categories_by_product(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let categories = by_product.remove(&m.id).unwrap_or_default();
            product_from_model(m, categories)
        })
        .collect())
}

async fn categories_by_product<C: ConnectionTrait>(
    db: &C,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Category>>, ShopError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = product_categories::Entity::find()
        .filter(product_categories::Column::ProductId.is_in(product_ids.iter().copied()))
        .find_also_related(categories::Entity)
        .all(db)
        .await
        .context("load product categories")?;

    let mut map: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for (link, category) in rows {
        if let Some(category) = category {
            map.entry(link.product_id)
                .or_default()
                .push(category_from_model(category));
        }
    }
    for list in map.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(map)
}

/// Find or create each named category and link it to the product.
async fn link_categories<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    names: &[String],
) -> Result<(), ShopError> {
    if names.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    categories::Entity::insert_many(names.iter().map(|name| categories::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.clone()),
        description: Set(String::new()),
        created_at: Set(now),
    }))
    .on_conflict(
        OnConflict::column(categories::Column::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await
    .context("create missing categories")?;

    let found = categories::Entity::find()
        .filter(categories::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await
        .context("resolve categories by name")?;

    product_categories::Entity::insert_many(found.iter().map(|c| {
        product_categories::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(c.id),
        }
    }))
    .on_conflict(
        OnConflict::columns([
            product_categories::Column::ProductId,
            product_categories::Column::CategoryId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await
    .context("link product categories")?;
    Ok(())
}

fn product_from_model(model: products::Model, categories: Vec<Category>) -> Product {
    Product {
        id: model.id,
        seller_id: model.seller_id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        image: model.image,
        categories,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

fn review_from_model(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at,
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ShopError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn create(&self, category: &Category) -> Result<(), ShopError> {
        let result = categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ShopError::CategoryAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create category").into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ShopError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Review repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn find(&self, product_id: Uuid, user_id: Uuid) -> Result<Option<Review>, ShopError> {
        let model = reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .filter(reviews::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find review")?;
        Ok(model.map(review_from_model))
    }

    async fn create(&self, review: &Review) -> Result<(), ShopError> {
        let result = reviews::ActiveModel {
            id: Set(review.id),
            product_id: Set(review.product_id),
            user_id: Set(review.user_id),
            rating: Set(review.rating),
            comment: Set(review.comment.clone()),
            created_at: Set(review.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ShopError::ReviewAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create review").into()),
        }
    }

    async fn delete(&self, product_id: Uuid, user_id: Uuid) -> Result<bool, ShopError> {
        let result = reviews::Entity::delete_many()
            .filter(reviews::Column::ProductId.eq(product_id))
            .filter(reviews::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ShopError> {
        favorites::Entity::insert(favorites::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("add favorite")?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ShopError> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await
            .context("remove favorite")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_products(&self, user_id: Uuid) -> Result<Vec<Product>, ShopError> {
        let models = products::Entity::find()
            .join(JoinType::InnerJoin, favorites::Relation::Product.def().rev())
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(products::Column::DeletedAt.is_null())
            .order_by_desc(favorites::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list favorite products")?;
        with_categories(&self.db, models).await
    }
}
