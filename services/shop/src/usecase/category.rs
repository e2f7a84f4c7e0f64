use uuid::Uuid;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::{CATEGORY_NAME_MAX_LEN, Category};
use crate::error::ShopError;

pub struct ListCategoriesUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> ListCategoriesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Category>, ShopError> {
        self.categories.list().await
    }
}

pub struct CreateCategoryInput {
    pub name: String,
    pub description: String,
}

pub struct CreateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> CreateCategoryUseCase<C> {
    pub async fn execute(&self, input: CreateCategoryInput) -> Result<Category, ShopError> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > CATEGORY_NAME_MAX_LEN {
            return Err(ShopError::InvalidField("name"));
        }
        let category = Category {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            description: input.description.trim().to_owned(),
        };
        self.categories.create(&category).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }
}

pub struct DeleteCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> DeleteCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ShopError> {
        if !self.categories.delete(id).await? {
            return Err(ShopError::CategoryNotFound);
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}
