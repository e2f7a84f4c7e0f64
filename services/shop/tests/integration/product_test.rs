use rust_decimal::Decimal;
use uuid::Uuid;

use fusion_domain::pagination::PageRequest;
use fusion_shop::error::ShopError;
use fusion_shop::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, ListCategoriesUseCase,
};
use fusion_shop::usecase::product::{
    AddFavoriteUseCase, CreateProductInput, CreateProductUseCase, CreateReviewInput,
    CreateReviewUseCase, DeleteProductUseCase, GetProductUseCase, ListProductsUseCase,
    RemoveFavoriteUseCase, RemoveReviewUseCase, UpdateProductInput, UpdateProductUseCase,
};

use crate::helpers::{MockDb, test_product};

fn product_input(name: &str, categories: &[&str]) -> CreateProductInput {
    CreateProductInput {
        name: name.to_owned(),
        description: "A thing".to_owned(),
        price: Decimal::new(1250, 2),
        stock: 3,
        image: None,
        categories: categories.iter().map(|c| (*c).to_owned()).collect(),
    }
}

fn empty_patch() -> UpdateProductInput {
    UpdateProductInput {
        name: None,
        description: None,
        price: None,
        stock: None,
        image: None,
        categories: None,
    }
}

// ── Create / Get / List ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_product_with_deduplicated_categories() {
    let db = MockDb::new();
    let seller = Uuid::now_v7();

    let product = CreateProductUseCase {
        products: db.clone(),
    }
    .execute(seller, product_input("  Lamp  ", &["home", " home", "", "light"]))
    .await
    .unwrap();

    assert_eq!(product.name, "Lamp");
    assert_eq!(product.seller_id, seller);
    let names: Vec<&str> = product.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["home", "light"]);
    assert_eq!(db.lock().categories.len(), 2);
}

#[tokio::test]
async fn should_validate_product_fields() {
    let usecase = CreateProductUseCase {
        products: MockDb::new(),
    };
    let seller = Uuid::now_v7();

    let blank = usecase.execute(seller, product_input("   ", &[])).await;
    assert!(matches!(blank, Err(ShopError::InvalidField("name"))));

    let long = usecase
        .execute(seller, product_input(&"x".repeat(256), &[]))
        .await;
    assert!(matches!(long, Err(ShopError::InvalidField("name"))));

    let negative_price = usecase
        .execute(
            seller,
            CreateProductInput {
                price: Decimal::new(-1, 2),
                ..product_input("Lamp", &[])
            },
        )
        .await;
    assert!(matches!(negative_price, Err(ShopError::InvalidField("price"))));

    let negative_stock = usecase
        .execute(
            seller,
            CreateProductInput {
                stock: -1,
                ..product_input("Lamp", &[])
            },
        )
        .await;
    assert!(matches!(negative_stock, Err(ShopError::InvalidField("stock"))));
}

#[tokio::test]
async fn should_get_product_with_reviews() {
    let product = test_product(Uuid::now_v7(), "Desk");
    let db = MockDb::new().with_product(product.clone());
    let reviewer = Uuid::now_v7();
    CreateReviewUseCase {
        products: db.clone(),
        reviews: db.clone(),
    }
    .execute(
        product.id,
        reviewer,
        CreateReviewInput {
            rating: 4,
            comment: "Sturdy".to_owned(),
        },
    )
    .await
    .unwrap();

    let detail = GetProductUseCase { products: db }
        .execute(product.id)
        .await
        .unwrap();

    assert_eq!(detail.product.id, product.id);
    assert_eq!(detail.reviews.len(), 1);
    assert_eq!(detail.reviews[0].user_id, reviewer);
}

#[tokio::test]
async fn should_list_products_by_category_and_page() {
    let db = MockDb::new();
    let seller = Uuid::now_v7();
    let create = CreateProductUseCase {
        products: db.clone(),
    };
    for i in 0..3 {
        create
            .execute(seller, product_input(&format!("Chair {i}"), &["chairs"]))
            .await
            .unwrap();
    }
    create
        .execute(seller, product_input("Table", &["tables"]))
        .await
        .unwrap();

    let list = ListProductsUseCase { products: db };
    let chairs = list
        .execute(PageRequest::default(), Some("chairs".to_owned()))
        .await
        .unwrap();
    assert_eq!(chairs.len(), 3);

    let second_page = list
        .execute(
            PageRequest {
                per_page: 2,
                page: 2,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(second_page.len(), 2);

    let all = list
        .execute(PageRequest::default(), Some("  ".to_owned()))
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
}

// ── Update / Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_own_product_and_replace_categories() {
    let db = MockDb::new();
    let seller = Uuid::now_v7();
    let product = CreateProductUseCase {
        products: db.clone(),
    }
    .execute(seller, product_input("Lamp", &["home"]))
    .await
    .unwrap();

    let updated = UpdateProductUseCase {
        products: db.clone(),
    }
    .execute(
        product.id,
        seller,
        UpdateProductInput {
            price: Some(Decimal::new(999, 2)),
            categories: Some(vec!["garden".to_owned()]),
            ..empty_patch()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.price, Decimal::new(999, 2));
    assert_eq!(updated.categories.len(), 1);
    assert_eq!(updated.categories[0].name, "garden");
}

#[tokio::test]
async fn should_forbid_changes_by_non_owner() {
    let product = test_product(Uuid::now_v7(), "Rug");
    let db = MockDb::new().with_product(product.clone());
    let stranger = Uuid::now_v7();

    let update = UpdateProductUseCase {
        products: db.clone(),
    }
    .execute(product.id, stranger, empty_patch())
    .await;
    assert!(matches!(update, Err(ShopError::Forbidden)));

    let delete = DeleteProductUseCase {
        products: db.clone(),
    }
    .execute(product.id, stranger)
    .await;
    assert!(matches!(delete, Err(ShopError::Forbidden)));
}

#[tokio::test]
async fn should_hide_soft_deleted_product() {
    let product = test_product(Uuid::now_v7(), "Vase");
    let db = MockDb::new().with_product(product.clone());

    DeleteProductUseCase {
        products: db.clone(),
    }
    .execute(product.id, product.seller_id)
    .await
    .unwrap();

    assert!(db.lock().products.iter().any(|p| p.id == product.id));
    let get = GetProductUseCase {
        products: db.clone(),
    }
    .execute(product.id)
    .await;
    assert!(matches!(get, Err(ShopError::ProductNotFound)));
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_allow_one_review_per_user() {
    let product = test_product(Uuid::now_v7(), "Mug");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();
    let usecase = CreateReviewUseCase {
        products: db.clone(),
        reviews: db.clone(),
    };
    let input = || CreateReviewInput {
        rating: 5,
        comment: "Great".to_owned(),
    };

    usecase.execute(product.id, user, input()).await.unwrap();
    let again = usecase.execute(product.id, user, input()).await;
    assert!(matches!(again, Err(ShopError::ReviewAlreadyExists)));

    RemoveReviewUseCase {
        reviews: db.clone(),
    }
    .execute(product.id, user)
    .await
    .unwrap();
    usecase.execute(product.id, user, input()).await.unwrap();
}

#[tokio::test]
async fn should_validate_review_rating_comment_and_product() {
    let product = test_product(Uuid::now_v7(), "Pen");
    let db = MockDb::new().with_product(product.clone());
    let usecase = CreateReviewUseCase {
        products: db.clone(),
        reviews: db.clone(),
    };
    let user = Uuid::now_v7();

    for rating in [0, 6] {
        let result = usecase
            .execute(
                product.id,
                user,
                CreateReviewInput {
                    rating,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(ShopError::InvalidField("rating"))));
    }

    let long = usecase
        .execute(
            product.id,
            user,
            CreateReviewInput {
                rating: 3,
                comment: "x".repeat(2001),
            },
        )
        .await;
    assert!(matches!(long, Err(ShopError::InvalidField("comment"))));

    let missing = usecase
        .execute(
            Uuid::now_v7(),
            user,
            CreateReviewInput {
                rating: 3,
                comment: String::new(),
            },
        )
        .await;
    assert!(matches!(missing, Err(ShopError::ProductNotFound)));
}

// ── Favorites ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_favorite_idempotently_and_remove_it() {
    let product = test_product(Uuid::now_v7(), "Book");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();
    let add = AddFavoriteUseCase {
        products: db.clone(),
        favorites: db.clone(),
    };

    add.execute(product.id, user).await.unwrap();
    add.execute(product.id, user).await.unwrap();
    assert_eq!(db.lock().favorites.len(), 1);

    let remove = RemoveFavoriteUseCase {
        favorites: db.clone(),
    };
    remove.execute(product.id, user).await.unwrap();
    remove.execute(product.id, user).await.unwrap();
    assert!(db.lock().favorites.is_empty());

    let missing = add.execute(Uuid::now_v7(), user).await;
    assert!(matches!(missing, Err(ShopError::ProductNotFound)));
}

// ── Categories ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_list_and_delete_categories() {
    let db = MockDb::new();
    let create = CreateCategoryUseCase {
        categories: db.clone(),
    };

    let tools = create
        .execute(CreateCategoryInput {
            name: " tools ".to_owned(),
            description: "Hand tools".to_owned(),
        })
        .await
        .unwrap();
    create
        .execute(CreateCategoryInput {
            name: "art".to_owned(),
            description: String::new(),
        })
        .await
        .unwrap();
    let duplicate = create
        .execute(CreateCategoryInput {
            name: "tools".to_owned(),
            description: String::new(),
        })
        .await;
    assert!(matches!(duplicate, Err(ShopError::CategoryAlreadyExists)));

    let names: Vec<String> = ListCategoriesUseCase {
        categories: db.clone(),
    }
    .execute()
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.name)
    .collect();
    assert_eq!(names, ["art", "tools"]);

    let delete = DeleteCategoryUseCase {
        categories: db.clone(),
    };
    delete.execute(tools.id).await.unwrap();
    assert!(matches!(
        delete.execute(tools.id).await,
        Err(ShopError::CategoryNotFound)
    ));
}
