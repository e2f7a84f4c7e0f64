use uuid::Uuid;

use fusion_shop::domain::types::MAX_CART_QUANTITY;
use fusion_shop::error::ShopError;
use fusion_shop::usecase::cart::{
    AddToCartInput, AddToCartUseCase, GetCartUseCase, RemoveFromCartUseCase,
};

use crate::helpers::{MockDb, test_product};

fn add_usecase(db: &MockDb) -> AddToCartUseCase<MockDb, MockDb> {
    AddToCartUseCase {
        products: db.clone(),
        carts: db.clone(),
    }
}

#[tokio::test]
async fn should_create_cart_on_first_add_with_default_quantity() {
    let product = test_product(Uuid::now_v7(), "Lamp");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();

    let cart = add_usecase(&db)
        .execute(
            user,
            AddToCartInput {
                product_id: product.id,
                quantity: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(cart.user_id, user);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, product.id);
    assert_eq!(cart.items[0].quantity, 1);

    let fetched = GetCartUseCase { carts: db.clone() }
        .execute(user)
        .await
        .unwrap();
    assert_eq!(fetched.id, cart.id);
}

#[tokio::test]
async fn should_reject_same_product_twice() {
    let product = test_product(Uuid::now_v7(), "Lamp");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();
    let usecase = add_usecase(&db);
    let input = || AddToCartInput {
        product_id: product.id,
        quantity: Some(2),
    };

    usecase.execute(user, input()).await.unwrap();
    let again = usecase.execute(user, input()).await;

    assert!(matches!(again, Err(ShopError::ProductAlreadyInCart)));
    assert_eq!(db.cart_of(user).unwrap().items.len(), 1);
}

#[tokio::test]
async fn should_reject_unknown_product_and_bad_quantity() {
    let product = test_product(Uuid::now_v7(), "Lamp");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();
    let usecase = add_usecase(&db);

    let missing = usecase
        .execute(
            user,
            AddToCartInput {
                product_id: Uuid::now_v7(),
                quantity: None,
            },
        )
        .await;
    assert!(matches!(missing, Err(ShopError::ProductNotFound)));

    for quantity in [0, -3, MAX_CART_QUANTITY + 1] {
        let result = usecase
            .execute(
                user,
                AddToCartInput {
                    product_id: product.id,
                    quantity: Some(quantity),
                },
            )
            .await;
        assert!(matches!(result, Err(ShopError::InvalidField("quantity"))));
    }
    assert!(db.cart_of(user).is_none());
}

#[tokio::test]
async fn should_remove_item_and_tolerate_missing_cart() {
    let product = test_product(Uuid::now_v7(), "Lamp");
    let db = MockDb::new().with_product(product.clone());
    let user = Uuid::now_v7();
    let remove = RemoveFromCartUseCase { carts: db.clone() };

    remove.execute(user, product.id).await.unwrap();

    add_usecase(&db)
        .execute(
            user,
            AddToCartInput {
                product_id: product.id,
                quantity: None,
            },
        )
        .await
        .unwrap();
    remove.execute(user, product.id).await.unwrap();
    remove.execute(user, product.id).await.unwrap();

    assert!(db.cart_of(user).unwrap().items.is_empty());
}

#[tokio::test]
async fn should_report_missing_cart() {
    let result = GetCartUseCase {
        carts: MockDb::new(),
    }
    .execute(Uuid::now_v7())
    .await;
    assert!(matches!(result, Err(ShopError::CartNotFound)));
}
