use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;
use fusion_shop::error::ShopError;
use fusion_shop::usecase::cart::{AddToCartInput, AddToCartUseCase};
use fusion_shop::usecase::order::{
    CreateOrderUseCase, DeleteOrderUseCase, GetOrderUseCase, ListOrdersUseCase,
    UpdateOrderStatusUseCase,
};

use crate::helpers::{MockDb, test_product};

/// A store holding `count` products, all in `user`'s cart with quantity 2.
async fn cart_with_products(user: Uuid, count: usize) -> (MockDb, Vec<Uuid>) {
    let mut db = MockDb::new();
    let mut ids = Vec::new();
    for i in 0..count {
        let product = test_product(Uuid::now_v7(), &format!("item {i}"));
        ids.push(product.id);
        db = db.with_product(product);
    }
    let add = AddToCartUseCase {
        products: db.clone(),
        carts: db.clone(),
    };
    for id in &ids {
        add.execute(
            user,
            AddToCartInput {
                product_id: *id,
                quantity: Some(2),
            },
        )
        .await
        .unwrap();
    }
    (db, ids)
}

#[tokio::test]
async fn should_move_selected_items_from_cart_into_staging_order() {
    let user = Uuid::now_v7();
    let (db, ids) = cart_with_products(user, 3).await;

    let order = CreateOrderUseCase { orders: db.clone() }
        .execute(user, vec![ids[0], ids[1], Uuid::now_v7()])
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Staging);
    let mut ordered: Vec<Uuid> = order.items.iter().map(|i| i.product_id).collect();
    ordered.sort();
    let mut expected = vec![ids[0], ids[1]];
    expected.sort();
    assert_eq!(ordered, expected);

    let remaining: Vec<Uuid> = db
        .cart_of(user)
        .unwrap()
        .items
        .iter()
        .map(|i| i.product_id)
        .collect();
    assert_eq!(remaining, [ids[2]]);
}

#[tokio::test]
async fn should_merge_repeated_checkout_into_same_staging_order() {
    let user = Uuid::now_v7();
    let (db, ids) = cart_with_products(user, 1).await;
    let create = CreateOrderUseCase { orders: db.clone() };

    let first = create.execute(user, vec![ids[0]]).await.unwrap();
    AddToCartUseCase {
        products: db.clone(),
        carts: db.clone(),
    }
    .execute(
        user,
        AddToCartInput {
            product_id: ids[0],
            quantity: Some(3),
        },
    )
    .await
    .unwrap();
    let second = create.execute(user, vec![ids[0]]).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].quantity, 5);
}

#[tokio::test]
async fn should_reject_checkout_without_cart_or_selection() {
    let user = Uuid::now_v7();
    let create = CreateOrderUseCase {
        orders: MockDb::new(),
    };

    let no_cart = create.execute(user, vec![Uuid::now_v7()]).await;
    assert!(matches!(no_cart, Err(ShopError::CartNotFound)));

    let empty = create.execute(user, vec![]).await;
    assert!(matches!(empty, Err(ShopError::InvalidField("product_ids"))));
}

#[tokio::test]
async fn should_restrict_order_access_to_owner() {
    let owner = Uuid::now_v7();
    let stranger = Uuid::now_v7();
    let (db, ids) = cart_with_products(owner, 1).await;
    let order = CreateOrderUseCase { orders: db.clone() }
        .execute(owner, ids)
        .await
        .unwrap();

    let get = GetOrderUseCase { orders: db.clone() };
    assert_eq!(get.execute(order.id, owner).await.unwrap().id, order.id);
    assert!(matches!(
        get.execute(order.id, stranger).await,
        Err(ShopError::Forbidden)
    ));
    assert!(matches!(
        get.execute(Uuid::now_v7(), owner).await,
        Err(ShopError::OrderNotFound)
    ));

    let update = UpdateOrderStatusUseCase { orders: db.clone() };
    assert!(matches!(
        update.execute(order.id, stranger, "billed").await,
        Err(ShopError::Forbidden)
    ));
    let delete = DeleteOrderUseCase { orders: db.clone() };
    assert!(matches!(
        delete.execute(order.id, stranger).await,
        Err(ShopError::Forbidden)
    ));

    assert_eq!(
        ListOrdersUseCase { orders: db.clone() }
            .execute(stranger)
            .await
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn should_overwrite_status_and_reject_unknown_values() {
    let user = Uuid::now_v7();
    let (db, ids) = cart_with_products(user, 1).await;
    let order = CreateOrderUseCase { orders: db.clone() }
        .execute(user, ids)
        .await
        .unwrap();
    let update = UpdateOrderStatusUseCase { orders: db.clone() };

    let sent = update.execute(order.id, user, "sent").await.unwrap();
    assert_eq!(sent.status, OrderStatus::Sent);
    // Overwrite, not a forward-only transition.
    let created = update.execute(order.id, user, "created").await.unwrap();
    assert_eq!(created.status, OrderStatus::Created);

    let unknown = update.execute(order.id, user, "shipped").await;
    assert!(matches!(unknown, Err(ShopError::InvalidField("status"))));
}

#[tokio::test]
async fn should_delete_own_order() {
    let user = Uuid::now_v7();
    let (db, ids) = cart_with_products(user, 1).await;
    let order = CreateOrderUseCase { orders: db.clone() }
        .execute(user, ids)
        .await
        .unwrap();

    let delete = DeleteOrderUseCase { orders: db.clone() };
    delete.execute(order.id, user).await.unwrap();

    assert!(matches!(
        delete.execute(order.id, user).await,
        Err(ShopError::OrderNotFound)
    ));
    assert!(
        ListOrdersUseCase { orders: db }
            .execute(user)
            .await
            .unwrap()
            .is_empty()
    );
}
