use uuid::Uuid;

use fusion_domain::permission::{Permission, PermissionSet};
use fusion_shop::error::ShopError;
use fusion_shop::guard::authenticate;
use fusion_shop::handlers::categories::CATALOG_ADMINS;
use fusion_shop::usecase::user::DeleteUserUseCase;

use crate::helpers::{MockDb, TEST_JWT_SECRET, TestAuth, test_user};

#[tokio::test]
async fn should_resolve_user_with_permissions() {
    let user = test_user("alice", true);
    let db = MockDb::new()
        .with_user(user.clone())
        .with_permissions(user.id, [Permission::ManageCatalog].into_iter().collect());
    let token = TestAuth::new(user.id).access_token();

    let current = authenticate(&db, &token, TEST_JWT_SECRET).await.unwrap();

    assert_eq!(current.id(), user.id);
    assert!(current.require_any(CATALOG_ADMINS).is_ok());
}

#[tokio::test]
async fn should_forbid_category_admin_without_permission() {
    let user = test_user("bob", true);
    let db = MockDb::new().with_user(user.clone());
    let token = TestAuth::new(user.id).access_token();

    let current = authenticate(&db, &token, TEST_JWT_SECRET).await.unwrap();

    assert!(current.permissions.is_empty());
    assert!(matches!(
        current.require_any(CATALOG_ADMINS),
        Err(ShopError::InsufficientPermissions)
    ));
}

#[tokio::test]
async fn should_accept_admin_for_catalog_routes() {
    let user = test_user("root", true);
    let mut permissions = PermissionSet::new();
    permissions.insert(Permission::Admin);
    let db = MockDb::new()
        .with_user(user.clone())
        .with_permissions(user.id, permissions);
    let token = TestAuth::new(user.id).access_token();

    let current = authenticate(&db, &token, TEST_JWT_SECRET).await.unwrap();

    assert!(current.require_any(CATALOG_ADMINS).is_ok());
}

#[tokio::test]
async fn should_reject_token_for_deleted_user() {
    let user = test_user("carol", true);
    let db = MockDb::new().with_user(user.clone());
    let token = TestAuth::new(user.id).access_token();

    DeleteUserUseCase { users: db.clone() }
        .execute(user.id)
        .await
        .unwrap();
    let result = authenticate(&db, &token, TEST_JWT_SECRET).await;

    assert!(matches!(result, Err(ShopError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_token_for_unknown_subject() {
    let db = MockDb::new();
    let token = TestAuth::new(Uuid::now_v7()).access_token();

    let result = authenticate(&db, &token, TEST_JWT_SECRET).await;

    assert!(matches!(result, Err(ShopError::InvalidToken)));
}
