use actix_web::{http::StatusCode, web};
use market_payment_engine::{traits::CartApiError, CartApi};
use serde_json::json;

use crate::{
    endpoint_tests::{
        helpers::{cart, cart_item, client, get_request, patch_request, post_request},
        mocks::MockMarketplaceDb,
    },
    routes::{ClearCartRoute, CreateCartRoute, MyCartRoute, UpdateCartItemRoute},
};

#[actix_web::test]
async fn requests_without_a_user_id_are_unauthorized() {
    let (status, body) = get_request("", "/cart", |cfg| {
        let api = CartApi::new(MockMarketplaceDb::new());
        cfg.app_data(web::Data::new(api)).service(MyCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No user id"), "{body}");
}

#[actix_web::test]
async fn a_shopper_without_a_cart_gets_a_404() {
    let (status, body) = get_request("alice", "/cart", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_cart_for_client().returning(|_| Ok(None));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(MyCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("no active cart"), "{body}");
}

#[actix_web::test]
async fn the_cart_comes_back_with_its_items() {
    let (status, body) = get_request("alice", "/cart", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_cart_for_client()
            .returning(|_| Ok(Some((cart(10, 1), vec![cart_item(100, 10, 5, 2), cart_item(101, 10, 6, 1)]))));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(MyCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":10"#), "{body}");
    assert!(body.contains(r#""product_id":5"#), "{body}");
    assert!(body.contains(r#""product_id":6"#), "{body}");
}

#[actix_web::test]
async fn a_second_cart_is_a_conflict() {
    let payload = json!({ "items": [{ "product_id": 5, "quantity": 2 }] });
    let (status, body) = post_request("alice", "/cart", payload, |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_create_cart().returning(|_, _| Err(CartApiError::CartAlreadyExists(10)));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(CreateCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already has an active cart"), "{body}");
}

#[actix_web::test]
async fn creating_a_cart_returns_201() {
    let payload = json!({ "items": [{ "product_id": 5, "quantity": 2 }] });
    let (status, body) = post_request("alice", "/cart", payload, |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_create_cart().returning(|_, _| Ok((cart(10, 1), vec![cart_item(100, 10, 5, 2)])));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(CreateCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""quantity":2"#), "{body}");
}

#[actix_web::test]
async fn item_quantities_are_changed_with_a_patch() {
    let payload = json!({ "quantity": 3 });
    let (status, body) = patch_request("alice", "/cart/items/100", payload, |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_cart_item().returning(|_| Ok(Some(cart_item(100, 10, 5, 2))));
        db.expect_fetch_cart_by_id().returning(|_| Ok(Some(cart(10, 1))));
        db.expect_set_cart_item_quantity().returning(|id, quantity| Ok(cart_item(id, 10, 5, quantity)));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(UpdateCartItemRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""quantity":3"#), "{body}");
}

#[actix_web::test]
async fn strangers_cannot_clear_someone_elses_cart() {
    let (status, body) = post_request("mallory", "/cart/10/clear", json!({}), |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(2, "mallory"))));
        db.expect_fetch_cart_by_id().returning(|_| Ok(Some(cart(10, 1))));
        cfg.app_data(web::Data::new(CartApi::new(db))).service(ClearCartRoute::<MockMarketplaceDb>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("your own cart"), "{body}");
}
