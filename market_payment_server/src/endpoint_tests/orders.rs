use actix_web::{http::StatusCode, web};
use market_payment_engine::{db_types::OrderStatus, OrderFlowApi};
use mps_common::Money;
use serde_json::json;

use crate::{
    endpoint_tests::{
        helpers::{client, get_request, order, order_item, patch_request, seller},
        mocks::{MockGateway, MockMarketplaceDb},
    },
    routes::{MyOrdersRoute, MySalesRoute, OrderByIdRoute, UpdateOrderStatusRoute},
};

#[actix_web::test]
async fn clients_see_their_own_order_history() {
    let (status, body) = get_request("alice", "/orders", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_orders_for_client()
            .returning(|_| Ok(vec![order(77, "cs_1", 1, OrderStatus::Paid), order(42, "cs_0", 1, OrderStatus::Shipped)]));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(MyOrdersRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":77"#), "{body}");
    assert!(body.contains(r#""id":42"#), "{body}");
}

#[actix_web::test]
async fn an_order_comes_back_with_its_line_items() {
    let (status, body) = get_request("alice", "/orders/77", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_order().returning(|_| Ok(Some(order(77, "cs_1", 1, OrderStatus::Paid))));
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(1, "alice"))));
        db.expect_fetch_order_items()
            .returning(|_| Ok(vec![order_item(500, 77, 5, "Dune", 2, Money::from_cents(1000))]));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(OrderByIdRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dune"), "{body}");
}

#[actix_web::test]
async fn outsiders_cannot_view_an_order() {
    let (status, body) = get_request("mallory", "/orders/77", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_order().returning(|_| Ok(Some(order(77, "cs_1", 1, OrderStatus::Paid))));
        db.expect_fetch_client_by_user_id().returning(|_| Ok(Some(client(2, "mallory"))));
        db.expect_fetch_seller_by_user_id().returning(|_| Ok(None));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(OrderByIdRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("access"), "{body}");
}

#[actix_web::test]
async fn sellers_advance_orders_along_legal_transitions() {
    let payload = json!({ "status": "Fulfilled" });
    let (status, body) = patch_request("bob", "/orders/77/status", payload, |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_seller_by_user_id().returning(|_| Ok(Some(seller(2, "bob"))));
        db.expect_fetch_order().returning(|_| Ok(Some(order(77, "cs_1", 1, OrderStatus::Paid))));
        db.expect_seller_has_item_in_order().returning(|_, _| Ok(true));
        db.expect_update_order_status()
            .returning(|_, status| Ok(order(77, "cs_1", 1, status)));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(UpdateOrderStatusRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Fulfilled"), "{body}");
}

#[actix_web::test]
async fn illegal_transitions_are_conflicts() {
    let payload = json!({ "status": "Delivered" });
    let (status, body) = patch_request("bob", "/orders/77/status", payload, |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_seller_by_user_id().returning(|_| Ok(Some(seller(2, "bob"))));
        db.expect_fetch_order().returning(|_| Ok(Some(order(77, "cs_1", 1, OrderStatus::Paid))));
        db.expect_seller_has_item_in_order().returning(|_, _| Ok(true));
        db.expect_update_order_status().never();
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(UpdateOrderStatusRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot change from Paid to Delivered"), "{body}");
}

#[actix_web::test]
async fn only_sellers_see_the_sales_view() {
    let (status, body) = get_request("alice", "/sales", |cfg| {
        let mut db = MockMarketplaceDb::new();
        db.expect_fetch_seller_by_user_id().returning(|_| Ok(None));
        cfg.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new())))
            .service(MySalesRoute::<MockMarketplaceDb, MockGateway>::new());
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Only sellers"), "{body}");
}
