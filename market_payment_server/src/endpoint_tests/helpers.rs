use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::Utc;
use market_payment_engine::db_types::{
    Address,
    Cart,
    CartItem,
    Client,
    Order,
    OrderItem,
    OrderStatus,
    Product,
    Seller,
};
use mps_common::{Money, Secret};

use crate::{
    auth::USER_ID_HEADER,
    helpers::calculate_signature,
    middleware::SignatureMiddlewareFactory,
    server::SIGNATURE_HEADER,
};

// DO NOT re-use this secret anywhere.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_endpoint_tests_only";

pub async fn get_request(
    user_id: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::get().uri(path);
    if !user_id.is_empty() {
        req = req.insert_header((USER_ID_HEADER, user_id));
    }
    send(req, configure).await
}

pub async fn post_request(
    user_id: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !user_id.is_empty() {
        req = req.insert_header((USER_ID_HEADER, user_id));
    }
    send(req, configure).await
}

pub async fn patch_request(
    user_id: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::patch().uri(path).set_json(body);
    if !user_id.is_empty() {
        req = req.insert_header((USER_ID_HEADER, user_id));
    }
    send(req, configure).await
}

async fn send(req: TestRequest, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = body_string(res.into_body())?;
            Ok((status, body))
        },
        // Extractor and middleware failures surface as errors rather than responses in the test harness; render them
        // the way the server would.
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = body_string(res.into_body())?;
            Ok((status, body))
        },
    }
}

fn body_string<B: MessageBody>(body: B) -> Result<String, String> {
    let bytes = body.try_into_bytes().map_err(|_| "Could not read the response body".to_string())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Posts an event to `/webhook/event` behind the signature middleware, exactly as the gateway would deliver it.
pub async fn webhook_request(
    signature: Option<&str>,
    event: &serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
    let mut req = TestRequest::post()
        .uri("/webhook/event")
        .insert_header(("content-type", "application/json"))
        .set_payload(payload);
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    let scope = web::scope("/webhook")
        .wrap(SignatureMiddlewareFactory::new(
            SIGNATURE_HEADER,
            Secret::new(TEST_WEBHOOK_SECRET),
            true,
        ))
        .configure(configure);
    let app = App::new().service(scope);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = body_string(res.into_body())?;
            Ok((status, body))
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = body_string(res.into_body())?;
            Ok((status, body))
        },
    }
}

/// The signature the gateway would attach to this event body.
pub fn sign(event: &serde_json::Value) -> String {
    let payload = serde_json::to_string(event).expect("event serializes");
    calculate_signature(TEST_WEBHOOK_SECRET, payload.as_bytes())
}

//----------------------------------------   Record builders  ----------------------------------------------------

pub fn client(id: i64, user_id: &str) -> Client {
    Client {
        id,
        user_id: user_id.to_string(),
        email: Some(format!("{user_id}@example.com")),
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn seller(id: i64, user_id: &str) -> Seller {
    Seller {
        id,
        user_id: user_id.to_string(),
        display_name: format!("{user_id}'s shop"),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn address(id: i64, client_id: i64) -> Address {
    Address {
        id,
        client_id,
        line1: "1 Test Lane".to_string(),
        line2: None,
        city: "Testville".to_string(),
        postal_code: "0001".to_string(),
        country: "NL".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn product(id: i64, seller_id: i64, name: &str, price: Money, stock: i64) -> Product {
    Product {
        id,
        seller_id,
        category_id: 1,
        name: name.to_string(),
        description: None,
        image_url: None,
        price,
        stock,
        mirror_product_ref: Some(format!("prod_{id}")),
        mirror_price_ref: Some(format!("price_{id}")),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn cart(id: i64, client_id: i64) -> Cart {
    Cart { id, client_id, created_at: Utc::now(), updated_at: Utc::now() }
}

pub fn cart_item(id: i64, cart_id: i64, product_id: i64, quantity: i64) -> CartItem {
    CartItem { id, cart_id, product_id, quantity, created_at: Utc::now(), updated_at: Utc::now() }
}

pub fn order(id: i64, session_id: &str, client_id: i64, status: OrderStatus) -> Order {
    Order {
        id,
        gateway_session_id: session_id.to_string(),
        client_id,
        address_id: 3,
        total: Money::from_cents(2000),
        status,
        is_guest: false,
        email: Some("buyer@example.com".to_string()),
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn order_item(id: i64, order_id: i64, product_id: i64, name: &str, quantity: i64, unit_price: Money) -> OrderItem {
    OrderItem {
        id,
        order_id,
        product_id,
        product_name: name.to_string(),
        quantity,
        unit_price,
        created_at: Utc::now(),
    }
}
