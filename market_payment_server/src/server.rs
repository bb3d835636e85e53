use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use market_payment_engine::{sqlite::db::run_migrations, CartApi, CatalogApi, OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::GatewayClient,
    middleware::SignatureMiddlewareFactory,
    routes::{
        health,
        CheckoutRoute,
        ClearCartRoute,
        ConfirmOrderRoute,
        CreateCartRoute,
        CreateProductRoute,
        DeleteCartRoute,
        DeleteProductRoute,
        MyCartRoute,
        MyOrdersRoute,
        MySalesRoute,
        OrderByIdRoute,
        ProductByIdRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
    webhook_routes::GatewayWebhookRoute,
};

pub const SIGNATURE_HEADER: &str = "x-gateway-signature";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = GatewayClient::try_new(config.gateway.clone())?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let carts_api = CartApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone(), gateway.clone());
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mps::access_log"))
            .app_data(web::Data::new(carts_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(orders_api));
        // Registration order matters for the order routes: "/orders/confirm/{session_id}" must be matched before
        // "/orders/{id}" swallows "confirm" as an id.
        let api_scope = web::scope("/api")
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(CreateCartRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(DeleteCartRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase, GatewayClient>::new())
            .service(CreateProductRoute::<SqliteDatabase, GatewayClient>::new())
            .service(UpdateProductRoute::<SqliteDatabase, GatewayClient>::new())
            .service(DeleteProductRoute::<SqliteDatabase, GatewayClient>::new())
            .service(CheckoutRoute::<SqliteDatabase, GatewayClient>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase, GatewayClient>::new())
            .service(MyOrdersRoute::<SqliteDatabase, GatewayClient>::new())
            .service(OrderByIdRoute::<SqliteDatabase, GatewayClient>::new())
            .service(MySalesRoute::<SqliteDatabase, GatewayClient>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase, GatewayClient>::new());
        let webhook_scope = web::scope("/webhook")
            .wrap(SignatureMiddlewareFactory::new(
                SIGNATURE_HEADER,
                config.gateway.webhook_secret.clone(),
                config.signature_checks,
            ))
            .service(GatewayWebhookRoute::<SqliteDatabase, GatewayClient>::new());
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
