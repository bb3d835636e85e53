//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database
//! operations, etc.) must be expressed as futures or asynchronous functions, which get executed concurrently by
//! worker threads and thus don't block execution.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use market_payment_engine::{
    db_types::ProductUpdate,
    traits::{MarketplaceDatabase, PaymentGatewayClient},
    CartApi,
    CatalogApi,
    OrderFlowApi,
};

use crate::{
    auth::UserContext,
    data_objects::{CheckoutRequest, JsonResponse, NewCartRequest, NewProductRequest, UpdateQuantityRequest,
        UpdateStatusRequest},
    errors::ServerError,
};

// Actix cannot handle generics in handlers, so the service factories are implemented manually using the `route!`
// macro.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Carts  ----------------------------------------------------
route!(my_cart => Get "/cart" impl MarketplaceDatabase);
pub async fn my_cart<B: MarketplaceDatabase>(
    user: UserContext,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cart for {}", user.user_id);
    let cart = api
        .cart_for_user(&user.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("You have no active cart".to_string()))?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(create_cart => Post "/cart" impl MarketplaceDatabase);
pub async fn create_cart<B: MarketplaceDatabase>(
    user: UserContext,
    body: web::Json<NewCartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST cart for {}", user.user_id);
    let cart = api.create_cart(&user.user_id, &body.into_inner().items).await?;
    Ok(HttpResponse::Created().json(cart))
}

route!(update_cart_item => Patch "/cart/items/{id}" impl MarketplaceDatabase);
pub async fn update_cart_item<B: MarketplaceDatabase>(
    user: UserContext,
    path: web::Path<i64>,
    body: web::Json<UpdateQuantityRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let item_id = path.into_inner();
    debug!("💻️ PATCH cart item {item_id} for {}", user.user_id);
    let item = api.set_item_quantity(&user.user_id, item_id, body.quantity).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(delete_cart => Delete "/cart/{id}" impl MarketplaceDatabase);
pub async fn delete_cart<B: MarketplaceDatabase>(
    user: UserContext,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let cart_id = path.into_inner();
    debug!("💻️ DELETE cart {cart_id} for {}", user.user_id);
    api.delete_cart(&user.user_id, cart_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Cart deleted.")))
}

route!(clear_cart => Post "/cart/{id}/clear" impl MarketplaceDatabase);
pub async fn clear_cart<B: MarketplaceDatabase>(
    user: UserContext,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let cart_id = path.into_inner();
    debug!("💻️ POST clear cart {cart_id} for {}", user.user_id);
    let removed = api.clear_cart(&user.user_id, cart_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Removed {removed} item(s)."))))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(product_by_id => Get "/products/{id}" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn product_by_id<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET product {product_id}");
    let product = api
        .product(product_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Product {product_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn create_product<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    body: web::Json<NewProductRequest>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST product by {}", user.user_id);
    let product = api.create_product(&user.user_id, body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Patch "/products/{id}" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn update_product<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ PATCH product {product_id} by {}", user.user_id);
    let product = api.update_product(&user.user_id, product_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn delete_product<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ DELETE product {product_id} by {}", user.user_id);
    api.delete_product(&user.user_id, product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Product deleted.")))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn checkout<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST checkout for {}", user.user_id);
    let request = body.into_inner();
    let session = api.create_checkout_session(&user.user_id, request.address_id, &request.items).await?;
    Ok(HttpResponse::Ok().json(session))
}

route!(confirm_order => Post "/orders/confirm/{session_id}" impl MarketplaceDatabase, PaymentGatewayClient);
/// Client-side confirmation, called when the shopper lands on the success page. The webhook usually wins the race;
/// either way the session id is re-verified against the gateway and the same finalization path runs, so calling this
/// with a made-up or unpaid session id achieves nothing.
pub async fn confirm_order<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let session_id = path.into_inner();
    debug!("💻️ POST confirm session {session_id} for {}", user.user_id);
    let (full_order, created) = api.finalize_order(&session_id).await?;
    if created {
        info!("💻️ Session {session_id} confirmed by the client before the webhook arrived");
    }
    Ok(HttpResponse::Ok().json(full_order))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn my_orders<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", user.user_id);
    let orders = api.orders_for_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn order_by_id<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", user.user_id);
    let full_order = api.order_for_user(&user.user_id, order_id).await?;
    Ok(HttpResponse::Ok().json(full_order))
}

route!(my_sales => Get "/sales" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn my_sales<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET sales for {}", user.user_id);
    let sales = api.sales_for_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(sales))
}

route!(update_order_status => Patch "/orders/{id}/status" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn update_order_status<B: MarketplaceDatabase, G: PaymentGatewayClient>(
    user: UserContext,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH status {} for order {order_id} by {}", body.status, user.user_id);
    let order = api.update_status_for_user(&user.user_id, order_id, body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}
