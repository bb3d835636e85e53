//----------------------------------------------   Webhooks  ----------------------------------------------------
//! Gateway event intake.
//!
//! Events arrive here after the signature middleware has verified the HMAC over the raw body. From that point on the
//! response is **always** 200 with `{"received": true}`: the gateway retries any non-2xx delivery, and redelivering
//! an event we could not process would not make it processable. Failures are logged loudly instead and the
//! finalization stays idempotent, so a later `confirm` call (or manual replay) can still land the order.
use actix_web::{web, HttpResponse};
use log::*;
use market_payment_engine::{
    traits::{MarketplaceDatabase, PaymentGatewayClient},
    OrderFlowApi,
};
use gateway_tools::{GatewayEvent, PaymentStatus};
use serde_json::json;

use crate::route;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
/// Some gateway configurations report asynchronous payment methods with this event instead of
/// [`CHECKOUT_COMPLETED`]. Both carry the session payload and both finalize the order.
pub const PAYMENT_SUCCEEDED: &str = "payment_succeeded";

route!(gateway_webhook => Post "/event" impl MarketplaceDatabase, PaymentGatewayClient);
pub async fn gateway_webhook<B, G>(
    body: web::Json<GatewayEvent>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> HttpResponse
where
    B: MarketplaceDatabase,
    G: PaymentGatewayClient,
{
    let event = body.into_inner();
    trace!("🛍️️ Received gateway event {} ({})", event.id, event.event_type);
    if event.event_type != CHECKOUT_COMPLETED && event.event_type != PAYMENT_SUCCEEDED {
        debug!("🛍️️ Ignoring gateway event type {}", event.event_type);
        return ack();
    }
    match event.checkout_session() {
        Err(e) => {
            // A completed-checkout event without a session payload is a contract violation on the gateway's side.
            error!("🚨️ Event {} claims a completed checkout but carries no session. {e}", event.id);
        },
        Ok(session) if session.payment_status == PaymentStatus::Unpaid => {
            warn!("🛍️️ Event {} reports session {} as completed but unpaid. Ignoring.", event.id, session.id);
        },
        Ok(session) => match api.finalize_order(&session.id).await {
            Ok((full_order, true)) => {
                info!(
                    "🛍️️ Session {} finalized as order {} with {} line(s).",
                    session.id,
                    full_order.order.id,
                    full_order.items.len()
                );
            },
            Ok((full_order, false)) => {
                info!("🛍️️ Session {} was already order {}. Event {} is a redelivery.", session.id, full_order.order.id, event.id);
            },
            Err(e) => {
                // Acknowledged anyway; see the module docs.
                error!("🚨️ Could not finalize session {} from event {}. {e}", session.id, event.id);
            },
        },
    }
    ack()
}

fn ack() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "received": true }))
}
