use log::*;

use crate::{
    db_types::{
        CheckoutManifest,
        Client,
        FullOrder,
        ManifestEntry,
        NewCartItem,
        NewOrder,
        NewOrderItem,
        Order,
        OrderStatus,
        Product,
        SellerSale,
    },
    traits::{CheckoutLineItem, MarketplaceDatabase, NewGatewaySession, OrderApiError, PaymentGatewayClient},
};

/// The checkout pipeline: from "a shopper wants to pay" to "a durable order exists", plus the read surface over
/// finished orders.
///
/// Prices are **never** taken from the client. Session creation reads every unit price from the local store and
/// freezes the result into a [`CheckoutManifest`] that rides on the gateway session as opaque metadata. Finalization
/// reads the manifest back from the gateway and uses nothing else, so whatever happened to carts or prices in the
/// meantime cannot change what the shopper pays.
#[derive(Debug, Clone)]
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> OrderFlowApi<B, G>
where
    B: MarketplaceDatabase,
    G: PaymentGatewayClient,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    /// Creates a hosted checkout session for the given items, capturing current local prices into the manifest.
    ///
    /// The whole item list is validated up front: missing products are reported all at once, and each line gets an
    /// optimistic stock check so obviously-doomed checkouts fail before the shopper reaches the payment page. Stock
    /// is only *reserved* at finalization.
    pub async fn create_checkout_session(
        &self,
        user_id: &str,
        address_id: i64,
        items: &[NewCartItem],
    ) -> Result<NewGatewaySession, OrderApiError> {
        if items.is_empty() {
            return Err(OrderApiError::EmptyCheckout);
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(OrderApiError::InvalidQuantity(item.quantity));
        }
        let client = self.client_for(user_id).await?;
        let address =
            self.db.fetch_address_by_id(address_id).await?.ok_or(OrderApiError::AddressNotFound(address_id))?;
        if address.client_id != client.id {
            return Err(OrderApiError::AddressNotOwned { address_id, client_id: client.id });
        }
        let products = self.sellable_products(&items.iter().map(|i| i.product_id).collect::<Vec<_>>()).await?;
        let mut entries = Vec::with_capacity(items.len());
        let mut line_items = Vec::with_capacity(items.len());
        for item in items {
            // Present, or sellable_products would have failed.
            let Some(product) = products.iter().find(|p| p.id == item.product_id) else {
                return Err(OrderApiError::MissingProducts(vec![item.product_id]));
            };
            if product.stock < item.quantity {
                return Err(OrderApiError::InsufficientStock(product.id));
            }
            entries.push(ManifestEntry {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
            });
            line_items.push(CheckoutLineItem {
                name: product.name.clone(),
                unit_price: product.price,
                quantity: item.quantity,
            });
        }
        let manifest =
            CheckoutManifest { items: entries, client_id: Some(client.id), address_id: Some(address_id) };
        let session = self.gateway.create_checkout_session(&line_items, &manifest).await?;
        info!(
            "📦 Checkout session {} created for client {} with {} line(s), total {}",
            session.session_id,
            client.id,
            manifest.items.len(),
            manifest.total()
        );
        Ok(session)
    }

    /// Turns a *completed* checkout session into a durable order. This is the single authoritative path to order
    /// creation; it always re-fetches the session from the gateway rather than trusting anything the caller sends.
    ///
    /// Idempotent on the session id. The boolean is `true` when this call created the order, `false` when the order
    /// already existed (a redelivered webhook, or a client confirming after the webhook already landed).
    pub async fn finalize_order(&self, session_id: &str) -> Result<(FullOrder, bool), OrderApiError> {
        let session = self
            .gateway
            .fetch_checkout_session(session_id)
            .await?
            .ok_or_else(|| OrderApiError::SessionNotFound(session_id.to_string()))?;
        if !session.paid {
            return Err(OrderApiError::SessionNotCompleted(session_id.to_string()));
        }
        let manifest = session.manifest.ok_or_else(|| OrderApiError::ManifestMissing(session_id.to_string()))?;
        if manifest.items.is_empty() {
            return Err(OrderApiError::EmptyCheckout);
        }
        let client_id = manifest.client_id.ok_or_else(|| OrderApiError::ManifestMissing(session_id.to_string()))?;
        let address_id = manifest.address_id.ok_or_else(|| OrderApiError::ManifestMissing(session_id.to_string()))?;
        let client = self
            .db
            .fetch_client_by_id(client_id)
            .await?
            .ok_or_else(|| OrderApiError::ClientNotFound(client_id.to_string()))?;
        // The address may have been deleted between session creation and payment.
        let address =
            self.db.fetch_address_by_id(address_id).await?.ok_or(OrderApiError::AddressNotFound(address_id))?;
        if address.client_id != client.id {
            return Err(OrderApiError::AddressNotOwned { address_id, client_id: client.id });
        }
        let products = self.sellable_products(&manifest.product_ids()).await?;
        let mut items = Vec::with_capacity(manifest.items.len());
        for entry in &manifest.items {
            let Some(product) = products.iter().find(|p| p.id == entry.product_id) else {
                return Err(OrderApiError::MissingProducts(vec![entry.product_id]));
            };
            items.push(NewOrderItem {
                product_id: entry.product_id,
                product_name: product.name.clone(),
                quantity: entry.quantity,
                unit_price: entry.unit_price,
            });
        }
        let new_order = NewOrder {
            gateway_session_id: session.session_id.clone(),
            client_id,
            address_id,
            total: manifest.total(),
            is_guest: false,
            email: client.email.clone(),
            phone: client.phone.clone(),
        };
        let (order, created) = self.db.insert_order(new_order, &items).await?;
        if created {
            info!("📦 Order {} finalized from session {} with total {}", order.id, session.session_id, order.total);
            self.discard_cart(&client).await;
        } else {
            debug!("📦 Session {} was already finalized as order {}. Nothing to do.", session.session_id, order.id);
        }
        let items = self.db.fetch_order_items(order.id).await?;
        Ok((FullOrder { order, items }, created))
    }

    /// One order with its line items, visible to the buying client and to any seller with a product in it.
    pub async fn order_for_user(&self, user_id: &str, order_id: i64) -> Result<FullOrder, OrderApiError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderApiError::OrderNotFound(order_id))?;
        self.assert_may_view(user_id, &order).await?;
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(FullOrder { order, items })
    }

    /// The calling client's order history, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError> {
        let client = self.client_for(user_id).await?;
        self.db.fetch_orders_for_client(client.id).await
    }

    /// Every sold line item referencing one of the calling seller's products.
    pub async fn sales_for_user(&self, user_id: &str) -> Result<Vec<SellerSale>, OrderApiError> {
        let seller = self
            .db
            .fetch_seller_by_user_id(user_id)
            .await?
            .ok_or_else(|| OrderApiError::Forbidden("Only sellers may view sales".into()))?;
        self.db.fetch_sales_for_seller(seller.id).await
    }

    /// Moves an order along the fulfilment workflow. Only a seller with a product in the order may do this, and only
    /// along a legal transition.
    pub async fn update_status_for_user(
        &self,
        user_id: &str,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order, OrderApiError> {
        let seller = self
            .db
            .fetch_seller_by_user_id(user_id)
            .await?
            .ok_or_else(|| OrderApiError::Forbidden("Only sellers may update order status".into()))?;
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderApiError::OrderNotFound(order_id))?;
        if !self.db.seller_has_item_in_order(order_id, seller.id).await? {
            warn!("📦 Seller {} tried to update order {order_id}, which holds none of their products", seller.id);
            return Err(OrderApiError::Forbidden("You may only update orders containing your products".into()));
        }
        let from = order.status;
        if !from.can_transition_to(status) {
            return Err(OrderApiError::InvalidStatusTransition { from, to: status });
        }
        let order = self.db.update_order_status(order_id, status).await?;
        info!("📦 Seller {} moved order {order_id} from {from} to {status}", seller.id);
        Ok(order)
    }

    async fn client_for(&self, user_id: &str) -> Result<Client, OrderApiError> {
        self.db
            .fetch_client_by_user_id(user_id)
            .await?
            .ok_or_else(|| OrderApiError::ClientNotFound(user_id.to_string()))
    }

    /// Fetches the named products and fails with the complete list of ids that do not resolve to a sellable product.
    async fn sellable_products(&self, product_ids: &[i64]) -> Result<Vec<Product>, OrderApiError> {
        let products = self.db.fetch_products_by_ids(product_ids).await?;
        let mut missing: Vec<i64> =
            product_ids.iter().copied().filter(|id| !products.iter().any(|p| p.id == *id)).collect();
        missing.sort_unstable();
        missing.dedup();
        if !missing.is_empty() {
            return Err(OrderApiError::MissingProducts(missing));
        }
        Ok(products)
    }

    async fn assert_may_view(&self, user_id: &str, order: &Order) -> Result<(), OrderApiError> {
        if let Some(client) = self.db.fetch_client_by_user_id(user_id).await? {
            if client.id == order.client_id {
                return Ok(());
            }
        }
        if let Some(seller) = self.db.fetch_seller_by_user_id(user_id).await? {
            if self.db.seller_has_item_in_order(order.id, seller.id).await? {
                return Ok(());
            }
        }
        warn!("📦 User {user_id} was denied access to order {}", order.id);
        Err(OrderApiError::Forbidden("You do not have access to this order".into()))
    }

    /// The cart has served its purpose once the order exists. Failures here never fail the order.
    async fn discard_cart(&self, client: &Client) {
        match self.db.fetch_cart_for_client(client.id).await {
            Ok(Some((cart, _))) => {
                if let Err(e) = self.db.delete_cart(cart.id).await {
                    warn!("🛒 Could not discard cart {} after finalizing an order: {e}", cart.id);
                }
            },
            Ok(None) => {},
            Err(e) => warn!("🛒 Could not look up the cart for client {} after finalizing an order: {e}", client.id),
        }
    }
}
