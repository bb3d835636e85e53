use log::*;

use crate::{
    db_types::{CartItem, Client, ClientCart, NewCartItem},
    traits::{AccountManagement, CartApiError, CartManagement},
};

/// User-scoped cart operations. Every method resolves the calling user to a client profile first, and every
/// cart or item id is checked for ownership before it is touched.
#[derive(Debug, Clone)]
pub struct CartApi<B> {
    db: B,
}

impl<B> CartApi<B>
where B: CartManagement + AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    async fn client_for(&self, user_id: &str) -> Result<Client, CartApiError> {
        self.db
            .fetch_client_by_user_id(user_id)
            .await?
            .ok_or_else(|| CartApiError::ClientNotFound(user_id.to_string()))
    }

    /// The user's active cart, or `None` if they do not have one.
    pub async fn cart_for_user(&self, user_id: &str) -> Result<Option<ClientCart>, CartApiError> {
        let client = self.client_for(user_id).await?;
        let cart = self.db.fetch_cart_for_client(client.id).await?;
        Ok(cart.map(|(cart, items)| ClientCart { cart, items }))
    }

    /// Creates the user's cart with its initial items in one atomic step. Fails if a cart already exists, if any
    /// item has a quantity below 1, or if any referenced product does not exist (naming *all* missing ids).
    pub async fn create_cart(&self, user_id: &str, items: &[NewCartItem]) -> Result<ClientCart, CartApiError> {
        if items.is_empty() {
            return Err(CartApiError::EmptyCart);
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(CartApiError::InvalidQuantity(item.quantity));
        }
        let client = self.client_for(user_id).await?;
        let (cart, items) = self.db.create_cart(client.id, items).await?;
        info!("🛒 Client {} opened cart {} with {} item(s)", client.id, cart.id, items.len());
        Ok(ClientCart { cart, items })
    }

    pub async fn set_item_quantity(
        &self,
        user_id: &str,
        cart_item_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartApiError> {
        if quantity < 1 {
            return Err(CartApiError::InvalidQuantity(quantity));
        }
        let client = self.client_for(user_id).await?;
        let item =
            self.db.fetch_cart_item(cart_item_id).await?.ok_or(CartApiError::CartItemNotFound(cart_item_id))?;
        self.assert_owns_cart(&client, item.cart_id).await?;
        self.db.set_cart_item_quantity(cart_item_id, quantity).await
    }

    pub async fn delete_cart(&self, user_id: &str, cart_id: i64) -> Result<(), CartApiError> {
        let client = self.client_for(user_id).await?;
        self.assert_owns_cart(&client, cart_id).await?;
        self.db.delete_cart(cart_id).await?;
        info!("🛒 Client {} deleted cart {cart_id}", client.id);
        Ok(())
    }

    /// Empties the cart without deleting it. Returns the number of items removed.
    pub async fn clear_cart(&self, user_id: &str, cart_id: i64) -> Result<u64, CartApiError> {
        let client = self.client_for(user_id).await?;
        self.assert_owns_cart(&client, cart_id).await?;
        self.db.clear_cart(cart_id).await
    }

    async fn assert_owns_cart(&self, client: &Client, cart_id: i64) -> Result<(), CartApiError> {
        let cart = self.db.fetch_cart_by_id(cart_id).await?.ok_or(CartApiError::CartNotFound(cart_id))?;
        if cart.client_id != client.id {
            warn!("🛒 Client {} tried to access cart {cart_id}, which they do not own", client.id);
            return Err(CartApiError::Forbidden("You may only modify your own cart".into()));
        }
        Ok(())
    }
}
