use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate, Seller},
    traits::{AccountManagement, CatalogApiError, CatalogManagement, MirrorRefs, MirrorUpdate, PaymentGatewayClient},
};

/// Catalog operations, including keeping the gateway mirror in step with the local store.
///
/// The two systems fail independently, so the API treats them asymmetrically:
/// * **Creation is all-or-nothing.** The local row is inserted without mirror refs (and is invisible to every read
///   path in that state), the mirror is created on the gateway, and only then are the refs attached. If the gateway
///   call fails, the row is deleted again and the caller gets an error. No other request ever observes the
///   half-created product.
/// * **Update and delete are local-first.** The local store is authoritative; mirror pushes are best-effort and a
///   failure only logs a warning. A stale mirror costs a cosmetic lag on the gateway's hosted pages, whereas failing
///   the whole request over it would block sellers on gateway uptime.
#[derive(Debug, Clone)]
pub struct CatalogApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> CatalogApi<B, G>
where
    B: CatalogManagement + AccountManagement,
    G: PaymentGatewayClient,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    async fn seller_for(&self, user_id: &str) -> Result<Seller, CatalogApiError> {
        self.db
            .fetch_seller_by_user_id(user_id)
            .await?
            .ok_or_else(|| CatalogApiError::SellerNotFound(user_id.to_string()))
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn products_by_ids(&self, product_ids: &[i64]) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products_by_ids(product_ids).await
    }

    /// Creates a product locally and mirrors it onto the gateway, with compensation on mirror failure.
    pub async fn create_product(&self, user_id: &str, product: NewProduct) -> Result<Product, CatalogApiError> {
        let seller = self.seller_for(user_id).await?;
        let product = NewProduct { seller_id: seller.id, ..product };
        let row = self.db.insert_product(product).await?;
        let refs = match self.gateway.create_mirror(&row).await {
            Ok(refs) => refs,
            Err(e) => {
                warn!("🪞 Mirror creation for product {} failed. Rolling the local row back. {e}", row.id);
                if let Err(del) = self.db.delete_product(row.id).await {
                    error!("🪞 Could not roll back product {} after mirror failure: {del}", row.id);
                }
                return Err(e.into());
            },
        };
        let product = self.db.set_mirror_refs(row.id, &refs).await?;
        info!("🪞 Product {} (\"{}\") created and mirrored as {}", product.id, product.name, refs.product_ref);
        Ok(product)
    }

    /// Applies a partial update locally, then pushes the change to the mirror on a best-effort basis.
    pub async fn update_product(
        &self,
        user_id: &str,
        product_id: i64,
        update: ProductUpdate,
    ) -> Result<Product, CatalogApiError> {
        if update.is_empty() {
            return Err(CatalogApiError::EmptyUpdate);
        }
        let seller = self.seller_for(user_id).await?;
        let existing = self.owned_product(&seller, product_id).await?;
        let price_changed = update.price.is_some_and(|p| p != existing.price);
        let mirror_update = MirrorUpdate {
            name: update.name.clone(),
            description: update.description.clone(),
            image_url: update.image_url.clone(),
        };
        let mut product = self.db.update_product(product_id, update).await?;
        let Some(product_ref) = product.mirror_product_ref.clone() else {
            // Unreachable in practice, since unmirrored rows are invisible to the fetch above.
            return Ok(product);
        };
        if !mirror_update.is_empty() {
            if let Err(e) = self.gateway.update_mirror(&product_ref, &mirror_update).await {
                warn!("🪞 Mirror update for product {product_id} failed. The mirror is stale until the next push. {e}");
            }
        }
        if price_changed {
            product = self.push_new_price(product, &product_ref).await?;
        }
        Ok(product)
    }

    /// Deletes the product locally and deactivates its mirror on a best-effort basis.
    pub async fn delete_product(&self, user_id: &str, product_id: i64) -> Result<(), CatalogApiError> {
        let seller = self.seller_for(user_id).await?;
        let product = self.owned_product(&seller, product_id).await?;
        if !self.db.delete_product(product_id).await? {
            return Err(CatalogApiError::ProductNotFound(product_id));
        }
        info!("🪞 Product {product_id} deleted by seller {}", seller.id);
        if let Some(product_ref) = product.mirror_product_ref.as_deref() {
            if let Err(e) = self.gateway.deactivate_mirror(product_ref).await {
                warn!("🪞 Could not deactivate mirror {product_ref} for deleted product {product_id}. {e}");
            }
        }
        Ok(())
    }

    async fn owned_product(&self, seller: &Seller, product_id: i64) -> Result<Product, CatalogApiError> {
        let product = self.db.fetch_product(product_id).await?.ok_or(CatalogApiError::ProductNotFound(product_id))?;
        if product.seller_id != seller.id {
            warn!("🪞 Seller {} tried to modify product {product_id}, which they do not own", seller.id);
            return Err(CatalogApiError::Forbidden("You may only modify your own products".into()));
        }
        Ok(product)
    }

    /// Mirror prices are immutable, so a repricing registers a fresh price object and swaps the stored ref.
    async fn push_new_price(&self, product: Product, product_ref: &str) -> Result<Product, CatalogApiError> {
        match self.gateway.create_mirror_price(product_ref, product.price).await {
            Ok(price_ref) => {
                let refs = MirrorRefs { product_ref: product_ref.to_string(), price_ref };
                let product = self.db.set_mirror_refs(product.id, &refs).await?;
                Ok(product)
            },
            Err(e) => {
                warn!(
                    "🪞 Could not register the new mirror price for product {}. Checkouts keep using the captured \
                     local price, so this only delays the gateway catalog. {e}",
                    product.id
                );
                Ok(product)
            },
        }
    }
}
