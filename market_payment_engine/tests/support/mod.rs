//! Shared scaffolding for the integration tests: a throwaway SQLite database per test, direct-row seed helpers for
//! the account tables the engine only reads, and an in-memory stand-in for the payment gateway.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use log::*;
use market_payment_engine::{
    db_types::{CheckoutManifest, Product},
    sqlite::db::run_migrations,
    traits::{
        CheckoutLineItem,
        GatewayClientError,
        GatewaySession,
        MirrorRefs,
        MirrorUpdate,
        NewGatewaySession,
        PaymentGatewayClient,
    },
    SqliteDatabase,
};
use mps_common::Money;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_store_{}.db", rand::random::<u64>())
}

pub async fn prepare_test_db(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to the test database");
    run_migrations(db.pool()).await.expect("Error running migrations");
    db
}

//--------------------------------------   Seed helpers   ------------------------------------------------------------
// The account tables are owned by other services in production. Tests write them directly.

pub async fn seed_client(pool: &SqlitePool, user_id: &str, email: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO clients (user_id, email) VALUES ($1, $2) RETURNING id")
        .bind(user_id)
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Error seeding client");
    id
}

pub async fn seed_seller(pool: &SqlitePool, user_id: &str, display_name: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO sellers (user_id, display_name) VALUES ($1, $2) RETURNING id")
        .bind(user_id)
        .bind(display_name)
        .fetch_one(pool)
        .await
        .expect("Error seeding seller");
    id
}

pub async fn seed_address(pool: &SqlitePool, client_id: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO addresses (client_id, line1, city, postal_code, country) VALUES ($1, '1 Main St', 'Lyon', \
         '69001', 'FR') RETURNING id",
    )
    .bind(client_id)
    .fetch_one(pool)
    .await
    .expect("Error seeding address");
    id
}

/// Seeds a fully-mirrored, sellable product.
pub async fn seed_product(pool: &SqlitePool, seller_id: i64, name: &str, price: Money, stock: i64) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO products (seller_id, category_id, name, price, stock, mirror_product_ref, mirror_price_ref) \
         VALUES ($1, 1, $2, $3, $4, 'prod_' || $2, 'price_' || $2) RETURNING id",
    )
    .bind(seller_id)
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Error seeding product");
    row.0
}

pub async fn product_by_id(pool: &SqlitePool, product_id: i64) -> Option<Product> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await
        .expect("Error fetching product row")
}

//--------------------------------------   Fake gateway    -----------------------------------------------------------

#[derive(Default)]
struct GatewayState {
    next_id: u64,
    sessions: HashMap<String, (bool, CheckoutManifest)>,
    deactivated: Vec<String>,
    mirror_updates: Vec<(String, MirrorUpdate)>,
    fail_mirror_creation: bool,
    fail_mirror_pushes: bool,
}

/// An in-memory payment gateway. Sessions start unpaid; tests flip them with [`FakeGateway::mark_paid`]. Mirror
/// failures are simulated with the `fail_*` switches.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_mirror_creation(&self) {
        self.state.lock().unwrap().fail_mirror_creation = true;
    }

    pub fn fail_mirror_pushes(&self) {
        self.state.lock().unwrap().fail_mirror_pushes = true;
    }

    pub fn mark_paid(&self, session_id: &str) {
        let mut state = self.state.lock().unwrap();
        let session = state.sessions.get_mut(session_id).expect("No such session");
        session.0 = true;
    }

    pub fn deactivated(&self) -> Vec<String> {
        self.state.lock().unwrap().deactivated.clone()
    }

    pub fn mirror_updates(&self) -> Vec<(String, MirrorUpdate)> {
        self.state.lock().unwrap().mirror_updates.clone()
    }

    fn next(&self, prefix: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        format!("{prefix}_{}", state.next_id)
    }
}

impl PaymentGatewayClient for FakeGateway {
    async fn create_mirror(&self, _product: &Product) -> Result<MirrorRefs, GatewayClientError> {
        if self.state.lock().unwrap().fail_mirror_creation {
            return Err(GatewayClientError::Rejected("Simulated mirror outage".into()));
        }
        Ok(MirrorRefs { product_ref: self.next("prod"), price_ref: self.next("price") })
    }

    async fn update_mirror(&self, mirror_product_ref: &str, update: &MirrorUpdate) -> Result<(), GatewayClientError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mirror_pushes {
            return Err(GatewayClientError::Timeout);
        }
        state.mirror_updates.push((mirror_product_ref.to_string(), update.clone()));
        Ok(())
    }

    async fn create_mirror_price(&self, _mirror_product_ref: &str, _price: Money) -> Result<String, GatewayClientError> {
        if self.state.lock().unwrap().fail_mirror_pushes {
            return Err(GatewayClientError::Timeout);
        }
        Ok(self.next("price"))
    }

    async fn deactivate_mirror(&self, mirror_product_ref: &str) -> Result<(), GatewayClientError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mirror_pushes {
            return Err(GatewayClientError::Timeout);
        }
        state.deactivated.push(mirror_product_ref.to_string());
        Ok(())
    }

    async fn create_checkout_session(
        &self,
        _line_items: &[CheckoutLineItem],
        manifest: &CheckoutManifest,
    ) -> Result<NewGatewaySession, GatewayClientError> {
        let session_id = self.next("cs");
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(session_id.clone(), (false, manifest.clone()));
        let redirect_url = format!("https://gateway.test/pay/{session_id}");
        Ok(NewGatewaySession { session_id, redirect_url })
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<GatewaySession>, GatewayClientError> {
        let state = self.state.lock().unwrap();
        let session = state.sessions.get(session_id).map(|(paid, manifest)| GatewaySession {
            session_id: session_id.to_string(),
            paid: *paid,
            manifest: Some(manifest.clone()),
        });
        Ok(session)
    }
}
