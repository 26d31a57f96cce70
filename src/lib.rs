pub mod access;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod tickets;
pub mod utils;

use sqlx::PgPool;

use access::AccessEngine;
use store::PgStore;

/// Shared handler state. The pool is opened in `main` and injected here;
/// nothing in the crate reaches for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    pub engine: AccessEngine<PgStore>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        let engine = AccessEngine::new(store.clone());
        Self { store, engine }
    }
}
