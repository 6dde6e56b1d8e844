// Adapters layer: concrete implementations for external systems (REST API, catalog, session file).

pub mod http;
pub mod openfoodfacts;
pub mod session_store;
