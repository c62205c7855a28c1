pub mod layers;
pub mod redirect;
pub mod router;
pub mod routes;

pub use router::{AppState, catalog_router};
