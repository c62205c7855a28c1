pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod utils;

pub use config::Config;
pub use db::Database;
pub use error::CatalogError;
