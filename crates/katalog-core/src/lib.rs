pub mod app_config;
pub mod categories;
pub mod config;
pub mod error;
pub mod products;
pub mod query;

pub use app_config::{AppConfig, Environment};
pub use categories::{load_categories, CategorySet, CATCH_ALL_CATEGORY, MONITOR_CATEGORY};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use products::{find_by_id, NormalizedProduct, ProductId};
pub use query::{query_products, Pagination, ProductPage, ProductQuery};
