pub mod loader;
pub mod schema;

pub use loader::{
    load_collect_config, load_service_config, parse_collect_config, parse_config_document,
    validate_collect_config,
};
pub use schema::{CollectConfig, ServiceConfig};
