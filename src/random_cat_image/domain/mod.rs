pub mod cache_key;
pub mod cache_store_trait;
pub mod clock;
pub mod error;
pub mod fetch_config;
pub mod image_transport_trait;
