pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::cat_image_service::CatImageService;
pub use application::config_resolver::ConfigResolver;
pub use domain::error::FetchError;
pub use domain::fetch_config::{FetchConfig, PartialFetchConfig};
