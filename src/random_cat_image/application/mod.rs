pub mod cat_image_service;
pub mod config_resolver;
pub mod error;
