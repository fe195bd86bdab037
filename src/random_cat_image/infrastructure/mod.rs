pub mod axum_handler;
pub mod error;
pub mod file_storage;
pub mod memory_cache;
pub mod reqwest_transport;
pub mod system_clock;
