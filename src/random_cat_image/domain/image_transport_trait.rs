use crate::domain::error::FetchError;
use crate::domain::fetch_config::FetchConfig;

// One outbound GET per call. Implementations keep no state between calls.
#[cfg_attr(test, mockall::automock)]
pub trait ImageTransport {
    fn fetch(&self, config: &FetchConfig) -> Result<Vec<u8>, FetchError>;
}
