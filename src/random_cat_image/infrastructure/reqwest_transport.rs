use crate::domain::error::FetchError;
use crate::domain::fetch_config::FetchConfig;
use crate::domain::image_transport_trait::ImageTransport;
use reqwest::blocking::Client;

/// Blocking HTTP transport. A client is built for every call so timeout and
/// user agent always come from the config being fetched.
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTransport for ReqwestTransport {
    fn fetch(&self, config: &FetchConfig) -> Result<Vec<u8>, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FetchError::transport)?;

        tracing::debug!(endpoint = %config.endpoint, timeout = config.timeout_seconds, "GET");
        let response = client
            .get(&config.endpoint)
            .send()
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::transport(format!("unexpected status {}", status)));
        }

        let bytes = response.bytes().map_err(FetchError::transport)?;
        tracing::debug!(endpoint = %config.endpoint, len = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(endpoint: String) -> FetchConfig {
        FetchConfig {
            endpoint,
            timeout_seconds: 5,
            user_agent: "random-cat-tests".to_string(),
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_fetch_returns_body_bytes() {
        let mut server = mockito::Server::new();
        let image_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let mock = server
            .mock("GET", "/v1/cat")
            .match_header("user-agent", "random-cat-tests")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(&image_data)
            .create();

        let result = ReqwestTransport::new().fetch(&config_for(format!("{}/v1/cat", server.url())));

        assert_eq!(result, Ok(image_data));
        mock.assert();
    }

    #[test]
    fn test_fetch_rejects_error_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", Matcher::Any)
            .with_status(503)
            .with_body("try later")
            .create();

        let result = ReqwestTransport::new().fetch(&config_for(server.url()));

        match result {
            Err(FetchError::FetchFailed(msg)) => {
                assert!(msg.starts_with("Failed to fetch cat image from API"));
                assert!(msg.contains("503"));
            }
            other => panic!("Expected FetchFailed, got {:?}", other),
        }
        mock.assert();
    }

    #[test]
    fn test_fetch_unreachable_endpoint() {
        // Port 1 on loopback refuses connections.
        let result = ReqwestTransport::new().fetch(&config_for("http://127.0.0.1:1/cat".to_string()));
        assert!(matches!(result, Err(FetchError::FetchFailed(_))));
    }
}
