use std::sync::Arc;
use super::error::ApplicationError;

use crate::domain::cache_key::CacheKey;
use crate::domain::cache_store_trait::CacheStore;
use crate::domain::clock::Clock;
use crate::domain::error::FetchError;
use crate::domain::fetch_config::FetchConfig;
use crate::domain::image_transport_trait::ImageTransport;
use crate::infrastructure::error::InfrastructureError;

/// Fetches a cat image and hands it back as base64 text, going through the
/// cache when the config asks for it and one was supplied.
pub struct CatImageService {
    transport: Arc<dyn ImageTransport + Send + Sync>,
    cache: Option<Arc<dyn CacheStore + Send + Sync>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl CatImageService {
    pub fn new(
        transport: Arc<dyn ImageTransport + Send + Sync>,
        cache: Option<Arc<dyn CacheStore + Send + Sync>>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { transport, cache, clock }
    }

    pub fn get(&self, config: &FetchConfig) -> Result<String, FetchError> {
        let cache = match &self.cache {
            Some(cache) if config.cache_enabled => cache,
            _ => return self.fetch_encoded(config),
        };

        let key = CacheKey::for_hour(&config.cache_key_prefix, self.clock.now());
        cache.remember(key.as_str(), config.cache_ttl(), &mut || self.fetch_encoded(config))
    }

    /// Same as [`get`](Self::get), decoded back to raw image bytes.
    pub fn get_bytes(&self, config: &FetchConfig) -> Result<Vec<u8>, ApplicationError> {
        let encoded = self.get(config)?;
        let bytes = base64::decode(encoded).map_err(InfrastructureError::Base64DecodeError)?;
        Ok(bytes)
    }

    fn fetch_encoded(&self, config: &FetchConfig) -> Result<String, FetchError> {
        tracing::info!(endpoint = %config.endpoint, "fetching cat image");
        let bytes = self.transport.fetch(config)?;
        Ok(base64::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image_transport_trait::MockImageTransport;
    use crate::infrastructure::memory_cache::InMemoryCache;
    use crate::infrastructure::system_clock::ManualClock;
    use chrono::{Local, TimeZone};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::at(Local.with_ymd_and_hms(2026, 10, 14, 9, 10, 0).unwrap()))
    }

    fn transport_returning(bytes: Vec<u8>, times: usize) -> Arc<MockImageTransport> {
        let mut transport = MockImageTransport::new();
        transport
            .expect_fetch()
            .times(times)
            .returning(move |_| Ok(bytes.clone()));
        Arc::new(transport)
    }

    fn cached_config() -> FetchConfig {
        FetchConfig {
            cache_enabled: true,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_uncached_get_fetches_every_call() {
        let service = CatImageService::new(transport_returning(vec![0x01, 0x02, 0x03], 3), None, clock());
        let config = FetchConfig::default();

        for _ in 0..3 {
            assert_eq!(service.get(&config), Ok("AQID".to_string()));
        }
    }

    #[test]
    fn test_cache_disabled_ignores_supplied_cache() {
        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let service = CatImageService::new(transport_returning(vec![1, 2, 3], 2), Some(cache.clone()), clock);

        service.get(&FetchConfig::default()).unwrap();
        service.get(&FetchConfig::default()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_enabled_without_facility_fetches_directly() {
        let service = CatImageService::new(transport_returning(vec![9], 2), None, clock());
        service.get(&cached_config()).unwrap();
        service.get(&cached_config()).unwrap();
    }

    #[test]
    fn test_same_hour_hits_cache() {
        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let service = CatImageService::new(transport_returning(vec![7, 7, 7], 1), Some(cache), clock.clone());
        let config = cached_config();

        let first = service.get(&config).unwrap();
        clock.advance(chrono::Duration::minutes(45));
        let second = service.get(&config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_next_hour_fetches_again() {
        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let service = CatImageService::new(transport_returning(vec![7], 2), Some(cache), clock.clone());
        let config = cached_config();

        service.get(&config).unwrap();
        clock.advance(chrono::Duration::minutes(50));
        service.get(&config).unwrap();
    }

    #[test]
    fn test_failure_is_not_cached() {
        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let mut transport = MockImageTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(FetchError::FetchFailed("Failed to fetch cat image from API".to_string())));
        transport
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![1, 2, 3]));
        let service = CatImageService::new(Arc::new(transport), Some(cache.clone()), clock);

        let result = service.get(&cached_config());
        assert_eq!(
            result,
            Err(FetchError::FetchFailed("Failed to fetch cat image from API".to_string()))
        );
        assert!(cache.is_empty());

        assert_eq!(service.get(&cached_config()), Ok("AQID".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_timed_out_fetch_is_not_cached() {
        use crate::infrastructure::reqwest_transport::ReqwestTransport;

        // Bound but never accepted: the connect completes through the backlog
        // and the request never gets an answer.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/cat", listener.local_addr().unwrap());

        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let service = CatImageService::new(Arc::new(ReqwestTransport::new()), Some(cache.clone()), clock);
        let config = FetchConfig {
            endpoint,
            timeout_seconds: 1,
            ..cached_config()
        };

        let started = std::time::Instant::now();
        let result = service.get(&config);

        assert!(matches!(result, Err(FetchError::FetchFailed(_))), "got {:?}", result);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(cache.is_empty());
        drop(listener);
    }

    #[test]
    fn test_get_bytes_round_trips() {
        let image = vec![0xFF, 0xD8, 0xFF, 0x00, 0x10, 0x80];
        let service = CatImageService::new(transport_returning(image.clone(), 1), None, clock());

        assert_eq!(service.get_bytes(&FetchConfig::default()).unwrap(), image);
    }

    #[test]
    fn test_concurrent_cold_key_fetches_once() {
        let clock = clock();
        let cache = Arc::new(InMemoryCache::new(clock.clone()));
        let service = Arc::new(CatImageService::new(transport_returning(vec![4, 2], 1), Some(cache), clock));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.get(&cached_config()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok("BAI=".to_string()));
        }
    }
}
