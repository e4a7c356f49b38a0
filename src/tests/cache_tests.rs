//! tests/cache_tests.rs - response cache keyed by outbound request

#[cfg(test)]
mod tests {
    use crate::{
        cache::{self, CacheKey, CachedResponse, ResponseCache},
        tests::test_config,
    };
    use pretty_assertions::assert_eq;
    use reqwest::{Method, StatusCode};
    use std::{sync::Arc, time::Duration};

    fn response(status: StatusCode, body: &str) -> Arc<CachedResponse> {
        Arc::new(CachedResponse {
            status,
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn test_cache_key_generation() {
        let key = CacheKey::get("https://api.blockchair.com/bitcoin/dashboards/address/abc");

        assert_eq!(key.method, Method::GET);
        assert_eq!(
            key.to_string(),
            "GET https://api.blockchair.com/bitcoin/dashboards/address/abc"
        );
        assert_ne!(key, CacheKey::new(Method::POST, key.url.clone()));
    }

    #[tokio::test]
    async fn test_cache_hit_and_miss() {
        let cache = cache::init_cache(&test_config());
        let key = CacheKey::get("http://explorer/a");

        assert!(cache.get(&key).await.is_none());

        assert!(cache.insert(key.clone(), response(StatusCode::OK, "{}")).await);
        let hit = cache.get(&key).await.expect("entry should be cached");
        assert_eq!(hit.body, "{}");

        assert!(cache.get(&CacheKey::get("http://explorer/b")).await.is_none());
    }

    #[tokio::test]
    async fn test_only_ok_and_bad_request_are_cached() {
        let cache = ResponseCache::new(100, Duration::from_secs(60));

        assert!(cache.insert(CacheKey::get("http://x/ok"), response(StatusCode::OK, "")).await);
        assert!(
            cache
                .insert(CacheKey::get("http://x/400"), response(StatusCode::BAD_REQUEST, ""))
                .await
        );
        assert!(
            !cache
                .insert(
                    CacheKey::get("http://x/500"),
                    response(StatusCode::INTERNAL_SERVER_ERROR, "")
                )
                .await
        );
        assert!(
            !cache
                .insert(CacheKey::get("http://x/404"), response(StatusCode::NOT_FOUND, ""))
                .await
        );

        assert_eq!(cache.entry_count().await, 2);
        assert!(cache.get(&CacheKey::get("http://x/500")).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = ResponseCache::new(100, Duration::from_millis(200));
        let key = CacheKey::get("http://explorer/short-lived");

        cache.insert(key.clone(), response(StatusCode::OK, "{}")).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.ttl(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_cache_invalidate_and_clear() {
        let cache = ResponseCache::new(100, Duration::from_secs(60));
        let first = CacheKey::get("http://explorer/1");
        let second = CacheKey::get("http://explorer/2");
        cache.insert(first.clone(), response(StatusCode::OK, "1")).await;
        cache.insert(second.clone(), response(StatusCode::OK, "2")).await;

        cache.invalidate(&first).await;
        assert!(cache.get(&first).await.is_none());
        assert!(cache.get(&second).await.is_some());

        cache.clear().await;
        assert!(cache.get(&second).await.is_none());
        assert_eq!(cache.entry_count().await, 0);
    }
}
