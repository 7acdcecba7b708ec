use super::ResponseCache;
use crate::response::HttpResponse;

/// Cache that stores nothing, selected when caching is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl ResponseCache for NoopCache {
    fn get(&self, _key: &str) -> Option<HttpResponse> {
        None
    }

    fn set(&self, _key: &str, _response: &HttpResponse) {}

    fn delete(&self, _key: &str) {}

    fn clear(&self) {}

    fn clear_all_keys_with_prefix(&self, _prefix: &str) {}
}
