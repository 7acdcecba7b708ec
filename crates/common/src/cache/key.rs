//! Request fingerprints

use std::fmt::Write;

use url::Url;

/// Fingerprint for `url`: `scheme://host[:port]path[?query]`.
///
/// The port appears only when it differs from the scheme default. Fragments,
/// userinfo, headers, body and method never contribute.
pub fn cache_key(url: &Url) -> String {
    let mut key = collection_prefix(url);
    if let Some(query) = url.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// Fingerprint for an outbound request. Same as [`cache_key`] on its URL.
pub fn cache_key_for_request(request: &reqwest::Request) -> String {
    cache_key(request.url())
}

/// Fingerprint with the query removed.
///
/// Every cached page of a collection starts with this prefix, so it is what
/// mutating calls hand to
/// [`clear_all_keys_with_prefix`](super::ResponseCache::clear_all_keys_with_prefix).
pub fn collection_prefix(url: &Url) -> String {
    let mut key = String::with_capacity(url.as_str().len());
    key.push_str(url.scheme());
    key.push_str("://");
    if let Some(host) = url.host_str() {
        key.push_str(host);
    }
    if let Some(port) = url.port() {
        let _ = write!(key, ":{port}");
    }
    key.push_str(url.path());
    key
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, AUTHORIZATION};
    use reqwest::Method;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_is_scheme_host_path_query() {
        assert_eq!(
            cache_key(&url("https://api.zsapi.net/zia/api/v1/users?page=2&pageSize=100")),
            "https://api.zsapi.net/zia/api/v1/users?page=2&pageSize=100"
        );
    }

    #[test]
    fn test_key_without_query_has_no_question_mark() {
        assert_eq!(
            cache_key(&url("https://api.zsapi.net/zpa/mgmtconfig/v1/admin/customers/1")),
            "https://api.zsapi.net/zpa/mgmtconfig/v1/admin/customers/1"
        );
    }

    #[test]
    fn test_explicit_port_kept_default_port_dropped() {
        assert_eq!(cache_key(&url("http://127.0.0.1:8080/a?b=1")), "http://127.0.0.1:8080/a?b=1");
        assert_eq!(cache_key(&url("https://api.zsapi.net:443/a")), "https://api.zsapi.net/a");
    }

    #[test]
    fn test_fragment_ignored() {
        assert_eq!(cache_key(&url("https://h/p?q=1#frag")), "https://h/p?q=1");
    }

    #[test]
    fn test_request_key_ignores_method_headers_and_body() {
        let target = url("https://api.zsapi.net/zia/api/v1/locations?search=hq");

        let get = reqwest::Request::new(Method::GET, target.clone());
        let mut post = reqwest::Request::new(Method::POST, target.clone());
        post.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        *post.body_mut() = Some(reqwest::Body::from("{\"name\":\"hq\"}"));

        assert_eq!(cache_key_for_request(&get), cache_key_for_request(&post));
        assert_eq!(cache_key_for_request(&get), cache_key(&target));
    }

    #[test]
    fn test_collection_prefix_strips_query() {
        let page = url("https://api.zsapi.net/zia/api/v1/users?page=3");
        let prefix = collection_prefix(&page);
        assert_eq!(prefix, "https://api.zsapi.net/zia/api/v1/users");
        assert!(cache_key(&page).starts_with(&prefix));
    }
}
