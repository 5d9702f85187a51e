//! Client address detection behind proxies.

use std::net::SocketAddr;

use axum::http::HeaderMap;

use crate::error::AppError;

const CF_CONNECTING_IP: &str = "cf-connecting-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Picks the client address: `cf-connecting-ip`, then `x-forwarded-for`,
/// then the peer IP of the connection. The first non-empty value wins.
///
/// Header values are returned raw (trimmed only), so the same client seen
/// through different proxies may produce different strings.
pub fn extract(headers: &HeaderMap, remote: Option<SocketAddr>) -> Result<String, AppError> {
    [CF_CONNECTING_IP, X_FORWARDED_FOR]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
        .ok_or(AppError::NoAddressFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.1:5555".parse().unwrap())
    }

    #[test]
    fn test_cf_connecting_ip_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("1.1.1.1"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("2.2.2.2"));

        assert_eq!(extract(&headers, peer()).unwrap(), "1.1.1.1");
    }

    #[test]
    fn test_forwarded_for_used_when_cf_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("2.2.2.2"));

        assert_eq!(extract(&headers, peer()).unwrap(), "2.2.2.2");
    }

    #[test]
    fn test_empty_header_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static(""));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("2.2.2.2"));

        assert_eq!(extract(&headers, peer()).unwrap(), "2.2.2.2");
    }

    #[test]
    fn test_peer_address_drops_port() {
        assert_eq!(extract(&HeaderMap::new(), peer()).unwrap(), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_for_list_kept_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("3.3.3.3, 4.4.4.4"));

        assert_eq!(extract(&headers, None).unwrap(), "3.3.3.3, 4.4.4.4");
    }

    #[test]
    fn test_nothing_available() {
        let result = extract(&HeaderMap::new(), None);
        assert!(matches!(result, Err(AppError::NoAddressFound)));
    }
}
