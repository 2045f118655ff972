//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers. Session rows
//! record the client IP and User-Agent so users can tell their devices apart.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Client metadata captured when a session is created
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// User-Agent string, if the client sent one
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Extract client metadata from request headers
///
/// A missing User-Agent is recorded as `None` rather than rejected; the
/// metadata is informational only.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
pub fn extract_client_info(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    ClientInfo {
        ip: extract_client_ip(headers, direct_ip),
        user_agent,
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // X-Forwarded-For: first IP in the list is the originating client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_info() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let info = extract_client_info(&headers, None);
        assert_eq!(info.user_agent, Some("Mozilla/5.0 Test Browser".to_string()));
        assert!(info.ip.is_none());
    }

    #[test]
    fn test_extract_client_info_missing_ua() {
        let headers = HeaderMap::new();
        let info = extract_client_info(&headers, Some("10.0.0.7".parse().unwrap()));
        assert!(info.user_agent.is_none());
        assert_eq!(info.ip_string(), Some("10.0.0.7".to_string()));
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_invalid_xff_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }
}
