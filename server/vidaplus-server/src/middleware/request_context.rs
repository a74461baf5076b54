//! Request metadata extraction
//!
//! The caller's network origin is what audit entries record. Behind a proxy
//! the first `X-Forwarded-For` hop wins, then `X-Real-IP`, then the socket
//! peer address. Header values that are not IP addresses are skipped.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};
use uuid::Uuid;

use super::REQUEST_ID_HEADER;

/// Request context containing tracing and origin information
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Unique request ID for tracing
    pub request_id: String,
    /// Caller network origin
    pub remote_addr: Option<String>,
    pub origin: Option<String>,
    pub user_agent: Option<String>,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn parse_ip(candidate: &str) -> Option<IpAddr> {
    candidate.trim().parse::<IpAddr>().ok()
}

/// Resolves the caller origin from proxy headers, falling back to the peer.
#[must_use]
pub fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next().and_then(parse_ip))
        .or_else(|| header_str(headers, "x-real-ip").as_deref().and_then(parse_ip))
        .or_else(|| peer.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
}

impl RequestContext {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            request_id: header_str(headers, REQUEST_ID_HEADER)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            remote_addr: client_origin(headers, peer),
            origin: header_str(headers, header::ORIGIN.as_str()),
            user_agent: header_str(headers, header::USER_AGENT.as_str()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([10, 0, 0, 7], 41000)))
    }

    #[test]
    fn forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_origin(&headers, peer()).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_origin(&headers, peer()).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_origin(&HeaderMap::new(), peer()).as_deref(), Some("10.0.0.7"));
        assert_eq!(client_origin(&HeaderMap::new(), None), None);
    }

    #[test]
    fn non_ip_headers_fall_through() {
        let long = "not-an-ip-".repeat(6);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(&long).unwrap());
        assert_eq!(client_origin(&headers, peer()).as_deref(), Some("10.0.0.7"));

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_origin(&headers, peer()).as_deref(), Some("198.51.100.4"));

        headers.insert("x-real-ip", HeaderValue::from_static("localhost"));
        assert_eq!(client_origin(&headers, None), None);
    }

    #[test]
    fn ipv6_hop_is_normalized() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 2001:DB8::1 , 10.0.0.1"));
        let origin = client_origin(&headers, peer()).unwrap();
        assert_eq!(origin, "2001:db8::1");
        assert!(origin.len() <= 45);
    }

    #[test]
    fn request_id_is_kept_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(RequestContext::from_headers(&headers, None).request_id, "abc-123");
        assert!(!RequestContext::from_headers(&HeaderMap::new(), None).request_id.is_empty());
    }
}
