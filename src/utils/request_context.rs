//! Request context extraction from HTTP request headers.

use axum::http::{HeaderMap, header};
use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::domain::entities::RequestContext;

/// Builds a [`RequestContext`] from request headers and the peer address.
///
/// When `behind_proxy` is set the client IP is read from the first
/// `X-Forwarded-For` entry, then `X-Real-IP`, before falling back to the
/// peer address. Header values that are not valid UTF-8 are skipped.
/// Repeated fields are joined: `Cookie` with `"; "` (HTTP/2 clients send
/// one field per cookie), everything else with `", "`.
///
/// # Examples
///
/// ```ignore
/// let ctx = request_context(&headers, Some(peer.ip()), false);
/// assert_eq!(ctx.ip_address.as_deref(), Some("127.0.0.1"));
/// ```
pub fn request_context(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> RequestContext {
    let forwarded = if behind_proxy {
        forwarded_ip(headers)
    } else {
        None
    };

    let ip_address = forwarded.or_else(|| peer.map(|ip| ip.to_string()));

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut joined: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };

        joined
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(if *name == header::COOKIE { "; " } else { ", " });
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    RequestContext {
        ip_address,
        user_agent,
        headers: joined,
    }
}

/// Extracts the client IP reported by a reverse proxy.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| ip.parse::<IpAddr>().is_ok());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| ip.parse::<IpAddr>().is_ok())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<IpAddr> {
        "127.0.0.1".parse().ok()
    }

    #[test]
    fn test_peer_ip_and_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let ctx = request_context(&headers, peer(), false);

        assert_eq!(ctx.ip_address.as_deref(), Some("127.0.0.1"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(ctx.header("User-Agent"), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_forwarded_for_ignored_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        let ctx = request_context(&headers, peer(), false);
        assert_eq!(ctx.ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_forwarded_for_first_entry_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let ctx = request_context(&headers, peer(), true);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));

        let ctx = request_context(&headers, peer(), true);
        assert_eq!(ctx.ip_address.as_deref(), Some("198.51.100.2"));
    }

    #[test]
    fn test_invalid_forwarded_ip_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));

        let ctx = request_context(&headers, peer(), true);
        assert_eq!(ctx.ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_split_cookie_fields_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("exm_analytics=abc"));

        let ctx = request_context(&headers, peer(), false);

        assert_eq!(ctx.header("cookie"), Some("theme=dark; exm_analytics=abc"));
        assert_eq!(ctx.cookie("exm_analytics"), Some("abc"));
        assert_eq!(ctx.cookie("theme"), Some("dark"));
    }

    #[test]
    fn test_repeated_headers_are_comma_joined() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT_LANGUAGE, HeaderValue::from_static("da"));
        headers.append(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en;q=0.8"));

        let ctx = request_context(&headers, peer(), false);

        assert_eq!(ctx.header("accept-language"), Some("da, en;q=0.8"));
    }

    #[test]
    fn test_no_peer() {
        let ctx = request_context(&HeaderMap::new(), None, false);

        assert!(ctx.ip_address.is_none());
        assert!(ctx.user_agent.is_none());
        assert!(ctx.headers.is_empty());
    }
}
