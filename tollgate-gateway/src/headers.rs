//! Header policy applied once at the gateway boundary
//!
//! Requests lose hop-by-hop headers and `Host` and gain `X-Forwarded-*`.
//! Responses lose hop-by-hop headers and every `Access-Control-*` header;
//! the gateway's own CORS layer is the single source of those.

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName, connection_listed: &[String]) -> bool {
    HOP_BY_HOP.contains(name) || connection_listed.iter().any(|n| n == name.as_str())
}

/// Header names listed in `Connection`, which are hop-by-hop for this hop only
fn connection_listed(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|n| n.trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Headers to send upstream for an inbound request
///
/// `Content-Length` is dropped too, since the body is re-sent by the client
/// library which sets its own.
pub fn outbound_request_headers(inbound: &HeaderMap, client_addr: Option<SocketAddr>) -> HeaderMap {
    let listed = connection_listed(inbound);
    let mut headers = HeaderMap::with_capacity(inbound.len() + 3);

    for (name, value) in inbound {
        if is_hop_by_hop(name, &listed) || name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(host) = inbound.get(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host.clone());
    }

    // The gateway terminates plain HTTP; a client-sent value is never trusted.
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(addr) = client_addr {
        let ip = addr.ip().to_string();
        let forwarded_for = match inbound
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
        {
            Some(existing) if !existing.trim().is_empty() => format!("{existing}, {ip}"),
            _ => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers
}

/// Headers to relay to the client for an upstream response
///
/// `Content-Length` is dropped because the body may be rewritten; the server
/// computes it again.
pub fn inbound_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(upstream);
    let mut headers = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if is_hop_by_hop(name, &listed)
            || name == header::CONTENT_LENGTH
            || name.as_str().starts_with("access-control-")
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}
