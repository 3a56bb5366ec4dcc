//! Caller metadata bound into sessions.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ipnetwork::IpNetwork;

use crate::state::AppState;

/// Address recorded when no source yields one.
pub const UNKNOWN_IP: &str = "unknown";

/// User agent and client address of the current request.
///
/// The address is the socket peer. Only when that peer is one of the
/// configured trusted proxies are `X-Forwarded-For` and `X-Real-IP` consulted.
/// A missing `User-Agent` is recorded as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub ip: String,
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = header_str(&parts.headers, USER_AGENT.as_str())
            .unwrap_or_default()
            .to_string();

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self {
            user_agent,
            ip: client_ip(&parts.headers, peer, &state.config.trusted_proxies),
        })
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpNetwork]) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_IP.to_string();
    };
    if !is_trusted(peer, trusted) {
        return peer.to_string();
    }

    forwarded_client(headers, trusted)
        .or_else(|| {
            header_str(headers, "x-real-ip").and_then(|v| v.trim().parse::<IpAddr>().ok())
        })
        .unwrap_or(peer)
        .to_string()
}

/// Walk `X-Forwarded-For` from the nearest hop outwards and return the first
/// address that is not itself a trusted proxy.
fn forwarded_client(headers: &HeaderMap, trusted: &[IpNetwork]) -> Option<IpAddr> {
    let chain = header_str(headers, "x-forwarded-for")?;

    let mut outermost = None;
    for hop in chain.rsplit(',').map(str::trim) {
        let addr = hop.parse::<IpAddr>().ok()?;
        if !is_trusted(addr, trusted) {
            return Some(addr);
        }
        outermost = Some(addr);
    }
    outermost
}

fn is_trusted(addr: IpAddr, trusted: &[IpNetwork]) -> bool {
    trusted.iter().any(|net| net.contains(addr))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
