//! Forwarded-header trust.
//!
//! # Responsibilities
//! - Adopt `X-Script-Name` / `X-Scheme` set by the fronting proxy
//! - Honor `X-Forwarded-*` headers up to the configured hop counts
//!
//! # Design Decisions
//! - Never trust existing X-Forwarded-* beyond the configured hop count
//! - A count of zero, an absent header, or a too-short chain means "ignore"
//! - Unparseable values are ignored, never rejected
//! - Pure: operates on a `RequestContext` and a `HeaderMap`, no I/O

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use percent_encoding::percent_decode;

use crate::config::ProxyTrustConfig;
use crate::http::request::RequestContext;

/// Header names read by the normalizer.
pub mod names {
    /// Prefix the fronting proxy mounts the console under.
    pub const X_SCRIPT_NAME: &str = "x-script-name";
    /// Scheme the client used to reach the fronting proxy.
    pub const X_SCHEME: &str = "x-scheme";

    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
    pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
    pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
    pub const X_FORWARDED_PORT: &str = "x-forwarded-port";
    pub const X_FORWARDED_PREFIX: &str = "x-forwarded-prefix";
}

/// Select the hop appended by the outermost of `trusted` proxies.
///
/// Each proxy appends to the right of the chain, so with `trusted` proxies
/// the value of interest is the `trusted`-th entry counted from the right.
/// Returns `None` when `trusted` is zero, the chain is shorter than
/// `trusted`, or the selected hop is empty.
pub fn trusted_hop(trusted: u32, value: Option<&str>) -> Option<&str> {
    let value = value?;
    if trusted == 0 || value.is_empty() {
        return None;
    }

    let hops: Vec<&str> = value.split(',').map(str::trim).collect();
    let trusted = trusted as usize;
    if hops.len() < trusted {
        return None;
    }

    Some(hops[hops.len() - trusted]).filter(|hop| !hop.is_empty())
}

/// Remove `prefix` from the start of `path` if `path` starts with it.
///
/// `path` is the percent-encoded request path and `prefix` the decoded
/// mount point, so `/my%20app/x` is stripped by `/my app`. The remainder
/// keeps its original encoding.
pub fn strip_script_name<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if let Some(rest) = path.strip_prefix(prefix) {
        return Some(rest);
    }
    if !path.contains('%') {
        return None;
    }

    let wanted = prefix.as_bytes();
    let bytes = path.as_bytes();
    let mut decoded = 0usize;
    let mut i = 0usize;
    while i < bytes.len() && decoded < wanted.len() {
        let step = if bytes[i] == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit)
        {
            3
        } else {
            1
        };
        let chunk: Vec<u8> = percent_decode(&bytes[i..i + step]).collect();
        if wanted.get(decoded..decoded + chunk.len()) != Some(chunk.as_slice()) {
            return None;
        }
        decoded += chunk.len();
        i += step;
    }

    if decoded == wanted.len() {
        path.get(i..)
    } else {
        None
    }
}

/// Forwarded values that were adopted into the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    pub script_name: bool,
    pub path_stripped: bool,
    pub scheme: bool,
    pub proto: bool,
    pub remote_addr: bool,
    pub host: bool,
    pub port: bool,
    pub prefix: bool,
}

impl Applied {
    /// Header names whose values were adopted.
    pub fn header_names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.script_name, names::X_SCRIPT_NAME),
            (self.scheme, names::X_SCHEME),
            (self.remote_addr, names::X_FORWARDED_FOR),
            (self.proto, names::X_FORWARDED_PROTO),
            (self.host, names::X_FORWARDED_HOST),
            (self.port, names::X_FORWARDED_PORT),
            (self.prefix, names::X_FORWARDED_PREFIX),
        ]
        .into_iter()
        .filter_map(|(applied, name)| applied.then_some(name))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn non_empty<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    header(headers, name).filter(|v| !v.is_empty())
}

fn parse_client_addr(value: &str) -> Option<IpAddr> {
    value
        .parse::<IpAddr>()
        .ok()
        .or_else(|| value.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
        .or_else(|| {
            value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .and_then(|v| v.parse::<IpAddr>().ok())
        })
}

/// Host part of a `host[:port]` value, leaving bracketed IPv6 literals intact.
fn host_without_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        // A bare IPv6 literal has several colons and no port.
        Some((name, _)) if !name.contains(':') => name,
        _ => host,
    }
}

/// Apply the fronting proxy's headers to `ctx`.
///
/// `X-Script-Name` and `X-Scheme` are always honored; the hop-count headers
/// only when `trust.fix_enabled` is set and their count is non-zero. The
/// hop-count headers are applied after, so a trusted `X-Forwarded-Proto`
/// wins over `X-Scheme`.
pub fn apply_forwarded_headers(
    ctx: &mut RequestContext,
    headers: &HeaderMap,
    trust: &ProxyTrustConfig,
) -> Applied {
    let mut applied = Applied::default();

    if let Some(script_name) = non_empty(headers, names::X_SCRIPT_NAME) {
        ctx.script_name = script_name.to_string();
        applied.script_name = true;
        match strip_script_name(&ctx.path, script_name) {
            Some(rest) => {
                ctx.path = rest.to_string();
                applied.path_stripped = true;
            }
            None => {
                tracing::debug!(
                    script_name = %script_name,
                    path = %ctx.path,
                    "X-Script-Name does not prefix the request path, leaving path unchanged"
                );
            }
        }
    }

    if let Some(scheme) = non_empty(headers, names::X_SCHEME) {
        ctx.scheme = scheme.to_string();
        applied.scheme = true;
    }

    if !trust.fix_enabled {
        return applied;
    }

    if let Some(addr) =
        trusted_hop(trust.x_for, header(headers, names::X_FORWARDED_FOR)).and_then(parse_client_addr)
    {
        ctx.remote_addr = Some(addr);
        applied.remote_addr = true;
    }

    if let Some(proto) = trusted_hop(trust.x_proto, header(headers, names::X_FORWARDED_PROTO)) {
        ctx.scheme = proto.to_ascii_lowercase();
        applied.proto = true;
    }

    if let Some(host) = trusted_hop(trust.x_host, header(headers, names::X_FORWARDED_HOST)) {
        ctx.host = Some(host.to_string());
        applied.host = true;
    }

    if let Some(port) = trusted_hop(trust.x_port, header(headers, names::X_FORWARDED_PORT))
        .and_then(|p| p.parse::<u16>().ok())
    {
        if let Some(host) = ctx.host.as_deref() {
            ctx.host = Some(format!("{}:{}", host_without_port(host), port));
            applied.port = true;
        }
    }

    if let Some(prefix) = trusted_hop(trust.x_prefix, header(headers, names::X_FORWARDED_PREFIX)) {
        ctx.script_name = prefix.trim_end_matches('/').to_string();
        applied.prefix = true;
    }

    applied
}
