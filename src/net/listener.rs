//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind the single socket shared by page traffic and the realtime channel
//! - Report bind conflicts distinctly so the operator sees the cause
//!
//! # Design Decisions
//! - No retry or backoff on bind failure

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Another process already holds the address.
    #[error("address {addr} is already in use")]
    AddrInUse {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Any other bind failure.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Bind a TCP listener on `addr` (`host:port`).
pub async fn bind(addr: &str) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| {
        let addr = addr.to_string();
        if source.kind() == io::ErrorKind::AddrInUse {
            ListenerError::AddrInUse { addr, source }
        } else {
            ListenerError::Bind { addr, source }
        }
    })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }

    Ok(listener)
}
