//! Client identity resolution.

use std::net::IpAddr;

/// Identity material the caller extracted from a request.
///
/// This crate never touches the HTTP layer itself; the embedding handler
/// fills in whichever of these it has and the limiter derives one stable
/// client id from them.
#[derive(Debug, Clone, Default)]
pub struct ClientDescriptor {
    /// Identity field from a parsed request body, when present.
    pub identity: Option<String>,
    /// Raw `X-Forwarded-For` header value, when present.
    pub forwarded_for: Option<String>,
    /// Peer address of the connection.
    pub remote_addr: Option<IpAddr>,
}

impl ClientDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_forwarded_for(mut self, header: impl Into<String>) -> Self {
        self.forwarded_for = Some(header.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Derive the rate-limit client id.
    ///
    /// Priority: caller-supplied identity, first forwarded-for hop, peer
    /// address. Unidentifiable clients share one anonymous bucket.
    pub fn client_id(&self) -> String {
        if let Some(identity) = self
            .identity
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return identity.to_string();
        }
        if let Some(hop) = self
            .forwarded_for
            .as_deref()
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .and_then(|h| h.parse::<IpAddr>().ok())
        {
            return format!("ip-{}", hop);
        }
        if let Some(addr) = self.remote_addr {
            return format!("ip-{}", addr);
        }
        "anonymous".to_string()
    }
}
