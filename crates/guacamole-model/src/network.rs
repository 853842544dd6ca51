use std::net::IpAddr;

/// Failure to determine the unit's address.
#[derive(Debug, thiserror::Error)]
#[error("Cannot resolve unit address for {host}: {message}")]
pub struct ResolveError {
    pub host: String,
    pub message: String,
}

impl ResolveError {
    #[must_use]
    pub fn new(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            message: message.into(),
        }
    }
}

/// Resolves the address other units and browsers reach this unit on.
pub trait AddressResolver: Send + Sync {
    fn unit_address(&self) -> Result<IpAddr, ResolveError>;
}
