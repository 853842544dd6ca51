//! Resolution of the pod's own address.

use std::net::{IpAddr, ToSocketAddrs};

use guacamole_model::{AddressResolver, ResolveError};
use tracing::debug;

/// Resolves the machine hostname to its first IPv4 address.
///
/// Inside a pod the hostname resolves to the pod IP.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameResolver;

impl AddressResolver for HostnameResolver {
    fn unit_address(&self) -> Result<IpAddr, ResolveError> {
        let host = hostname::get()
            .map_err(|e| ResolveError::new("<local>", e.to_string()))?
            .into_string()
            .map_err(|raw| ResolveError::new(raw.to_string_lossy(), "hostname is not valid UTF-8"))?;
        resolve_ipv4(&host)
    }
}

/// Resolves `host` through the system resolver, keeping the first IPv4 address.
pub fn resolve_ipv4(host: &str) -> Result<IpAddr, ResolveError> {
    let address = (host, 0)
        .to_socket_addrs()
        .map_err(|e| ResolveError::new(host, e.to_string()))?
        .map(|addr| addr.ip())
        .find(IpAddr::is_ipv4)
        .ok_or_else(|| ResolveError::new(host, "no IPv4 address"))?;
    debug!(host, %address, "Resolved unit address");
    Ok(address)
}
