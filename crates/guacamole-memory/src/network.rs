use std::net::IpAddr;

use guacamole_model::{AddressResolver, ResolveError};

/// [`AddressResolver`] returning a fixed address.
#[derive(Debug, Clone, Copy)]
pub struct StaticAddressResolver(pub IpAddr);

impl AddressResolver for StaticAddressResolver {
    fn unit_address(&self) -> Result<IpAddr, ResolveError> {
        Ok(self.0)
    }
}
