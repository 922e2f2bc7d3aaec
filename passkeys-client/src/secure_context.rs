//! Passkeys are only offered to pages served over `https`.

use url::{Host, Url};

use crate::ClientError;


/// Whether `origin` may run a passkey flow.
///
/// `https` origins always can. Plain `http` is accepted for `localhost` and loopback addresses
/// only when `allows_insecure_localhost` is set.
pub fn is_secure_context(origin: &Url, allows_insecure_localhost: bool) -> bool {
    if origin.scheme().eq_ignore_ascii_case("https") {
        return true;
    }
    allows_insecure_localhost && origin.scheme().eq_ignore_ascii_case("http") && is_localhost(origin)
}

pub(crate) fn assert_secure_context(
    origin: &Url,
    allows_insecure_localhost: bool,
) -> Result<(), ClientError> {
    if is_secure_context(origin, allows_insecure_localhost) {
        return Ok(());
    }
    log::error!("Passkeys must work under secure context, refusing {origin}");
    Err(ClientError::InsecureContext(origin.origin().ascii_serialization()))
}

fn is_localhost(origin: &Url) -> bool {
    match origin.host() {
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain.to_ascii_lowercase().ends_with(".localhost")
        }
        Some(Host::Ipv4(address)) => address.is_loopback(),
        Some(Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}
