//! Lookup of the CSRF token the relying party hands out as a cookie.

use percent_encoding::percent_decode_str;

#[cfg(test)]
mod tests;

/// The cookie the relying party stores its CSRF token in.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// The header mutating requests carry the token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Find the cookie called `name` in the value of a `Cookie` header and return its percent-decoded
/// value.
///
/// Returns `None` when the cookie is absent or its value is not valid UTF-8 once decoded.
pub fn token_from_cookie_header(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .and_then(|value| percent_decode_str(value).decode_utf8().ok())
        .map(|value| value.into_owned())
}
