pub(crate) mod bytes;
pub(crate) mod serde;

pub mod encoding;
#[cfg(any(test, feature = "testable"))]
pub mod rand;
