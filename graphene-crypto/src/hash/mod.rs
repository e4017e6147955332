mod digest;
#[allow(clippy::module_inception)]
mod hash;
mod serde;

pub use digest::{ripemd160, sha256, sha512};
pub use hash::Hash;
