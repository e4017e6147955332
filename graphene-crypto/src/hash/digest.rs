use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use super::Hash;

pub fn sha256(data: &[u8]) -> Hash<32> {
    Hash::new(Sha256::digest(data).into())
}

pub fn sha512(data: &[u8]) -> Hash<64> {
    Hash::new(Sha512::digest(data).into())
}

pub fn ripemd160(data: &[u8]) -> Hash<20> {
    Hash::new(Ripemd160::digest(data).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            sha256(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            ripemd160(b"abc").to_string(),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
        assert_eq!(
            sha512(b"abc").to_string(),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }
}
