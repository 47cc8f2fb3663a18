use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 32-byte SHA-256 digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Compute a domain-separated SHA-256 hash: `H(domain || data)`.
pub fn sha256_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    Digest32(hasher.finalize().into())
}

/// Domain separation tag for raw engine response text.
pub const RAW_RESPONSE_DOMAIN_V1: &[u8] = b"TOKGRAPH_RAW_RESPONSE_V1";

/// Content key for a raw response; identical text always maps to the same key.
pub fn response_digest(raw: &str) -> Digest32 {
    sha256_domain(RAW_RESPONSE_DOMAIN_V1, raw.as_bytes())
}
