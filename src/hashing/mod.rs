//! BLAKE3 digests for log correlation and record fingerprints.

use blake3::Hasher;

/// First 8 bytes of the BLAKE3 hash of `data`, little-endian.
///
/// Used for short, human-readable identifiers in logs and API responses, not
/// for equality decisions.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    truncate_u64(blake3::hash(data).as_bytes())
}

#[inline]
fn truncate_u64(hash: &[u8; 32]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Incremental hash over a sequence of fields.
///
/// Each field is length-prefixed, so `("ab", "c")` and `("a", "bc")` hash
/// differently.
pub struct FieldHasher {
    inner: Hasher,
}

impl FieldHasher {
    /// Starts a hash in the given domain (e.g. `"comparison"`).
    pub fn new(domain: &str) -> Self {
        let mut hasher = Self {
            inner: Hasher::new(),
        };
        hasher.bytes(domain.as_bytes());
        hasher
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(&(data.len() as u64).to_le_bytes());
        self.inner.update(data);
        self
    }

    pub fn str(&mut self, text: &str) -> &mut Self {
        self.bytes(text.as_bytes())
    }

    pub fn opt_bool(&mut self, value: Option<bool>) -> &mut Self {
        let tag: u8 = match value {
            None => 0,
            Some(false) => 1,
            Some(true) => 2,
        };
        self.bytes(&[tag])
    }

    pub fn finish(&self) -> [u8; 32] {
        *self.inner.finalize().as_bytes()
    }

    pub fn finish_u64(&self) -> u64 {
        truncate_u64(&self.finish())
    }

    /// 16 hex digits of [`Self::finish_u64`].
    pub fn finish_hex(&self) -> String {
        format!("{:016x}", self.finish_u64())
    }
}
