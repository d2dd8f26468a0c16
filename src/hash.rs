//! Row fingerprinting for duplicate detection

use blake3::Hasher;

/// Number of hex characters in a fingerprint
pub const FINGERPRINT_LEN: usize = 64;

/// Computes deterministic fingerprints over a row's positional values
///
/// Column names never enter the digest, only values in order. Reordering
/// columns between files therefore changes fingerprint semantics silently;
/// documented limitation, not corrected here.
#[derive(Debug, Clone, Default)]
pub struct RowFingerprinter;

impl RowFingerprinter {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint a row of string values
    ///
    /// Each value is followed by a pipe separator before hashing so that
    /// ["ab", ""] and ["a", "b"] digest differently.
    pub fn fingerprint(&self, values: &[String]) -> String {
        let mut hasher = Hasher::new();
        for value in values {
            hasher.update(value.as_bytes());
            hasher.update(b"|");
        }
        hasher.finalize().to_hex().to_string()
    }
}
