//! Constant-time secret comparison.
//!
//! Both inputs are first reduced to fixed-size BLAKE3 digests, so the byte
//! loop always runs over exactly [`DIGEST_LEN`] positions no matter how long
//! either input is or where they first differ. Length equality is folded into
//! the result with `subtle` instead of an early return, which would otherwise
//! leak the length of the stored secret.

use subtle::ConstantTimeEq;

const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Equality check whose running time does not depend on the inputs' contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantTimeMatcher;

impl ConstantTimeMatcher {
    pub fn equals(a: &str, b: &str) -> bool {
        Self::equals_bytes(a.as_bytes(), b.as_bytes())
    }

    pub fn equals_bytes(a: &[u8], b: &[u8]) -> bool {
        let da = blake3::hash(a);
        let db = blake3::hash(b);
        let (da, db) = (da.as_bytes(), db.as_bytes());

        let mut diff = 0u8;
        for (x, y) in da.iter().zip(db.iter()).take(DIGEST_LEN) {
            diff |= x ^ y;
        }

        let same_len = (a.len() as u64).ct_eq(&(b.len() as u64));
        let same_digest = diff.ct_eq(&0u8);
        (same_len & same_digest).into()
    }
}
