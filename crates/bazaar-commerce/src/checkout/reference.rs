//! Human-readable order reference codes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letters a reference is drawn from.
const REFERENCE_ALPHABET: &[u8] = b"QWERTYUIOPASDFGHJKLZXCVBNM";

/// Number of letters in a reference.
pub const REFERENCE_LEN: usize = 5;

/// A short uppercase code identifying an order to the customer.
///
/// Codes are random and not checked for uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Draw a fresh reference from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Draw a reference from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..REFERENCE_LEN)
            .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Wrap a code loaded from storage.
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this looks like a generated code.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == REFERENCE_LEN && self.0.bytes().all(|b| b.is_ascii_uppercase())
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
