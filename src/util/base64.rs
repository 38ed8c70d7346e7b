//! Handling of Base 64-encoded data.
//!
//! There are different dialects of Base 64. This module provides a struct
//! for each flavor used within a certain context so you don’t have to
//! remember how that context uses Base 64 exactly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub use base64::DecodeError;


//------------ Tal -----------------------------------------------------------

/// The flavor used for subject public key info in trust anchor locators.
///
/// This uses the standard alphabet with padding.
pub struct Tal;

impl Tal {
    pub fn decode(self, input: &str) -> Result<Vec<u8>, DecodeError> {
        STANDARD.decode(input.trim())
    }

    pub fn encode(self, data: &[u8]) -> String {
        STANDARD.encode(data)
    }
}
