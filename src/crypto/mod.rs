//! Cryptographic primitives.
//!
//! Only verification is supported. The actual operations are done by
//! _ring._

pub use self::digest::{Digest, DigestAlgorithm};
pub use self::keys::{
    KeyIdentifier, KeyIdentifierError, PublicKey, PublicKeyFormat,
    SignatureVerificationError,
};
pub use self::signature::{RpkiSignatureAlgorithm, Signature};

pub mod digest;
pub mod keys;
pub mod signature;
