//! Validating certificates and signed objects.
//!
//! Validation doesn’t stop at the first problem. Instead, each check is
//! recorded in a [`ValidationLog`] together with its outcome. Checks that
//! fail mark the object as invalid, checks that only warn don’t.

//--- Re-exports
//
pub use self::chain::{
    validate_ca, validate_child, validate_ee, validate_key_usage,
    validate_path, validate_root, PathElement,
};
pub use self::context::ValidationContext;
pub use self::crl::{RevocationList, RevokedSerials};
pub use self::log::{CheckRecord, CheckStatus, ValidationLog};
pub use self::options::ValidationOptions;


//--- Modules
//
pub mod chain;
pub mod checks;
pub mod context;
pub mod crl;
pub mod log;
pub mod options;
