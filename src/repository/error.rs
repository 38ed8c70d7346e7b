//! Error handling for the `repository` module.
//!
//! Problems found while checking objects are normally recorded in a
//! validation log. The error types here are returned by the methods that
//! perform a single check so that the log can carry their message.

use std::{error, fmt};
use bcder::decode::ContentError;
use crate::crypto::keys::SignatureVerificationError;


//------------ InspectionError -----------------------------------------------

/// An object does not conform to the profile it is used under.
#[derive(Debug)]
pub struct InspectionError{
    inner: ContentError,
}

impl InspectionError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        InspectionError { inner: err.into() }
    }
}

impl From<ContentError> for InspectionError {
    fn from(err: ContentError) -> InspectionError {
        InspectionError { inner: err }
    }
}

impl From<InspectionError> for ContentError {
    fn from(err: InspectionError) -> Self {
        err.inner
    }
}

impl fmt::Display for InspectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl error::Error for InspectionError { }


//------------ VerificationError ---------------------------------------------

/// An object failed verification against its issuer or its own content.
#[derive(Debug)]
pub struct VerificationError{
    inner: ContentError,
}

impl VerificationError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        VerificationError { inner: err.into() }
    }
}

impl From<ContentError> for VerificationError {
    fn from(err: ContentError) -> VerificationError {
        VerificationError { inner: err }
    }
}

impl From<SignatureVerificationError> for VerificationError {
    fn from(_: SignatureVerificationError) -> Self {
        VerificationError::new("signature verification failed")
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl error::Error for VerificationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            VerificationError::from(SignatureVerificationError).to_string(),
            "signature verification failed"
        );
        assert_eq!(
            InspectionError::new("CA certificate").to_string(),
            "CA certificate"
        );
    }
}
