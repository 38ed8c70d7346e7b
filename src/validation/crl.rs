//! Access to revocation information.
//!
//! Parsing certificate revocation lists is not part of this crate. Instead,
//! the chain validator asks a [`RevocationList`] whether a serial number
//! has been revoked by the issuer.

use std::fmt;
use std::collections::HashSet;
use crate::repository::x509::Serial;


//------------ RevocationList ------------------------------------------------

/// The revocation information published by an issuer.
pub trait RevocationList: fmt::Debug + Send + Sync {
    /// Returns whether the certificate with the given serial is revoked.
    fn is_revoked(&self, serial: Serial) -> bool;
}


//------------ RevokedSerials ------------------------------------------------

/// A revocation list that is simply a set of serial numbers.
#[derive(Clone, Debug, Default)]
pub struct RevokedSerials(HashSet<Serial>);

impl RevokedSerials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, serial: Serial) {
        self.0.insert(serial);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl RevocationList for RevokedSerials {
    fn is_revoked(&self, serial: Serial) -> bool {
        self.0.contains(&serial)
    }
}

impl FromIterator<Serial> for RevokedSerials {
    fn from_iter<I: IntoIterator<Item = Serial>>(iter: I) -> Self {
        RevokedSerials(iter.into_iter().collect())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn revoked_serials() {
        let list: RevokedSerials = [Serial::from(1u64), Serial::from(20u64)]
            .into_iter().collect();
        assert_eq!(list.len(), 2);
        assert!(list.is_revoked(Serial::from(20u64)));
        assert!(!list.is_revoked(Serial::from(2u64)));
        assert!(RevokedSerials::new().is_empty());
    }
}
