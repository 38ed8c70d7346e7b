//! The state carried along while walking a certification path.

use std::sync::Arc;
use crate::repository::cert::Cert;
use crate::repository::resources::ResourceSet;
use super::crl::RevocationList;


//------------ ValidationContext ---------------------------------------------

/// The context for validating certificates issued by a CA.
///
/// The context contains the issuing CA certificate, its revocation list,
/// the resources available to the certificates it issues, and the
/// resources that have been found to be overclaimed anywhere on the path
/// so far.
///
/// A context belongs to a single path walk. Cloning it provides an
/// independent copy for walking a different branch.
#[derive(Clone, Debug)]
pub struct ValidationContext {
    issuer: Cert,
    crl: Arc<dyn RevocationList>,
    resources: ResourceSet,
    overclaiming: ResourceSet,
}

impl ValidationContext {
    /// Creates a new context for the given issuer.
    pub fn new(
        issuer: Cert,
        crl: Arc<dyn RevocationList>,
        resources: ResourceSet,
    ) -> Self {
        ValidationContext {
            issuer,
            crl,
            resources,
            overclaiming: ResourceSet::empty(),
        }
    }

    /// Creates the context for certificates issued by `child`.
    ///
    /// The child’s resources are derived from the resources of this
    /// context. All overclaimed resources are carried forward.
    pub fn for_child(
        &self, child: Cert, crl: Arc<dyn RevocationList>
    ) -> Self {
        let resources = child.resources().map(|res| {
            res.derive_resources(&self.resources)
        }).unwrap_or_default();
        ValidationContext {
            issuer: child,
            crl,
            resources,
            overclaiming: self.overclaiming.clone(),
        }
    }

    pub fn issuer(&self) -> &Cert {
        &self.issuer
    }

    pub fn crl(&self) -> &dyn RevocationList {
        self.crl.as_ref()
    }

    /// Returns the resources available to issued certificates.
    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    /// Returns all resources found to be overclaimed so far.
    pub fn overclaiming(&self) -> &ResourceSet {
        &self.overclaiming
    }

    /// Adds resources to the set of overclaimed resources.
    pub fn add_overclaiming(&mut self, resources: &ResourceSet) {
        self.overclaiming = self.overclaiming.union(resources);
    }
}
