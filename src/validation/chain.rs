//! Validation of certification paths.
//!
//! A path is validated edge by edge starting at a trust anchor. Each step
//! checks a certificate against the [`ValidationContext`] of its issuer and
//! records the outcome in the validation log.
//!
//! Resources are validated loosely: if a certificate claims resources its
//! issuer doesn’t have, this is only a warning. The overclaimed resources
//! are collected in the context and stay flagged for the rest of the path.

use std::sync::Arc;
use crate::repository::cert::Cert;
use crate::repository::resources::ResourceSet;
use super::checks;
use super::context::ValidationContext;
use super::crl::{RevocationList, RevokedSerials};
use super::log::ValidationLog;
use super::options::ValidationOptions;


//------------ Roles ---------------------------------------------------------

/// Validates a trust anchor certificate.
///
/// The certificate must be self-signed, currently valid, a CA certificate
/// with CA key usage, and must not inherit any resources. The returned context is for the
/// certificates issued by the trust anchor. It is returned even if checks
/// failed, so callers need to consult the log.
pub fn validate_root(
    location: &str,
    cert: Cert,
    crl: Arc<dyn RevocationList>,
    options: &ValidationOptions,
    log: &mut ValidationLog,
) -> ValidationContext {
    log.push(location);
    log.check_result(
        cert.verify_signature(cert.public_key()),
        checks::CERT_SIGNATURE_VALID
    );
    log.check_result(
        cert.verify_validity(options.validation_time),
        checks::CERT_VALIDITY_PERIOD
    );
    log.check(cert.is_ca(), checks::CERT_IS_CA);
    validate_key_usage(&cert, true, log);
    let resources = match cert.resources() {
        Some(resources) => {
            log.check_with(
                !resources.is_inherited(),
                checks::ROOT_INHERITS_RESOURCES,
                || vec![resources.to_string()]
            );
            resources.derive_resources(&ResourceSet::empty())
        }
        None => {
            log.fail(checks::CERT_HAS_RESOURCES, Vec::new());
            ResourceSet::empty()
        }
    };
    ValidationContext::new(cert, crl, resources)
}

/// Validates a CA certificate issued by the issuer of `context`.
pub fn validate_ca(
    location: &str,
    cert: &Cert,
    context: &mut ValidationContext,
    options: &ValidationOptions,
    log: &mut ValidationLog,
) {
    validate_child(location, cert, context, options, log);
    log.check(cert.is_ca(), checks::CERT_IS_CA);
    validate_key_usage(cert, true, log);
}

/// Validates an EE certificate issued by the issuer of `context`.
pub fn validate_ee(
    location: &str,
    cert: &Cert,
    context: &mut ValidationContext,
    options: &ValidationOptions,
    log: &mut ValidationLog,
) {
    validate_child(location, cert, context, options, log);
    log.check(cert.is_ee(), checks::CERT_IS_EE_CERT);
    validate_key_usage(cert, false, log);
}

/// Checks that the key usage extension fits the role of a certificate.
///
/// CA certificates need keyCertSign and cRLSign while EE certificates
/// need digitalSignature. A missing extension fails the check. The check
/// is recorded under the current location of the log.
pub fn validate_key_usage(
    cert: &Cert, ca: bool, log: &mut ValidationLog
) -> bool {
    let fits = cert.key_usage().map_or(false, |usage| {
        if ca { usage.is_ca() } else { usage.is_ee() }
    });
    log.check_with(fits, checks::CERT_KEY_USAGE, || {
        vec![if ca { "CA" } else { "EE" }.into()]
    })
}


//------------ Edges ---------------------------------------------------------

/// Validates a certificate against the context of its issuer.
///
/// This performs the checks common to all certificates: signature,
/// validity, issuer linkage, revocation, and resources. If the
/// certificate claims resources not available in the context, a warning
/// is recorded and the overclaimed resources are added to the context.
///
/// Returns the effective resources of the certificate.
pub fn validate_child(
    location: &str,
    child: &Cert,
    context: &mut ValidationContext,
    options: &ValidationOptions,
    log: &mut ValidationLog,
) -> ResourceSet {
    log.push(location);
    let issuer = context.issuer();
    log.check_result(
        child.verify_signature(issuer.public_key()),
        checks::CERT_SIGNATURE_VALID
    );
    log.check_result(
        child.verify_validity(options.validation_time),
        checks::CERT_VALIDITY_PERIOD
    );
    log.check_result(
        child.verify_issuer_name(issuer),
        checks::CERT_ISSUER_IS_PARENT_SUBJECT
    );
    if !child.is_root() {
        log.check_result(
            child.verify_issuer_key(issuer),
            checks::CERT_AKI_MATCHES_PARENT_SKI
        );
    }
    log.check_with(
        !context.crl().is_revoked(child.serial_number()),
        checks::CERT_NOT_REVOKED,
        || vec![child.serial_number().to_string()]
    );
    validate_resources(child, context, log)
}

/// Checks the resources of a child against those of the context.
fn validate_resources(
    child: &Cert,
    context: &mut ValidationContext,
    log: &mut ValidationLog,
) -> ResourceSet {
    let Some(descriptor) = child.resources() else {
        log.fail(checks::CERT_HAS_RESOURCES, Vec::new());
        return ResourceSet::empty()
    };
    let effective = descriptor.derive_resources(context.resources());
    if child.is_root() {
        log.check(
            !descriptor.is_inherited(), checks::ROOT_INHERITS_RESOURCES
        );
    }
    else if context.resources().contains(&effective) {
        log.pass(checks::RESOURCE_RANGE);
    }
    else {
        let overclaim = effective.difference(context.resources());
        context.add_overclaiming(&overclaim);
        log.warn(checks::RESOURCE_RANGE, vec![overclaim.to_string()]);
    }
    effective
}


//------------ Paths ---------------------------------------------------------

/// A certificate on a certification path.
#[derive(Clone, Debug)]
pub struct PathElement {
    /// The location of the certificate used in the log.
    pub location: String,

    /// The certificate.
    pub cert: Cert,

    /// The revocation list issued by the certificate.
    ///
    /// This is only used for certificates that issue the next element of
    /// the path. If it is `None`, nothing is considered revoked.
    pub crl: Option<Arc<dyn RevocationList>>,
}

impl PathElement {
    pub fn new(location: impl Into<String>, cert: Cert) -> Self {
        PathElement { location: location.into(), cert, crl: None }
    }

    pub fn with_crl(self, crl: Arc<dyn RevocationList>) -> Self {
        PathElement { crl: Some(crl), ..self }
    }

    fn crl(&self) -> Arc<dyn RevocationList> {
        match self.crl {
            Some(ref crl) => crl.clone(),
            None => Arc::new(RevokedSerials::default()),
        }
    }
}

/// Validates a certification path from the trust anchor to a target.
///
/// The first element is validated as a trust anchor, all following
/// elements as children of their predecessor. The last element is
/// validated as an EE certificate if it isn’t a CA certificate. One
/// context is threaded along the path so that overclaimed resources are
/// collected across all edges.
///
/// Returns the context for the certificates issued by the last element or
/// `None` if the path is empty.
pub fn validate_path(
    path: &[PathElement],
    options: &ValidationOptions,
    log: &mut ValidationLog,
) -> Option<ValidationContext> {
    let (root, children) = path.split_first()?;
    let mut context = validate_root(
        &root.location, root.cert.clone(), root.crl(), options, log
    );
    for (idx, item) in children.iter().enumerate() {
        let is_target = idx + 1 == children.len();
        if is_target && !item.cert.is_ca() {
            validate_ee(&item.location, &item.cert, &mut context, options, log)
        }
        else {
            validate_ca(&item.location, &item.cert, &mut context, options, log)
        }
        context = context.for_child(item.cert.clone(), item.crl());
    }
    Some(context)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::x509::{Serial, Time};

    fn cert(data: &[u8]) -> Cert {
        Cert::decode(data).unwrap()
    }

    fn ta() -> Cert { cert(include_bytes!("../../test-data/ta.cer")) }
    fn ca() -> Cert { cert(include_bytes!("../../test-data/ca.cer")) }
    fn child() -> Cert { cert(include_bytes!("../../test-data/child.cer")) }
    fn ee() -> Cert { cert(include_bytes!("../../test-data/ee.cer")) }

    fn options() -> ValidationOptions {
        ValidationOptions::at(Time::utc(2027, 1, 1, 0, 0, 0))
    }

    fn set(s: &str) -> ResourceSet {
        s.parse().unwrap()
    }

    fn no_crl() -> Arc<dyn RevocationList> {
        Arc::new(RevokedSerials::new())
    }

    fn context_with(resources: &str) -> ValidationContext {
        ValidationContext::new(ca(), no_crl(), set(resources))
    }

    #[test]
    fn valid_root() {
        let mut log = ValidationLog::new();
        let context = validate_root("ta", ta(), no_crl(), &options(), &mut log);
        assert!(!log.has_failures());
        assert_eq!(
            context.resources(),
            &set("AS65000-AS65535, 10.0.0.0/8, 2001:db8::/32")
        );
        assert!(context.overclaiming().is_empty());
    }

    #[test]
    fn root_inherits_resources() {
        let mut log = ValidationLog::new();
        let root = cert(include_bytes!("../../test-data/ta-inherit.cer"));
        validate_root("ta", root, no_crl(), &options(), &mut log);
        let rec = log.get("ta", checks::ROOT_INHERITS_RESOURCES).unwrap();
        assert!(rec.is_failed());
        assert!(!log.has_warnings());
    }

    #[test]
    fn expired_root() {
        let mut log = ValidationLog::new();
        validate_root(
            "ta", ta(), no_crl(),
            &ValidationOptions::at(Time::utc(2040, 1, 1, 0, 0, 0)),
            &mut log
        );
        assert!(
            log.get("ta", checks::CERT_VALIDITY_PERIOD).unwrap().is_failed()
        );
    }

    #[test]
    fn overclaim_is_warned_and_accumulated() {
        let mut log = ValidationLog::new();
        let mut context = context_with("10.0.0.0/9, AS65000-AS65100");
        let effective = validate_child(
            "child", &child(), &mut context, &options(), &mut log
        );
        assert_eq!(effective, set("10.0.0.0/8, AS65000-AS65100"));
        let rec = log.get("child", checks::RESOURCE_RANGE).unwrap();
        assert!(rec.is_warned());
        assert_eq!(rec.params(), ["10.128.0.0/9"]);
        assert_eq!(context.overclaiming(), &set("10.128.0.0/9"));
        assert!(!log.has_failures());
    }

    #[test]
    fn contained_child_leaves_accumulator_alone() {
        let mut log = ValidationLog::new();
        let mut context = context_with("10.0.0.0/8, AS65000-AS65535");
        context.add_overclaiming(&set("192.0.2.0/24"));
        validate_child("child", &child(), &mut context, &options(), &mut log);
        assert!(
            log.get("child", checks::RESOURCE_RANGE).unwrap().is_passed()
        );
        assert_eq!(context.overclaiming(), &set("192.0.2.0/24"));
        assert!(!log.has_warnings());
    }

    #[test]
    fn overclaim_across_two_edges() {
        let mut log = ValidationLog::new();
        let mut context = context_with("10.0.0.0/9, AS65000-AS65100");
        validate_ca("child", &child(), &mut context, &options(), &mut log);
        let mut context = context.for_child(child(), no_crl());
        assert_eq!(context.resources(), &set("10.0.0.0/8, AS65000-AS65100"));

        let mut other = context.clone();
        other.add_overclaiming(&set("AS1"));
        context.add_overclaiming(&set("2001:db8::/32"));
        assert_eq!(
            context.overclaiming(), &set("10.128.0.0/9, 2001:db8::/32")
        );
        assert_eq!(other.overclaiming(), &set("AS1, 10.128.0.0/9"));
    }

    #[test]
    fn revoked_child() {
        let mut log = ValidationLog::new();
        let crl: RevokedSerials = [Serial::from(20u64)].into_iter().collect();
        let mut context = ValidationContext::new(
            ca(), Arc::new(crl), set("10.0.0.0/8, AS65000-AS65100")
        );
        validate_child("child", &child(), &mut context, &options(), &mut log);
        let rec = log.get("child", checks::CERT_NOT_REVOKED).unwrap();
        assert!(rec.is_failed());
        assert_eq!(rec.params(), ["20"]);
    }

    #[test]
    fn wrong_issuer() {
        let mut log = ValidationLog::new();
        let mut context = ValidationContext::new(
            ta(), no_crl(), set("10.0.0.0/8, AS65000-AS65100")
        );
        validate_child("child", &child(), &mut context, &options(), &mut log);
        for check in [
            checks::CERT_SIGNATURE_VALID,
            checks::CERT_ISSUER_IS_PARENT_SUBJECT,
            checks::CERT_AKI_MATCHES_PARENT_SKI,
        ] {
            assert!(log.get("child", check).unwrap().is_failed(), "{}", check);
        }
    }

    #[test]
    fn ee_role() {
        let mut log = ValidationLog::new();
        let mut context = context_with("10.0.0.0/9, AS65000-AS65100");
        validate_ee("ee", &ee(), &mut context, &options(), &mut log);
        assert!(!log.has_failures());
        assert!(!log.has_warnings());

        let mut log = ValidationLog::new();
        validate_ee("ca", &child(), &mut context, &options(), &mut log);
        assert!(log.get("ca", checks::CERT_IS_EE_CERT).unwrap().is_failed());
        let rec = log.get("ca", checks::CERT_KEY_USAGE).unwrap();
        assert!(rec.is_failed());
        assert_eq!(rec.params(), ["EE"]);
    }

    #[test]
    fn key_usage_role() {
        let mut log = ValidationLog::with_location("x");
        assert!(validate_key_usage(&ta(), true, &mut log));
        assert!(validate_key_usage(&ca(), true, &mut log));
        assert!(validate_key_usage(&ee(), false, &mut log));
        assert!(!validate_key_usage(&ee(), true, &mut log));
        assert!(!validate_key_usage(&ca(), false, &mut log));
        let failures = log.failures().map(|rec| {
            rec.params()[0].as_str()
        }).collect::<Vec<_>>();
        assert_eq!(failures, ["CA", "EE"]);

        let mut log = ValidationLog::new();
        let mut context = context_with("10.0.0.0/9, AS65000-AS65100");
        validate_ca("ee", &ee(), &mut context, &options(), &mut log);
        let failures = log.failures().map(|rec| rec.check()).collect::<Vec<_>>();
        assert_eq!(failures, [checks::CERT_IS_CA, checks::CERT_KEY_USAGE]);
    }

    #[test]
    fn path() {
        let mut log = ValidationLog::new();
        let path = [
            PathElement::new("ta", ta()),
            PathElement::new("ca", ca()),
            PathElement::new("ee", ee()),
        ];
        let context = validate_path(&path, &options(), &mut log).unwrap();
        assert!(!log.has_failures(), "{:?}", log.failures().collect::<Vec<_>>());
        assert!(!log.has_warnings());
        assert_eq!(
            log.validated_locations().collect::<Vec<_>>(), ["ta", "ca", "ee"]
        );
        // The EE inherits IPv4 and AS resources from the CA. The CA
        // inherits IPv6 from the trust anchor but the EE has none.
        assert_eq!(context.resources(), &set("AS65000-AS65100, 10.0.0.0/9"));
        assert!(validate_path(&[], &options(), &mut log).is_none());
    }

    #[test]
    fn path_with_revoked_ca() {
        let mut log = ValidationLog::new();
        let crl: RevokedSerials = [Serial::from(10u64)].into_iter().collect();
        let path = [
            PathElement::new("ta", ta()).with_crl(Arc::new(crl)),
            PathElement::new("ca", ca()),
        ];
        validate_path(&path, &options(), &mut log);
        assert!(log.get("ca", checks::CERT_NOT_REVOKED).unwrap().is_failed());
    }
}
