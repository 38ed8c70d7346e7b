//! Validating a signed object along its full certification path.

use std::sync::Arc;
use bytes::Bytes;
use rpki_validation::repository::cert::Cert;
use rpki_validation::repository::content::{GhostbustersRecord, OpaqueContent};
use rpki_validation::repository::sigobj::CmsSignedObject;
use rpki_validation::repository::x509::{Serial, Time};
use rpki_validation::validation::{
    checks, validate_path, PathElement, RevokedSerials, ValidationLog,
    ValidationOptions,
};

fn cert(data: &'static [u8]) -> Cert {
    Cert::decode(Bytes::from_static(data)).unwrap()
}

fn path() -> Vec<PathElement> {
    vec![
        PathElement::new("rsync://example.net/ta/ta.cer",
            cert(include_bytes!("../test-data/ta.cer"))
        ),
        PathElement::new("rsync://example.net/repo/ca.cer",
            cert(include_bytes!("../test-data/ca.cer"))
        ),
    ]
}

fn options() -> ValidationOptions {
    ValidationOptions::at(Time::utc(2027, 1, 1, 0, 0, 0))
}

const OBJECT: &str = "rsync://example.net/repo/ca/object.sig";

#[test]
fn valid_object() {
    let mut log = ValidationLog::new();
    let mut context = validate_path(&path(), &options(), &mut log).unwrap();
    let object = CmsSignedObject::<OpaqueContent>::parse_into(
        OBJECT,
        Bytes::from_static(include_bytes!("../test-data/cms/valid.sig")),
        &options().with_strict(true),
        &mut log
    ).unwrap();
    object.validate(OBJECT, &mut context, &options(), &mut log);

    assert!(!log.has_failures(), "{:?}", log.failures().collect::<Vec<_>>());
    assert!(!log.has_warnings());
    assert!(context.overclaiming().is_empty());
    assert_eq!(
        log.validated_locations().collect::<Vec<_>>(),
        [
            "rsync://example.net/ta/ta.cer",
            "rsync://example.net/repo/ca.cer",
            OBJECT,
        ]
    );
    assert!(log.get(OBJECT, checks::SIGNATURE_VERIFICATION).unwrap().is_passed());
    assert!(log.get(OBJECT, checks::CERT_NOT_REVOKED).unwrap().is_passed());
    assert!(log.get(OBJECT, checks::RESOURCE_RANGE).unwrap().is_passed());
    assert!(log.get(OBJECT, checks::CERT_KEY_USAGE).unwrap().is_passed());
    assert_eq!(object.content().as_slice(), b"\x30\x12\x0c\x10rpki test object");
}

#[test]
fn revoked_object_cert() {
    let mut path = path();
    let crl: RevokedSerials = [Serial::from(30u64)].into_iter().collect();
    path[1] = path[1].clone().with_crl(Arc::new(crl));

    let mut log = ValidationLog::new();
    let mut context = validate_path(&path, &options(), &mut log).unwrap();
    assert!(!log.has_failures());
    let object = CmsSignedObject::<OpaqueContent>::parse_into(
        OBJECT,
        Bytes::from_static(include_bytes!("../test-data/cms/valid.sig")),
        &options(),
        &mut log
    ).unwrap();
    object.validate(OBJECT, &mut context, &options(), &mut log);
    let failures = log.failures().map(|rec| rec.check()).collect::<Vec<_>>();
    assert_eq!(failures, [checks::CERT_NOT_REVOKED]);
}

#[test]
fn object_from_wrong_issuer() {
    let mut path = path();
    path.truncate(1);
    let mut log = ValidationLog::new();
    let mut context = validate_path(&path, &options(), &mut log).unwrap();
    let object = CmsSignedObject::<OpaqueContent>::parse_into(
        OBJECT,
        Bytes::from_static(include_bytes!("../test-data/cms/valid.sig")),
        &options().with_strict(true),
        &mut log
    ).unwrap();
    object.validate(OBJECT, &mut context, &options(), &mut log);
    assert!(
        log.get(OBJECT, checks::CERT_SIGNATURE_VALID).unwrap().is_failed()
    );
    assert!(
        log.get(OBJECT, checks::CERT_ISSUER_IS_PARENT_SUBJECT)
            .unwrap().is_failed()
    );
}

#[test]
fn ghostbusters_record() {
    const GBR: &str = "rsync://example.net/repo/ca/contact.gbr";
    let mut log = ValidationLog::new();
    let mut context = validate_path(&path(), &options(), &mut log).unwrap();
    let object = CmsSignedObject::<GhostbustersRecord>::parse_into(
        GBR,
        Bytes::from_static(include_bytes!("../test-data/cms/ghostbusters.sig")),
        &options(),
        &mut log
    ).unwrap();
    assert!(log.get(GBR, checks::DECODE_CONTENT).unwrap().is_passed());
    assert!(log.get(GBR, checks::ONLY_ONE_SIGNED_OBJECT).is_none());
    assert_eq!(object.content().property("EMAIL"), Some("noc@example.net"));

    object.validate(GBR, &mut context, &options(), &mut log);
    assert!(!log.has_failures(), "{:?}", log.failures().collect::<Vec<_>>());
    let warnings = log.warnings().map(|rec| rec.check()).collect::<Vec<_>>();
    assert_eq!(warnings, [checks::UNSUPPORTED_GHOSTBUSTERS_RECORD]);
    assert_eq!(
        log.get(GBR, checks::UNSUPPORTED_GHOSTBUSTERS_RECORD).unwrap()
            .location(),
        GBR
    );
}
