//! Signed objects.
//!
//! Signed objects are CMS signed-data structures carrying a single
//! end-entity certificate and a single signer. The [`CmsSignedObject`]
//! parser checks the envelope step by step and records each step in a
//! [`ValidationLog`], carrying on past problems where later checks still
//! make sense.
//
// See RFC 6488 and RFC 5652.

use std::mem;
use std::convert::Infallible;
use bcder::decode;
use bcder::{Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::oid;
use crate::validation::checks;
use crate::validation::chain;
use crate::validation::context::ValidationContext;
use crate::validation::log::{CheckRecord, ValidationLog};
use crate::validation::options::ValidationOptions;
use super::cert::Cert;
use super::content::{ContentEncoding, SignedContent};
use super::signer::SignatureVerifier;
use super::x509::Time;


//------------ CmsSignedObject -----------------------------------------------

/// A signed object that has passed all checks of its envelope.
///
/// The object can only be created through [`parse`][Self::parse] or
/// [`parse_into`][Self::parse_into] and only if none of the checks failed.
/// In particular, its certificate is always an EE certificate with a
/// subject key identifier.
#[derive(Clone, Debug)]
pub struct CmsSignedObject<T> {
    encoded: Bytes,
    content_type: Oid<Bytes>,
    content: T,
    signing_time: Time,
    cert: Cert,
}

/// # Data Access
///
impl<T> CmsSignedObject<T> {
    /// Returns the encoded object.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    pub fn content_type(&self) -> &Oid<Bytes> {
        &self.content_type
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the time given in the signing time attribute.
    pub fn signing_time(&self) -> Time {
        self.signing_time
    }

    /// Returns the EE certificate the object was signed with.
    pub fn cert(&self) -> &Cert {
        &self.cert
    }
}

/// # Parsing
///
impl<T: SignedContent> CmsSignedObject<T> {
    /// Parses a signed object using a new validation log.
    ///
    /// In strict mode, the envelope has to be DER encoded. Otherwise BER
    /// is accepted.
    pub fn parse(
        location: &str, bytes: Bytes, options: &ValidationOptions
    ) -> (Option<Self>, ValidationLog) {
        let mut log = ValidationLog::new();
        let res = Self::parse_into(location, bytes, options, &mut log);
        (res, log)
    }

    /// Parses a signed object recording the checks in the given log.
    ///
    /// Returns the object if none of the checks performed here failed.
    /// Failures already present in the log don’t matter.
    pub fn parse_into(
        location: &str,
        bytes: Bytes,
        options: &ValidationOptions,
        log: &mut ValidationLog,
    ) -> Option<Self> {
        let start = log.records().len();
        log.push(location);
        let mode = options.mode();

        let envelope = log.check_result(
            SignedDataEnvelope::decode(bytes.clone(), mode),
            checks::CMS_DATA_PARSING
        )?;
        let content = Self::parse_content(&envelope, mode, log);
        let cert = Self::parse_cert(&envelope, log);
        let signing_time = cert.as_ref().and_then(|cert| {
            SignatureVerifier::new(&envelope, cert).verify(log)
        });

        if log.records()[start..].iter().any(CheckRecord::is_failed) {
            return None
        }
        Some(CmsSignedObject {
            encoded: bytes,
            content_type: envelope.content_type,
            content: content?,
            signing_time: signing_time?,
            cert: cert?,
        })
    }

    /// Decodes the content and checks that there is only one object.
    fn parse_content(
        envelope: &SignedDataEnvelope, mode: Mode, log: &mut ValidationLog
    ) -> Option<T> {
        let Some(content) = envelope.content() else {
            log.fail(
                checks::DECODE_CONTENT, vec!["missing signed content".into()]
            );
            return None
        };
        let data = content.to_bytes();
        if T::ENCODING == ContentEncoding::Raw {
            return log.check_result(
                T::decode_content(envelope.content_type(), data, mode),
                checks::DECODE_CONTENT
            )
        }

        let first_len = first_value_len(&data);
        let res = log.check_result(
            T::decode_content(
                envelope.content_type(), data.slice(..first_len), mode
            ),
            checks::DECODE_CONTENT
        )?;

        let trailing = data.slice(first_len..);
        if trailing.is_empty() {
            log.pass(checks::ONLY_ONE_SIGNED_OBJECT);
        }
        else {
            let second_len = first_value_len(&trailing);
            match mode.decode(trailing.slice(..second_len), |cons| {
                cons.skip_one().map(|_| ())
            }) {
                Ok(()) => log.fail(checks::ONLY_ONE_SIGNED_OBJECT, Vec::new()),
                Err(err) => {
                    log.fail(
                        checks::CMS_CONTENT_PARSING, vec![err.to_string()]
                    )
                }
            }
        }
        Some(res)
    }

    /// Extracts the certificate and checks that it is an EE certificate.
    fn parse_cert(
        envelope: &SignedDataEnvelope, log: &mut ValidationLog
    ) -> Option<Cert> {
        let Some(certs) = envelope.certificates() else {
            log.fail(checks::GET_CERTS_AND_CRLS, Vec::new());
            return None
        };
        log.pass(checks::GET_CERTS_AND_CRLS);
        log.check_with(certs.len() == 1, checks::ONLY_ONE_CERT_ALLOWED, || {
            vec![certs.len().to_string()]
        });
        let first = certs.first().filter(|cert| {
            cert.as_slice().first() == Some(&0x30)
        });
        let Some(first) = first else {
            log.fail(checks::CERT_IS_X509CERT, Vec::new());
            return None
        };
        log.pass(checks::CERT_IS_X509CERT);

        let cert = log.check_result(
            Cert::decode(first.as_slice()), checks::CERT_PARSING
        )?;
        log.check(cert.is_ee(), checks::CERT_IS_EE_CERT);
        log.check(
            cert.subject_key_identifier().is_some(), checks::CERT_HAS_SKI
        );
        Some(cert)
    }
}

/// # Validation
///
impl<T: SignedContent> CmsSignedObject<T> {
    /// Validates the object’s certificate against its issuer.
    ///
    /// The EE certificate is validated as a child of `context` and its key
    /// usage is checked, then the content specific checks are run. All checks are recorded under
    /// `location`.
    pub fn validate(
        &self,
        location: &str,
        context: &mut ValidationContext,
        options: &ValidationOptions,
        log: &mut ValidationLog,
    ) {
        chain::validate_child(location, &self.cert, context, options, log);
        chain::validate_key_usage(&self.cert, false, log);
        self.content.validate_content(&self.cert, log);
    }
}


//------------ SignedDataEnvelope --------------------------------------------

/// The outer structure of a signed object.
///
/// ```text
/// ContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     content [0] EXPLICIT ANY DEFINED BY contentType }
///
/// SignedData ::= SEQUENCE {
///     version CMSVersion,
///     digestAlgorithms DigestAlgorithmIdentifiers,
///     encapContentInfo EncapsulatedContentInfo,
///     certificates [0] IMPLICIT CertificateSet OPTIONAL,
///     crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
///     signerInfos SignerInfos }
///
/// EncapsulatedContentInfo ::= SEQUENCE {
///     eContentType ContentType,
///     eContent [0] EXPLICIT OCTET STRING OPTIONAL }
/// ```
///
/// Decoding only checks the structure. The certificates are kept as raw
/// values and the signer infos as the raw content of their set so that
/// problems with them can be reported as separate checks.
#[derive(Clone, Debug)]
pub struct SignedDataEnvelope {
    content_type: Oid<Bytes>,
    content: Option<OctetString>,
    certificates: Option<Vec<Captured>>,
    signer_infos: Captured,
}

impl SignedDataEnvelope {
    pub fn decode(
        bytes: Bytes, mode: Mode
    ) -> Result<Self, DecodeError<Infallible>> {
        mode.decode(bytes, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| { // ContentInfo
            oid::SIGNED_DATA.skip_if(cons)?;
            cons.take_constructed_if(Tag::CTX_0, |cons| {
                cons.take_sequence(|cons| { // SignedData
                    cons.take_u8()?; // version
                    cons.take_set(|cons| cons.skip_all())?;
                    let (content_type, content) = cons.take_sequence(|cons| {
                        Ok((
                            Oid::take_from(cons)?,
                            cons.take_opt_constructed_if(
                                Tag::CTX_0, OctetString::take_from
                            )?
                        ))
                    })?;
                    let certificates = cons.take_opt_constructed_if(
                        Tag::CTX_0, take_values
                    )?;
                    cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
                        cons.skip_all()
                    })?;
                    let signer_infos = cons.take_set(|cons| {
                        cons.capture_all()
                    })?;
                    Ok(SignedDataEnvelope {
                        content_type, content, certificates, signer_infos
                    })
                })
            })
        })
    }

    /// Returns the type of the encapsulated content.
    pub fn content_type(&self) -> &Oid<Bytes> {
        &self.content_type
    }

    /// Returns the encapsulated content if present.
    pub fn content(&self) -> Option<&OctetString> {
        self.content.as_ref()
    }

    /// Returns the raw values of the certificate set if present.
    pub fn certificates(&self) -> Option<&[Captured]> {
        self.certificates.as_deref()
    }

    /// Returns the raw content of the signer infos set.
    pub fn signer_infos(&self) -> &Captured {
        &self.signer_infos
    }
}


//------------ Helper Functions ----------------------------------------------

/// Takes all remaining values of a constructed value without decoding them.
fn take_values<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<Vec<Captured>, DecodeError<S::Error>> {
    let mut res = Vec::new();
    loop {
        let mut present = false;
        let value = cons.capture(|cons| {
            present = cons.skip_one()?.is_some();
            Ok(())
        })?;
        if !present {
            return Ok(res)
        }
        res.push(value);
    }
}

/// Returns the length of the first encoded value in `data`.
///
/// Only the identifier and length octets are looked at. If they are
/// malformed, use the indefinite form, or announce more data than there
/// is, the length of all of `data` is returned and decoding will sort it
/// out.
fn first_value_len(data: &[u8]) -> usize {
    value_len(data).filter(|&len| len <= data.len()).unwrap_or(data.len())
}

fn value_len(data: &[u8]) -> Option<usize> {
    let mut pos = 1;
    if data.first()? & 0x1f == 0x1f {
        // High tag number form.
        loop {
            let octet = *data.get(pos)?;
            pos += 1;
            if octet & 0x80 == 0 {
                break
            }
        }
    }
    let first = *data.get(pos)?;
    pos += 1;
    let len = if first < 0x80 {
        usize::from(first)
    }
    else if first == 0x80 {
        return None
    }
    else {
        let count = usize::from(first & 0x7f);
        if count > mem::size_of::<usize>() {
            return None
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | usize::from(*data.get(pos)?);
            pos += 1;
        }
        len
    };
    pos.checked_add(len)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::content::{GhostbustersRecord, OpaqueContent};

    type Object = CmsSignedObject<OpaqueContent>;

    const VALID: &[u8] = include_bytes!("../../test-data/cms/valid.sig");

    fn strict() -> ValidationOptions {
        ValidationOptions::default().with_strict(true)
    }

    fn parse(data: &'static [u8]) -> (Option<Object>, ValidationLog) {
        Object::parse("rsync://example.net/repo/ca/object.sig",
            Bytes::from_static(data), &strict()
        )
    }

    fn parse_vec(data: Vec<u8>) -> (Option<Object>, ValidationLog) {
        Object::parse("rsync://example.net/repo/ca/object.sig",
            Bytes::from(data), &strict()
        )
    }

    fn failures(log: &ValidationLog) -> Vec<&str> {
        log.failures().map(|rec| rec.check()).collect()
    }

    fn status(log: &ValidationLog, check: &str) -> Option<bool> {
        log.get("rsync://example.net/repo/ca/object.sig", check).map(|rec| {
            rec.is_passed()
        })
    }

    #[test]
    fn parse_valid() {
        let (obj, log) = parse(include_bytes!("../../test-data/cms/valid.sig"));
        assert!(!log.has_failures(), "{:?}", log.failures().collect::<Vec<_>>());
        let obj = obj.unwrap();
        assert_eq!(obj.signing_time(), Time::utc(2026, 10, 18, 17, 38, 6));
        assert!(obj.content_type() == &oid::CT_ROUTE_ORIGIN_AUTHZ);
        assert_eq!(
            obj.content().as_slice(),
            b"\x30\x12\x0c\x10rpki test object"
        );
        assert_eq!(obj.cert().subject().common_name().unwrap(), "test-ee");
        assert_eq!(obj.encoded().len(), 1566);
        for check in [
            checks::CMS_DATA_PARSING, checks::DECODE_CONTENT,
            checks::ONLY_ONE_SIGNED_OBJECT, checks::GET_CERTS_AND_CRLS,
            checks::ONLY_ONE_CERT_ALLOWED, checks::CERT_IS_X509CERT,
            checks::CERT_PARSING, checks::CERT_IS_EE_CERT,
            checks::CERT_HAS_SKI, checks::GET_SIGNER_INFO,
            checks::ONLY_ONE_SIGNER, checks::DIGEST_ALGORITHM,
            checks::ENCRYPTION_ALGORITHM, checks::SIGNED_ATTRS_PRESENT,
            checks::CONTENT_TYPE_ATTR_PRESENT,
            checks::MSG_DIGEST_ATTR_PRESENT, checks::SIGNER_ID_MATCH,
            checks::SIGNING_TIME_ATTR_PRESENT,
            checks::ONLY_ONE_SIGNING_TIME_ATTR,
            checks::SIGNATURE_VERIFICATION,
        ] {
            assert_eq!(status(&log, check), Some(true), "{}", check);
        }
        assert_eq!(log.records().len(), 20);
    }

    #[test]
    fn parse_ber() {
        // Re-encode the outer sequence with indefinite length.
        assert_eq!(&VALID[..4], b"\x30\x82\x06\x1a");
        let mut data = vec![0x30, 0x80];
        data.extend_from_slice(&VALID[4..]);
        data.extend_from_slice(b"\0\0");
        let data = Bytes::from(data);

        let (obj, log) = Object::parse("x", data.clone(), &strict());
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::CMS_DATA_PARSING]);
        assert_eq!(log.records().len(), 1);

        let (obj, log) = Object::parse(
            "x", data, &ValidationOptions::default().with_strict(false)
        );
        assert!(!log.has_failures(), "{:?}", failures(&log));
        let obj = obj.unwrap();
        assert_eq!(obj.encoded().len(), VALID.len());
        assert_eq!(obj.cert().subject().common_name().unwrap(), "test-ee");
    }

    #[test]
    fn corrupted_envelope() {
        let mut data = include_bytes!(
            "../../test-data/cms/valid.sig"
        ).to_vec();
        data[0] = 0x31;
        let (obj, log) = Object::parse("x", Bytes::from(data), &strict());
        assert!(obj.is_none());
        assert_eq!(log.records().len(), 1);
        assert!(log.get("x", checks::CMS_DATA_PARSING).unwrap().is_failed());

        let data = include_bytes!("../../test-data/cms/valid.sig");
        let (obj, log) = Object::parse(
            "x", Bytes::copy_from_slice(&data[..100]), &strict()
        );
        assert!(obj.is_none());
        assert!(!log.records().iter().any(CheckRecord::is_passed));
    }

    #[test]
    fn tampered_content() {
        let mut data = include_bytes!(
            "../../test-data/cms/valid.sig"
        ).to_vec();
        // The last octet of "rpki test object".
        assert_eq!(data[79], b't');
        data[79] ^= 1;
        let (obj, log) = Object::parse("x", Bytes::from(data), &strict());
        assert!(obj.is_none());
        let failures: Vec<_> = log.failures().map(|rec| rec.check()).collect();
        assert_eq!(failures, [checks::SIGNATURE_VERIFICATION]);
        assert_eq!(log.records().len(), 20);
    }

    #[test]
    fn two_certs() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/two-certs.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::ONLY_ONE_CERT_ALLOWED), Some(false));
        assert_eq!(status(&log, checks::CERT_IS_EE_CERT), Some(true));
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), Some(true));
        assert_eq!(log.failures().count(), 1);
    }

    #[test]
    fn ca_signed() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/ca-signed.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::CERT_IS_EE_CERT), Some(false));
        assert_eq!(status(&log, checks::CERT_HAS_SKI), Some(true));
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), Some(true));
    }

    #[test]
    fn no_ski() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/no-ski.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::CERT_HAS_SKI), Some(false));
        assert_eq!(status(&log, checks::CERT_IS_EE_CERT), Some(true));
        assert_eq!(status(&log, checks::SIGNER_ID_MATCH), Some(true));
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), Some(true));
        assert_eq!(log.failures().count(), 1);
    }

    #[test]
    fn two_objects() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/two-objects.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::DECODE_CONTENT), Some(true));
        assert_eq!(status(&log, checks::ONLY_ONE_SIGNED_OBJECT), Some(false));
        assert_eq!(status(&log, checks::CMS_CONTENT_PARSING), None);
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), Some(true));
    }

    #[test]
    fn no_signed_attrs() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/no-attrs.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::SIGNED_ATTRS_PRESENT), Some(false));
        assert_eq!(status(&log, checks::DIGEST_ALGORITHM), Some(true));
        assert_eq!(status(&log, checks::ENCRYPTION_ALGORITHM), Some(true));
        assert_eq!(status(&log, checks::SIGNER_ID_MATCH), None);
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), None);
    }

    #[test]
    fn no_certs() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/no-certs.sig")
        );
        assert!(obj.is_none());
        assert_eq!(status(&log, checks::GET_CERTS_AND_CRLS), Some(false));
        assert_eq!(status(&log, checks::ONLY_ONE_CERT_ALLOWED), None);
        assert_eq!(status(&log, checks::GET_SIGNER_INFO), None);
        assert_eq!(status(&log, checks::DECODE_CONTENT), Some(true));
    }

    #[test]
    fn trailing_garbage() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/trailing-garbage.sig")
        );
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::CMS_CONTENT_PARSING]);
        assert_eq!(status(&log, checks::DECODE_CONTENT), Some(true));
        assert_eq!(status(&log, checks::ONLY_ONE_SIGNED_OBJECT), None);
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), Some(true));
    }

    #[test]
    fn two_signers() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/two-signers.sig")
        );
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::ONLY_ONE_SIGNER]);
        assert_eq!(status(&log, checks::GET_SIGNER_INFO), Some(true));
        assert_eq!(status(&log, checks::ONLY_ONE_CERT_ALLOWED), Some(true));
        assert_eq!(status(&log, checks::DIGEST_ALGORITHM), None);
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), None);
    }

    #[test]
    fn missing_signing_time() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/no-signing-time.sig")
        );
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::SIGNING_TIME_ATTR_PRESENT]);
        assert_eq!(status(&log, checks::SIGNER_ID_MATCH), Some(true));
        assert_eq!(status(&log, checks::ONLY_ONE_SIGNING_TIME_ATTR), None);
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), None);
    }

    #[test]
    fn two_signing_times() {
        let (obj, log) = parse(
            include_bytes!("../../test-data/cms/two-signing-times.sig")
        );
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::ONLY_ONE_SIGNING_TIME_ATTR]);
        assert_eq!(
            log.get(
                "rsync://example.net/repo/ca/object.sig",
                checks::ONLY_ONE_SIGNING_TIME_ATTR
            ).unwrap().params(),
            ["2"]
        );
        assert_eq!(status(&log, checks::SIGNING_TIME_ATTR_PRESENT), Some(true));
        assert_eq!(status(&log, checks::SIGNATURE_VERIFICATION), None);
    }

    #[test]
    fn wrong_digest_algorithm() {
        let mut data = VALID.to_vec();
        // The SHA-256 identifier of the signer info. Make it SHA-384.
        assert_eq!(
            &data[1171..1182],
            b"\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01"
        );
        data[1181] = 0x02;
        let (obj, log) = parse_vec(data);
        assert!(obj.is_none());
        assert_eq!(
            failures(&log),
            [checks::DIGEST_ALGORITHM, checks::SIGNATURE_VERIFICATION]
        );
        assert_eq!(status(&log, checks::ENCRYPTION_ALGORITHM), Some(true));
        assert_eq!(status(&log, checks::SIGNING_TIME_ATTR_PRESENT), Some(true));
        assert_eq!(log.records().len(), 20);
    }

    #[test]
    fn wrong_signature_algorithm() {
        let mut data = VALID.to_vec();
        // The rsaEncryption identifier of the signer info. Make it
        // sha1WithRSAEncryption.
        assert_eq!(
            &data[1293..1304],
            b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01"
        );
        data[1303] = 0x05;
        let (obj, log) = parse_vec(data);
        assert!(obj.is_none());
        assert_eq!(
            failures(&log),
            [checks::ENCRYPTION_ALGORITHM, checks::SIGNATURE_VERIFICATION]
        );
        assert_eq!(status(&log, checks::DIGEST_ALGORITHM), Some(true));
        assert_eq!(log.records().len(), 20);
    }

    #[test]
    fn raw_content() {
        let (obj, log) = CmsSignedObject::<GhostbustersRecord>::parse(
            "gbr",
            Bytes::from_static(
                include_bytes!("../../test-data/cms/ghostbusters.sig")
            ),
            &strict()
        );
        assert!(!log.has_failures(), "{:?}", failures(&log));
        assert!(log.get("gbr", checks::DECODE_CONTENT).unwrap().is_passed());
        assert!(log.get("gbr", checks::ONLY_ONE_SIGNED_OBJECT).is_none());
        assert!(
            log.get("gbr", checks::SIGNATURE_VERIFICATION).unwrap().is_passed()
        );
        assert_eq!(log.records().len(), 19);
        let obj = obj.unwrap();
        assert!(obj.content_type() == &oid::CT_RPKI_GHOSTBUSTERS);
        assert_eq!(obj.content().full_name(), Some("Test Operator"));
        assert_eq!(obj.signing_time(), Time::utc(2026, 10, 18, 18, 25, 46));

        // Raw content of the wrong type fails to decode.
        let (obj, log) = CmsSignedObject::<GhostbustersRecord>::parse(
            "gbr", Bytes::from_static(VALID), &strict()
        );
        assert!(obj.is_none());
        assert_eq!(failures(&log), [checks::DECODE_CONTENT]);
        assert!(log.get("gbr", checks::ONLY_ONE_SIGNED_OBJECT).is_none());
    }

    #[test]
    fn value_lengths() {
        assert_eq!(first_value_len(b"\x30\x00\x05\x00"), 2);
        assert_eq!(first_value_len(b"\x04\x81\x01\x00\x05\x00"), 4);
        assert_eq!(first_value_len(b"\x1f\x81\x01\x01\x00\x05\x00"), 5);
        // Indefinite form and short data fall back to everything.
        assert_eq!(first_value_len(b"\x30\x80\x00\x00"), 4);
        assert_eq!(first_value_len(b"\x30\x05\x00"), 3);
        assert_eq!(first_value_len(b""), 0);
    }
}
