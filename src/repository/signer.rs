//! The signer of a signed object.
//!
//! This module contains the types for the signer info of a CMS signed-data
//! structure as well as the [`SignatureVerifier`] that checks the signer
//! info against the certificate embedded in the object.
//
// See RFC 5652 and RFC 6488.

use std::convert::Infallible;
use bcder::decode;
use bcder::{Captured, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::oid;
use crate::crypto::{DigestAlgorithm, KeyIdentifier, RpkiSignatureAlgorithm};
use crate::validation::checks;
use crate::validation::log::ValidationLog;
use super::cert::Cert;
use super::error::{InspectionError, VerificationError};
use super::sigobj::SignedDataEnvelope;
use super::x509::{update_first, AlgorithmIdentifier, Name, Serial, Time};


//------------ SignerInfo ----------------------------------------------------

/// A signer info of a CMS signed-data structure.
///
/// ```text
/// SignerInfo ::= SEQUENCE {
///     version CMSVersion,
///     sid SignerIdentifier,
///     digestAlgorithm DigestAlgorithmIdentifier,
///     signedAttrs [0] IMPLICIT SignedAttributes OPTIONAL,
///     signatureAlgorithm SignatureAlgorithmIdentifier,
///     signature SignatureValue,
///     unsignedAttrs [1] IMPLICIT UnsignedAttributes OPTIONAL }
/// ```
///
/// The algorithm identifiers are kept as they are so that unexpected
/// algorithms can be reported. Unsigned attributes are ignored.
#[derive(Clone, Debug)]
pub struct SignerInfo {
    sid: SignerIdentifier,
    digest_algorithm: AlgorithmIdentifier,
    signed_attrs: Option<SignedAttrs>,
    signature_algorithm: AlgorithmIdentifier,
    signature: Bytes,
}

impl SignerInfo {
    pub fn sid(&self) -> &SignerIdentifier {
        &self.sid
    }

    pub fn digest_algorithm(&self) -> &AlgorithmIdentifier {
        &self.digest_algorithm
    }

    pub fn signed_attrs(&self) -> Option<&SignedAttrs> {
        self.signed_attrs.as_ref()
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &Bytes {
        &self.signature
    }

    /// Decodes the content of the signer infos set.
    pub fn decode_set(
        captured: &Captured
    ) -> Result<Vec<Self>, DecodeError<Infallible>> {
        captured.clone().decode(|cons| {
            let mut res = Vec::new();
            while let Some(info) = Self::take_opt_from(cons)? {
                res.push(info)
            }
            Ok(res)
        })
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            // The version depends on the choice of sid.
            cons.take_u8()?;
            let sid = SignerIdentifier::take_from(cons)?;
            let digest_algorithm = AlgorithmIdentifier::take_from(cons)?;
            let signed_attrs = SignedAttrs::take_opt_from(cons)?;
            let signature_algorithm = AlgorithmIdentifier::take_from(cons)?;
            let signature = OctetString::take_from(cons)?.into_bytes();
            cons.take_opt_constructed_if(Tag::CTX_1, |cons| cons.skip_all())?;
            Ok(SignerInfo {
                sid, digest_algorithm, signed_attrs, signature_algorithm,
                signature
            })
        })
    }
}


//------------ SignerIdentifier ----------------------------------------------

/// The identifier of the certificate used for signing.
///
/// ```text
/// SignerIdentifier ::= CHOICE {
///     issuerAndSerialNumber IssuerAndSerialNumber,
///     subjectKeyIdentifier [0] SubjectKeyIdentifier }
///
/// IssuerAndSerialNumber ::= SEQUENCE {
///     issuer Name,
///     serialNumber CertificateSerialNumber }
/// ```
///
/// RPKI signed objects always use the subject key identifier. The other
/// choice is still accepted since it is found in the wild.
#[derive(Clone, Debug)]
pub enum SignerIdentifier {
    SubjectKeyIdentifier(KeyIdentifier),
    IssuerAndSerialNumber {
        issuer: Name,
        serial: Serial,
    }
}

impl SignerIdentifier {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        if let Some(ski) = cons.take_opt_value_if(
            Tag::CTX_0, KeyIdentifier::from_content
        )? {
            return Ok(SignerIdentifier::SubjectKeyIdentifier(ski))
        }
        cons.take_sequence(|cons| {
            Ok(SignerIdentifier::IssuerAndSerialNumber {
                issuer: Name::take_from(cons)?,
                serial: Serial::take_from(cons)?,
            })
        })
    }

    /// Checks that the identifier refers to the given certificate.
    pub fn verify_cert(&self, cert: &Cert) -> Result<(), InspectionError> {
        match *self {
            SignerIdentifier::SubjectKeyIdentifier(ref ski) => {
                if cert.subject_key_identifier() != Some(ski) {
                    return Err(InspectionError::new(
                        "Subject Key Identifier mismatch in signed object"
                    ))
                }
            }
            SignerIdentifier::IssuerAndSerialNumber {
                ref issuer, serial
            } => {
                if cert.issuer() != issuer {
                    return Err(InspectionError::new(
                        "issuer mismatch in signed object"
                    ))
                }
                if cert.serial_number() != serial {
                    return Err(InspectionError::new(
                        "serial number mismatch in signed object"
                    ))
                }
            }
        }
        Ok(())
    }
}


//------------ SignedAttrs ---------------------------------------------------

/// The signed attributes of a signer info.
///
/// The type keeps the raw content of the attributes set since this is what
/// the signature is calculated over. Annoyingly, the signature uses the
/// encoding with the tag for SET OF, not the \[0\] found in the signer info.
/// Signed objects need to be DER encoded, so we don’t re-encode the content
/// but only stick the SET OF tag and length in front of it. BER encoded
/// objects we have encountered still had their signed attributes in DER.
///
/// Of the attributes, only content type, message digest, and signing time
/// are decoded. Others are ignored.
#[derive(Clone, Debug)]
pub struct SignedAttrs {
    raw: Captured,
    content_type: Option<Oid<Bytes>>,
    message_digest: Option<Bytes>,
    signing_time: Option<Vec<Time>>,
}

impl SignedAttrs {
    /// Returns the value of the content type attribute if present.
    pub fn content_type(&self) -> Option<&Oid<Bytes>> {
        self.content_type.as_ref()
    }

    /// Returns the value of the message digest attribute if present.
    pub fn message_digest(&self) -> Option<&Bytes> {
        self.message_digest.as_ref()
    }

    /// Returns the values of the signing time attribute if present.
    pub fn signing_time(&self) -> Option<&[Time]> {
        self.signing_time.as_deref()
    }

    /// Takes the signed attributes if present.
    ///
    /// ```text
    /// SignedAttributes ::= SET SIZE (1..MAX) OF Attribute
    ///
    /// Attribute ::= SEQUENCE {
    ///     attrType OBJECT IDENTIFIER,
    ///     attrValues SET OF AttributeValue }
    /// ```
    ///
    /// If an attribute appears more than once, the first one wins.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let mut content_type = None;
        let mut message_digest = None;
        let mut signing_time = None;
        let raw = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.capture(|cons| {
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    let oid = Oid::take_from(cons)?;
                    if oid == oid::CONTENT_TYPE {
                        update_first(&mut content_type, || {
                            cons.take_set(|cons| {
                                Oid::take_from(cons)
                            }).map(Some)
                        })
                    }
                    else if oid == oid::MESSAGE_DIGEST {
                        update_first(&mut message_digest, || {
                            cons.take_set(|cons| {
                                OctetString::take_from(cons)
                            }).map(|digest| Some(digest.into_bytes()))
                        })
                    }
                    else if oid == oid::SIGNING_TIME {
                        update_first(&mut signing_time, || {
                            cons.take_set(|cons| {
                                let mut res = Vec::new();
                                while let Some(time) = Time::take_opt_from(
                                    cons
                                )? {
                                    res.push(time)
                                }
                                Ok(Some(res))
                            })
                        })
                    }
                    else {
                        cons.skip_all()
                    }
                })? { }
                Ok(())
            })
        })?;
        Ok(raw.map(|raw| {
            SignedAttrs { raw, content_type, message_digest, signing_time }
        }))
    }

    /// Creates the message the signature is calculated over.
    pub fn encode_verify(&self) -> Result<Vec<u8>, VerificationError> {
        let len = self.raw.len();
        let mut res = Vec::with_capacity(len + 4);
        res.push(0x31); // SET
        if len < 0x80 {
            res.push(len as u8)
        }
        else if len < 0x100 {
            res.push(0x81);
            res.push(len as u8);
        }
        else if len < 0x10000 {
            res.push(0x82);
            res.push((len >> 8) as u8);
            res.push(len as u8);
        }
        else {
            return Err(VerificationError::new(
                "signed attributes over 65535 bytes not supported"
            ))
        }
        res.extend_from_slice(self.raw.as_slice());
        Ok(res)
    }
}

impl AsRef<[u8]> for SignedAttrs {
    fn as_ref(&self) -> &[u8] {
        self.raw.as_slice()
    }
}


//------------ SignatureVerifier ---------------------------------------------

/// Verifies the signer of a signed object.
///
/// The verifier checks the signer info of the envelope against the
/// certificate embedded in it and records all checks in a validation log.
/// It never fails: any problem, including those raised by the underlying
/// cryptography, ends up as a failed check.
#[derive(Clone, Copy, Debug)]
pub struct SignatureVerifier<'a> {
    envelope: &'a SignedDataEnvelope,
    cert: &'a Cert,
}

impl<'a> SignatureVerifier<'a> {
    pub fn new(envelope: &'a SignedDataEnvelope, cert: &'a Cert) -> Self {
        SignatureVerifier { envelope, cert }
    }

    /// Performs all checks.
    ///
    /// Returns the signing time if the checks got far enough to learn it.
    pub fn verify(self, log: &mut ValidationLog) -> Option<Time> {
        let signer = self.extract_single_signer(log)?;
        let attrs = self.verify_signer(&signer, log)?;
        let signing_time = Self::verify_signing_time(attrs, log)?;
        log.check_result(
            self.verify_signature(&signer, attrs),
            checks::SIGNATURE_VERIFICATION
        );
        Some(signing_time)
    }

    fn extract_single_signer(
        self, log: &mut ValidationLog
    ) -> Option<SignerInfo> {
        let mut signers = log.check_result(
            SignerInfo::decode_set(self.envelope.signer_infos()),
            checks::GET_SIGNER_INFO
        )?;
        if !log.check(signers.len() == 1, checks::ONLY_ONE_SIGNER) {
            return None
        }
        signers.pop()
    }

    /// Checks the algorithms and the presence of the signed attributes.
    ///
    /// Returns the signed attributes if the checks can continue.
    fn verify_signer<'s>(
        self, signer: &'s SignerInfo, log: &mut ValidationLog
    ) -> Option<&'s SignedAttrs> {
        log.check(
            DigestAlgorithm::from_identifier(
                signer.digest_algorithm()
            ).is_some(),
            checks::DIGEST_ALGORITHM
        );
        log.check(
            RpkiSignatureAlgorithm::cms_from_identifier(
                signer.signature_algorithm()
            ).is_some(),
            checks::ENCRYPTION_ALGORITHM
        );
        let Some(attrs) = signer.signed_attrs() else {
            log.fail(checks::SIGNED_ATTRS_PRESENT, Vec::new());
            return None
        };
        log.pass(checks::SIGNED_ATTRS_PRESENT);
        log.check(
            attrs.content_type().is_some(), checks::CONTENT_TYPE_ATTR_PRESENT
        );
        log.check(
            attrs.message_digest().is_some(), checks::MSG_DIGEST_ATTR_PRESENT
        );
        log.check_result(
            signer.sid().verify_cert(self.cert), checks::SIGNER_ID_MATCH
        );
        Some(attrs)
    }

    fn verify_signing_time(
        attrs: &SignedAttrs, log: &mut ValidationLog
    ) -> Option<Time> {
        let Some(times) = attrs.signing_time() else {
            log.fail(checks::SIGNING_TIME_ATTR_PRESENT, Vec::new());
            return None
        };
        log.pass(checks::SIGNING_TIME_ATTR_PRESENT);
        match *times {
            [time] => {
                log.pass(checks::ONLY_ONE_SIGNING_TIME_ATTR);
                Some(time)
            }
            _ => {
                log.fail(
                    checks::ONLY_ONE_SIGNING_TIME_ATTR,
                    vec![times.len().to_string()]
                );
                None
            }
        }
    }

    /// Verifies the message digest and the signature itself.
    fn verify_signature(
        self, signer: &SignerInfo, attrs: &SignedAttrs
    ) -> Result<(), VerificationError> {
        let digest_algorithm = DigestAlgorithm::from_identifier(
            signer.digest_algorithm()
        ).ok_or_else(|| {
            VerificationError::new("unsupported digest algorithm")
        })?;
        if RpkiSignatureAlgorithm::cms_from_identifier(
            signer.signature_algorithm()
        ).is_none() {
            return Err(VerificationError::new(
                "unsupported signature algorithm"
            ))
        }
        let content = self.envelope.content().ok_or_else(|| {
            VerificationError::new("missing signed content")
        })?;
        let message_digest = attrs.message_digest().ok_or_else(|| {
            VerificationError::new("missing message digest")
        })?;
        let digest = {
            let mut context = digest_algorithm.start();
            content.iter().for_each(|x| context.update(x));
            context.finish()
        };
        if digest.as_ref() != message_digest.as_ref() {
            return Err(VerificationError::new(
                "message digest mismatch in signed object"
            ))
        }
        let msg = attrs.encode_verify()?;
        self.cert.public_key().verify(
            &msg, signer.signature().as_ref()
        ).map_err(Into::into)
    }
}


//============ Tests =========================================================
