//! Resource certificates.
//!
//! The certificates used in RPKI are called _resource certificates._ They
//! are defined in [RFC 6487] as a profile on regular Internet PKI
//! certificates defined in [RFC 5280].
//!
//! This module implements parsed certificates in the type [`Cert`]. Parsing
//! is lenient: only the X.509 structure itself and the encoding of the
//! extensions we understand are checked while decoding. Whether a
//! certificate follows the RPKI profile, e.g., whether it has a subject key
//! identifier, is left to the validation code which records these checks in
//! its log. The accessors for the information found in the extensions live
//! in the [`ext`][super::ext] module.
//!
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::{fmt, ops};
use bcder::decode;
use bcder::{BitString, Mode, OctetString, Oid, Tag};
use bcder::decode::{ContentError, DecodeError, IntoSource, Source};
use bytes::Bytes;
use crate::oid;
use crate::crypto::{KeyIdentifier, PublicKey, RpkiSignatureAlgorithm};
use crate::uri::Uri;
use super::error::VerificationError;
use super::ext::{self, AccessDescriptor};
use super::resources::{
    AsBlocks, IpBlocks, ResourceDescriptor, ResourcesChoice
};
use super::x509::{
    skip_content, Name, SignedData, Serial, Time, Validity,
    ValidityPeriodError,
};


//------------ Cert ----------------------------------------------------------

/// A parsed resource certificate.
///
/// A value of this type represents a certificate of any of the three kinds
/// used in RPKI: trust anchor certificates which are self-signed, CA
/// certificates which sign other certificates, and EE certificates which
/// sign a single object and are included in that object.
///
/// If a certificate is stored in a file, you can use the [`decode`] function
/// to parse the entire file. If the certificate is part of some other
/// structure, the [`take_from`] and [`from_constructed`] functions can be
/// used during parsing of that structure.
///
/// [`decode`]: #method.decode
/// [`take_from`]: #method.take_from
/// [`from_constructed`]: #method.from_constructed
#[derive(Clone, Debug)]
pub struct Cert {
    /// The outer structure of the certificate.
    signed_data: SignedData,

    /// The actual data of the certificate.
    tbs: TbsCert,
}


/// # Decoding
///
impl Cert {
    /// Decodes a source as a certificate.
    pub fn decode<S: IntoSource>(
        source: S,
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    /// Takes an encoded certificate from the beginning of a value.
    ///
    /// This function assumes that the certificate is encoded in the next
    /// constructed value in `cons` tagged as a sequence.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of a Certificate sequence.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let signed_data = SignedData::from_constructed(cons)?;
        let tbs = signed_data.data().clone().decode(
            TbsCert::from_constructed
        ).map_err(DecodeError::convert)?;
        Ok(Self { signed_data, tbs })
    }

    /// Returns the encoded TBSCertificate and signature of the certificate.
    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }
}


/// # Verification
///
/// These methods each perform a single check of the certificate against
/// its issuer. Which of them apply depends on the role of the certificate
/// and is decided by the validation code.
impl Cert {
    /// Verifies that the certificate was signed by the given key.
    ///
    /// For a self-signed certificate, pass in the certificate’s own key.
    pub fn verify_signature(
        &self, issuer_key: &PublicKey
    ) -> Result<(), VerificationError> {
        self.signed_data.verify_signature(issuer_key).map_err(Into::into)
    }

    /// Verifies that the certificate is valid at the given time.
    pub fn verify_validity(
        &self, now: Time
    ) -> Result<(), ValidityPeriodError> {
        self.tbs.validity.verify_at(now)
    }

    /// Verifies that the certificate names the issuer’s subject as issuer.
    pub fn verify_issuer_name(
        &self, issuer: &Cert
    ) -> Result<(), VerificationError> {
        if self.tbs.issuer == issuer.tbs.subject {
            Ok(())
        }
        else {
            Err(VerificationError::new(
                "issuer name doesn't match issuer's subject"
            ))
        }
    }

    /// Verifies that the authority key identifier matches the issuer.
    ///
    /// The authority key identifier must be present and equal to the
    /// subject key identifier of the issuer.
    pub fn verify_issuer_key(
        &self, issuer: &Cert
    ) -> Result<(), VerificationError> {
        let aki = self.tbs.authority_key_identifier.as_ref().ok_or_else(|| {
            VerificationError::new("missing Authority Key Identifier")
        })?;
        match issuer.tbs.subject_key_identifier {
            Some(ref ski) if ski == aki => Ok(()),
            Some(_) => {
                Err(VerificationError::new(
                    "Authority Key Identifier doesn't match issuer's \
                     Subject Key Identifier"
                ))
            }
            None => {
                Err(VerificationError::new(
                    "issuer has no Subject Key Identifier"
                ))
            }
        }
    }
}


//--- Deref and AsRef

impl ops::Deref for Cert {
    type Target = TbsCert;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<TbsCert> for Cert {
    fn as_ref(&self) -> &TbsCert {
        &self.tbs
    }
}


//------------ TbsCert -------------------------------------------------------

/// The data of a resource certificate.
///
/// The extensions that RPKI requires are all optional here. Their absence
/// is reported by the validation code.
#[derive(Clone, Debug)]
pub struct TbsCert {
    /// The serial number.
    serial_number: Serial,

    /// The algorithm used for signing the certificate.
    signature: RpkiSignatureAlgorithm,

    /// The name of the issuer.
    issuer: Name,

    /// The validity of the certificate.
    validity: Validity,

    /// The name of the subject of this certificate.
    subject: Name,

    /// Information about the public key of this certificate.
    subject_public_key_info: PublicKey,

    /// Basic Constraints.
    ///
    /// The field contains the value of the cA flag or `None` if the
    /// extension is missing.
    basic_ca: Option<bool>,

    /// Subject Key Identifier.
    subject_key_identifier: Option<KeyIdentifier>,

    /// Authority Key Identifier.
    authority_key_identifier: Option<KeyIdentifier>,

    /// Key Usage.
    key_usage: Option<KeyUsage>,

    /// The policy identifier of the certificate policies extension.
    certificate_policy: Option<Oid<Bytes>>,

    /// The URIs of all CRL distribution points.
    crl_distribution_points: Vec<Uri>,

    /// Authority Information Access.
    authority_info_access: Vec<AccessDescriptor>,

    /// Subject Information Access.
    subject_info_access: Vec<AccessDescriptor>,

    /// AS resources.
    as_resources: ResourcesChoice<AsBlocks>,

    /// IPv4 resources.
    v4_resources: ResourcesChoice<IpBlocks>,

    /// IPv6 resources.
    v6_resources: ResourcesChoice<IpBlocks>,
}


/// # Data Access
///
impl TbsCert {
    /// Returns the serial number of the certificate.
    pub fn serial_number(&self) -> Serial {
        self.serial_number
    }

    /// Returns the signature algorithm of the certificate.
    pub fn signature_algorithm(&self) -> RpkiSignatureAlgorithm {
        self.signature
    }

    /// Returns a reference to the certificate’s issuer.
    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    /// Returns a reference to the validity.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Returns a reference to the certificate’s subject.
    pub fn subject(&self) -> &Name {
        &self.subject
    }

    /// Returns a reference to the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.subject_public_key_info
    }

    /// Returns the cA field of the basic constraints extension if present.
    pub fn basic_ca(&self) -> Option<bool> {
        self.basic_ca
    }

    /// Returns a reference to the subject key identifier if present.
    pub fn subject_key_identifier(&self) -> Option<&KeyIdentifier> {
        self.subject_key_identifier.as_ref()
    }

    /// Returns a reference to the authority key identifier if present.
    pub fn authority_key_identifier(&self) -> Option<&KeyIdentifier> {
        self.authority_key_identifier.as_ref()
    }

    /// Returns the key usage if the extension is present.
    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.key_usage
    }

    /// Returns the certificate policy if the extension is present.
    pub fn certificate_policy(&self) -> Option<&Oid<Bytes>> {
        self.certificate_policy.as_ref()
    }

    /// Returns the URIs of all CRL distribution points.
    ///
    /// The list is empty if the extension is missing or malformed.
    pub fn crl_distribution_points(&self) -> &[Uri] {
        &self.crl_distribution_points
    }

    /// Returns the access descriptions of the authority information access.
    pub fn authority_info_access(&self) -> &[AccessDescriptor] {
        &self.authority_info_access
    }

    /// Returns the access descriptions of the subject information access.
    pub fn subject_info_access(&self) -> &[AccessDescriptor] {
        &self.subject_info_access
    }

    /// Returns whether the certificate has any resource extension.
    pub fn has_resources(&self) -> bool {
        self.as_resources.is_present()
        || self.v4_resources.is_present()
        || self.v6_resources.is_present()
    }

    /// Returns the resources claimed by the certificate.
    ///
    /// Returns `None` if the certificate has neither the IP nor the AS
    /// resources extension, i.e., isn’t a resource certificate at all.
    pub fn resources(&self) -> Option<ResourceDescriptor> {
        if !self.has_resources() {
            return None
        }
        Some(ResourceDescriptor::from_choices(
            self.as_resources.clone(),
            self.v4_resources.clone(),
            self.v6_resources.clone(),
        ))
    }
}


/// # Decoding
///
impl TbsCert {
    /// Parses the content of a TBSCertificate sequence.
    ///
    /// ```text
    /// TBSCertificate  ::=  SEQUENCE  {
    ///     version         [0]  EXPLICIT Version DEFAULT v1,
    ///     serialNumber         CertificateSerialNumber,
    ///     signature            AlgorithmIdentifier,
    ///     issuer               Name,
    ///     validity             Validity,
    ///     subject              Name,
    ///     subjectPublicKeyInfo SubjectPublicKeyInfo,
    ///     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///     extensions      [3]  EXPLICIT Extensions OPTIONAL }
    /// ```
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.take_opt_constructed_if(Tag::CTX_0, |c| c.skip_u8_if(2))?;

            let serial_number = Serial::take_from(cons)?;
            let signature = RpkiSignatureAlgorithm::x509_take_from(cons)?;
            let issuer = Name::take_from(cons)?;
            let validity = Validity::take_from(cons)?;
            let subject = Name::take_from(cons)?;
            let subject_public_key_info = PublicKey::take_from(cons)?;

            // The unique identifiers are forbidden by RFC 6487 but are
            // harmless, so skip them.
            cons.take_opt_value_if(Tag::CTX_1, skip_content)?;
            cons.take_opt_value_if(Tag::CTX_2, skip_content)?;

            let mut ext = Extensions::default();
            cons.take_opt_constructed_if(Tag::CTX_3, |c| c.take_sequence(|cons| {
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    let id = Oid::take_from(cons)?;
                    let critical = cons.take_opt_bool()?.unwrap_or(false);
                    let value = OctetString::take_from(cons)?;
                    Mode::Der.decode(value, |content| {
                        ext.take_extension(&id, critical, content)
                    }).map_err(DecodeError::convert)?;
                    Ok(())
                })? { }
                Ok(())
            }))?;

            Ok(TbsCert {
                serial_number,
                signature,
                issuer,
                validity,
                subject,
                subject_public_key_info,
                basic_ca: ext.basic_ca,
                subject_key_identifier: ext.subject_key_id,
                authority_key_identifier: ext.authority_key_id,
                key_usage: ext.key_usage,
                certificate_policy: ext.certificate_policy,
                crl_distribution_points: ext.crl_distribution_points
                    .unwrap_or_default(),
                authority_info_access: ext.authority_info_access
                    .unwrap_or_default(),
                subject_info_access: ext.subject_info_access
                    .unwrap_or_default(),
                as_resources: ext.as_resources.unwrap_or_default(),
                v4_resources: ext.v4_resources,
                v6_resources: ext.v6_resources,
            })
        })
    }
}


//------------ Extensions ----------------------------------------------------

/// Collects the extensions while parsing a certificate.
#[derive(Default)]
struct Extensions {
    basic_ca: Option<bool>,
    subject_key_id: Option<KeyIdentifier>,
    authority_key_id: Option<KeyIdentifier>,
    key_usage: Option<KeyUsage>,
    crl_distribution_points: Option<Vec<Uri>>,
    authority_info_access: Option<Vec<AccessDescriptor>>,
    subject_info_access: Option<Vec<AccessDescriptor>>,
    certificate_policy: Option<Oid<Bytes>>,
    ip_resources: bool,
    v4_resources: ResourcesChoice<IpBlocks>,
    v6_resources: ResourcesChoice<IpBlocks>,
    as_resources: Option<ResourcesChoice<AsBlocks>>,
}

impl Extensions {
    /// Parses the value of a single extension.
    ///
    /// Each extension may appear only once. RFC 5280 says we can ignore
    /// non-critical extensions we don’t know of but must reject critical
    /// ones.
    fn take_extension<S: decode::Source>(
        &mut self,
        id: &Oid<Bytes>,
        critical: bool,
        cons: &mut decode::Constructed<S>,
    ) -> Result<(), DecodeError<S::Error>> {
        if *id == oid::CE_BASIC_CONSTRAINTS {
            check_duplicate(cons, self.basic_ca.is_some())?;
            self.basic_ca = Some(take_basic_constraints(cons)?);
        }
        else if *id == oid::CE_SUBJECT_KEY_IDENTIFIER {
            check_duplicate(cons, self.subject_key_id.is_some())?;
            self.subject_key_id = Some(KeyIdentifier::take_from(cons)?);
        }
        else if *id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
            check_duplicate(cons, self.authority_key_id.is_some())?;
            self.authority_key_id = take_authority_key_identifier(cons)?;
        }
        else if *id == oid::CE_KEY_USAGE {
            check_duplicate(cons, self.key_usage.is_some())?;
            self.key_usage = Some(KeyUsage::take_from(cons)?);
        }
        else if *id == oid::CE_CRL_DISTRIBUTION_POINTS {
            check_duplicate(cons, self.crl_distribution_points.is_some())?;
            self.crl_distribution_points = Some(
                ext::take_crl_distribution_points(cons)?
            );
        }
        else if *id == oid::PE_AUTHORITY_INFO_ACCESS {
            check_duplicate(cons, self.authority_info_access.is_some())?;
            self.authority_info_access = Some(
                AccessDescriptor::take_all_from(cons)?
            );
        }
        else if *id == oid::PE_SUBJECT_INFO_ACCESS {
            check_duplicate(cons, self.subject_info_access.is_some())?;
            self.subject_info_access = Some(
                AccessDescriptor::take_all_from(cons)?
            );
        }
        else if *id == oid::CE_CERTIFICATE_POLICIES {
            check_duplicate(cons, self.certificate_policy.is_some())?;
            self.certificate_policy = Some(take_certificate_policies(cons)?);
        }
        else if
            *id == oid::PE_IP_ADDR_BLOCK || *id == oid::PE_IP_ADDR_BLOCK_V2
        {
            check_duplicate(cons, self.ip_resources)?;
            self.ip_resources = true;
            let (v4, v6) = IpBlocks::take_choices_from(cons)?;
            self.v4_resources = v4;
            self.v6_resources = v6;
        }
        else if
            *id == oid::PE_AUTONOMOUS_SYS_IDS
            || *id == oid::PE_AUTONOMOUS_SYS_IDS_V2
        {
            check_duplicate(cons, self.as_resources.is_some())?;
            self.as_resources = Some(AsBlocks::take_choice_from(cons)?);
        }
        else if critical {
            return Err(cons.content_err(
                UnexpectedCriticalExtension::new(id)
            ))
        }
        else {
            cons.take_value(|_, content| skip_content(content))?;
        }
        Ok(())
    }
}

fn check_duplicate<S: decode::Source>(
    cons: &decode::Constructed<S>, seen: bool
) -> Result<(), DecodeError<S::Error>> {
    if seen {
        Err(cons.content_err("duplicate extension"))
    }
    else {
        Ok(())
    }
}

/// Parses the Basic Constraints extension.
///
/// ```text
/// BasicConstraints        ::= SEQUENCE {
///     cA                      BOOLEAN DEFAULT FALSE,
///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL
/// }
/// ```
///
/// RFC 6487 forbids the pathLenConstraint. We skip it.
fn take_basic_constraints<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
) -> Result<bool, DecodeError<S::Error>> {
    cons.take_sequence(|cons| {
        let ca = cons.take_opt_bool()?.unwrap_or(false);
        cons.skip_all()?;
        Ok(ca)
    })
}

/// Parses the Certificate Policies extension.
///
/// ```text
/// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
///
/// PolicyInformation ::= SEQUENCE {
///     policyIdentifier   CertPolicyId,
///     policyQualifiers   SEQUENCE SIZE (1..MAX) OF
///                             PolicyQualifierInfo OPTIONAL }
/// ```
///
/// RFC 6487 allows exactly one policy. Its qualifiers are skipped.
fn take_certificate_policies<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
) -> Result<Oid<Bytes>, DecodeError<S::Error>> {
    cons.take_sequence(|cons| {
        cons.take_sequence(|cons| {
            let policy = Oid::take_from(cons)?;
            cons.skip_all()?;
            Ok(policy)
        })
    })
}

/// Parses the Authority Key Identifier extension.
///
/// ```text
/// AuthorityKeyIdentifier ::= SEQUENCE {
///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
///
/// Only the keyIdentifier is of interest. If it is missing, the extension
/// is treated as absent.
fn take_authority_key_identifier<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
) -> Result<Option<KeyIdentifier>, DecodeError<S::Error>> {
    cons.take_sequence(|cons| {
        let res = cons.take_opt_value_if(
            Tag::CTX_0, KeyIdentifier::from_content
        )?;
        cons.skip_all()?;
        Ok(res)
    })
}


//------------ KeyUsage ------------------------------------------------------

/// The key usage bits relevant for resource certificates.
///
/// ```text
/// KeyUsage ::= BIT STRING {
///      digitalSignature        (0),
///      nonRepudiation          (1),
///      keyEncipherment         (2),
///      dataEncipherment        (3),
///      keyAgreement            (4),
///      keyCertSign             (5),
///      cRLSign                 (6),
///      encipherOnly            (7),
///      decipherOnly            (8) }
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct KeyUsage {
    digital_signature: bool,
    key_cert_sign: bool,
    crl_sign: bool,
}

impl KeyUsage {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let bits = BitString::take_from(cons)?;
        Ok(KeyUsage {
            digital_signature: bits.bit(0),
            key_cert_sign: bits.bit(5),
            crl_sign: bits.bit(6),
        })
    }

    /// Returns whether the usage is that of a CA certificate.
    ///
    /// CA certificates need keyCertSign and cRLSign.
    pub fn is_ca(self) -> bool {
        self.key_cert_sign && self.crl_sign
    }

    /// Returns whether the usage is that of an EE certificate.
    pub fn is_ee(self) -> bool {
        self.digital_signature
    }
}


//------------ UnexpectedCriticalExtension -----------------------------------

/// A critical extension we don’t know about was encountered.
#[derive(Clone, Debug)]
struct UnexpectedCriticalExtension {
    oid: Oid<Bytes>,
}

impl UnexpectedCriticalExtension {
    fn new(oid: &Oid<Bytes>) -> Self {
        UnexpectedCriticalExtension { oid: oid.clone() }
    }
}

impl From<UnexpectedCriticalExtension> for ContentError {
    fn from(err: UnexpectedCriticalExtension) -> Self {
        ContentError::from_boxed(Box::new(err))
    }
}

impl fmt::Display for UnexpectedCriticalExtension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unexpected critical extension {}", self.oid)
    }
}


//============ Tests =========================================================
