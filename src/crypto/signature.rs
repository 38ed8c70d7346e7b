//! Signature algorithms and operations.

use bcder::decode;
use bcder::Tag;
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::oid;
use crate::repository::x509::AlgorithmIdentifier;


//------------ RpkiSignatureAlgorithm ----------------------------------------

/// A signature algorithms used by RPKI.
///
/// These are the algorithms used for creating and verifying signatures. For
/// RPKI, [RFC 7935] allows only one algorithm, RSA PKCS #1 v1.5 with
/// SHA-256. However, there are two possible representations of the
/// non-existant algorithm parameters. This type keeps track of the
/// representation used.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RpkiSignatureAlgorithm {
    /// Is the parameter field present?
    ///
    /// If `true`, then a parameter field is present and NULL. Otherwise it
    /// is missing.
    has_parameter: bool
}

/// # ASN.1 Values
///
/// Signature algorithm identifiers appear in certificates and other objects
/// from [RFC 5280] (simply as algorithm identifiers) as well as in signed
/// objects.
///
/// ```txt
/// SignatureAlgorithmIdentifier ::= AlgorithmIdentifier
/// AlgorithmIdentifier          ::= SEQUENCE {
///      algorithm                   OBJECT IDENTIFIER,
///      parameters                  ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// [RFC 7935] uses different identifiers in different places. For
/// certificates, this is `sha256WithRSAEncryption` from [RFC 4055]. For
/// signed objects, both `rsaEncryption` from [RFC 3370] and
/// `sha256WithRSAEncryption` must be accepted.
///
/// Certificates are decoded via [`x509_take_from`] which refuses any other
/// algorithm. The signer info of a signed object keeps the raw identifier
/// and converts it via [`cms_from_identifier`] so that a wrong algorithm
/// can be reported as a failed check.
///
/// [`x509_take_from`]: #method.x509_take_from
/// [`cms_from_identifier`]: #method.cms_from_identifier
/// [RFC 3370]: https://tools.ietf.org/html/rfc3370
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
/// [RFC 5280]: https://tools.ietf.org/html/rfc5280
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
impl RpkiSignatureAlgorithm {
    /// Takes the algorithm identifier from a DER value in X.509 signed data.
    pub fn x509_take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            oid::SHA256_WITH_RSA_ENCRYPTION.skip_if(cons)?;
            let has_parameter = cons.take_opt_primitive_if(
                Tag::NULL, |_| Ok(())
            )?.is_some();
            Ok(RpkiSignatureAlgorithm { has_parameter })
        })
    }

    /// Converts the generic algorithm identifier of a CMS signer info.
    ///
    /// Returns `None` if the algorithm isn’t allowed for signed objects.
    pub fn cms_from_identifier(ident: &AlgorithmIdentifier) -> Option<Self> {
        if
            (ident.algorithm() == &oid::RSA_ENCRYPTION
                || ident.algorithm() == &oid::SHA256_WITH_RSA_ENCRYPTION)
            && ident.has_null_or_no_params()
        {
            Some(RpkiSignatureAlgorithm {
                has_parameter: ident.has_params()
            })
        }
        else {
            None
        }
    }

    /// Returns whether the identifier had a parameters field.
    pub fn has_parameter(self) -> bool {
        self.has_parameter
    }
}


//--- Default

impl Default for RpkiSignatureAlgorithm {
    fn default() -> Self {
        RpkiSignatureAlgorithm { has_parameter: true }
    }
}


//------------ Signature -----------------------------------------------------

/// A signature together with the algorithm it was created with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    algorithm: RpkiSignatureAlgorithm,
    value: Bytes
}

impl Signature {
    pub fn new(algorithm: RpkiSignatureAlgorithm, value: Bytes) -> Self {
        Signature { algorithm, value }
    }

    pub fn algorithm(&self) -> RpkiSignatureAlgorithm {
        self.algorithm
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;

    #[test]
    fn x509_algorithm() {
        let with_null = Mode::Der.decode(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"
                .as_ref(),
            RpkiSignatureAlgorithm::x509_take_from
        ).unwrap();
        assert!(with_null.has_parameter());
        let without = Mode::Der.decode(
            b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b".as_ref(),
            RpkiSignatureAlgorithm::x509_take_from
        ).unwrap();
        assert!(!without.has_parameter());
        assert_ne!(with_null, without);

        // rsaEncryption is only allowed in signed objects.
        assert!(Mode::Der.decode(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01\x05\x00"
                .as_ref(),
            RpkiSignatureAlgorithm::x509_take_from
        ).is_err());
    }

    #[test]
    fn cms_algorithm() {
        let ident = |data: &'static [u8]| {
            Mode::Der.decode(data, AlgorithmIdentifier::take_from).unwrap()
        };
        assert!(RpkiSignatureAlgorithm::cms_from_identifier(&ident(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01\x05\x00"
        )).is_some());
        assert!(RpkiSignatureAlgorithm::cms_from_identifier(&ident(
            b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b"
        )).is_some());
        // sha1WithRSAEncryption
        assert!(RpkiSignatureAlgorithm::cms_from_identifier(&ident(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x05\x05\x00"
        )).is_none());
    }
}
