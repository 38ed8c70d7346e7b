//! Types and parameters of keys.

use std::{error, fmt};
use std::str::FromStr;
use bcder::decode;
use bcder::{BitString, Mode, OctetString, Oid, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bytes::Bytes;
use ring::signature;
use ring::error::Unspecified;
use crate::oid;
use crate::util::hex;


//------------ PublicKeyFormat -----------------------------------------------

/// The formats of public keys.
///
/// RPKI only uses RSA keys as described in section 3 of [RFC 7935]. Because
/// certificates are parsed leniently, keys of other formats are accepted
/// when decoding but can’t be used for verifying signatures.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PublicKeyFormat {
    /// An RSA public key.
    Rsa,

    /// A key of some other algorithm.
    Unsupported,
}

/// # ASN.1 Algorithm Identifiers
///
/// The format of the public key is identified in certificates through a
/// algorithm identifier defined with this ASN.1:
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// For RSA keys the object identifier is `rsaEncryption` defined by
/// [RFC 4055] and the parameters must be present and NULL. When parsing, we
/// generously also allow it to be absent altogether.
///
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
impl PublicKeyFormat {
    /// Takes and returns a algorithm identifier.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let algorithm = Oid::take_from(cons)?;
            if algorithm == oid::RSA_ENCRYPTION {
                cons.take_opt_null()?;
                Ok(PublicKeyFormat::Rsa)
            }
            else {
                cons.skip_all()?;
                Ok(PublicKeyFormat::Unsupported)
            }
        })
    }

    /// Returns whether the format is RSA.
    pub fn is_rsa(self) -> bool {
        matches!(self, PublicKeyFormat::Rsa)
    }
}


//------------ PublicKey -----------------------------------------------------

/// A public key.
///
/// Besides the key bits, the value keeps the complete encoded
/// *SubjectPublicKeyInfo* so that it can be published in its original form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    algorithm: PublicKeyFormat,
    bits: Bytes,
    info: Bytes,
}

impl PublicKey {
    pub fn algorithm(&self) -> PublicKeyFormat {
        self.algorithm
    }

    pub fn bits(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Verifies a signature using this public key.
    ///
    /// The signature must be RSA PKCS #1 v1.5 with SHA-256 over `message`.
    /// Keys of an unsupported format never verify.
    pub fn verify(
        &self, message: &[u8], signature: &[u8]
    ) -> Result<(), SignatureVerificationError> {
        match self.algorithm {
            PublicKeyFormat::Rsa => {
                signature::UnparsedPublicKey::new(
                    &signature::RSA_PKCS1_2048_8192_SHA256,
                    self.bits()
                ).verify(message, signature).map_err(Into::into)
            }
            PublicKeyFormat::Unsupported => Err(SignatureVerificationError)
        }
    }

    /// Returns a bytes values of the encoded the *subjectPublicKeyInfo*.
    pub fn to_info_bytes(&self) -> Bytes {
        self.info.clone()
    }
}


/// # As `SubjectPublicKeyInfo`
///
/// Public keys are included in X.509 certificates as `SubjectPublicKeyInfo`
/// structures:
///
/// ```txt
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
impl PublicKey {
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let info = cons.capture_one()?;
        let (algorithm, bits) = info.clone().decode(|cons| {
            cons.take_sequence(|cons| {
                let algorithm = PublicKeyFormat::take_from(cons)?;
                let bits = BitString::take_from(cons)?;
                if bits.unused() != 0 {
                    return Err(cons.content_err(
                        "public key with partial octets"
                    ))
                }
                Ok((algorithm, bits.octet_bytes()))
            })
        }).map_err(DecodeError::convert)?;
        Ok(PublicKey { algorithm, bits, info: info.into_bytes() })
    }
}


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is normally the SHA-1 hash over the public key’s bits. Because
/// certificates are parsed leniently, identifiers of other lengths are kept
/// as they are.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct KeyIdentifier(Bytes);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifer from a encoded content.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = OctetString::from_content(content)?;
        if octets.is_empty() {
            return Err(content.content_err("empty key identifier"))
        }
        Ok(KeyIdentifier(octets.into_bytes()))
    }
}


//--- From and FromStr

impl From<Bytes> for KeyIdentifier {
    fn from(bytes: Bytes) -> Self {
        KeyIdentifier(bytes)
    }
}

impl FromStr for KeyIdentifier {
    type Err = KeyIdentifierError;

    /// Parses a key identifier from hex digits.
    ///
    /// The octets may optionally be separated by colons.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.bytes().filter(|&ch| ch != b':').count();
        if digits == 0 || digits % 2 != 0 {
            return Err(KeyIdentifierError)
        }
        let mut res = vec![0u8; digits / 2];
        hex::decode_into(value, &mut res).ok_or(KeyIdentifierError)?;
        Ok(KeyIdentifier(res.into()))
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::display_colon(self.as_slice()))
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//============ Error Types ===================================================

//------------ KeyIdentifierError --------------------------------------------

/// A string did not contain a key identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyIdentifierError;

impl fmt::Display for KeyIdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key identifier")
    }
}

impl error::Error for KeyIdentifierError { }


//------------ SignatureVerificationError ------------------------------------

/// An error happened while verifying a signature.
///
/// No further information is provided. This is on purpose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureVerificationError;

impl From<Unspecified> for SignatureVerificationError {
    fn from(_: Unspecified) -> Self {
        SignatureVerificationError
    }
}

impl fmt::Display for SignatureVerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("signature verification failed")
    }
}

impl error::Error for SignatureVerificationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_identifier_from_str() {
        let colon = KeyIdentifier::from_str(
            "CF:08:7E:0B:F2:D7:DB:1B:28:85:37:BF:C7:2D:B2:65:8C:87:66:BC"
        ).unwrap();
        let plain = KeyIdentifier::from_str(
            "cf087e0bf2d7db1b288537bfc72db2658c8766bc"
        ).unwrap();
        assert_eq!(colon, plain);
        assert_eq!(
            plain.to_string(),
            "CF:08:7E:0B:F2:D7:DB:1B:28:85:37:BF:C7:2D:B2:65:8C:87:66:BC"
        );
        assert!(KeyIdentifier::from_str("").is_err());
        assert!(KeyIdentifier::from_str("CF:0").is_err());
        assert!(KeyIdentifier::from_str("XY").is_err());
    }

    #[test]
    fn unsupported_key_never_verifies() {
        let key = PublicKey {
            algorithm: PublicKeyFormat::Unsupported,
            bits: Bytes::from_static(b"\x00"),
            info: Bytes::new(),
        };
        assert_eq!(
            key.verify(b"message", b"signature"),
            Err(SignatureVerificationError)
        );
    }
}
