//! Digest algorithm and operations.

use std::io;
use bcder::decode;
use bcder::decode::DecodeError;
use ring::digest;
use crate::oid;
use crate::repository::x509::AlgorithmIdentifier;

// Re-export the things from ring for actual digest generation.
pub use ring::digest::Digest;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms used by RPKI.
///
/// These are the algorithms used by the signature algorithms. For use in
/// RPKI, [RFC 7935] limits them to exactly one, SHA-256. Because of
/// that, this type is currently a zero-sized struct. If additional
/// algorithms are ever introduced in the future, it will change into an enum.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DigestAlgorithm(());


/// # Creating Digest Values
///
impl DigestAlgorithm {
    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        digest::digest(&digest::SHA256, data)
    }

    /// Returns a digest context for multi-step calculation of the digest.
    pub fn start(self) -> Context {
        Context(digest::Context::new(&digest::SHA256))
    }
}


/// # ASN.1 Values
///
/// Digest algorithms appear in CMS either alone or in sets with the following
/// syntax:
///
/// ```txt
/// DigestAlgorithmIdentifiers ::= SET OF DigestAlgorithmIdentifier
/// DigestAlgorithmIdentifier  ::= AlgorithmIdentifier
/// AlgorithmIdentifier        ::= SEQUENCE {
///      algorithm                 OBJECT IDENTIFIER,
///      parameters                ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// [RFC 7935] only allows SHA-256. Its algorithm identifier is defined in
/// [RFC 4055]. The _parameters_ field may either be absent or `NULL`.
///
/// Since the signer checks need to report a wrong algorithm rather than
/// refuse to parse the object, the signer info keeps the raw
/// [`AlgorithmIdentifier`] and converts it via [`from_identifier`] later.
///
/// [`from_identifier`]: #method.from_identifier
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
impl DigestAlgorithm {
    /// Takes and returns a single digest algorithm identifier.
    ///
    /// Returns a malformed error if the algorithm isn’t one of the allowed
    /// algorithms or if the value isn’t correctly encoded.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            oid::SHA256.skip_if(cons)?;
            cons.take_opt_null()?;
            Ok(DigestAlgorithm::default())
        })
    }

    /// Converts a generic algorithm identifier.
    ///
    /// Returns `None` if the identifier is not that of an allowed digest
    /// algorithm or carries parameters other than `NULL`.
    pub fn from_identifier(ident: &AlgorithmIdentifier) -> Option<Self> {
        if ident.algorithm() == &oid::SHA256 && ident.has_null_or_no_params() {
            Some(DigestAlgorithm::default())
        }
        else {
            None
        }
    }
}


//------------ Context -------------------------------------------------------

#[derive(Clone)]
pub struct Context(digest::Context);

impl Context {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data)
    }

    pub fn finish(self) -> Digest {
        self.0.finish()
    }
}

impl io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;

    #[test]
    fn take_from_with_and_without_params() {
        assert!(Mode::Der.decode(
            b"\x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01\x05\x00"
                .as_ref(),
            DigestAlgorithm::take_from
        ).is_ok());
        assert!(Mode::Der.decode(
            b"\x30\x0b\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01".as_ref(),
            DigestAlgorithm::take_from
        ).is_ok());
        // SHA-1 is not allowed.
        assert!(Mode::Der.decode(
            b"\x30\x07\x06\x05\x2b\x0e\x03\x02\x1a".as_ref(),
            DigestAlgorithm::take_from
        ).is_err());
    }

    #[test]
    fn context_matches_digest() {
        let alg = DigestAlgorithm::default();
        let mut context = alg.start();
        context.update(b"rpki ");
        context.update(b"test object");
        assert_eq!(
            context.finish().as_ref(),
            alg.digest(b"rpki test object").as_ref()
        );
    }
}
