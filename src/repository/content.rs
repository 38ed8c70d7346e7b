//! The content of signed objects.
//!
//! What a signed object carries depends on its content type. The CMS
//! parser itself treats the content as opaque and hands it to a type
//! implementing [`SignedContent`] for decoding and, later, validation.

use std::convert::Infallible;
use bcder::{Captured, Mode, Oid};
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::oid;
use crate::validation::checks;
use crate::validation::log::ValidationLog;
use super::cert::Cert;


//------------ ContentEncoding -----------------------------------------------

/// How the content of a signed object is encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentEncoding {
    /// The content is a single ASN.1 value.
    Asn1,

    /// The content is not ASN.1 and is used as is.
    Raw,
}


//------------ SignedContent -------------------------------------------------

/// The content of a signed object of a certain type.
pub trait SignedContent: Sized {
    /// The encoding of the content.
    const ENCODING: ContentEncoding = ContentEncoding::Asn1;

    /// Decodes the content.
    ///
    /// For ASN.1 content, `content` contains exactly the first value found
    /// in the encapsulated content. For raw content, it contains all of it.
    fn decode_content(
        content_type: &Oid<Bytes>,
        content: Bytes,
        mode: Mode,
    ) -> Result<Self, DecodeError<Infallible>>;

    /// Performs content specific checks.
    ///
    /// This is called after the certificate of the object has been
    /// validated. The default implementation does nothing.
    fn validate_content(&self, cert: &Cert, log: &mut ValidationLog) {
        let _ = (cert, log);
    }
}


//------------ OpaqueContent -------------------------------------------------

/// Content of any type that is kept in its encoded form.
#[derive(Clone, Debug)]
pub struct OpaqueContent {
    content_type: Oid<Bytes>,
    content: Captured,
}

impl OpaqueContent {
    pub fn content_type(&self) -> &Oid<Bytes> {
        &self.content_type
    }

    /// Returns the encoded content value.
    pub fn as_slice(&self) -> &[u8] {
        self.content.as_slice()
    }
}

impl SignedContent for OpaqueContent {
    fn decode_content(
        content_type: &Oid<Bytes>,
        content: Bytes,
        mode: Mode,
    ) -> Result<Self, DecodeError<Infallible>> {
        Ok(OpaqueContent {
            content_type: content_type.clone(),
            content: mode.decode(content, |cons| cons.capture_one())?,
        })
    }
}


//------------ GhostbustersRecord --------------------------------------------

/// The content of a Ghostbusters record.
///
/// Ghostbusters records as defined in [RFC 6493] carry a vCard with
/// contact information. The vCard is kept as text and isn’t interpreted
/// beyond a few properties. Validating such a record always results in a
/// warning since their content can’t be checked.
///
/// [RFC 6493]: https://tools.ietf.org/html/rfc6493
#[derive(Clone, Debug)]
pub struct GhostbustersRecord {
    vcard: String,
}

impl GhostbustersRecord {
    /// Returns the vCard.
    pub fn vcard(&self) -> &str {
        &self.vcard
    }

    /// Returns the value of the first property with the given name.
    ///
    /// Property parameters are ignored. Folded lines are not unfolded.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.vcard.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.split(';').next().unwrap_or(key);
            if key.eq_ignore_ascii_case(name) {
                Some(value.trim_end())
            }
            else {
                None
            }
        })
    }

    /// Returns the formatted name of the contact.
    pub fn full_name(&self) -> Option<&str> {
        self.property("FN")
    }
}

impl SignedContent for GhostbustersRecord {
    const ENCODING: ContentEncoding = ContentEncoding::Raw;

    fn decode_content(
        content_type: &Oid<Bytes>,
        content: Bytes,
        _mode: Mode,
    ) -> Result<Self, DecodeError<Infallible>> {
        if content_type != &oid::CT_RPKI_GHOSTBUSTERS {
            return Err(DecodeError::content(
                "invalid content type", Default::default()
            ))
        }
        let vcard = String::from_utf8(content.to_vec()).map_err(|_| {
            DecodeError::content("vCard is not UTF-8", Default::default())
        })?;
        if !vcard.trim_start().to_ascii_uppercase().starts_with(
            "BEGIN:VCARD"
        ) {
            return Err(DecodeError::content(
                "content is not a vCard", Default::default()
            ))
        }
        Ok(GhostbustersRecord { vcard })
    }

    fn validate_content(&self, _cert: &Cert, log: &mut ValidationLog) {
        log.warn(checks::UNSUPPORTED_GHOSTBUSTERS_RECORD, Vec::new());
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const VCARD: &[u8] = b"BEGIN:VCARD\r\nVERSION:4.0\r\n\
        FN:Test Operator\r\nEMAIL;TYPE=work:noc@example.net\r\n\
        END:VCARD\r\n";

    fn ghostbusters() -> Oid<Bytes> {
        Oid(Bytes::from_static(oid::CT_RPKI_GHOSTBUSTERS.0))
    }

    #[test]
    fn opaque_content() {
        let content = OpaqueContent::decode_content(
            &ghostbusters(),
            Bytes::from_static(b"\x30\x03\x02\x01\x05"),
            Mode::Der
        ).unwrap();
        assert_eq!(content.as_slice(), b"\x30\x03\x02\x01\x05");
        assert!(OpaqueContent::decode_content(
            &ghostbusters(), Bytes::from_static(b"\x30\x05\x02"), Mode::Der
        ).is_err());
    }

    #[test]
    fn ghostbusters_record() {
        let record = GhostbustersRecord::decode_content(
            &ghostbusters(), Bytes::from_static(VCARD), Mode::Der
        ).unwrap();
        assert_eq!(record.full_name(), Some("Test Operator"));
        assert_eq!(record.property("email"), Some("noc@example.net"));
        assert_eq!(record.property("TEL"), None);

        assert!(GhostbustersRecord::decode_content(
            &ghostbusters(), Bytes::from_static(b"\x30\x00"), Mode::Der
        ).is_err());
        assert!(GhostbustersRecord::decode_content(
            &Oid(Bytes::from_static(oid::CT_ROUTE_ORIGIN_AUTHZ.0)),
            Bytes::from_static(VCARD),
            Mode::Der
        ).is_err());
    }

    #[test]
    fn ghostbusters_warns() {
        let record = GhostbustersRecord::decode_content(
            &ghostbusters(), Bytes::from_static(VCARD), Mode::Der
        ).unwrap();
        let cert = Cert::decode(
            include_bytes!("../../test-data/ee.cer").as_ref()
        ).unwrap();
        let mut log = ValidationLog::with_location("gbr");
        record.validate_content(&cert, &mut log);
        assert!(!log.has_failures());
        assert!(log.get("gbr", checks::UNSUPPORTED_GHOSTBUSTERS_RECORD)
            .unwrap().is_warned());
    }
}
