//! URIs.
//!
//! Certificates carry locations of related objects as URIs in their
//! information access and CRL distribution point extensions. The URIs may
//! use different schemes, most commonly rsync and HTTPS, and the lookup
//! functions select them by scheme. This module therefore provides a single
//! [`Uri`] type that keeps the scheme around.

use std::{error, fmt, str};
use std::str::FromStr;
use bytes::Bytes;


//------------ Uri -----------------------------------------------------------

/// An absolute URI.
///
/// This implements a simplified form of the URI defined in RFC 3986. Only
/// absolute URIs with a scheme are allowed.
///
/// Parsing is simplified in that it only checks for the correct structure
/// of the scheme and that no forbidden characters are present.
///
//  In particular, forbidden characters are
//
//     SPACE CONTROL " < > \\ ^ ` { | }
//
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Uri {
    /// The full URI.
    ///
    /// This is guaranteed to be ASCII.
    bytes: Bytes,

    /// The length of the scheme, excluding the colon.
    scheme_len: usize,
}

impl Uri {
    /// Creates a URI from a bytes value.
    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        if !is_uri_ascii(&bytes) {
            return Err(Error::NotAscii)
        }
        let scheme_len = match bytes.iter().position(|&ch| ch == b':') {
            Some(pos) => pos,
            None => return Err(Error::BadScheme)
        };
        let scheme = &bytes[..scheme_len];
        match scheme.split_first() {
            Some((first, tail)) if first.is_ascii_alphabetic() => {
                if !tail.iter().all(|&ch| {
                    ch.is_ascii_alphanumeric()
                        || ch == b'+' || ch == b'-' || ch == b'.'
                }) {
                    return Err(Error::BadScheme)
                }
            }
            _ => return Err(Error::BadScheme)
        }
        if bytes.len() == scheme_len + 1 {
            return Err(Error::BadUri)
        }
        Ok(Uri { bytes, scheme_len })
    }

    /// Creates a URI from an octets slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    /// Returns the scheme of the URI.
    ///
    /// The scheme is returned as it appears in the URI, i.e., it may not be
    /// in lower case.
    pub fn scheme(&self) -> &str {
        &self.as_str()[..self.scheme_len]
    }

    /// Returns whether the URI uses the given scheme.
    ///
    /// Schemes are compared case-insensitively.
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme().eq_ignore_ascii_case(scheme)
    }

    /// Returns whether this is an rsync URI.
    pub fn is_rsync(&self) -> bool {
        self.has_scheme("rsync")
    }

    /// Returns whether this is an HTTPS URI.
    pub fn is_https(&self) -> bool {
        self.has_scheme("https")
    }

    /// Returns the URI as a string slice.
    pub fn as_str(&self) -> &str {
        // We checked for ASCII before.
        str::from_utf8(self.bytes.as_ref()).unwrap_or_default()
    }

    /// Returns a reference to the underlying bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }
}


//--- FromStr

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}


//--- AsRef

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}


//--- Display and Debug

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uri({})", self.as_str())
    }
}


//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        self.as_str().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uri::from_bytes(Bytes::from(s)).map_err(serde::de::Error::custom)
    }
}


//------------ Helper Functions ----------------------------------------------

pub fn is_uri_ascii<S: AsRef<[u8]>>(slice: S) -> bool {
    slice.as_ref().iter().all(|&ch| {
        ch > b' ' && ch != b'"' && ch != b'<' && ch != b'>'
            && ch != b'\\' && ch != b'^' && ch != b'`' && ch != b'{'
            && ch != b'|' && ch != b'}' && ch < 0x7F
    })
}


//------------ Error ---------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    NotAscii,
    BadUri,
    BadScheme,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Error::NotAscii => "invalid characters",
            Error::BadUri => "bad URI",
            Error::BadScheme => "bad URI scheme",
        })
    }
}

impl error::Error for Error { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_reject_non_ascii_uri() {
        assert_eq!(
            Uri::from_str("rsync://example.net/ä"),
            Err(Error::NotAscii)
        );
        assert_eq!(
            Uri::from_str("rsync://example.net/a b"),
            Err(Error::NotAscii)
        );
    }

    #[test]
    fn should_reject_bad_scheme() {
        assert_eq!(Uri::from_str("example.net/foo"), Err(Error::BadScheme));
        assert_eq!(Uri::from_str("1sync://foo/"), Err(Error::BadScheme));
        assert_eq!(Uri::from_str("rs_nc://foo/"), Err(Error::BadScheme));
        assert_eq!(Uri::from_str("rsync:"), Err(Error::BadUri));
    }

    #[test]
    fn scheme_lookup() {
        let uri = Uri::from_str("rsync://example.net/repo/ta.cer").unwrap();
        assert_eq!(uri.scheme(), "rsync");
        assert!(uri.is_rsync());
        assert!(!uri.is_https());

        let uri = Uri::from_str("HTTPS://rrdp.example.net/n.xml").unwrap();
        assert_eq!(uri.scheme(), "HTTPS");
        assert!(uri.is_https());
        assert_eq!(uri.to_string(), "HTTPS://rrdp.example.net/n.xml");
    }
}
