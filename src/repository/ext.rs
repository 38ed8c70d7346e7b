//! Reading the extensions of resource certificates.
//!
//! The methods in this module answer questions about a [`Cert`] that are
//! based on its extensions, such as where its manifest lives or whether it
//! may issue other certificates. They never fail: information that is
//! missing or malformed is treated as absent.
//!
//! The module also contains the decoders for the access description and
//! CRL distribution point extensions used by the certificate parser.

use bcder::decode;
use bcder::{ConstOid, Ia5String, Oid, Tag};
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::oid;
use crate::uri::Uri;
use crate::util::base64;
use super::cert::Cert;
use super::x509::skip_content;


//------------ AccessDescriptor ----------------------------------------------

/// A single access description of an information access extension.
///
/// ```text
/// AccessDescription  ::=  SEQUENCE {
///         accessMethod          OBJECT IDENTIFIER,
///         accessLocation        GeneralName  }
/// ```
///
/// Only access locations that are URIs are kept.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessDescriptor {
    method: Oid<Bytes>,
    uri: Uri,
}

impl AccessDescriptor {
    pub fn new(method: Oid<Bytes>, uri: Uri) -> Self {
        AccessDescriptor { method, uri }
    }

    pub fn method(&self) -> &Oid<Bytes> {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Takes the content of an information access extension.
    ///
    /// ```text
    /// AuthorityInfoAccessSyntax  ::=
    ///         SEQUENCE SIZE (1..MAX) OF AccessDescription
    /// ```
    ///
    /// The same syntax is used for the subject information access. The
    /// descriptors are returned in the order they appear in the extension.
    /// Access locations that aren’t URIs or whose URI we can’t parse are
    /// skipped.
    pub fn take_all_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<Self>, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let method = Oid::take_from(cons)?;
                if let Some(Some(uri)) = take_opt_uri(cons)? {
                    res.push(AccessDescriptor { method, uri });
                }
                cons.skip_all()
            })? { }
            Ok(res)
        })
    }
}


//------------ Decoding Helpers ----------------------------------------------

/// Takes a general name if it is a URI.
///
/// ```text
/// GeneralName ::= CHOICE {
///    ...
///    uniformResourceIdentifier       [6]     IA5String,
///    ... }
/// ```
///
/// Returns `Some(None)` if there was a URI we couldn’t parse.
fn take_opt_uri<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<Option<Option<Uri>>, DecodeError<S::Error>> {
    cons.take_opt_value_if(Tag::CTX_6, |content| {
        let uri = Ia5String::from_content(content)?;
        Ok(Uri::from_bytes(uri.into_bytes()).ok())
    })
}

/// Parses the CRL Distribution Points extension.
///
/// ```text
/// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
///
/// DistributionPoint ::= SEQUENCE {
///    distributionPoint       [0]     DistributionPointName OPTIONAL,
///    reasons                 [1]     ReasonFlags OPTIONAL,
///    cRLIssuer               [2]     GeneralNames OPTIONAL }
///
/// DistributionPointName ::= CHOICE {
///    fullName                [0]     GeneralNames,
///    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
/// ```
///
/// Returns the URIs of the full names of all distribution points in order.
/// If the content of the extension is malformed, the list is empty.
pub fn take_crl_distribution_points<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<Vec<Uri>, DecodeError<S::Error>> {
    let captured = cons.capture_one()?;
    Ok(captured.decode(|cons| {
        let mut res = Vec::new();
        cons.take_sequence(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                    cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                        while let Some(()) = cons.take_opt_value(
                            |tag, content| {
                                if tag == Tag::CTX_6 {
                                    let uri = Ia5String::from_content(
                                        content
                                    )?;
                                    if let Ok(uri) = Uri::from_bytes(
                                        uri.into_bytes()
                                    ) {
                                        res.push(uri)
                                    }
                                    Ok(())
                                }
                                else {
                                    skip_content(content)
                                }
                            }
                        )? { }
                        Ok(())
                    })?;
                    cons.skip_all()
                })?;
                cons.skip_all()
            })? { }
            Ok(())
        })?;
        Ok(res)
    }).unwrap_or_default())
}


//------------ Extension Reader ----------------------------------------------

/// # Reading Extensions
///
impl Cert {
    /// Returns whether the certificate is a CA certificate.
    ///
    /// This is true if the basic constraints extension is present and has
    /// the cA flag set.
    pub fn is_ca(&self) -> bool {
        self.basic_ca().unwrap_or(false)
    }

    /// Returns whether the certificate is an EE certificate.
    pub fn is_ee(&self) -> bool {
        !self.is_ca()
    }

    /// Returns whether the certificate is a root certificate.
    ///
    /// A root certificate is one where subject and issuer are the same.
    pub fn is_root(&self) -> bool {
        self.subject() == self.issuer()
    }

    /// Returns whether the certificate issues signed objects.
    ///
    /// This is the case if it has a manifest URI.
    pub fn is_object_issuer(&self) -> bool {
        self.manifest_uri().is_some()
    }

    /// Returns the first rsync URI for the given authority access method.
    pub fn find_first_aia_by_method(&self, method: ConstOid) -> Option<&Uri> {
        find_first_by_method(method, "rsync", self.authority_info_access())
    }

    /// Returns the first rsync URI for the given subject access method.
    pub fn find_first_sia_by_method(&self, method: ConstOid) -> Option<&Uri> {
        find_first_by_method(method, "rsync", self.subject_info_access())
    }

    /// Returns the first CRL distribution point with an rsync URI.
    pub fn find_first_rsync_crl_distribution_point(&self) -> Option<&Uri> {
        self.crl_distribution_points().iter().find(|uri| uri.is_rsync())
    }

    /// Returns the rsync URI of the issuer’s certificate.
    pub fn ca_issuer_uri(&self) -> Option<&Uri> {
        self.find_first_aia_by_method(oid::AD_CA_ISSUERS)
    }

    /// Returns the rsync URI of the manifest.
    pub fn manifest_uri(&self) -> Option<&Uri> {
        self.find_first_sia_by_method(oid::AD_RPKI_MANIFEST)
    }

    /// Returns the rsync URI of the publication point.
    pub fn repository_uri(&self) -> Option<&Uri> {
        self.find_first_sia_by_method(oid::AD_CA_REPOSITORY)
    }

    /// Returns the rsync URI of the signed object.
    pub fn signed_object_uri(&self) -> Option<&Uri> {
        self.find_first_sia_by_method(oid::AD_SIGNED_OBJECT)
    }

    /// Returns the HTTPS URI of the RRDP notification file.
    ///
    /// RFC 8182 requires this to be an HTTPS URI. Descriptors with any
    /// other scheme, including a pseudo `rrdp` scheme, are ignored.
    pub fn rrdp_notify_uri(&self) -> Option<&Uri> {
        find_first_by_method(
            oid::AD_RPKI_NOTIFY, "https", self.subject_info_access()
        )
    }

    /// Returns the DER encoded subject public key info in base64.
    ///
    /// This is the format used for the key in trust anchor locators.
    pub fn encoded_subject_public_key_info(&self) -> String {
        base64::Tal.encode(self.public_key().to_info_bytes().as_ref())
    }
}

/// Returns the URI of the first descriptor with the method and scheme.
pub fn find_first_by_method<'a>(
    method: ConstOid,
    scheme: &str,
    descriptors: &'a [AccessDescriptor],
) -> Option<&'a Uri> {
    descriptors.iter().find(|item| {
        item.method == method && item.uri.has_scheme(scheme)
    }).map(AccessDescriptor::uri)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;

    fn cert(data: &[u8]) -> Cert {
        Cert::decode(data).unwrap()
    }

    #[test]
    fn ta_reader() {
        let ta = cert(include_bytes!("../../test-data/ta.cer"));
        assert!(ta.is_ca());
        assert!(!ta.is_ee());
        assert!(ta.is_root());
        assert!(ta.is_object_issuer());
        assert_eq!(
            ta.repository_uri().unwrap().as_str(),
            "rsync://example.net/repo/ta/"
        );
        assert_eq!(
            ta.manifest_uri().unwrap().as_str(),
            "rsync://example.net/repo/ta/ta.mft"
        );
        assert_eq!(
            ta.rrdp_notify_uri().unwrap().as_str(),
            "https://rrdp.example.net/notification.xml"
        );
        assert!(ta.find_first_sia_by_method(oid::AD_RPKI_NOTIFY).is_none());
        assert!(ta.crl_distribution_points().is_empty());
        assert!(ta.ca_issuer_uri().is_none());
        assert_eq!(
            base64::Tal.decode(
                &ta.encoded_subject_public_key_info()
            ).unwrap(),
            ta.public_key().to_info_bytes().as_ref()
        );
    }

    #[test]
    fn ca_reader() {
        let ca = cert(include_bytes!("../../test-data/ca.cer"));
        assert!(ca.is_ca());
        assert!(!ca.is_root());
        assert_eq!(
            ca.ca_issuer_uri().unwrap().as_str(),
            "rsync://example.net/repo/ta.cer"
        );
        assert_eq!(
            ca.find_first_rsync_crl_distribution_point().unwrap().as_str(),
            "rsync://example.net/repo/ta/ta.crl"
        );
        assert_eq!(
            ca.manifest_uri().unwrap().as_str(),
            "rsync://example.net/repo/ca/ca.mft"
        );
        assert!(ca.rrdp_notify_uri().is_none());
    }

    #[test]
    fn ee_reader() {
        let ee = cert(include_bytes!("../../test-data/ee.cer"));
        assert!(ee.is_ee());
        assert!(!ee.is_root());
        assert!(!ee.is_object_issuer());
        assert!(ee.repository_uri().is_none());
        assert_eq!(
            ee.signed_object_uri().unwrap().as_str(),
            "rsync://example.net/repo/ca/object.sig"
        );
        let dps: Vec<_> = ee.crl_distribution_points().iter().map(|uri| {
            uri.as_str()
        }).collect();
        assert_eq!(
            dps,
            ["http://example.net/ca.crl", "rsync://example.net/repo/ca/ca.crl"]
        );
        assert_eq!(
            ee.find_first_rsync_crl_distribution_point().unwrap().as_str(),
            "rsync://example.net/repo/ca/ca.crl"
        );
    }

    #[test]
    fn notify_uri_scheme() {
        let notify = Oid(Bytes::from_static(oid::AD_RPKI_NOTIFY.0));
        let descriptors = [
            AccessDescriptor::new(
                notify.clone(),
                Uri::from_slice(b"rrdp://rrdp.example.net/notify.xml").unwrap()
            ),
            AccessDescriptor::new(
                notify,
                Uri::from_slice(b"https://rrdp.example.net/notify.xml").unwrap()
            ),
        ];
        assert_eq!(
            find_first_by_method(
                oid::AD_RPKI_NOTIFY, "https", &descriptors
            ).unwrap().as_str(),
            "https://rrdp.example.net/notify.xml"
        );
        assert!(find_first_by_method(
            oid::AD_RPKI_MANIFEST, "https", &descriptors
        ).is_none());
    }

    #[test]
    fn malformed_crl_distribution_points() {
        // SEQUENCE { INTEGER 1 }
        let uris = Mode::Der.decode(
            b"\x30\x03\x02\x01\x01".as_ref(),
            take_crl_distribution_points
        ).unwrap();
        assert!(uris.is_empty());

        // SEQUENCE { SEQUENCE { [0] { [0] { [6] "rsync://a/b" } } } }
        let uris = Mode::Der.decode(
            b"\x30\x13\x30\x11\xa0\x0f\xa0\x0d\x86\x0brsync://a/b".as_ref(),
            take_crl_distribution_points
        ).unwrap();
        assert_eq!(uris.len(), 1);
        assert_eq!(uris[0].as_str(), "rsync://a/b");
    }
}
