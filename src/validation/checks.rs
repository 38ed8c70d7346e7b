//! The identifiers of all checks recorded in a validation log.
//!
//! The identifiers are stable strings so that consumers of a log can look
//! for specific checks.


//------------ CMS Envelope --------------------------------------------------

pub const CMS_DATA_PARSING: &str = "cms-data-parsing";
pub const DECODE_CONTENT: &str = "decode-content";
pub const ONLY_ONE_SIGNED_OBJECT: &str = "only-one-signed-object";
pub const CMS_CONTENT_PARSING: &str = "cms-content-parsing";
pub const GET_CERTS_AND_CRLS: &str = "get-certs-and-crls";
pub const ONLY_ONE_CERT_ALLOWED: &str = "only-one-cert-allowed";
pub const CERT_IS_X509CERT: &str = "cert-is-x509cert";
pub const CERT_PARSING: &str = "cert-parsing";
pub const CERT_IS_EE_CERT: &str = "cert-is-ee-cert";
pub const CERT_HAS_SKI: &str = "cert-has-ski";


//------------ Signer Info ---------------------------------------------------

pub const GET_SIGNER_INFO: &str = "get-signer-info";
pub const ONLY_ONE_SIGNER: &str = "only-one-signer";
pub const DIGEST_ALGORITHM: &str = "digest-algorithm";
pub const ENCRYPTION_ALGORITHM: &str = "encryption-algorithm";
pub const SIGNED_ATTRS_PRESENT: &str = "signed-attrs-present";
pub const CONTENT_TYPE_ATTR_PRESENT: &str = "content-type-attr-present";
pub const MSG_DIGEST_ATTR_PRESENT: &str = "msg-digest-attr-present";
pub const SIGNER_ID_MATCH: &str = "signer-id-match";
pub const SIGNING_TIME_ATTR_PRESENT: &str = "signing-time-attr-present";
pub const ONLY_ONE_SIGNING_TIME_ATTR: &str = "only-one-signing-time-attr";
pub const SIGNATURE_VERIFICATION: &str = "signature-verification";


//------------ Certificate Chain ---------------------------------------------

pub const CERT_SIGNATURE_VALID: &str = "cert-signature-valid";
pub const CERT_VALIDITY_PERIOD: &str = "cert-validity-period";
pub const CERT_ISSUER_IS_PARENT_SUBJECT: &str
    = "cert-issuer-is-parent-subject";
pub const CERT_AKI_MATCHES_PARENT_SKI: &str = "cert-aki-matches-parent-ski";
pub const CERT_NOT_REVOKED: &str = "cert-not-revoked";
pub const CERT_IS_CA: &str = "cert-is-ca";
pub const CERT_KEY_USAGE: &str = "cert-key-usage";
pub const CERT_HAS_RESOURCES: &str = "cert-has-resources";
pub const ROOT_INHERITS_RESOURCES: &str = "root-inherits-resources";
pub const RESOURCE_RANGE: &str = "resource-range";


//------------ Content -------------------------------------------------------

pub const UNSUPPORTED_GHOSTBUSTERS_RECORD: &str
    = "unsupported-ghostbusters-record";
