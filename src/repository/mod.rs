//! Parsing the objects of RPKI repositories.
//!
//! This module contains types to parse resource certificates and the CMS
//! envelope of RPKI signed objects as well as the IP and AS resources
//! carried by certificates.

//--- Re-exports
//
pub use self::cert::{Cert, TbsCert};
pub use self::content::{
    ContentEncoding, GhostbustersRecord, OpaqueContent, SignedContent,
};
pub use self::resources::{ResourceDescriptor, ResourceSet};
pub use self::sigobj::CmsSignedObject;


//--- Modules
//
pub mod cert;
pub mod content;
pub mod error;
pub mod ext;
pub mod resources;
pub mod signer;
pub mod sigobj;
pub mod x509;
