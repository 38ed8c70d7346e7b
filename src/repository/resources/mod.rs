//! Handling of IP and AS resources.
//!
//! The types in this module implement the certificate extensions defined in
//! [RFC 3779] for including IP address and autonomous system resources in
//! certificates. Both the original extensions and the ones defined in
//! [RFC 8360] decode into the same types.
//!
//! The resources of a certificate are described by a
//! [`ResourceDescriptor`] which is either a complete [`ResourceSet`] or a
//! partial set plus the families inherited from the issuer.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 8360]: https://tools.ietf.org/html/rfc8360

pub use self::asres::{AsBlock, AsBlocks, Asn, FromStrError};
pub use self::choice::ResourcesChoice;
pub use self::ipres::{AddressFamily, IpBlock, IpBlocks};
pub use self::set::{InheritedFamilies, ResourceDescriptor, ResourceSet};

mod asres;
mod chain;
mod choice;
mod ipres;
mod set;
