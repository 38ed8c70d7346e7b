//! Validation of RPKI signed objects and certificate chains.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. It allows owners of IP address prefixes
//! and AS numbers to publish cryptographically signed statements about
//! these resources.
//!
//! This crate contains two parts. The [`repository`] module parses RPKI
//! resource certificates and the CMS envelope of signed objects, checking
//! the envelope against the profile of [RFC 6488]. The [`validation`]
//! module validates certificates along a certification path, including a
//! loose check of the resources claimed by each certificate.
//!
//! All checks performed are recorded in a
//! [`ValidationLog`][validation::ValidationLog] rather than returned as
//! errors, so that a full account of the problems with an object is
//! available.
//!
//! [RFC 6488]: https://tools.ietf.org/html/rfc6488

pub mod crypto;
pub mod oid;
pub mod repository;
pub mod uri;
pub mod validation;

mod util;
