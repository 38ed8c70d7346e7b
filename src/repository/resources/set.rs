//! Complete sets of resources and the resources of a certificate.

use std::fmt;
use std::str::FromStr;
use super::asres::{AsBlock, AsBlocks, FromStrError};
use super::choice::ResourcesChoice;
use super::ipres::{AddressFamily, IpBlocks};


//------------ ResourceSet ---------------------------------------------------

/// A set of ASN, IPv4 and IPv6 resources.
///
/// The set has value semantics. Blocks are kept normalized, so two sets
/// holding the same resources always compare equal.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ResourceSet {
    asn: AsBlocks,
    ipv4: IpBlocks,
    ipv6: IpBlocks,
}

impl ResourceSet {
    pub fn new(asn: AsBlocks, ipv4: IpBlocks, ipv6: IpBlocks) -> Self {
        ResourceSet { asn, ipv4, ipv6 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a set with all resources of all families.
    pub fn all() -> Self {
        ResourceSet {
            asn: AsBlocks::all(),
            ipv4: IpBlocks::all(AddressFamily::Ipv4),
            ipv6: IpBlocks::all(AddressFamily::Ipv6),
        }
    }

    /// Creates a set from separate strings for each family.
    pub fn from_strs(
        asn: &str, ipv4: &str, ipv6: &str
    ) -> Result<Self, FromStrError> {
        Ok(ResourceSet {
            asn: AsBlocks::from_str(asn)?,
            ipv4: IpBlocks::from_str_family(ipv4, AddressFamily::Ipv4)?,
            ipv6: IpBlocks::from_str_family(ipv6, AddressFamily::Ipv6)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.asn.is_empty() && self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    pub fn asn(&self) -> &AsBlocks {
        &self.asn
    }

    pub fn ipv4(&self) -> &IpBlocks {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &IpBlocks {
        &self.ipv6
    }

    /// Returns whether all resources of `other` are in `self`.
    pub fn contains(&self, other: &ResourceSet) -> bool {
        self.asn.contains(&other.asn)
        && self.ipv4.contains(&other.ipv4)
        && self.ipv6.contains(&other.ipv6)
    }

    pub fn union(&self, other: &ResourceSet) -> Self {
        ResourceSet {
            asn: self.asn.union(&other.asn),
            ipv4: self.ipv4.union(&other.ipv4),
            ipv6: self.ipv6.union(&other.ipv6),
        }
    }

    pub fn intersection(&self, other: &ResourceSet) -> Self {
        ResourceSet {
            asn: self.asn.intersection(&other.asn),
            ipv4: self.ipv4.intersection(&other.ipv4),
            ipv6: self.ipv6.intersection(&other.ipv6),
        }
    }

    /// Returns the resources in `self` that are not in `other`.
    pub fn difference(&self, other: &ResourceSet) -> Self {
        ResourceSet {
            asn: self.asn.difference(&other.asn),
            ipv4: self.ipv4.difference(&other.ipv4),
            ipv6: self.ipv6.difference(&other.ipv6),
        }
    }
}


//--- FromStr

impl FromStr for ResourceSet {
    type Err = FromStrError;

    /// Parses a comma separated list of resources of any family.
    ///
    /// Entries starting with `AS` are AS numbers or ranges, entries
    /// containing a colon are IPv6, everything else is IPv4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut asn: Vec<AsBlock> = Vec::new();
        let mut ipv4 = IpBlocks::empty();
        let mut ipv6 = IpBlocks::empty();
        for item in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.len() >= 2 && item[..2].eq_ignore_ascii_case("as") {
                asn.push(item.parse()?);
            }
            else if item.contains(':') {
                ipv6.push_str(item, AddressFamily::Ipv6)?;
            }
            else {
                ipv4.push_str(item, AddressFamily::Ipv4)?;
            }
        }
        Ok(ResourceSet { asn: asn.into_iter().collect(), ipv4, ipv6 })
    }
}


//--- Display

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if !self.asn.is_empty() {
            parts.push(self.asn.to_string());
        }
        if !self.ipv4.is_empty() {
            parts.push(self.ipv4.display(AddressFamily::Ipv4).to_string());
        }
        if !self.ipv6.is_empty() {
            parts.push(self.ipv6.display(AddressFamily::Ipv6).to_string());
        }
        f.write_str(&parts.join(", "))
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceSet {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        ResourceSet::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//------------ InheritedFamilies ---------------------------------------------

/// The resource families a certificate inherits from its issuer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InheritedFamilies {
    pub asn: bool,
    pub ipv4: bool,
    pub ipv6: bool,
}

impl InheritedFamilies {
    pub fn any(self) -> bool {
        self.asn || self.ipv4 || self.ipv6
    }
}


//------------ ResourceDescriptor --------------------------------------------

/// The resources claimed by a certificate.
///
/// RFC 3779 allows inheriting each family separately. A certificate that
/// inherits at least one family keeps its explicitly listed resources for
/// the other families alongside the inherited ones.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResourceDescriptor {
    /// All resources are listed explicitly.
    Explicit(ResourceSet),

    /// Some families are inherited from the issuer.
    Inherited {
        explicit: ResourceSet,
        families: InheritedFamilies,
    },
}

impl ResourceDescriptor {
    /// Creates the descriptor from the choices of the three families.
    ///
    /// Missing families are treated as explicitly empty.
    pub fn from_choices(
        asn: ResourcesChoice<AsBlocks>,
        ipv4: ResourcesChoice<IpBlocks>,
        ipv6: ResourcesChoice<IpBlocks>,
    ) -> Self {
        let families = InheritedFamilies {
            asn: asn.is_inherited(),
            ipv4: ipv4.is_inherited(),
            ipv6: ipv6.is_inherited(),
        };
        let explicit = ResourceSet::new(
            asn.to_blocks().unwrap_or_default(),
            ipv4.to_blocks().unwrap_or_default(),
            ipv6.to_blocks().unwrap_or_default(),
        );
        if families.any() {
            ResourceDescriptor::Inherited { explicit, families }
        }
        else {
            ResourceDescriptor::Explicit(explicit)
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, ResourceDescriptor::Inherited { .. })
    }

    /// Returns the families inherited from the issuer.
    pub fn inherited_families(&self) -> InheritedFamilies {
        match *self {
            ResourceDescriptor::Explicit(_) => InheritedFamilies::default(),
            ResourceDescriptor::Inherited { families, .. } => families,
        }
    }

    /// Returns the effective resources given the issuer’s resources.
    ///
    /// Inherited families are replaced by the issuer’s resources of that
    /// family.
    pub fn derive_resources(&self, parent: &ResourceSet) -> ResourceSet {
        match *self {
            ResourceDescriptor::Explicit(ref set) => set.clone(),
            ResourceDescriptor::Inherited { ref explicit, families } => {
                ResourceSet {
                    asn: if families.asn {
                        parent.asn.clone()
                    } else {
                        explicit.asn.clone()
                    },
                    ipv4: if families.ipv4 {
                        parent.ipv4.clone()
                    } else {
                        explicit.ipv4.clone()
                    },
                    ipv6: if families.ipv6 {
                        parent.ipv6.clone()
                    } else {
                        explicit.ipv6.clone()
                    },
                }
            }
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResourceDescriptor::Explicit(ref set) => write!(f, "{}", set),
            ResourceDescriptor::Inherited { ref explicit, families } => {
                let mut inherited = Vec::new();
                if families.asn {
                    inherited.push("asn");
                }
                if families.ipv4 {
                    inherited.push("ipv4");
                }
                if families.ipv6 {
                    inherited.push("ipv6");
                }
                write!(f, "inherit {}", inherited.join("+"))?;
                if !explicit.is_empty() {
                    write!(f, "; {}", explicit)?;
                }
                Ok(())
            }
        }
    }
}


//============ Tests =========================================================
