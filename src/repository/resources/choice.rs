//! An enum offering the choice between inherited and included resources.

use std::fmt;


//------------ ResourcesChoice -----------------------------------------------

/// The option to either include or inherit resources.
///
/// This is generic over the type of included resources. One value describes
/// a single resource family of a certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResourcesChoice<T> {
    /// The certificate doesn’t mention this family at all.
    Missing,

    /// Resources are to be inherited from the issuer.
    Inherit,

    /// The resources are provided as a set of blocks.
    Blocks(T),
}

impl<T> ResourcesChoice<T> {
    /// Returns whether the resources are of the inherited variant.
    pub fn is_inherited(&self) -> bool {
        matches!(self, ResourcesChoice::Inherit)
    }

    /// Returns whether the resources are present.
    pub fn is_present(&self) -> bool {
        !matches!(self, ResourcesChoice::Missing)
    }

    /// Returns the explicitly listed blocks.
    ///
    /// Missing resources result in a default, i.e., empty `T`. Inherited
    /// resources result in `None`.
    pub fn to_blocks(&self) -> Option<T>
    where T: Clone + Default {
        match self {
            ResourcesChoice::Missing => Some(T::default()),
            ResourcesChoice::Inherit => None,
            ResourcesChoice::Blocks(ref some) => Some(some.clone()),
        }
    }
}


//--- Default

impl<T> Default for ResourcesChoice<T> {
    fn default() -> Self {
        ResourcesChoice::Missing
    }
}


//--- Display

impl<T: fmt::Display> fmt::Display for ResourcesChoice<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResourcesChoice::Missing => Ok(()),
            ResourcesChoice::Inherit => write!(f, "inherit"),
            ResourcesChoice::Blocks(ref inner) => inner.fmt(f)
        }
    }
}
