//! The choice between inherited and explicitly listed resources.

use std::fmt;


//------------ ResourcesChoice -----------------------------------------------

/// The resources of one kind a certificate claims.
///
/// This is generic over the type of explicitly listed resources.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResourcesChoice<T> {
    /// The extension does not list resources of this kind.
    Missing,

    /// Resources are to be inherited from the issuer.
    Inherit,

    /// The resources are provided as a set of blocks.
    Blocks(T),
}

impl<T> ResourcesChoice<T> {
    pub fn is_inherited(&self) -> bool {
        matches!(self, ResourcesChoice::Inherit)
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, ResourcesChoice::Missing)
    }

    /// Returns the explicitly listed blocks if there are any.
    pub fn blocks(&self) -> Option<&T> {
        match *self {
            ResourcesChoice::Blocks(ref blocks) => Some(blocks),
            _ => None
        }
    }

    /// Returns the explicit blocks, treating missing resources as empty.
    ///
    /// Returns `None` for inherited resources.
    pub fn to_explicit(&self) -> Option<T>
    where T: Clone + Default {
        match *self {
            ResourcesChoice::Missing => Some(T::default()),
            ResourcesChoice::Inherit => None,
            ResourcesChoice::Blocks(ref blocks) => Some(blocks.clone()),
        }
    }
}


//--- Display

impl<T: fmt::Display> fmt::Display for ResourcesChoice<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResourcesChoice::Missing => Ok(()),
            ResourcesChoice::Inherit => f.write_str("inherit"),
            ResourcesChoice::Blocks(ref inner) => inner.fmt(f)
        }
    }
}
