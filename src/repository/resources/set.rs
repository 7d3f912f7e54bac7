//! A set of AS numbers and IP addresses of both families.

use std::fmt;
use std::str::FromStr;
use super::asres::{AsBlock, AsBlocks};
use super::ipres::{AddressFamily, FromStrError, IpBlock, IpBlocks};


//------------ ResourceSet ---------------------------------------------------

/// A set of AS, IPv4 and IPv6 resources.
///
/// This is the value the validator works with when it compares the
/// resources of a certificate or signed object with those of its issuer.
/// In its textual form, the resources are given as a comma separated list
/// of AS numbers or ranges (`AS64496-AS64511`), IP prefixes, IP ranges,
/// and single addresses.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ResourceSet {
    asns: AsBlocks,
    v4: IpBlocks,
    v6: IpBlocks,
}

impl ResourceSet {
    pub fn new(asns: AsBlocks, v4: IpBlocks, v6: IpBlocks) -> Self {
        ResourceSet { asns, v4, v6 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn asns(&self) -> &AsBlocks {
        &self.asns
    }

    pub fn v4(&self) -> &IpBlocks {
        &self.v4
    }

    pub fn v6(&self) -> &IpBlocks {
        &self.v6
    }

    pub fn is_empty(&self) -> bool {
        self.asns.is_empty() && self.v4.is_empty() && self.v6.is_empty()
    }

    /// Returns whether all resources of `other` are also in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.asns.contains(&other.asns)
            && self.v4.contains(&other.v4)
            && self.v6.contains(&other.v6)
    }

    /// Returns a set with the resources of both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        ResourceSet {
            asns: self.asns.union(&other.asns),
            v4: self.v4.union(&other.v4),
            v6: self.v6.union(&other.v6),
        }
    }

    /// Returns the resources of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        ResourceSet {
            asns: self.asns.difference(&other.asns),
            v4: self.v4.difference(&other.v4),
            v6: self.v6.difference(&other.v6),
        }
    }
}


//--- FromStr

impl FromStr for ResourceSet {
    type Err = FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut asns = Vec::new();
        let mut v4 = Vec::new();
        let mut v6 = Vec::new();
        for item in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.starts_with("AS") || item.starts_with("as") {
                asns.push(AsBlock::from_str(item)?);
                continue
            }
            match IpBlock::parse(item)? {
                (AddressFamily::Ipv4, block) => v4.push(block),
                (AddressFamily::Ipv6, block) => v6.push(block),
            }
        }
        Ok(ResourceSet {
            asns: asns.into_iter().collect(),
            v4: v4.into_iter().collect(),
            v6: v6.into_iter().collect(),
        })
    }
}


//--- Display

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";
        if !self.asns.is_empty() {
            write!(f, "{}", self.asns)?;
            sep = ", ";
        }
        if !self.v4.is_empty() {
            write!(f, "{}{}", sep, self.v4.display(AddressFamily::Ipv4))?;
            sep = ", ";
        }
        if !self.v6.is_empty() {
            write!(f, "{}{}", sep, self.v6.display(AddressFamily::Ipv6))?;
        }
        Ok(())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceSet {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceSet::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//============ Tests =========================================================
