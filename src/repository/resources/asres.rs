//! Autonomous System identifier resources.
//!
//! The types herein implement the AS identifier delegation extension of
//! [RFC 3779] in the form restricted by [RFC 6487]: RDI values are not
//! allowed, only the `asnum` choice may appear.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::Tag;
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::repository::x509::encode_extension;
use super::chain::{Block, Chain};
use super::choice::ResourcesChoice;
use super::ipres::FromStrError;


//------------ AsResources ---------------------------------------------------

/// The AS resources of a certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsResources(ResourcesChoice<AsBlocks>);

impl AsResources {
    pub fn inherit() -> Self {
        AsResources(ResourcesChoice::Inherit)
    }

    pub fn missing() -> Self {
        AsResources(ResourcesChoice::Missing)
    }

    /// Creates resources from the given blocks.
    ///
    /// Empty blocks are represented as missing resources.
    pub fn blocks(blocks: AsBlocks) -> Self {
        if blocks.is_empty() {
            AsResources::missing()
        }
        else {
            AsResources(ResourcesChoice::Blocks(blocks))
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.0.is_inherited()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_present()
    }

    /// Returns the explicit blocks or `None` if the resources are inherited.
    pub fn to_explicit(&self) -> Option<AsBlocks> {
        self.0.to_explicit()
    }
}

/// # Decoding and Encoding
///
/// ```txt
/// ASIdentifiers       ::= SEQUENCE {
///     asnum               [0] EXPLICIT ASIdentifierChoice OPTIONAL,
///     rdi                 [1] EXPLICIT ASIdentifierChoice OPTIONAL }
///
/// ASIdentifierChoice  ::= CHOICE {
///     inherit             NULL,
///     asIdsOrRanges       SEQUENCE OF ASIdOrRange }
///
/// ASIdOrRange         ::= CHOICE {
///     id                  ASId,
///     range               ASRange }
///
/// ASRange             ::= SEQUENCE {
///     min                 ASId,
///     max                 ASId }
///
/// ASId                ::= INTEGER
/// ```
impl AsResources {
    /// Takes the value of the extension.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.take_constructed_if(Tag::CTX_0, |cons| {
                cons.take_value(|tag, content| {
                    if tag == Tag::NULL {
                        content.to_null()?;
                        Ok(ResourcesChoice::Inherit)
                    }
                    else if tag == Tag::SEQUENCE {
                        AsBlocks::parse_content(content)
                            .map(ResourcesChoice::Blocks)
                    }
                    else {
                        Err(content.content_err("invalid AS resources"))
                    }
                })
            })
        }).map(AsResources)
    }

    /// Returns an encoder for the value of the extension.
    ///
    /// Missing resources encode as an empty sequence.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        let choice = match self.0 {
            ResourcesChoice::Missing => None,
            ResourcesChoice::Inherit => {
                Some(encode::Choice2::One(().encode()))
            }
            ResourcesChoice::Blocks(ref blocks) => {
                Some(encode::Choice2::Two(blocks.encode_ref()))
            }
        };
        encode::sequence(
            choice.map(|choice| encode::sequence_as(Tag::CTX_0, choice))
        )
    }

    /// Returns an encoder for the complete extension.
    ///
    /// Returns `None` if there are no AS resources.
    pub fn encode_extension(
        &self, critical: bool
    ) -> Option<impl encode::Values + '_> {
        if !self.is_present() {
            return None
        }
        Some(encode_extension(
            &oid::PE_AUTONOMOUS_SYS_IDS, critical, self.encode_ref()
        ))
    }
}


//--- Display

impl fmt::Display for AsResources {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


//------------ AsBlocks ------------------------------------------------------

/// A normalized set of AS numbers.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AsBlocks(Chain<AsBlock>);

impl AsBlocks {
    pub fn empty() -> Self {
        AsBlocks(Chain::empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AsBlock> + '_ {
        self.0.iter().copied()
    }

    pub fn contains_asn(&self, asn: Asn) -> bool {
        self.0.iter().any(|block| block.min <= asn && asn <= block.max)
    }

    /// Returns whether all AS numbers in `other` are also in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        AsBlocks(self.0.union(&other.0))
    }

    pub fn difference(&self, other: &Self) -> Self {
        AsBlocks(self.0.difference(&other.0))
    }

    fn parse_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let mut blocks = Vec::new();
        while let Some(block) = AsBlock::take_opt_from(cons)? {
            blocks.push(block)
        }
        Ok(blocks.into_iter().collect())
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(|block| block.encode()))
        )
    }
}


//--- FromIterator and FromStr

impl FromIterator<AsBlock> for AsBlocks {
    fn from_iter<I: IntoIterator<Item = AsBlock>>(iter: I) -> Self {
        AsBlocks(iter.into_iter().collect())
    }
}

impl FromStr for AsBlocks {
    type Err = FromStrError;

    /// Parses a comma separated list of AS blocks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').map(|s| s.trim()).filter(|s| !s.is_empty())
            .map(AsBlock::from_str).collect()
    }
}


//--- Display

impl fmt::Display for AsBlocks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for block in self.0.iter() {
            if first {
                first = false
            }
            else {
                f.write_str(", ")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}


//------------ AsBlock -------------------------------------------------------

/// A consecutive range of AS numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AsBlock {
    min: Asn,
    max: Asn,
}

impl AsBlock {
    /// Creates a block from its smallest and largest AS number.
    ///
    /// Returns `None` if `min` is larger than `max`.
    pub fn from_range(min: Asn, max: Asn) -> Option<Self> {
        if min <= max {
            Some(AsBlock { min, max })
        }
        else {
            None
        }
    }

    pub fn min(self) -> Asn {
        self.min
    }

    pub fn max(self) -> Asn {
        self.max
    }

    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::INTEGER {
                content.to_u32().map(|id| AsBlock::from(Asn(id)))
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                let min = Asn::take_from(cons)?;
                let max = Asn::take_from(cons)?;
                AsBlock::from_range(min, max).ok_or_else(|| {
                    cons.content_err("invalid AS range")
                })
            }
            else {
                Err(content.content_err("invalid AS resources"))
            }
        })
    }

    fn encode(self) -> impl encode::Values {
        if self.min == self.max {
            encode::Choice2::One(self.min.encode())
        }
        else {
            encode::Choice2::Two(encode::sequence((
                self.min.encode(), self.max.encode()
            )))
        }
    }
}


//--- From and FromStr

impl From<Asn> for AsBlock {
    fn from(asn: Asn) -> Self {
        AsBlock { min: asn, max: asn }
    }
}

impl FromStr for AsBlock {
    type Err = FromStrError;

    /// Parses a single AS number or a range `min-max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((min, max)) => {
                AsBlock::from_range(
                    Asn::from_str(min.trim())?, Asn::from_str(max.trim())?
                ).ok_or(FromStrError::Range)
            }
            None => Asn::from_str(s.trim()).map(Into::into)
        }
    }
}


//--- Block

impl Block for AsBlock {
    type Item = Asn;

    fn new(min: Asn, max: Asn) -> Self {
        AsBlock { min, max }
    }

    fn min(&self) -> Asn {
        self.min
    }

    fn max(&self) -> Asn {
        self.max
    }

    fn next(item: Asn) -> Option<Asn> {
        item.0.checked_add(1).map(Asn)
    }

    fn prev(item: Asn) -> Option<Asn> {
        item.0.checked_sub(1).map(Asn)
    }
}


//--- Display

impl fmt::Display for AsBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        }
        else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}


//------------ Asn -----------------------------------------------------------

/// An AS number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asn(u32);

impl Asn {
    pub const MIN: Asn = Asn(u32::MIN);
    pub const MAX: Asn = Asn(u32::MAX);

    pub fn from_u32(value: u32) -> Self {
        Asn(value)
    }

    pub fn into_u32(self) -> u32 {
        self.0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_u32().map(Asn)
    }

    pub fn encode(self) -> impl encode::Values {
        self.0.encode()
    }
}

impl From<u32> for Asn {
    fn from(id: u32) -> Self {
        Asn(id)
    }
}

impl From<Asn> for u32 {
    fn from(asn: Asn) -> u32 {
        asn.0
    }
}

impl FromStr for Asn {
    type Err = FromStrError;

    /// Parses an AS number with or without the `AS` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("AS").or_else(|| s.strip_prefix("as"))
            .unwrap_or(s);
        u32::from_str(s).map(Asn).map_err(|_| FromStrError::Asn)
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}


//============ Tests =========================================================
