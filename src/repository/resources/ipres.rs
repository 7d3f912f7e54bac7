//! IP address resources.
//!
//! The types in this module implement the IP address delegation extension
//! defined in section 2 of [RFC 3779] as profiled by section 4.8.10 of
//! [RFC 6487]. Addresses of both families are kept as 128 bit values with
//! IPv4 addresses occupying the upper 32 bits. This way, prefixes and
//! ranges of both families can share one implementation as long as they
//! are never mixed up.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::{error, fmt, io};
use std::iter::FromIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{BitString, Mode, OctetString, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::repository::x509::encode_extension;
use super::chain::{Block, Chain};
use super::choice::ResourcesChoice;


//------------ IpResources ---------------------------------------------------

/// The IP address resources of one address family of a certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpResources(ResourcesChoice<IpBlocks>);

impl IpResources {
    pub fn inherit() -> Self {
        IpResources(ResourcesChoice::Inherit)
    }

    pub fn missing() -> Self {
        IpResources(ResourcesChoice::Missing)
    }

    /// Creates resources from the given blocks.
    ///
    /// Empty blocks are represented as missing resources.
    pub fn blocks(blocks: IpBlocks) -> Self {
        if blocks.is_empty() {
            IpResources::missing()
        }
        else {
            IpResources(ResourcesChoice::Blocks(blocks))
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.0.is_inherited()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_present()
    }

    /// Returns the explicit blocks or `None` if the resources are inherited.
    pub fn to_explicit(&self) -> Option<IpBlocks> {
        self.0.to_explicit()
    }
}

/// # Decoding and Encoding
///
/// ```txt
/// IPAddrBlocks        ::= SEQUENCE OF IPAddressFamily
///
/// IPAddressFamily     ::= SEQUENCE {
///     addressFamily        OCTET STRING (SIZE (2..3)),
///     ipAddressChoice      IPAddressChoice }
///
/// IPAddressChoice     ::= CHOICE {
///     inherit              NULL,
///     addressesOrRanges    SEQUENCE OF IPAddressOrRange }
/// ```
///
/// RFC 6487 limits the address families to IPv4 and IPv6 without a SAFI.
/// Each family may appear at most once and at least one must be present.
impl IpResources {
    /// Takes the value of the extension, returning IPv4 and IPv6 resources.
    pub fn take_families_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<(Self, Self), DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut v4 = None;
            let mut v6 = None;
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let family = AddressFamily::take_from(cons)?;
                let target = match family {
                    AddressFamily::Ipv4 => &mut v4,
                    AddressFamily::Ipv6 => &mut v6,
                };
                if target.is_some() {
                    return Err(cons.content_err("duplicate address family"))
                }
                *target = Some(Self::take_from(cons, family)?);
                Ok(())
            })? { }
            if v4.is_none() && v6.is_none() {
                return Err(cons.content_err("empty IP address delegation"))
            }
            Ok((
                v4.unwrap_or_else(IpResources::missing),
                v6.unwrap_or_else(IpResources::missing),
            ))
        })
    }

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::NULL {
                content.to_null()?;
                Ok(ResourcesChoice::Inherit)
            }
            else if tag == Tag::SEQUENCE {
                IpBlocks::parse_content(content, family)
                    .map(ResourcesChoice::Blocks)
            }
            else {
                Err(content.content_err("invalid IP resources"))
            }
        }).map(IpResources)
    }

    fn encode_family(
        &self, family: AddressFamily
    ) -> Option<impl encode::Values + '_> {
        let choice = match self.0 {
            ResourcesChoice::Missing => return None,
            ResourcesChoice::Inherit => encode::Choice2::One(().encode()),
            ResourcesChoice::Blocks(ref blocks) => {
                encode::Choice2::Two(blocks.encode_ref())
            }
        };
        Some(encode::sequence((family.encode(), choice)))
    }

    /// Returns an encoder for the value of the extension.
    pub fn encode_families<'a>(
        v4: &'a Self, v6: &'a Self
    ) -> impl encode::Values + 'a {
        encode::sequence((
            v4.encode_family(AddressFamily::Ipv4),
            v6.encode_family(AddressFamily::Ipv6),
        ))
    }

    /// Returns an encoder for the complete extension.
    ///
    /// Returns `None` if neither family has resources.
    pub fn encode_extension<'a>(
        v4: &'a Self, v6: &'a Self, critical: bool,
    ) -> Option<impl encode::Values + 'a> {
        if !v4.is_present() && !v6.is_present() {
            return None
        }
        Some(encode_extension(
            &oid::PE_IP_ADDR_BLOCK, critical, Self::encode_families(v4, v6)
        ))
    }
}


//------------ IpBlocks ------------------------------------------------------

/// A normalized set of IP addresses of a single address family.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct IpBlocks(Chain<IpBlock>);

impl IpBlocks {
    pub fn empty() -> Self {
        IpBlocks(Chain::empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IpBlock> + '_ {
        self.0.iter().copied()
    }

    /// Returns whether all addresses in `other` are also in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        IpBlocks(self.0.union(&other.0))
    }

    pub fn difference(&self, other: &Self) -> Self {
        IpBlocks(self.0.difference(&other.0))
    }

    /// Returns an object displaying the blocks as the given family.
    pub fn display(&self, family: AddressFamily) -> DisplayIpBlocks {
        DisplayIpBlocks { blocks: self, family }
    }

    /// Parses the content of a `SEQUENCE OF IPAddressOrRange`.
    ///
    /// The entries are normalized rather than checked for being in
    /// canonical order.
    fn parse_content<S: decode::Source>(
        content: &mut decode::Content<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let mut blocks = Vec::new();
        while let Some(block) = IpBlock::take_opt_from(cons, family)? {
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


//--- FromIterator

impl FromIterator<IpBlock> for IpBlocks {
    fn from_iter<I: IntoIterator<Item = IpBlock>>(iter: I) -> Self {
        IpBlocks(iter.into_iter().collect())
    }
}

impl FromIterator<Prefix> for IpBlocks {
    fn from_iter<I: IntoIterator<Item = Prefix>>(iter: I) -> Self {
        iter.into_iter().map(IpBlock::from).collect()
    }
}


//------------ DisplayIpBlocks -----------------------------------------------

/// Helper type for displaying IP blocks of a known family.
pub struct DisplayIpBlocks<'a> {
    blocks: &'a IpBlocks,
    family: AddressFamily,
}

impl fmt::Display for DisplayIpBlocks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for block in self.blocks.iter() {
            if first {
                first = false
            }
            else {
                f.write_str(", ")?;
            }
            block.fmt_family(self.family, f)?;
        }
        Ok(())
    }
}


//------------ IpBlock -------------------------------------------------------

/// A consecutive range of IP addresses.
///
/// ```txt
/// IPAddressOrRange    ::= CHOICE {
///     addressPrefix        IPAddress,
///     addressRange         IPAddressRange }
///
/// IPAddressRange      ::= SEQUENCE {
///     min                  IPAddress,
///     max                  IPAddress }
///
/// IPAddress           ::= BIT STRING
/// ```
///
/// The block is stored as its smallest and largest address. Whether it is
/// encoded as a prefix or a range is decided when encoding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IpBlock {
    min: Addr,
    max: Addr,
}

impl IpBlock {
    pub fn min(self) -> Addr {
        self.min
    }

    pub fn max(self) -> Addr {
        self.max
    }

    /// Returns the block as a prefix if it is one.
    pub fn as_prefix(self) -> Option<Prefix> {
        let diff = self.min.0 ^ self.max.0;
        if diff & diff.wrapping_add(1) != 0 || self.min.0 & diff != 0 {
            return None
        }
        Some(Prefix::new(self.min, diff.leading_zeros() as u8))
    }

    /// Parses a prefix, a range `min-max`, or a single address.
    pub fn parse(s: &str) -> Result<(AddressFamily, Self), FromStrError> {
        let s = s.trim();
        if let Some((addr, len)) = s.split_once('/') {
            let (family, addr) = parse_addr(addr)?;
            let len = u8::from_str(len.trim()).map_err(|_| {
                FromStrError::PrefixLength
            })?;
            if len > family.max_addr_len() {
                return Err(FromStrError::PrefixLength)
            }
            Ok((family, Prefix::new(addr, len).into()))
        }
        else if let Some((min, max)) = s.split_once('-') {
            let (family, min) = parse_addr(min)?;
            let (max_family, max) = parse_addr(max)?;
            let max = max.to_max(family.max_addr_len());
            if family != max_family || max < min {
                return Err(FromStrError::Range)
            }
            Ok((family, IpBlock { min, max }))
        }
        else {
            let (family, addr) = parse_addr(s)?;
            Ok((family, Prefix::new(addr, family.max_addr_len()).into()))
        }
    }

    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::BIT_STRING {
                Prefix::from_content(content, family).map(Into::into)
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                let min = cons.take_value_if(Tag::BIT_STRING, |content| {
                    Prefix::from_content(content, family)
                })?.min();
                let max = cons.take_value_if(Tag::BIT_STRING, |content| {
                    Prefix::from_content(content, family)
                })?.max();
                if max < min {
                    return Err(cons.content_err("invalid IP address range"))
                }
                Ok(IpBlock { min, max })
            }
            else {
                Err(content.content_err("invalid IP address or range"))
            }
        })
    }

    fn encode(self) -> impl encode::Values {
        match self.as_prefix() {
            Some(prefix) => encode::Choice2::One(prefix.encode()),
            None => {
                encode::Choice2::Two(encode::sequence((
                    Prefix::range_min(self.min).encode(),
                    Prefix::range_max(self.max).encode(),
                )))
            }
        }
    }

    fn fmt_family(
        self, family: AddressFamily, f: &mut fmt::Formatter
    ) -> fmt::Result {
        match self.as_prefix() {
            Some(prefix) => prefix.fmt_family(family, f),
            None => {
                self.min.fmt_family(family, f)?;
                f.write_str("-")?;
                self.max.fmt_family(family, f)
            }
        }
    }
}


//--- From

impl From<Prefix> for IpBlock {
    fn from(prefix: Prefix) -> Self {
        IpBlock { min: prefix.min(), max: prefix.max() }
    }
}


//--- Block

impl Block for IpBlock {
    type Item = Addr;

    fn new(min: Addr, max: Addr) -> Self {
        IpBlock { min, max }
    }

    fn min(&self) -> Addr {
        self.min
    }

    fn max(&self) -> Addr {
        self.max
    }

    fn next(item: Addr) -> Option<Addr> {
        item.0.checked_add(1).map(Addr)
    }

    fn prev(item: Addr) -> Option<Addr> {
        item.0.checked_sub(1).map(Addr)
    }
}


//------------ Prefix --------------------------------------------------------

/// An IP address prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Prefix {
    addr: Addr,
    len: u8,
}

impl Prefix {
    /// Creates a new prefix, clearing all bits of `addr` beyond `len`.
    ///
    /// # Panics
    ///
    /// This function panics if `len` is larger than 128.
    pub fn new(addr: Addr, len: u8) -> Self {
        assert!(len <= 128);
        Prefix { addr: addr.to_min(len), len }
    }

    /// Returns the shortest prefix whose smallest address is `addr`.
    fn range_min(addr: Addr) -> Self {
        Prefix::new(addr, 128 - addr.0.trailing_zeros() as u8)
    }

    /// Returns the shortest prefix whose largest address is `addr`.
    fn range_max(addr: Addr) -> Self {
        Prefix::new(addr, 128 - (!addr.0).trailing_zeros() as u8)
    }

    pub fn addr(self) -> Addr {
        self.addr
    }

    pub fn addr_len(self) -> u8 {
        self.len
    }

    pub fn min(self) -> Addr {
        self.addr
    }

    pub fn max(self) -> Addr {
        self.addr.to_max(self.len)
    }

    /// Parses a prefix in the form `addr/len`.
    pub fn parse(s: &str) -> Result<(AddressFamily, Self), FromStrError> {
        let (addr, len) = s.trim().split_once('/').ok_or(
            FromStrError::PrefixLength
        )?;
        let (family, addr) = parse_addr(addr)?;
        let len = u8::from_str(len).map_err(|_| FromStrError::PrefixLength)?;
        if len > family.max_addr_len() {
            return Err(FromStrError::PrefixLength)
        }
        Ok((family, Prefix::new(addr, len)))
    }

    /// Parses the content of a BIT STRING holding a prefix.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        let bits = BitString::from_content(content)?;
        if bits.bit_len() > usize::from(family.max_addr_len()) {
            return Err(content.content_err("invalid IP prefix length"))
        }
        let mut addr = [0u8; 16];
        for (target, octet) in addr.iter_mut().zip(bits.octets()) {
            *target = octet
        }
        Ok(Prefix::new(
            Addr(u128::from_be_bytes(addr)), bits.bit_len() as u8
        ))
    }

    pub fn fmt_family(
        self, family: AddressFamily, f: &mut fmt::Formatter
    ) -> fmt::Result {
        self.addr.fmt_family(family, f)?;
        write!(f, "/{}", self.len)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for Prefix {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        (usize::from(self.len) + 7) / 8 + 1
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        // Bits beyond len are cleared by the constructor.
        let unused = (8 - self.len % 8) % 8;
        target.write_all(&[unused])?;
        let len = (usize::from(self.len) + 7) / 8;
        target.write_all(&self.addr.to_bytes()[..len])
    }
}


//------------ Addr ----------------------------------------------------------

/// An IP address of either family.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Addr(u128);

impl Addr {
    pub fn from_bits(bits: u128) -> Self {
        Addr(bits)
    }

    pub fn to_bits(self) -> u128 {
        self.0
    }

    pub fn from_v4(addr: Ipv4Addr) -> Self {
        Addr(u128::from(u32::from(addr)) << 96)
    }

    pub fn from_v6(addr: Ipv6Addr) -> Self {
        Addr(u128::from(addr))
    }

    pub fn to_v4(self) -> Ipv4Addr {
        Ipv4Addr::from((self.0 >> 96) as u32)
    }

    pub fn to_v6(self) -> Ipv6Addr {
        Ipv6Addr::from(self.0)
    }

    /// Returns the address with all bits beyond `len` cleared.
    pub fn to_min(self, len: u8) -> Self {
        if len >= 128 {
            self
        }
        else {
            Addr(self.0 & !(u128::MAX >> len))
        }
    }

    /// Returns the address with all bits beyond `len` set.
    pub fn to_max(self, len: u8) -> Self {
        if len >= 128 {
            self
        }
        else {
            Addr(self.0 | (u128::MAX >> len))
        }
    }

    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    fn fmt_family(
        self, family: AddressFamily, f: &mut fmt::Formatter
    ) -> fmt::Result {
        match family {
            AddressFamily::Ipv4 => write!(f, "{}", self.to_v4()),
            AddressFamily::Ipv6 => write!(f, "{}", self.to_v6()),
        }
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(addr: Ipv4Addr) -> Self {
        Addr::from_v4(addr)
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(addr: Ipv6Addr) -> Self {
        Addr::from_v6(addr)
    }
}

fn parse_addr(s: &str) -> Result<(AddressFamily, Addr), FromStrError> {
    match IpAddr::from_str(s.trim()).map_err(|_| FromStrError::Address)? {
        IpAddr::V4(addr) => Ok((AddressFamily::Ipv4, addr.into())),
        IpAddr::V6(addr) => Ok((AddressFamily::Ipv6, addr.into())),
    }
}


//------------ AddressFamily -------------------------------------------------

/// The address family of IP resources.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Takes a two octet address family identifier.
    ///
    /// Identifiers carrying a SAFI are rejected.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = OctetString::take_from(cons)?.to_bytes();
        match octets.as_ref() {
            [0, 1] => Ok(AddressFamily::Ipv4),
            [0, 2] => Ok(AddressFamily::Ipv6),
            _ => Err(cons.content_err("invalid address family")),
        }
    }

    pub fn encode(self) -> impl encode::Values {
        OctetString::encode_slice(match self {
            AddressFamily::Ipv4 => b"\x00\x01".as_ref(),
            AddressFamily::Ipv6 => b"\x00\x02".as_ref(),
        })
    }

    /// Returns the number of bits in an address of this family.
    pub fn max_addr_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::Ipv6 => "IPv6",
        })
    }
}


//------------ FromStrError --------------------------------------------------

/// Resources could not be parsed from a string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromStrError {
    Address,
    PrefixLength,
    Range,
    Asn,
}

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            FromStrError::Address => "invalid IP address",
            FromStrError::PrefixLength => "invalid prefix length",
            FromStrError::Range => "invalid range",
            FromStrError::Asn => "invalid AS number",
        })
    }
}

impl error::Error for FromStrError { }


//============ Tests =========================================================
