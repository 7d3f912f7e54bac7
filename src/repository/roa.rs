//! Route Origin Authorizations.
//!
//! A ROA states that an AS is authorized to originate routes for a list of
//! IP prefixes. It is defined in [RFC 9582]. The content of a ROA signed
//! object is:
//!
//! ```txt
//! RouteOriginAttestation ::= SEQUENCE {
//!     version [0]          INTEGER DEFAULT 0,
//!     asID                 ASID,
//!     ipAddrBlocks         SEQUENCE (SIZE(1..2)) OF ROAIPAddressFamily
//! }
//!
//! ROAIPAddressFamily ::= SEQUENCE {
//!     addressFamily        OCTET STRING (SIZE(2)),
//!     addresses            SEQUENCE (SIZE(1..MAX)) OF ROAIPAddress
//! }
//!
//! ROAIPAddress ::= SEQUENCE {
//!     address              IPAddress,
//!     maxLength            INTEGER OPTIONAL
//! }
//! ```
//!
//! Decoding is lenient with individual address entries: an entry that
//! cannot be decoded is skipped and counted. Whether that makes the ROA
//! unacceptable is left to the checks recorded in the validation result.
//!
//! [RFC 9582]: https://tools.ietf.org/html/rfc9582

use std::{fmt, ops};
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{Captured, Mode, OctetString, Tag};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::crypto::Signer;
use crate::util::hex;
use crate::validation::check;
use crate::validation::result::ValidationResult;
use super::cert::Cert;
use super::error::BuildError;
use super::resources::{
    AddressFamily, AsBlocks, Asn, FromStrError, IpBlocks, Prefix,
    ResourceSet,
};
use super::sigobj::{SignedObject, SignedObjectBuilder};


//------------ Roa -----------------------------------------------------------

/// A checked route origin authorization.
#[derive(Clone, Debug)]
pub struct Roa {
    signed: SignedObject,
    content: RouteOriginAttestation,
}

impl Roa {
    /// Parses and checks a ROA.
    ///
    /// The checks are recorded for the current location of `result` and
    /// the ROA is only returned if none of them failed. Whether the EE
    /// certificate covers the prefixes is not checked here since that may
    /// depend on the issuer’s resources.
    pub fn parse(data: Bytes, result: &mut ValidationResult) -> Option<Self> {
        let signed = SignedObject::parse(data, result)?;
        Self::from_signed_object(signed, result)
    }

    /// Checks the ROA specific parts of a signed object.
    pub fn from_signed_object(
        signed: SignedObject, result: &mut ValidationResult
    ) -> Option<Self> {
        if !result.reject_if_false(
            *signed.content_type() == oid::ROUTE_ORIGIN_AUTHZ,
            check::ROA_CONTENT_TYPE,
            &[&signed.content_type().to_string()]
        ) {
            return None
        }
        let content = RouteOriginAttestation::check(&signed, result)?;
        Some(Roa { signed, content })
    }

    pub fn signed_object(&self) -> &SignedObject {
        &self.signed
    }

    /// Returns the EE certificate of the ROA.
    pub fn cert(&self) -> &Cert {
        self.signed.cert()
    }

    pub fn content(&self) -> &RouteOriginAttestation {
        &self.content
    }

    pub fn to_bytes(&self) -> Bytes {
        self.signed.to_bytes()
    }
}


//--- Deref and AsRef

impl ops::Deref for Roa {
    type Target = RouteOriginAttestation;

    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

impl AsRef<RouteOriginAttestation> for Roa {
    fn as_ref(&self) -> &RouteOriginAttestation {
        &self.content
    }
}


//------------ RouteOriginAttestation ----------------------------------------

/// The content of a ROA.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteOriginAttestation {
    as_id: Asn,
    prefixes: Vec<RoaPrefix>,
}

impl RouteOriginAttestation {
    /// Creates new content from an AS and its prefixes.
    ///
    /// The prefixes are sorted by family first so that the content stays
    /// the same when it is encoded and decoded again.
    pub fn new(as_id: Asn, mut prefixes: Vec<RoaPrefix>) -> Self {
        prefixes.sort();
        RouteOriginAttestation { as_id, prefixes }
    }

    pub fn as_id(&self) -> Asn {
        self.as_id
    }

    pub fn prefixes(&self) -> &[RoaPrefix] {
        &self.prefixes
    }

    /// Returns an iterator over the prefixes of one address family.
    pub fn family(
        &self, family: AddressFamily
    ) -> impl Iterator<Item = &RoaPrefix> + Clone + '_ {
        self.prefixes.iter().filter(move |item| item.family == family)
    }

    /// Returns the resources needed to issue the ROA.
    ///
    /// These are the prefixes of both families. The AS number is not a
    /// resource the EE certificate has to hold.
    pub fn to_resources(&self) -> ResourceSet {
        ResourceSet::new(
            AsBlocks::empty(),
            self.family(AddressFamily::Ipv4).map(|item| item.prefix)
                .collect::<IpBlocks>(),
            self.family(AddressFamily::Ipv6).map(|item| item.prefix)
                .collect::<IpBlocks>(),
        )
    }
}

/// # Decoding and Checking
///
impl RouteOriginAttestation {
    fn check(
        signed: &SignedObject, result: &mut ValidationResult
    ) -> Option<Self> {
        let failures = result.failures_for_current_location().len();
        let raw = match signed.decode_content(RawRoa::take_from) {
            Ok(raw) => {
                result.pass(check::ROA_CONTENT_STRUCTURE, &[]);
                raw
            }
            Err(err) => {
                debug!(
                    "{}: failed to decode ROA content: {}",
                    result.current_location(), err
                );
                result.reject(check::ROA_CONTENT_STRUCTURE, &[]);
                return None
            }
        };
        result.reject_if_false(
            raw.version == 0, check::ROA_ATTESTATION_VERSION,
            &[&raw.version.to_string()]
        );

        let mut prefixes = Vec::new();
        let mut bad_families = Vec::new();
        let mut malformed = 0usize;
        for block in raw.families {
            let family = match block.family.as_ref() {
                [0, 1] => AddressFamily::Ipv4,
                [0, 2] => AddressFamily::Ipv6,
                other => {
                    bad_families.push(hex::encode(other));
                    continue
                }
            };
            for entry in block.addresses {
                match entry.decode(|cons| RoaPrefix::take_from(cons, family)) {
                    Ok(prefix) => prefixes.push(prefix),
                    Err(_) => malformed += 1,
                }
            }
        }
        result.reject_if_false(
            bad_families.is_empty(), check::ROA_ADDR_FAMILY_VALID,
            &[&bad_families.join(", ")]
        );
        result.reject_if_false(
            malformed == 0, check::ROA_ADDR_FAMILY_CONTAINS_PREFIX,
            &[&malformed.to_string()]
        );
        result.reject_if_false(
            !prefixes.is_empty(), check::ROA_PREFIX_LIST_NOT_EMPTY, &[]
        );
        let bad_lengths = prefixes.iter().filter(|item| {
            !item.is_max_length_valid()
        }).map(ToString::to_string).collect::<Vec<_>>();
        result.reject_if_false(
            bad_lengths.is_empty(), check::ROA_PREFIX_LENGTH,
            &[&bad_lengths.join(", ")]
        );

        if result.failures_for_current_location().len() != failures {
            return None
        }
        Some(RouteOriginAttestation { as_id: raw.as_id, prefixes })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.as_id.encode(),
            encode::sequence((
                self.encode_family(AddressFamily::Ipv4),
                self.encode_family(AddressFamily::Ipv6),
            ))
        ))
    }

    fn encode_family(
        &self, family: AddressFamily
    ) -> Option<impl encode::Values + '_> {
        let mut prefixes = self.family(family).peekable();
        prefixes.peek()?;
        Some(encode::sequence((
            family.encode(),
            encode::sequence(encode::iter(prefixes.map(RoaPrefix::encode)))
        )))
    }

    pub fn to_bytes(&self) -> Bytes {
        self.encode_ref().to_captured(Mode::Der).into_bytes()
    }
}


//------------ RawRoa --------------------------------------------------------

/// The content of a ROA with the address entries still encoded.
struct RawRoa {
    version: u8,
    as_id: Asn,
    families: Vec<RawFamily>,
}

struct RawFamily {
    family: Bytes,
    addresses: Vec<Captured>,
}

impl RawRoa {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let version = cons.take_opt_constructed_if(
                Tag::CTX_0, |cons| cons.take_u8()
            )?.unwrap_or(0);
            let as_id = Asn::take_from(cons)?;
            let families = cons.take_sequence(|cons| {
                let mut res = Vec::new();
                while let Some(family) = cons.take_opt_sequence(|cons| {
                    let family = OctetString::take_from(cons)?.to_bytes();
                    let addresses = cons.take_sequence(take_entries)?;
                    Ok(RawFamily { family, addresses })
                })? {
                    res.push(family)
                }
                Ok(res)
            })?;
            Ok(RawRoa { version, as_id, families })
        })
    }
}

/// Captures each value of a constructed value separately.
fn take_entries<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<Vec<Captured>, DecodeError<S::Error>> {
    let mut res = Vec::new();
    loop {
        let entry = cons.capture(|cons| {
            cons.take_opt_value(|_, content| content.skip_all())?;
            Ok(())
        })?;
        if entry.is_empty() {
            return Ok(res)
        }
        res.push(entry)
    }
}


//------------ RoaPrefix -----------------------------------------------------

/// A prefix authorized by a ROA.
///
/// The ordering sorts by address family first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RoaPrefix {
    family: AddressFamily,
    prefix: Prefix,
    max_length: Option<u8>,
}

impl RoaPrefix {
    pub fn new(
        family: AddressFamily, prefix: Prefix, max_length: Option<u8>
    ) -> Self {
        RoaPrefix { family, prefix, max_length }
    }

    pub fn family(self) -> AddressFamily {
        self.family
    }

    pub fn prefix(self) -> Prefix {
        self.prefix
    }

    pub fn max_length(self) -> Option<u8> {
        self.max_length
    }

    /// Returns the maximum length with the prefix length as the default.
    pub fn effective_max_length(self) -> u8 {
        self.max_length.unwrap_or_else(|| self.prefix.addr_len())
    }

    /// Returns whether the maximum length fits the prefix and family.
    ///
    /// It must be neither shorter than the prefix nor longer than an
    /// address of the family.
    pub fn is_max_length_valid(self) -> bool {
        match self.max_length {
            Some(max) => {
                max >= self.prefix.addr_len()
                    && max <= self.family.max_addr_len()
            }
            None => true
        }
    }

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let prefix = cons.take_value_if(Tag::BIT_STRING, |content| {
                Prefix::from_content(content, family)
            })?;
            let max_length = cons.take_opt_u8()?;
            Ok(RoaPrefix { family, prefix, max_length })
        })
    }

    fn encode(&self) -> impl encode::Values {
        encode::sequence((
            self.prefix.encode(),
            self.max_length.map(|max| max.encode()),
        ))
    }
}


//--- FromStr and Display

impl FromStr for RoaPrefix {
    type Err = FromStrError;

    /// Parses a prefix with an optional maximum length, e.g. `10.0.0.0/8-16`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, max_length) = match s.trim().split_once('-') {
            Some((prefix, max)) => {
                let max = u8::from_str(max.trim()).map_err(|_| {
                    FromStrError::PrefixLength
                })?;
                (prefix, Some(max))
            }
            None => (s, None),
        };
        let (family, prefix) = Prefix::parse(prefix)?;
        Ok(RoaPrefix { family, prefix, max_length })
    }
}

impl fmt::Display for RoaPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.prefix.fmt_family(self.family, f)?;
        if let Some(max) = self.max_length {
            write!(f, "-{}", max)?;
        }
        Ok(())
    }
}


//------------ RoaBuilder ----------------------------------------------------

/// The values needed for creating a new ROA.
#[derive(Clone, Debug, Default)]
pub struct RoaBuilder {
    pub as_id: Option<Asn>,
    pub prefixes: Vec<RoaPrefix>,
}

impl RoaBuilder {
    pub fn new(as_id: Asn) -> Self {
        RoaBuilder { as_id: Some(as_id), prefixes: Vec::new() }
    }

    pub fn push(&mut self, prefix: RoaPrefix) {
        self.prefixes.push(prefix)
    }

    /// Creates the ROA.
    ///
    /// If `object` doesn’t provide resources for the EE certificate, it
    /// will hold exactly the prefixes of the ROA.
    pub fn finalize<S: Signer>(
        self,
        mut object: SignedObjectBuilder,
        signer: &S,
        issuer_key: &S::KeyId,
    ) -> Result<Roa, BuildError<S::Error>> {
        let as_id = self.as_id.ok_or(BuildError::MissingField("as_id"))?;
        if self.prefixes.is_empty() {
            return Err(BuildError::MissingField("prefixes"))
        }
        if !self.prefixes.iter().all(|item| item.is_max_length_valid()) {
            return Err(BuildError::InvalidField("prefixes"))
        }
        let content = RouteOriginAttestation::new(as_id, self.prefixes);
        if object.resources.is_none() {
            object.resources = Some(content.to_resources());
        }
        let signed = object.finalize(
            &oid::ROUTE_ORIGIN_AUTHZ, content.to_bytes(), signer, issuer_key
        )?;
        Ok(Roa { signed, content })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn content() -> RouteOriginAttestation {
        RouteOriginAttestation::new(
            Asn::from_u32(64496),
            vec![
                RoaPrefix::from_str("2001:db8::/32-48").unwrap(),
                RoaPrefix::from_str("10.0.0.0/8").unwrap(),
                RoaPrefix::from_str("192.0.2.0/24-24").unwrap(),
            ]
        )
    }

    #[test]
    fn prefix_from_str() {
        let prefix = RoaPrefix::from_str("10.1.0.0/16-24").unwrap();
        assert_eq!(prefix.family(), AddressFamily::Ipv4);
        assert_eq!(prefix.prefix().addr_len(), 16);
        assert_eq!(prefix.max_length(), Some(24));
        assert_eq!(prefix.to_string(), "10.1.0.0/16-24");
        assert_eq!(
            RoaPrefix::from_str("10.1.0.0/16").unwrap().effective_max_length(),
            16
        );
        assert!(RoaPrefix::from_str("10.1.0.0/16-x").is_err());
    }

    #[test]
    fn max_length_validity() {
        let check = |s: &str| RoaPrefix::from_str(s).unwrap()
            .is_max_length_valid();
        assert!(check("10.0.0.0/8"));
        assert!(check("10.0.0.0/8-8"));
        assert!(check("10.0.0.0/8-32"));
        assert!(!check("10.0.0.0/8-7"));
        assert!(!check("10.0.0.0/8-33"));
        assert!(check("2001:db8::/32-128"));
        assert!(!check("2001:db8::/32-129"));
    }

    #[test]
    fn families_are_sorted() {
        let content = content();
        assert_eq!(
            content.family(AddressFamily::Ipv4).map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["10.0.0.0/8", "192.0.2.0/24-24"]
        );
        assert_eq!(content.prefixes()[2].family(), AddressFamily::Ipv6);
        assert_eq!(
            content.to_resources(),
            ResourceSet::from_str("10.0.0.0/8, 192.0.2.0/24, 2001:db8::/32")
                .unwrap()
        );
    }

    #[test]
    fn decode_content() {
        let content = content();
        let raw = Mode::Der.decode(content.to_bytes(), RawRoa::take_from)
            .unwrap();
        assert_eq!(raw.version, 0);
        assert_eq!(raw.as_id, Asn::from_u32(64496));
        assert_eq!(raw.families.len(), 2);
        assert_eq!(raw.families[0].family.as_ref(), b"\x00\x01");
        assert_eq!(raw.families[0].addresses.len(), 2);
        let prefix = raw.families[1].addresses[0].clone().decode(|cons| {
            RoaPrefix::take_from(cons, AddressFamily::Ipv6)
        }).unwrap();
        assert_eq!(prefix, content.prefixes()[2]);
    }

    #[test]
    fn decode_tolerates_bad_entries() {
        let encoded = encode::sequence((
            Asn::from_u32(1).encode(),
            encode::sequence(
                encode::sequence((
                    AddressFamily::Ipv4.encode(),
                    encode::sequence((
                        encode::sequence(
                            RoaPrefix::from_str("10.0.0.0/8").unwrap()
                                .prefix().encode()
                        ),
                        encode::sequence(5u8.encode()),
                    ))
                ))
            )
        )).to_captured(Mode::Der);
        let raw = encoded.decode(RawRoa::take_from).unwrap();
        let addresses = &raw.families[0].addresses;
        assert_eq!(addresses.len(), 2);
        assert!(addresses[0].clone().decode(|cons| {
            RoaPrefix::take_from(cons, AddressFamily::Ipv4)
        }).is_ok());
        assert!(addresses[1].clone().decode(|cons| {
            RoaPrefix::take_from(cons, AddressFamily::Ipv4)
        }).is_err());
    }
}
