//! Handling of IP and AS resources.
//!
//! The types in this module implement the certificate extensions defined in
//! [RFC 3779] for including IP address and autonomous system resources in
//! certificates in the restricted form specified by [RFC 6487] for use in
//! RPKI.
//!
//! [`IpResources`] implements the IP Address Delegation Extension and
//! [`AsResources`] implements the Autonomous System Identifier Delegation
//! Extension. Either can be inherited from the issuer. The explicit part of
//! both is collected into a [`ResourceSet`] for containment checks.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

pub use self::asres::{AsBlock, AsBlocks, Asn, AsResources};
pub use self::choice::ResourcesChoice;
pub use self::ipres::{
    Addr, AddressFamily, DisplayIpBlocks, FromStrError, IpBlock, IpBlocks,
    IpResources, Prefix,
};
pub use self::set::ResourceSet;

mod asres;
mod chain;
mod choice;
mod ipres;
mod set;
