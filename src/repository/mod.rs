//! Processing the content of RPKI repositories.
//!
//! This module contains types and procedures to parse and check as well as
//! create the objects that can appear in an RPKI repository: resource
//! certificates, CRLs, manifests, and ROAs. Manifests and ROAs share the
//! signed object envelope implemented in [`sigobj`].
//!
//! Parsing of signed objects records every check in a
//! [`ValidationResult`][crate::validation::ValidationResult]. Validating
//! an object against its issuer lives in [`validation`][crate::validation].

//--- Re-exports
//
pub use self::cert::{Cert, KeyUsage, TbsCert};
pub use self::crl::{Crl, CrlEntry, TbsCertList};
pub use self::error::BuildError;
pub use self::manifest::{Manifest, ManifestBuilder, ManifestContent};
pub use self::object::{
    Detected, RepositoryObject, RepositoryObjectType, detect,
};
pub use self::roa::{Roa, RoaBuilder, RoaPrefix, RouteOriginAttestation};
pub use self::sigobj::{SignedObject, SignedObjectBuilder};


//--- Modules
//
pub mod cert;
pub mod crl;
pub mod error;
pub mod manifest;
pub mod object;
pub mod resources;
pub mod roa;
pub mod sigobj;
pub mod x509;

#[cfg(all(test, feature = "softkeys"))]
pub(crate) mod test_util;
