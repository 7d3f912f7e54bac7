//! RPKI signed objects and their validation.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. It allows owners of IP address prefixes
//! to publish cryptographically signed associations of their prefixes to
//! autonomous systems, allowing the validation of the origin of a route
//! announcement in BGP.
//!
//! This crate parses, creates, and validates the objects published in RPKI
//! repositories: resource certificates and CRLs in the
//! [`repository`] module as well as manifests and ROAs which are wrapped
//! in a restricted form of CMS signed data. Each step of parsing and
//! validating is recorded in a
//! [`ValidationResult`][validation::ValidationResult] so that the reasons
//! for rejecting an object can be reported. Validating objects against
//! their issuers is done by the functions in the [`validation`] module.
//!
//! Cryptographic operations are provided by the [`crypto`] module. Creating
//! signatures requires an implementation of the
//! [`Signer`][crypto::Signer] trait. One based on OpenSSL is available if
//! the `softkeys` feature is enabled, which it is by default.

pub mod crypto;
pub mod oid;
pub mod repository;
pub mod uri;
pub mod util;
pub mod validation;
