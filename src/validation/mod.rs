//! Validating RPKI objects.
//!
//! Parsing an object already records all checks that can be made on the
//! object alone. This module contains the checks that need more: the
//! issuer certificate and its CRL, the resources of the issuer, and the
//! current time.
//!
//! All outcomes are recorded in a [`ValidationResult`] under stable keys
//! defined in [`check`]. How strict validation is can be adjusted via
//! [`ValidationOptions`].
//!
//! Certificates are validated either top down, starting at a trust anchor
//! and passing a [`ValidationContext`] to the objects issued under it, or
//! bottom up via [`validate_chain`].

//--- Re-exports
//
pub use self::chain::{
    CertificateKind, IdentityCertificateKind, ResourceCertificateKind,
    ResourceCertificateLocator, validate_chain, validate_parent_child,
};
pub use self::context::ValidationContext;
pub use self::crl::validate_crl;
pub use self::object::{
    CrlLocator, ValidationOutcome, validate_cert, validate_manifest,
    validate_object, validate_roa, validate_trust_anchor,
};
pub use self::options::{ValidationOptions, ValidationOptionsBuilder};
pub use self::result::{
    ValidationCheck, ValidationLocation, ValidationMetric, ValidationResult,
    ValidationStatus,
};


//--- Modules
//
pub mod chain;
pub mod check;
pub mod context;
pub mod crl;
pub mod object;
pub mod options;
pub mod result;
