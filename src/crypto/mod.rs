//! Signature and digest related types.
//!
//! Everything in here is the crypto provider seam of the crate: computing
//! digests, verifying signatures with public keys and, through the
//! [`Signer`] trait, creating signatures when building objects.

pub use self::digest::{Digest, DigestAlgorithm};
pub use self::keys::{
    KeyIdentifier, PublicKey, PublicKeyFormat, SignatureVerificationError,
};
pub use self::signature::{
    RpkiSignature, RpkiSignatureAlgorithm, Signature, SignatureAlgorithm,
};
pub use self::signer::{KeyError, Signer, SigningAlgorithm, SigningError};

pub mod digest;
pub mod keys;
pub mod signature;
pub mod signer;
#[cfg(feature = "softkeys")] pub mod softsigner;
