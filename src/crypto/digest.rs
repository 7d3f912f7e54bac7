//! Digest algorithm and operations.

use std::{fmt, io};
use bcder::{decode, encode};
use bcder::Oid;
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use ring::digest;
use crate::oid;

// Re-export the things from ring for actual digest generation.
pub use ring::digest::Digest;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms used by RPKI.
///
/// [RFC 7935] limits RPKI to exactly one digest algorithm, SHA-256, both for
/// signatures and for the file hashes on manifests. The type is therefore
/// zero-sized for now.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DigestAlgorithm(());

/// # Creating Digest Values
///
impl DigestAlgorithm {
    /// Returns the SHA-256 digest algorithm.
    pub fn sha256() -> Self {
        DigestAlgorithm(())
    }

    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        digest::digest(&digest::SHA256, data)
    }

    /// Returns a digest context for multi-step calculation of the digest.
    pub fn start(self) -> Context {
        Context(digest::Context::new(&digest::SHA256))
    }

    /// Returns the length in octets of a digest value.
    pub fn digest_len(self) -> usize {
        digest::SHA256.output_len()
    }
}


/// # ASN.1 Values
///
/// Digest algorithms appear in CMS either alone or in sets with the following
/// syntax:
///
/// ```txt
/// DigestAlgorithmIdentifiers ::= SET OF DigestAlgorithmIdentifier
/// DigestAlgorithmIdentifier  ::= AlgorithmIdentifier
/// AlgorithmIdentifier        ::= SEQUENCE {
///      algorithm                 OBJECT IDENTIFIER,
///      parameters                ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The _parameters_ field may either be absent or `NULL`. Manifests use
/// only the bare object identifier for their file hash algorithm.
impl DigestAlgorithm {
    /// Returns the algorithm for the given object identifier if known.
    pub fn from_oid<T: AsRef<[u8]>>(oid: &Oid<T>) -> Option<Self> {
        if *oid == oid::SHA256 {
            Some(DigestAlgorithm(()))
        }
        else {
            None
        }
    }

    /// Takes and returns a single digest algorithm identifier.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            oid::SHA256.skip_if(cons)?;
            cons.take_opt_null()?;
            Ok(DigestAlgorithm(()))
        })
    }

    /// Provides an encoder for a single algorithm identifier.
    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            oid::SHA256.encode(),
            ().encode(),
        ))
    }

    /// Provides an encoder for a indentifer as the sole value of a set.
    pub fn encode_set(self) -> impl encode::Values {
        encode::set(
            self.encode()
        )
    }

    /// Provides an encoder for just the object identifier of the algorithm.
    pub fn encode_oid(self) -> impl encode::Values {
        oid::SHA256.encode()
    }
}


//--- Display

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SHA-256")
    }
}


//------------ Sha1 ----------------------------------------------------------

/// Returns the SHA-1 digest of `data`.
///
/// This is only used for key identifiers.
pub fn sha1_digest(data: &[u8]) -> Digest {
    digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data)
}


//------------ Context -------------------------------------------------------

#[derive(Clone)]
pub struct Context(digest::Context);

impl Context {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data)
    }

    pub fn finish(self) -> Digest {
        self.0.finish()
    }
}

impl io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}


//============ Tests =========================================================
