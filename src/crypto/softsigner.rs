//! A signer atop the OpenSSL library.
//!
//! Because this adds a dependency on the OpenSSL libraries, it is only
//! available with the `softkeys` feature. It keeps all keys in memory and
//! is meant for tests and for tools that create objects from software keys.
//! Validation does not need it.

use std::io;
use std::sync::{Arc, RwLock};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use super::keys::{PublicKey, PublicKeyFormat};
use super::signature::{Signature, SignatureAlgorithm};
use super::signer::{KeyError, Signer, SigningAlgorithm, SigningError};


//------------ OpenSslSigner -------------------------------------------------

/// An OpenSSL based signer.
pub struct OpenSslSigner {
    keys: RwLock<Vec<Arc<KeyPair>>>,
}

impl OpenSslSigner {
    pub fn new() -> OpenSslSigner {
        OpenSslSigner {
            keys: Default::default(),
        }
    }

    fn insert_key(&self, key: KeyPair) -> Result<KeyId, io::Error> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        let res = keys.len();
        keys.push(key.into());
        Ok(KeyId(res))
    }

    fn get_key(
        &self, id: KeyId
    ) -> Result<Arc<KeyPair>, KeyError<io::Error>> {
        let keys = self.keys.read().map_err(|_| poisoned())?;
        keys.get(id.0).cloned().ok_or(KeyError::KeyNotFound)
    }
}

impl Signer for OpenSslSigner {
    type KeyId = KeyId;
    type Error = io::Error;

    fn create_key(
        &self, algorithm: PublicKeyFormat
    ) -> Result<Self::KeyId, Self::Error> {
        self.insert_key(KeyPair::new(algorithm)?)
    }

    fn get_key_info(
        &self,
        id: &Self::KeyId
    ) -> Result<PublicKey, KeyError<Self::Error>> {
        self.get_key(*id)?.get_key_info().map_err(KeyError::Signer)
    }

    fn sign<Alg: SignatureAlgorithm, D: AsRef<[u8]> + ?Sized>(
        &self,
        key: &Self::KeyId,
        algorithm: Alg,
        data: &D
    ) -> Result<Signature<Alg>, SigningError<Self::Error>> {
        self.get_key(*key)?.sign(algorithm, data.as_ref())
    }

    fn sign_one_off<Alg: SignatureAlgorithm, D: AsRef<[u8]> + ?Sized>(
        &self,
        algorithm: Alg,
        data: &D
    ) -> Result<(Signature<Alg>, PublicKey), Self::Error> {
        let key = KeyPair::new(algorithm.public_key_format())?;
        let info = key.get_key_info()?;
        let sig = key.sign(algorithm, data.as_ref()).map_err(|err| {
            match err {
                SigningError::Signer(err) => err,
                err => io::Error::new(io::ErrorKind::Other, err.to_string())
            }
        })?;
        Ok((sig, info))
    }
}


impl Default for OpenSslSigner {
    fn default() -> Self {
        Self::new()
    }
}


//------------ KeyId ---------------------------------------------------------

/// This signer’s key identifier.
//
//  We wrap this in a newtype so that people won’t start mucking about with
//  the integers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyId(usize);


//------------ KeyPair -------------------------------------------------------

/// A key pair kept by the signer.
struct KeyPair(PKey<Private>);

impl KeyPair {
    fn new(algorithm: PublicKeyFormat) -> Result<Self, io::Error> {
        match algorithm {
            PublicKeyFormat::Rsa => {
                let rsa = Rsa::generate(2048)?;
                Ok(KeyPair(PKey::from_rsa(rsa)?))
            }
        }
    }

    fn get_key_info(&self) -> Result<PublicKey, io::Error> {
        let der = self.0.public_key_to_der()?;
        PublicKey::decode(der.as_slice()).map_err(|err| {
            io::Error::new(io::ErrorKind::Other, err.to_string())
        })
    }

    fn sign<Alg: SignatureAlgorithm>(
        &self,
        algorithm: Alg,
        data: &[u8]
    ) -> Result<Signature<Alg>, SigningError<io::Error>> {
        if algorithm.signing_algorithm() != SigningAlgorithm::RsaSha256 {
            return Err(SigningError::IncompatibleKey)
        }
        let mut signer = ::openssl::sign::Signer::new(
            MessageDigest::sha256(), &self.0
        ).map_err(io::Error::from)?;
        signer.update(data).map_err(io::Error::from)?;
        let value = signer.sign_to_vec().map_err(io::Error::from)?;
        Ok(Signature::new(algorithm, value.into()))
    }
}


//------------ Helpers -------------------------------------------------------

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "key store lock poisoned")
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::signature::RpkiSignatureAlgorithm;

    #[test]
    fn info_sign_verify() {
        let s = OpenSslSigner::new();
        let ki = s.create_key(PublicKeyFormat::Rsa).unwrap();
        let info = s.get_key_info(&ki).unwrap();
        assert_eq!(info.rsa_modulus_bits(), Some(2048));
        let sig = s.sign(
            &ki, RpkiSignatureAlgorithm::default(), b"foobar"
        ).unwrap();
        info.verify(b"foobar", &sig).unwrap();
        assert!(info.verify(b"foobaz", &sig).is_err());
    }

    #[test]
    fn unknown_key() {
        let s = OpenSslSigner::new();
        let ki = s.create_key(PublicKeyFormat::Rsa).unwrap();
        let other = OpenSslSigner::new();
        assert!(matches!(
            other.get_key_info(&ki), Err(KeyError::KeyNotFound)
        ));
        assert!(matches!(
            other.sign(&ki, RpkiSignatureAlgorithm::default(), b"foobar"),
            Err(SigningError::KeyNotFound)
        ));
    }

    #[test]
    fn one_off() {
        let s = OpenSslSigner::new();
        let (sig, key) = s.sign_one_off(
            RpkiSignatureAlgorithm::default(),
            b"foobar"
        ).unwrap();
        key.verify(b"foobar", &sig).unwrap();
    }
}
