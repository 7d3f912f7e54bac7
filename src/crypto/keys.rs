//! Types and parameters of keys.

use std::{error, fmt, io};
use std::convert::TryFrom;
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{BitString, Mode, OctetString, Oid, Tag, Unsigned};
use bcder::decode::{ContentError, DecodeError, IntoSource, Source};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use ring::signature;
use ring::error::Unspecified;
use crate::oid;
use crate::repository::x509::RepresentationError;
use crate::util::hex;
use super::digest::sha1_digest;
use super::signature::Signature;


//------------ PublicKeyFormat -----------------------------------------------

/// The formats of public keys used by RPKI.
///
/// Section 3 of [RFC 7935] allows only RSA keys for resource certificates
/// and the EE certificates of signed objects.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PublicKeyFormat {
    /// An RSA public key.
    Rsa,
}

/// # ASN.1 Algorithm Identifiers
///
/// The format of the public key is identified in certificates through a
/// algorithm identifier defined with this ASN.1:
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The object identifier needs to be `rsaEncryption` and the parameters
/// NULL. When parsing, an absent parameters field is accepted, too.
impl PublicKeyFormat {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let alg = Oid::take_from(cons)?;
            if alg != oid::RSA_ENCRYPTION {
                return Err(cons.content_err("unsupported public key format"))
            }
            cons.take_opt_null()?;
            Ok(PublicKeyFormat::Rsa)
        })
    }

    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            oid::RSA_ENCRYPTION.encode(),
            ().encode(),
        ))
    }
}


//------------ PublicKey -----------------------------------------------------

/// A public key.
///
/// This is the content of the *subjectPublicKeyInfo* field of a
/// certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    algorithm: PublicKeyFormat,
    bits: BitString,
}

impl PublicKey {
    /// Returns the algorithm of this public key.
    pub fn algorithm(&self) -> PublicKeyFormat {
        self.algorithm
    }

    /// Returns the bits of this public key.
    pub fn bits(&self) -> Bytes {
        self.bits.octet_bytes()
    }

    /// Returns a key identifier for this key.
    ///
    /// The identifier is the SHA-1 hash of the key’s bits.
    pub fn key_identifier(&self) -> KeyIdentifier {
        let mut res = [0u8; 20];
        res.copy_from_slice(sha1_digest(self.bits().as_ref()).as_ref());
        KeyIdentifier(res)
    }

    /// Verifies a signature using this public key.
    pub fn verify<Alg>(
        &self, message: &[u8], signature: &Signature<Alg>
    ) -> Result<(), SignatureVerificationError> {
        signature::UnparsedPublicKey::new(
            &signature::RSA_PKCS1_2048_8192_SHA256,
            self.bits().as_ref()
        ).verify(
            message, signature.value().as_ref()
        ).map_err(Into::into)
    }

    /// Returns the size of the RSA modulus in bits.
    ///
    /// The bits of an RSA key are the DER encoded RSAPublicKey of
    /// [RFC 8017]. Returns `None` if they aren’t.
    ///
    /// [RFC 8017]: https://tools.ietf.org/html/rfc8017
    pub fn rsa_modulus_bits(&self) -> Option<usize> {
        let modulus = Mode::Der.decode(self.bits(), |cons| {
            cons.take_sequence(|cons| {
                let modulus = Unsigned::take_from(cons)?;
                Unsigned::take_from(cons)?; // publicExponent
                Ok(modulus)
            })
        }).ok()?;
        let octets = modulus.as_slice();
        let start = octets.iter().position(|&octet| octet != 0)?;
        Some(
            (octets.len() - start) * 8
                - octets[start].leading_zeros() as usize
        )
    }
}


/// # As `SubjectPublicKeyInfo`
///
impl PublicKey {
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(PublicKey {
                algorithm: PublicKeyFormat::take_from(cons)?,
                bits: BitString::take_from(cons)?
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.algorithm.encode(),
            self.bits.encode_ref()
        ))
    }
}


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key’s bits. It appears in the
/// subject and authority key identifier extensions and as the signer
/// identifier of signed objects.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialOrd)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    ///
    /// The content of the octet string needs to be a SHA-1 hash, so it must
    /// be exactly 20 octets long.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifer from a encoded content.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = OctetString::from_content(content)?;
        Self::try_from(octets.to_bytes().as_ref()).map_err(|_| {
            content.content_err("invalid key identifier")
        })
    }
}


//--- TryFrom and FromStr

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = RepresentationError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 20]>::try_from(value)
            .map(KeyIdentifier)
            .map_err(|_| RepresentationError)
    }
}

impl FromStr for KeyIdentifier {
    type Err = RepresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let octets = hex::decode(value).ok_or(RepresentationError)?;
        Self::try_from(octets.as_slice())
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> PartialEq<T> for KeyIdentifier {
    fn eq(&self, other: &T) -> bool {
        self.0.as_ref().eq(other.as_ref())
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        hex::write(self.as_slice(), f)
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for KeyIdentifier {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(&self, _mode: Mode) -> usize {
        20
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&self.0)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for KeyIdentifier {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        KeyIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//------------ SignatureVerificationError ------------------------------------

/// An error happened while verifying a signature.
///
/// No further information is provided. This is on purpose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureVerificationError;

impl From<Unspecified> for SignatureVerificationError {
    fn from(_: Unspecified) -> Self {
        SignatureVerificationError
    }
}

impl From<SignatureVerificationError> for ContentError {
    fn from(_: SignatureVerificationError) -> ContentError {
        ContentError::from_static("signature verification failed")
    }
}

impl fmt::Display for SignatureVerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("signature verification failed")
    }
}

impl error::Error for SignatureVerificationError { }


//============ Tests =========================================================
