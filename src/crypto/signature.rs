//! Signature algorithms and operations.

use bcder::{decode, encode};
use bcder::{ConstOid, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::oid;
use super::keys::PublicKeyFormat;
use super::signer::SigningAlgorithm;


//------------ SignatureAlgorithm --------------------------------------------

/// The allowed signature algorithms for a certain purpose.
pub trait SignatureAlgorithm: Sized {
    type Encoder: encode::Values;

    /// Returns the signing algorithm for this algorithm.
    fn signing_algorithm(&self) -> SigningAlgorithm;

    /// Returns the public key format for the algorithm.
    fn public_key_format(&self) -> PublicKeyFormat {
        self.signing_algorithm().public_key_format()
    }

    /// Takes the algorithm identifier from a DER value in X.509 signed data.
    fn x509_take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>>;

    /// Returns a DER encoder.
    fn x509_encode(&self) -> Self::Encoder;
}


//------------ RpkiSignatureAlgorithm ----------------------------------------

/// The signature algorithm used by RPKI.
///
/// [RFC 7935] allows only one algorithm, RSA PKCS #1 v1.5 with SHA-256. The
/// absent algorithm parameters can be represented either by a missing field
/// or by NULL. The type remembers which one was used so that values with
/// different representations do not compare equal.
///
/// The `Default` implementation provides the representation used when
/// creating objects.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RpkiSignatureAlgorithm {
    /// Is the parameter field present and NULL?
    has_parameter: bool
}

/// # ASN.1 Values
///
/// ```txt
/// SignatureAlgorithmIdentifier ::= AlgorithmIdentifier
/// AlgorithmIdentifier          ::= SEQUENCE {
///      algorithm                   OBJECT IDENTIFIER,
///      parameters                  ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// Certificates and CRLs use `sha256WithRSAEncryption` from [RFC 4055].
/// Signed objects must be created with `rsaEncryption` from [RFC 3370] but
/// both identifiers are accepted when reading them. Functions prefixed with
/// `x509` deal with the former, those prefixed with `cms` with the latter.
///
/// [RFC 3370]: https://tools.ietf.org/html/rfc3370
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
impl RpkiSignatureAlgorithm {
    /// Returns the algorithm for an object identifier used in CMS.
    ///
    /// Returns `None` if the identifier is not acceptable for signed
    /// objects.
    pub fn from_cms_oid<T: AsRef<[u8]>>(
        oid: &Oid<T>, has_parameter: bool
    ) -> Option<Self> {
        if *oid == oid::RSA_ENCRYPTION
            || *oid == oid::SHA256_WITH_RSA_ENCRYPTION
        {
            Some(RpkiSignatureAlgorithm { has_parameter })
        }
        else {
            None
        }
    }

    fn x509_from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        oid::SHA256_WITH_RSA_ENCRYPTION.skip_if(cons)?;
        let has_parameter = cons.take_opt_primitive_if(
            Tag::NULL, |_| Ok(())
        )?.is_some();
        Ok(RpkiSignatureAlgorithm { has_parameter })
    }

    /// Provides an encoder for CMS objects.
    pub fn cms_encode(self) -> impl encode::Values {
        encode::sequence((
            oid::RSA_ENCRYPTION.encode(),
            ().encode(),
        ))
    }
}


//--- Default

impl Default for RpkiSignatureAlgorithm {
    fn default() -> Self {
        RpkiSignatureAlgorithm { has_parameter: true }
    }
}


//--- SignatureAlgorithm

impl SignatureAlgorithm for RpkiSignatureAlgorithm {
    type Encoder = encode::Constructed<(
        encode::Primitive<ConstOid>, Option<encode::Primitive<()>>
    )>;

    fn signing_algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::RsaSha256
    }

    fn x509_take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::x509_from_constructed)
    }

    fn x509_encode(&self) -> Self::Encoder {
        encode::Constructed::new(
            Tag::SEQUENCE,
            (
                oid::SHA256_WITH_RSA_ENCRYPTION.encode(),
                self.has_parameter.then(|| ().encode()),
            )
        )
    }
}


//------------ Signature -----------------------------------------------------

/// A signature value together with the algorithm that created it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature<Alg = RpkiSignatureAlgorithm> {
    algorithm: Alg,
    value: Bytes
}

pub type RpkiSignature = Signature<RpkiSignatureAlgorithm>;

impl<Alg> Signature<Alg> {
    pub fn new(algorithm: Alg, value: Bytes) -> Self {
        Signature { algorithm, value }
    }

    pub fn algorithm(&self) -> &Alg {
        &self.algorithm
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}
