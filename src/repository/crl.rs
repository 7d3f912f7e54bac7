//! Certificate Revocation Lists for RPKI.
//!
//! Much like for certificates, RPKI reuses X.509 for its certificate
//! revocation lists (CRLs), limiting the values that are allowed in the
//! various fields.
//!
//! This module implements the CRLs themselves via the type [`Crl`] as well
//! as the data to be signed in [`TbsCertList`] which is used for creating
//! new CRLs.
//!
//! The RPKI CRL profile is defined in [RFC 6487] based on the Internet PKIX
//! profile defined in [RFC 5280].
//!
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::ops;
use std::collections::HashSet;
use bcder::{decode, encode};
use bcder::{Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use crate::oid;
use crate::crypto::{
    KeyIdentifier, PublicKey, RpkiSignatureAlgorithm, SignatureAlgorithm,
    SignatureVerificationError, Signer, SigningError,
};
use super::x509::{
    Name, Serial, SignedData, Time, encode_extension, update_once,
};


//------------ Crl -----------------------------------------------------------

/// An RPKI certificate revocation list.
///
/// A value of this type is the result of parsing a CRL file found in the
/// RPKI repository or embedded in a signed object. Two CRLs are equal if
/// their encoded data and signatures are.
#[derive(Clone, Debug)]
pub struct Crl {
    /// The outer structure of the CRL.
    signed_data: SignedData,

    /// The payload of the CRL.
    tbs: TbsCertList,

    /// The serial numbers of the revoked certificates for quick lookup.
    serials: HashSet<Serial>,
}

/// # Data Access
///
impl Crl {
    /// Returns whether the given serial number is on this revocation list.
    pub fn contains(&self, serial: Serial) -> bool {
        self.serials.contains(&serial)
    }

    /// Verifies the signature of the CRL with the given key.
    pub fn verify_signature(
        &self, public_key: &PublicKey
    ) -> Result<(), SignatureVerificationError> {
        self.signed_data.verify_signature(public_key)
    }

    /// Returns whether the next update time has passed.
    pub fn is_stale(&self, now: Time) -> bool {
        self.tbs.next_update < now
    }
}

/// # Decoding and Encoding
///
impl Crl {
    /// Parses a source as a certificate revocation list.
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    /// Takes an encoded CRL from the beginning of a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of a certificate revocation list.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let signed_data = SignedData::from_constructed(cons)?;
        let tbs = signed_data.data().clone().decode(
            TbsCertList::from_constructed
        ).map_err(DecodeError::convert)?;
        Ok(Self::new(signed_data, tbs))
    }

    fn new(signed_data: SignedData, tbs: TbsCertList) -> Self {
        let serials = tbs.revoked_certs.iter().map(|entry| {
            entry.user_certificate
        }).collect();
        Crl { signed_data, tbs, serials }
    }

    /// Returns a value encoder for a reference to this CRL.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }

    /// Returns a captured encoding of the CRL.
    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }

    /// Returns the DER encoded CRL.
    pub fn to_bytes(&self) -> Bytes {
        self.to_captured().into_bytes()
    }
}


//--- Deref, AsRef, PartialEq, and Eq

impl ops::Deref for Crl {
    type Target = TbsCertList;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<TbsCertList> for Crl {
    fn as_ref(&self) -> &TbsCertList {
        &self.tbs
    }
}

impl PartialEq for Crl {
    fn eq(&self, other: &Self) -> bool {
        self.signed_data.data().as_slice()
            == other.signed_data.data().as_slice()
        && self.signed_data.signature().value()
            == other.signed_data.signature().value()
    }
}

impl Eq for Crl { }


//------------ TbsCertList ---------------------------------------------------

/// The payload of a certificate revocation list.
///
/// ```text
/// TBSCertList  ::=  SEQUENCE  {
///     version                 Version OPTIONAL,
///                                  -- if present, MUST be v2
///     signature               AlgorithmIdentifier,
///     issuer                  Name,
///     thisUpdate              Time,
///     nextUpdate              Time OPTIONAL,
///     revokedCertificates     SEQUENCE OF SEQUENCE  {
///          userCertificate         CertificateSerialNumber,
///          revocationDate          Time,
///          crlEntryExtensions      Extensions OPTIONAL
///                                   -- if present, version MUST be v2
///                               }  OPTIONAL,
///     crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
///                                   -- if present, version MUST be v2
///                               }
/// ```
///
/// RPKI requires the version, the next update time and both the authority
/// key identifier and CRL number extensions. No other extensions are
/// allowed.
#[derive(Clone, Debug)]
pub struct TbsCertList {
    /// The algorithm used for signing the CRL.
    signature: RpkiSignatureAlgorithm,

    issuer: Name,
    this_update: Time,
    next_update: Time,

    /// The list of revoked certificates in the order they appear.
    revoked_certs: Vec<CrlEntry>,

    authority_key_id: KeyIdentifier,
    crl_number: Serial,
}

impl TbsCertList {
    /// Creates the data for a new CRL.
    ///
    /// The revoked certificates are encoded in the given order.
    pub fn new(
        issuer: Name,
        authority_key_id: KeyIdentifier,
        this_update: Time,
        next_update: Time,
        crl_number: Serial,
        revoked_certs: Vec<CrlEntry>,
    ) -> Self {
        TbsCertList {
            signature: RpkiSignatureAlgorithm::default(),
            issuer,
            this_update,
            next_update,
            revoked_certs,
            authority_key_id,
            crl_number,
        }
    }

    /// Signs the data and produces a CRL.
    pub fn into_crl<S: Signer>(
        self,
        signer: &S,
        key: &S::KeyId,
    ) -> Result<Crl, SigningError<S::Error>> {
        let data = Captured::from_values(Mode::Der, self.encode_ref());
        let signature = signer.sign(key, self.signature, &data)?;
        Ok(Crl::new(SignedData::new(data, signature), self))
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn this_update(&self) -> Time {
        self.this_update
    }

    pub fn next_update(&self) -> Time {
        self.next_update
    }

    pub fn revoked_certs(&self) -> &[CrlEntry] {
        &self.revoked_certs
    }

    pub fn authority_key_identifier(&self) -> KeyIdentifier {
        self.authority_key_id
    }

    pub fn crl_number(&self) -> Serial {
        self.crl_number
    }

    /// Parses the content of a TBSCertList sequence.
    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.skip_u8_if(1)?; // v2 => 1
            let signature = RpkiSignatureAlgorithm::x509_take_from(cons)?;
            let issuer = Name::take_from(cons)?;
            let this_update = Time::take_from(cons)?;
            let next_update = Time::take_from(cons)?;
            let mut revoked_certs = Vec::new();
            cons.take_opt_sequence(|cons| {
                while let Some(entry) = CrlEntry::take_opt_from(cons)? {
                    revoked_certs.push(entry)
                }
                Ok(())
            })?;
            let mut authority_key_id = None;
            let mut crl_number = None;
            cons.take_constructed_if(Tag::CTX_0, |cons| {
                cons.take_sequence(|cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        Self::take_extension(
                            cons, &mut authority_key_id, &mut crl_number
                        )
                    })? { }
                    Ok(())
                })
            })?;
            let authority_key_id = authority_key_id.ok_or_else(|| {
                cons.content_err("missing Authority Key Identifier")
            })?;
            let crl_number = crl_number.ok_or_else(|| {
                cons.content_err("missing CRL Number")
            })?;
            Ok(TbsCertList {
                signature,
                issuer,
                this_update,
                next_update,
                revoked_certs,
                authority_key_id,
                crl_number,
            })
        })
    }

    /// Parses a single CRL extension.
    ///
    /// RFC 6487 says that no other extensions than authority key
    /// identifier and CRL number are allowed. So we fail even if there is
    /// a non-critical one.
    fn take_extension<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        authority_key_id: &mut Option<KeyIdentifier>,
        crl_number: &mut Option<Serial>,
    ) -> Result<(), DecodeError<S::Error>> {
        let id = Oid::take_from(cons)?;
        let _critical = cons.take_opt_bool()?.unwrap_or(false);
        let value = OctetString::take_from(cons)?;
        Mode::Der.decode(value, |content| {
            if id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
                update_once(authority_key_id, content, |cons| {
                    cons.take_sequence(|cons| {
                        cons.take_value_if(
                            Tag::CTX_0, KeyIdentifier::from_content
                        )
                    })
                })
            }
            else if id == oid::CE_CRL_NUMBER {
                update_once(crl_number, content, Serial::take_from)
            }
            else {
                Err(content.content_err("unexpected CRL extension"))
            }
        }).map_err(DecodeError::convert)
    }

    /// Returns a value encoder for the data.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            1.encode(), // version
            self.signature.x509_encode(),
            self.issuer.encode_ref(),
            self.this_update.encode_varied(),
            self.next_update.encode_varied(),
            if self.revoked_certs.is_empty() {
                None
            }
            else {
                Some(encode::sequence(
                    encode::iter(self.revoked_certs.iter().map(
                        CrlEntry::encode
                    ))
                ))
            },
            encode::sequence_as(Tag::CTX_0, encode::sequence((
                encode_extension(
                    &oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                    encode::sequence(
                        self.authority_key_id.encode_ref_as(Tag::CTX_0)
                    )
                ),
                encode_extension(
                    &oid::CE_CRL_NUMBER, false,
                    self.crl_number.encode()
                ),
            )))
        ))
    }
}


//------------ CrlEntry ------------------------------------------------------

/// An entry in the revoked certificates list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CrlEntry {
    /// The serial number of the revoked certificate.
    user_certificate: Serial,

    /// The time of revocation.
    revocation_date: Time,
}

impl CrlEntry {
    pub fn new(user_certificate: Serial, revocation_date: Time) -> Self {
        CrlEntry { user_certificate, revocation_date }
    }

    pub fn user_certificate(self) -> Serial {
        self.user_certificate
    }

    pub fn revocation_date(self) -> Time {
        self.revocation_date
    }

    /// Takes an optional CRL entry from the beginning of a constructed value.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(CrlEntry {
                user_certificate: Serial::take_from(cons)?,
                revocation_date: Time::take_from(cons)?,
                // crlEntryExtensions are forbidden by RFC 6487.
            })
        })
    }

    pub fn encode(&self) -> impl encode::Values {
        encode::sequence((
            self.user_certificate.encode(),
            self.revocation_date.encode_varied(),
        ))
    }
}


//============ Tests =========================================================
