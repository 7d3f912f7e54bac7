//! Signed objects.
//!
//! Manifests and ROAs are wrapped into the same envelope, a CMS signed data
//! structure severely restricted by [RFC 6488]. This module implements that
//! envelope through [`SignedObject`]. It decodes the envelope, runs all the
//! checks of the profile while recording their outcome in a
//! [`ValidationResult`], and creates new objects via
//! [`SignedObjectBuilder`].
//!
//! The envelope looks like this:
//!
//! ```txt
//! ContentInfo             ::= SEQUENCE {
//!     contentType             ContentType,    -- must be signedData
//!     content                 [0] EXPLICIT SignedData }
//!
//! SignedData              ::= SEQUENCE {
//!     version                 CMSVersion,     -- must be 3
//!     digestAlgorithms        DigestAlgorithmIdentifiers,
//!     encapContentInfo        EncapsulatedContentInfo,
//!     certificates            [0] IMPLICIT CertificateSet OPTIONAL,
//!     crls                    [1] IMPLICIT RevocationInfoChoices OPTIONAL,
//!     signerInfos             SignerInfos }
//!
//! EncapsulatedContentInfo ::= SEQUENCE {
//!     eContentType            ContentType,
//!     eContent                [0] EXPLICIT OCTET STRING OPTIONAL }
//!
//! SignerInfo              ::= SEQUENCE {
//!     version                 CMSVersion,     -- must be 3
//!     sid                     SignerIdentifier,
//!     digestAlgorithm         DigestAlgorithmIdentifier,
//!     signedAttrs             [0] IMPLICIT SignedAttributes OPTIONAL,
//!     signatureAlgorithm      SignatureAlgorithmIdentifier,
//!     signature               SignatureValue,
//!     unsignedAttrs           [1] IMPLICIT UnsignedAttributes OPTIONAL }
//!
//! SignerIdentifier        ::= CHOICE {
//!     issuerAndSerialNumber   IssuerAndSerialNumber,
//!     subjectKeyIdentifier    [0] SubjectKeyIdentifier }
//! ```
//!
//! Decoding happens in two steps. First, the structure is decoded without
//! judging any of the values. A failure here results in exactly one error
//! for the key [`check::CMS_DATA_PARSING`]. Then every restriction of the
//! profile is checked in turn so that all problems of an object end up in
//! the result rather than only the first one.
//!
//! [RFC 6488]: https://tools.ietf.org/html/rfc6488

use std::convert::Infallible;
use bcder::{decode, encode};
use bcder::{Captured, ConstOid, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use crate::{oid, uri};
use crate::crypto::{
    DigestAlgorithm, KeyIdentifier, RpkiSignature, RpkiSignatureAlgorithm,
    Signer, SigningError,
};
use crate::validation::check;
use crate::validation::result::ValidationResult;
use super::cert::{Cert, KeyUsage, TbsCert};
use super::crl::Crl;
use super::error::BuildError;
use super::resources::ResourceSet;
use super::x509::{Name, Serial, Time, Validity};


//------------ KNOWN_CONTENT_TYPES -------------------------------------------

/// The content types of the signed objects supported by this crate.
pub const KNOWN_CONTENT_TYPES: &[ConstOid] = &[
    oid::CT_RPKI_MANIFEST,
    oid::ROUTE_ORIGIN_AUTHZ,
];


//------------ SignedObject --------------------------------------------------

/// A signed object that passed all checks of the profile.
///
/// Values of this type are only created by [`SignedObject::parse`] after
/// the envelope has been checked or by [`SignedObjectBuilder::finalize`].
/// The content itself is not interpreted; that is left to the specific
/// object types.
#[derive(Clone, Debug)]
pub struct SignedObject {
    digest_algorithm: DigestAlgorithm,
    content_type: Oid<Bytes>,
    content: OctetString,
    cert: Cert,
    crl: Option<Crl>,
    sid: KeyIdentifier,
    signed_attrs: SignedAttrs,
    signature: RpkiSignature,
    message_digest: Bytes,
    signing_time: Time,
}

/// # Data Access
///
impl SignedObject {
    /// Returns the content type of the encapsulated content.
    pub fn content_type(&self) -> &Oid<Bytes> {
        &self.content_type
    }

    /// Returns the encapsulated content.
    pub fn content(&self) -> &OctetString {
        &self.content
    }

    /// Decodes the encapsulated content via the given closure.
    pub fn decode_content<F, T>(
        &self, op: F
    ) -> Result<T, DecodeError<Infallible>>
    where
        F: FnOnce(
            &mut decode::Constructed<decode::BytesSource>
        ) -> Result<T, DecodeError<Infallible>>
    {
        Mode::Der.decode(self.content.to_bytes(), op)
    }

    /// Returns the EE certificate of the object.
    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    /// Returns the CRL embedded in the object if there is one.
    pub fn crl(&self) -> Option<&Crl> {
        self.crl.as_ref()
    }

    pub fn signing_time(&self) -> Time {
        self.signing_time
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    pub fn message_digest(&self) -> &Bytes {
        &self.message_digest
    }

    /// Returns the key identifier of the signer.
    pub fn signer_key_identifier(&self) -> KeyIdentifier {
        self.sid
    }
}

/// # Decoding and Checking
///
impl SignedObject {
    /// Parses and checks a signed object.
    ///
    /// The outcome of every check is recorded for the current location of
    /// `result`. The object is returned only if none of these checks
    /// failed.
    ///
    /// The content type has to be one of the types in
    /// [`KNOWN_CONTENT_TYPES`]. Checking that it is the type expected for
    /// a certain kind of object is left to that object.
    pub fn parse(
        data: Bytes, result: &mut ValidationResult
    ) -> Option<Self> {
        let raw = match Mode::Der.decode(data, RawSignedObject::take_from) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    "{}: failed to decode signed object: {}",
                    result.current_location(), err
                );
                result.reject(check::CMS_DATA_PARSING, &[]);
                return None
            }
        };
        result.pass(check::CMS_DATA_PARSING, &[]);
        Self::check(raw, result)
    }

    fn check(
        raw: RawSignedObject, result: &mut ValidationResult
    ) -> Option<Self> {
        let failures = result.failures_for_current_location().len();

        result.reject_if_false(
            raw.version == 3, check::CMS_SIGNED_DATA_VERSION, &[]
        );
        let digest_algorithm = match raw.digest_algorithms.as_slice() {
            [alg] => DigestAlgorithm::from_oid(alg),
            _ => None
        };
        result.reject_if_none(
            digest_algorithm, check::CMS_SIGNED_DATA_DIGEST_ALGORITHM, &[]
        );
        result.reject_if_false(
            KNOWN_CONTENT_TYPES.iter().any(|known| raw.content_type == *known),
            check::CMS_CONTENT_TYPE, &[&raw.content_type.to_string()]
        );

        let cert = Self::check_cert(raw.certs, result);
        let crl = Self::check_crls(raw.crls, result);

        if !result.reject_if_false(
            raw.signer_infos.len() == 1, check::CMS_ONLY_ONE_SIGNER, &[]
        ) {
            return None
        }
        let signer = raw.signer_infos.into_iter().next()?;

        result.reject_if_false(
            signer.version == 3, check::CMS_SIGNER_INFO_VERSION, &[]
        );
        if result.reject_if_none(signer.sid, check::CMS_SIGNER_INFO_SKI, &[]) {
            if let (Some(sid), Some(cert)) = (signer.sid, cert.as_ref()) {
                result.reject_if_false(
                    cert.subject_key_identifier() == Some(sid),
                    check::CMS_SIGNER_ID_MATCH_CERT, &[]
                );
            }
        }
        result.reject_if_false(
            digest_algorithm.is_some()
                && DigestAlgorithm::from_oid(&signer.digest_algorithm)
                    == digest_algorithm,
            check::CMS_SIGNER_INFO_DIGEST_ALGORITHM, &[]
        );
        let signature_algorithm = RpkiSignatureAlgorithm::from_cms_oid(
            &signer.signature_algorithm, signer.signature_has_param
        );
        result.reject_if_none(
            signature_algorithm, check::ENCRYPTION_ALGORITHM, &[]
        );

        let mut message_digest = None;
        let mut signing_time = None;
        let attrs = signer.signed_attrs;
        if result.reject_if_none(
            attrs.as_ref(), check::SIGNED_ATTRS_PRESENT, &[]
        ) {
            if let Some(attrs) = attrs.as_ref() {
                message_digest = attrs.check_message_digest(
                    &raw.content, result
                );
                signing_time = attrs.check_signing_time(result);
                attrs.check_content_type(&raw.content_type, result);
                attrs.check_other(result);
            }
        }

        result.reject_if_true(
            signer.has_unsigned_attrs, check::UNSIGNED_ATTRS_OMITTED, &[]
        );

        let signature = signature_algorithm.map(|alg| {
            RpkiSignature::new(alg, signer.signature)
        });
        let signed_attrs = attrs.map(|attrs| SignedAttrs(attrs.raw));
        if let (Some(cert), Some(attrs), Some(signature)) = (
            cert.as_ref(), signed_attrs.as_ref(), signature.as_ref()
        ) {
            result.reject_if_false(
                cert.subject_public_key_info().verify(
                    attrs.encode_verify().as_slice(), signature
                ).is_ok(),
                check::SIGNATURE_VERIFICATION, &[]
            );
        }

        if result.failures_for_current_location().len() > failures {
            return None
        }
        Some(SignedObject {
            digest_algorithm: digest_algorithm?,
            content_type: raw.content_type,
            content: raw.content,
            cert: cert?,
            crl,
            sid: signer.sid?,
            signed_attrs: signed_attrs?,
            signature: signature?,
            message_digest: message_digest?,
            signing_time: signing_time?,
        })
    }

    /// Checks the certificate set.
    ///
    /// There has to be exactly one certificate. It has to follow the
    /// certificate profile and be an EE certificate with a key identifier
    /// and resources.
    fn check_cert(
        certs: Vec<Captured>, result: &mut ValidationResult
    ) -> Option<Cert> {
        if !result.reject_if_false(
            certs.len() == 1, check::ONLY_ONE_EE_CERT_ALLOWED, &[]
        ) {
            return None
        }
        let cert = certs.into_iter().next()?.decode(Cert::from_constructed);
        let cert = match cert {
            Ok(cert) => {
                result.pass(check::CERTIFICATE_PARSED, &[]);
                cert
            }
            Err(err) => {
                debug!(
                    "{}: failed to decode EE certificate: {}",
                    result.current_location(), err
                );
                result.reject(check::CERTIFICATE_PARSED, &[]);
                return None
            }
        };
        cert.check(result);
        result.reject_if_true(cert.is_ca(), check::CERT_IS_EE_CERT, &[]);
        result.reject_if_none(
            cert.subject_key_identifier(), check::CERT_HAS_SKI, &[]
        );
        result.reject_if_false(
            cert.v4_resources().is_present()
                || cert.v6_resources().is_present()
                || cert.as_resources().is_present(),
            check::CERT_HAS_RESOURCES, &[]
        );
        Some(cert)
    }

    /// Checks the optional CRL set.
    fn check_crls(
        crls: Vec<Captured>, result: &mut ValidationResult
    ) -> Option<Crl> {
        if !result.reject_if_false(
            crls.len() <= 1, check::ONLY_ONE_CRL_ALLOWED, &[]
        ) {
            return None
        }
        let crl = crls.into_iter().next()?;
        match crl.decode(Crl::from_constructed) {
            Ok(crl) => {
                result.pass(check::CRL_IS_X509, &[]);
                Some(crl)
            }
            Err(err) => {
                debug!(
                    "{}: failed to decode embedded CRL: {}",
                    result.current_location(), err
                );
                result.reject(check::CRL_IS_X509, &[]);
                None
            }
        }
    }
}

/// # Encoding
///
impl SignedObject {
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            oid::SIGNED_DATA.encode(), // contentType
            encode::sequence_as(Tag::CTX_0, // content
                encode::sequence((
                    3u8.encode(), // version
                    self.digest_algorithm.encode_set(), // digestAlgorithms
                    encode::sequence(( // encapContentInfo
                        self.content_type.encode_ref(),
                        encode::sequence_as(Tag::CTX_0,
                            self.content.encode_ref()
                        ),
                    )),
                    encode::sequence_as(Tag::CTX_0, // certificates
                        self.cert.encode_ref(),
                    ),
                    self.crl.as_ref().map(|crl| {
                        encode::sequence_as(Tag::CTX_1, crl.encode_ref())
                    }),
                    encode::set( // signerInfos
                        encode::sequence(( // SignerInfo
                            3u8.encode(), // version
                            self.sid.encode_ref_as(Tag::CTX_0),
                            self.digest_algorithm.encode(), // digestAlgorithm
                            self.signed_attrs.encode_ref(), // signedAttrs
                            self.signature.algorithm().cms_encode(),
                            OctetString::encode_slice( // signature
                                self.signature.value().as_ref()
                            ),
                        ))
                    )
                ))
            )
        ))
    }

    pub fn to_captured(&self) -> Captured {
        self.encode_ref().to_captured(Mode::Der)
    }

    pub fn to_bytes(&self) -> Bytes {
        self.to_captured().into_bytes()
    }
}


//------------ RawSignedObject -----------------------------------------------

/// A signed object decoded but not yet checked.
#[derive(Clone, Debug)]
struct RawSignedObject {
    version: u8,
    digest_algorithms: Vec<Oid<Bytes>>,
    content_type: Oid<Bytes>,
    content: OctetString,
    certs: Vec<Captured>,
    crls: Vec<Captured>,
    signer_infos: Vec<RawSignerInfo>,
}

impl RawSignedObject {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| { // ContentInfo
            oid::SIGNED_DATA.skip_if(cons)?;
            cons.take_constructed_if(Tag::CTX_0, |cons| {
                cons.take_sequence(Self::from_constructed)
            })
        })
    }

    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let version = cons.take_u8()?;
        let digest_algorithms = cons.take_set(|cons| {
            take_values(cons, |cons| {
                cons.take_opt_sequence(|cons| {
                    let oid = Oid::take_from(cons)?;
                    cons.skip_all()?;
                    Ok(oid)
                })
            })
        })?;
        let (content_type, content) = cons.take_sequence(|cons| {
            Ok((
                Oid::take_from(cons)?,
                cons.take_constructed_if(Tag::CTX_0, OctetString::take_from)?
            ))
        })?;
        let certs = take_captured_set(cons, Tag::CTX_0)?;
        let crls = take_captured_set(cons, Tag::CTX_1)?;
        let signer_infos = cons.take_set(|cons| {
            take_values(cons, RawSignerInfo::take_opt_from)
        })?;
        Ok(RawSignedObject {
            version, digest_algorithms, content_type, content,
            certs, crls, signer_infos,
        })
    }
}


//------------ RawSignerInfo -------------------------------------------------

#[derive(Clone, Debug)]
struct RawSignerInfo {
    version: u8,

    /// The subject key identifier if that choice was used.
    sid: Option<KeyIdentifier>,
    digest_algorithm: Oid<Bytes>,
    signed_attrs: Option<RawSignedAttrs>,
    signature_algorithm: Oid<Bytes>,
    signature_has_param: bool,
    signature: Bytes,
    has_unsigned_attrs: bool,
}

impl RawSignerInfo {
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let version = cons.take_u8()?;
            let sid = cons.take_value(|tag, content| {
                if tag == Tag::CTX_0 {
                    KeyIdentifier::from_content(content).map(Some)
                }
                else {
                    content.skip_all()?;
                    Ok(None)
                }
            })?;
            let digest_algorithm = cons.take_sequence(|cons| {
                let oid = Oid::take_from(cons)?;
                cons.skip_all()?;
                Ok(oid)
            })?;
            let signed_attrs = RawSignedAttrs::take_opt_from(cons)?;
            let (signature_algorithm, signature_has_param) = {
                cons.take_sequence(|cons| {
                    let oid = Oid::take_from(cons)?;
                    let has_param = cons.take_opt_primitive_if(
                        Tag::NULL, |_| Ok(())
                    )?.is_some();
                    Ok((oid, has_param))
                })?
            };
            let signature = OctetString::take_from(cons)?.into_bytes();
            let has_unsigned_attrs = cons.take_opt_constructed_if(
                Tag::CTX_1, |cons| cons.skip_all()
            )?.is_some();
            Ok(RawSignerInfo {
                version, sid, digest_algorithm, signed_attrs,
                signature_algorithm, signature_has_param, signature,
                has_unsigned_attrs,
            })
        })
    }
}


//------------ RawSignedAttrs ------------------------------------------------

/// The signed attributes as they were found.
///
/// Each of the vecs holds one item per occurrence of the attribute with
/// the values of that occurrence. This way, both repeated attributes and
/// attributes with more than one value can be reported.
#[derive(Clone, Debug)]
struct RawSignedAttrs {
    /// The content of the attribute set as it was encoded.
    raw: Captured,
    values: AttrValues,
}

#[derive(Clone, Debug, Default)]
struct AttrValues {
    content_type: Vec<Vec<Oid<Bytes>>>,
    message_digest: Vec<Vec<OctetString>>,
    signing_time: Vec<Vec<Time>>,
    other: Vec<Oid<Bytes>>,
}

impl RawSignedAttrs {
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let mut values = AttrValues::default();
        let raw = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.capture(|cons| {
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    values.take_attribute(cons)
                })? { }
                Ok(())
            })
        })?;
        Ok(raw.map(|raw| RawSignedAttrs { raw, values }))
    }

    fn check_content_type(
        &self, content_type: &Oid<Bytes>, result: &mut ValidationResult
    ) {
        let values = match self.values.content_type.as_slice() {
            [values] => values,
            _ => {
                result.reject(check::CONTENT_TYPE_ATTR_PRESENT, &[]);
                return
            }
        };
        result.pass(check::CONTENT_TYPE_ATTR_PRESENT, &[]);
        result.reject_if_false(
            matches!(values.as_slice(), [value] if value == content_type),
            check::CONTENT_TYPE_VALUE, &[]
        );
    }

    fn check_message_digest(
        &self, content: &OctetString, result: &mut ValidationResult
    ) -> Option<Bytes> {
        let value = match self.values.message_digest.as_slice() {
            [values] => match values.as_slice() {
                [value] => value.to_bytes(),
                _ => {
                    result.reject(check::MSG_DIGEST_ATTR_PRESENT, &[]);
                    return None
                }
            }
            _ => {
                result.reject(check::MSG_DIGEST_ATTR_PRESENT, &[]);
                return None
            }
        };
        result.pass(check::MSG_DIGEST_ATTR_PRESENT, &[]);
        let digest = DigestAlgorithm::default().digest(
            content.to_bytes().as_ref()
        );
        if result.reject_if_false(
            digest.as_ref() == value.as_ref(), check::MSG_DIGEST_VALUE, &[]
        ) {
            Some(value)
        }
        else {
            None
        }
    }

    fn check_signing_time(
        &self, result: &mut ValidationResult
    ) -> Option<Time> {
        let times = &self.values.signing_time;
        if !result.reject_if_true(
            times.is_empty(), check::SIGNING_TIME_ATTR_PRESENT, &[]
        ) {
            return None
        }
        match times.as_slice() {
            [values] if values.len() == 1 => {
                result.pass(check::ONLY_ONE_SIGNING_TIME_ATTR, &[]);
                values.first().copied()
            }
            _ => {
                result.reject(check::ONLY_ONE_SIGNING_TIME_ATTR, &[]);
                None
            }
        }
    }

    fn check_other(&self, result: &mut ValidationResult) {
        let other = self.values.other.iter().map(ToString::to_string)
            .collect::<Vec<_>>().join(", ");
        result.warn_if_false(
            self.values.other.is_empty(),
            check::SIGNED_ATTRS_CORRECT, &[&other]
        );
    }
}

impl AttrValues {
    fn take_attribute<S: decode::Source>(
        &mut self, cons: &mut decode::Constructed<S>
    ) -> Result<(), DecodeError<S::Error>> {
        let oid = Oid::take_from(cons)?;
        if oid == oid::CONTENT_TYPE {
            self.content_type.push(cons.take_set(|cons| {
                take_values(cons, Oid::take_opt_from)
            })?);
        }
        else if oid == oid::MESSAGE_DIGEST {
            self.message_digest.push(cons.take_set(|cons| {
                take_values(cons, OctetString::take_opt_from)
            })?);
        }
        else if oid == oid::SIGNING_TIME {
            self.signing_time.push(cons.take_set(|cons| {
                take_values(cons, Time::take_opt_from)
            })?);
        }
        else {
            // The binary signing time is allowed by RFC 6488 but unused.
            if oid != oid::AA_BINARY_SIGNING_TIME {
                self.other.push(oid);
            }
            cons.skip_all()?;
        }
        Ok(())
    }
}


//------------ SignedAttrs ---------------------------------------------------

/// The signed attributes of a signed object.
///
/// This holds the content of the attribute set in its encoded form since
/// the signature is calculated over exactly these octets.
#[derive(Clone, Debug)]
pub struct SignedAttrs(Captured);

impl SignedAttrs {
    /// Creates the attributes for the given values.
    ///
    /// DER orders the elements of a SET OF by their encoding, so the three
    /// attributes are encoded first and then sorted.
    fn new(
        content_type: &Oid<Bytes>,
        message_digest: &Bytes,
        signing_time: Time,
    ) -> Self {
        let mut attrs = [
            encode::sequence((
                oid::CONTENT_TYPE.encode(),
                encode::set(content_type.encode_ref()),
            )).to_captured(Mode::Der),
            encode::sequence((
                oid::MESSAGE_DIGEST.encode(),
                encode::set(
                    OctetString::encode_slice(message_digest.as_ref())
                ),
            )).to_captured(Mode::Der),
            encode::sequence((
                oid::SIGNING_TIME.encode(),
                encode::set(signing_time.encode_varied()),
            )).to_captured(Mode::Der),
        ];
        attrs.sort_by(|left, right| left.as_slice().cmp(right.as_slice()));

        let mut res = Captured::builder(Mode::Der);
        for attr in &attrs {
            res.extend(attr)
        }
        SignedAttrs(res.freeze())
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence_as(Tag::CTX_0, &self.0)
    }

    /// Returns the message the signature is calculated over.
    ///
    /// This is the attributes encoded as a SET OF rather than with the
    /// implicit tag used in the signer info.
    pub fn encode_verify(&self) -> Captured {
        encode::set(&self.0).to_captured(Mode::Der)
    }
}

impl AsRef<[u8]> for SignedAttrs {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//------------ SignedObjectBuilder -------------------------------------------

/// The values needed for creating a new signed object.
///
/// All fields are public. Set those you need and then call
/// [`finalize`][Self::finalize]. Missing required values are reported
/// through [`BuildError::MissingField`].
#[derive(Clone, Debug, Default)]
pub struct SignedObjectBuilder {
    /// The serial number of the EE certificate. Required.
    pub serial_number: Option<Serial>,

    /// The validity of the EE certificate. Required.
    pub validity: Option<Validity>,

    /// The issuer name of the EE certificate.
    ///
    /// If missing, the name is derived from the issuer key.
    pub issuer: Option<Name>,

    /// The subject name of the EE certificate.
    ///
    /// If missing, the name is derived from the one-off key.
    pub subject: Option<Name>,

    /// The URI of the issuer’s CRL. Required.
    pub crl_uri: Option<uri::Rsync>,

    /// The URI of the issuer’s certificate. Required.
    pub ca_issuer: Option<uri::Rsync>,

    /// The URI of the signed object itself. Required.
    pub signed_object: Option<uri::Rsync>,

    /// The resources of the EE certificate.
    ///
    /// If missing, all resources are inherited from the issuer.
    pub resources: Option<ResourceSet>,

    /// The signing time. Defaults to the current time.
    pub signing_time: Option<Time>,

    /// A CRL to embed into the object.
    pub crl: Option<Crl>,
}

impl SignedObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the signed object.
    ///
    /// The EE certificate gets a one-off key that is used for signing the
    /// content and then discarded. It is signed by `issuer_key`.
    pub fn finalize<S: Signer>(
        self,
        content_type: &ConstOid,
        content: Bytes,
        signer: &S,
        issuer_key: &S::KeyId,
    ) -> Result<SignedObject, BuildError<S::Error>> {
        let serial_number = self.serial_number.ok_or(
            BuildError::MissingField("serial_number")
        )?;
        let validity = self.validity.ok_or(
            BuildError::MissingField("validity")
        )?;
        let crl_uri = self.crl_uri.ok_or(
            BuildError::MissingField("crl_uri")
        )?;
        let ca_issuer = self.ca_issuer.ok_or(
            BuildError::MissingField("ca_issuer")
        )?;
        let signed_object = self.signed_object.ok_or(
            BuildError::MissingField("signed_object")
        )?;
        let issuer_pub = signer.get_key_info(issuer_key)?;

        let digest_algorithm = DigestAlgorithm::default();
        let content_type = Oid(Bytes::from_static(content_type.0));
        let message_digest = Bytes::copy_from_slice(
            digest_algorithm.digest(content.as_ref()).as_ref()
        );
        let signing_time = self.signing_time.unwrap_or_else(Time::now);
        let signed_attrs = SignedAttrs::new(
            &content_type, &message_digest, signing_time
        );
        let (signature, key_info) = signer.sign_one_off(
            RpkiSignatureAlgorithm::default(), &signed_attrs.encode_verify()
        ).map_err(SigningError::Signer)?;
        let sid = key_info.key_identifier();

        let mut cert = TbsCert::new(
            serial_number,
            self.issuer.unwrap_or_else(|| Name::from_pub_key(&issuer_pub)),
            validity,
            self.subject,
            key_info,
            KeyUsage::ee(),
        );
        cert.set_authority_key_identifier(Some(issuer_pub.key_identifier()));
        cert.set_crl_uri(Some(crl_uri));
        cert.set_ca_issuer(Some(ca_issuer));
        cert.set_signed_object(Some(signed_object));
        match self.resources {
            Some(resources) => cert.set_resources(&resources),
            None => cert.set_inherit_resources(),
        }
        let cert = cert.into_cert(signer, issuer_key)?;

        Ok(SignedObject {
            digest_algorithm,
            content_type,
            content: OctetString::new(content),
            cert,
            crl: self.crl,
            sid,
            signed_attrs,
            signature,
            message_digest,
            signing_time,
        })
    }
}


//------------ Helpers -------------------------------------------------------

/// Collects values until `op` returns `None`.
fn take_values<S, F, T>(
    cons: &mut decode::Constructed<S>, mut op: F
) -> Result<Vec<T>, DecodeError<S::Error>>
where
    S: decode::Source,
    F: FnMut(
        &mut decode::Constructed<S>
    ) -> Result<Option<T>, DecodeError<S::Error>>
{
    let mut res = Vec::new();
    while let Some(value) = op(cons)? {
        res.push(value)
    }
    Ok(res)
}

/// Takes an optional implicitly tagged set of sequences.
///
/// Each element is returned as the captured content of its sequence.
fn take_captured_set<S: decode::Source>(
    cons: &mut decode::Constructed<S>, tag: Tag
) -> Result<Vec<Captured>, DecodeError<S::Error>> {
    Ok(cons.take_opt_constructed_if(tag, |cons| {
        take_values(cons, |cons| {
            cons.take_opt_sequence(|cons| cons.capture_all())
        })
    })?.unwrap_or_default())
}


//============ Tests =========================================================

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use super::*;
    use crate::crypto::PublicKeyFormat;
    use crate::repository::test_util::TestCa;
    use crate::validation::result::ValidationStatus;

    fn make_object(ca: &TestCa, builder: SignedObjectBuilder) -> SignedObject {
        builder.finalize(
            &oid::CT_RPKI_MANIFEST, Bytes::from_static(b"content"),
            &ca.signer, &ca.key,
        ).unwrap()
    }

    #[test]
    fn build_and_parse() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let obj = make_object(&ca, ca.object_builder(2, "object.mft"));

        let mut result = ValidationResult::with_location("object.mft");
        let parsed = SignedObject::parse(obj.to_bytes(), &mut result).unwrap();
        assert!(result.has_no_failures_or_warnings(), "{}", result);
        assert_eq!(parsed.content().to_bytes().as_ref(), b"content");
        assert_eq!(parsed.cert(), obj.cert());
        assert_eq!(parsed.signing_time(), obj.signing_time());
        assert!(parsed.crl().is_none());
        assert!(parsed.cert().is_fully_inherited());
        assert_eq!(
            parsed.cert().authority_key_identifier(),
            ca.cert.subject_key_identifier()
        );
        assert_eq!(
            result.result_for_current_location(
                check::SIGNATURE_VERIFICATION
            ).map(|check| check.status()),
            Some(ValidationStatus::Passed)
        );
    }

    #[test]
    fn embedded_crl() {
        let ca = TestCa::root("AS64496");
        let mut builder = ca.object_builder(2, "object.mft");
        builder.crl = Some(ca.crl(&[]));
        let obj = make_object(&ca, builder);

        let mut result = ValidationResult::default();
        let parsed = SignedObject::parse(obj.to_bytes(), &mut result).unwrap();
        assert_eq!(parsed.crl(), obj.crl());
        assert!(!result.has_failures());
    }

    #[test]
    fn unknown_content_type() {
        let ca = TestCa::root("AS64496");
        let obj = ca.object_builder(2, "object.foo").finalize(
            &oid::SIGNED_DATA, Bytes::from_static(b"content"),
            &ca.signer, &ca.key,
        ).unwrap();

        let mut result = ValidationResult::with_location("object.foo");
        assert!(SignedObject::parse(obj.to_bytes(), &mut result).is_none());
        let failures = result.failures_for_current_location();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CMS_CONTENT_TYPE);
        assert_eq!(failures[0].params(), &[oid::SIGNED_DATA.to_string()]);
    }

    #[test]
    fn garbage_is_one_parsing_error() {
        let mut result = ValidationResult::with_location("garbage.mft");
        assert!(SignedObject::parse(
            Bytes::from_static(b"\x30\x03\x02\x01"), &mut result
        ).is_none());
        let failures = result.failures_for_current_location();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::CMS_DATA_PARSING);
    }

    #[test]
    fn missing_fields() {
        let ca = TestCa::root("AS64496");
        let mut builder = ca.object_builder(2, "object.mft");
        builder.crl_uri = None;
        let err = builder.finalize(
            &oid::CT_RPKI_MANIFEST, Bytes::new(), &ca.signer, &ca.key,
        ).unwrap_err();
        assert!(matches!(err, BuildError::MissingField("crl_uri")));
        assert!(matches!(
            SignedObjectBuilder::new().finalize(
                &oid::CT_RPKI_MANIFEST, Bytes::new(), &ca.signer, &ca.key,
            ),
            Err(BuildError::MissingField("serial_number"))
        ));
    }

    #[test]
    fn signed_attrs_are_sorted() {
        let attrs = SignedAttrs::new(
            &Oid(Bytes::from_static(oid::CT_RPKI_MANIFEST.0)),
            &Bytes::from_static(&[0u8; 32]),
            Time::utc(2024, 1, 1, 0, 0, 0),
        );
        let mut seen = Vec::new();
        Mode::Der.decode(attrs.encode_verify().into_bytes(), |cons| {
            cons.take_set(|cons| {
                while let Some(attr) = cons.take_opt_sequence(|cons| {
                    cons.capture_all()
                })? {
                    seen.push(attr.into_bytes())
                }
                Ok(())
            })
        }).unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Returns a valid object decoded but not yet checked.
    fn raw_object(ca: &TestCa) -> RawSignedObject {
        let obj = make_object(ca, ca.object_builder(2, "object.mft"));
        Mode::Der.decode(obj.to_bytes(), RawSignedObject::take_from).unwrap()
    }

    /// Checks `raw` and returns the keys of all failed checks.
    fn check_failures(raw: RawSignedObject) -> Vec<&'static str> {
        let mut result = ValidationResult::with_location("object.mft");
        let object = SignedObject::check(raw, &mut result);
        let keys: Vec<_> = result.failures_for_current_location().iter()
            .map(|check| check.key()).collect();
        assert_eq!(object.is_none(), !keys.is_empty());
        keys
    }

    #[test]
    fn raw_object_is_valid() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        assert!(check_failures(raw_object(&ca)).is_empty());
    }

    #[test]
    fn tampered_content() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        raw.content = OctetString::new(Bytes::from_static(b"other"));
        assert_eq!(check_failures(raw), [check::MSG_DIGEST_VALUE]);
    }

    #[test]
    fn unsigned_attrs() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        raw.signer_infos[0].has_unsigned_attrs = true;
        assert_eq!(check_failures(raw), [check::UNSIGNED_ATTRS_OMITTED]);
    }

    #[test]
    fn two_certs() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        let cert = raw.certs[0].clone();
        raw.certs.push(cert);
        assert_eq!(check_failures(raw), [check::ONLY_ONE_EE_CERT_ALLOWED]);
    }

    #[test]
    fn signer_digest_algorithm() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        raw.signer_infos[0].digest_algorithm = Oid(
            Bytes::from_static(oid::RSA_ENCRYPTION.0)
        );
        assert_eq!(
            check_failures(raw), [check::CMS_SIGNER_INFO_DIGEST_ALGORITHM]
        );
    }

    #[test]
    fn two_signing_times() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        if let Some(attrs) = raw.signer_infos[0].signed_attrs.as_mut() {
            attrs.values.signing_time.push(vec![Time::now()]);
        }
        assert_eq!(
            check_failures(raw), [check::ONLY_ONE_SIGNING_TIME_ATTR]
        );
    }

    #[test]
    fn bad_signature() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);
        raw.signer_infos[0].signature = Bytes::from(vec![0u8; 256]);
        assert_eq!(check_failures(raw), [check::SIGNATURE_VERIFICATION]);
    }

    #[test]
    fn ca_cert_as_ee_cert() {
        let ca = TestCa::root("AS64496, 10.0.0.0/8");
        let mut raw = raw_object(&ca);

        // Replace the EE certificate by a CA certificate and sign the
        // unchanged attributes with its key.
        let key = ca.signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = ca.signer.get_key_info(&key).unwrap();
        let mut tbs = ca.child_tbs(3, pubkey.clone(), KeyUsage::ee());
        tbs.set_basic_ca(Some(true));
        tbs.set_signed_object(
            Some(ca.repository.join(b"object.mft").unwrap())
        );
        tbs.set_inherit_resources();
        let cert = ca.sign(tbs);
        raw.certs[0] = Mode::Der.decode(cert.to_bytes(), |cons| {
            cons.take_sequence(|cons| cons.capture_all())
        }).unwrap();

        let signer = &mut raw.signer_infos[0];
        let attrs = SignedAttrs(
            signer.signed_attrs.as_ref().unwrap().raw.clone()
        );
        signer.signature = ca.signer.sign(
            &key, RpkiSignatureAlgorithm::default(), &attrs.encode_verify()
        ).unwrap().value().clone();
        signer.sid = Some(pubkey.key_identifier());

        assert_eq!(check_failures(raw), [check::CERT_IS_EE_CERT]);
    }
}
