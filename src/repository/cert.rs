//! Resource certificates.
//!
//! The certificates used in RPKI are called _resource certificates._ They
//! are defined in [RFC 6487] as a profile on regular Internet PKI
//! certificates defined in [RFC 5280] carrying the resource extensions of
//! [RFC 3779].
//!
//! Parsing is lenient about the parts of the profile that the chain
//! validator checks: a missing key usage, key identifier or basic
//! constraints extension is recorded as absent so that validation can
//! report it under its own check key. Only values that cannot be
//! represented at all are rejected while decoding. The remaining profile
//! rules that concern the certificate alone are checked by
//! [`Cert::check`].
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::{io, ops};
use bcder::{decode, encode};
use bcder::{
    BitString, Captured, ConstOid, Ia5String, Mode, OctetString, Oid, Tag,
};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use crate::{oid, uri};
use crate::validation::check;
use crate::validation::result::ValidationResult;
use crate::crypto::{
    KeyIdentifier, PublicKey, RpkiSignatureAlgorithm, SignatureAlgorithm,
    SignatureVerificationError, Signer, SigningError,
};
use super::resources::{
    AsResources, IpResources, ResourceSet,
};
use super::x509::{
    Name, SignedData, Serial, Validity, encode_extension, update_once,
};


//------------ Cert ----------------------------------------------------------

/// A resource certificate.
///
/// A certificate is either a _CA certificate_ used to sign other
/// certificates and CRLs, or an _EE certificate_ that signs exactly one
/// object and is embedded in that object. Self-signed CA certificates are
/// used as trust anchors.
///
/// Two certificates are equal if their encoded data and signatures are.
#[derive(Clone, Debug)]
pub struct Cert {
    /// The outer structure of the certificate.
    signed_data: SignedData,

    /// The actual data of the certificate.
    tbs: TbsCert,
}


/// # Decoding and Encoding
///
impl Cert {
    /// Decodes a source as a certificate.
    pub fn decode<S: IntoSource>(
        source: S,
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    /// Takes an encoded certificate from the beginning of a value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Takes an optional certificate from the beginning of a value.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(Self::from_constructed)
    }

    /// Parses the content of a Certificate sequence.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let signed_data = SignedData::from_constructed(cons)?;
        let tbs = signed_data.data().clone().decode(
            TbsCert::from_constructed
        ).map_err(DecodeError::convert)?;
        Ok(Self { signed_data, tbs })
    }

    /// Returns a value encoder for a reference to the certificate.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }

    /// Returns a captured encoding of the certificate.
    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }

    /// Returns the DER encoded certificate.
    pub fn to_bytes(&self) -> Bytes {
        self.to_captured().into_bytes()
    }
}


/// # Checking
///
impl Cert {
    /// Verifies the signature of the certificate with the given key.
    pub fn verify_signature(
        &self, issuer_key: &PublicKey
    ) -> Result<(), SignatureVerificationError> {
        self.signed_data.verify_signature(issuer_key)
    }

    /// Returns whether the certificate is self-signed.
    ///
    /// This is the case if subject and issuer are equal and the key
    /// identifiers, where present, agree. The signature is not checked.
    pub fn is_self_signed(&self) -> bool {
        if self.tbs.subject != self.tbs.issuer {
            return false
        }
        match (self.tbs.authority_key_id, self.tbs.subject_key_id) {
            (Some(aki), Some(ski)) => aki == ski,
            _ => true
        }
    }

    /// Returns whether this is a root certificate.
    ///
    /// Roots are the end of the line when walking up a chain. Whether a
    /// root is trusted is a different question.
    pub fn is_root(&self) -> bool {
        self.is_self_signed()
    }

    /// Checks the certificate against the RPKI certificate profile.
    ///
    /// These are the rules of [RFC 6487] that can be checked without
    /// knowing the issuer. The outcomes are recorded for the current
    /// location of `result`. Returns whether none of the checks failed.
    ///
    /// [RFC 6487]: https://tools.ietf.org/html/rfc6487
    pub fn check(&self, result: &mut ValidationResult) -> bool {
        let failures = result.failures_for_current_location().len();

        // 4.3. Signature Algorithm. RFC 5280 demands that both mentions
        // are the same.
        result.reject_if_false(
            self.tbs.signature == *self.signed_data.signature().algorithm(),
            check::CERTIFICATE_SIGNATURE_ALGORITHM, &[]
        );

        // 4.4. Issuer and 4.5. Subject.
        result.warn_if_false(
            self.tbs.issuer.is_rpki_name(),
            check::CERT_ISSUER_CORRECT, &[&self.tbs.issuer.to_string()]
        );
        result.warn_if_false(
            self.tbs.subject.is_rpki_name(),
            check::CERT_SUBJECT_CORRECT, &[&self.tbs.subject.to_string()]
        );

        // 4.7. Subject Public Key Info. RFC 7935 wants 2048 bit keys.
        let bits = self.tbs.subject_public_key_info.rsa_modulus_bits();
        result.warn_if_false(
            bits == Some(2048), check::PUBLIC_KEY_CERT_SIZE,
            &[&bits.map(|bits| bits.to_string()).unwrap_or_default()]
        );

        // 4.8.9. Certificate Policies.
        self.check_policies(result);

        // 4.8.10. IP Resources and 4.8.11. AS Resources. At least one
        // must be present and critical.
        result.reject_if_false(
            (
                (
                    self.tbs.v4_resources.is_present()
                    || self.tbs.v6_resources.is_present()
                ) && self.tbs.is_critical(&oid::PE_IP_ADDR_BLOCK)
            ) || (
                self.tbs.as_resources.is_present()
                && self.tbs.is_critical(&oid::PE_AUTONOMOUS_SYS_IDS)
            ),
            check::RESOURCE_EXT_PRESENT, &[]
        );

        // 4.8.6. CRL Distribution Points and 4.8.7. Authority Information
        // Access. Present unless self-signed.
        if self.is_self_signed() {
            result.reject_if_some(
                self.tbs.crl_uri.as_ref(), check::CRLDP_OMITTED, &[]
            );
            result.reject_if_some(
                self.tbs.ca_issuer.as_ref(), check::AIA_OMITTED, &[]
            );
        }
        else {
            result.reject_if_none(
                self.tbs.crl_uri.as_ref(), check::CRLDP_PRESENT, &[]
            );
            result.reject_if_none(
                self.tbs.ca_issuer.as_ref(), check::AIA_PRESENT, &[]
            );
        }

        result.failures_for_current_location().len() == failures
    }

    /// Checks the Certificate Policies extension.
    ///
    /// It must be critical and contain exactly the RPKI policy.
    fn check_policies(&self, result: &mut ValidationResult) {
        if !result.reject_if_true(
            self.tbs.critical_extensions.is_empty(),
            check::CRITICAL_EXT_PRESENT, &[]
        ) {
            return
        }
        result.reject_if_false(
            self.tbs.is_critical(&oid::CE_CERTIFICATE_POLICIES),
            check::POLICY_EXT_CRITICAL, &[]
        );
        let policies = self.tbs.certificate_policies.as_slice();
        if !result.reject_if_true(
            policies.is_empty(), check::POLICY_EXT_VALUE, &[]
        ) {
            return
        }
        match policies {
            [policy] => {
                result.pass(check::SINGLE_CERT_POLICY, &[]);
                result.reject_if_false(
                    *policy == oid::CP_IPADDR_ASNUMBER,
                    check::POLICY_ID_VERSION, &[&policy.to_string()]
                );
            }
            _ => {
                result.reject(check::SINGLE_CERT_POLICY, &[]);
            }
        }
    }
}


//--- Deref, AsRef, PartialEq, and Eq

impl ops::Deref for Cert {
    type Target = TbsCert;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<TbsCert> for Cert {
    fn as_ref(&self) -> &TbsCert {
        &self.tbs
    }
}

impl PartialEq for Cert {
    fn eq(&self, other: &Self) -> bool {
        self.signed_data.data().as_slice()
            == other.signed_data.data().as_slice()
        && self.signed_data.signature().value()
            == other.signed_data.signature().value()
    }
}

impl Eq for Cert { }


//------------ TbsCert -------------------------------------------------------

/// The data of a resource certificate.
///
/// A value is created either by decoding a certificate or through
/// [`TbsCert::new`] which takes every field a certificate cannot do
/// without. The optional extensions are then set before the value is
/// signed via [`TbsCert::into_cert`].
#[derive(Clone, Debug)]
pub struct TbsCert {
    serial_number: Serial,

    /// The algorithm used for signing the certificate.
    signature: RpkiSignatureAlgorithm,

    issuer: Name,
    validity: Validity,
    subject: Name,
    subject_public_key_info: PublicKey,

    /// Basic Constraints extension.
    ///
    /// The field indicates whether the extension is present and, if so,
    /// whether the "cA" boolean is set.
    basic_ca: Option<bool>,

    /// Subject Key Identifier extension.
    subject_key_id: Option<KeyIdentifier>,

    /// Authority Key Identifier extension.
    authority_key_id: Option<KeyIdentifier>,

    /// Key Usage extension.
    key_usage: Option<KeyUsage>,

    // The URI extensions may contain more than one URI. We only keep the
    // first rsync URI of each.

    /// CRL Distribution Points.
    crl_uri: Option<uri::Rsync>,

    /// Authority Information Access of type `id-ad-caIssuer`.
    ca_issuer: Option<uri::Rsync>,

    /// Subject Information Access of type `id-ad-caRepository`
    ca_repository: Option<uri::Rsync>,

    /// Subject Information Access of type `id-ad-rpkiManifest`
    rpki_manifest: Option<uri::Rsync>,

    /// Subject Information Access of type `id-ad-signedObject`
    signed_object: Option<uri::Rsync>,

    /// The policy identifiers of the Certificate Policies extension.
    certificate_policies: Vec<Oid>,

    /// The identifiers of the extensions marked critical.
    critical_extensions: Vec<Oid>,

    v4_resources: IpResources,
    v6_resources: IpResources,
    as_resources: AsResources,
}


/// # Creation and Conversion
///
impl TbsCert {
    /// Creates a new value from the necessary data.
    ///
    /// If `subject` is `None`, a name is derived from the public key. The
    /// subject key identifier is derived from the key, too. The
    /// certificate uses the RPKI certificate policy and has no resources.
    /// The extensions RFC 6487 requires to be critical are marked so.
    pub fn new(
        serial_number: Serial,
        issuer: Name,
        validity: Validity,
        subject: Option<Name>,
        subject_public_key_info: PublicKey,
        key_usage: KeyUsage,
    ) -> Self {
        Self {
            serial_number,
            signature: RpkiSignatureAlgorithm::default(),
            issuer,
            validity,
            subject: subject.unwrap_or_else(|| {
                Name::from_pub_key(&subject_public_key_info)
            }),
            subject_key_id: Some(subject_public_key_info.key_identifier()),
            subject_public_key_info,
            basic_ca: None,
            authority_key_id: None,
            key_usage: Some(key_usage),
            crl_uri: None,
            ca_issuer: None,
            ca_repository: None,
            rpki_manifest: None,
            signed_object: None,
            certificate_policies: vec![
                Oid(Bytes::from_static(oid::CP_IPADDR_ASNUMBER.0))
            ],
            critical_extensions: [
                oid::CE_BASIC_CONSTRAINTS,
                oid::CE_KEY_USAGE,
                oid::CE_CERTIFICATE_POLICIES,
                oid::PE_IP_ADDR_BLOCK,
                oid::PE_AUTONOMOUS_SYS_IDS,
            ].iter().map(|id| Oid(Bytes::from_static(id.0))).collect(),
            v4_resources: IpResources::missing(),
            v6_resources: IpResources::missing(),
            as_resources: AsResources::missing(),
        }
    }

    /// Converts the value into a signed certificate.
    pub fn into_cert<S: Signer>(
        self,
        signer: &S,
        key: &S::KeyId,
    ) -> Result<Cert, SigningError<S::Error>> {
        let data = Captured::from_values(Mode::Der, self.encode_ref());
        let signature = signer.sign(key, self.signature, &data)?;
        Ok(Cert {
            signed_data: SignedData::new(data, signature),
            tbs: self
        })
    }
}


/// # Data Access
///
impl TbsCert {
    pub fn serial_number(&self) -> Serial {
        self.serial_number
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn set_validity(&mut self, validity: Validity) {
        self.validity = validity
    }

    pub fn subject(&self) -> &Name {
        &self.subject
    }

    pub fn subject_public_key_info(&self) -> &PublicKey {
        &self.subject_public_key_info
    }

    /// Returns the cA field of the basic constraints extension if present.
    pub fn basic_ca(&self) -> Option<bool> {
        self.basic_ca
    }

    pub fn set_basic_ca(&mut self, value: Option<bool>) {
        self.basic_ca = value
    }

    /// Returns whether the certificate is a CA certificate.
    pub fn is_ca(&self) -> bool {
        self.basic_ca == Some(true)
    }

    pub fn subject_key_identifier(&self) -> Option<KeyIdentifier> {
        self.subject_key_id
    }

    pub fn authority_key_identifier(&self) -> Option<KeyIdentifier> {
        self.authority_key_id
    }

    pub fn set_authority_key_identifier(
        &mut self, id: Option<KeyIdentifier>
    ) {
        self.authority_key_id = id
    }

    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.key_usage
    }

    pub fn set_key_usage(&mut self, key_usage: Option<KeyUsage>) {
        self.key_usage = key_usage
    }

    pub fn crl_uri(&self) -> Option<&uri::Rsync> {
        self.crl_uri.as_ref()
    }

    pub fn set_crl_uri(&mut self, uri: Option<uri::Rsync>) {
        self.crl_uri = uri
    }

    /// Returns the URI of the issuer’s certificate.
    pub fn ca_issuer(&self) -> Option<&uri::Rsync> {
        self.ca_issuer.as_ref()
    }

    pub fn set_ca_issuer(&mut self, uri: Option<uri::Rsync>) {
        self.ca_issuer = uri
    }

    pub fn ca_repository(&self) -> Option<&uri::Rsync> {
        self.ca_repository.as_ref()
    }

    pub fn set_ca_repository(&mut self, uri: Option<uri::Rsync>) {
        self.ca_repository = uri
    }

    pub fn rpki_manifest(&self) -> Option<&uri::Rsync> {
        self.rpki_manifest.as_ref()
    }

    pub fn set_rpki_manifest(&mut self, uri: Option<uri::Rsync>) {
        self.rpki_manifest = uri
    }

    pub fn signed_object(&self) -> Option<&uri::Rsync> {
        self.signed_object.as_ref()
    }

    pub fn set_signed_object(&mut self, uri: Option<uri::Rsync>) {
        self.signed_object = uri
    }

    /// Returns the first certificate policy.
    pub fn certificate_policy(&self) -> Option<&Oid> {
        self.certificate_policies.first()
    }

    pub fn certificate_policies(&self) -> &[Oid] {
        &self.certificate_policies
    }

    /// Returns whether the extension `id` is marked critical.
    pub fn is_critical(&self, id: &ConstOid) -> bool {
        self.critical_extensions.iter().any(|item| item == id)
    }

    pub fn v4_resources(&self) -> &IpResources {
        &self.v4_resources
    }

    pub fn set_v4_resources(&mut self, resources: IpResources) {
        self.v4_resources = resources
    }

    pub fn v6_resources(&self) -> &IpResources {
        &self.v6_resources
    }

    pub fn set_v6_resources(&mut self, resources: IpResources) {
        self.v6_resources = resources
    }

    pub fn as_resources(&self) -> &AsResources {
        &self.as_resources
    }

    pub fn set_as_resources(&mut self, resources: AsResources) {
        self.as_resources = resources
    }

    /// Sets all three resource kinds from a resource set.
    pub fn set_resources(&mut self, resources: &ResourceSet) {
        self.v4_resources = IpResources::blocks(resources.v4().clone());
        self.v6_resources = IpResources::blocks(resources.v6().clone());
        self.as_resources = AsResources::blocks(resources.asns().clone());
    }

    /// Sets all three resource kinds to be inherited from the issuer.
    pub fn set_inherit_resources(&mut self) {
        self.v4_resources = IpResources::inherit();
        self.v6_resources = IpResources::inherit();
        self.as_resources = AsResources::inherit();
    }

    /// Returns whether any of the resource kinds is inherited.
    pub fn is_inherited(&self) -> bool {
        self.v4_resources.is_inherited()
            || self.v6_resources.is_inherited()
            || self.as_resources.is_inherited()
    }

    /// Returns whether all resource kinds are inherited.
    pub fn is_fully_inherited(&self) -> bool {
        self.v4_resources.is_inherited()
            && self.v6_resources.is_inherited()
            && self.as_resources.is_inherited()
    }

    /// Returns the explicitly listed resources.
    ///
    /// Inherited resource kinds are empty in the returned set.
    pub fn resources(&self) -> ResourceSet {
        ResourceSet::new(
            self.as_resources.to_explicit().unwrap_or_default(),
            self.v4_resources.to_explicit().unwrap_or_default(),
            self.v6_resources.to_explicit().unwrap_or_default(),
        )
    }

    /// Returns the resources of the certificate given the issuer’s.
    ///
    /// Each inherited resource kind is taken from `parent`, all others
    /// from the certificate.
    pub fn effective_resources(&self, parent: &ResourceSet) -> ResourceSet {
        ResourceSet::new(
            self.as_resources.to_explicit().unwrap_or_else(|| {
                parent.asns().clone()
            }),
            self.v4_resources.to_explicit().unwrap_or_else(|| {
                parent.v4().clone()
            }),
            self.v6_resources.to_explicit().unwrap_or_else(|| {
                parent.v6().clone()
            }),
        )
    }
}


/// # Decoding and Encoding
///
impl TbsCert {
    /// Parses the content of a TBSCertificate sequence.
    ///
    /// ```text
    /// TBSCertificate  ::=  SEQUENCE  {
    ///     version         [0]  EXPLICIT Version DEFAULT v1,
    ///     serialNumber         CertificateSerialNumber,
    ///     signature            AlgorithmIdentifier,
    ///     issuer               Name,
    ///     validity             Validity,
    ///     subject              Name,
    ///     subjectPublicKeyInfo SubjectPublicKeyInfo,
    ///     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///     extensions      [3]  EXPLICIT Extensions OPTIONAL }
    /// ```
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            // version [0] EXPLICIT Version DEFAULT v1.
            //  -- we need extensions so apparently, we want v3 which,
            //     confusingly, is 2.
            cons.take_constructed_if(Tag::CTX_0, |c| c.skip_u8_if(2))?;

            let serial_number = Serial::take_from(cons)?;
            let signature = RpkiSignatureAlgorithm::x509_take_from(cons)?;
            let issuer = Name::take_from(cons)?;
            let validity = Validity::take_from(cons)?;
            let subject = Name::take_from(cons)?;
            let subject_public_key_info = PublicKey::take_from(cons)?;

            // issuerUniqueID and subjectUniqueID must not be present in
            // resource certificates. So extension is next.

            let mut ext = Extensions::default();
            cons.take_opt_constructed_if(Tag::CTX_3, |c| {
                c.take_sequence(|cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        ext.take_one(cons)
                    })? { }
                    Ok(())
                })
            })?;
            let (v4_resources, v6_resources) = ext.ip_resources
                .unwrap_or_else(|| {
                    (IpResources::missing(), IpResources::missing())
                });
            let sia = ext.sia.unwrap_or_default();

            Ok(TbsCert {
                serial_number,
                signature,
                issuer,
                validity,
                subject,
                subject_public_key_info,
                basic_ca: ext.basic_ca,
                subject_key_id: ext.subject_key_id,
                authority_key_id: ext.authority_key_id,
                key_usage: ext.key_usage,
                crl_uri: ext.crl_uri,
                ca_issuer: ext.ca_issuer,
                ca_repository: sia.ca_repository,
                rpki_manifest: sia.rpki_manifest,
                signed_object: sia.signed_object,
                certificate_policies: ext.certificate_policies
                    .unwrap_or_default(),
                critical_extensions: ext.critical,
                v4_resources,
                v6_resources,
                as_resources: ext.as_resources.unwrap_or_else(
                    AsResources::missing
                ),
            })
        })
    }

    /// Returns an encoder for the value.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            encode::sequence_as(Tag::CTX_0, 2.encode()), // version
            self.serial_number.encode(),
            self.signature.x509_encode(),
            self.issuer.encode_ref(),
            self.validity.encode(),
            self.subject.encode_ref(),
            self.subject_public_key_info.encode_ref(),
            // no issuerUniqueID
            // no subjectUniqueID
            // extensions
            encode::sequence_as(Tag::CTX_3, encode::sequence((
                // Basic Constraints
                self.basic_ca.map(|ca| {
                    encode_extension(
                        &oid::CE_BASIC_CONSTRAINTS,
                        self.is_critical(&oid::CE_BASIC_CONSTRAINTS),
                        encode::sequence(
                            if ca {
                                Some(ca.encode())
                            }
                            else {
                                None
                            }
                        )
                    )
                }),

                // Subject Key Identifier
                self.subject_key_id.as_ref().map(|id| {
                    encode_extension(
                        &oid::CE_SUBJECT_KEY_IDENTIFIER, false,
                        id.encode_ref(),
                    )
                }),

                // Authority Key Identifier
                self.authority_key_id.as_ref().map(|id| {
                    encode_extension(
                        &oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                        encode::sequence(id.encode_ref_as(Tag::CTX_0))
                    )
                }),

                // Key Usage
                self.key_usage.map(|usage| {
                    encode_extension(
                        &oid::CE_KEY_USAGE,
                        self.is_critical(&oid::CE_KEY_USAGE),
                        usage.encode()
                    )
                }),

                // CRL Distribution Points
                self.crl_uri.as_ref().map(|uri| {
                    encode_extension(
                        &oid::CE_CRL_DISTRIBUTION_POINTS, false,
                        encode::sequence( // CRLDistributionPoints
                            encode::sequence( // DistributionPoint
                                encode::sequence_as(Tag::CTX_0, // distrib.Pt.
                                    encode::sequence_as(Tag::CTX_0, // fullName
                                        uri.encode_general_name()
                                    )
                                )
                            )
                        )
                    )
                }),

                // Authority Information Access
                self.ca_issuer.as_ref().map(|uri| {
                    encode_extension(
                        &oid::PE_AUTHORITY_INFO_ACCESS, false,
                        encode::sequence(
                            encode::sequence((
                                oid::AD_CA_ISSUERS.encode(),
                                uri.encode_general_name()
                            ))
                        )
                    )
                }),

                // Subject Information Access
                (
                    self.ca_repository.is_some()
                    || self.rpki_manifest.is_some()
                    || self.signed_object.is_some()
                ).then(|| {
                    encode_extension(
                        &oid::PE_SUBJECT_INFO_ACCESS, false,
                        encode::sequence((
                            self.ca_repository.as_ref().map(|uri| {
                                encode::sequence((
                                    oid::AD_CA_REPOSITORY.encode(),
                                    uri.encode_general_name()
                                ))
                            }),
                            self.rpki_manifest.as_ref().map(|uri| {
                                encode::sequence((
                                    oid::AD_RPKI_MANIFEST.encode(),
                                    uri.encode_general_name()
                                ))
                            }),
                            self.signed_object.as_ref().map(|uri| {
                                encode::sequence((
                                    oid::AD_SIGNED_OBJECT.encode(),
                                    uri.encode_general_name()
                                ))
                            }),
                        ))
                    )
                }),

                // Certificate Policies
                (!self.certificate_policies.is_empty()).then(|| {
                    encode_extension(
                        &oid::CE_CERTIFICATE_POLICIES,
                        self.is_critical(&oid::CE_CERTIFICATE_POLICIES),
                        encode::sequence(
                            encode::iter(
                                self.certificate_policies.iter().map(|id| {
                                    encode::sequence(id.encode_ref())
                                })
                            )
                        )
                    )
                }),

                // IP Resources
                IpResources::encode_extension(
                    &self.v4_resources, &self.v6_resources,
                    self.is_critical(&oid::PE_IP_ADDR_BLOCK),
                ),

                // AS Resources
                self.as_resources.encode_extension(
                    self.is_critical(&oid::PE_AUTONOMOUS_SYS_IDS)
                ),
            )))
        ))
    }
}


//------------ Extensions ----------------------------------------------------

/// The extensions collected while parsing a certificate.
#[derive(Default)]
struct Extensions {
    basic_ca: Option<bool>,
    subject_key_id: Option<KeyIdentifier>,
    authority_key_id: Option<KeyIdentifier>,
    key_usage: Option<KeyUsage>,
    crl_uri: Option<uri::Rsync>,
    ca_issuer: Option<uri::Rsync>,
    sia: Option<Sia>,
    certificate_policies: Option<Vec<Oid>>,
    ip_resources: Option<(IpResources, IpResources)>,
    as_resources: Option<AsResources>,

    /// The identifiers of all extensions marked critical.
    critical: Vec<Oid>,
}

impl Extensions {
    /// Parses the content of a single Extension sequence.
    ///
    /// ```text
    /// Extension  ::=  SEQUENCE  {
    ///     extnID      OBJECT IDENTIFIER,
    ///     critical    BOOLEAN DEFAULT FALSE,
    ///     extnValue   OCTET STRING }
    /// ```
    fn take_one<S: decode::Source>(
        &mut self,
        cons: &mut decode::Constructed<S>
    ) -> Result<(), DecodeError<S::Error>> {
        let id = Oid::take_from(cons)?;
        let critical = cons.take_opt_bool()?.unwrap_or(false);
        let value = OctetString::take_from(cons)?;
        if critical {
            self.critical.push(id.clone());
        }
        Mode::Der.decode(value, |content| {
            if id == oid::CE_BASIC_CONSTRAINTS {
                update_once(
                    &mut self.basic_ca, content, Self::take_basic_constraints
                )
            }
            else if id == oid::CE_SUBJECT_KEY_IDENTIFIER {
                update_once(
                    &mut self.subject_key_id, content,
                    KeyIdentifier::take_from
                )
            }
            else if id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
                update_once(
                    &mut self.authority_key_id, content,
                    Self::take_authority_key_identifier
                )
            }
            else if id == oid::CE_KEY_USAGE {
                update_once(&mut self.key_usage, content, KeyUsage::take_from)
            }
            else if id == oid::CE_CRL_DISTRIBUTION_POINTS {
                update_once(
                    &mut self.crl_uri, content,
                    Self::take_crl_distribution_points
                )
            }
            else if id == oid::PE_AUTHORITY_INFO_ACCESS {
                update_once(
                    &mut self.ca_issuer, content,
                    Self::take_authority_info_access
                )
            }
            else if id == oid::PE_SUBJECT_INFO_ACCESS {
                update_once(&mut self.sia, content, Sia::take_from)
            }
            else if id == oid::CE_CERTIFICATE_POLICIES {
                update_once(
                    &mut self.certificate_policies, content,
                    Self::take_certificate_policies
                )
            }
            else if id == oid::PE_IP_ADDR_BLOCK {
                update_once(
                    &mut self.ip_resources, content,
                    IpResources::take_families_from
                )
            }
            else if id == oid::PE_AUTONOMOUS_SYS_IDS {
                update_once(
                    &mut self.as_resources, content, AsResources::take_from
                )
            }
            else if critical {
                Err(content.content_err("unexpected critical extension"))
            }
            else {
                // RFC 5280 says we can ignore non-critical extensions we
                // don’t know of. RFC 6487 agrees.
                content.skip_all()
            }
        }).map_err(DecodeError::convert)
    }

    /// Parses the Basic Constraints extension.
    ///
    /// ```text
    /// BasicConstraints        ::= SEQUENCE {
    ///     cA                      BOOLEAN DEFAULT FALSE,
    ///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL
    /// }
    /// ```
    ///
    /// The pathLenConstraint field must not be present.
    fn take_basic_constraints<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<bool, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let ca = cons.take_opt_bool()?.unwrap_or(false);
            if cons.take_opt_u64()?.is_some() {
                return Err(cons.content_err(
                    "pathLenConstraint in Basic Constraints extension"
                ))
            }
            Ok(ca)
        })
    }

    /// Parses the Authority Key Identifier extension.
    ///
    /// ```text
    /// AuthorityKeyIdentifier ::= SEQUENCE {
    ///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    ///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    ///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
    /// ```
    ///
    /// Only the keyIdentifier field may be present and it must be.
    fn take_authority_key_identifier<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<KeyIdentifier, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.take_value_if(Tag::CTX_0, KeyIdentifier::from_content)
        })
    }

    /// Parses the CRL Distribution Points extension.
    ///
    /// ```text
    /// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
    ///
    /// DistributionPoint ::= SEQUENCE {
    ///    distributionPoint       [0]     DistributionPointName OPTIONAL,
    ///    reasons                 [1]     ReasonFlags OPTIONAL,
    ///    cRLIssuer               [2]     GeneralNames OPTIONAL }
    ///
    /// DistributionPointName ::= CHOICE {
    ///    fullName                [0]     GeneralNames,
    ///    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
    /// ```
    ///
    /// There must be exactly one distribution point with only the fullName
    /// choice holding one rsync URI and possibly others.
    fn take_crl_distribution_points<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<uri::Rsync, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.take_sequence(|cons| {
                cons.take_constructed_if(Tag::CTX_0, |cons| {
                    cons.take_constructed_if(Tag::CTX_0, |cons| {
                        take_general_names_content(
                            cons, "invalid CRL Distribution Points extension"
                        )
                    })
                })
            })
        })
    }

    /// Parses the Authority Information Access extension.
    ///
    /// ```text
    /// AuthorityInfoAccessSyntax  ::=
    ///         SEQUENCE SIZE (1..MAX) OF AccessDescription
    ///
    /// AccessDescription  ::=  SEQUENCE {
    ///         accessMethod          OBJECT IDENTIFIER,
    ///         accessLocation        GeneralName  }
    /// ```
    ///
    /// There must be exactly one entry with accessMethod id-ad-caIssuers.
    fn take_authority_info_access<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<uri::Rsync, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.take_sequence(|cons| {
                oid::AD_CA_ISSUERS.skip_if(cons)?;
                take_general_names_content(
                    cons, "invalid Authority Information Access extension"
                )
            })
        })
    }

    /// Parses the Certificate Policies extension.
    ///
    /// ```text
    /// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
    ///
    /// PolicyInformation ::= SEQUENCE {
    ///     policyIdentifier   CertPolicyId,
    ///     policyQualifiers   SEQUENCE SIZE (1..MAX) OF
    ///                             PolicyQualifierInfo OPTIONAL }
    /// ```
    ///
    /// The policy qualifiers are skipped. Whether there is exactly the
    /// one policy RFC 6487 asks for is left to [`Cert::check`].
    fn take_certificate_policies<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<Vec<Oid>, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(id) = cons.take_opt_sequence(|cons| {
                let id = Oid::take_from(cons)?;
                cons.skip_all()?;
                Ok(id)
            })? {
                res.push(id)
            }
            Ok(res)
        })
    }
}


//------------ Helpers for Decoding ------------------------------------------

/// Parses the first rsync URI from the content of a GeneralNames sequence.
///
/// ```text
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
///
/// GeneralName ::= CHOICE {
///    ...
///    uniformResourceIdentifier       [6]     IA5String,
///    ... }
/// ```
///
/// URIs of other schemes are skipped. It is an error if there is no rsync
/// URI at all.
fn take_general_names_content<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
    error_msg: &'static str,
) -> Result<uri::Rsync, DecodeError<S::Error>> {
    let mut res = None;
    while let Some(()) = cons.take_opt_value_if(Tag::CTX_6, |content| {
        let uri = Ia5String::from_content(content)?;
        if res.is_none() {
            res = uri::Rsync::from_bytes(uri.into_bytes()).ok();
        }
        Ok(())
    })? {}
    res.ok_or_else(|| cons.content_err(error_msg))
}


//------------ Sia -----------------------------------------------------------

/// Internal helper type for parsing Subject Information Access.
///
/// ```text
/// SubjectInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
/// ```
///
/// CA certificates carry an id-ad-caRepository and an id-ad-rpkiManifest
/// access description, EE certificates an id-ad-signedObject one. Which
/// kind of certificate we have is only known later, so all are accepted.
#[derive(Clone, Debug, Default)]
struct Sia {
    ca_repository: Option<uri::Rsync>,
    rpki_manifest: Option<uri::Rsync>,
    signed_object: Option<uri::Rsync>,
}

impl Sia {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut sia = Sia::default();
        cons.take_sequence(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let oid = Oid::take_from(cons)?;
                let target = if oid == oid::AD_CA_REPOSITORY {
                    &mut sia.ca_repository
                }
                else if oid == oid::AD_RPKI_MANIFEST {
                    &mut sia.rpki_manifest
                }
                else if oid == oid::AD_SIGNED_OBJECT {
                    &mut sia.signed_object
                }
                else {
                    return cons.skip_all()
                };
                let uri = cons.take_value(|tag, content| {
                    if tag == Tag::CTX_6 {
                        let uri = Ia5String::from_content(content)?;
                        Ok(uri::Rsync::from_bytes(uri.into_bytes()).ok())
                    }
                    else {
                        content.skip_all()?;
                        Ok(None)
                    }
                })?;
                if target.is_none() {
                    *target = uri
                }
                Ok(())
            })? { }
            Ok(())
        })?;
        Ok(sia)
    }
}


//------------ KeyUsage ------------------------------------------------------

/// The bits of the Key Usage extension.
///
/// ```text
/// KeyUsage ::= BIT STRING {
///      digitalSignature        (0),
///      nonRepudiation          (1),
///      keyEncipherment         (2),
///      dataEncipherment        (3),
///      keyAgreement            (4),
///      keyCertSign             (5),
///      cRLSign                 (6),
///      encipherOnly            (7),
///      decipherOnly            (8) }
/// ```
///
/// CA certificates need keyCertSign and cRLSign, EE certificates need
/// digitalSignature. Which bits are acceptable is decided by the chain
/// validator, so all bits are kept.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyUsage(u16);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: KeyUsage = KeyUsage(1 << 0);
    pub const KEY_CERT_SIGN: KeyUsage = KeyUsage(1 << 5);
    pub const CRL_SIGN: KeyUsage = KeyUsage(1 << 6);

    const BITS: usize = 9;

    /// Returns the key usage of a CA certificate.
    pub fn ca() -> Self {
        KeyUsage(Self::KEY_CERT_SIGN.0 | Self::CRL_SIGN.0)
    }

    /// Returns the key usage of an EE certificate.
    pub fn ee() -> Self {
        Self::DIGITAL_SIGNATURE
    }

    /// Returns whether all bits set in `other` are set in `self`.
    pub fn contains(self, other: KeyUsage) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn digital_signature(self) -> bool {
        self.contains(Self::DIGITAL_SIGNATURE)
    }

    pub fn key_cert_sign(self) -> bool {
        self.contains(Self::KEY_CERT_SIGN)
    }

    pub fn crl_sign(self) -> bool {
        self.contains(Self::CRL_SIGN)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let bits = BitString::take_from(cons)?;
        let mut res = 0;
        for i in 0..Self::BITS {
            if bits.bit(i) {
                res |= 1 << i
            }
        }
        Ok(KeyUsage(res))
    }

    /// Returns the number of significant bits.
    fn bit_len(self) -> usize {
        16 - self.0.leading_zeros() as usize
    }
}

impl ops::BitOr for KeyUsage {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        KeyUsage(self.0 | other.0)
    }
}

impl PrimitiveContent for KeyUsage {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        (self.bit_len() + 7) / 8 + 1
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        // DER wants trailing zero bits removed from named bit lists.
        let len = self.bit_len();
        let octets = (len + 7) / 8;
        let mut buf = [0u8; 2];
        for i in 0..len {
            if self.0 & (1 << i) != 0 {
                buf[i / 8] |= 0x80 >> (i % 8)
            }
        }
        target.write_all(&[(octets * 8 - len) as u8])?;
        target.write_all(&buf[..octets])
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_usage_encoding() {
        assert_eq!(
            KeyUsage::ca().encode().to_captured(Mode::Der).as_slice(),
            b"\x03\x02\x01\x06"
        );
        assert_eq!(
            KeyUsage::ee().encode().to_captured(Mode::Der).as_slice(),
            b"\x03\x02\x07\x80"
        );
        assert_eq!(
            KeyUsage::default().encode().to_captured(Mode::Der).as_slice(),
            b"\x03\x01\x00"
        );
        let captured = KeyUsage::ca().encode().to_captured(Mode::Der);
        let usage = captured.decode(KeyUsage::take_from).unwrap();
        assert!(usage.key_cert_sign());
        assert!(usage.crl_sign());
        assert!(!usage.digital_signature());
    }
}

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use std::str::FromStr;
    use chrono::TimeDelta;
    use crate::crypto::{PublicKeyFormat, Signature};
    use crate::crypto::softsigner::OpenSslSigner;
    use crate::repository::test_util::{rsync, validity, TestCa};
    use super::*;
    use crate::repository::resources::AsBlocks;

    #[test]
    fn build_and_decode_ca_cert() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let uri = uri::Rsync::from_str("rsync://example.com/repo/").unwrap();

        let mut tbs = TbsCert::new(
            12u64.into(),
            Name::from_pub_key(&pubkey),
            Validity::from_duration(TimeDelta::days(365)),
            None,
            pubkey.clone(),
            KeyUsage::ca(),
        );
        tbs.set_basic_ca(Some(true));
        tbs.set_ca_repository(Some(uri.clone()));
        tbs.set_rpki_manifest(Some(uri.join(b"ta.mft").unwrap()));
        tbs.set_resources(
            &ResourceSet::from_str("AS64496, 10.0.0.0/8, 2001:db8::/32")
                .unwrap()
        );
        let cert = tbs.into_cert(&signer, &key).unwrap();

        let decoded = Cert::decode(cert.to_bytes()).unwrap();
        assert_eq!(decoded, cert);
        assert!(decoded.is_ca());
        assert!(decoded.is_self_signed());
        assert_eq!(decoded.serial_number(), Serial::from(12u64));
        assert_eq!(decoded.key_usage(), Some(KeyUsage::ca()));
        assert_eq!(
            decoded.subject_key_identifier(), Some(pubkey.key_identifier())
        );
        assert_eq!(decoded.ca_repository(), Some(&uri));
        assert!(decoded.crl_uri().is_none());
        assert_eq!(
            decoded.resources().to_string(),
            "AS64496, 10.0.0.0/8, 2001:db8::/32"
        );
        assert!(!decoded.is_inherited());
        decoded.verify_signature(&pubkey).unwrap();
    }

    #[test]
    fn inherited_resources() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let mut tbs = TbsCert::new(
            Serial::from(1u64),
            Name::from_common_name("issuer"),
            Validity::from_duration(TimeDelta::days(1)),
            Some(Name::from_common_name("subject")),
            pubkey,
            KeyUsage::ee(),
        );
        tbs.set_inherit_resources();
        tbs.set_v6_resources(IpResources::blocks(
            ResourceSet::from_str("2001:db8::/48").unwrap().v6().clone()
        ));
        let cert = Cert::decode(
            tbs.into_cert(&signer, &key).unwrap().to_bytes()
        ).unwrap();
        assert!(cert.is_inherited());
        assert!(!cert.is_fully_inherited());
        assert!(!cert.is_self_signed());
        assert!(!cert.is_ca());

        let parent = ResourceSet::from_str(
            "AS1, 10.0.0.0/8, 2001:db8::/32"
        ).unwrap();
        let effective = cert.effective_resources(&parent);
        assert_eq!(effective.to_string(), "AS1, 10.0.0.0/8, 2001:db8::/48");
        assert_eq!(cert.resources().to_string(), "2001:db8::/48");
        assert_eq!(cert.as_resources().to_explicit(), None::<AsBlocks>);
    }

    /// Returns the data of a CA certificate issued by a new trust anchor.
    fn child_ca_tbs() -> (TestCa, TbsCert) {
        let ta = TestCa::root("AS64496, 10.0.0.0/8");
        let key = ta.signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = ta.signer.get_key_info(&key).unwrap();
        let mut tbs = ta.child_tbs(2, pubkey, KeyUsage::ca());
        tbs.set_basic_ca(Some(true));
        tbs.set_ca_repository(Some(rsync("rsync://example.com/ta/a/")));
        tbs.set_rpki_manifest(
            Some(rsync("rsync://example.com/ta/a/ca.mft"))
        );
        tbs.set_inherit_resources();
        (ta, tbs)
    }

    /// Decodes `cert` and returns the keys of its failed profile checks.
    fn profile_failures(cert: &Cert) -> Vec<&'static str> {
        let cert = Cert::decode(cert.to_bytes()).unwrap();
        let mut result = ValidationResult::with_location("a.cer");
        let valid = cert.check(&mut result);
        let keys: Vec<_> = result.failures_for_current_location().iter()
            .map(|check| check.key()).collect();
        assert_eq!(valid, keys.is_empty());
        keys
    }

    fn policy_v2() -> Oid {
        Oid(Bytes::from_static(b"\x2b\x06\x01\x05\x05\x07\x0e\x03"))
    }

    /// A public key with a 1024 bit modulus.
    fn small_key() -> PublicKey {
        let mut modulus = vec![0u8; 129];
        modulus[1] = 0x80;
        let rsa_key = encode::sequence((
            OctetString::encode_slice_as(modulus.as_slice(), Tag::INTEGER),
            65537u32.encode(),
        )).to_captured(Mode::Der);
        let bits = BitString::new(0, rsa_key.into_bytes());
        PublicKey::decode(encode::sequence((
            PublicKeyFormat::Rsa.encode(),
            bits.encode_ref(),
        )).to_captured(Mode::Der).into_bytes()).unwrap()
    }

    #[test]
    fn profile_of_built_certs() {
        let (ta, tbs) = child_ca_tbs();
        for cert in [ta.cert.clone(), ta.sign(tbs)] {
            let mut result = ValidationResult::with_location("a.cer");
            assert!(cert.check(&mut result), "{}", result);
            assert!(result.has_no_failures_or_warnings());
            assert!(
                result.result(
                    result.current_location(), check::POLICY_ID_VERSION
                ).is_some()
            );
        }
    }

    #[test]
    fn signature_algorithm_mismatch() {
        let (ta, tbs) = child_ca_tbs();
        let mut cert = ta.sign(tbs);
        let algorithm = RpkiSignatureAlgorithm::from_cms_oid(
            &oid::SHA256_WITH_RSA_ENCRYPTION, false
        ).unwrap();
        cert.signed_data = SignedData::new(
            cert.signed_data.data().clone(),
            Signature::new(
                algorithm, cert.signed_data.signature().value().clone()
            )
        );
        assert_eq!(
            profile_failures(&cert), [check::CERTIFICATE_SIGNATURE_ALGORITHM]
        );
    }

    #[test]
    fn non_rpki_subject_name() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.subject = Name::from_common_name("ca_1");
        let cert = ta.sign(tbs);
        let mut result = ValidationResult::with_location("a.cer");
        assert!(cert.check(&mut result));
        let warnings = result.all_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key(), check::CERT_SUBJECT_CORRECT);
        assert_eq!(warnings[0].params(), ["CN=ca_1"]);
    }

    #[test]
    fn small_public_key() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.subject_public_key_info = small_key();
        let cert = ta.sign(tbs);
        let mut result = ValidationResult::with_location("a.cer");
        assert!(cert.check(&mut result));
        let warnings = result.all_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key(), check::PUBLIC_KEY_CERT_SIZE);
        assert_eq!(warnings[0].params(), ["1024"]);
    }

    #[test]
    fn no_critical_extensions() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.critical_extensions.clear();
        assert_eq!(
            profile_failures(&ta.sign(tbs)),
            [check::CRITICAL_EXT_PRESENT, check::RESOURCE_EXT_PRESENT]
        );
    }

    #[test]
    fn policy_not_critical() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.critical_extensions.retain(|id| {
            *id != oid::CE_CERTIFICATE_POLICIES
        });
        assert_eq!(
            profile_failures(&ta.sign(tbs)), [check::POLICY_EXT_CRITICAL]
        );
    }

    #[test]
    fn missing_policy() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.certificate_policies.clear();
        assert_eq!(
            profile_failures(&ta.sign(tbs)),
            [check::POLICY_EXT_CRITICAL, check::POLICY_EXT_VALUE]
        );
    }

    #[test]
    fn two_policies() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.certificate_policies.push(policy_v2());
        assert_eq!(
            profile_failures(&ta.sign(tbs)), [check::SINGLE_CERT_POLICY]
        );
    }

    #[test]
    fn wrong_policy() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.certificate_policies = vec![policy_v2()];
        let cert = Cert::decode(ta.sign(tbs).to_bytes()).unwrap();
        let mut result = ValidationResult::with_location("a.cer");
        assert!(!cert.check(&mut result));
        let failures = result.failures_for_current_location();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key(), check::POLICY_ID_VERSION);
        assert_eq!(failures[0].params(), ["1.3.6.1.5.5.7.14.3"]);
    }

    #[test]
    fn resource_extensions_not_critical() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.critical_extensions.retain(|id| {
            *id != oid::PE_IP_ADDR_BLOCK && *id != oid::PE_AUTONOMOUS_SYS_IDS
        });
        assert_eq!(
            profile_failures(&ta.sign(tbs)), [check::RESOURCE_EXT_PRESENT]
        );
    }

    #[test]
    fn missing_resource_extensions() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.set_v4_resources(IpResources::missing());
        tbs.set_v6_resources(IpResources::missing());
        tbs.set_as_resources(AsResources::missing());
        assert_eq!(
            profile_failures(&ta.sign(tbs)), [check::RESOURCE_EXT_PRESENT]
        );
    }

    #[test]
    fn child_without_crldp_and_aia() {
        let (ta, mut tbs) = child_ca_tbs();
        tbs.set_crl_uri(None);
        tbs.set_ca_issuer(None);
        assert_eq!(
            profile_failures(&ta.sign(tbs)),
            [check::CRLDP_PRESENT, check::AIA_PRESENT]
        );
    }

    #[test]
    fn root_with_crldp_and_aia() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::Rsa).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();
        let mut tbs = TbsCert::new(
            Serial::from(1u64), Name::from_pub_key(&pubkey), validity(),
            None, pubkey, KeyUsage::ca(),
        );
        tbs.set_basic_ca(Some(true));
        tbs.set_resources(&ResourceSet::from_str("10.0.0.0/8").unwrap());
        tbs.set_crl_uri(Some(rsync("rsync://example.com/ta/ta.crl")));
        tbs.set_ca_issuer(Some(rsync("rsync://example.com/ta.cer")));
        let cert = tbs.into_cert(&signer, &key).unwrap();
        assert!(cert.is_self_signed());
        assert_eq!(
            profile_failures(&cert),
            [check::CRLDP_OMITTED, check::AIA_OMITTED]
        );
    }
}
