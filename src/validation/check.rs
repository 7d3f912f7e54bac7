//! The keys of validation checks.
//!
//! Keys are stable identifiers meant for machine consumption. Once
//! published, a key must not change. The comment on each key lists the
//! parameters recorded with it, if any.

//------------ General -------------------------------------------------------

/// The CRL for an object could not be found. Param: the CRL URI.
pub const CRL_VALID: &str = "objects.crl.valid";

/// An object could not be recognized as any known type.
pub const KNOWN_OBJECT_TYPE: &str = "known.object.type";


//------------ Certificate Chains --------------------------------------------

/// The chain has at most the configured number of certificates.
/// Param: the maximum length.
pub const CERT_CHAIN_LENGTH: &str = "cert.chain.length";

/// The issuer of a certificate in the chain was found.
pub const CERT_CHAIN_COMPLETE: &str = "cert.chain.complete";

/// The root of the chain is one of the trust anchors.
pub const ROOT_IS_TA: &str = "cert.root.is.ta";

/// A certificate could be parsed.
pub const CERTIFICATE_PARSED: &str = "cert.parsed";

/// A CRL could be parsed.
pub const CRL_PARSED: &str = "crl.parsed";


//------------ Certificate Profile -------------------------------------------

/// The signature algorithm of the certificate matches that of its
/// signature.
pub const CERTIFICATE_SIGNATURE_ALGORITHM: &str = "cert.signature.algorithm";

/// Param: the issuer name.
pub const CERT_ISSUER_CORRECT: &str = "cert.issuer.correct";

/// Param: the subject name.
pub const CERT_SUBJECT_CORRECT: &str = "cert.subject.correct";

/// Param: the size of the key in bits, empty if it cannot be determined.
pub const PUBLIC_KEY_CERT_SIZE: &str = "cert.public.key.size";

pub const CRITICAL_EXT_PRESENT: &str = "cert.critical.exts.present";
pub const POLICY_EXT_CRITICAL: &str = "cert.policy.ext.critical";
pub const POLICY_EXT_VALUE: &str = "cert.policy.ext.value";
pub const SINGLE_CERT_POLICY: &str = "cert.single.cert.policy";

/// Param: the policy identifier.
pub const POLICY_ID_VERSION: &str = "cert.policy.id.version";

/// An IP or AS resource extension is present and critical.
pub const RESOURCE_EXT_PRESENT: &str = "cert.resource.ext.present";

/// Certificates other than trust anchors name the CRL of their issuer.
pub const CRLDP_PRESENT: &str = "cert.crldp.present";
pub const CRLDP_OMITTED: &str = "cert.crldp.omitted";

/// Certificates other than trust anchors name their issuer certificate.
pub const AIA_PRESENT: &str = "cert.aia.present";
pub const AIA_OMITTED: &str = "cert.aia.omitted";


//------------ Parent-Child Validation ---------------------------------------

pub const ISSUER_IS_CA: &str = "cert.issuer.is.ca";
pub const SIGNATURE_VALID: &str = "cert.signature";

/// Param: the not-before time.
pub const NOT_VALID_BEFORE: &str = "cert.not.valid.before";

/// Param: the not-after time.
pub const NOT_VALID_AFTER: &str = "cert.not.valid.after";

/// A CRL is required for everything but trust anchors.
pub const CRL_REQUIRED: &str = "crl.required";
pub const CRL_SIGNATURE_VALID: &str = "cert.crl.signature";

/// Param: the serial number of the certificate.
pub const CERT_NOT_REVOKED: &str = "cert.not.revoked";

pub const PREV_SUBJECT_EQ_ISSUER: &str = "cert.issuer.eq.prev.subject";
pub const KEY_USAGE_EXT_PRESENT: &str = "cert.key.usage.extension.present";
pub const KEY_CERT_SIGN: &str = "cert.key.cert.sign";
pub const CRL_SIGN: &str = "cert.crl.sign";
pub const DIG_SIGN: &str = "cert.dig.sign";
pub const SKI_PRESENT: &str = "cert.ski.present";
pub const AKI_PRESENT: &str = "cert.aki.present";
pub const PREV_SKI_EQ_AKI: &str = "cert.aki.eq.prev.ski";

/// Trust anchors must list their resources explicitly.
pub const ROOT_INHERITS_RESOURCES: &str = "cert.root.resource.uses.inherit";

/// Param: the resources not covered by the issuer.
pub const RESOURCE_RANGE: &str = "cert.resource.range.is.valid";


//------------ CRLs ----------------------------------------------------------

/// Param: the next update time.
pub const CRL_NEXT_UPDATE_BEFORE_NOW: &str = "crl.next.update.before.now";


//------------ CMS -----------------------------------------------------------

pub const CMS_DATA_PARSING: &str = "cms.signed.data.parsing";
pub const CMS_SIGNED_DATA_VERSION: &str = "cms.signed.data.version";
pub const CMS_SIGNED_DATA_DIGEST_ALGORITHM: &str =
    "cms.signed.data.digest.algorithm";

/// Param: the content type found.
pub const CMS_CONTENT_TYPE: &str = "cms.content.type";
pub const ONLY_ONE_EE_CERT_ALLOWED: &str = "cms.only.one.ee.cert";
pub const CERT_IS_EE_CERT: &str = "cms.cert.is.ee.cert";
pub const CERT_HAS_SKI: &str = "cms.cert.has.ski";
pub const CERT_HAS_RESOURCES: &str = "cms.cert.has.resources";
pub const ONLY_ONE_CRL_ALLOWED: &str = "cms.only.one.crl";

/// An embedded CRL could be decoded.
pub const CRL_IS_X509: &str = "cms.crl.is.x509";
pub const CMS_ONLY_ONE_SIGNER: &str = "cms.signature.has.one.signer";
pub const CMS_SIGNER_INFO_VERSION: &str = "cms.signer.info.version";
pub const CMS_SIGNER_INFO_DIGEST_ALGORITHM: &str =
    "cms.signer.info.digest.algorithm";
pub const CMS_SIGNER_INFO_SKI: &str = "cms.signer.info.ski";
pub const CMS_SIGNER_ID_MATCH_CERT: &str = "cms.signer.id.match.cert";
pub const ENCRYPTION_ALGORITHM: &str = "cms.encryption.algorithm";
pub const SIGNED_ATTRS_PRESENT: &str = "cms.signed.attrs.present";

/// Param: the object identifiers of the unexpected attributes.
pub const SIGNED_ATTRS_CORRECT: &str = "cms.signed.attrs.correct";
pub const CONTENT_TYPE_ATTR_PRESENT: &str = "cms.content.type.attr.present";
pub const CONTENT_TYPE_VALUE: &str = "cms.content.type.value";
pub const MSG_DIGEST_ATTR_PRESENT: &str = "cms.msg.digest.attr.present";

/// The message digest attribute matches the digest of the content.
pub const MSG_DIGEST_VALUE: &str = "cms.msg.digest.value";
pub const SIGNING_TIME_ATTR_PRESENT: &str = "cms.signing.time.attr.present";
pub const ONLY_ONE_SIGNING_TIME_ATTR: &str = "cms.only.one.signing.time.attr";
pub const SIGNATURE_VERIFICATION: &str = "cms.signature";
pub const UNSIGNED_ATTRS_OMITTED: &str = "cms.unsigned.attrs.omitted";


//------------ ROAs ----------------------------------------------------------

pub const ROA_CONTENT_TYPE: &str = "roa.content.type";
pub const ROA_CONTENT_STRUCTURE: &str = "roa.content.structure";
pub const ROA_ATTESTATION_VERSION: &str = "roa.attestation.version";

/// At least one prefix could be parsed.
pub const ROA_PREFIX_LIST_NOT_EMPTY: &str = "roa.prefix.list.not.empty";

/// Param: the address family octets in hex.
pub const ROA_ADDR_FAMILY_VALID: &str = "roa.addr.family.valid";

/// Param: the number of address entries that could not be decoded.
pub const ROA_ADDR_FAMILY_CONTAINS_PREFIX: &str =
    "roa.addr.family.contains.prefix";

/// Param: the prefix and maximum length.
pub const ROA_PREFIX_LENGTH: &str = "roa.prefix.length";

/// Param: the resources not covered by the EE certificate.
pub const ROA_RESOURCES: &str = "roa.resources";


//------------ Manifests -----------------------------------------------------

pub const MANIFEST_CONTENT_TYPE: &str = "mf.content.type";
pub const MANIFEST_CONTENT_STRUCTURE: &str = "mf.content.structure";
pub const MANIFEST_FILE_HASH_ALGORITHM: &str = "mf.file.hash.algorithm";

/// The file list could be decoded.
pub const MANIFEST_DECODE_FILELIST: &str = "mf.decode.filelist";
pub const MANIFEST_RESOURCE_INHERIT: &str = "mf.resource.inherit";

/// Param: the next update time.
pub const MANIFEST_PAST_NEXT_UPDATE_TIME: &str = "mf.past.next.update";

/// Params: this update, next update, not before, not after.
pub const MANIFEST_VALIDITY_TIMES_MATCH: &str = "mf.validity.times.match";
