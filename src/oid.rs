//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.

use bcder::{ConstOid, Oid};


//------------ Algorithms ----------------------------------------------------

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha256`
///
/// Identifies the SHA-256 one-way hash function.
pub const SHA256: ConstOid
    = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);


//------------ CMS -----------------------------------------------------------

/// [RFC 5652](https://tools.ietf.org/html/rfc5652) `id-signedData`
pub const SIGNED_DATA: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 2]);

/// [RFC 5652](https://tools.ietf.org/html/rfc5652) `id-contentType`
pub const CONTENT_TYPE: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 3]);

/// [RFC 5652](https://tools.ietf.org/html/rfc5652) `id-messageDigest`
pub const MESSAGE_DIGEST: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 4]);

/// [RFC 5652](https://tools.ietf.org/html/rfc5652) `id-signingTime`
pub const SIGNING_TIME: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 5]);

/// [RFC 6019](https://tools.ietf.org/html/rfc6019) `id-aa-binarySigningTime`
pub const AA_BINARY_SIGNING_TIME: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 46]);

/// [RFC 6486](https://tools.ietf.org/html/rfc6486) `id-ct-rpkiManifest`
pub const CT_RPKI_MANIFEST: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 26]);

/// [RFC 6482](https://tools.ietf.org/html/rfc6482) `id-ct-routeOriginAuthz`
pub const ROUTE_ORIGIN_AUTHZ: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 24]);


//------------ Access Descriptions -------------------------------------------

pub const AD_CA_ISSUERS: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 2]);
pub const AD_CA_REPOSITORY: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 5]);
pub const AD_RPKI_MANIFEST: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 10]);
pub const AD_SIGNED_OBJECT: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 11]);


//------------ Attribute Types -----------------------------------------------

pub const AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]); // 2 5 4 3
pub const AT_SERIAL_NUMBER: ConstOid = Oid(&[85, 4, 5]); // 2 5 4 5


//------------ Certificate Extensions ----------------------------------------

pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_BASIC_CONSTRAINTS: ConstOid = Oid(&[85, 29, 19]);
pub const CE_CERTIFICATE_POLICIES: ConstOid = Oid(&[85, 29, 32]);
pub const CE_CRL_DISTRIBUTION_POINTS: ConstOid = Oid(&[85, 29, 31]);
pub const CE_CRL_NUMBER: ConstOid = Oid(&[85, 29, 20]);
pub const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);

/// [RFC 6484](https://tools.ietf.org/html/rfc6484) `id-cp-ipAddr-asNumber`
pub const CP_IPADDR_ASNUMBER: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 14, 2]);

pub const PE_AUTHORITY_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 1]);
pub const PE_IP_ADDR_BLOCK: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 1, 7]);
pub const PE_AUTONOMOUS_SYS_IDS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 8]);
pub const PE_SUBJECT_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 11]);

