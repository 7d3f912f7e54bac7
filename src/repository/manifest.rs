//! RPKI Manifests.
//!
//! Manifests list all the files that are currently published by an RPKI CA
//! together with a hash over their content. They are defined in
//! [RFC 9286].
//!
//! This module defines the type [`Manifest`] that represents a checked
//! manifest, the type [`ManifestContent`] for its content, and
//! [`ManifestBuilder`] for creating new manifests.
//!
//! The content of a manifest signed object is defined as follows:
//!
//! ```txt
//! Manifest            ::= SEQUENCE {
//!     version             [0] INTEGER DEFAULT 0,
//!     manifestNumber      INTEGER (0..MAX),
//!     thisUpdate          GeneralizedTime,
//!     nextUpdate          GeneralizedTime,
//!     fileHashAlg         OBJECT IDENTIFIER,
//!     fileList            SEQUENCE SIZE (0..MAX) OF FileAndHash
//! }
//!
//! FileAndHash         ::= SEQUENCE {
//!     file                IA5String,
//!     hash                BIT STRING
//! }
//! ```
//!
//! The _version_ must be 0 and is never encoded.
//!
//! [RFC 9286]: https://tools.ietf.org/html/rfc9286

use std::ops;
use std::collections::BTreeMap;
use bcder::{decode, encode};
use bcder::{BitString, Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::crypto::{DigestAlgorithm, Signer};
use crate::validation::check;
use crate::validation::result::ValidationResult;
use super::cert::Cert;
use super::error::BuildError;
use super::sigobj::{SignedObject, SignedObjectBuilder};
use super::x509::{Serial, Time};


//------------ Manifest ------------------------------------------------------

/// A checked RPKI manifest.
#[derive(Clone, Debug)]
pub struct Manifest {
    signed: SignedObject,
    content: ManifestContent,
}

impl Manifest {
    /// Parses and checks a manifest.
    ///
    /// All checks are recorded for the current location of `result`. The
    /// manifest is only returned if none of them failed.
    pub fn parse(data: Bytes, result: &mut ValidationResult) -> Option<Self> {
        let signed = SignedObject::parse(data, result)?;
        Self::from_signed_object(signed, result)
    }

    /// Checks the manifest specific parts of a signed object.
    pub fn from_signed_object(
        signed: SignedObject, result: &mut ValidationResult
    ) -> Option<Self> {
        if !result.reject_if_false(
            *signed.content_type() == oid::CT_RPKI_MANIFEST,
            check::MANIFEST_CONTENT_TYPE,
            &[&signed.content_type().to_string()]
        ) {
            return None
        }
        let content = ManifestContent::check(&signed, result);
        let inherited = result.reject_if_false(
            signed.cert().is_fully_inherited(),
            check::MANIFEST_RESOURCE_INHERIT, &[]
        );
        let content = content?;
        if !inherited {
            return None
        }
        Some(Manifest { signed, content })
    }

    pub fn signed_object(&self) -> &SignedObject {
        &self.signed
    }

    /// Returns the EE certificate of the manifest.
    pub fn cert(&self) -> &Cert {
        self.signed.cert()
    }

    pub fn content(&self) -> &ManifestContent {
        &self.content
    }

    pub fn to_bytes(&self) -> Bytes {
        self.signed.to_bytes()
    }
}


//--- Deref and AsRef

impl ops::Deref for Manifest {
    type Target = ManifestContent;

    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

impl AsRef<ManifestContent> for Manifest {
    fn as_ref(&self) -> &ManifestContent {
        &self.content
    }
}


//------------ ManifestContent -----------------------------------------------

/// The content of an RPKI manifest.
///
/// A manifest consists chiefly of a list of files and their hash values.
/// The files are kept ordered by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManifestContent {
    /// The number of this manifest.
    ///
    /// These numbers are similar to the serial numbers of certificates.
    manifest_number: Serial,

    /// The time this iteration of the manifest was created.
    this_update: Time,

    /// The time the next iteration of the manifest is likely to be created.
    next_update: Time,

    /// The algorithm used for the file hashes.
    file_hash_alg: DigestAlgorithm,

    /// The file names and their hashes.
    files: BTreeMap<String, Bytes>,
}

impl ManifestContent {
    pub fn manifest_number(&self) -> Serial {
        self.manifest_number
    }

    pub fn this_update(&self) -> Time {
        self.this_update
    }

    pub fn next_update(&self) -> Time {
        self.next_update
    }

    pub fn file_hash_alg(&self) -> DigestAlgorithm {
        self.file_hash_alg
    }

    /// Returns whether the next update time has passed at `now`.
    pub fn is_stale(&self, now: Time) -> bool {
        self.next_update < now
    }

    /// Returns an iterator over the file names and their hashes.
    pub fn files(&self) -> impl Iterator<Item = (&str, &Bytes)> + '_ {
        self.files.iter().map(|(name, hash)| (name.as_str(), hash))
    }

    /// Returns an iterator over the file names in order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Returns the hash for the given file if it is listed.
    pub fn file_hash(&self, name: &str) -> Option<&Bytes> {
        self.files.get(name)
    }

    /// Returns the hash of `content` using the manifest’s algorithm.
    pub fn hash_contents(&self, content: &[u8]) -> Bytes {
        Bytes::copy_from_slice(self.file_hash_alg.digest(content).as_ref())
    }

    /// Checks that `content` is what the manifest lists for `name`.
    ///
    /// # Panics
    ///
    /// The method panics if `name` is not listed on the manifest. Use
    /// [`file_hash`][Self::file_hash] or
    /// [`contains_file`][Self::contains_file] if you are not sure.
    pub fn verify_file_contents(&self, name: &str, content: &[u8]) -> bool {
        match self.files.get(name) {
            Some(hash) => {
                self.file_hash_alg.digest(content).as_ref() == hash.as_ref()
            }
            None => panic!("file {} is not on the manifest", name),
        }
    }

    /// Checks that the given files are exactly those on the manifest.
    ///
    /// `files` maps file names to their content. All names on the
    /// manifest have to be present with matching content and there must
    /// not be any other names.
    pub fn matches_files(&self, files: &BTreeMap<String, Bytes>) -> bool {
        self.files.len() == files.len()
            && files.iter().all(|(name, content)| {
                self.contains_file(name)
                    && self.verify_file_contents(name, content)
            })
    }
}

/// # Decoding and Checking
///
impl ManifestContent {
    /// Decodes and checks the content of a signed object.
    fn check(
        signed: &SignedObject, result: &mut ValidationResult
    ) -> Option<Self> {
        let raw = match signed.decode_content(RawManifestContent::take_from) {
            Ok(raw) => {
                result.pass(check::MANIFEST_CONTENT_STRUCTURE, &[]);
                raw
            }
            Err(err) => {
                debug!(
                    "{}: failed to decode manifest content: {}",
                    result.current_location(), err
                );
                result.reject(check::MANIFEST_CONTENT_STRUCTURE, &[]);
                return None
            }
        };
        let file_hash_alg = DigestAlgorithm::from_oid(&raw.file_hash_alg);
        if !result.reject_if_none(
            file_hash_alg, check::MANIFEST_FILE_HASH_ALGORITHM,
            &[&raw.file_hash_alg.to_string()]
        ) {
            return None
        }
        let file_hash_alg = file_hash_alg?;
        let files = match raw.file_list.decode(|cons| {
            take_file_list(cons, file_hash_alg)
        }) {
            Ok(files) => {
                result.pass(check::MANIFEST_DECODE_FILELIST, &[]);
                files
            }
            Err(err) => {
                debug!(
                    "{}: failed to decode manifest file list: {}",
                    result.current_location(), err
                );
                result.reject(check::MANIFEST_DECODE_FILELIST, &[]);
                return None
            }
        };
        Some(ManifestContent {
            manifest_number: raw.manifest_number,
            this_update: raw.this_update,
            next_update: raw.next_update,
            file_hash_alg,
            files,
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.manifest_number.encode(),
            self.this_update.encode_generalized_time(),
            self.next_update.encode_generalized_time(),
            self.file_hash_alg.encode_oid(),
            encode::sequence(
                encode::iter(self.files.iter().map(|(name, hash)| {
                    encode::sequence((
                        OctetString::encode_slice_as(
                            name.as_bytes(), Tag::IA5_STRING
                        ),
                        BitString::encode_slice(hash.as_ref(), 0),
                    ))
                }))
            )
        ))
    }

    pub fn to_bytes(&self) -> Bytes {
        self.encode_ref().to_captured(Mode::Der).into_bytes()
    }
}


//------------ RawManifestContent --------------------------------------------

/// The manifest content with the file list still encoded.
///
/// The file list is decoded separately so that problems with it can be
/// reported on their own.
struct RawManifestContent {
    manifest_number: Serial,
    this_update: Time,
    next_update: Time,
    file_hash_alg: Oid<Bytes>,
    file_list: Captured,
}

impl RawManifestContent {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let version = cons.take_opt_constructed_if(
                Tag::CTX_0, |cons| cons.take_u8()
            )?;
            if version.unwrap_or(0) != 0 {
                return Err(cons.content_err("invalid manifest version"))
            }
            let manifest_number = Serial::take_from(cons)?;
            let this_update = Time::take_generalized_time(cons)?;
            let next_update = Time::take_generalized_time(cons)?;
            if this_update > next_update {
                return Err(cons.content_err(
                    "thisUpdate is after nextUpdate"
                ))
            }
            let file_hash_alg = Oid::take_from(cons)?;
            let file_list = cons.take_sequence(|cons| cons.capture_all())?;
            Ok(RawManifestContent {
                manifest_number, this_update, next_update, file_hash_alg,
                file_list,
            })
        })
    }
}

/// Takes the content of the file list.
///
/// Any malformed entry fails the whole list.
fn take_file_list<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
    alg: DigestAlgorithm,
) -> Result<BTreeMap<String, Bytes>, DecodeError<S::Error>> {
    let mut res = BTreeMap::new();
    while let Some((name, hash)) = cons.take_opt_sequence(|cons| {
        let name = cons.take_value_if(
            Tag::IA5_STRING, OctetString::from_content
        )?;
        let hash = BitString::take_from(cons)?;
        Ok((name.into_bytes(), hash))
    })? {
        let name = match String::from_utf8(name.to_vec()) {
            Ok(name) if !name.is_empty() && name.is_ascii() => name,
            _ => return Err(cons.content_err("invalid file name"))
        };
        if hash.unused() != 0 || hash.octet_len() != alg.digest_len() {
            return Err(cons.content_err("invalid file hash"))
        }
        if res.insert(name, hash.octet_bytes()).is_some() {
            return Err(cons.content_err("duplicate file name"))
        }
    }
    Ok(res)
}


//------------ ManifestBuilder -----------------------------------------------

/// The values needed for creating a new manifest.
///
/// The number and both times are required. Files can be added through
/// [`add_file`][Self::add_file] or by adding their hash to `files`
/// directly.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
    pub manifest_number: Option<Serial>,
    pub this_update: Option<Time>,
    pub next_update: Option<Time>,

    /// The file names and the SHA-256 hashes of their content.
    pub files: BTreeMap<String, Bytes>,
}

impl ManifestBuilder {
    pub fn new(
        manifest_number: Serial, this_update: Time, next_update: Time
    ) -> Self {
        ManifestBuilder {
            manifest_number: Some(manifest_number),
            this_update: Some(this_update),
            next_update: Some(next_update),
            files: BTreeMap::new(),
        }
    }

    /// Adds a file with the given content.
    pub fn add_file(&mut self, name: impl Into<String>, content: &[u8]) {
        self.files.insert(
            name.into(),
            Bytes::copy_from_slice(
                DigestAlgorithm::default().digest(content).as_ref()
            )
        );
    }

    /// Creates the manifest.
    ///
    /// The EE certificate always inherits its resources, whatever
    /// `object` says.
    pub fn finalize<S: Signer>(
        self,
        mut object: SignedObjectBuilder,
        signer: &S,
        issuer_key: &S::KeyId,
    ) -> Result<Manifest, BuildError<S::Error>> {
        let content = ManifestContent {
            manifest_number: self.manifest_number.ok_or(
                BuildError::MissingField("manifest_number")
            )?,
            this_update: self.this_update.ok_or(
                BuildError::MissingField("this_update")
            )?,
            next_update: self.next_update.ok_or(
                BuildError::MissingField("next_update")
            )?,
            file_hash_alg: DigestAlgorithm::default(),
            files: self.files,
        };
        if content.this_update > content.next_update {
            return Err(BuildError::InvalidField("next_update"))
        }
        let hash_len = content.file_hash_alg.digest_len();
        if content.files.iter().any(|(name, hash)| {
            name.is_empty() || !name.is_ascii() || hash.len() != hash_len
        }) {
            return Err(BuildError::InvalidField("files"))
        }
        object.resources = None;
        let signed = object.finalize(
            &oid::CT_RPKI_MANIFEST, content.to_bytes(), signer, issuer_key
        )?;
        Ok(Manifest { signed, content })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn content() -> ManifestContent {
        let mut files = BTreeMap::new();
        let alg = DigestAlgorithm::default();
        for (name, content) in [("foo.roa", "foo"), ("bar.crl", "bar")] {
            files.insert(
                name.to_string(),
                Bytes::copy_from_slice(
                    alg.digest(content.as_bytes()).as_ref()
                )
            );
        }
        ManifestContent {
            manifest_number: Serial::from(7u64),
            this_update: Time::utc(2024, 1, 1, 0, 0, 0),
            next_update: Time::utc(2024, 1, 2, 0, 0, 0),
            file_hash_alg: alg,
            files,
        }
    }

    #[test]
    fn file_contents() {
        let content = content();
        assert!(content.verify_file_contents("foo.roa", b"foo"));
        assert!(!content.verify_file_contents("foo.roa", b"foox"));
        assert!(content.contains_file("bar.crl"));
        assert!(!content.contains_file("bar"));
        assert!(content.file_hash("bar").is_none());
        assert_eq!(
            content.file_names().collect::<Vec<_>>(),
            ["bar.crl", "foo.roa"]
        );
        assert_eq!(
            content.hash_contents(b"foo"),
            content.file_hash("foo.roa").unwrap()
        );
    }

    #[test]
    #[should_panic]
    fn verify_missing_file() {
        content().verify_file_contents("bar", b"bar");
    }

    #[test]
    fn matches_files() {
        let content = content();
        let mut files = BTreeMap::new();
        files.insert("foo.roa".to_string(), Bytes::from_static(b"foo"));
        assert!(!content.matches_files(&files));
        files.insert("bar.crl".to_string(), Bytes::from_static(b"bar"));
        assert!(content.matches_files(&files));
        files.insert("bar.crl".to_string(), Bytes::from_static(b"baz"));
        assert!(!content.matches_files(&files));
    }

    #[test]
    fn decode_content() {
        let content = content();
        let raw = Mode::Der.decode(
            content.to_bytes(), RawManifestContent::take_from
        ).unwrap();
        assert_eq!(raw.manifest_number, content.manifest_number);
        assert_eq!(raw.this_update, content.this_update);
        assert_eq!(raw.next_update, content.next_update);
        assert_eq!(raw.file_hash_alg, oid::SHA256);
        let files = raw.file_list.decode(|cons| {
            take_file_list(cons, DigestAlgorithm::default())
        }).unwrap();
        assert_eq!(files, content.files);
    }

    #[test]
    fn decode_explicit_version() {
        let content = content();
        let encoded = encode::sequence((
            encode::sequence_as(Tag::CTX_0, 0u8.encode()),
            content.manifest_number.encode(),
            content.this_update.encode_generalized_time(),
            content.next_update.encode_generalized_time(),
            content.file_hash_alg.encode_oid(),
            encode::sequence(()),
        )).to_captured(Mode::Der);
        let raw = encoded.decode(RawManifestContent::take_from).unwrap();
        assert_eq!(raw.manifest_number, content.manifest_number);
        assert!(raw.file_list.is_empty());

        let encoded = encode::sequence((
            encode::sequence_as(Tag::CTX_0, 1u8.encode()),
            content.manifest_number.encode(),
            content.this_update.encode_generalized_time(),
            content.next_update.encode_generalized_time(),
            content.file_hash_alg.encode_oid(),
            encode::sequence(()),
        )).to_captured(Mode::Der);
        assert!(encoded.decode(RawManifestContent::take_from).is_err());
    }

    #[test]
    fn utc_time_is_rejected() {
        let content = content();
        let encoded = encode::sequence((
            content.manifest_number.encode(),
            content.this_update.encode_utc_time(),
            content.next_update.encode_generalized_time(),
            content.file_hash_alg.encode_oid(),
            encode::sequence(()),
        )).to_captured(Mode::Der);
        assert!(encoded.decode(RawManifestContent::take_from).is_err());
    }

    #[test]
    fn duplicate_file_names() {
        let hash = [0u8; 32];
        let entry = || encode::sequence((
            OctetString::encode_slice_as(b"a.roa".as_ref(), Tag::IA5_STRING),
            BitString::encode_slice(hash.as_ref(), 0),
        ));
        let list = (entry(), entry()).to_captured(Mode::Der);
        assert!(list.decode(|cons| {
            take_file_list(cons, DigestAlgorithm::default())
        }).is_err());
    }
}
