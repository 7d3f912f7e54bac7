//! URIs.
//!
//! Resource certificates point to their CRL, their issuer, their
//! repository and their manifest through rsync URIs. This module provides
//! the type for those.

use std::{error, fmt, str};
use std::str::FromStr;
use bcder::encode;
use bcder::Tag;
use bcder::encode::PrimitiveContent;
use bytes::{BufMut, Bytes, BytesMut};


//------------ Rsync ---------------------------------------------------------

/// An rsync URI.
///
/// This implements a simplified form of the the rsync URI defined in RFC 5781
/// which in turn references RFC 3986. Only absolute URIs including an
/// authority are allowed.
///
/// Parsing is simplified in that it only checks for the correct structure and
/// that no forbidden characters are present.
///
//  In particular, forbidden characters are
//
//     SPACE CONTROL " # < > ? [ \\ ] ^ ` { | }
//
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rsync {
    module: RsyncModule,
    path: Bytes
}

impl Rsync {
    pub fn new(module: RsyncModule, path: Bytes) -> Self {
        Rsync { module, path }
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(mut bytes: Bytes) -> Result<Self, Error> {
        if !is_uri_ascii(&bytes) {
            return Err(Error::NotAscii)
        }
        if bytes.len() < 8 || !bytes[..8].eq_ignore_ascii_case(b"rsync://") {
            return Err(Error::BadScheme)
        }
        let _ = bytes.split_to(8);

        let (authority, module) = {
            let mut parts = bytes.splitn(3, |ch| *ch == b'/');
            let authority = match parts.next() {
                Some(part) if !part.is_empty() => part.len(),
                _ => return Err(Error::BadUri)
            };
            let module = match parts.next() {
                Some(part) if !part.is_empty() => part.len(),
                _ => return Err(Error::BadUri)
            };
            (authority, module)
        };
        let authority = bytes.split_to(authority);
        let _ = bytes.split_to(1);
        let module = bytes.split_to(module);
        if !bytes.is_empty() {
            let _ = bytes.split_to(1);
        }
        Ok(Rsync {
            module: RsyncModule { authority, module },
            path: bytes
        })
    }

    pub fn module(&self) -> &RsyncModule {
        &self.module
    }

    pub fn path(&self) -> &str {
        // Checked for ASCII during construction.
        str::from_utf8(self.path.as_ref()).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.path.is_empty() {
            return None
        }
        let mut res = self.clone();
        res.path = match self.path.iter().rposition(|ch| *ch == b'/') {
            Some(pos) => self.path.slice(..pos),
            None => Bytes::new()
        };
        Some(res)
    }

    /// Returns a new URI with `path` appended to this URI’s path.
    pub fn join(&self, path: &[u8]) -> Result<Self, Error> {
        if !is_uri_ascii(path) {
            return Err(Error::NotAscii)
        }
        let mut res = BytesMut::with_capacity(
            self.path.len() + path.len() + 1
        );
        if !self.path.is_empty() {
            res.put_slice(self.path.as_ref());
            if !self.path.ends_with(b"/") {
                res.put_slice(b"/");
            }
        }
        res.put_slice(path);
        Ok(Self::new(self.module.clone(), res.freeze()))
    }

    /// Returns an encoder for the URI as a GeneralName.
    ///
    /// This is the `uniformResourceIdentifier` choice, an implicitly
    /// tagged IA5String.
    pub fn encode_general_name(&self) -> impl encode::Values + '_ {
        GeneralNameUri(self.to_string()).encode_as(Tag::CTX_6)
    }
}


//--- FromStr

impl FromStr for Rsync {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(Bytes::copy_from_slice(s.as_bytes()))
    }
}


//--- Display

impl fmt::Display for Rsync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.module)?;
        f.write_str(self.path())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Rsync {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rsync {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rsync::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//------------ RsyncModule ---------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RsyncModule {
    authority: Bytes,
    module: Bytes,
}

impl RsyncModule {
    pub fn authority(&self) -> &str {
        str::from_utf8(self.authority.as_ref()).unwrap_or_default()
    }

    pub fn module(&self) -> &str {
        str::from_utf8(self.module.as_ref()).unwrap_or_default()
    }
}

impl fmt::Display for RsyncModule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rsync://{}/{}/", self.authority(), self.module())
    }
}


//------------ GeneralNameUri ------------------------------------------------

/// The content of a URI general name.
struct GeneralNameUri(String);

impl PrimitiveContent for GeneralNameUri {
    const TAG: Tag = Tag::IA5_STRING;

    fn encoded_len(&self, _: bcder::Mode) -> usize {
        self.0.len()
    }

    fn write_encoded<W: std::io::Write>(
        &self, _: bcder::Mode, target: &mut W
    ) -> Result<(), std::io::Error> {
        target.write_all(self.0.as_bytes())
    }
}


//------------ Helper Functions ----------------------------------------------

fn is_uri_ascii<S: AsRef<[u8]>>(slice: S) -> bool {
    slice.as_ref().iter().all(|&ch| {
        ch > b' ' && ch != b'"' && ch != b'#' && ch != b'<' && ch != b'>'
            && ch != b'?' && ch != b'[' && ch != b'\\' && ch != b']'
            && ch != b'^' && ch != b'`' && ch != b'{' && ch != b'|'
            && ch != b'}' && ch < 0x7F
    })
}


//------------ Error ---------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    NotAscii,
    BadUri,
    BadScheme,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Error::NotAscii => "invalid characters",
            Error::BadUri => "bad URI",
            Error::BadScheme => "bad URI scheme",
        })
    }
}

impl error::Error for Error { }


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rsync_from_str() {
        let uri = Rsync::from_str(
            "rsync://host.example/module/some/path.mft"
        ).unwrap();
        assert_eq!(uri.module().authority(), "host.example");
        assert_eq!(uri.module().module(), "module");
        assert_eq!(uri.path(), "some/path.mft");
        assert_eq!(
            uri.to_string(), "rsync://host.example/module/some/path.mft"
        );
    }

    #[test]
    fn rsync_module_only() {
        let uri = Rsync::from_str("rsync://host.example/module/").unwrap();
        assert_eq!(uri.path(), "");
        assert_eq!(uri.to_string(), "rsync://host.example/module/");
        assert!(uri.parent().is_none());
    }

    #[test]
    fn reject_bad_rsync() {
        assert_eq!(
            Rsync::from_str("https://host.example/module/"),
            Err(Error::BadScheme)
        );
        assert_eq!(
            Rsync::from_str("rsync://host.example"),
            Err(Error::BadUri)
        );
        assert_eq!(
            Rsync::from_str("rsync://host.example/mod ule/"),
            Err(Error::NotAscii)
        );
    }

    #[test]
    fn parent_and_join() {
        let uri = Rsync::from_str("rsync://host/module/a/b.cer").unwrap();
        let parent = uri.parent().unwrap();
        assert_eq!(parent.to_string(), "rsync://host/module/a");
        assert_eq!(
            parent.join(b"c.crl").unwrap().to_string(),
            "rsync://host/module/a/c.crl"
        );
    }
}
