use crate::errors::{MddError, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlg {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlg {
    pub fn name(self) -> &'static str {
        match self {
            HashAlg::Md5 => "md5",
            HashAlg::Sha1 => "sha1",
            HashAlg::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for HashAlg {
    type Err = MddError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlg::Md5),
            "sha1" => Ok(HashAlg::Sha1),
            "sha256" => Ok(HashAlg::Sha256),
            _ => Err(MddError::UnknownHashAlg(s.to_string())),
        }
    }
}

fn hash_stream<D: Digest, R: Read>(mut r: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 { break; }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Lowercase hex digest of everything `r` yields.
pub fn digest_reader<R: Read>(alg: HashAlg, r: R) -> io::Result<String> {
    match alg {
        HashAlg::Md5 => hash_stream::<Md5, _>(r),
        HashAlg::Sha1 => hash_stream::<Sha1, _>(r),
        HashAlg::Sha256 => hash_stream::<Sha256, _>(r),
    }
}

/// Content digest of the file at `path`, or `None` when it may not be read.
pub fn digest_for_file(alg: HashAlg, path: &Path) -> Result<Option<String>> {
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(path = %path.display(), "permission denied");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Some(digest_reader(alg, f)?))
}

pub fn is_md5(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
