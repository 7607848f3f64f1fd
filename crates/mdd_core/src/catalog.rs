//! Filter catalogs: the remote `METADATA.json` and the local `installed.json`.
//!
//! Both files are the same JSON shape, an object keyed by filter name. Remote
//! entries carry one field per digest algorithm; installed entries record the
//! single digest that was current when the filter was fetched.

use crate::consts::{FILTER_DIR, INSTALLED_FILE, METADATA_FILE};
use crate::digest::{digest_reader, HashAlg};
use crate::errors::{MddError, Result};
use crate::storage::FilterStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    pub alg: HashAlg,
    pub digest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterMeta {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl FilterMeta {
    /// Remote digest published for `alg`.
    pub fn digest_for(&self, alg: HashAlg) -> Option<&str> {
        match alg {
            HashAlg::Md5 => self.md5.as_deref(),
            HashAlg::Sha1 => self.sha1.as_deref(),
            HashAlg::Sha256 => self.sha256.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub filters: BTreeMap<String, FilterMeta>,
}

impl Catalog {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read(path)?)
    }

    /// Pretty JSON, written to a sibling temp file and renamed into place.
    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)?;
        f.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        f.sync_all()?;
        drop(f);
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FilterMeta> { self.filters.get(name) }

    pub fn insert(&mut self, name: &str, meta: FilterMeta) {
        self.filters.insert(name.to_string(), meta);
    }

    pub fn len(&self) -> usize { self.filters.len() }

    pub fn is_empty(&self) -> bool { self.filters.is_empty() }

    /// Name / description / last-modified table, sorted by name.
    pub fn render_table(&self) -> String {
        let mut out = format!("{:<20}{:<40}{:<20}\n", "Filter", "Description", "Last Modified");
        out.push_str(&"-".repeat(90));
        out.push('\n');
        for (name, meta) in &self.filters {
            out.push_str(&format!("{:<20}{:<40}{:<20}\n", name, meta.description, meta.last_modified));
        }
        out
    }
}

pub fn filter_dir(home: &Path) -> PathBuf { home.join(FILTER_DIR) }

pub fn installed_path(home: &Path) -> PathBuf { home.join(INSTALLED_FILE) }

pub fn metadata_path(home: &Path) -> PathBuf { home.join(METADATA_FILE) }

fn rfc3339(t: std::time::SystemTime) -> String {
    OffsetDateTime::from(t).format(&Rfc3339).unwrap_or_default()
}

/// Installed filters. A missing `installed.json` is rebuilt from `filters/`.
pub fn installed(home: &Path, alg: HashAlg) -> Result<Catalog> {
    let path = installed_path(home);
    if path.exists() {
        return Catalog::load(&path);
    }
    let dir = filter_dir(home);
    fs::create_dir_all(&dir)?;
    let mut cat = Catalog::default();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() { continue; }
        let name = entry.file_name().to_string_lossy().into_owned();
        let digest = digest_reader(alg, fs::File::open(entry.path())?)?;
        let last_modified = meta.modified().map(rfc3339).unwrap_or_default();
        cat.insert(&name, FilterMeta {
            last_modified,
            hash: Some(HashDigest { alg, digest }),
            ..FilterMeta::default()
        });
    }
    cat.save_atomic(&path)?;
    info!(filters = cat.len(), "rebuilt installed index");
    Ok(cat)
}

/// Registered in `installed.json` and present on disk.
pub fn is_installed(home: &Path, name: &str, alg: HashAlg) -> Result<bool> {
    let cat = installed(home, alg)?;
    Ok(cat.get(name).is_some() && filter_dir(home).join(name).is_file())
}

/// Records `name` as installed from its remote catalog entry.
pub fn record_install(installed: &mut Catalog, name: &str, remote: &FilterMeta, alg: HashAlg) {
    let hash = remote.digest_for(alg).map(|d| HashDigest { alg, digest: d.to_string() });
    debug!(name, has_digest = hash.is_some(), "recording install");
    installed.insert(name, FilterMeta {
        description: remote.description.clone(),
        last_modified: remote.last_modified.clone(),
        hash,
        ..FilterMeta::default()
    });
}

/// Verifies downloaded filter `bytes` against the catalog digest for `alg`,
/// publishes them under `name` in `store` and records the install.
///
/// On a mismatch nothing is written and `installed` is left as it was.
pub fn publish_filter(
    store: &dyn FilterStore,
    name: &str,
    bytes: &[u8],
    remote: &FilterMeta,
    alg: HashAlg,
    installed: &mut Catalog,
) -> Result<()> {
    match remote.digest_for(alg) {
        Some(want) => {
            let got = digest_reader(alg, bytes)?;
            if !got.eq_ignore_ascii_case(want) {
                return Err(MddError::DigestMismatch {
                    name: name.to_string(),
                    alg: alg.to_string(),
                    expected: want.to_string(),
                    got,
                });
            }
        }
        None => warn!(name, %alg, "no published digest, skipping verification"),
    }
    let mut w = store.writer(name)?;
    w.write_all(bytes)?;
    w.commit()?;
    record_install(installed, name, remote, alg);
    info!(name, bytes = bytes.len(), "installed");
    Ok(())
}

/// Installed filters whose recorded digest no longer matches the remote one.
pub fn stale_entries(installed: &Catalog, remote: &Catalog, alg: HashAlg) -> Vec<String> {
    installed
        .filters
        .iter()
        .filter_map(|(name, local)| {
            let want = remote.get(name)?.digest_for(alg)?;
            let have = local.hash.as_ref().filter(|h| h.alg == alg).map(|h| h.digest.as_str());
            (have != Some(want)).then(|| name.clone())
        })
        .collect()
}
