//! Directory walking and hash-list ingestion around a [`BloomFilter`].

use crate::bloom::BloomFilter;
use crate::digest::{digest_for_file, is_md5, HashAlg};
use crate::errors::Result;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    InFilter,
    NotInFilter,
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// `None` when the file could not be opened.
    pub digest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub path: PathBuf,
    pub verdict: Verdict,
}

/// Calls `visit` for every regular file under `path` (or `path` itself), sorted per directory.
///
/// `path` itself is followed if it is a symlink. Entries found while walking
/// are not: symlinks, sockets and other special files are skipped.
pub fn walk_files<F>(path: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let meta = fs::metadata(path)?;
    if meta.is_file() {
        return visit(path);
    }
    if meta.is_dir() {
        walk_dir(path, visit)?;
    }
    Ok(())
}

fn walk_dir<F>(dir: &Path, visit: &mut F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut entries = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    for p in entries {
        let ft = fs::symlink_metadata(&p)?.file_type();
        if ft.is_file() {
            visit(&p)?;
        } else if ft.is_dir() {
            walk_dir(&p, visit)?;
        } else {
            trace!(path = %p.display(), "skipping non-regular entry");
        }
    }
    Ok(())
}

pub fn count_files(path: &Path) -> Result<u64> {
    let mut n = 0u64;
    walk_files(path, &mut |_| { n += 1; Ok(()) })?;
    debug!(path = %path.display(), files = n, "counted");
    Ok(n)
}

/// Digests every file under `path` and adds the digests to `filter`.
pub fn calculate_hashes(filter: &mut BloomFilter, path: &Path, alg: HashAlg) -> Result<Vec<FileRecord>> {
    let mut out = Vec::new();
    walk_files(path, &mut |p| {
        let digest = digest_for_file(alg, p)?;
        if let Some(d) = &digest {
            filter.add(d);
        }
        out.push(FileRecord { path: p.to_path_buf(), digest });
        Ok(())
    })?;
    info!(path = %path.display(), files = out.len(), "hashed");
    Ok(out)
}

pub fn lookup_hashes(filter: &BloomFilter, path: &Path, alg: HashAlg) -> Result<Vec<LookupRecord>> {
    let mut out = Vec::new();
    walk_files(path, &mut |p| {
        let verdict = match digest_for_file(alg, p)? {
            Some(d) if filter.lookup(&d) => Verdict::InFilter,
            Some(_) => Verdict::NotInFilter,
            None => Verdict::Unreadable,
        };
        out.push(LookupRecord { path: p.to_path_buf(), verdict });
        Ok(())
    })?;
    Ok(out)
}

fn for_each_listed_hash<F: FnMut(String)>(path: &Path, mut f: F) -> Result<()> {
    let rdr = BufReader::new(fs::File::open(path)?);
    for line in rdr.lines() {
        let line = line?;
        let line = line.trim();
        if !line.starts_with('#') && is_md5(line) {
            f(line.to_ascii_lowercase());
        }
    }
    Ok(())
}

/// Number of MD5 lines in a hash list, skipping `#` comments and anything else.
pub fn count_hash_list(path: &Path) -> Result<u64> {
    let mut n = 0u64;
    for_each_listed_hash(path, |_| n += 1)?;
    Ok(n)
}

/// Adds every listed hash to `filter`, returning how many were added.
pub fn add_hash_list(filter: &mut BloomFilter, path: &Path) -> Result<u64> {
    let mut n = 0u64;
    for_each_listed_hash(path, |h| {
        filter.add(&h);
        n += 1;
    })?;
    Ok(n)
}
