pub mod consts;
pub mod errors;
pub mod utils;
pub mod bitfield;
pub mod hash;
pub mod bloom;
pub mod storage;
pub mod digest;
pub mod scan;
pub mod config;
pub mod catalog;

pub use bitfield::{BitField, Position};
pub use bloom::{accuracy, byte_size_human, BloomFilter};
pub use catalog::{Catalog, FilterMeta, HashDigest};
pub use config::Config;
pub use digest::{digest_for_file, is_md5, HashAlg};
pub use errors::{MddError, Result};
pub use hash::seeded_hash32;
pub use scan::{LookupRecord, Verdict};
pub use storage::{FilterStore, FsStore, MemStore, StoreWrite};
