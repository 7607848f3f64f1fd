// crates/mdd_core/src/consts.rs

/// Width of one persisted header field: an 8-byte value plus 8 bytes of zero padding.
pub const FIELD_SIZE: usize = 16;
pub const FIELD_VALUE_SIZE: usize = 8;
pub const HDR_SIZE: usize = FIELD_SIZE * 2;

pub const DEFAULT_FP_RATE: f64 = 0.01;

pub const SIZE_UNITS: [&str; 9] = ["bytes", "Kb", "Mb", "Gb", "Tb", "Pb", "Eb", "Zb", "Yb"];

pub const CONFIG_FILE: &str = "config.json";
pub const INSTALLED_FILE: &str = "installed.json";
pub const METADATA_FILE: &str = "METADATA.json";
pub const FILTER_DIR: &str = "filters";

pub const DEFAULT_REPO: &str = "https://github.com/roberson-io/mdd_filters/raw/master/repo/";

const _: () = { assert!(FIELD_VALUE_SIZE <= FIELD_SIZE); };
