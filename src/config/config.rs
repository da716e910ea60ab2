use crate::common::{Error, Result};
use ::config::{Config, Environment, File};
use log::LevelFilter;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Size in bytes of one attribute slot. Text values hold at most
/// `ATTR_SIZE - 1` bytes, the last byte being reserved as in the on-block layout.
pub const ATTR_SIZE: usize = 16;
pub const MAX_TEXT_LEN: usize = ATTR_SIZE - 1;

/// Bytes at the head of each record block reserved for block metadata.
pub const BLOCK_HEADER_SIZE: usize = 32;

pub const RELCAT_RELNAME: &str = "RELATIONCAT";
pub const ATTRCAT_RELNAME: &str = "ATTRIBUTECAT";

/// Number of attributes in a RELATIONCAT record; the widest catalog record.
pub const RELCAT_NO_ATTRS: usize = 6;
pub const ATTRCAT_NO_ATTRS: usize = 4;

pub const DEFAULT_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_DISK_BLOCKS: usize = 8192;
pub const DEFAULT_MAX_OPEN: usize = 12;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variables with this prefix override file settings,
/// e.g. `RUSTYBASE_DISK_BLOCKS=64`.
pub const ENV_PREFIX: &str = "RUSTYBASE";

/// Kernel geometry and runtime settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct KernelConfig {
    /// Size in bytes of one record block.
    pub block_size: usize,
    /// Total number of blocks available to the store, catalogs included.
    pub disk_blocks: usize,
    /// Number of slots in the open relation table, catalogs included.
    pub max_open: usize,
    /// Log level for the shell's stderr logger.
    pub log_level: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            disk_blocks: DEFAULT_DISK_BLOCKS,
            max_open: DEFAULT_MAX_OPEN,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl KernelConfig {
    /// Loads the configuration from built-in defaults, then the given file
    /// (if any), then `RUSTYBASE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<KernelConfig> {
        let mut builder = Config::builder()
            .set_default("block_size", DEFAULT_BLOCK_SIZE as i64)?
            .set_default("disk_blocks", DEFAULT_DISK_BLOCKS as i64)?
            .set_default("max_open", DEFAULT_MAX_OPEN as i64)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: KernelConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometries the store cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.slots_per_block(RELCAT_NO_ATTRS) == 0 {
            return Err(Error::Config(format!(
                "block_size {} cannot hold a single catalog record",
                self.block_size
            )));
        }
        // One block per catalog at bootstrap.
        if self.disk_blocks < 2 {
            return Err(Error::Config(format!(
                "disk_blocks must be at least 2, got {}",
                self.disk_blocks
            )));
        }
        // Both catalogs stay open; at least one slot must be left for users.
        if self.max_open < 3 {
            return Err(Error::Config(format!(
                "max_open must be at least 3, got {}",
                self.max_open
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    /// Number of record slots a block holds for a relation with `num_attrs` attributes.
    /// Each slot costs one byte in the block's occupancy map.
    pub fn slots_per_block(&self, num_attrs: usize) -> usize {
        if num_attrs == 0 {
            return 0;
        }
        self.block_size.saturating_sub(BLOCK_HEADER_SIZE) / (num_attrs * ATTR_SIZE + 1)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| Error::Config(format!("unknown log level '{}'", self.log_level)))
    }
}
