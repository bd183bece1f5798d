//! Configuration of a node, usually stored as yaml.
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::consts::DEFAULT_FIX_FINGERS_INTERVAL_MS;
use crate::consts::DEFAULT_STABILIZE_INTERVAL_MS;
use crate::error::Error;
use crate::error::Result;
use crate::logging::LogLevel;
use crate::prelude::chord_core::consts::DEFAULT_RING_BITS;
use crate::prelude::FixFingersMode;
use crate::prelude::IdSpace;
use crate::util::ensure_parent_dir;
use crate::util::expand_home;

fn default_ring_bits() -> u8 {
    DEFAULT_RING_BITS
}

fn default_stabilize_interval_ms() -> u64 {
    DEFAULT_STABILIZE_INTERVAL_MS
}

fn default_fix_fingers_interval_ms() -> u64 {
    DEFAULT_FIX_FINGERS_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Width `m` of the identifier space, the ring has `2^m` positions.
    #[serde(default = "default_ring_bits")]
    pub ring_bits: u8,
    #[serde(default = "default_stabilize_interval_ms")]
    pub stabilize_interval_ms: u64,
    #[serde(default = "default_fix_fingers_interval_ms")]
    pub fix_fingers_interval_ms: u64,
    #[serde(default)]
    pub fix_fingers_mode: FixFingersMode,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Members started by the processor. The first one seeds the ring and the
    /// others join through it.
    /// When there is no configuration in the YAML file,
    /// its deserialization is equivalent to `vec![]` in Rust.
    #[serde(default)]
    pub identities: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl Config {
    pub fn new(identities: Vec<String>) -> Self {
        Self {
            ring_bits: DEFAULT_RING_BITS,
            stabilize_interval_ms: DEFAULT_STABILIZE_INTERVAL_MS,
            fix_fingers_interval_ms: DEFAULT_FIX_FINGERS_INTERVAL_MS,
            fix_fingers_mode: FixFingersMode::default(),
            log_level: LogLevel::default(),
            identities,
        }
    }

    /// Identifier space described by `ring_bits`.
    pub fn id_space(&self) -> Result<IdSpace> {
        Ok(IdSpace::new(self.ring_bits)?)
    }

    pub fn stabilize_interval(&self) -> Duration {
        Duration::from_millis(self.stabilize_interval_ms)
    }

    pub fn fix_fingers_interval(&self) -> Duration {
        Duration::from_millis(self.fix_fingers_interval_ms)
    }

    pub fn write<P>(&self, path: P) -> Result<String>
    where P: AsRef<Path> {
        let path = expand_home(path)?;
        ensure_parent_dir(&path)?;
        let f =
            fs::File::create(path.as_path()).map_err(|e| Error::CreateFileError(e.to_string()))?;
        let f_writer = io::BufWriter::new(f);
        serde_yaml::to_writer(f_writer, self)?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn load<P>(path: P) -> Result<Config>
    where P: AsRef<Path> {
        let path = expand_home(path)?;
        tracing::debug!("Read config from: {:?}", path);
        let f = fs::File::open(path).map_err(|e| Error::OpenFileError(e.to_string()))?;
        let f_rdr = io::BufReader::new(f);
        let config: Config = serde_yaml::from_reader(f_rdr)?;
        // Reject a bad width at load time rather than at startup.
        config.id_space()?;
        Ok(config)
    }
}
