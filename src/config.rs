//! Probe configuration
//!
//! The probe behaves the same on every run unless told otherwise: it opens
//! [`DEFAULT_DEVICE`] and applies [`DEFAULT_WRITES`] to the first connected
//! connector. Both can be overridden through the environment
//! (`KMSPROBE_DEVICE`, `KMSPROBE_READ_ONLY`) or the command line, the latter
//! taking precedence.

use std::{fmt, path::PathBuf, str::FromStr};

use clap::Parser;

use crate::error::Error;

/// Device node opened when nothing else is configured
pub const DEFAULT_DEVICE: &str = "/dev/dri/card0";

/// Connector properties written when nothing else is configured, in order
pub const DEFAULT_WRITES: &[(&str, u64)] = &[("max bpc", 12), ("left margin", 48)];

const DEVICE_ENV: &str = "KMSPROBE_DEVICE";
const READ_ONLY_ENV: &str = "KMSPROBE_READ_ONLY";

/// A single connector property to set, matched by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWrite {
    /// Property name as exposed by the driver, e.g. `max bpc`
    pub name: String,
    /// Raw value handed to the driver unchecked
    pub value: u64,
}

impl PropertyWrite {
    /// Create a new write request
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        PropertyWrite {
            name: name.into(),
            value,
        }
    }
}

impl FromStr for PropertyWrite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .rsplit_once('=')
            .ok_or_else(|| Error::InvalidPropertyWrite(s.to_owned()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidPropertyWrite(s.to_owned()));
        }
        let value = value
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidPropertyWrite(s.to_owned()))?;
        Ok(PropertyWrite::new(name, value))
    }
}

impl fmt::Display for PropertyWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Command line of the `kmsprobe` binary
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Drm device node to inspect
    #[arg(short, long)]
    pub device: Option<PathBuf>,
    /// Only report, never set any property
    #[arg(short, long)]
    pub read_only: bool,
    /// Property to set on the connector, as `<name>=<value>` (repeatable, replaces the defaults)
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_write)]
    pub set: Vec<PropertyWrite>,
}

fn parse_write(s: &str) -> Result<PropertyWrite, String> {
    s.parse().map_err(|err: Error| err.to_string())
}

/// Resolved configuration of a probe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Device node to open
    pub device: PathBuf,
    /// Properties to set before reporting, applied in order
    pub writes: Vec<PropertyWrite>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            device: PathBuf::from(DEFAULT_DEVICE),
            writes: DEFAULT_WRITES
                .iter()
                .map(|(name, value)| PropertyWrite::new(*name, *value))
                .collect(),
        }
    }
}

impl ProbeConfig {
    /// Resolve the configuration from the process environment and the given command line
    pub fn resolve(cli: Cli) -> Self {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration using `env` to look up environment variables
    pub fn resolve_with(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ProbeConfig::default();

        if let Some(device) = env(DEVICE_ENV).filter(|x| !x.is_empty()) {
            config.device = PathBuf::from(device);
        }
        if let Some(device) = cli.device {
            config.device = device;
        }

        if !cli.set.is_empty() {
            config.writes = cli.set;
        }

        let env_read_only = env(READ_ONLY_ENV).map(|x| is_truthy(&x)).unwrap_or(false);
        if cli.read_only || env_read_only {
            config.writes.clear();
        }

        config
    }
}

fn is_truthy(x: &str) -> bool {
    let x = x.to_lowercase();
    x == "1" || x == "true" || x == "yes" || x == "y"
}
