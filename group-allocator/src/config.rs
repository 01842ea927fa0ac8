use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;

use envconfig::Envconfig;

use crate::types::AllocationConfig;

/// Boolean env value that also accepts `1`/`0`, `yes`/`no` and `on`/`off`.
/// An empty value reads as false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexBool(pub bool);

impl FromStr for FlexBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(FlexBool(true)),
            "false" | "0" | "no" | "off" | "" => Ok(FlexBool(false)),
            other => Err(format!("{other:?} is not a recognised boolean")),
        }
    }
}

impl From<FlexBool> for bool {
    fn from(flex: FlexBool) -> Self {
        flex.0
    }
}

impl Deref for FlexBool {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    // ── Roster input / distribution output ──────────────────────────
    #[envconfig(default = "roster.json")]
    pub roster_path: String,

    /// Where to write the distribution; stdout when unset.
    pub output_path: Option<String>,

    // ── Allocation ──────────────────────────────────────────────────
    #[envconfig(default = "true")]
    pub respect_locks: FlexBool,

    #[envconfig(default = "true")]
    pub minimize_overlap: FlexBool,

    #[envconfig(default = "1")]
    pub max_attempts: u32,

    pub allocation_seed: Option<u64>,
}

impl Config {
    pub fn roster_path(&self) -> PathBuf {
        PathBuf::from(&self.roster_path)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn allocation_config(&self) -> AllocationConfig {
        AllocationConfig {
            respect_locks: *self.respect_locks,
            minimize_overlap: *self.minimize_overlap,
            max_attempts: self.max_attempts,
            seed: self.allocation_seed,
        }
    }
}
