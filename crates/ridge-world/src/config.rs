use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_SECTION_SIZE: i32 = 40;
pub const DEFAULT_SAMPLES_PER_UNIT: u32 = 5;
pub const DEFAULT_MOUNTAIN_COUNT: usize = 100;
pub const DEFAULT_VIEW_RADIUS: f32 = 80.0;
pub const DEFAULT_QUEUE_CAPACITY: usize = 30;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_section_size")]
    pub section_size: i32,
    #[serde(default = "default_samples_per_unit")]
    pub samples_per_unit: u32,
    #[serde(default = "default_mountain_count")]
    pub mountain_count: usize,
    /// Bumps are evaluated out to this many widths from their center.
    #[serde(default = "default_support_sigmas")]
    pub support_sigmas: f32,
    #[serde(default = "default_view_radius")]
    pub view_radius: f32,
    #[serde(default = "default_normal_step")]
    pub normal_step: f32,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub table: TableConfig,
}

fn default_section_size() -> i32 {
    DEFAULT_SECTION_SIZE
}
fn default_samples_per_unit() -> u32 {
    DEFAULT_SAMPLES_PER_UNIT
}
fn default_mountain_count() -> usize {
    DEFAULT_MOUNTAIN_COUNT
}
fn default_support_sigmas() -> f32 {
    4.0
}
fn default_view_radius() -> f32 {
    DEFAULT_VIEW_RADIUS
}
fn default_normal_step() -> f32 {
    0.5
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            section_size: default_section_size(),
            samples_per_unit: default_samples_per_unit(),
            mountain_count: default_mountain_count(),
            support_sigmas: default_support_sigmas(),
            view_radius: default_view_radius(),
            normal_step: default_normal_step(),
            queue: QueueConfig::default(),
            table: TableConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QueueConfig {
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}
fn default_poll_interval_ms() -> u64 {
    10
}
impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    #[serde(default = "default_growth_factor")]
    pub growth_factor: usize,
    #[serde(default = "default_max_load_factor")]
    pub max_load_factor: f32,
}
fn default_initial_capacity() -> usize {
    64
}
fn default_growth_factor() -> usize {
    2
}
fn default_max_load_factor() -> f32 {
    0.7
}
impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            growth_factor: default_growth_factor(),
            max_load_factor: default_max_load_factor(),
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TerrainConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.section_size <= 0 {
            return Err(ConfigError::Invalid("section_size must be positive"));
        }
        if self.samples_per_unit == 0 {
            return Err(ConfigError::Invalid("samples_per_unit must be positive"));
        }
        if self.mountain_count == 0 {
            return Err(ConfigError::Invalid("mountain_count must be positive"));
        }
        if !(self.support_sigmas >= 3.0) {
            return Err(ConfigError::Invalid("support_sigmas must be at least 3"));
        }
        if !(self.normal_step > 0.0) {
            return Err(ConfigError::Invalid("normal_step must be positive"));
        }
        if !(self.view_radius >= 0.0) {
            return Err(ConfigError::Invalid("view_radius must not be negative"));
        }
        if self.queue.capacity == 0 {
            return Err(ConfigError::Invalid("queue.capacity must be positive"));
        }
        if self.table.initial_capacity == 0 {
            return Err(ConfigError::Invalid("table.initial_capacity must be positive"));
        }
        if self.table.growth_factor < 2 {
            return Err(ConfigError::Invalid("table.growth_factor must be at least 2"));
        }
        let lf = self.table.max_load_factor;
        if !(lf > 0.0 && lf < 1.0) {
            return Err(ConfigError::Invalid("table.max_load_factor must be in (0, 1)"));
        }
        Ok(())
    }

    /// Grid cells along one side of a section (S * R).
    #[inline]
    pub fn cells_per_side(&self) -> usize {
        self.section_size as usize * self.samples_per_unit as usize
    }

    /// Samples along one side of a blended table.
    #[inline]
    pub fn blended_side(&self) -> usize {
        self.cells_per_side() + 1
    }

    /// Samples along one side of a raw table, which spans the 3x3 block.
    #[inline]
    pub fn raw_side(&self) -> usize {
        3 * self.cells_per_side() + 1
    }

    /// World distance between neighboring samples.
    #[inline]
    pub fn spacing(&self) -> f32 {
        1.0 / self.samples_per_unit as f32
    }

    /// About 5% of the bumps are wide, at least one unless there are none.
    #[inline]
    pub fn wide_mountain_count(&self) -> usize {
        (self.mountain_count / 20).max(1).min(self.mountain_count)
    }

    /// Approximate heap bytes held by one fully blended section.
    pub fn section_bytes(&self) -> usize {
        let raw = self.raw_side() * self.raw_side();
        let blended = self.blended_side() * self.blended_side();
        (raw + blended) * size_of::<f32>()
            + self.mountain_count * size_of::<crate::field::Mountain>()
    }
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    TerrainConfig::from_toml_str(&s)
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read terrain config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse terrain config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid terrain config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let cfg = TerrainConfig::default();
        assert_eq!(cfg.section_size, 40);
        assert_eq!(cfg.samples_per_unit, 5);
        assert_eq!(cfg.mountain_count, 100);
        assert_eq!(cfg.wide_mountain_count(), 5);
        assert_eq!(cfg.blended_side(), 201);
        assert_eq!(cfg.raw_side(), 601);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = TerrainConfig::from_toml_str(
            "seed = 9\nsection_size = 16\n[queue]\ncapacity = 4\n",
        )
        .unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.section_size, 16);
        assert_eq!(cfg.queue.capacity, 4);
        assert_eq!(cfg.queue.poll_interval_ms, 10);
        assert_eq!(cfg.table, TableConfig::default());
    }

    #[test]
    fn wide_count_handles_small_and_empty_sets() {
        let with = |n| TerrainConfig {
            mountain_count: n,
            ..TerrainConfig::default()
        };
        assert_eq!(with(0).wide_mountain_count(), 0);
        assert_eq!(with(1).wide_mountain_count(), 1);
        assert_eq!(with(19).wide_mountain_count(), 1);
        assert_eq!(with(100).wide_mountain_count(), 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = TerrainConfig::from_toml_str("[table]\nmax_load_factor = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = TerrainConfig::from_toml_str("section_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = TerrainConfig::from_toml_str("section_size = \"big\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
