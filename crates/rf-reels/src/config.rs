//! Cabinet configuration and presets
//!
//! All constants are static for the life of a coordinator: load once at
//! startup (JSON or YAML), validate, then hand to [`crate::SpinCoordinator`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::payout::PayoutRule;

/// Named cabinet preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MachineProfile {
    /// Reference cabinet feel
    #[default]
    Classic,
    /// Faster spin, shorter settle
    Turbo,
    /// Loaded from a file or hand-tuned
    Custom,
}

/// Reel geometry and free-spin speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Height of one symbol cell (px)
    pub symbol_height: f64,
    /// Free-spin speed Vmax (px per tick)
    pub max_speed: f64,
    /// Symbols per strip (L)
    pub strip_length: usize,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            symbol_height: 80.0,
            max_speed: 36.0,
            strip_length: 20,
        }
    }
}

/// Stop-cascade timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Simulated time reel 0 spins freely before it may decelerate (ms)
    pub free_spin_ms: u64,
}

impl CascadeConfig {
    pub fn free_spin(&self) -> Duration {
        Duration::from_millis(self.free_spin_ms)
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self { free_spin_ms: 900 }
    }
}

/// Deceleration search bounds and policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Shortest deceleration searched (ticks)
    pub min_steps: u32,
    /// Longest deceleration searched (ticks)
    pub max_steps: u32,
    /// Fewest whole cells travelled while decelerating
    pub min_extra_cells: u32,
    /// Most whole cells travelled while decelerating
    pub max_extra_cells: u32,
    /// Preferred speed on the final tick before the forced stop (px per tick)
    pub target_exit_speed: f64,
    /// Step count used when the search finds nothing
    pub fallback_steps: u32,
    /// Extra cells used when even the fallback range is empty
    pub fallback_extra_cells: u32,
}

impl SolverConfig {
    /// Slowest brake speed for which the fallback step count still has a
    /// non-empty monotone `k` range at every offset (`v0·N/2 ≥ H`)
    pub fn min_brake_speed(&self, symbol_height: f64) -> f64 {
        2.0 * symbol_height / f64::from(self.fallback_steps)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_steps: 100,
            max_steps: 150,
            min_extra_cells: 12,
            max_extra_cells: 40,
            target_exit_speed: 0.8,
            fallback_steps: 130,
            fallback_extra_cells: 20,
        }
    }
}

/// Complete cabinet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Preset this config was derived from
    pub profile: MachineProfile,
    pub reel: ReelConfig,
    pub cascade: CascadeConfig,
    pub solver: SolverConfig,
    pub payout: PayoutRule,
}

impl MachineConfig {
    /// Reference cabinet: 80px cells, 36px/tick, 0.9s free spin
    pub fn classic() -> Self {
        Self {
            profile: MachineProfile::Classic,
            reel: ReelConfig::default(),
            cascade: CascadeConfig::default(),
            solver: SolverConfig::default(),
            payout: PayoutRule::classic(),
        }
    }

    /// Turbo cabinet: faster scroll, shorter free spin and settle
    pub fn turbo() -> Self {
        Self {
            profile: MachineProfile::Turbo,
            reel: ReelConfig {
                max_speed: 48.0,
                ..ReelConfig::default()
            },
            cascade: CascadeConfig { free_spin_ms: 500 },
            solver: SolverConfig {
                min_steps: 70,
                max_steps: 110,
                fallback_steps: 90,
                ..SolverConfig::default()
            },
            payout: PayoutRule::classic(),
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: MachineProfile) -> Self {
        match profile {
            MachineProfile::Classic => Self::classic(),
            MachineProfile::Turbo => Self::turbo(),
            MachineProfile::Custom => Self {
                profile: MachineProfile::Custom,
                ..Self::classic()
            },
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk; format chosen by extension (`.json`, `.yaml`, `.yml`)
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match ext.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        log::debug!(
            "Loaded {:?} cabinet config from {}",
            config.profile,
            path.display()
        );
        Ok(config)
    }

    /// Reject values the simulation cannot honour
    pub fn validate(&self) -> ConfigResult<()> {
        let reel = &self.reel;
        if !(reel.symbol_height.is_finite() && reel.symbol_height > 0.0) {
            return Err(ConfigError::Validation(format!(
                "symbol_height must be positive, got {}",
                reel.symbol_height
            )));
        }
        if !(reel.max_speed.is_finite() && reel.max_speed > 0.0) {
            return Err(ConfigError::Validation(format!(
                "max_speed must be positive, got {}",
                reel.max_speed
            )));
        }
        if reel.strip_length == 0 {
            return Err(ConfigError::Validation("strip_length must be at least 1".into()));
        }
        if self.cascade.free_spin_ms == 0 {
            return Err(ConfigError::Validation("free_spin_ms must be non-zero".into()));
        }

        let solver = &self.solver;
        if solver.min_steps < 2 || solver.fallback_steps < 2 {
            return Err(ConfigError::Validation(
                "deceleration needs at least 2 steps".into(),
            ));
        }
        if solver.min_steps > solver.max_steps {
            return Err(ConfigError::Validation(format!(
                "step range inverted: {} > {}",
                solver.min_steps, solver.max_steps
            )));
        }
        if solver.min_extra_cells > solver.max_extra_cells {
            return Err(ConfigError::Validation(format!(
                "extra cell range inverted: {} > {}",
                solver.min_extra_cells, solver.max_extra_cells
            )));
        }
        let min_speed = solver.min_brake_speed(reel.symbol_height);
        if reel.max_speed < min_speed {
            return Err(ConfigError::Validation(format!(
                "max_speed {} too slow to brake over {} fallback steps (needs >= {min_speed:.4})",
                reel.max_speed, solver.fallback_steps
            )));
        }
        if !(solver.target_exit_speed.is_finite() && solver.target_exit_speed >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "target_exit_speed must be non-negative, got {}",
                solver.target_exit_speed
            )));
        }

        self.payout.validate()
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        let classic = MachineConfig::classic();
        let turbo = MachineConfig::turbo();

        assert!(turbo.reel.max_speed > classic.reel.max_speed);
        assert!(turbo.cascade.free_spin_ms < classic.cascade.free_spin_ms);
        assert!(turbo.solver.max_steps < classic.solver.max_steps);

        assert!(classic.validate().is_ok());
        assert!(turbo.validate().is_ok());
        assert_eq!(MachineConfig::default(), classic);
    }

    #[test]
    fn test_reference_constants() {
        let config = MachineConfig::classic();
        assert_eq!(config.reel.symbol_height, 80.0);
        assert_eq!(config.reel.max_speed, 36.0);
        assert_eq!(config.reel.strip_length, 20);
        assert_eq!(config.cascade.free_spin(), Duration::from_millis(900));
        assert_eq!(config.solver.min_steps, 100);
        assert_eq!(config.solver.max_steps, 150);
        assert_eq!(config.solver.fallback_steps, 130);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "profile": "custom",
            "reel": { "symbol_height": 64.0, "max_speed": 30.0, "strip_length": 32 }
        }"#;
        let config = MachineConfig::from_json_str(json).unwrap();
        assert_eq!(config.profile, MachineProfile::Custom);
        assert_eq!(config.reel.symbol_height, 64.0);
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = serde_yml::to_string(&MachineConfig::turbo()).unwrap();
        let config = MachineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, MachineConfig::turbo());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MachineConfig::classic();
        config.reel.symbol_height = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = MachineConfig::classic();
        config.solver.min_steps = 200;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::classic();
        config.solver.min_steps = 1;
        config.solver.max_steps = 1;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::classic();
        config.cascade.free_spin_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_speed_too_slow_to_brake() {
        let mut config = MachineConfig::classic();
        config.reel.max_speed = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        // 2 * 80 / 130
        let min_speed = config.solver.min_brake_speed(config.reel.symbol_height);
        assert!((min_speed - 160.0 / 130.0).abs() < 1e-12);
        config.reel.max_speed = min_speed;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_nested_blocks_use_defaults() {
        let yaml = "solver:\n  min_steps: 90\nreel:\n  max_speed: 40.0\n";
        let config = MachineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.solver.min_steps, 90);
        assert_eq!(config.solver.max_steps, 150);
        assert_eq!(config.solver.fallback_steps, 130);
        assert_eq!(config.reel.max_speed, 40.0);
        assert_eq!(config.reel.symbol_height, 80.0);
        assert_eq!(config.cascade, CascadeConfig::default());

        let json = r#"{ "cascade": {}, "solver": { "target_exit_speed": 1.5 } }"#;
        let config = MachineConfig::from_json_str(json).unwrap();
        assert_eq!(config.cascade.free_spin_ms, 900);
        assert_eq!(config.solver.target_exit_speed, 1.5);
        assert_eq!(config.solver.min_extra_cells, 12);
    }

    #[test]
    fn test_load_unknown_extension() {
        let path = std::env::temp_dir().join("rf_reels_config_test.toml");
        std::fs::write(&path, "x = 1").unwrap();
        let result = MachineConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
        let _ = std::fs::remove_file(&path);
    }
}
