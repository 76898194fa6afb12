//! Tuning parameters for the configurable strategies.
//!
//! The configuration is read-only once a strategy is built. It is usually
//! loaded from JSON; every field has a default so partial files are accepted.

use serde::{Deserialize, Serialize};

/// Attack bonus per combo count, indexed by the combo after the clear.
pub const DEFAULT_COMBO_TABLE: [i32; 13] = [0, 0, 1, 1, 1, 2, 2, 3, 3, 4, 4, 4, 5];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("combo table bound {table_max} must be within 1..={len}")]
    TableMax { table_max: usize, len: usize },
    #[display("mode {mode:#x} needs a board at least {min} wide, got {width}")]
    WidthTooSmall { mode: u32, width: usize, min: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Strategy-specific mode flags.
    ///
    /// Attack reads bit 0 (receive on the right side) and `mode != 0` (fixed
    /// 3-line attack). Combo enables its attack model when `mode == 1`.
    pub mode: u32,
    /// Rows of margin the Combo strategy keeps below its cell-count thresholds.
    pub safe: i32,
    pub table: Vec<i32>,
    /// Number of usable `table` entries; combo counts past it reuse the last one.
    pub table_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: 0,
            safe: 0,
            table: DEFAULT_COMBO_TABLE.to_vec(),
            table_max: DEFAULT_COMBO_TABLE.len(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_max == 0 || self.table_max > self.table.len() {
            return Err(ConfigError::TableMax {
                table_max: self.table_max,
                len: self.table.len(),
            });
        }
        Ok(())
    }

    /// Attack granted for reaching `combo`, clamped to the last usable entry.
    #[must_use]
    pub fn combo_attack(&self, combo: i32) -> i32 {
        let index = usize::try_from(combo).unwrap_or(0);
        self.table[index.min(self.table_max - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.table_max, 13);
    }

    #[test]
    fn test_validate_table_bounds() {
        let config = Config {
            table_max: 14,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TableMax {
                table_max: 14,
                len: 13
            })
        );
        let config = Config {
            table_max: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_combo_attack_clamps() {
        let config = Config::default();
        assert_eq!(config.combo_attack(0), 0);
        assert_eq!(config.combo_attack(2), 1);
        assert_eq!(config.combo_attack(12), 5);
        assert_eq!(config.combo_attack(13), 5);
        assert_eq!(config.combo_attack(100), 5);

        let short = Config {
            table_max: 3,
            ..Config::default()
        };
        assert_eq!(short.combo_attack(7), 1);
    }

    #[test]
    fn test_partial_json() {
        let config: Config = serde_json::from_str(r#"{"mode": 1, "safe": 2}"#).unwrap();
        assert_eq!(config.mode, 1);
        assert_eq!(config.safe, 2);
        assert_eq!(config.table, DEFAULT_COMBO_TABLE.to_vec());
        assert_eq!(config.table_max, 13);
    }
}
