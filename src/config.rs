use crate::model::{ChargingHabit, SimulationParameters};
use anyhow::{Context, Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Simulation configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Degradation model parameters.
    pub model: SimulationParameters,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// SoH levels (%) whose crossing time is reported.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
        }
    }
}

fn default_thresholds() -> Vec<f64> {
    // Typical end of life, then severely degraded.
    vec![80.0, 60.0]
}

/// Command-line replacements for individual model parameters.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    #[arg(long)]
    pub initial_capacity_wh: Option<f64>,

    #[arg(long)]
    pub cycles_per_year: Option<f64>,

    #[arg(long)]
    pub years: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    pub average_temperature_c: Option<f64>,

    #[arg(long, value_enum)]
    pub charging_habit: Option<ChargingHabit>,

    #[arg(long)]
    pub depth_of_discharge: Option<f64>,

    #[arg(long)]
    pub calendar_aging: Option<f64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Replace the model parameters given on the command line and revalidate.
    ///
    /// # Errors
    /// Returns an error if the resulting configuration is invalid.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        let model = &mut self.model;
        if let Some(val) = overrides.initial_capacity_wh {
            model.initial_capacity_wh = val;
        }
        if let Some(val) = overrides.cycles_per_year {
            model.cycles_per_year = val;
        }
        if let Some(val) = overrides.years {
            model.years = val;
        }
        if let Some(val) = overrides.average_temperature_c {
            model.average_temperature_c = val;
        }
        if let Some(val) = overrides.charging_habit {
            model.charging_habit = val;
        }
        if let Some(val) = overrides.depth_of_discharge {
            model.depth_of_discharge = val;
        }
        if let Some(val) = overrides.calendar_aging {
            model.calendar_aging = val;
        }

        self.validate().context("invalid overrides")
    }

    fn validate(&self) -> Result<()> {
        self.model.validate().context("invalid model parameters")?;

        for &threshold in &self.output.thresholds {
            if !(threshold > 0.0 && threshold <= 100.0) {
                bail!("threshold must be in the range (0, 100], but is {threshold}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;

    const CONFIG: &str = r#"
[model]
initial_capacity_wh = 50.0
cycles_per_year = 365.0
years = 5
average_temperature_c = 25.0
charging_habit = "standard"
depth_of_discharge = 0.8
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = Config::from_toml(CONFIG).unwrap();
        assert_eq!(config.model.years, 5);
        assert_eq!(config.model.charging_habit, ChargingHabit::Standard);
        assert_eq!(config.model.calendar_aging, 0.2);
        assert_eq!(config.output.thresholds, vec![80.0, 60.0]);
    }

    #[test]
    fn test_parse_output_section() {
        let contents = format!("{CONFIG}\n[output]\nthresholds = [90.0]\n");
        let config = Config::from_toml(&contents).unwrap();
        assert_eq!(config.output.thresholds, vec![90.0]);
    }

    #[test]
    fn test_rejects_unknown_habit() {
        let contents = CONFIG.replace("\"standard\"", "\"overnight\"");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        let contents = format!("{CONFIG}\n[output]\nthresholds = [120.0]\n");
        assert!(Config::from_toml(&contents).is_err());
    }

    #[test]
    fn test_rejects_zero_years_as_invalid_parameter() {
        let contents = CONFIG.replace("years = 5", "years = 0");
        let error = Config::from_toml(&contents).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ModelError>(),
            Some(ModelError::InvalidParameter { name: "years", .. })
        ));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::from_toml(CONFIG).unwrap();
        let overrides = Overrides {
            average_temperature_c: Some(40.0),
            charging_habit: Some(ChargingHabit::Fast),
            ..Default::default()
        };
        config.apply_overrides(&overrides).unwrap();
        assert_eq!(config.model.average_temperature_c, 40.0);
        assert_eq!(config.model.charging_habit, ChargingHabit::Fast);
        assert_eq!(config.model.years, 5);

        let overrides = Overrides {
            initial_capacity_wh: Some(-1.0),
            ..Default::default()
        };
        assert!(config.apply_overrides(&overrides).is_err());
    }
}
