//! Configuration management for the muar CLI
//!
//! Settings come from a `muar.toml` file; command-line flags override individual values.
//! Lookup order: `--config`, `./muar.toml`, then the user config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use muar_runtime::{GeometryVariant, ResolveStrategy, RunConfig, SerializerConfig};
use muar_storage::{Dimension, FileFormat, ReportingUnits, Unit};

use crate::error::{CliError, CliResult};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "muar.toml";

/// Global CLI configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Run settings
    pub run: RunSection,

    /// Output settings
    pub output: OutputSection,

    /// Reporting units
    pub units: UnitsSection,
}

/// `[run]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Geometry variant name
    pub geometry: String,

    /// Worker threads
    pub workers: usize,

    /// Hit collection to read
    pub hit_collection: String,

    /// Ancestry lookup strategy
    pub strategy: String,

    /// Emit the points table
    pub export_points: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            geometry: GeometryVariant::default().to_string(),
            workers: 1,
            hit_collection: muar_runtime::DEFAULT_HIT_COLLECTION.to_string(),
            strategy: ResolveStrategy::default().to_string(),
            export_points: false,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Default output file
    pub path: Option<PathBuf>,

    /// `binary` or `json`
    pub format: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: None,
            format: "binary".to_string(),
        }
    }
}

/// `[units]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsSection {
    /// Time unit symbol
    pub time: String,

    /// Energy unit symbol
    pub energy: String,

    /// Length unit symbol
    pub length: String,
}

impl Default for UnitsSection {
    fn default() -> Self {
        let units = ReportingUnits::default();
        Self {
            time: units.time.symbol.to_string(),
            energy: units.energy.symbol.to_string(),
            length: units.length.symbol.to_string(),
        }
    }
}

impl UnitsSection {
    /// Resolve the unit symbols
    pub fn reporting_units(&self) -> CliResult<ReportingUnits> {
        Ok(ReportingUnits {
            time: unit(&self.time, Dimension::Time)?,
            energy: unit(&self.energy, Dimension::Energy)?,
            length: unit(&self.length, Dimension::Length)?,
        })
    }
}

fn unit(symbol: &str, dimension: Dimension) -> CliResult<Unit> {
    Unit::by_symbol_with(symbol, dimension)
        .ok_or_else(|| CliError::config(format!("'{}' is not a {:?} unit", symbol, dimension)))
}

/// Parse an output format name
pub fn parse_format(name: &str) -> CliResult<FileFormat> {
    match name.to_ascii_lowercase().as_str() {
        "binary" | "muar" => Ok(FileFormat::Binary),
        "json" => Ok(FileFormat::Json),
        other => Err(CliError::config(format!("Unknown output format '{}'", other))),
    }
}

impl CliConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| CliError::config(format!("Invalid config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("muar").join("config.toml"))
    }

    /// Load the configuration the CLI runs with
    ///
    /// An explicit path must exist; otherwise the first existing candidate wins and
    /// defaults apply when there is none.
    pub fn discover(explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::missing_resource(format!(
                    "config file {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Using {}", local.display());
            return Self::load_from_file(&local);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => {
                tracing::debug!("Using {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Geometry variant
    pub fn geometry(&self) -> CliResult<GeometryVariant> {
        Ok(self.run.geometry.parse()?)
    }

    /// Output format
    pub fn format(&self) -> CliResult<FileFormat> {
        parse_format(&self.output.format)
    }

    /// Runtime configuration equivalent to this file
    pub fn run_config(&self) -> CliResult<RunConfig> {
        let serializer = SerializerConfig {
            hit_collection: self.run.hit_collection.clone(),
            strategy: self.run.strategy.parse()?,
            units: self.units.reporting_units()?,
            export_points: self.run.export_points,
        };
        let config = RunConfig::default()
            .with_workers(self.run.workers)
            .with_geometry(self.geometry()?)
            .with_serializer(serializer);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CliConfig::default();
        let run = config.run_config().unwrap();
        assert_eq!(run.workers, 1);
        assert_eq!(run.geometry, GeometryVariant::Baseline);
        assert_eq!(run.serializer.units, ReportingUnits::default());
        assert_eq!(config.format().unwrap(), FileFormat::Binary);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
[run]
geometry = "cryostat"
workers = 4

[units]
length = "cm"
"#,
        )
        .unwrap();
        assert_eq!(config.run.hit_collection, "CrystalHitsCollection");
        assert_eq!(config.units.time, "ns");

        let run = config.run_config().unwrap();
        assert_eq!(run.geometry, GeometryVariant::Cryostat);
        assert_eq!(run.serializer.units.length, Unit::CENTIMETER);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let mut config = CliConfig::default();
        config.units.energy = "m".into();
        assert!(config.run_config().is_err());

        let mut config = CliConfig::default();
        config.run.workers = 0;
        assert!(config.run_config().is_err());

        let mut config = CliConfig::default();
        config.output.format = "root".into();
        assert!(config.format().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("conf").join("muar.toml");

        let mut config = CliConfig::default();
        config.run.export_points = true;
        config.output.path = Some(PathBuf::from("out.muar"));
        config.save_to_file(&path).unwrap();

        assert_eq!(CliConfig::load_from_file(&path).unwrap(), config);
        assert!(CliConfig::discover(Some(&temp_dir.path().join("missing.toml"))).is_err());
    }
}
