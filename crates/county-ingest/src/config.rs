//! Pipeline configuration files.

use std::path::Path;

use county_model::{PipelineConfig, SynonymMap};

use crate::error::{IngestError, Result};

/// Load a [`PipelineConfig`] from a TOML file.
///
/// Fields absent from the file keep their defaults. The scale range and the
/// synonym groups are validated here so that a contradictory configuration
/// fails before any table is read.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| IngestError::open(path, e))?;
    let config: PipelineConfig = toml::from_str(&contents).map_err(|e| IngestError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate_pipeline_config(&config).map_err(|message| IngestError::ConfigInvalid {
        path: path.to_path_buf(),
        message,
    })?;
    tracing::debug!(path = %path.display(), "loaded pipeline config");
    Ok(config)
}

fn validate_pipeline_config(config: &PipelineConfig) -> std::result::Result<(), String> {
    config.scale.validate().map_err(|e| e.to_string())?;
    SynonymMap::from_mapping(&config.age.synonym_groups).map_err(|e| e.to_string())?;
    if !(config.population.unit_multiplier.is_finite() && config.population.unit_multiplier > 0.0)
    {
        return Err(format!(
            "population unit_multiplier must be positive, got {}",
            config.population.unit_multiplier
        ));
    }
    if !config.volume_min_tests.is_finite() {
        return Err("volume_min_tests must be finite".to_string());
    }
    if !config.county_min_total_tests.is_finite() {
        return Err("county_min_total_tests must be finite".to_string());
    }
    Ok(())
}
