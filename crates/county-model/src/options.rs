//! Configuration for the county pipeline.
//!
//! Every aggregation and merge policy the pipeline applies is named here
//! rather than baked into the call sites. All fields default to the values
//! the published county tables were analysed with, so an empty TOML file is a
//! valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feature::ScaleRange;
use crate::synonym::default_synonym_mapping;

/// How the `Co. <Name>` pattern matches county names in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixPattern {
    /// One run of ASCII letters (`Co. Westmeath`). Names with accents or
    /// hyphens are cut short or not matched at all.
    #[default]
    Ascii,
    /// One run of Unicode letters, optionally hyphenated
    /// (`Co. Dún-Laoghaire`). Multi-word names are still cut at the first
    /// space.
    Unicode,
}

/// Weighting for means taken across counties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    #[default]
    Unweighted,
    /// Weight each county by its joined population.
    Population,
}

/// Column names of the driving-test table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingColumns {
    pub centre: String,
    pub month: String,
    pub pass_rate: String,
    pub tests: String,
    /// Centre label of the national total rows.
    pub national_label: String,
}

impl Default for DrivingColumns {
    fn default() -> Self {
        Self {
            centre: "Driving Test Centre".to_string(),
            month: "Month".to_string(),
            pass_rate: "Pass Rate".to_string(),
            tests: "Number of Tests".to_string(),
            national_label: "All driving test centres".to_string(),
        }
    }
}

/// Column names and synonym groups of the age table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeColumns {
    pub entity: String,
    pub value: String,
    /// Dimensions the cleaner groups by (and sorts on) besides the entity.
    pub key_dimensions: Vec<String>,
    /// Canonical name → source labels collapsed into it.
    pub synonym_groups: BTreeMap<String, Vec<String>>,
}

impl Default for AgeColumns {
    fn default() -> Self {
        Self {
            entity: "County and State".to_string(),
            value: "VALUE".to_string(),
            key_dimensions: vec![
                "Statistic Label".to_string(),
                "Year".to_string(),
                "Sex".to_string(),
                "UNIT".to_string(),
            ],
            synonym_groups: default_synonym_mapping(),
        }
    }
}

/// Column names and row selection of the population table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationColumns {
    pub county: String,
    pub value: String,
    /// Multiplier converting the value column to persons (1000 for a table in
    /// thousands).
    pub unit_multiplier: f64,
    /// Only rows whose column equals the given value are used, e.g.
    /// `{ "Sex" = "Both sexes" }`.
    pub filters: BTreeMap<String, String>,
}

impl Default for PopulationColumns {
    fn default() -> Self {
        Self {
            county: "County".to_string(),
            value: "VALUE".to_string(),
            unit_multiplier: 1000.0,
            filters: BTreeMap::new(),
        }
    }
}

/// Boundary dataset settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryOptions {
    /// Feature property holding the region name.
    pub name_property: String,
    /// County key → boundary region name, for regions the boundary dataset
    /// spells differently from the statistics tables.
    pub aliases: BTreeMap<String, String>,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            name_property: "name".to_string(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Minimum-support thresholds per call site. `None` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportThresholds {
    pub pass_rate: Option<usize>,
    pub test_count: Option<usize>,
    pub age: Option<usize>,
    pub centre: Option<usize>,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub driving: DrivingColumns,
    pub age: AgeColumns,
    pub population: PopulationColumns,
    pub boundaries: BoundaryOptions,
    pub min_support: SupportThresholds,
    /// Rows with fewer tests are left out of the pass-rate vs volume analysis.
    pub volume_min_tests: f64,
    /// Counties with fewer total tests are left out of the county-level
    /// pass-rate vs volume table.
    pub county_min_total_tests: f64,
    pub scale: ScaleRange,
    pub prefix_pattern: PrefixPattern,
    pub summary_weighting: Weighting,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            driving: DrivingColumns::default(),
            age: AgeColumns::default(),
            population: PopulationColumns::default(),
            boundaries: BoundaryOptions::default(),
            min_support: SupportThresholds::default(),
            volume_min_tests: 10.0,
            county_min_total_tests: 50.0,
            scale: ScaleRange::default(),
            prefix_pattern: PrefixPattern::default(),
            summary_weighting: Weighting::default(),
        }
    }
}
