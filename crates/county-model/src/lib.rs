//! Data model for county-level statistics.
//!
//! Typed records for every table the pipeline derives: canonical county keys,
//! synonym groups, per-county aggregates, joined feature tables, the
//! population lookup and the boundary index, plus the pipeline configuration.

pub mod aggregate;
pub mod boundary;
pub mod county;
pub mod error;
pub mod feature;
pub mod options;
pub mod population;
pub mod synonym;

pub use aggregate::{
    Aggregate, AggregateRow, AggregateShapeError, AggregationReport, CombineFn, CountyAggregate,
    EntityAggregate, MeasureSpec,
};
pub use boundary::{BoundaryShape, GeoBoundaryIndex, Resolution};
pub use county::{CountyKey, canonicalize, title_case};
pub use error::{ModelError, Result};
pub use feature::{
    CountyFeatureTable, DerivedColumn, FeatureRow, FeatureShapeError, POPULATION_COLUMN,
    ScaleRange,
};
pub use options::{
    AgeColumns, BoundaryOptions, DrivingColumns, PipelineConfig, PopulationColumns,
    PrefixPattern, SupportThresholds, Weighting,
};
pub use population::PopulationLookup;
pub use synonym::{SynonymGroup, SynonymMap, default_synonym_mapping};
