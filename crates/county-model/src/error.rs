use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("synonym label '{label}' is claimed by both '{first}' and '{second}'")]
    OverlappingSynonym {
        label: String,
        first: String,
        second: String,
    },
    #[error("synonym group name '{group}' is itself a member of group '{owner}'")]
    GroupNameIsMember { group: String, owner: String },
    #[error("synonym group '{group}' has no member labels")]
    EmptySynonymGroup { group: String },
    #[error("invalid scale range: floor {floor} must be below ceiling {ceiling}")]
    InvalidScaleRange { floor: f64, ceiling: f64 },
    #[error("duplicate measure column '{column}'")]
    DuplicateMeasure { column: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
