// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use thiserror::Error;
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Duplicate entity id '{id}' in dataset")]
    DuplicateEntityId { id: String },
    #[error("Duplicate metric id '{id}' in dataset")]
    DuplicateMetricId { id: String },
    #[error("Duplicate dimension id '{id}' in dataset")]
    DuplicateDimensionId { id: String },
    #[error("Entity '{id}' not present in the registry")]
    UnknownEntity { id: String },
    #[error("Metric '{id}' not present in the registry")]
    UnknownMetric { id: String },
    #[error("Dimension '{id}' not present in the registry")]
    UnknownDimension { id: String },
    #[error("Field '{id}' is neither a metric nor a dimension")]
    UnknownField { id: String },
    #[error("Data point ({entity_id}, {field_id}) references an id absent from the registry")]
    DanglingPoint { entity_id: String, field_id: String },
}
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Sankey node '{node}' declares value {declared} but its outgoing links sum to {linked}")]
    ConservationViolation {
        node: String,
        declared: f64,
        linked: f64,
    },
    #[error("Heatmap axes must differ: '{dimension}' used for both primary and secondary")]
    DuplicateHeatmapAxes { dimension: String },
    #[error("Dimension '{dimension}' is {kind} and cannot serve as a numeric axis")]
    NonNumericAxis { dimension: String, kind: String },
    #[error("Segment dimension '{dimension}' is numeric; small multiples require a categorical or temporal segment")]
    NumericSegment { dimension: String },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid filter range for '{dimension}': min {min} exceeds max {max}")]
    InvalidFilterRange {
        dimension: String,
        min: f64,
        max: f64,
    },
    #[error("Invalid pipeline configuration: {field} is out of range")]
    InvalidPipelineConfig { field: String },
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}
pub type Result<T> = std::result::Result<T, PipelineError>;
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl PipelineError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Adapter(_) | PipelineError::Config(ConfigError::InvalidFilterRange { .. })
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::Schema(_) => "Schema",
            PipelineError::Adapter(_) => "Adapter",
            PipelineError::Config(_) => "Configuration",
            PipelineError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Schema(SchemaError::UnknownEntity { .. })
            | PipelineError::Schema(SchemaError::UnknownMetric { .. })
            | PipelineError::Schema(SchemaError::UnknownDimension { .. }) => {
                "The current selection refers to data that no longer exists. Reset the selection and try again.".to_string()
            }
            PipelineError::Adapter(AdapterError::ConservationViolation { node, .. }) => {
                format!("Flow totals for '{node}' do not balance. The underlying data needs correction.")
            }
            _ => self.to_string(),
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
}
pub fn error_severity(error: &PipelineError) -> ErrorSeverity {
    match error {
        PipelineError::Adapter(AdapterError::NonNumericAxis { .. }) => ErrorSeverity::Warning,
        PipelineError::Adapter(_) => ErrorSeverity::Error,
        PipelineError::Schema(_) => ErrorSeverity::Error,
        PipelineError::Config(_) => ErrorSeverity::Error,
        PipelineError::Serialisation(_) => ErrorSeverity::Critical,
    }
}
