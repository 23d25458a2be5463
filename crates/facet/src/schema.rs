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

use crate::error::{SchemaError, SchemaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ValueKind {
    Numeric,
    Categorical,
    Temporal,
}
impl ValueKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Numeric)
    }
    pub fn is_categorical(&self) -> bool {
        matches!(self, ValueKind::Categorical)
    }
    pub fn is_temporal(&self) -> bool {
        matches!(self, ValueKind::Temporal)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Numeric => "numeric",
            ValueKind::Categorical => "categorical",
            ValueKind::Temporal => "temporal",
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    Currency,
    Percentage,
    Number,
    Text,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldDomain {
    Range { min: f64, max: f64 },
    Categories(Vec<String>),
    Open,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    pub label: String,
    pub kind: ValueKind,
    pub format: DisplayFormat,
    pub domain: FieldDomain,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub label: String,
    pub format: DisplayFormat,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}
impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Number(_) => ValueKind::Numeric,
            FieldValue::Text(_) => ValueKind::Categorical,
            FieldValue::Timestamp(_) => ValueKind::Temporal,
        }
    }
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub entity_id: String,
    pub field_id: String,
    pub value: Option<FieldValue>,
}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePayload {
    pub entities: Vec<Entity>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    pub points: Vec<DataPoint>,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(Uuid);
impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    entities: Vec<Entity>,
    metrics: Vec<Metric>,
    dimensions: Vec<Dimension>,
    points: HashMap<(String, String), FieldValue>,
    entity_index: HashMap<String, usize>,
    metric_index: HashMap<String, usize>,
    dimension_index: HashMap<String, usize>,
}
impl Dataset {
    pub fn from_payload(payload: SourcePayload) -> SchemaResult<Self> {
        let mut entity_index = HashMap::with_capacity(payload.entities.len());
        for (i, entity) in payload.entities.iter().enumerate() {
            if entity_index.insert(entity.id.clone(), i).is_some() {
                return Err(SchemaError::DuplicateEntityId {
                    id: entity.id.clone(),
                });
            }
        }
        let mut metric_index = HashMap::with_capacity(payload.metrics.len());
        for (i, metric) in payload.metrics.iter().enumerate() {
            if metric_index.insert(metric.id.clone(), i).is_some() {
                return Err(SchemaError::DuplicateMetricId {
                    id: metric.id.clone(),
                });
            }
        }
        let mut dimension_index = HashMap::with_capacity(payload.dimensions.len());
        for (i, dimension) in payload.dimensions.iter().enumerate() {
            if dimension_index.insert(dimension.id.clone(), i).is_some() {
                return Err(SchemaError::DuplicateDimensionId {
                    id: dimension.id.clone(),
                });
            }
        }
        let mut points = HashMap::with_capacity(payload.points.len());
        for point in payload.points {
            if !entity_index.contains_key(&point.entity_id) {
                return Err(SchemaError::DanglingPoint {
                    entity_id: point.entity_id,
                    field_id: point.field_id,
                });
            }
            if !metric_index.contains_key(&point.field_id)
                && !dimension_index.contains_key(&point.field_id)
            {
                return Err(SchemaError::DanglingPoint {
                    entity_id: point.entity_id,
                    field_id: point.field_id,
                });
            }
            // A null point carries no information; missing stays missing.
            if let Some(value) = point.value {
                points.insert((point.entity_id, point.field_id), value);
            }
        }
        Ok(Self {
            id: DatasetId::new(),
            entities: payload.entities,
            metrics: payload.metrics,
            dimensions: payload.dimensions,
            points,
            entity_index,
            metric_index,
            dimension_index,
        })
    }
    pub fn id(&self) -> DatasetId {
        self.id
    }
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entity_index.get(id).map(|&i| &self.entities[i])
    }
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metric_index.get(id).map(|&i| &self.metrics[i])
    }
    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimension_index.get(id).map(|&i| &self.dimensions[i])
    }
    pub fn require_entity(&self, id: &str) -> SchemaResult<&Entity> {
        self.entity(id).ok_or_else(|| SchemaError::UnknownEntity {
            id: id.to_string(),
        })
    }
    pub fn require_metric(&self, id: &str) -> SchemaResult<&Metric> {
        self.metric(id).ok_or_else(|| SchemaError::UnknownMetric {
            id: id.to_string(),
        })
    }
    pub fn require_dimension(&self, id: &str) -> SchemaResult<&Dimension> {
        self.dimension(id)
            .ok_or_else(|| SchemaError::UnknownDimension {
                id: id.to_string(),
            })
    }
    pub fn value(&self, entity_id: &str, field_id: &str) -> Option<&FieldValue> {
        self.points
            .get(&(entity_id.to_string(), field_id.to_string()))
    }
    pub fn numeric_value(&self, entity_id: &str, field_id: &str) -> Option<f64> {
        self.value(entity_id, field_id).and_then(FieldValue::as_number)
    }
    pub fn field_kind(&self, field_id: &str) -> SchemaResult<ValueKind> {
        if self.metric_index.contains_key(field_id) {
            return Ok(ValueKind::Numeric);
        }
        self.dimension(field_id)
            .map(|d| d.kind)
            .ok_or_else(|| SchemaError::UnknownField {
                id: field_id.to_string(),
            })
    }
    pub fn points(&self) -> &HashMap<(String, String), FieldValue> {
        &self.points
    }
}
impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dataset {}: {} entities, {} metrics, {} dimensions, {} points",
            self.id,
            self.entities.len(),
            self.metrics.len(),
            self.dimensions.len(),
            self.points.len()
        )
    }
}
