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

use crate::error::{ConfigError, ConfigResult, PipelineError, Result};
use crate::schema::{Dataset, DatasetId, Dimension, Entity, FieldValue, Metric};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
pub const DEFAULT_METRIC_COUNT: usize = 5;
pub const DEFAULT_ENTITY_COUNT: usize = 3;
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub default_metric_count: usize,
    pub default_entity_count: usize,
}
impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_metric_count: DEFAULT_METRIC_COUNT,
            default_entity_count: DEFAULT_ENTITY_COUNT,
        }
    }
}
impl SelectionConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_metric_count == 0 {
            return Err(ConfigError::InvalidPipelineConfig {
                field: "default_metric_count".to_string(),
            });
        }
        if self.default_entity_count == 0 {
            return Err(ConfigError::InvalidPipelineConfig {
                field: "default_entity_count".to_string(),
            });
        }
        Ok(())
    }
    pub fn for_wide_comparison() -> Self {
        Self {
            default_metric_count: 8,
            default_entity_count: 6,
        }
    }
}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub dimension_ids: Vec<String>,
    #[serde(default)]
    pub entity_ids: Vec<String>,
    #[serde(default)]
    pub metric_ids: Vec<String>,
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}
impl RangeFilter {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub ranges: BTreeMap<String, RangeFilter>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub search: Option<String>,
}
impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
            && self.categories.is_empty()
            && self.search.as_deref().is_none_or(str::is_empty)
    }
}
#[derive(Debug, Clone)]
pub struct FilteredDataset {
    pub dataset_id: DatasetId,
    pub entities: Vec<Entity>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    points: HashMap<(String, String), FieldValue>,
}
impl FilteredDataset {
    pub fn value(&self, entity_id: &str, field_id: &str) -> Option<&FieldValue> {
        self.points
            .get(&(entity_id.to_string(), field_id.to_string()))
    }
    pub fn numeric_value(&self, entity_id: &str, field_id: &str) -> Option<f64> {
        self.value(entity_id, field_id).and_then(FieldValue::as_number)
    }
    pub fn text_value(&self, entity_id: &str, field_id: &str) -> Option<&str> {
        self.value(entity_id, field_id).and_then(FieldValue::as_text)
    }
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.id == id)
    }
    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }
}
pub fn select(
    dataset: &Dataset,
    selection: &Selection,
    filters: &FilterSpec,
    config: &SelectionConfig,
) -> Result<FilteredDataset> {
    let metrics = resolve_metrics(dataset, &selection.metric_ids, config)?;
    let dimensions = resolve_dimensions(dataset, &selection.dimension_ids)?;
    let entities = resolve_entities(dataset, &selection.entity_ids, config)?;
    for (dimension_id, range) in &filters.ranges {
        dataset.require_dimension(dimension_id)?;
        if range.min > range.max {
            return Err(PipelineError::Config(ConfigError::InvalidFilterRange {
                dimension: dimension_id.clone(),
                min: range.min,
                max: range.max,
            }));
        }
    }
    for dimension_id in filters.categories.keys() {
        dataset.require_dimension(dimension_id)?;
    }
    // Always recomputed from the full dataset; input order is preserved and
    // sorting is a later stage.
    let surviving: Vec<Entity> = entities
        .into_iter()
        .filter(|entity| matches_search(entity, filters.search.as_deref()))
        .filter(|entity| passes_filters(dataset, entity, filters))
        .collect();
    debug!(
        entities = surviving.len(),
        metrics = metrics.len(),
        dimensions = dimensions.len(),
        "selection resolved"
    );
    let mut points = HashMap::new();
    for entity in &surviving {
        for metric in &metrics {
            if let Some(value) = dataset.value(&entity.id, &metric.id) {
                points.insert((entity.id.clone(), metric.id.clone()), value.clone());
            }
        }
        for dimension in &dimensions {
            if let Some(value) = dataset.value(&entity.id, &dimension.id) {
                points.insert((entity.id.clone(), dimension.id.clone()), value.clone());
            }
        }
    }
    Ok(FilteredDataset {
        dataset_id: dataset.id(),
        entities: surviving,
        metrics,
        dimensions,
        points,
    })
}
fn resolve_metrics(
    dataset: &Dataset,
    metric_ids: &[String],
    config: &SelectionConfig,
) -> Result<Vec<Metric>> {
    if metric_ids.is_empty() {
        return Ok(dataset
            .metrics()
            .iter()
            .take(config.default_metric_count)
            .cloned()
            .collect());
    }
    metric_ids
        .iter()
        .map(|id| {
            dataset
                .require_metric(id)
                .map(Metric::clone)
                .map_err(PipelineError::from)
        })
        .collect()
}
fn resolve_dimensions(dataset: &Dataset, dimension_ids: &[String]) -> Result<Vec<Dimension>> {
    if dimension_ids.is_empty() {
        return Ok(dataset.dimensions().to_vec());
    }
    dimension_ids
        .iter()
        .map(|id| {
            dataset
                .require_dimension(id)
                .map(Dimension::clone)
                .map_err(PipelineError::from)
        })
        .collect()
}
fn resolve_entities(
    dataset: &Dataset,
    entity_ids: &[String],
    config: &SelectionConfig,
) -> Result<Vec<Entity>> {
    if entity_ids.is_empty() {
        return Ok(dataset
            .entities()
            .iter()
            .take(config.default_entity_count)
            .cloned()
            .collect());
    }
    for id in entity_ids {
        dataset.require_entity(id)?;
    }
    // Selection membership drives inclusion; the dataset drives order.
    Ok(dataset
        .entities()
        .iter()
        .filter(|entity| entity_ids.contains(&entity.id))
        .cloned()
        .collect())
}
fn matches_search(entity: &Entity, search: Option<&str>) -> bool {
    let term = match search {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return true,
    };
    entity.name.to_lowercase().contains(&term)
        || entity.category.to_lowercase().contains(&term)
        || entity.id.to_lowercase().contains(&term)
}
fn passes_filters(dataset: &Dataset, entity: &Entity, filters: &FilterSpec) -> bool {
    for (dimension_id, range) in &filters.ranges {
        match dataset.numeric_value(&entity.id, dimension_id) {
            Some(value) if range.contains(value) => {}
            _ => return false,
        }
    }
    for (dimension_id, allowed) in &filters.categories {
        match dataset.value(&entity.id, dimension_id).and_then(FieldValue::as_text) {
            Some(value) if allowed.iter().any(|a| a == value) => {}
            _ => return false,
        }
    }
    true
}
