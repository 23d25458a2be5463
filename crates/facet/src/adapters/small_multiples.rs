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

use crate::adapters::AdapterInputs;
use crate::colour::{ColourAssignment, ColourToken, Palette};
use crate::error::{AdapterError, PipelineError, Result};
use crate::normalise::{MetricExtent, DEGENERATE_MIDPOINT};
use crate::schema::FieldValue;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalisationDomain {
    PerCell,
    Global,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub entity_id: String,
    pub label: String,
    pub value: Option<f64>,
    pub scaled: Option<f64>,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub segment: String,
    pub metric_id: String,
    pub metric_label: String,
    pub points: Vec<SeriesPoint>,
    pub domain_min: f64,
    pub domain_max: f64,
    pub colour: ColourToken,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmallMultiplesShape {
    pub segments: Vec<String>,
    pub metric_ids: Vec<String>,
    pub cells: Vec<GridCell>,
    pub domain: Option<NormalisationDomain>,
}
impl SmallMultiplesShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn cell(&self, segment: &str, metric_id: &str) -> Option<&GridCell> {
        self.cells
            .iter()
            .find(|c| c.segment == segment && c.metric_id == metric_id)
    }
}
pub fn build(
    inputs: AdapterInputs<'_>,
    segment_dimension: &str,
    domain: NormalisationDomain,
) -> Result<SmallMultiplesShape> {
    let filtered = inputs.filtered;
    let dimension = filtered.dimension(segment_dimension).ok_or_else(|| {
        PipelineError::Schema(crate::error::SchemaError::UnknownDimension {
            id: segment_dimension.to_string(),
        })
    })?;
    if dimension.kind.is_numeric() {
        return Err(PipelineError::Adapter(AdapterError::NumericSegment {
            dimension: segment_dimension.to_string(),
        }));
    }
    if filtered.entities.is_empty() || filtered.metrics.is_empty() {
        return Ok(SmallMultiplesShape::empty());
    }
    let segments: Vec<String> = filtered
        .entities
        .iter()
        .filter_map(|entity| segment_of(filtered, &entity.id, segment_dimension))
        .unique()
        .collect();
    if segments.is_empty() {
        return Ok(SmallMultiplesShape::empty());
    }
    let segment_colours = ColourAssignment::new(&segments, Palette::Standard);
    let mut cells = Vec::with_capacity(segments.len() * filtered.metrics.len());
    for segment in &segments {
        for metric in &filtered.metrics {
            let members: Vec<&crate::schema::Entity> = filtered
                .entities
                .iter()
                .filter(|entity| {
                    segment_of(filtered, &entity.id, segment_dimension).as_deref()
                        == Some(segment.as_str())
                })
                .collect();
            // Global shares one scale per metric across every segment;
            // per-cell rescales inside each segment independently.
            let extent = match domain {
                NormalisationDomain::Global => inputs.normalised.extent(&metric.id),
                NormalisationDomain::PerCell => cell_extent(filtered, &members, &metric.id),
            };
            let points: Vec<SeriesPoint> = members
                .iter()
                .map(|entity| {
                    let value = filtered.numeric_value(&entity.id, &metric.id);
                    let scaled = value.map(|v| {
                        extent.map_or(DEGENERATE_MIDPOINT, |e| e.scale(v))
                    });
                    SeriesPoint {
                        entity_id: entity.id.clone(),
                        label: entity.name.clone(),
                        value,
                        scaled,
                    }
                })
                .collect();
            let (domain_min, domain_max) = extent.map_or((0.0, 0.0), |e| (e.min, e.max));
            cells.push(GridCell {
                segment: segment.clone(),
                metric_id: metric.id.clone(),
                metric_label: metric.label.clone(),
                points,
                domain_min,
                domain_max,
                colour: segment_colours.colour_or_fallback(segment),
            });
        }
    }
    Ok(SmallMultiplesShape {
        segments,
        metric_ids: filtered.metrics.iter().map(|m| m.id.clone()).collect(),
        cells,
        domain: Some(domain),
    })
}
fn segment_of(
    filtered: &crate::select::FilteredDataset,
    entity_id: &str,
    dimension_id: &str,
) -> Option<String> {
    match filtered.value(entity_id, dimension_id)? {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Number(v) => Some(v.to_string()),
        FieldValue::Timestamp(t) => Some(t.format("%Y-%m-%d").to_string()),
    }
}
fn cell_extent(
    filtered: &crate::select::FilteredDataset,
    members: &[&crate::schema::Entity],
    metric_id: &str,
) -> Option<MetricExtent> {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|entity| filtered.numeric_value(&entity.id, metric_id))
        .collect();
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(MetricExtent { min, max })
}
