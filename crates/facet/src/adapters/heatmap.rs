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
use crate::colour::{ColourScheme, ColourToken};
use crate::error::{AdapterError, PipelineError, Result};
use crate::schema::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellAggregation {
    Sum,
    Average,
    Count,
}
// Production fallback when a collision occurs without a declared rule.
pub const DEFAULT_CELL_AGGREGATION: CellAggregation = CellAggregation::Sum;
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub row: String,
    pub column: String,
    pub value: f64,
    pub samples: usize,
    pub colour: ColourToken,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapShape {
    pub metric_id: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<HeatmapCell>,
    pub min: f64,
    pub max: f64,
    pub aggregation: Option<CellAggregation>,
}
impl HeatmapShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn cell(&self, row: &str, column: &str) -> Option<&HeatmapCell> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
    }
}
pub fn build(
    inputs: AdapterInputs<'_>,
    primary_dimension: &str,
    secondary_dimension: &str,
    metric_id: &str,
    aggregation: Option<CellAggregation>,
    scheme: ColourScheme,
    invert: bool,
) -> Result<HeatmapShape> {
    let filtered = inputs.filtered;
    if primary_dimension == secondary_dimension {
        return Err(PipelineError::Adapter(AdapterError::DuplicateHeatmapAxes {
            dimension: primary_dimension.to_string(),
        }));
    }
    for dimension_id in [primary_dimension, secondary_dimension] {
        if filtered.dimension(dimension_id).is_none() {
            return Err(PipelineError::Schema(
                crate::error::SchemaError::UnknownDimension {
                    id: dimension_id.to_string(),
                },
            ));
        }
    }
    if filtered.metric(metric_id).is_none() {
        return Err(PipelineError::Schema(
            crate::error::SchemaError::UnknownMetric {
                id: metric_id.to_string(),
            },
        ));
    }
    if filtered.entities.is_empty() {
        return Ok(HeatmapShape::empty());
    }
    let mut buckets: HashMap<(String, String), (f64, usize)> = HashMap::new();
    let mut row_order: Vec<String> = Vec::new();
    let mut column_order: Vec<String> = Vec::new();
    for entity in &filtered.entities {
        let Some(row) = dimension_label(filtered, &entity.id, primary_dimension) else {
            continue;
        };
        let Some(column) = dimension_label(filtered, &entity.id, secondary_dimension) else {
            continue;
        };
        let Some(value) = filtered.numeric_value(&entity.id, metric_id) else {
            continue;
        };
        if !row_order.contains(&row) {
            row_order.push(row.clone());
        }
        if !column_order.contains(&column) {
            column_order.push(column.clone());
        }
        let bucket = buckets.entry((row, column)).or_insert((0.0, 0));
        bucket.0 += value;
        bucket.1 += 1;
    }
    if buckets.is_empty() {
        return Ok(HeatmapShape::empty());
    }
    let collisions = buckets.values().filter(|(_, count)| *count > 1).count();
    let rule = match aggregation {
        Some(rule) => rule,
        None if collisions > 0 => {
            // A colliding cell with no declared rule is an authoring error.
            debug_assert!(
                false,
                "heatmap cell collision without a declared aggregation rule"
            );
            warn!(
                collisions,
                "heatmap cells collided without a declared aggregation rule; using the default"
            );
            DEFAULT_CELL_AGGREGATION
        }
        None => DEFAULT_CELL_AGGREGATION,
    };
    let mut cells: Vec<HeatmapCell> = buckets
        .into_iter()
        .map(|((row, column), (sum, count))| {
            let value = match rule {
                CellAggregation::Sum => sum,
                CellAggregation::Average => sum / count as f64,
                CellAggregation::Count => count as f64,
            };
            HeatmapCell {
                row,
                column,
                value,
                samples: count,
                colour: String::new(),
            }
        })
        .collect();
    cells.sort_by(|a, b| {
        let row_rank = |c: &HeatmapCell| row_order.iter().position(|r| *r == c.row);
        let col_rank = |c: &HeatmapCell| column_order.iter().position(|x| *x == c.column);
        row_rank(a)
            .cmp(&row_rank(b))
            .then(col_rank(a).cmp(&col_rank(b)))
    });
    let min = cells.iter().map(|c| c.value).fold(f64::INFINITY, f64::min);
    let max = cells
        .iter()
        .map(|c| c.value)
        .fold(f64::NEG_INFINITY, f64::max);
    for cell in &mut cells {
        let t = if max > min {
            (cell.value - min) / (max - min)
        } else {
            0.5
        };
        cell.colour = scheme.sample(t, invert);
    }
    Ok(HeatmapShape {
        metric_id: metric_id.to_string(),
        rows: row_order,
        columns: column_order,
        cells,
        min,
        max,
        aggregation: Some(rule),
    })
}
fn dimension_label(
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
