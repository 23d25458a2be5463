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
use crate::colour::{ColourAssignment, ColourScheme, ColourToken, FALLBACK_COLOUR};
use crate::error::Result;
use crate::schema::DisplayFormat;
use crate::sort::sort_entities;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelAxis {
    pub field_id: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub format: DisplayFormat,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelRow {
    pub entity_id: String,
    pub name: String,
    pub values: HashMap<String, Option<f64>>,
    pub colour: ColourToken,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParallelShape {
    pub axes: Vec<ParallelAxis>,
    pub rows: Vec<ParallelRow>,
    pub colour_by: Option<String>,
}
impl ParallelShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.axes.is_empty()
    }
}
pub fn build(
    inputs: AdapterInputs<'_>,
    colour_by: Option<&str>,
    scheme: ColourScheme,
    invert: bool,
) -> Result<ParallelShape> {
    let filtered = inputs.filtered;
    if filtered.entities.is_empty() {
        return Ok(ParallelShape::empty());
    }
    let ordered = sort_entities(filtered, inputs.sort)?;
    // Each axis keeps its own domain; axes are never cross-normalised.
    let mut axes = Vec::new();
    for dimension in &filtered.dimensions {
        if !dimension.kind.is_numeric() {
            debug!(dimension = %dimension.id, "skipping non-numeric axis");
            continue;
        }
        if let Some((min, max)) = axis_domain(filtered, &ordered, &dimension.id) {
            axes.push(ParallelAxis {
                field_id: dimension.id.clone(),
                label: dimension.label.clone(),
                min,
                max,
                format: dimension.format,
            });
        }
    }
    for metric in &filtered.metrics {
        if let Some((min, max)) = axis_domain(filtered, &ordered, &metric.id) {
            axes.push(ParallelAxis {
                field_id: metric.id.clone(),
                label: metric.label.clone(),
                min,
                max,
                format: metric.format,
            });
        }
    }
    if axes.is_empty() {
        return Ok(ParallelShape::empty());
    }
    // Without a colour-by field the pass-wide assignment colours the rows.
    let row_colours = match colour_by {
        None => ordered
            .iter()
            .map(|entity| {
                (
                    entity.id.clone(),
                    inputs.colours.colour_or_fallback(&entity.id),
                )
            })
            .collect(),
        Some(field_id) => colour_rows(filtered, &ordered, &axes, field_id, scheme, invert),
    };
    let rows = ordered
        .iter()
        .map(|entity| {
            let values = axes
                .iter()
                .map(|axis| {
                    (
                        axis.field_id.clone(),
                        filtered.numeric_value(&entity.id, &axis.field_id),
                    )
                })
                .collect();
            ParallelRow {
                entity_id: entity.id.clone(),
                name: entity.name.clone(),
                values,
                colour: row_colours
                    .get(&entity.id)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_COLOUR.to_string()),
            }
        })
        .collect();
    Ok(ParallelShape {
        axes,
        rows,
        colour_by: colour_by.map(str::to_string),
    })
}
fn axis_domain(
    filtered: &crate::select::FilteredDataset,
    entities: &[crate::schema::Entity],
    field_id: &str,
) -> Option<(f64, f64)> {
    let values: Vec<f64> = entities
        .iter()
        .filter_map(|entity| filtered.numeric_value(&entity.id, field_id))
        .collect();
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}
fn colour_rows(
    filtered: &crate::select::FilteredDataset,
    entities: &[crate::schema::Entity],
    axes: &[ParallelAxis],
    field_id: &str,
    scheme: ColourScheme,
    invert: bool,
) -> HashMap<String, ColourToken> {
    let categorical = filtered
        .dimension(field_id)
        .is_some_and(|d| d.kind.is_categorical());
    if categorical {
        let categories: Vec<String> = entities
            .iter()
            .filter_map(|entity| filtered.text_value(&entity.id, field_id))
            .map(str::to_string)
            .unique()
            .collect();
        let assignment =
            ColourAssignment::new(&categories, crate::colour::Palette::Standard);
        return entities
            .iter()
            .map(|entity| {
                let colour = filtered
                    .text_value(&entity.id, field_id)
                    .map_or_else(|| FALLBACK_COLOUR.to_string(), |c| {
                        assignment.colour_or_fallback(c)
                    });
                (entity.id.clone(), colour)
            })
            .collect();
    }
    let domain = axes
        .iter()
        .find(|axis| axis.field_id == field_id)
        .map(|axis| (axis.min, axis.max))
        .or_else(|| axis_domain(filtered, entities, field_id));
    entities
        .iter()
        .map(|entity| {
            let colour = match (filtered.numeric_value(&entity.id, field_id), domain) {
                (Some(value), Some((min, max))) => {
                    let t = if max > min {
                        (value - min) / (max - min)
                    } else {
                        0.5
                    };
                    scheme.sample(t, invert)
                }
                _ => FALLBACK_COLOUR.to_string(),
            };
            (entity.id.clone(), colour)
        })
        .collect()
}
