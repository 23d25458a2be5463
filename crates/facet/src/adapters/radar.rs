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
use crate::colour::ColourToken;
use crate::error::Result;
use crate::sort::sort_entities;
use serde::Serialize;
use std::collections::HashMap;
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadarRow {
    pub metric_id: String,
    pub subject: String,
    pub values: HashMap<String, Option<f64>>,
    pub originals: HashMap<String, f64>,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadarShape {
    pub rows: Vec<RadarRow>,
    pub series: Vec<String>,
    pub labels: HashMap<String, String>,
    pub series_colours: HashMap<String, ColourToken>,
}
impl RadarShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
pub fn build(inputs: AdapterInputs<'_>) -> Result<RadarShape> {
    let filtered = inputs.filtered;
    if filtered.entities.is_empty() || filtered.metrics.is_empty() {
        return Ok(RadarShape::empty());
    }
    let ordered = sort_entities(filtered, inputs.sort)?;
    let series: Vec<String> = ordered.iter().map(|e| e.id.clone()).collect();
    // Entity ids key the row values; names live in a separate label table so
    // renderers never build property names out of display strings.
    let labels: HashMap<String, String> = ordered
        .iter()
        .map(|e| (e.id.clone(), e.name.clone()))
        .collect();
    let series_colours: HashMap<String, ColourToken> = series
        .iter()
        .map(|id| (id.clone(), inputs.colours.colour_or_fallback(id)))
        .collect();
    let rows = filtered
        .metrics
        .iter()
        .map(|metric| {
            let mut values = HashMap::with_capacity(series.len());
            let mut originals = HashMap::new();
            for entity_id in &series {
                let value = inputs.normalised.value(entity_id, &metric.id);
                values.insert(entity_id.clone(), value.map(|v| v.scaled));
                if let Some(v) = value {
                    originals.insert(entity_id.clone(), v.original);
                }
            }
            RadarRow {
                metric_id: metric.id.clone(),
                subject: metric.label.clone(),
                values,
                originals,
            }
        })
        .collect();
    Ok(RadarShape {
        rows,
        series,
        labels,
        series_colours,
    })
}
