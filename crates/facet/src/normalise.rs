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

use crate::select::FilteredDataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
// Every present value of a zero-variance metric lands on the scale midpoint.
pub const DEGENERATE_MIDPOINT: f64 = 50.0;
pub const NORMALISED_SCALE: f64 = 100.0;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormaliseMode {
    Raw,
    Normalised,
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalisedValue {
    pub original: f64,
    pub scaled: f64,
}
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricExtent {
    pub min: f64,
    pub max: f64,
}
impl MetricExtent {
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            DEGENERATE_MIDPOINT
        } else {
            (value - self.min) / (self.max - self.min) * NORMALISED_SCALE
        }
    }
    pub fn unit(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.5
        } else {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }
}
#[derive(Debug, Clone)]
pub struct NormalisedDataset {
    pub mode: NormaliseMode,
    extents: HashMap<String, MetricExtent>,
    values: HashMap<(String, String), NormalisedValue>,
}
impl NormalisedDataset {
    pub fn value(&self, entity_id: &str, metric_id: &str) -> Option<NormalisedValue> {
        self.values
            .get(&(entity_id.to_string(), metric_id.to_string()))
            .copied()
    }
    pub fn scaled(&self, entity_id: &str, metric_id: &str) -> Option<f64> {
        self.value(entity_id, metric_id).map(|v| v.scaled)
    }
    pub fn original(&self, entity_id: &str, metric_id: &str) -> Option<f64> {
        self.value(entity_id, metric_id).map(|v| v.original)
    }
    pub fn extent(&self, metric_id: &str) -> Option<MetricExtent> {
        self.extents.get(metric_id).copied()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
pub fn normalise(filtered: &FilteredDataset, mode: NormaliseMode) -> NormalisedDataset {
    // Min/max only over entities with a present value; missing points stay
    // missing and never contribute a zero.
    let extents: HashMap<String, MetricExtent> = filtered
        .metrics
        .par_iter()
        .filter_map(|metric| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut present = false;
            for entity in &filtered.entities {
                if let Some(value) = filtered.numeric_value(&entity.id, &metric.id) {
                    min = min.min(value);
                    max = max.max(value);
                    present = true;
                }
            }
            present.then(|| (metric.id.clone(), MetricExtent { min, max }))
        })
        .collect();
    let mut values = HashMap::new();
    for entity in &filtered.entities {
        for metric in &filtered.metrics {
            let Some(original) = filtered.numeric_value(&entity.id, &metric.id) else {
                continue;
            };
            let scaled = match mode {
                NormaliseMode::Raw => original,
                NormaliseMode::Normalised => extents
                    .get(&metric.id)
                    .map_or(DEGENERATE_MIDPOINT, |extent| extent.scale(original)),
            };
            values.insert(
                (entity.id.clone(), metric.id.clone()),
                NormalisedValue { original, scaled },
            );
        }
    }
    NormalisedDataset {
        mode,
        extents,
        values,
    }
}
