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

use crate::adapters::{
    heatmap, parallel, radar, sankey, small_multiples, table, AdapterInputs, CellAggregation,
    HeatmapShape, NormalisationDomain, ParallelShape, RadarShape, SankeyColourMode, SankeyShape,
    SmallMultiplesShape, TableShape,
};
use crate::colour::{ColourAssignment, ColourScheme, Palette};
use crate::error::Result;
use crate::normalise::{normalise, NormaliseMode};
use crate::schema::{Dataset, DatasetId};
use crate::select::{select, FilterSpec, Selection, SelectionConfig};
use crate::sort::{sort_entities, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRequest {
    pub primary: String,
    pub secondary: String,
    pub metric: String,
    pub aggregation: Option<CellAggregation>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyRequest {
    pub source: String,
    pub target: String,
    pub metric: String,
    #[serde(default)]
    pub colour_mode: SankeyColourMode,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallMultiplesRequest {
    pub segment_dimension: String,
    pub domain: NormalisationDomain,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub sort: SortSpec,
    pub normalise_mode: NormaliseMode,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub colour_scheme: ColourScheme,
    #[serde(default)]
    pub invert_scheme: bool,
    #[serde(default)]
    pub colour_by: Option<String>,
    #[serde(default)]
    pub heatmap: Option<HeatmapRequest>,
    #[serde(default)]
    pub sankey: Option<SankeyRequest>,
    #[serde(default)]
    pub small_multiples: Option<SmallMultiplesRequest>,
}
impl Default for ViewState {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            filters: FilterSpec::default(),
            sort: SortSpec::default(),
            normalise_mode: NormaliseMode::Normalised,
            palette: Palette::Standard,
            colour_scheme: ColourScheme::default(),
            invert_scheme: false,
            colour_by: None,
            heatmap: None,
            sankey: None,
            small_multiples: None,
        }
    }
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterFailure {
    pub adapter: &'static str,
    pub message: String,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderModel {
    pub entity_count: usize,
    pub legend: Vec<(String, String)>,
    pub radar: RadarShape,
    pub parallel: ParallelShape,
    pub table: TableShape,
    pub heatmap: Option<HeatmapShape>,
    pub sankey: Option<SankeyShape>,
    pub small_multiples: Option<SmallMultiplesShape>,
    pub failures: Vec<AdapterFailure>,
}
impl RenderModel {
    pub fn is_empty(&self) -> bool {
        self.entity_count == 0
    }
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}
// One pure pass: registry → selection/filter → normalise → colour → sort →
// adapters. A failing adapter is recorded and the rest still render.
pub fn compute(dataset: &Dataset, view: &ViewState, config: &SelectionConfig) -> Result<RenderModel> {
    let filtered = select(dataset, &view.selection, &view.filters, config)?;
    let normalised = normalise(&filtered, view.normalise_mode);
    let ordered = sort_entities(&filtered, &view.sort)?;
    let entity_keys: Vec<String> = ordered.iter().map(|e| e.id.clone()).collect();
    let colours = ColourAssignment::new(&entity_keys, view.palette);
    let inputs = AdapterInputs {
        filtered: &filtered,
        normalised: &normalised,
        colours: &colours,
        sort: &view.sort,
    };
    let mut model = RenderModel {
        entity_count: filtered.entities.len(),
        legend: colours
            .legend()
            .into_iter()
            .map(|(id, colour)| {
                let label = filtered
                    .entities
                    .iter()
                    .find(|e| e.id == id)
                    .map_or_else(|| id.clone(), |e| e.name.clone());
                (label, colour)
            })
            .collect(),
        ..RenderModel::default()
    };
    match radar::build(inputs) {
        Ok(shape) => model.radar = shape,
        Err(e) => record_failure(&mut model, "radar", &e),
    }
    match parallel::build(
        inputs,
        view.colour_by.as_deref(),
        view.colour_scheme,
        view.invert_scheme,
    ) {
        Ok(shape) => model.parallel = shape,
        Err(e) => record_failure(&mut model, "parallel_coordinates", &e),
    }
    match table::build(inputs) {
        Ok(shape) => model.table = shape,
        Err(e) => record_failure(&mut model, "table", &e),
    }
    if let Some(request) = &view.heatmap {
        match heatmap::build(
            inputs,
            &request.primary,
            &request.secondary,
            &request.metric,
            request.aggregation,
            view.colour_scheme,
            view.invert_scheme,
        ) {
            Ok(shape) => model.heatmap = Some(shape),
            Err(e) => record_failure(&mut model, "heatmap", &e),
        }
    }
    if let Some(request) = &view.sankey {
        match sankey::build(
            inputs,
            &request.source,
            &request.target,
            &request.metric,
            request.colour_mode,
        ) {
            Ok(shape) => model.sankey = Some(shape),
            Err(e) => record_failure(&mut model, "sankey", &e),
        }
    }
    if let Some(request) = &view.small_multiples {
        match small_multiples::build(inputs, &request.segment_dimension, request.domain) {
            Ok(shape) => model.small_multiples = Some(shape),
            Err(e) => record_failure(&mut model, "small_multiples", &e),
        }
    }
    Ok(model)
}
fn record_failure(model: &mut RenderModel, adapter: &'static str, error: &crate::error::PipelineError) {
    warn!(adapter, %error, "adapter failed; siblings continue");
    model.failures.push(AdapterFailure {
        adapter,
        message: error.to_string(),
    });
}
pub struct RenderCache {
    entries: HashMap<(DatasetId, String), RenderModel>,
    hits: usize,
    misses: usize,
}
impl RenderCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
    // Keyed by dataset identity plus the canonical view-state encoding, so
    // unrelated UI changes never force a recompute.
    pub fn get_or_compute(
        &mut self,
        dataset: &Dataset,
        view: &ViewState,
        config: &SelectionConfig,
    ) -> Result<RenderModel> {
        let key = (dataset.id(), serde_json::to_string(view)?);
        if let Some(model) = self.entries.get(&key) {
            self.hits += 1;
            debug!(dataset = %dataset.id(), "render cache hit");
            return Ok(model.clone());
        }
        self.misses += 1;
        let model = compute(dataset, view, config)?;
        self.entries.insert(key, model.clone());
        Ok(model)
    }
    pub fn invalidate(&mut self, dataset_id: DatasetId) {
        self.entries.retain(|(id, _), _| *id != dataset_id);
    }
    pub fn clear(&mut self) {
        self.entries.clear();
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn hit_ratio(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}
impl Default for RenderCache {
    fn default() -> Self {
        Self::new()
    }
}
