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

pub mod adapters;
pub mod colour;
pub mod error;
pub mod format;
pub mod normalise;
pub mod schema;
pub mod select;
pub mod sort;
pub mod view;

pub use adapters::{
    CellAggregation, FlowRecord, GridCell, HeatmapCell, HeatmapShape, NormalisationDomain,
    ParallelAxis, ParallelRow, ParallelShape, RadarRow, RadarShape, SankeyColourMode, SankeyLink,
    SankeyNode, SankeyShape, SeriesPoint, SmallMultiplesShape, TableColumn, TableRow, TableShape,
    CONSERVATION_EPSILON, DEFAULT_CELL_AGGREGATION,
};
pub use colour::{colour_for, ColourAssignment, ColourScheme, ColourToken, Palette, SchemeKind};
pub use error::{
    AdapterError, ConfigError, ErrorSeverity, PipelineError, Result, SchemaError,
};
pub use format::{format_optional, format_value, MISSING_VALUE};
pub use normalise::{
    normalise, MetricExtent, NormaliseMode, NormalisedDataset, NormalisedValue,
    DEGENERATE_MIDPOINT, NORMALISED_SCALE,
};
pub use schema::{
    DataPoint, Dataset, DatasetId, Dimension, DisplayFormat, Entity, FieldDomain, FieldValue,
    LoadState, Metric, SourcePayload, ValueKind,
};
pub use select::{
    select, FilterSpec, FilteredDataset, RangeFilter, Selection, SelectionConfig,
    DEFAULT_ENTITY_COUNT, DEFAULT_METRIC_COUNT,
};
pub use sort::{sort_entities, SortDirection, SortKey, SortSpec};
pub use view::{
    compute, AdapterFailure, HeatmapRequest, RenderCache, RenderModel, SankeyRequest,
    SmallMultiplesRequest, ViewState,
};

pub struct AnalyticsPipeline {
    config: SelectionConfig,
    cache: RenderCache,
}
impl AnalyticsPipeline {
    pub fn new() -> Self {
        Self {
            config: SelectionConfig::default(),
            cache: RenderCache::new(),
        }
    }
    pub fn with_config(config: SelectionConfig) -> Result<Self> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            config,
            cache: RenderCache::new(),
        })
    }
    pub fn render(&mut self, dataset: &Dataset, view: &ViewState) -> Result<RenderModel> {
        self.cache.get_or_compute(dataset, view, &self.config)
    }
    pub fn render_uncached(&self, dataset: &Dataset, view: &ViewState) -> Result<RenderModel> {
        compute(dataset, view, &self.config)
    }
    pub fn export_json(model: &RenderModel) -> Result<String> {
        model.to_json()
    }
    pub fn invalidate(&mut self, dataset_id: DatasetId) {
        self.cache.invalidate(dataset_id);
    }
    pub fn cache_hit_ratio(&self) -> f64 {
        self.cache.hit_ratio()
    }
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }
}
impl Default for AnalyticsPipeline {
    fn default() -> Self {
        Self::new()
    }
}
