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

use crate::colour::ColourAssignment;
use crate::normalise::NormalisedDataset;
use crate::select::FilteredDataset;
use crate::sort::SortSpec;
pub mod heatmap;
pub mod parallel;
pub mod radar;
pub mod sankey;
pub mod small_multiples;
pub mod table;
pub use heatmap::{CellAggregation, HeatmapCell, HeatmapShape, DEFAULT_CELL_AGGREGATION};
pub use parallel::{ParallelAxis, ParallelRow, ParallelShape};
pub use radar::{RadarRow, RadarShape};
pub use sankey::{
    FlowRecord, SankeyColourMode, SankeyLink, SankeyNode, SankeyShape, CONSERVATION_EPSILON,
};
pub use small_multiples::{GridCell, NormalisationDomain, SeriesPoint, SmallMultiplesShape};
pub use table::{TableColumn, TableRow, TableShape};
#[derive(Debug, Clone, Copy)]
pub struct AdapterInputs<'a> {
    pub filtered: &'a FilteredDataset,
    pub normalised: &'a NormalisedDataset,
    pub colours: &'a ColourAssignment,
    pub sort: &'a SortSpec,
}
