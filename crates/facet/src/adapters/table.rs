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
use crate::error::Result;
use crate::format::format_optional;
use crate::schema::DisplayFormat;
use crate::sort::sort_entities;
use serde::Serialize;
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub id: String,
    pub label: String,
    pub format: DisplayFormat,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub entity_id: String,
    pub name: String,
    pub category: String,
    pub cells: Vec<Option<f64>>,
    pub formatted: Vec<String>,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableShape {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}
impl TableShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
pub fn build(inputs: AdapterInputs<'_>) -> Result<TableShape> {
    let filtered = inputs.filtered;
    if filtered.entities.is_empty() || filtered.metrics.is_empty() {
        return Ok(TableShape::empty());
    }
    let ordered = sort_entities(filtered, inputs.sort)?;
    let columns: Vec<TableColumn> = filtered
        .metrics
        .iter()
        .map(|metric| TableColumn {
            id: metric.id.clone(),
            label: metric.label.clone(),
            format: metric.format,
        })
        .collect();
    let rows = ordered
        .iter()
        .map(|entity| {
            let cells: Vec<Option<f64>> = columns
                .iter()
                .map(|column| inputs.normalised.original(&entity.id, &column.id))
                .collect();
            let formatted = columns
                .iter()
                .zip(&cells)
                .map(|(column, cell)| format_optional(*cell, column.format))
                .collect();
            TableRow {
                entity_id: entity.id.clone(),
                name: entity.name.clone(),
                category: entity.category.clone(),
                cells,
                formatted,
            }
        })
        .collect();
    Ok(TableShape { columns, rows })
}
