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

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Entity, FieldValue, ValueKind};
use crate::select::FilteredDataset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}
impl SortDirection {
    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    EntityName,
    EntityCategory,
    Field(String),
}
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}
impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::EntityName,
            direction: SortDirection::Ascending,
        }
    }
}
enum Comparable<'a> {
    Number(f64),
    Text(&'a str),
    Timestamp(chrono::DateTime<chrono::Utc>),
}
impl Comparable<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Comparable::Text(a), Comparable::Text(b)) => a.cmp(b),
            (Comparable::Timestamp(a), Comparable::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}
pub fn sort_entities(filtered: &FilteredDataset, spec: &SortSpec) -> SchemaResult<Vec<Entity>> {
    // The comparison strategy comes from the declared kind, never from
    // whatever value happens to be stored.
    let field_kind = match &spec.key {
        SortKey::EntityName | SortKey::EntityCategory => None,
        SortKey::Field(field_id) => Some(declared_kind(filtered, field_id)?),
    };
    let mut ordered = filtered.entities.clone();
    ordered.sort_by(|a, b| {
        let left = comparable_for(filtered, a, &spec.key, field_kind);
        let right = comparable_for(filtered, b, &spec.key, field_kind);
        match (left, right) {
            // Nulls sort last in either direction; the direction only flips
            // comparisons between present values.
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = l.compare(&r);
                match spec.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
        }
    });
    Ok(ordered)
}
fn declared_kind(filtered: &FilteredDataset, field_id: &str) -> SchemaResult<ValueKind> {
    if filtered.metric(field_id).is_some() {
        return Ok(ValueKind::Numeric);
    }
    filtered
        .dimension(field_id)
        .map(|d| d.kind)
        .ok_or_else(|| SchemaError::UnknownField {
            id: field_id.to_string(),
        })
}
fn comparable_for<'a>(
    filtered: &'a FilteredDataset,
    entity: &'a Entity,
    key: &SortKey,
    field_kind: Option<ValueKind>,
) -> Option<Comparable<'a>> {
    match key {
        SortKey::EntityName => Some(Comparable::Text(&entity.name)),
        SortKey::EntityCategory => Some(Comparable::Text(&entity.category)),
        SortKey::Field(field_id) => {
            let value = filtered.value(&entity.id, field_id)?;
            match field_kind {
                Some(ValueKind::Numeric) => value.as_number().map(Comparable::Number),
                Some(ValueKind::Categorical) => value.as_text().map(Comparable::Text),
                Some(ValueKind::Temporal) => value.as_timestamp().map(Comparable::Timestamp),
                None => None,
            }
        }
    }
}
