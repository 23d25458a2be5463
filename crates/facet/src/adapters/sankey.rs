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
use crate::error::{AdapterError, AdapterResult, PipelineError, Result};
use crate::schema::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
pub const CONSERVATION_EPSILON: f64 = 1e-6;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SankeyColourMode {
    ByCategory,
    ByValue,
    BySource,
    ByTarget,
}
impl Default for SankeyColourMode {
    fn default() -> Self {
        SankeyColourMode::ByCategory
    }
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub colour: ColourToken,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub colour: ColourToken,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyShape {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}
impl SankeyShape {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    // A node's declared value must equal the sum of its outgoing link
    // values; a mismatch is surfaced, never silently corrected.
    pub fn validate_conservation(&self) -> AdapterResult<()> {
        for node in &self.nodes {
            let linked: f64 = self
                .links
                .iter()
                .filter(|link| link.source == node.id)
                .map(|link| link.value)
                .sum();
            let has_outgoing = self.links.iter().any(|link| link.source == node.id);
            if has_outgoing && (node.value - linked).abs() > CONSERVATION_EPSILON {
                return Err(AdapterError::ConservationViolation {
                    node: node.id.clone(),
                    declared: node.value,
                    linked,
                });
            }
        }
        Ok(())
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source: String,
    pub target: String,
    pub value: f64,
}
pub fn from_flows(
    nodes: Vec<(String, f64)>,
    flows: Vec<FlowRecord>,
    colour_mode: SankeyColourMode,
) -> Result<SankeyShape> {
    let links: Vec<SankeyLink> = flows
        .into_iter()
        .map(|flow| SankeyLink {
            source: flow.source,
            target: flow.target,
            value: flow.value,
            colour: String::new(),
        })
        .collect();
    let nodes: Vec<SankeyNode> = nodes
        .into_iter()
        .map(|(id, value)| SankeyNode {
            label: humanise_node_id(&id),
            id,
            value,
            colour: String::new(),
        })
        .collect();
    let mut shape = SankeyShape { nodes, links };
    shape.validate_conservation().map_err(PipelineError::from)?;
    apply_colours(&mut shape, colour_mode);
    Ok(shape)
}
pub fn build(
    inputs: AdapterInputs<'_>,
    source_dimension: &str,
    target_dimension: &str,
    metric_id: &str,
    colour_mode: SankeyColourMode,
) -> Result<SankeyShape> {
    let filtered = inputs.filtered;
    for dimension_id in [source_dimension, target_dimension] {
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
        return Ok(SankeyShape::empty());
    }
    // Node ids are prefixed with their dimension so the two stages of the
    // flow can share a category value without colliding.
    let mut link_weights: HashMap<(String, String), f64> = HashMap::new();
    let mut link_order: Vec<(String, String)> = Vec::new();
    for entity in &filtered.entities {
        let Some(source) = stage_value(filtered, &entity.id, source_dimension) else {
            continue;
        };
        let Some(target) = stage_value(filtered, &entity.id, target_dimension) else {
            continue;
        };
        let Some(value) = filtered.numeric_value(&entity.id, metric_id) else {
            continue;
        };
        let source_id = format!("{source_dimension}_{source}");
        let target_id = format!("{target_dimension}_{target}");
        let key = (source_id, target_id);
        if !link_weights.contains_key(&key) {
            link_order.push(key.clone());
        }
        *link_weights.entry(key).or_insert(0.0) += value;
    }
    if link_order.is_empty() {
        return Ok(SankeyShape::empty());
    }
    let links: Vec<SankeyLink> = link_order
        .iter()
        .map(|key| SankeyLink {
            source: key.0.clone(),
            target: key.1.clone(),
            value: link_weights[key],
            colour: String::new(),
        })
        .collect();
    let mut node_values: HashMap<String, f64> = HashMap::new();
    let mut node_order: Vec<String> = Vec::new();
    for link in &links {
        for id in [&link.source, &link.target] {
            if !node_values.contains_key(id.as_str()) {
                node_order.push(id.clone());
                node_values.insert(id.clone(), 0.0);
            }
        }
        // Source nodes are valued by their outgoing flow; pure sinks by
        // what arrives.
        *node_values.get_mut(&link.source).expect("node registered") += link.value;
    }
    for link in &links {
        let is_source_elsewhere = links.iter().any(|l| l.source == link.target);
        if !is_source_elsewhere {
            *node_values.get_mut(&link.target).expect("node registered") += link.value;
        }
    }
    let nodes: Vec<SankeyNode> = node_order
        .into_iter()
        .map(|id| SankeyNode {
            label: humanise_node_id(&id),
            value: node_values[&id],
            id,
            colour: String::new(),
        })
        .collect();
    let mut shape = SankeyShape { nodes, links };
    shape.validate_conservation().map_err(PipelineError::from)?;
    apply_colours(&mut shape, colour_mode);
    Ok(shape)
}
fn stage_value(
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
// 'acquisition_social' renders as "Social".
pub fn humanise_node_id(id: &str) -> String {
    let raw: Vec<&str> = id.split('_').skip(1).collect();
    raw.iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
fn category_colour(id: &str) -> ColourToken {
    let category = id.split('_').next().unwrap_or_default();
    let colour = match category {
        "acquisition" => "#1976D2",
        "deposit" => "#9C27B0",
        "game" => "#2E7D32",
        "country" => "#0288D1",
        "player" | "segment" => "#ED6C02",
        "device" => "#03A9F4",
        "churn" => "#D32F2F",
        _ => crate::colour::FALLBACK_COLOUR,
    };
    colour.to_string()
}
fn value_colour(value: f64, max: f64, floor: f64, span: f64) -> ColourToken {
    let intensity = if max > 0.0 { value / max } else { 0.0 };
    format!("rgba(33, 150, 243, {:.2})", floor + intensity * span)
}
fn apply_colours(shape: &mut SankeyShape, mode: SankeyColourMode) {
    let max_node = shape.nodes.iter().map(|n| n.value).fold(0.0, f64::max);
    let max_link = shape.links.iter().map(|l| l.value).fold(0.0, f64::max);
    let node_colours: HashMap<String, ColourToken> = shape
        .nodes
        .iter()
        .map(|node| {
            let has_outgoing = shape.links.iter().any(|l| l.source == node.id);
            let colour = match mode {
                SankeyColourMode::ByCategory => category_colour(&node.id),
                SankeyColourMode::ByValue => value_colour(node.value, max_node, 0.5, 0.5),
                SankeyColourMode::BySource | SankeyColourMode::ByTarget => {
                    if has_outgoing {
                        "#1976D2".to_string()
                    } else {
                        "#9C27B0".to_string()
                    }
                }
            };
            (node.id.clone(), colour)
        })
        .collect();
    for node in &mut shape.nodes {
        node.colour = node_colours[&node.id].clone();
    }
    for link in &mut shape.links {
        link.colour = match mode {
            SankeyColourMode::ByCategory | SankeyColourMode::BySource => {
                node_colours[&link.source].clone()
            }
            SankeyColourMode::ByTarget => node_colours[&link.target].clone(),
            SankeyColourMode::ByValue => value_colour(link.value, max_link, 0.2, 0.6),
        };
    }
}
