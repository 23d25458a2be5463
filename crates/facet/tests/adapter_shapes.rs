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

use facet::adapters::{heatmap, parallel, radar, small_multiples, table, AdapterInputs};
use facet::{
    compute, normalise, select, CellAggregation, ColourAssignment, ColourScheme, DataPoint,
    Dataset, Dimension, DisplayFormat, Entity, FieldDomain, FieldValue, FilterSpec,
    HeatmapRequest, Metric, NormalisationDomain, NormaliseMode, Palette, SankeyRequest, Selection,
    SelectionConfig, SmallMultiplesRequest, SortDirection, SortKey, SortSpec, SourcePayload,
    ValueKind, ViewState,
};

fn entity(id: &str, name: &str, category: &str) -> Entity {
    Entity {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        attributes: Default::default(),
    }
}

fn metric(id: &str, label: &str, format: DisplayFormat) -> Metric {
    Metric {
        id: id.to_string(),
        label: label.to_string(),
        format,
    }
}

fn dimension(id: &str, kind: ValueKind) -> Dimension {
    Dimension {
        id: id.to_string(),
        label: id.to_string(),
        kind,
        format: if kind.is_numeric() {
            DisplayFormat::Number
        } else {
            DisplayFormat::Text
        },
        domain: FieldDomain::Open,
    }
}

fn number_point(entity_id: &str, field_id: &str, value: f64) -> DataPoint {
    DataPoint {
        entity_id: entity_id.to_string(),
        field_id: field_id.to_string(),
        value: Some(FieldValue::Number(value)),
    }
}

fn text_point(entity_id: &str, field_id: &str, value: &str) -> DataPoint {
    DataPoint {
        entity_id: entity_id.to_string(),
        field_id: field_id.to_string(),
        value: Some(FieldValue::Text(value.to_string())),
    }
}

fn casino_dataset() -> Dataset {
    let entities = vec![
        entity("vip", "High Rollers", "vip"),
        entity("casual", "Casual Players", "core"),
        entity("new", "Newcomers", "growth"),
        entity("weekend", "Weekend Players", "core"),
    ];
    let metrics = vec![
        metric("revenue", "Revenue", DisplayFormat::Currency),
        metric("players", "Player Count", DisplayFormat::Number),
    ];
    let dimensions = vec![
        dimension("country", ValueKind::Categorical),
        dimension("game", ValueKind::Categorical),
        dimension("tenure", ValueKind::Numeric),
    ];
    let points = vec![
        number_point("vip", "revenue", 400_000.0),
        number_point("vip", "players", 300.0),
        text_point("vip", "country", "UK"),
        text_point("vip", "game", "live"),
        number_point("vip", "tenure", 1400.0),
        number_point("casual", "revenue", 180_000.0),
        number_point("casual", "players", 4200.0),
        text_point("casual", "country", "DE"),
        text_point("casual", "game", "slots"),
        number_point("casual", "tenure", 700.0),
        number_point("new", "revenue", 40_000.0),
        number_point("new", "players", 1800.0),
        text_point("new", "country", "UK"),
        text_point("new", "game", "slots"),
        number_point("new", "tenure", 40.0),
        number_point("weekend", "revenue", 95_000.0),
        // players deliberately missing for the weekend segment
        text_point("weekend", "country", "DE"),
        text_point("weekend", "game", "slots"),
        number_point("weekend", "tenure", 365.0),
    ];
    Dataset::from_payload(SourcePayload {
        entities,
        metrics,
        dimensions,
        points,
    })
    .unwrap()
}

fn all_entities_selection(dataset: &Dataset) -> Selection {
    Selection {
        entity_ids: dataset.entities().iter().map(|e| e.id.clone()).collect(),
        metric_ids: dataset.metrics().iter().map(|m| m.id.clone()).collect(),
        ..Selection::default()
    }
}

struct Stage {
    filtered: facet::FilteredDataset,
    normalised: facet::NormalisedDataset,
    colours: ColourAssignment,
    sort: SortSpec,
}

fn stage(dataset: &Dataset, mode: NormaliseMode, sort: SortSpec) -> Stage {
    let filtered = select(
        dataset,
        &all_entities_selection(dataset),
        &FilterSpec::default(),
        &SelectionConfig::default(),
    )
    .unwrap();
    let normalised = normalise(&filtered, mode);
    let keys: Vec<String> = filtered.entities.iter().map(|e| e.id.clone()).collect();
    let colours = ColourAssignment::new(&keys, Palette::Standard);
    Stage {
        filtered,
        normalised,
        colours,
        sort,
    }
}

impl Stage {
    fn inputs(&self) -> AdapterInputs<'_> {
        AdapterInputs {
            filtered: &self.filtered,
            normalised: &self.normalised,
            colours: &self.colours,
            sort: &self.sort,
        }
    }
}

#[test]
fn radar_rows_carry_scaled_values_and_an_originals_side_table() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Normalised, SortSpec::default());
    let shape = radar::build(s.inputs()).unwrap();
    assert_eq!(shape.rows.len(), 2);
    let revenue = shape.rows.iter().find(|r| r.metric_id == "revenue").unwrap();
    assert_eq!(revenue.subject, "Revenue");
    assert_eq!(revenue.values["vip"], Some(100.0));
    assert_eq!(revenue.values["new"], Some(0.0));
    assert_eq!(revenue.originals["vip"], 400_000.0);
    // Missing metric value stays null in the row and absent from originals.
    let players = shape.rows.iter().find(|r| r.metric_id == "players").unwrap();
    assert_eq!(players.values["weekend"], None);
    assert!(!players.originals.contains_key("weekend"));
    assert_eq!(shape.labels["vip"], "High Rollers");
}

#[test]
fn radar_of_an_empty_filter_result_is_the_empty_sentinel() {
    let dataset = casino_dataset();
    let filters = FilterSpec {
        search: Some("nothing matches this".to_string()),
        ..FilterSpec::default()
    };
    let filtered = select(
        &dataset,
        &all_entities_selection(&dataset),
        &filters,
        &SelectionConfig::default(),
    )
    .unwrap();
    let normalised = normalise(&filtered, NormaliseMode::Normalised);
    let colours = ColourAssignment::new(&[], Palette::Standard);
    let sort = SortSpec::default();
    let shape = radar::build(AdapterInputs {
        filtered: &filtered,
        normalised: &normalised,
        colours: &colours,
        sort: &sort,
    })
    .unwrap();
    assert!(shape.is_empty());
}

#[test]
fn parallel_axes_keep_their_own_domains() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Raw, SortSpec::default());
    let shape = parallel::build(s.inputs(), None, ColourScheme::GreenToRed, false).unwrap();
    let tenure = shape.axes.iter().find(|a| a.field_id == "tenure").unwrap();
    assert_eq!(tenure.min, 40.0);
    assert_eq!(tenure.max, 1400.0);
    let revenue = shape.axes.iter().find(|a| a.field_id == "revenue").unwrap();
    assert_eq!(revenue.min, 40_000.0);
    assert_eq!(revenue.max, 400_000.0);
    assert_eq!(shape.rows.len(), 4);
}

#[test]
fn parallel_colour_by_categorical_assigns_stable_category_colours() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Raw, SortSpec::default());
    let shape =
        parallel::build(s.inputs(), Some("country"), ColourScheme::GreenToRed, false).unwrap();
    let colour_of = |id: &str| {
        shape
            .rows
            .iter()
            .find(|r| r.entity_id == id)
            .unwrap()
            .colour
            .clone()
    };
    // vip and new share UK; casual and weekend share DE.
    assert_eq!(colour_of("vip"), colour_of("new"));
    assert_eq!(colour_of("casual"), colour_of("weekend"));
    assert_ne!(colour_of("vip"), colour_of("casual"));
}

#[test]
fn heatmap_aggregations_are_explicit_and_distinct() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Raw, SortSpec::default());
    // casual and weekend collide in the DE/slots cell.
    let sum = heatmap::build(
        s.inputs(),
        "country",
        "game",
        "revenue",
        Some(CellAggregation::Sum),
        ColourScheme::YellowToRed,
        false,
    )
    .unwrap();
    let average = heatmap::build(
        s.inputs(),
        "country",
        "game",
        "revenue",
        Some(CellAggregation::Average),
        ColourScheme::YellowToRed,
        false,
    )
    .unwrap();
    let count = heatmap::build(
        s.inputs(),
        "country",
        "game",
        "revenue",
        Some(CellAggregation::Count),
        ColourScheme::YellowToRed,
        false,
    )
    .unwrap();
    let de_slots_sum = sum.cell("DE", "slots").unwrap();
    assert_eq!(de_slots_sum.value, 275_000.0);
    assert_eq!(de_slots_sum.samples, 2);
    assert_eq!(average.cell("DE", "slots").unwrap().value, 137_500.0);
    assert_eq!(count.cell("DE", "slots").unwrap().value, 2.0);
}

#[test]
fn heatmap_rejects_identical_axes() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Raw, SortSpec::default());
    let error = heatmap::build(
        s.inputs(),
        "country",
        "country",
        "revenue",
        Some(CellAggregation::Sum),
        ColourScheme::YellowToRed,
        false,
    )
    .unwrap_err();
    assert_eq!(error.category(), "Adapter");
}

#[test]
fn small_multiples_per_cell_and_global_domains_differ() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Normalised, SortSpec::default());
    let per_cell =
        small_multiples::build(s.inputs(), "country", NormalisationDomain::PerCell).unwrap();
    let global =
        small_multiples::build(s.inputs(), "country", NormalisationDomain::Global).unwrap();
    // Within the UK cell, vip holds the revenue maximum either way.
    let uk_per_cell = per_cell.cell("UK", "revenue").unwrap();
    let vip_point = uk_per_cell
        .points
        .iter()
        .find(|p| p.entity_id == "vip")
        .unwrap();
    assert_eq!(vip_point.scaled, Some(100.0));
    // Globally the DE maximum is mid-scale; per-cell it tops its own cell.
    let de_per_cell = per_cell.cell("DE", "revenue").unwrap();
    let de_global = global.cell("DE", "revenue").unwrap();
    let casual_local = de_per_cell
        .points
        .iter()
        .find(|p| p.entity_id == "casual")
        .unwrap();
    let casual_global = de_global
        .points
        .iter()
        .find(|p| p.entity_id == "casual")
        .unwrap();
    assert_eq!(casual_local.scaled, Some(100.0));
    let expected = (180_000.0 - 40_000.0) / (400_000.0 - 40_000.0) * 100.0;
    let got = casual_global.scaled.unwrap();
    assert!((got - expected).abs() < 1e-9);
}

#[test]
fn small_multiples_rejects_a_numeric_segment_dimension() {
    let dataset = casino_dataset();
    let s = stage(&dataset, NormaliseMode::Raw, SortSpec::default());
    let error =
        small_multiples::build(s.inputs(), "tenure", NormalisationDomain::PerCell).unwrap_err();
    assert_eq!(error.category(), "Adapter");
}

#[test]
fn table_rows_follow_the_sort_spec_with_nulls_last() {
    let dataset = casino_dataset();
    let sort = SortSpec {
        key: SortKey::Field("players".to_string()),
        direction: SortDirection::Descending,
    };
    let s = stage(&dataset, NormaliseMode::Raw, sort);
    let shape = table::build(s.inputs()).unwrap();
    let order: Vec<&str> = shape.rows.iter().map(|r| r.entity_id.as_str()).collect();
    // weekend has no player count and sorts last despite the direction.
    assert_eq!(order, vec!["casual", "new", "vip", "weekend"]);
    let weekend = shape.rows.last().unwrap();
    assert_eq!(weekend.formatted[1], "-");
    let vip = shape.rows.iter().find(|r| r.entity_id == "vip").unwrap();
    assert_eq!(vip.formatted[0], "£400,000");
}

#[test]
fn compute_renders_every_requested_shape_in_one_pass() {
    let dataset = casino_dataset();
    let view = ViewState {
        selection: all_entities_selection(&dataset),
        sort: SortSpec {
            key: SortKey::Field("revenue".to_string()),
            direction: SortDirection::Descending,
        },
        normalise_mode: NormaliseMode::Normalised,
        heatmap: Some(HeatmapRequest {
            primary: "country".to_string(),
            secondary: "game".to_string(),
            metric: "revenue".to_string(),
            aggregation: Some(CellAggregation::Sum),
        }),
        sankey: Some(SankeyRequest {
            source: "country".to_string(),
            target: "game".to_string(),
            metric: "revenue".to_string(),
            colour_mode: Default::default(),
        }),
        small_multiples: Some(SmallMultiplesRequest {
            segment_dimension: "country".to_string(),
            domain: NormalisationDomain::Global,
        }),
        ..ViewState::default()
    };
    let model = compute(&dataset, &view, &SelectionConfig::default()).unwrap();
    assert_eq!(model.entity_count, 4);
    assert!(!model.radar.is_empty());
    assert!(!model.parallel.is_empty());
    assert!(!model.table.is_empty());
    assert!(model.heatmap.as_ref().is_some_and(|h| !h.is_empty()));
    assert!(model.sankey.as_ref().is_some_and(|s| !s.is_empty()));
    assert!(model
        .small_multiples
        .as_ref()
        .is_some_and(|g| !g.is_empty()));
    assert!(model.failures.is_empty());
    let sankey = model.sankey.unwrap();
    sankey.validate_conservation().unwrap();
}

#[test]
fn one_failing_adapter_does_not_poison_its_siblings() {
    let dataset = casino_dataset();
    let view = ViewState {
        selection: all_entities_selection(&dataset),
        normalise_mode: NormaliseMode::Normalised,
        heatmap: Some(HeatmapRequest {
            primary: "country".to_string(),
            secondary: "country".to_string(),
            metric: "revenue".to_string(),
            aggregation: Some(CellAggregation::Sum),
        }),
        ..ViewState::default()
    };
    let model = compute(&dataset, &view, &SelectionConfig::default()).unwrap();
    assert!(model.heatmap.is_none());
    assert_eq!(model.failures.len(), 1);
    assert_eq!(model.failures[0].adapter, "heatmap");
    assert!(!model.radar.is_empty());
    assert!(!model.table.is_empty());
}
