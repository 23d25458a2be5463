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

use facet::{
    colour_for, compute, normalise, select, ColourAssignment, DataPoint, Dataset, Dimension,
    DisplayFormat, Entity, FieldDomain, FieldValue, FilterSpec, Metric, NormaliseMode, Palette,
    RangeFilter, Selection, SelectionConfig, SortDirection, SortKey, SortSpec, SourcePayload,
    ValueKind, ViewState,
};
use proptest::prelude::*;

fn score_dataset(values: &[f64]) -> Dataset {
    let entities: Vec<Entity> = (0..values.len())
        .map(|i| Entity {
            id: format!("e{i}"),
            name: format!("Entity {i}"),
            category: "segment".to_string(),
            attributes: Default::default(),
        })
        .collect();
    let points: Vec<DataPoint> = values
        .iter()
        .enumerate()
        .map(|(i, v)| DataPoint {
            entity_id: format!("e{i}"),
            field_id: "score".to_string(),
            value: Some(FieldValue::Number(*v)),
        })
        .collect();
    Dataset::from_payload(SourcePayload {
        entities,
        metrics: vec![Metric {
            id: "score".to_string(),
            label: "Score".to_string(),
            format: DisplayFormat::Number,
        }],
        dimensions: vec![Dimension {
            id: "score_band".to_string(),
            label: "Score Band".to_string(),
            kind: ValueKind::Numeric,
            format: DisplayFormat::Number,
            domain: FieldDomain::Open,
        }],
        points,
    })
    .unwrap()
}

fn full_selection(dataset: &Dataset) -> Selection {
    Selection {
        entity_ids: dataset.entities().iter().map(|e| e.id.clone()).collect(),
        metric_ids: vec!["score".to_string()],
        ..Selection::default()
    }
}

proptest! {
    #[test]
    fn normalisation_bounds_hold_for_any_spread_of_values(
        values in proptest::collection::vec(-1.0e6..1.0e6f64, 2..40)
    ) {
        let distinct = {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sorted.dedup();
            sorted.len()
        };
        prop_assume!(distinct >= 2);
        let dataset = score_dataset(&values);
        let filtered = select(
            &dataset,
            &full_selection(&dataset),
            &FilterSpec::default(),
            &SelectionConfig::default(),
        )
        .unwrap();
        let normalised = normalise(&filtered, NormaliseMode::Normalised);
        let mut scaled: Vec<f64> = (0..values.len())
            .filter_map(|i| normalised.scaled(&format!("e{i}"), "score"))
            .collect();
        scaled.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let min = scaled.first().copied().unwrap();
        let max = scaled.last().copied().unwrap();
        prop_assert!((min - 0.0).abs() < 1e-9, "minimum maps to 0, got {min}");
        prop_assert!((max - 100.0).abs() < 1e-9, "maximum maps to 100, got {max}");
        for value in scaled {
            prop_assert!(value.is_finite());
            prop_assert!((-1e-9..=100.0 + 1e-9).contains(&value));
        }
    }

    #[test]
    fn tightening_a_range_filter_never_grows_the_result(
        values in proptest::collection::vec(0.0..100.0f64, 1..30),
        low in 0.0..50.0f64,
        high in 50.0..100.0f64,
        shrink in 0.0..25.0f64,
    ) {
        prop_assume!(low + shrink <= high - shrink);
        let dataset = band_dataset(&values);
        let count = |min: f64, max: f64| {
            let filters = FilterSpec {
                ranges: [(
                    "score_band".to_string(),
                    RangeFilter { min, max },
                )]
                .into(),
                ..FilterSpec::default()
            };
            select(
                &dataset,
                &full_selection(&dataset),
                &filters,
                &SelectionConfig::default(),
            )
            .unwrap()
            .entities
            .len()
        };
        let loose = count(low, high);
        let tight = count(low + shrink, high - shrink);
        prop_assert!(tight <= loose, "tight {tight} must not exceed loose {loose}");
    }

    #[test]
    fn colour_assignment_is_stable_for_an_unchanged_key_list(
        key_count in 1usize..30,
        queries in proptest::collection::vec(0usize..30, 1..10),
    ) {
        let keys: Vec<String> = (0..key_count).map(|i| format!("key{i}")).collect();
        let first = ColourAssignment::new(&keys, Palette::Standard);
        let second = ColourAssignment::new(&keys, Palette::Standard);
        for q in queries {
            let key = format!("key{}", q % key_count);
            prop_assert_eq!(first.colour(&key), second.colour(&key));
            let index = keys.iter().position(|k| *k == key).unwrap();
            prop_assert_eq!(
                first.colour(&key).unwrap(),
                colour_for(index, Palette::Standard)
            );
        }
    }

    #[test]
    fn high_contrast_palette_cycles_through_its_fixed_eight(
        index in 0usize..1000,
    ) {
        let token = colour_for(index, Palette::HighContrast);
        prop_assert_eq!(token, colour_for(index % 8, Palette::HighContrast));
    }

    #[test]
    fn repeated_compute_passes_are_deep_equal(
        values in proptest::collection::vec(-1000.0..1000.0f64, 1..15),
    ) {
        let dataset = band_dataset(&values);
        let view = ViewState {
            selection: full_selection(&dataset),
            sort: SortSpec {
                key: SortKey::Field("score".to_string()),
                direction: SortDirection::Descending,
            },
            normalise_mode: NormaliseMode::Normalised,
            ..ViewState::default()
        };
        let config = SelectionConfig::default();
        let first = compute(&dataset, &view, &config).unwrap();
        let second = compute(&dataset, &view, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

fn band_dataset(values: &[f64]) -> Dataset {
    let mut dataset_points: Vec<DataPoint> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        dataset_points.push(DataPoint {
            entity_id: format!("e{i}"),
            field_id: "score".to_string(),
            value: Some(FieldValue::Number(*v)),
        });
        dataset_points.push(DataPoint {
            entity_id: format!("e{i}"),
            field_id: "score_band".to_string(),
            value: Some(FieldValue::Number(*v)),
        });
    }
    let entities: Vec<Entity> = (0..values.len())
        .map(|i| Entity {
            id: format!("e{i}"),
            name: format!("Entity {i}"),
            category: "segment".to_string(),
            attributes: Default::default(),
        })
        .collect();
    Dataset::from_payload(SourcePayload {
        entities,
        metrics: vec![Metric {
            id: "score".to_string(),
            label: "Score".to_string(),
            format: DisplayFormat::Number,
        }],
        dimensions: vec![Dimension {
            id: "score_band".to_string(),
            label: "Score Band".to_string(),
            kind: ValueKind::Numeric,
            format: DisplayFormat::Number,
            domain: FieldDomain::Open,
        }],
        points: dataset_points,
    })
    .unwrap()
}
