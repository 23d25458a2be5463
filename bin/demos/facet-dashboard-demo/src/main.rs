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

use anyhow::{bail, Result};
use facet::{
    AnalyticsPipeline, CellAggregation, DataPoint, Dataset, Dimension, DisplayFormat, Entity,
    FieldDomain, FieldValue, FilterSpec, HeatmapRequest, LoadState, Metric, NormalisationDomain,
    NormaliseMode, Palette, RangeFilter, SankeyColourMode, SankeyRequest, Selection,
    SmallMultiplesRequest, SortDirection, SortKey, SortSpec, SourcePayload, ValueKind, ViewState,
};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let (load_state, payload) = fetch_dashboard_payload();
    if load_state != LoadState::Ready {
        bail!("dataset is not ready to render");
    }
    let dataset = Dataset::from_payload(payload)?;
    info!("{dataset}");
    let mut pipeline = AnalyticsPipeline::new();
    let view = ViewState {
        selection: Selection {
            metric_ids: vec![
                "revenue".to_string(),
                "active_players".to_string(),
                "average_bet".to_string(),
                "conversion_rate".to_string(),
            ],
            entity_ids: vec![
                "seg_high_rollers".to_string(),
                "seg_casuals".to_string(),
                "seg_newcomers".to_string(),
                "seg_weekenders".to_string(),
            ],
            ..Selection::default()
        },
        filters: FilterSpec {
            ranges: [(
                "tenure_days".to_string(),
                RangeFilter {
                    min: 0.0,
                    max: 2000.0,
                },
            )]
            .into(),
            ..FilterSpec::default()
        },
        sort: SortSpec {
            key: SortKey::Field("revenue".to_string()),
            direction: SortDirection::Descending,
        },
        normalise_mode: NormaliseMode::Normalised,
        palette: Palette::Standard,
        colour_by: Some("tenure_days".to_string()),
        heatmap: Some(HeatmapRequest {
            primary: "country".to_string(),
            secondary: "game_category".to_string(),
            metric: "revenue".to_string(),
            aggregation: Some(CellAggregation::Sum),
        }),
        sankey: Some(SankeyRequest {
            source: "country".to_string(),
            target: "game_category".to_string(),
            metric: "active_players".to_string(),
            colour_mode: SankeyColourMode::ByCategory,
        }),
        small_multiples: Some(SmallMultiplesRequest {
            segment_dimension: "country".to_string(),
            domain: NormalisationDomain::Global,
        }),
        ..ViewState::default()
    };
    let model = pipeline.render(&dataset, &view)?;
    info!(
        entities = model.entity_count,
        radar_rows = model.radar.rows.len(),
        parallel_axes = model.parallel.axes.len(),
        failures = model.failures.len(),
        "render pass complete"
    );
    for row in &model.radar.rows {
        let line: Vec<String> = model
            .radar
            .series
            .iter()
            .map(|id| {
                let name = model.radar.labels.get(id).cloned().unwrap_or_default();
                match row.values.get(id).copied().flatten() {
                    Some(scaled) => format!("{name}: {scaled:.0}"),
                    None => format!("{name}: -"),
                }
            })
            .collect();
        println!("{:24} {}", row.subject, line.join("  "));
    }
    if let Some(heatmap) = &model.heatmap {
        println!(
            "heatmap {} ({} rows x {} columns, {:?})",
            heatmap.metric_id,
            heatmap.rows.len(),
            heatmap.columns.len(),
            heatmap.aggregation
        );
    }
    if let Some(sankey) = &model.sankey {
        for link in &sankey.links {
            println!("flow {} -> {}: {}", link.source, link.target, link.value);
        }
    }
    // A second render with the same view is a cache hit.
    let _ = pipeline.render(&dataset, &view)?;
    info!(hit_ratio = pipeline.cache_hit_ratio(), "cache statistics");
    let json = AnalyticsPipeline::export_json(&model)?;
    println!("export size: {} bytes", json.len());
    Ok(())
}

// Stands in for the asynchronous loader collaborator, which resolves its
// fetch before the pipeline runs.
fn fetch_dashboard_payload() -> (LoadState, SourcePayload) {
    (LoadState::Ready, player_segment_payload())
}

fn player_segment_payload() -> SourcePayload {
    let entities = vec![
        entity("seg_high_rollers", "High Rollers", "vip"),
        entity("seg_casuals", "Casual Players", "core"),
        entity("seg_newcomers", "Newcomers", "growth"),
        entity("seg_weekenders", "Weekend Players", "core"),
        entity("seg_dormant", "Dormant Accounts", "risk"),
    ];
    let metrics = vec![
        metric("revenue", "Revenue", DisplayFormat::Currency),
        metric("active_players", "Player Count", DisplayFormat::Number),
        metric("average_bet", "Average Bet", DisplayFormat::Currency),
        metric("conversion_rate", "Conversion Rate", DisplayFormat::Percentage),
        metric("rtp", "Return To Player", DisplayFormat::Percentage),
    ];
    let dimensions = vec![
        Dimension {
            id: "country".to_string(),
            label: "Country".to_string(),
            kind: ValueKind::Categorical,
            format: DisplayFormat::Text,
            domain: FieldDomain::Categories(vec![
                "UK".to_string(),
                "DE".to_string(),
                "SE".to_string(),
            ]),
        },
        Dimension {
            id: "game_category".to_string(),
            label: "Game Category".to_string(),
            kind: ValueKind::Categorical,
            format: DisplayFormat::Text,
            domain: FieldDomain::Categories(vec![
                "slots".to_string(),
                "live_casino".to_string(),
                "table_games".to_string(),
            ]),
        },
        Dimension {
            id: "tenure_days".to_string(),
            label: "Tenure (days)".to_string(),
            kind: ValueKind::Numeric,
            format: DisplayFormat::Number,
            domain: FieldDomain::Range {
                min: 0.0,
                max: 3650.0,
            },
        },
    ];
    let rows: Vec<(&str, f64, f64, f64, f64, Option<f64>, &str, &str, f64)> = vec![
        ("seg_high_rollers", 412_000.0, 310.0, 240.0, 0.34, Some(0.956), "UK", "live_casino", 1460.0),
        ("seg_casuals", 188_500.0, 4200.0, 6.5, 0.11, Some(0.943), "DE", "slots", 730.0),
        ("seg_newcomers", 42_300.0, 1800.0, 4.2, 0.08, None, "SE", "slots", 45.0),
        ("seg_weekenders", 97_800.0, 2600.0, 11.0, 0.14, Some(0.948), "UK", "table_games", 365.0),
        ("seg_dormant", 5_100.0, 900.0, 2.1, 0.02, Some(0.951), "DE", "slots", 2900.0),
    ];
    let mut points = Vec::new();
    for (id, revenue, players, avg_bet, conversion, rtp, country, game, tenure) in rows {
        points.push(point(id, "revenue", FieldValue::Number(revenue)));
        points.push(point(id, "active_players", FieldValue::Number(players)));
        points.push(point(id, "average_bet", FieldValue::Number(avg_bet)));
        points.push(point(id, "conversion_rate", FieldValue::Number(conversion)));
        if let Some(rtp) = rtp {
            points.push(point(id, "rtp", FieldValue::Number(rtp)));
        }
        points.push(point(id, "country", FieldValue::Text(country.to_string())));
        points.push(point(id, "game_category", FieldValue::Text(game.to_string())));
        points.push(point(id, "tenure_days", FieldValue::Number(tenure)));
    }
    SourcePayload {
        entities,
        metrics,
        dimensions,
        points,
    }
}

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

fn point(entity_id: &str, field_id: &str, value: FieldValue) -> DataPoint {
    DataPoint {
        entity_id: entity_id.to_string(),
        field_id: field_id.to_string(),
        value: Some(value),
    }
}
