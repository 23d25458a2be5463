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

use crate::schema::DisplayFormat;
pub const MISSING_VALUE: &str = "-";
pub fn format_value(value: f64, format: DisplayFormat) -> String {
    match format {
        DisplayFormat::Currency => format_currency(value),
        DisplayFormat::Percentage => format_percentage(value),
        DisplayFormat::Number => format_number(value),
        DisplayFormat::Text => value.to_string(),
    }
}
pub fn format_optional(value: Option<f64>, format: DisplayFormat) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| format_value(v, format))
}
// en-GB sterling, whole pounds, as the dashboard renders revenue figures.
fn format_currency(value: f64) -> String {
    let rounded = value.round();
    if rounded < 0.0 {
        format!("-£{}", group_thousands(-rounded as i64))
    } else {
        format!("£{}", group_thousands(rounded as i64))
    }
}
fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
fn format_number(value: f64) -> String {
    let negative = value < 0.0;
    let hundredths = (value.abs() * 100.0).round() as i64;
    let whole = hundredths / 100;
    let fraction = hundredths % 100;
    let grouped = group_thousands(whole);
    let body = if fraction == 0 {
        grouped
    } else {
        format!("{grouped}.{fraction:02}")
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
