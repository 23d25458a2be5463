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
    colour_for, format_optional, format_value, ColourScheme, DisplayFormat, Palette, SchemeKind,
    MISSING_VALUE,
};

#[test]
fn scheme_endpoints_hit_their_anchor_stops() {
    assert_eq!(ColourScheme::YellowToRed.sample(0.0, false), "#ffffcc");
    assert_eq!(ColourScheme::YellowToRed.sample(1.0, false), "#bd0026");
    assert_eq!(ColourScheme::YellowToBlue.sample(1.0, false), "#253494");
}

#[test]
fn inverting_a_scheme_swaps_its_endpoints() {
    let scheme = ColourScheme::GreenToRed;
    assert_eq!(scheme.sample(0.0, true), scheme.sample(1.0, false));
    assert_eq!(scheme.sample(1.0, true), scheme.sample(0.0, false));
}

#[test]
fn out_of_range_positions_clamp_to_the_endpoints() {
    let scheme = ColourScheme::BlueToRed;
    assert_eq!(scheme.sample(-0.5, false), scheme.sample(0.0, false));
    assert_eq!(scheme.sample(1.5, false), scheme.sample(1.0, false));
}

#[test]
fn diverging_and_sequential_schemes_are_classified() {
    assert_eq!(ColourScheme::GreenToRed.kind(), SchemeKind::Diverging);
    assert_eq!(ColourScheme::BlueToRed.kind(), SchemeKind::Diverging);
    assert_eq!(ColourScheme::YellowToRed.kind(), SchemeKind::Sequential);
    assert_eq!(ColourScheme::YellowToBlue.kind(), SchemeKind::Sequential);
}

#[test]
fn categorical_colours_wrap_around_the_palette() {
    let standard_len = Palette::Standard.tokens().len();
    assert_eq!(
        colour_for(0, Palette::Standard),
        colour_for(standard_len, Palette::Standard)
    );
    assert_eq!(
        colour_for(3, Palette::HighContrast),
        colour_for(11, Palette::HighContrast)
    );
}

#[test]
fn currency_renders_whole_pounds_with_separators() {
    assert_eq!(format_value(412_000.0, DisplayFormat::Currency), "£412,000");
    assert_eq!(format_value(999.4, DisplayFormat::Currency), "£999");
    assert_eq!(format_value(-1_250.0, DisplayFormat::Currency), "-£1,250");
}

#[test]
fn percentage_renders_one_decimal_place() {
    assert_eq!(format_value(0.341, DisplayFormat::Percentage), "34.1%");
    assert_eq!(format_value(0.0, DisplayFormat::Percentage), "0.0%");
}

#[test]
fn numbers_group_thousands_and_keep_meaningful_decimals() {
    assert_eq!(format_value(4200.0, DisplayFormat::Number), "4,200");
    assert_eq!(format_value(6.5, DisplayFormat::Number), "6.50");
    assert_eq!(format_value(1_234_567.0, DisplayFormat::Number), "1,234,567");
}

#[test]
fn missing_values_render_as_a_dash() {
    assert_eq!(format_optional(None, DisplayFormat::Currency), MISSING_VALUE);
    assert_eq!(format_optional(Some(1.0), DisplayFormat::Number), "1");
}
