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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
pub type ColourToken = String;
pub const STANDARD_PALETTE: [&str; 10] = [
    "#1976D2", "#9C27B0", "#2E7D32", "#0288D1", "#ED6C02", "#D32F2F", "#42A5F5", "#BA68C8",
    "#1565C0", "#7B1FA2",
];
pub const HIGH_CONTRAST_PALETTE: [&str; 8] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#000000", "#FFFFFF",
];
pub const FALLBACK_COLOUR: &str = "#9E9E9E";
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    Standard,
    HighContrast,
}
impl Palette {
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            Palette::Standard => &STANDARD_PALETTE,
            Palette::HighContrast => &HIGH_CONTRAST_PALETTE,
        }
    }
}
impl Default for Palette {
    fn default() -> Self {
        Palette::Standard
    }
}
pub fn colour_for(index: usize, palette: Palette) -> ColourToken {
    let tokens = palette.tokens();
    tokens[index % tokens.len()].to_string()
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    Sequential,
    Diverging,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColourScheme {
    GreenToRed,
    BlueToRed,
    YellowToRed,
    YellowToBlue,
}
impl Default for ColourScheme {
    fn default() -> Self {
        ColourScheme::GreenToRed
    }
}
impl ColourScheme {
    pub fn label(&self) -> &'static str {
        match self {
            ColourScheme::GreenToRed => "Green to Red",
            ColourScheme::BlueToRed => "Blue to Red",
            ColourScheme::YellowToRed => "Yellow to Red",
            ColourScheme::YellowToBlue => "Yellow to Blue",
        }
    }
    pub fn kind(&self) -> SchemeKind {
        match self {
            ColourScheme::GreenToRed | ColourScheme::BlueToRed => SchemeKind::Diverging,
            ColourScheme::YellowToRed | ColourScheme::YellowToBlue => SchemeKind::Sequential,
        }
    }
    // The diverging schemes read low-is-good in their source ramps and are
    // flipped by default so that high values run hot.
    pub fn default_invert(&self) -> bool {
        matches!(self, ColourScheme::GreenToRed | ColourScheme::BlueToRed)
    }
    fn stops(&self) -> &'static [Rgb] {
        match self {
            ColourScheme::GreenToRed => &[
                Rgb(215, 48, 39),
                Rgb(254, 224, 139),
                Rgb(26, 152, 80),
            ],
            ColourScheme::BlueToRed => &[
                Rgb(178, 24, 43),
                Rgb(247, 247, 247),
                Rgb(33, 102, 172),
            ],
            ColourScheme::YellowToRed => &[
                Rgb(255, 255, 204),
                Rgb(253, 141, 60),
                Rgb(189, 0, 38),
            ],
            ColourScheme::YellowToBlue => &[
                Rgb(255, 255, 204),
                Rgb(65, 182, 196),
                Rgb(37, 52, 148),
            ],
        }
    }
    pub fn sample(&self, t: f64, invert: bool) -> ColourToken {
        let mut t = t.clamp(0.0, 1.0);
        if invert {
            t = 1.0 - t;
        }
        let stops = self.stops();
        let segments = stops.len() - 1;
        let position = t * segments as f64;
        let index = (position.floor() as usize).min(segments - 1);
        let local = position - index as f64;
        stops[index].lerp(&stops[index + 1], local).to_hex()
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb(u8, u8, u8);
impl Rgb {
    fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
        };
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
    fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColourAssignment {
    palette: Palette,
    keys: Vec<String>,
    colours: HashMap<String, ColourToken>,
}
impl ColourAssignment {
    // Positional: a key's colour depends only on its index in the ordered
    // key list, so legend and shapes agree within one render pass.
    pub fn new(keys: &[String], palette: Palette) -> Self {
        let colours = keys
            .iter()
            .enumerate()
            .map(|(index, key)| (key.clone(), colour_for(index, palette)))
            .collect();
        Self {
            palette,
            keys: keys.to_vec(),
            colours,
        }
    }
    pub fn colour(&self, key: &str) -> Option<&str> {
        self.colours.get(key).map(String::as_str)
    }
    pub fn colour_or_fallback(&self, key: &str) -> ColourToken {
        self.colour(key)
            .map_or_else(|| FALLBACK_COLOUR.to_string(), str::to_string)
    }
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
    pub fn palette(&self) -> Palette {
        self.palette
    }
    pub fn legend(&self) -> Vec<(String, ColourToken)> {
        self.keys
            .iter()
            .map(|key| (key.clone(), self.colour_or_fallback(key)))
            .collect()
    }
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
