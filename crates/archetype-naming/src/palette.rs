// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

pub const DEFAULT_COLOR: &str = "#888888";
pub const DEFAULT_EMOJI: &str = "\u{2753}";

/// Display colors and emoji per archetype name. Unknown names get defaults.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub colors: BTreeMap<String, String>,
    pub emoji: BTreeMap<String, String>,
    pub default_color: String,
    pub default_emoji: String,
}

impl Palette {
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
            emoji: BTreeMap::new(),
            default_color: DEFAULT_COLOR.to_string(),
            default_emoji: DEFAULT_EMOJI.to_string(),
        }
    }

    pub fn standard() -> Self {
        let mut palette = Self::empty();
        for (name, color, emoji) in STANDARD {
            palette.insert(name, color, emoji);
        }
        palette
    }

    pub fn insert(&mut self, name: &str, color: &str, emoji: &str) {
        self.colors.insert(name.to_string(), color.to_string());
        self.emoji.insert(name.to_string(), emoji.to_string());
    }

    pub fn color(&self, name: &str) -> &str {
        self.colors.get(name).map_or(self.default_color.as_str(), String::as_str)
    }

    pub fn emoji(&self, name: &str) -> &str {
        self.emoji.get(name).map_or(self.default_emoji.as_str(), String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD: [(&str, &str, &str); 18] = [
    ("Earthworm", "#a0584a", "\u{1FAB1}"),
    ("Eephus Lobber", "#a86e3d", "\u{1FAA6}"),
    ("Uncle Charlie", "#c9a03e", "\u{1F37A}"),
    ("Yakker", "#b8b230", "\u{1F9AC}"),
    ("Snake", "#7db04a", "\u{1F40D}"),
    ("Gardener", "#4da85e", "\u{1F9D1}\u{200D}\u{1F33E}"),
    ("Kitchen Sink", "#45a87e", "\u{1F6B0}"),
    ("Boomerang", "#3aaf9f", "\u{1FA83}"),
    ("CutCraft", "#3a8cc4", "\u{2702}\u{FE0F}"),
    ("Ghost", "#8899aa", "\u{1F47B}"),
    ("Undertow", "#4178c9", "\u{1F30A}"),
    ("Cutman", "#8592d6", "\u{1F5E1}"),
    ("Heavy Duty", "#6b5ecc", "\u{1F3CB}\u{FE0F}"),
    ("Knuckleball Wizard", "#8b52cc", "\u{1F9D9}"),
    ("Split Demon", "#ab47c4", "\u{1F479}"),
    ("Triple Threat", "#c43fa8", "3\u{FE0F}\u{20E3}"),
    ("Swordfighter", "#c94185", "\u{2694}\u{FE0F}"),
    ("Barnburner", "#cc4565", "\u{26FD}"),
];
