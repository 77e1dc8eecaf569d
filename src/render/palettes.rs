//! Palette registry for chart colouring
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name.
//!
//! Palette types:
//! - `categorical`: Discrete colors for distinct categories (colors repeat after exhausting the list)
//! - `sequential`: Gradient from low to high values
//! - `diverging`: Gradient with a neutral midpoint

use crate::dataset::reading::Zone;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

const PALETTES_JSON: &str = include_str!("../../palettes.json");

static PALETTE_REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();

/// Global palette registry, built from the embedded palettes.json on first access
pub fn palette_registry() -> &'static PaletteRegistry {
    PALETTE_REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            error!("Failed to load palettes.json: {}", e);
            PaletteRegistry::default()
        })
    })
}

pub const DEFAULT_CATEGORICAL_PALETTE: &str = "Zones";
pub const DEFAULT_SEQUENTIAL_PALETTE: &str = "Viridis";
pub const DEFAULT_DIVERGING_PALETTE: &str = "RdBu";

const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Categorical,
    Sequential,
    Diverging,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Color by index, wrapping around
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_GRAY;
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or(FALLBACK_GRAY)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Plotly colorscale: evenly spaced `[position, "#RRGGBB"]` stops
    ///
    /// With `reversed` the last color sits at position 0.
    pub fn colorscale(&self, reversed: bool) -> Vec<(f64, String)> {
        let mut colors: Vec<[u8; 3]> = (0..self.colors.len()).map(|i| self.get_color(i)).collect();
        if reversed {
            colors.reverse();
        }
        let n = colors.len();
        colors
            .into_iter()
            .enumerate()
            .map(|(i, rgb)| {
                let pos = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                (pos, to_hex(rgb))
            })
            .collect()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// Lowercase keys for case-insensitive lookup
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();
        for def in definitions {
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        debug!("Loaded {} palettes", registry.palettes.len());

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Named palette of the given type, else the default palette of that type
    pub fn get_or_default(&self, name: &str, kind: PaletteType) -> Option<&PaletteDefinition> {
        match self.get(name) {
            Some(p) if p.palette_type == kind => Some(p),
            found => {
                if let Some(p) = found {
                    warn!(
                        "Palette '{}' is {:?}, expected {:?}; using default",
                        p.name, p.palette_type, kind
                    );
                } else {
                    warn!("Unknown palette '{}'; using default", name);
                }
                let default = match kind {
                    PaletteType::Categorical => DEFAULT_CATEGORICAL_PALETTE,
                    PaletteType::Sequential => DEFAULT_SEQUENTIAL_PALETTE,
                    PaletteType::Diverging => DEFAULT_DIVERGING_PALETTE,
                };
                self.get(default)
            }
        }
    }
}

/// Parse `#RRGGBB`, `#RRGGBBAA`, `RRGGBB` or `RRGGBBAA` (alpha ignored)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some([r, g, b])
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Color of a zone in the named categorical palette, by zone level
pub fn zone_color(palette_name: &str, zone: Zone) -> String {
    let rgb = palette_registry()
        .get_or_default(palette_name, PaletteType::Categorical)
        .map(|p| p.get_color(zone.level()))
        .unwrap_or(FALLBACK_GRAY);
    to_hex(rgb)
}

/// Plotly colorscale of a named palette, falling back to the default of `kind`
pub fn colorscale(palette_name: &str, kind: PaletteType, reversed: bool) -> Vec<(f64, String)> {
    palette_registry()
        .get_or_default(palette_name, kind)
        .map(|p| p.colorscale(reversed))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("#EF553B"), Some([239, 85, 59]));
        assert_eq!(parse_hex_color("636EFA"), Some([99, 110, 250]));
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));

        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
    }

    #[test]
    fn test_palette_registry_loads() {
        let registry = palette_registry();
        assert!(std::ptr::eq(registry, palette_registry()));
        assert_eq!(registry.get("Zones").unwrap().palette_type, PaletteType::Categorical);
        assert_eq!(registry.get("VIRIDIS").unwrap().palette_type, PaletteType::Sequential);
        assert!(registry.get("NoSuchPalette").is_none());

        let rdbu = registry.get("rdbu").unwrap();
        assert_eq!(rdbu.palette_type, PaletteType::Diverging);
        assert_eq!(rdbu.len(), 11);
    }

    #[test]
    fn test_zone_colors() {
        assert_eq!(zone_color("Zones", Zone::Industrial), "#EF553B");
        assert_eq!(zone_color("Zones", Zone::Residential), "#636EFA");
        // Unknown and wrong-type names fall back to the zone palette
        assert_eq!(zone_color("Nope", Zone::Industrial), "#EF553B");
        assert_eq!(zone_color("Viridis", Zone::Residential), "#636EFA");
    }

    #[test]
    fn test_reversed_colorscale() {
        let scale = colorscale("RdBu", PaletteType::Diverging, true);
        assert_eq!(scale.len(), 11);
        assert_eq!(scale[0], (0.0, "#053061".to_string()));
        assert_eq!(scale[10], (1.0, "#67001F".to_string()));

        let forward = colorscale("RdBu", PaletteType::Diverging, false);
        assert_eq!(forward[0].1, "#67001F");
        assert!((forward[5].0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_palette_color_wrapping() {
        let palette = palette_registry().get("Plotly").unwrap();
        let len = palette.len();
        assert_eq!(palette.get_color(0), palette.get_color(len));
    }
}
