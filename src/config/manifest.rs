//! Slot manifest data structures
//!
//! The layout data source: stage metadata, symbol grid geometry, screen
//! elements and the optional rhythm spec that drives the frame evaluator.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::speed_preset::{PresetCatalog, SpeedMode};
use crate::error::ConfigError;

/// Stage orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Element anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Anchor {
    #[default]
    #[serde(rename = "top-left")]
    TopLeft,
    #[serde(rename = "center")]
    Center,
}

/// Screen element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    ReelGroup,
    Reel,
    Symbol,
    Button,
    Panel,
    #[default]
    Bg,
    Effect,
    Ui,
    Overlay,
}

/// Axis-aligned rectangle in stage pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Stage resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub w: f64,
    pub h: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            w: 1280.0,
            h: 720.0,
        }
    }
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub project_name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub base_resolution: Resolution,

    #[serde(default)]
    pub orientation: Orientation,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for MetaInfo {
    fn default() -> Self {
        Self {
            project_name: "SlotForge".to_string(),
            version: default_version(),
            base_resolution: Resolution::default(),
            orientation: Orientation::default(),
        }
    }
}

/// Symbol grid geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: usize,
    pub rows: usize,
    pub cell_w: f64,
    pub cell_h: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    /// Top-left corner of the reel area
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 3,
            cell_w: 120.0,
            cell_h: 120.0,
            gap_x: 5.0,
            gap_y: 5.0,
            origin_x: 330.0,
            origin_y: 175.0,
        }
    }
}

impl GridConfig {
    /// One reel per column
    pub fn reel_count(&self) -> usize {
        self.cols
    }

    /// Vertical pitch of a symbol, the unit reels align to
    pub fn symbol_height(&self) -> f64 {
        self.cell_h + self.gap_y
    }

    pub fn reel_area(&self) -> Rect {
        let w = self.cols as f64 * (self.cell_w + self.gap_x) - self.gap_x;
        let h = self.rows as f64 * (self.cell_h + self.gap_y) - self.gap_y;
        Rect::new(self.origin_x, self.origin_y, w.max(0.0), h.max(0.0))
    }

    /// Cell rectangle at (col, row)
    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.origin_x + col as f64 * (self.cell_w + self.gap_x),
            self.origin_y + row as f64 * (self.cell_h + self.gap_y),
            self.cell_w,
            self.cell_h,
        )
    }

    /// One symbol element per cell, column-major
    pub fn symbol_elements(&self) -> Vec<LayoutElement> {
        let mut symbols = Vec::with_capacity(self.cols * self.rows);
        for col in 0..self.cols {
            for row in 0..self.rows {
                symbols.push(LayoutElement {
                    id: format!("sym_c{}_r{}", col + 1, row + 1),
                    element_type: ElementType::Symbol,
                    name: format!("Symbol C{}R{}", col + 1, row + 1),
                    z_index: 10,
                    rect_landscape: self.cell_rect(col, row),
                    reel: Some(col),
                    ..Default::default()
                });
            }
        }
        symbols
    }
}

/// A screen element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutElement {
    pub id: String,

    #[serde(rename = "type", default)]
    pub element_type: ElementType,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub z_index: i32,

    #[serde(default)]
    pub anchor: Anchor,

    #[serde(default)]
    pub rect_landscape: Rect,

    #[serde(default)]
    pub rect_portrait: Rect,

    #[serde(default, alias = "asset_url", skip_serializing_if = "String::is_empty")]
    pub asset_src: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Reel column this element scrolls with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reel: Option<usize>,
}

impl LayoutElement {
    pub fn is_symbol(&self) -> bool {
        self.element_type == ElementType::Symbol
    }

    /// Rectangle for an orientation, falling back to landscape when unset
    pub fn rect(&self, orientation: Orientation) -> Rect {
        match orientation {
            Orientation::Portrait if !self.rect_portrait.is_empty() => self.rect_portrait,
            _ => self.rect_landscape,
        }
    }

    /// Reel index: explicit field, then a `sym_c<col>_...` id, then reel 0
    pub fn reel_index(&self) -> usize {
        if let Some(reel) = self.reel {
            return reel;
        }
        parse_column(&self.id)
            .or_else(|| self.parent_id.as_deref().and_then(parse_column))
            .unwrap_or(0)
    }
}

fn parse_column(id: &str) -> Option<usize> {
    let rest = id.strip_prefix("sym_c")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let col: usize = digits.parse().ok()?;
    col.checked_sub(1)
}

/// Evaluator timing for one speed mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub spin_duration: f64,
    pub reel_stop_interval: f64,
    /// Peak landing bump in pixels
    pub bounce_strength: f64,
}

/// How reel stops are spaced after the spin duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopPattern {
    #[default]
    Sequential,
    Slam,
    Anticipation,
}

impl StopPattern {
    /// Delay of reel `reel_index`'s stop relative to the first stop
    pub fn stop_offset(&self, reel_index: usize, interval: f64) -> f64 {
        let k = reel_index as f64;
        match self {
            StopPattern::Sequential => k * interval,
            StopPattern::Slam => 0.0,
            StopPattern::Anticipation => interval * k * (k + 1.0) / 2.0,
        }
    }
}

impl std::str::FromStr for StopPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(StopPattern::Sequential),
            "slam" => Ok(StopPattern::Slam),
            "anticipation" => Ok(StopPattern::Anticipation),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Named bundle of timing parameters for one spin's choreography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RhythmSpec {
    #[serde(default)]
    pub profiles: BTreeMap<SpeedMode, SpeedProfile>,

    #[serde(default)]
    pub active_mode: SpeedMode,

    #[serde(default)]
    pub stop_pattern: StopPattern,
}

impl RhythmSpec {
    pub fn active_profile(&self) -> Option<&SpeedProfile> {
        self.profiles.get(&self.active_mode)
    }

    /// Derive evaluator profiles from the live preset catalog
    pub fn from_catalog(
        catalog: &PresetCatalog,
        symbol_height: f64,
        active_mode: SpeedMode,
        stop_pattern: StopPattern,
    ) -> Self {
        let profiles = SpeedMode::ALL
            .iter()
            .map(|&mode| {
                let preset = catalog.snapshot(mode);
                let profile = SpeedProfile {
                    spin_duration: preset.spin_duration,
                    reel_stop_interval: preset.interval_between_reels,
                    bounce_strength: preset.overshoot_distance(symbol_height),
                };
                (mode, profile)
            })
            .collect();

        Self {
            profiles,
            active_mode,
            stop_pattern,
        }
    }

    /// Stop time of a reel for the active profile
    pub fn stop_time(&self, reel_index: usize) -> Option<f64> {
        let profile = self.active_profile()?;
        Some(
            profile.spin_duration
                + self
                    .stop_pattern
                    .stop_offset(reel_index, profile.reel_stop_interval),
        )
    }
}

/// Complete layout manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotManifest {
    #[serde(default)]
    pub meta: MetaInfo,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub layout_elements: Vec<LayoutElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhythm_spec: Option<RhythmSpec>,
}

impl Default for SlotManifest {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl SlotManifest {
    /// Built-in 1280x720 layout with a 5x3 symbol grid
    pub fn default_layout() -> Self {
        let grid = GridConfig::default();
        let area = grid.reel_area();

        let mut layout_elements = vec![
            LayoutElement {
                id: "bg_main".to_string(),
                element_type: ElementType::Bg,
                name: "Main Background".to_string(),
                z_index: 0,
                rect_landscape: Rect::new(0.0, 0.0, 1280.0, 720.0),
                rect_portrait: Rect::new(0.0, 0.0, 720.0, 1280.0),
                asset_src: "assets/bg/bg_main.png".to_string(),
                ..Default::default()
            },
            LayoutElement {
                id: "panel_reels".to_string(),
                element_type: ElementType::Panel,
                name: "Reel Background".to_string(),
                z_index: 5,
                rect_landscape: area,
                asset_src: "assets/ui/panel_reels_bg.png".to_string(),
                ..Default::default()
            },
            LayoutElement {
                id: "btn_spin".to_string(),
                element_type: ElementType::Button,
                name: "Spin Button".to_string(),
                z_index: 20,
                anchor: Anchor::Center,
                rect_landscape: Rect::new(1080.0, 580.0, 120.0, 120.0),
                asset_src: "assets/ui/btn_spin.png".to_string(),
                ..Default::default()
            },
        ];
        layout_elements.extend(grid.symbol_elements());

        Self {
            meta: MetaInfo::default(),
            grid,
            layout_elements,
            rhythm_spec: None,
        }
    }

    /// Load a manifest from JSON
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_json(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        info!(
            "Manifest {:?}: {} elements, {} reels",
            manifest.meta.project_name,
            manifest.layout_elements.len(),
            manifest.reel_count()
        );
        Ok(manifest)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.cols == 0 {
            return Err(ConfigError::NoReels);
        }
        let height = self.symbol_height();
        if !(height.is_finite() && height > 0.0) {
            return Err(ConfigError::InvalidSymbolHeight(height));
        }
        Ok(())
    }

    pub fn reel_count(&self) -> usize {
        self.grid.reel_count()
    }

    pub fn symbol_height(&self) -> f64 {
        self.grid.symbol_height()
    }

    /// Elements in paint order
    pub fn sorted_elements(&self) -> Vec<&LayoutElement> {
        let mut elements: Vec<&LayoutElement> = self.layout_elements.iter().collect();
        elements.sort_by_key(|e| e.z_index);
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let manifest = SlotManifest::default_layout();
        assert_eq!(manifest.reel_count(), 5);
        assert_eq!(manifest.symbol_height(), 125.0);
        assert_eq!(
            manifest.layout_elements.iter().filter(|e| e.is_symbol()).count(),
            15
        );
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_reel_area() {
        let area = GridConfig::default().reel_area();
        assert_eq!(area, Rect::new(330.0, 175.0, 620.0, 370.0));
    }

    #[test]
    fn test_reel_index_resolution() {
        let explicit = LayoutElement {
            id: "sym_c1_r1".to_string(),
            reel: Some(3),
            ..Default::default()
        };
        assert_eq!(explicit.reel_index(), 3);

        let by_id = LayoutElement {
            id: "sym_c4_r2".to_string(),
            ..Default::default()
        };
        assert_eq!(by_id.reel_index(), 3);

        let by_parent = LayoutElement {
            id: "glow".to_string(),
            parent_id: Some("sym_c2_r1".to_string()),
            ..Default::default()
        };
        assert_eq!(by_parent.reel_index(), 1);

        let fallback = LayoutElement {
            id: "R1-C1 Symbol".to_string(),
            ..Default::default()
        };
        assert_eq!(fallback.reel_index(), 0);
    }

    #[test]
    fn test_stop_patterns() {
        assert_eq!(StopPattern::Sequential.stop_offset(3, 200.0), 600.0);
        assert_eq!(StopPattern::Slam.stop_offset(3, 200.0), 0.0);
        assert_eq!(StopPattern::Anticipation.stop_offset(0, 200.0), 0.0);
        assert_eq!(StopPattern::Anticipation.stop_offset(1, 200.0), 200.0);
        assert_eq!(StopPattern::Anticipation.stop_offset(3, 200.0), 1200.0);
        assert_eq!("slam".parse::<StopPattern>().unwrap(), StopPattern::Slam);
    }

    #[test]
    fn test_manifest_json() {
        let json = r#"{
            "meta": {
                "project_name": "Demo",
                "base_resolution": { "w": 1280, "h": 720 },
                "orientation": "landscape"
            },
            "layout_elements": [
                { "id": "bg", "type": "bg", "z_index": 0, "anchor": "top-left",
                  "rect_landscape": { "x": 0, "y": 0, "w": 1280, "h": 720 } },
                { "id": "sym_c2_r1", "type": "symbol", "z_index": 10, "anchor": "center",
                  "rect_landscape": { "x": 455, "y": 175, "w": 120, "h": 120 },
                  "asset_url": "assets/symbols/sym_h1.png" }
            ],
            "rhythm_spec": {
                "profiles": {
                    "normal": {
                        "spin_duration": 1800,
                        "reel_stop_interval": 250,
                        "bounce_strength": 20
                    }
                },
                "stop_pattern": "sequential"
            }
        }"#;

        let manifest = SlotManifest::from_json(json).unwrap();
        assert_eq!(manifest.meta.project_name, "Demo");
        assert_eq!(manifest.layout_elements.len(), 2);
        assert_eq!(manifest.layout_elements[1].anchor, Anchor::Center);
        assert_eq!(manifest.layout_elements[1].asset_src, "assets/symbols/sym_h1.png");
        assert_eq!(manifest.layout_elements[1].reel_index(), 1);

        let rhythm = manifest.rhythm_spec.unwrap();
        assert_eq!(rhythm.active_mode, SpeedMode::Normal);
        assert_eq!(rhythm.stop_time(2), Some(2300.0));
    }

    #[test]
    fn test_rhythm_from_catalog() {
        let catalog = PresetCatalog::builtin();
        let rhythm =
            RhythmSpec::from_catalog(&catalog, 125.0, SpeedMode::Normal, StopPattern::Sequential);
        let profile = rhythm.active_profile().unwrap();
        assert_eq!(profile.spin_duration, 2000.0);
        assert_eq!(profile.reel_stop_interval, 200.0);
        assert!((profile.bounce_strength - 37.5).abs() < 1e-9);

        let instant = rhythm.profiles[&SpeedMode::Instant];
        assert_eq!(instant.bounce_strength, 0.0);
    }

    #[test]
    fn test_apply_rhythm_to_catalog() {
        let catalog = PresetCatalog::builtin();
        let mut rhythm = RhythmSpec::default();
        rhythm.profiles.insert(
            SpeedMode::Fast,
            SpeedProfile {
                spin_duration: 900.0,
                reel_stop_interval: 80.0,
                bounce_strength: 10.0,
            },
        );
        catalog.apply_rhythm(&rhythm).unwrap();
        let fast = catalog.snapshot(SpeedMode::Fast);
        assert_eq!(fast.spin_duration, 900.0);
        assert_eq!(fast.interval_between_reels, 80.0);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut manifest = SlotManifest::default_layout();
        manifest.grid.cell_h = 0.0;
        manifest.grid.gap_y = 0.0;
        assert!(matches!(
            manifest.validate(),
            Err(ConfigError::InvalidSymbolHeight(_))
        ));
    }
}
