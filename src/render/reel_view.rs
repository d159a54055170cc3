//! Reel strip view
//!
//! Cosmetic symbol strips and the mapping from an unbounded reel position to
//! what is on screen. Wrapping happens here, never in the controller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub const SYMBOL_POOL: [&str; 8] = ["H1", "H2", "H3", "H4", "A", "K", "Q", "J"];

pub const DEFAULT_STRIP_LENGTH: usize = 30;

/// Shown when a strip is empty
const FALLBACK_SYMBOL: &str = "A";

/// Circular list of symbols scrolled by one reel
#[derive(Debug, Clone, PartialEq)]
pub struct ReelStrip {
    reel_id: usize,
    symbols: Vec<&'static str>,
}

impl ReelStrip {
    /// Random strip; the same seed and reel always give the same strip
    pub fn generate(reel_id: usize, len: usize, seed: u64) -> Self {
        let len = if len == 0 { DEFAULT_STRIP_LENGTH } else { len };
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(reel_id as u64));
        let symbols: Vec<&'static str> = (0..len)
            .map(|_| SYMBOL_POOL[rng.random_range(0..SYMBOL_POOL.len())])
            .collect();

        debug!(
            "Reel strip {} generated: {} ...",
            reel_id,
            symbols.iter().take(10).copied().collect::<Vec<_>>().join(", ")
        );
        Self { reel_id, symbols }
    }

    pub fn from_symbols(reel_id: usize, symbols: Vec<&'static str>) -> Self {
        Self { reel_id, symbols }
    }

    pub fn reel_id(&self) -> usize {
        self.reel_id
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[&'static str] {
        &self.symbols
    }

    /// Symbol at any index; indices wrap in both directions
    pub fn symbol_at(&self, index: i64) -> &'static str {
        if self.symbols.is_empty() {
            return FALLBACK_SYMBOL;
        }
        let len = self.symbols.len() as i64;
        self.symbols[index.rem_euclid(len) as usize]
    }

    /// Symbols covering `rows` rows for a reel position, including the one
    /// sliding in from above
    pub fn visible_symbols(
        &self,
        position: f64,
        symbol_height: f64,
        rows: usize,
    ) -> Vec<VisibleSymbol> {
        let window = strip_window(position, symbol_height, self.len());
        (-1..rows as i64)
            .map(|row| VisibleSymbol {
                symbol: self.symbol_at(window.top_index as i64 + row),
                y: row as f64 * symbol_height + window.offset,
            })
            .collect()
    }
}

/// Image file for a symbol id
pub fn asset_path(symbol: &str) -> String {
    let file = match symbol {
        "H1" => "h1",
        "H2" => "h2",
        "H3" => "h3",
        "H4" => "h4",
        "A" => "l1",
        "K" => "l2",
        "Q" => "l3",
        "J" => "l4",
        _ => "l1",
    };
    format!("assets/symbols/sym_{file}.png")
}

/// Part of the strip on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripWindow {
    /// Strip index drawn in the top row
    pub top_index: usize,
    /// Downward pixel offset of the top row, in `[0, symbol_height)`
    pub offset: f64,
}

/// Map a reel position onto the strip
///
/// Reels scroll downward, so the top row walks backwards through the strip.
pub fn strip_window(position: f64, symbol_height: f64, strip_length: usize) -> StripWindow {
    if strip_length == 0
        || symbol_height.is_nan()
        || symbol_height <= 0.0
        || !position.is_finite()
    {
        return StripWindow {
            top_index: 0,
            offset: 0.0,
        };
    }

    let wrapped = position.rem_euclid(symbol_height * strip_length as f64);
    let scrolled = (wrapped / symbol_height).floor();
    // rounding can push the offset onto the next symbol
    let offset = (wrapped - scrolled * symbol_height).clamp(0.0, symbol_height);
    let (scrolled, offset) = if offset >= symbol_height {
        (scrolled as i64 + 1, 0.0)
    } else {
        (scrolled as i64, offset)
    };

    StripWindow {
        top_index: (-scrolled).rem_euclid(strip_length as i64) as usize,
        offset,
    }
}

/// A symbol placed relative to the top of its reel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSymbol {
    pub symbol: &'static str,
    pub y: f64,
}
