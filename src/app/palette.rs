//! Colors for the previewer canvas

use egui::Color32;

use slotforge::config::ElementType;

/// Parse a `#RRGGBB` or `RRGGBB` string
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Placeholder fill for an element without artwork
pub fn element_fill(element_type: ElementType) -> Color32 {
    match element_type {
        ElementType::Bg => Color32::from_rgb(24, 24, 32),
        ElementType::Panel | ElementType::ReelGroup | ElementType::Reel => {
            Color32::from_rgb(40, 44, 60)
        }
        ElementType::Symbol => Color32::from_rgb(70, 80, 120),
        ElementType::Button => Color32::from_rgb(200, 140, 40),
        ElementType::Effect | ElementType::Overlay => {
            Color32::from_rgba_unmultiplied(255, 255, 255, 40)
        }
        ElementType::Ui => Color32::from_rgb(90, 90, 100),
    }
}

/// Symbol tile color by symbol id: high symbols warm, low symbols cool
pub fn symbol_fill(symbol: &str) -> Color32 {
    match symbol {
        "H1" => Color32::from_rgb(220, 60, 60),
        "H2" => Color32::from_rgb(230, 130, 40),
        "H3" => Color32::from_rgb(220, 190, 50),
        "H4" => Color32::from_rgb(170, 80, 200),
        "A" => Color32::from_rgb(60, 140, 220),
        "K" => Color32::from_rgb(50, 170, 150),
        "Q" => Color32::from_rgb(90, 180, 90),
        _ => Color32::from_rgb(120, 130, 150),
    }
}

/// Fade a color by a motion blur amount
pub fn blurred(color: Color32, blur: f64) -> Color32 {
    let keep = (1.0 - blur / 20.0).clamp(0.35, 1.0);
    color.gamma_multiply(keep as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("9ca3af"), Some(Color32::from_rgb(0x9c, 0xa3, 0xaf)));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn test_blurred_never_vanishes() {
        let faded = blurred(Color32::WHITE, 100.0);
        assert!(faded.a() > 0);
        assert_eq!(blurred(Color32::WHITE, 0.0), Color32::WHITE);
    }
}
