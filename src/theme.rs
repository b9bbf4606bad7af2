//! Theme loading: btop-style `theme[key]="value"` files and hex → ratatui Color.

use crate::grid::DotColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Dot colours (indexed by [`DotColor::index`]) and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    pub dots: [Color; 6],
    /// Board background.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, moves).
    pub main_fg: Color,
    /// Titles and labels.
    pub title: Color,
    /// Hints and the keyboard cursor.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Theme keys consulted for each dot colour, first match wins.
const DOT_KEYS: [(DotColor, &[&str]); 6] = [
    (DotColor::Red, &["dot_red", "cpu_end", "temp_end"]),
    (DotColor::Blue, &["dot_blue", "cpu_box"]),
    (DotColor::Green, &["dot_green", "mem_box", "cpu_start"]),
    (DotColor::Yellow, &["dot_yellow", "cpu_mid"]),
    (DotColor::Purple, &["dot_purple", "net_box"]),
    (DotColor::Orange, &["dot_orange", "proc_misc"]),
];

/// One Dark hex values, in `DotColor::ALL` order.
const ONEDARK_DOTS: [&str; 6] = ["#E06C75", "#61AFEF", "#98C379", "#E5C07B", "#C678DD", "#D19A66"];
const HIGH_CONTRAST_DOTS: [&str; 6] = ["#FF0000", "#0088FF", "#00FF00", "#FFFF00", "#FF00FF", "#FF8800"];
const COLORBLIND_DOTS: [&str; 6] = ["#CC3311", "#0077BB", "#009988", "#BBBB00", "#EE3377", "#EE7733"];

impl Default for Theme {
    fn default() -> Self {
        Self {
            dots: hex_table(ONEDARK_DOTS),
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }
}

impl Theme {
    /// Load from a btop-style file. No path, or a path that does not exist, gives the defaults.
    /// `palette` then overrides the dot colours for high-contrast or colorblind play.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.dots = hex_table(HIGH_CONTRAST_DOTS),
            crate::Palette::Colorblind => self.dots = hex_table(COLORBLIND_DOTS),
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let mut theme = Self::default();
        for (color, keys) in DOT_KEYS {
            if let Some(c) = keys.iter().find_map(|k| get(k)) {
                theme.dots[color.index()] = c;
            }
        }
        theme.bg = get("main_bg").or_else(|| get("meter_bg")).unwrap_or(theme.bg);
        theme.div_line = get("div_line").unwrap_or(theme.div_line);
        theme.main_fg = get("main_fg").unwrap_or(theme.main_fg);
        theme.title = get("title").unwrap_or(theme.title);
        theme.inactive_fg = get("inactive_fg").unwrap_or(theme.inactive_fg);
        theme
    }

    #[inline]
    pub fn dot_color(&self, color: DotColor) -> Color {
        self.dots[color.index()]
    }
}

fn hex_table(hex: [&str; 6]) -> [Color; 6] {
    hex.map(|h| parse_hex(h).unwrap_or(Color::Gray))
}

/// Parse btop-style theme text into key -> value.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let rest = l.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
    match s.len() {
        6 => Ok(Color::Rgb(channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?)),
        3 => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#E06C75").unwrap();
        assert!(matches!(c, Color::Rgb(0xE0, 0x6C, 0x75)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_junk() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_hex_rejects_non_ascii() {
        assert!(parse_hex("#aé123").is_err());
        assert!(parse_hex("#é1").is_err());
        let map = parse_theme_file("theme[dot_red]=\"#aé123\"");
        let t = Theme::from_map(&map);
        assert_eq!(t.dot_color(DotColor::Red), Theme::default().dot_color(DotColor::Red));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file("# comment\ntheme[meter_bg]=\"#31353F\"\ntheme[empty]=\"\"\n");
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
        assert!(!map.contains_key("empty"));
    }

    #[test]
    fn test_dot_keys_override_defaults() {
        let map = parse_theme_file("theme[dot_blue]=\"#000080\"\ntheme[cpu_end]='#800000'");
        let t = Theme::from_map(&map);
        assert!(matches!(t.dot_color(DotColor::Blue), Color::Rgb(0, 0, 0x80)));
        assert!(matches!(t.dot_color(DotColor::Red), Color::Rgb(0x80, 0, 0)));
        assert_eq!(t.dot_color(DotColor::Green), Theme::default().dot_color(DotColor::Green));
    }

    #[test]
    fn test_palette_override() {
        let t = Theme::load(None, crate::Palette::HighContrast).unwrap();
        assert!(matches!(t.dot_color(DotColor::Red), Color::Rgb(255, 0, 0)));
    }
}
