//! Department theming
//!
//! Branding colours are turned into CSS custom properties. Only 6-digit hex
//! colours are understood; anything else leaves its variables unset.

use shared::models::BrandingSettings;
use std::fmt::Write as _;

pub const DARK_TEXT: &str = "#171717";
pub const LIGHT_TEXT: &str = "#FAFAFA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Each channel scaled by `percent`/100, rounded down
    pub fn scaled(self, percent: u16) -> Self {
        let scale = |c: u8| (u16::from(c) * percent / 100).min(255) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    /// Perceived brightness ×1000 (weights 299/587/114)
    fn brightness_milli(self) -> u32 {
        u32::from(self.r) * 299 + u32::from(self.g) * 587 + u32::from(self.b) * 114
    }

    /// Text colour readable on this background
    pub fn text_color(self) -> &'static str {
        if self.brightness_milli() > 128_000 {
            DARK_TEXT
        } else {
            LIGHT_TEXT
        }
    }

    /// `r, g, b`
    pub fn triplet(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }
}

/// CSS variables derived from a department's branding, in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePalette {
    vars: Vec<(&'static str, String)>,
}

impl ThemePalette {
    pub fn derive(branding: &BrandingSettings) -> Self {
        let mut palette = Self::default();

        if let Some(rgb) = Rgb::from_hex(&branding.primary_color) {
            let hover = rgb.scaled(85);
            palette.set("--theme-primary", branding.primary_color.clone());
            palette.set("--theme-primary-rgb", rgb.triplet());
            palette.set("--theme-primary-light", format!("rgba({}, 0.1)", rgb.triplet()));
            palette.set("--theme-primary-lighter", format!("rgba({}, 0.05)", rgb.triplet()));
            palette.set("--theme-primary-hover", format!("rgb({})", hover.triplet()));
        }

        if let Some(rgb) = Rgb::from_hex(&branding.secondary_color) {
            let hover = rgb.scaled(92);
            palette.set("--theme-secondary", branding.secondary_color.clone());
            palette.set("--theme-secondary-rgb", rgb.triplet());
            palette.set("--theme-secondary-hover", format!("rgb({})", hover.triplet()));
        }

        // The background is applied verbatim; only the text colour needs a parse
        if !branding.background_color.is_empty() {
            palette.set("--theme-background", branding.background_color.clone());
            if let Some(rgb) = Rgb::from_hex(&branding.background_color) {
                palette.set("--theme-text", rgb.text_color().to_string());
            }
        }

        palette
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render as a `:root { ... }` block
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.vars {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }

    fn set(&mut self, name: &'static str, value: String) {
        self.vars.push((name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branding(primary: &str, secondary: &str, background: &str) -> BrandingSettings {
        BrandingSettings {
            primary_color: primary.into(),
            secondary_color: secondary.into(),
            background_color: background.into(),
            logo_url: None,
        }
    }

    #[test]
    fn test_hex_parsing_accepts_six_digits_only() {
        assert_eq!(Rgb::from_hex("#FF8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::from_hex("ff8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::from_hex("#aBcDeF"), Some(Rgb { r: 0xab, g: 0xcd, b: 0xef }));

        for bad in ["#FFF", "FFF", "#FF8000AA", "red", "rgba(1,2,3,1)", "", "#", "##FF8000", "#GG0000", "#+1+2+3"] {
            assert_eq!(Rgb::from_hex(bad), None, "{bad} should be rejected");
        }
    }

    #[test]
    fn test_text_colour_threshold() {
        assert_eq!(Rgb::from_hex("#FFFFFF").unwrap().text_color(), DARK_TEXT);
        assert_eq!(Rgb::from_hex("#000000").unwrap().text_color(), LIGHT_TEXT);
        // Grey 128 is exactly 128.0: not above the threshold
        assert_eq!(Rgb::from_hex("#808080").unwrap().text_color(), LIGHT_TEXT);
        assert_eq!(Rgb::from_hex("#818181").unwrap().text_color(), DARK_TEXT);
    }

    #[test]
    fn test_derived_palette() {
        let palette = ThemePalette::derive(&branding("#6366F1", "#F59E0B", "#FFFFFF"));
        assert_eq!(palette.get("--theme-primary"), Some("#6366F1"));
        assert_eq!(palette.get("--theme-primary-rgb"), Some("99, 102, 241"));
        assert_eq!(palette.get("--theme-primary-light"), Some("rgba(99, 102, 241, 0.1)"));
        assert_eq!(palette.get("--theme-primary-lighter"), Some("rgba(99, 102, 241, 0.05)"));
        assert_eq!(palette.get("--theme-primary-hover"), Some("rgb(84, 86, 204)"));
        assert_eq!(palette.get("--theme-secondary-hover"), Some("rgb(225, 145, 10)"));
        assert_eq!(palette.get("--theme-background"), Some("#FFFFFF"));
        assert_eq!(palette.get("--theme-text"), Some(DARK_TEXT));
    }

    #[test]
    fn test_malformed_colours_are_skipped() {
        let palette = ThemePalette::derive(&branding("#FFF", "", "navy"));
        assert!(palette.get("--theme-primary").is_none());
        assert!(palette.get("--theme-secondary").is_none());
        assert_eq!(palette.get("--theme-background"), Some("navy"));
        assert!(palette.get("--theme-text").is_none());
    }

    #[test]
    fn test_css_rendering() {
        let palette = ThemePalette::derive(&branding("", "", "#000000"));
        assert_eq!(
            palette.to_css(),
            ":root {\n  --theme-background: #000000;\n  --theme-text: #FAFAFA;\n}\n"
        );
    }
}
