//! Resolves the CMS theme record into the concrete colors the render
//! layer uses. The resolved [`Theme`] is an explicit value handed down
//! to every render function; nothing writes style state anywhere
//! global, so a render can be driven by any theme in a test.

use ratatui::style::Color;

use crate::models::ThemeSettings;

// Documented fallbacks, applied field-by-field whenever the CMS record
// is missing or a value does not parse as #RRGGBB.
const DEFAULT_PRIMARY: &str = "#2563EB";
const DEFAULT_SECONDARY: &str = "#0EA5E9";
const DEFAULT_TERTIARY: &str = "#8B5CF6";
const DEFAULT_TEXT: &str = "#E5E7EB";
const DEFAULT_LINK: &str = "#60A5FA";
const DEFAULT_NAVIGATION: &str = "#1F2937";
const DEFAULT_HEADER: &str = "#111827";
const DEFAULT_SECTION: &str = "#374151";
const DEFAULT_HEADING_FONT: &str = "Helvetica, Arial, sans-serif";
const DEFAULT_BODY_FONT: &str = "Georgia, serif";
const DEFAULT_FONT_WEIGHT: &str = "400";
const DEFAULT_LOGO: &str = "default";

/// Fully resolved theme. Fonts and the logo choice do not affect a
/// terminal render but are carried so the settings view can show what
/// the CMS has configured.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub text: Color,
    pub link: Color,
    pub navigation: Color,
    pub header: Color,
    pub section: Color,
    /// Derived: black or white, whichever contrasts with `section`.
    pub section_text: Color,
    pub heading_font: String,
    pub heading_font_weight: String,
    pub body_font: String,
    pub body_font_weight: String,
    pub logo: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::resolve(None)
    }
}

impl Theme {
    /// Apply a fetched settings record, falling back to the defaults
    /// for every absent or malformed field. `None` yields the full
    /// default theme.
    pub fn resolve(settings: Option<&ThemeSettings>) -> Self {
        let empty = ThemeSettings::default();
        let s = settings.unwrap_or(&empty);

        let section_rgb = resolve_rgb(s.section_color.as_deref(), DEFAULT_SECTION);
        Theme {
            primary: color(resolve_rgb(s.primary_color.as_deref(), DEFAULT_PRIMARY)),
            secondary: color(resolve_rgb(s.secondary_color.as_deref(), DEFAULT_SECONDARY)),
            tertiary: color(resolve_rgb(s.tertiary_color.as_deref(), DEFAULT_TERTIARY)),
            text: color(resolve_rgb(s.text_color.as_deref(), DEFAULT_TEXT)),
            link: color(resolve_rgb(s.link_color.as_deref(), DEFAULT_LINK)),
            navigation: color(resolve_rgb(s.navigation_color.as_deref(), DEFAULT_NAVIGATION)),
            header: color(resolve_rgb(s.header_color.as_deref(), DEFAULT_HEADER)),
            section: color(section_rgb),
            section_text: contrast_text(section_rgb),
            heading_font: field(s.heading_font.as_deref(), DEFAULT_HEADING_FONT),
            heading_font_weight: field(s.heading_font_weight.as_deref(), DEFAULT_FONT_WEIGHT),
            body_font: field(s.body_font.as_deref(), DEFAULT_BODY_FONT),
            body_font_weight: field(s.body_font_weight.as_deref(), DEFAULT_FONT_WEIGHT),
            logo: field(s.logo.as_deref(), DEFAULT_LOGO),
        }
    }
}

fn field(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn resolve_rgb(value: Option<&str>, default: &str) -> (u8, u8, u8) {
    value
        .and_then(parse_hex)
        .or_else(|| parse_hex(default))
        .unwrap_or((0, 0, 0))
}

fn color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Parse `#RRGGBB` (leading `#` optional).
fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Relative luminance on a 0.0–1.0 scale (ITU-R BT.601 weights).
fn luminance((r, g, b): (u8, u8, u8)) -> f64 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

/// Black text on light backgrounds, white on dark ones.
fn contrast_text(rgb: (u8, u8, u8)) -> Color {
    if luminance(rgb) > 0.5 {
        Color::Black
    } else {
        Color::White
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemeSettings;

    #[test]
    fn white_section_gets_black_text() {
        let settings = ThemeSettings {
            section_color: Some("#FFFFFF".into()),
            ..ThemeSettings::default()
        };
        assert_eq!(Theme::resolve(Some(&settings)).section_text, Color::Black);
    }

    #[test]
    fn black_section_gets_white_text() {
        let settings = ThemeSettings {
            section_color: Some("#000000".into()),
            ..ThemeSettings::default()
        };
        assert_eq!(Theme::resolve(Some(&settings)).section_text, Color::White);
    }

    #[test]
    fn contrast_follows_the_luminance_threshold() {
        // Pure red is dark (luminance 0.299), pure yellow is light (0.886).
        assert_eq!(contrast_text((255, 0, 0)), Color::White);
        assert_eq!(contrast_text((255, 255, 0)), Color::Black);
    }

    #[test]
    fn missing_navigation_color_takes_the_documented_default() {
        let theme = Theme::resolve(Some(&ThemeSettings::default()));
        assert_eq!(theme.navigation, Color::Rgb(0x1F, 0x29, 0x37));
    }

    #[test]
    fn malformed_color_falls_back() {
        let settings = ThemeSettings {
            primary_color: Some("#12GG34".into()),
            ..ThemeSettings::default()
        };
        let theme = Theme::resolve(Some(&settings));
        assert_eq!(theme.primary, Theme::default().primary);
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(parse_hex("a1b2c3"), Some((0xA1, 0xB2, 0xC3)));
        assert_eq!(parse_hex("#a1b2c3"), Some((0xA1, 0xB2, 0xC3)));
        assert_eq!(parse_hex("#a1b2"), None);
    }

    #[test]
    fn absent_record_yields_the_full_default_theme() {
        let theme = Theme::resolve(None);
        assert_eq!(theme.heading_font, "Helvetica, Arial, sans-serif");
        // Default section is dark, so text must be white.
        assert_eq!(theme.section_text, Color::White);
    }
}
