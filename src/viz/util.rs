//! Utility functions for visualization: colors, locale mapping, tick formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`, `ko`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        "ko" | "ko_kr" => (&Locale::ko, '.'),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format with `decimals` places using the locale's grouping and decimal separator.
pub fn format_decimal(v: f64, decimals: usize, locale_tag: &str) -> String {
    if !v.is_finite() {
        return "NA".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let int_value: u64 = int_part.parse().unwrap_or(0);
    let mut out = String::new();
    if v < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&int_value.to_formatted_string(locale));
    if let Some(f) = frac_part {
        out.push(dec_sep);
        out.push_str(f);
    }
    out
}

/// Tick label for a percentage axis: whole numbers from 10 up, one decimal below.
pub fn rate_tick_label(v: f64, locale_tag: &str) -> String {
    let decimals = if v.abs() >= 10.0 || v == 0.0 { 0 } else { 1 };
    format_decimal(v, decimals, locale_tag)
}

/// Tick label for an axis that only has integer positions; blank between them.
pub fn integer_tick_label(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{}", v.round() as i64)
    } else {
        String::new()
    }
}

/// Left label area width for the Y axis (in pixels), based on the widest tick label.
///
/// Returns a width clamped to a sensible range to avoid extremes.
pub fn compute_left_label_area_px(labels: &[String], font_px: u32) -> u32 {
    let max_px = labels
        .iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0);
    // Padding for tick marks and the rotated axis title.
    max_px.saturating_add(36).clamp(56, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_uses_locale_separator() {
        assert_eq!(format_decimal(1234.5, 1, "en"), "1,234.5");
        assert_eq!(format_decimal(1234.5, 1, "de"), "1.234,5");
        assert_eq!(format_decimal(0.25, 2, "fr"), "0,25");
    }

    #[test]
    fn negative_and_nan() {
        assert_eq!(format_decimal(-2.0, 0, "en"), "-2");
        assert_eq!(format_decimal(-0.01, 1, "en"), "0.0");
        assert_eq!(format_decimal(f64::NAN, 1, "en"), "NA");
    }

    #[test]
    fn integer_ticks_skip_fractions() {
        assert_eq!(integer_tick_label(3.0), "3");
        assert_eq!(integer_tick_label(-2.0), "-2");
        assert_eq!(integer_tick_label(2.5), "");
    }
}
