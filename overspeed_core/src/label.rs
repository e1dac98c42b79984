// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Speed label grammar.
//!
//! Host entries expose no value attribute, only label text. A label is
//! usable when, after trimming and dropping one trailing `x`, it is either
//! the baseline literal (`"Normal"`, value 1) or a complete decimal literal
//! in `(0, MAX_RATE]`. Everything else (`"0"`, `"-1"`, `"9"`, `"abc"`,
//! `"1080p"`) parses to `None`.

use alloc::format;
use alloc::string::String;

/// Largest playback rate the engine will ever parse or inject.
pub const MAX_RATE: f64 = 8.0;

/// The label the host uses for the 1× rate.
pub const BASELINE_LABEL: &str = "Normal";

/// Returns whether `value` lies in the accepted rate range `(0, MAX_RATE]`.
#[must_use]
pub fn in_range(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= MAX_RATE
}

/// Parses a label into a rate, treating `baseline` as 1.
#[must_use]
pub fn parse_with_baseline(text: &str, baseline: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    if t == baseline {
        return Some(1.0);
    }
    let numeric = t.strip_suffix('x').unwrap_or(t).trim_end();
    // `f64::from_str` also accepts "inf", "NaN" and exponents; keep to plain
    // decimal literals.
    if !numeric
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        return None;
    }
    let value: f64 = numeric.parse().ok()?;
    in_range(value).then_some(value)
}

/// Parses a label into a rate using [`BASELINE_LABEL`].
#[must_use]
pub fn parse(text: &str) -> Option<f64> {
    parse_with_baseline(text, BASELINE_LABEL)
}

/// Returns whether `value` has no fractional part.
#[must_use]
pub fn is_integral(value: f64) -> bool {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rates are bounded by MAX_RATE; the round trip only tests integrality"
    )]
    let whole = value as i64;
    whole as f64 == value
}

/// Formats a preset label: `"3.0"` for integral values, else the shortest
/// decimal literal (`"2.5"`, `"1.75"`).
#[must_use]
pub fn format_preset(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if is_integral(value) {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Formats a readout value with two decimals and a trailing `x`: `"3.50x"`.
#[must_use]
pub fn format_readout(value: f64) -> String {
    format!("{value:.2}x")
}

/// Formats a compact readout: the preset label followed by `x`: `"3.0x"`.
#[must_use]
pub fn format_compact(value: f64) -> String {
    format!("{}x", format_preset(value))
}

/// Formats a summary row: the baseline label for 1, else the bare numeral.
#[must_use]
pub fn format_summary(value: f64, baseline: &str) -> String {
    if value == 1.0 {
        String::from(baseline)
    } else {
        format!("{value}")
    }
}

/// Returns the flex `order` that keeps presets visually ascending.
#[must_use]
pub fn visual_order(value: f64) -> u32 {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rates are in (0, MAX_RATE], so value × 100 is a small positive number"
    )]
    let order = (value * 100.0) as u32;
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_numbers() {
        assert_eq!(parse("0.25"), Some(0.25));
        assert_eq!(parse(" 1.75 "), Some(1.75));
        assert_eq!(parse("2"), Some(2.0));
        assert_eq!(parse("2.5x"), Some(2.5));
        assert_eq!(parse("8"), Some(8.0));
    }

    #[test]
    fn baseline_label_is_one() {
        assert_eq!(parse("Normal"), Some(1.0));
        assert_eq!(parse_with_baseline("Standard", "Standard"), Some(1.0));
        assert_eq!(parse_with_baseline("Normal", "Standard"), None);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for bad in ["0", "-1", "9", "abc", "", "   ", "1080p", "inf", "NaN", "1e0", "x"] {
            assert_eq!(parse(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn preset_format_keeps_one_decimal_for_integers() {
        assert_eq!(format_preset(3.0), "3.0");
        assert_eq!(format_preset(4.0), "4.0");
        assert_eq!(format_preset(2.5), "2.5");
        assert_eq!(format_preset(1.75), "1.75");
    }

    #[test]
    fn readout_and_summary_formats() {
        assert_eq!(format_readout(3.5), "3.50x");
        assert_eq!(format_readout(1.0), "1.00x");
        assert_eq!(format_compact(3.0), "3.0x");
        assert_eq!(format_summary(1.0, BASELINE_LABEL), "Normal");
        assert_eq!(format_summary(2.5, BASELINE_LABEL), "2.5");
        assert_eq!(format_summary(3.0, BASELINE_LABEL), "3");
    }

    #[test]
    fn visual_order_is_monotonic() {
        assert_eq!(visual_order(2.5), 250);
        assert!(visual_order(3.0) < visual_order(3.5));
        assert!(visual_order(0.25) < visual_order(1.0));
    }
}
