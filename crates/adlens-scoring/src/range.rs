//! Parsing of ad-library range strings into a single estimate.

/// Multiplier applied to `N` for `"<N"`: the midpoint of `[0, N]`.
pub const BELOW_BOUND_FACTOR: f64 = 0.5;

/// Multiplier applied to `N` for `">N"`. Stands in for the unknown upper
/// bound of an open range. Uncalibrated.
pub const ABOVE_BOUND_FACTOR: f64 = 1.5;

/// Factors used to turn open-ended ranges into point estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeHeuristics {
    pub below_factor: f64,
    pub above_factor: f64,
}

impl Default for RangeHeuristics {
    fn default() -> Self {
        Self {
            below_factor: BELOW_BOUND_FACTOR,
            above_factor: ABOVE_BOUND_FACTOR,
        }
    }
}

/// Parse a range string with the default heuristics.
///
/// Returns `0.0` for missing or unparsable input; callers treat that as
/// "unknown", not as a measured zero.
#[must_use]
pub fn parse_range(text: Option<&str>) -> f64 {
    parse_range_with(text, RangeHeuristics::default())
}

/// Parse `"A-B"`, `"<N"`, `">N"` or `"N"` into a representative number.
///
/// - `"A-B"` gives the midpoint.
/// - `"<N"` gives `N * below_factor`.
/// - `">N"` gives `N * above_factor`.
/// - `"N"` gives `N`.
///
/// Currency symbols, thousands separators and whitespace are ignored.
#[must_use]
pub fn parse_range_with(text: Option<&str>, heuristics: RangeHeuristics) -> f64 {
    let Some(raw) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0.0;
    };

    match estimate(raw, heuristics) {
        Some(value) => value,
        None => {
            tracing::debug!(range = raw, "unparsable range string; treating as unknown");
            0.0
        }
    }
}

fn estimate(raw: &str, heuristics: RangeHeuristics) -> Option<f64> {
    if let Some(rest) = raw.strip_prefix('<') {
        return number(rest).map(|n| n * heuristics.below_factor);
    }
    if let Some(rest) = raw.strip_prefix('>') {
        return number(rest).map(|n| n * heuristics.above_factor);
    }
    if let Some((low, high)) = raw.split_once('-') {
        let low = number(low)?;
        let high = number(high)?;
        return Some((low + high) / 2.0);
    }
    number(raw)
}

/// Strip everything except digits and the decimal point, then parse.
fn number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_range_is_midpoint() {
        assert_eq!(parse_range(Some("100-500")), 300.0);
    }

    #[test]
    fn below_bound_is_half() {
        assert_eq!(parse_range(Some("<100")), 50.0);
    }

    #[test]
    fn above_bound_is_scaled_up() {
        assert_eq!(parse_range(Some(">1000")), 1500.0);
    }

    #[test]
    fn plain_number_passes_through() {
        assert_eq!(parse_range(Some("250")), 250.0);
    }

    #[test]
    fn empty_and_missing_are_zero() {
        assert_eq!(parse_range(Some("")), 0.0);
        assert_eq!(parse_range(Some("   ")), 0.0);
        assert_eq!(parse_range(None), 0.0);
    }

    #[test]
    fn unparsable_is_zero() {
        assert_eq!(parse_range(Some("N/A")), 0.0);
        assert_eq!(parse_range(Some("unknown-range")), 0.0);
        assert_eq!(parse_range(Some("100-")), 0.0);
    }

    #[test]
    fn separators_and_currency_are_stripped() {
        assert_eq!(parse_range(Some("$1,000-$2,000")), 1500.0);
        assert_eq!(parse_range(Some("> 1,000,000")), 1_500_000.0);
        assert_eq!(parse_range(Some("€ 250")), 250.0);
    }

    #[test]
    fn custom_heuristics_are_applied() {
        let heuristics = RangeHeuristics {
            below_factor: 0.25,
            above_factor: 2.0,
        };
        assert_eq!(parse_range_with(Some("<100"), heuristics), 25.0);
        assert_eq!(parse_range_with(Some(">100"), heuristics), 200.0);
        assert_eq!(parse_range_with(Some("100-200"), heuristics), 150.0);
    }
}
