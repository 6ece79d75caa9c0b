//! Cell parsers for the string-encoded fields of the scraped CSV files.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ParseWarning;

/// A `"<count> (<pct>%)"` cell split into its parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PercentageStat {
    pub count: Option<u32>,
    /// Percentage in `[0, 100]`.
    pub pct: Option<f64>,
}

/// Parses strings like `"408 (85%)"` into a count and a percentage.
///
/// Empty cells give a [`PercentageStat`] with both parts absent. A bare
/// integer is accepted as a count without percentage.
///
/// # Errors
///
/// Returns a [`ParseWarning`] for any other shape, or a percentage above 100.
pub fn parse_percentage_string(value: &str) -> Result<PercentageStat, ParseWarning> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(PercentageStat::default());
    }

    let warning = || ParseWarning::new(value, "count with percentage");

    let Some((count, rest)) = value.split_once('(') else {
        let count = value.parse::<u32>().map_err(|_| warning())?;
        return Ok(PercentageStat {
            count: Some(count),
            pct: None,
        });
    };

    let count = count.trim().parse::<u32>().map_err(|_| warning())?;
    let pct = rest
        .strip_suffix(')')
        .map(str::trim)
        .and_then(|p| p.strip_suffix('%'))
        .map(str::trim)
        .ok_or_else(warning)?;
    let pct = parse_pct_digits(pct).ok_or_else(warning)?;

    Ok(PercentageStat {
        count: Some(count),
        pct: Some(pct),
    })
}

/// Parses a possession cell like `"55%"`. The percent sign is optional.
///
/// # Errors
///
/// Returns a [`ParseWarning`] when the value is not a number in `[0, 100]`.
pub fn parse_possession(value: &str) -> Result<Option<f64>, ParseWarning> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let digits = value.strip_suffix('%').unwrap_or(value).trim_end();
    parse_pct_digits(digits)
        .map(Some)
        .ok_or_else(|| ParseWarning::new(value, "possession percentage"))
}

fn parse_pct_digits(s: &str) -> Option<f64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    s.parse::<f64>().ok().filter(|p| (0.0..=100.0).contains(p))
}

/// Parses a match date.
///
/// The scraper writes dates as `"Saturday, August 12, 2023"`; ISO dates are
/// accepted too.
pub fn parse_date(value: &str) -> Result<NaiveDate, ParseWarning> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%A, %B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| ParseWarning::new(value, "match date"))
}

/// Parses a home-first score such as `"2 - 1"`.
pub fn parse_score(value: &str) -> Result<(u32, u32), ParseWarning> {
    let value = value.trim();
    let warning = || ParseWarning::new(value, "score");

    let (home, away) = value
        .split_once(['-', '–', ':'])
        .ok_or_else(warning)?;
    let home = home.trim().parse::<u32>().map_err(|_| warning())?;
    let away = away.trim().parse::<u32>().map_err(|_| warning())?;
    Ok((home, away))
}

/// Parses a non-negative count. Empty cells count as zero.
///
/// Whole-valued floats (`"3.0"`) are accepted since spreadsheet round trips
/// tend to produce them.
pub fn parse_count(value: &str) -> Result<u32, ParseWarning> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = value.parse::<u32>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(ParseWarning::new(value, "count")),
    }
}

/// Parses a non-negative decimal such as an xG value. Empty cells count as zero.
pub fn parse_decimal(value: &str) -> Result<f64, ParseWarning> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .ok_or_else(|| ParseWarning::new(value, "decimal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percentage_string() {
        let stat = parse_percentage_string("408 (85%)").unwrap();
        assert_eq!(stat.count, Some(408));
        assert_eq!(stat.pct, Some(85.0));
    }

    #[test]
    fn test_parse_percentage_string_tolerates_spacing() {
        let stat = parse_percentage_string(" 12(40 %) ").unwrap();
        assert_eq!(stat.count, Some(12));
        assert_eq!(stat.pct, Some(40.0));
    }

    #[test]
    fn test_parse_percentage_string_empty_is_absent() {
        assert_eq!(parse_percentage_string("").unwrap(), PercentageStat::default());
        assert_eq!(parse_percentage_string("   ").unwrap(), PercentageStat::default());
    }

    #[test]
    fn test_parse_percentage_string_bare_count() {
        let stat = parse_percentage_string("17").unwrap();
        assert_eq!(stat.count, Some(17));
        assert_eq!(stat.pct, None);
    }

    #[test]
    fn test_parse_percentage_string_malformed() {
        for bad in ["abc", "408 (85)", "408 (x%)", "(85%)", "408 (185%)", "-3 (10%)"] {
            let warning = parse_percentage_string(bad).unwrap_err();
            assert_eq!(warning.value, bad.trim());
        }
        // recovered as absent by callers
        assert_eq!(
            parse_percentage_string("abc").unwrap_or_default(),
            PercentageStat::default()
        );
    }

    #[test]
    fn test_parse_possession() {
        assert_eq!(parse_possession("55%").unwrap(), Some(55.0));
        assert_eq!(parse_possession("0%").unwrap(), Some(0.0));
        assert_eq!(parse_possession("47.5%").unwrap(), Some(47.5));
        assert_eq!(parse_possession("61").unwrap(), Some(61.0));
        assert_eq!(parse_possession("").unwrap(), None);
    }

    #[test]
    fn test_parse_possession_malformed() {
        assert!(parse_possession("half").is_err());
        assert!(parse_possession("120%").is_err());
        assert!(parse_possession("%").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 8, 12).unwrap();
        assert_eq!(parse_date("Saturday, August 12, 2023").unwrap(), expected);
        assert_eq!(parse_date("2023-08-12").unwrap(), expected);
        assert!(parse_date("12/08/2023").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("2 - 1").unwrap(), (2, 1));
        assert_eq!(parse_score("0-0").unwrap(), (0, 0));
        assert_eq!(parse_score("3 – 2").unwrap(), (3, 2));
        assert_eq!(parse_score("1:4").unwrap(), (1, 4));
        assert!(parse_score("postponed").is_err());
        assert!(parse_score("").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("14").unwrap(), 14);
        assert_eq!(parse_count("3.0").unwrap(), 3);
        assert_eq!(parse_count("").unwrap(), 0);
        assert!(parse_count("3.5").is_err());
        assert!(parse_count("-1").is_err());
        assert!(parse_count("n/a").is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.74").unwrap(), 1.74);
        assert_eq!(parse_decimal("").unwrap(), 0.0);
        assert!(parse_decimal("NaN").is_err());
        assert!(parse_decimal("-0.2").is_err());
    }
}
