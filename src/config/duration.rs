// Duration parsing for configuration values

use crate::Result;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Parse a duration string
///
/// Supported formats:
/// - "500ms" - 500 milliseconds
/// - "30s" - 30 seconds
/// - "5m" - 5 minutes
/// - "1h30m" - compound values are summed
/// - "2d" - 2 days
/// - "3600" - 3600 seconds (plain number)
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim().to_lowercase();

    if text.is_empty() {
        return Err(anyhow::anyhow!("Empty duration"));
    }

    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut rest = text.as_str();

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(anyhow::anyhow!("Invalid duration value: {}", input));
        }

        let value = rest[..digits]
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("Invalid duration value in {}: {}", input, e))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            "d" => Duration::from_secs(value.saturating_mul(86400)),
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid duration unit '{}' in {} (use ms, s, m, h, or d)",
                    unit,
                    input
                ));
            }
        };

        total = total.saturating_add(part);
    }

    Ok(total)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

/// serde adapter accepting either a duration string or a number of seconds
pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(seconds) => Ok(Duration::from_secs(seconds)),
        RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(172800));
        assert_eq!(parse_duration("3600").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_compound_duration() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("30x").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m5").is_err());
    }
}
