use crate::error::Error;
use crate::utils::embeds::Colors;

const INVALID_COLOR: &str = "Invalid color format! Use a 6-digit hex code like FF5733 or #9B59B6.";

/// Parse a hex colour string (`FF5733` or `#FF5733`) into an embed colour.
///
/// An absent or blank value yields the default poll colour.
pub fn parse_color(input: Option<&str>) -> Result<u32, Error> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => {
            let hex = normalize_color(value)?;
            u32::from_str_radix(&hex, 16).map_err(|_| Error::validation(INVALID_COLOR))
        }
        None => Ok(Colors::POLL),
    }
}

/// Validate a hex colour and return it in stored form: six uppercase digits, no `#`.
pub fn normalize_color(input: &str) -> Result<String, Error> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::validation(INVALID_COLOR));
    }

    Ok(hex.to_ascii_uppercase())
}

/// Colour for rendering a stored config value; corrupt values fall back to the default.
pub fn color_or_default(stored: &str) -> u32 {
    parse_color(Some(stored)).unwrap_or(Colors::POLL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_color(Some("FF5733")).unwrap(), 0xFF5733);
        assert_eq!(parse_color(Some("#9B59B6")).unwrap(), 0x9B59B6);
        assert_eq!(parse_color(Some("00ae86")).unwrap(), 0x00AE86);
    }

    #[test]
    fn absent_or_empty_is_default() {
        assert_eq!(parse_color(None).unwrap(), 0x00AE86);
        assert_eq!(parse_color(Some("")).unwrap(), 0x00AE86);
        assert_eq!(parse_color(Some("   ")).unwrap(), 0x00AE86);
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["red", "FF573", "FF57333", "#GGGGGG", "##FF5733"] {
            assert!(
                matches!(parse_color(Some(bad)), Err(Error::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn normalizes_to_stored_form() {
        assert_eq!(normalize_color("#9b59b6").unwrap(), "9B59B6");
        assert_eq!(normalize_color(" ff5733 ").unwrap(), "FF5733");
    }

    #[test]
    fn corrupt_stored_color_falls_back() {
        assert_eq!(color_or_default("nonsense"), Colors::POLL);
        assert_eq!(color_or_default("FF0000"), 0xFF0000);
    }
}
