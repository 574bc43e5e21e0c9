//! Postal address heuristics
//!
//! Free-text addresses follow the comma convention produced by the intake
//! forms: `line1, city, STATE ZIP, country`. Parsing is best effort and
//! never fails; segments that are missing come back empty. Addresses with
//! embedded commas (suite descriptions and the like) are a known limitation:
//! everything after the fourth segment is ignored.

use serde::{Deserialize, Serialize};

/// Structured address parts recovered from, or joined into, a free-text address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParts {
    /// Street line (number and street name)
    pub address_line1: String,
    /// City or town
    pub city: String,
    /// State or province code
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Country name
    pub country: String,
}

/// Street number and street name decomposed from an address line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetParts {
    /// Leading house number, empty when the line does not start with digits
    pub number: String,
    /// Remainder of the line
    pub street: String,
}

/// Parse a comma-separated free-text address into its parts
pub fn parse_free_text(address: &str) -> AddressParts {
    let segments: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    let segment = |index: usize| segments.get(index).copied().unwrap_or_default().to_string();

    let mut state_zip = segments
        .get(2)
        .map(|s| s.split_whitespace())
        .into_iter()
        .flatten();
    let state = state_zip.next().unwrap_or_default().to_string();
    let zip_code = state_zip.next().unwrap_or_default().to_string();

    AddressParts {
        address_line1: segment(0),
        city: segment(1),
        state,
        zip_code,
        country: segment(3),
    }
}

/// Join address parts back into the comma-separated free-text form
///
/// State and ZIP share one segment (`IL 60641`); when only one of them is
/// present it stands alone. Empty segments are omitted.
pub fn format_free_text(parts: &AddressParts) -> String {
    let state_zip = match (parts.state.is_empty(), parts.zip_code.is_empty()) {
        (false, false) => format!("{} {}", parts.state, parts.zip_code),
        (false, true) => parts.state.clone(),
        (true, false) => parts.zip_code.clone(),
        (true, true) => String::new(),
    };

    [
        parts.address_line1.as_str(),
        parts.city.as_str(),
        state_zip.as_str(),
        parts.country.as_str(),
    ]
    .iter()
    .filter(|segment| !segment.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(", ")
}

/// Split an address line into its leading house number and street name
///
/// The number is the run of ASCII digits at the start of the trimmed line,
/// and only counts when whitespace follows it (`12C Main St` has no number).
pub fn split_street(address_line1: &str) -> StreetParts {
    let line = address_line1.trim();
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    let rest = &line[digits..];

    if digits == 0 || !rest.starts_with(char::is_whitespace) {
        return StreetParts {
            number: String::new(),
            street: line.to_string(),
        };
    }

    StreetParts {
        number: line[..digits].to_string(),
        street: rest.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let parts = parse_free_text("215 Grand Ave, Los Angeles, CA 90012, United States");
        assert_eq!(parts.address_line1, "215 Grand Ave");
        assert_eq!(parts.city, "Los Angeles");
        assert_eq!(parts.state, "CA");
        assert_eq!(parts.zip_code, "90012");
        assert_eq!(parts.country, "United States");
    }

    #[test]
    fn test_parse_degrades_with_fewer_segments() {
        let parts = parse_free_text("215 Grand Ave, Los Angeles");
        assert_eq!(parts.address_line1, "215 Grand Ave");
        assert_eq!(parts.city, "Los Angeles");
        assert_eq!(parts.state, "");
        assert_eq!(parts.zip_code, "");
        assert_eq!(parts.country, "");
    }

    #[test]
    fn test_parse_state_without_zip() {
        let parts = parse_free_text("1 Main St, Springfield, IL");
        assert_eq!(parts.state, "IL");
        assert_eq!(parts.zip_code, "");
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let parts = parse_free_text(" , 9 Elm St,, Boston , MA 02118 ,");
        assert_eq!(parts.address_line1, "9 Elm St");
        assert_eq!(parts.city, "Boston");
        assert_eq!(parts.state, "MA");
        assert_eq!(parts.zip_code, "02118");
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_free_text(""), AddressParts::default());
    }

    #[test]
    fn test_parse_ignores_extra_segments() {
        let parts = parse_free_text("5 Oak Rd, Suite 4, Austin, TX 73301, United States");
        // The suite shifts every later segment; documented limitation.
        assert_eq!(parts.address_line1, "5 Oak Rd");
        assert_eq!(parts.city, "Suite 4");
        assert_eq!(parts.state, "Austin");
        assert_eq!(parts.country, "TX 73301");
    }

    #[test]
    fn test_format_free_text() {
        let parts = AddressParts {
            address_line1: "4100 W Irving Park Rd".to_string(),
            city: "Chicago".to_string(),
            state: "IL".to_string(),
            zip_code: "60641".to_string(),
            country: "United States".to_string(),
        };
        let text = format_free_text(&parts);
        assert_eq!(text, "4100 W Irving Park Rd, Chicago, IL 60641, United States");
        assert_eq!(parse_free_text(&text), parts);
    }

    #[test]
    fn test_format_free_text_partial() {
        let parts = AddressParts {
            city: "Chicago".to_string(),
            zip_code: "60641".to_string(),
            ..Default::default()
        };
        assert_eq!(format_free_text(&parts), "Chicago, 60641");
    }

    #[test]
    fn test_split_street_with_number() {
        let parts = split_street("4100 W Irving Park Rd");
        assert_eq!(parts.number, "4100");
        assert_eq!(parts.street, "W Irving Park Rd");
    }

    #[test]
    fn test_split_street_without_number() {
        let parts = split_street("Apt 12C");
        assert_eq!(parts.number, "");
        assert_eq!(parts.street, "Apt 12C");
    }

    #[test]
    fn test_split_street_trims() {
        let parts = split_street("  77   Sunset Blvd  ");
        assert_eq!(parts.number, "77");
        assert_eq!(parts.street, "Sunset Blvd");
    }

    #[test]
    fn test_split_street_digits_glued_to_letters() {
        let parts = split_street("12C Main St");
        assert_eq!(parts.number, "");
        assert_eq!(parts.street, "12C Main St");
    }

    #[test]
    fn test_split_street_empty() {
        assert_eq!(split_street(""), StreetParts::default());
    }
}
