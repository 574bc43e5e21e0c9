//! Person name splitting and joining
//!
//! Free-text names are split on whitespace. The first token is the given
//! name, the last token the family name, and anything in between becomes
//! the middle name. The split is lossy for multi-word given or family
//! names: `split_name(&join_name(parts))` need not return `parts`.

use serde::{Deserialize, Serialize};

/// Structured name parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameParts {
    /// Given name
    pub first_name: String,
    /// Middle name(s), space separated
    pub middle_name: String,
    /// Family name
    pub last_name: String,
}

impl NameParts {
    /// Create name parts from borrowed strings
    pub fn new(first: &str, middle: &str, last: &str) -> Self {
        Self {
            first_name: first.to_string(),
            middle_name: middle.to_string(),
            last_name: last.to_string(),
        }
    }

    /// True when every part is empty
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.middle_name.is_empty() && self.last_name.is_empty()
    }
}

/// Split a free-text full name into first, middle and last parts
pub fn split_name(full_name: &str) -> NameParts {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();

    match tokens.as_slice() {
        [] => NameParts::default(),
        [first] => NameParts::new(first, "", ""),
        [first, last] => NameParts::new(first, "", last),
        [first, middle @ .., last] => NameParts::new(first, &middle.join(" "), last),
    }
}

/// Join name parts with single spaces, skipping empty parts
pub fn join_name(parts: &NameParts) -> String {
    [
        parts.first_name.as_str(),
        parts.middle_name.as_str(),
        parts.last_name.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_empty() {
        assert_eq!(split_name(""), NameParts::default());
        assert_eq!(split_name("   \t "), NameParts::default());
    }

    #[test]
    fn test_split_single_token() {
        assert_eq!(split_name("Cher"), NameParts::new("Cher", "", ""));
    }

    #[test]
    fn test_split_two_tokens() {
        assert_eq!(split_name("Diego Gomez"), NameParts::new("Diego", "", "Gomez"));
    }

    #[test]
    fn test_split_three_tokens() {
        assert_eq!(
            split_name("Ana Maria Gutierrez"),
            NameParts::new("Ana", "Maria", "Gutierrez")
        );
    }

    #[test]
    fn test_split_interior_tokens_become_middle() {
        let parts = split_name("  Juan   Carlos  de la   Cruz ");
        assert_eq!(parts.first_name, "Juan");
        assert_eq!(parts.middle_name, "Carlos de la");
        assert_eq!(parts.last_name, "Cruz");
    }

    #[test]
    fn test_join_skips_empty_parts() {
        assert_eq!(join_name(&NameParts::new("Valeria", "", "Gomez")), "Valeria Gomez");
        assert_eq!(join_name(&NameParts::new("", "", "Gomez")), "Gomez");
        assert_eq!(join_name(&NameParts::default()), "");
    }

    #[test]
    fn test_join_then_split_is_lossy_for_compound_names() {
        let parts = NameParts::new("Mary Ann", "", "Smith");
        let round_trip = split_name(&join_name(&parts));
        assert_eq!(round_trip, NameParts::new("Mary", "Ann", "Smith"));
        assert_ne!(round_trip, parts);
    }
}
