//! `<provider>::<kind>` references

use std::fmt;
use std::str::FromStr;

/// Separates the provider from the instance kind
pub const REFERENCE_SEPARATOR: &str = "::";

/// Which provider and which of its instance kinds a block declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReference {
    pub provider: String,
    pub kind: String,
}

/// Text was not of the form `<provider>::<kind>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference;

impl FromStr for ProviderReference {
    type Err = InvalidReference;

    /// Exactly two non-empty parts
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parts = text.split(REFERENCE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(provider), Some(kind), None) if !provider.is_empty() && !kind.is_empty() => {
                Ok(Self {
                    provider: provider.to_string(),
                    kind: kind.to_string(),
                })
            }
            _ => Err(InvalidReference),
        }
    }
}

impl fmt::Display for ProviderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{REFERENCE_SEPARATOR}{}", self.provider, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let reference: ProviderReference = "capsule::config".parse().unwrap();
        assert_eq!(reference.provider, "capsule");
        assert_eq!(reference.kind, "config");
        assert_eq!(reference.to_string(), "capsule::config");
    }

    #[test]
    fn test_reject_malformed() {
        for text in ["capsule", "capsule::", "::config", "a::b::c", ""] {
            assert!(text.parse::<ProviderReference>().is_err(), "{text}");
        }
    }
}
