//! Identifier newtypes for catalog and record entities.
//!
//! Upstream surfaces hand identifiers around as raw strings. Everything is
//! normalized into these newtypes at the system boundary; the engine and
//! stores never see a raw string id, and ambiguous inputs are rejected
//! outright instead of coerced deep inside scoring logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a raw identifier fails boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {reason}")]
pub struct IdError {
    reason: &'static str,
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a raw identifier, trimming surrounding whitespace.
            ///
            /// Rejects empty input and identifiers with embedded whitespace
            /// or control characters.
            pub fn parse(raw: &str) -> Result<Self, IdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(IdError {
                        reason: "empty identifier",
                    });
                }
                if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
                    return Err(IdError {
                        reason: "identifier contains whitespace or control characters",
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::parse(raw)
            }
        }
    };
}

id_type! {
    /// Identifier of a skill in the catalog.
    SkillId
}

id_type! {
    /// Identifier of a learning resource in the catalog.
    ResourceId
}

id_type! {
    /// Identifier of a user (employee).
    UserId
}

id_type! {
    /// Identifier of a development plan.
    PlanId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_id() {
        let id = SkillId::parse("skill-42").unwrap();
        assert_eq!(id.as_str(), "skill-42");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let id = ResourceId::parse("  res-1  ").unwrap();
        assert_eq!(id.as_str(), "res-1");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("   ").is_err());
    }

    #[test]
    fn parse_rejects_embedded_whitespace() {
        assert!(PlanId::parse("plan 1").is_err());
        assert!(PlanId::parse("plan\t1").is_err());
        assert!(PlanId::parse("plan\n1").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let via_parse = SkillId::parse("rust").unwrap();
        let via_from_str: SkillId = "rust".parse().unwrap();
        assert_eq!(via_parse, via_from_str);
    }

    #[test]
    fn serde_is_transparent() {
        let id = SkillId::parse("skill-7").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"skill-7\"");
        let parsed: SkillId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
