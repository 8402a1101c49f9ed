use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// How a person is connected to the sales organisation.
///
/// Source data carries this as free text (`"Direct"`, `"indirect"`, `"None"`, missing).
/// Anything that is not a case-insensitive match for direct or indirect is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Relationship {
    Direct,
    Indirect,
    #[default]
    None,
}

impl Relationship {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Relationship::Direct,
            "indirect" => Relationship::Indirect,
            _ => Relationship::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Direct => "Direct",
            Relationship::Indirect => "Indirect",
            Relationship::None => "None",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Relationship {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Non-string values (numbers, booleans) count as no relationship.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => Ok(Relationship::parse(&raw)),
            _ => Ok(Relationship::None),
        }
    }
}

/// Per-bucket tallies of [`Relationship`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCounts {
    pub direct: usize,
    pub indirect: usize,
    pub none: usize,
}

impl ConnectionCounts {
    pub fn record(&mut self, relationship: Relationship) {
        match relationship {
            Relationship::Direct => self.direct += 1,
            Relationship::Indirect => self.indirect += 1,
            Relationship::None => self.none += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.direct + self.indirect + self.none
    }

    /// Strongest relationship present in the bucket.
    pub fn strongest(&self) -> Relationship {
        if self.direct > 0 {
            Relationship::Direct
        } else if self.indirect > 0 {
            Relationship::Indirect
        } else {
            Relationship::None
        }
    }
}

impl FromIterator<Relationship> for ConnectionCounts {
    fn from_iter<I: IntoIterator<Item = Relationship>>(iter: I) -> Self {
        let mut counts = ConnectionCounts::default();
        for relationship in iter {
            counts.record(relationship);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Relationship::parse("Direct"), Relationship::Direct);
        assert_eq!(Relationship::parse("INDIRECT"), Relationship::Indirect);
        assert_eq!(Relationship::parse(" direct "), Relationship::Direct);
        assert_eq!(Relationship::parse("None"), Relationship::None);
        assert_eq!(Relationship::parse("something else"), Relationship::None);
    }

    #[test]
    fn test_deserialize_missing_or_null_is_none() {
        let rel: Relationship = serde_json::from_str("null").unwrap();
        assert_eq!(rel, Relationship::None);
        let rel: Relationship = serde_json::from_str("\"indirect\"").unwrap();
        assert_eq!(rel, Relationship::Indirect);
        let rel: Relationship = serde_json::from_str("3").unwrap();
        assert_eq!(rel, Relationship::None);
    }

    #[test]
    fn test_counts_strongest() {
        let counts: ConnectionCounts = [Relationship::None, Relationship::Indirect]
            .into_iter()
            .collect();
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.strongest(), Relationship::Indirect);
        assert_eq!(ConnectionCounts::default().strongest(), Relationship::None);
    }
}
