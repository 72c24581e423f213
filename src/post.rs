use std::fmt;
use std::fmt::{Display, Formatter};

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Identifier of a newsletter issue.
///
/// Items reference issues with a JSON number while the issues CSV stores the id as text,
/// so both sides are converted to this canonical string form before being compared.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn as_str(&self) -> &str {
        let IssueId(ref id) = self;
        id.as_str()
    }

    /// Numeric value of the id, when it has one. WordPress post ids must be numbers.
    pub fn as_number(&self) -> Option<u64> {
        self.as_str().parse::<u64>().ok()
    }
}

impl From<&str> for IssueId {
    fn from(value: &str) -> Self {
        IssueId(value.trim().to_string())
    }
}

impl From<i64> for IssueId {
    fn from(value: i64) -> Self {
        IssueId(value.to_string())
    }
}

impl From<u64> for IssueId {
    fn from(value: u64) -> Self {
        IssueId(value.to_string())
    }
}

impl From<f64> for IssueId {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.is_finite() {
            IssueId(format!("{:.0}", value))
        } else {
            IssueId(value.to_string())
        }
    }
}

impl Display for IssueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct IssueIdVisitor;

impl<'de> Visitor<'de> for IssueIdVisitor {
    type Value = IssueId;

    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("an issue id as a number or a string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(IssueId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(IssueId::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(IssueId::from(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(IssueId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(IssueId::from(v))
    }
}

impl<'de> Deserialize<'de> for IssueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IssueIdVisitor)
    }
}

/// Content of one issue, built from its items.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: IssueId,
    pub content_encoded: String,
}

/// An issue joined with its metadata, ready to be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: IssueId,
    pub content_encoded: String,
    pub title: Option<String>,
    pub published_at: Option<String>,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, title={}, published_at={}",
               self.id,
               self.title.as_deref().unwrap_or("<none>"),
               self.published_at.as_deref().unwrap_or("<none>"),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub display_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        id: IssueId,
    }

    #[test]
    fn test_issue_id_from_json() {
        let h: Holder = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(h.id, IssueId("42".to_string()));
        let h: Holder = serde_json::from_str(r#"{"id": " 42 "}"#).unwrap();
        assert_eq!(h.id, IssueId("42".to_string()));
        let h: Holder = serde_json::from_str(r#"{"id": 42.0}"#).unwrap();
        assert_eq!(h.id, IssueId("42".to_string()));
        let h: Holder = serde_json::from_str(r#"{"id": true}"#).unwrap();
        assert_eq!(h.id, IssueId("true".to_string()));
    }

    #[test]
    fn test_large_float_ids_stay_distinct() {
        assert_eq!(IssueId::from(1e19), IssueId("10000000000000000000".to_string()));
        assert_ne!(IssueId::from(1e19), IssueId::from(2e19));
        assert_eq!(IssueId::from(1.5), IssueId("1.5".to_string()));
    }

    #[test]
    fn test_issue_id_number() {
        assert_eq!(IssueId::from("123").as_number(), Some(123));
        assert_eq!(IssueId::from("abc").as_number(), None);
    }
}
