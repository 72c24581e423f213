use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use spdlog::{debug, warn};

use crate::error::ConvertError;

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum EntryKind {
    IssueStats,
    Issues,
    Items,
    Subscribers,
}

impl EntryKind {
    pub fn classify(name: &str) -> Option<EntryKind> {
        match name {
            x if x.starts_with("issue_stats_") && x.ends_with(".csv") => Some(EntryKind::IssueStats),
            x if x.starts_with("issues_") && x.ends_with(".csv") => Some(EntryKind::Issues),
            x if x.starts_with("items_") && x.ends_with(".json") => Some(EntryKind::Items),
            x if x.starts_with("subscribers_") && x.ends_with(".csv") => Some(EntryKind::Subscribers),
            _ => None,
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::IssueStats => "issue_stats",
            EntryKind::Issues => "issues",
            EntryKind::Items => "items",
            EntryKind::Subscribers => "subscribers",
        };
        write!(f, "{}", name)
    }
}

/// Archive entry names indexed by their kind.
///
/// When several entries share a kind the last one listed wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMap {
    entries: HashMap<EntryKind, String>,
}

impl EntryMap {
    pub fn from_names<I, S>(names: I) -> EntryMap
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for name in names {
            let name = name.as_ref();
            let Some(kind) = EntryKind::classify(name) else {
                debug!("Skipping unrecognized archive entry {}", name);
                continue;
            };
            if let Some(previous) = entries.insert(kind, name.to_string()) {
                warn!("Archive has more than one {} entry. Using {} instead of {}", kind, name, previous);
            }
        }

        EntryMap { entries }
    }

    pub fn get(&self, kind: EntryKind) -> Option<&str> {
        self.entries.get(&kind).map(|name| name.as_str())
    }

    pub fn require(&self, kind: EntryKind) -> Result<&str, ConvertError> {
        self.get(kind).ok_or(ConvertError::EntryNotFound(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
