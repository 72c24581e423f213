use std::collections::HashMap;

use serde::Deserialize;
use spdlog::{debug, warn};

use crate::config::MissingIssuePolicy;
use crate::error::ConvertError;
use crate::post::{Issue, IssueId, Post};

/// One row of `issues_*.csv`. Columns other than these are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssueRecord {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
}

pub fn parse_issue_records(raw_issues: &[u8]) -> Result<Vec<IssueRecord>, ConvertError> {
    let mut reader = csv::Reader::from_reader(raw_issues);
    let mut records = vec![];
    for record in reader.deserialize::<IssueRecord>() {
        let record = record.map_err(|e| ConvertError::Parse {
            entry: "issues".to_string(),
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Indexes records by id. A later row with the same id replaces the earlier one.
fn index_records(records: Vec<IssueRecord>) -> HashMap<IssueId, IssueRecord> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let id = IssueId::from(record.id.as_str());
        if index.insert(id.clone(), record).is_some() {
            debug!("Issue {} appears more than once in the metadata. Keeping the last row", id);
        }
    }
    index
}

pub fn join_issues(issues: Vec<Issue>, records: Vec<IssueRecord>, policy: MissingIssuePolicy) -> Result<Vec<Post>, ConvertError> {
    let index = index_records(records);

    let mut posts = Vec::with_capacity(issues.len());
    for issue in issues {
        let (title, published_at) = match index.get(&issue.id) {
            Some(record) => (record.subject.clone(), record.sent_at.clone()),
            None => match policy {
                MissingIssuePolicy::Fail => return Err(ConvertError::Join(issue.id)),
                MissingIssuePolicy::Keep => {
                    warn!("No metadata for issue {}. Exporting it without title and date", issue.id);
                    (None, None)
                }
            },
        };

        posts.push(Post {
            id: issue.id,
            content_encoded: issue.content_encoded,
            title,
            published_at,
        });
    }

    Ok(posts)
}

/// Parses the issues CSV and merges title and publish date onto each issue.
pub fn join_metadata(raw_issues: &[u8], issues: Vec<Issue>, policy: MissingIssuePolicy) -> Result<Vec<Post>, ConvertError> {
    let records = parse_issue_records(raw_issues)?;
    join_issues(issues, records, policy)
}

#[cfg(test)]
mod tests {
    use crate::test_data::ISSUES_CSV;

    use super::*;

    fn issue(id: &str, content: &str) -> Issue {
        Issue {
            id: IssueId::from(id),
            content_encoded: content.to_string(),
        }
    }

    #[test]
    fn test_parse_records() {
        let records = parse_issue_records(ISSUES_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], IssueRecord {
            id: "11".to_string(),
            subject: Some("Second issue".to_string()),
            sent_at: Some("2021-03-21 09:05:00 UTC".to_string()),
        });
    }

    #[test]
    fn test_join_single() {
        let csv = "id,subject,sent_at\n1,My Issue,2020-01-01\n";
        let posts = join_metadata(csv.as_bytes(), vec![issue("1", "Hello")], MissingIssuePolicy::Fail).unwrap();
        assert_eq!(posts, vec![Post {
            id: IssueId::from("1"),
            content_encoded: "Hello".to_string(),
            title: Some("My Issue".to_string()),
            published_at: Some("2020-01-01".to_string()),
        }]);
    }

    #[test]
    fn test_join_total() {
        let issues = vec![issue("11", "b"), issue("10", "a")];
        let posts = join_metadata(ISSUES_CSV.as_bytes(), issues, MissingIssuePolicy::Fail).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.as_str(), "11");
        assert_eq!(posts[0].title.as_deref(), Some("Second issue"));
        assert_eq!(posts[1].id.as_str(), "10");
        assert_eq!(posts[1].title.as_deref(), Some("First issue"));
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let csv = "id,subject,sent_at\n1,Old,2020-01-01\n1,New,2020-02-02\n";
        let posts = join_metadata(csv.as_bytes(), vec![issue("1", "x")], MissingIssuePolicy::Fail).unwrap();
        assert_eq!(posts[0].title.as_deref(), Some("New"));
        assert_eq!(posts[0].published_at.as_deref(), Some("2020-02-02"));
    }

    #[test]
    fn test_missing_record_fails() {
        let csv = "id,subject,sent_at\n1,My Issue,2020-01-01\n";
        let res = join_metadata(csv.as_bytes(), vec![issue("2", "x")], MissingIssuePolicy::Fail);
        assert!(matches!(res, Err(ConvertError::Join(id)) if id.as_str() == "2"));
    }

    #[test]
    fn test_missing_record_kept() {
        let csv = "id,subject,sent_at\n1,My Issue,2020-01-01\n";
        let posts = join_metadata(csv.as_bytes(), vec![issue("2", "x")], MissingIssuePolicy::Keep).unwrap();
        assert_eq!(posts[0].title, None);
        assert_eq!(posts[0].published_at, None);
    }

    #[test]
    fn test_missing_id_column() {
        let csv = "subject,sent_at\nMy Issue,2020-01-01\n";
        let res = parse_issue_records(csv.as_bytes());
        assert!(matches!(res, Err(ConvertError::Parse { .. })));
    }

    #[test]
    fn test_id_with_spaces() {
        let csv = "id,subject,sent_at\n 3 ,Spaced,2020-01-01\n";
        let posts = join_metadata(csv.as_bytes(), vec![issue("3", "x")], MissingIssuePolicy::Fail).unwrap();
        assert_eq!(posts[0].title.as_deref(), Some("Spaced"));
    }
}
