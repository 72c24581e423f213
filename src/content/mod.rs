use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use spdlog::{debug, warn};

use crate::error::ConvertError;
use crate::post::{Issue, IssueId};
use crate::text_utils::sanitize_xml;

pub mod item_renderer;

use item_renderer::render_item;

/// One content unit of a Revue issue, as found in `items_*.json`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Item {
    #[serde(default)]
    pub issue_id: Option<IssueId>,
    #[serde(default, deserialize_with = "deserialize_order")]
    pub order: Option<f64>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderValue {
    Number(f64),
    Text(String),
}

fn deserialize_order<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
{
    let order = match Option::<OrderValue>::deserialize(deserializer)? {
        Some(OrderValue::Number(n)) => Some(n),
        Some(OrderValue::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(order)
}

// Items without an order go after the ordered ones
fn compare_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn parse_items(raw_items: &[u8]) -> Result<Vec<Item>, ConvertError> {
    serde_json::from_slice::<Vec<Item>>(raw_items).map_err(|e| ConvertError::Parse {
        entry: "items".to_string(),
        reason: e.to_string(),
    })
}

/// Groups items per issue in the order issues first appear and renders each group.
pub fn group_items(items: Vec<Item>) -> Vec<Issue> {
    let mut positions: HashMap<IssueId, usize> = HashMap::new();
    let mut groups: Vec<(IssueId, Vec<Item>)> = vec![];
    let mut dropped = 0;

    for item in items {
        let Some(issue_id) = item.issue_id.clone() else {
            dropped += 1;
            continue;
        };
        match positions.get(&issue_id).copied() {
            Some(pos) => groups[pos].1.push(item),
            None => {
                positions.insert(issue_id.clone(), groups.len());
                groups.push((issue_id, vec![item]));
            }
        }
    }

    if dropped > 0 {
        warn!("Dropped {} items without an issue_id", dropped);
    }

    groups.into_iter()
        .map(|(id, mut items)| {
            // sort_by is stable, so items sharing an order keep their input order
            items.sort_by(|a, b| compare_order(a.order, b.order));
            let content: String = items.iter().map(render_item).collect();
            debug!("Issue {} assembled from {} items", id, items.len());
            Issue {
                id,
                content_encoded: sanitize_xml(&content),
            }
        })
        .collect()
}

pub fn assemble_issues(raw_items: &[u8]) -> Result<Vec<Issue>, ConvertError> {
    let items = parse_items(raw_items)?;
    Ok(group_items(items))
}
