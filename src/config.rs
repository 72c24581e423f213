use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Deserialize;

use crate::post::Author;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AuthorCfg {
    pub display_name: String,
    pub email: String,
}

impl Default for AuthorCfg {
    fn default() -> Self {
        AuthorCfg {
            display_name: "Revue Importer".to_string(),
            email: "importer@example.com".to_string(),
        }
    }
}

impl From<&AuthorCfg> for Author {
    fn from(value: &AuthorCfg) -> Self {
        Author {
            display_name: value.display_name.clone(),
            email: value.email.clone(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub url: String,
    pub description: String,
    pub language: String,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            title: "Newsletter archive".to_string(),
            url: "https://example.com".to_string(),
            description: "Issues imported from Revue".to_string(),
            language: "en".to_string(),
        }
    }
}

/// What to do with an issue that has no row in the issues CSV.
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MissingIssuePolicy {
    /// Abort the conversion
    #[default]
    Fail,
    /// Export the issue without title and publish date
    Keep,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Convert {
    pub missing_issue: MissingIssuePolicy,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq, PartialOrd)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Log {
    pub level: LogLevel,
    pub location: Option<PathBuf>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: LogLevel::Info,
            location: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub author: AuthorCfg,
    pub site: Site,
    pub convert: Convert,
    pub log: Log,
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    }
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
