use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use notify::Webhook;

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default polling interval in minutes.
const DEFAULT_INTERVAL: i64 = 15;

/// Per-feed configuration, normalized from the config document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    pub url: String,
    /// Explicit display-name override for entries from this feed.
    #[serde(default)]
    pub name: Option<String>,
    /// Prefer the entry author as the display name when present.
    #[serde(default)]
    pub show_author: bool,
    /// Include the cleaned summary text in messages.
    #[serde(default)]
    pub show_text: bool,
    /// Send the bare summary text without the markdown wrapper.
    #[serde(default)]
    pub only_text: bool,
}

/// A group of feeds fanned out to a group of webhooks. All new entries
/// across the project's feeds go to all of its webhooks each round.
#[derive(Debug, Clone)]
pub struct Project {
    pub feeds: Vec<FeedConfig>,
    pub webhooks: Vec<Webhook>,
}

/// Normalized runtime configuration.
#[derive(Debug, Clone)]
pub struct Conf {
    /// Minutes between round starts; negative means run one round and exit.
    pub interval: i64,
    pub projects: Vec<Project>,
}

// Raw document shapes. `feeds` and `webhooks` entries are either a bare URL
// string or a table; the union is eliminated here so downstream code only
// ever sees the normalized structs above.

#[derive(Deserialize)]
struct RawConf {
    interval: Option<i64>,
    #[serde(rename = "project", default)]
    projects: Vec<RawProject>,
}

#[derive(Deserialize)]
struct RawProject {
    feeds: Vec<RawFeed>,
    webhooks: Vec<RawWebhook>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeed {
    Url(String),
    Full(FeedConfig),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWebhook {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        sign: Option<String>,
    },
}

impl Conf {
    /// Load and normalize a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfError> {
        let raw: RawConf = toml::from_str(content)?;
        Ok(Self {
            interval: raw.interval.unwrap_or(DEFAULT_INTERVAL),
            projects: raw
                .projects
                .into_iter()
                .map(|p| Project {
                    feeds: p.feeds.into_iter().map(RawFeed::normalize).collect(),
                    webhooks: p.webhooks.into_iter().map(RawWebhook::normalize).collect(),
                })
                .collect(),
        })
    }
}

impl RawFeed {
    fn normalize(self) -> FeedConfig {
        match self {
            RawFeed::Url(url) => FeedConfig {
                url,
                name: None,
                show_author: false,
                show_text: false,
                only_text: false,
            },
            RawFeed::Full(cfg) => cfg,
        }
    }
}

impl RawWebhook {
    fn normalize(self) -> Webhook {
        match self {
            RawWebhook::Url(url) => Webhook { url, sign: None },
            RawWebhook::Full { url, sign } => Webhook { url, sign },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_strings_normalize_with_defaults() {
        let conf = Conf::from_toml(
            r#"
[[project]]
feeds = ["https://example.com/feed.xml"]
webhooks = ["https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=X"]
"#,
        )
        .unwrap();

        assert_eq!(conf.interval, 15);
        assert_eq!(conf.projects.len(), 1);

        let feed = &conf.projects[0].feeds[0];
        assert_eq!(feed.url, "https://example.com/feed.xml");
        assert!(feed.name.is_none());
        assert!(!feed.show_author && !feed.show_text && !feed.only_text);

        let webhook = &conf.projects[0].webhooks[0];
        assert!(webhook.sign.is_none());
    }

    #[test]
    fn test_tables_normalize_with_camel_case_keys() {
        let conf = Conf::from_toml(
            r#"
interval = 30

[[project]]
feeds = [
    { url = "https://example.com/a.xml", name = "A", showAuthor = true },
    { url = "https://example.com/b.xml", showText = true, onlyText = true },
]
webhooks = [
    { url = "https://oapi.dingtalk.com/robot/send?access_token=X", sign = "secret" },
]
"#,
        )
        .unwrap();

        assert_eq!(conf.interval, 30);

        let a = &conf.projects[0].feeds[0];
        assert_eq!(a.name.as_deref(), Some("A"));
        assert!(a.show_author);
        assert!(!a.show_text);

        let b = &conf.projects[0].feeds[1];
        assert!(b.show_text && b.only_text);

        assert_eq!(conf.projects[0].webhooks[0].sign.as_deref(), Some("secret"));
    }

    #[test]
    fn test_strings_and_tables_mix_in_one_list() {
        let conf = Conf::from_toml(
            r#"
[[project]]
feeds = [
    "https://example.com/a.xml",
    { url = "https://example.com/b.xml", name = "B" },
]
webhooks = ["https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=X"]
"#,
        )
        .unwrap();

        assert_eq!(conf.projects[0].feeds.len(), 2);
        assert!(conf.projects[0].feeds[0].name.is_none());
        assert_eq!(conf.projects[0].feeds[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_negative_interval_is_preserved() {
        let conf = Conf::from_toml(
            r#"
interval = -1

[[project]]
feeds = ["https://example.com/feed.xml"]
webhooks = ["https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=X"]
"#,
        )
        .unwrap();
        assert_eq!(conf.interval, -1);
    }

    #[test]
    fn test_multiple_projects() {
        let conf = Conf::from_toml(
            r#"
[[project]]
feeds = ["https://example.com/a.xml"]
webhooks = ["https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=1"]

[[project]]
feeds = ["https://example.com/b.xml"]
webhooks = ["https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=2"]
"#,
        )
        .unwrap();
        assert_eq!(conf.projects.len(), 2);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Conf::from_toml("interval = ").is_err());
    }

    #[test]
    fn test_feed_table_without_url_is_an_error() {
        let result = Conf::from_toml(
            r#"
[[project]]
feeds = [{ name = "missing url" }]
webhooks = []
"#,
        );
        assert!(result.is_err());
    }
}
