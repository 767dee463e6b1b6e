//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    /// Display locale for dates ("pt" or "en")
    pub language: String,
    /// IANA timezone name used when displaying publication timestamps
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Date format (Moment.js-style tokens)
    pub date_format: String,

    // Content API
    pub cms: CmsConfig,

    // Comment widget
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "pt".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            date_format: "DD MMM YYYY".to_string(),

            cms: CmsConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Repository API endpoint, e.g. "https://my-repo.cdn.prismic.io/api/v2"
    pub api_url: String,
    /// Custom type queried for posts
    pub document_type: String,
    /// Posts fetched per page / per "load more" batch
    pub page_size: usize,
    /// Field projection for listing queries
    pub fetch: Vec<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            document_type: "posts".to_string(),
            page_size: 20,
            fetch: vec![
                "posts.title".to_string(),
                "posts.subtitle".to_string(),
                "posts.author".to_string(),
            ],
        }
    }
}

/// Third-party comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    /// GitHub repository the widget stores threads in
    pub repo: String,
    /// Issue mapping strategy, usually "pathname"
    pub issue_term: String,
    /// Widget color theme
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 20);
        assert_eq!(config.comments.issue_term, "pathname");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
language: en
cms:
  api_url: https://demo.cdn.prismic.io/api/v2
  page_size: 5
comments:
  repo: someone/some-repo
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.language, "en");
        assert_eq!(config.cms.api_url, "https://demo.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 5);
        // nested defaults survive a partial override
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.comments.repo, "someone/some-repo");
        assert_eq!(config.comments.theme, "github-dark");
    }
}
