//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Default stylesheet written into the static directory
const DEFAULT_STYLESHEET: &str = include_str!("assets/style.css");

/// Default logo written into the static directory
const DEFAULT_LOGO: &str = include_str!("assets/Logo.svg");

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("static"))?;

    let config_content = r#"# spacetravel configuration

# Site
title: spacetraveling
description: ''
author: John Doe
language: pt
timezone: America/Sao_Paulo

# URL
url: http://example.com
root: /

# Directory
public_dir: public
static_dir: static

# Date format (Moment.js-style tokens)
date_format: DD MMM YYYY

# Content API
cms:
  api_url: ''
  document_type: posts
  page_size: 20
  fetch:
    - posts.title
    - posts.subtitle
    - posts.author

# Comment widget
comments:
  enable: true
  repo: ''
  issue_term: pathname
  theme: github-dark
"#;

    let config_path = target_dir.join("_config.yml");
    if !config_path.exists() {
        fs::write(&config_path, config_content)?;
    }

    let logo_path = target_dir.join("static/Logo.svg");
    if !logo_path.exists() {
        fs::write(&logo_path, DEFAULT_LOGO)?;
    }

    let style_path = target_dir.join("static/style.css");
    if !style_path.exists() {
        fs::write(&style_path, DEFAULT_STYLESHEET)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_scaffolds_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("_config.yml").exists());
        assert!(dir.path().join("static/Logo.svg").exists());
        assert!(dir.path().join("static/style.css").exists());

        // the scaffolded config parses back
        let config = crate::config::SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.date_format, "DD MMM YYYY");
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Kept\n").unwrap();
        init_site(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("_config.yml")).unwrap();
        assert_eq!(content, "title: Kept\n");
    }
}
