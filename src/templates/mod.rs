//! Built-in theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary; the output needs no
//! theme directory next to it.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Disable autoescaping for HTML templates since we're generating HTML
        // and URLs/paths should not be escaped
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("404.html", include_str!("theme/404.html")),
            ("error.html", include_str!("theme/error.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/comments.html",
                include_str!("theme/partials/comments.html"),
            ),
            (
                "partials/load_more.html",
                include_str!("theme/partials/load_more.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub enable: bool,
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

/// A post card on the listing page, also the JSON batch payload
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Pre-formatted, localized publication date
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    pub body_html: String,
}

/// Detail page context
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub author: String,
    pub date: String,
    pub published_iso: String,
    pub reading_time: usize,
    pub banner_url: Option<String>,
    /// Pre-formatted edit date, present when the document changed after
    /// publication
    pub edited: Option<String>,
    pub sections: Vec<SectionView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "spacetraveling".to_string(),
            description: String::new(),
            author: "Ana".to_string(),
            language: "pt".to_string(),
            url: "http://example.com".to_string(),
            root: "/".to_string(),
        }
    }

    fn comments() -> CommentsData {
        CommentsData {
            enable: true,
            repo: "someone/blog-comments".to_string(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }

    #[test]
    fn test_index_renders_cards_and_load_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert(
            "posts",
            &vec![PostCard {
                uid: "first-post".to_string(),
                url: "/post/first-post".to_string(),
                title: "First post".to_string(),
                subtitle: "On getting started".to_string(),
                author: "Ana".to_string(),
                date: "15 mar 2021".to_string(),
            }],
        );
        context.insert("next_batch", &Some("/api/posts/page-2.json"));
        context.insert("preview", &false);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("First post"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("/api/posts/page-2.json"));
        assert!(html.contains("id=\"load-more\""));
    }

    #[test]
    fn test_index_hides_load_more_when_exhausted() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("posts", &Vec::<PostCard>::new());
        context.insert("next_batch", &Option::<String>::None);
        context.insert("preview", &false);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("id=\"load-more\""));
    }

    #[test]
    fn test_post_page_renders_meta_and_comments() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("comments", &comments());
        context.insert(
            "post",
            &PostView {
                title: "First post".to_string(),
                author: "Ana".to_string(),
                date: "15 mar 2021".to_string(),
                published_iso: "2021-03-15T19:25:28+00:00".to_string(),
                reading_time: 4,
                banner_url: Some("https://images.example.com/banner.png".to_string()),
                edited: None,
                sections: vec![SectionView {
                    heading: "Intro".to_string(),
                    body_html: "<p>Hello <strong>world</strong></p>".to_string(),
                }],
            },
        );
        context.insert(
            "prev_post",
            &Some(NavPost {
                title: "Older".to_string(),
                url: "/post/older".to_string(),
            }),
        );
        context.insert("next_post", &Option::<NavPost>::None);
        context.insert("preview", &false);

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("4 min"));
        assert!(html.contains("<strong>world</strong>"));
        assert!(html.contains("utteranc.es/client.js"));
        assert!(html.contains("/post/older"));
        assert!(!html.contains("exit-preview"));
    }

    #[test]
    fn test_preview_banner_shows_exit_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("posts", &Vec::<PostCard>::new());
        context.insert("next_batch", &Option::<String>::None);
        context.insert("preview", &true);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("/api/exit-preview"));
    }
}
