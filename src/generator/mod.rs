//! Generator module - renders the static site from CMS content
//!
//! The listing is fetched page by page following the API's opaque
//! `next_page` cursors. The first batch becomes the home page; every later
//! batch is written as a JSON file that the home page's "load more" control
//! fetches and appends client-side, so the build-time cursor chain mirrors
//! the API's.

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fs;
use tera::Context;
use walkdir::WalkDir;

use crate::cms::{CmsClient, CmsError, Predicate, QueryOptions, SearchResponse};
use crate::config::CmsConfig;
use crate::content::{richtext, Post, PostSummary};
use crate::helpers::{date_xml, display_date};
use crate::templates::{
    CommentsData, NavPost, PostCard, PostView, SectionView, SiteData, TemplateRenderer,
};
use crate::Spacetravel;

/// Ordering clause for publication date, newest first
pub const ORDER_NEWEST_FIRST: &str = "[document.first_publication_date desc]";
/// Ordering clause for publication date, oldest first
pub const ORDER_OLDEST_FIRST: &str = "[document.first_publication_date]";

/// One "load more" batch as written to disk
#[derive(Debug, Clone, Serialize)]
pub struct PostBatch {
    /// Site-relative URL of the following batch; null when exhausted
    pub next_page: Option<String>,
    pub results: Vec<PostCard>,
}

/// Fetch every listing page, following cursors until exhausted
///
/// Results keep fetch order; no deduplication is applied (cursor batches
/// partition the result set).
pub async fn fetch_listing(
    cms: &CmsConfig,
    client: &CmsClient,
    reference: &str,
) -> Result<Vec<SearchResponse>, CmsError> {
    let predicates = [Predicate::at("document.type", &cms.document_type)];
    let options = QueryOptions {
        reference: reference.to_string(),
        fetch: cms.fetch.clone(),
        page_size: Some(cms.page_size),
        orderings: Some(ORDER_NEWEST_FIRST.to_string()),
        ..Default::default()
    };

    let mut batches = vec![client.query(&predicates, &options).await?];
    while let Some(cursor) = batches
        .last()
        .and_then(|batch| batch.next_page.clone())
    {
        batches.push(client.next_page(&cursor).await?);
    }
    Ok(batches)
}

/// Static site generator using the embedded templates
pub struct Generator {
    app: Spacetravel,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(app: &Spacetravel) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        Ok(Self {
            app: app.clone(),
            renderer,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self, client: &CmsClient, reference: &str) -> Result<()> {
        fs::create_dir_all(&self.app.public_dir)?;

        self.copy_static_assets()?;

        let batches = fetch_listing(&self.app.config.cms, client, reference).await?;
        let total: usize = batches.iter().map(|b| b.results.len()).sum();
        tracing::info!(
            "Fetched {} posts in {} batches",
            total,
            batches.len()
        );

        let cards: Vec<Vec<PostCard>> = batches
            .iter()
            .map(|batch| {
                batch
                    .results
                    .iter()
                    .map(|doc| self.card(&PostSummary::from_document(doc)))
                    .collect()
            })
            .collect();

        self.write_index(&cards)?;
        self.write_batches(&cards)?;

        let summaries: Vec<PostSummary> = batches
            .iter()
            .flat_map(|batch| batch.results.iter().map(PostSummary::from_document))
            .collect();
        self.generate_post_pages(client, reference, &summaries).await?;

        self.write_not_found_page()?;

        Ok(())
    }

    /// Generate the home page from the first batch
    pub fn write_index(&self, cards: &[Vec<PostCard>]) -> Result<()> {
        let first = cards.first().cloned().unwrap_or_default();
        let next_batch = if cards.len() > 1 {
            Some(self.batch_url(2))
        } else {
            None
        };

        let mut context = self.base_context();
        context.insert("posts", &first);
        context.insert("next_batch", &next_batch);
        context.insert("preview", &false);

        let html = self.renderer.render("index.html", &context)?;
        let output_path = self.app.public_dir.join("index.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Write every batch after the first as a "load more" JSON file
    pub fn write_batches(&self, cards: &[Vec<PostCard>]) -> Result<()> {
        for (i, batch) in cards.iter().enumerate().skip(1) {
            let page = i + 1;
            let next_page = if i + 1 < cards.len() {
                Some(self.batch_url(page + 1))
            } else {
                None
            };
            let batch = PostBatch {
                next_page,
                results: batch.clone(),
            };

            let output_path = self
                .app
                .public_dir
                .join("api/posts")
                .join(format!("page-{page}.json"));
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, serde_json::to_string_pretty(&batch)?)?;
            tracing::debug!("Generated: {:?}", output_path);
        }
        Ok(())
    }

    /// Generate one detail page per post
    async fn generate_post_pages(
        &self,
        client: &CmsClient,
        reference: &str,
        summaries: &[PostSummary],
    ) -> Result<()> {
        let doc_type = &self.app.config.cms.document_type;

        for summary in summaries {
            let doc = client
                .get_by_uid(doc_type, &summary.uid, reference)
                .await
                .with_context(|| format!("failed to load post {:?}", summary.uid))?;
            let post = Post::from_document(&doc);

            let prev = summary.prev(summaries).map(|p| self.nav_post(p));
            let next = summary.next(summaries).map(|p| self.nav_post(p));

            let html = self.render_post(&post, prev, next, false)?;
            self.write_post_page(&post.uid, &html)?;
        }

        tracing::info!("Generated {} post pages", summaries.len());
        Ok(())
    }

    /// Persist a rendered detail page under `post/{uid}/index.html`
    pub fn write_post_page(&self, uid: &str, html: &str) -> Result<()> {
        let output_path = self
            .app
            .public_dir
            .join("post")
            .join(uid)
            .join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated post: {:?}", output_path);
        Ok(())
    }

    /// Render a detail page
    pub fn render_post(
        &self,
        post: &Post,
        prev_post: Option<NavPost>,
        next_post: Option<NavPost>,
        preview: bool,
    ) -> Result<String> {
        let config = &self.app.config;
        let view = PostView {
            title: post.title.clone(),
            author: post.author.clone(),
            date: post
                .published_at
                .map(|d| display_date(&d, &config.timezone, &config.date_format, &config.language))
                .unwrap_or_default(),
            published_iso: post.published_at.map(|d| date_xml(&d)).unwrap_or_default(),
            reading_time: post.reading_time(),
            banner_url: post.banner_url.clone(),
            edited: post.updated_at.map(|d| {
                display_date(&d, &config.timezone, &config.date_format, &config.language)
            }),
            sections: post
                .sections
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    body_html: richtext::as_html(&section.body),
                })
                .collect(),
        };

        let mut context = self.base_context();
        context.insert("post", &view);
        context.insert("prev_post", &prev_post);
        context.insert("next_post", &next_post);
        context.insert("preview", &preview);

        self.renderer.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self) -> Result<String> {
        let context = self.base_context();
        self.renderer.render("404.html", &context)
    }

    /// Render the page-level error page
    pub fn render_error(&self, message: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("message", message);
        self.renderer.render("error.html", &context)
    }

    /// Write the static not-found page
    pub fn write_not_found_page(&self) -> Result<()> {
        let html = self.render_not_found()?;
        fs::write(self.app.public_dir.join("404.html"), html)?;
        Ok(())
    }

    /// Build a post card from a summary
    pub fn card(&self, summary: &PostSummary) -> PostCard {
        let config = &self.app.config;
        PostCard {
            uid: summary.uid.clone(),
            url: self.post_url(&summary.uid),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            date: summary
                .published_at
                .map(|d| display_date(&d, &config.timezone, &config.date_format, &config.language))
                .unwrap_or_default(),
        }
    }

    /// Site-relative URL of a detail page
    pub fn post_url(&self, uid: &str) -> String {
        format!("{}post/{}", self.app.config.root, uid)
    }

    fn nav_post(&self, summary: &PostSummary) -> NavPost {
        NavPost {
            title: summary.title.clone(),
            url: self.post_url(&summary.uid),
        }
    }

    fn batch_url(&self, page: usize) -> String {
        format!("{}api/posts/page-{page}.json", self.app.config.root)
    }

    fn base_context(&self) -> Context {
        let config = &self.app.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                author: config.author.clone(),
                language: config.language.clone(),
                url: config.url.clone(),
                root: config.root.clone(),
            },
        );
        context.insert(
            "comments",
            &CommentsData {
                enable: config.comments.enable,
                repo: config.comments.repo.clone(),
                issue_term: config.comments.issue_term.clone(),
                theme: config.comments.theme.clone(),
            },
        );
        context
    }

    /// Copy the static asset directory (logo, stylesheet) into the output
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.app.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.app.public_dir.join(relative);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }
}
