//! List published posts

use anyhow::{Context, Result};

use crate::cms::CmsClient;
use crate::content::PostSummary;
use crate::generator;
use crate::Spacetravel;

/// Print every published post, newest first
pub async fn run(app: &Spacetravel) -> Result<()> {
    anyhow::ensure!(
        !app.config.cms.api_url.is_empty(),
        "cms.api_url is not configured; set it in _config.yml"
    );

    let client = CmsClient::new(&app.config.cms.api_url);
    let reference = client
        .master_ref()
        .await
        .context("failed to reach the content API")?;

    let batches = generator::fetch_listing(&app.config.cms, &client, &reference).await?;
    let posts: Vec<PostSummary> = batches
        .iter()
        .flat_map(|batch| batch.results.iter().map(PostSummary::from_document))
        .collect();

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unpublished".to_string());
        println!("  {} - {} [{}]", date, post.title, post.uid);
    }

    Ok(())
}
