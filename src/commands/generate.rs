//! Generate the static site from the CMS

use anyhow::{Context, Result};

use crate::cms::CmsClient;
use crate::generator::Generator;
use crate::Spacetravel;

/// Fetch all published posts and render the site
pub async fn run(app: &Spacetravel) -> Result<()> {
    let start = std::time::Instant::now();

    anyhow::ensure!(
        !app.config.cms.api_url.is_empty(),
        "cms.api_url is not configured; set it in _config.yml"
    );

    let client = CmsClient::new(&app.config.cms.api_url);
    let reference = client
        .master_ref()
        .await
        .context("failed to reach the content API")?;

    let generator = Generator::new(app)?;
    generator.generate(&client, &reference).await?;

    let duration = start.elapsed();
    tracing::info!("Completed in {:.2}s", duration.as_secs_f64());
    Ok(())
}
