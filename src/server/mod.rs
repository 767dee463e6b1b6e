//! Preview server
//!
//! Serves the generated site. Detail pages that have not been generated yet
//! are rendered on demand from the CMS and persisted, so later requests hit
//! the static file. Preview mode stores the preview ref in a cookie and
//! bypasses the static tree for detail pages.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::{CmsClient, CmsError, Predicate, QueryOptions};
use crate::content::Post;
use crate::generator::{Generator, ORDER_NEWEST_FIRST, ORDER_OLDEST_FIRST};
use crate::templates::NavPost;
use crate::Spacetravel;

const PREVIEW_COOKIE: &str = "preview_ref";

/// Server state
struct ServerState {
    app: Spacetravel,
    client: CmsClient,
    generator: Generator,
}

/// Start the server
pub async fn start(app: &Spacetravel, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState {
        app: app.clone(),
        client: CmsClient::new(&app.config.cms.api_url),
        generator: Generator::new(app)?,
    });

    let router = Router::new()
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Serve a detail page, rendering on demand when it is not generated yet
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let preview_ref = preview_ref_from_cookies(&headers);

    // preview bypasses the generated tree so drafts are always re-fetched
    if preview_ref.is_none() {
        let file = state
            .app
            .public_dir
            .join("post")
            .join(&slug)
            .join("index.html");
        if let Ok(html) = tokio::fs::read_to_string(&file).await {
            return Html(html).into_response();
        }
    }

    render_on_demand(&state, &slug, preview_ref.as_deref()).await
}

/// Render a detail page straight from the CMS
async fn render_on_demand(
    state: &ServerState,
    slug: &str,
    preview_ref: Option<&str>,
) -> Response {
    let preview = preview_ref.is_some();
    let reference = match preview_ref {
        Some(r) => r.to_string(),
        None => match state.client.master_ref().await {
            Ok(r) => r,
            Err(e) => return error_response(state, &e),
        },
    };

    let doc_type = &state.app.config.cms.document_type;
    let doc = match state.client.get_by_uid(doc_type, slug, &reference).await {
        Ok(doc) => doc,
        Err(e) => return error_response(state, &e),
    };
    let post = Post::from_document(&doc);

    // the two sibling lookups are independent; run them concurrently
    let (prev, next) = tokio::join!(
        adjacent_post(state, &reference, &doc.id, ORDER_NEWEST_FIRST),
        adjacent_post(state, &reference, &doc.id, ORDER_OLDEST_FIRST),
    );

    let html = match state.generator.render_post(&post, prev, next, preview) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("Failed to render post {:?}: {}", slug, e);
            return internal_error(state);
        }
    };

    if !preview {
        if let Err(e) = state.generator.write_post_page(&post.uid, &html) {
            tracing::warn!("Failed to persist on-demand page {:?}: {}", slug, e);
        }
    }

    Html(html).into_response()
}

/// Look up the adjacent post relative to a document id in the given ordering
async fn adjacent_post(
    state: &ServerState,
    reference: &str,
    document_id: &str,
    orderings: &str,
) -> Option<NavPost> {
    let cms = &state.app.config.cms;
    let predicates = [Predicate::at("document.type", &cms.document_type)];
    let options = QueryOptions {
        reference: reference.to_string(),
        fetch: vec![format!("{}.title", cms.document_type)],
        page_size: Some(1),
        orderings: Some(orderings.to_string()),
        after: Some(document_id.to_string()),
        ..Default::default()
    };

    match state.client.query(&predicates, &options).await {
        Ok(response) => response.results.first().map(|doc| NavPost {
            title: doc.data.title.clone(),
            url: state
                .generator
                .post_url(doc.uid.as_deref().unwrap_or(&doc.id)),
        }),
        Err(e) => {
            tracing::warn!("Adjacent post lookup failed: {}", e);
            None
        }
    }
}

/// Enter preview mode: store the preview ref and go home
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(token) = params.get("token").filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing preview token").into_response();
    };

    // the token is opaque; it is stored and forwarded verbatim
    let cookie = format!("{PREVIEW_COOKIE}={token}; Path=/; HttpOnly");
    let root = state.app.config.root.clone();
    ([(header::SET_COOKIE, cookie)], Redirect::to(&root)).into_response()
}

/// Exit preview mode: clear the preview ref and go home
async fn exit_preview_handler(State(state): State<Arc<ServerState>>) -> Response {
    let cookie = format!("{PREVIEW_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    let root = state.app.config.root.clone();
    ([(header::SET_COOKIE, cookie)], Redirect::to(&root)).into_response()
}

/// Serve generated files; unknown paths get the 404 page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.app.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Map a CMS error to a page-level response
fn error_response(state: &ServerState, error: &CmsError) -> Response {
    if error.is_not_found() {
        return not_found(state);
    }
    tracing::error!("Content API error: {}", error);
    match state
        .generator
        .render_error("The content service is unreachable. Try again in a moment.")
    {
        Ok(html) => (StatusCode::BAD_GATEWAY, Html(html)).into_response(),
        Err(_) => (StatusCode::BAD_GATEWAY, "Bad gateway").into_response(),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn internal_error(state: &ServerState) -> Response {
    match state.generator.render_error("The page failed to render.") {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Read the preview ref cookie, if any
fn preview_ref_from_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == PREVIEW_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; preview_ref=YB-preview-token; other=1".parse().unwrap(),
        );
        assert_eq!(
            preview_ref_from_cookies(&headers).as_deref(),
            Some("YB-preview-token")
        );
    }

    #[test]
    fn test_preview_cookie_absent_or_empty() {
        let headers = HeaderMap::new();
        assert!(preview_ref_from_cookies(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "preview_ref=".parse().unwrap());
        assert!(preview_ref_from_cookies(&headers).is_none());
    }
}
