//! Wire types for the content API
//!
//! These mirror the JSON the repository endpoint returns. Timestamps stay
//! as strings here; parsing happens when documents are lifted into the
//! domain model.

use serde::{Deserialize, Serialize};

/// Repository metadata returned by the API root endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    pub refs: Vec<ApiRef>,
}

/// A queryable ref (release) of the repository
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub page: usize,
    pub results_per_page: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: usize,
    /// Opaque cursor for the following batch; null when exhausted
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

/// A single content document
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

/// The `data` payload of a post document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<SectionData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
}

/// A content section: a heading plus rich-text body fragments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SectionData {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

/// One rich-text block node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image source (image nodes only)
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Block-level node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    ListItem,
    OListItem,
    Image,
    Preformatted,
    #[serde(other)]
    Other,
}

/// An inline formatting span over a block's text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub url: Option<String>,
}
