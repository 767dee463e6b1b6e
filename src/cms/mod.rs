//! Content API module - queries and document types for the headless CMS

mod client;
mod document;
mod error;

pub use client::{CmsClient, Predicate, QueryOptions};
pub use document::{
    ApiInfo, ApiRef, Banner, BlockKind, Document, PostData, RichTextNode, SearchResponse,
    SectionData, Span, SpanData, SpanKind,
};
pub use error::CmsError;
