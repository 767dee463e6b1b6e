//! Post models
//!
//! Documents coming off the wire are lifted into these types once; they are
//! immutable afterwards.

use chrono::{DateTime, FixedOffset};

use crate::cms::{Document, RichTextNode};
use crate::helpers::parse_timestamp;

/// Words read per minute, used for the reading-time estimate
const WORDS_PER_MINUTE: usize = 200;

/// A post as shown on the listing page
#[derive(Debug, Clone)]
pub struct PostSummary {
    /// URL slug
    pub uid: String,

    /// First publication timestamp
    pub published_at: Option<DateTime<FixedOffset>>,

    /// Post title
    pub title: String,

    /// Post subtitle
    pub subtitle: String,

    /// Author display name
    pub author: String,
}

impl PostSummary {
    /// Build a summary from a search result
    pub fn from_document(doc: &Document) -> Self {
        Self {
            uid: doc.uid.clone().unwrap_or_else(|| doc.id.clone()),
            published_at: doc
                .first_publication_date
                .as_deref()
                .and_then(parse_timestamp),
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
        }
    }

    /// Get the chronologically previous (older) post in a newest-first list
    pub fn prev<'a>(&self, posts: &'a [PostSummary]) -> Option<&'a PostSummary> {
        let pos = posts.iter().position(|p| p.uid == self.uid)?;
        posts.get(pos + 1)
    }

    /// Get the chronologically next (newer) post in a newest-first list
    pub fn next<'a>(&self, posts: &'a [PostSummary]) -> Option<&'a PostSummary> {
        let pos = posts.iter().position(|p| p.uid == self.uid)?;
        if pos > 0 {
            posts.get(pos - 1)
        } else {
            None
        }
    }
}

/// A content section: heading plus rich-text body fragments
#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

/// A fully-loaded post as shown on the detail page
#[derive(Debug, Clone)]
pub struct Post {
    /// URL slug
    pub uid: String,

    /// First publication timestamp
    pub published_at: Option<DateTime<FixedOffset>>,

    /// Last edit timestamp, when the document changed after publication
    pub updated_at: Option<DateTime<FixedOffset>>,

    /// Post title
    pub title: String,

    /// Banner image URL
    pub banner_url: Option<String>,

    /// Author display name
    pub author: String,

    /// Ordered content sections
    pub sections: Vec<Section>,
}

impl Post {
    /// Build a post from a full document
    pub fn from_document(doc: &Document) -> Self {
        let published_at = doc
            .first_publication_date
            .as_deref()
            .and_then(parse_timestamp);
        let updated_at = doc
            .last_publication_date
            .as_deref()
            .and_then(parse_timestamp)
            .filter(|updated| published_at.map(|p| *updated > p).unwrap_or(true));

        Self {
            uid: doc.uid.clone().unwrap_or_else(|| doc.id.clone()),
            published_at,
            updated_at,
            title: doc.data.title.clone(),
            banner_url: doc.data.banner.url.clone(),
            author: doc.data.author.clone(),
            sections: doc
                .data
                .content
                .iter()
                .map(|section| Section {
                    heading: section.heading.clone(),
                    body: section.body.clone(),
                })
                .collect(),
        }
    }

    /// Total whitespace-delimited word count over every section heading and
    /// body fragment
    pub fn word_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| {
                let heading_words = section.heading.split_whitespace().count();
                let body_words: usize = section
                    .body
                    .iter()
                    .filter_map(|node| node.text.as_deref())
                    .map(|text| text.split_whitespace().count())
                    .sum();
                heading_words + body_words
            })
            .sum()
    }

    /// Estimated reading time in minutes; an empty post reads in 0 minutes
    pub fn reading_time(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE)
    }
}
