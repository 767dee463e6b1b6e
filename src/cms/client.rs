//! Content API client
//!
//! Queries are issued against a ref resolved from the repository root
//! endpoint. Pagination cursors (`next_page`) are opaque URLs and are
//! fetched verbatim, never parsed.

use super::document::{ApiInfo, Document, SearchResponse};
use super::error::CmsError;

/// A query predicate in the API's bracket syntax
#[derive(Debug, Clone)]
pub struct Predicate(String);

impl Predicate {
    /// Exact-match predicate, e.g. `at("document.type", "posts")`
    pub fn at(path: &str, value: &str) -> Self {
        Self(format!("[at({path}, \"{value}\")]"))
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for a search query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Ref to query against (master ref or a preview ref)
    pub reference: String,
    /// Field projection, e.g. `posts.title`
    pub fetch: Vec<String>,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    /// Ordering clause, e.g. `[document.first_publication_date desc]`
    pub orderings: Option<String>,
    /// Document id anchor; results start strictly after this document in
    /// the requested ordering. Used for adjacent-post lookups.
    pub after: Option<String>,
}

impl QueryOptions {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("ref", self.reference.clone())];
        if !self.fetch.is_empty() {
            pairs.push(("fetch", self.fetch.join(",")));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(ref orderings) = self.orderings {
            pairs.push(("orderings", orderings.clone()));
        }
        if let Some(ref after) = self.after {
            pairs.push(("after", after.clone()));
        }
        pairs
    }
}

/// Asynchronous client for the repository's query and lookup endpoints
#[derive(Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    api_url: String,
}

impl CmsClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the repository's master ref from the root endpoint
    pub async fn master_ref(&self) -> Result<String, CmsError> {
        let info: ApiInfo = self.get_json(&self.api_url).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::MissingMasterRef)
    }

    /// Run a search query
    pub async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, CmsError> {
        let q = format!(
            "[{}]",
            predicates
                .iter()
                .map(|p| p.to_string())
                .collect::<String>()
        );
        let url = format!("{}/documents/search", self.api_url);

        let mut pairs = options.to_pairs();
        pairs.push(("q", q));

        let response = self.http.get(&url).query(&pairs).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a stored pagination cursor verbatim
    pub async fn next_page(&self, cursor: &str) -> Result<SearchResponse, CmsError> {
        self.get_json(cursor).await
    }

    /// Look up a single document by uid
    ///
    /// Returns `CmsError::NotFound` only when the API answered and no
    /// matching document exists; transport failures stay distinct.
    pub async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: &str,
    ) -> Result<Document, CmsError> {
        let predicates = [
            Predicate::at("document.type", doc_type),
            Predicate::at(&format!("my.{doc_type}.uid"), uid),
        ];
        let options = QueryOptions {
            reference: reference.to_string(),
            page_size: Some(1),
            ..Default::default()
        };
        let mut response = self.query(&predicates, &options).await?;
        if response.results.is_empty() {
            return Err(CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            });
        }
        Ok(response.results.remove(0))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CmsError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status,
                url: response.url().to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_syntax() {
        let p = Predicate::at("document.type", "posts");
        assert_eq!(p.to_string(), "[at(document.type, \"posts\")]");
    }

    #[test]
    fn test_query_pairs() {
        let options = QueryOptions {
            reference: "YB-abc".to_string(),
            fetch: vec!["posts.title".to_string(), "posts.author".to_string()],
            page_size: Some(20),
            page: Some(2),
            orderings: Some("[document.first_publication_date desc]".to_string()),
            after: None,
        };
        let pairs = options.to_pairs();
        assert_eq!(pairs[0], ("ref", "YB-abc".to_string()));
        assert!(pairs.contains(&("fetch", "posts.title,posts.author".to_string())));
        assert!(pairs.contains(&("pageSize", "20".to_string())));
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "after"));
    }

    #[test]
    fn test_not_found_is_distinct() {
        let err = CmsError::NotFound {
            doc_type: "posts".to_string(),
            uid: "missing".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!CmsError::MissingMasterRef.is_not_found());
    }
}
