use std::sync::Arc;
use tracing::{debug, info};

use crate::api_client::{CatalogError, CatalogQuery, CatalogSource};
use crate::data::{CharacterSet, PageInfo};
use crate::state::{Observable, ReadOnly};

/// Owner of the current character set.
///
/// Every successful fetch replaces the set wholesale, whoever triggered it.
/// A failed fetch leaves it untouched. Overlapping calls are not sequenced:
/// the last response to arrive wins.
#[derive(Clone)]
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    characters: Observable<CharacterSet>,
    page_info: Observable<Option<PageInfo>>,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            characters: Observable::default(),
            page_info: Observable::default(),
        }
    }

    /// Read-only view of the current set
    pub fn characters(&self) -> ReadOnly<CharacterSet> {
        self.characters.read_only()
    }

    /// Paging metadata of the last successful response
    pub fn page_info(&self) -> ReadOnly<Option<PageInfo>> {
        self.page_info.read_only()
    }

    /// Fetch the full listing
    pub async fn fetch_all(&self) -> Result<CharacterSet, CatalogError> {
        self.run(CatalogQuery::All).await
    }

    /// Fetch characters whose name matches `term`. Blank terms fetch the
    /// full listing instead.
    pub async fn fetch_by_name(&self, term: &str) -> Result<CharacterSet, CatalogError> {
        let term = term.trim();
        if term.is_empty() {
            return self.fetch_all().await;
        }
        self.run(CatalogQuery::ByName(term.to_string())).await
    }

    async fn run(&self, query: CatalogQuery) -> Result<CharacterSet, CatalogError> {
        debug!(target: "catalog", "Fetching {:?}", query);

        let response = self.source.fetch(&query).await?;

        info!(
            target: "catalog",
            "Received {} characters for {:?}",
            response.results.len(),
            query
        );
        self.characters.set(response.results.clone());
        self.page_info.set(response.info);
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::MockCatalogSource;
    use crate::data::{ApiResponse, Character};
    use mockall::predicate::eq;

    fn character(id: u64, name: &str) -> Character {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    fn response(names: &[&str]) -> ApiResponse {
        ApiResponse {
            info: None,
            results: names
                .iter()
                .enumerate()
                .map(|(i, n)| character(i as u64 + 1, n))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_replaces_set_in_order() {
        let mut source = MockCatalogSource::new();
        source
            .expect_fetch()
            .with(eq(CatalogQuery::All))
            .times(1)
            .returning(|_| Ok(response(&["Beth", "Abe", "Zed"])));

        let client = CatalogClient::new(Arc::new(source));
        let view = client.characters();

        let set = client.fetch_all().await.unwrap();
        let names: Vec<String> = view.get().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Beth", "Abe", "Zed"]);
        assert_eq!(set, view.get());
    }

    #[tokio::test]
    async fn test_blank_terms_fall_back_to_listing() {
        let mut source = MockCatalogSource::new();
        source
            .expect_fetch()
            .with(eq(CatalogQuery::All))
            .times(3)
            .returning(|_| Ok(response(&["Rick", "Morty"])));

        let client = CatalogClient::new(Arc::new(source));
        let a = client.fetch_by_name("").await.unwrap();
        let b = client.fetch_by_name("   ").await.unwrap();
        let c = client.fetch_all().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn test_search_sends_trimmed_term() {
        let mut source = MockCatalogSource::new();
        source
            .expect_fetch()
            .with(eq(CatalogQuery::ByName("rick".to_string())))
            .times(1)
            .returning(|_| Ok(response(&["Rick Sanchez"])));

        let client = CatalogClient::new(Arc::new(source));
        let set = client.fetch_by_name("  rick \t").await.unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_set() {
        let mut source = MockCatalogSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(&["Summer"])));
        source
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(CatalogError::NotFound));

        let client = CatalogClient::new(Arc::new(source));
        client.fetch_all().await.unwrap();

        let err = client.fetch_by_name("zzz").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(client.characters().get()[0].name, "Summer");
    }

    #[tokio::test]
    async fn test_page_info_tracks_last_success() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch().returning(|_| {
            Ok(ApiResponse {
                info: Some(PageInfo {
                    count: 826,
                    pages: 42,
                    next: None,
                    prev: None,
                }),
                results: Vec::new(),
            })
        });

        let client = CatalogClient::new(Arc::new(source));
        assert!(client.page_info().get().is_none());
        client.fetch_all().await.unwrap();
        assert_eq!(client.page_info().get().map(|i| i.count), Some(826));
    }
}
