use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use gallery_config::WikiConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::CategorySource;

/// MediaWiki `api.php` client listing category members page by page.
#[derive(Clone)]
pub struct WikiCategorySource {
    endpoint: String,
    http: reqwest::Client,
    max_results: usize,
    max_rounds: usize,
}

impl WikiCategorySource {
    pub fn new(endpoint: impl Into<String>, max_results: usize, max_rounds: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            max_results,
            max_rounds,
        }
    }

    pub fn from_config(config: &WikiConfig) -> Self {
        Self::new(&config.endpoint, config.max_results, config.max_rounds)
    }

    async fn fetch_page(&self, category: &str, continuation: Option<String>) -> Result<MemberPage> {
        let mut params = vec![
            ("action", "query"),
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmlimit", "max"),
            ("format", "json"),
            ("origin", "*"),
        ];
        if let Some(token) = continuation.as_deref() {
            params.push(("cmcontinue", token));
        }

        let resp: QueryResponse = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.into_page())
    }
}

#[async_trait]
impl CategorySource for WikiCategorySource {
    async fn category_members(&self, category: &str) -> Result<Vec<String>> {
        collect_pages(self.max_results, self.max_rounds, move |continuation| {
            self.fetch_page(category, continuation)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "mediawiki"
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemberPage {
    pub titles: Vec<String>,
    pub continuation: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(default)]
    categorymembers: Vec<Member>,
}

#[derive(Deserialize)]
struct Member {
    title: Option<String>,
}

#[derive(Deserialize)]
struct Continuation {
    cmcontinue: Option<String>,
}

impl QueryResponse {
    fn into_page(self) -> MemberPage {
        let titles = self
            .query
            .map(|q| q.categorymembers)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.title.filter(|t| !t.is_empty()))
            .collect();
        MemberPage {
            titles,
            continuation: self.continuation.and_then(|c| c.cmcontinue),
        }
    }
}

/// Follows continuation tokens until exhausted, `max_results` titles are
/// collected, or `max_rounds` pages have been requested.
pub(crate) async fn collect_pages<F, Fut>(
    max_results: usize,
    max_rounds: usize,
    mut fetch: F,
) -> Result<Vec<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<MemberPage>>,
{
    let mut results = Vec::new();
    let mut continuation = None;
    let mut rounds = 0;

    while results.len() < max_results {
        if rounds == max_rounds {
            warn!(rounds, collected = results.len(), "stopping category pagination at round limit");
            break;
        }
        rounds += 1;

        let page = fetch(continuation.take()).await?;
        debug!(round = rounds, titles = page.titles.len(), "category page");
        results.extend(page.titles);

        match page.continuation {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    results.truncate(max_results);
    Ok(results)
}
