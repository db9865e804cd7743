//! Post search, one-shot or as-you-type.

use inkpost_api_types::{Post, SearchResults};
use tokio::sync::mpsc;
use tracing::debug;

use crate::client::ApiClient;
use crate::config::SearchSettings;

use super::context::AppContext;
use super::debounce::Debouncer;
use super::error::AppError;

#[derive(Clone)]
pub struct SearchService {
    api: ApiClient,
    settings: SearchSettings,
}

impl SearchService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
            settings: ctx.search_settings().clone(),
        }
    }

    /// Blank queries return no posts without contacting the server.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("q", query.to_string()),
            ("type", "posts".to_string()),
            ("limit", self.settings.limit.to_string()),
        ];
        let results: SearchResults = self.api.get("/api/search", &params).await?;
        let posts = results.into_posts();
        debug!(query, hits = posts.len(), "search finished");
        Ok(posts)
    }

    /// Search-as-you-type: only the last query of a burst is sent, after
    /// the configured quiet period.
    pub fn live(&self) -> LiveSearch {
        let (tx, results) = mpsc::unbounded_channel();
        let service = self.clone();
        let debouncer = Debouncer::spawn(self.settings.debounce, move |query: String| {
            let service = service.clone();
            let tx = tx.clone();
            async move {
                let result = service.search(&query).await;
                let _ = tx.send(SearchOutcome { query, result });
            }
        });
        LiveSearch { debouncer, results }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub query: String,
    pub result: Result<Vec<Post>, AppError>,
}

pub struct LiveSearch {
    debouncer: Debouncer<String>,
    results: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl LiveSearch {
    pub fn input(&self, query: impl Into<String>) {
        self.debouncer.submit(query.into());
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }

    /// Next finished search, `None` once the session is closed.
    pub async fn next(&mut self) -> Option<SearchOutcome> {
        self.results.recv().await
    }

    /// Run the pending query now and collect every outcome not yet read.
    pub async fn finish(self) -> Vec<SearchOutcome> {
        let Self {
            debouncer,
            mut results,
        } = self;
        debouncer.finish().await;

        let mut outcomes = Vec::new();
        while let Some(outcome) = results.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}
