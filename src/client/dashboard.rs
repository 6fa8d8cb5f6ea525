use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::{ApiClient, Effect, LLM_PATH};
use crate::llm::dto::LlmResponse;

/// One question and the answer shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExchange {
    pub input: String,
    pub output: String,
}

/// Query box plus the answers received so far, newest first. Nothing
/// survives the page.
#[derive(Debug, Default)]
pub struct DashboardPage {
    pub query: String,
    history: Vec<QueryExchange>,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[QueryExchange] {
        &self.history
    }

    /// Sends the current query and clears the box. The answer is prepended to
    /// the history once it arrives; a failure only alerts.
    pub async fn submit(&mut self, api: &dyn ApiClient) -> Vec<Effect> {
        if self.query.is_empty() {
            return Vec::new();
        }
        let input = std::mem::take(&mut self.query);

        let output = match api.post_json(LLM_PATH, json!({ "prompt": input })).await {
            Ok(res) if res.is_success() => match res.json::<LlmResponse>() {
                Ok(body) => body.text,
                Err(e) => {
                    warn!(error = %e, "llm response unreadable");
                    return vec![Effect::Alert("Query failed".into())];
                }
            },
            Ok(res) => {
                warn!(status = res.status, "llm query rejected");
                return vec![Effect::Alert("Query failed".into())];
            }
            Err(e) => {
                warn!(error = %e, "llm query failed");
                return vec![Effect::Alert("Query failed".into())];
            }
        };

        self.history.insert(0, QueryExchange { input, output });
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::testing::{FixedClient, OfflineClient, RouterClient},
        state::AppState,
    };

    #[tokio::test]
    async fn newest_exchange_comes_first() {
        let api = RouterClient::new(AppState::fake());
        let mut page = DashboardPage::new();

        page.query = "A".into();
        assert!(page.submit(&api).await.is_empty());
        page.query = "B".into();
        assert!(page.submit(&api).await.is_empty());

        let inputs: Vec<&str> = page.history().iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["B", "A"]);
        assert!(page.history()[0].output.contains('B'));
        assert!(page.history()[1].output.contains('A'));
    }

    #[tokio::test]
    async fn submit_clears_the_query_box() {
        let api = RouterClient::new(AppState::fake());
        let mut page = DashboardPage::new();
        page.query = "how much fibre in oats?".into();

        page.submit(&api).await;
        assert!(page.query.is_empty());
        assert_eq!(page.history().len(), 1);
    }

    #[tokio::test]
    async fn empty_query_sends_nothing() {
        let api = RouterClient::new(AppState::fake());
        let mut page = DashboardPage::new();

        assert!(page.submit(&api).await.is_empty());
        assert!(api.calls().is_empty());
        assert!(page.history().is_empty());
    }

    #[tokio::test]
    async fn failure_alerts_and_leaves_history_alone() {
        let mut page = DashboardPage::new();
        page.query = "A".into();
        let effects = page.submit(&OfflineClient).await;
        assert_eq!(effects, vec![Effect::Alert("Query failed".into())]);
        assert!(page.history().is_empty());
        assert!(page.query.is_empty());

        page.query = "B".into();
        let api = FixedClient {
            status: 500,
            body: b"",
        };
        let effects = page.submit(&api).await;
        assert_eq!(effects, vec![Effect::Alert("Query failed".into())]);
        assert!(page.history().is_empty());
    }

    #[tokio::test]
    async fn unreadable_answer_alerts() {
        let api = FixedClient {
            status: 200,
            body: b"<html>",
        };
        let mut page = DashboardPage::new();
        page.query = "A".into();
        let effects = page.submit(&api).await;
        assert_eq!(effects, vec![Effect::Alert("Query failed".into())]);
    }
}
