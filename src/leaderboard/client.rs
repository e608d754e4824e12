use anyhow::{Context, Result};
use std::time::Duration;

use super::model::{LeaderboardEntry, NewLeaderboardEntry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for a running leaderboard service
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    base_url: String,
    http: reqwest::Client,
}

impl LeaderboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build leaderboard HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/leaderboard", self.base_url)
    }

    pub async fn submit(&self, entry: &NewLeaderboardEntry) -> Result<LeaderboardEntry> {
        self.http
            .post(self.endpoint())
            .json(entry)
            .send()
            .await
            .context("leaderboard submit request failed")?
            .error_for_status()
            .context("leaderboard submit HTTP error")?
            .json()
            .await
            .context("leaderboard submit JSON parse failed")
    }

    pub async fn top(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let mut request = self.http.get(self.endpoint());
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        request
            .send()
            .await
            .context("leaderboard request failed")?
            .error_for_status()
            .context("leaderboard HTTP error")?
            .json()
            .await
            .context("leaderboard JSON parse failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = LeaderboardClient::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080/api/leaderboard");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = LeaderboardClient::new("http://127.0.0.1:9").unwrap();
        let err = client.top(Some(5)).await.unwrap_err();
        assert!(err.to_string().contains("leaderboard request failed"));
    }
}
