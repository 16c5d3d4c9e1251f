// Ranking service client.
//
// Asks `GET {base_url}/leagues/{league}/suggestions?participant={id}` for a
// single recommended player. Any failure is returned as an error; the draft
// coordinator decides that a failed suggestion is simply "unavailable".

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use tracing::debug;

use draftboard_core::advisor::{PickAdvisor, RankedPlayer, SuggestionRequest};
use draftboard_core::config::AdvisorConfig;
use draftboard_core::{LeagueId, ParticipantId};

// ---------------------------------------------------------------------------
// RankingClient
// ---------------------------------------------------------------------------

/// Low-level client for the ranking service.
pub struct RankingClient {
    http: reqwest::Client,
    base_url: String,
}

impl RankingClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build ranking service HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn suggestion_url(&self, league_id: LeagueId, participant_id: ParticipantId) -> String {
        format!(
            "{}/leagues/{}/suggestions?participant={}",
            self.base_url, league_id, participant_id
        )
    }

    /// Fetch the service's top pick for `participant_id`.
    pub async fn fetch_suggestion(
        &self,
        league_id: LeagueId,
        participant_id: ParticipantId,
    ) -> anyhow::Result<Option<RankedPlayer>> {
        let url = self.suggestion_url(league_id, participant_id);
        let response = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .with_context(|| format!("ranking request to {url} failed"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            bail!("ranking service returned {status}");
        }

        let body = response
            .text()
            .await
            .context("failed to read ranking response body")?;
        debug!("ranking response for league {}: {}", league_id, body);
        parse_suggestion(&body)
    }
}

// ---------------------------------------------------------------------------
// AdvisorClient
// ---------------------------------------------------------------------------

/// Advisor selected by configuration.
pub enum AdvisorClient {
    /// Talks to the ranking service.
    Active(RankingClient),
    /// No ranking service configured; never suggests anything.
    Disabled,
}

impl AdvisorClient {
    /// Returns `Active` when the advisor is enabled in config, otherwise
    /// `Disabled`.
    pub fn from_config(config: &AdvisorConfig) -> anyhow::Result<Self> {
        if !config.enabled {
            return Ok(AdvisorClient::Disabled);
        }
        Ok(AdvisorClient::Active(RankingClient::new(
            &config.base_url,
            config.timeout(),
        )?))
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AdvisorClient::Active(_))
    }
}

#[async_trait]
impl PickAdvisor for AdvisorClient {
    async fn suggest(&self, request: &SuggestionRequest) -> anyhow::Result<Option<RankedPlayer>> {
        match self {
            AdvisorClient::Active(client) => {
                client
                    .fetch_suggestion(request.league_id, request.participant_id)
                    .await
            }
            AdvisorClient::Disabled => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parse a suggestion body. An empty body or JSON `null` means no suggestion.
pub(crate) fn parse_suggestion(body: &str) -> anyhow::Result<Option<RankedPlayer>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<RankedPlayer>>(body).context("malformed ranking response")
}
