//! Conversational agents: provisioning and message exchange.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tama_core::chat::{self, Emotion};
use tama_core::style::Style;

use crate::error::{http_client, parse_response, ProviderError};

/// A companion's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub emotion: Emotion,
}

/// Provider-side identifiers for a provisioned agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRefs {
    pub agent_ref: String,
    pub scene_ref: String,
}

#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Provision an agent for a new companion.
    async fn create_agent(&self, name: &str, style: Style) -> Result<AgentRefs, ProviderError>;

    /// Send `message` within `session_ref` and return the agent's reply.
    ///
    /// `energy` is the companion's current energy, for providers that
    /// derive emotion locally.
    async fn converse(
        &self,
        message: &str,
        session_ref: &str,
        agent_ref: Option<&str>,
        energy: i32,
    ) -> Result<Reply, ProviderError>;
}

/// Lowercased name with spaces replaced, for locally minted refs.
fn slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Refs minted without a provider: `agent_<slug>_<8 hex>`.
pub fn local_agent_refs(name: &str) -> AgentRefs {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &simple[..8];
    let stem = slug(name);
    AgentRefs {
        agent_ref: format!("agent_{stem}_{suffix}"),
        scene_ref: format!("scene_{stem}_{suffix}"),
    }
}

// ---------------------------------------------------------------------------
// Studio HTTP client
// ---------------------------------------------------------------------------

/// Client for a studio-style character API scoped to one workspace.
pub struct StudioClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    workspace_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    default_scene_name: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    text: String,
    emotion: Option<String>,
}

/// Final path segment of a resource name such as `workspaces/w/characters/c`.
fn last_segment(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}

impl StudioClient {
    pub fn new(
        api_url: String,
        api_key: String,
        workspace_id: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            workspace_id,
        })
    }
}

#[async_trait]
impl ConversationProvider for StudioClient {
    async fn create_agent(&self, name: &str, style: Style) -> Result<AgentRefs, ProviderError> {
        let body = serde_json::json!({
            "displayName": name,
            "description": format!("A {style}-style virtual companion named {name}"),
            "personality": style.profile().personality,
            "motivation": "To be a supportive and engaging companion",
            "flaws": "Sometimes too eager to help",
        });

        let response = self
            .client
            .post(format!(
                "{}/workspaces/{}/characters",
                self.api_url, self.workspace_id
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let created: CharacterResponse = parse_response(response).await?;
        let agent_ref = last_segment(&created.name);
        if agent_ref.is_empty() {
            return Err(ProviderError::Malformed("character has no name".to_string()));
        }
        Ok(AgentRefs {
            agent_ref: agent_ref.to_string(),
            scene_ref: last_segment(&created.default_scene_name).to_string(),
        })
    }

    async fn converse(
        &self,
        message: &str,
        session_ref: &str,
        agent_ref: Option<&str>,
        energy: i32,
    ) -> Result<Reply, ProviderError> {
        let Some(agent_ref) = agent_ref else {
            return Err(ProviderError::Malformed(
                "companion has no agent reference".to_string(),
            ));
        };

        let body = serde_json::json!({
            "text": message,
            "characterId": agent_ref,
            "workspaceId": self.workspace_id,
        });
        let response = self
            .client
            .post(format!("{}/sessions/{session_ref}/messages", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: MessageResponse = parse_response(response).await?;
        if parsed.text.trim().is_empty() {
            return Err(ProviderError::Malformed("empty reply".to_string()));
        }
        let emotion = match parsed.emotion.as_deref() {
            Some(label) => Emotion::from_label(label),
            None => chat::determine_emotion(message, energy),
        };
        Ok(Reply {
            text: parsed.text,
            emotion,
        })
    }
}

// ---------------------------------------------------------------------------
// Local responder
// ---------------------------------------------------------------------------

/// Keyword-driven replies. Same input, same output; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalResponder;

impl LocalResponder {
    pub fn reply(message: &str, energy: i32) -> Reply {
        Reply {
            text: chat::fallback_reply(message).to_string(),
            emotion: chat::fallback_emotion(message, energy),
        }
    }
}

#[async_trait]
impl ConversationProvider for LocalResponder {
    async fn create_agent(&self, name: &str, _style: Style) -> Result<AgentRefs, ProviderError> {
        Ok(local_agent_refs(name))
    }

    async fn converse(
        &self,
        message: &str,
        _session_ref: &str,
        _agent_ref: Option<&str>,
        energy: i32,
    ) -> Result<Reply, ProviderError> {
        Ok(Self::reply(message, energy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_refs_use_slug_and_short_suffix() {
        let refs = local_agent_refs("Big Mochi");
        assert!(refs.agent_ref.starts_with("agent_big_mochi_"));
        assert!(refs.scene_ref.starts_with("scene_big_mochi_"));
        assert_eq!(refs.agent_ref.len(), "agent_big_mochi_".len() + 8);
        assert_eq!(
            refs.agent_ref.rsplit('_').next(),
            refs.scene_ref.rsplit('_').next()
        );
    }

    #[test]
    fn resource_names_reduce_to_ids() {
        assert_eq!(last_segment("workspaces/w1/characters/abc"), "abc");
        assert_eq!(last_segment("plain"), "plain");
        assert_eq!(last_segment(""), "");
    }

    #[tokio::test]
    async fn local_responder_is_deterministic() {
        let a = LocalResponder
            .converse("hello there", "s1", None, 80)
            .await
            .unwrap();
        let b = LocalResponder
            .converse("hello there", "s2", Some("agent"), 80)
            .await
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.text, chat::fallback_reply("hello there"));
    }

    #[tokio::test]
    async fn local_responder_reports_tired_at_low_energy() {
        let reply = LocalResponder.converse("wow", "s", None, 10).await.unwrap();
        assert_eq!(reply.emotion, Emotion::Tired);
    }
}
