//! Timeout-bounded provider calls with deterministic local fallbacks.
//!
//! Image and conversation failures never reach the user: they are logged
//! at `warn` and replaced. Payment calls are not wrapped here; their
//! failures must surface.

use std::future::Future;
use std::time::Duration;

use tama_core::style::{self, Style};

use crate::conversation::{local_agent_refs, AgentRefs, ConversationProvider, LocalResponder, Reply};
use crate::error::ProviderError;
use crate::image::ImageProvider;

/// Run `fut` with an upper bound, mapping expiry to [`ProviderError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(limit)),
    }
}

/// Avatar variants from `provider`, or placeholders.
///
/// A provider returning fewer than `count` images is topped up with
/// placeholders so callers always receive exactly `count`.
pub async fn generate_or_placeholders(
    provider: &dyn ImageProvider,
    style: Style,
    name: &str,
    count: usize,
    limit: Duration,
) -> Vec<String> {
    let prompt = style.portrait_prompt(name);
    match bounded(limit, provider.generate(style, &prompt, count)).await {
        Ok(mut images) => {
            images.truncate(count);
            if images.len() < count {
                let fill = style::placeholders(style, count);
                images.extend(fill.into_iter().skip(images.len()));
            }
            images
        }
        Err(err) => {
            tracing::warn!(error = %err, style = %style, "Image generation failed, using placeholders");
            style::placeholders(style, count)
        }
    }
}

/// A reply from `provider`, or the local responder's.
pub async fn converse_or_fallback(
    provider: &dyn ConversationProvider,
    message: &str,
    session_ref: &str,
    agent_ref: Option<&str>,
    energy: i32,
    limit: Duration,
) -> Reply {
    match bounded(limit, provider.converse(message, session_ref, agent_ref, energy)).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(error = %err, session_ref, "Conversation provider failed, using local responder");
            LocalResponder::reply(message, energy)
        }
    }
}

/// Agent refs from `provider`, or locally minted ones.
pub async fn provision_agent_or_local(
    provider: &dyn ConversationProvider,
    name: &str,
    style: Style,
    limit: Duration,
) -> AgentRefs {
    match bounded(limit, provider.create_agent(name, style)).await {
        Ok(refs) => refs,
        Err(err) => {
            tracing::warn!(error = %err, "Agent provisioning failed, using local refs");
            local_agent_refs(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tama_core::chat;

    struct FailingImages;

    #[async_trait]
    impl ImageProvider for FailingImages {
        async fn generate(&self, _: Style, _: &str, _: usize) -> Result<Vec<String>, ProviderError> {
            Err(ProviderError::Api {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    struct PartialImages;

    #[async_trait]
    impl ImageProvider for PartialImages {
        async fn generate(&self, _: Style, _: &str, _: usize) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["data:image/png;base64,AAA".to_string()])
        }
    }

    struct SlowConversation;

    #[async_trait]
    impl ConversationProvider for SlowConversation {
        async fn create_agent(&self, _: &str, _: Style) -> Result<AgentRefs, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ProviderError::Malformed("unreachable".to_string()))
        }

        async fn converse(
            &self,
            _: &str,
            _: &str,
            _: Option<&str>,
            _: i32,
        ) -> Result<Reply, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ProviderError::Malformed("unreachable".to_string()))
        }
    }

    const LIMIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn failed_generation_yields_placeholders() {
        let images = generate_or_placeholders(&FailingImages, Style::Anime, "Mochi", 4, LIMIT).await;
        assert_eq!(images, style::placeholders(Style::Anime, 4));
    }

    #[tokio::test]
    async fn short_generation_is_topped_up() {
        let images = generate_or_placeholders(&PartialImages, Style::Fantasy, "Mochi", 4, LIMIT).await;
        assert_eq!(images.len(), 4);
        assert_eq!(images[0], "data:image/png;base64,AAA");
        assert_eq!(images[1], style::placeholders(Style::Fantasy, 4)[1]);
    }

    #[tokio::test]
    async fn slow_conversation_falls_back_to_local_reply() {
        let reply = converse_or_fallback(&SlowConversation, "hello", "s", None, 80, LIMIT).await;
        assert_eq!(reply.text, chat::fallback_reply("hello"));
    }

    #[tokio::test]
    async fn slow_provisioning_mints_local_refs() {
        let refs = provision_agent_or_local(&SlowConversation, "Mochi", Style::Anime, LIMIT).await;
        assert!(refs.agent_ref.starts_with("agent_mochi_"));
    }

    #[tokio::test]
    async fn bounded_reports_timeout() {
        let result: Result<(), ProviderError> = bounded(LIMIT, async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Timeout(limit)) if limit == LIMIT));
    }
}
