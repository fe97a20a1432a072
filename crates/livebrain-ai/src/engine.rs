use std::future::Future;

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use livebrain_core::{AiSettings, ProviderSettings};

use crate::AiError;

/// Upper bound on tokens for a single generated file.
const MAX_TOKENS: u32 = 4096;

pub fn map_backend(provider: &str) -> Result<LLMBackend, AiError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(AiError::UnknownProvider(other.to_string())),
    }
}

/// One chat round-trip against a single provider.
pub async fn generate(
    provider: &ProviderSettings,
    system: &str,
    user_msg: &str,
) -> Result<String, AiError> {
    let backend = map_backend(&provider.provider)?;

    let mut builder = LLMBuilder::new()
        .backend(backend)
        .model(&provider.model)
        .max_tokens(MAX_TOKENS)
        .system(system);

    if !provider.api_key.is_empty() {
        builder = builder.api_key(&provider.api_key);
    }

    let llm = builder
        .build()
        .map_err(|e| AiError::Provider(format!("build LLM: {e}")))?;

    let messages = vec![ChatMessage::user().content(user_msg).build()];

    let response = llm
        .chat(&messages)
        .await
        .map_err(|e| AiError::Provider(format!("chat: {e}")))?;

    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(AiError::EmptyResponse),
        None => Err(AiError::EmptyResponse),
    }
}

/// Try the primary provider, then each configured fallback in order.
/// The first non-empty answer wins; there is no retry within a provider.
pub async fn generate_with_fallback(
    settings: &AiSettings,
    system: &str,
    user_msg: &str,
) -> Result<String, AiError> {
    let chain = settings.provider_chain();
    first_success(&chain, |provider| generate(provider, system, user_msg)).await
}

/// Run `call` against each provider until one succeeds.
pub(crate) async fn first_success<'a, F, Fut>(
    chain: &'a [ProviderSettings],
    mut call: F,
) -> Result<String, AiError>
where
    F: FnMut(&'a ProviderSettings) -> Fut,
    Fut: Future<Output = Result<String, AiError>>,
{
    if chain.is_empty() {
        return Err(AiError::NotConfigured);
    }

    let mut failures = Vec::with_capacity(chain.len());
    for provider in chain {
        tracing::debug!(provider = %provider.provider, model = %provider.model, "sending prompt");
        match call(provider).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                tracing::warn!(provider = %provider.provider, error = %e, "provider failed");
                failures.push(format!("{}: {}", provider.provider, e));
            }
        }
    }

    Err(AiError::AllProvidersFailed(failures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map() {
        for name in ["openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek"] {
            assert!(map_backend(name).is_ok(), "{name}");
        }
        assert!(matches!(
            map_backend("watsonx"),
            Err(AiError::UnknownProvider(p)) if p == "watsonx"
        ));
    }

    #[tokio::test]
    async fn unconfigured_settings_fail_fast() {
        let err = generate_with_fallback(&AiSettings::default(), "s", "u")
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }

    #[tokio::test]
    async fn unknown_providers_are_all_reported() {
        let settings = AiSettings {
            provider: "watsonx".into(),
            api_key: "k".into(),
            model: "m".into(),
            fallbacks: vec![ProviderSettings {
                provider: "bard".into(),
                api_key: "k".into(),
                model: "m".into(),
            }],
        };
        match generate_with_fallback(&settings, "s", "u").await.unwrap_err() {
            AiError::AllProvidersFailed(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].starts_with("watsonx:"));
                assert!(failures[1].starts_with("bard:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn later_provider_answers_after_primary_fails() {
        let chain = vec![
            ProviderSettings {
                provider: "anthropic".into(),
                api_key: "k".into(),
                model: "m".into(),
            },
            ProviderSettings {
                provider: "ollama".into(),
                api_key: String::new(),
                model: "llama3".into(),
            },
        ];
        let mut tried = Vec::new();
        let text = first_success(&chain, |p| {
            tried.push(p.provider.clone());
            let answer = if p.provider == "ollama" {
                Ok("export default function Page() {}".to_string())
            } else {
                Err(AiError::Provider("rate limited".into()))
            };
            async move { answer }
        })
        .await
        .unwrap();

        assert_eq!(text, "export default function Page() {}");
        assert_eq!(tried, vec!["anthropic", "ollama"]);
    }
}
