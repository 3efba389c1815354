//! Built-in provider catalog

use super::{Provider, ProviderType};

struct CatalogEntry {
    slug: &'static str,
    name: &'static str,
    provider_type: ProviderType,
    base_url: &'static str,
    api_key_alias: &'static str,
    get_key_url: &'static str,
    models: &'static [&'static str],
}

fn catalog() -> [CatalogEntry; 6] {
    [
        CatalogEntry {
            slug: "openai",
            name: "OpenAI",
            provider_type: ProviderType::Direct,
            base_url: "https://api.openai.com/v1",
            api_key_alias: "OPENAI_API_KEY",
            get_key_url: "https://platform.openai.com/api-keys",
            models: &["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo", "gpt-3.5-turbo-16k"],
        },
        CatalogEntry {
            slug: "anthropic",
            name: "Anthropic",
            provider_type: ProviderType::Direct,
            base_url: "https://api.anthropic.com/v1",
            api_key_alias: "ANTHROPIC_API_KEY",
            get_key_url: "https://console.anthropic.com/settings/keys",
            models: &["claude-3-opus", "claude-3-sonnet", "claude-3-haiku", "claude-2.1"],
        },
        CatalogEntry {
            slug: "google",
            name: "Google Gemini",
            provider_type: ProviderType::Direct,
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
            api_key_alias: "GOOGLE_API_KEY",
            get_key_url: "https://aistudio.google.com/app/apikey",
            models: &["gemini-pro", "gemini-pro-vision", "gemini-ultra"],
        },
        CatalogEntry {
            slug: "mistral",
            name: "Mistral",
            provider_type: ProviderType::Direct,
            base_url: "https://api.mistral.ai/v1",
            api_key_alias: "MISTRAL_API_KEY",
            get_key_url: "https://console.mistral.ai/api-keys",
            models: &["mistral-large", "mistral-medium", "mistral-small", "mistral-tiny"],
        },
        CatalogEntry {
            slug: "deepseek",
            name: "DeepSeek",
            provider_type: ProviderType::Direct,
            base_url: "https://api.deepseek.com/v1",
            api_key_alias: "DEEPSEEK_API_KEY",
            get_key_url: "https://platform.deepseek.com/api_keys",
            models: &["deepseek-chat", "deepseek-coder"],
        },
        CatalogEntry {
            slug: "openrouter",
            name: "OpenRouter",
            provider_type: ProviderType::OpenRouter,
            base_url: "https://openrouter.ai/api/v1",
            api_key_alias: "OPENROUTER_API_KEY",
            get_key_url: "https://openrouter.ai/keys",
            models: &["openai/gpt-4o", "anthropic/claude-3.5-sonnet", "meta-llama/llama-3-70b-instruct"],
        },
    ]
}

/// Providers seeded into a fresh application state
pub fn default_providers() -> Vec<Provider> {
    catalog()
        .into_iter()
        .map(|entry| Provider {
            id: entry.slug.to_string(),
            name: entry.name.to_string(),
            slug: entry.slug.to_string(),
            provider_type: entry.provider_type,
            base_url: Some(entry.base_url.to_string()),
            models: entry.models.iter().map(|m| m.to_string()).collect(),
            api_key_alias: entry.api_key_alias.to_string(),
            get_key_url: entry.get_key_url.to_string(),
            notes: None,
        })
        .collect()
}

/// Default API base URL for a known provider slug
pub fn default_base_url(slug: &str) -> Option<&'static str> {
    let slug = slug.to_lowercase();
    catalog()
        .into_iter()
        .find(|entry| entry.slug == slug)
        .map(|entry| entry.base_url)
}

/// Model names known for a provider slug; unknown slugs get placeholders
pub fn known_models(slug: &str) -> Vec<String> {
    let slug = slug.to_lowercase();
    catalog()
        .into_iter()
        .find(|entry| entry.slug == slug)
        .map(|entry| entry.models.iter().map(|m| m.to_string()).collect())
        .unwrap_or_else(|| vec!["model-1".to_string(), "model-2".to_string(), "model-3".to_string()])
}
