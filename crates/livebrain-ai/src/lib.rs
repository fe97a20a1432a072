pub mod engine;
pub mod parse;
pub mod prompt;

use livebrain_compiler::{ArchitecturePlan, GenerationQueueItem};
use livebrain_core::{AiSettings, ProjectInfo, RouteDefinition};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("no AI provider configured (see `livebrain settings set`)")]
    NotConfigured,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{0}")]
    Provider(String),

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("all providers failed: {}", .0.join("; "))]
    AllProvidersFailed(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub component: String,
    pub route: String,
    /// Relative to the output directory, e.g. `app/product/[id]/page.tsx`
    pub file: String,
    pub source: String,
}

/// `/` -> `app/page.tsx`, `/product/[id]/edit` -> `app/product/[id]/edit/page.tsx`.
///
/// Empty, `.` and `..` segments are dropped so the file stays under `app/`.
pub fn page_file_path(route_path: &str) -> String {
    let segments: Vec<&str> = route_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    if segments.is_empty() {
        "app/page.tsx".to_string()
    } else {
        format!("app/{}/page.tsx", segments.join("/"))
    }
}

/// Ask the configured providers for the page file of one route.
pub async fn generate_page(
    settings: &AiSettings,
    project: &ProjectInfo,
    item: &GenerationQueueItem,
    route: &RouteDefinition,
    plan: &ArchitecturePlan,
) -> Result<GeneratedPage, AiError> {
    let system = prompt::system_prompt(project);
    let user_msg = prompt::page_prompt(item, route, plan);

    tracing::info!(component = %item.name(), route = %route.path, "generating page");
    let raw = engine::generate_with_fallback(settings, &system, &user_msg).await?;
    tracing::trace!(raw = %raw, "raw LLM output");

    let source = parse::extract_code(&raw).ok_or(AiError::EmptyResponse)?;
    Ok(GeneratedPage {
        component: item.name().to_string(),
        route: route.path.clone(),
        file: page_file_path(&route.path),
        source,
    })
}
