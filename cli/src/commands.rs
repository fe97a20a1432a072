use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use livebrain_ai::GeneratedPage;
use livebrain_compiler::{ArchitectureCompiler, ArchitecturePlan, GenerationQueueItem};
use livebrain_core::brain::{self, LivingBrain};
use livebrain_core::settings;
use livebrain_core::{ComponentNode, GeneratedFile, ProjectInfo, ProviderSettings};

pub fn init(
    root: &Path,
    name: &str,
    description: &str,
    framework: &str,
    styling: &str,
    force: bool,
) -> Result<String> {
    let project = ProjectInfo {
        name: name.to_string(),
        description: description.to_string(),
        framework: framework.to_string(),
        styling: styling.to_string(),
    };
    brain::init_brain(root, project, force)?;
    Ok(format!(
        "Initialized project '{}' in {}",
        name,
        brain::brain_dir(root).display()
    ))
}

pub fn import(root: &Path, manifest: &Path) -> Result<String> {
    let mut brain = brain::read_brain(root)?;
    let tree = brain::read_component_tree(manifest)
        .with_context(|| format!("cannot load component tree from {}", manifest.display()))?;
    let count = tree.subtree_size();
    brain.record("import", manifest.display().to_string());
    brain.components = Some(tree);
    brain.plan = None;
    brain::write_brain(root, &brain)?;
    Ok(format!("Imported {count} components from {}", manifest.display()))
}

fn component_tree(brain: &LivingBrain) -> Result<&ComponentNode> {
    brain
        .components
        .as_ref()
        .ok_or_else(|| anyhow!("no component tree imported (run `livebrain import <manifest>`)"))
}

async fn compile_brain(
    brain: &LivingBrain,
) -> Result<(Vec<GenerationQueueItem>, ArchitecturePlan)> {
    let tree = component_tree(brain)?;
    let compiler = ArchitectureCompiler::default();
    let queue = compiler
        .compile(tree)
        .await
        .context("architecture compilation failed")?;
    let plan = ArchitecturePlan::from_queue(tree, &brain.project, &queue, compiler.synthesizer())
        .context("architecture plan projection failed")?;
    Ok((queue, plan))
}

pub async fn plan(root: &Path, json: bool) -> Result<String> {
    let mut brain = brain::read_brain(root)?;
    let (_, plan) = compile_brain(&brain).await?;

    let value = serde_json::to_value(&plan)?;
    brain.plan = Some(value.clone());
    brain.record(
        "plan",
        format!(
            "{} components, {} routes",
            plan.metadata.total_components, plan.metadata.total_routes
        ),
    );
    brain::write_brain(root, &brain)?;

    if json {
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let m = &plan.metadata;
    let mut out = String::new();
    writeln!(out, "Project: {} ({}, {})", m.project.name, m.project.framework, m.project.styling)?;
    writeln!(out, "Components: {} (max depth {})", m.total_components, m.max_depth)?;
    writeln!(out, "Routes: {}", m.total_routes)?;
    for (path, route) in &plan.routes {
        writeln!(out, "  {path} -> {}", route.page)?;
    }
    writeln!(out, "API endpoints: {}", m.total_api_endpoints)?;
    for (path, api) in &plan.api {
        let methods: Vec<&str> = api.methods.iter().map(|m| m.as_str()).collect();
        writeln!(out, "  {} {path} ({})", methods.join(","), api.actions.join(", "))?;
    }
    writeln!(out, "Server actions: {}", m.total_server_actions)?;
    write!(out, "Strategy: {}", m.strategy)?;
    Ok(out)
}

pub async fn queue(root: &Path) -> Result<String> {
    let brain = brain::read_brain(root)?;
    let (queue, _) = compile_brain(&brain).await?;

    let mut out = String::new();
    for (i, item) in queue.iter().enumerate() {
        let routes: Vec<&str> = item.own_routes().iter().map(|r| r.path.as_str()).collect();
        writeln!(
            out,
            "{:>3}. [{:>4}] {}{} ({}){}",
            i + 1,
            item.generation_order,
            "  ".repeat(item.level),
            item.name(),
            item.component.component_type.as_str(),
            if routes.is_empty() {
                String::new()
            } else {
                format!(" {}", routes.join(" "))
            }
        )?;
    }
    Ok(out)
}

pub async fn docs(root: &Path, component: &str) -> Result<String> {
    let brain = brain::read_brain(root)?;
    let (queue, _) = compile_brain(&brain).await?;
    queue
        .into_iter()
        .find(|item| item.name() == component)
        .map(|item| item.self_documentation)
        .ok_or_else(|| anyhow!("component '{component}' not found in the tree"))
}

pub async fn generate(root: &Path, out_dir: &Path, dry_run: bool) -> Result<String> {
    let mut brain = brain::read_brain(root)?;
    let (queue, plan) = compile_brain(&brain).await?;

    let mut ai = settings::read_settings();
    ai.apply_env(|key| std::env::var(key).ok());
    if !dry_run && ai.provider_chain().is_empty() {
        bail!("no AI provider configured (run `livebrain settings set --provider <p> --model <m>`)");
    }
    tracing::info!(components = queue.len(), dry_run, "generating pages");

    let mut out = String::new();
    let mut pages = Vec::new();
    for item in &queue {
        for route in item.own_routes() {
            if dry_run {
                writeln!(out, "=== {} {}", item.name(), route.path)?;
                writeln!(out, "{}", livebrain_ai::prompt::page_prompt(item, route, &plan))?;
                continue;
            }

            let page = livebrain_ai::generate_page(&ai, &brain.project, item, route, &plan)
                .await
                .with_context(|| {
                    format!("generation failed for '{}' at {}", item.name(), route.path)
                })?;
            pages.push(page);
        }
    }

    if !dry_run {
        out.push_str(&write_pages(root, out_dir, &mut brain, pages)?);
    }
    Ok(out)
}

/// Write generated pages under `out_dir`, list them in the brain's ledger
/// and record one `generate` history entry.
fn write_pages(
    root: &Path,
    out_dir: &Path,
    brain: &mut LivingBrain,
    pages: Vec<GeneratedPage>,
) -> Result<String> {
    let mut out = String::new();
    let count = pages.len();
    for page in pages {
        let target = out_dir.join(&page.file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        fs::write(&target, &page.source)
            .with_context(|| format!("cannot write {}", target.display()))?;
        writeln!(out, "wrote {}", target.display())?;

        brain.add_generated(GeneratedFile {
            path: page.file,
            component: page.component,
            route: Some(page.route),
        });
    }

    brain.record("generate", format!("{count} files"));
    brain::write_brain(root, brain)?;
    Ok(out)
}

pub fn schema() -> Result<String> {
    let schema = schemars::schema_for!(ComponentNode);
    Ok(serde_json::to_string_pretty(&schema)?)
}

pub fn settings_show() -> String {
    let s = settings::read_settings();
    let mut out = format!(
        "provider: {}\nmodel: {}\napi key: {}\nconfigured: {}",
        if s.provider.is_empty() { "(not set)" } else { s.provider.as_str() },
        if s.model.is_empty() { "(not set)" } else { s.model.as_str() },
        s.masked_key(),
        settings::ai_configured(&s),
    );
    for f in &s.fallbacks {
        out.push_str(&format!(
            "\nfallback: {} ({}, key {})",
            f.provider,
            f.model,
            if f.api_key.is_empty() { "not set" } else { "set" }
        ));
    }
    out
}

/// `provider:model` or `provider:model:key`. Ollama takes no key, so the
/// rest of the entry is its model tag (`ollama:llama3:8b`).
fn parse_fallback(entry: &str) -> Result<ProviderSettings> {
    let (provider, rest) = entry.split_once(':').unwrap_or((entry, ""));
    let (model, api_key) = if provider == "ollama" {
        (rest, "")
    } else {
        rest.split_once(':').unwrap_or((rest, ""))
    };
    if provider.is_empty() || model.is_empty() {
        bail!("fallback must look like `provider:model[:key]`, got '{entry}'");
    }
    livebrain_ai::engine::map_backend(provider)?;

    let fallback = ProviderSettings {
        provider: provider.to_string(),
        api_key: api_key.to_string(),
        model: model.to_string(),
    };
    if !fallback.configured() {
        bail!("fallback '{provider}:{model}' needs an API key (`{provider}:{model}:<key>`)");
    }
    Ok(fallback)
}

pub fn settings_set(
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    fallbacks: &[String],
) -> Result<String> {
    let mut s = settings::read_settings();
    if let Some(p) = provider {
        livebrain_ai::engine::map_backend(&p)?;
        s.provider = p;
    }
    if let Some(m) = model {
        s.model = m;
    }
    // Empty key means "keep existing"
    if let Some(k) = api_key.filter(|k| !k.is_empty()) {
        s.api_key = k;
    }
    for entry in fallbacks {
        s.fallbacks.push(parse_fallback(entry)?);
    }
    settings::write_settings(&s)?;
    Ok(format!("Saved settings to {}", settings::settings_path().display()))
}
