//! Per-component self-documentation.
//!
//! Everything here is deterministic string formatting over the context the
//! compiler has accumulated for a node; no model is consulted.

use std::fmt;

use livebrain_core::naming::pascal;
use livebrain_core::{
    ActionDefinition, ActionKind, ComponentNode, ComponentReference, ComponentType,
    RouteDefinition, ServerActionDefinition,
};

/// What users expect from a component of the given type.
pub fn expectations(component_type: ComponentType) -> &'static [&'static str] {
    match component_type {
        ComponentType::Form => &[
            "Inline validation with clear error messages",
            "Loading state while the submission is in flight",
            "Success and failure feedback after submit",
            "Entered data persists until it is saved or discarded",
        ],
        ComponentType::Display => &[
            "Data is fresh when the view opens",
            "Loading indicator while data is fetched",
            "Helpful empty state when there is nothing to show",
        ],
        ComponentType::Interactive => &[
            "Immediate visual feedback on every interaction",
            "Consistent behaviour across similar controls",
            "Keyboard and screen-reader accessible",
        ],
        ComponentType::Layout => &[
            "Consistent spacing and alignment",
            "Responsive across screen sizes",
            "Clear visual hierarchy for hosted content",
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDocumentation {
    pub component: String,
    pub component_type: ComponentType,
    pub level: usize,
    pub purpose: String,
    pub expectations: Vec<String>,
    pub integration: Vec<String>,
    pub data_flow: Vec<String>,
    pub usage: String,
}

impl NodeDocumentation {
    pub fn build(
        node: &ComponentNode,
        level: usize,
        ancestry: &[ComponentReference],
        actions: &[ActionDefinition],
        routes: &[RouteDefinition],
        server_actions: &[ServerActionDefinition],
    ) -> Self {
        let purpose = match node.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!(
                "{} is a {} component at level {}.",
                node.name,
                node.component_type.as_str(),
                level
            ),
        };

        let mut integration = Vec::new();
        if let Some(parent) = ancestry.last() {
            let chain: Vec<&str> = ancestry.iter().map(|r| r.name.as_str()).collect();
            integration.push(format!(
                "Receives data and context from parent `{}` (chain: {})",
                parent.name,
                chain.join(" → ")
            ));
        }
        for sa in server_actions {
            integration.push(format!(
                "Calls server action `{}` returning `{}`",
                sa.name, sa.returns
            ));
        }
        if let Some(db) = &node.database {
            let ops: Vec<&str> = db.operations.iter().map(|op| op.as_str()).collect();
            integration.push(format!("Database table `{}`: {}", db.table, ops.join(", ")));
        }
        if !routes.is_empty() {
            let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
            integration.push(format!("Reachable under routes: {}", paths.join(", ")));
        }

        let mut data_flow = Vec::new();
        if let Some(parent) = ancestry.last() {
            data_flow.push(format!("{} → {} (props)", parent.name, node.name));
        }
        for sa in server_actions {
            let params: Vec<String> = sa
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty))
                .collect();
            data_flow.push(format!("{} → {} ({})", node.name, sa.name, params.join(", ")));
            if let Some(db) = &sa.database {
                data_flow.push(format!("{} → {} ({})", sa.name, db.table, sa.returns));
            }
        }

        Self {
            component: node.name.clone(),
            component_type: node.component_type,
            level,
            purpose,
            expectations: expectations(node.component_type)
                .iter()
                .map(|e| e.to_string())
                .collect(),
            integration,
            data_flow,
            usage: usage_example(node, actions, server_actions),
        }
    }
}

/// `<ProductList onDeleteProduct={handleDeleteProduct} />`
///
/// Only event handlers that belong to this node are rendered: its declared
/// handlers and wrappers around its own server actions. Form actions are
/// wired through the form element, not props.
fn usage_example(
    node: &ComponentNode,
    actions: &[ActionDefinition],
    server_actions: &[ServerActionDefinition],
) -> String {
    let tag = pascal(&node.name);
    let props: Vec<String> = actions
        .iter()
        .filter(|a| a.kind == ActionKind::EventHandler)
        .filter(|a| {
            let wraps_own = a
                .server_action
                .as_deref()
                .is_some_and(|sa| server_actions.iter().any(|s| s.name == sa));
            wraps_own || node.actions.contains(a)
        })
        .map(|a| {
            let event = a.name.strip_prefix("handle").unwrap_or(&a.name);
            format!("on{}={{{}}}", pascal(event), a.name)
        })
        .collect();

    if props.is_empty() {
        format!("<{tag} />")
    } else {
        format!("<{tag} {} />", props.join(" "))
    }
}

impl fmt::Display for NodeDocumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} ({}, level {})",
            self.component,
            self.component_type.as_str(),
            self.level
        )?;
        writeln!(f)?;
        writeln!(f, "### Purpose")?;
        writeln!(f, "{}", self.purpose)?;
        writeln!(f)?;
        writeln!(f, "### User expectations")?;
        for e in &self.expectations {
            writeln!(f, "- {e}")?;
        }
        if !self.integration.is_empty() {
            writeln!(f)?;
            writeln!(f, "### Integration")?;
            for note in &self.integration {
                writeln!(f, "- {note}")?;
            }
        }
        if !self.data_flow.is_empty() {
            writeln!(f)?;
            writeln!(f, "### Data flow")?;
            for step in &self.data_flow {
                writeln!(f, "- {step}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "### Usage")?;
        writeln!(f, "```tsx")?;
        writeln!(f, "{}", self.usage)?;
        write!(f, "```")
    }
}

pub fn synthesize(
    node: &ComponentNode,
    level: usize,
    ancestry: &[ComponentReference],
    actions: &[ActionDefinition],
    routes: &[RouteDefinition],
    server_actions: &[ServerActionDefinition],
) -> String {
    NodeDocumentation::build(node, level, ancestry, actions, routes, server_actions).to_string()
}
