use livebrain_compiler::{ArchitecturePlan, GenerationQueueItem};
use livebrain_core::{ProjectInfo, RouteDefinition, RouteKind};

/// Compact text view of one queue item for model consumption.
pub fn serialize_item(item: &GenerationQueueItem, route: &RouteDefinition) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str("ROUTE: ");
    out.push_str(&route.path);
    out.push_str(match route.kind {
        RouteKind::Page => " (page)",
        RouteKind::Dynamic => " (dynamic)",
    });
    out.push_str(" page=");
    out.push_str(&route.page);
    if let Some(layout) = &route.layout {
        out.push_str(" layout=");
        out.push_str(layout);
    }
    out.push('\n');

    out.push_str("COMPONENT: ");
    out.push_str(item.name());
    out.push_str(" (");
    out.push_str(item.component.component_type.as_str());
    out.push_str(", level ");
    out.push_str(&item.level.to_string());
    out.push_str(")\n");

    if !item.dependencies.is_empty() {
        out.push_str("PARENTS: ");
        let chain: Vec<&str> = item.dependencies.iter().map(|d| d.name.as_str()).collect();
        out.push_str(&chain.join(" > "));
        out.push('\n');
    }
    if !item.children.is_empty() {
        out.push_str("CHILDREN: ");
        out.push_str(&item.children.join(", "));
        out.push('\n');
    }

    if !item.server_actions.is_empty() {
        out.push_str("SERVER ACTIONS:\n");
        for sa in &item.server_actions {
            out.push_str("  ");
            out.push_str(&sa.name);
            out.push('(');
            let params: Vec<String> = sa
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty))
                .collect();
            out.push_str(&params.join(", "));
            out.push_str(") -> ");
            out.push_str(&sa.returns);
            if let Some(db) = &sa.database {
                out.push_str(" [");
                out.push_str(db.operation.as_str());
                out.push(' ');
                out.push_str(&db.table);
                out.push(']');
            }
            out.push('\n');
        }
    }

    if !item.actions.is_empty() {
        out.push_str("CLIENT ACTIONS:\n");
        for action in &item.actions {
            out.push_str("  ");
            out.push_str(&action.name);
            out.push_str(" (");
            out.push_str(action.kind.as_str());
            if let Some(sa) = &action.server_action {
                out.push_str(" -> ");
                out.push_str(sa);
            }
            out.push_str(")\n");
        }
    }

    out.push_str("\nDOCUMENTATION:\n");
    out.push_str(&item.self_documentation);
    out.push('\n');
    out
}

pub fn system_prompt(project: &ProjectInfo) -> String {
    format!(
        "You generate production-ready UI source files for the project \"{}\".\n\
Framework: {}. Styling: {}.\n\n\
Rules:\n\
- Output exactly one file in a single fenced code block, nothing else.\n\
- Use the route, component and action names exactly as given.\n\
- Call server actions only through the listed client actions.\n\
- Dynamic segments such as [id] arrive as route params.\n\
- Meet every user expectation listed in the documentation: validation, \
loading, empty and error states where they apply.\n\
- Do not invent routes, tables or actions that are not listed.",
        project.name, project.framework, project.styling
    )
}

/// User message for one page: the item itself plus the app-wide route table
/// so links point at real paths.
pub fn page_prompt(
    item: &GenerationQueueItem,
    route: &RouteDefinition,
    plan: &ArchitecturePlan,
) -> String {
    let mut out = serialize_item(item, route);
    if !plan.routes.is_empty() {
        out.push_str("\nAPP ROUTES:\n");
        for (path, r) in &plan.routes {
            out.push_str("  ");
            out.push_str(path);
            out.push_str(" -> ");
            out.push_str(&r.page);
            out.push('\n');
        }
    }
    out.push_str("\nWrite the page file for ROUTE.");
    out
}
