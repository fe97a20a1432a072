use livebrain_core::naming::{base_name, kebab, pascal};
use livebrain_core::{ComponentNode, ComponentType, RouteDefinition, RouteKind, RouteMetadata};

/// Derive the routes a component owns from its position and naming.
///
/// Rules are applied independently, so one node can own routes from more
/// than one of them. `parent_path` is the kebab-cased path of the nearest
/// ancestor (`""` for the root).
pub fn resolve_routes(node: &ComponentNode, level: usize, parent_path: &str) -> Vec<RouteDefinition> {
    let mut routes = Vec::new();
    let name = pascal(&node.name);
    let declared: Vec<String> = node.actions.iter().map(|a| a.name.clone()).collect();

    let route = |path: String, kind: RouteKind, page: String, layout: Option<String>, title: String| {
        RouteDefinition {
            path,
            kind,
            page,
            layout,
            components: vec![node.name.clone()],
            actions: declared.clone(),
            metadata: RouteMetadata {
                description: describe(node, &title),
                title,
            },
        }
    };

    if level == 0 {
        routes.push(route(
            "/".to_string(),
            RouteKind::Page,
            format!("{name}Page"),
            Some("RootLayout".to_string()),
            node.name.clone(),
        ));
    }

    if node.component_type == ComponentType::Layout && level == 1 {
        routes.push(route(
            format!("{parent_path}/{}", kebab(&node.name)),
            RouteKind::Page,
            format!("{name}Page"),
            Some(format!("{name}Layout")),
            node.name.clone(),
        ));
    }

    let base = base_name(&node.name);
    let base_pascal = pascal(base);
    let segment = format!("{parent_path}/{}", kebab(base));

    if node.component_type == ComponentType::Form {
        routes.push(route(
            format!("{segment}/new"),
            RouteKind::Page,
            format!("Create{base_pascal}Page"),
            None,
            format!("Create {base}"),
        ));
        routes.push(route(
            format!("{segment}/[id]/edit"),
            RouteKind::Dynamic,
            format!("Edit{base_pascal}Page"),
            None,
            format!("Edit {base}"),
        ));
    }

    let is_detail = node.name.contains("Detail") || node.name.contains("View");
    if is_detail || node.actions.iter().any(|a| a.takes_id()) {
        routes.push(route(
            format!("{segment}/[id]"),
            RouteKind::Dynamic,
            format!("{base_pascal}DetailPage"),
            None,
            format!("{base} Details"),
        ));
    }

    routes
}

fn describe(node: &ComponentNode, title: &str) -> String {
    match node.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => format!("{title} ({} component)", node.component_type.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livebrain_core::{ActionDefinition, ActionKind, Parameter};

    fn paths(routes: &[RouteDefinition]) -> Vec<&str> {
        routes.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn root_gets_index_route() {
        let root = ComponentNode::new("Dashboard", ComponentType::Layout);
        let routes = resolve_routes(&root, 0, "");
        assert_eq!(paths(&routes), vec!["/"]);
        assert_eq!(routes[0].kind, RouteKind::Page);
        assert_eq!(routes[0].page, "DashboardPage");
    }

    #[test]
    fn feature_layout_at_level_one() {
        let node = ComponentNode::new("Order History", ComponentType::Layout);
        let routes = resolve_routes(&node, 1, "/shop");
        assert_eq!(paths(&routes), vec!["/shop/order-history"]);
        assert_eq!(routes[0].layout.as_deref(), Some("OrderHistoryLayout"));

        let deeper = resolve_routes(&node, 2, "/shop");
        assert!(deeper.is_empty());
    }

    #[test]
    fn form_gets_create_and_edit_routes() {
        let node = ComponentNode::new("ProductForm", ComponentType::Form);
        let routes = resolve_routes(&node, 2, "/product");
        assert_eq!(
            paths(&routes),
            vec!["/product/product/new", "/product/product/[id]/edit"]
        );
        assert_eq!(routes[0].kind, RouteKind::Page);
        assert_eq!(routes[1].kind, RouteKind::Dynamic);
        assert_eq!(routes[0].page, "CreateProductPage");
        assert_eq!(routes[1].page, "EditProductPage");
    }

    #[test]
    fn detail_route_from_name_or_id_action() {
        let view = ComponentNode::new("ItemDetail", ComponentType::Display);
        assert_eq!(paths(&resolve_routes(&view, 1, "/shop")), vec!["/shop/item/[id]"]);

        let card = ComponentNode::new("OrderCard", ComponentType::Interactive).with_action(
            ActionDefinition {
                name: "openOrder".into(),
                kind: ActionKind::EventHandler,
                parameters: vec![Parameter::new("id", "string")],
                server_action: None,
            },
        );
        let routes = resolve_routes(&card, 2, "/orders");
        assert_eq!(paths(&routes), vec!["/orders/order/[id]"]);
        assert_eq!(routes[0].actions, vec!["openOrder".to_string()]);
    }

    #[test]
    fn rules_combine() {
        let node = ComponentNode::new("ProfileView", ComponentType::Form);
        let routes = resolve_routes(&node, 0, "");
        assert_eq!(
            paths(&routes),
            vec!["/", "/profile/new", "/profile/[id]/edit", "/profile/[id]"]
        );
    }

    #[test]
    fn plain_display_has_no_routes() {
        let node = ComponentNode::new("StatsPanel", ComponentType::Display);
        assert!(resolve_routes(&node, 2, "/home").is_empty());
    }

    #[test]
    fn description_feeds_metadata() {
        let node = ComponentNode::new("Shop", ComponentType::Layout).with_description("Storefront");
        let routes = resolve_routes(&node, 0, "");
        assert_eq!(routes[0].metadata.description, "Storefront");
        assert_eq!(routes[0].metadata.title, "Shop");
    }

    #[test]
    fn path_syntax_in_names_stays_inside_segments() {
        let node = ComponentNode::new("../../etc/Passwd", ComponentType::Form);
        let routes = resolve_routes(&node, 2, "/shop");
        assert_eq!(
            paths(&routes),
            vec!["/shop/etc-passwd/new", "/shop/etc-passwd/[id]/edit"]
        );
    }
}
