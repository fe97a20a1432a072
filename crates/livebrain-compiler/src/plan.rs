use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use livebrain_core::{ComponentNode, ProjectInfo, RouteDefinition, ServerActionDefinition};

use crate::actions::{ActionSynthesizer, HttpMethod};
use crate::compile::{ArchitectureCompiler, GenerationQueueItem};
use crate::CompileError;

pub const GENERATION_STRATEGY: &str = "hierarchical-dependency-order";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiRoute {
    pub methods: Vec<HttpMethod>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub project: ProjectInfo,
    pub total_components: usize,
    pub total_routes: usize,
    pub total_api_endpoints: usize,
    pub total_server_actions: usize,
    pub max_depth: usize,
    pub strategy: String,
}

/// Aggregate view of a compiled tree: routing, API and server-action tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchitecturePlan {
    pub hierarchy: IndexMap<String, ComponentNode>,
    /// Keyed by path. On collision the later queue item wins.
    pub routes: IndexMap<String, RouteDefinition>,
    pub api: IndexMap<String, ApiRoute>,
    /// Keyed by `<ComponentName>Actions`
    pub server_actions: IndexMap<String, Vec<ServerActionDefinition>>,
    pub metadata: PlanMetadata,
}

impl ArchitecturePlan {
    /// Project an already compiled queue into the plan tables.
    pub fn from_queue<S: ActionSynthesizer>(
        root: &ComponentNode,
        project: &ProjectInfo,
        queue: &[GenerationQueueItem],
        synthesizer: &S,
    ) -> Result<Self, CompileError> {
        let mut routes: IndexMap<String, RouteDefinition> = IndexMap::new();
        let mut api: IndexMap<String, ApiRoute> = IndexMap::new();
        let mut server_actions: IndexMap<String, Vec<ServerActionDefinition>> = IndexMap::new();

        for item in queue {
            for route in item.own_routes() {
                if let Some(previous) = routes.insert(route.path.clone(), route.clone()) {
                    if previous != *route {
                        tracing::warn!(
                            path = %route.path,
                            replaced = %previous.page,
                            by = %route.page,
                            "route path collision, keeping the later definition"
                        );
                    }
                }
            }

            if item.server_actions.is_empty() {
                continue;
            }
            for sa in &item.server_actions {
                let endpoint = synthesizer.api_endpoint(sa, &item.component).map_err(|source| {
                    CompileError::Actions {
                        component: item.name().to_string(),
                        path: item.path.clone(),
                        source,
                    }
                })?;
                let entry = api.entry(endpoint.path).or_default();
                if !entry.methods.contains(&endpoint.method) {
                    entry.methods.push(endpoint.method);
                }
                if !entry.actions.contains(&endpoint.action) {
                    entry.actions.push(endpoint.action);
                }
            }
            server_actions.insert(format!("{}Actions", item.name()), item.server_actions.clone());
        }

        let mut hierarchy = IndexMap::new();
        hierarchy.insert(root.name.clone(), root.clone());

        let metadata = PlanMetadata {
            project: project.clone(),
            total_components: queue.len(),
            total_routes: routes.len(),
            total_api_endpoints: api.len(),
            total_server_actions: server_actions.values().map(Vec::len).sum(),
            max_depth: queue.iter().map(|i| i.level).max().unwrap_or(0),
            strategy: GENERATION_STRATEGY.to_string(),
        };

        Ok(Self {
            hierarchy,
            routes,
            api,
            server_actions,
            metadata,
        })
    }
}

impl<S: ActionSynthesizer> ArchitectureCompiler<S> {
    /// Compile `root` and project the result in one step.
    pub async fn build_plan(
        &self,
        root: &ComponentNode,
        project: &ProjectInfo,
    ) -> Result<ArchitecturePlan, CompileError> {
        let queue = self.compile(root).await?;
        ArchitecturePlan::from_queue(root, project, &queue, self.synthesizer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livebrain_core::{ComponentType, DbOperation};

    fn shop() -> ComponentNode {
        ComponentNode::new("Shop", ComponentType::Layout)
            .with_child(
                ComponentNode::new("Products", ComponentType::Layout)
                    .with_child(
                        ComponentNode::new("ProductList", ComponentType::Display)
                            .with_database("products", &[DbOperation::List, DbOperation::Delete]),
                    )
                    .with_child(
                        ComponentNode::new("ProductForm", ComponentType::Form).with_database(
                            "products",
                            &[DbOperation::Create, DbOperation::Update],
                        ),
                    ),
            )
            .with_child(ComponentNode::new("ContactForm", ComponentType::Form))
    }

    #[tokio::test]
    async fn plan_aggregates_routes_api_and_actions() {
        let compiler = ArchitectureCompiler::default();
        let plan = compiler
            .build_plan(&shop(), &ProjectInfo::new("shop"))
            .await
            .unwrap();

        let paths: Vec<&str> = plan.routes.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/",
                "/shop/products",
                "/shop/contact/new",
                "/shop/contact/[id]/edit",
                "/products/product/new",
                "/products/product/[id]/edit",
            ]
        );

        let collection = &plan.api["/api/products"];
        assert_eq!(collection.methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(collection.actions, vec!["listProducts", "createProduct"]);
        let item = &plan.api["/api/products/[id]"];
        assert_eq!(item.methods, vec![HttpMethod::Delete, HttpMethod::Put]);
        assert_eq!(plan.api["/api/contact"].actions, vec!["submitContact"]);

        assert_eq!(
            plan.server_actions.keys().collect::<Vec<_>>(),
            vec!["ContactFormActions", "ProductListActions", "ProductFormActions"]
        );
        assert!(!plan.server_actions.contains_key("ShopActions"));

        assert_eq!(plan.metadata.total_components, 5);
        assert_eq!(plan.metadata.total_server_actions, 5);
        assert_eq!(plan.metadata.max_depth, 2);
        assert_eq!(plan.metadata.strategy, GENERATION_STRATEGY);
        assert!(plan.hierarchy.contains_key("Shop"));
    }

    #[tokio::test]
    async fn colliding_route_keeps_later_item() {
        // Both forms strip to the base name "Item" under the same parent.
        let root = ComponentNode::new("Admin", ComponentType::Layout)
            .with_child(ComponentNode::new("ItemForm", ComponentType::Form))
            .with_child(ComponentNode::new("ItemList", ComponentType::Form));

        let plan = ArchitectureCompiler::default()
            .build_plan(&root, &ProjectInfo::new("admin"))
            .await
            .unwrap();

        let paths: Vec<&str> = plan.routes.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/", "/admin/item/new", "/admin/item/[id]/edit"]
        );
        assert_eq!(plan.routes["/admin/item/new"].components, vec!["ItemList"]);
        assert_eq!(plan.api["/api/item"].actions, vec!["submitItem"]);
        assert_eq!(plan.metadata.total_server_actions, 2);
    }

    #[tokio::test]
    async fn endpoint_failure_names_tree_path() {
        let root = shop();
        let compiler = ArchitectureCompiler::default();
        let mut queue = compiler.compile(&root).await.unwrap();
        let list = queue.iter_mut().find(|i| i.name() == "ProductList").unwrap();
        assert_eq!(list.path, "Shop/Products/ProductList");
        for sa in &mut list.server_actions {
            if let Some(db) = sa.database.as_mut() {
                db.table.clear();
            }
        }

        let err = ArchitecturePlan::from_queue(
            &root,
            &ProjectInfo::new("shop"),
            &queue,
            compiler.synthesizer(),
        )
        .unwrap_err();
        match err {
            CompileError::Actions { component, path, .. } => {
                assert_eq!(component, "ProductList");
                assert_eq!(path, "Shop/Products/ProductList");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
