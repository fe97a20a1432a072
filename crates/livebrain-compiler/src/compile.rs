use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use livebrain_core::naming::kebab;
use livebrain_core::{
    ActionDefinition, ComponentNode, ComponentReference, ComponentType, RouteDefinition,
    ServerActionDefinition,
};

use crate::actions::{ActionSynthesizer, DefaultActionSynthesizer};
use crate::{docs, routes, CompileError};

/// One unit of generation work: a component plus everything it inherits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationQueueItem {
    /// The component's own spec. Children are listed by name in `children`
    /// and appear as items of their own.
    pub component: ComponentNode,
    /// Manifest keys from the root down to this node, e.g. `Shop/Products`
    pub path: String,
    #[serde(default)]
    pub children: Vec<String>,
    pub level: usize,
    pub dependencies: Vec<ComponentReference>,
    pub routes: Vec<RouteDefinition>,
    pub actions: Vec<ActionDefinition>,
    pub server_actions: Vec<ServerActionDefinition>,
    pub generation_order: i32,
    pub self_documentation: String,
    /// Pre-order position in which the traversal reached this component
    pub discovery: usize,
    /// Leading entries of `routes` that came from ancestors
    pub inherited_routes: usize,
}

impl GenerationQueueItem {
    pub fn name(&self) -> &str {
        &self.component.name
    }

    /// Routes resolved for this component itself.
    pub fn own_routes(&self) -> &[RouteDefinition] {
        &self.routes[self.inherited_routes.min(self.routes.len())..]
    }
}

/// `level × 100 + ancestors × 10 + type adjustment`.
///
/// Layout shells sort ahead of their siblings and forms behind them. This is
/// a heuristic rank, not a dependency guarantee: unrelated nodes at the same
/// depth and type share a key and fall back to discovery order.
pub fn order_key(component_type: ComponentType, level: usize, ancestors: usize) -> i32 {
    let adjustment = match component_type {
        ComponentType::Layout => -5,
        ComponentType::Form => 5,
        ComponentType::Display | ComponentType::Interactive => 0,
    };
    (level as i32) * 100 + (ancestors as i32) * 10 + adjustment
}

struct Frame<'a> {
    node: &'a ComponentNode,
    path: String,
    level: usize,
    parent: Option<usize>,
    ancestry: Arc<Vec<ComponentReference>>,
    routes: Arc<Vec<RouteDefinition>>,
    actions: Arc<Vec<ActionDefinition>>,
}

pub struct ArchitectureCompiler<S = DefaultActionSynthesizer> {
    synthesizer: S,
}

impl Default for ArchitectureCompiler<DefaultActionSynthesizer> {
    fn default() -> Self {
        Self::new(DefaultActionSynthesizer)
    }
}

impl<S: ActionSynthesizer> ArchitectureCompiler<S> {
    pub fn new(synthesizer: S) -> Self {
        Self { synthesizer }
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Walk the tree once (depth-first, pre-order) and return the generation
    /// queue in dependency order.
    ///
    /// Names are a global dedup key: a second node with an already-seen name
    /// is skipped along with its whole subtree.
    pub async fn compile(
        &self,
        root: &ComponentNode,
    ) -> Result<Vec<GenerationQueueItem>, CompileError> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut items: Vec<GenerationQueueItem> = Vec::new();
        let mut parents: Vec<Option<usize>> = Vec::new();

        let root_path = if root.name.is_empty() {
            "<root>".to_string()
        } else {
            root.name.clone()
        };
        let mut stack = vec![Frame {
            node: root,
            path: root_path,
            level: 0,
            parent: None,
            ancestry: Arc::new(Vec::new()),
            routes: Arc::new(Vec::new()),
            actions: Arc::new(Vec::new()),
        }];

        while let Some(frame) = stack.pop() {
            let node = frame.node;
            if node.name.trim().is_empty() {
                return Err(CompileError::MissingName { path: frame.path });
            }
            if !visited.insert(node.name.as_str()) {
                tracing::warn!(
                    component = %node.name,
                    path = %frame.path,
                    "duplicate component name, skipping subtree"
                );
                continue;
            }

            let parent_path = frame
                .ancestry
                .last()
                .map(|p| format!("/{}", kebab(&p.name)))
                .unwrap_or_default();
            let own_routes = routes::resolve_routes(node, frame.level, &parent_path);

            let server_actions = self
                .synthesizer
                .server_actions(node)
                .await
                .map_err(|source| CompileError::Actions {
                    component: node.name.clone(),
                    path: frame.path.clone(),
                    source,
                })?;
            let client_actions = self
                .synthesizer
                .client_actions(node, &server_actions)
                .await
                .map_err(|source| CompileError::Actions {
                    component: node.name.clone(),
                    path: frame.path.clone(),
                    source,
                })?;

            let inherited_routes = frame.routes.len();
            let mut all_actions = Vec::with_capacity(
                frame.actions.len() + client_actions.len() + node.actions.len(),
            );
            all_actions.extend(frame.actions.iter().cloned());
            all_actions.extend(client_actions);
            all_actions.extend(node.actions.iter().cloned());

            let mut all_routes = Vec::with_capacity(inherited_routes + own_routes.len());
            all_routes.extend(frame.routes.iter().cloned());
            all_routes.extend(own_routes);

            let self_documentation = docs::synthesize(
                node,
                frame.level,
                &frame.ancestry,
                &all_actions,
                &all_routes,
                &server_actions,
            );

            let discovery = items.len();
            let generation_order = order_key(node.component_type, frame.level, frame.ancestry.len());
            tracing::debug!(
                component = %node.name,
                level = frame.level,
                order = generation_order,
                routes = all_routes.len() - inherited_routes,
                server_actions = server_actions.len(),
                "compiled component"
            );

            let mut child_ancestry = Vec::with_capacity(frame.ancestry.len() + 1);
            child_ancestry.extend(frame.ancestry.iter().cloned());
            child_ancestry.push(ComponentReference::parent(&node.name, frame.level));
            let child_ancestry = Arc::new(child_ancestry);
            let child_routes = Arc::new(all_routes.clone());
            let child_actions = Arc::new(all_actions.clone());

            // Reverse push keeps manifest order when popping.
            for (key, child) in node.children.iter().rev() {
                stack.push(Frame {
                    node: child,
                    path: format!("{}/{}", frame.path, key),
                    level: frame.level + 1,
                    parent: Some(discovery),
                    ancestry: Arc::clone(&child_ancestry),
                    routes: Arc::clone(&child_routes),
                    actions: Arc::clone(&child_actions),
                });
            }

            let mut component = node.clone();
            let children = std::mem::take(&mut component.children)
                .into_keys()
                .collect();

            parents.push(frame.parent);
            items.push(GenerationQueueItem {
                component,
                path: frame.path,
                children,
                level: frame.level,
                dependencies: frame.ancestry.as_ref().clone(),
                routes: all_routes,
                actions: all_actions,
                server_actions,
                generation_order,
                self_documentation,
                discovery,
                inherited_routes,
            });
        }

        let queue = topological_order(items, &parents)?;
        tracing::info!(components = queue.len(), "generation queue ready");
        Ok(queue)
    }
}

/// Kahn's algorithm over parent→child edges plus declared `dependsOn`
/// edges. Among ready items the lowest `(generation_order, discovery)` goes
/// first, so without cross references this equals a stable sort by key.
fn topological_order(
    items: Vec<GenerationQueueItem>,
    parents: &[Option<usize>],
) -> Result<Vec<GenerationQueueItem>, CompileError> {
    let n = items.len();
    let by_name: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.name(), i))
        .collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    let mut add_edge = |from: usize, to: usize| {
        if !successors[from].contains(&to) {
            successors[from].push(to);
            in_degree[to] += 1;
        }
    };

    for (i, parent) in parents.iter().enumerate() {
        if let Some(p) = *parent {
            add_edge(p, i);
        }
    }
    for (i, item) in items.iter().enumerate() {
        for dep in &item.component.depends_on {
            match by_name.get(dep.as_str()) {
                Some(&d) => add_edge(d, i),
                None => tracing::warn!(
                    component = %item.name(),
                    depends_on = %dep,
                    "ignoring dependency on unknown component"
                ),
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(i32, usize)>> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse((items[i].generation_order, i)))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, i))) = ready.pop() {
        order.push(i);
        for &next in &successors[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse((items[next].generation_order, next)));
            }
        }
    }

    if order.len() < n {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let components = items
            .iter()
            .enumerate()
            .filter(|(i, _)| !placed.contains(i))
            .map(|(_, item)| item.name().to_string())
            .collect();
        return Err(CompileError::DependencyCycle { components });
    }

    let mut slots: Vec<Option<GenerationQueueItem>> = items.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// Compile with the default CRUD action synthesizer.
pub async fn compile(root: &ComponentNode) -> Result<Vec<GenerationQueueItem>, CompileError> {
    ArchitectureCompiler::default().compile(root).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_key_formula() {
        assert_eq!(order_key(ComponentType::Layout, 0, 0), -5);
        assert_eq!(order_key(ComponentType::Display, 1, 1), 110);
        assert_eq!(order_key(ComponentType::Form, 1, 1), 115);
        assert_eq!(order_key(ComponentType::Interactive, 2, 2), 220);
    }

    #[test]
    fn own_routes_skip_inherited_prefix() {
        let route = |path: &str| RouteDefinition {
            path: path.to_string(),
            kind: livebrain_core::RouteKind::Page,
            page: "P".into(),
            layout: None,
            components: vec![],
            actions: vec![],
            metadata: livebrain_core::RouteMetadata {
                title: String::new(),
                description: String::new(),
            },
        };
        let item = GenerationQueueItem {
            component: ComponentNode::new("X", ComponentType::Form),
            path: "Root/X".into(),
            children: vec![],
            level: 1,
            dependencies: vec![],
            routes: vec![route("/"), route("/x/new")],
            actions: vec![],
            server_actions: vec![],
            generation_order: 115,
            self_documentation: String::new(),
            discovery: 1,
            inherited_routes: 1,
        };
        let own: Vec<&str> = item.own_routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(own, vec!["/x/new"]);
    }
}
