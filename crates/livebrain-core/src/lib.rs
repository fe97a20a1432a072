pub mod brain;
pub mod error;
pub mod naming;
pub mod settings;

pub use brain::{GeneratedFile, HistoryEntry, LivingBrain, ProjectInfo};
pub use error::CoreError;
pub use settings::{AiSettings, ProviderSettings};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

// --- Component tree ---

/// Structural role of a component. Unknown tags in a manifest read as `Display`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Layout,
    Form,
    #[default]
    Display,
    Interactive,
}

impl ComponentType {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "layout" => ComponentType::Layout,
            "form" => ComponentType::Form,
            "interactive" => ComponentType::Interactive,
            _ => ComponentType::Display,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Layout => "layout",
            ComponentType::Form => "form",
            ComponentType::Display => "display",
            ComponentType::Interactive => "interactive",
        }
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ComponentType::parse(&tag))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DbOperation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl DbOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            DbOperation::Create => "create",
            DbOperation::Read => "read",
            DbOperation::Update => "update",
            DbOperation::Delete => "delete",
            DbOperation::List => "list",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct DatabaseBinding {
    /// Table the component reads from or writes to, e.g. "products"
    pub table: String,
    #[serde(default)]
    pub operations: Vec<DbOperation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default = "default_param_type")]
    pub ty: String,
}

fn default_param_type() -> String {
    "string".to_string()
}

impl Parameter {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }

    pub fn is_id(&self) -> bool {
        self.name.eq_ignore_ascii_case("id")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    FormAction,
    EventHandler,
    ServerAction,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::FormAction => "form-action",
            ActionKind::EventHandler => "event-handler",
            ActionKind::ServerAction => "server-action",
        }
    }
}

/// An action callable from the client: declared on a node, or a wrapper
/// around a server action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub name: String,
    #[serde(rename = "type", default = "default_action_kind")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Server action this binding wraps, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_action: Option<String>,
}

fn default_action_kind() -> ActionKind {
    ActionKind::EventHandler
}

impl ActionDefinition {
    pub fn takes_id(&self) -> bool {
        self.parameters.iter().any(Parameter::is_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct ServerActionDatabase {
    pub table: String,
    pub operation: DbOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerActionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<ServerActionDatabase>,
    /// Return type description, e.g. "Product[]"
    pub returns: String,
}

impl ServerActionDefinition {
    pub fn takes_id(&self) -> bool {
        self.parameters.iter().any(Parameter::is_id)
    }
}

/// A node in the component tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Child name to child node, in manifest order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, ComponentNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseBinding>,
    /// Names of other components that must be generated before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ComponentNode {
    pub fn new(name: &str, component_type: ComponentType) -> Self {
        Self {
            name: name.to_string(),
            component_type,
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_database(mut self, table: &str, operations: &[DbOperation]) -> Self {
        self.database = Some(DatabaseBinding {
            table: table.to_string(),
            operations: operations.to_vec(),
        });
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, counting repeated names each time.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.values().map(|c| c.subtree_size()).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Parent,
}

/// Ancestry breadcrumb recorded while walking the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct ComponentReference {
    pub name: String,
    pub level: usize,
    pub relationship: Relationship,
}

impl ComponentReference {
    pub fn parent(name: &str, level: usize) -> Self {
        Self {
            name: name.to_string(),
            level,
            relationship: Relationship::Parent,
        }
    }
}

// --- Routes ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Page,
    Dynamic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct RouteMetadata {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct RouteDefinition {
    /// Filesystem-style path, e.g. "/product/[id]/edit"
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    pub metadata: RouteMetadata,
}

impl RouteDefinition {
    pub fn is_dynamic(&self) -> bool {
        self.kind == RouteKind::Dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_component_type_reads_as_display() {
        let node: ComponentNode =
            serde_json::from_str(r#"{"name": "Hero", "type": "carousel"}"#).unwrap();
        assert_eq!(node.component_type, ComponentType::Display);

        let node: ComponentNode = serde_json::from_str(r#"{"name": "Shell", "type": "Layout"}"#).unwrap();
        assert_eq!(node.component_type, ComponentType::Layout);
    }

    #[test]
    fn missing_name_deserializes_empty() {
        let node: ComponentNode = serde_json::from_str(r#"{"type": "form"}"#).unwrap();
        assert!(node.name.is_empty());
        assert!(node.is_leaf());
    }

    #[test]
    fn action_id_parameter_is_detected() {
        let action: ActionDefinition = serde_json::from_str(
            r#"{"name": "openItem", "type": "event-handler", "parameters": [{"name": "ID"}]}"#,
        )
        .unwrap();
        assert!(action.takes_id());
        assert_eq!(action.parameters[0].ty, "string");
    }

    #[test]
    fn component_type_serializes_lowercase() {
        let node = ComponentNode::new("ItemForm", ComponentType::Form);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "form");
        assert!(json.get("children").is_none());
    }
}
