use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use livebrain_core::naming::{base_name, kebab, pascal, plural, singular};
use livebrain_core::{
    ActionDefinition, ActionKind, ComponentNode, ComponentType, DbOperation, Parameter,
    ServerActionDatabase, ServerActionDefinition,
};

use crate::ActionError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub path: String,
    pub method: HttpMethod,
    pub action: String,
}

/// Produces the server-side actions a component needs and the client
/// bindings that call them.
///
/// Errors are fatal for the component being compiled: the compiler does not
/// continue past a node whose actions could not be resolved.
#[async_trait]
pub trait ActionSynthesizer: Send + Sync {
    async fn server_actions(
        &self,
        node: &ComponentNode,
    ) -> Result<Vec<ServerActionDefinition>, ActionError>;

    async fn client_actions(
        &self,
        node: &ComponentNode,
        server_actions: &[ServerActionDefinition],
    ) -> Result<Vec<ActionDefinition>, ActionError>;

    fn api_endpoint(
        &self,
        action: &ServerActionDefinition,
        node: &ComponentNode,
    ) -> Result<ApiEndpoint, ActionError>;
}

/// CRUD-convention synthesizer: one server action per bound database
/// operation, or a single submit action for unbound forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActionSynthesizer;

fn entity_name(table: &str) -> String {
    pascal(singular(table))
}

fn crud_action(table: &str, op: DbOperation) -> ServerActionDefinition {
    let entity = entity_name(table);
    let id = || Parameter::new("id", "string");
    let (name, parameters, returns) = match op {
        DbOperation::Create => (
            format!("create{entity}"),
            vec![Parameter::new("data", &format!("{entity}Input"))],
            entity.clone(),
        ),
        DbOperation::Read => (format!("get{entity}"), vec![id()], entity.clone()),
        DbOperation::Update => (
            format!("update{entity}"),
            vec![id(), Parameter::new("data", &format!("Partial<{entity}Input>"))],
            entity.clone(),
        ),
        DbOperation::Delete => (format!("delete{entity}"), vec![id()], "void".to_string()),
        DbOperation::List => (format!("list{}", plural(&entity)), vec![], format!("{entity}[]")),
    };

    ServerActionDefinition {
        name,
        parameters,
        database: Some(ServerActionDatabase {
            table: table.to_string(),
            operation: op,
        }),
        returns,
    }
}

#[async_trait]
impl ActionSynthesizer for DefaultActionSynthesizer {
    async fn server_actions(
        &self,
        node: &ComponentNode,
    ) -> Result<Vec<ServerActionDefinition>, ActionError> {
        if let Some(db) = &node.database {
            if db.table.trim().is_empty() {
                return Err(ActionError::EmptyTable {
                    component: node.name.clone(),
                });
            }
            let mut seen = Vec::with_capacity(db.operations.len());
            let mut actions = Vec::with_capacity(db.operations.len());
            for &op in &db.operations {
                if seen.contains(&op) {
                    continue;
                }
                seen.push(op);
                actions.push(crud_action(&db.table, op));
            }
            return Ok(actions);
        }

        if node.component_type == ComponentType::Form {
            return Ok(vec![ServerActionDefinition {
                name: format!("submit{}", pascal(base_name(&node.name))),
                parameters: vec![Parameter::new("data", "FormData")],
                database: None,
                returns: "ActionResult".to_string(),
            }]);
        }

        Ok(Vec::new())
    }

    async fn client_actions(
        &self,
        node: &ComponentNode,
        server_actions: &[ServerActionDefinition],
    ) -> Result<Vec<ActionDefinition>, ActionError> {
        let kind = match node.component_type {
            ComponentType::Form => ActionKind::FormAction,
            _ => ActionKind::EventHandler,
        };
        Ok(server_actions
            .iter()
            .map(|sa| ActionDefinition {
                name: format!("handle{}", pascal(&sa.name)),
                kind,
                parameters: sa.parameters.clone(),
                server_action: Some(sa.name.clone()),
            })
            .collect())
    }

    fn api_endpoint(
        &self,
        action: &ServerActionDefinition,
        node: &ComponentNode,
    ) -> Result<ApiEndpoint, ActionError> {
        let resource = match &action.database {
            Some(db) if db.table.trim().is_empty() => {
                return Err(ActionError::EmptyTable {
                    component: node.name.clone(),
                })
            }
            Some(db) => kebab(&db.table),
            None => kebab(base_name(&node.name)),
        };
        let mut path = format!("/api/{resource}");
        if action.takes_id() {
            path.push_str("/[id]");
        }
        let method = match action.database.as_ref().map(|db| db.operation) {
            Some(DbOperation::Read) | Some(DbOperation::List) => HttpMethod::Get,
            Some(DbOperation::Update) => HttpMethod::Put,
            Some(DbOperation::Delete) => HttpMethod::Delete,
            Some(DbOperation::Create) | None => HttpMethod::Post,
        };
        Ok(ApiEndpoint {
            path,
            method,
            action: action.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_list() -> ComponentNode {
        ComponentNode::new("ProductList", ComponentType::Display).with_database(
            "products",
            &[DbOperation::List, DbOperation::Delete, DbOperation::List],
        )
    }

    #[tokio::test]
    async fn database_binding_yields_crud_actions() {
        let synth = DefaultActionSynthesizer;
        let actions = synth.server_actions(&product_list()).await.unwrap();
        let names: Vec<&str> = actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["listProducts", "deleteProduct"]);
        assert_eq!(actions[0].returns, "Product[]");
        assert_eq!(actions[1].returns, "void");
        assert!(actions[1].takes_id());
    }

    #[tokio::test]
    async fn unbound_form_gets_submit_action() {
        let synth = DefaultActionSynthesizer;
        let form = ComponentNode::new("ContactForm", ComponentType::Form);
        let actions = synth.server_actions(&form).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "submitContact");
        assert!(actions[0].database.is_none());

        let client = synth.client_actions(&form, &actions).await.unwrap();
        assert_eq!(client[0].name, "handleSubmitContact");
        assert_eq!(client[0].kind, ActionKind::FormAction);
        assert_eq!(client[0].server_action.as_deref(), Some("submitContact"));
    }

    #[tokio::test]
    async fn plain_display_has_no_actions() {
        let synth = DefaultActionSynthesizer;
        let node = ComponentNode::new("Banner", ComponentType::Display);
        assert!(synth.server_actions(&node).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_table_is_rejected() {
        let synth = DefaultActionSynthesizer;
        let node = ComponentNode::new("Broken", ComponentType::Display)
            .with_database(" ", &[DbOperation::Read]);
        let err = synth.server_actions(&node).await.unwrap_err();
        assert!(matches!(err, ActionError::EmptyTable { component } if component == "Broken"));
    }

    #[tokio::test]
    async fn endpoints_follow_operation() {
        let synth = DefaultActionSynthesizer;
        let node = product_list();
        let actions = synth.server_actions(&node).await.unwrap();

        let list = synth.api_endpoint(&actions[0], &node).unwrap();
        assert_eq!(list.path, "/api/products");
        assert_eq!(list.method, HttpMethod::Get);

        let delete = synth.api_endpoint(&actions[1], &node).unwrap();
        assert_eq!(delete.path, "/api/products/[id]");
        assert_eq!(delete.method, HttpMethod::Delete);
    }
}
