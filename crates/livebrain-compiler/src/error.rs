#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("component '{component}' binds a database with an empty table name")]
    EmptyTable { component: String },

    #[error("action synthesis rejected component '{component}': {reason}")]
    Rejected { component: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("component at '{path}' has no name")]
    MissingName { path: String },

    #[error("failed to synthesize actions for '{component}' at '{path}'")]
    Actions {
        component: String,
        path: String,
        #[source]
        source: ActionError,
    },

    #[error("dependency cycle between components: {}", components.join(", "))]
    DependencyCycle { components: Vec<String> },
}
