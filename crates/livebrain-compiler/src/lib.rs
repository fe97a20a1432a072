//! Architecture compiler: walks a component tree once and produces the
//! ordered generation queue and the aggregate architecture plan that code
//! emission consumes.

pub mod actions;
pub mod compile;
pub mod docs;
pub mod error;
pub mod plan;
pub mod routes;

pub use actions::{ActionSynthesizer, ApiEndpoint, DefaultActionSynthesizer, HttpMethod};
pub use compile::{compile, order_key, ArchitectureCompiler, GenerationQueueItem};
pub use error::{ActionError, CompileError};
pub use plan::{ApiRoute, ArchitecturePlan, PlanMetadata, GENERATION_STRATEGY};
pub use routes::resolve_routes;
