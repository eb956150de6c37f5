pub mod plan;
pub mod runner;
pub mod tools;

pub use plan::{ExecutionPlan, LogLevel, TerraformCommand};
pub use runner::{CommandRunner, RunOutcome, SystemExecutor};
pub use tools::{ToolInspector, VersionProbe};
