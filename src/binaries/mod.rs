mod diagnostics;
mod resolver;

pub use diagnostics::{ToolResolutionAttempt, ToolResolveError};
pub use resolver::{init_tools_dir, resolve_tool};
