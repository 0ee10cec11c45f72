pub mod descriptor;
pub mod outcome;
pub mod toolkit;

pub use descriptor::{ToolDescriptor, TOOLS};
pub use outcome::OperationResult;
pub use toolkit::ElasticsearchToolkit;
