pub mod cli_adapter;
pub mod config;
pub mod logging;
pub mod removal;
pub mod runtime_select;

pub use cli_adapter::CliRuntime;
pub use runtime_select::RuntimeKind;
