//! Adapters around the external executables the pipeline shells out to.

pub mod sources;
pub mod tools;

pub use sources::{source_for_mode, DisassemblySource, StringDumpSource, TokenSource};
pub use tools::{find_in_path, ExternalTool, ToolError};
