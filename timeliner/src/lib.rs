// Library interface for timeliner modules
// This allows tests and the binary to import modules

pub mod error;
pub mod fetch;
pub mod llm;
