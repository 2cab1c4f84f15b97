//! MCP server over stdio

pub mod server;
pub mod tools;
pub mod types;
