//! GSC MCP Server Library
//!
//! A Model Context Protocol (MCP) server for Google Search Console.
//! Provides tools for search analytics, URL inspection, and sitemap
//! management via the Search Console API.

pub mod config;
pub mod error;
pub mod gsc;
pub mod mcp;

pub use config::Config;
pub use error::{GscMcpError, Result};
