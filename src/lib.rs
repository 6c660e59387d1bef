//! Library crate root for the productivity MCP server.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod handlers;
pub mod notes;
pub mod registry;
pub mod server;
