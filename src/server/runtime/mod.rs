//! MCP server startup and request handling.
mod server_info;
mod service;
mod startup;

pub use server_info::build_instructions;
pub use service::{registry_error_to_error_data, ProductivityServer};
pub use startup::{bind_http, build_server, run_server, serve_http, RuntimeExit, HTTP_MOUNT_PATH};
