//! Prompt, tool, and resource handlers and their explicit registration.

pub mod prompts;
pub mod resources;
pub mod tools;

use std::sync::Arc;

use crate::{lib::errors::RegistryError, notes::NotesStore, registry::Registry};

/// Build the registry with every handler this server exposes.
pub fn build_registry(store: Arc<NotesStore>) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    prompts::register(&mut registry, Arc::clone(&store))?;
    tools::register(&mut registry, Arc::clone(&store))?;
    resources::register(&mut registry, store)?;
    Ok(registry)
}
