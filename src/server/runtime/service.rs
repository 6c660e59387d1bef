use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, ErrorData, GetPromptRequestParam,
        GetPromptResult, Implementation, ListPromptsResult, ListResourcesResult, ListToolsResult,
        PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
        RawResource, ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    RoleServer,
};
use serde_json::{json, Value};

use crate::{
    cli::SERVER_NAME,
    handlers::resources::NOTES_URI,
    lib::errors::{
        HandlerError, NotesError, RegistryError, ToolErrorDescriptor, HANDLER_FAILED_ERROR,
        INVALID_ARGUMENT_ERROR, NOTES_CHANGED_ERROR, NOTES_EMPTY_ENTRY_ERROR,
        UNKNOWN_HANDLER_ERROR, UNKNOWN_RESOURCE_ERROR,
    },
    registry::{HandlerDescriptor, HandlerKind, Registry},
};

/// MCP front end over the handler registry.
#[derive(Clone)]
pub struct ProductivityServer {
    registry: Arc<Registry>,
    instructions: Arc<String>,
}

impl ProductivityServer {
    pub fn new(registry: Registry, instructions: String) -> Self {
        Self {
            registry: Arc::new(registry),
            instructions: Arc::new(instructions),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn prompt_listing(&self) -> Vec<Prompt> {
        self.registry
            .descriptors(HandlerKind::Prompt)
            .map(prompt_from_descriptor)
            .collect()
    }

    fn tool_listing(&self) -> Vec<Tool> {
        self.registry
            .descriptors(HandlerKind::Tool)
            .map(|descriptor| {
                Tool::new(
                    descriptor.name.clone(),
                    descriptor.description.clone(),
                    Arc::new(descriptor.input_schema()),
                )
            })
            .collect()
    }

    fn resource_listing(&self) -> Vec<Resource> {
        self.registry
            .descriptors(HandlerKind::Resource)
            .map(resource_from_descriptor)
            .collect()
    }
}

fn prompt_from_descriptor(descriptor: &HandlerDescriptor) -> Prompt {
    let arguments = descriptor
        .parameters
        .iter()
        .map(|spec| PromptArgument {
            name: spec.name.to_string(),
            title: None,
            description: Some(spec.description.to_string()),
            required: Some(spec.is_required()),
        })
        .collect::<Vec<_>>();
    Prompt::new(
        descriptor.name.clone(),
        Some(descriptor.description.clone()),
        Some(arguments),
    )
}

fn resource_from_descriptor(descriptor: &HandlerDescriptor) -> Resource {
    let name = descriptor
        .name
        .strip_prefix("resource://")
        .unwrap_or(&descriptor.name)
        .to_string();
    let mut raw = RawResource::new(descriptor.name.clone(), name);
    raw.description = Some(descriptor.description.clone());
    raw.mime_type = Some(mime_type_for(&descriptor.name).to_string());
    raw.no_annotation()
}

fn mime_type_for(uri: &str) -> &'static str {
    if uri == NOTES_URI {
        "text/markdown"
    } else {
        "application/json"
    }
}

/// Translate a registry failure into the JSON-RPC error sent to the client.
pub fn registry_error_to_error_data(err: &RegistryError) -> ErrorData {
    match err {
        RegistryError::UnknownHandler {
            kind: HandlerKind::Resource,
            name,
        } => build_error_data(
            &UNKNOWN_RESOURCE_ERROR,
            err,
            json!({ "uri": name }),
            false,
        ),
        RegistryError::UnknownHandler { kind, name } => build_error_data(
            &UNKNOWN_HANDLER_ERROR,
            err,
            json!({ "kind": kind.as_str(), "name": name }),
            false,
        ),
        RegistryError::InvalidArgument {
            name,
            argument,
            reason,
            ..
        } => build_error_data(
            &INVALID_ARGUMENT_ERROR,
            err,
            json!({ "name": name, "argument": argument, "reason": reason }),
            false,
        ),
        RegistryError::Handler {
            source: HandlerError::Notes(NotesError::DigestMismatch { expected, actual }),
            ..
        } => build_error_data(
            &NOTES_CHANGED_ERROR,
            err,
            json!({ "expected_sha256": expected, "actual_sha256": actual }),
            true,
        ),
        RegistryError::Handler {
            source: HandlerError::Notes(NotesError::EmptyEntry),
            ..
        } => build_error_data(&NOTES_EMPTY_ENTRY_ERROR, err, Value::Null, false),
        RegistryError::Handler {
            name,
            source: HandlerError::Notes(NotesError::InvalidSection { reason, .. }),
            ..
        } => build_error_data(
            &INVALID_ARGUMENT_ERROR,
            err,
            json!({ "name": name, "argument": "section", "reason": reason }),
            false,
        ),
        RegistryError::Handler {
            name,
            source: HandlerError::Notes(NotesError::InvalidTimestamp { .. }),
            ..
        } => build_error_data(
            &INVALID_ARGUMENT_ERROR,
            err,
            json!({ "name": name, "argument": "timestamp", "reason": "expected `YYYY-MM-DD HH:MM`" }),
            false,
        ),
        RegistryError::Handler { name, .. } | RegistryError::DuplicateName { name, .. } => {
            build_error_data(&HANDLER_FAILED_ERROR, err, json!({ "name": name }), false)
        }
    }
}

fn build_error_data(
    descriptor: &ToolErrorDescriptor,
    err: &RegistryError,
    details: Value,
    retryable: bool,
) -> ErrorData {
    let mut builder = descriptor
        .builder()
        .message(err.to_string())
        .retryable(retryable);
    if !details.is_null() {
        builder = builder.details(details);
    }
    builder
        .build()
        .unwrap_or_else(|builder_err| ErrorData::internal_error(builder_err.to_string(), None))
}

fn log_failure(kind: HandlerKind, name: &str, err: &RegistryError) {
    tracing::warn!(
        target: "productivity_mcp::runtime",
        kind = kind.as_str(),
        handler = name,
        error = %err,
        "Request failed"
    );
}

impl ServerHandler for ProductivityServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(self.prompt_listing()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let kind = HandlerKind::Prompt;
        let text = self
            .registry
            .dispatch(&request.name, kind, request.arguments.as_ref())
            .map_err(|err| {
                log_failure(kind, &request.name, &err);
                registry_error_to_error_data(&err)
            })?
            .into_text();
        let description = self
            .registry
            .descriptor(kind, &request.name)
            .map(|descriptor| descriptor.description.clone());

        Ok(GetPromptResult {
            description,
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_listing()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let kind = HandlerKind::Tool;
        let text = self
            .registry
            .dispatch(&request.name, kind, request.arguments.as_ref())
            .map_err(|err| {
                log_failure(kind, &request.name, &err);
                registry_error_to_error_data(&err)
            })?
            .into_text();
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(self.resource_listing()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let kind = HandlerKind::Resource;
        let text = self
            .registry
            .dispatch(&request.uri, kind, None)
            .map_err(|err| {
                log_failure(kind, &request.uri, &err);
                registry_error_to_error_data(&err)
            })?
            .into_text();
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
