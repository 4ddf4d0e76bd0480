//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - execute tools via the Redmine provider
//! 3. Shutdown - when stdin closes

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::handlers::ToolHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability, ToolsListResult, MCP_VERSION,
};
use crate::transport::{IncomingMessage, StdioTransport};

/// Default name reported in `serverInfo`.
pub const DEFAULT_SERVER_NAME: &str = "redmine-mcp";

/// MCP server for redmine-tools.
pub struct McpServer {
    handler: ToolHandler,
    name: String,
    initialized: bool,
}

impl McpServer {
    pub fn new(handler: ToolHandler) -> Self {
        Self {
            handler,
            name: DEFAULT_SERVER_NAME.to_string(),
            initialized: false,
        }
    }

    /// Name reported to clients during `initialize`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Serve over stdin/stdout until the client closes stdin.
    pub async fn run(&mut self) -> redmine_core::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport).await
    }

    /// Serve over an arbitrary transport.
    pub async fn serve<R, W>(
        &mut self,
        transport: &mut StdioTransport<R, W>,
    ) -> redmine_core::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(name = %self.name, "Starting MCP server");

        loop {
            match transport.read_message().await {
                Ok(Some(msg)) => {
                    if let Some(resp) = self.handle_message(msg).await {
                        if let Err(e) = transport.write_response(&resp).await {
                            tracing::error!("Failed to write response: {}", e);
                            return Err(e.into());
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!("Transport error: {}", e);
                    let error_resp = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(&e.to_string()),
                    );
                    transport.write_response(&error_resp).await?;
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    return Err(e.into());
                }
            }
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => tracing::info!(
                    "Client: {} v{} (protocol: {})",
                    init.client_info.name,
                    init.client_info.version,
                    init.protocol_version
                ),
                Err(e) => tracing::warn!("Failed to parse initialize params: {}", e),
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(&e.to_string()),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        tracing::info!("Calling tool: {}", params.name);

        let result = self.handler.execute(&params.name, params.arguments).await;
        JsonRpcResponse::from_serializable(id, &result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handlers::ToolHandler;
    use crate::protocol::{ToolCallResult, JSONRPC_VERSION};
    use redmine_core::{
        Attachment, AttachmentProvider, CatalogProvider, CreateMembershipInput, Enumeration,
        Error, Issue, IssueCategory, IssueCategoryInput, IssueFilter, IssueProvider, IssueStatus,
        Membership, Page, Pagination, Project, ProjectProvider, Result, Role, TimeEntry,
        TimeEntryFilter, Tracker, UpdateAttachmentInput, UploadToken, User, Version,
        VersionInput,
    };

    /// Provider where every call fails; the server tests never reach it
    /// except through `tools/call`.
    struct Offline;

    fn offline<T>() -> Result<T> {
        Err(Error::Http("connection refused".into()))
    }

    #[async_trait::async_trait]
    impl AttachmentProvider for Offline {
        async fn get_attachment(&self, _id: u64) -> Result<Attachment> {
            offline()
        }
        async fn download_content(&self, _a: &Attachment) -> Result<Vec<u8>> {
            offline()
        }
        async fn upload(&self, _f: &str, _c: Vec<u8>) -> Result<UploadToken> {
            offline()
        }
        async fn update_attachment(&self, _id: u64, _i: UpdateAttachmentInput) -> Result<()> {
            offline()
        }
        async fn delete_attachment(&self, _id: u64) -> Result<()> {
            offline()
        }
    }

    #[async_trait::async_trait]
    impl CatalogProvider for Offline {
        async fn get_trackers(&self) -> Result<Vec<Tracker>> {
            offline()
        }
        async fn get_issue_statuses(&self) -> Result<Vec<IssueStatus>> {
            offline()
        }
        async fn get_issue_priorities(&self) -> Result<Vec<Enumeration>> {
            offline()
        }
        async fn get_time_entry_activities(&self) -> Result<Vec<Enumeration>> {
            offline()
        }
        async fn get_document_categories(&self) -> Result<Vec<Enumeration>> {
            offline()
        }
        async fn get_roles(&self) -> Result<Vec<Role>> {
            offline()
        }
        async fn get_role(&self, _id: u64) -> Result<Role> {
            offline()
        }
    }

    #[async_trait::async_trait]
    impl ProjectProvider for Offline {
        async fn get_projects(&self, _p: Pagination) -> Result<Page<Project>> {
            offline()
        }
        async fn get_project(&self, _p: &str) -> Result<Project> {
            offline()
        }
        async fn get_versions(&self, _p: &str) -> Result<Vec<Version>> {
            offline()
        }
        async fn get_version(&self, _id: u64) -> Result<Version> {
            offline()
        }
        async fn create_version(&self, _p: &str, _i: VersionInput) -> Result<Version> {
            offline()
        }
        async fn update_version(&self, _id: u64, _i: VersionInput) -> Result<Version> {
            offline()
        }
        async fn delete_version(&self, _id: u64) -> Result<()> {
            offline()
        }
        async fn get_memberships(&self, _p: &str, _pg: Pagination) -> Result<Page<Membership>> {
            offline()
        }
        async fn get_membership(&self, _id: u64) -> Result<Membership> {
            offline()
        }
        async fn create_membership(
            &self,
            _p: &str,
            _i: CreateMembershipInput,
        ) -> Result<Membership> {
            offline()
        }
        async fn update_membership(&self, _id: u64, _r: Vec<u64>) -> Result<()> {
            offline()
        }
        async fn delete_membership(&self, _id: u64) -> Result<()> {
            offline()
        }
        async fn get_issue_categories(&self, _p: &str) -> Result<Vec<IssueCategory>> {
            offline()
        }
        async fn get_issue_category(&self, _id: u64) -> Result<IssueCategory> {
            offline()
        }
        async fn create_issue_category(
            &self,
            _p: &str,
            _i: IssueCategoryInput,
        ) -> Result<IssueCategory> {
            offline()
        }
        async fn update_issue_category(
            &self,
            _id: u64,
            _i: IssueCategoryInput,
        ) -> Result<IssueCategory> {
            offline()
        }
        async fn delete_issue_category(&self, _id: u64, _r: Option<u64>) -> Result<()> {
            offline()
        }
    }

    #[async_trait::async_trait]
    impl IssueProvider for Offline {
        async fn get_issues(&self, _f: IssueFilter) -> Result<Page<Issue>> {
            offline()
        }
        async fn get_issue(&self, _id: u64) -> Result<Issue> {
            offline()
        }
        async fn get_users(&self, _p: Pagination) -> Result<Page<User>> {
            offline()
        }
        async fn get_user(&self, _id: &str) -> Result<User> {
            offline()
        }
        async fn get_time_entries(&self, _f: TimeEntryFilter) -> Result<Page<TimeEntry>> {
            offline()
        }
    }

    fn server() -> McpServer {
        McpServer::new(ToolHandler::new(Arc::new(Offline)))
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Number(id),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_reports_configured_name() {
        let mut server = server().with_name("tracker-bridge");
        let resp = server
            .handle_request(request(
                1,
                "initialize",
                Some(serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0.0"}
                })),
            ))
            .await;

        let result = resp.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "tracker-bridge");
        assert_eq!(result["protocolVersion"], MCP_VERSION);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(server.initialized);
    }

    #[tokio::test]
    async fn test_double_initialize_error() {
        let mut server = server();
        server.handle_request(request(1, "initialize", None)).await;
        let resp = server.handle_request(request(2, "initialize", None)).await;

        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let mut server = server();
        let resp = server.handle_request(request(1, "tools/list", None)).await;

        let result: ToolsListResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.tools.len(), crate::registry::Tool::ALL.len());
        assert!(result.tools.iter().any(|t| t.name == "download_attachment"));
        assert!(result.tools.iter().any(|t| t.name == "upload_file_from_clipboard"));
    }

    #[tokio::test]
    async fn test_tools_call_provider_failure_is_result_not_rpc_error() {
        let mut server = server();
        let resp = server
            .handle_request(request(
                1,
                "tools/call",
                Some(serde_json::json!({"name": "list_trackers"})),
            ))
            .await;

        assert!(resp.error.is_none());
        let result: ToolCallResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("HTTP error: connection refused"));
    }

    #[tokio::test]
    async fn test_tools_call_missing_or_invalid_params() {
        let mut server = server();
        let resp = server.handle_request(request(1, "tools/call", None)).await;
        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_PARAMS);

        let resp = server
            .handle_request(request(2, "tools/call", Some(serde_json::json!("x"))))
            .await;
        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let resp = server.handle_request(request(1, "resources/list", None)).await;
        assert_eq!(resp.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_session() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "garbage\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );
        let mut transport = StdioTransport::new(input.as_bytes(), Vec::new());
        server().serve(&mut transport).await.unwrap();

        let output = String::from_utf8(transport.into_writer()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"]["serverInfo"]["name"], DEFAULT_SERVER_NAME);
        assert_eq!(lines[1]["id"], Value::Null);
        assert_eq!(lines[1]["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert_eq!(lines[2]["id"], 2);
        assert_eq!(lines[2]["result"], serde_json::json!({}));
    }
}
