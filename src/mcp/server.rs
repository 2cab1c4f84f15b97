//! MCP server implementation
//!
//! Speaks JSON-RPC over stdio, one message per line. Tool failures surface
//! as error-flagged tool results; only protocol violations produce JSON-RPC
//! errors.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::gsc::client::GscClient;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

const SERVER_NAME: &str = "gsc";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server for Search Console
pub struct McpServer {
    tool_handler: ToolHandler,
    initialized: bool,
}

impl McpServer {
    pub fn new(client: Arc<GscClient>) -> Self {
        Self {
            tool_handler: ToolHandler::new(client),
            initialized: false,
        }
    }

    /// Run the server on stdio until the client closes the stream
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_message(&line).await {
                Ok(Some(response)) => {
                    let response_str = serde_json::to_string(&response)?;
                    writeln!(stdout, "{}", response_str)?;
                    stdout.flush()?;
                }
                Ok(None) => {
                    // Notification, no response.
                }
                Err(e) => {
                    tracing::error!("error handling message: {}", e);
                }
            }
        }

        Ok(())
    }

    async fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Ok(Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        // Notifications carry no id and get no response.
        let id = match request.id.clone() {
            Some(id) => id,
            None => {
                if request.method == methods::INITIALIZED {
                    self.initialized = true;
                    tracing::debug!("client initialization complete");
                }
                return Ok(None);
            }
        };

        let response = match request.method.as_str() {
            methods::INITIALIZE => match self.handle_initialize() {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
            },
            methods::PING => JsonRpcResponse::success(id, serde_json::json!({})),
            methods::LIST_TOOLS => match self.handle_list_tools() {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
            },
            methods::CALL_TOOL => match call_params(&request) {
                Ok(params) => {
                    let result = self
                        .tool_handler
                        .call_tool(&params.name, params.arguments)
                        .await;
                    JsonRpcResponse::success(id, tool_result_value(result))
                }
                Err(e) => JsonRpcResponse::error(id, e),
            },
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method)),
        };

        Ok(Some(response))
    }

    fn handle_initialize(&self) -> Result<Value> {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

}

/// Extract tools/call params; a missing or malformed params object is a
/// protocol violation, not a tool failure.
fn call_params(request: &JsonRpcRequest) -> std::result::Result<CallToolParams, JsonRpcError> {
    let params = request
        .params
        .as_ref()
        .ok_or_else(|| JsonRpcError::invalid_params("missing params for tools/call"))?;

    serde_json::from_value(params.clone())
        .map_err(|e| JsonRpcError::invalid_params(format!("invalid tools/call params: {}", e)))
}

fn tool_result_value(result: CallToolResult) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        serde_json::json!({
            "content": [{"type": "text", "text": format!("Error: {}", e)}],
            "isError": true
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "gsc");
    }

    #[test]
    fn test_tool_result_value_shape() {
        let value = tool_result_value(CallToolResult::text("ok"));
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "ok");
    }

    fn request(json: &str) -> JsonRpcRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_call_without_params_is_invalid_params() {
        let req = request(r#"{"jsonrpc":"2.0","id":7,"method":"tools/call"}"#);
        let err = call_params(&req).unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn test_call_with_malformed_params_is_invalid_params() {
        let req = request(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"arguments":{}}}"#,
        );
        let err = call_params(&req).unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(err.message.contains("name"));
    }

    #[test]
    fn test_call_params_extracted() {
        let req = request(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"list_properties","arguments":{}}}"#,
        );
        let params = call_params(&req).unwrap();
        assert_eq!(params.name, "list_properties");
    }
}
