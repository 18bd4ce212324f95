use serde_json::{Value, json};
use simtarget::Result;
use simtarget::mcp::server::{TargetServer, ToolRequest, ToolSchema};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[derive(serde::Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl JsonRpcResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(json!({ "code": code, "message": message })),
        }
    }
}

fn list_tools(schemas: &[ToolSchema]) -> Value {
    json!({
        "tools": schemas.iter().map(|s| json!({
            "name": s.name,
            "description": s.description,
            "inputSchema": s.parameters
        })).collect::<Vec<_>>()
    })
}

async fn call_tool(server: &TargetServer, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::err(id, -32602, "Invalid params: params required".to_string());
    };
    let (Some(name), Some(arguments)) = (
        params.get("name").and_then(|v| v.as_str()),
        params.get("arguments"),
    ) else {
        return JsonRpcResponse::err(
            id,
            -32602,
            "Invalid params: missing 'name' or 'arguments'".to_string(),
        );
    };

    let request = ToolRequest {
        tool_name: name.to_string(),
        params: arguments.clone(),
    };
    match server.call_tool(request).await {
        Ok(response) => {
            let text = serde_json::to_string_pretty(&response.result)
                .unwrap_or_else(|_| response.result.to_string());
            JsonRpcResponse::ok(id, json!({ "content": [{ "type": "text", "text": text }] }))
        }
        Err(e) => JsonRpcResponse::err(id, -32603, format!("Tool execution error: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = TargetServer::new()?;
    let schemas = server.get_tool_schemas()?;
    eprintln!("simtarget MCP server ready ({} tools)", schemas.len());
    for schema in &schemas {
        eprintln!("  - {}: {}", schema.name, schema.description);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Err(e) => JsonRpcResponse::err(None, -32700, format!("Parse error: {}", e)),
            Ok(request) => match request.method.as_str() {
                "tools/list" => JsonRpcResponse::ok(request.id, list_tools(&schemas)),
                "tools/call" => call_tool(&server, request.id, request.params).await,
                other => JsonRpcResponse::err(
                    request.id,
                    -32601,
                    format!("Method not found: {}", other),
                ),
            },
        };

        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }

    Ok(())
}
