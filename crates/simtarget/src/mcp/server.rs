use super::device_tools::DeviceTargetKit;
use super::ui_tools::UiMatchKit;
use crate::{Result, TargetError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    pub params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool_name: String,
    pub result: Value,
    pub success: bool,
}

#[async_trait]
pub trait Tool: Send + Sync {
    async fn execute(&self, params: Value) -> Result<Value>;
    fn schema(&self) -> &ToolSchema;
}

#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub struct TargetServer {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl std::fmt::Debug for TargetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetServer")
            .field("tools", &"<tools>")
            .finish()
    }
}

impl TargetServer {
    pub fn new() -> Result<Self> {
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();

        let device_kit = Arc::new(DeviceTargetKit::new());
        let ui_kit = Arc::new(UiMatchKit::new());
        tools.insert("device_target".to_string(), device_kit);
        tools.insert("ui_match".to_string(), ui_kit);

        Ok(Self {
            tools: Arc::new(RwLock::new(tools)),
        })
    }

    pub fn register_tool(&self, name: String, tool: Arc<dyn Tool>) -> Result<()> {
        let mut tools = self
            .tools
            .write()
            .map_err(|e| TargetError::Mcp(format!("Failed to acquire tool lock: {}", e)))?;
        tools.insert(name, tool);
        Ok(())
    }

    pub fn get_tool_schemas(&self) -> Result<Vec<ToolSchema>> {
        let tools = self
            .tools
            .read()
            .map_err(|e| TargetError::Mcp(format!("Failed to acquire tool lock: {}", e)))?;
        Ok(tools.values().map(|t| t.schema().clone()).collect())
    }

    pub async fn call_tool(&self, request: ToolRequest) -> Result<ToolResponse> {
        let result = timeout(
            Duration::from_secs(30),
            self.execute_tool(&request.tool_name, request.params),
        )
        .await
        .map_err(|_| TargetError::Mcp("Tool execution timeout".to_string()))??;

        Ok(ToolResponse {
            result,
            tool_name: request.tool_name,
            success: true,
        })
    }

    async fn execute_tool(&self, tool_name: &str, params: Value) -> Result<Value> {
        let tool = {
            let tools = self
                .tools
                .read()
                .map_err(|e| TargetError::Mcp(format!("Failed to acquire tool lock: {}", e)))?;

            tools
                .get(tool_name)
                .ok_or_else(|| TargetError::Mcp(format!("Tool not found: {}", tool_name)))?
                .clone()
        };

        tracing::debug!(tool_name, "executing tool");
        tool.execute(params).await
    }
}
