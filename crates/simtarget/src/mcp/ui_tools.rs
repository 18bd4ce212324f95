use super::accessibility::{IdbSnapshot, SnapshotSource};
use super::device_catalog::{DeviceCatalog, SimctlCatalog};
use super::device_resolver::{self, ResolveCriteria, ResolverConfig};
use super::outcome;
use super::preference::PreferenceStore;
use super::server::{Tool, ToolSchema};
use super::ui_query;
use crate::{Result, TargetError};
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct UiMatchKit {
    schema: ToolSchema,
    snapshot: Box<dyn SnapshotSource>,
    catalog: Box<dyn DeviceCatalog>,
    store: PreferenceStore,
    config: ResolverConfig,
}

impl UiMatchKit {
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(IdbSnapshot::new()),
            Box::new(SimctlCatalog::new()),
            PreferenceStore::new(),
            ResolverConfig::default(),
        )
    }

    pub fn with_parts(
        snapshot: Box<dyn SnapshotSource>,
        catalog: Box<dyn DeviceCatalog>,
        store: PreferenceStore,
        config: ResolverConfig,
    ) -> Self {
        Self {
            schema: ToolSchema {
                name: "ui_match".to_string(),
                description: "Match natural-language queries against on-screen accessibility elements and compute tap points".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "action": {
                            "type": "string",
                            "enum": ["find_element", "query_ui", "tap_point"],
                            "description": "UI matching action"
                        },
                        "query": {
                            "type": "string",
                            "description": "Free-text description of the target element, e.g. 'Log in'"
                        },
                        "limit": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 200,
                            "default": 20,
                            "description": "Maximum number of ranked matches for query_ui"
                        },
                        "x": {"type": "number", "description": "Explicit x coordinate for tap_point"},
                        "y": {"type": "number", "description": "Explicit y coordinate for tap_point"},
                        "device_id": {
                            "type": "string",
                            "description": "Optional device ID. If not specified, the preferred or best-ranked device is used."
                        }
                    },
                    "required": ["action"]
                }),
            },
            snapshot,
            catalog,
            store,
            config,
        }
    }

    fn resolve_device_id(&self, params: &Value) -> Result<String> {
        let criteria = ResolveCriteria {
            device_id: params
                .get("device_id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            ..Default::default()
        };
        let preference = self.store.load();
        device_resolver::resolve(&criteria, preference.as_ref(), self.catalog.as_ref(), &self.config)
    }

    fn query_param(params: &Value) -> Result<&str> {
        params
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TargetError::Mcp("Missing query parameter".to_string()))
    }

    fn find_element(&self, params: &Value) -> Result<Value> {
        let query = Self::query_param(params)?;
        let device_id = self.resolve_device_id(params)?;
        let elements = self.snapshot.describe_all(&device_id)?;
        let best = ui_query::find_best(query, &elements)?;

        let tap_point = best.centre;
        let summary = format!("Matched '{}' with score {}", best.label, best.score);
        Ok(outcome::success_with_summary(
            json!({
                "device_id": device_id,
                "match": best,
                "tap_point": tap_point,
            }),
            &summary,
        ))
    }

    fn query_ui(&self, params: &Value) -> Result<Value> {
        let query = Self::query_param(params)?;
        let limit = params
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize);
        let device_id = self.resolve_device_id(params)?;
        let elements = self.snapshot.describe_all(&device_id)?;
        let matches = ui_query::find_all(query, &elements, limit);

        Ok(outcome::success(json!({
            "device_id": device_id,
            "count": matches.len(),
            "matches": matches,
        })))
    }

    fn tap_point(params: &Value) -> Result<Value> {
        let coord = |key: &str| {
            params
                .get(key)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| TargetError::Mcp(format!("Missing {} coordinate", key)))
        };
        let point = ui_query::explicit_tap_point(coord("x")?, coord("y")?)?;
        Ok(outcome::success(json!({ "tap_point": point })))
    }
}

impl Default for UiMatchKit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for UiMatchKit {
    async fn execute(&self, params: Value) -> Result<Value> {
        let action = params
            .get("action")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TargetError::Mcp("Missing action parameter".to_string()))?;

        let result = match action {
            "find_element" => self.find_element(&params),
            "query_ui" => self.query_ui(&params),
            "tap_point" => Self::tap_point(&params),
            _ => return Err(TargetError::Mcp(format!("Unsupported action: {}", action))),
        };

        match result {
            Ok(envelope) => Ok(envelope),
            Err(TargetError::Mcp(msg)) => Err(TargetError::Mcp(msg)),
            Err(e) => Ok(outcome::from_error(&e)),
        }
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }
}
