use super::device_catalog::{DeviceCatalog, SimctlCatalog};
use super::device_resolver::{self, ResolveCriteria, ResolverConfig};
use super::outcome;
use super::preference::{PreferenceRecord, PreferenceStore};
use super::server::{Tool, ToolSchema};
use crate::{Result, TargetError};
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct DeviceTargetKit {
    schema: ToolSchema,
    catalog: Box<dyn DeviceCatalog>,
    store: PreferenceStore,
    config: ResolverConfig,
}

impl DeviceTargetKit {
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(SimctlCatalog::new()),
            PreferenceStore::new(),
            ResolverConfig::default(),
        )
    }

    pub fn with_parts(
        catalog: Box<dyn DeviceCatalog>,
        store: PreferenceStore,
        config: ResolverConfig,
    ) -> Self {
        Self {
            schema: ToolSchema {
                name: "device_target".to_string(),
                description: "Resolve, select, and list simulator devices without requiring concrete identifiers".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "action": {
                            "type": "string",
                            "enum": ["resolve", "select", "list"],
                            "description": "Device targeting action"
                        },
                        "device_id": {
                            "type": "string",
                            "description": "Explicit device identifier (canonical hyphenated hex format)"
                        },
                        "name": {
                            "type": "string",
                            "description": "Device name substring filter, e.g. 'iPhone 15'"
                        },
                        "runtime": {
                            "type": "string",
                            "description": "Runtime name or version substring filter, e.g. 'iOS 17'"
                        }
                    },
                    "required": ["action"]
                }),
            },
            catalog,
            store,
            config,
        }
    }

    fn criteria_from(params: &Value) -> ResolveCriteria {
        let field = |key: &str| {
            params
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        ResolveCriteria {
            device_id: field("device_id"),
            name: field("name"),
            runtime: field("runtime"),
        }
    }

    fn resolve(&self, params: &Value) -> Result<String> {
        let criteria = Self::criteria_from(params);
        let preference = self.store.load();
        device_resolver::resolve(&criteria, preference.as_ref(), self.catalog.as_ref(), &self.config)
    }

    fn select(&self, params: &Value) -> Result<Value> {
        let device_id = self.resolve(params)?;

        // Pull the catalog entry so the persisted record carries readable
        // names; an id resolved through the trusted fast path may not be
        // enumerable and is stored with empty names.
        let device = self
            .catalog
            .list()
            .unwrap_or_default()
            .into_iter()
            .find(|d| d.id == device_id);

        let record = match &device {
            Some(d) => PreferenceRecord::new(
                device_id.clone(),
                d.display_name.clone(),
                d.runtime_name.clone(),
            ),
            None => PreferenceRecord::new(device_id.clone(), String::new(), String::new()),
        };
        self.store.save(&record)?;

        Ok(outcome::success_with_summary(
            json!({
                "device_id": device_id,
                "display_name": record.display_name,
                "runtime_name": record.runtime_name,
            }),
            &format!("Selected device {}", device_id),
        ))
    }
}

impl Default for DeviceTargetKit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DeviceTargetKit {
    async fn execute(&self, params: Value) -> Result<Value> {
        let action = params
            .get("action")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TargetError::Mcp("Missing action parameter".to_string()))?;

        match action {
            "resolve" => match self.resolve(&params) {
                Ok(device_id) => Ok(outcome::success_with_summary(
                    json!({ "device_id": device_id }),
                    &format!("Resolved device {}", device_id),
                )),
                Err(e) => Ok(outcome::from_error(&e)),
            },
            "select" => match self.select(&params) {
                Ok(envelope) => Ok(envelope),
                Err(e) => Ok(outcome::from_error(&e)),
            },
            "list" => match self.catalog.list() {
                Ok(devices) => Ok(outcome::success(json!({
                    "count": devices.len(),
                    "devices": devices,
                }))),
                Err(e) => Ok(outcome::from_error(&e)),
            },
            _ => Err(TargetError::Mcp(format!("Unsupported action: {}", action))),
        }
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }
}
