use crate::{Result, TargetError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub display_name: String,
    pub runtime_name: String,
    pub runtime_version: String,
    pub runtime_available: bool,
    pub state: DeviceState,
    pub available: bool,
    pub availability_error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceState {
    Shutdown,
    Booting,
    Booted,
    ShuttingDown,
}

impl DeviceState {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Shutdown" => Some(DeviceState::Shutdown),
            "Booting" => Some(DeviceState::Booting),
            "Booted" => Some(DeviceState::Booted),
            "ShuttingDown" => Some(DeviceState::ShuttingDown),
            _ => None,
        }
    }
}

/// External collaborator supplying the enumerable device list.
pub trait DeviceCatalog: Send + Sync {
    fn list(&self) -> Result<Vec<Device>>;
}

#[derive(Debug, Clone)]
struct RuntimeInfo {
    name: String,
    version: String,
    is_available: bool,
}

/// Catalog backed by `xcrun simctl`. Every `list()` re-fetches; nothing is
/// cached across calls.
pub struct SimctlCatalog;

impl SimctlCatalog {
    pub fn new() -> Self {
        Self
    }

    fn fetch(&self) -> Result<serde_json::Value> {
        let output = Command::new("xcrun")
            .args(["simctl", "list", "devices", "runtimes", "--json"])
            .output()
            .map_err(|e| TargetError::Catalog(format!("Failed to list devices: {}", e)))?;

        if !output.status.success() {
            return Err(TargetError::Catalog(format!(
                "simctl list failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| TargetError::Catalog(format!("Failed to parse device list: {}", e)))
    }
}

impl Default for SimctlCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCatalog for SimctlCatalog {
    fn list(&self) -> Result<Vec<Device>> {
        let data = self.fetch()?;
        let devices = normalize_catalog(&data);
        tracing::debug!(count = devices.len(), "enumerated simulator devices");
        Ok(devices)
    }
}

/// Flattens the simctl payload (devices keyed by runtime identifier, plus a
/// runtime table) into the normalized device list, joining each device to its
/// runtime by identifier.
pub fn normalize_catalog(data: &serde_json::Value) -> Vec<Device> {
    let mut runtimes: HashMap<String, RuntimeInfo> = HashMap::new();
    if let Some(runtime_array) = data.get("runtimes").and_then(|r| r.as_array()) {
        for runtime in runtime_array {
            if let Some(identifier) = runtime.get("identifier").and_then(|i| i.as_str()) {
                runtimes.insert(
                    identifier.to_string(),
                    RuntimeInfo {
                        name: runtime
                            .get("name")
                            .and_then(|n| n.as_str())
                            .unwrap_or(identifier)
                            .to_string(),
                        version: runtime
                            .get("version")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        is_available: runtime
                            .get("isAvailable")
                            .and_then(|a| a.as_bool())
                            .unwrap_or(false),
                    },
                );
            }
        }
    }

    let mut devices = Vec::new();
    if let Some(devices_by_runtime) = data.get("devices").and_then(|d| d.as_object()) {
        for (runtime_id, device_list) in devices_by_runtime {
            let runtime = runtimes.get(runtime_id.as_str());
            if let Some(device_array) = device_list.as_array() {
                for device_json in device_array {
                    if let Some(device) = parse_device(device_json, runtime_id, runtime) {
                        devices.push(device);
                    }
                }
            }
        }
    }

    devices
}

fn parse_device(
    device_json: &serde_json::Value,
    runtime_id: &str,
    runtime: Option<&RuntimeInfo>,
) -> Option<Device> {
    let id = device_json.get("udid")?.as_str()?;
    let name = device_json.get("name")?.as_str()?;

    // Unrecognized states are skipped rather than guessed at; the catalog
    // owns the state field.
    let state = DeviceState::parse(device_json.get("state")?.as_str()?)?;

    let (runtime_name, runtime_version, runtime_available) = match runtime {
        Some(info) => (info.name.clone(), info.version.clone(), info.is_available),
        None => (
            runtime_id.to_string(),
            version_from_runtime_id(runtime_id),
            false,
        ),
    };

    Some(Device {
        id: id.to_string(),
        display_name: name.to_string(),
        runtime_name,
        runtime_version,
        runtime_available,
        state,
        available: device_json
            .get("isAvailable")
            .and_then(|a| a.as_bool())
            .unwrap_or(false),
        availability_error: device_json
            .get("availabilityError")
            .and_then(|e| e.as_str())
            .map(|e| e.to_string()),
    })
}

/// Recovers a dotted version from a runtime identifier such as
/// `com.apple.CoreSimulator.SimRuntime.iOS-17-2` when the runtime table has
/// no entry to join against.
fn version_from_runtime_id(runtime_id: &str) -> String {
    let suffix = runtime_id.rsplit('.').next().unwrap_or(runtime_id);
    let digits: Vec<&str> = suffix
        .split('-')
        .filter(|part| part.chars().all(|c| c.is_ascii_digit()) && !part.is_empty())
        .collect();
    digits.join(".")
}
