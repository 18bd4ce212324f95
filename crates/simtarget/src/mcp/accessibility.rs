use crate::{Result, TargetError};
use serde::{Deserialize, Serialize};
use std::process::Command;

/// One node of an on-screen accessibility snapshot, as reported by
/// `idb ui describe-all`. Snapshots are point-in-time and never merged
/// across queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxElement {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "role_description", default)]
    pub role_description: Option<String>,
    #[serde(rename = "AXLabel", default)]
    pub ax_label: Option<String>,
    #[serde(rename = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "AXValue", default)]
    pub value: Option<String>,
    #[serde(rename = "AXEnabled", default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub frame: Option<Frame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl AxElement {
    /// First non-empty of accessibility label, title, value, role
    /// description, type.
    pub fn label(&self) -> Option<&str> {
        first_non_empty(&[
            self.ax_label.as_deref(),
            self.title.as_deref(),
            self.value.as_deref(),
            self.role_description.as_deref(),
            self.kind.as_deref(),
        ])
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Geometric centre of the frame; None unless all four components are
    /// present and finite.
    pub fn centre(&self) -> Option<Point> {
        self.frame.as_ref().and_then(Frame::centre)
    }
}

impl Frame {
    pub fn centre(&self) -> Option<Point> {
        let components = [self.x, self.y, self.width, self.height];
        if components.iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some(Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        })
    }
}

/// Ordered-priority probe over optional string fields.
fn first_non_empty<'a>(fields: &[Option<&'a str>]) -> Option<&'a str> {
    fields
        .iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .copied()
}

/// External collaborator supplying the live accessibility snapshot.
pub trait SnapshotSource: Send + Sync {
    fn describe_all(&self, device_id: &str) -> Result<Vec<AxElement>>;
}

/// Snapshot source backed by the `idb` CLI. The dependency is optional on
/// the host; absence is reported distinctly so callers can suggest
/// installation instead of retrying.
pub struct IdbSnapshot;

impl IdbSnapshot {
    pub fn new() -> Self {
        Self
    }

    fn check_available(&self) -> Result<()> {
        let found = Command::new("which")
            .arg("idb")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if found {
            Ok(())
        } else {
            Err(TargetError::AutomationUnavailable(
                "idb not found on PATH; install with 'brew install idb-companion'".to_string(),
            ))
        }
    }
}

impl Default for IdbSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for IdbSnapshot {
    fn describe_all(&self, device_id: &str) -> Result<Vec<AxElement>> {
        self.check_available()?;

        let output = Command::new("idb")
            .args(["ui", "describe-all", "--udid", device_id, "--json"])
            .output()
            .map_err(|e| TargetError::Mcp(format!("Failed to run idb ui describe-all: {}", e)))?;

        if !output.status.success() {
            return Err(TargetError::Mcp(format!(
                "idb ui describe-all failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let elements: Vec<AxElement> = serde_json::from_str(&stdout)
            .map_err(|e| TargetError::Mcp(format!("Failed to parse UI elements: {}", e)))?;
        tracing::debug!(count = elements.len(), device_id, "captured accessibility snapshot");
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_probe_order() {
        let element = AxElement {
            title: Some("Settings".to_string()),
            kind: Some("Button".to_string()),
            ..Default::default()
        };
        assert_eq!(element.label(), Some("Settings"));

        let element = AxElement {
            ax_label: Some("  ".to_string()),
            value: Some("42".to_string()),
            ..Default::default()
        };
        assert_eq!(element.label(), Some("42"));

        assert_eq!(AxElement::default().label(), None);
    }

    #[test]
    fn test_centre_requires_finite_frame() {
        let frame = Frame {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 40.0,
        };
        assert_eq!(frame.centre(), Some(Point { x: 60.0, y: 40.0 }));

        let bad = Frame {
            x: f64::NAN,
            ..frame
        };
        assert_eq!(bad.centre(), None);
    }
}
