use super::device_catalog::{Device, DeviceCatalog, DeviceState};
use super::preference::PreferenceRecord;
use crate::{Result, TargetError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default substring hints used by the no-filter fallback path.
pub const DEFAULT_DEVICE_HINT: &str = "iPhone";
pub const DEFAULT_PLATFORM_HINT: &str = "iOS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveCriteria {
    pub device_id: Option<String>,
    pub name: Option<String>,
    pub runtime: Option<String>,
}

impl ResolveCriteria {
    fn has_filters(&self) -> bool {
        self.name.is_some() || self.runtime.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub device_hint: String,
    pub platform_hint: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            device_hint: DEFAULT_DEVICE_HINT.to_string(),
            platform_hint: DEFAULT_PLATFORM_HINT.to_string(),
        }
    }
}

pub type DeviceRanking = fn(&Device, &Device) -> Ordering;

/// Checks the canonical simulator identifier format: five hyphenated
/// hexadecimal groups of 8-4-4-4-12 characters.
pub fn is_canonical_device_id(id: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = id.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS.iter())
            .all(|(part, len)| part.len() == *len && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Dotted numeric version comparison. Missing components count as zero and
/// non-numeric components as -1, so `"17.0.1" > "17"` and any malformed
/// component sorts below every numeric one.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn component(s: Option<&str>) -> i64 {
        match s {
            None => 0,
            Some(c) => c.parse::<i64>().unwrap_or(-1),
        }
    }

    let a_parts: Vec<&str> = a.split('.').collect();
    let b_parts: Vec<&str> = b.split('.').collect();
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let av = component(a_parts.get(i).copied());
        let bv = component(b_parts.get(i).copied());
        match av.cmp(&bv) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Default selection order, best device first: booted before non-booted,
/// then higher runtime version, then display name ascending, then id
/// ascending. The trailing id key makes the order total, so ranking a
/// non-empty candidate set always yields a unique winner.
pub fn default_ranking(a: &Device, b: &Device) -> Ordering {
    let a_booted = a.state == DeviceState::Booted;
    let b_booted = b.state == DeviceState::Booted;
    b_booted
        .cmp(&a_booted)
        .then_with(|| compare_versions(&b.runtime_version, &a.runtime_version))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.id.cmp(&b.id))
}

fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn contains_fold(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

/// Resolves criteria to exactly one concrete device identifier using the
/// default ranking.
pub fn resolve(
    criteria: &ResolveCriteria,
    preference: Option<&PreferenceRecord>,
    catalog: &dyn DeviceCatalog,
    config: &ResolverConfig,
) -> Result<String> {
    resolve_with_ranking(criteria, preference, catalog, config, default_ranking)
}

/// Same as [`resolve`] but with a caller-supplied tie-break comparator.
pub fn resolve_with_ranking(
    criteria: &ResolveCriteria,
    preference: Option<&PreferenceRecord>,
    catalog: &dyn DeviceCatalog,
    config: &ResolverConfig,
    ranking: DeviceRanking,
) -> Result<String> {
    // Fast path: an explicit id is trusted after format validation alone.
    if let Some(id) = &criteria.device_id {
        if is_canonical_device_id(id) {
            return Ok(id.clone());
        }
        return Err(TargetError::InvalidIdentifier(id.clone()));
    }

    // A persisted selection short-circuits when no filters narrow the search.
    // Stale ids surface downstream; no existence check here.
    if !criteria.has_filters() {
        if let Some(record) = preference {
            if is_canonical_device_id(&record.device_id) {
                tracing::debug!(device_id = %record.device_id, "using preferred device");
                return Ok(record.device_id.clone());
            }
        }
    }

    let devices = catalog.list()?;
    let mut candidates: Vec<Device> = devices
        .into_iter()
        .filter(|d| is_canonical_device_id(&d.id) && d.available)
        .collect();

    if criteria.has_filters() {
        if let Some(name) = &criteria.name {
            candidates.retain(|d| contains_fold(&d.display_name, name));
        }
        if let Some(runtime) = &criteria.runtime {
            candidates.retain(|d| {
                contains_fold(&d.runtime_name, runtime) || contains_fold(&d.runtime_version, runtime)
            });
        }
        if candidates.is_empty() {
            return Err(TargetError::NoMatch {
                name: criteria.name.clone(),
                runtime: criteria.runtime.clone(),
            });
        }
        candidates.sort_by(|a, b| ranking(a, b));
        return Ok(candidates[0].id.clone());
    }

    // No-filter fallback: a single booted device wins outright.
    let booted: Vec<&Device> = candidates
        .iter()
        .filter(|d| d.state == DeviceState::Booted)
        .collect();
    if booted.len() == 1 {
        return Ok(booted[0].id.clone());
    }

    if candidates.is_empty() {
        return Err(TargetError::NoMatch {
            name: None,
            runtime: None,
        });
    }

    // Prefer the default device class on the default platform before falling
    // back to the bare ranking.
    let mut hinted: Vec<Device> = candidates
        .iter()
        .filter(|d| {
            contains_fold(&d.display_name, &config.device_hint)
                && contains_fold(&d.runtime_name, &config.platform_hint)
        })
        .cloned()
        .collect();

    let pool = if hinted.is_empty() {
        &mut candidates
    } else {
        &mut hinted
    };
    pool.sort_by(|a, b| ranking(a, b));
    Ok(pool[0].id.clone())
}
