//! # Discovered endpoint description and label/tag filtering.
//!
//! [`ServiceEndpoint`] is the immutable record discovery hands to the core:
//! name, address, version, ports, and free-form tag/label metadata. The
//! `name` is the registry key; two endpoints with the same name describe the
//! same service.
//!
//! [`Filter`] selects endpoints by requiring every configured label and tag
//! pair to be present on the endpoint.

use std::collections::HashMap;

use crate::config::FilterConfig;

/// A discovered description of a service.
///
/// Produced by discovery; immutable from the core's perspective.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Unique name within a namespace; the registry key.
    pub name: String,
    /// Network address the service is reachable at.
    pub address: String,
    /// Semver string; may be empty.
    pub version: String,
    /// Ordered port list.
    pub ports: Vec<ServicePort>,
    /// Free-form tags; may contain an explicit admission priority.
    pub tags: HashMap<String, String>,
    /// Free-form labels used for filtering.
    pub labels: HashMap<String, String>,
}

impl ServiceEndpoint {
    /// Creates an endpoint carrying only name and address.
    ///
    /// Used when re-registering a failed service whose original metadata is
    /// no longer available.
    pub fn bare(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }
}

/// A named port exposed by an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub protocol: String,
}

/// Label/tag selector for discovery and the watch stream.
///
/// An endpoint matches iff every key/value pair in both mappings is present
/// on the endpoint. An empty filter matches everything.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub labels: HashMap<String, String>,
    pub tags: HashMap<String, String>,
}

impl Filter {
    /// Returns true when the endpoint carries every required label and tag.
    pub fn matches(&self, endpoint: &ServiceEndpoint) -> bool {
        let has = |required: &HashMap<String, String>, actual: &HashMap<String, String>| {
            required
                .iter()
                .all(|(k, v)| actual.get(k).is_some_and(|a| a == v))
        };
        has(&self.labels, &endpoint.labels) && has(&self.tags, &endpoint.tags)
    }
}

impl From<&FilterConfig> for Filter {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            labels: cfg.labels.clone(),
            tags: cfg.tags.clone(),
        }
    }
}
