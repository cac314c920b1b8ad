//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use pdn_harvester_core::{FilterSpec, RawRecord, RemoteCollectionClient, ResourceType};
use serde_json::{json, Value};

/// Install a test subscriber once; honours RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn record(value: Value) -> RawRecord {
    value.as_object().cloned().expect("test record must be an object")
}

/// A record of `resource_type` numbered `n`, with enough fields for titles.
pub fn numbered(resource_type: ResourceType, n: u64) -> RawRecord {
    let value = match resource_type {
        ResourceType::Alert => json!({
            "id": n,
            "subject": format!("Alert {n}"),
            "daterecieved": "2024-01-02T00:00:00Z"
        }),
        ResourceType::Document => json!({
            "id": n,
            "title": format!("Report {n}"),
            "country": "Fiji",
            "filename": format!("report-{n}.pdf")
        }),
        ResourceType::Expert => json!({"id": n, "name": format!("Expert {n}"), "title": "Dr"}),
        ResourceType::NewsArticle => json!({"id": n, "title": format!("News {n}")}),
        ResourceType::Project => json!({"id": n, "acronym": format!("P{n}"), "name": "Project"}),
    };
    record(value)
}

fn id_text(record: &RawRecord) -> Option<String> {
    match record.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// In-memory remote collections keyed by endpoint.
///
/// Filters are recorded but not applied.
#[derive(Default)]
pub struct FakeRemote {
    collections: Mutex<HashMap<String, Vec<RawRecord>>>,
    page_calls: Mutex<Vec<(String, u64, FilterSpec)>>,
    unavailable: bool,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_records(self, resource_type: ResourceType, records: Vec<RawRecord>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(resource_type.as_str().to_string(), records);
        self
    }

    /// Records numbered `1..=count`.
    pub fn with_numbered(self, resource_type: ResourceType, count: u64) -> Self {
        let records = (1..=count).map(|n| numbered(resource_type, n)).collect();
        self.with_records(resource_type, records)
    }

    pub fn remove(&self, resource_type: ResourceType, id: &str) {
        if let Some(records) = self.collections.lock().unwrap().get_mut(resource_type.as_str()) {
            records.retain(|r| id_text(r).as_deref() != Some(id));
        }
    }

    pub fn page_calls(&self) -> Vec<(String, u64, FilterSpec)> {
        self.page_calls.lock().unwrap().clone()
    }

    fn records(&self, endpoint: &str) -> Vec<RawRecord> {
        self.collections
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
    }
}

impl RemoteCollectionClient for FakeRemote {
    fn check_availability(&self) -> bool {
        !self.unavailable
    }

    fn total_count(&self, endpoint: &str, _filter: &FilterSpec) -> u64 {
        if self.unavailable {
            return 0;
        }
        self.records(endpoint).len() as u64
    }

    fn page(&self, endpoint: &str, offset: u64, limit: u64, filter: &FilterSpec) -> Vec<RawRecord> {
        self.page_calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), offset, filter.clone()));
        if self.unavailable {
            return Vec::new();
        }
        self.records(endpoint)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    }

    fn fetch_by_id(&self, endpoint: &str, id: &str, _id_field: &str) -> Option<RawRecord> {
        self.records(endpoint)
            .into_iter()
            .find(|r| id_text(r).as_deref() == Some(id))
    }
}
