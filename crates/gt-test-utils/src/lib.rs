//! Testing utilities for the Golden Thread workspace
//!
//! Shared fixtures: registry record builders, an in-memory
//! [`RegistrySource`], a mock registry HTTP API for client tests, and symbol and
//! manifest helpers for validator tests.

#![allow(missing_docs)]

use gt_manifest::Manifest;
use gt_registry::{Registry, RegistryError, RegistrySource};
use gt_symbol::{CodeSymbol, SymbolKind};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// ---------------------------------------------------------------------------
// Registry records
// ---------------------------------------------------------------------------

pub fn title_property(text: &str) -> Value {
    json!({"type": "title", "title": [{"plain_text": text}]})
}

pub fn rich_text_property(text: &str) -> Value {
    json!({"type": "rich_text", "rich_text": [{"plain_text": text}]})
}

pub fn select_property(name: &str) -> Value {
    json!({"type": "select", "select": {"name": name}})
}

pub fn relation_property(record_ids: &[&str]) -> Value {
    let items: Vec<Value> = record_ids.iter().map(|id| json!({"id": id})).collect();
    json!({"type": "relation", "relation": items})
}

/// Builder for a remote record shaped like a database page
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record_id: String,
    properties: Map<String, Value>,
}

impl RecordBuilder {
    /// Record with remote id `record_id` and `ID` title `id`
    pub fn new(record_id: &str, id: &str) -> Self {
        let mut properties = Map::new();
        properties.insert("ID".into(), title_property(id));
        Self {
            record_id: record_id.to_string(),
            properties,
        }
    }

    pub fn title(mut self, text: &str) -> Self {
        self.properties.insert("Title".into(), rich_text_property(text));
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.properties.insert("Status".into(), select_property(status));
        self
    }

    /// Relation property named `name` linking to `record_ids`
    pub fn relation(mut self, name: &str, record_ids: &[&str]) -> Self {
        self.properties.insert(name.into(), relation_property(record_ids));
        self
    }

    pub fn property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Value {
        json!({"object": "page", "id": self.record_id, "properties": self.properties})
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// [`RegistrySource`] over fixed collections of records
///
/// Understands the title `equals` and `contains` filters issued by
/// [`Registry::get_entry`]; any other filter matches everything.
#[derive(Debug, Default)]
pub struct MemorySource {
    collections: BTreeMap<String, Vec<Value>>,
    queries: AtomicUsize,
    gets: AtomicUsize,
    failing: Mutex<Option<fn() -> RegistryError>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to a collection
    pub fn insert(&mut self, collection_id: &str, record: Value) -> &mut Self {
        self.collections
            .entry(collection_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Make every later call fail with the error built by `make`
    pub fn fail_with(&self, make: fn() -> RegistryError) {
        *self.failing.lock() = Some(make);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), RegistryError> {
        match *self.failing.lock() {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

fn title_text<'a>(record: &'a Value, property: &str) -> Option<&'a str> {
    record
        .pointer(&format!("/properties/{property}/title/0/plain_text"))
        .and_then(Value::as_str)
}

fn matches_filter(record: &Value, filter: &Value) -> bool {
    let property = filter.get("property").and_then(Value::as_str).unwrap_or("ID");
    if let Some(wanted) = filter.pointer("/title/equals").and_then(Value::as_str) {
        return title_text(record, property) == Some(wanted);
    }
    if let Some(wanted) = filter.pointer("/title/contains").and_then(Value::as_str) {
        // Records with only an `ID` title still answer name lookups
        return title_text(record, property)
            .or_else(|| title_text(record, "ID"))
            .is_some_and(|text| text.contains(wanted));
    }
    true
}

impl RegistrySource for MemorySource {
    fn query(&self, collection_id: &str, filter: Option<Value>) -> Result<Vec<Value>, RegistryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let records = self
            .collections
            .get(collection_id)
            .ok_or_else(|| RegistryError::NotFound(format!("database {collection_id}")))?;
        Ok(records
            .iter()
            .filter(|record| filter.as_ref().map_or(true, |f| matches_filter(record, f)))
            .cloned()
            .collect())
    }

    fn get(&self, record_id: &str) -> Result<Value, RegistryError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.collections
            .values()
            .flatten()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(record_id))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("page {record_id}")))
    }

    fn clear_cache(&self) {}
}

/// Type tag → collection id map where every collection is `db-<tag>`
pub fn standard_databases() -> BTreeMap<String, String> {
    gt_core::RegistryType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), format!("db-{}", t.as_str().to_lowercase())))
        .collect()
}

/// Collection id used by [`standard_databases`] for a type tag
pub fn collection_of(tag: &str) -> String {
    format!("db-{}", tag.to_lowercase())
}

/// A fully traced chain: FEAT-AUTH-001 → FR-AUTH-001 → V-AUTH-001 → TC-AUTH-001
///
/// Relations use remote record ids, as a live registry does.
pub fn complete_chain_source() -> MemorySource {
    let mut source = MemorySource::new();
    source
        .insert(
            &collection_of("FEAT"),
            RecordBuilder::new("feat-1", "FEAT-AUTH-001")
                .title("OAuth login")
                .relation("BR-IDs", &["br-1"])
                .relation("UR-IDs", &["ur-1"])
                .relation("FR-IDs", &["fr-1"])
                .relation("CF-IDs", &["cf-1"])
                .build(),
        )
        .insert(&collection_of("BR"), RecordBuilder::new("br-1", "BR-AUTH-001").build())
        .insert(&collection_of("UR"), RecordBuilder::new("ur-1", "UR-AUTH-001").build())
        .insert(&collection_of("CF"), RecordBuilder::new("cf-1", "CF-AUTH-001").build())
        .insert(
            &collection_of("FR"),
            RecordBuilder::new("fr-1", "FR-AUTH-001")
                .relation("V-IDs", &["v-1"])
                .relation("FEAT-IDs", &["feat-1"])
                .build(),
        )
        .insert(
            &collection_of("V"),
            RecordBuilder::new("v-1", "V-AUTH-001")
                .status("Verified")
                .relation("TC-IDs", &["tc-1"])
                .relation("EA-IDs", &["ea-1"])
                .build(),
        )
        .insert(&collection_of("TC"), RecordBuilder::new("tc-1", "TC-AUTH-001").build())
        .insert(&collection_of("EA"), RecordBuilder::new("ea-1", "EA-AUTH-001").build());
    source
}

/// Accessor over `source` with [`standard_databases`]
pub fn registry_over(source: MemorySource) -> Registry<MemorySource> {
    Registry::new(source, &standard_databases())
}

// ---------------------------------------------------------------------------
// Mock registry HTTP API
// ---------------------------------------------------------------------------

/// [`MockServer`] usable from synchronous tests
///
/// The server runs on its own thread; the runtime here only drives the
/// async setup and inspection calls, so blocking clients may be called
/// directly from the test thread.
pub struct MockRegistryApi {
    server: MockServer,
    runtime: Runtime,
}

impl MockRegistryApi {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// Base URL including the `/v1` prefix
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn received_requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.received_requests().len()
    }
}

/// JSON response with the given status
pub fn json_response(status: u16, body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

/// Header value of a received request
pub fn request_header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Body of a received request parsed as JSON; `Null` when empty or invalid
pub fn request_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Symbols and manifests
// ---------------------------------------------------------------------------

pub fn class(file: &str, name: &str, line: usize) -> CodeSymbol {
    CodeSymbol::new(name, SymbolKind::Class, file, line, line + 10)
}

pub fn function(file: &str, name: &str, line: usize) -> CodeSymbol {
    CodeSymbol::new(name, SymbolKind::Function, file, line, line + 5)
}

pub fn method(file: &str, parent: &str, name: &str, line: usize) -> CodeSymbol {
    CodeSymbol::new(name, SymbolKind::Method, file, line, line + 3).with_parent(parent)
}

pub fn manifest_from(yaml: &str) -> Manifest {
    Manifest::from_yaml_str(yaml).unwrap()
}

/// Manifest YAML mapping `paths` as classes to FEAT-AUTH-001
pub fn manifest_with_symbols(paths: &[&str]) -> Manifest {
    let mut yaml = String::from("service: auth-service\nversion: \"1.0\"\ntraceability:\n  symbols:");
    yaml.push_str(if paths.is_empty() { " []\n" } else { "\n" });
    for path in paths {
        yaml.push_str(&format!("    - path: \"{path}\"\n      type: class\n      ids: [FEAT-AUTH-001]\n"));
    }
    manifest_from(&yaml)
}
