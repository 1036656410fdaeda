//! Shared fixtures for integration tests

#![allow(dead_code)]

use cretoai_acl::{Acl, AclConfig, MemoryStore, Record};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring `RUST_LOG`; repeated calls are ignored
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Engine over a fresh in-memory store
pub fn engine_with(config: AclConfig) -> (Acl, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let acl = Acl::builder()
        .with_config(config)
        .with_store(store.clone())
        .build()
        .expect("engine should build over the memory store");
    (acl, store)
}

/// Engine with default configuration (inline grants, global scope)
pub fn engine() -> (Acl, Arc<MemoryStore>) {
    engine_with(AclConfig::default())
}

/// Insert `count` records of `model` with ids `1..=count`
pub async fn seed(store: &MemoryStore, model: &str, count: usize) -> Vec<Record> {
    let mut records = Vec::with_capacity(count);
    for id in 1..=count {
        records.push(
            store
                .insert_record(Record::new(model, id.to_string()).with_attribute("name", format!("{} {}", model, id)))
                .await,
        );
    }
    records
}
