//! The domain store: named partitions of records.
//!
//! The engine only reads (`select`) and appends (`push`). Seeding and resetting belong to the
//! caller. Every call takes the partition lock for its own duration only, so a host running
//! resolutions concurrently still has to serialize them to get consistent reads.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::execution::Resolvable;
use crate::execution::Resolved;
use crate::global_id::Identifiable;
use crate::spec::kind_name;

/// A domain object: a kind tag, a natural key and loose attributes.
#[derive(Debug, Clone)]
pub struct Record {
    kind: String,
    name: String,
    attributes: IndexMap<String, Resolved>,
}

impl Record {
    /// `kind` may carry a module path (`jazz::models::Ensemble`); only its last segment names
    /// the exposed type.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Resolved>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&Resolved> {
        self.attributes.get(key)
    }
}

impl Resolvable for Record {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn property(&self, key: &str) -> Option<Resolved> {
        match key {
            "name" => Some(Resolved::from(self.name.as_str())),
            _ => self.attributes.get(key).cloned(),
        }
    }

    fn as_identifiable(&self) -> Option<&dyn Identifiable> {
        Some(self)
    }
}

impl Identifiable for Record {
    fn type_name(&self) -> &str {
        kind_name(&self.kind)
    }

    fn natural_key(&self) -> &str {
        &self.name
    }
}

type Partitions = IndexMap<String, Vec<Arc<Record>>>;

#[derive(Debug, Default)]
pub struct Store {
    partitions: RwLock<Partitions>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every partition with `seed`.
    pub fn reset(&self, seed: impl IntoIterator<Item = (String, Vec<Record>)>) {
        let partitions: Partitions = seed
            .into_iter()
            .map(|(partition, records)| (partition, records.into_iter().map(Arc::new).collect()))
            .collect();
        tracing::debug!(partitions = partitions.len(), "store reset");
        *self.partitions.write() = partitions;
    }

    /// The records of `partition`, in insertion order. `None` if the partition does not exist.
    pub fn select(&self, partition: &str) -> Option<Vec<Arc<Record>>> {
        self.partitions.read().get(partition).cloned()
    }

    pub fn push(&self, partition: &str, record: Record) -> Arc<Record> {
        let record = Arc::new(record);
        let mut partitions = self.partitions.write();
        let records = partitions.entry(partition.to_string()).or_default();
        records.push(record.clone());
        tracing::debug!(partition, name = %record.name, len = records.len(), "record pushed");
        record
    }

    pub fn len(&self, partition: &str) -> usize {
        self.partitions
            .read()
            .get(partition)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.read().values().all(Vec::is_empty)
    }
}
