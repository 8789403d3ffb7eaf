//! Device Registry (component A).
//!
//! The registry is a view, not a store: `listDevices` recomputes the ordered
//! device list from the host environment on every call instead of caching it,
//! so a hot redeploy of devices between requests can never desync it (see
//! `NodeSource`). Only the per-request snapshot is memoized, never across
//! requests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::runtime::TaskSpawner;

/// A single registered device record as provided by the host environment.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Host-assigned device id. Opaque to the registry.
    pub id: String,
    /// Free-text device name. Not yet HTML-sanitized; callers sanitize at
    /// the wire boundary (see `crate::sanitize::strip_html`).
    pub name: String,
}

/// A live device handler capable of receiving a `SemanticEvent`.
#[async_trait]
pub trait DeviceSink: Send + Sync {
    /// Delivers an event to the device. Errors are logged by the dispatch
    /// core and never surfaced to the HTTP caller.
    async fn receive(&self, event: crate::dispatch::SemanticEvent);
}

/// Host-environment interface backing the registry.
///
/// Implementors must be safe for concurrent iteration - the registry treats
/// this as read-only and may call `iterate_nodes` from many HTTP handlers at
/// once.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Enumerates every record bound to this hub, in host iteration order.
    async fn iterate_nodes(&self) -> Vec<NodeRecord>;

    /// Returns the live sink for a device id, or `None` if it is not
    /// currently reachable.
    async fn get_sink(&self, id: &str) -> Option<Arc<dyn DeviceSink>>;
}

/// A device entry as returned by `listDevices`, carrying its derived index
/// and `uniqueid`.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub device_id: String,
    pub name: String,
    pub index: usize,
    pub uniqueid: String,
}

/// The Device Registry view over a single hub's devices.
pub struct DeviceRegistry {
    hub_id: String,
    source: Arc<dyn NodeSource>,
}

impl DeviceRegistry {
    /// Creates a registry view for a hub backed by the given node source.
    #[must_use]
    pub fn new(hub_id: String, source: Arc<dyn NodeSource>) -> Self {
        Self { hub_id, source }
    }

    /// Builds the synthetic `uniqueid` for an index: `H0:H1:H2:H3:H4:H5:H6:II-01`,
    /// where each `Hn` is a 4-character slice of `hubId` and `II` is the
    /// two-hex-digit lowercase index.
    fn build_uniqueid(hub_id: &str, index: usize) -> String {
        let padded: String = if hub_id.len() >= 28 {
            hub_id.chars().take(28).collect()
        } else {
            format!("{hub_id:0<28}")
        };
        let slices: Vec<&str> = (0..7).map(|i| &padded[i * 4..i * 4 + 4]).collect();
        format!("{}-{index:02x}", slices.join(":"))
    }

    /// Enumerates every device bound to this hub, attaching a 1-based,
    /// contiguous `index` and a derived `uniqueid` to each.
    pub async fn list_devices(&self) -> Vec<RegistryEntry> {
        self.source
            .iterate_nodes()
            .await
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let index = i + 1;
                RegistryEntry {
                    device_id: record.id,
                    name: record.name,
                    index,
                    uniqueid: Self::build_uniqueid(&self.hub_id, index),
                }
            })
            .collect()
    }

    /// Resolves a token to a `deviceId`. Accepts the raw id, the synthetic
    /// `uniqueid`, or the numeric index as a string. If `token` matches both
    /// a raw id and an index string, the raw id wins.
    pub async fn resolve(&self, token: &str) -> Option<String> {
        let entries = self.list_devices().await;

        if let Some(entry) = entries.iter().find(|e| e.device_id == token) {
            return Some(entry.device_id.clone());
        }
        if let Some(entry) = entries.iter().find(|e| e.uniqueid == token) {
            return Some(entry.device_id.clone());
        }
        if let Ok(idx) = token.parse::<usize>() {
            if let Some(entry) = entries.iter().find(|e| e.index == idx) {
                return Some(entry.device_id.clone());
            }
        }
        None
    }

    /// Returns the live sink for a resolved device id.
    pub async fn sink(&self, device_id: &str) -> Option<Arc<dyn DeviceSink>> {
        self.source.get_sink(device_id).await
    }
}

/// An in-memory `NodeSource` suitable for tests and for hosting environments
/// that manage device records directly in process (no external flow engine).
#[derive(Default)]
pub struct InMemoryNodeSource {
    nodes: parking_lot::RwLock<Vec<NodeRecord>>,
    sinks: dashmap::DashMap<String, Arc<dyn DeviceSink>>,
}

impl InMemoryNodeSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device record and its sink.
    pub fn register(&self, record: NodeRecord, sink: Arc<dyn DeviceSink>) {
        self.sinks.insert(record.id.clone(), sink);
        self.nodes.write().push(record);
    }

    /// Removes a device by id.
    pub fn remove(&self, id: &str) {
        self.nodes.write().retain(|n| n.id != id);
        self.sinks.remove(id);
    }
}

#[async_trait]
impl NodeSource for InMemoryNodeSource {
    async fn iterate_nodes(&self) -> Vec<NodeRecord> {
        self.nodes.read().clone()
    }

    async fn get_sink(&self, id: &str) -> Option<Arc<dyn DeviceSink>> {
        self.sinks.get(id).map(|r| r.clone())
    }
}

/// A `DeviceSink` that records received events, for tests.
#[derive(Default)]
pub struct RecordingSink {
    pub events: parking_lot::Mutex<Vec<crate::dispatch::SemanticEvent>>,
}

#[async_trait]
impl DeviceSink for RecordingSink {
    async fn receive(&self, event: crate::dispatch::SemanticEvent) {
        self.events.lock().push(event);
    }
}

/// Task-spawning wrapper that delegates to an inner sink on a background
/// task, so that slow or blocking sinks never stall the HTTP handler that
/// triggered delivery.
pub struct AsyncSink<S: TaskSpawner> {
    inner: Arc<dyn DeviceSink>,
    spawner: Arc<S>,
}

impl<S: TaskSpawner + 'static> AsyncSink<S> {
    /// Wraps `inner` so that `receive` hands off to `spawner` instead of
    /// awaiting directly.
    #[must_use]
    pub fn new(inner: Arc<dyn DeviceSink>, spawner: Arc<S>) -> Self {
        Self { inner, spawner }
    }
}

#[async_trait]
impl<S: TaskSpawner + 'static> DeviceSink for AsyncSink<S> {
    async fn receive(&self, event: crate::dispatch::SemanticEvent) {
        let inner = self.inner.clone();
        self.spawner.spawn(async move {
            inner.receive(event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SemanticEvent;

    fn source_with(n: usize) -> Arc<InMemoryNodeSource> {
        let source = Arc::new(InMemoryNodeSource::new());
        for i in 0..n {
            source.register(
                NodeRecord {
                    id: format!("d{i}"),
                    name: format!("Device {i}"),
                },
                Arc::new(RecordingSink::default()),
            );
        }
        source
    }

    #[tokio::test]
    async fn list_devices_assigns_contiguous_one_based_indices() {
        let source = source_with(3);
        let registry = DeviceRegistry::new("0123456789abcdef01234567".into(), source);
        let entries = registry.list_devices().await;
        assert_eq!(entries.len(), 3);
        let indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn uniqueid_is_deterministic_per_hub_and_index() {
        let source = source_with(1);
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);
        let entries = registry.list_devices().await;
        let uniqueid = &entries[0].uniqueid;
        assert!(uniqueid.ends_with("-01"));
        assert_eq!(uniqueid.matches(':').count(), 6);
    }

    #[tokio::test]
    async fn resolve_accepts_raw_id_uniqueid_or_index() {
        let source = source_with(2);
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);
        let entries = registry.list_devices().await;

        assert_eq!(registry.resolve("d0").await, Some("d0".into()));
        assert_eq!(
            registry.resolve(&entries[1].uniqueid).await,
            Some("d1".into())
        );
        assert_eq!(registry.resolve("2").await, Some("d1".into()));
        assert_eq!(registry.resolve("ghost").await, None);
    }

    #[tokio::test]
    async fn resolve_prefers_raw_id_over_index_on_collision() {
        let source = Arc::new(InMemoryNodeSource::new());
        source.register(
            NodeRecord {
                id: "1".into(),
                name: "Colliding device".into(),
            },
            Arc::new(RecordingSink::default()),
        );
        source.register(
            NodeRecord {
                id: "other".into(),
                name: "Second".into(),
            },
            Arc::new(RecordingSink::default()),
        );
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);
        // Index 1 would also match token "1", but the raw id must win.
        assert_eq!(registry.resolve("1").await, Some("1".into()));
    }

    #[tokio::test]
    async fn sink_lookup_returns_none_for_unknown_device() {
        let source = source_with(1);
        let registry = DeviceRegistry::new("001788fffe123456".into(), source);
        assert!(registry.sink("ghost").await.is_none());
        assert!(registry.sink("d0").await.is_some());
    }

    #[tokio::test]
    async fn async_sink_hands_off_to_spawner_without_blocking() {
        let recording = Arc::new(RecordingSink::default());
        let spawner = Arc::new(crate::runtime::TokioSpawner::current());
        let wrapped = AsyncSink::new(recording.clone(), spawner);

        wrapped.receive(SemanticEvent::Power(true)).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(recording.events.lock().len(), 1);
    }
}
