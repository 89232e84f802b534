//! Name-keyed registry of published values.

use std::any::type_name;
use std::io::Write;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use simloop_core::Signal;
use tracing::warn;

use crate::codec::{decode_records, encode_record};
use crate::error::RegistryError;
use crate::value::{OpaqueEntry, Pod, PodEntry, RegistryEntry};

/// Description of one entry, as returned by [`Registry::entry_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    /// Name of the stored Rust type.
    pub type_tag: &'static str,
    /// Size in bytes.
    pub size: usize,
    /// Whether the entry takes part in snapshots.
    pub is_pod: bool,
}

/// Outcome of [`Registry::restore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Records written into a matching entry.
    pub applied: usize,
    /// Records with no entry of the same name and size.
    pub skipped: usize,
}

/// Name-keyed map of shared values with binary snapshots and a JSON view.
///
/// Entries keep their insertion order; re-publishing a name replaces the
/// entry in place. Snapshots follow that order, so two registries
/// populated in the same order produce byte-identical snapshots.
///
/// The registry is internally synchronized and meant to be shared as
/// `Arc<Registry>` between the components that publish into it and the
/// recorder that captures it.
///
/// # Examples
///
/// ```
/// use simloop_core::Signal;
/// use simloop_registry::Registry;
///
/// let registry = Registry::new();
/// let speed = Signal::new(12.0_f64);
/// registry.publish("ego.speed", &speed);
///
/// let snapshot = registry.capture();
/// speed.set(0.0);
/// registry.restore(&snapshot).unwrap();
/// assert_eq!(speed.get(), 12.0);
/// assert_eq!(registry.get::<f64>("ego.speed").unwrap().get(), 12.0);
/// ```
#[derive(Default)]
pub struct Registry {
    entries: RwLock<IndexMap<String, Box<dyn RegistryEntry>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot-capable value under `name`, replacing any
    /// existing entry of that name.
    pub fn publish<T: Pod>(&self, name: impl Into<String>, signal: &Signal<T>) {
        self.insert(name.into(), Box::new(PodEntry::new(signal.clone())));
    }

    /// Publish a value that is reachable by typed lookup and shown in the
    /// JSON view as a placeholder, but excluded from snapshots.
    pub fn publish_opaque<T: Send + 'static>(&self, name: impl Into<String>, signal: &Signal<T>) {
        self.insert(name.into(), Box::new(OpaqueEntry::new(signal.clone())));
    }

    /// Publish a custom entry implementation.
    pub fn publish_entry(&self, name: impl Into<String>, entry: Box<dyn RegistryEntry>) {
        self.insert(name.into(), entry);
    }

    fn insert(&self, name: String, entry: Box<dyn RegistryEntry>) {
        self.entries.write().insert(name, entry);
    }

    /// Typed handle to the value published under `name`.
    pub fn get<T: Send + 'static>(&self, name: &str) -> Result<Signal<T>, RegistryError> {
        let entries = self.entries.read();
        let entry = entries.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        entry
            .signal_any()
            .downcast_ref::<Signal<T>>()
            .cloned()
            .ok_or_else(|| RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
                found: entry.type_tag(),
            })
    }

    /// Whether an entry named `name` exists.
    pub fn has(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Type, size and POD flag of the entry named `name`.
    pub fn entry_info(&self, name: &str) -> Option<EntryInfo> {
        self.entries.read().get(name).map(|e| EntryInfo {
            type_tag: e.type_tag(),
            size: e.size(),
            is_pod: e.is_pod(),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entry names in iteration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Remove an entry, keeping the order of the others. Returns whether
    /// it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().shift_remove(name).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    // ── Snapshots ───────────────────────────────────────────────

    /// Binary snapshot of every POD entry, in iteration order.
    pub fn capture(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.capture_into(&mut buf);
        buf
    }

    /// Append a snapshot to `buf`.
    pub fn capture_into(&self, buf: &mut Vec<u8>) {
        let entries = self.entries.read();
        for (name, entry) in entries.iter().filter(|(_, e)| e.is_pod()) {
            encode_record(buf, name, entry.size() as u32, |b| entry.read_into(b));
        }
    }

    /// Overwrite entries from a snapshot.
    ///
    /// A record is applied when a POD entry of the same name and byte size
    /// exists, and skipped otherwise. The whole buffer is parsed before
    /// anything is written, so a truncated buffer is rejected with
    /// [`RegistryError::Truncated`] and leaves every value untouched.
    pub fn restore(&self, snapshot: &[u8]) -> Result<RestoreReport, RegistryError> {
        let records = decode_records(snapshot)?;
        let entries = self.entries.read();
        let mut report = RestoreReport::default();
        for record in records {
            let applied = std::str::from_utf8(record.name)
                .ok()
                .and_then(|name| entries.get(name))
                .is_some_and(|entry| entry.is_pod() && entry.write_from(record.data));
            if applied {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }
        if report.skipped > 0 {
            warn!(
                applied = report.applied,
                skipped = report.skipped,
                "restore skipped unmatched records"
            );
        }
        Ok(report)
    }

    // ── JSON ────────────────────────────────────────────────────

    /// JSON object mapping every name to its value or placeholder.
    pub fn to_json(&self) -> Value {
        let entries = self.entries.read();
        let map: Map<String, Value> = entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Write the JSON view to `w`.
    pub fn stream_to_json(&self, w: &mut dyn Write) -> Result<(), RegistryError> {
        serde_json::to_writer(w, &self.to_json())?;
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_unknown_name_fails() {
        let r = Registry::new();
        assert!(matches!(
            r.get::<f64>("missing"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn get_with_wrong_type_fails() {
        let r = Registry::new();
        r.publish("n", &Signal::new(1i32));
        match r.get::<f64>("n") {
            Err(RegistryError::TypeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, type_name::<f64>());
                assert_eq!(found, type_name::<i32>());
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn get_is_write_through() {
        let r = Registry::new();
        let v = Signal::new(1.0f64);
        r.publish("v", &v);
        r.get::<f64>("v").unwrap().set(42.0);
        assert_eq!(v.get(), 42.0);
    }

    #[test]
    fn republish_replaces_in_place() {
        let r = Registry::new();
        r.publish("a", &Signal::new(1.0f64));
        r.publish("b", &Signal::new(2.0f64));
        r.publish("a", &Signal::new(7u32));
        assert_eq!(r.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get::<u32>("a").unwrap().get(), 7);
    }

    #[test]
    fn remove_keeps_order() {
        let r = Registry::new();
        for name in ["a", "b", "c"] {
            r.publish(name, &Signal::new(0u8));
        }
        assert!(r.remove("b"));
        assert!(!r.remove("b"));
        assert_eq!(r.names(), vec!["a".to_string(), "c".to_string()]);
        r.clear();
        assert!(r.is_empty());
    }

    #[test]
    fn non_pod_entries_are_not_captured() {
        let r = Registry::new();
        let pod = Signal::new(5.0f64);
        let opaque = Signal::new(vec![1.0f64, 2.0, 3.0]);
        r.publish("pod", &pod);
        r.publish_opaque("opaque", &opaque);

        let snap = r.capture();
        pod.set(99.0);
        opaque.set(vec![9.0]);
        let report = r.restore(&snap).unwrap();

        assert_eq!(report, RestoreReport { applied: 1, skipped: 0 });
        assert_eq!(pod.get(), 5.0);
        assert_eq!(opaque.with(|v| v.clone()), vec![9.0]);
        assert_eq!(r.get::<Vec<f64>>("opaque").unwrap().with(|v| v.len()), 1);
    }

    #[test]
    fn entry_info_describes_entries() {
        let r = Registry::new();
        r.publish("flag", &Signal::new(false));
        r.publish_opaque("label", &Signal::new(String::from("x")));
        let flag = r.entry_info("flag").unwrap();
        assert_eq!((flag.size, flag.is_pod), (1, true));
        assert!(!r.entry_info("label").unwrap().is_pod);
        assert!(r.entry_info("nope").is_none());
    }

    #[test]
    fn restore_skips_size_mismatch() {
        let source = Registry::new();
        source.publish("x", &Signal::new(1.0f64));
        let snap = source.capture();

        let target = Registry::new();
        let x = Signal::new(3.0f32);
        target.publish("x", &x);
        let report = target.restore(&snap).unwrap();
        assert_eq!(report, RestoreReport { applied: 0, skipped: 1 });
        assert_eq!(x.get(), 3.0);
    }

    #[test]
    fn truncated_restore_changes_nothing() {
        let r = Registry::new();
        let a = Signal::new(1.0f64);
        let b = Signal::new(2.0f64);
        r.publish("a", &a);
        r.publish("b", &b);
        let mut snap = r.capture();
        snap.pop();

        a.set(10.0);
        b.set(20.0);
        assert!(matches!(
            r.restore(&snap),
            Err(RegistryError::Truncated { .. })
        ));
        assert_eq!((a.get(), b.get()), (10.0, 20.0));
    }

    #[test]
    fn json_view_preserves_insertion_order() {
        let r = Registry::new();
        r.publish("z", &Signal::new(1.5f64));
        r.publish("a", &Signal::new(-3i64));
        r.publish("m", &Signal::new(true));
        let mut out = Vec::new();
        r.stream_to_json(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"z":1.5,"a":-3,"m":true}"#);
    }
}
