//! Type-erased registry entries.
//!
//! A registry entry wraps a [`Signal`] handle and exposes its size, type
//! tag, byte encoding and JSON projection through the object-safe
//! [`RegistryEntry`] trait. Plain-old-data values implement [`Pod`] and
//! take part in snapshots; anything else can be published as an opaque
//! entry that is only reachable by typed lookup.

use std::any::{type_name, Any};
use std::mem::size_of;

use serde_json::Value;
use simloop_core::Signal;

/// A value with a fixed-size little-endian byte encoding.
///
/// Implemented for the primitive numeric types, `bool` (one byte), and
/// fixed-size arrays of `Pod` values. Implement it for plain structs by
/// encoding their fields back to back.
///
/// # Examples
///
/// ```
/// use simloop_registry::Pod;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Pose { x: f64, y: f64 }
///
/// impl Pod for Pose {
///     const SIZE: usize = 16;
///     fn encode(&self, out: &mut [u8]) {
///         self.x.encode(&mut out[..8]);
///         self.y.encode(&mut out[8..]);
///     }
///     fn decode(bytes: &[u8]) -> Self {
///         Pose { x: f64::decode(&bytes[..8]), y: f64::decode(&bytes[8..]) }
///     }
/// }
///
/// let mut buf = [0u8; Pose::SIZE];
/// Pose { x: 1.0, y: -2.0 }.encode(&mut buf);
/// assert_eq!(Pose::decode(&buf), Pose { x: 1.0, y: -2.0 });
/// ```
pub trait Pod: Sized + Send + 'static {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write the encoding into `out`, which is exactly `SIZE` bytes long.
    fn encode(&self, out: &mut [u8]);

    /// Decode from `bytes`, which is exactly `SIZE` bytes long.
    fn decode(bytes: &[u8]) -> Self;

    /// JSON rendering, or `None` to render as an opaque placeholder.
    fn to_json(&self) -> Option<Value> {
        None
    }
}

macro_rules! impl_pod_numeric {
    ($($t:ty => $json:expr),* $(,)?) => {$(
        impl Pod for $t {
            const SIZE: usize = size_of::<$t>();

            fn encode(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn decode(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_le_bytes(raw)
            }

            fn to_json(&self) -> Option<Value> {
                let render: fn(&$t) -> Option<Value> = $json;
                render(self)
            }
        }
    )*};
}

impl_pod_numeric! {
    f64 => |v| Some(Value::from(*v)),
    f32 => |v| Some(Value::from(*v)),
    i32 => |v| Some(Value::from(*v)),
    u32 => |v| Some(Value::from(*v)),
    i64 => |v| Some(Value::from(*v)),
    u64 => |v| Some(Value::from(*v)),
    i8 => |_| None,
    u8 => |_| None,
    i16 => |_| None,
    u16 => |_| None,
}

impl Pod for bool {
    const SIZE: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn to_json(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }
}

impl<T: Pod, const N: usize> Pod for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn encode(&self, out: &mut [u8]) {
        for (item, chunk) in self.iter().zip(out.chunks_exact_mut(T::SIZE.max(1))) {
            item.encode(chunk);
        }
    }

    fn decode(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| T::decode(&bytes[i * T::SIZE..(i + 1) * T::SIZE]))
    }
}

// ── Entries ─────────────────────────────────────────────────────

/// Object-safe view of one published value.
pub trait RegistryEntry: Send + Sync {
    /// Name of the stored Rust type.
    fn type_tag(&self) -> &'static str;

    /// Size of the value in bytes (its encoded size for POD entries).
    fn size(&self) -> usize;

    /// Whether the value takes part in snapshots.
    fn is_pod(&self) -> bool;

    /// Append the encoding to `out`. No-op for non-POD entries.
    fn read_into(&self, out: &mut Vec<u8>);

    /// Overwrite the value from `bytes`. Returns `false` and leaves the
    /// value untouched if the entry is not POD or the length differs.
    fn write_from(&self, bytes: &[u8]) -> bool;

    /// JSON rendering: the value for recognized scalars, otherwise a
    /// `"<type:N bytes>"` placeholder string.
    fn to_json(&self) -> Value;

    /// The underlying `Signal<T>`, for typed lookup.
    fn signal_any(&self) -> &dyn Any;
}

fn placeholder(type_tag: &str, size: usize) -> Value {
    Value::String(format!("<{type_tag}:{size} bytes>"))
}

/// Entry for a [`Pod`] value.
pub(crate) struct PodEntry<T: Pod> {
    signal: Signal<T>,
}

impl<T: Pod> PodEntry<T> {
    pub(crate) fn new(signal: Signal<T>) -> Self {
        Self { signal }
    }
}

impl<T: Pod> RegistryEntry for PodEntry<T> {
    fn type_tag(&self) -> &'static str {
        type_name::<T>()
    }

    fn size(&self) -> usize {
        T::SIZE
    }

    fn is_pod(&self) -> bool {
        true
    }

    fn read_into(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + T::SIZE, 0);
        self.signal.with(|v| v.encode(&mut out[start..]));
    }

    fn write_from(&self, bytes: &[u8]) -> bool {
        if bytes.len() != T::SIZE {
            return false;
        }
        self.signal.set(T::decode(bytes));
        true
    }

    fn to_json(&self) -> Value {
        self.signal
            .with(|v| v.to_json())
            .unwrap_or_else(|| placeholder(self.type_tag(), T::SIZE))
    }

    fn signal_any(&self) -> &dyn Any {
        &self.signal
    }
}

/// Entry for a value without a byte encoding.
pub(crate) struct OpaqueEntry<T> {
    signal: Signal<T>,
}

impl<T: Send + 'static> OpaqueEntry<T> {
    pub(crate) fn new(signal: Signal<T>) -> Self {
        Self { signal }
    }
}

impl<T: Send + 'static> RegistryEntry for OpaqueEntry<T> {
    fn type_tag(&self) -> &'static str {
        type_name::<T>()
    }

    fn size(&self) -> usize {
        size_of::<T>()
    }

    fn is_pod(&self) -> bool {
        false
    }

    fn read_into(&self, _out: &mut Vec<u8>) {}

    fn write_from(&self, _bytes: &[u8]) -> bool {
        false
    }

    fn to_json(&self) -> Value {
        placeholder(self.type_tag(), self.size())
    }

    fn signal_any(&self) -> &dyn Any {
        &self.signal
    }
}
