//! Page-session identity and a wall clock that works on wasm32.

use std::fmt;

use serde::Serialize;

/// Identifies one page load; every log line from that page carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new session ID.
    pub fn generate() -> Self {
        Self(format!("{:x}-{:08x}", now_ms() as u64, random_u32()))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch.
///
/// `std::time::SystemTime` panics on `wasm32-unknown-unknown`, so the browser
/// build reads `Date.now()` instead.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn random_u32() -> u32 {
    (js_sys::Math::random() * f64::from(u32::MAX)) as u32
}

#[cfg(not(target_arch = "wasm32"))]
fn random_u32() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    // xorshift over a process-wide counter; uniqueness, not secrecy.
    static COUNTER: AtomicU32 = AtomicU32::new(0x9e37_79b9);
    let mut x = COUNTER.fetch_add(0x6d2b_79f5, Ordering::Relaxed);
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}
