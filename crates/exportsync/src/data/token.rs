use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one logical request.
///
/// Attaching the same token twice to an in-flight key registers it once.
/// Tokens are unique for the lifetime of the process; copy one to present
/// the same identity again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaiterToken(u64);

impl WaiterToken {
    pub fn new() -> Self { Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)) }
}

impl Default for WaiterToken {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for WaiterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "waiter-{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct_and_copyable() {
        let a = WaiterToken::new();
        let b = WaiterToken::new();
        let a_again = a;
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
