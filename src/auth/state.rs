//! State parameter for the consent URL.
//!
//! The consent flow sends a random nonce as the `state` query parameter and
//! checks it when the landing URL echoes it back.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;

/// A random nonce carried through the consent flow.
///
/// # Example
///
/// ```rust
/// use ebay_rest::auth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 32);
/// assert!(state.matches(state.as_ref()));
/// assert!(!state.matches("forged"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StateParam {
    value: String,
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    const NONCE_LENGTH: usize = 32;

    /// Creates a state parameter from a cryptographically secure random nonce.
    #[must_use]
    pub fn new() -> Self {
        let value = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();
        Self { value }
    }

    /// Compares `received` against this state in constant time.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        self.value.as_bytes().ct_eq(received.as_bytes()).into()
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateParam(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_alphanumeric_nonce() {
        let state = StateParam::new();
        assert_eq!(state.as_ref().len(), 32);
        assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_nonces_differ() {
        assert_ne!(StateParam::new(), StateParam::new());
    }

    #[test]
    fn test_matches_rejects_prefix() {
        let state = StateParam::new();
        assert!(!state.matches(&state.as_ref()[..10]));
        assert!(!state.matches(""));
    }
}
