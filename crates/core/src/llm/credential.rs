use std::fmt;
use std::sync::{Arc, RwLock};

/// Sample key shipped in deployment templates; never a real credential.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_PLACEHOLDER_IGNORE";

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Returns `None` for blank input and for [`PLACEHOLDER_API_KEY`].
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == PLACEHOLDER_API_KEY {
            return None;
        }
        Some(Self(Arc::from(value)))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Process-wide "current credential" slot shared by every assembler.
///
/// Readers take a snapshot once per call, so replacing the key affects the
/// next call only; requests already in flight keep the key they started with.
#[derive(Debug, Default)]
pub struct CredentialCell {
    current: RwLock<Option<Credential>>,
}

impl CredentialCell {
    pub fn new(initial: Option<&str>) -> Self {
        let cell = Self::default();
        cell.set(initial);
        cell
    }

    /// Replaces the stored credential. Returns whether the new state is usable.
    pub fn set(&self, value: Option<&str>) -> bool {
        let next = value.and_then(Credential::parse);
        let usable = next.is_some();
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;

        if usable {
            tracing::info!("API credential updated");
        } else {
            tracing::warn!("API credential cleared or blank; AI requests are disabled");
        }
        usable
    }

    pub fn current(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_usable(&self) -> bool {
        self.current().is_some()
    }
}
