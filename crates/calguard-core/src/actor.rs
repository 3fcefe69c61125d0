/// Authenticated identity attempting a creation.
///
/// Resolved once per check and never persisted by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor {
    uid: String,
}

impl Actor {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    /// Stable unique identifier.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Principal-namespaced owner key used for collection accounting.
    pub fn owner_key(&self) -> String {
        format!("{}{}", crate::limits::PRINCIPAL_PREFIX, self.uid)
    }
}
