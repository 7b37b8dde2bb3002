//! Inbound contract: what arrives with every tool invocation.

/// Per-conversation context carried alongside every tool call.
///
/// Runtime caches (combat engines, world managers) are keyed by
/// `session_id:entity_id`, isolating concurrent conversations over the same
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    /// Key a runtime cache entry for this session.
    pub fn scoped_key(&self, entity_id: impl std::fmt::Display) -> String {
        format!("{}:{entity_id}", self.session_id)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_key() {
        let ctx = SessionContext::new("s1");
        assert_eq!(ctx.scoped_key("e42"), "s1:e42");
    }
}
