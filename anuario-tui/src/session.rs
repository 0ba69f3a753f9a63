//! Authenticated session state.

/// Bearer session handed to every write operation.
///
/// The token is opaque and sent verbatim in the `Authorization` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(token: impl Into<String>, username: Option<String>) -> Self {
        Self {
            token: Some(token.into()),
            username,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.username = None;
    }

    /// Token prefix safe to write to logs.
    pub fn redacted(&self) -> String {
        match self.token() {
            Some(token) => {
                let prefix: String = token.chars().take(8).collect();
                format!("{}...", prefix)
            }
            None => "none".to_string(),
        }
    }
}
