use serde::Serialize;

/// A non-fatal message produced during a sync run.
///
/// The synchronizer never prints; it collects these into the
/// [`SyncReport`](crate::SyncReport) and the caller decides how to show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Feedback {
    /// Something was cleaned up or adjusted along the way.
    Info(String),
    /// The run continued, but the mirror may not look the way the caller expects.
    Warning(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_prefixed_when_displayed() {
        let duplicate = Feedback::warning("vog.fa.gz listed twice, keeping the first");
        assert!(duplicate.is_warning());
        assert_eq!(
            duplicate.to_string(),
            "warning: vog.fa.gz listed twice, keeping the first"
        );

        let cleanup = Feedback::info("removed listing artifact index.html");
        assert!(!cleanup.is_warning());
        assert_eq!(cleanup.to_string(), "removed listing artifact index.html");
    }

    #[test]
    fn serializes_with_level_tag() {
        let json = serde_json::to_string(&Feedback::warning("careful")).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"careful"}"#);
    }
}
