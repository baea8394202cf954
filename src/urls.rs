use url::{ParseError, Url};

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path for all feedback-related actions.
    pub(crate) feedback_path: String,

    /// Prefix for all feedback-related actions.
    feedback_prefix: String,
}

impl Urls {
    /// Create a new instance. `feedback_path` should *not* include a
    /// trailing slash.
    pub fn new(base: impl AsRef<str>, feedback_path: impl Into<String>) -> Result<Self, ParseError> {
        let base = Url::parse(base.as_ref())?;
        let feedback_path = feedback_path.into();
        let feedback_prefix = format!("{}/", feedback_path);

        Ok(Urls {
            base,
            feedback_path,
            feedback_prefix,
        })
    }

    pub fn feedback_list(&self) -> Result<Url, ParseError> {
        self.base.join(&self.feedback_prefix)
    }

    /// The URL of a single record. The ID is percent-encoded, so any
    /// caller-supplied ID yields a single path segment.
    pub fn feedback(&self, id: &str) -> Result<Url, ParseError> {
        self.feedback_list()?
            .join(&format!("id/{}", urlencoding::encode(id)))
    }
}
