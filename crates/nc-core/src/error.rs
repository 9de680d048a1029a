/// Errors from loading external descriptions (network specs, session files).
///
/// The interaction core itself has no error paths; degenerate gestures are no-ops.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("layer '{name}' is malformed: {reason}")]
    MalformedLayer { name: String, reason: String },
}
