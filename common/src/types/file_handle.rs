use serde::{Deserialize, Serialize};

/// Identifier pair minted by the AI provider after a successful upload.
/// This is the only state that survives between pipeline stages, and it
/// lives with the caller, not the server. Treated as an opaque token:
/// nothing here inspects it beyond field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub file_id: String,
    pub file_uri: String,
}

impl FileHandle {
    /// Structural check only; whether the provider still recognizes the
    /// handle is discovered at query time.
    pub fn is_well_formed(&self) -> bool {
        !self.file_id.trim().is_empty() && !self.file_uri.trim().is_empty()
    }
}
