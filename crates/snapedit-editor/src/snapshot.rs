//! Serialized scene snapshots.

use crate::scene::SceneObject;
use serde::{Deserialize, Serialize};
use snapedit_core::SceneError;
use std::sync::Arc;

const DOCUMENT_VERSION: u32 = 1;

/// On-disk form of a scene: canvas size plus user content in z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: u32,
    pub width: f64,
    pub height: f64,
    pub objects: Vec<SceneObject>,
}

impl SceneDocument {
    pub fn new(width: f64, height: f64, objects: Vec<SceneObject>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            width,
            height,
            objects,
        }
    }
}

/// An immutable, self-describing serialization of a scene.
///
/// Two snapshots are equal when their serialized text is equal. Cloning
/// shares the underlying text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    pub fn encode(document: &SceneDocument) -> Result<Self, SceneError> {
        let json = serde_json::to_string(document).map_err(|e| SceneError::Serialize {
            reason: e.to_string(),
        })?;
        Ok(Self(json.into()))
    }

    pub fn decode(&self) -> Result<SceneDocument, SceneError> {
        let document: SceneDocument =
            serde_json::from_str(&self.0).map_err(|e| SceneError::Deserialize {
                reason: e.to_string(),
            })?;
        if document.version > DOCUMENT_VERSION {
            return Err(SceneError::Deserialize {
                reason: format!("unsupported document version {}", document.version),
            });
        }
        Ok(document)
    }

    /// Wraps previously serialized text without validating it.
    pub fn from_json(json: impl Into<Arc<str>>) -> Self {
        Self(json.into())
    }

    pub fn as_json(&self) -> &str {
        &self.0
    }

    /// Size of the serialized form in bytes.
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Snapshot({} bytes)", self.byte_len())
    }
}
