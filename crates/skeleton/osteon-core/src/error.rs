//! Error types for loading skeletons and driving a runtime.

use serde::{Deserialize, Serialize};

/// Failure to build a skeleton from its document and atlas.
///
/// Fatal to the load attempt: the runtime stays unconfigured.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Skeleton document not found: {name}")]
    MissingSkeleton { name: String },

    #[error("Atlas not found: {name}")]
    MissingAtlas { name: String },

    #[error("Malformed skeleton document: {reason}")]
    Parse { reason: String },

    #[error("Attachment '{attachment}' references region '{region}' missing from the atlas")]
    MissingRegion { attachment: String, region: String },

    #[error("Skin not found: {name}")]
    UnknownSkin { name: String },

    #[error("Bone not found: {name} (referenced by {referenced_by})")]
    UnknownBone { name: String, referenced_by: String },

    #[error("Bone '{bone}' must be declared after its parent '{parent}'")]
    BoneOrder { bone: String, parent: String },

    #[error("Slot not found: {name} (referenced by {referenced_by})")]
    UnknownSlot { name: String, referenced_by: String },

    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: String, name: String },

    #[error("Invalid keyframes in {timeline}: {reason}")]
    InvalidKeyframes { timeline: String, reason: String },

    #[error("Invalid draw order in animation {animation}: {reason}")]
    InvalidDrawOrder { animation: String, reason: String },
}

impl LoadError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingSkeleton { .. } | Self::MissingAtlas { .. } => "asset",
            Self::Parse { .. } => "serialization",
            Self::MissingRegion { .. } => "atlas",
            Self::UnknownSkin { .. } => "skin",
            Self::UnknownBone { .. }
            | Self::BoneOrder { .. }
            | Self::UnknownSlot { .. }
            | Self::DuplicateName { .. } => "structure",
            Self::InvalidKeyframes { .. } | Self::InvalidDrawOrder { .. } => "timeline",
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

/// Rejected runtime request. The request is ignored and prior state is unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("No skeleton loaded")]
    NotLoaded,

    #[error("Skin not found: {name}")]
    UnknownSkin { name: String },

    #[error("Animation not found: {name}")]
    UnknownAnimation { name: String },

    #[error("Slot not found: {name}")]
    UnknownSlot { name: String },

    #[error("Attachment '{attachment}' not found for slot '{slot}' in any skin")]
    UnknownAttachment { slot: String, attachment: String },

    #[error("Atlas region not found: {name}")]
    UnknownRegion { name: String },
}

impl RuntimeError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotLoaded => "runtime",
            Self::UnknownSkin { .. } | Self::UnknownAttachment { .. } => "skin",
            Self::UnknownAnimation { .. } => "animation",
            Self::UnknownSlot { .. } => "slot",
            Self::UnknownRegion { .. } => "atlas",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_group_related_errors() {
        let e = LoadError::BoneOrder {
            bone: "arm".into(),
            parent: "torso".into(),
        };
        assert_eq!(e.category(), "structure");
        assert_eq!(
            RuntimeError::UnknownAnimation { name: "x".into() }.category(),
            "animation"
        );
    }

    #[test]
    fn serde_json_errors_become_parse_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(LoadError::from(err), LoadError::Parse { .. }));
    }

    #[test]
    fn messages_name_the_offender() {
        let e = RuntimeError::UnknownSkin {
            name: "golden".into(),
        };
        assert_eq!(e.to_string(), "Skin not found: golden");
    }
}
