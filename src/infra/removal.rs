//! Maps runtime error text to a [`RemoveError`].
//!
//! Neither docker nor podman exposes structured error codes on the CLI, so the
//! classification matches substrings of the (English) error message. All of
//! that matching lives here.

use crate::domain::{RemoveError, ResourceType};

const DEPENDENCY_SIGNATURES: [&str; 3] = [
    "dependent",
    "has dependent child images",
    "image is being used",
];

pub fn classify(kind: ResourceType, message: &str) -> RemoveError {
    let message = message.trim().to_string();
    if is_already_removed(kind, &message) {
        RemoveError::AlreadyRemoved(message)
    } else if kind == ResourceType::Image && is_dependency_conflict(&message) {
        RemoveError::Dependency(message)
    } else {
        RemoveError::Failed(message)
    }
}

/// The resource disappeared between analysis and removal.
pub fn is_already_removed(kind: ResourceType, message: &str) -> bool {
    let lower = message.to_lowercase();

    let missing = lower.contains("not found") || lower.contains("no such");
    if missing && lower.contains(kind.as_str()) {
        return true;
    }

    kind == ResourceType::Image && lower.contains("image not known")
}

/// Another image still references this one as its parent.
pub fn is_dependency_conflict(message: &str) -> bool {
    let lower = message.to_lowercase();
    DEPENDENCY_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resources_are_already_removed() {
        assert!(is_already_removed(
            ResourceType::Container,
            "Error response from daemon: No such container: c1"
        ));
        assert!(is_already_removed(
            ResourceType::Volume,
            "Error: no such volume data"
        ));
        assert!(is_already_removed(
            ResourceType::Network,
            "network web not found"
        ));
        assert!(is_already_removed(
            ResourceType::Image,
            "Error: abc: image not known"
        ));
    }

    #[test]
    fn missing_message_must_name_the_kind() {
        assert!(!is_already_removed(
            ResourceType::Volume,
            "No such container: c1"
        ));
        assert!(!is_already_removed(
            ResourceType::Container,
            "image not known"
        ));
    }

    #[test]
    fn dependency_conflicts_only_defer_images() {
        let msg = "conflict: unable to delete abc (cannot be forced) - image has dependent child images";
        assert_eq!(
            classify(ResourceType::Image, msg),
            RemoveError::Dependency(msg.to_string())
        );
        assert!(matches!(
            classify(ResourceType::Volume, "volume has dependent data"),
            RemoveError::Failed(_)
        ));
    }

    #[test]
    fn other_failures_are_recorded() {
        assert_eq!(
            classify(ResourceType::Container, " permission denied \n"),
            RemoveError::Failed("permission denied".to_string())
        );
    }
}
