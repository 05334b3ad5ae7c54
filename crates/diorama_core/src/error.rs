//! Error types for asset resolution, placement and section layouts

use std::io;
use thiserror::Error;

/// Error type for asset operations
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error (file not found, permission denied, etc.)
    #[error("Asset IO error: {0}")]
    Io(#[from] io::Error),
    /// Parse error (invalid file format, deserialization failure)
    #[error("Asset parse error: {0}")]
    Parse(String),
    /// No asset registered under this id
    #[error("Asset not found: {0}")]
    NotFound(String),
    /// An asset exists under this id but has a different kind
    #[error("Asset '{id}' is a {found} asset, expected {expected}")]
    WrongType {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<ron::error::SpannedError> for AssetError {
    fn from(err: ron::error::SpannedError) -> Self {
        AssetError::Parse(err.to_string())
    }
}

/// Error type for prop and structure placement
///
/// Every variant is a configuration error: the data describing a section is
/// wrong and the section cannot be built.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// A shape descriptor that cannot be expanded (zero counts, bad numbers)
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
    /// A prop template with impossible values (negative mass, NaN offsets)
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
    /// A visual, collision or texture id that does not resolve
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// The object registry is full
    #[error("Object capacity exceeded (limit {limit})")]
    CapacityExceeded { limit: usize },
}

/// Error type for loading and instantiating section layouts
#[derive(Debug, Error)]
pub enum LayoutError {
    /// IO error reading the layout file
    #[error("Layout IO error: {0}")]
    Io(#[from] io::Error),
    /// RON parse error
    #[error("Layout parse error: {0}")]
    Parse(String),
    /// A prop or wall in the layout could not be placed
    #[error("Layout placement failed: {0}")]
    Placement(#[from] PlacementError),
}

impl From<ron::error::SpannedError> for LayoutError {
    fn from(err: ron::error::SpannedError) -> Self {
        LayoutError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let msg = format!("{}", AssetError::Io(io_err));
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file missing"));
    }

    #[test]
    fn test_wrong_type_display() {
        let err = AssetError::WrongType {
            id: "brick".to_string(),
            expected: "texture",
            found: "visual",
        };
        let msg = err.to_string();
        assert!(msg.contains("brick"));
        assert!(msg.contains("texture"));
        assert!(msg.contains("visual"));
    }

    #[test]
    fn test_placement_wraps_asset_error() {
        let err: PlacementError = AssetError::NotFound("horn".to_string()).into();
        assert!(matches!(err, PlacementError::Asset(AssetError::NotFound(_))));
        // Transparent: the message is the asset error's own
        assert_eq!(err.to_string(), "Asset not found: horn");
    }

    #[test]
    fn test_error_source() {
        let asset_err = AssetError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(asset_err.source().is_some());
        assert!(AssetError::Parse("bad".to_string()).source().is_none());

        let layout_err = LayoutError::Placement(PlacementError::CapacityExceeded { limit: 3 });
        assert!(layout_err.source().is_some());
    }

    #[test]
    fn test_ron_error_converts_to_parse() {
        let err = ron::from_str::<u32>("not a number").unwrap_err();
        match LayoutError::from(err) {
            LayoutError::Parse(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Parse variant, got {:?}", other),
        }
    }
}
