pub type JadeiteResult<T> = std::result::Result<T, JadeiteError>;

/// Error type returned by filters and loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructuralErrorKind {
    /// A self-closed tag was given text content.
    SelfClosingContent { tag: String },
    UnknownFilter { name: String, is_ast_filter: bool },
    /// An absolute include path without a configured base directory.
    MissingBaseDir { path: String },
    /// A relative include path without a source filename to resolve against.
    MissingFilename { path: String },
    MissingInclude { path: String },
}

impl std::fmt::Display for StructuralErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfClosingContent { tag } => {
                write!(f, "{} is self closing and should not have content", tag)
            }
            Self::UnknownFilter {
                name,
                is_ast_filter,
            } => {
                if *is_ast_filter {
                    write!(f, "unknown ast filter \"{}\"", name)
                } else {
                    write!(f, "unknown filter \"{}\"", name)
                }
            }
            Self::MissingBaseDir { path } => {
                write!(f, "Include path '{}' requires basedir option to resolve", path)
            }
            Self::MissingFilename { path } => {
                write!(f, "Include path '{}' requires filename to resolve", path)
            }
            Self::MissingInclude { path } => {
                write!(f, "Include path '{}' does not exist", path)
            }
        }
    }
}

impl std::error::Error for StructuralErrorKind {}

/// A malformed or unresolvable node. Always fatal to the current compile.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralError {
    /// Kind of the offending node, see [`crate::Node::kind`].
    pub node: String,
    pub kind: StructuralErrorKind,
}

impl std::fmt::Display for StructuralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Structural error in {} node: {}", self.node, self.kind)
    }
}

impl std::error::Error for StructuralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum JadeiteError {
    Structural(StructuralError),
    /// A filter failed. The filter's own error is reported unchanged.
    Filter { name: String, source: BoxError },
    /// The template loader failed to read or parse an include.
    Loader { path: String, source: BoxError },
}

impl JadeiteError {
    pub(crate) fn structural(node: &str, kind: StructuralErrorKind) -> Self {
        Self::Structural(StructuralError {
            node: node.to_string(),
            kind,
        })
    }

    /// The structural error kind, if this is a structural error.
    pub const fn structural_kind(&self) -> Option<&StructuralErrorKind> {
        match self {
            Self::Structural(error) => Some(&error.kind),
            Self::Filter { .. } | Self::Loader { .. } => None,
        }
    }
}

impl std::fmt::Display for JadeiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structural(error) => write!(f, "{}", error),
            Self::Filter { source, .. } => write!(f, "{}", source),
            Self::Loader { path, source } => {
                write!(f, "Failed to load '{}': {}", path, source)
            }
        }
    }
}

impl std::error::Error for JadeiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Structural(error) => Some(error),
            Self::Filter { source, .. } | Self::Loader { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<StructuralError> for JadeiteError {
    fn from(error: StructuralError) -> Self {
        Self::Structural(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ntest::timeout(100)]
    fn test_filter_error_is_reported_unchanged() {
        let error = JadeiteError::Filter {
            name: "markdown".to_string(),
            source: "bad heading on line 3".into(),
        };
        assert_eq!(error.to_string(), "bad heading on line 3");
        assert!(error.structural_kind().is_none());
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "bad heading on line 3");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_structural_error_names_node() {
        let error = JadeiteError::structural(
            "tag",
            StructuralErrorKind::SelfClosingContent {
                tag: "br".to_string(),
            },
        );
        assert_eq!(
            error.to_string(),
            "Structural error in tag node: br is self closing and should not have content"
        );
    }
}
