use miette::{Diagnostic, SourceSpan};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling a protocol schema into bindings
#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    /// IO error when reading or writing artifacts
    #[error("IO error: {0}")]
    #[diagnostic(code(protocol::io))]
    Io(#[from] io::Error),

    /// Failed to write one of the output artifacts
    #[error("Failed to write {}", path.display())]
    #[diagnostic(
        code(protocol::output),
        help("Check that the output directory exists and is writable")
    )]
    Output {
        /// Destination that could not be written
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Schema document is not valid JSON or does not have the expected shape
    #[error("Failed to parse protocol schema from {origin}")]
    #[diagnostic(
        code(protocol::parse_error),
        help("The schema must be a JSON object with a `definitions` map")
    )]
    ParseError {
        #[source]
        source: serde_json::Error,
        /// Where the schema came from (path or url)
        origin: String,
        /// Source text that failed to parse
        #[source_code]
        src: Option<String>,
        /// Location of the error in the source
        #[label("parse error here")]
        span: Option<SourceSpan>,
    },

    /// `$ref` that is malformed or names an absent definition
    #[error("Unknown $ref '{ref_string}'")]
    #[diagnostic(
        code(protocol::unknown_ref),
        help("References must have the form `#/definitions/<name>` and name an existing definition")
    )]
    UnknownRef {
        /// The ref string that couldn't be resolved
        ref_string: String,
        /// Definition containing the ref
        def_name: String,
        /// Field path containing the ref, empty for mixin refs
        field_path: String,
    },

    /// Type descriptor or mixin shape the compiler does not handle
    #[error("Unsupported feature in {def_name}{}: {feature}", field_suffix(field_path))]
    #[diagnostic(code(protocol::unsupported))]
    Unsupported {
        /// Description of the unsupported feature
        feature: String,
        /// Definition containing the feature
        def_name: String,
        /// Field path containing the feature
        field_path: String,
    },

    /// A record depends on a name that no record in the output provides
    #[error("{dependent} depends on {dependency}, which is not defined by the schema")]
    #[diagnostic(
        code(protocol::missing_dependency),
        help("Every request `<X>Request` needs a matching `<X>Response` definition")
    )]
    MissingDependency {
        /// Name that could not be found
        dependency: String,
        /// Record that requires it
        dependent: String,
    },

    /// Two or more records depend on each other
    #[error("Circular reference detected: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(protocol::circular_ref),
        help("Declarations must be emitted before use, so records cannot depend on each other by value")
    )]
    CircularRef {
        /// The name that closed the cycle
        ref_string: String,
        /// The cycle path
        cycle: Vec<String>,
    },

    /// The schema source could not produce a document
    #[error("Failed to fetch schema from {url}: {message}")]
    #[diagnostic(code(protocol::fetch))]
    Fetch { url: String, message: String },

    /// External source formatter failed
    #[error("Failed to format {}: {message}", path.display())]
    #[diagnostic(
        code(protocol::format_error),
        help("Run with --no-format to skip formatting")
    )]
    FormatError { path: PathBuf, message: String },
}

fn field_suffix(field_path: &str) -> String {
    if field_path.is_empty() {
        String::new()
    } else {
        format!(".{field_path}")
    }
}

impl CodegenError {
    /// Create a parse error with source text, pointing at the reported line/column
    pub fn parse_error_with_source(
        source: serde_json::Error,
        origin: impl Into<String>,
        src: String,
    ) -> Self {
        let span = byte_offset(&src, source.line(), source.column()).map(|offset| {
            let len = if offset < src.len() { 1 } else { 0 };
            SourceSpan::from((offset, len))
        });

        Self::ParseError {
            source,
            origin: origin.into(),
            src: Some(src),
            span,
        }
    }

    /// Create an unknown ref error
    pub fn unknown_ref(
        ref_string: impl Into<String>,
        def_name: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self::UnknownRef {
            ref_string: ref_string.into(),
            def_name: def_name.into(),
            field_path: field_path.into(),
        }
    }

    /// Create an unsupported feature error
    pub fn unsupported(
        feature: impl Into<String>,
        def_name: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            def_name: def_name.into(),
            field_path: field_path.into(),
        }
    }

    /// Create a schema source error
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an error for a sink that failed at `path`
    pub fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

/// serde_json reports 1-based lines and columns; 0 means "no position".
fn byte_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    let line_index = line.checked_sub(1)?;
    let mut offset = 0;
    for (i, text) in src.split_inclusive('\n').enumerate() {
        if i == line_index {
            let col = column.saturating_sub(1).min(text.len());
            return Some(offset + col);
        }
        offset += text.len();
    }
    Some(src.len())
}

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;
