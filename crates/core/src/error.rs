use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or rendering a diagram.
///
/// None of these are recovered from inside the engine; callers abort the run.
#[derive(Error, Debug)]
pub enum DrawError {
    #[error("parse error in {file}, line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("value {value} is outside range [{min}..{max}]")]
    OutOfRange { value: f32, min: f32, max: f32 },

    #[error("text is too long ({len} chars, max allowed is {max}): \"{text}\"")]
    TooLong {
        text: String,
        len: usize,
        max: usize,
    },

    #[error("{what} already set for page {page}")]
    AlreadySet { what: &'static str, page: usize },

    #[error("did not find template structure to match alignment consensus length of {clen} in {file}")]
    NoTemplateMatch { clen: usize, file: String },

    #[error("diagram has no pages to render")]
    NoPages,

    #[error("failed to serialize diagram: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DrawError {
    pub fn parse(file: &str, line: usize, message: impl Into<String>) -> Self {
        DrawError::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DrawError::Validation(message.into())
    }

    pub fn too_long(text: &str, max: usize) -> Self {
        DrawError::TooLong {
            text: text.to_string(),
            len: text.len(),
            max,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DrawError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DrawError>;

/// Read a whole input file, attaching the path to any failure.
pub(crate) fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| DrawError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let e = DrawError::parse("t.ps", 12, "unknown section type");
        assert_eq!(
            e.to_string(),
            "parse error in t.ps, line 12: unknown section type"
        );
    }

    #[test]
    fn test_too_long_records_length() {
        match DrawError::too_long("abcdef", 3) {
            DrawError::TooLong { len, max, .. } => {
                assert_eq!(len, 6);
                assert_eq!(max, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
