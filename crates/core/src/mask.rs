use std::path::Path;

use serde::Serialize;

use crate::error::{read_file, DrawError, Result};

/// A per-column include ('1') / exclude ('0') selector.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Mask {
    columns: String,
    /// True when some '0' sits between two '1's, as opposed to a mask that
    /// only trims the 5' and 3' ends.
    has_internal_zeroes: bool,
}

impl Mask {
    pub fn new(columns: &str) -> Result<Self> {
        let mut seen_1 = false;
        let mut seen_1_then_0 = false;
        let mut internal = false;
        for (i, c) in columns.chars().enumerate() {
            match c {
                '0' => {
                    if seen_1 {
                        seen_1_then_0 = true;
                    }
                }
                '1' => {
                    if seen_1_then_0 {
                        internal = true;
                    }
                    seen_1 = true;
                }
                _ => {
                    return Err(DrawError::validation(format!(
                        "character {i} of mask is invalid: {c} (must be a '1' or a '0')"
                    )))
                }
            }
        }
        Ok(Mask {
            columns: columns.to_string(),
            has_internal_zeroes: internal,
        })
    }

    /// Parse mask file contents: the first token, `#` starts a comment.
    pub fn parse(src: &str, file: &str) -> Result<Self> {
        let (line_no, token) = src
            .lines()
            .enumerate()
            .find_map(|(i, line)| {
                let line = line.split('#').next().unwrap_or("");
                line.split_whitespace().next().map(|tok| (i + 1, tok))
            })
            .ok_or_else(|| DrawError::parse(file, 0, "failed to read a single token"))?;
        Mask::new(token).map_err(|e| DrawError::parse(file, line_no, e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_internal_zeroes(&self) -> bool {
        self.has_internal_zeroes
    }

    pub fn includes(&self, col: usize) -> bool {
        self.columns.as_bytes().get(col) == Some(&b'1')
    }

    pub fn count_included(&self) -> usize {
        self.columns.bytes().filter(|&b| b == b'1').count()
    }
}

pub fn read_mask(path: &Path) -> Result<Mask> {
    let src = read_file(path)?;
    Mask::parse(&src, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_zeroes() {
        assert!(Mask::new("1100111").unwrap().has_internal_zeroes());
        assert!(!Mask::new("0000111").unwrap().has_internal_zeroes());
        assert!(!Mask::new("0011100").unwrap().has_internal_zeroes());
        assert!(!Mask::new("1111").unwrap().has_internal_zeroes());
        assert!(Mask::new("0101").unwrap().has_internal_zeroes());
    }

    #[test]
    fn test_invalid_char() {
        let err = Mask::new("1102").unwrap_err();
        assert!(err.to_string().contains("character 3"));
    }

    #[test]
    fn test_parse_skips_comments() {
        let mask = Mask::parse("# a comment\n\n  0111 trailing\n", "m.mask").unwrap();
        assert_eq!(mask.as_str(), "0111");
        assert_eq!(mask.count_included(), 3);
        assert!(mask.includes(1));
        assert!(!mask.includes(0));
        assert!(!mask.includes(9));
    }

    #[test]
    fn test_parse_reports_line() {
        match Mask::parse("#\n01x\n", "m.mask") {
            Err(DrawError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Mask::parse("# only comments\n", "m.mask").is_err());
    }
}
