//! Legends and the value-to-bin mapping behind colored pages.

use serde::Serialize;

use crate::color::{Cmyk, Scheme};
use crate::error::{DrawError, Result};

/// Slack allowed when checking a value against a scheme's range.
pub const RANGE_TOLERANCE: f32 = 5e-9;

/// Top limit of a scheme whose last bin is open ended.
pub const NO_UPPER_LIMIT: f32 = 987654321.0;

/// A single colored box standing for one category of columns, such as
/// "100% gaps".
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OneCellLegend {
    pub color: Cmyk,
    pub text: String,
    /// Columns painted with this legend's color.
    pub nres: usize,
    /// Of those, columns inside the mask. `None` when no mask is attached.
    pub nres_masked: Option<usize>,
}

impl OneCellLegend {
    pub(crate) fn new(color: Cmyk, text: &str, max_chars: i32, masked: bool) -> Result<Self> {
        if text.len() as i32 > max_chars {
            return Err(DrawError::too_long(text, max_chars.max(0) as usize));
        }
        Ok(OneCellLegend {
            color,
            text: text.to_string(),
            nres: 0,
            nres_masked: masked.then_some(0),
        })
    }

    pub(crate) fn tally(&mut self, in_mask: bool) {
        self.nres += 1;
        if let (Some(n), true) = (self.nres_masked.as_mut(), in_mask) {
            *n += 1;
        }
    }
}

/// A color scale: `limits` holds N+1 increasing boundaries for the N colors
/// of `scheme`.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SchemeLegend {
    pub scheme: Scheme,
    pub limits: Vec<f32>,
    pub counts: Vec<usize>,
    pub counts_masked: Option<Vec<usize>>,
    pub text1: String,
    /// Second label line when the text had to be split.
    pub text2: Option<String>,
}

impl SchemeLegend {
    pub(crate) fn new(
        scheme: Scheme,
        limits: &[f32],
        text: &str,
        max_chars: i32,
        masked: bool,
    ) -> Result<Self> {
        let nbins = scheme.nbins();
        if limits.len() != nbins + 1 {
            return Err(DrawError::validation(format!(
                "scheme with {nbins} colors needs {} limits, got {}",
                nbins + 1,
                limits.len()
            )));
        }
        if limits.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DrawError::validation(format!(
                "scheme limits are not strictly increasing: {limits:?}"
            )));
        }
        let (text1, text2) = split_legend_text(text, max_chars)?;
        Ok(SchemeLegend {
            scheme,
            limits: limits.to_vec(),
            counts: vec![0; nbins],
            counts_masked: masked.then(|| vec![0; nbins]),
            text1,
            text2,
        })
    }

    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    /// Bin holding `value`: the `i` with `limits[i] < value <= limits[i+1]`,
    /// the first bin also taking the minimum itself.
    pub fn bin(&self, value: f32) -> Result<usize> {
        let min = self.limits[0];
        let max = self.limits[self.limits.len() - 1];
        if (min - value) > RANGE_TOLERANCE || (value - max) > RANGE_TOLERANCE {
            return Err(DrawError::OutOfRange { value, min, max });
        }
        let mut bi = 0;
        while bi < self.nbins() - 1 && value > self.limits[bi + 1] {
            bi += 1;
        }
        Ok(bi)
    }

    /// Bin `value`, count it and return the color to paint.
    pub(crate) fn tally(&mut self, value: f32, in_mask: bool) -> Result<Cmyk> {
        let bi = self.bin(value)?;
        self.counts[bi] += 1;
        if let (Some(masked), true) = (self.counts_masked.as_mut(), in_mask) {
            masked[bi] += 1;
        }
        Ok(self.scheme.colors()[bi])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Split a legend label into at most two lines of `max` characters, breaking
/// at the last space that keeps the first line in bounds.
pub fn split_legend_text(text: &str, max: i32) -> Result<(String, Option<String>)> {
    let len = text.len() as i32;
    if len <= max {
        return Ok((text.to_string(), None));
    }
    if len > 2 * max - 6 {
        return Err(DrawError::too_long(text, (2 * max - 6).max(0) as usize));
    }
    let idx = text.as_bytes()[..max as usize]
        .iter()
        .rposition(|&b| b == b' ')
        .ok_or_else(|| {
            DrawError::validation(format!(
                "couldn't find a breakpoint for splitting legend text \"{text}\""
            ))
        })?;
    Ok((text[..idx].to_string(), Some(text[idx + 1..].to_string())))
}

/// A legend as drawn on a page: one-cell boxes come first, then the scheme.
#[derive(Clone, Copy, Debug)]
pub enum Legend<'a> {
    OneCell(&'a OneCellLegend),
    Scheme(&'a SchemeLegend),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;

    const LIMITS: [f32; 7] = [0.0, 0.4, 0.8, 1.2, 1.6, 1.99, 2.0];

    fn legend(masked: bool) -> SchemeLegend {
        SchemeLegend::new(Scheme::SixRedLow, &LIMITS, "bits", 35, masked).unwrap()
    }

    #[test]
    fn test_bin_boundaries() {
        let scl = legend(false);
        assert_eq!(scl.bin(0.0).unwrap(), 0);
        assert_eq!(scl.bin(0.4).unwrap(), 0);
        assert_eq!(scl.bin(0.41).unwrap(), 1);
        assert_eq!(scl.bin(1.995).unwrap(), 5);
        assert_eq!(scl.bin(2.0).unwrap(), 5);
        assert_eq!(scl.bin(2.0).unwrap(), scl.bin(2.0).unwrap());
    }

    #[test]
    fn test_bin_tolerance() {
        let scl = legend(false);
        assert_eq!(scl.bin(-1e-10).unwrap(), 0);
        assert!(matches!(
            scl.bin(-0.01),
            Err(DrawError::OutOfRange { .. })
        ));
        assert!(scl.bin(2.01).is_err());
    }

    #[test]
    fn test_tally_masked() {
        let mut scl = legend(true);
        let color = scl.tally(2.0, true).unwrap();
        assert_eq!(color, Scheme::SixRedLow.colors()[5]);
        scl.tally(0.1, false).unwrap();
        assert_eq!(scl.counts, vec![1, 0, 0, 0, 0, 1]);
        assert_eq!(scl.counts_masked, Some(vec![0, 0, 0, 0, 0, 1]));
        assert_eq!(scl.total(), 2);

        let mut unmasked = legend(false);
        unmasked.tally(1.0, true).unwrap();
        assert_eq!(unmasked.counts_masked, None);
    }

    #[test]
    fn test_bad_limits() {
        assert!(SchemeLegend::new(Scheme::SixRedLow, &LIMITS[..6], "x", 35, false).is_err());
        let flat = [0.0, 0.4, 0.4, 1.2, 1.6, 1.99, 2.0];
        assert!(SchemeLegend::new(Scheme::SixRedLow, &flat, "x", 35, false).is_err());
    }

    #[test]
    fn test_split_legend_text() {
        let (a, b) = split_legend_text("information content (bits)", 35).unwrap();
        assert_eq!(a, "information content (bits)");
        assert_eq!(b, None);

        let (a, b) = split_legend_text("extra information from structure (bits)", 23).unwrap();
        assert_eq!(a, "extra information from");
        assert_eq!(b.as_deref(), Some("structure (bits)"));

        assert!(matches!(
            split_legend_text("abcdefghijklm", 10),
            Err(DrawError::Validation(_))
        ));
        assert!(matches!(
            split_legend_text("way too long for two short lines", 10),
            Err(DrawError::TooLong { .. })
        ));
    }

    #[test]
    fn test_onecell() {
        let mut occl = OneCellLegend::new(BLACK, "100% gaps", 29, true).unwrap();
        occl.tally(true);
        occl.tally(false);
        assert_eq!(occl.nres, 2);
        assert_eq!(occl.nres_masked, Some(1));
        assert!(OneCellLegend::new(BLACK, "100% gaps", 5, false).is_err());
    }
}
