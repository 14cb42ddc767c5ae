use std::ops::Range;

use log::debug;
use serde::Serialize;

use crate::color::{Cmyk, Scheme, WHITE};
use crate::error::{DrawError, Result};
use crate::layout::Layout;
use crate::legend::{Legend, OneCellLegend, SchemeLegend};
use crate::mask::Mask;
use crate::template::Template;

/// What a page summarizes; decides header columns and description wrapping.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    /// A statistic over the whole alignment.
    Alignment,
    /// One sequence, or the consensus line.
    Individual,
    /// Mask columns, or two masks compared.
    SimpleMask,
    /// Colors read from an external draw file.
    DrawFile,
}

#[derive(Serialize, Clone, Debug)]
pub struct Page {
    pub mode: PageMode,
    /// One CMYK color per consensus column, when the page paints cells.
    pub colors: Option<Vec<Cmyk>>,
    /// One character per consensus column, drawn over the cells.
    pub residues: Option<Vec<char>>,
    pub onecell: Vec<OneCellLegend>,
    pub scheme: Option<SchemeLegend>,
    /// Wrapped description; a `'\n'` marks the line break.
    pub description: Option<String>,
    pub seq_idx: Option<usize>,
}

impl Page {
    fn new(mode: PageMode) -> Self {
        Page {
            mode,
            colors: None,
            residues: None,
            onecell: Vec::new(),
            scheme: None,
            description: None,
            seq_idx: None,
        }
    }

    /// Legends in drawing order.
    pub fn legends(&self) -> impl Iterator<Item = Legend<'_>> {
        self.onecell
            .iter()
            .map(Legend::OneCell)
            .chain(self.scheme.iter().map(Legend::Scheme))
    }

    pub fn has_legend(&self) -> bool {
        !self.onecell.is_empty() || self.scheme.is_some()
    }
}

/// A template, its layout, and the pages drawn onto it.
///
/// Pages are only ever appended and are addressed by index.
#[derive(Serialize, Clone, Debug)]
pub struct Diagram {
    pub template: Template,
    pub layout: Layout,
    pub pages: Vec<Page>,
    pub mask: Option<Mask>,
    /// Base pairs between consensus columns in the alignment's structure.
    pub msa_nbp: usize,
    pub nseq: usize,
    /// Unaligned length of each sequence, for per-sequence page headers.
    pub seq_lengths: Vec<usize>,
}

impl Diagram {
    pub fn new(template: Template) -> Result<Self> {
        template.validate()?;
        let layout = Layout::new(&template)?;
        Ok(Diagram {
            template,
            layout,
            pages: Vec::new(),
            mask: None,
            msa_nbp: 0,
            nseq: 0,
            seq_lengths: Vec::new(),
        })
    }

    pub fn clen(&self) -> usize {
        self.template.clen()
    }

    /// Append `n` blank pages and return their indices.
    pub fn add_pages(&mut self, n: usize, mode: PageMode) -> Range<usize> {
        let start = self.pages.len();
        self.pages.extend((0..n).map(|_| Page::new(mode)));
        debug!("added {n} {mode:?} page(s), {} total", self.pages.len());
        start..self.pages.len()
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut Page> {
        let npage = self.pages.len();
        self.pages
            .get_mut(page)
            .ok_or_else(|| DrawError::validation(format!("page {page} does not exist ({npage} pages)")))
    }

    fn in_mask(&self, col: usize) -> bool {
        self.mask.as_ref().is_some_and(|m| m.includes(col))
    }

    pub fn attach_mask(&mut self, mask: Mask) -> Result<()> {
        if self.mask.is_some() {
            return Err(DrawError::AlreadySet {
                what: "mask",
                page: 0,
            });
        }
        if mask.len() != self.clen() {
            return Err(DrawError::validation(format!(
                "mask length ({}) differs from consensus length ({})",
                mask.len(),
                self.clen()
            )));
        }
        self.mask = Some(mask);
        Ok(())
    }

    /// Give the page a color per column, all white.
    pub fn alloc_colors(&mut self, page: usize) -> Result<()> {
        let clen = self.clen();
        self.page_mut(page)?.colors = Some(vec![WHITE; clen]);
        Ok(())
    }

    /// Give the page a residue overlay, all blank.
    pub fn alloc_residues(&mut self, page: usize) -> Result<()> {
        let clen = self.clen();
        self.page_mut(page)?.residues = Some(vec![' '; clen]);
        Ok(())
    }

    pub fn set_column_color(&mut self, page: usize, col: usize, color: Cmyk) -> Result<()> {
        let cell = self
            .page_mut(page)?
            .colors
            .as_mut()
            .and_then(|colors| colors.get_mut(col))
            .ok_or_else(|| DrawError::validation(format!("no color cell {col} on page {page}")))?;
        *cell = color;
        Ok(())
    }

    pub fn set_column_char(&mut self, page: usize, col: usize, c: char) -> Result<()> {
        let cell = self
            .page_mut(page)?
            .residues
            .as_mut()
            .and_then(|residues| residues.get_mut(col))
            .ok_or_else(|| DrawError::validation(format!("no residue cell {col} on page {page}")))?;
        *cell = c;
        Ok(())
    }

    /// Add a one-cell legend to a page and return its index there.
    pub fn add_onecell_legend(&mut self, page: usize, color: Cmyk, text: &str) -> Result<usize> {
        let masked = self.mask.is_some();
        let max = self.layout.onecell_text_max();
        let legend = OneCellLegend::new(color, text, max, masked)?;
        let p = self.page_mut(page)?;
        p.onecell.push(legend);
        Ok(p.onecell.len() - 1)
    }

    pub fn add_scheme_legend(
        &mut self,
        page: usize,
        scheme: Scheme,
        limits: &[f32],
        text: &str,
    ) -> Result<()> {
        let masked = self.mask.is_some();
        let max = self.layout.scheme_text_max();
        let p = self.page_mut(page)?;
        if p.scheme.is_some() {
            return Err(DrawError::AlreadySet {
                what: "scheme legend",
                page,
            });
        }
        p.scheme = Some(SchemeLegend::new(scheme, limits, text, max, masked)?);
        Ok(())
    }

    /// Color a column by binning `value` into the page's scheme legend.
    pub fn paint_scheme(&mut self, page: usize, col: usize, value: f32) -> Result<()> {
        let in_mask = self.in_mask(col);
        let color = self
            .page_mut(page)?
            .scheme
            .as_mut()
            .ok_or_else(|| DrawError::validation(format!("page {page} has no scheme legend")))?
            .tally(value, in_mask)?;
        self.set_column_color(page, col, color)
    }

    /// Color a column with one of the page's one-cell legends.
    pub fn paint_onecell(&mut self, page: usize, col: usize, legend: usize) -> Result<()> {
        let in_mask = self.in_mask(col);
        let occl = self
            .page_mut(page)?
            .onecell
            .get_mut(legend)
            .ok_or_else(|| DrawError::validation(format!("page {page} has no one-cell legend {legend}")))?;
        occl.tally(in_mask);
        let color = occl.color;
        self.set_column_color(page, col, color)
    }

    pub fn set_page_description(&mut self, page: usize, text: &str) -> Result<()> {
        let max = self.layout.desc_max_chars;
        let p = self.page_mut(page)?;
        if p.description.is_some() {
            return Err(DrawError::AlreadySet {
                what: "description",
                page,
            });
        }
        p.description = Some(wrap_description(text, p.mode, max)?);
        Ok(())
    }

    /// Describe a mask comparison page, one line per mask file.
    pub fn set_diffmask_description(&mut self, page: usize, mask1: &str, mask2: &str) -> Result<()> {
        let max = self.layout.desc_max_chars;
        let text = format!(
            "{}\n{}",
            fit_mask_name("mask 1: ", mask1, max),
            fit_mask_name("mask 2: ", mask2, max)
        );
        let p = self.page_mut(page)?;
        if p.description.is_some() {
            return Err(DrawError::AlreadySet {
                what: "description",
                page,
            });
        }
        p.description = Some(text);
        Ok(())
    }
}

fn fit_mask_name(prefix: &str, name: &str, max: i32) -> String {
    if (name.len() + prefix.len()) as i32 <= max {
        return format!("{prefix}{name}");
    }
    let keep = (max - prefix.len() as i32 - 3).max(0) as usize;
    let cut = name.char_indices().nth(keep).map_or(name.len(), |(i, _)| i);
    format!("{prefix}{}...", &name[..cut])
}

/// Fit a description into at most two header lines of `max` characters.
///
/// Free text on alignment pages breaks at a space; names on other pages are
/// hyphenated, and on per-sequence pages a name too long even for two lines
/// is cut short.
pub fn wrap_description(text: &str, mode: PageMode, max: i32) -> Result<String> {
    let len = text.len() as i32;
    let mut max_both = 2 * max;
    if matches!(mode, PageMode::Individual | PageMode::SimpleMask | PageMode::DrawFile) {
        max_both -= 1;
    }
    if len <= max {
        return Ok(text.to_string());
    }
    if !text.is_ascii() {
        return Err(DrawError::validation(format!(
            "description \"{text}\" is too long and not plain ASCII"
        )));
    }
    let max = max.max(0) as usize;
    if len <= max_both {
        if mode == PageMode::Alignment {
            let i = text.as_bytes()[..=max]
                .iter()
                .rposition(|&b| b == b' ')
                .ok_or_else(|| {
                    DrawError::validation(format!(
                        "first word of \"{text}\" is more than max allowed of {max} chars"
                    ))
                })?;
            if text.len() - (i + 1) > max {
                return Err(DrawError::validation(format!(
                    "couldn't find break point for splitting \"{text}\" into two lines"
                )));
            }
            return Ok(format!("{}\n{}", &text[..i], &text[i + 1..]));
        }
        return Ok(format!("{}-\n{}", &text[..max], &text[max..]));
    }
    if mode != PageMode::Individual {
        return Err(DrawError::too_long(text, 2 * max));
    }
    let bytes = text.as_bytes();
    match bytes[1..=max].iter().rposition(|&b| b == b' ') {
        Some(j) => {
            let j = j + 1;
            let end = (j + 1 + max).min(text.len());
            Ok(format!("{}\n{}", &text[..j], &text[j + 1..end]))
        }
        None => Ok(format!("{}-\n{}", &text[..max], &text[max..2 * max])),
    }
}
