use log::debug;
use serde::Serialize;

use crate::error::{DrawError, Result};
use crate::template::Template;

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const PAGE_TOPBUF: f64 = 12.0;
pub const PAGE_SIDEBUF: f64 = 12.0;
pub const PAGE_BOTBUF: f64 = 12.0;

pub const LEG_BOXSIZE: f32 = 24.0;
const LEGX_OFFSET: f64 = 24.0;
const LEGY_OFFSET: f64 = -24.0;
/// Columns reserved at the right edge of the legend for the count statistics.
const LEG_EXTRA_COLUMNS: f64 = 12.0;

pub const LEG_FONT: &str = "Courier-Bold";
pub const RESIDUES_FONT: &str = "Helvetica-Bold";
pub const HUNDREDS_FONT: &str = "Helvetica";
pub const RESIDUES_FONTSIZE: f32 = 8.0;
pub const HUNDREDS_FONTSIZE: f32 = 8.0;
pub const LEG_FONTSIZE_UNSCALED: f32 = 9.6;
pub const HEADER_FONTSIZE_UNSCALED: f32 = 12.0;
pub const HEADER_MODELNAME_MAXCHARS: usize = 20;

pub const TICKS_LINEWIDTH: f32 = 2.0;
pub const BP_LINEWIDTH: f32 = 1.0;
pub const SS_BOXSIZE: f32 = 8.0;

/// Height over width of one Courier glyph.
const COURIER_HEIGHT_WIDTH_RATIO: f64 = 1.65;

/// Header width taken by the model name, `#res`, `#bps` and `#seqs` columns.
const HEADER_FIXED_COLUMNS: i32 = HEADER_MODELNAME_MAXCHARS as i32 + 6 + 6 + 8 + 2;

/// Header and legend anchors derived from a template's geometry and scale.
///
/// Anchors are in template coordinates: physical page size divided by the
/// scale factor. Character counts are signed since a badly placed 3' residue
/// can leave no room at all.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Layout {
    pub pagex_max: f32,
    pub pagey_max: f32,
    pub headerx: f32,
    pub headery: f32,
    pub headerx_charsize: f32,
    pub headery_charsize: f32,
    /// Left edge of the description column in the header.
    pub headerx_desc: f32,
    pub desc_max_chars: i32,
    /// Top-left of the legend, just below and right of the last residue.
    pub legx: f32,
    pub legy: f32,
    pub legx_charsize: f32,
    pub legy_charsize: f32,
    pub legx_max_chars: i32,
    pub legy_max_chars: i32,
    /// x position of the count columns in the legend.
    pub legx_stats: i32,
}

impl Layout {
    pub fn new(template: &Template) -> Result<Self> {
        let last = template
            .residues
            .last()
            .ok_or_else(|| DrawError::validation("template has no residues"))?;
        let scale = template.scale as f64;

        let legx = (last.x as f64 + LEGX_OFFSET) as f32;
        let legy = (last.y as f64 + LEGY_OFFSET) as f32;

        let pagex_max = (PAGE_WIDTH / scale) as f32;
        let pagey_max = (PAGE_HEIGHT / scale) as f32;

        let headerx = PAGE_SIDEBUF as f32;
        let headery = (pagey_max as f64 - PAGE_TOPBUF - HEADER_FONTSIZE_UNSCALED as f64 / scale) as f32;

        let xroom = pagex_max - legx;
        let yroom = -(legy - pagey_max);
        let legx_charsize =
            ((LEG_FONTSIZE_UNSCALED as f64 / COURIER_HEIGHT_WIDTH_RATIO) / scale) as f32;
        let legy_charsize = (LEG_FONTSIZE_UNSCALED as f64 / scale) as f32;
        let legx_max_chars = (xroom / legx_charsize) as i32;
        let legy_max_chars = (yroom / legy_charsize) as i32;
        let legx_stats = (pagex_max as f64
            - PAGE_SIDEBUF
            - LEG_EXTRA_COLUMNS * legx_charsize as f64) as i32;

        let headerx_charsize =
            ((HEADER_FONTSIZE_UNSCALED as f64 / COURIER_HEIGHT_WIDTH_RATIO) / scale) as f32;
        let header_max_chars = (pagex_max / headerx_charsize) as i32 - 2;
        let headery_charsize = (HEADER_FONTSIZE_UNSCALED as f64 / scale) as f32;
        let desc_max_chars = header_max_chars - HEADER_FIXED_COLUMNS;
        let headerx_desc = (pagex_max as f64
            - PAGE_SIDEBUF
            - desc_max_chars as f64 * headerx_charsize as f64) as f32;

        let layout = Layout {
            pagex_max,
            pagey_max,
            headerx,
            headery,
            headerx_charsize,
            headery_charsize,
            headerx_desc,
            desc_max_chars,
            legx,
            legy,
            legx_charsize,
            legy_charsize,
            legx_max_chars,
            legy_max_chars,
            legx_stats,
        };
        debug!(
            "layout: legend at ({:.2}, {:.2}), {} legend chars, {} description chars",
            legx, legy, legx_max_chars, desc_max_chars
        );
        Ok(layout)
    }

    /// Widest legend label, in characters, next to a scheme legend.
    pub fn scheme_text_max(&self) -> i32 {
        self.legx_max_chars - 14
    }

    /// Widest label next to a one-cell legend box.
    pub fn onecell_text_max(&self) -> i32 {
        self.legx_max_chars - 14 - ((LEG_BOXSIZE as f64 * 1.5) / self.legx_charsize as f64) as i32
    }
}
