//! PostScript output.
//!
//! Every page repeats the template geometry inside the same tagged sections
//! the template reader understands, and puts everything page specific
//! (header, legends, cells, residues) inside `ignore` sections, so a rendered
//! page can be fed back in as a template.

use std::fmt::Write;

use log::{debug, warn};
use serde::Deserialize;

use crate::color::{Cmyk, BLACK};
use crate::error::{DrawError, Result};
use crate::layout::{
    BP_LINEWIDTH, HEADER_FONTSIZE_UNSCALED, HEADER_MODELNAME_MAXCHARS, HUNDREDS_FONT,
    HUNDREDS_FONTSIZE, LEG_BOXSIZE, LEG_FONT, LEG_FONTSIZE_UNSCALED, PAGE_BOTBUF, PAGE_SIDEBUF,
    RESIDUES_FONT, RESIDUES_FONTSIZE, SS_BOXSIZE, TICKS_LINEWIDTH,
};
use crate::legend::{OneCellLegend, SchemeLegend, NO_UPPER_LIMIT};
use crate::model::{Diagram, Page, PageMode};
use crate::template::Template;

/// Font of the page header and footer.
const HEADER_FONT: &str = "Courier-Bold";

const CREDIT: &str =
    "structure diagram derived from CRW database: http://www.rna.ccbb.utexas.edu/";

/// Glyph drawn for a column outside the mask.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaskStyle {
    #[default]
    Circle,
    Square,
    X,
}

/// Options controlling PostScript output.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Glyph for columns outside the mask (default: circle)
    pub mask_style: MaskStyle,
    /// Outline the mask glyph instead of filling it (default: true)
    pub mask_border: bool,
    /// Draw legends (default: true)
    pub legend: bool,
    /// Draw the model/description header (default: true)
    pub header: bool,
    /// Draw the file names and page number at the bottom (default: true)
    pub footer: bool,
    /// Put each sequence page right before its posterior page (default: false)
    pub interleave_posteriors: bool,
    /// Alignment file named in the footer
    pub alignment_file: String,
    pub mask_file: Option<String>,
    /// Second mask of a mask comparison, named in the footer
    pub mask_diff_file: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mask_style: MaskStyle::Circle,
            mask_border: true,
            legend: true,
            header: true,
            footer: true,
            interleave_posteriors: false,
            alignment_file: String::new(),
            mask_file: None,
            mask_diff_file: None,
        }
    }
}

/// Make `s` safe inside a PostScript string literal.
///
/// Balanced parentheses are legal inside a literal and are kept as they
/// are; anything else is escaped.
fn ps_string(s: &str) -> String {
    let mut depth = 0i32;
    let balanced = s.chars().all(|c| {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        depth >= 0 && c != '\\'
    }) && depth == 0;
    if balanced {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn write_cmyk(ps: &mut String, c: &Cmyk) {
    let _ = writeln!(
        ps,
        "  {:.4} {:.4} {:.4} {:.4} setcmykcolor",
        c[0], c[1], c[2], c[3]
    );
}

/// Order pages are printed in.
///
/// Index order, unless per-sequence posterior pages are interleaved: then the
/// pages must be an optional consensus page, `n` sequence pages and `n`
/// posterior pages, and each sequence page is followed by its posteriors.
pub fn display_order(d: &Diagram, opts: &RenderOptions) -> Vec<usize> {
    let npage = d.pages.len();
    // sequence pages carry residues only, posterior pages carry colors
    let nseq = d
        .pages
        .iter()
        .filter(|p| p.seq_idx.is_some() && p.colors.is_none())
        .count();
    if opts.interleave_posteriors && nseq > 0 && npage >= 2 * nseq {
        let offset = npage - 2 * nseq;
        if offset <= 1 {
            let mut order = Vec::with_capacity(npage);
            if offset == 1 {
                order.push(0);
            }
            for s in 0..nseq {
                order.push(s + offset);
                order.push(s + nseq + offset);
            }
            return order;
        }
    }
    if opts.interleave_posteriors {
        warn!("{npage} pages for {nseq} sequence pages cannot be interleaved, keeping page order");
    }
    (0..npage).collect()
}

/// Render every page of `d` as one PostScript document.
pub fn render(d: &Diagram, opts: &RenderOptions) -> Result<String> {
    if d.pages.is_empty() {
        return Err(DrawError::NoPages);
    }
    let mut ps = String::new();
    for (i, &p) in display_order(d, opts).iter().enumerate() {
        render_page(&mut ps, d, &d.pages[p], i + 1, opts);
    }
    debug!("rendered {} pages, {} bytes", d.pages.len(), ps.len());
    Ok(ps)
}

/// Render the bare template as a single page with nothing drawn on it.
///
/// Unlike [`render`] this keeps the model name section, so the output reads
/// back as the same template.
pub fn render_template(t: &Template) -> String {
    let mut ps = String::new();
    if let Some(name) = &t.model_name {
        let _ = write!(ps, "% begin modelname\n% {name}\n% end modelname\n");
    }
    let _ = write!(ps, "% begin scale\n{:.2} {:.2} scale\n% end scale\n\n", t.scale, t.scale);
    render_geometry(&mut ps, t);
    ps.push_str("% begin ignore\nshowpage\n% end ignore\n");
    ps
}

fn render_page(ps: &mut String, d: &Diagram, page: &Page, number: usize, opts: &RenderOptions) {
    let t = &d.template;

    let _ = write!(ps, "% begin scale\n{:.2} {:.2} scale\n% end scale\n\n", t.scale, t.scale);

    render_header_and_footer(ps, d, page, number, opts);

    render_geometry(ps, t);

    ps.push_str("% begin ignore\n");
    ps.push_str("0.00 0.00 0.00 1.00 setcmykcolor\n");
    let _ = writeln!(ps, "/{LEG_FONT} findfont {:.6} scalefont setfont", legend_fontsize(d));

    if opts.legend && page.has_legend() {
        let mut legend = LegendCursor {
            ps: &mut *ps,
            d,
            y: d.layout.legy,
        };
        legend.column_headers();
        for occl in &page.onecell {
            legend.onecell(occl);
        }
        if let Some(scl) = &page.scheme {
            legend.scheme(scl, opts);
        }
    }

    if let Some(colors) = &page.colors {
        render_cells(ps, d, colors, opts);
    }

    if let Some(residues) = &page.residues {
        let _ = writeln!(ps, "/{RESIDUES_FONT} findfont {RESIDUES_FONTSIZE:.6} scalefont setfont");
        for (c, r) in residues.iter().zip(&t.residues) {
            let _ = writeln!(
                ps,
                "({}) {:.2} {:.2} moveto show",
                ps_string(&c.to_string()),
                r.x,
                r.y
            );
        }
    }
    ps.push_str("grestore\nshowpage\n% end ignore\n\n");
}

/// Regurgitated lines, hundreds labels, ticks, base pairs and residue
/// positions, in template sections.
fn render_geometry(ps: &mut String, t: &Template) {
    if !t.regurgitate.is_empty() {
        ps.push_str("% begin regurgitate\n");
        for line in &t.regurgitate {
            ps.push_str(line);
        }
        ps.push_str("% end regurgitate\n\n");
    }

    if !t.hundreds.is_empty() {
        ps.push_str("% begin text hundreds\n");
        let _ = writeln!(ps, "/{HUNDREDS_FONT} findfont {HUNDREDS_FONTSIZE:.2} scalefont setfont");
        ps.push_str("0.00 0.00 0.00 1.00 setcmykcolor\n");
        for (i, p) in t.hundreds.iter().enumerate() {
            let _ = writeln!(ps, "({}) {:.2} {:.2} moveto show", (i + 1) * 100, p.x, p.y);
        }
        ps.push_str("% end text hundreds\n\n");
    }

    for (name, width, lines) in [
        ("ticks", TICKS_LINEWIDTH, &t.ticks),
        ("bpconnects", BP_LINEWIDTH, &t.bpconnects),
    ] {
        if lines.is_empty() {
            continue;
        }
        let _ = write!(
            ps,
            "% begin lines {name}\n{width:.2} setlinewidth\n0.00 0.00 0.00 1.00 setcmykcolor\n"
        );
        for l in lines {
            let _ = writeln!(
                ps,
                "{:.2} {:.2} {:.2} {:.2} newpath moveto lineto stroke",
                l.x1, l.y1, l.x2, l.y2
            );
        }
        let _ = write!(ps, "% end lines {name}\n\n");
    }

    // kept so the output can serve as a template
    ps.push_str("% begin text residues\n");
    let _ = writeln!(ps, "/{RESIDUES_FONT} findfont {RESIDUES_FONTSIZE:.2} scalefont setfont");
    ps.push_str("0.00 0.00 0.00 1.00 setcmykcolor\n");
    for r in &t.residues {
        let _ = writeln!(ps, "() {:.2} {:.2} moveto show", r.x, r.y);
    }
    ps.push_str("% end text residues\n");
}

fn legend_fontsize(d: &Diagram) -> f32 {
    LEG_FONTSIZE_UNSCALED / d.template.scale
}

fn render_cells(ps: &mut String, d: &Diagram, colors: &[Cmyk], opts: &RenderOptions) {
    let cells = colors.iter().zip(&d.template.residues).enumerate();
    match &d.mask {
        Some(mask) => {
            ps.push_str("2.0 setlinewidth\n");
            if opts.mask_border {
                let width = match opts.mask_style {
                    MaskStyle::X => "1.0",
                    MaskStyle::Square => "2.0",
                    MaskStyle::Circle => "2.5",
                };
                let _ = writeln!(ps, "{width} setlinewidth");
            }
            for (c, (color, r)) in cells {
                let _ = writeln!(ps, "%residue {}", c + 1);
                let (x, y) = (r.x as f64 - 1.0, r.y as f64 - 1.0);
                if mask.includes(c) {
                    cell(ps, x, y, color);
                } else {
                    masked_block(ps, x, y, color, opts, SS_BOXSIZE as f64);
                }
            }
            ps.push_str("1.00 setlinewidth\n");
        }
        None => {
            for (c, (color, r)) in cells {
                let _ = writeln!(ps, "%residue {}", c + 1);
                cell(ps, r.x as f64 - 1.0, r.y as f64 - 1.0, color);
            }
        }
    }
    ps.push_str("  0.00 0.00 0.00 1.00 setcmykcolor\n");
}

/// A filled 8x8 residue cell.
fn cell(ps: &mut String, x: f64, y: f64, color: &Cmyk) {
    let _ = write!(
        ps,
        "newpath\n  {x:.2} {y:.2} moveto  0 8 rlineto 8 0 rlineto 0 -8 rlineto closepath\n"
    );
    write_cmyk(ps, color);
    ps.push_str("  fill\n");
}

/// Glyph for a cell outside the mask, in a `size` box anchored at `(x, y)`.
fn masked_block(ps: &mut String, x: f64, y: f64, color: &Cmyk, opts: &RenderOptions, size: f64) {
    match (opts.mask_style, opts.mask_border) {
        (MaskStyle::Circle, border) => {
            let _ = write!(
                ps,
                "newpath\n {:.2} {:.2} {:.1} 0 360 arc closepath\n",
                x + size / 2.0,
                y + size / 2.0,
                size * (3.0 / 8.0)
            );
            write_cmyk(ps, color);
            ps.push_str(if border { "  stroke\n" } else { "  fill\n" });
        }
        (MaskStyle::Square, true) => {
            let side = size * 0.75;
            let _ = write!(
                ps,
                "newpath\n  {:.2} {:.2} moveto  0 {side:.1} rlineto {side:.1} 0 rlineto 0 -{side:.1} rlineto closepath\n",
                x + 1.0,
                y + 1.0
            );
            write_cmyk(ps, color);
            ps.push_str("  stroke\n");
        }
        (MaskStyle::Square, false) => {
            let side = size * (5.0 / 8.0);
            let _ = write!(
                ps,
                "newpath\n  {:.2} {:.2} moveto  0 {side:.1} rlineto {side:.1} 0 rlineto 0 -{side:.1} rlineto closepath\n",
                x + 1.5,
                y + 1.5
            );
            write_cmyk(ps, color);
            ps.push_str("  fill\n");
        }
        (MaskStyle::X, true) => {
            let _ = write!(
                ps,
                "newpath\n  {x:.2} {y:.2} moveto  0 {size:.1} rlineto {size:.1} 0 rlineto 0 -{size:.1} rlineto closepath\n"
            );
            write_cmyk(ps, color);
            ps.push_str("  fill\n");
            write_cmyk(ps, &[0.0; 4]);
            let _ = write!(
                ps,
                "newpath\n  {x:.2} {y:.2} moveto  {size:.1} {size:.1} rlineto closepath\n  stroke\n"
            );
            let _ = write!(
                ps,
                "  {:.2} {y:.2} moveto  -{size:.1} {size:.1} rlineto closepath\n  stroke\n",
                x + size
            );
        }
        (MaskStyle::X, false) => {
            ps.push_str("newpath\n");
            write_cmyk(ps, color);
            let _ = write!(
                ps,
                "  {x:.2} {y:.2} moveto  {size:.1} {size:.1} rlineto closepath\n  stroke\n"
            );
            let _ = write!(
                ps,
                "newpath\n  {:.2} {y:.2} moveto  -{size:.1} {size:.1} rlineto closepath\n  stroke\n",
                x + size
            );
        }
    }
}

/// Draws legends top to bottom, starting just below the last residue.
struct LegendCursor<'a> {
    ps: &'a mut String,
    d: &'a Diagram,
    y: f32,
}

impl LegendCursor<'_> {
    fn masked(&self) -> bool {
        self.d.mask.is_some()
    }

    fn stats_x(&self) -> f32 {
        self.d.layout.legx_stats as f32
    }

    fn show(&mut self, text: &str, x: f32, y: f32) {
        let _ = writeln!(self.ps, "({text}) {x:.4} {y:.4} moveto show");
    }

    fn box_at(&mut self, x: f32, y: f32, color: &Cmyk) {
        let _ = write!(
            self.ps,
            "newpath\n  {x:.2} {y:.2} moveto  0 {b:.3} rlineto {b:.3} 0 rlineto 0 {nb:.3} rlineto closepath\n",
            b = LEG_BOXSIZE,
            nb = -LEG_BOXSIZE
        );
        let _ = writeln!(
            self.ps,
            "  {:.4} {:.4} {:.4} {:.4} setcmykcolor\n  fill",
            color[0], color[1], color[2], color[3]
        );
    }

    fn column_headers(&mut self) {
        let d = self.d;
        let layout = &d.layout;
        let legx = layout.legx;
        let width = (layout.legx_max_chars - 12 - 2).max(0) as usize;
        let dashes = "-".repeat(width);
        let quarter = LEG_BOXSIZE * 0.25;
        let step = LEG_BOXSIZE * 0.625;

        let mut y = self.y;
        if self.masked() {
            y -= step;
        }
        self.show("LEGEND", legx, y + quarter);

        let x = self.stats_x();
        let mut y = self.y;
        if self.masked() {
            self.show(&format!("{:>4}  {:>4}", "", " in "), x, y + quarter);
            y -= step;
            self.show(&format!("{:>4}  {:>4}", "all", "mask"), x, y + quarter);
            y -= step;
            self.show(&dashes, legx, y + quarter);
            self.show("----  ----", x, y + quarter);
        } else {
            self.show(&format!("{:>5}", "count"), x, y + quarter);
            y -= step;
            self.show(&dashes, legx, y + quarter);
            self.show("-----", x, y + quarter);
        }
        self.y = y - LEG_BOXSIZE;
    }

    fn counts(&self, all: usize, masked: Option<usize>) -> String {
        if self.masked() {
            format!("{all:>4}  {:>4}", masked.unwrap_or(0))
        } else {
            format!("{all:>5}")
        }
    }

    fn onecell(&mut self, occl: &OneCellLegend) {
        let x = self.d.layout.legx;
        let y = self.y;
        self.box_at(x, y, &occl.color);

        self.ps.push_str("  0.00 0.00 0.00 1.00 setcmykcolor\n");
        let _ = writeln!(
            self.ps,
            "/{LEG_FONT} findfont {:.6} scalefont setfont",
            legend_fontsize(self.d)
        );
        let ty = y + LEG_BOXSIZE * 0.25;
        self.show(&ps_string(&occl.text), x + LEG_BOXSIZE * 1.5, ty);
        let stats = self.counts(occl.nres, occl.nres_masked);
        self.show(&stats, self.stats_x(), ty);

        write_cmyk(self.ps, &BLACK);
        self.y = y - LEG_BOXSIZE * 1.5;
    }

    /// The two mask summary rows drawn above a scheme on masked diagrams.
    fn mask_summary(&mut self, x: f32, y: &mut f32, opts: &RenderOptions) {
        let step = LEG_BOXSIZE * 0.625;
        let half = LEG_BOXSIZE * 0.3125;
        let clen = self.d.clen();
        let included = self.d.mask.as_ref().map_or(0, |m| m.count_included());

        let _ = writeln!(self.ps, "{:.1} setlinewidth", LEG_BOXSIZE / 4.0);
        self.box_at(x, *y, &BLACK);
        let tx = x + LEG_BOXSIZE * 1.5;
        self.show("included by mask", tx, *y + step);
        self.show("(all colors)", tx, *y);
        self.show(&format!("{:>4}  {included:>4}", "-"), self.stats_x(), *y + half);

        *y -= LEG_BOXSIZE * 1.5;
        masked_block(self.ps, x as f64, *y as f64, &BLACK, opts, LEG_BOXSIZE as f64);
        self.show("excluded by mask", tx, *y + step);
        self.show("(all colors)", tx, *y);
        self.show(
            &format!("{:>4}  {:>4}", "-", clen - included),
            self.stats_x(),
            *y + half,
        );
        *y -= LEG_BOXSIZE * 1.5;
    }

    fn scheme(&mut self, scl: &SchemeLegend, opts: &RenderOptions) {
        let x = self.d.layout.legx;
        let mut y = self.y;
        let quarter = LEG_BOXSIZE * 0.25;

        let _ = writeln!(
            self.ps,
            "/{LEG_FONT} findfont {:.6} scalefont setfont",
            legend_fontsize(self.d)
        );
        self.ps.push_str("  0.00 0.00 0.00 1.00 setcmykcolor\n");

        if self.masked() {
            self.mask_summary(x, &mut y, opts);
        }

        match &scl.text2 {
            None => self.show(&format!("{}:", ps_string(&scl.text1)), x, y + quarter),
            Some(text2) => {
                self.show(&ps_string(&scl.text1), x, y + quarter);
                y -= LEG_BOXSIZE * 0.625;
                self.show(&format!("{}:", ps_string(text2)), x, y + quarter);
            }
        }
        y -= LEG_BOXSIZE;

        let colors = scl.scheme.colors();
        let last = scl.nbins() - 1;
        for (c, color) in colors.iter().enumerate().take(scl.nbins()) {
            self.box_at(x, y, color);
            self.ps.push_str("  0.00 0.00 0.00 1.00 setcmykcolor\n");
            let label = if c == last && scl.limits[c + 1] >= NO_UPPER_LIMIT {
                format!(">={:3.0}", scl.limits[c])
            } else {
                let close = if c == last { "\\]" } else { "\\)" };
                format!("\\[{:.3}-{:.3}{close}", scl.limits[c], scl.limits[c + 1])
            };
            self.show(&label, x + LEG_BOXSIZE * 1.5, y + quarter);
            let masked = scl.counts_masked.as_ref().map(|m| m[c]);
            let stats = self.counts(scl.counts[c], masked);
            self.show(&stats, self.stats_x(), y + quarter);
            y -= LEG_BOXSIZE;
        }

        write_cmyk(self.ps, &BLACK);
        self.y = y;
    }
}

fn render_header_and_footer(
    ps: &mut String,
    d: &Diagram,
    page: &Page,
    number: usize,
    opts: &RenderOptions,
) {
    let scale = d.template.scale;
    let header_fontsize = HEADER_FONTSIZE_UNSCALED / scale;

    ps.push_str("% begin ignore\n");
    let _ = writeln!(ps, "/{HEADER_FONT} findfont {header_fontsize:.2} scalefont setfont");
    ps.push_str("0.00 0.00 0.00 1.00 setcmykcolor\n");

    if opts.header {
        render_header(ps, d, page, header_fontsize);
    }

    let layout = &d.layout;
    let footer_fontsize = LEG_FONTSIZE_UNSCALED / scale;
    let _ = writeln!(ps, "/{HEADER_FONT} findfont {footer_fontsize:.2} scalefont setfont");
    if opts.footer {
        let alifile = ps_string(&opts.alignment_file);
        let files = match (&opts.mask_file, &opts.mask_diff_file) {
            (Some(m1), Some(m2)) => format!(
                "alifile: {alifile}; mask 1 file: {}; mask 2 file: {};",
                ps_string(m1),
                ps_string(m2)
            ),
            (Some(m), None) => format!("alifile: {alifile}; mask file: {};", ps_string(m)),
            _ => format!("alifile: {alifile}"),
        };
        let _ = writeln!(
            ps,
            "({files}) {:.2} {:.2} moveto show",
            PAGE_SIDEBUF,
            PAGE_BOTBUF + 1.25 * footer_fontsize as f64
        );
        let ndigits = number.to_string().len();
        let x = layout.pagex_max as f64
            - PAGE_SIDEBUF
            - layout.legx_charsize as f64 * (5 + ndigits) as f64;
        let _ = writeln!(ps, "(page {number}) {x:.2} {PAGE_BOTBUF:.2} moveto show");
    }
    let _ = writeln!(ps, "({CREDIT}) {PAGE_SIDEBUF:.2} {PAGE_BOTBUF:.2} moveto show");
    ps.push_str("% end ignore\n");
}

/// Model name as printed in the header, shortened with "..." when too long.
fn header_model_name(name: &str) -> String {
    if name.chars().count() > HEADER_MODELNAME_MAXCHARS {
        let kept: String = name.chars().take(HEADER_MODELNAME_MAXCHARS - 3).collect();
        format!("{kept}...")
    } else {
        name.to_string()
    }
}

fn render_header(ps: &mut String, d: &Diagram, page: &Page, header_fontsize: f32) {
    let layout = &d.layout;
    let name = d.template.model_name.as_deref().unwrap_or_default();
    let model_width = name.chars().count().max("model".len()).min(HEADER_MODELNAME_MAXCHARS);
    let model = ps_string(&header_model_name(name));
    let dashes = "-".repeat(model_width);
    let line_step = header_fontsize * 0.75;

    let mut x = layout.headerx_desc - layout.headerx_charsize * (model_width + 6 + 6 + 8 + 2) as f32;
    let mut y = layout.headery;
    let _ = writeln!(ps, "({:<model_width$}  {:>4}  {:>4}) {x:.2} {y:.2} moveto show", "model", "#res", "#bps");
    y -= line_step;
    let _ = writeln!(ps, "({dashes:<model_width$}  {:>4}  {:>4}) {x:.2} {y:.2} moveto show", "----", "----");
    y -= line_step;
    // no newline: the next column continues this line
    let _ = write!(
        ps,
        "({model:<model_width$}  {:>4}  {:>4}) {x:.2} {y:.2} moveto show",
        d.clen(),
        d.msa_nbp
    );
    x += (model_width + 6 + 6 + 2) as f32 * layout.headerx_charsize;

    let count = match (page.mode, page.seq_idx) {
        (PageMode::Alignment, _) => Some(("#seqs", d.nseq)),
        (PageMode::Individual, Some(s)) => {
            Some(("seqlen", d.seq_lengths.get(s).copied().unwrap_or(0)))
        }
        _ => None,
    };
    if let Some((label, n)) = count {
        y += header_fontsize * 1.5;
        let _ = writeln!(ps, "({label:>6}) {x:.2} {y:.2} moveto show");
        y -= line_step;
        let _ = writeln!(ps, "({:>6}) {x:.2} {y:.2} moveto show", "------");
        y -= line_step;
        let _ = write!(ps, "({n:>6}) {x:.2} {y:.2} moveto show");
    }

    let Some(desc) = &page.description else {
        return;
    };
    let label = match page.mode {
        PageMode::Individual => "sequence name",
        _ => "description",
    };
    let x = layout.headerx_desc;
    y += 2.0 * line_step;
    match desc.split_once('\n') {
        Some((first, second)) => {
            let width = first.chars().count();
            let dashes = "-".repeat(width);
            let _ = writeln!(ps, "({label:<width$}) {x:.2} {y:.2} moveto show");
            y -= line_step;
            let _ = writeln!(ps, "({dashes:<width$}) {x:.2} {y:.2} moveto show");
            y -= line_step;
            let _ = writeln!(ps, "({:<width$}) {x:.2} {y:.2} moveto show", ps_string(first));
            y -= layout.headery_charsize;
            let _ = writeln!(ps, "({:<width$}) {x:.2} {y:.2} moveto show", ps_string(second));
        }
        None => {
            let width = desc.chars().count().max(label.len());
            let dashes = "-".repeat(width);
            let _ = writeln!(ps, "({label:<width$}) {x:.2} {y:.2} moveto show");
            y -= line_step;
            let _ = writeln!(ps, "({dashes:<width$}) {x:.2} {y:.2} moveto show");
            y -= line_step;
            let _ = writeln!(ps, "({:<width$}) {x:.2} {y:.2} moveto show", ps_string(desc));
        }
    }
}
