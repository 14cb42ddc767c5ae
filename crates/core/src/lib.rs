//! Alignment statistics drawn onto template RNA secondary structure diagrams.
//!
//! A template PostScript file supplies residue positions and base-pair lines
//! for a consensus structure. Each generation pass adds pages that color those
//! positions by a per-column statistic of an alignment, and [`render`] writes
//! the pages back out as PostScript.

pub mod alignment;
pub mod color;
pub mod drawfile;
pub mod error;
pub mod layout;
pub mod legend;
pub mod mask;
pub mod model;
pub mod pages;
pub mod render;
pub mod stats;
pub mod stockholm;
pub mod template;

use log::{debug, info};
use serde::Deserialize;

pub use alignment::{count_pairs, Alignment, ConsensusMap};
pub use error::{DrawError, Result};
pub use mask::{read_mask, Mask};
pub use model::{Diagram, Page, PageMode};
pub use render::{render, render_template, MaskStyle, RenderOptions};
pub use stockholm::{parse_stockholm, read_stockholm};
pub use template::{find_template, Template};

/// Which generation passes to run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DrawRequest {
    /// Skip the information content page, or the consensus page with `indi`
    pub quiet: bool,
    /// Posterior probability pages
    pub prob: bool,
    pub ins: bool,
    /// Average insert length after each column
    pub iavglen: bool,
    pub dall: bool,
    pub dint: bool,
    /// Extra information from base pairs
    pub structure: bool,
    /// Fraction of sequences spanning each column
    pub span: bool,
    /// One page per sequence instead of alignment summaries
    pub indi: bool,
    /// With `indi`, draw every sequence
    pub all: bool,
    /// Draw the mask itself
    pub mask_col: bool,
}

/// A mask with the file name it is reported under.
#[derive(Clone, Debug)]
pub struct NamedMask {
    pub mask: Mask,
    pub file: String,
}

/// Everything besides the template and the alignment.
#[derive(Clone, Debug, Default)]
pub struct Extras {
    pub mask: Option<NamedMask>,
    /// Second mask, compared against `mask`
    pub mask_diff: Option<NamedMask>,
    /// Draw file source and name
    pub drawfile: Option<(String, String)>,
    /// With `indi`, source and name of a file listing the sequences to draw
    pub list: Option<(String, String)>,
}

/// The kind of output a run produces. Earlier variants win.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    DrawFile,
    SimpleMask,
    Individual,
    Alignment,
}

impl DrawRequest {
    pub fn mode(&self, extras: &Extras) -> Mode {
        if extras.drawfile.is_some() {
            Mode::DrawFile
        } else if self.mask_col || extras.mask_diff.is_some() {
            Mode::SimpleMask
        } else if self.indi {
            Mode::Individual
        } else {
            Mode::Alignment
        }
    }

    /// Reject option combinations that have no meaning together.
    pub fn check(&self, extras: &Extras) -> Result<()> {
        if self.indi {
            for (set, flag) in [
                (self.ins, "ins"),
                (self.iavglen, "iavglen"),
                (self.dall, "dall"),
                (self.dint, "dint"),
                (self.structure, "struct"),
                (self.span, "span"),
            ] {
                if set {
                    return Err(DrawError::validation(format!(
                        "--{flag} is incompatible with --indi"
                    )));
                }
            }
        } else if self.all {
            return Err(DrawError::validation("--all requires --indi"));
        } else if extras.list.is_some() {
            return Err(DrawError::validation("--list requires --indi"));
        }
        if extras.mask.is_none() {
            if self.mask_col {
                return Err(DrawError::validation("--mask-col requires --mask"));
            }
            if extras.mask_diff.is_some() {
                return Err(DrawError::validation("--mask-diff requires --mask"));
            }
        }
        if let (Some(m1), Some(m2)) = (&extras.mask, &extras.mask_diff) {
            if m1.mask.len() != m2.mask.len() {
                return Err(DrawError::validation(format!(
                    "mask in {} has length {}, mask in {} has length {}; they must be equal",
                    m1.file,
                    m1.mask.len(),
                    m2.file,
                    m2.mask.len()
                )));
            }
        }
        Ok(())
    }

    /// Footer and ordering options implied by the request.
    pub fn apply_to(&self, extras: &Extras, opts: &mut RenderOptions) {
        opts.interleave_posteriors =
            self.indi && (self.all || extras.list.is_some()) && self.prob;
        opts.mask_file = extras.mask.as_ref().map(|m| m.file.clone());
        opts.mask_diff_file = extras.mask_diff.as_ref().map(|m| m.file.clone());
    }
}

/// Find the template instance for `aln` and run the requested passes.
pub fn build_diagram(
    template_src: &str,
    template_file: &str,
    aln: &Alignment,
    req: &DrawRequest,
    extras: &Extras,
) -> Result<Diagram> {
    req.check(extras)?;
    let mode = req.mode(extras);
    let map = aln.consensus_map()?;
    let clen = map.clen();
    debug!("alignment consensus length {clen}, mode {mode:?}");

    let template = find_template(template_src, template_file, clen)?;
    let pairs = aln.consensus_pairs(&map)?;
    let mut d = Diagram::new(template)?;
    d.msa_nbp = count_pairs(&pairs);
    d.nseq = aln.nseq();
    d.seq_lengths = (0..aln.nseq()).map(|i| aln.unaligned_len(i)).collect();

    let nbp = d.template.nbp();
    if nbp != 0 && nbp != d.msa_nbp {
        return Err(DrawError::validation(format!(
            "expected {nbp} basepairs in alignment's SS_cons, but read {}",
            d.msa_nbp
        )));
    }
    if mode != Mode::SimpleMask {
        if let Some(m) = &extras.mask {
            d.attach_mask(m.mask.clone())?;
        }
    }

    match mode {
        Mode::Alignment => {
            if !req.quiet {
                stats::info_content(&mut d, aln, &map)?;
            }
            if req.structure {
                stats::structural_info(&mut d, aln, &map, &pairs)?;
            }
            if req.ins {
                stats::insertions(&mut d, aln, &map)?;
            }
            if req.iavglen {
                stats::insert_avg_len(&mut d, aln, &map)?;
            }
            if req.dall {
                stats::deletions(&mut d, aln, &map, false)?;
            }
            if req.dint {
                stats::deletions(&mut d, aln, &map, true)?;
            }
            if req.prob {
                stats::posteriors(&mut d, aln, &map, None)?;
            }
            if req.span {
                stats::span(&mut d, aln, &map)?;
            }
        }
        Mode::Individual => {
            if !req.quiet {
                pages::consensus_seq(&mut d, aln, &map)?;
            }
            let seqs = match &extras.list {
                Some((src, file)) => Some(pages::listed_seqs(aln, src, file)?),
                None if req.all => Some((0..aln.nseq()).collect()),
                None => None,
            };
            if let Some(seqs) = seqs {
                pages::individual_seqs(&mut d, aln, &map, &seqs)?;
                if req.prob {
                    stats::posteriors(&mut d, aln, &map, Some(seqs.as_slice()))?;
                }
            }
        }
        Mode::SimpleMask => {
            // check() guarantees a primary mask in this mode
            if let Some(m) = &extras.mask {
                if req.mask_col {
                    pages::color_mask(&mut d, &m.mask, &m.file)?;
                }
                if let Some(m2) = &extras.mask_diff {
                    pages::diff_mask(&mut d, &m.mask, &m.file, &m2.mask, &m2.file)?;
                }
            }
        }
        Mode::DrawFile => {
            if let Some((src, file)) = &extras.drawfile {
                drawfile::parse_drawfile(&mut d, src, file)?;
            }
        }
    }
    info!("{} page(s) drawn", d.pages.len());
    Ok(d)
}

/// Build the diagram and render it as PostScript.
pub fn render_document(
    template_src: &str,
    template_file: &str,
    aln: &Alignment,
    req: &DrawRequest,
    extras: &Extras,
    opts: &RenderOptions,
) -> Result<String> {
    let d = build_diagram(template_src, template_file, aln, req, extras)?;
    let mut opts = opts.clone();
    req.apply_to(extras, &mut opts);
    render(&d, &opts)
}

/// The diagram model as pretty JSON.
pub fn diagram_json(d: &Diagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(d)?)
}
