//! Pages that show sequences or masks rather than statistics.

use log::info;

use crate::alignment::{Alignment, ConsensusMap};
use crate::color::{BLACK, CYAN, LIGHT_GREY, MAGENTA};
use crate::error::{DrawError, Result};
use crate::mask::Mask;
use crate::model::{Diagram, PageMode};

/// Description of the consensus page.
pub const CONSENSUS_NAME: &str = "*CONSENSUS*";

/// One page per sequence in `seqs` with its residues at the consensus
/// columns.
pub fn individual_seqs(
    d: &mut Diagram,
    aln: &Alignment,
    map: &ConsensusMap,
    seqs: &[usize],
) -> Result<()> {
    let pages = d.add_pages(seqs.len(), PageMode::Individual);
    for (&s, p) in seqs.iter().zip(pages.clone()) {
        d.alloc_residues(p)?;
        for (cpos, &apos) in map.c2a.iter().enumerate() {
            d.set_column_char(p, cpos, aln.seqs[s][apos] as char)?;
        }
        d.pages[p].seq_idx = Some(s);
        d.set_page_description(p, &aln.names[s])?;
    }
    info!("individual sequences: pages {}-{}", pages.start + 1, pages.end);
    Ok(())
}

/// Alignment indices of the sequences named in a list file, in alignment
/// order. Names are whitespace separated and may repeat.
pub fn listed_seqs(aln: &Alignment, src: &str, file: &str) -> Result<Vec<usize>> {
    let mut used = vec![false; aln.nseq()];
    for name in src.split_whitespace() {
        let s = aln.names.iter().position(|n| n == name).ok_or_else(|| {
            DrawError::validation(format!(
                "sequence {name} listed in {file} does not exist in the alignment"
            ))
        })?;
        used[s] = true;
    }
    Ok((0..aln.nseq()).filter(|&s| used[s]).collect())
}

/// The reference annotation drawn as a sequence.
pub fn consensus_seq(d: &mut Diagram, aln: &Alignment, map: &ConsensusMap) -> Result<()> {
    let rf = aln
        .rf
        .as_ref()
        .ok_or_else(|| DrawError::validation("alignment has no #=GC RF annotation"))?;
    let p = d.add_pages(1, PageMode::Individual).start;
    d.alloc_residues(p)?;
    for (cpos, &apos) in map.c2a.iter().enumerate() {
        d.set_column_char(p, cpos, rf[apos] as char)?;
    }
    d.set_page_description(p, CONSENSUS_NAME)?;
    info!("consensus sequence: page {}", p + 1);
    Ok(())
}

fn check_mask_len(d: &Diagram, mask: &Mask, name: &str) -> Result<()> {
    if mask.len() != d.clen() {
        return Err(DrawError::validation(format!(
            "mask {name} has length {}, expected consensus length {}",
            mask.len(),
            d.clen()
        )));
    }
    Ok(())
}

fn mask_page(d: &mut Diagram) -> Result<usize> {
    let p = d.add_pages(1, PageMode::SimpleMask).start;
    d.alloc_colors(p)?;
    d.alloc_residues(p)?;
    Ok(p)
}

/// Included columns black; excluded ones magenta when the mask has internal
/// exclusions, light grey when it only trims the ends.
pub fn color_mask(d: &mut Diagram, mask: &Mask, mask_file: &str) -> Result<()> {
    check_mask_len(d, mask, mask_file)?;
    let excluded = if mask.has_internal_zeroes() {
        MAGENTA
    } else {
        LIGHT_GREY
    };
    let p = mask_page(d)?;
    let inc = d.add_onecell_legend(p, BLACK, "columns included by mask")?;
    let exc = d.add_onecell_legend(p, excluded, "columns excluded by mask")?;
    for cpos in 0..d.clen() {
        let legend = if mask.includes(cpos) { inc } else { exc };
        d.paint_onecell(p, cpos, legend)?;
    }
    d.set_page_description(p, &format!("mask file: {mask_file}"))?;
    info!("mask {mask_file}: page {}", p + 1);
    Ok(())
}

/// Columns colored by how two masks agree.
pub fn diff_mask(
    d: &mut Diagram,
    mask1: &Mask,
    mask1_file: &str,
    mask2: &Mask,
    mask2_file: &str,
) -> Result<()> {
    check_mask_len(d, mask1, mask1_file)?;
    check_mask_len(d, mask2, mask2_file)?;
    let p = mask_page(d)?;
    let both = d.add_onecell_legend(p, BLACK, "included by both masks")?;
    let only1 = d.add_onecell_legend(p, CYAN, "incl. mask 1, excl. mask 2")?;
    let only2 = d.add_onecell_legend(p, MAGENTA, "excl. mask 1, incl. mask 2")?;
    let neither = d.add_onecell_legend(p, LIGHT_GREY, "excluded by both masks")?;
    for cpos in 0..d.clen() {
        let legend = match (mask1.includes(cpos), mask2.includes(cpos)) {
            (true, true) => both,
            (true, false) => only1,
            (false, true) => only2,
            (false, false) => neither,
        };
        d.paint_onecell(p, cpos, legend)?;
    }
    d.set_diffmask_description(p, mask1_file, mask2_file)?;
    info!("mask difference {mask1_file} vs {mask2_file}: page {}", p + 1);
    Ok(())
}
