//! Pages colored by per-column alignment statistics.

use log::info;

use crate::alignment::{
    count_pair, count_residue, entropy, is_gap, normalize, Alignment, ConsensusMap, K,
};
use crate::color::{Cmyk, Scheme, BLACK, DARK_GREY, LIGHT_GREY};
use crate::error::{DrawError, Result};
use crate::legend::NO_UPPER_LIMIT;
use crate::model::{Diagram, PageMode};

/// Tolerance below zero allowed for the structural information of a pair.
const PAIR_INFO_TOLERANCE: f64 = 5e-9;

const INFO_LIMITS: [f32; 7] = [0.0, 0.4, 0.8, 1.2, 1.6, 1.99, 2.0];
const STRUCT_LIMITS: [f32; 7] = [0.0, 0.16, 0.33, 0.50, 0.66, 0.83, 1.0];
const FRACTION_LIMITS: [f32; 7] = [0.0, 0.167, 0.333, 0.5, 0.667, 0.833, 1.0];
const POSTERIOR_LIMITS: [f32; 7] = [0.0, 0.8, 0.9, 0.925, 0.95, 0.975, 1.0];
const INSERT_LEN_LIMITS: [f32; 7] = [1.0, 1.01, 1.5, 3.0, 4.0, 10.0, NO_UPPER_LIMIT];

/// Legends and labels of a statistic page.
struct PageSpec<'a> {
    scheme: Scheme,
    limits: &'a [f32],
    legend: &'a str,
    onecells: &'a [(Cmyk, &'a str)],
}

/// Set up the colors, blank residue overlay and legends of an existing page.
fn prepare_page(d: &mut Diagram, p: usize, spec: &PageSpec) -> Result<()> {
    d.alloc_colors(p)?;
    d.alloc_residues(p)?;
    d.add_scheme_legend(p, spec.scheme, spec.limits, spec.legend)?;
    for &(color, text) in spec.onecells {
        d.add_onecell_legend(p, color, text)?;
    }
    Ok(())
}

fn alignment_page(d: &mut Diagram, spec: &PageSpec, description: &str) -> Result<usize> {
    let p = d.add_pages(1, PageMode::Alignment).start;
    prepare_page(d, p, spec)?;
    d.set_page_description(p, description)?;
    Ok(p)
}

fn background_entropy(n: usize) -> f64 {
    entropy(&vec![1.0 / n as f64; n])
}

/// Residue counts of one consensus column, over all sequences.
fn column_counts(aln: &Alignment, apos: usize) -> [f64; K] {
    let mut obs = [0.0; K];
    for seq in &aln.seqs {
        if !is_gap(seq[apos]) {
            count_residue(&mut obs, seq[apos]);
        }
    }
    obs
}

/// Information content per consensus column, in bits.
pub fn info_content(d: &mut Diagram, aln: &Alignment, map: &ConsensusMap) -> Result<()> {
    let spec = PageSpec {
        scheme: Scheme::SixRedLow,
        limits: &INFO_LIMITS,
        legend: "information content (bits)",
        onecells: &[(LIGHT_GREY, "100% gaps")],
    };
    let p = alignment_page(d, &spec, "information content per position")?;
    let bg = background_entropy(K);

    for (cpos, &apos) in map.c2a.iter().enumerate() {
        let mut obs = column_counts(aln, apos);
        let zero_obs = obs.iter().sum::<f64>() == 0.0;
        normalize(&mut obs);
        if zero_obs {
            d.paint_onecell(p, cpos, 0)?;
        } else {
            d.paint_scheme(p, cpos, (bg - entropy(&obs)) as f32)?;
        }
    }
    info!("information content: page {}", p + 1);
    Ok(())
}

/// Extra information from modelling each consensus base pair jointly.
///
/// Only sequences with residues at both ends of a pair contribute. The pair's
/// information is halved and shown on both of its columns.
pub fn structural_info(
    d: &mut Diagram,
    aln: &Alignment,
    map: &ConsensusMap,
    pairs: &[Option<usize>],
) -> Result<()> {
    let spec = PageSpec {
        scheme: Scheme::SixRedLow,
        limits: &STRUCT_LIMITS,
        legend: "extra information from structure (bits)",
        onecells: &[(DARK_GREY, "single-stranded"), (LIGHT_GREY, "100% gaps")],
    };
    let p = alignment_page(
        d,
        &spec,
        "extra information from structure per basepaired position",
    )?;
    let clen = map.clen();

    let mut nres = vec![0usize; clen];
    let mut obs = vec![[0.0; K]; clen];
    let mut obs_p = vec![[0.0; K * K]; clen];
    for seq in &aln.seqs {
        for (cpos, &apos) in map.c2a.iter().enumerate() {
            let c = seq[apos];
            if is_gap(c) {
                continue;
            }
            nres[cpos] += 1;
            let Some(partner) = pairs[cpos] else { continue };
            let pc = seq[map.c2a[partner]];
            if is_gap(pc) {
                continue;
            }
            count_residue(&mut obs[cpos], c);
            if partner > cpos {
                count_pair(&mut obs_p[cpos], c, pc);
                count_pair(&mut obs_p[partner], c, pc);
            }
        }
    }

    let bg = background_entropy(K);
    let bg_p = background_entropy(K * K);
    let ent: Vec<f64> = obs
        .iter_mut()
        .map(|o| {
            normalize(o);
            bg - entropy(o)
        })
        .collect();

    for cpos in 0..clen {
        if nres[cpos] == 0 {
            d.paint_onecell(p, cpos, 1)?;
            continue;
        }
        let Some(partner) = pairs[cpos] else {
            d.paint_onecell(p, cpos, 0)?;
            continue;
        };
        normalize(&mut obs_p[cpos]);
        let pair_info = ((bg_p - entropy(&obs_p[cpos])) - ent[cpos] - ent[partner]) / 2.0;
        if pair_info < -PAIR_INFO_TOLERANCE {
            return Err(DrawError::validation(format!(
                "pair information < 0: {pair_info} (lpos: {cpos} rpos: {partner})"
            )));
        }
        d.paint_scheme(p, cpos, pair_info.max(0.0) as f32)?;
    }
    info!("structural information: page {}", p + 1);
    Ok(())
}

/// Fraction of sequences with a gap in each consensus column.
///
/// With `internal` set a gap only counts when it lies between the sequence's
/// first and last occupied consensus columns.
pub fn deletions(
    d: &mut Diagram,
    aln: &Alignment,
    map: &ConsensusMap,
    internal: bool,
) -> Result<()> {
    let (legend, onecell, description) = if internal {
        (
            "fraction of seqs w/internal deletions",
            "zero internal deletions",
            "frequency of internal (non-terminal) deletions in each position",
        )
    } else {
        (
            "fraction of seqs with deletes",
            "zero deletions",
            "frequency of deletions at each position",
        )
    };
    let spec = PageSpec {
        scheme: Scheme::SixRedHigh,
        limits: &FRACTION_LIMITS,
        legend,
        onecells: &[(LIGHT_GREY, onecell)],
    };
    let p = alignment_page(d, &spec, description)?;

    let mut dct = vec![0usize; map.clen()];
    for seq in &aln.seqs {
        let occupied = || map.c2a.iter().map(|&apos| !is_gap(seq[apos]));
        let first = occupied().position(|o| o);
        let last = occupied().rposition(|o| o);
        for (cpos, occ) in occupied().enumerate() {
            if occ {
                continue;
            }
            let inside = matches!((first, last), (Some(f), Some(l)) if f <= cpos && cpos <= l);
            if !internal || inside {
                dct[cpos] += 1;
            }
        }
    }

    let nseq = aln.nseq() as f32;
    for (cpos, &n) in dct.iter().enumerate() {
        if n == 0 {
            d.paint_onecell(p, cpos, 0)?;
        } else {
            d.paint_scheme(p, cpos, n as f32 / nseq)?;
        }
    }
    info!(
        "{} deletions: page {}",
        if internal { "internal" } else { "all" },
        p + 1
    );
    Ok(())
}

/// Overlay symbol for a median insert length.
fn median_char(len: usize) -> char {
    match len {
        0..=9 => char::from(b'0' + len as u8),
        _ => '*',
    }
}

/// Residues each sequence inserts after each consensus column.
///
/// Indexed `[k][seq]`, where `k` is the 1-based consensus column the insert
/// follows and 0 holds inserts before the first column.
fn insert_counts(aln: &Alignment, map: &ConsensusMap) -> Vec<Vec<usize>> {
    let mut ict = vec![vec![0usize; aln.nseq()]; map.clen() + 1];
    let mut k = 0;
    for (apos, after) in map.a2c.iter().enumerate() {
        if after.is_some() {
            k += 1;
            continue;
        }
        for (i, seq) in aln.seqs.iter().enumerate() {
            if !is_gap(seq[apos]) {
                ict[k][i] += 1;
            }
        }
    }
    ict
}

/// Fraction of sequences inserting after each consensus column, with the
/// median insert length of those sequences drawn over the column.
pub fn insertions(d: &mut Diagram, aln: &Alignment, map: &ConsensusMap) -> Result<()> {
    let spec = PageSpec {
        scheme: Scheme::SixRedHigh,
        limits: &FRACTION_LIMITS,
        legend: "fraction of seqs w/insertions",
        onecells: &[(LIGHT_GREY, "zero insertions")],
    };
    let p = alignment_page(d, &spec, "frequency of insertions after each position")?;
    let nseq = aln.nseq();
    let ict = insert_counts(aln, map);

    for (cpos, counts) in ict.iter().skip(1).enumerate() {
        let mut lens: Vec<usize> = counts.iter().copied().filter(|&n| n > 0).collect();
        if lens.is_empty() {
            d.paint_onecell(p, cpos, 0)?;
            d.set_column_char(p, cpos, '-')?;
            continue;
        }
        lens.sort_unstable();
        // upper median, no averaging for even counts
        let median = lens[lens.len() / 2];
        d.paint_scheme(p, cpos, lens.len() as f32 / nseq as f32)?;
        d.set_column_char(p, cpos, median_char(median))?;
    }
    info!("insertions: page {}", p + 1);
    Ok(())
}

/// Mean insert length after each consensus column, over the sequences that
/// insert there.
pub fn insert_avg_len(d: &mut Diagram, aln: &Alignment, map: &ConsensusMap) -> Result<()> {
    let spec = PageSpec {
        scheme: Scheme::SixRedHigh,
        limits: &INSERT_LEN_LIMITS,
        legend: "average insertion length",
        onecells: &[(LIGHT_GREY, "zero insertions")],
    };
    let p = alignment_page(d, &spec, "average insertion length after each position")?;
    let ict = insert_counts(aln, map);

    for (cpos, counts) in ict.iter().skip(1).enumerate() {
        let nins: usize = counts.iter().sum();
        let nseq_with_ins = counts.iter().filter(|&&n| n > 0).count();
        if nseq_with_ins == 0 {
            d.paint_onecell(p, cpos, 0)?;
        } else {
            d.paint_scheme(p, cpos, nins as f32 / nseq_with_ins as f32)?;
        }
    }
    info!("average insert length: page {}", p + 1);
    Ok(())
}

/// Sequences spanning each consensus column.
///
/// A sequence spans a column when it has a residue in some alignment column
/// at or before it and another at or after it. Inserts count.
pub fn span_counts(aln: &Alignment, map: &ConsensusMap) -> Vec<usize> {
    let mut span = vec![0usize; map.clen()];
    for seq in &aln.seqs {
        let first = seq.iter().position(|&c| !is_gap(c));
        let last = seq.iter().rposition(|&c| !is_gap(c));
        let (Some(first), Some(last)) = (first, last) else {
            continue;
        };
        for (cpos, &apos) in map.c2a.iter().enumerate() {
            if first <= apos && apos <= last {
                span[cpos] += 1;
            }
        }
    }
    span
}

/// Fraction of sequences spanning each consensus column.
pub fn span(d: &mut Diagram, aln: &Alignment, map: &ConsensusMap) -> Result<()> {
    let spec = PageSpec {
        scheme: Scheme::SixRedLow,
        limits: &FRACTION_LIMITS,
        legend: "fraction of seqs that span each position",
        onecells: &[(LIGHT_GREY, "no sequences span"), (BLACK, "100% of seqs span")],
    };
    let p = alignment_page(d, &spec, "fraction of sequences that span each position")?;
    let nseq = aln.nseq();

    for (cpos, n) in span_counts(aln, map).into_iter().enumerate() {
        if n == 0 {
            d.paint_onecell(p, cpos, 0)?;
        } else if n == nseq {
            d.paint_onecell(p, cpos, 1)?;
        } else {
            d.paint_scheme(p, cpos, n as f32 / nseq as f32)?;
        }
    }
    info!("span: page {}", p + 1);
    Ok(())
}

/// Posterior probability encoded by a tens/ones digit pair, `None` for a gap.
fn posterior(tens: u8, ones: u8) -> Result<Option<f32>> {
    if is_gap(tens) {
        return Ok(None);
    }
    if is_gap(ones) {
        return Err(DrawError::validation(
            "post 'tens' value non-gap but post 'ones' value is gap",
        ));
    }
    if tens == b'*' {
        if ones != b'*' {
            return Err(DrawError::validation(
                "post 'tens' value '*' but post 'ones' value != '*'",
            ));
        }
        return Ok(Some(1.0));
    }
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return Err(DrawError::validation(format!(
            "invalid posterior annotation '{}{}'",
            tens as char, ones as char
        )));
    }
    let (t, o) = ((tens - b'0') as f64, (ones - b'0') as f64);
    Ok(Some(((t * 10.0 + o) * 0.01) as f32))
}

/// Posterior track of sequence `s`, as (tens, ones).
fn posterior_track(aln: &Alignment, s: usize) -> Result<(&[u8], &[u8])> {
    match (&aln.post_tens[s], &aln.post_ones[s]) {
        (Some(t), Some(o)) => Ok((t.as_slice(), o.as_slice())),
        _ => Err(DrawError::validation(format!(
            "posterior pages require \"#=GR POSTX.\" and \"#=GR POST.X\" annotation, missing for sequence {}",
            aln.names[s]
        ))),
    }
}

fn with_column(err: DrawError, s: usize, apos: usize) -> DrawError {
    DrawError::validation(format!("reading post annotation for seq: {s} aln column: {apos}, {err}"))
}

/// Posterior probability pages: one per listed sequence when `individual`
/// is given, otherwise one page with the per-column average over all
/// sequences.
pub fn posteriors(
    d: &mut Diagram,
    aln: &Alignment,
    map: &ConsensusMap,
    individual: Option<&[usize]>,
) -> Result<()> {
    if let Some(seqs) = individual {
        let spec = PageSpec {
            scheme: Scheme::SixRedLow,
            limits: &POSTERIOR_LIMITS,
            legend: "posterior probability (alnment confidence)",
            onecells: &[(LIGHT_GREY, "gap")],
        };
        let tracks = seqs
            .iter()
            .map(|&s| posterior_track(aln, s))
            .collect::<Result<Vec<_>>>()?;
        let pages = d.add_pages(seqs.len(), PageMode::Individual);
        for ((&s, (tens, ones)), p) in seqs.iter().zip(tracks).zip(pages.clone()) {
            prepare_page(d, p, &spec)?;
            for (cpos, &apos) in map.c2a.iter().enumerate() {
                match posterior(tens[apos], ones[apos]).map_err(|e| with_column(e, s, apos))? {
                    Some(prob) => d.paint_scheme(p, cpos, prob)?,
                    None => d.paint_onecell(p, cpos, 0)?,
                }
            }
            d.pages[p].seq_idx = Some(s);
            d.set_page_description(p, &aln.names[s])?;
        }
        info!("posterior probabilities: pages {}-{}", pages.start + 1, pages.end);
        return Ok(());
    }

    let tracks = (0..aln.nseq())
        .map(|s| posterior_track(aln, s))
        .collect::<Result<Vec<_>>>()?;
    let spec = PageSpec {
        scheme: Scheme::SixRedLow,
        limits: &POSTERIOR_LIMITS,
        legend: "average posterior probability (alnment confidence)",
        onecells: &[(LIGHT_GREY, "100% gaps")],
    };
    let p = alignment_page(d, &spec, "average posterior probability (confidence) per position")?;
    let mut sum = vec![0.0f32; map.clen()];
    let mut nongap = vec![0usize; map.clen()];
    for (s, (tens, ones)) in tracks.iter().enumerate() {
        for apos in 0..aln.alen() {
            let prob = posterior(tens[apos], ones[apos]).map_err(|e| with_column(e, s, apos))?;
            if let (Some(prob), Some(cpos)) = (prob, map.a2c[apos]) {
                sum[cpos] += prob;
                nongap[cpos] += 1;
            }
        }
    }
    for cpos in 0..map.clen() {
        if nongap[cpos] == 0 {
            d.paint_onecell(p, cpos, 0)?;
        } else {
            d.paint_scheme(p, cpos, sum[cpos] / nongap[cpos] as f32)?;
        }
    }
    info!("average posterior probability: page {}", p + 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Line, Point, Template};

    fn diagram(clen: usize) -> Diagram {
        let t = Template {
            model_name: Some("toy".into()),
            scale: 1.0,
            bpconnects: vec![Line {
                x1: 0.0,
                y1: 0.0,
                x2: 1.0,
                y2: 1.0,
            }],
            residues: (0..clen)
                .map(|i| Point {
                    x: 100.0 + 10.0 * i as f32,
                    y: 400.0,
                })
                .collect(),
            ..Default::default()
        };
        Diagram::new(t).unwrap()
    }

    fn alignment(rows: &[&str], rf: &str, ss: &str) -> Alignment {
        Alignment {
            names: (0..rows.len()).map(|i| format!("seq{}", i + 1)).collect(),
            seqs: rows.iter().map(|r| r.as_bytes().to_vec()).collect(),
            rf: Some(rf.as_bytes().to_vec()),
            ss_cons: Some(ss.into()),
            post_tens: vec![None; rows.len()],
            post_ones: vec![None; rows.len()],
        }
    }

    fn counts(d: &Diagram, p: usize) -> (Vec<usize>, Vec<usize>) {
        let page = &d.pages[p];
        (
            page.scheme.as_ref().unwrap().counts.clone(),
            page.onecell.iter().map(|o| o.nres).collect(),
        )
    }

    #[test]
    fn test_info_content() {
        let aln = alignment(&["AC-G", "AG-G"], "xxxx", "....");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(4);
        info_content(&mut d, &aln, &map).unwrap();
        let (scheme, onecell) = counts(&d, 0);
        // A and G conserved: 2 bits; C/G split: 1 bit
        assert_eq!(scheme, vec![0, 0, 1, 0, 0, 2]);
        assert_eq!(onecell, vec![1]);
        assert_eq!(d.pages[0].colors.as_ref().unwrap()[2], LIGHT_GREY);
    }

    #[test]
    fn test_info_content_degenerate() {
        let aln = alignment(&["N"], "x", ".");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(1);
        info_content(&mut d, &aln, &map).unwrap();
        assert_eq!(counts(&d, 0).0, vec![1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_structural_info() {
        // covarying pair 0-3, column 1 unpaired, column 2 all gaps
        let aln = alignment(&["GA-C", "CA-G", "AA-U", "UA-A"], "xxxx", "<..>");
        let map = aln.consensus_map().unwrap();
        let pairs = aln.consensus_pairs(&map).unwrap();
        let mut d = diagram(4);
        structural_info(&mut d, &aln, &map, &pairs).unwrap();
        let (scheme, onecell) = counts(&d, 0);
        assert_eq!(scheme, vec![0, 0, 0, 0, 0, 2]);
        assert_eq!(onecell, vec![1, 1]);
        assert_eq!(scheme.iter().sum::<usize>() + onecell.iter().sum::<usize>(), 4);
        assert_eq!(d.pages[0].colors.as_ref().unwrap()[1], DARK_GREY);
    }

    #[test]
    fn test_deletions_all_and_internal() {
        let aln = alignment(&["-AC-G", "AA--G", "AACG-"], "xxxxx", ".....");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(5);
        deletions(&mut d, &aln, &map, false).unwrap();
        deletions(&mut d, &aln, &map, true).unwrap();
        // all: 1/3 at 0, 2 and 4, 2/3 at 3
        assert_eq!(counts(&d, 0), (vec![0, 0, 3, 1, 0, 0], vec![1]));
        // internal: 1/3 at 2, 2/3 at 3
        assert_eq!(counts(&d, 1), (vec![0, 0, 1, 1, 0, 0], vec![3]));
        assert_eq!(
            d.pages[1].description.as_deref(),
            Some("frequency of internal (non-terminal) deletions in each position")
        );
    }

    #[test]
    fn test_insertions_median() {
        // inserts after column 1: lengths 1, 3 and 2, median 2
        let aln = alignment(&["AC...G", "Acu..G", "AcuuuG", "Acuu.G"], "xx...x", "......");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(3);
        insertions(&mut d, &aln, &map).unwrap();
        let residues = d.pages[0].residues.clone().unwrap();
        assert_eq!(residues, vec!['-', '2', '-']);
        // 3 of 4 sequences insert
        assert_eq!(counts(&d, 0), (vec![0, 0, 0, 0, 1, 0], vec![2]));
    }

    #[test]
    fn test_insert_avg_len() {
        // 6 residues inserted after column 1 by 3 sequences
        let aln = alignment(&["AC...G", "Acu..G", "AcuuuG", "Acuu.G"], "xx...x", "......");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(3);
        insert_avg_len(&mut d, &aln, &map).unwrap();
        assert_eq!(counts(&d, 0), (vec![0, 0, 1, 0, 0, 0], vec![2]));
        assert!(d.pages[0].residues.as_ref().unwrap().iter().all(|&c| c == ' '));
        assert_eq!(
            d.pages[0].description.as_deref(),
            Some("average insertion length after each position")
        );
    }

    #[test]
    fn test_insert_avg_len_unbounded_bin() {
        let row = format!("A{}C", "a".repeat(11));
        let rf = format!("x{}x", ".".repeat(11));
        let aln = alignment(&[row.as_str()], &rf, &".".repeat(13));
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(2);
        insert_avg_len(&mut d, &aln, &map).unwrap();
        assert_eq!(counts(&d, 0), (vec![0, 0, 0, 0, 0, 1], vec![1]));
    }

    #[test]
    fn test_span() {
        // column 0 spanned by nobody, 2 and 3 by everybody
        let aln = alignment(&["--AC-", "-AACG", "-A--G"], "xxxxx", ".....");
        let map = aln.consensus_map().unwrap();
        assert_eq!(span_counts(&aln, &map), vec![0, 2, 3, 3, 2]);

        let mut d = diagram(5);
        span(&mut d, &aln, &map).unwrap();
        assert_eq!(counts(&d, 0), (vec![0, 0, 0, 3, 0, 0], vec![1, 2]));
        let colors = d.pages[0].colors.as_ref().unwrap();
        assert_eq!(colors[0], LIGHT_GREY);
        assert_eq!(colors[2], BLACK);
    }

    #[test]
    fn test_span_counts_inserts() {
        // a lone insert residue spans no consensus column
        let aln = alignment(&["AC.G", "-.a-", "a-.-"], "xx.x", "....");
        let map = aln.consensus_map().unwrap();
        assert_eq!(span_counts(&aln, &map), vec![2, 1, 1]);
    }

    #[test]
    fn test_median_char() {
        assert_eq!(median_char(0), '0');
        assert_eq!(median_char(9), '9');
        assert_eq!(median_char(10), '*');
    }

    #[test]
    fn test_posterior_decoding() {
        assert_eq!(posterior(b'.', b'.').unwrap(), None);
        assert_eq!(posterior(b'*', b'*').unwrap(), Some(1.0));
        assert_eq!(posterior(b'9', b'5').unwrap(), Some(0.95));
        assert_eq!(posterior(b'0', b'0').unwrap(), Some(0.0));
        assert!(posterior(b'9', b'.').is_err());
        assert!(posterior(b'*', b'9').is_err());
    }

    #[test]
    fn test_posteriors_average_and_individual() {
        let mut aln = alignment(&["AC-", "A-G"], "xxx", "...");
        aln.post_tens = vec![Some(b"*9.".to_vec()), Some(b"7.9".to_vec())];
        aln.post_ones = vec![Some(b"*3.".to_vec()), Some(b"0.9".to_vec())];
        let map = aln.consensus_map().unwrap();

        let mut d = diagram(3);
        posteriors(&mut d, &aln, &map, None).unwrap();
        // averages 0.85, 0.93, 0.99
        assert_eq!(counts(&d, 0), (vec![0, 1, 0, 1, 0, 1], vec![0]));

        posteriors(&mut d, &aln, &map, Some(&[0, 1][..])).unwrap();
        assert_eq!(d.pages.len(), 3);
        assert_eq!(d.pages[1].mode, PageMode::Individual);
        assert_eq!(d.pages[1].seq_idx, Some(0));
        assert_eq!(d.pages[2].description.as_deref(), Some("seq2"));
        assert_eq!(counts(&d, 1), (vec![0, 0, 0, 1, 0, 1], vec![1]));
    }

    #[test]
    fn test_posteriors_for_listed_sequences() {
        let mut aln = alignment(&["AC-", "A-G"], "xxx", "...");
        // the unlisted first sequence needs no annotation
        aln.post_ones = vec![None, Some(b"0.9".to_vec())];
        aln.post_tens = vec![None, Some(b"7.9".to_vec())];
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(3);
        posteriors(&mut d, &aln, &map, Some(&[1][..])).unwrap();
        assert_eq!(d.pages.len(), 1);
        assert_eq!(d.pages[0].seq_idx, Some(1));
        assert_eq!(d.pages[0].description.as_deref(), Some("seq2"));
    }

    #[test]
    fn test_posteriors_require_annotation() {
        let aln = alignment(&["AC"], "xx", "..");
        let map = aln.consensus_map().unwrap();
        let mut d = diagram(2);
        let err = posteriors(&mut d, &aln, &map, None).unwrap_err();
        assert!(err.to_string().contains("POSTX."));
    }
}
