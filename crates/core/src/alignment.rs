//! RNA alignments: alphabet, WUSS structure strings and consensus columns.

use serde::Serialize;

use crate::error::{DrawError, Result};

/// Canonical residues, in counting order.
pub const RESIDUES: [char; 4] = ['A', 'C', 'G', 'U'];
pub const K: usize = RESIDUES.len();

pub fn is_gap(c: u8) -> bool {
    matches!(c, b'-' | b'.' | b'_')
}

/// Canonical residues a symbol stands for, or `None` for symbols that
/// carry no residue information (gaps, `*`, `~`).
fn degeneracy(c: u8) -> Option<&'static [usize]> {
    let set: &'static [usize] = match c.to_ascii_uppercase() {
        b'A' => &[0],
        b'C' => &[1],
        b'G' => &[2],
        b'U' | b'T' => &[3],
        b'R' => &[0, 2],
        b'Y' => &[1, 3],
        b'M' => &[0, 1],
        b'K' => &[2, 3],
        b'S' => &[1, 2],
        b'W' => &[0, 3],
        b'H' => &[0, 1, 3],
        b'B' => &[1, 2, 3],
        b'V' => &[0, 1, 2],
        b'D' => &[0, 2, 3],
        b'N' | b'X' => &[0, 1, 2, 3],
        _ => return None,
    };
    Some(set)
}

/// True for every symbol an RNA alignment row may hold.
pub fn is_valid_symbol(c: u8) -> bool {
    is_gap(c) || matches!(c, b'*' | b'~') || degeneracy(c).is_some()
}

/// Per-residue weights of a symbol; degenerate codes spread one count evenly.
pub fn residue_weights(c: u8) -> Option<[f64; K]> {
    let set = degeneracy(c)?;
    let mut w = [0.0; K];
    for &r in set {
        w[r] = 1.0 / set.len() as f64;
    }
    Some(w)
}

pub fn count_residue(counts: &mut [f64; K], c: u8) {
    if let Some(w) = residue_weights(c) {
        for (n, x) in counts.iter_mut().zip(w) {
            *n += x;
        }
    }
}

/// Count a base pair into a 16-cell table indexed `left * 4 + right`.
pub fn count_pair(counts: &mut [f64; K * K], left: u8, right: u8) {
    let (Some(l), Some(r)) = (residue_weights(left), residue_weights(right)) else {
        return;
    };
    for i in 0..K {
        for j in 0..K {
            counts[i * K + j] += l[i] * r[j];
        }
    }
}

/// Scale a count vector to sum to one; all-zero vectors become uniform.
pub fn normalize(v: &mut [f64]) {
    let sum: f64 = v.iter().sum();
    if sum == 0.0 {
        let u = 1.0 / v.len() as f64;
        v.iter_mut().for_each(|x| *x = u);
    } else {
        v.iter_mut().for_each(|x| *x /= sum);
    }
}

/// Shannon entropy in bits.
pub fn entropy(p: &[f64]) -> f64 {
    -p.iter()
        .filter(|&&x| x > 0.0)
        .map(|&x| x * x.log2())
        .sum::<f64>()
}

const BRACKETS: [(u8, u8); 4] = [(b'<', b'>'), (b'(', b')'), (b'[', b']'), (b'{', b'}')];

/// Parse a WUSS structure string into a partner table.
///
/// `<>`, `()`, `[]` and `{}` nest; an upper-case letter pairs with the next
/// matching lower-case one (pseudoknots). Any other symbol is unpaired.
pub fn wuss_pairs(ss: &str) -> Result<Vec<Option<usize>>> {
    let bytes = ss.as_bytes();
    let mut pairs = vec![None; bytes.len()];
    let mut brackets: [Vec<usize>; 4] = Default::default();
    let mut knots: [Vec<usize>; 26] = Default::default();

    for (i, &c) in bytes.iter().enumerate() {
        if let Some(k) = BRACKETS.iter().position(|&(open, _)| open == c) {
            brackets[k].push(i);
        } else if let Some(k) = BRACKETS.iter().position(|&(_, close)| close == c) {
            let j = brackets[k].pop().ok_or_else(|| {
                DrawError::validation(format!("unmatched '{}' at position {}", c as char, i + 1))
            })?;
            pairs[i] = Some(j);
            pairs[j] = Some(i);
        } else if c.is_ascii_uppercase() {
            knots[(c - b'A') as usize].push(i);
        } else if c.is_ascii_lowercase() {
            let j = knots[(c - b'a') as usize].pop().ok_or_else(|| {
                DrawError::validation(format!("unmatched '{}' at position {}", c as char, i + 1))
            })?;
            pairs[i] = Some(j);
            pairs[j] = Some(i);
        }
    }

    let open = brackets
        .iter()
        .chain(knots.iter())
        .flat_map(|stack| stack.iter())
        .min();
    if let Some(&i) = open {
        return Err(DrawError::validation(format!(
            "unmatched '{}' at position {}",
            bytes[i] as char,
            i + 1
        )));
    }
    Ok(pairs)
}

/// A multiple sequence alignment with the annotation diagrams draw from.
#[derive(Serialize, Clone, Debug, Default)]
pub struct Alignment {
    pub names: Vec<String>,
    /// Aligned rows, all `alen` wide.
    pub seqs: Vec<Vec<u8>>,
    /// Reference annotation; non-gap columns are consensus columns.
    pub rf: Option<Vec<u8>>,
    pub ss_cons: Option<String>,
    /// Posterior probability tens digit per row (`#=GR <name> POSTX.`).
    pub post_tens: Vec<Option<Vec<u8>>>,
    /// Posterior probability ones digit per row (`#=GR <name> POST.X`).
    pub post_ones: Vec<Option<Vec<u8>>>,
}

/// Mapping between consensus columns and alignment columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusMap {
    pub c2a: Vec<usize>,
    pub a2c: Vec<Option<usize>>,
}

impl ConsensusMap {
    pub fn clen(&self) -> usize {
        self.c2a.len()
    }
}

impl Alignment {
    pub fn nseq(&self) -> usize {
        self.seqs.len()
    }

    pub fn alen(&self) -> usize {
        self.seqs.first().map_or(0, Vec::len)
    }

    pub fn consensus_map(&self) -> Result<ConsensusMap> {
        let rf = self
            .rf
            .as_ref()
            .ok_or_else(|| DrawError::validation("alignment has no #=GC RF annotation"))?;
        let mut c2a = Vec::new();
        let mut a2c = vec![None; rf.len()];
        for (apos, &c) in rf.iter().enumerate() {
            if !is_gap(c) {
                a2c[apos] = Some(c2a.len());
                c2a.push(apos);
            }
        }
        Ok(ConsensusMap { c2a, a2c })
    }

    /// Consensus base pairs: `pairs[c]` is the partner of consensus column `c`
    /// when both ends are consensus columns.
    pub fn consensus_pairs(&self, map: &ConsensusMap) -> Result<Vec<Option<usize>>> {
        let ss = self.ss_cons.as_deref().ok_or_else(|| {
            DrawError::validation(
                "Problem getting ct from SS_cons, does first alignment of MSA file have SS_cons annotation?",
            )
        })?;
        let ct = wuss_pairs(ss)?;
        Ok(map
            .c2a
            .iter()
            .map(|&apos| {
                ct.get(apos)
                    .copied()
                    .flatten()
                    .and_then(|partner| map.a2c.get(partner).copied().flatten())
            })
            .collect())
    }

    /// Residues in row `i`, gaps excluded.
    pub fn unaligned_len(&self, i: usize) -> usize {
        self.seqs[i].iter().filter(|&&c| !is_gap(c)).count()
    }
}

/// Count the base pairs in a partner table.
pub fn count_pairs(pairs: &[Option<usize>]) -> usize {
    pairs
        .iter()
        .enumerate()
        .filter(|&(i, p)| p.is_some_and(|j| j > i))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(residue_weights(b'a'), Some([1.0, 0.0, 0.0, 0.0]));
        assert_eq!(residue_weights(b'T'), residue_weights(b'U'));
        assert_eq!(residue_weights(b'R'), Some([0.5, 0.0, 0.5, 0.0]));
        assert_eq!(residue_weights(b'-'), None);
        assert_eq!(residue_weights(b'*'), None);
        assert!(is_valid_symbol(b'~'));
        assert!(!is_valid_symbol(b'J'));
    }

    #[test]
    fn test_count_pair_degenerate() {
        let mut counts = [0.0; K * K];
        count_pair(&mut counts, b'G', b'Y');
        assert_eq!(counts[2 * K + 1], 0.5);
        assert_eq!(counts[2 * K + 3], 0.5);
        assert_eq!(counts.iter().sum::<f64>(), 1.0);
        count_pair(&mut counts, b'G', b'-');
        assert_eq!(counts.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_entropy() {
        let mut v = [0.0; K];
        normalize(&mut v);
        assert_eq!(entropy(&v), 2.0);
        let mut point = [3.0, 0.0, 0.0, 0.0];
        normalize(&mut point);
        assert_eq!(entropy(&point), 0.0);
    }

    #[test]
    fn test_wuss() {
        let pairs = wuss_pairs("<<.A>>a,:").unwrap();
        assert_eq!(pairs[0], Some(5));
        assert_eq!(pairs[1], Some(4));
        assert_eq!(pairs[3], Some(6));
        assert_eq!(pairs[2], None);
        assert_eq!(count_pairs(&pairs), 3);
        assert!(wuss_pairs("<<>").is_err());
        assert!(wuss_pairs("(]").is_err());
        assert!(wuss_pairs("a").is_err());
    }

    #[test]
    fn test_consensus() {
        let aln = Alignment {
            names: vec!["s1".into()],
            seqs: vec![b"GA.C".to_vec()],
            rf: Some(b"xx.x".to_vec()),
            ss_cons: Some("<..>".into()),
            ..Default::default()
        };
        let map = aln.consensus_map().unwrap();
        assert_eq!(map.c2a, vec![0, 1, 3]);
        assert_eq!(map.a2c, vec![Some(0), Some(1), None, Some(2)]);
        assert_eq!(aln.consensus_pairs(&map).unwrap(), vec![Some(2), None, Some(0)]);
        assert_eq!(aln.unaligned_len(0), 3);
    }

    #[test]
    fn test_pairs_to_inserts_dropped() {
        let aln = Alignment {
            seqs: vec![b"GAC".to_vec()],
            rf: Some(b"x.x".to_vec()),
            ss_cons: Some("<>.".into()),
            ..Default::default()
        };
        let map = aln.consensus_map().unwrap();
        assert_eq!(aln.consensus_pairs(&map).unwrap(), vec![None, None]);
    }
}
