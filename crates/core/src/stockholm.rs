//! Reader for the first alignment in a Stockholm file.
//!
//! Only what diagrams need is kept: sequence rows, `#=GC RF`, `#=GC SS_cons`
//! and the `#=GR <seq> POSTX.` / `POST.X` posterior digit tracks. Blocks may
//! be interleaved; rows with the same name are concatenated.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};

use crate::alignment::{is_gap, is_valid_symbol, Alignment};
use crate::error::{read_file, DrawError, Result};

#[derive(Default)]
struct Builder {
    names: Vec<String>,
    index: HashMap<String, usize>,
    seqs: Vec<Vec<u8>>,
    rf: Option<Vec<u8>>,
    ss_cons: Option<String>,
    tens: HashMap<String, Vec<u8>>,
    ones: HashMap<String, Vec<u8>>,
}

impl Builder {
    fn row(&mut self, name: &str) -> &mut Vec<u8> {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.names.push(name.to_string());
                self.seqs.push(Vec::new());
                self.index.insert(name.to_string(), self.seqs.len() - 1);
                self.seqs.len() - 1
            }
        };
        &mut self.seqs[i]
    }
}

pub fn parse_stockholm(src: &str, file: &str) -> Result<Alignment> {
    let err = |line: usize, msg: String| DrawError::parse(file, line, msg);
    let mut b = Builder::default();
    let mut lines = src.lines().enumerate().map(|(i, l)| (i + 1, l));

    match lines.by_ref().find(|(_, l)| !l.trim().is_empty()) {
        Some((_, l)) if l.trim_start().starts_with("# STOCKHOLM") => {}
        Some((n, _)) => return Err(err(n, "missing \"# STOCKHOLM 1.0\" header".into())),
        None => return Err(err(0, "file is empty".into())),
    }

    let mut terminated = false;
    for (n, line) in lines {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if line == "//" {
            terminated = true;
            break;
        }
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else { continue };
        match first {
            "#=GC" => {
                let (Some(tag), Some(data)) = (fields.next(), fields.next()) else {
                    return Err(err(n, "malformed #=GC line".into()));
                };
                match tag {
                    "RF" => b.rf.get_or_insert_with(Vec::new).extend_from_slice(data.as_bytes()),
                    "SS_cons" => b.ss_cons.get_or_insert_with(String::new).push_str(data),
                    _ => {}
                }
            }
            "#=GR" => {
                let (Some(name), Some(tag), Some(data)) = (fields.next(), fields.next(), fields.next())
                else {
                    return Err(err(n, "malformed #=GR line".into()));
                };
                let track = match tag {
                    "POSTX." => &mut b.tens,
                    "POST.X" => &mut b.ones,
                    _ => continue,
                };
                track
                    .entry(name.to_string())
                    .or_default()
                    .extend_from_slice(data.as_bytes());
            }
            _ if first.starts_with('#') => {}
            name => {
                let Some(data) = fields.next() else {
                    return Err(err(n, format!("sequence {name} has no residues")));
                };
                if fields.next().is_some() {
                    return Err(err(n, format!("unexpected extra field on sequence line for {name}")));
                }
                if let Some(c) = data.bytes().find(|&c| !is_valid_symbol(c)) {
                    return Err(err(
                        n,
                        format!("invalid residue '{}' in sequence {name}", c as char),
                    ));
                }
                b.row(name).extend_from_slice(data.as_bytes());
            }
        }
    }
    if !terminated {
        return Err(err(src.lines().count(), "alignment not terminated by \"//\"".into()));
    }
    finish(b, file)
}

fn finish(b: Builder, file: &str) -> Result<Alignment> {
    let invalid = |msg: String| DrawError::validation(format!("{file}: {msg}"));
    if b.seqs.is_empty() {
        return Err(invalid("alignment has no sequences".into()));
    }
    let alen = b.seqs[0].len();
    for (name, seq) in b.names.iter().zip(&b.seqs) {
        if seq.len() != alen {
            return Err(invalid(format!(
                "sequence {name} has length {}, expected {alen}",
                seq.len()
            )));
        }
    }
    if b.rf.as_ref().is_some_and(|rf| rf.len() != alen) {
        return Err(invalid(format!("#=GC RF length differs from alignment length {alen}")));
    }
    if b.ss_cons.as_ref().is_some_and(|ss| ss.len() != alen) {
        return Err(invalid(format!("#=GC SS_cons length differs from alignment length {alen}")));
    }
    for (tag, track) in [("POSTX.", &b.tens), ("POST.X", &b.ones)] {
        for (name, data) in track {
            if !b.index.contains_key(name) {
                return Err(invalid(format!("#=GR {tag} for unknown sequence {name}")));
            }
            if data.len() != alen {
                return Err(invalid(format!("#=GR {name} {tag} length differs from alignment length {alen}")));
            }
        }
    }

    let mut tens = b.tens;
    let mut ones = b.ones;
    let post_tens = b.names.iter().map(|n| tens.remove(n)).collect();
    let post_ones = b.names.iter().map(|n| ones.remove(n)).collect();
    for (name, seq) in b.names.iter().zip(&b.seqs) {
        if seq.iter().all(|&c| is_gap(c)) {
            warn!("sequence {name} is all gaps");
        }
    }
    debug!("read alignment {file}: {} sequences, {alen} columns", b.seqs.len());
    Ok(Alignment {
        names: b.names,
        seqs: b.seqs,
        rf: b.rf,
        ss_cons: b.ss_cons,
        post_tens,
        post_ones,
    })
}

pub fn read_stockholm(path: &Path) -> Result<Alignment> {
    let src = read_file(path)?;
    parse_stockholm(&src, &path.display().to_string())
}
