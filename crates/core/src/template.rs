//! Parser for section-tagged structure templates.
//!
//! A template file holds one or more page instances, each a run of sections:
//!
//! ```text
//! % begin modelname
//! % archaea
//! % end modelname
//! % begin scale
//! 0.65 0.65 scale
//! % end scale
//! % begin text residues
//! /Helvetica-Bold findfont 8.00 scalefont setfont
//! 0.00 0.00 0.00 1.00 setcmykcolor
//! (G) 288.34 639.50 moveto show
//! % end text residues
//! ```
//!
//! An instance ends at the first `showpage` token inside an `ignore` section.

use std::str::Lines;

use log::debug;
use serde::Serialize;

use crate::error::{DrawError, Result};

/// Relative tolerance used when comparing the two scale factors.
const SCALE_TOLERANCE: f64 = 5e-9;

/// A point in template coordinates.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A straight line segment in template coordinates.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Geometry of one structure template instance.
#[derive(Serialize, Clone, Debug, Default)]
pub struct Template {
    pub model_name: Option<String>,
    pub scale: f32,
    /// Boilerplate lines passed through to every output page, newline-terminated.
    pub regurgitate: Vec<String>,
    /// Anchors of the 100, 200, ... position labels.
    pub hundreds: Vec<Point>,
    pub ticks: Vec<Line>,
    pub bpconnects: Vec<Line>,
    /// One coordinate per consensus position.
    pub residues: Vec<Point>,
}

impl Template {
    /// Consensus length of the template.
    pub fn clen(&self) -> usize {
        self.residues.len()
    }

    /// Number of base pair connector lines.
    pub fn nbp(&self) -> usize {
        self.bpconnects.len()
    }

    /// Check that the instance carries everything a diagram needs.
    pub fn validate(&self) -> Result<()> {
        if self.model_name.is_none() {
            return Err(DrawError::validation(
                "failed to read modelname from template file",
            ));
        }
        if self.bpconnects.is_empty() {
            return Err(DrawError::validation(
                "failed to read 'lines bpconnects' section from template file",
            ));
        }
        if self.residues.is_empty() {
            return Err(DrawError::validation(
                "failed to read 'text residues' section from template file",
            ));
        }
        if self.scale <= 0.0 {
            return Err(DrawError::validation(
                "failed to read a positive 'scale' section from template file",
            ));
        }
        Ok(())
    }
}

/// Whitespace tokenizer with `#` comments, tracking line numbers.
///
/// `next_line` moves to the next line holding at least one token,
/// `token_on_line` never crosses a line boundary and `token` does.
struct Tokenizer<'a> {
    lines: Lines<'a>,
    line: Vec<&'a str>,
    pos: usize,
    line_no: usize,
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace()
        .take_while(|tok| !tok.starts_with('#'))
        .collect()
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Tokenizer {
            lines: src.lines(),
            line: Vec::new(),
            pos: 0,
            line_no: 0,
        }
    }

    fn load_raw_line(&mut self) -> bool {
        match self.lines.next() {
            Some(raw) => {
                self.line = tokenize(raw);
                self.pos = 0;
                self.line_no += 1;
                true
            }
            None => false,
        }
    }

    fn next_line(&mut self) -> bool {
        while self.load_raw_line() {
            if !self.line.is_empty() {
                return true;
            }
        }
        false
    }

    fn token_on_line(&mut self) -> Option<&'a str> {
        let tok = self.line.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn token(&mut self) -> Option<&'a str> {
        loop {
            if let Some(tok) = self.token_on_line() {
                return Some(tok);
            }
            if !self.load_raw_line() {
                return None;
            }
        }
    }

    /// Tokens left on the current line, consuming them.
    fn rest_of_line(&mut self) -> Vec<&'a str> {
        let rest = self.line[self.pos.min(self.line.len())..].to_vec();
        self.pos = self.line.len();
        rest
    }
}

#[derive(Clone, Copy)]
enum TextKind {
    Hundreds,
    Residues,
}

#[derive(Clone, Copy)]
enum LinesKind {
    Ticks,
    BpConnects,
}

/// Lazily parses the template instances of one source, in file order.
pub struct TemplateReader<'a> {
    file: String,
    tok: Tokenizer<'a>,
    done: bool,
}

impl<'a> TemplateReader<'a> {
    /// `file` names the source in error messages.
    pub fn new(src: &'a str, file: &str) -> Self {
        TemplateReader {
            file: file.to_string(),
            tok: Tokenizer::new(src),
            done: false,
        }
    }

    fn err(&self, message: impl Into<String>) -> DrawError {
        DrawError::parse(&self.file, self.tok.line_no, message)
    }

    fn expect_token(&mut self, what: &str) -> Result<&'a str> {
        match self.tok.token() {
            Some(t) => Ok(t),
            None => Err(self.err(format!("unexpected end of file, expected {what}"))),
        }
    }

    fn expect_keyword(&mut self, keyword: &str, context: &str) -> Result<()> {
        let t = self.expect_token(keyword)?;
        if t != keyword {
            return Err(self.err(format!(
                "{context}: expected '{keyword}' but read '{t}'"
            )));
        }
        Ok(())
    }

    /// Consume `end <names...>` after a `%` has been read.
    fn expect_end(&mut self, names: &[&str]) -> Result<()> {
        let context = format!("read % line without 'end {}'", names.join(" "));
        self.expect_keyword("end", &context)?;
        for name in names {
            self.expect_keyword(name, &context)?;
        }
        Ok(())
    }

    fn number(&self, tok: &str) -> Result<f32> {
        tok.parse::<f32>()
            .map_err(|_| self.err(format!("expected a number, read '{tok}'")))
    }

    /// Check a header line of `ntok` tokens whose last is `keyword`.
    fn header_line(&mut self, ntok: usize, keyword: &str, section: &str) -> Result<()> {
        if !self.tok.next_line() {
            return Err(self.err(format!("unexpected end of file in {section} section")));
        }
        let fields = self.tok.rest_of_line();
        if fields.len() < ntok || fields[ntok - 1] != keyword {
            return Err(self.err(format!(
                "{section} section header line should be {ntok} tokens ending with '{keyword}'"
            )));
        }
        Ok(())
    }

    /// Move to the next data line; `true` if it is the section's end marker.
    fn data_line(&mut self, section: &str, sub: &str) -> Result<bool> {
        if !self.tok.next_line() {
            return Err(self.err(format!(
                "finished file looking for '% end {section} {sub}' line"
            )));
        }
        if self.tok.line[0] == "%" {
            self.tok.pos = 1;
            self.expect_end(&[section, sub])?;
            return Ok(true);
        }
        Ok(false)
    }

    fn parse_modelname(&mut self, t: &mut Template) -> Result<()> {
        self.expect_keyword("%", "modelname section")?;
        t.model_name = Some(self.tok.rest_of_line().join(" "));
        self.expect_keyword("%", "modelname section")?;
        self.expect_end(&["modelname"])
    }

    fn parse_scale(&mut self, t: &mut Template) -> Result<()> {
        let first = self.expect_token("scale factor")?;
        let x = self.number(first)?;
        let second = self.expect_token("scale factor")?;
        let y = self.number(second)?;
        if !scales_equal(x, y) {
            return Err(self.err(format!(
                "x and y scales are not equal {x:.2} != {y:.2}"
            )));
        }
        self.expect_keyword("scale", "scale section")?;
        self.expect_keyword("%", "scale section")?;
        self.expect_end(&["scale"])?;
        t.scale = x;
        Ok(())
    }

    /// Skip to `% end ignore`; returns whether a `showpage` was seen.
    fn parse_ignore(&mut self) -> Result<bool> {
        let mut showpage = false;
        loop {
            let t = self.expect_token("'% end ignore'")?;
            match t {
                "%" => {
                    self.expect_end(&["ignore"])?;
                    return Ok(showpage);
                }
                "showpage" => showpage = true,
                _ => {}
            }
        }
    }

    fn parse_regurgitate(&mut self, t: &mut Template) -> Result<()> {
        // the rest of the begin line is not part of the section
        loop {
            if !self.tok.next_line() {
                return Err(self.err("finished file looking for '% end regurgitate' line"));
            }
            let mut words = Vec::new();
            while let Some(w) = self.tok.token_on_line() {
                if w == "%" {
                    return self.expect_end(&["regurgitate"]);
                }
                words.push(w);
            }
            let mut line = words.join(" ");
            line.push('\n');
            t.regurgitate.push(line);
        }
    }

    fn parse_text(&mut self, t: &mut Template) -> Result<()> {
        let sub = self.expect_token("text section type")?;
        let kind = match sub {
            "hundreds" => Some(TextKind::Hundreds),
            "residues" => Some(TextKind::Residues),
            _ => None,
        };
        self.header_line(5, "setfont", "text")?;
        self.header_line(5, "setcmykcolor", "text")?;

        while !self.data_line("text", sub)? {
            let fields = self.tok.rest_of_line();
            // `(label) x y moveto show`, the label is optional
            let coords = match fields.len() {
                5 => &fields[1..],
                4 => &fields[..],
                _ => {
                    return Err(self.err(
                        "text data line should be 5 tokens ending with 'show'",
                    ))
                }
            };
            if coords[2] != "moveto" {
                return Err(self.err(format!(
                    "text data line should have 'moveto' before 'show', read '{}'",
                    coords[2]
                )));
            }
            if coords[3] != "show" {
                return Err(self.err(format!(
                    "text data line should end with 'show', read '{}'",
                    coords[3]
                )));
            }
            let p = Point {
                x: self.number(coords[0])?,
                y: self.number(coords[1])?,
            };
            match kind {
                Some(TextKind::Hundreds) => t.hundreds.push(p),
                Some(TextKind::Residues) => t.residues.push(p),
                None => {}
            }
        }
        Ok(())
    }

    fn parse_lines(&mut self, t: &mut Template) -> Result<()> {
        let sub = self.expect_token("lines section type")?;
        let kind = match sub {
            "ticks" => Some(LinesKind::Ticks),
            "bpconnects" => Some(LinesKind::BpConnects),
            _ => None,
        };
        self.header_line(2, "setlinewidth", "lines")?;
        self.header_line(5, "setcmykcolor", "lines")?;

        const KEYWORDS: [&str; 4] = ["newpath", "moveto", "lineto", "stroke"];
        while !self.data_line("lines", sub)? {
            let fields = self.tok.rest_of_line();
            if fields.len() != 8 {
                return Err(self.err(
                    "lines data line should be 8 tokens ending with 'stroke'",
                ));
            }
            for (i, kw) in KEYWORDS.iter().enumerate() {
                if fields[4 + i] != *kw {
                    return Err(self.err(format!(
                        "lines data line token {} should be '{kw}', read '{}'",
                        5 + i,
                        fields[4 + i]
                    )));
                }
            }
            let l = Line {
                x1: self.number(fields[0])?,
                y1: self.number(fields[1])?,
                x2: self.number(fields[2])?,
                y2: self.number(fields[3])?,
            };
            match kind {
                Some(LinesKind::Ticks) => t.ticks.push(l),
                Some(LinesKind::BpConnects) => t.bpconnects.push(l),
                None => {}
            }
        }
        Ok(())
    }

    /// Parse one instance. `None` when the source has no tokens left.
    fn parse_instance(&mut self) -> Result<Option<Template>> {
        let mut t = Template::default();
        let mut seen_any = false;

        while let Some(tok) = self.tok.token() {
            seen_any = true;
            if tok != "%" {
                return Err(self.err(format!(
                    "expected line beginning with %, read '{tok}'"
                )));
            }
            let begin = self.expect_token("'begin'")?;
            if begin != "begin" {
                return Err(self.err(format!(
                    "expected line beginning with % begin, read '{begin}'"
                )));
            }
            let section = self.expect_token("section type")?;
            match section {
                "modelname" => self.parse_modelname(&mut t)?,
                "scale" => self.parse_scale(&mut t)?,
                "ignore" => {
                    if self.parse_ignore()? {
                        return Ok(Some(t));
                    }
                }
                "regurgitate" => self.parse_regurgitate(&mut t)?,
                "text" => self.parse_text(&mut t)?,
                "lines" => self.parse_lines(&mut t)?,
                other => return Err(self.err(format!("unknown section type {other}"))),
            }
        }
        Ok(seen_any.then_some(t))
    }
}

impl Iterator for TemplateReader<'_> {
    type Item = Result<Template>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parse_instance() {
            Ok(Some(t)) => Some(Ok(t)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn scales_equal(a: f32, b: f32) -> bool {
    let (a, b) = (a as f64, b as f64);
    if a == b {
        return true;
    }
    2.0 * (a - b).abs() / (a + b).abs() <= SCALE_TOLERANCE
}

/// Return the first instance in `src` whose consensus length is `clen`, validated.
pub fn find_template(src: &str, file: &str, clen: usize) -> Result<Template> {
    for (i, instance) in TemplateReader::new(src, file).enumerate() {
        let t = instance?;
        debug!("template instance {} in {} has clen {}", i + 1, file, t.clen());
        if t.clen() == clen {
            t.validate()?;
            return Ok(t);
        }
    }
    Err(DrawError::NoTemplateMatch {
        clen,
        file: file.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str, n: usize) -> String {
        let mut s = String::new();
        s.push_str("% begin modelname\n% ");
        s.push_str(name);
        s.push_str("\n% end modelname\n");
        s.push_str("% begin scale\n0.65 0.65 scale\n% end scale\n");
        s.push_str("% begin regurgitate\n%%BoundingBox: 0 0 612 792\n/L { lineto } def\n% end regurgitate\n");
        s.push_str("% begin text residues\n/Helvetica-Bold findfont 8.00 scalefont setfont\n0.00 0.00 0.00 1.00 setcmykcolor\n");
        for i in 0..n {
            s.push_str(&format!("(A) {}.00 {}.50 moveto show\n", 10 * i, 20 * i));
        }
        s.push_str("% end text residues\n");
        s.push_str("% begin lines bpconnects\n1.00 setlinewidth\n0.00 0.00 0.00 1.00 setcmykcolor\n");
        s.push_str("1.0 2.0 3.0 4.0 newpath moveto lineto stroke\n% end lines bpconnects\n");
        s.push_str("% begin ignore\nshowpage\n% end ignore\n");
        s
    }

    #[test]
    fn test_single_instance() {
        let src = instance("archaea", 3);
        let t = find_template(&src, "t.ps", 3).unwrap();
        assert_eq!(t.model_name.as_deref(), Some("archaea"));
        assert_eq!(t.clen(), 3);
        assert_eq!(t.nbp(), 1);
        assert_eq!(t.scale, 0.65);
        assert_eq!(t.residues[2], Point { x: 20.0, y: 40.5 });
        assert_eq!(
            t.bpconnects[0],
            Line {
                x1: 1.0,
                y1: 2.0,
                x2: 3.0,
                y2: 4.0
            }
        );
        assert_eq!(t.regurgitate.len(), 2);
        assert_eq!(t.regurgitate[1], "/L { lineto } def\n");
    }

    #[test]
    fn test_selects_matching_instance() {
        let src = format!("{}{}", instance("small", 2), instance("large", 5));
        let t = find_template(&src, "t.ps", 5).unwrap();
        assert_eq!(t.model_name.as_deref(), Some("large"));
        let reader: Vec<_> = TemplateReader::new(&src, "t.ps").collect();
        assert_eq!(reader.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let src = instance("small", 2);
        match find_template(&src, "t.ps", 7) {
            Err(DrawError::NoTemplateMatch { clen, .. }) => assert_eq!(clen, 7),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_multiword_model_name() {
        let src = instance("Bacterial SSU", 2);
        let t = find_template(&src, "t.ps", 2).unwrap();
        assert_eq!(t.model_name.as_deref(), Some("Bacterial SSU"));
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = format!("# leading comment\n\n{}", instance("x", 2));
        assert!(find_template(&src, "t.ps", 2).is_ok());
    }

    #[test]
    fn test_unequal_scale_rejected() {
        let src = "% begin scale\n0.65 0.70 scale\n% end scale\n";
        let err = TemplateReader::new(src, "t.ps").next().unwrap().unwrap_err();
        assert!(err.to_string().contains("not equal"));
    }

    #[test]
    fn test_unknown_section() {
        let src = "% begin colors\n";
        let err = TemplateReader::new(src, "t.ps").next().unwrap().unwrap_err();
        match err {
            DrawError::Parse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("unknown section type colors"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_lines_keyword_reports_line() {
        let src = "% begin lines ticks\n2.00 setlinewidth\n0.00 0.00 0.00 1.00 setcmykcolor\n1 2 3 4 newpath moveto moveto stroke\n% end lines ticks\n";
        match TemplateReader::new(src, "t.ps").next().unwrap() {
            Err(DrawError::Parse { line, message, .. }) => {
                assert_eq!(line, 4);
                assert!(message.contains("lineto"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_mismatched_end_marker() {
        let src = "% begin text hundreds\n/Helvetica findfont 8.00 scalefont setfont\n0.00 0.00 0.00 1.00 setcmykcolor\n(100) 1 2 moveto show\n% end text residues\n";
        assert!(TemplateReader::new(src, "t.ps").next().unwrap().is_err());
    }

    #[test]
    fn test_unterminated_ignore() {
        let src = "% begin ignore\nshowpage\n";
        assert!(TemplateReader::new(src, "t.ps").next().unwrap().is_err());
    }

    #[test]
    fn test_label_free_text_line() {
        let src = "% begin text residues\n/Helvetica-Bold findfont 8.00 scalefont setfont\n0.00 0.00 0.00 1.00 setcmykcolor\n5.5 6.5 moveto show\n% end text residues\n";
        let t = TemplateReader::new(src, "t.ps").next().unwrap().unwrap();
        assert_eq!(t.residues, vec![Point { x: 5.5, y: 6.5 }]);
    }

    #[test]
    fn test_validate_requires_bpconnects() {
        let t = Template {
            model_name: Some("m".into()),
            scale: 1.0,
            residues: vec![Point { x: 0.0, y: 0.0 }],
            ..Template::default()
        };
        assert!(t.validate().is_err());
    }
}
