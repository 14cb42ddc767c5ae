//! Pages colored from an external draw file.
//!
//! Each page is a block of exactly `clen` lines followed by a `//` line:
//!
//! ```text
//! # position 1, light grey with a residue
//! 0.000 0.000 0.000 0.200 A
//! 1.000 0.000 0.000 0.000
//! //
//! ```

use log::info;

use crate::error::{DrawError, Result};
use crate::model::{Diagram, PageMode};

const CHANNELS: [&str; 4] = ["C", "M", "Y", "K"];

/// Append one page per block in `src` and return how many were read.
pub fn parse_drawfile(d: &mut Diagram, src: &str, file: &str) -> Result<usize> {
    let err = |line: usize, msg: String| DrawError::parse(file, line, msg);
    let clen = d.clen();
    let first_page = d.pages.len();
    let mut cpos = 0;
    let mut page = 0;
    let mut last_line = 0;

    for (i, raw) in src.lines().enumerate() {
        let n = i + 1;
        let mut tokens = raw
            .split_whitespace()
            .take_while(|tok| !tok.starts_with('#'))
            .peekable();
        if tokens.peek().is_none() {
            continue;
        }
        last_line = n;

        if cpos == clen {
            let tok = tokens.next().unwrap_or_default();
            if tok != "//" {
                return Err(err(
                    n,
                    format!(
                        "expected \"//\" at the end of draw page {}, read {tok}",
                        page - first_page + 1
                    ),
                ));
            }
            cpos = 0;
            continue;
        }
        if cpos == 0 {
            page = d.add_pages(1, PageMode::DrawFile).start;
            d.alloc_colors(page)?;
            d.alloc_residues(page)?;
        }

        let mut color = [0.0f32; 4];
        for (value, channel) in color.iter_mut().zip(CHANNELS) {
            let tok = tokens
                .next()
                .ok_or_else(|| err(n, format!("failed to read {channel} of CMYK value")))?;
            *value = tok
                .parse()
                .map_err(|_| err(n, format!("invalid {channel} value '{tok}'")))?;
            if !(0.0..=1.0).contains(&*value) {
                let range = DrawError::OutOfRange {
                    value: *value,
                    min: 0.0,
                    max: 1.0,
                };
                return Err(err(n, format!("{channel} {range}")));
            }
        }
        d.set_column_color(page, cpos, color)?;

        if let Some(tok) = tokens.next() {
            let mut chars = tok.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => d.set_column_char(page, cpos, c)?,
                _ => {
                    return Err(err(
                        n,
                        format!(
                            "read multi-character string ({tok}) for consensus residue {}",
                            cpos + 1
                        ),
                    ))
                }
            }
        }
        cpos += 1;
    }

    if cpos != 0 {
        return Err(err(
            last_line,
            format!(
                "draw page {} ends after {cpos} of {clen} positions without \"//\"",
                page - first_page + 1
            ),
        ));
    }
    let npages = d.pages.len() - first_page;
    if npages == 0 {
        return Err(DrawError::parse(
            file,
            last_line,
            "failed to read a single page from draw file",
        ));
    }
    info!("draw file {file}: {npages} page(s)");
    Ok(npages)
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

    #[test]
    fn test_two_pages() {
        let src = "\
# first page
0.0 0.0 0.0 1.0 A
1.0 0.0 0.0 0.0
//
0.5 0.5 0.0 0.0 g   # comment
0.0 0.0 0.0 0.2 -
//
";
        let mut d = diagram(2);
        assert_eq!(parse_drawfile(&mut d, src, "x.draw").unwrap(), 2);
        assert_eq!(d.pages[0].mode, PageMode::DrawFile);
        assert_eq!(
            d.pages[0].colors.as_ref().unwrap(),
            &vec![[0.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 0.0]]
        );
        assert_eq!(d.pages[0].residues.as_ref().unwrap(), &vec!['A', ' ']);
        assert_eq!(d.pages[1].residues.as_ref().unwrap(), &vec!['g', '-']);
        assert!(!d.pages[1].has_legend());
        assert!(d.pages[1].description.is_none());
    }

    #[test]
    fn test_missing_terminator() {
        let src = "0 0 0 1\n0 0 0 1\n0 0 0 1\n";
        match parse_drawfile(&mut diagram(2), src, "x.draw") {
            Err(DrawError::Parse { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("//"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_short_block() {
        let src = "0 0 0 1\n0 0 0 1\n//\n0 0 0 1\n";
        assert!(parse_drawfile(&mut diagram(2), src, "x.draw").is_err());
    }

    #[test]
    fn test_bad_tokens() {
        let multi = "0 0 0 1 AG\n0 0 0 1\n//\n";
        assert!(parse_drawfile(&mut diagram(2), multi, "x.draw").is_err());
        let missing = "0 0 0\n0 0 0 1\n//\n";
        assert!(parse_drawfile(&mut diagram(2), missing, "x.draw").is_err());
        let word = "0 0 zero 1\n0 0 0 1\n//\n";
        assert!(parse_drawfile(&mut diagram(2), word, "x.draw").is_err());
    }

    #[test]
    fn test_color_out_of_range() {
        let src = "0 0 0 1\n0 1.5 0 0\n//\n";
        match parse_drawfile(&mut diagram(2), src, "x.draw") {
            Err(DrawError::Parse { line, message, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(message, "M value 1.5 is outside range [0..1]");
            }
            other => panic!("unexpected {other:?}"),
        }
        let negative = "0 0 0 1\n0 0 0 1\n//\n-0.1 0 0 0\n0 0 0 1\n//\n";
        let err = parse_drawfile(&mut diagram(2), negative, "x.draw").unwrap_err();
        assert!(err.to_string().contains("line 4: C value -0.1 is outside range"));
        assert!(parse_drawfile(&mut diagram(2), "0 0 NaN 1\n0 0 0 1\n//\n", "x.draw").is_err());
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_drawfile(&mut diagram(2), "# nothing\n", "x.draw"),
            Err(DrawError::Parse { .. })
        ));
    }
}
