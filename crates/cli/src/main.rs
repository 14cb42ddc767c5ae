use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ssdraw_core::{DrawRequest, Extras, MaskStyle, NamedMask, RenderOptions};

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    Ps,
    Json,
}

const STATISTIC_FLAGS: [&str; 11] = [
    "prob", "ins", "iavglen", "dall", "dint", "structure", "span", "indi", "all", "list", "dfile",
];

/// Draw alignment statistics onto a template secondary structure diagram
#[derive(Parser)]
#[command(name = "ssdraw", version)]
struct Cli {
    /// Stockholm alignment with #=GC RF and #=GC SS_cons annotation
    msafile: PathBuf,

    /// Template PostScript file with a structure of the alignment's consensus length
    template: PathBuf,

    /// Output file
    output: PathBuf,

    /// Do not draw the information content diagram (or the RF sequence with --indi)
    #[arg(short = 'q')]
    quiet: bool,

    /// For all diagrams, mark masked ('0') columns from the mask in <FILE>
    #[arg(long, value_name = "FILE")]
    mask: Option<PathBuf>,

    /// Draw posterior probability diagram(s)
    #[arg(long)]
    prob: bool,

    /// Draw the insert diagram
    #[arg(long, conflicts_with = "indi")]
    ins: bool,

    /// Draw the average insert length diagram
    #[arg(long, conflicts_with = "indi")]
    iavglen: bool,

    /// Draw the delete diagram with all deletions (incl. terminal deletes)
    #[arg(long, conflicts_with = "indi")]
    dall: bool,

    /// Draw the delete diagram with only internal (non-terminal) deletions
    #[arg(long, conflicts_with = "indi")]
    dint: bool,

    /// Draw the structural information content diagram
    #[arg(long = "struct", conflicts_with = "indi")]
    structure: bool,

    /// Draw the fraction of sequences that span each position
    #[arg(long, conflicts_with = "indi")]
    span: bool,

    /// Draw diagrams for individual sequences instead of the alignment
    #[arg(long)]
    indi: bool,

    /// With --indi, draw individual diagrams of all sequences
    #[arg(long, requires = "indi")]
    all: bool,

    /// With --indi, draw individual diagrams of the sequences listed in <FILE>
    #[arg(long, value_name = "FILE", requires = "indi")]
    list: Option<PathBuf>,

    /// With --mask, mark masked columns as squares
    #[arg(long = "mask-u", conflicts_with = "mask_x")]
    mask_u: bool,

    /// With --mask, mark masked columns as x's
    #[arg(long = "mask-x")]
    mask_x: bool,

    /// With --mask, fill mask glyphs instead of outlining them
    #[arg(long = "mask-a")]
    mask_a: bool,

    /// With --mask, draw a black/grey diagram of the masked columns
    #[arg(long = "mask-col", requires = "mask", conflicts_with_all = STATISTIC_FLAGS)]
    mask_col: bool,

    /// With --mask, compare the mask in <FILE> to the --mask mask
    #[arg(long = "mask-diff", value_name = "FILE", requires = "mask", conflicts_with_all = STATISTIC_FLAGS)]
    mask_diff: Option<PathBuf>,

    /// Read a draw file specifying one or more diagrams
    #[arg(long, value_name = "FILE", conflicts_with_all = ["quiet", "prob", "ins", "iavglen", "dall", "dint", "structure", "span", "indi", "all", "list"])]
    dfile: Option<PathBuf>,

    /// Do not draw legends
    #[arg(long = "no-leg")]
    no_leg: bool,

    /// Do not draw the header
    #[arg(long = "no-head")]
    no_head: bool,

    /// Do not draw the footer
    #[arg(long = "no-foot")]
    no_foot: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Ps)]
    format: Format,

    /// JSON file with rendering options; flags above override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn request(&self) -> DrawRequest {
        DrawRequest {
            quiet: self.quiet,
            prob: self.prob,
            ins: self.ins,
            iavglen: self.iavglen,
            dall: self.dall,
            dint: self.dint,
            structure: self.structure,
            span: self.span,
            indi: self.indi,
            all: self.all,
            mask_col: self.mask_col,
        }
    }

    fn extras(&self) -> Result<Extras> {
        let named = |path: &Path| -> Result<NamedMask> {
            let mask = ssdraw_core::read_mask(path)
                .with_context(|| format!("failed to read mask {}", path.display()))?;
            Ok(NamedMask {
                mask,
                file: path.display().to_string(),
            })
        };
        let source = |path: &Path, what: &str| -> Result<(String, String)> {
            let src = fs::read_to_string(path)
                .with_context(|| format!("failed to read {what} {}", path.display()))?;
            Ok((src, path.display().to_string()))
        };
        Ok(Extras {
            mask: self.mask.as_deref().map(named).transpose()?,
            mask_diff: self.mask_diff.as_deref().map(named).transpose()?,
            drawfile: self.dfile.as_deref().map(|p| source(p, "draw file")).transpose()?,
            list: self.list.as_deref().map(|p| source(p, "list file")).transpose()?,
        })
    }

    fn options(&self) -> Result<RenderOptions> {
        let mut opts = match &self.config {
            Some(path) => {
                let src = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&src)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => RenderOptions::default(),
        };
        if self.mask_u {
            opts.mask_style = MaskStyle::Square;
        } else if self.mask_x {
            opts.mask_style = MaskStyle::X;
        }
        if self.mask_a {
            opts.mask_border = false;
        }
        if self.no_leg {
            opts.legend = false;
        }
        if self.no_head {
            opts.header = false;
        }
        if self.no_foot {
            opts.footer = false;
        }
        opts.alignment_file = self.msafile.display().to_string();
        Ok(opts)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let aln = ssdraw_core::read_stockholm(&cli.msafile)
        .with_context(|| format!("failed to read alignment {}", cli.msafile.display()))?;
    let template_src = fs::read_to_string(&cli.template)
        .with_context(|| format!("failed to read template {}", cli.template.display()))?;
    let template_file = cli.template.display().to_string();
    let req = cli.request();
    let extras = cli.extras()?;
    let mut opts = cli.options()?;

    let d = ssdraw_core::build_diagram(&template_src, &template_file, &aln, &req, &extras)
        .with_context(|| format!("failed to draw {}", cli.msafile.display()))?;
    let output = match cli.format {
        Format::Ps => {
            req.apply_to(&extras, &mut opts);
            ssdraw_core::render(&d, &opts)?
        }
        Format::Json => ssdraw_core::diagram_json(&d)?,
    };

    fs::write(&cli.output, &output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!("{} page(s) written to {}", d.pages.len(), cli.output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
