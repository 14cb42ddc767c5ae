use ssdraw_core::{
    build_diagram, diagram_json as model_json, parse_stockholm, render, DrawRequest, Extras,
    RenderOptions,
};
use wasm_bindgen::prelude::*;

fn render_inner(
    template: &str,
    alignment: &str,
    request_json: &str,
    options_json: &str,
) -> Option<String> {
    let req: DrawRequest = serde_json::from_str(request_json).ok()?;
    let mut opts: RenderOptions = serde_json::from_str(options_json).ok()?;
    let extras = Extras::default();
    req.apply_to(&extras, &mut opts);
    let aln = parse_stockholm(alignment, "alignment").ok()?;
    let d = build_diagram(template, "template", &aln, &req, &extras).ok()?;
    render(&d, &opts).ok()
}

fn json_inner(template: &str, alignment: &str, request_json: &str) -> Option<String> {
    let req: DrawRequest = serde_json::from_str(request_json).ok()?;
    let aln = parse_stockholm(alignment, "alignment").ok()?;
    let d = build_diagram(template, "template", &aln, &req, &Extras::default()).ok()?;
    model_json(&d).ok()
}

/// Render an alignment onto a template and return PostScript.
///
/// `request_json` is parsed as `DrawRequest` and `options_json` as
/// `RenderOptions`, both with `#[serde(default)]`, so `{}` selects the
/// defaults. Returns an empty string on any error, malformed JSON included.
#[wasm_bindgen]
pub fn render_diagram(
    template: &str,
    alignment: &str,
    request_json: &str,
    options_json: &str,
) -> String {
    render_inner(template, alignment, request_json, options_json).unwrap_or_default()
}

/// The diagram model as JSON, or an empty string on error.
#[wasm_bindgen]
pub fn diagram_json(template: &str, alignment: &str, request_json: &str) -> String {
    json_inner(template, alignment, request_json).unwrap_or_default()
}
