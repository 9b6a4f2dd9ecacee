//! # Box Rendering and Page Composition
//!
//! Field bindings meet the resolved layout table here. The box renderer
//! turns one text field into per-line draw calls (wrap, cap, align,
//! baseline); the compositor walks the binding list in order, placing text
//! and chart images onto their physical pages.
//!
//! Composition never aborts a page: a binding that cannot land (unknown
//! page key, unknown box, missing physical page, failed chart) is recorded
//! and skipped, and every remaining field still draws.

use serde::Serialize;

use crate::font::{FontChoice, FontContext};
use crate::geom;
use crate::image_loader::{fetch_chart, ChartFetcher};
use crate::model::{Align, BoxSpec, FieldBinding, FieldValue, LayoutTable};
use crate::surface::{Color, ImageOp, Surface, TextOp};
use crate::text::{wrap, TextMeasure};

/// One wrapped line ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderLine {
    pub text: String,
    pub line_index: usize,
}

/// What one box render produced.
#[derive(Debug, Clone)]
pub struct BoxRender {
    pub lines: Vec<RenderLine>,
    /// Lines that wrapped but fell past the line cap.
    pub dropped: usize,
}

impl BoxRender {
    fn empty() -> Self {
        Self {
            lines: Vec::new(),
            dropped: 0,
        }
    }
}

/// Renders one text field into its box.
///
/// Trimmed-empty text draws nothing, leaving the template artwork
/// untouched. Otherwise the text wraps at the padded width, the line cap
/// drops overflow silently, and each kept line draws at its aligned x and
/// its baseline. Blank interior lines keep their baseline slot but emit no
/// draw call.
pub fn render_box(
    surface: &mut dyn Surface,
    spec: &BoxSpec,
    text: &str,
    measure: &dyn TextMeasure,
    font: FontChoice,
) -> BoxRender {
    if text.trim().is_empty() {
        return BoxRender::empty();
    }
    let inner_width = spec.w - spec.pad * 2.0;
    if inner_width <= 0.0 || spec.size <= 0.0 {
        return BoxRender::empty();
    }

    let mut wrapped = wrap(text, measure, spec.size, inner_width);
    let cap = spec.max_lines.map(|n| n as usize).unwrap_or(usize::MAX);
    let dropped = wrapped.len().saturating_sub(cap);
    wrapped.truncate(cap);

    let surface_height = surface.height();
    let mut lines = Vec::with_capacity(wrapped.len());
    for (i, line) in wrapped.into_iter().enumerate() {
        if !line.is_empty() {
            let line_width = measure.text_width(&line, spec.size);
            let x = match spec.align {
                Align::Left => spec.x + spec.pad,
                Align::Center => spec.x + (spec.w - line_width) / 2.0,
                Align::Right => spec.x + spec.w - spec.pad - line_width,
            };
            let y = geom::baseline_y(
                surface_height,
                spec.y,
                spec.pad,
                spec.size,
                spec.line_height(),
                i,
            );
            surface.draw_text(
                &line,
                TextOp {
                    x,
                    y,
                    size: spec.size,
                    font,
                    color: Color::BLACK,
                },
            );
        }
        lines.push(RenderLine {
            text: line,
            line_index: i,
        });
    }

    BoxRender { lines, dropped }
}

/// A field the compositor could not place.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedField {
    pub page: String,
    #[serde(rename = "box")]
    pub box_key: String,
    pub detail: String,
}

/// A field whose text lost lines to the cap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncatedField {
    pub page: String,
    #[serde(rename = "box")]
    pub box_key: String,
    pub dropped: usize,
}

/// Everything composition observed beyond the draws themselves.
#[derive(Debug, Clone, Default)]
pub struct CompositionLog {
    pub skipped: Vec<SkippedField>,
    pub truncated: Vec<TruncatedField>,
}

/// Places every binding onto its physical page, in binding order.
pub fn composite<S: Surface>(
    pages: &mut [S],
    bindings: &[FieldBinding],
    table: &LayoutTable,
    fonts: &FontContext,
    charts: &dyn ChartFetcher,
) -> CompositionLog {
    let mut log = CompositionLog::default();

    for binding in bindings {
        let skip = |detail: String, log: &mut CompositionLog| {
            log.skipped.push(SkippedField {
                page: binding.page.clone(),
                box_key: binding.box_key.clone(),
                detail,
            });
        };

        let Some((page_index, spec)) = table.lookup(&binding.page, &binding.box_key) else {
            let detail = if table.pages.contains_key(&binding.page) {
                "unknown box key".to_string()
            } else {
                "unknown page key".to_string()
            };
            skip(detail, &mut log);
            continue;
        };
        let Some(surface) = pages.get_mut(page_index) else {
            skip(
                format!(
                    "page index {} beyond the {} rendered pages",
                    page_index,
                    pages.len()
                ),
                &mut log,
            );
            continue;
        };

        match &binding.value {
            FieldValue::Text { value } => {
                let measure = fonts.measurer(binding.font);
                let render = render_box(surface, spec, value, &measure, binding.font);
                if render.dropped > 0 {
                    log.truncated.push(TruncatedField {
                        page: binding.page.clone(),
                        box_key: binding.box_key.clone(),
                        dropped: render.dropped,
                    });
                }
            }
            FieldValue::Image { src } => {
                if spec.w <= 0.0 || spec.h <= 0.0 {
                    skip("empty image rectangle".to_string(), &mut log);
                    continue;
                }
                match fetch_chart(charts, src) {
                    Ok(image) => {
                        let op = ImageOp {
                            x: spec.x,
                            y: geom::to_draw_y(surface.height(), spec.y, spec.h),
                            width: spec.w,
                            height: spec.h,
                        };
                        surface.draw_image(&image, op);
                    }
                    Err(detail) => skip(detail, &mut log),
                }
            }
        }
    }

    log
}
