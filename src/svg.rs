//! SVG visualization of a computed layout.
//!
//! Draws the container, every placement (numbered in input order), and a
//! header with the row count and block ratio. Intended for debugging cost
//! weights, not for rendering galleries.
//!
//! # Example
//!
//! ```
//! use zenjustify::{AspectRatio, Item, partition, svg::render_layout_svg};
//!
//! let items = [Item::new(1.5), Item::new(0.75), Item::new(1.0)];
//! let result = partition(&items, 600.0, 200.0, AspectRatio::new(4, 3), 2.0);
//!
//! let svg = render_layout_svg(&result, 600.0);
//! assert!(svg.starts_with("<svg"));
//! ```

use alloc::format;
use alloc::string::String;

use crate::geometry::LayoutResult;

/// Maximum pixel width of the drawn block.
const MAX_PANEL_W: f64 = 600.0;
/// Margin around the block.
const MARGIN: f64 = 20.0;
/// Height of the header text area.
const LABEL_H: f64 = 28.0;
/// Minimum drawn placement size for which an index label is shown.
const MIN_LABEL_SIZE: f64 = 14.0;

/// Render a complete SVG document for `result` laid out at `container_width`.
///
/// An empty result draws only the header and an empty container outline.
pub fn render_layout_svg(result: &LayoutResult, container_width: f64) -> String {
    let scale = if container_width > MAX_PANEL_W {
        MAX_PANEL_W / container_width
    } else {
        1.0
    };
    let block_w = container_width.max(0.0) * scale;
    let block_h = result.total_height.max(0.0) * scale;
    let total_w = block_w + 2.0 * MARGIN;
    let total_h = block_h + 2.0 * MARGIN + LABEL_H;

    let mut svg = String::with_capacity(1024 + result.positions.len() * 160);

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {:.1} {:.1}">"#,
        total_w.ceil() as u32,
        total_h.ceil() as u32,
        total_w,
        total_h
    ));
    svg.push('\n');

    svg.push_str(r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .index { font-size: 10px; fill: #fff; }
  .outer { fill: #e8e8e8; stroke: #999; stroke-width: 1; }
  .item { fill: #6ba3d6; stroke: #2c6faa; stroke-width: 1; }
  .row-start { fill: #4f8cc4; stroke: #2c6faa; stroke-width: 1; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .outer { fill: #2d2d2d; stroke: #555; }
    .item { fill: #3a72a4; stroke: #5a9fd4; }
    .row-start { fill: #2f5f8a; stroke: #5a9fd4; }
  }
</style>
"##);

    let header = match result.block_ratio(container_width) {
        Some(ratio) => format!(
            "{} items  {} rows  {:.1}×{:.1}  ratio {:.3}",
            result.len(),
            result.row_count(),
            container_width,
            result.total_height,
            ratio
        ),
        None => String::from("no layout"),
    };
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="label">{}</text>"#,
        MARGIN,
        MARGIN + 12.0,
        escape_xml(&header)
    ));
    svg.push('\n');

    let origin_x = MARGIN;
    let origin_y = MARGIN + LABEL_H;
    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="outer"/>"#,
        origin_x, origin_y, block_w, block_h
    ));
    svg.push('\n');

    for (i, p) in result.positions.iter().enumerate() {
        let x = origin_x + p.x * scale;
        let y = origin_y + p.y * scale;
        let w = p.width * scale;
        let h = p.height * scale;
        let class = if p.starts_row() { "row-start" } else { "item" };
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" class="{class}"/>"#
        ));
        svg.push('\n');
        if w >= MIN_LABEL_SIZE && h >= MIN_LABEL_SIZE {
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" class="index" text-anchor="middle">{}</text>"#,
                x + w / 2.0,
                y + h / 2.0 + 4.0,
                i
            ));
            svg.push('\n');
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
