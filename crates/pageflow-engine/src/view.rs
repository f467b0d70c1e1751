//! The rendering-sink interface: paint instructions for layout nodes.
//!
//! The engine does not draw. It walks the layout tree, asks each element
//! definition for a paint instruction with the node's measured geometry,
//! and hands the instructions to a [`RenderSink`]. The sink owns actual
//! presentation and reports pointer/keyboard input back as positions (see
//! [`crate::layout::LayoutTree::resolve_position`]).

use crate::error::Result;
use crate::layout::LayoutTree;
use crate::registry::Registry;

/// Axis-aligned region in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One paint instruction.
///
/// Instructions stream in order: a `Page` op opens a page, and the ops
/// that follow it are positioned relative to that page's origin until the
/// next `Page` op.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Page { index: usize, rect: Rect },
    Text { rect: Rect, text: String },
}

/// Receiver of paint instructions.
pub trait RenderSink {
    fn paint(&mut self, op: PaintOp);
}

impl RenderSink for Vec<PaintOp> {
    fn paint(&mut self, op: PaintOp) {
        self.push(op);
    }
}

/// Walk the layout tree and emit one paint call per visible node.
pub fn paint_document(
    layout: &LayoutTree,
    registry: &Registry,
    sink: &mut dyn RenderSink,
) -> Result<()> {
    let spec = layout.page_spec();
    for (index, page) in layout.pages().iter().enumerate() {
        sink.paint(PaintOp::Page {
            index,
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: spec.width,
                height: spec.height,
            },
        });
        let mut y = spec.padding_top;
        for line in page.lines() {
            let mut x = spec.padding_left;
            for word in line.boxes() {
                if word.is_break {
                    continue;
                }
                let definition = registry.get(word.tag)?;
                let region = Rect {
                    x,
                    y,
                    width: word.width,
                    height: word.height,
                };
                sink.paint(definition.paint(region, Some(&word.text)));
                x += word.width;
            }
            y += line.height;
        }
    }
    Ok(())
}

/// Convenience wrapper collecting the paint stream into a vector.
pub fn paint_ops(layout: &LayoutTree, registry: &Registry) -> Result<Vec<PaintOp>> {
    let mut ops = Vec::new();
    paint_document(layout, registry, &mut ops)?;
    Ok(ops)
}
