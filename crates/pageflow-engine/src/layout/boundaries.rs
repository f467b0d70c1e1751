//! Word and line boundary search for cursor navigation.
//!
//! All four directional variants share one escalation ladder: locate the
//! word box containing the query offset, then step to the adjacent sibling
//! at the same level, falling through to the first/last box of the
//! adjacent line and page only when the current level has no sibling
//! (`LayoutTree::{next_box, previous_box, next_line, previous_line}` do
//! the cross-parent walking). At the document's extreme ends every search
//! degrades to "no movement" rather than failing.
//!
//! Word boundaries are box starts in both directions: forward lands on the
//! start of the next box, backward on the start of the containing box (or
//! of the previous box when already at a start). The forward/backward
//! [`Bias`] of the locate step is what resolves an offset sitting exactly
//! on a box edge to the correct side.

use crate::error::Result;

use super::node::{Bias, LayoutTree};

/// Start of the next word, or `offset` when already at the last one.
pub fn next_word_start(layout: &LayoutTree, offset: usize) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Forward)?;
    match layout.next_box(address) {
        Some(next) => layout.box_start_offset(next),
        None => Ok(offset),
    }
}

/// Start of the containing word, or of the previous word when already at a
/// start; `offset` when at the document's first word start.
pub fn previous_word_start(layout: &LayoutTree, offset: usize) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Backward)?;
    layout.box_start_offset(address)
}

/// First caret position of the containing line.
pub fn line_start(layout: &LayoutTree, offset: usize) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Forward)?;
    layout.line_start_offset(address.line_address())
}

/// Last caret position of the containing line.
pub fn line_end(layout: &LayoutTree, offset: usize) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Forward)?;
    layout.caret_end(address.line_address())
}

/// Caret in the line above at the locked x position; `offset` on the first
/// line.
pub fn offset_above(layout: &LayoutTree, offset: usize, x: f64) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Forward)?;
    match layout.previous_line(address.line_address()) {
        Some(previous) => layout.offset_at_x(previous, x),
        None => Ok(offset),
    }
}

/// Caret in the line below at the locked x position; `offset` on the last
/// line.
pub fn offset_below(layout: &LayoutTree, offset: usize, x: f64) -> Result<usize> {
    let (address, _) = layout.locate_box(offset, Bias::Forward)?;
    match layout.next_line(address.line_address()) {
        Some(next) => layout.offset_at_x(next, x),
        None => Ok(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::LayoutTree;
    use super::*;
    use crate::layout;
    use crate::model::ModelNode;
    use crate::registry::{PageSpec, Registry, tags};
    use crate::render::RenderDoc;

    fn page(width: f64, height: f64) -> PageSpec {
        PageSpec {
            width,
            height,
            padding_top: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            padding_right: 0.0,
        }
    }

    fn layout_of(blocks: &[&str], spec: PageSpec) -> LayoutTree {
        let registry = Registry::with_defaults(spec);
        let model = ModelNode::branch(
            tags::DOCUMENT,
            blocks
                .iter()
                .map(|text| {
                    ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, *text)])
                })
                .collect(),
        );
        let render = RenderDoc::derive(&model, &registry).unwrap();
        layout::build(&render, &registry).unwrap()
    }

    #[test]
    fn test_word_forward_lands_on_next_box_start() {
        // "Hello world" on one line: boxes "Hello " [0,6), "world" [6,11),
        // break [11,12).
        let layout = layout_of(&["Hello world"], page(80.0, 24.0));
        assert_eq!(next_word_start(&layout, 0).unwrap(), 6);
        assert_eq!(next_word_start(&layout, 3).unwrap(), 6);
        assert_eq!(next_word_start(&layout, 6).unwrap(), 11);
        // Already on the break box: no movement.
        assert_eq!(next_word_start(&layout, 11).unwrap(), 11);
    }

    #[test]
    fn test_word_backward_lands_on_box_start() {
        let layout = layout_of(&["Hello world"], page(80.0, 24.0));
        assert_eq!(previous_word_start(&layout, 8).unwrap(), 6);
        // Exactly on a box start: previous box.
        assert_eq!(previous_word_start(&layout, 6).unwrap(), 0);
        assert_eq!(previous_word_start(&layout, 11).unwrap(), 6);
        // Document start: no movement.
        assert_eq!(previous_word_start(&layout, 0).unwrap(), 0);
    }

    #[test]
    fn test_word_search_crosses_line_boundaries() {
        // Width 6: "Hello " [0,6) on line 1, "world"+break [6,12) on line 2.
        let layout = layout_of(&["Hello world"], page(6.0, 24.0));
        assert_eq!(next_word_start(&layout, 0).unwrap(), 6);
        assert_eq!(previous_word_start(&layout, 6).unwrap(), 0);
    }

    #[test]
    fn test_word_search_crosses_page_boundaries() {
        // Page height 1: each line gets its own page.
        let layout = layout_of(&["Hello world"], page(6.0, 1.0));
        assert_eq!(layout.pages().len(), 2);
        assert_eq!(next_word_start(&layout, 0).unwrap(), 6);
        assert_eq!(previous_word_start(&layout, 6).unwrap(), 0);
    }

    #[test]
    fn test_word_boundary_symmetry() {
        let layout = layout_of(&["Hello world wide", "Foo bar"], page(12.0, 24.0));
        // Every word start except the document's first round-trips.
        let mut starts = Vec::new();
        let mut offset = 0;
        loop {
            let next = next_word_start(&layout, offset).unwrap();
            if next == offset {
                break;
            }
            starts.push(next);
            offset = next;
        }
        for &p in &starts {
            assert_eq!(
                next_word_start(&layout, previous_word_start(&layout, p).unwrap()).unwrap(),
                p,
                "word symmetry broken at {p}"
            );
        }
    }

    #[test]
    fn test_line_start_and_end() {
        // Lines: "Hello " [0,6), "world"+break [6,12), "Foo"+break [12,16).
        let layout = layout_of(&["Hello world", "Foo"], page(6.0, 24.0));
        assert_eq!(line_start(&layout, 3).unwrap(), 0);
        // End of line 1 sits before the trailing space.
        assert_eq!(line_end(&layout, 3).unwrap(), 5);
        assert_eq!(line_start(&layout, 8).unwrap(), 6);
        assert_eq!(line_end(&layout, 8).unwrap(), 11);
        assert_eq!(line_end(&layout, 13).unwrap(), 15);
        // Already at a boundary: no movement.
        assert_eq!(line_start(&layout, 6).unwrap(), 6);
        assert_eq!(line_end(&layout, 11).unwrap(), 11);
    }

    #[test]
    fn test_line_boundary_symmetry() {
        let layout = layout_of(&["Hello world", "Foo"], page(6.0, 24.0));
        for offset in 0..layout.selectable_size() {
            let start = line_start(&layout, offset).unwrap();
            assert_eq!(
                line_start(&layout, start).unwrap(),
                start,
                "line start not idempotent from {offset}"
            );
            let end = line_end(&layout, offset).unwrap();
            assert_eq!(
                line_end(&layout, end).unwrap(),
                end,
                "line end not idempotent from {offset}"
            );
        }
    }

    #[test]
    fn test_vertical_moves_honor_locked_x() {
        // Lines: "Hello " / "world" + break / "Foo" + break.
        let layout = layout_of(&["Hello world", "Foo"], page(6.0, 24.0));
        // From "Hello" column 4 down into "world" column 4.
        assert_eq!(offset_below(&layout, 4, 4.0).unwrap(), 10);
        // Down again into "Foo": x 4 clamps to the line's caret end.
        assert_eq!(offset_below(&layout, 10, 4.0).unwrap(), 15);
        // Back up: "world" column 3 (x preserved by the caller's lock).
        assert_eq!(offset_above(&layout, 15, 4.0).unwrap(), 10);
        assert_eq!(offset_above(&layout, 10, 4.0).unwrap(), 4);
        // First line: no movement.
        assert_eq!(offset_above(&layout, 4, 4.0).unwrap(), 4);
        // Last line: no movement.
        assert_eq!(offset_below(&layout, 15, 4.0).unwrap(), 15);
    }
}
