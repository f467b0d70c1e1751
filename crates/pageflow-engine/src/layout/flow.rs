//! The two layout passes: greedy line-breaking per block, then greedy
//! pagination of the produced lines.

use log::debug;

use crate::error::{EngineError, Result};
use crate::registry::Registry;
use crate::render::{RenderAtom, RenderBlock, RenderDoc};

use super::node::{LayoutTree, LineBox, PageBox, WordBox};

/// Rebuild the layout tree from the render tree.
///
/// Line-breaking accumulates box widths per block until the next box would
/// exceed the available content width (strictly greater; a box that exactly
/// fills the remaining width stays). A line always takes at least one box,
/// so an over-wide box sits alone on its own line, and a block boundary
/// always forces a new line. Pagination applies the same greedy fill to
/// line heights against the content height, keeping at least one line per
/// page.
pub fn build(render: &RenderDoc, registry: &Registry) -> Result<LayoutTree> {
    let page_spec = render.page();
    let width_limit = page_spec.content_width();
    let height_limit = page_spec.content_height();

    let mut lines = Vec::new();
    for block in render.blocks() {
        let mut current: Vec<WordBox> = Vec::new();
        let mut cumulated = 0.0;
        for word in block_boxes(block, registry)? {
            if !current.is_empty() && cumulated + word.width > width_limit {
                lines.push(finish_line(std::mem::take(&mut current)));
                cumulated = 0.0;
            }
            cumulated += word.width;
            current.push(word);
        }
        if !current.is_empty() {
            lines.push(finish_line(current));
        }
    }

    let mut pages = Vec::new();
    let mut current: Vec<LineBox> = Vec::new();
    let mut cumulated = 0.0;
    for line in lines {
        if !current.is_empty() && cumulated + line.height > height_limit {
            pages.push(finish_page(std::mem::take(&mut current)));
            cumulated = 0.0;
        }
        cumulated += line.height;
        current.push(line);
    }
    if !current.is_empty() {
        pages.push(finish_page(current));
    }

    let size = pages.iter().map(|page| page.size).sum();
    debug_assert_eq!(size, render.selectable_size());
    debug!(
        "layout rebuilt: {} pages, {} selectable positions",
        pages.len(),
        size
    );
    Ok(LayoutTree {
        page_spec,
        pages,
        size,
    })
}

/// Flatten one block's inline atoms into measured word boxes.
fn block_boxes(block: &RenderBlock, registry: &Registry) -> Result<Vec<WordBox>> {
    let mut boxes = Vec::new();
    for inline in block.inlines() {
        for atom in inline.atoms() {
            match atom {
                RenderAtom::Text(text) => {
                    let definition = registry.get(text.tag())?;
                    let mut covered = 0;
                    for metrics in definition.measure(text.text()) {
                        let chars = metrics.text.chars().count();
                        covered += chars;
                        boxes.push(WordBox {
                            text: metrics.text,
                            width: metrics.width,
                            height: metrics.height,
                            selectable: chars,
                            block: block.id(),
                            tag: text.tag(),
                            is_break: false,
                        });
                    }
                    if covered != text.char_len() {
                        return Err(EngineError::StructuralViolation {
                            detail: format!(
                                "measurement for tag `{}` covered {covered} of {} chars",
                                text.tag(),
                                text.char_len()
                            ),
                        });
                    }
                }
                RenderAtom::Break => {
                    let height = boxes.last().map_or(1.0, |word: &WordBox| word.height);
                    boxes.push(WordBox {
                        text: String::new(),
                        width: 0.0,
                        height,
                        selectable: 1,
                        block: block.id(),
                        tag: block.tag(),
                        is_break: true,
                    });
                }
            }
        }
    }
    Ok(boxes)
}

fn finish_line(boxes: Vec<WordBox>) -> LineBox {
    let block = boxes[0].block;
    let size = boxes.iter().map(|word| word.selectable).sum();
    let width = boxes.iter().map(|word| word.width).sum();
    let height = boxes.iter().map(|word| word.height).fold(0.0, f64::max);
    LineBox {
        boxes,
        block,
        size,
        width,
        height,
    }
}

fn finish_page(lines: Vec<LineBox>) -> PageBox {
    let size = lines.iter().map(|line| line.size).sum();
    let height = lines.iter().map(|line| line.height).sum();
    PageBox {
        lines,
        size,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelNode;
    use crate::registry::{PageSpec, tags};

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

    fn doc(blocks: &[&str]) -> ModelNode {
        ModelNode::branch(
            tags::DOCUMENT,
            blocks
                .iter()
                .map(|text| {
                    ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, *text)])
                })
                .collect(),
        )
    }

    fn layout_of(blocks: &[&str], spec: PageSpec) -> LayoutTree {
        let registry = Registry::with_defaults(spec);
        let model = doc(blocks);
        let render = RenderDoc::derive(&model, &registry).unwrap();
        build(&render, &registry).unwrap()
    }

    fn line_texts(layout: &LayoutTree) -> Vec<String> {
        layout
            .pages()
            .iter()
            .flat_map(|page| page.lines())
            .map(|line| {
                line.boxes()
                    .iter()
                    .map(|word| word.text.as_str())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_width_six_pushes_world_to_second_line() {
        // Width fits exactly "Hello " (6 units); "world" must wrap and
        // "Foo" starts its own line because blocks never share lines.
        let layout = layout_of(&["Hello world", "Foo"], page(6.0, 100.0));
        assert_eq!(line_texts(&layout), vec!["Hello", "world", "Foo"]);
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        // "abc de" = boxes "abc " (4) and "de" (2): together exactly 6.
        let layout = layout_of(&["abc de"], page(6.0, 100.0));
        assert_eq!(line_texts(&layout), vec!["abc de"]);
    }

    #[test]
    fn test_over_wide_box_sits_alone() {
        let layout = layout_of(&["abcdefgh xy"], page(4.0, 100.0));
        assert_eq!(line_texts(&layout), vec!["abcdefgh", "xy"]);
    }

    #[test]
    fn test_block_boundary_forces_new_line() {
        let layout = layout_of(&["a", "b"], page(80.0, 100.0));
        assert_eq!(line_texts(&layout), vec!["a", "b"]);
    }

    #[test]
    fn test_line_breaking_is_idempotent() {
        let registry = Registry::with_defaults(page(6.0, 2.0));
        let model = doc(&["Hello world", "Foo", "bar baz quux"]);
        let render = RenderDoc::derive(&model, &registry).unwrap();
        let first = build(&render, &registry).unwrap();
        let second = build(&render, &registry).unwrap();
        assert_eq!(first.pages(), second.pages());
    }

    #[test]
    fn test_pagination_fills_pages_greedily() {
        // Six lines of height 1 at page height 2 → 3 pages.
        let layout = layout_of(&["a", "b", "c", "d", "e", "f"], page(80.0, 2.0));
        let per_page: Vec<usize> = layout.pages().iter().map(|p| p.lines().len()).collect();
        assert_eq!(per_page, vec![2, 2, 2]);
    }

    #[test]
    fn test_pagination_height_invariant() {
        let layout = layout_of(
            &["Hello world wide web", "Foo", "bar baz", "quux"],
            page(6.0, 3.0),
        );
        let limit = layout.page_spec().content_height();
        for page in layout.pages() {
            let total: f64 = page.lines().iter().map(|line| line.height).sum();
            assert!(
                total <= limit || page.lines().len() == 1,
                "page of height {total} exceeds {limit} with {} lines",
                page.lines().len()
            );
        }
    }

    #[test]
    fn test_layout_covers_every_selectable_position() {
        let layout = layout_of(&["Hello world", "Foo"], page(6.0, 2.0));
        // 11 chars + break + 3 chars + break.
        assert_eq!(layout.selectable_size(), 16);
    }

    #[test]
    fn test_empty_block_produces_break_only_line() {
        let layout = layout_of(&["a", "", "b"], page(80.0, 100.0));
        assert_eq!(line_texts(&layout), vec!["a", "", "b"]);
        let middle = &layout.pages()[0].lines()[1];
        assert_eq!(middle.size(), 1);
        assert!(middle.boxes()[0].is_break);
    }
}
