/*!
 * # Layout tree
 *
 * A re-segmentation of the render tree: render content is repacked into
 * lines (bounded by content width) and pages (bounded by content height),
 * discarding the original block/inline shape. The tree is rebuilt
 * wholesale on every pass: line and page boundaries can shift
 * non-locally on any edit, so there is deliberately no incremental
 * diffing here.
 *
 * Layout nodes are addressed by index paths ([`BoxAddress`],
 * [`LineAddress`]) instead of pointers; cross-parent siblings (the last
 * word of the previous line, the first line of the next page) are
 * resolved through address arithmetic at query time rather than cached,
 * which keeps the wholesale rebuild safe.
 *
 * Every node covers a selectable span (`size`); cumulative-size search in
 * both directions ([`LayoutTree::locate_box`]) converts selectable
 * offsets to screen positions, and [`LayoutTree::resolve_position`] is
 * the inverse used for pointer hit-testing.
 */

pub mod boundaries;
pub mod flow;
pub mod node;

pub use flow::build;
pub use node::{Bias, BoxAddress, LayoutNodeRef, LayoutTree, LineAddress, LineBox, PageBox, WordBox};
