/*!
 * # Render tree
 *
 * A 1:1 measured mirror of the model tree. Each node caches two derived
 * scalars, invalidated whenever children or content change:
 *
 * - `selectable_size`: cursor-addressable length. Leaves contribute their
 *   char count; every block additionally owns one trailing *break* atom,
 *   the block-end cursor slot.
 * - `model_size`: length including the structural delimiters (2 per
 *   Root/Block/Branch level).
 *
 * The selectable→model conversion lives here ([`RenderDoc::model_offset_at`])
 * and is load-bearing for every cursor operation: cursors speak selectable
 * offsets, content operations speak model offsets. It walks both scales in
 * lock-step per child, summing them independently, and is total and
 * strictly increasing over `[0, selectable_size)`.
 */

pub mod derive;
pub mod node;

pub use node::{
    CaretTarget, LeafSegment, RenderAtom, RenderBlock, RenderDoc, RenderInline, RenderText,
};
