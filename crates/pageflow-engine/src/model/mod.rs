/*!
 * # Content model
 *
 * The model tree is the authoritative document content: a `Root` node
 * owning `Block` nodes, which own inline `Branch` containers and text
 * `Leaf` nodes. It is the only layer mutated directly; the render and
 * layout trees are derived from it.
 *
 * Two offset scales live here:
 *
 * - **Model offsets** count every position in the tree *including* the
 *   two structural delimiters (open/close) that each Root/Block/Branch
 *   contributes. A leaf contributes its char count.
 * - **Selectable offsets** (the scale cursors speak) exclude structural
 *   delimiters; conversion between the two happens on the render tree,
 *   which caches both sizes per node.
 *
 * Nodes own their children by value and carry no parent pointers;
 * traversal is top-down from the root, and cross-parent neighbours are
 * resolved lazily where they are needed (see the layout module).
 *
 * All mutation flows through [`Operation`]s applied by the editor's
 * transformation pipeline; nothing else touches the tree.
 */

pub mod node;
pub mod operation;

pub use node::{ModelContent, ModelLocation, ModelNode, NodeId, TypeTag};
pub use operation::Operation;
