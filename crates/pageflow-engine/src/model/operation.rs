use std::ops::Range;

use crate::error::{EngineError, Result};
use crate::model::{ModelNode, NodeId};

/// One reversible content edit inside a transformation.
///
/// Text offsets are leaf-local char offsets; structural operations address
/// nodes by id. Operations are applied in order against a working copy of
/// the model, so a failing operation leaves the committed trees untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InsertText {
        node: NodeId,
        offset: usize,
        text: String,
    },
    DeleteText {
        node: NodeId,
        range: Range<usize>,
    },
    InsertNode {
        parent: NodeId,
        index: usize,
        node: ModelNode,
    },
    RemoveNode {
        parent: NodeId,
        id: NodeId,
    },
}

impl Operation {
    /// Apply this operation to the tree rooted at `root`.
    pub fn apply_to(&self, root: &mut ModelNode) -> Result<()> {
        match self {
            Operation::InsertText { node, offset, text } => {
                target_mut(root, *node)?.insert_text(*offset, text)
            }
            Operation::DeleteText { node, range } => {
                target_mut(root, *node)?.delete_text(range.start, range.end)
            }
            Operation::InsertNode {
                parent,
                index,
                node,
            } => target_mut(root, *parent)?.insert_child(*index, node.clone()),
            Operation::RemoveNode { parent, id } => {
                target_mut(root, *parent)?.remove_child(*id).map(|_| ())
            }
        }
    }
}

fn target_mut(root: &mut ModelNode, id: NodeId) -> Result<&mut ModelNode> {
    root.find_mut(id).ok_or(EngineError::StructuralViolation {
        detail: format!("operation target {id} not found in tree"),
    })
}
