use std::fmt;

use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Stable identifier for a model node. Survives edits; render nodes mirror
/// the model by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag used to look up a node's behavior (derivation, measurement,
/// painting) in the element registry.
pub type TypeTag = &'static str;

/// Payload of a model node: structural nodes own children, leaves own a run
/// of text.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelContent {
    Children(Vec<ModelNode>),
    Text(String),
}

/// Location of a model offset: the node whose span contains it and the
/// offset local to that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLocation {
    pub node: NodeId,
    pub offset: usize,
}

/// A node in the content tree.
///
/// Shape: `Root → Block* → (Branch|Leaf)*`, where a Branch is an inline
/// container of Leaves and a Leaf holds a text run. The shape is enforced
/// at derivation time, not construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    id: NodeId,
    tag: TypeTag,
    content: ModelContent,
}

impl ModelNode {
    /// Create a structural node owning `children`.
    pub fn branch(tag: TypeTag, children: Vec<ModelNode>) -> Self {
        Self {
            id: NodeId::new(),
            tag,
            content: ModelContent::Children(children),
        }
    }

    /// Create a leaf node holding a text run.
    pub fn leaf(tag: TypeTag, text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            tag,
            content: ModelContent::Text(text.into()),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn content(&self) -> &ModelContent {
        &self.content
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, ModelContent::Text(_))
    }

    /// Children of a structural node, `None` for a leaf.
    pub fn children(&self) -> Option<&[ModelNode]> {
        match &self.content {
            ModelContent::Children(children) => Some(children),
            ModelContent::Text(_) => None,
        }
    }

    /// Text of a leaf node, `None` for a structural node.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ModelContent::Text(text) => Some(text),
            ModelContent::Children(_) => None,
        }
    }

    /// Char count of a leaf's text, 0 for structural nodes.
    pub fn char_len(&self) -> usize {
        self.text().map_or(0, |text| text.chars().count())
    }

    /// Model size of this subtree: a leaf contributes its char count, a
    /// structural node contributes 2 (its own delimiters) plus the sum of
    /// its children.
    pub fn model_size(&self) -> usize {
        match &self.content {
            ModelContent::Text(text) => text.chars().count(),
            ModelContent::Children(children) => {
                2 + children.iter().map(Self::model_size).sum::<usize>()
            }
        }
    }

    /// Locate a model offset inside this subtree.
    ///
    /// Walks children accumulating model size and descends into the child
    /// whose span contains the offset, subtracting 1 for the opening
    /// delimiter already consumed. Offsets on this node's own delimiters
    /// resolve to this node.
    pub fn locate(&self, offset: usize) -> Result<ModelLocation> {
        let size = self.model_size();
        if offset >= size {
            return Err(EngineError::OutOfRange {
                offset,
                size,
                context: "model subtree",
            });
        }
        match &self.content {
            ModelContent::Text(_) => Ok(ModelLocation {
                node: self.id,
                offset,
            }),
            ModelContent::Children(children) => {
                if offset == 0 || offset == size - 1 {
                    return Ok(ModelLocation {
                        node: self.id,
                        offset,
                    });
                }
                let mut cursor = 1;
                for child in children {
                    let span = child.model_size();
                    if offset < cursor + span {
                        return child.locate(offset - cursor);
                    }
                    cursor += span;
                }
                // Cannot be reached: offsets past the last child were caught
                // by the size - 1 check above.
                Err(EngineError::OutOfRange {
                    offset,
                    size,
                    context: "model subtree",
                })
            }
        }
    }

    /// Find a node by id in this subtree.
    pub fn find(&self, id: NodeId) -> Option<&ModelNode> {
        if self.id == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }

    /// Find a node by id in this subtree, mutably.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut ModelNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.content {
            ModelContent::Children(children) => {
                children.iter_mut().find_map(|child| child.find_mut(id))
            }
            ModelContent::Text(_) => None,
        }
    }

    /// Insert `node` as a child at `index`, preserving sibling order.
    pub fn insert_child(&mut self, index: usize, node: ModelNode) -> Result<()> {
        match &mut self.content {
            ModelContent::Children(children) => {
                if index > children.len() {
                    return Err(EngineError::StructuralViolation {
                        detail: format!(
                            "insert index {index} beyond {} children of {}",
                            children.len(),
                            self.id
                        ),
                    });
                }
                children.insert(index, node);
                Ok(())
            }
            ModelContent::Text(_) => Err(EngineError::StructuralViolation {
                detail: format!("cannot insert a child into leaf {}", self.id),
            }),
        }
    }

    /// Detach and return the child with `id`, discarding nothing: the caller
    /// owns the subtree. Removing an absent child is a structural violation.
    pub fn remove_child(&mut self, id: NodeId) -> Result<ModelNode> {
        match &mut self.content {
            ModelContent::Children(children) => {
                match children.iter().position(|child| child.id() == id) {
                    Some(index) => Ok(children.remove(index)),
                    None => Err(EngineError::StructuralViolation {
                        detail: format!("node {id} is not a child of {}", self.id),
                    }),
                }
            }
            ModelContent::Text(_) => Err(EngineError::StructuralViolation {
                detail: format!("cannot remove a child from leaf {}", self.id),
            }),
        }
    }

    /// Insert `text` at a char offset of this leaf.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<()> {
        let id = self.id;
        match &mut self.content {
            ModelContent::Text(existing) => {
                let len = existing.chars().count();
                if offset > len {
                    return Err(EngineError::OutOfRange {
                        offset,
                        size: len,
                        context: "leaf text",
                    });
                }
                let at = char_to_byte(existing, offset);
                existing.insert_str(at, text);
                Ok(())
            }
            ModelContent::Children(_) => Err(EngineError::StructuralViolation {
                detail: format!("cannot insert text into structural node {id}"),
            }),
        }
    }

    /// Delete the char range `[start, end)` from this leaf.
    pub fn delete_text(&mut self, start: usize, end: usize) -> Result<()> {
        let id = self.id;
        match &mut self.content {
            ModelContent::Text(existing) => {
                let len = existing.chars().count();
                if start > end || end > len {
                    return Err(EngineError::OutOfRange {
                        offset: end,
                        size: len,
                        context: "leaf text",
                    });
                }
                let from = char_to_byte(existing, start);
                let to = char_to_byte(existing, end);
                existing.replace_range(from..to, "");
                Ok(())
            }
            ModelContent::Children(_) => Err(EngineError::StructuralViolation {
                detail: format!("cannot delete text from structural node {id}"),
            }),
        }
    }
}

/// Byte position of a char offset, clamped to the end of `text`.
fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(at, _)| at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tags;

    fn sample_doc() -> ModelNode {
        ModelNode::branch(
            tags::DOCUMENT,
            vec![
                ModelNode::branch(
                    tags::PARAGRAPH,
                    vec![ModelNode::leaf(tags::TEXT, "Hello world")],
                ),
                ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, "Foo")]),
            ],
        )
    }

    #[test]
    fn test_leaf_model_size_is_char_count() {
        let leaf = ModelNode::leaf(tags::TEXT, "héllo");
        assert_eq!(leaf.model_size(), 5);
        assert_eq!(leaf.char_len(), 5);
    }

    #[test]
    fn test_structural_model_size_adds_delimiters() {
        let doc = sample_doc();
        // doc = 2 + (2 + 11) + (2 + 3)
        assert_eq!(doc.model_size(), 20);
    }

    #[test]
    fn test_root_size_at_least_two() {
        let empty = ModelNode::branch(tags::DOCUMENT, vec![]);
        assert_eq!(empty.model_size(), 2);
    }

    #[test]
    fn test_locate_descends_past_opening_delimiter() {
        let doc = sample_doc();
        let first_block = &doc.children().unwrap()[0];
        let leaf = &first_block.children().unwrap()[0];

        // Offset 2 = doc open (0) + block open (1) + first char of the leaf.
        let found = doc.locate(2).unwrap();
        assert_eq!(found.node, leaf.id());
        assert_eq!(found.offset, 0);

        // Offset 12 = last char of "Hello world".
        let found = doc.locate(12).unwrap();
        assert_eq!(found.node, leaf.id());
        assert_eq!(found.offset, 10);

        // Offset 13 = the first block's closing delimiter.
        let found = doc.locate(13).unwrap();
        assert_eq!(found.node, first_block.id());
    }

    #[test]
    fn test_locate_out_of_range() {
        let doc = sample_doc();
        let err = doc.locate(doc.model_size()).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange { offset: 20, .. }));
    }

    #[test]
    fn test_remove_absent_child_is_structural_violation() {
        let mut doc = sample_doc();
        let stranger = NodeId::new();
        let err = doc.remove_child(stranger).unwrap_err();
        assert!(matches!(err, EngineError::StructuralViolation { .. }));
    }

    #[test]
    fn test_insert_and_delete_text_use_char_offsets() {
        let mut leaf = ModelNode::leaf(tags::TEXT, "héllo");
        leaf.insert_text(2, "!!").unwrap();
        assert_eq!(leaf.text().unwrap(), "hé!!llo");
        leaf.delete_text(2, 4).unwrap();
        assert_eq!(leaf.text().unwrap(), "héllo");
    }

    #[test]
    fn test_text_ops_on_structural_node_rejected() {
        let mut doc = sample_doc();
        assert!(doc.insert_text(0, "x").is_err());
        assert!(doc.delete_text(0, 1).is_err());
    }

    #[test]
    fn test_find_mut_reaches_nested_leaf() {
        let mut doc = sample_doc();
        let leaf_id = doc.children().unwrap()[1].children().unwrap()[0].id();
        doc.find_mut(leaf_id).unwrap().insert_text(3, "d").unwrap();
        assert_eq!(doc.find(leaf_id).unwrap().text().unwrap(), "Food");
    }
}
