use std::cell::Cell;
use std::ops::Range;

use crate::error::{EngineError, Result};
use crate::model::{NodeId, TypeTag};
use crate::registry::PageSpec;

/// Lazily computed selectable/model sizes, cleared whenever a node's
/// children or content change.
#[derive(Debug, Clone, Default)]
pub(crate) struct SizeCache {
    selectable: Cell<Option<usize>>,
    model: Cell<Option<usize>>,
}

impl SizeCache {
    fn selectable(&self, compute: impl FnOnce() -> usize) -> usize {
        match self.selectable.get() {
            Some(size) => size,
            None => {
                let size = compute();
                self.selectable.set(Some(size));
                size
            }
        }
    }

    fn model(&self, compute: impl FnOnce() -> usize) -> usize {
        match self.model.get() {
            Some(size) => size,
            None => {
                let size = compute();
                self.model.set(Some(size));
                size
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.selectable.set(None);
        self.model.set(None);
    }
}

/// Measured mirror of the model root.
#[derive(Debug, Clone)]
pub struct RenderDoc {
    pub(crate) id: NodeId,
    pub(crate) tag: TypeTag,
    pub(crate) page: PageSpec,
    pub(crate) children: Vec<RenderBlock>,
    pub(crate) cache: SizeCache,
}

/// Measured mirror of a model block.
#[derive(Debug, Clone)]
pub struct RenderBlock {
    pub(crate) id: NodeId,
    pub(crate) tag: TypeTag,
    pub(crate) children: Vec<RenderInline>,
    pub(crate) cache: SizeCache,
}

/// Run of atoms under a block.
///
/// A model Branch becomes a *delimited* inline (it owns two structural
/// positions of its own); a run of bare leaves becomes an undelimited
/// grouping inline that is transparent on the model scale.
#[derive(Debug, Clone)]
pub struct RenderInline {
    pub(crate) id: Option<NodeId>,
    pub(crate) tag: TypeTag,
    pub(crate) delimited: bool,
    pub(crate) atoms: Vec<RenderAtom>,
    pub(crate) cache: SizeCache,
}

/// Atomic render content.
#[derive(Debug, Clone)]
pub enum RenderAtom {
    Text(RenderText),
    /// The block-end cursor slot: one selectable position, no model
    /// footprint. Appended to every block by derivation.
    Break,
}

/// Measured mirror of a text leaf.
#[derive(Debug, Clone)]
pub struct RenderText {
    pub(crate) id: NodeId,
    pub(crate) tag: TypeTag,
    pub(crate) text: String,
    pub(crate) chars: usize,
}

impl RenderText {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.chars
    }
}

impl RenderAtom {
    pub fn selectable_size(&self) -> usize {
        match self {
            RenderAtom::Text(text) => text.chars,
            RenderAtom::Break => 1,
        }
    }

    pub fn model_size(&self) -> usize {
        match self {
            RenderAtom::Text(text) => text.chars,
            RenderAtom::Break => 0,
        }
    }
}

impl RenderInline {
    /// Model node this inline mirrors; `None` for a synthetic grouping run.
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Whether this inline owns two structural positions of its own.
    pub fn is_delimited(&self) -> bool {
        self.delimited
    }

    pub fn atoms(&self) -> &[RenderAtom] {
        &self.atoms
    }

    pub fn selectable_size(&self) -> usize {
        self.cache.selectable(|| {
            self.atoms
                .iter()
                .map(RenderAtom::selectable_size)
                .sum::<usize>()
        })
    }

    pub fn model_size(&self) -> usize {
        self.cache.model(|| {
            let base = if self.delimited { 2 } else { 0 };
            base + self.atoms.iter().map(RenderAtom::model_size).sum::<usize>()
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Model offset of a selectable offset local to this inline, relative
    /// to the inline's first model position.
    fn model_offset_in(&self, offset: usize) -> usize {
        let mut remaining = offset;
        let mut model = usize::from(self.delimited);
        for atom in &self.atoms {
            let selectable = atom.selectable_size();
            if remaining < selectable {
                return model
                    + match atom {
                        RenderAtom::Text(_) => remaining,
                        RenderAtom::Break => 0,
                    };
            }
            remaining -= selectable;
            model += atom.model_size();
        }
        model
    }
}

impl RenderBlock {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn inlines(&self) -> &[RenderInline] {
        &self.children
    }

    pub fn selectable_size(&self) -> usize {
        self.cache.selectable(|| {
            self.children
                .iter()
                .map(RenderInline::selectable_size)
                .sum::<usize>()
        })
    }

    pub fn model_size(&self) -> usize {
        self.cache.model(|| {
            2 + self
                .children
                .iter()
                .map(RenderInline::model_size)
                .sum::<usize>()
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn model_offset_in(&self, offset: usize) -> usize {
        let mut remaining = offset;
        let mut model = 1;
        for inline in &self.children {
            let selectable = inline.selectable_size();
            if remaining < selectable {
                return model + inline.model_offset_in(remaining);
            }
            remaining -= selectable;
            model += inline.model_size();
        }
        model
    }

    fn caret_target_in(&self, offset: usize) -> CaretTarget {
        let mut remaining = offset;
        for inline in &self.children {
            for atom in &inline.atoms {
                match atom {
                    RenderAtom::Text(text) => {
                        if remaining < text.chars {
                            return CaretTarget::Leaf {
                                block: self.id,
                                node: text.id,
                                offset: remaining,
                            };
                        }
                        remaining -= text.chars;
                    }
                    RenderAtom::Break => {
                        return CaretTarget::BlockEnd {
                            block: self.id,
                            append: self.last_leaf(),
                        };
                    }
                }
            }
        }
        // The break atom is always the block's final atom, so the walk
        // returns before exhausting the atoms for any in-range offset.
        CaretTarget::BlockEnd {
            block: self.id,
            append: self.last_leaf(),
        }
    }

    /// Last text leaf of the block with its char length, if any.
    pub fn last_leaf(&self) -> Option<(NodeId, usize)> {
        self.children.iter().rev().find_map(|inline| {
            inline.atoms.iter().rev().find_map(|atom| match atom {
                RenderAtom::Text(text) => Some((text.id, text.chars)),
                RenderAtom::Break => None,
            })
        })
    }
}

/// Where a selectable caret lands inside the model, for compiling edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretTarget {
    /// Inside a text leaf at a local char offset.
    Leaf {
        block: NodeId,
        node: NodeId,
        offset: usize,
    },
    /// On a block's end-of-block position. `append` names the block's last
    /// leaf and its char length when the block has text to append to.
    BlockEnd {
        block: NodeId,
        append: Option<(NodeId, usize)>,
    },
}

/// Char range of one leaf covered by a selectable range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSegment {
    pub node: NodeId,
    pub range: Range<usize>,
}

impl RenderDoc {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }

    pub fn blocks(&self) -> &[RenderBlock] {
        &self.children
    }

    pub fn selectable_size(&self) -> usize {
        self.cache.selectable(|| {
            self.children
                .iter()
                .map(RenderBlock::selectable_size)
                .sum::<usize>()
        })
    }

    pub fn model_size(&self) -> usize {
        self.cache.model(|| {
            2 + self
                .children
                .iter()
                .map(RenderBlock::model_size)
                .sum::<usize>()
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Convert a selectable offset to its model offset.
    ///
    /// Walks the selectable and model scales in lock-step per child while
    /// summing them independently, adding 1 per delimited level entered.
    /// Total and strictly increasing over `[0, selectable_size)`.
    pub fn model_offset_at(&self, offset: usize) -> Result<usize> {
        let size = self.selectable_size();
        if offset >= size {
            return Err(EngineError::OutOfRange {
                offset,
                size,
                context: "document selectable span",
            });
        }
        let mut remaining = offset;
        let mut model = 1;
        for block in &self.children {
            let selectable = block.selectable_size();
            if remaining < selectable {
                return Ok(model + block.model_offset_in(remaining));
            }
            remaining -= selectable;
            model += block.model_size();
        }
        // Guarded by the size check above.
        Err(EngineError::OutOfRange {
            offset,
            size,
            context: "document selectable span",
        })
    }

    /// Resolve a selectable caret to its model target for edit compilation.
    pub fn caret_target(&self, offset: usize) -> Result<CaretTarget> {
        let size = self.selectable_size();
        if offset >= size {
            return Err(EngineError::OutOfRange {
                offset,
                size,
                context: "document selectable span",
            });
        }
        let mut remaining = offset;
        for block in &self.children {
            let selectable = block.selectable_size();
            if remaining < selectable {
                return Ok(block.caret_target_in(remaining));
            }
            remaining -= selectable;
        }
        Err(EngineError::OutOfRange {
            offset,
            size,
            context: "document selectable span",
        })
    }

    /// Block containing a selectable offset: `(child index, block, local
    /// offset)`.
    pub fn block_at(&self, offset: usize) -> Result<(usize, &RenderBlock, usize)> {
        let size = self.selectable_size();
        let mut remaining = offset;
        for (index, block) in self.children.iter().enumerate() {
            let selectable = block.selectable_size();
            if remaining < selectable {
                return Ok((index, block, remaining));
            }
            remaining -= selectable;
        }
        Err(EngineError::OutOfRange {
            offset,
            size,
            context: "document selectable span",
        })
    }

    /// Selectable offset of the block at `index`.
    pub fn block_start(&self, index: usize) -> usize {
        self.children[..index]
            .iter()
            .map(RenderBlock::selectable_size)
            .sum()
    }

    /// Leaf char segments covered by a selectable range, in tree order.
    /// Break positions inside the range carry no text and produce no
    /// segment.
    pub fn leaf_segments(&self, range: Range<usize>) -> Vec<LeafSegment> {
        let mut segments = Vec::new();
        let mut cursor = 0usize;
        for block in &self.children {
            for inline in &block.children {
                for atom in &inline.atoms {
                    match atom {
                        RenderAtom::Text(text) => {
                            let start = cursor.max(range.start);
                            let end = (cursor + text.chars).min(range.end);
                            if start < end {
                                segments.push(LeafSegment {
                                    node: text.id,
                                    range: (start - cursor)..(end - cursor),
                                });
                            }
                            cursor += text.chars;
                        }
                        RenderAtom::Break => cursor += 1,
                    }
                }
            }
        }
        segments
    }
}
