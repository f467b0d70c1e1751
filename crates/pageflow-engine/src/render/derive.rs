//! Render derivation: building and re-syncing the measured mirror.
//!
//! Derivation looks every node's behavior up by type tag and fails fast on
//! an unregistered tag. `sync` mirrors model child insertion/deletion 1:1
//! in order, reusing block nodes by id and clearing size caches along every
//! touched path.

use std::collections::HashMap;

use log::trace;

use crate::error::{EngineError, Result};
use crate::model::{ModelContent, ModelNode};
use crate::registry::{ElementRole, Registry};
use crate::render::node::{RenderAtom, RenderBlock, RenderDoc, RenderInline, RenderText, SizeCache};

impl RenderDoc {
    /// Build the full render mirror of `model`.
    pub fn derive(model: &ModelNode, registry: &Registry) -> Result<Self> {
        let page = document_attrs(model, registry)?;
        let children = block_children(model)?
            .iter()
            .map(|block| derive_block(block, registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: model.id(),
            tag: model.tag(),
            page,
            children,
            cache: SizeCache::default(),
        })
    }

    /// Re-derive from `model` after a mutation.
    ///
    /// Blocks are matched by id: kept blocks get their content re-derived
    /// in place, new blocks are derived fresh, removed blocks are dropped,
    /// and sibling order always follows the model.
    pub fn sync(&mut self, model: &ModelNode, registry: &Registry) -> Result<()> {
        self.page = document_attrs(model, registry)?;
        let mut existing: HashMap<_, _> = self
            .children
            .drain(..)
            .map(|block| (block.id(), block))
            .collect();
        let mut children = Vec::new();
        for block in block_children(model)? {
            match existing.remove(&block.id()) {
                Some(mut kept) => {
                    sync_block(&mut kept, block, registry)?;
                    children.push(kept);
                }
                None => children.push(derive_block(block, registry)?),
            }
        }
        trace!(
            "render sync: {} blocks ({} dropped)",
            children.len(),
            existing.len()
        );
        self.children = children;
        self.cache.clear();
        Ok(())
    }
}

fn document_attrs(model: &ModelNode, registry: &Registry) -> Result<crate::registry::PageSpec> {
    let definition = registry.get(model.tag())?;
    expect_role(model, definition.role(), ElementRole::Document)?;
    Ok(definition.attrs(model).page.unwrap_or_default())
}

fn block_children(model: &ModelNode) -> Result<&[ModelNode]> {
    let children = model
        .children()
        .ok_or_else(|| EngineError::StructuralViolation {
            detail: format!("document root {} must be a structural node", model.id()),
        })?;
    if children.is_empty() {
        return Err(EngineError::StructuralViolation {
            detail: "document must own at least one block".to_string(),
        });
    }
    Ok(children)
}

fn derive_block(model: &ModelNode, registry: &Registry) -> Result<RenderBlock> {
    let definition = registry.get(model.tag())?;
    expect_role(model, definition.role(), ElementRole::Block)?;
    let children = model
        .children()
        .ok_or_else(|| EngineError::StructuralViolation {
            detail: format!("block {} must be a structural node", model.id()),
        })?;

    let mut inlines: Vec<RenderInline> = Vec::new();
    let mut run: Vec<RenderAtom> = Vec::new();
    let mut run_tag = None;
    for child in children {
        match child.content() {
            ModelContent::Text(_) => {
                let leaf_definition = registry.get(child.tag())?;
                expect_role(child, leaf_definition.role(), ElementRole::Text)?;
                run_tag.get_or_insert(child.tag());
                run.push(RenderAtom::Text(text_atom(child)));
            }
            ModelContent::Children(grandchildren) => {
                flush_run(&mut inlines, &mut run, run_tag.take());
                let branch_definition = registry.get(child.tag())?;
                expect_role(child, branch_definition.role(), ElementRole::Branch)?;
                let mut atoms = Vec::with_capacity(grandchildren.len());
                for leaf in grandchildren {
                    if !leaf.is_leaf() {
                        return Err(EngineError::StructuralViolation {
                            detail: format!(
                                "branch {} may only contain leaves, found structural node {}",
                                child.id(),
                                leaf.id()
                            ),
                        });
                    }
                    let leaf_definition = registry.get(leaf.tag())?;
                    expect_role(leaf, leaf_definition.role(), ElementRole::Text)?;
                    atoms.push(RenderAtom::Text(text_atom(leaf)));
                }
                inlines.push(RenderInline {
                    id: Some(child.id()),
                    tag: child.tag(),
                    delimited: true,
                    atoms,
                    cache: SizeCache::default(),
                });
            }
        }
    }
    flush_run(&mut inlines, &mut run, run_tag.take());

    // The block-end cursor slot. It may not live inside a delimited inline
    // or it would map inside the branch's closing delimiter.
    match inlines.last_mut() {
        Some(last) if !last.delimited => last.atoms.push(RenderAtom::Break),
        _ => inlines.push(RenderInline {
            id: None,
            tag: model.tag(),
            delimited: false,
            atoms: vec![RenderAtom::Break],
            cache: SizeCache::default(),
        }),
    }

    Ok(RenderBlock {
        id: model.id(),
        tag: model.tag(),
        children: inlines,
        cache: SizeCache::default(),
    })
}

fn sync_block(block: &mut RenderBlock, model: &ModelNode, registry: &Registry) -> Result<()> {
    // Inline content is cheap to rebuild; the block keeps its identity and
    // drops its cached sizes.
    let fresh = derive_block(model, registry)?;
    block.children = fresh.children;
    block.cache.clear();
    Ok(())
}

fn text_atom(leaf: &ModelNode) -> RenderText {
    let text = leaf.text().unwrap_or_default().to_string();
    let chars = text.chars().count();
    RenderText {
        id: leaf.id(),
        tag: leaf.tag(),
        text,
        chars,
    }
}

fn flush_run(
    inlines: &mut Vec<RenderInline>,
    run: &mut Vec<RenderAtom>,
    tag: Option<crate::model::TypeTag>,
) {
    if run.is_empty() {
        return;
    }
    inlines.push(RenderInline {
        id: None,
        tag: tag.unwrap_or(crate::registry::tags::TEXT),
        delimited: false,
        atoms: std::mem::take(run),
        cache: SizeCache::default(),
    });
}

fn expect_role(model: &ModelNode, actual: ElementRole, expected: ElementRole) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(EngineError::StructuralViolation {
            detail: format!(
                "node {} with tag `{}` has role {actual:?}, expected {expected:?}",
                model.id(),
                model.tag()
            ),
        })
    }
}
