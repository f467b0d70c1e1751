//! Navigation and edit commands, compiled to transformations against the
//! current layout tree.

use crate::cursor::{Cursor, Transformation};
use crate::editor::Editor;
use crate::error::Result;
use crate::layout::boundaries;
use crate::model::{ModelNode, Operation};
use crate::registry::tags;
use crate::render::{CaretTarget, RenderDoc};

/// Where a cursor move is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Forward,
    Backward,
    WordForward,
    WordBackward,
    LineStart,
    LineEnd,
    Up,
    Down,
    DocumentStart,
    DocumentEnd,
    /// Absolute selectable offset, e.g. from pointer resolution.
    To(usize),
}

impl Motion {
    fn is_vertical(self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }
}

/// One editor command. Moves collapse the selection, extends keep the
/// anchor, edits compile to content operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move(Motion),
    Extend(Motion),
    SelectAll,
    InsertText(String),
    DeleteBackward,
    DeleteForward,
    SplitBlock,
}

pub(crate) fn compile(editor: &Editor, cursor: &Cursor, command: &Command) -> Result<Transformation> {
    match command {
        Command::Move(motion) => {
            // Collapsing a selection with a plain char move lands on the
            // range boundary in the direction of travel, not one past it.
            let head = match motion {
                Motion::Forward if !cursor.is_caret() => cursor.end(),
                Motion::Backward if !cursor.is_caret() => cursor.start(),
                _ => motion_target(editor, cursor, *motion)?,
            };
            Ok(if motion.is_vertical() {
                Transformation::vertical(head)
            } else {
                Transformation::caret(head)
            })
        }
        Command::Extend(motion) => {
            let head = motion_target(editor, cursor, *motion)?;
            let mut transformation = Transformation::selection(cursor.anchor, head);
            transformation.keep_left_lock = motion.is_vertical();
            Ok(transformation)
        }
        Command::SelectAll => Ok(Transformation::selection(0, editor.layout().last_caret())),
        Command::InsertText(text) => compile_insert(editor, cursor, text),
        Command::DeleteBackward => compile_delete_backward(editor, cursor),
        Command::DeleteForward => compile_delete_forward(editor, cursor),
        Command::SplitBlock => compile_split(editor, cursor),
    }
}

fn motion_target(editor: &Editor, cursor: &Cursor, motion: Motion) -> Result<usize> {
    let layout = editor.layout();
    let last = layout.last_caret();
    Ok(match motion {
        Motion::Forward => (cursor.head + 1).min(last),
        Motion::Backward => cursor.head.saturating_sub(1),
        Motion::WordForward => boundaries::next_word_start(layout, cursor.head)?,
        Motion::WordBackward => boundaries::previous_word_start(layout, cursor.head)?,
        Motion::LineStart => boundaries::line_start(layout, cursor.head)?,
        Motion::LineEnd => boundaries::line_end(layout, cursor.head)?,
        Motion::Up => boundaries::offset_above(layout, cursor.head, cursor.left_lock)?,
        Motion::Down => boundaries::offset_below(layout, cursor.head, cursor.left_lock)?,
        Motion::DocumentStart => 0,
        Motion::DocumentEnd => last,
        Motion::To(offset) => offset.min(last),
    })
}

fn compile_insert(editor: &Editor, cursor: &Cursor, text: &str) -> Result<Transformation> {
    let render = editor.render();
    let start = cursor.start();
    let mut operations = delete_selection_ops(render, cursor);
    operations.push(insert_at(render, start, text)?);
    Ok(Transformation::edit(
        operations,
        start + text.chars().count(),
    ))
}

fn compile_delete_backward(editor: &Editor, cursor: &Cursor) -> Result<Transformation> {
    let render = editor.render();
    if !cursor.is_caret() {
        return Ok(Transformation::edit(
            delete_selection_ops(render, cursor),
            cursor.start(),
        ));
    }
    if cursor.head == 0 {
        return Ok(Transformation::caret(0));
    }
    let previous = cursor.head - 1;
    match render.caret_target(previous)? {
        CaretTarget::Leaf { node, offset, .. } => Ok(Transformation::edit(
            vec![Operation::DeleteText {
                node,
                range: offset..offset + 1,
            }],
            previous,
        )),
        CaretTarget::BlockEnd { .. } => {
            // The position before the caret is the previous block's end
            // slot: join the two blocks.
            let (index, _, _) = render.block_at(cursor.head)?;
            Ok(Transformation::edit(
                merge_blocks_ops(editor, index - 1),
                previous,
            ))
        }
    }
}

fn compile_delete_forward(editor: &Editor, cursor: &Cursor) -> Result<Transformation> {
    let render = editor.render();
    if !cursor.is_caret() {
        return Ok(Transformation::edit(
            delete_selection_ops(render, cursor),
            cursor.start(),
        ));
    }
    if cursor.head >= editor.layout().last_caret() {
        return Ok(Transformation::caret(cursor.head));
    }
    match render.caret_target(cursor.head)? {
        CaretTarget::Leaf { node, offset, .. } => Ok(Transformation::edit(
            vec![Operation::DeleteText {
                node,
                range: offset..offset + 1,
            }],
            cursor.head,
        )),
        CaretTarget::BlockEnd { .. } => {
            let (index, _, _) = render.block_at(cursor.head)?;
            Ok(Transformation::edit(
                merge_blocks_ops(editor, index),
                cursor.head,
            ))
        }
    }
}

fn compile_split(editor: &Editor, cursor: &Cursor) -> Result<Transformation> {
    let render = editor.render();
    if !cursor.is_caret() {
        // Splitting a selection first clears it; the split happens on the
        // next key press against the collapsed caret.
        return Ok(Transformation::edit(
            delete_selection_ops(render, cursor),
            cursor.start(),
        ));
    }
    let head = cursor.head;
    let (index, block, _) = render.block_at(head)?;
    let block_end = render.block_start(index) + block.selectable_size() - 1;
    let tail_segments = render.leaf_segments(head..block_end);

    let mut tail = String::new();
    let mut tail_tag = None;
    for segment in &tail_segments {
        if let Some(leaf) = editor.model().find(segment.node) {
            tail_tag.get_or_insert(leaf.tag());
            if let Some(text) = leaf.text() {
                tail.extend(
                    text.chars()
                        .skip(segment.range.start)
                        .take(segment.range.len()),
                );
            }
        }
    }

    let mut operations: Vec<Operation> = tail_segments
        .into_iter()
        .map(|segment| Operation::DeleteText {
            node: segment.node,
            range: segment.range,
        })
        .collect();
    let children = if tail.is_empty() {
        Vec::new()
    } else {
        vec![ModelNode::leaf(tail_tag.unwrap_or(tags::TEXT), tail)]
    };
    operations.push(Operation::InsertNode {
        parent: editor.model().id(),
        index: index + 1,
        node: ModelNode::branch(block.tag(), children),
    });
    Ok(Transformation::edit(operations, head + 1))
}

/// Per-leaf deletions covering the selection, empty for a caret.
fn delete_selection_ops(render: &RenderDoc, cursor: &Cursor) -> Vec<Operation> {
    if cursor.is_caret() {
        return Vec::new();
    }
    render
        .leaf_segments(cursor.start()..cursor.end())
        .into_iter()
        .map(|segment| Operation::DeleteText {
            node: segment.node,
            range: segment.range,
        })
        .collect()
}

/// Insertion operation for a caret position. Inserting at a block's end
/// slot appends to its last leaf, or seeds an empty block with a fresh
/// text leaf.
fn insert_at(render: &RenderDoc, offset: usize, text: &str) -> Result<Operation> {
    Ok(match render.caret_target(offset)? {
        CaretTarget::Leaf { node, offset, .. } => Operation::InsertText {
            node,
            offset,
            text: text.to_string(),
        },
        CaretTarget::BlockEnd { block, append } => match append {
            Some((node, len)) => Operation::InsertText {
                node,
                offset: len,
                text: text.to_string(),
            },
            None => Operation::InsertNode {
                parent: block,
                index: 0,
                node: ModelNode::leaf(tags::TEXT, text),
            },
        },
    })
}

/// Join the block at `first + 1` into the block at `first`: remove it and
/// re-attach its children at the end of the survivor.
fn merge_blocks_ops(editor: &Editor, first: usize) -> Vec<Operation> {
    let model = editor.model();
    let Some(blocks) = model.children() else {
        return Vec::new();
    };
    let keep = &blocks[first];
    let gone = &blocks[first + 1];
    let mut operations = vec![Operation::RemoveNode {
        parent: model.id(),
        id: gone.id(),
    }];
    let keep_len = keep.children().map_or(0, |children| children.len());
    for (offset, child) in gone.children().unwrap_or(&[]).iter().enumerate() {
        operations.push(Operation::InsertNode {
            parent: keep.id(),
            index: keep_len + offset,
            node: child.clone(),
        });
    }
    operations
}
