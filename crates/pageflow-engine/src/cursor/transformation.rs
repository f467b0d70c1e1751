use crate::model::Operation;

/// An atomic unit of change: zero or more content operations plus the
/// resulting selection target.
///
/// Applying a transformation is the single mutation entry point for both
/// model edits and cursor moves; see [`crate::editor::Editor::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub operations: Vec<Operation>,
    /// Target head, clamped into the caret range at apply time.
    pub head: usize,
    /// Target anchor; `None` collapses the selection to the head.
    pub anchor: Option<usize>,
    /// Preserve the horizontal navigation lock instead of recomputing it
    /// from the new head. Set by vertical moves.
    pub keep_left_lock: bool,
}

impl Transformation {
    /// Pure cursor move collapsing to a caret.
    pub fn caret(head: usize) -> Self {
        Self {
            operations: Vec::new(),
            head,
            anchor: None,
            keep_left_lock: false,
        }
    }

    /// Pure cursor move to a range selection.
    pub fn selection(anchor: usize, head: usize) -> Self {
        Self {
            operations: Vec::new(),
            head,
            anchor: Some(anchor),
            keep_left_lock: false,
        }
    }

    /// Vertical cursor move: like [`Transformation::caret`] but keeps the
    /// horizontal lock.
    pub fn vertical(head: usize) -> Self {
        Self {
            keep_left_lock: true,
            ..Self::caret(head)
        }
    }

    /// Content edit collapsing the cursor to `head`.
    pub fn edit(operations: Vec<Operation>, head: usize) -> Self {
        Self {
            operations,
            head,
            anchor: None,
            keep_left_lock: false,
        }
    }
}
