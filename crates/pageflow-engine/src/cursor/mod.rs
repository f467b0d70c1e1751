/*!
 * # Cursor and transformation protocol
 *
 * The cursor holds the current selection as a pair of selectable offsets
 * plus the horizontal navigation lock. It exists only while the editor is
 * focused (no-selection ↔ active states) and is mutated exclusively by
 * applying a [`Transformation`], the single mutation entry point shared
 * by content edits and pure cursor moves (a cursor move is a
 * transformation with an empty operation list). An applied transformation
 * never clears the cursor; only losing focus does.
 *
 * Navigation commands ([`Command`], [`Motion`]) are compiled against the
 * *current* layout tree using the boundary searches in
 * [`crate::layout::boundaries`], then submitted as transformations:
 *
 * - A directional char move against a non-empty selection collapses to
 *   the range boundary in the direction of travel rather than stepping
 *   past the head, so collapsing never double-jumps.
 * - Vertical moves keep `left_lock` and resolve the target column from
 *   it, so repeated line moves track a consistent visual column through
 *   lines of uneven width.
 * - Targets are clamped to the document's caret range before they reach
 *   the mapping layer: an edge-of-document key press is a no-op, not an
 *   error.
 */

pub mod commands;
pub mod patch;
pub mod transformation;

pub use commands::{Command, Motion};
pub use patch::Patch;
pub use transformation::Transformation;

/// The active selection: `anchor`/`head` are selectable offsets, equal for
/// a caret. `left_lock` remembers the content-relative x position; it is
/// rewritten on horizontal moves and only read by vertical ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub anchor: usize,
    pub head: usize,
    pub left_lock: f64,
}

impl Cursor {
    /// Collapsed cursor at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
            left_lock: 0.0,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }

    /// Near boundary of the selection (min of anchor/head).
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Far boundary of the selection (max of anchor/head).
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_has_equal_bounds() {
        let cursor = Cursor::caret(5);
        assert!(cursor.is_caret());
        assert_eq!(cursor.start(), 5);
        assert_eq!(cursor.end(), 5);
    }

    #[test]
    fn test_bounds_ignore_direction() {
        let forward = Cursor {
            anchor: 2,
            head: 7,
            left_lock: 0.0,
        };
        let backward = Cursor {
            anchor: 7,
            head: 2,
            left_lock: 0.0,
        };
        assert_eq!(forward.start(), backward.start());
        assert_eq!(forward.end(), backward.end());
    }
}
