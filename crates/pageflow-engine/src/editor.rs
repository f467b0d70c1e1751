//! The editor: owner of the model/render/layout trees and the cursor.
//!
//! All derivation and mapping runs synchronously on the caller's thread;
//! external callers only trigger transformation application and never
//! mutate the trees directly. Re-derivation is whole-layer: any content
//! operation re-syncs the render mirror and rebuilds the layout tree
//! wholesale, a deliberate simplicity trade-off rather than an
//! optimization target.

use log::{debug, trace};

use crate::cursor::{Command, Cursor, Patch, Transformation, commands};
use crate::error::Result;
use crate::layout::{self, LayoutTree};
use crate::model::ModelNode;
use crate::registry::Registry;
use crate::render::RenderDoc;

/// One focused document with its derived trees and selection state.
///
/// ```rust
/// use pageflow_engine::{Command, Editor, ModelNode, Motion, PageSpec, Registry};
/// use pageflow_engine::registry::tags;
///
/// let registry = Registry::with_defaults(PageSpec::default());
/// let model = ModelNode::branch(
///     tags::DOCUMENT,
///     vec![ModelNode::branch(
///         tags::PARAGRAPH,
///         vec![ModelNode::leaf(tags::TEXT, "Hello world")],
///     )],
/// );
/// let mut editor = Editor::new(registry, model).unwrap();
/// editor.focus();
/// let patch = editor.execute(&Command::Move(Motion::WordForward)).unwrap();
/// assert_eq!(patch.selection, Some((6, 6)));
/// ```
pub struct Editor {
    registry: Registry,
    model: ModelNode,
    render: RenderDoc,
    layout: LayoutTree,
    cursor: Option<Cursor>,
    version: u64,
}

impl Editor {
    /// Derive the render and layout trees for `model` and wrap them in an
    /// unfocused editor. Fails fast when a node's type tag is not
    /// registered or the model shape is invalid.
    pub fn new(registry: Registry, model: ModelNode) -> Result<Self> {
        let render = RenderDoc::derive(&model, &registry)?;
        let layout = layout::build(&render, &registry)?;
        Ok(Self {
            registry,
            model,
            render,
            layout,
            cursor: None,
            version: 0,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn model(&self) -> &ModelNode {
        &self.model
    }

    pub fn render(&self) -> &RenderDoc {
        &self.render
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selectable_size(&self) -> usize {
        self.render.selectable_size()
    }

    /// Acquiring focus creates a caret at the document start; refocusing
    /// keeps the existing selection.
    pub fn focus(&mut self) {
        if self.cursor.is_none() {
            self.cursor = Some(Cursor::caret(0));
        }
    }

    /// Losing focus destroys the cursor (active → no-selection).
    pub fn blur(&mut self) {
        self.cursor = None;
    }

    /// Compile a command against the current layout and apply it. Without
    /// focus there is no selection to move or edit against, so commands
    /// are no-ops.
    pub fn execute(&mut self, command: &Command) -> Result<Patch> {
        let Some(cursor) = self.cursor else {
            trace!("command {command:?} ignored without focus");
            return Ok(Patch {
                version: self.version,
                edited: false,
                selection: None,
            });
        };
        let transformation = commands::compile(self, &cursor, command)?;
        self.apply(transformation)
    }

    /// Apply a transformation: run its operations against a working copy
    /// of the model, commit on success, re-derive render and layout, then
    /// update the cursor. A failing operation list leaves every tree in
    /// its last-known-good state.
    pub fn apply(&mut self, transformation: Transformation) -> Result<Patch> {
        let edited = !transformation.operations.is_empty();
        if edited {
            let mut model = self.model.clone();
            for operation in &transformation.operations {
                operation.apply_to(&mut model)?;
            }
            let mut render = self.render.clone();
            render.sync(&model, &self.registry)?;
            let layout = layout::build(&render, &self.registry)?;
            self.model = model;
            self.render = render;
            self.layout = layout;
        }
        self.version += 1;

        let selection = if let Some(cursor) = &mut self.cursor {
            let last = self.layout.last_caret();
            cursor.head = transformation.head.min(last);
            cursor.anchor = transformation.anchor.unwrap_or(cursor.head).min(last);
            if !transformation.keep_left_lock {
                cursor.left_lock = self.layout.x_of_offset(cursor.head)?;
            }
            Some((cursor.anchor, cursor.head))
        } else {
            None
        };
        debug!(
            "applied transformation: version {}, edited {edited}, selection {selection:?}",
            self.version
        );
        Ok(Patch {
            version: self.version,
            edited,
            selection,
        })
    }
}
