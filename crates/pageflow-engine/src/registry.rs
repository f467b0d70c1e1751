//! Element registry: per-type behavior lookup.
//!
//! Each node kind registers one [`ElementDefinition`] under its type tag at
//! startup. The tree walkers (render derivation, line breaking, painting)
//! look capabilities up here instead of carrying per-kind logic, so new
//! content types plug in without touching the walkers. A lookup miss is an
//! [`EngineError::UnregisteredType`] and fails the derivation fast.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{ModelNode, TypeTag};
use crate::view::{PaintOp, Rect};

/// Well-known type tags for the built-in element definitions.
pub mod tags {
    pub const DOCUMENT: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const SPAN: &str = "span";
    pub const TEXT: &str = "text";
}

/// Page geometry in layout units. With the default text measurer one unit
/// is one char cell, so `width: 80, height: 24` is a terminal-sized page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
    pub padding_right: f64,
}

impl PageSpec {
    /// Width available to line content.
    pub fn content_width(&self) -> f64 {
        self.width - self.padding_left - self.padding_right
    }

    /// Height available to stacked lines.
    pub fn content_height(&self) -> f64 {
        self.height - self.padding_top - self.padding_bottom
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 24.0,
            padding_top: 1.0,
            padding_bottom: 1.0,
            padding_left: 2.0,
            padding_right: 2.0,
        }
    }
}

/// Which level of the tree a node kind occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    Document,
    Block,
    Branch,
    Text,
}

/// Scalar attributes re-derived from a model node on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderAttrs {
    /// Page geometry; provided by the document element only.
    pub page: Option<PageSpec>,
}

/// One measured box produced by breaking atomic content, atomic for line
/// breaking purposes.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxMetrics {
    pub text: String,
    pub width: f64,
    pub height: f64,
}

/// Behavior of one node kind: derivation, measurement/line-breaking, and
/// painting.
pub trait ElementDefinition: Send + Sync {
    fn role(&self) -> ElementRole;

    /// Derivation: recompute render attributes from the model node.
    fn attrs(&self, _model: &ModelNode) -> RenderAttrs {
        RenderAttrs::default()
    }

    /// Measurement: break atomic content into measured word boxes. Each box
    /// keeps its trailing whitespace; boxes are never split further.
    fn measure(&self, _content: &str) -> Vec<BoxMetrics> {
        Vec::new()
    }

    /// Paint instruction for one laid-out fragment of this element.
    fn paint(&self, region: Rect, content: Option<&str>) -> PaintOp {
        PaintOp::Text {
            rect: region,
            text: content.unwrap_or_default().to_string(),
        }
    }
}

/// Lookup table from type tag to element definition, populated before the
/// first derivation.
#[derive(Clone, Default)]
pub struct Registry {
    definitions: HashMap<TypeTag, Arc<dyn ElementDefinition>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in document/paragraph/span/text definitions,
    /// the document sized by `page`.
    pub fn with_defaults(page: PageSpec) -> Self {
        let mut registry = Self::new();
        registry.register(tags::DOCUMENT, Arc::new(DocumentElement { page }));
        registry.register(tags::PARAGRAPH, Arc::new(ParagraphElement));
        registry.register(tags::SPAN, Arc::new(SpanElement));
        registry.register(tags::TEXT, Arc::new(TextElement::default()));
        registry
    }

    pub fn register(&mut self, tag: TypeTag, definition: Arc<dyn ElementDefinition>) {
        self.definitions.insert(tag, definition);
    }

    pub fn get(&self, tag: &str) -> Result<&Arc<dyn ElementDefinition>> {
        self.definitions
            .get(tag)
            .ok_or_else(|| EngineError::UnregisteredType {
                tag: tag.to_string(),
            })
    }
}

/// Root element: carries the page geometry used by pagination.
pub struct DocumentElement {
    pub page: PageSpec,
}

impl ElementDefinition for DocumentElement {
    fn role(&self) -> ElementRole {
        ElementRole::Document
    }

    fn attrs(&self, _model: &ModelNode) -> RenderAttrs {
        RenderAttrs {
            page: Some(self.page),
        }
    }
}

pub struct ParagraphElement;

impl ElementDefinition for ParagraphElement {
    fn role(&self) -> ElementRole {
        ElementRole::Block
    }
}

/// Inline container of leaves (a model Branch).
pub struct SpanElement;

impl ElementDefinition for SpanElement {
    fn role(&self) -> ElementRole {
        ElementRole::Branch
    }
}

/// Text runs measured at a fixed advance per char. The word splitter keeps
/// trailing whitespace attached to the preceding word, so "Hello world"
/// yields boxes "Hello " and "world".
pub struct TextElement {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            char_width: 1.0,
            line_height: 1.0,
        }
    }
}

impl ElementDefinition for TextElement {
    fn role(&self) -> ElementRole {
        ElementRole::Text
    }

    fn measure(&self, content: &str) -> Vec<BoxMetrics> {
        let mut boxes = Vec::new();
        let mut word = String::new();
        let mut chars = 0usize;
        let mut trailing_space = false;
        for ch in content.chars() {
            if !ch.is_whitespace() && trailing_space {
                boxes.push(BoxMetrics {
                    text: std::mem::take(&mut word),
                    width: chars as f64 * self.char_width,
                    height: self.line_height,
                });
                chars = 0;
                trailing_space = false;
            }
            word.push(ch);
            chars += 1;
            if ch.is_whitespace() {
                trailing_space = true;
            }
        }
        if !word.is_empty() {
            boxes.push(BoxMetrics {
                text: word,
                width: chars as f64 * self.char_width,
                height: self.line_height,
            });
        }
        boxes
    }
}
