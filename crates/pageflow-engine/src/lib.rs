pub mod cursor;
pub mod editor;
pub mod error;
pub mod layout;
pub mod model;
pub mod registry;
pub mod render;
pub mod view;

// Re-export key types for easier usage
pub use cursor::{Command, Cursor, Motion, Patch, Transformation};
pub use editor::Editor;
pub use error::{EngineError, Result};
pub use layout::{Bias, BoxAddress, LayoutNodeRef, LayoutTree, LineAddress};
pub use model::{ModelContent, ModelNode, NodeId, Operation};
pub use registry::{
    BoxMetrics, ElementDefinition, ElementRole, PageSpec, Registry, RenderAttrs,
};
pub use render::RenderDoc;
pub use view::{PaintOp, Rect, RenderSink};
