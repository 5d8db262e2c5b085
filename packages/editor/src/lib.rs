//! # Sprout Editor
//!
//! Source-preserving editors for the files a project scaffold produces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Program → source text │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: named slots + capability traits     │
//! │  - imports and statements                   │
//! │  - build-config plugins and aliases         │
//! │  - JSX provider wrapping                    │
//! └─────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────┐
//! │ sfc: block descriptor + tag rewriting       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Text stays the caller's**: only the mutated region is reprinted
//! 2. **Text and tree agree**: every commit reparses what it printed
//! 3. **Capabilities by type**: an editor exposes exactly the traits it implements
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprout_editor::{AliasInjection, BuildConfigEditor, ImportInjection, PluginInjection};
//!
//! let mut editor = BuildConfigEditor::new([("buildConfig", source)])?;
//! editor
//!     .add_import("buildConfig", "import legacy from '@vitejs/plugin-legacy'")?
//!     .add_plugin("buildConfig", "legacy()")?
//!     .add_alias("buildConfig", [("@", "path.resolve(__dirname, 'src')")])?;
//!
//! let text = editor.get_text("buildConfig");
//! ```
//!
//! Single-file components go through [`SfcEditor`] instead:
//!
//! ```rust,ignore
//! use sprout_editor::{ScriptBlockLang, SfcEditor};
//!
//! let mut sfc = SfcEditor::new(source);
//! sfc.set_script_lang("ts")?;
//! ```

#[macro_use]
mod macros;

pub mod capabilities;
mod document;
mod editors;
mod errors;
mod options;
pub mod sfc;

pub use capabilities::{
    AliasInjection, ImportInjection, JsxProvider, PluginInjection, StatementInjection,
};
pub use document::{Diagnostic, Document, DocumentModel, Edit, Slot};
pub use editors::{BootstrapEditor, BuildConfigEditor, ScriptEditor};
pub use errors::EditorError;
pub use options::EditorOptions;
pub use sfc::{AttrValue, Attributes, Block, BlockModel, ScriptBlockLang, SfcDescriptor, SfcEditor, StyleBlockLang};
