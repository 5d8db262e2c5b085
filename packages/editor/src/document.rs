//! # Document Model
//!
//! A `Document` holds a named set of slots, each one a logical source file
//! kept as the pair `(text, program)`. Mutations work on a copy of the
//! program and commit it back through the printer, so the pair is always
//! consistent: `program == parse(text)`.
//!
//! ## Lifecycle
//!
//! ```text
//! seed text → parse → mutate copy → print → reparse → read text
//! ```

use crate::{EditorError, EditorOptions};
use sprout_parser::ast::Program;
use sprout_parser::{parse, print};
use std::collections::BTreeMap;
use tracing::debug;

/// One logical source file
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    text: String,
    program: Program,
}

impl Slot {
    pub fn parse(text: impl Into<String>) -> Result<Self, EditorError> {
        let text = text.into();
        let program = parse(&text)?;
        Ok(Self { text, program })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Print `program` against the current text and adopt the result
    ///
    /// The printed text is parsed again before anything is replaced; on
    /// failure the slot keeps its previous state.
    pub fn commit(&mut self, program: &Program) -> Result<(), EditorError> {
        let text = print(&self.text, program);
        let program = parse(&text)?;
        self.text = text;
        self.program = program;
        Ok(())
    }
}

/// Non-fatal problem found while applying a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub slot: String,
    pub message: String,
}

/// Result of a mutation callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The tree was changed and must be committed
    Applied,
    /// Nothing to do; the slot is left byte-identical
    Unchanged,
}

/// Named slots plus the diagnostics raised while editing them
#[derive(Debug, Clone, Default)]
pub struct Document {
    slots: BTreeMap<String, Slot>,
    diagnostics: Vec<Diagnostic>,
    options: EditorOptions,
}

impl Document {
    /// Seed a document; every slot is parsed eagerly
    pub fn new<I, K, V>(slots: I) -> Result<Self, EditorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_options(slots, EditorOptions::default())
    }

    pub fn with_options<I, K, V>(slots: I, options: EditorOptions) -> Result<Self, EditorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let slots = slots
            .into_iter()
            .map(|(name, text)| Ok((name.into(), Slot::parse(text)?)))
            .collect::<Result<BTreeMap<_, _>, EditorError>>()?;

        Ok(Self {
            slots,
            diagnostics: Vec::new(),
            options,
        })
    }

    /// Last-known text of `name`, empty when the slot was never seeded
    pub fn get_text(&self, name: &str) -> &str {
        self.slots.get(name).map(Slot::text).unwrap_or("")
    }

    pub fn slot(&self, name: &str) -> Result<&Slot, EditorError> {
        self.slots
            .get(name)
            .ok_or_else(|| EditorError::FieldNotFound(name.to_string()))
    }

    pub fn slot_mut(&mut self, name: &str) -> Result<&mut Slot, EditorError> {
        self.slots
            .get_mut(name)
            .ok_or_else(|| EditorError::FieldNotFound(name.to_string()))
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn push_diagnostic(&mut self, slot: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            slot: slot.to_string(),
            message: message.into(),
        });
    }

    /// Hand the final text of every slot back to the caller
    pub fn into_texts(self) -> BTreeMap<String, String> {
        self.slots
            .into_iter()
            .map(|(name, slot)| (name, slot.text))
            .collect()
    }

    /// Run `f` over a copy of the slot's tree and commit it when applied
    ///
    /// Errors from `f` leave the slot untouched.
    pub fn edit<F>(&mut self, name: &str, f: F) -> Result<Edit, EditorError>
    where
        F: FnOnce(&mut Program, &EditorOptions) -> Result<Edit, EditorError>,
    {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| EditorError::FieldNotFound(name.to_string()))?;

        let mut program = slot.program.clone();
        let edit = f(&mut program, &self.options)?;
        if edit == Edit::Applied {
            slot.commit(&program)?;
            debug!(slot = name, bytes = slot.text.len(), "Committed slot");
        }
        Ok(edit)
    }
}

/// Base trait every capability builds on
pub trait DocumentModel {
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    fn get_text(&self, name: &str) -> &str {
        self.document().get_text(name)
    }
}

impl DocumentModel for Document {
    fn document(&self) -> &Document {
        self
    }

    fn document_mut(&mut self) -> &mut Document {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_parser::ast::Statement;
    use sprout_parser::build;

    #[test]
    fn test_seeded_slots_round_trip() {
        let source = "// entry\nimport { createApp } from 'vue'\n\ncreateApp(App).mount('#app')\n";
        let document = Document::new([("bootstrap", source)]).unwrap();
        assert_eq!(document.get_text("bootstrap"), source);
        assert_eq!(document.slot("bootstrap").unwrap().program().body.len(), 2);
    }

    #[test]
    fn test_missing_slot_reads_empty() {
        let document = Document::new([("buildConfig", "export default {}")]).unwrap();
        assert_eq!(document.get_text("bootstrap"), "");
        assert_eq!(
            document.slot("bootstrap").unwrap_err(),
            EditorError::FieldNotFound("bootstrap".to_string())
        );
    }

    #[test]
    fn test_parse_errors_surface_at_construction() {
        let err = Document::new([("buildConfig", "export default {")]).unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }

    #[test]
    fn test_edit_commits_applied_changes() {
        let mut document = Document::new([("main", "a()\n")]).unwrap();
        let edit = document
            .edit("main", |program, _| {
                let mut fragment = parse("b()")?;
                program
                    .body
                    .push(build::graft_statement("b()", fragment.body.remove(0)));
                Ok(Edit::Applied)
            })
            .unwrap();
        assert_eq!(edit, Edit::Applied);
        assert_eq!(document.get_text("main"), "a()\nb()\n");

        // the committed tree is reparsed, so nothing is grafted any more
        let body = &document.slot("main").unwrap().program().body;
        assert_eq!(body.len(), 2);
        assert!(matches!(body[1], Statement::Expression(_)));
    }

    #[test]
    fn test_failed_edit_leaves_slot_untouched() {
        let mut document = Document::new([("main", "a()\n")]).unwrap();
        let err = document
            .edit("main", |program, _| {
                program.body.clear();
                Err(EditorError::shape_mismatch("anything", "nothing"))
            })
            .unwrap_err();
        assert!(matches!(err, EditorError::ShapeMismatch { .. }));
        assert_eq!(document.get_text("main"), "a()\n");
        assert_eq!(document.slot("main").unwrap().program().body.len(), 1);
    }

    #[test]
    fn test_into_texts_returns_every_slot() {
        let document = Document::new([("b", "b()"), ("a", "a()")]).unwrap();
        assert_eq!(document.slot_names().collect::<Vec<_>>(), vec!["a", "b"]);
        let texts = document.into_texts();
        assert_eq!(texts["a"], "a()");
        assert_eq!(texts["b"], "b()");
    }
}
