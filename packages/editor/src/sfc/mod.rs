//! # Single-File Component Editor
//!
//! Edits the block tags of a `.vue` document without touching block
//! content. The document is kept as text; the [`SfcDescriptor`] is derived
//! from it again after every change.
//!
//! Blocks are addressed by kind and position: index `n` of a kind is the
//! `n`-th top-level tag of that kind in document order. Adding or removing
//! a block shifts the indices after it.

mod blocks;
mod descriptor;

pub use blocks::{BlockModel, ScriptBlockLang, StyleBlockLang};
pub use descriptor::{render_opening_tag, AttrValue, Attributes, Block, SfcDescriptor};

use crate::{EditorError, EditorOptions};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct SfcEditor {
    source: String,
    descriptor: SfcDescriptor,
    options: EditorOptions,
}

impl SfcEditor {
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_options(source, EditorOptions::default())
    }

    pub fn with_options(source: impl Into<String>, options: EditorOptions) -> Self {
        let source = source.into();
        let descriptor = SfcDescriptor::parse(&source);
        Self {
            source,
            descriptor,
            options,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn descriptor(&self) -> &SfcDescriptor {
        &self.descriptor
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn into_source(self) -> String {
        self.source
    }

    /// Replace the whole text and derive the descriptor again
    pub fn update_source(&mut self, source: String) {
        self.descriptor = SfcDescriptor::parse(&source);
        self.source = source;
        trace!(
            styles = self.descriptor.styles.len(),
            custom = self.descriptor.custom_blocks.len(),
            "Reparsed component"
        );
    }

    /// The `index`-th block of `kind`
    ///
    /// `script` finds the plain and the `setup` script alike, whichever
    /// comes first.
    pub fn get_block(&self, kind: &str, index: usize) -> Option<&Block> {
        self.descriptor.blocks(kind).get(index).copied()
    }

    /// Number of blocks of `kind`
    pub fn count_blocks(&self, kind: &str) -> usize {
        self.descriptor.blocks(kind).len()
    }

    /// Rewrite the opening tag of the `index`-th block of `kind` from `attrs`
    ///
    /// The block content and every other tag are left byte-identical.
    pub fn update_block_attrs(
        &mut self,
        kind: &str,
        attrs: &Attributes,
        index: usize,
    ) -> Result<&mut Self, EditorError> {
        let block = self
            .get_block(kind, index)
            .ok_or_else(|| EditorError::BlockNotFound {
                kind: kind.to_string(),
                index,
            })?;

        let tag = render_opening_tag(kind, attrs, block.self_closing);
        let range = block.tag.clone();
        debug!(kind, index, tag = %tag, "Updated block tag");

        let mut source = String::with_capacity(self.source.len() + tag.len());
        source.push_str(&self.source[..range.start]);
        source.push_str(&tag);
        source.push_str(&self.source[range.end..]);
        self.update_source(source);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = "<script setup>\nimport { ref } from 'vue'\n</script>\n\n<template>\n  <p>{{ msg }}</p>\n</template>\n\n<style scoped>\np { color: red }\n</style>\n<style lang=\"scss\">\n$c: blue;\n</style>\n";

    #[test]
    fn test_get_block() {
        let editor = SfcEditor::new(COMPONENT);
        assert!(editor.get_block("script", 0).unwrap().is_setup());
        assert_eq!(editor.get_block("style", 1).unwrap().lang(), Some("scss"));
        assert!(editor.get_block("style", 2).is_none());
        assert!(editor.get_block("docs", 0).is_none());
        assert_eq!(editor.count_blocks("style"), 2);
    }

    #[test]
    fn test_update_second_style_only() {
        let mut editor = SfcEditor::new(COMPONENT);
        let attrs: Attributes = [("lang", "less")].into_iter().collect();
        editor.update_block_attrs("style", &attrs, 1).unwrap();
        assert_eq!(
            editor.source(),
            COMPONENT.replace("<style lang=\"scss\">", "<style lang=\"less\">")
        );
        assert_eq!(editor.get_block("style", 1).unwrap().lang(), Some("less"));
        assert_eq!(editor.get_block("style", 1).unwrap().content, "\n$c: blue;\n");
    }

    #[test]
    fn test_setup_is_written_once() {
        let mut editor = SfcEditor::new(COMPONENT);
        let mut attrs = editor.get_block("script", 0).unwrap().attrs.clone();
        attrs.set("lang", "ts");
        attrs.set("setup", true);
        editor.update_block_attrs("script", &attrs, 0).unwrap();
        assert!(editor.source().starts_with("<script setup lang=\"ts\">\nimport"));
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let mut editor = SfcEditor::new("<template><p /></template>\n");
        let err = editor
            .update_block_attrs("script", &Attributes::new(), 0)
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::BlockNotFound {
                kind: "script".to_string(),
                index: 0
            }
        );
        assert_eq!(editor.source(), "<template><p /></template>\n");
    }
}
