use super::{AttrValue, SfcEditor};
use crate::EditorError;
use tracing::warn;

const SCRIPT: &str = "script";
const STYLE: &str = "style";

/// Base trait for the block capabilities
pub trait BlockModel {
    fn sfc(&self) -> &SfcEditor;

    fn sfc_mut(&mut self) -> &mut SfcEditor;
}

impl BlockModel for SfcEditor {
    fn sfc(&self) -> &SfcEditor {
        self
    }

    fn sfc_mut(&mut self) -> &mut SfcEditor {
        self
    }
}

/// Set `lang` on every block of `kind`, dropping it for `default`
fn set_lang(editor: &mut SfcEditor, kind: &str, lang: &str, default: &str) -> Result<(), EditorError> {
    let count = editor.count_blocks(kind);
    if count == 0 {
        warn!(kind, lang, "No block to set the language on");
        return Ok(());
    }

    for index in 0..count {
        let Some(block) = editor.get_block(kind, index) else {
            continue;
        };
        let mut attrs = block.attrs.clone();
        if lang == default {
            attrs.remove("lang");
        } else {
            attrs.set("lang", lang);
        }
        if attrs != block.attrs {
            editor.update_block_attrs(kind, &attrs, index)?;
        }
    }
    Ok(())
}

/// Add `name` to every block of `kind` that does not have it yet
fn add_attribute(
    editor: &mut SfcEditor,
    kind: &str,
    name: &str,
    value: AttrValue,
) -> Result<(), EditorError> {
    let count = editor.count_blocks(kind);
    if count == 0 {
        warn!(kind, attribute = name, "No block to add the attribute to");
        return Ok(());
    }

    for index in 0..count {
        let Some(block) = editor.get_block(kind, index) else {
            continue;
        };
        if block.attrs.contains(name) {
            continue;
        }
        let mut attrs = block.attrs.clone();
        attrs.set(name, value.clone());
        editor.update_block_attrs(kind, &attrs, index)?;
    }
    Ok(())
}

/// Script block attributes
pub trait ScriptBlockLang: BlockModel {
    /// Set `lang` on the script blocks; the default language removes it
    fn set_script_lang(&mut self, lang: &str) -> Result<&mut Self, EditorError> {
        let editor = self.sfc_mut();
        let default = editor.options().default_script_lang.clone();
        set_lang(editor, SCRIPT, lang, &default)?;
        Ok(self)
    }

    /// Add an attribute unless the script block already has one by that name
    fn add_script_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<&mut Self, EditorError> {
        add_attribute(self.sfc_mut(), SCRIPT, name, value.into())?;
        Ok(self)
    }
}

/// Style block attributes
pub trait StyleBlockLang: BlockModel {
    /// Set `lang` on every style block; the default language removes it
    fn set_style_lang(&mut self, lang: &str) -> Result<&mut Self, EditorError> {
        let editor = self.sfc_mut();
        let default = editor.options().default_style_lang.clone();
        set_lang(editor, STYLE, lang, &default)?;
        Ok(self)
    }

    /// Add an attribute to every style block that does not have it yet
    fn add_style_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<&mut Self, EditorError> {
        add_attribute(self.sfc_mut(), STYLE, name, value.into())?;
        Ok(self)
    }
}

impl ScriptBlockLang for SfcEditor {}
impl StyleBlockLang for SfcEditor {}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = "<script>\nexport default {}\n</script>\n\n<template>\n  <div />\n</template>\n\n<style scoped>\n.a {}\n</style>\n\n<style lang=\"scss\" module>\n.b {}\n</style>\n";

    #[test]
    fn test_set_script_lang() {
        let mut editor = SfcEditor::new(COMPONENT);
        editor.set_script_lang("ts").unwrap();
        assert!(editor.source().starts_with("<script lang=\"ts\">\nexport default {}\n</script>"));

        editor.set_script_lang("js").unwrap();
        assert_eq!(editor.source(), COMPONENT);
    }

    #[test]
    fn test_set_style_lang_covers_every_style() {
        let mut editor = SfcEditor::new(COMPONENT);
        editor.set_style_lang("less").unwrap();
        assert!(editor.source().contains("<style scoped lang=\"less\">\n.a {}\n</style>"));
        assert!(editor.source().contains("<style lang=\"less\" module>\n.b {}\n</style>"));

        editor.set_style_lang("css").unwrap();
        assert!(editor.source().contains("<style scoped>\n.a {}"));
        assert!(editor.source().contains("<style module>\n.b {}"));
    }

    #[test]
    fn test_add_attribute_keeps_existing_value() {
        let mut editor = SfcEditor::new(COMPONENT);
        editor
            .add_style_attribute("lang", "stylus")
            .unwrap()
            .add_style_attribute("scoped", true)
            .unwrap();
        assert!(editor.source().contains("<style scoped lang=\"stylus\">"));
        assert!(editor.source().contains("<style lang=\"scss\" module scoped>"));

        editor.add_script_attribute("setup", true).unwrap();
        assert!(editor.source().starts_with("<script setup>\n"));
        assert!(editor.get_block("script", 0).unwrap().is_setup());
    }

    #[test]
    fn test_missing_blocks_are_skipped() {
        let source = "<template><p /></template>\n";
        let mut editor = SfcEditor::new(source);
        editor
            .set_script_lang("ts")
            .unwrap()
            .set_style_lang("scss")
            .unwrap()
            .add_script_attribute("setup", true)
            .unwrap();
        assert_eq!(editor.source(), source);
    }
}
