/// Declare an editor type over [`Document`](crate::Document) with a chosen
/// set of capabilities
///
/// ```rust,ignore
/// use sprout_editor::{editor, ImportInjection, PluginInjection};
///
/// editor! {
///     /// Imports and plugins only
///     pub struct PluginEditor: ImportInjection, PluginInjection;
/// }
///
/// let mut editor = PluginEditor::new([("buildConfig", source)])?;
/// editor.add_plugin("buildConfig", "legacy()")?;
/// ```
#[macro_export]
macro_rules! editor {
    ($(#[$meta:meta])* $vis:vis struct $name:ident : $($capability:path),* $(,)? ;) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            document: $crate::Document,
        }

        impl $name {
            /// Seed the editor; every slot is parsed eagerly
            pub fn new<I, K, V>(slots: I) -> Result<Self, $crate::EditorError>
            where
                I: IntoIterator<Item = (K, V)>,
                K: Into<String>,
                V: Into<String>,
            {
                Ok(Self {
                    document: $crate::Document::new(slots)?,
                })
            }

            pub fn with_options<I, K, V>(
                slots: I,
                options: $crate::EditorOptions,
            ) -> Result<Self, $crate::EditorError>
            where
                I: IntoIterator<Item = (K, V)>,
                K: Into<String>,
                V: Into<String>,
            {
                Ok(Self {
                    document: $crate::Document::with_options(slots, options)?,
                })
            }

            /// Current text of `slot`, empty when it was never seeded
            pub fn get_text(&self, slot: &str) -> &str {
                self.document.get_text(slot)
            }

            pub fn diagnostics(&self) -> &[$crate::Diagnostic] {
                self.document.diagnostics()
            }

            pub fn into_document(self) -> $crate::Document {
                self.document
            }
        }

        impl $crate::DocumentModel for $name {
            fn document(&self) -> &$crate::Document {
                &self.document
            }

            fn document_mut(&mut self) -> &mut $crate::Document {
                &mut self.document
            }
        }

        $(impl $capability for $name {})*
    };
}
