use crate::{DocumentModel, Edit, EditorError};
use sprout_common::{ensure_array_property, with_config_object};
use sprout_parser::ast::{Expression, Statement};
use sprout_parser::{build, parse};
use tracing::{debug, warn};

/// Append to the plugin array of a build config
pub trait PluginInjection: DocumentModel {
    /// Append `plugin` to `plugins` in the object passed to the config factory
    ///
    /// `plugin` must be exactly one expression. When the factory call is not
    /// in the slot, or `plugins` is bound to something other than an array
    /// literal, a diagnostic is recorded and the text is left as is.
    fn add_plugin(&mut self, slot: &str, plugin: &str) -> Result<&mut Self, EditorError> {
        self.document().slot(slot)?;
        let element = plugin_expression(plugin)?;

        let mut skipped = None;
        let document = self.document_mut();
        document.edit(slot, |program, options| {
            let found = with_config_object(program, &options.config_factory, |config| {
                let plugins = ensure_array_property(config, &options.plugins_key)?;
                plugins.elements.push(element);
                Ok(plugins.elements.len())
            });

            match found {
                Ok(Some(count)) => {
                    debug!(slot, plugin, count, "Added plugin");
                    Ok(Edit::Applied)
                }
                Ok(None) => {
                    skipped = Some(format!(
                        "could not find a {}() call with an object argument",
                        options.config_factory
                    ));
                    Ok(Edit::Unchanged)
                }
                Err(err) => {
                    skipped = Some(format!("'{}': {}", options.plugins_key, err));
                    Ok(Edit::Unchanged)
                }
            }
        })?;

        if let Some(reason) = skipped {
            warn!(slot, reason = %reason, "Plugin not added");
            document.push_diagnostic(slot, format!("{}; plugin not added", reason));
        }
        Ok(self)
    }
}

fn plugin_expression(source: &str) -> Result<Expression, EditorError> {
    let mut program = parse(source)?;
    if program.body.len() != 1 {
        return Err(EditorError::shape_mismatch(
            "a single expression statement",
            format!("{} statements", program.body.len()),
        ));
    }

    match program.body.remove(0) {
        Statement::Expression(statement) => {
            Ok(build::graft_expression(source, statement.expression))
        }
        other => Err(EditorError::shape_mismatch(
            "a single expression statement",
            statement_kind(&other),
        )),
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Import(_) => "import declaration",
        Statement::ExportDefault(_) | Statement::ExportNamed(_) | Statement::ExportList(_) => {
            "export declaration"
        }
        Statement::Variable(_) => "variable declaration",
        Statement::Function(_) => "function declaration",
        Statement::Class(_) => "class declaration",
        Statement::Expression(_) => "expression statement",
        Statement::Block(_) => "block",
        Statement::Return(_) => "return statement",
        Statement::If(_) => "if statement",
        Statement::Empty(_) => "empty statement",
        Statement::Opaque(_) => "statement",
        Statement::Graft(graft) => statement_kind(&graft.node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    impl PluginInjection for Document {}

    const CONFIG: &str = "import { defineConfig } from 'vite'\nimport vue from '@vitejs/plugin-vue'\n\nexport default defineConfig({\n  plugins: [vue()],\n})\n";

    #[test]
    fn test_add_plugin_appends_last() {
        let mut document = Document::new([("buildConfig", CONFIG)]).unwrap();
        document
            .add_plugin("buildConfig", "legacy()")
            .unwrap()
            .add_plugin("buildConfig", "jsx({ optimize: true })")
            .unwrap();
        assert!(document
            .get_text("buildConfig")
            .contains("plugins: [vue(), legacy(), jsx({ optimize: true })],"));
        assert!(document.diagnostics().is_empty());
    }

    #[test]
    fn test_add_plugin_creates_missing_array() {
        let source = "export default defineConfig({\n  base: './',\n})\n";
        let mut document = Document::new([("buildConfig", source)]).unwrap();
        document.add_plugin("buildConfig", "vue()").unwrap();
        assert_eq!(
            document.get_text("buildConfig"),
            "export default defineConfig({\n  base: './',\n  plugins: [vue()],\n})\n"
        );
    }

    #[test]
    fn test_add_plugin_rejects_declarations() {
        let mut document = Document::new([("buildConfig", CONFIG)]).unwrap();
        let err = document
            .add_plugin("buildConfig", "const legacy = plugin()")
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::shape_mismatch("a single expression statement", "variable declaration")
        );

        let err = document.add_plugin("buildConfig", "a(); b()").unwrap_err();
        assert_eq!(
            err,
            EditorError::shape_mismatch("a single expression statement", "2 statements")
        );
        assert_eq!(document.get_text("buildConfig"), CONFIG);
    }

    #[test]
    fn test_add_plugin_without_factory_warns() {
        let source = "export default {\n  plugins: [],\n}\n";
        let mut document = Document::new([("buildConfig", source)]).unwrap();
        document.add_plugin("buildConfig", "vue()").unwrap();
        assert_eq!(document.get_text("buildConfig"), source);
        assert_eq!(document.diagnostics().len(), 1);
        assert_eq!(document.diagnostics()[0].slot, "buildConfig");
    }

    #[test]
    fn test_add_plugin_to_non_array_warns() {
        let source = "export default defineConfig({ plugins: getPlugins() })\n";
        let mut document = Document::new([("buildConfig", source)]).unwrap();
        document.add_plugin("buildConfig", "vue()").unwrap();
        assert_eq!(document.get_text("buildConfig"), source);
        assert_eq!(document.diagnostics().len(), 1);
        assert!(document.diagnostics()[0].message.contains("'plugins'"));
    }

    #[test]
    fn test_missing_slot_is_reported_before_parsing() {
        let mut document = Document::new([("buildConfig", CONFIG)]).unwrap();
        assert_eq!(
            document.add_plugin("missing", "bad(").unwrap_err(),
            EditorError::FieldNotFound("missing".to_string())
        );
    }
}
