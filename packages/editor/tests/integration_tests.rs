//! Integration tests for editor crate

use sprout_editor::{
    editor, AliasInjection, Attributes, BootstrapEditor, BuildConfigEditor, DocumentModel,
    EditorError, EditorOptions, ImportInjection, JsxProvider, PluginInjection, ScriptEditor,
    SfcEditor, StatementInjection, StyleBlockLang,
};
use sprout_parser::parse;

const VITE_CONFIG: &str = r#"import { fileURLToPath, URL } from 'node:url'

import { defineConfig } from 'vite'
import vue from '@vitejs/plugin-vue' // SFC support

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [vue()],
  build: {
    target: "es2015", /* legacy browsers */
  },
})
"#;

const REACT_ENTRY: &str = r#"import React from 'react'
import ReactDOM from 'react-dom/client'
import App from './App.tsx'
import './index.css'

ReactDOM.createRoot(document.getElementById('root')!).render(<App />)
"#;

const NO_PROPS: [(&str, &str); 0] = [];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_unmutated_slots_are_lossless() {
    let editor =
        ScriptEditor::new([("buildConfig", VITE_CONFIG), ("bootstrap", REACT_ENTRY)]).unwrap();

    assert_eq!(editor.get_text("buildConfig"), VITE_CONFIG);
    assert_eq!(editor.get_text("bootstrap"), REACT_ENTRY);
    assert_eq!(editor.get_text("other"), "");

    let reparsed = parse(editor.get_text("buildConfig")).unwrap();
    assert_eq!(
        &reparsed,
        editor.document().slot("buildConfig").unwrap().program()
    );
}

#[test]
fn test_newest_import_comes_first() {
    init_tracing();
    let mut editor = BuildConfigEditor::new([("buildConfig", VITE_CONFIG)]).unwrap();
    editor
        .add_import("buildConfig", "import legacy from '@vitejs/plugin-legacy'")
        .unwrap()
        .add_import("buildConfig", "import vueJsx from '@vitejs/plugin-vue-jsx'")
        .unwrap();

    let program = parse(editor.get_text("buildConfig")).unwrap();
    let sources: Vec<_> = program
        .body
        .iter()
        .take(2)
        .map(|statement| match statement {
            sprout_parser::ast::Statement::Import(import) => import.source.string_value(),
            _ => None,
        })
        .collect();
    assert_eq!(
        sources,
        vec![
            Some("@vitejs/plugin-vue-jsx".to_string()),
            Some("@vitejs/plugin-legacy".to_string())
        ]
    );
    assert!(editor
        .get_text("buildConfig")
        .starts_with("import vueJsx from '@vitejs/plugin-vue-jsx'\nimport legacy from '@vitejs/plugin-legacy'\nimport { fileURLToPath, URL } from 'node:url'\n"));
}

#[test]
fn test_code_lands_after_imports() {
    let mut editor = BootstrapEditor::new([("bootstrap", REACT_ENTRY)]).unwrap();
    editor
        .add_code("bootstrap", "import { store } from './store'")
        .unwrap()
        .add_code("bootstrap", "store.init()")
        .unwrap();

    assert!(editor.get_text("bootstrap").contains(
        "import './index.css'\nimport { store } from './store'\nstore.init()\n\nReactDOM"
    ));
}

#[test]
fn test_plugins_append_in_call_order() {
    init_tracing();
    let mut editor = BuildConfigEditor::new([("buildConfig", VITE_CONFIG)]).unwrap();
    editor
        .add_plugin("buildConfig", "vueJsx()")
        .unwrap()
        .add_plugin("buildConfig", "legacy({ targets: ['defaults'] })")
        .unwrap();

    let text = editor.get_text("buildConfig");
    assert!(text.contains("plugins: [vue(), vueJsx(), legacy({ targets: ['defaults'] })],"));
    // everything else is untouched
    assert!(text.contains("import vue from '@vitejs/plugin-vue' // SFC support\n"));
    assert!(text.contains("    target: \"es2015\", /* legacy browsers */\n"));
}

#[test]
fn test_alias_first_binding_wins() {
    let source = "export default defineConfig({\n  resolve: {\n    alias: {\n      '@': 'OLD',\n    },\n  },\n})\n";
    let mut editor = BuildConfigEditor::new([("buildConfig", source)]).unwrap();
    editor
        .add_alias("buildConfig", [("@", "'NEW'")])
        .unwrap();

    let text = editor.get_text("buildConfig");
    assert!(text.contains("'OLD'"));
    assert!(!text.contains("'NEW'"));
}

#[test]
fn test_alias_is_added_beside_existing_config() {
    let mut editor = BuildConfigEditor::new([("buildConfig", VITE_CONFIG)]).unwrap();
    editor
        .add_alias(
            "buildConfig",
            [("@", "fileURLToPath(new URL('./src', 'file:///'))")],
        )
        .unwrap();

    assert!(editor.get_text("buildConfig").contains(
        "  build: {\n    target: \"es2015\", /* legacy browsers */\n  },\n  resolve: {\n    alias: {\n      '@': fileURLToPath(new URL('./src', 'file:///'))\n    }\n  },\n})\n"
    ));
}

#[test]
fn test_jsx_providers_nest_outward() {
    let mut editor = BootstrapEditor::new([("bootstrap", REACT_ENTRY)]).unwrap();
    editor
        .add_jsx_provider("A", NO_PROPS)
        .unwrap()
        .add_jsx_provider("B", NO_PROPS)
        .unwrap();

    assert!(editor
        .get_text("bootstrap")
        .contains(".render(<B><A><App /></A></B>)\n"));
}

#[test]
fn test_jsx_provider_props_are_identifier_references() {
    let mut editor = ScriptEditor::new([("bootstrap", REACT_ENTRY)]).unwrap();
    editor
        .add_code("bootstrap", "import { Provider } from 'react-redux'")
        .unwrap()
        .add_jsx_provider("Provider", [("store", "store"), ("context", "AppContext")])
        .unwrap();

    assert!(editor
        .get_text("bootstrap")
        .contains("<Provider store={store} context={AppContext}><App /></Provider>"));
}

#[test]
fn test_missing_anchor_behaviour_differs_by_capability() {
    init_tracing();
    let config = "export default {\n  plugins: [],\n}\n";
    let entry = "createApp(App).mount('#app')\n";
    let mut editor = ScriptEditor::new([("buildConfig", config), ("bootstrap", entry)]).unwrap();

    editor
        .add_plugin("buildConfig", "vue()")
        .unwrap()
        .add_alias("buildConfig", [("@", "'./src'")])
        .unwrap()
        .add_jsx_provider("Provider", NO_PROPS)
        .unwrap();

    assert_eq!(editor.get_text("buildConfig"), config);
    assert_eq!(editor.get_text("bootstrap"), entry);

    // plugin and alias warn, the JSX wrap stays silent
    let diagnostics = editor.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.slot == "buildConfig"));
}

#[test]
fn test_missing_slot_errors_are_uniform() {
    let mut editor = ScriptEditor::new([("buildConfig", VITE_CONFIG)]).unwrap();
    let missing = EditorError::FieldNotFound("bootstrap".to_string());

    assert_eq!(
        editor.add_import("bootstrap", "import a from 'a'").unwrap_err(),
        missing
    );
    assert_eq!(editor.add_code("bootstrap", "a()").unwrap_err(), missing);
    assert_eq!(editor.add_plugin("bootstrap", "a()").unwrap_err(), missing);
    // the slot is resolved before the fragment is parsed
    assert_eq!(editor.add_plugin("bootstrap", "bad(").unwrap_err(), missing);
    assert_eq!(
        editor.add_alias("bootstrap", [("@", "bad(")]).unwrap_err(),
        missing
    );
    assert_eq!(
        editor.add_alias("bootstrap", [("@", "'./src'")]).unwrap_err(),
        missing
    );
    assert_eq!(
        editor.add_jsx_provider("Provider", NO_PROPS).unwrap_err(),
        missing
    );
}

#[test]
fn test_options_rename_anchors() {
    let options = EditorOptions::from_json(
        r#"{ "configFactory": "defineNuxtConfig", "pluginsKey": "modules", "bootstrapSlot": "main" }"#,
    )
    .unwrap();
    let config = "export default defineNuxtConfig({\n  modules: ['@pinia/nuxt'],\n})\n";
    let mut editor = BuildConfigEditor::with_options([("nuxtConfig", config)], options).unwrap();
    editor
        .add_plugin("nuxtConfig", "'@nuxt/image'")
        .unwrap();

    assert_eq!(
        editor.get_text("nuxtConfig"),
        "export default defineNuxtConfig({\n  modules: ['@pinia/nuxt', '@nuxt/image'],\n})\n"
    );
}

editor! {
    /// Only what a plugin installer needs
    struct PluginInstaller: ImportInjection, PluginInjection;
}

#[test]
fn test_custom_editor_composition() {
    let mut editor = PluginInstaller::new([("buildConfig", VITE_CONFIG)]).unwrap();
    editor
        .add_import("buildConfig", "import legacy from '@vitejs/plugin-legacy'")
        .unwrap()
        .add_plugin("buildConfig", "legacy()")
        .unwrap();

    let texts = editor.into_document().into_texts();
    assert!(texts["buildConfig"].contains("plugins: [vue(), legacy()],"));
}

#[test]
fn test_sfc_positional_style_update() {
    let source = "<template>\n  <h1>Hi</h1>\n</template>\n\n<style>\nh1 { margin: 0 }\n</style>\n\n<style scoped>\nh1 { color: red }\n</style>\n";
    let mut editor = SfcEditor::new(source);

    let mut attrs: Attributes = editor.get_block("style", 1).unwrap().attrs.clone();
    attrs.set("lang", "scss");
    editor.update_block_attrs("style", &attrs, 1).unwrap();

    assert_eq!(
        editor.source(),
        source.replace("<style scoped>", "<style scoped lang=\"scss\">")
    );
    assert_eq!(editor.get_block("style", 0).unwrap().lang(), None);
    assert_eq!(
        editor.get_block("style", 1).unwrap().content,
        "\nh1 { color: red }\n"
    );

    editor.set_style_lang("css").unwrap();
    assert_eq!(editor.source(), source);
}

#[test]
fn test_block_comments_survive_mutation() {
    let source = "/**\n * @license MIT\n */\nimport { defineConfig } from 'vite'\n\nexport default defineConfig({\n  plugins: [vue()], /* core */\n})\n";
    let mut editor = BuildConfigEditor::new([("buildConfig", source)]).unwrap();
    editor
        .add_import("buildConfig", "import legacy from '@vitejs/plugin-legacy'")
        .unwrap()
        .add_plugin("buildConfig", "legacy()")
        .unwrap();

    assert_eq!(
        editor.get_text("buildConfig"),
        "/**\n * @license MIT\n */\nimport legacy from '@vitejs/plugin-legacy'\nimport { defineConfig } from 'vite'\n\nexport default defineConfig({\n  plugins: [vue(), legacy()], /* core */\n})\n"
    );
}

#[test]
fn test_wrong_shape_config_is_a_diagnostic() {
    let config = "export default defineConfig({\n  plugins: getPlugins(),\n})\n";
    let mut editor = BuildConfigEditor::new([("buildConfig", config)]).unwrap();
    editor.add_plugin("buildConfig", "vue()").unwrap();

    assert_eq!(editor.get_text("buildConfig"), config);
    assert_eq!(editor.diagnostics().len(), 1);
}
