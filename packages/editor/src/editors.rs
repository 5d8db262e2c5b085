//! Ready-made editor types

use crate::capabilities::{
    AliasInjection, ImportInjection, JsxProvider, PluginInjection, StatementInjection,
};

editor! {
    /// Every script capability
    pub struct ScriptEditor:
        ImportInjection,
        StatementInjection,
        PluginInjection,
        AliasInjection,
        JsxProvider;
}

editor! {
    /// Editor for a build-tool config such as `vite.config.ts`
    pub struct BuildConfigEditor:
        ImportInjection,
        StatementInjection,
        PluginInjection,
        AliasInjection;
}

editor! {
    /// Editor for an application entry point such as `main.tsx`
    pub struct BootstrapEditor: ImportInjection, StatementInjection, JsxProvider;
}
