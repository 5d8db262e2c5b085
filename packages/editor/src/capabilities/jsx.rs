use crate::{DocumentModel, Edit, EditorError};
use sprout_common::CallFinder;
use sprout_parser::ast::{CallExpression, Expression, MemberProperty, Span};
use sprout_parser::build;
use tracing::debug;

/// Wrap the rendered root of the bootstrap slot in a provider component
pub trait JsxProvider: DocumentModel {
    /// Replace the first argument of the render call with
    /// `<component prop={value}>{previous}</component>`
    ///
    /// Repeated calls nest: the latest provider is outermost. The bootstrap
    /// slot must exist; a missing render call changes nothing and is not
    /// reported.
    fn add_jsx_provider<I, K, V>(&mut self, component: &str, props: I) -> Result<&mut Self, EditorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attributes: Vec<_> = props
            .into_iter()
            .map(|(name, value)| {
                build::jsx_attribute(
                    name.as_ref(),
                    Expression::Identifier(build::identifier(value.as_ref())),
                )
            })
            .collect();

        let document = self.document_mut();
        let slot = document.options().bootstrap_slot.clone();
        document.edit(&slot, |program, options| {
            let wrapped = CallFinder::new(
                |call: &CallExpression| is_render_call(call, &options.render_methods),
                |call: &mut CallExpression| {
                    let Some(target) = call.arguments.first_mut() else {
                        return false;
                    };

                    let previous =
                        std::mem::replace(target, Expression::Elision(Span::synthetic()));
                    let replaced = previous.span();
                    let mut wrapper =
                        build::jsx_element(component, attributes, vec![build::jsx_child(previous)]);
                    wrapper.span = Span::replacing(replaced);
                    *target = Expression::JsxElement(wrapper);
                    true
                },
            )
            .run(program)
            .unwrap_or(false);

            if wrapped {
                debug!(slot = %slot, component, "Wrapped render root");
                Ok(Edit::Applied)
            } else {
                debug!(slot = %slot, component, "No render call with an argument");
                Ok(Edit::Unchanged)
            }
        })?;
        Ok(self)
    }
}

/// `<object>.<method>(...)` where `method` is one of `methods`
fn is_render_call(call: &CallExpression, methods: &[String]) -> bool {
    match call.callee.peel() {
        Expression::Member(member) => match &member.property {
            MemberProperty::Identifier(property) => {
                methods.iter().any(|method| *method == property.name)
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    impl JsxProvider for Document {}

    const NO_PROPS: [(&str, &str); 0] = [];

    const ENTRY: &str = "import React from 'react'\nimport ReactDOM from 'react-dom/client'\nimport App from './App'\n\nReactDOM.createRoot(document.getElementById('root')!).render(\n  <React.StrictMode>\n    <App />\n  </React.StrictMode>,\n)\n";

    #[test]
    fn test_wrap_render_root_with_props() {
        let mut document = Document::new([("bootstrap", ENTRY)]).unwrap();
        document
            .add_jsx_provider("Provider", [("store", "store")])
            .unwrap();
        assert_eq!(
            document.get_text("bootstrap"),
            "import React from 'react'\nimport ReactDOM from 'react-dom/client'\nimport App from './App'\n\nReactDOM.createRoot(document.getElementById('root')!).render(\n  <Provider store={store}><React.StrictMode>\n    <App />\n  </React.StrictMode></Provider>,\n)\n"
        );
    }

    #[test]
    fn test_repeated_wraps_nest_outward() {
        let source = "root.render(<App />)\n";
        let mut document = Document::new([("bootstrap", source)]).unwrap();
        document
            .add_jsx_provider("A", NO_PROPS)
            .unwrap()
            .add_jsx_provider("B", NO_PROPS)
            .unwrap();
        assert_eq!(
            document.get_text("bootstrap"),
            "root.render(<B><A><App /></A></B>)\n"
        );
    }

    #[test]
    fn test_missing_render_call_is_silent() {
        let source = "createApp(App).mount('#app')\n";
        let mut document = Document::new([("bootstrap", source)]).unwrap();
        document.add_jsx_provider("Provider", NO_PROPS).unwrap();
        assert_eq!(document.get_text("bootstrap"), source);
        assert!(document.diagnostics().is_empty());
    }

    #[test]
    fn test_render_call_without_arguments_is_left_alone() {
        let source = "view.render()\nroot.render(<App />)\n";
        let mut document = Document::new([("bootstrap", source)]).unwrap();
        document.add_jsx_provider("Provider", NO_PROPS).unwrap();
        assert_eq!(document.get_text("bootstrap"), source);
    }

    #[test]
    fn test_missing_bootstrap_slot_is_an_error() {
        let mut document = Document::new([("buildConfig", "export default {}")]).unwrap();
        assert_eq!(
            document.add_jsx_provider("Provider", NO_PROPS).unwrap_err(),
            EditorError::FieldNotFound("bootstrap".to_string())
        );
    }
}
