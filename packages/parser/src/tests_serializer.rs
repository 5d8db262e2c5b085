/// Tests for minimal-diff printing of edited programs
use crate::ast::*;
use crate::build;
use crate::*;

const VITE_CONFIG: &str = r#"import { defineConfig } from 'vite'
import vue from '@vitejs/plugin-vue' // framework

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [vue()],
})
"#;

fn config_object(program: &mut Program) -> &mut ObjectExpression {
    let Some(Statement::ExportDefault(export)) = program.body.last_mut() else {
        panic!("expected export default");
    };
    let expression = match &mut export.expression {
        Expression::Call(call) => &mut call.arguments[0],
        other => other,
    };
    match expression {
        Expression::Object(object) => object,
        other => panic!("expected object, got {}", other.kind_name()),
    }
}

fn grafted(text: &str) -> Expression {
    build::graft_expression(text, parse_expression(text).unwrap())
}

fn grafted_statement(text: &str) -> Statement {
    let mut program = parse(text).unwrap();
    build::graft_statement(text, program.body.remove(0))
}

#[test]
fn test_unchanged_program_prints_identically() {
    let program = parse(VITE_CONFIG).unwrap();
    assert_eq!(print(VITE_CONFIG, &program), VITE_CONFIG);
}

#[test]
fn test_append_array_element_inline() {
    let mut program = parse(VITE_CONFIG).unwrap();
    let object = config_object(&mut program);
    let ObjectMember::Property(plugins) = &mut object.properties[0] else {
        panic!("expected property");
    };
    let Expression::Array(array) = &mut plugins.value else {
        panic!("expected array");
    };
    array.elements.push(grafted("legacy()"));

    let output = print(VITE_CONFIG, &program);
    assert_eq!(
        output,
        VITE_CONFIG.replace("[vue()]", "[vue(), legacy()]")
    );
}

#[test]
fn test_append_array_element_multiline() {
    let source = "export default {\n  plugins: [\n    vue(),\n  ],\n}\n";
    let mut program = parse(source).unwrap();
    let object = config_object(&mut program);
    let ObjectMember::Property(plugins) = &mut object.properties[0] else {
        panic!("expected property");
    };
    let Expression::Array(array) = &mut plugins.value else {
        panic!("expected array");
    };
    array.elements.push(grafted("legacy()"));

    assert_eq!(
        print(source, &program),
        "export default {\n  plugins: [\n    vue(),\n    legacy(),\n  ],\n}\n"
    );
}

#[test]
fn test_insert_property_keeps_trailing_comma() {
    let mut program = parse(VITE_CONFIG).unwrap();
    let object = config_object(&mut program);
    object
        .properties
        .push(build::property("base", grafted("'/app/'")));

    let output = print(VITE_CONFIG, &program);
    assert_eq!(
        output,
        VITE_CONFIG.replace(
            "  plugins: [vue()],\n",
            "  plugins: [vue()],\n  base: '/app/',\n"
        )
    );
}

#[test]
fn test_insert_nested_object_is_indented() {
    let mut program = parse(VITE_CONFIG).unwrap();
    let object = config_object(&mut program);
    let alias = build::object(vec![build::property("@", grafted("'./src'"))]);
    object.properties.push(build::property(
        "resolve",
        build::object(vec![build::property("alias", alias)]),
    ));

    let output = print(VITE_CONFIG, &program);
    assert!(output.contains(
        "  plugins: [vue()],\n  resolve: {\n    alias: {\n      '@': './src'\n    }\n  },\n})"
    ));
}

#[test]
fn test_fill_empty_object() {
    let source = "export default defineConfig({})\n";
    let mut program = parse(source).unwrap();
    let object = config_object(&mut program);
    object.properties.push(build::property(
        "plugins",
        build::array(vec![grafted("vue()")]),
    ));

    assert_eq!(
        print(source, &program),
        "export default defineConfig({\n  plugins: [vue()]\n})\n"
    );
}

#[test]
fn test_fill_empty_object_inside_inline_object() {
    let source = "export default defineConfig({\n  resolve: { alias: {} },\n})\n";
    let mut program = parse(source).unwrap();
    let object = config_object(&mut program);
    let ObjectMember::Property(resolve) = &mut object.properties[0] else {
        panic!("expected property");
    };
    let Expression::Object(resolve) = &mut resolve.value else {
        panic!("expected object");
    };
    let ObjectMember::Property(alias) = &mut resolve.properties[0] else {
        panic!("expected property");
    };
    let Expression::Object(alias) = &mut alias.value else {
        panic!("expected object");
    };
    alias.properties.push(build::property("@", grafted("'./src'")));
    alias.properties.push(build::property("valid", grafted("'y'")));

    assert_eq!(
        print(source, &program),
        "export default defineConfig({\n  resolve: { alias: { '@': './src', valid: 'y' } },\n})\n"
    );
}

#[test]
fn test_insert_statement_before_first() {
    let mut program = parse(VITE_CONFIG).unwrap();
    program
        .body
        .insert(0, grafted_statement("import legacy from '@vitejs/plugin-legacy'"));

    let output = print(VITE_CONFIG, &program);
    assert_eq!(
        output,
        format!("import legacy from '@vitejs/plugin-legacy'\n{}", VITE_CONFIG)
    );
}

#[test]
fn test_insert_statement_after_trailing_comment() {
    let mut program = parse(VITE_CONFIG).unwrap();
    program.body.insert(2, grafted_statement("const base = '/'"));

    let output = print(VITE_CONFIG, &program);
    assert_eq!(
        output,
        VITE_CONFIG.replace(
            "// framework\n",
            "// framework\nconst base = '/'\n"
        )
    );
}

#[test]
fn test_statements_into_empty_program() {
    let source = "";
    let mut program = parse(source).unwrap();
    program.body.push(grafted_statement("import './style.css'"));
    program.body.push(grafted_statement("run()"));

    assert_eq!(print(source, &program), "import './style.css'\nrun()\n");
}

#[test]
fn test_replace_jsx_argument_with_wrapper() {
    let source = "const root = createRoot(el)\nroot.render(<App />)\n";
    let mut program = parse(source).unwrap();
    let Statement::Expression(statement) = &mut program.body[1] else {
        panic!("expected expression statement");
    };
    let Expression::Call(call) = &mut statement.expression else {
        panic!("expected call");
    };

    let old = std::mem::replace(&mut call.arguments[0], Expression::Elision(Span::synthetic()));
    let old_span = old.span();
    let mut wrapper = build::jsx_element(
        "Provider",
        vec![build::jsx_attribute(
            "store",
            Expression::Identifier(build::identifier("store")),
        )],
        vec![build::jsx_child(old)],
    );
    wrapper.span = Span::replacing(old_span);
    call.arguments[0] = Expression::JsxElement(wrapper);

    assert_eq!(
        print(source, &program),
        "const root = createRoot(el)\nroot.render(<Provider store={store}><App /></Provider>)\n"
    );
}

#[test]
fn test_wrapping_non_jsx_argument_uses_container() {
    let source = "render(app)";
    let mut program = parse(source).unwrap();
    let Statement::Expression(statement) = &mut program.body[0] else {
        panic!("expected expression statement");
    };
    let Expression::Call(call) = &mut statement.expression else {
        panic!("expected call");
    };

    let old = call.arguments.remove(0);
    let mut wrapper = build::jsx_element("Shell", vec![], vec![build::jsx_child(old.clone())]);
    wrapper.span = Span::replacing(old.span());
    call.arguments.push(Expression::JsxElement(wrapper));

    assert_eq!(print(source, &program), "render(<Shell>{app}</Shell>)");
}

#[test]
fn test_edit_inside_function_body_keeps_indentation() {
    let source = "function setup() {\n    const app = createApp()\n}\n";
    let mut program = parse(source).unwrap();
    let Statement::Function(function) = &mut program.body[0] else {
        panic!("expected function");
    };
    let body = function.body.as_mut().unwrap();
    body.body.push(grafted_statement("app.mount('#app')"));

    assert_eq!(
        print(source, &program),
        "function setup() {\n    const app = createApp()\n    app.mount('#app')\n}\n"
    );
}

#[test]
fn test_fresh_statement_follows_semicolon_style() {
    let source = "const a = 1;\n";
    let mut program = parse(source).unwrap();
    program.body.push(Statement::Expression(ExpressionStatement {
        expression: build::array(vec![]),
        span: Span::synthetic(),
    }));

    assert_eq!(print(source, &program), "const a = 1;\n[];\n");
}
