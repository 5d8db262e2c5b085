//! Structural queries over parsed programs
//!
//! The build-config mutations all start from the same anchor: the first call
//! to a configuration factory whose first argument is an object literal.
//! These helpers find that anchor and the named properties inside it.

use crate::error::{QueryError, QueryResult};
use crate::visitor::{walk_expression_mut, VisitorMut};
use sprout_parser::ast::*;
use sprout_parser::build;

/// Whether `call` invokes the bare identifier `name`
pub fn is_call_to(call: &CallExpression, name: &str) -> bool {
    matches!(call.callee.peel(), Expression::Identifier(id) if id.name == name)
}

/// Static name of a property key; `None` for computed and private keys
pub fn property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::Identifier(id) => Some(id.name.clone()),
        PropertyKey::Literal(literal) => match literal.kind {
            LiteralKind::String => literal.string_value(),
            LiteralKind::Number | LiteralKind::BigInt => Some(literal.raw.clone()),
            LiteralKind::RegExp => None,
        },
        PropertyKey::Computed(_) | PropertyKey::Private(_) => None,
    }
}

fn is_named(member: &ObjectMember, name: &str) -> bool {
    match member {
        ObjectMember::Property(property) => {
            property_key_name(&property.key).as_deref() == Some(name)
        }
        ObjectMember::Spread(_) => false,
    }
}

pub fn find_property<'a>(object: &'a ObjectExpression, name: &str) -> Option<&'a Property> {
    object.properties.iter().find_map(|member| match member {
        ObjectMember::Property(property) if is_named(member, name) => Some(property),
        _ => None,
    })
}

pub fn find_property_mut<'a>(
    object: &'a mut ObjectExpression,
    name: &str,
) -> Option<&'a mut Property> {
    let index = object
        .properties
        .iter()
        .position(|member| is_named(member, name))?;
    match &mut object.properties[index] {
        ObjectMember::Property(property) => Some(property),
        ObjectMember::Spread(_) => None,
    }
}

fn ensure_property<'a>(
    object: &'a mut ObjectExpression,
    name: &str,
    init: impl FnOnce() -> Expression,
) -> &'a mut Expression {
    if find_property(object, name).is_none() {
        object.properties.push(build::property(name, init()));
    }

    let index = object
        .properties
        .iter()
        .position(|member| is_named(member, name))
        .unwrap_or(object.properties.len() - 1);
    match &mut object.properties[index] {
        ObjectMember::Property(property) => &mut property.value,
        ObjectMember::Spread(spread) => &mut spread.argument,
    }
}

/// Object stored under `name`, created empty when the key is absent
pub fn ensure_object_property<'a>(
    object: &'a mut ObjectExpression,
    name: &str,
) -> QueryResult<&'a mut ObjectExpression> {
    match ensure_property(object, name, || build::object(Vec::new())).peel_mut() {
        Expression::Object(inner) => Ok(inner),
        other => Err(QueryError::shape_mismatch(
            format!("object literal for '{}'", name),
            other.kind_name(),
        )),
    }
}

/// Array stored under `name`, created empty when the key is absent
pub fn ensure_array_property<'a>(
    object: &'a mut ObjectExpression,
    name: &str,
) -> QueryResult<&'a mut ArrayExpression> {
    match ensure_property(object, name, || build::array(Vec::new())).peel_mut() {
        Expression::Array(inner) => Ok(inner),
        other => Err(QueryError::shape_mismatch(
            format!("array literal for '{}'", name),
            other.kind_name(),
        )),
    }
}

/// Finds the first call, in pre-order, accepted by `predicate` and applies
/// `apply` to it once
pub struct CallFinder<P, F, R> {
    predicate: P,
    apply: Option<F>,
    result: Option<R>,
}

impl<P, F, R> CallFinder<P, F, R>
where
    P: FnMut(&CallExpression) -> bool,
    F: FnOnce(&mut CallExpression) -> R,
{
    pub fn new(predicate: P, apply: F) -> Self {
        Self {
            predicate,
            apply: Some(apply),
            result: None,
        }
    }

    /// `None` when no call matched
    pub fn run(mut self, program: &mut Program) -> Option<R> {
        self.visit_program_mut(program);
        self.result
    }
}

impl<P, F, R> VisitorMut for CallFinder<P, F, R>
where
    P: FnMut(&CallExpression) -> bool,
    F: FnOnce(&mut CallExpression) -> R,
{
    fn visit_statement_mut(&mut self, statement: &mut Statement) {
        if self.apply.is_some() {
            crate::visitor::walk_statement_mut(self, statement);
        }
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        if self.apply.is_none() {
            return;
        }
        if let Expression::Call(call) = expr {
            if (self.predicate)(call) {
                if let Some(apply) = self.apply.take() {
                    self.result = Some(apply(call));
                }
                return;
            }
        }
        walk_expression_mut(self, expr);
    }
}

/// Apply `f` to the object literal passed to the first `factory(...)` call
///
/// Returns `Ok(None)` when there is no such call or its first argument is
/// not an object literal.
pub fn with_config_object<R>(
    program: &mut Program,
    factory: &str,
    f: impl FnOnce(&mut ObjectExpression) -> QueryResult<R>,
) -> QueryResult<Option<R>> {
    let found = CallFinder::new(
        |call: &CallExpression| is_call_to(call, factory),
        |call: &mut CallExpression| match call.arguments.first_mut().map(Expression::peel_mut) {
            Some(Expression::Object(object)) => Some(f(object)),
            _ => None,
        },
    )
    .run(program);

    found.flatten().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_parser::{parse, print};

    fn first_object(program: &mut Program) -> &mut ObjectExpression {
        let Some(Statement::Variable(variable)) = program.body.first_mut() else {
            panic!("expected variable declaration");
        };
        match variable.declarations[0].init.as_mut().map(Expression::peel_mut) {
            Some(Expression::Object(object)) => object,
            _ => panic!("expected object literal"),
        }
    }

    #[test]
    fn test_property_key_name() {
        let mut program = parse("const o = { a: 1, 'b-c': 2, 3: 4, [d]: 5 }").unwrap();
        let object = first_object(&mut program);
        let names: Vec<_> = object
            .properties
            .iter()
            .map(|member| match member {
                ObjectMember::Property(property) => property_key_name(&property.key),
                ObjectMember::Spread(_) => None,
            })
            .collect();
        assert_eq!(
            names,
            vec![
                Some("a".to_string()),
                Some("b-c".to_string()),
                Some("3".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_find_property_matches_quoted_keys() {
        let mut program = parse("const o = { 'plugins': [], build: {} }").unwrap();
        let object = first_object(&mut program);
        assert!(find_property(object, "plugins").is_some());
        assert!(find_property(object, "build").is_some());
        assert!(find_property(object, "resolve").is_none());
        assert!(find_property_mut(object, "build").is_some());
    }

    #[test]
    fn test_ensure_object_property_creates_once() {
        let source = "const o = { plugins: [] }";
        let mut program = parse(source).unwrap();
        let object = first_object(&mut program);
        ensure_object_property(object, "resolve").unwrap();
        ensure_object_property(object, "resolve").unwrap();
        assert_eq!(object.properties.len(), 2);
    }

    #[test]
    fn test_ensure_object_property_rejects_other_shapes() {
        let mut program = parse("const o = { resolve: getResolve() }").unwrap();
        let object = first_object(&mut program);
        let err = ensure_object_property(object, "resolve").unwrap_err();
        assert_eq!(
            err,
            QueryError::shape_mismatch("object literal for 'resolve'", "call expression")
        );
    }

    #[test]
    fn test_ensure_array_property_sees_through_assertions() {
        let mut program = parse("const o = { plugins: [a()] as Plugin[] }").unwrap();
        let object = first_object(&mut program);
        let plugins = ensure_array_property(object, "plugins").unwrap();
        assert_eq!(plugins.elements.len(), 1);
    }

    #[test]
    fn test_with_config_object_finds_nested_factory() {
        let source = "export default mergeConfig(base, defineConfig({ base: '/' }))\n";
        let mut program = parse(source).unwrap();
        let count = with_config_object(&mut program, "defineConfig", |object| {
            Ok(object.properties.len())
        })
        .unwrap();
        assert_eq!(count, Some(1));
    }

    #[test]
    fn test_with_config_object_requires_object_argument() {
        let mut program = parse("export default defineConfig(() => ({}))").unwrap();
        let result = with_config_object(&mut program, "defineConfig", |_| Ok(())).unwrap();
        assert_eq!(result, None);

        let mut program = parse("export default {}").unwrap();
        let result = with_config_object(&mut program, "defineConfig", |_| Ok(())).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_with_config_object_propagates_query_errors() {
        let mut program = parse("export default defineConfig({ plugins: 1 })").unwrap();
        let result = with_config_object(&mut program, "defineConfig", |object| {
            ensure_array_property(object, "plugins").map(|_| ())
        });
        assert!(matches!(result, Err(QueryError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_call_finder_stops_at_first_match() {
        let source = "a.render(x)\nb.render(y)\n";
        let mut program = parse(source).unwrap();
        let mut seen = 0;
        let found = CallFinder::new(
            |call: &CallExpression| {
                seen += 1;
                matches!(call.callee.peel(), Expression::Member(_))
            },
            |call: &mut CallExpression| call.arguments.len(),
        )
        .run(&mut program);
        assert_eq!(found, Some(1));
        assert_eq!(seen, 1);
        assert_eq!(print(source, &program), source);
    }
}
