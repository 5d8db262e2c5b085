//! Constructors for synthetic nodes
//!
//! Everything built here carries a synthetic span, so the printer emits it
//! fresh while leaving the surrounding text alone.

use crate::ast::*;

pub fn identifier(name: impl Into<String>) -> Identifier {
    Identifier {
        name: name.into(),
        span: Span::synthetic(),
    }
}

/// Single-quoted string literal
pub fn string_literal(value: &str) -> Literal {
    let mut raw = String::with_capacity(value.len() + 2);
    raw.push('\'');
    for c in value.chars() {
        match c {
            '\'' => raw.push_str("\\'"),
            '\\' => raw.push_str("\\\\"),
            '\n' => raw.push_str("\\n"),
            '\r' => raw.push_str("\\r"),
            '\t' => raw.push_str("\\t"),
            c => raw.push(c),
        }
    }
    raw.push('\'');

    Literal {
        kind: LiteralKind::String,
        raw,
        span: Span::synthetic(),
    }
}

pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Bare key when `name` is a valid identifier, quoted otherwise
pub fn property_key(name: &str) -> PropertyKey {
    if is_identifier_name(name) {
        PropertyKey::Identifier(identifier(name))
    } else {
        PropertyKey::Literal(string_literal(name))
    }
}

pub fn property(key: &str, value: Expression) -> ObjectMember {
    ObjectMember::Property(Property {
        key: property_key(key),
        value,
        kind: PropertyKind::Init,
        span: Span::synthetic(),
    })
}

pub fn object(properties: Vec<ObjectMember>) -> Expression {
    Expression::Object(ObjectExpression {
        properties,
        span: Span::synthetic(),
    })
}

pub fn array(elements: Vec<Expression>) -> Expression {
    Expression::Array(ArrayExpression {
        elements,
        span: Span::synthetic(),
    })
}

/// `name={value}`
pub fn jsx_attribute(name: &str, value: Expression) -> JsxAttribute {
    JsxAttribute::Attribute(JsxNamedAttribute {
        name: name.to_string(),
        value: Some(JsxAttributeValue::Container(JsxExpressionContainer {
            expression: Some(Box::new(value)),
            span: Span::synthetic(),
        })),
        span: Span::synthetic(),
    })
}

pub fn jsx_element(name: &str, attributes: Vec<JsxAttribute>, children: Vec<JsxChild>) -> JsxElement {
    let self_closing = children.is_empty();
    JsxElement {
        opening: JsxOpeningElement {
            name: name.to_string(),
            attributes,
            self_closing,
            span: Span::synthetic(),
        },
        children,
        closing: (!self_closing).then(Span::synthetic),
        span: Span::synthetic(),
    }
}

/// Wrap an expression as a JSX child, in a `{}` container unless it already is JSX
pub fn jsx_child(expression: Expression) -> JsxChild {
    match expression {
        Expression::JsxElement(element) => JsxChild::Element(Box::new(element)),
        Expression::JsxFragment(fragment) => JsxChild::Fragment(Box::new(fragment)),
        other => JsxChild::Container(JsxExpressionContainer {
            expression: Some(Box::new(other)),
            span: Span::synthetic(),
        }),
    }
}

/// An expression parsed from its own text
pub fn graft_expression(source: impl Into<String>, node: Expression) -> Expression {
    Expression::Graft(Graft::new(source, node))
}

/// A statement parsed from its own text
pub fn graft_statement(source: impl Into<String>, node: Statement) -> Statement {
    Statement::Graft(Graft::new(source, node))
}
