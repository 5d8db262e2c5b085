use serde::{Deserialize, Serialize};

/// Byte range of a node in the text it was parsed from
///
/// Nodes produced by the parser carry their original range. Nodes built or
/// replaced by a mutation are `synthetic`; a synthetic span may still keep the
/// range of the node it replaced so the printer knows which text to overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub synthetic: bool,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            synthetic: false,
        }
    }

    /// Span for a node with no position in the text
    pub fn synthetic() -> Self {
        Self {
            start: 0,
            end: 0,
            synthetic: true,
        }
    }

    /// Span for a node that takes the place of `other`
    pub fn replacing(other: Span) -> Self {
        Self {
            start: other.start,
            end: other.end,
            synthetic: true,
        }
    }

    /// Range in the original text this node occupies, if any
    pub fn anchor(&self) -> Option<std::ops::Range<usize>> {
        if self.synthetic && self.start == self.end {
            None
        } else {
            Some(self.start..self.end)
        }
    }
}

/// Root of a parsed module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Import(ImportDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    ExportNamed(ExportNamedDeclaration),
    ExportList(ExportListDeclaration),
    Variable(VariableDeclaration),
    Function(Function),
    Class(Class),
    Expression(ExpressionStatement),
    Block(BlockStatement),
    Return(ReturnStatement),
    If(IfStatement),
    Empty(Span),
    /// Loops, `switch`, `try`, labels and TypeScript-only declarations.
    /// Validated by the parser and kept as text.
    Opaque(OpaqueStatement),
    Graft(Graft<Statement>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub type_only: bool,
    pub default: Option<Identifier>,
    pub namespace: Option<Identifier>,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: Identifier,
    pub type_only: bool,
    pub span: Span,
}

/// `export default <expression>`; function and class declarations are stored
/// as their expression forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefaultDeclaration {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNamedDeclaration {
    pub declaration: Box<Statement>,
    pub span: Span,
}

/// `export { a, b as c }`, `export * from 'x'` and friends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportListDeclaration {
    pub clause: String,
    pub source: Option<Literal>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub kind: String,
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    /// Binding pattern as written
    pub id: String,
    pub type_annotation: Option<String>,
    pub init: Option<Expression>,
    pub span: Span,
}

impl VariableDeclarator {
    /// Bound name when the pattern is a plain identifier
    pub fn name(&self) -> Option<&str> {
        let id = self.id.trim_end_matches('!');
        id.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            .then_some(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: Option<Identifier>,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_parameters: Option<String>,
    /// Parameter list as written, parentheses included
    pub params: String,
    pub return_type: Option<String>,
    /// `None` for overload signatures and `declare function`
    pub body: Option<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: Option<Identifier>,
    /// Everything between the name and the body (`extends`, `implements`, type parameters)
    pub heritage: String,
    pub body: ClassBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBody {
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Method(ClassMethod),
    Field(ClassField),
    StaticBlock(ClassStaticBlock),
    /// Index signatures and other type-only members
    Signature(Span),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMethod {
    /// Decorators and modifiers as written
    pub modifiers: String,
    pub kind: PropertyKind,
    pub key: PropertyKey,
    pub value: Function,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStaticBlock {
    pub body: BlockStatement,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassField {
    pub modifiers: String,
    pub key: PropertyKey,
    pub type_annotation: Option<String>,
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueStatement {
    /// Leading keyword, e.g. `for`, `switch`, `interface`
    pub keyword: String,
    pub text: String,
    pub span: Span,
}

/// A subtree parsed from caller-supplied text, printed from that text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graft<T> {
    pub source: String,
    pub node: Box<T>,
    pub span: Span,
    /// Comment lines written above the node in `source`
    #[serde(default)]
    pub leading_comments: String,
    /// Comment on the same line after the node
    #[serde(default)]
    pub trailing_comment: String,
}

impl<T> Graft<T> {
    pub fn new(source: impl Into<String>, node: T) -> Self {
        Self {
            source: source.into(),
            node: Box::new(node),
            span: Span::synthetic(),
            leading_comments: String::new(),
            trailing_comment: String::new(),
        }
    }

    pub fn with_comments(mut self, leading: impl Into<String>, trailing: impl Into<String>) -> Self {
        self.leading_comments = leading.into();
        self.trailing_comment = trailing.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    Template(Template),
    TaggedTemplate(TaggedTemplate),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(Function),
    Arrow(ArrowFunction),
    Class(Box<Class>),
    Member(MemberExpression),
    Call(CallExpression),
    New(CallExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Conditional(ConditionalExpression),
    Assignment(AssignmentExpression),
    Sequence(SequenceExpression),
    Paren(ParenExpression),
    Yield(YieldExpression),
    TsAs(TsAsExpression),
    NonNull(NonNullExpression),
    Spread(SpreadElement),
    /// Hole in an array literal
    Elision(Span),
    JsxElement(JsxElement),
    JsxFragment(JsxFragment),
    Graft(Graft<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
    BigInt,
    RegExp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Text as written, quotes included
    pub raw: String,
    pub span: Span,
}

impl Literal {
    /// Cooked value of a string literal
    pub fn string_value(&self) -> Option<String> {
        if self.kind != LiteralKind::String || self.raw.len() < 2 {
            return None;
        }

        let inner = &self.raw[1..self.raw.len() - 1];
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some('\n') | None => {}
                Some(other) => value.push(other),
            }
        }
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Raw text between substitutions
    pub quasis: Vec<String>,
    pub expressions: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedTemplate {
    pub tag: Box<Expression>,
    pub type_arguments: Option<String>,
    pub quasi: Template,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectMember {
    Property(Property),
    Spread(SpreadElement),
}

impl ObjectMember {
    pub fn span(&self) -> Span {
        match self {
            ObjectMember::Property(p) => p.span,
            ObjectMember::Spread(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Init,
    Shorthand,
    Method,
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expression,
    pub kind: PropertyKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    Identifier(Identifier),
    Literal(Literal),
    Computed(Box<Expression>),
    Private(Identifier),
}

impl PropertyKey {
    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Identifier(id) | PropertyKey::Private(id) => id.span,
            PropertyKey::Literal(lit) => lit.span,
            PropertyKey::Computed(expr) => expr.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(BlockStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub is_async: bool,
    pub type_parameters: Option<String>,
    /// Parameter list as written: a bare identifier or a parenthesized list
    pub params: String,
    pub return_type: Option<String>,
    pub body: ArrowBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberProperty {
    Identifier(Identifier),
    Private(Identifier),
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: MemberProperty,
    pub optional: bool,
    pub span: Span,
}

/// Call or `new` expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub type_arguments: Option<String>,
    pub arguments: Vec<Expression>,
    /// Range of the argument list, parentheses included; `None` for `new Foo`
    pub arguments_span: Option<Span>,
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: String,
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpression {
    pub operator: String,
    pub prefix: bool,
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub operator: String,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenExpression {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldExpression {
    pub delegate: bool,
    pub argument: Option<Box<Expression>>,
    pub span: Span,
}

/// `expr as T` and `expr satisfies T`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsAsExpression {
    pub expression: Box<Expression>,
    pub operator: String,
    pub type_annotation: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonNullExpression {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadElement {
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxElement {
    pub opening: JsxOpeningElement,
    pub children: Vec<JsxChild>,
    /// Range of the closing tag; `None` when self-closing
    pub closing: Option<Span>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxOpeningElement {
    pub name: String,
    pub attributes: Vec<JsxAttribute>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub opening: Span,
    pub closing: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsxAttribute {
    Attribute(JsxNamedAttribute),
    Spread(SpreadElement),
}

impl JsxAttribute {
    pub fn span(&self) -> Span {
        match self {
            JsxAttribute::Attribute(a) => a.span,
            JsxAttribute::Spread(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxNamedAttribute {
    pub name: String,
    pub value: Option<JsxAttributeValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsxAttributeValue {
    String(Literal),
    Container(JsxExpressionContainer),
    Element(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxExpressionContainer {
    /// `None` for `{}` and comment-only containers
    pub expression: Option<Box<Expression>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsxChild {
    Text(JsxText),
    Container(JsxExpressionContainer),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
}

impl JsxChild {
    pub fn span(&self) -> Span {
        match self {
            JsxChild::Text(t) => t.span,
            JsxChild::Container(c) => c.span,
            JsxChild::Element(e) => e.span,
            JsxChild::Fragment(f) => f.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxText {
    pub raw: String,
    pub span: Span,
}

impl ClassMember {
    pub fn span(&self) -> Span {
        match self {
            ClassMember::Method(m) => m.span,
            ClassMember::Field(f) => f.span,
            ClassMember::StaticBlock(b) => b.span,
            ClassMember::Signature(span) => *span,
        }
    }
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Import(s) => s.span,
            Statement::ExportDefault(s) => s.span,
            Statement::ExportNamed(s) => s.span,
            Statement::ExportList(s) => s.span,
            Statement::Variable(s) => s.span,
            Statement::Function(s) => s.span,
            Statement::Class(s) => s.span,
            Statement::Expression(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::If(s) => s.span,
            Statement::Empty(span) => *span,
            Statement::Opaque(s) => s.span,
            Statement::Graft(g) => g.span,
        }
    }

    /// The statement itself, or the grafted statement it wraps
    pub fn resolved(&self) -> &Statement {
        match self {
            Statement::Graft(g) => g.node.resolved(),
            other => other,
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self.resolved(), Statement::Import(_))
    }
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::Literal(e) => e.span,
            Expression::Template(e) => e.span,
            Expression::TaggedTemplate(e) => e.span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Arrow(e) => e.span,
            Expression::Class(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Call(e) | Expression::New(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Sequence(e) => e.span,
            Expression::Paren(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::TsAs(e) => e.span,
            Expression::NonNull(e) => e.span,
            Expression::Spread(e) => e.span,
            Expression::Elision(span) => *span,
            Expression::JsxElement(e) => e.span,
            Expression::JsxFragment(e) => e.span,
            Expression::Graft(g) => g.span,
        }
    }

    /// Human-readable node kind, used in shape-mismatch messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "identifier",
            Expression::Literal(_) => "literal",
            Expression::Template(_) | Expression::TaggedTemplate(_) => "template literal",
            Expression::Array(_) => "array literal",
            Expression::Object(_) => "object literal",
            Expression::Function(_) => "function expression",
            Expression::Arrow(_) => "arrow function",
            Expression::Class(_) => "class expression",
            Expression::Member(_) => "member expression",
            Expression::Call(_) => "call expression",
            Expression::New(_) => "new expression",
            Expression::Unary(_) | Expression::Update(_) => "unary expression",
            Expression::Binary(_) => "binary expression",
            Expression::Conditional(_) => "conditional expression",
            Expression::Assignment(_) => "assignment",
            Expression::Sequence(_) => "sequence expression",
            Expression::Paren(_) => "parenthesized expression",
            Expression::Yield(_) => "yield expression",
            Expression::TsAs(_) => "type assertion",
            Expression::NonNull(_) => "non-null assertion",
            Expression::Spread(_) => "spread element",
            Expression::Elision(_) => "array hole",
            Expression::JsxElement(_) => "JSX element",
            Expression::JsxFragment(_) => "JSX fragment",
            Expression::Graft(g) => g.node.kind_name(),
        }
    }

    /// The expression itself, or the grafted expression it wraps
    pub fn resolved(&self) -> &Expression {
        match self {
            Expression::Graft(g) => g.node.resolved(),
            other => other,
        }
    }

    /// Strip parentheses and type assertions
    pub fn peel(&self) -> &Expression {
        match self {
            Expression::Paren(p) => p.expression.peel(),
            Expression::TsAs(t) => t.expression.peel(),
            Expression::NonNull(n) => n.expression.peel(),
            Expression::Graft(g) => g.node.peel(),
            other => other,
        }
    }

    /// Mutable counterpart of [`Expression::peel`]
    pub fn peel_mut(&mut self) -> &mut Expression {
        match self {
            Expression::Paren(p) => p.expression.peel_mut(),
            Expression::TsAs(t) => t.expression.peel_mut(),
            Expression::NonNull(n) => n.expression.peel_mut(),
            Expression::Graft(g) => g.node.peel_mut(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_anchor() {
        assert_eq!(Span::new(2, 5).anchor(), Some(2..5));
        assert_eq!(Span::synthetic().anchor(), None);
        assert_eq!(Span::replacing(Span::new(4, 9)).anchor(), Some(4..9));
    }

    #[test]
    fn test_string_value_unescapes() {
        let lit = Literal {
            kind: LiteralKind::String,
            raw: r"'it\'s'".to_string(),
            span: Span::new(0, 7),
        };
        assert_eq!(lit.string_value().as_deref(), Some("it's"));
    }

    #[test]
    fn test_declarator_name() {
        let decl = VariableDeclarator {
            id: "config".to_string(),
            type_annotation: None,
            init: None,
            span: Span::new(0, 6),
        };
        assert_eq!(decl.name(), Some("config"));

        let pattern = VariableDeclarator {
            id: "{ a, b }".to_string(),
            ..decl
        };
        assert_eq!(pattern.name(), None);
    }
}
