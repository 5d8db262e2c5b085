use crate::ast::*;
use std::ops::Range;

/// Lossless serializer that preserves original formatting using spans
///
/// This serializer enables minimal-diff editing:
/// 1. Parse source → AST with spans
/// 2. Edit AST (insert list items, replace nodes, graft parsed fragments)
/// 3. Serialize → untouched text is copied byte for byte
///
/// Strategy:
/// - A node is pristine when its span is not synthetic and every child is pristine
/// - Pristine nodes: copy original source verbatim
/// - Synthetic nodes: print fresh, with pristine descendants still copied
/// - Everything else: splice edits for changed children into the original text
/// - Inserted list items take their separator and indentation from their neighbours
pub struct LosslessSerializer<'a> {
    source: &'a str,
    indent_unit: String,
    semicolons: bool,
}

#[derive(Clone, Copy)]
enum Node<'n> {
    Program(&'n Program),
    Statement(&'n Statement),
    Expression(&'n Expression),
    Block(&'n BlockStatement),
    ClassBody(&'n ClassBody),
    ClassMember(&'n ClassMember),
    Declarator(&'n VariableDeclarator),
    ObjectMember(&'n ObjectMember),
    JsxChild(&'n JsxChild),
    JsxAttribute(&'n JsxAttribute),
}

impl Node<'_> {
    fn span(&self) -> Span {
        match self {
            Node::Program(p) => p.span,
            Node::Statement(s) => s.span(),
            Node::Expression(e) => e.span(),
            Node::Block(b) => b.span,
            Node::ClassBody(b) => b.span,
            Node::ClassMember(m) => m.span(),
            Node::Declarator(d) => d.span,
            Node::ObjectMember(m) => m.span(),
            Node::JsxChild(c) => c.span(),
            Node::JsxAttribute(a) => a.span(),
        }
    }
}

enum Group<'n> {
    Single(Node<'n>),
    List {
        items: Vec<Node<'n>>,
        /// Text between the delimiters, or the insertion point for empty lists
        inner: Range<usize>,
        layout: Layout,
    },
}

/// How a comma list with no original items is filled
#[derive(Clone, Copy, PartialEq)]
enum EmptyFill {
    /// `[a, b]`
    Bare,
    /// `{ a, b }`
    Padded,
    /// One item per line, indented
    Multiline,
}

#[derive(Clone, Copy, PartialEq)]
enum Layout {
    Commas { empty: EmptyFill },
    Lines { top_level: bool },
    Inline,
    Spaced,
}

struct Edit {
    range: Range<usize>,
    text: String,
}

impl<'a> LosslessSerializer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            indent_unit: detect_indent_unit(source),
            semicolons: source.lines().any(|line| line.trim_end().ends_with(';')),
        }
    }

    /// Serialize a program parsed from this serializer's source
    pub fn serialize(&self, program: &Program) -> String {
        self.print(Node::Program(program), "")
    }

    /// Serialize a single expression parsed from this serializer's source
    pub fn serialize_expression(&self, expression: &Expression) -> String {
        let indent = expression
            .span()
            .anchor()
            .map(|range| self.line_indent(range.start))
            .unwrap_or_default();
        self.print(Node::Expression(expression), &indent)
    }

    /// `indent` is the indentation of the line the node starts on
    fn print(&self, node: Node, indent: &str) -> String {
        match node {
            Node::Statement(Statement::Graft(graft)) => {
                let mut out = String::new();
                for line in graft.leading_comments.lines() {
                    out.push_str(line.trim_end());
                    out.push('\n');
                    out.push_str(indent);
                }
                out.push_str(
                    &LosslessSerializer::new(&graft.source).print(Node::Statement(&graft.node), indent),
                );
                if !graft.trailing_comment.is_empty() {
                    out.push(' ');
                    out.push_str(&graft.trailing_comment);
                }
                return out;
            }
            Node::Expression(Expression::Graft(graft)) => {
                return LosslessSerializer::new(&graft.source)
                    .print(Node::Expression(&graft.node), indent)
            }
            _ => {}
        }

        if self.is_pristine(node) {
            return self.slice(node.span());
        }

        let span = node.span();
        if span.synthetic || self.needs_fresh(node) {
            return self.print_fresh(node, indent);
        }

        let mut edits = Vec::new();
        for group in self.groups(node) {
            match group {
                Group::Single(child) => self.edit_child(child, &mut edits),
                Group::List {
                    items,
                    inner,
                    layout,
                } => self.edit_list(&items, inner, layout, indent, &mut edits),
            }
        }
        edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

        let mut output = String::new();
        let mut cursor = span.start;
        for edit in edits {
            if edit.range.start < cursor {
                continue;
            }
            output.push_str(&self.source[cursor..edit.range.start]);
            output.push_str(&edit.text);
            cursor = edit.range.end;
        }
        output.push_str(&self.source[cursor..span.end]);
        output
    }

    fn is_pristine(&self, node: Node) -> bool {
        if node.span().synthetic {
            return false;
        }
        self.groups(node).iter().all(|group| match group {
            Group::Single(child) => self.is_pristine(*child),
            Group::List { items, .. } => items.iter().all(|item| self.is_pristine(*item)),
        })
    }

    /// Changed nodes that cannot be expressed as splices into their old text
    fn needs_fresh(&self, node: Node) -> bool {
        match node {
            Node::Expression(Expression::JsxElement(element)) => {
                element.closing.is_none() && !element.children.is_empty()
            }
            Node::Expression(Expression::Call(call) | Expression::New(call)) => {
                call.arguments_span.is_none() && !call.arguments.is_empty()
            }
            Node::ObjectMember(ObjectMember::Property(property)) => {
                property.kind == PropertyKind::Shorthand
                    && !self.is_pristine(Node::Expression(&property.value))
            }
            _ => false,
        }
    }

    fn edit_child(&self, child: Node, edits: &mut Vec<Edit>) {
        if self.is_pristine(child) {
            return;
        }
        // Unanchored single children have nowhere to go
        let Some(range) = child.span().anchor() else {
            return;
        };
        let indent = self.line_indent(range.start);
        edits.push(Edit {
            text: self.print(child, &indent),
            range,
        });
    }

    fn edit_list(
        &self,
        items: &[Node],
        inner: Range<usize>,
        layout: Layout,
        indent: &str,
        edits: &mut Vec<Edit>,
    ) {
        let anchors: Vec<Option<Range<usize>>> =
            items.iter().map(|item| item.span().anchor()).collect();

        if !items.is_empty() && anchors.iter().all(Option::is_none) {
            self.fill_empty(items, inner, layout, indent, edits);
            return;
        }

        let mut i = 0;
        while i < items.len() {
            if anchors[i].is_some() {
                self.edit_child(items[i], edits);
                i += 1;
                continue;
            }

            let run_start = i;
            while i < items.len() && anchors[i].is_none() {
                i += 1;
            }
            let prev = run_start
                .checked_sub(1)
                .and_then(|p| anchors[p].clone());
            let next = anchors.get(i).cloned().flatten();

            let neighbour = prev.clone().or(next.clone()).unwrap_or(inner.clone());
            let item_indent = self.line_indent(neighbour.start);
            let separator = self.separator(layout, &inner, &item_indent);
            let texts: Vec<String> = items[run_start..i]
                .iter()
                .map(|item| self.print(*item, &item_indent))
                .collect();

            if let Some(prev) = prev {
                let mut at = prev.end;
                if matches!(layout, Layout::Lines { .. }) {
                    at = self.end_of_line_after(at);
                }
                let text = texts
                    .iter()
                    .map(|text| format!("{}{}", separator, text))
                    .collect();
                edits.push(Edit { range: at..at, text });
            } else if let Some(next) = next {
                let text = texts
                    .iter()
                    .map(|text| format!("{}{}", text, separator))
                    .collect();
                edits.push(Edit {
                    range: next.start..next.start,
                    text,
                });
            }
        }
    }

    /// Items for a list that had none in the original text
    fn fill_empty(
        &self,
        items: &[Node],
        inner: Range<usize>,
        layout: Layout,
        indent: &str,
        edits: &mut Vec<Edit>,
    ) {
        let nested = format!("{}{}", indent, self.indent_unit);
        let print_all = |item_indent: &str| -> Vec<String> {
            items
                .iter()
                .map(|item| self.print(*item, item_indent))
                .collect()
        };

        let text = match layout {
            Layout::Commas {
                empty: EmptyFill::Multiline,
            } => format!(
                "\n{}{}\n{}",
                nested,
                print_all(&nested).join(format!(",\n{}", nested).as_str()),
                indent
            ),
            Layout::Commas {
                empty: EmptyFill::Padded,
            } => format!(" {} ", print_all(indent).join(", ")),
            Layout::Commas { .. } => print_all(indent).join(", "),
            Layout::Lines { top_level: true } => {
                let mut text = print_all("").join("\n");
                text.push('\n');
                if self.source.trim().is_empty() {
                    edits.push(Edit {
                        range: inner,
                        text,
                    });
                } else {
                    edits.push(Edit {
                        range: inner.start..inner.start,
                        text,
                    });
                }
                return;
            }
            Layout::Lines { top_level: false } => format!(
                "\n{}{}\n{}",
                nested,
                print_all(&nested).join(format!("\n{}", nested).as_str()),
                indent
            ),
            Layout::Inline => print_all(indent).concat(),
            Layout::Spaced => {
                let text = print_all(indent)
                    .iter()
                    .map(|text| format!(" {}", text))
                    .collect();
                edits.push(Edit {
                    range: inner.start..inner.start,
                    text,
                });
                return;
            }
        };

        let blank = self.source[inner.clone()].trim().is_empty();
        let range = if blank {
            inner
        } else {
            inner.start..inner.start
        };
        edits.push(Edit { range, text });
    }

    fn separator(&self, layout: Layout, inner: &Range<usize>, item_indent: &str) -> String {
        match layout {
            Layout::Commas { .. } => {
                if self.source[inner.clone()].contains('\n') {
                    format!(",\n{}", item_indent)
                } else {
                    ", ".to_string()
                }
            }
            Layout::Lines { .. } => format!("\n{}", item_indent),
            Layout::Inline => String::new(),
            Layout::Spaced => " ".to_string(),
        }
    }

    /// Skip to the end of the line if only whitespace or a line comment follows
    fn end_of_line_after(&self, pos: usize) -> usize {
        let line_end = self.source[pos..]
            .find('\n')
            .map_or(self.source.len(), |i| pos + i);
        let rest = self.source[pos..line_end].trim();
        if rest.is_empty() || rest.starts_with("//") {
            line_end
        } else {
            pos
        }
    }

    /// Whether the rest of the line after `end` still closes an enclosing inline list
    ///
    /// `{ alias: {} }` is inline, `defineConfig({})` is not.
    fn closes_inline_parent(&self, end: usize) -> bool {
        let rest = self.source.get(end..).unwrap_or_default();
        let rest = rest.split('\n').next().unwrap_or_default();
        let rest = rest.find("//").map_or(rest, |i| &rest[..i]);
        !rest
            .chars()
            .all(|c| c.is_whitespace() || matches!(c, ')' | ',' | ';'))
    }

    fn line_indent(&self, pos: usize) -> String {
        let pos = pos.min(self.source.len());
        let line_start = self.source[..pos].rfind('\n').map_or(0, |i| i + 1);
        self.source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn slice(&self, span: Span) -> String {
        self.source
            .get(span.start..span.end)
            .unwrap_or_default()
            .to_string()
    }

    fn semi(&self) -> &'static str {
        if self.semicolons {
            ";"
        } else {
            ""
        }
    }

    // Child groups

    fn groups<'n>(&self, node: Node<'n>) -> Vec<Group<'n>> {
        let mut out = Vec::new();
        match node {
            Node::Program(program) => out.push(Group::List {
                items: program.body.iter().map(Node::Statement).collect(),
                inner: program.span.start..program.span.end,
                layout: Layout::Lines { top_level: true },
            }),
            Node::Statement(statement) => self.statement_groups(statement, &mut out),
            Node::Expression(expression) => self.expression_groups(expression, &mut out),
            Node::Block(block) => out.push(block_group(block)),
            Node::ClassBody(body) => out.push(Group::List {
                items: body.members.iter().map(Node::ClassMember).collect(),
                inner: inner_of(body.span),
                layout: Layout::Lines { top_level: false },
            }),
            Node::ClassMember(member) => match member {
                ClassMember::Method(method) => {
                    key_groups(&method.key, &mut out);
                    function_groups(&method.value, &mut out);
                }
                ClassMember::Field(field) => {
                    key_groups(&field.key, &mut out);
                    if let Some(value) = &field.value {
                        out.push(Group::Single(Node::Expression(value)));
                    }
                }
                ClassMember::StaticBlock(block) => out.push(Group::Single(Node::Block(&block.body))),
                ClassMember::Signature(_) => {}
            },
            Node::Declarator(declarator) => {
                if let Some(init) = &declarator.init {
                    out.push(Group::Single(Node::Expression(init)));
                }
            }
            Node::ObjectMember(member) => match member {
                ObjectMember::Property(property) => {
                    key_groups(&property.key, &mut out);
                    out.push(Group::Single(Node::Expression(&property.value)));
                }
                ObjectMember::Spread(spread) => {
                    out.push(Group::Single(Node::Expression(&spread.argument)))
                }
            },
            Node::JsxChild(child) => match child {
                JsxChild::Text(_) => {}
                JsxChild::Container(container) => container_groups(container, &mut out),
                JsxChild::Element(element) => self.jsx_element_groups(element, &mut out),
                JsxChild::Fragment(fragment) => fragment_groups(fragment, &mut out),
            },
            Node::JsxAttribute(attribute) => match attribute {
                JsxAttribute::Attribute(named) => match &named.value {
                    Some(JsxAttributeValue::Container(container)) => {
                        container_groups(container, &mut out)
                    }
                    Some(JsxAttributeValue::Element(element)) => {
                        out.push(Group::Single(Node::Expression(element)))
                    }
                    Some(JsxAttributeValue::String(_)) | None => {}
                },
                JsxAttribute::Spread(spread) => {
                    out.push(Group::Single(Node::Expression(&spread.argument)))
                }
            },
        }
        out
    }

    fn statement_groups<'n>(&self, statement: &'n Statement, out: &mut Vec<Group<'n>>) {
        match statement {
            Statement::ExportDefault(export) => {
                out.push(Group::Single(Node::Expression(&export.expression)))
            }
            Statement::ExportNamed(export) => {
                out.push(Group::Single(Node::Statement(&export.declaration)))
            }
            Statement::Variable(variable) => out.extend(
                variable
                    .declarations
                    .iter()
                    .map(|d| Group::Single(Node::Declarator(d))),
            ),
            Statement::Function(function) => function_groups(function, out),
            Statement::Class(class) => out.push(Group::Single(Node::ClassBody(&class.body))),
            Statement::Expression(statement) => {
                out.push(Group::Single(Node::Expression(&statement.expression)))
            }
            Statement::Block(block) => out.push(block_group(block)),
            Statement::Return(ret) => {
                if let Some(argument) = &ret.argument {
                    out.push(Group::Single(Node::Expression(argument)));
                }
            }
            Statement::If(statement) => {
                out.push(Group::Single(Node::Expression(&statement.test)));
                out.push(Group::Single(Node::Statement(&statement.consequent)));
                if let Some(alternate) = &statement.alternate {
                    out.push(Group::Single(Node::Statement(alternate)));
                }
            }
            Statement::Import(_)
            | Statement::ExportList(_)
            | Statement::Empty(_)
            | Statement::Opaque(_)
            | Statement::Graft(_) => {}
        }
    }

    fn expression_groups<'n>(&self, expression: &'n Expression, out: &mut Vec<Group<'n>>) {
        let mut single = |e: &'n Expression| out.push(Group::Single(Node::Expression(e)));
        match expression {
            Expression::Template(template) => template.expressions.iter().for_each(single),
            Expression::TaggedTemplate(tagged) => {
                single(&tagged.tag);
                tagged.quasi.expressions.iter().for_each(single);
            }
            Expression::Member(member) => {
                single(&member.object);
                if let MemberProperty::Computed(property) = &member.property {
                    single(property);
                }
            }
            Expression::Unary(unary) => single(&unary.argument),
            Expression::Update(update) => single(&update.argument),
            Expression::Binary(binary) => {
                single(&binary.left);
                single(&binary.right);
            }
            Expression::Conditional(conditional) => {
                single(&conditional.test);
                single(&conditional.consequent);
                single(&conditional.alternate);
            }
            Expression::Assignment(assignment) => {
                single(&assignment.target);
                single(&assignment.value);
            }
            Expression::Sequence(sequence) => sequence.expressions.iter().for_each(single),
            Expression::Paren(paren) => single(&paren.expression),
            Expression::Yield(expr) => {
                if let Some(argument) = &expr.argument {
                    single(argument);
                }
            }
            Expression::TsAs(expr) => single(&expr.expression),
            Expression::NonNull(expr) => single(&expr.expression),
            Expression::Spread(spread) => single(&spread.argument),
            Expression::Array(array) => out.push(Group::List {
                items: array.elements.iter().map(Node::Expression).collect(),
                inner: inner_of(array.span),
                layout: Layout::Commas {
                    empty: EmptyFill::Bare,
                },
            }),
            Expression::Object(object) => out.push(Group::List {
                items: object.properties.iter().map(Node::ObjectMember).collect(),
                inner: inner_of(object.span),
                layout: Layout::Commas {
                    empty: if self.closes_inline_parent(object.span.end) {
                        EmptyFill::Padded
                    } else {
                        EmptyFill::Multiline
                    },
                },
            }),
            Expression::Call(call) | Expression::New(call) => {
                out.push(Group::Single(Node::Expression(&call.callee)));
                match call.arguments_span {
                    Some(span) => out.push(Group::List {
                        items: call.arguments.iter().map(Node::Expression).collect(),
                        inner: inner_of(span),
                        layout: Layout::Commas {
                            empty: EmptyFill::Bare,
                        },
                    }),
                    None => out.extend(
                        call.arguments
                            .iter()
                            .map(|a| Group::Single(Node::Expression(a))),
                    ),
                }
            }
            Expression::Function(function) => function_groups(function, out),
            Expression::Arrow(arrow) => match &arrow.body {
                ArrowBody::Expression(body) => single(body),
                ArrowBody::Block(block) => out.push(Group::Single(Node::Block(block))),
            },
            Expression::Class(class) => out.push(Group::Single(Node::ClassBody(&class.body))),
            Expression::JsxElement(element) => self.jsx_element_groups(element, out),
            Expression::JsxFragment(fragment) => fragment_groups(fragment, out),
            Expression::Identifier(_)
            | Expression::Literal(_)
            | Expression::Elision(_)
            | Expression::Graft(_) => {}
        }
    }

    fn jsx_element_groups<'n>(&self, element: &'n JsxElement, out: &mut Vec<Group<'n>>) {
        let opening = element.opening.span;
        let name_end = self
            .source
            .get(opening.start..opening.end)
            .and_then(|text| text.find(&element.opening.name))
            .map_or(opening.start + 1, |i| {
                opening.start + i + element.opening.name.len()
            });

        out.push(Group::List {
            items: element
                .opening
                .attributes
                .iter()
                .map(Node::JsxAttribute)
                .collect(),
            inner: name_end..name_end,
            layout: Layout::Spaced,
        });

        if let Some(closing) = element.closing {
            out.push(Group::List {
                items: element.children.iter().map(Node::JsxChild).collect(),
                inner: opening.end..closing.start,
                layout: Layout::Inline,
            });
        }
    }

    // Fresh printing

    fn print_fresh(&self, node: Node, indent: &str) -> String {
        match node {
            Node::Program(program) => {
                let mut out = program
                    .body
                    .iter()
                    .map(|s| self.print(Node::Statement(s), ""))
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push('\n');
                out
            }
            Node::Statement(statement) => self.fresh_statement(statement, indent),
            Node::Expression(expression) => self.fresh_expression(expression, indent),
            Node::Block(block) => self.fresh_block(block, indent),
            Node::ClassBody(body) => {
                let nested = self.nested(indent);
                let members: Vec<String> = body
                    .members
                    .iter()
                    .map(|m| self.print(Node::ClassMember(m), &nested))
                    .collect();
                self.braced_lines(&members, indent)
            }
            Node::ClassMember(member) => self.fresh_class_member(member, indent),
            Node::Declarator(declarator) => self.fresh_declarator(declarator, indent),
            Node::ObjectMember(member) => self.fresh_object_member(member, indent),
            Node::JsxChild(child) => match child {
                JsxChild::Text(text) => text.raw.clone(),
                JsxChild::Container(container) => self.fresh_container(container, indent),
                JsxChild::Element(element) => self.fresh_jsx_element(element, indent),
                JsxChild::Fragment(fragment) => self.fresh_jsx_fragment(fragment, indent),
            },
            Node::JsxAttribute(attribute) => self.fresh_jsx_attribute(attribute, indent),
        }
    }

    fn fresh_statement(&self, statement: &Statement, indent: &str) -> String {
        let semi = self.semi();
        match statement {
            Statement::Import(import) => {
                let mut clauses = Vec::new();
                if let Some(default) = &import.default {
                    clauses.push(default.name.clone());
                }
                if let Some(namespace) = &import.namespace {
                    clauses.push(format!("* as {}", namespace.name));
                }
                if !import.specifiers.is_empty() {
                    let specifiers: Vec<String> =
                        import.specifiers.iter().map(print_import_specifier).collect();
                    clauses.push(format!("{{ {} }}", specifiers.join(", ")));
                }

                let type_prefix = if import.type_only { "type " } else { "" };
                if clauses.is_empty() {
                    format!("import {}{}", import.source.raw, semi)
                } else {
                    format!(
                        "import {}{} from {}{}",
                        type_prefix,
                        clauses.join(", "),
                        import.source.raw,
                        semi
                    )
                }
            }
            Statement::ExportDefault(export) => format!(
                "export default {}{}",
                self.print(Node::Expression(&export.expression), indent),
                semi
            ),
            Statement::ExportNamed(export) => format!(
                "export {}",
                self.print(Node::Statement(&export.declaration), indent)
            ),
            Statement::ExportList(export) => match &export.source {
                Some(source) => format!("export {} from {}{}", export.clause, source.raw, semi),
                None => format!("export {}{}", export.clause, semi),
            },
            Statement::Variable(variable) => {
                let declarations: Vec<String> = variable
                    .declarations
                    .iter()
                    .map(|d| self.print(Node::Declarator(d), indent))
                    .collect();
                format!("{} {}{}", variable.kind, declarations.join(", "), semi)
            }
            Statement::Function(function) => self.fresh_function(function, indent),
            Statement::Class(class) => self.fresh_class(class, indent),
            Statement::Expression(statement) => format!(
                "{}{}",
                self.print(Node::Expression(&statement.expression), indent),
                semi
            ),
            Statement::Block(block) => self.print(Node::Block(block), indent),
            Statement::Return(ret) => match &ret.argument {
                Some(argument) => format!(
                    "return {}{}",
                    self.print(Node::Expression(argument), indent),
                    semi
                ),
                None => format!("return{}", semi),
            },
            Statement::If(statement) => {
                let mut out = format!(
                    "if ({}) {}",
                    self.print(Node::Expression(&statement.test), indent),
                    self.print(Node::Statement(&statement.consequent), indent)
                );
                if let Some(alternate) = &statement.alternate {
                    out.push_str(" else ");
                    out.push_str(&self.print(Node::Statement(alternate), indent));
                }
                out
            }
            Statement::Empty(_) => ";".to_string(),
            Statement::Opaque(opaque) => opaque.text.clone(),
            Statement::Graft(_) => self.print(Node::Statement(statement), indent),
        }
    }

    fn fresh_expression(&self, expression: &Expression, indent: &str) -> String {
        let print = |e: &Expression| self.print(Node::Expression(e), indent);
        match expression {
            Expression::Identifier(identifier) => identifier.name.clone(),
            Expression::Literal(literal) => literal.raw.clone(),
            Expression::Template(template) => self.fresh_template(template, indent),
            Expression::TaggedTemplate(tagged) => format!(
                "{}{}{}",
                print(&tagged.tag),
                tagged.type_arguments.as_deref().unwrap_or_default(),
                self.fresh_template(&tagged.quasi, indent)
            ),
            Expression::Array(array) => {
                let elements: Vec<String> = array.elements.iter().map(print).collect();
                format!("[{}]", elements.join(", "))
            }
            Expression::Object(object) => {
                if object.properties.is_empty() {
                    return "{}".to_string();
                }
                let nested = self.nested(indent);
                let members: Vec<String> = object
                    .properties
                    .iter()
                    .map(|m| self.print(Node::ObjectMember(m), &nested))
                    .collect();
                format!(
                    "{{\n{}{}\n{}}}",
                    nested,
                    members.join(format!(",\n{}", nested).as_str()),
                    indent
                )
            }
            Expression::Function(function) => self.fresh_function(function, indent),
            Expression::Arrow(arrow) => {
                let body = match &arrow.body {
                    ArrowBody::Expression(body) => print(body),
                    ArrowBody::Block(block) => self.print(Node::Block(block), indent),
                };
                format!(
                    "{}{}{}{} => {}",
                    if arrow.is_async { "async " } else { "" },
                    arrow.type_parameters.as_deref().unwrap_or_default(),
                    arrow.params,
                    return_type(&arrow.return_type),
                    body
                )
            }
            Expression::Class(class) => self.fresh_class(class, indent),
            Expression::Member(member) => {
                let object = print(&member.object);
                let dot = if member.optional { "?." } else { "." };
                match &member.property {
                    MemberProperty::Identifier(name) | MemberProperty::Private(name) => {
                        format!("{}{}{}", object, dot, name.name)
                    }
                    MemberProperty::Computed(property) => {
                        let dot = if member.optional { "?." } else { "" };
                        format!("{}{}[{}]", object, dot, print(property))
                    }
                }
            }
            Expression::Call(call) => {
                let arguments: Vec<String> = call.arguments.iter().map(print).collect();
                format!(
                    "{}{}{}({})",
                    print(&call.callee),
                    if call.optional { "?." } else { "" },
                    call.type_arguments.as_deref().unwrap_or_default(),
                    arguments.join(", ")
                )
            }
            Expression::New(call) => {
                let arguments: Vec<String> = call.arguments.iter().map(print).collect();
                format!(
                    "new {}{}({})",
                    print(&call.callee),
                    call.type_arguments.as_deref().unwrap_or_default(),
                    arguments.join(", ")
                )
            }
            Expression::Unary(unary) => {
                let space = if unary.operator.chars().all(char::is_alphabetic) {
                    " "
                } else {
                    ""
                };
                format!("{}{}{}", unary.operator, space, print(&unary.argument))
            }
            Expression::Update(update) => {
                if update.prefix {
                    format!("{}{}", update.operator, print(&update.argument))
                } else {
                    format!("{}{}", print(&update.argument), update.operator)
                }
            }
            Expression::Binary(binary) => format!(
                "{} {} {}",
                print(&binary.left),
                binary.operator,
                print(&binary.right)
            ),
            Expression::Conditional(conditional) => format!(
                "{} ? {} : {}",
                print(&conditional.test),
                print(&conditional.consequent),
                print(&conditional.alternate)
            ),
            Expression::Assignment(assignment) => format!(
                "{} {} {}",
                print(&assignment.target),
                assignment.operator,
                print(&assignment.value)
            ),
            Expression::Sequence(sequence) => sequence
                .expressions
                .iter()
                .map(print)
                .collect::<Vec<_>>()
                .join(", "),
            Expression::Paren(paren) => format!("({})", print(&paren.expression)),
            Expression::Yield(expr) => {
                let star = if expr.delegate { "*" } else { "" };
                match &expr.argument {
                    Some(argument) => format!("yield{} {}", star, print(argument)),
                    None => format!("yield{}", star),
                }
            }
            Expression::TsAs(expr) => format!(
                "{} {} {}",
                print(&expr.expression),
                expr.operator,
                expr.type_annotation
            ),
            Expression::NonNull(expr) => format!("{}!", print(&expr.expression)),
            Expression::Spread(spread) => format!("...{}", print(&spread.argument)),
            Expression::Elision(_) => String::new(),
            Expression::JsxElement(element) => self.fresh_jsx_element(element, indent),
            Expression::JsxFragment(fragment) => self.fresh_jsx_fragment(fragment, indent),
            Expression::Graft(_) => self.print(Node::Expression(expression), indent),
        }
    }

    fn fresh_template(&self, template: &Template, indent: &str) -> String {
        let mut out = String::from("`");
        for (i, quasi) in template.quasis.iter().enumerate() {
            out.push_str(quasi);
            if let Some(expression) = template.expressions.get(i) {
                out.push_str("${");
                out.push_str(&self.print(Node::Expression(expression), indent));
                out.push('}');
            }
        }
        out.push('`');
        out
    }

    fn fresh_function(&self, function: &Function, indent: &str) -> String {
        let mut out = String::new();
        if function.is_async {
            out.push_str("async ");
        }
        out.push_str("function");
        if function.is_generator {
            out.push('*');
        }
        if let Some(id) = &function.id {
            out.push(' ');
            out.push_str(&id.name);
        }
        out.push_str(&self.fresh_signature(function, indent));
        out
    }

    /// Type parameters, parameters, return type and body
    fn fresh_signature(&self, function: &Function, indent: &str) -> String {
        let body = match &function.body {
            Some(body) => format!(" {}", self.print(Node::Block(body), indent)),
            None => self.semi().to_string(),
        };
        format!(
            "{}{}{}{}",
            function.type_parameters.as_deref().unwrap_or_default(),
            function.params,
            return_type(&function.return_type),
            body
        )
    }

    fn fresh_class(&self, class: &Class, indent: &str) -> String {
        let mut out = String::from("class");
        if let Some(id) = &class.id {
            out.push(' ');
            out.push_str(&id.name);
        }
        let heritage = class.heritage.trim();
        if !heritage.is_empty() {
            out.push(' ');
            out.push_str(heritage);
        }
        out.push(' ');
        out.push_str(&self.print(Node::ClassBody(&class.body), indent));
        out
    }

    fn fresh_block(&self, block: &BlockStatement, indent: &str) -> String {
        let nested = self.nested(indent);
        let statements: Vec<String> = block
            .body
            .iter()
            .map(|s| self.print(Node::Statement(s), &nested))
            .collect();
        self.braced_lines(&statements, indent)
    }

    fn braced_lines(&self, lines: &[String], indent: &str) -> String {
        if lines.is_empty() {
            return "{}".to_string();
        }
        let nested = self.nested(indent);
        format!(
            "{{\n{}{}\n{}}}",
            nested,
            lines.join(format!("\n{}", nested).as_str()),
            indent
        )
    }

    fn fresh_class_member(&self, member: &ClassMember, indent: &str) -> String {
        match member {
            ClassMember::Method(method) => format!(
                "{}{}{}",
                modifiers(&method.modifiers),
                method_prefix(method.kind, &method.value),
                self.fresh_method_rest(&method.key, &method.value, indent)
            ),
            ClassMember::Field(field) => {
                let mut out = modifiers(&field.modifiers);
                out.push_str(&self.print_key(&field.key, indent));
                out.push_str(&return_type(&field.type_annotation));
                if let Some(value) = &field.value {
                    out.push_str(" = ");
                    out.push_str(&self.print(Node::Expression(value), indent));
                }
                out.push_str(self.semi());
                out
            }
            ClassMember::StaticBlock(block) => {
                format!("static {}", self.print(Node::Block(&block.body), indent))
            }
            ClassMember::Signature(span) => self.slice(*span),
        }
    }

    fn fresh_method_rest(&self, key: &PropertyKey, function: &Function, indent: &str) -> String {
        format!(
            "{}{}",
            self.print_key(key, indent),
            self.fresh_signature(function, indent)
        )
    }

    fn fresh_declarator(&self, declarator: &VariableDeclarator, indent: &str) -> String {
        let mut out = declarator.id.clone();
        out.push_str(&return_type(&declarator.type_annotation));
        if let Some(init) = &declarator.init {
            out.push_str(" = ");
            out.push_str(&self.print(Node::Expression(init), indent));
        }
        out
    }

    fn fresh_object_member(&self, member: &ObjectMember, indent: &str) -> String {
        let property = match member {
            ObjectMember::Spread(spread) => {
                return format!("...{}", self.print(Node::Expression(&spread.argument), indent))
            }
            ObjectMember::Property(property) => property,
        };
        let key = self.print_key(&property.key, indent);

        match (property.kind, &property.value) {
            (PropertyKind::Method | PropertyKind::Get | PropertyKind::Set, Expression::Function(f)) => {
                format!(
                    "{}{}",
                    method_prefix(property.kind, f),
                    self.fresh_method_rest(&property.key, f, indent)
                )
            }
            (PropertyKind::Shorthand, Expression::Identifier(value)) if value.name == key => key,
            (PropertyKind::Shorthand, Expression::Assignment(assignment))
                if matches!(assignment.target.as_ref(), Expression::Identifier(t) if t.name == key) =>
            {
                format!(
                    "{} = {}",
                    key,
                    self.print(Node::Expression(&assignment.value), indent)
                )
            }
            (_, value) => format!("{}: {}", key, self.print(Node::Expression(value), indent)),
        }
    }

    fn print_key(&self, key: &PropertyKey, indent: &str) -> String {
        match key {
            PropertyKey::Identifier(identifier) | PropertyKey::Private(identifier) => {
                identifier.name.clone()
            }
            PropertyKey::Literal(literal) => literal.raw.clone(),
            PropertyKey::Computed(expression) => {
                format!("[{}]", self.print(Node::Expression(expression), indent))
            }
        }
    }

    fn fresh_jsx_element(&self, element: &JsxElement, indent: &str) -> String {
        let mut out = format!("<{}", element.opening.name);
        for attribute in &element.opening.attributes {
            out.push(' ');
            out.push_str(&self.print(Node::JsxAttribute(attribute), indent));
        }

        if element.children.is_empty() && (element.opening.self_closing || element.closing.is_none()) {
            out.push_str(" />");
            return out;
        }

        out.push('>');
        for child in &element.children {
            out.push_str(&self.print(Node::JsxChild(child), indent));
        }
        out.push_str(&format!("</{}>", element.opening.name));
        out
    }

    fn fresh_jsx_fragment(&self, fragment: &JsxFragment, indent: &str) -> String {
        let children: String = fragment
            .children
            .iter()
            .map(|child| self.print(Node::JsxChild(child), indent))
            .collect();
        format!("<>{}</>", children)
    }

    fn fresh_jsx_attribute(&self, attribute: &JsxAttribute, indent: &str) -> String {
        match attribute {
            JsxAttribute::Spread(spread) => format!(
                "{{...{}}}",
                self.print(Node::Expression(&spread.argument), indent)
            ),
            JsxAttribute::Attribute(named) => match &named.value {
                None => named.name.clone(),
                Some(JsxAttributeValue::String(literal)) => {
                    format!("{}={}", named.name, literal.raw)
                }
                Some(JsxAttributeValue::Container(container)) => format!(
                    "{}={}",
                    named.name,
                    self.fresh_container(container, indent)
                ),
                Some(JsxAttributeValue::Element(element)) => format!(
                    "{}={}",
                    named.name,
                    self.print(Node::Expression(element), indent)
                ),
            },
        }
    }

    fn fresh_container(&self, container: &JsxExpressionContainer, indent: &str) -> String {
        match &container.expression {
            Some(expression) => format!("{{{}}}", self.print(Node::Expression(expression), indent)),
            None => "{}".to_string(),
        }
    }

    fn nested(&self, indent: &str) -> String {
        format!("{}{}", indent, self.indent_unit)
    }
}

fn block_group(block: &BlockStatement) -> Group<'_> {
    Group::List {
        items: block.body.iter().map(Node::Statement).collect(),
        inner: inner_of(block.span),
        layout: Layout::Lines { top_level: false },
    }
}

fn function_groups<'n>(function: &'n Function, out: &mut Vec<Group<'n>>) {
    if let Some(body) = &function.body {
        out.push(Group::Single(Node::Block(body)));
    }
}

fn key_groups<'n>(key: &'n PropertyKey, out: &mut Vec<Group<'n>>) {
    if let PropertyKey::Computed(expression) = key {
        out.push(Group::Single(Node::Expression(expression)));
    }
}

fn container_groups<'n>(container: &'n JsxExpressionContainer, out: &mut Vec<Group<'n>>) {
    if let Some(expression) = &container.expression {
        out.push(Group::Single(Node::Expression(expression)));
    }
}

fn fragment_groups<'n>(fragment: &'n JsxFragment, out: &mut Vec<Group<'n>>) {
    out.push(Group::List {
        items: fragment.children.iter().map(Node::JsxChild).collect(),
        inner: fragment.opening.end..fragment.closing.start,
        layout: Layout::Inline,
    });
}

/// Range between a node's opening and closing delimiter
fn inner_of(span: Span) -> Range<usize> {
    let start = (span.start + 1).min(span.end);
    let end = span.end.saturating_sub(1).max(start);
    start..end
}

fn return_type(annotation: &Option<String>) -> String {
    annotation
        .as_ref()
        .map(|t| format!(": {}", t))
        .unwrap_or_default()
}

fn modifiers(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        String::new()
    } else {
        format!("{} ", raw)
    }
}

fn method_prefix(kind: PropertyKind, function: &Function) -> String {
    let mut out = String::new();
    match kind {
        PropertyKind::Get => out.push_str("get "),
        PropertyKind::Set => out.push_str("set "),
        _ => {}
    }
    if function.is_async {
        out.push_str("async ");
    }
    if function.is_generator {
        out.push('*');
    }
    out
}

fn print_import_specifier(specifier: &ImportSpecifier) -> String {
    let type_prefix = if specifier.type_only { "type " } else { "" };
    if specifier.imported == specifier.local.name {
        format!("{}{}", type_prefix, specifier.imported)
    } else {
        format!(
            "{}{} as {}",
            type_prefix, specifier.imported, specifier.local.name
        )
    }
}

/// Indentation step used by the source, two spaces when nothing is indented
fn detect_indent_unit(source: &str) -> String {
    for line in source.lines() {
        if line.starts_with('\t') {
            return "\t".to_string();
        }
        let spaces = line.len() - line.trim_start_matches(' ').len();
        let rest = line.trim_start();
        if spaces > 0 && !rest.is_empty() && !rest.starts_with('*') {
            return " ".repeat(spaces);
        }
    }
    "  ".to_string()
}

/// Print a program parsed from `source`, reusing its text wherever nodes are unchanged
pub fn print(source: &str, program: &Program) -> String {
    LosslessSerializer::new(source).serialize(program)
}
