use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{lex_at, Lexeme, Token};

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

const CLASS_MODIFIERS: &[&str] = &[
    "static",
    "public",
    "private",
    "protected",
    "readonly",
    "abstract",
    "override",
    "declare",
    "accessor",
];

const TYPE_PREFIXES: &[&str] = &[
    "keyof", "typeof", "readonly", "unique", "infer", "asserts", "new", "abstract",
];

/// Parser for JavaScript/TypeScript modules with JSX
///
/// Tokens are lexed on demand from the current offset, which lets the parser
/// switch to raw character scanning for template literals, regular
/// expressions and JSX, and rewind cheaply when speculating.
pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
    lookahead: Option<(usize, Lexeme)>,
}

struct ArrowHead {
    type_parameters: Option<String>,
    params: String,
    return_type: Option<String>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            lookahead: None,
        }
    }

    /// Parse a complete module
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.peek()?.is_eof() {
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            body,
            span: Span::new(0, self.source.len()),
        })
    }

    /// Parse exactly one expression followed by end of input
    pub fn parse_standalone_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_expression()?;
        let next = self.peek()?;
        if !next.is_eof() {
            return Err(self.unexpected(next, "end of input"));
        }
        Ok(expression)
    }

    // Statements

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let next = self.peek()?;
        let start = next.start;
        match next.token {
            Some(Token::LBrace) => return Ok(Statement::Block(self.parse_block()?)),
            Some(Token::Semicolon) => {
                self.advance()?;
                return Ok(Statement::Empty(self.span_from(start)));
            }
            Some(Token::At) => return Ok(Statement::Class(self.parse_class()?)),
            Some(Token::Ident) => {}
            _ => return self.parse_expression_statement(),
        }

        let ahead = self.peek_ahead()?;
        let ahead_text = self.text(&ahead);
        let same_line = !ahead.newline_before;
        match self.text(&next) {
            "import" if !matches!(ahead.token, Some(Token::LParen | Token::Dot)) => {
                self.parse_import()
            }
            "export" => self.parse_export(),
            "const" if ahead_text == "enum" => self.parse_ts_declaration(),
            "var" | "const" => Ok(Statement::Variable(self.parse_variable()?)),
            "let" if matches!(
                ahead.token,
                Some(Token::Ident | Token::LBrace | Token::LBracket)
            ) =>
            {
                Ok(Statement::Variable(self.parse_variable()?))
            }
            "function" => Ok(Statement::Function(self.parse_function()?)),
            "async" if ahead_text == "function" && same_line => {
                Ok(Statement::Function(self.parse_function()?))
            }
            "class" => Ok(Statement::Class(self.parse_class()?)),
            "abstract" if ahead_text == "class" => Ok(Statement::Class(self.parse_class()?)),
            "if" => self.parse_if(),
            "return" => self.parse_return(),
            "for" | "while" | "do" | "switch" | "try" | "throw" | "break" | "continue"
            | "debugger" | "with" => self.parse_control(),
            "type" if ahead.is(Token::Ident) && same_line => self.parse_ts_declaration(),
            "interface" | "enum" | "namespace" | "module" | "declare"
                if matches!(ahead.token, Some(Token::Ident | Token::String)) && same_line =>
            {
                self.parse_ts_declaration()
            }
            "global" if ahead.is(Token::LBrace) => self.parse_ts_declaration(),
            _ if ahead.is(Token::Colon) => {
                self.advance()?;
                self.advance()?;
                self.parse_statement()?;
                Ok(self.opaque("label", start))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.peek()?.start;
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            span: self.span_from(start),
        }))
    }

    fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        let start = self.expect("{")?.start;
        let mut body = Vec::new();
        while !self.check("}")? {
            body.push(self.parse_statement()?);
        }
        self.expect("}")?;
        Ok(BlockStatement {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_import(&mut self) -> ParseResult<Statement> {
        let start = self.expect("import")?.start;

        if self.check_token(Token::String)? {
            let source = self.parse_string_literal()?;
            self.skip_import_attributes()?;
            self.consume_semicolon()?;
            return Ok(Statement::Import(ImportDeclaration {
                type_only: false,
                default: None,
                namespace: None,
                specifiers: Vec::new(),
                source,
                span: self.span_from(start),
            }));
        }

        let mut type_only = false;
        if self.check("type")? {
            let ahead = self.peek_ahead()?;
            let marks_type = match ahead.token {
                Some(Token::LBrace | Token::Star) => true,
                Some(Token::Ident) => self.text(&ahead) != "from",
                _ => false,
            };
            if marks_type {
                self.advance()?;
                type_only = true;
            }
        }

        let mut default = None;
        let mut namespace = None;
        let mut specifiers = Vec::new();

        let mut needs_clause = true;
        if self.check_token(Token::Ident)? {
            default = Some(self.expect_ident()?);
            if self.match_token("=")? {
                // import x = require('y')
                self.parse_expression()?;
                self.consume_semicolon()?;
                return Ok(self.opaque("import", start));
            }
            needs_clause = self.match_token(",")?;
        }

        if needs_clause {
            if self.match_token("*")? {
                self.expect("as")?;
                namespace = Some(self.expect_ident()?);
            } else {
                specifiers = self.parse_import_specifiers()?;
            }
        }

        self.expect("from")?;
        let source = self.parse_string_literal()?;
        self.skip_import_attributes()?;
        self.consume_semicolon()?;

        Ok(Statement::Import(ImportDeclaration {
            type_only,
            default,
            namespace,
            specifiers,
            source,
            span: self.span_from(start),
        }))
    }

    fn parse_import_specifiers(&mut self) -> ParseResult<Vec<ImportSpecifier>> {
        self.expect("{")?;
        let mut specifiers = Vec::new();
        while !self.check("}")? {
            let start = self.peek()?.start;

            let mut type_only = false;
            if self.check("type")? {
                let ahead = self.peek_ahead()?;
                if matches!(ahead.token, Some(Token::Ident | Token::String))
                    && self.text(&ahead) != "as"
                {
                    self.advance()?;
                    type_only = true;
                }
            }

            let imported_lexeme = self.peek()?;
            let imported = match imported_lexeme.token {
                Some(Token::Ident) => self.text(&imported_lexeme).to_string(),
                Some(Token::String) => self
                    .literal(&imported_lexeme)
                    .string_value()
                    .unwrap_or_default(),
                _ => return Err(self.unexpected(imported_lexeme, "import specifier")),
            };
            self.advance()?;

            let local = if self.match_token("as")? {
                self.expect_ident()?
            } else {
                Identifier {
                    name: imported.clone(),
                    span: Span::new(imported_lexeme.start, imported_lexeme.end),
                }
            };

            specifiers.push(ImportSpecifier {
                imported,
                local,
                type_only,
                span: self.span_from(start),
            });

            if !self.match_token(",")? {
                break;
            }
        }
        self.expect("}")?;
        Ok(specifiers)
    }

    fn skip_import_attributes(&mut self) -> ParseResult<()> {
        let next = self.peek()?;
        let text = self.text(&next);
        if next.is(Token::Ident) && !next.newline_before && (text == "with" || text == "assert") {
            self.advance()?;
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn parse_export(&mut self) -> ParseResult<Statement> {
        let start = self.expect("export")?.start;
        let next = self.peek()?;
        let ahead = self.peek_ahead()?;

        match (next.token, self.text(&next)) {
            (Some(Token::Ident), "default") => {
                self.advance()?;
                self.parse_export_default(start)
            }
            (Some(Token::LBrace | Token::Star), _) => self.parse_export_list(start),
            (Some(Token::Ident), "type") if ahead.is(Token::LBrace) || ahead.is(Token::Star) => {
                self.parse_export_list(start)
            }
            (Some(Token::Eq), _) => {
                self.advance()?;
                self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(self.opaque("export", start))
            }
            (Some(Token::Ident), "as") => {
                // export as namespace Foo
                self.advance()?;
                self.expect("namespace")?;
                self.expect_ident()?;
                self.consume_semicolon()?;
                Ok(self.opaque("export", start))
            }
            _ => {
                let declaration = self.parse_statement()?;
                match declaration {
                    Statement::Variable(_)
                    | Statement::Function(_)
                    | Statement::Class(_)
                    | Statement::Opaque(_) => {}
                    _ => {
                        return Err(ParseError::invalid_syntax(
                            next.start,
                            "expected a declaration after 'export'",
                        ))
                    }
                }
                Ok(Statement::ExportNamed(ExportNamedDeclaration {
                    declaration: Box::new(declaration),
                    span: self.span_from(start),
                }))
            }
        }
    }

    fn parse_export_default(&mut self, start: usize) -> ParseResult<Statement> {
        let next = self.peek()?;
        let ahead = self.peek_ahead()?;
        let text = self.text(&next);
        let ahead_text = self.text(&ahead);

        if text == "interface" && ahead.is(Token::Ident) {
            self.parse_ts_declaration()?;
            return Ok(self.opaque("export", start));
        }

        let is_function = text == "function"
            || (text == "async" && ahead_text == "function" && !ahead.newline_before);
        let is_class =
            text == "class" || next.is(Token::At) || (text == "abstract" && ahead_text == "class");

        let expression = if is_function {
            let function = Expression::Function(self.parse_function()?);
            self.match_token(";")?;
            function
        } else if is_class {
            let class = Expression::Class(Box::new(self.parse_class()?));
            self.match_token(";")?;
            class
        } else {
            let expression = self.parse_assignment()?;
            self.consume_semicolon()?;
            expression
        };

        Ok(Statement::ExportDefault(ExportDefaultDeclaration {
            expression,
            span: self.span_from(start),
        }))
    }

    fn parse_export_list(&mut self, start: usize) -> ParseResult<Statement> {
        let clause_start = self.peek()?.start;
        self.match_token("type")?;
        if self.match_token("*")? {
            if self.match_token("as")? {
                self.advance()?;
            }
        } else {
            self.skip_balanced()?;
        }
        let clause = self.consumed_since(clause_start);

        let source = if self.match_token("from")? {
            let source = self.parse_string_literal()?;
            self.skip_import_attributes()?;
            Some(source)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(Statement::ExportList(ExportListDeclaration {
            clause,
            source,
            span: self.span_from(start),
        }))
    }

    fn parse_variable(&mut self) -> ParseResult<VariableDeclaration> {
        let kind_lexeme = self.advance()?;
        let kind = self.text(&kind_lexeme).to_string();

        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_declarator()?);
            if !self.match_token(",")? {
                break;
            }
        }
        self.consume_semicolon()?;

        Ok(VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(kind_lexeme.start),
        })
    }

    fn parse_declarator(&mut self) -> ParseResult<VariableDeclarator> {
        let next = self.peek()?;
        let start = next.start;
        match next.token {
            Some(Token::LBrace | Token::LBracket) => self.skip_balanced()?,
            Some(Token::Ident) => {
                self.advance()?;
            }
            _ => return Err(self.unexpected(next, "binding pattern")),
        }

        let bang = self.peek()?;
        if bang.is(Token::Bang) && !bang.newline_before {
            self.advance()?;
        }
        let id = self.consumed_since(start);

        let type_annotation = if self.match_token(":")? {
            Some(self.capture(|p| p.skip_type())?)
        } else {
            None
        };

        let init = if self.match_token("=")? {
            Some(self.parse_assignment()?)
        } else {
            None
        };

        Ok(VariableDeclarator {
            id,
            type_annotation,
            init,
            span: self.span_from(start),
        })
    }

    fn parse_function(&mut self) -> ParseResult<Function> {
        let start = self.peek()?.start;
        let is_async = self.match_token("async")?;
        self.expect("function")?;
        let is_generator = self.match_token("*")?;
        let id = if self.check_token(Token::Ident)? {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.parse_function_rest(start, id, is_async, is_generator)
    }

    /// Type parameters, parameter list, return type and body
    fn parse_function_rest(
        &mut self,
        start: usize,
        id: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
    ) -> ParseResult<Function> {
        let type_parameters = if self.check("<")? {
            Some(self.capture(|p| p.skip_type_args())?)
        } else {
            None
        };

        if !self.check("(")? {
            let next = self.peek()?;
            return Err(self.unexpected(next, "'('"));
        }
        let params = self.capture(|p| p.skip_balanced())?;

        let return_type = if self.match_token(":")? {
            Some(self.capture(|p| p.skip_type())?)
        } else {
            None
        };

        let body = if self.check("{")? {
            Some(self.parse_block()?)
        } else {
            self.consume_semicolon()?;
            None
        };

        Ok(Function {
            id,
            is_async,
            is_generator,
            type_parameters,
            params,
            return_type,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class(&mut self) -> ParseResult<Class> {
        let start = self.peek()?.start;
        self.skip_decorators()?;
        self.match_token("abstract")?;
        self.expect("class")?;

        let id = if self.check_token(Token::Ident)?
            && !self.check("extends")?
            && !self.check("implements")?
        {
            Some(self.expect_ident()?)
        } else {
            None
        };

        let heritage_start = self.pos;
        while !self.check("{")? {
            let next = self.peek()?;
            match next.token {
                None => return Err(ParseError::unexpected_eof(next.start)),
                Some(Token::LParen | Token::LBracket) => self.skip_balanced()?,
                Some(Token::Lt) => self.skip_type_args()?,
                _ => {
                    self.advance()?;
                }
            }
        }
        let heritage = self.consumed_since(heritage_start);
        let body = self.parse_class_body()?;

        Ok(Class {
            id,
            heritage,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_body(&mut self) -> ParseResult<ClassBody> {
        let start = self.expect("{")?.start;
        let mut members = Vec::new();
        loop {
            if self.check("}")? {
                break;
            }
            if self.match_token(";")? {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.expect("}")?;
        Ok(ClassBody {
            members,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.peek()?.start;
        self.skip_decorators()?;

        if self.check("static")? && self.peek_ahead()?.is(Token::LBrace) {
            self.advance()?;
            let body = self.parse_block()?;
            return Ok(ClassMember::StaticBlock(ClassStaticBlock {
                body,
                span: self.span_from(start),
            }));
        }

        loop {
            let next = self.peek()?;
            if !next.is(Token::Ident) || !CLASS_MODIFIERS.contains(&self.text(&next)) {
                break;
            }
            let ahead = self.peek_ahead()?;
            if is_member_name_start(&ahead) && !ahead.newline_before {
                self.advance()?;
            } else {
                break;
            }
        }
        let modifiers = self.consumed_since(start);

        let (kind, is_async, is_generator) = self.parse_method_prefix()?;

        // Index signature: [key: string]: T
        if self.check("[")? {
            let ahead = self.peek_ahead()?;
            let after = self.lex_after(&ahead)?;
            if ahead.is(Token::Ident) && after.is(Token::Colon) {
                self.skip_balanced()?;
                self.match_token("?")?;
                if self.match_token(":")? {
                    self.skip_type()?;
                }
                self.consume_semicolon()?;
                return Ok(ClassMember::Signature(self.span_from(start)));
            }
        }

        let key = self.parse_property_key()?;

        if self.check("?")? {
            self.advance()?;
        }

        if self.check("(")? || self.check("<")? {
            let value_start = self.peek()?.start;
            let value = self.parse_function_rest(value_start, None, is_async, is_generator)?;
            return Ok(ClassMember::Method(ClassMethod {
                modifiers,
                kind,
                key,
                value,
                span: self.span_from(start),
            }));
        }

        let bang = self.peek()?;
        if bang.is(Token::Bang) && !bang.newline_before {
            self.advance()?;
        }

        let type_annotation = if self.match_token(":")? {
            Some(self.capture(|p| p.skip_type())?)
        } else {
            None
        };
        let value = if self.match_token("=")? {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(ClassMember::Field(ClassField {
            modifiers,
            key,
            type_annotation,
            value,
            span: self.span_from(start),
        }))
    }

    /// `async`, `*`, `get` and `set` in front of a method name
    fn parse_method_prefix(&mut self) -> ParseResult<(PropertyKind, bool, bool)> {
        let mut kind = PropertyKind::Init;
        let mut is_async = false;

        if self.check("async")? {
            let ahead = self.peek_ahead()?;
            if is_member_name_start(&ahead) && !ahead.newline_before {
                self.advance()?;
                is_async = true;
            }
        }

        let is_generator = self.match_token("*")?;

        if !is_async && !is_generator && (self.check("get")? || self.check("set")?) {
            let ahead = self.peek_ahead()?;
            if is_member_name_start(&ahead) && !ahead.is(Token::Star) {
                let accessor = self.advance()?;
                kind = if self.text(&accessor) == "get" {
                    PropertyKind::Get
                } else {
                    PropertyKind::Set
                };
            }
        }

        if kind == PropertyKind::Init && (is_async || is_generator) {
            kind = PropertyKind::Method;
        }
        Ok((kind, is_async, is_generator))
    }

    fn parse_property_key(&mut self) -> ParseResult<PropertyKey> {
        let next = self.peek()?;
        let span = Span::new(next.start, next.end);
        match next.token {
            Some(Token::Ident) => {
                self.advance()?;
                Ok(PropertyKey::Identifier(Identifier {
                    name: self.text(&next).to_string(),
                    span,
                }))
            }
            Some(Token::PrivateName) => {
                self.advance()?;
                Ok(PropertyKey::Private(Identifier {
                    name: self.text(&next).to_string(),
                    span,
                }))
            }
            Some(Token::String | Token::Number) => {
                self.advance()?;
                Ok(PropertyKey::Literal(self.literal(&next)))
            }
            Some(Token::LBracket) => {
                self.advance()?;
                let expression = self.parse_assignment()?;
                self.expect("]")?;
                Ok(PropertyKey::Computed(Box::new(expression)))
            }
            _ => Err(self.unexpected(next, "property name")),
        }
    }

    fn skip_decorators(&mut self) -> ParseResult<()> {
        while self.check_token(Token::At)? {
            self.advance()?;
            let start = self.peek()?.start;
            let primary = self.parse_primary()?;
            self.parse_postfix(primary, start)?;
        }
        Ok(())
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let start = self.expect("if")?.start;
        self.expect("(")?;
        let test = self.parse_expression()?;
        self.expect(")")?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token("else")? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        }))
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let start = self.expect("return")?.start;
        let next = self.peek()?;
        let argument = if next.is_eof()
            || next.newline_before
            || next.is(Token::Semicolon)
            || next.is(Token::RBrace)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    /// Loops, `switch`, `try` and jumps: parsed for validity, kept as text
    fn parse_control(&mut self) -> ParseResult<Statement> {
        let keyword_lexeme = self.advance()?;
        let keyword = self.text(&keyword_lexeme);
        let start = keyword_lexeme.start;

        match keyword {
            "for" => {
                self.match_token("await")?;
                self.skip_parens()?;
                self.parse_statement()?;
            }
            "while" | "with" => {
                self.skip_parens()?;
                self.parse_statement()?;
            }
            "do" => {
                self.parse_statement()?;
                self.expect("while")?;
                self.skip_parens()?;
                self.match_token(";")?;
            }
            "switch" => {
                self.skip_parens()?;
                self.expect("{")?;
                while !self.match_token("}")? {
                    if self.match_token("case")? {
                        self.parse_expression()?;
                    } else {
                        self.expect("default")?;
                    }
                    self.expect(":")?;
                    while !self.check("case")? && !self.check("default")? && !self.check("}")? {
                        self.parse_statement()?;
                    }
                }
            }
            "try" => {
                self.parse_block()?;
                if self.match_token("catch")? {
                    if self.check("(")? {
                        self.skip_balanced()?;
                    }
                    self.parse_block()?;
                }
                if self.match_token("finally")? {
                    self.parse_block()?;
                }
            }
            "throw" => {
                self.parse_expression()?;
                self.consume_semicolon()?;
            }
            "break" | "continue" => {
                let next = self.peek()?;
                if next.is(Token::Ident) && !next.newline_before {
                    self.advance()?;
                }
                self.consume_semicolon()?;
            }
            _ => self.consume_semicolon()?,
        }

        Ok(self.opaque(keyword, start))
    }

    /// Type aliases, interfaces, enums, namespaces and ambient declarations
    fn parse_ts_declaration(&mut self) -> ParseResult<Statement> {
        let first = self.advance()?;
        let keyword = self.text(&first);

        match keyword {
            "type" => {
                self.expect_ident()?;
                if self.check("<")? {
                    self.skip_type_args()?;
                }
                self.expect("=")?;
                self.skip_type()?;
                self.consume_semicolon()?;
            }
            "interface" => {
                self.expect_ident()?;
                while !self.check("{")? {
                    let next = self.peek()?;
                    match next.token {
                        None => return Err(ParseError::unexpected_eof(next.start)),
                        Some(Token::Lt) => self.skip_type_args()?,
                        _ => {
                            self.advance()?;
                        }
                    }
                }
                self.skip_balanced()?;
            }
            "const" | "enum" => {
                if keyword == "const" {
                    self.expect("enum")?;
                }
                self.expect_ident()?;
                self.skip_balanced()?;
            }
            "declare" => {
                self.parse_statement()?;
            }
            _ => {
                // namespace, module, global
                while !self.check("{")? {
                    let next = self.peek()?;
                    if next.is_eof() || next.is(Token::Semicolon) || next.newline_before {
                        self.consume_semicolon()?;
                        return Ok(self.opaque(keyword, first.start));
                    }
                    self.advance()?;
                }
                self.parse_block()?;
            }
        }

        Ok(self.opaque(keyword, first.start))
    }

    // Expressions

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.peek()?.start;
        let first = self.parse_assignment()?;
        if !self.check(",")? {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.match_token(",")? {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span_from(start),
        }))
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let next = self.peek()?;
        if next.is(Token::Ident) && self.text(&next) == "yield" {
            return self.parse_yield();
        }

        let start = next.start;
        let target = self.parse_conditional()?;

        let operator = self.peek()?;
        let text = self.text(&operator);
        if !operator.is(Token::String) && ASSIGNMENT_OPERATORS.contains(&text) {
            self.advance()?;
            let value = self.parse_assignment()?;
            return Ok(Expression::Assignment(AssignmentExpression {
                operator: text.to_string(),
                target: Box::new(target),
                value: Box::new(value),
                span: self.span_from(start),
            }));
        }

        Ok(target)
    }

    fn try_parse_arrow(&mut self) -> ParseResult<Option<Expression>> {
        let next = self.peek()?;
        let start = next.start;
        let checkpoint = self.pos;

        let mut is_async = false;
        if next.is(Token::Ident) && self.text(&next) == "async" {
            let ahead = self.peek_ahead()?;
            if !ahead.newline_before
                && matches!(ahead.token, Some(Token::Ident | Token::LParen | Token::Lt))
            {
                self.advance()?;
                is_async = true;
            }
        }

        let head = match self.scan_arrow_head() {
            Ok(Some(head)) => head,
            _ => {
                self.pos = checkpoint;
                return Ok(None);
            }
        };

        let body = if self.check("{")? {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment()?))
        };

        Ok(Some(Expression::Arrow(ArrowFunction {
            is_async,
            type_parameters: head.type_parameters,
            params: head.params,
            return_type: head.return_type,
            body,
            span: self.span_from(start),
        })))
    }

    /// Everything up to and including `=>`, or `None` if this is not an arrow
    fn scan_arrow_head(&mut self) -> ParseResult<Option<ArrowHead>> {
        let next = self.peek()?;
        match next.token {
            Some(Token::Ident) => {
                let ahead = self.peek_ahead()?;
                if !ahead.is(Token::Arrow) || ahead.newline_before {
                    return Ok(None);
                }
                self.advance()?;
                self.advance()?;
                Ok(Some(ArrowHead {
                    type_parameters: None,
                    params: self.text(&next).to_string(),
                    return_type: None,
                }))
            }
            Some(Token::LParen | Token::Lt) => {
                let type_parameters = if next.is(Token::Lt) {
                    Some(self.capture(|p| p.skip_type_args())?)
                } else {
                    None
                };
                if !self.check("(")? {
                    return Ok(None);
                }
                let params = self.capture(|p| p.skip_balanced())?;
                let return_type = if self.match_token(":")? {
                    Some(self.capture(|p| p.skip_type())?)
                } else {
                    None
                };

                let arrow = self.peek()?;
                if !arrow.is(Token::Arrow) || arrow.newline_before {
                    return Ok(None);
                }
                self.advance()?;
                Ok(Some(ArrowHead {
                    type_parameters,
                    params,
                    return_type,
                }))
            }
            _ => Ok(None),
        }
    }

    fn parse_yield(&mut self) -> ParseResult<Expression> {
        let start = self.expect("yield")?.start;
        let delegate = self.match_token("*")?;

        let next = self.peek()?;
        let ends = next.is_eof()
            || next.newline_before
            || matches!(
                next.token,
                Some(
                    Token::RParen
                        | Token::RBracket
                        | Token::RBrace
                        | Token::Comma
                        | Token::Semicolon
                        | Token::Colon
                )
            );
        let argument = if ends {
            None
        } else {
            Some(Box::new(self.parse_assignment()?))
        };

        Ok(Expression::Yield(YieldExpression {
            delegate,
            argument,
            span: self.span_from(start),
        }))
    }

    fn parse_conditional(&mut self) -> ParseResult<Expression> {
        let start = self.peek()?.start;
        let test = self.parse_binary(0)?;
        if !self.match_token("?")? {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.span_from(start),
        }))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let start = self.peek()?.start;
        let mut left = self.parse_unary()?;

        loop {
            let next = self.peek()?;
            let text = self.text(&next);

            if next.is(Token::Ident)
                && (text == "as" || text == "satisfies")
                && !next.newline_before
            {
                if RELATIONAL_PRECEDENCE < min_prec {
                    break;
                }
                self.advance()?;
                let type_annotation = self.capture(|p| p.skip_type())?;
                left = Expression::TsAs(TsAsExpression {
                    expression: Box::new(left),
                    operator: text.to_string(),
                    type_annotation,
                    span: self.span_from(start),
                });
                continue;
            }

            let Some(prec) = binary_precedence(next.token, text) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance()?;

            // ** is right-associative
            let next_min = if text == "**" { prec } else { prec + 1 };
            let right = self.parse_binary(next_min)?;
            left = Expression::Binary(BinaryExpression {
                operator: text.to_string(),
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let next = self.peek()?;
        let text = self.text(&next);
        let start = next.start;

        let is_unary = match next.token {
            Some(Token::Bang) => true,
            Some(Token::Operator) => matches!(text, "~" | "+" | "-"),
            Some(Token::Ident) => matches!(text, "typeof" | "void" | "delete" | "await"),
            _ => false,
        };
        if is_unary {
            self.advance()?;
            let argument = self.parse_unary()?;
            return Ok(Expression::Unary(UnaryExpression {
                operator: text.to_string(),
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        if next.is(Token::Operator) && (text == "++" || text == "--") {
            self.advance()?;
            let argument = self.parse_unary()?;
            return Ok(Expression::Update(UpdateExpression {
                operator: text.to_string(),
                prefix: true,
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        let expression = self.parse_lhs()?;

        let next = self.peek()?;
        let text = self.text(&next);
        if next.is(Token::Operator) && !next.newline_before && (text == "++" || text == "--") {
            self.advance()?;
            return Ok(Expression::Update(UpdateExpression {
                operator: text.to_string(),
                prefix: false,
                argument: Box::new(expression),
                span: self.span_from(start),
            }));
        }

        Ok(expression)
    }

    fn parse_lhs(&mut self) -> ParseResult<Expression> {
        let start = self.peek()?.start;
        let expression = if self.check("new")? {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_postfix(expression, start)
    }

    fn parse_new(&mut self) -> ParseResult<Expression> {
        let new = self.expect("new")?;
        let start = new.start;

        if self.match_token(".")? {
            let property = self.expect_ident()?;
            return Ok(Expression::Member(MemberExpression {
                object: Box::new(Expression::Identifier(Identifier {
                    name: "new".to_string(),
                    span: Span::new(new.start, new.end),
                })),
                property: MemberProperty::Identifier(property),
                optional: false,
                span: self.span_from(start),
            }));
        }

        let callee_start = self.peek()?.start;
        let mut callee = if self.check("new")? {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        // Member accesses only; the first argument list belongs to `new`
        loop {
            if self.match_token(".")? {
                let property = self.parse_member_name()?;
                callee = Expression::Member(MemberExpression {
                    object: Box::new(callee),
                    property,
                    optional: false,
                    span: self.span_from(callee_start),
                });
            } else if self.check("[")? {
                callee = self.parse_computed_member(callee, callee_start, false)?;
            } else {
                break;
            }
        }

        let type_arguments = if self.check("<")? {
            self.speculate(|p| {
                let type_arguments = p.capture(|p| p.skip_type_args())?;
                Ok(p.check("(")?.then_some(type_arguments))
            })
        } else {
            None
        };

        let (arguments, arguments_span) = if self.check("(")? {
            let (arguments, span) = self.parse_arguments()?;
            (arguments, Some(span))
        } else {
            (Vec::new(), None)
        };

        Ok(Expression::New(CallExpression {
            callee: Box::new(callee),
            type_arguments,
            arguments,
            arguments_span,
            optional: false,
            span: self.span_from(start),
        }))
    }

    fn parse_postfix(&mut self, expression: Expression, start: usize) -> ParseResult<Expression> {
        let mut expression = expression;

        loop {
            let next = self.peek()?;
            match next.token {
                Some(Token::Dot) => {
                    self.advance()?;
                    let property = self.parse_member_name()?;
                    expression = Expression::Member(MemberExpression {
                        object: Box::new(expression),
                        property,
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                Some(Token::QuestionDot) => {
                    self.advance()?;
                    if self.check("(")? {
                        expression = self.parse_call(expression, start, None, true)?;
                    } else if self.check("[")? {
                        expression = self.parse_computed_member(expression, start, true)?;
                    } else {
                        let property = self.parse_member_name()?;
                        expression = Expression::Member(MemberExpression {
                            object: Box::new(expression),
                            property,
                            optional: true,
                            span: self.span_from(start),
                        });
                    }
                }
                Some(Token::LBracket) => {
                    expression = self.parse_computed_member(expression, start, false)?;
                }
                Some(Token::LParen) => {
                    expression = self.parse_call(expression, start, None, false)?;
                }
                Some(Token::Backtick) => {
                    expression = self.parse_tagged_template(expression, start, None)?;
                }
                Some(Token::Bang) if !next.newline_before => {
                    self.advance()?;
                    expression = Expression::NonNull(NonNullExpression {
                        expression: Box::new(expression),
                        span: self.span_from(start),
                    });
                }
                Some(Token::Lt) => {
                    let type_arguments = self.speculate(|p| {
                        let type_arguments = p.capture(|p| p.skip_type_args())?;
                        let next = p.peek()?;
                        Ok((next.is(Token::LParen) || next.is(Token::Backtick))
                            .then_some(type_arguments))
                    });
                    let Some(type_arguments) = type_arguments else {
                        break;
                    };
                    expression = if self.check("(")? {
                        self.parse_call(expression, start, Some(type_arguments), false)?
                    } else {
                        self.parse_tagged_template(expression, start, Some(type_arguments))?
                    };
                }
                _ => break,
            }
        }

        Ok(expression)
    }

    fn parse_member_name(&mut self) -> ParseResult<MemberProperty> {
        let next = self.peek()?;
        let identifier = Identifier {
            name: self.text(&next).to_string(),
            span: Span::new(next.start, next.end),
        };
        match next.token {
            Some(Token::Ident) => {
                self.advance()?;
                Ok(MemberProperty::Identifier(identifier))
            }
            Some(Token::PrivateName) => {
                self.advance()?;
                Ok(MemberProperty::Private(identifier))
            }
            _ => Err(self.unexpected(next, "property name")),
        }
    }

    fn parse_computed_member(
        &mut self,
        object: Expression,
        start: usize,
        optional: bool,
    ) -> ParseResult<Expression> {
        self.expect("[")?;
        let property = self.parse_expression()?;
        self.expect("]")?;
        Ok(Expression::Member(MemberExpression {
            object: Box::new(object),
            property: MemberProperty::Computed(Box::new(property)),
            optional,
            span: self.span_from(start),
        }))
    }

    fn parse_call(
        &mut self,
        callee: Expression,
        start: usize,
        type_arguments: Option<String>,
        optional: bool,
    ) -> ParseResult<Expression> {
        let (arguments, arguments_span) = self.parse_arguments()?;
        Ok(Expression::Call(CallExpression {
            callee: Box::new(callee),
            type_arguments,
            arguments,
            arguments_span: Some(arguments_span),
            optional,
            span: self.span_from(start),
        }))
    }

    fn parse_arguments(&mut self) -> ParseResult<(Vec<Expression>, Span)> {
        let start = self.expect("(")?.start;
        let mut arguments = Vec::new();
        while !self.check(")")? {
            arguments.push(self.parse_element()?);
            if !self.match_token(",")? {
                break;
            }
        }
        self.expect(")")?;
        Ok((arguments, self.span_from(start)))
    }

    fn parse_tagged_template(
        &mut self,
        tag: Expression,
        start: usize,
        type_arguments: Option<String>,
    ) -> ParseResult<Expression> {
        let backtick = self.advance()?;
        let quasi = self.scan_template(backtick.start)?;
        Ok(Expression::TaggedTemplate(TaggedTemplate {
            tag: Box::new(tag),
            type_arguments,
            quasi,
            span: self.span_from(start),
        }))
    }

    /// Spread or assignment expression, as found in array literals and argument lists
    fn parse_element(&mut self) -> ParseResult<Expression> {
        let start = self.peek()?.start;
        if self.match_token("...")? {
            let argument = self.parse_assignment()?;
            return Ok(Expression::Spread(SpreadElement {
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let next = self.peek()?;
        let start = next.start;

        match next.token {
            None => Err(ParseError::unexpected_eof(start)),
            Some(Token::Ident) => {
                let ahead = self.peek_ahead()?;
                let ahead_text = self.text(&ahead);
                match self.text(&next) {
                    "function" => Ok(Expression::Function(self.parse_function()?)),
                    "async" if ahead_text == "function" && !ahead.newline_before => {
                        Ok(Expression::Function(self.parse_function()?))
                    }
                    "class" => Ok(Expression::Class(Box::new(self.parse_class()?))),
                    "abstract" if ahead_text == "class" => {
                        Ok(Expression::Class(Box::new(self.parse_class()?)))
                    }
                    _ => Ok(Expression::Identifier(self.expect_ident()?)),
                }
            }
            Some(Token::At) => Ok(Expression::Class(Box::new(self.parse_class()?))),
            Some(Token::Number | Token::String) => {
                self.advance()?;
                Ok(Expression::Literal(self.literal(&next)))
            }
            Some(Token::Backtick) => {
                self.advance()?;
                Ok(Expression::Template(self.scan_template(start)?))
            }
            Some(Token::Slash | Token::SlashEq) => Ok(Expression::Literal(self.scan_regex(start)?)),
            Some(Token::LParen) => {
                self.advance()?;
                let expression = self.parse_expression()?;
                self.expect(")")?;
                Ok(Expression::Paren(ParenExpression {
                    expression: Box::new(expression),
                    span: self.span_from(start),
                }))
            }
            Some(Token::LBracket) => self.parse_array(),
            Some(Token::LBrace) => self.parse_object(),
            Some(Token::Lt) => self.parse_jsx(start),
            _ => Err(self.unexpected(next, "expression")),
        }
    }

    fn parse_array(&mut self) -> ParseResult<Expression> {
        let start = self.expect("[")?.start;
        let mut elements = Vec::new();
        loop {
            let next = self.peek()?;
            if next.is(Token::RBracket) {
                break;
            }
            if next.is(Token::Comma) {
                self.advance()?;
                elements.push(Expression::Elision(Span::new(next.start, next.start)));
                continue;
            }
            elements.push(self.parse_element()?);
            if !self.match_token(",")? {
                break;
            }
        }
        self.expect("]")?;
        Ok(Expression::Array(ArrayExpression {
            elements,
            span: self.span_from(start),
        }))
    }

    fn parse_object(&mut self) -> ParseResult<Expression> {
        let start = self.expect("{")?.start;
        let mut properties = Vec::new();
        while !self.check("}")? {
            properties.push(self.parse_object_member()?);
            if !self.match_token(",")? {
                break;
            }
        }
        self.expect("}")?;
        Ok(Expression::Object(ObjectExpression {
            properties,
            span: self.span_from(start),
        }))
    }

    fn parse_object_member(&mut self) -> ParseResult<ObjectMember> {
        let start = self.peek()?.start;

        if self.match_token("...")? {
            let argument = self.parse_assignment()?;
            return Ok(ObjectMember::Spread(SpreadElement {
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        let (kind, is_async, is_generator) = self.parse_method_prefix()?;
        let key = self.parse_property_key()?;

        if self.check("(")? || self.check("<")? {
            let value_start = self.peek()?.start;
            let value = self.parse_function_rest(value_start, None, is_async, is_generator)?;
            let kind = if kind == PropertyKind::Init {
                PropertyKind::Method
            } else {
                kind
            };
            return Ok(ObjectMember::Property(Property {
                key,
                value: Expression::Function(value),
                kind,
                span: self.span_from(start),
            }));
        }

        if self.match_token(":")? {
            let value = self.parse_assignment()?;
            return Ok(ObjectMember::Property(Property {
                key,
                value,
                kind: PropertyKind::Init,
                span: self.span_from(start),
            }));
        }

        let PropertyKey::Identifier(identifier) = &key else {
            let next = self.peek()?;
            return Err(self.unexpected(next, "':'"));
        };

        let mut value = Expression::Identifier(identifier.clone());
        if self.match_token("=")? {
            // Shorthand with default, only valid as a destructuring target
            let default = self.parse_assignment()?;
            value = Expression::Assignment(AssignmentExpression {
                operator: "=".to_string(),
                target: Box::new(value),
                value: Box::new(default),
                span: self.span_from(start),
            });
        }

        Ok(ObjectMember::Property(Property {
            key,
            value,
            kind: PropertyKind::Shorthand,
            span: self.span_from(start),
        }))
    }

    // Raw scanning

    /// Scan a template literal whose opening backtick is at `start`
    fn scan_template(&mut self, start: usize) -> ParseResult<Template> {
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut p = start + 1;
        let mut quasi_start = p;

        loop {
            let Some(c) = self.char_at(p) else {
                return Err(ParseError::unexpected_eof(p));
            };
            match c {
                '\\' => {
                    p += 1;
                    p += self.char_at(p).map_or(0, char::len_utf8);
                }
                '`' => {
                    quasis.push(self.source[quasi_start..p].to_string());
                    p += 1;
                    break;
                }
                '$' if self.source[p..].starts_with("${") => {
                    quasis.push(self.source[quasi_start..p].to_string());
                    self.pos = p + 2;
                    expressions.push(self.parse_expression()?);
                    let close = self.expect("}")?;
                    p = close.end;
                    quasi_start = p;
                }
                _ => p += c.len_utf8(),
            }
        }

        self.pos = p;
        Ok(Template {
            quasis,
            expressions,
            span: Span::new(start, p),
        })
    }

    fn scan_regex(&mut self, start: usize) -> ParseResult<Literal> {
        let mut p = start + 1;
        let mut in_class = false;

        loop {
            let Some(c) = self.char_at(p) else {
                return Err(ParseError::unexpected_eof(p));
            };
            match c {
                '\\' => {
                    p += 1;
                    p += self.char_at(p).map_or(0, char::len_utf8);
                }
                '\n' | '\r' => {
                    return Err(ParseError::invalid_syntax(
                        p,
                        "unterminated regular expression",
                    ))
                }
                '[' => {
                    in_class = true;
                    p += 1;
                }
                ']' => {
                    in_class = false;
                    p += 1;
                }
                '/' if !in_class => {
                    p += 1;
                    break;
                }
                _ => p += c.len_utf8(),
            }
        }

        while self.char_at(p).is_some_and(|c| c.is_ascii_alphabetic()) {
            p += 1;
        }

        self.pos = p;
        Ok(Literal {
            kind: LiteralKind::RegExp,
            raw: self.source[start..p].to_string(),
            span: Span::new(start, p),
        })
    }

    // JSX

    /// Parse a JSX element or fragment whose `<` is at `start`
    fn parse_jsx(&mut self, start: usize) -> ParseResult<Expression> {
        let p = self.skip_jsx_trivia(start + 1);
        if self.char_at(p) == Some('>') {
            let opening = Span::new(start, p + 1);
            let (children, closing) = self.parse_jsx_children(p + 1, "")?;
            self.pos = closing.end;
            return Ok(Expression::JsxFragment(JsxFragment {
                children,
                opening,
                closing,
                span: Span::new(start, closing.end),
            }));
        }
        Ok(Expression::JsxElement(self.parse_jsx_element(start)?))
    }

    fn parse_jsx_element(&mut self, start: usize) -> ParseResult<JsxElement> {
        let mut p = self.skip_jsx_trivia(start + 1);
        let name_end = self.scan_jsx_name(p);
        if name_end == p {
            return Err(ParseError::invalid_syntax(p, "expected JSX tag name"));
        }
        let name = self.source[p..name_end].to_string();
        p = name_end;

        let mut attributes = Vec::new();
        let self_closing = loop {
            p = self.skip_jsx_trivia(p);
            match self.char_at(p) {
                None => return Err(ParseError::unexpected_eof(p)),
                Some('/') => {
                    let gt = self.skip_jsx_trivia(p + 1);
                    if self.char_at(gt) != Some('>') {
                        return Err(ParseError::invalid_syntax(gt, "expected '>'"));
                    }
                    p = gt + 1;
                    break true;
                }
                Some('>') => {
                    p += 1;
                    break false;
                }
                Some('{') => {
                    self.pos = p + 1;
                    self.expect("...")?;
                    let argument = self.parse_assignment()?;
                    let close = self.expect("}")?;
                    attributes.push(JsxAttribute::Spread(SpreadElement {
                        argument: Box::new(argument),
                        span: Span::new(p, close.end),
                    }));
                    p = close.end;
                }
                Some(_) => {
                    let attribute = self.parse_jsx_attribute(p)?;
                    p = attribute.span.end;
                    attributes.push(JsxAttribute::Attribute(attribute));
                }
            }
        };

        let opening = JsxOpeningElement {
            name,
            attributes,
            self_closing,
            span: Span::new(start, p),
        };

        if self_closing {
            self.pos = p;
            return Ok(JsxElement {
                opening,
                children: Vec::new(),
                closing: None,
                span: Span::new(start, p),
            });
        }

        let (children, closing) = self.parse_jsx_children(p, &opening.name)?;
        self.pos = closing.end;
        Ok(JsxElement {
            opening,
            children,
            closing: Some(closing),
            span: Span::new(start, closing.end),
        })
    }

    fn parse_jsx_attribute(&mut self, start: usize) -> ParseResult<JsxNamedAttribute> {
        let name_end = self.scan_jsx_name(start);
        if name_end == start {
            return Err(ParseError::invalid_syntax(start, "expected JSX attribute"));
        }
        let name = self.source[start..name_end].to_string();

        let eq = self.skip_jsx_trivia(name_end);
        if self.char_at(eq) != Some('=') {
            return Ok(JsxNamedAttribute {
                name,
                value: None,
                span: Span::new(start, name_end),
            });
        }

        let v = self.skip_jsx_trivia(eq + 1);
        let (value, end) = match self.char_at(v) {
            Some(quote @ ('"' | '\'')) => {
                let close = self.source[v + 1..]
                    .find(quote)
                    .map(|i| v + 1 + i)
                    .ok_or_else(|| ParseError::unexpected_eof(self.source.len()))?;
                let literal = Literal {
                    kind: LiteralKind::String,
                    raw: self.source[v..close + 1].to_string(),
                    span: Span::new(v, close + 1),
                };
                (JsxAttributeValue::String(literal), close + 1)
            }
            Some('{') => {
                let container = self.parse_jsx_container(v)?;
                let end = container.span.end;
                (JsxAttributeValue::Container(container), end)
            }
            Some('<') => {
                let element = self.parse_jsx(v)?;
                let end = element.span().end;
                (JsxAttributeValue::Element(Box::new(element)), end)
            }
            _ => {
                return Err(ParseError::invalid_syntax(
                    v,
                    "expected JSX attribute value",
                ))
            }
        };

        Ok(JsxNamedAttribute {
            name,
            value: Some(value),
            span: Span::new(start, end),
        })
    }

    fn parse_jsx_container(&mut self, start: usize) -> ParseResult<JsxExpressionContainer> {
        self.pos = start + 1;
        let expression = if self.check("}")? {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let close = self.expect("}")?;
        Ok(JsxExpressionContainer {
            expression,
            span: Span::new(start, close.end),
        })
    }

    /// Children up to and including the closing tag for `name` (empty for fragments)
    fn parse_jsx_children(&mut self, start: usize, name: &str) -> ParseResult<(Vec<JsxChild>, Span)> {
        let mut children = Vec::new();
        let mut p = start;

        loop {
            match self.char_at(p) {
                None => return Err(ParseError::unexpected_eof(p)),
                Some('<') => {
                    let slash = self.skip_jsx_trivia(p + 1);
                    if self.char_at(slash) == Some('/') {
                        let name_start = self.skip_jsx_trivia(slash + 1);
                        let name_end = self.scan_jsx_name(name_start);
                        let found = &self.source[name_start..name_end];
                        if found != name {
                            let expected = if name.is_empty() {
                                "closing fragment".to_string()
                            } else {
                                format!("closing tag for '{}'", name)
                            };
                            return Err(ParseError::unexpected_token(
                                name_start,
                                expected,
                                format!("'{}'", found),
                            ));
                        }
                        let gt = self.skip_jsx_trivia(name_end);
                        if self.char_at(gt) != Some('>') {
                            return Err(ParseError::invalid_syntax(gt, "expected '>'"));
                        }
                        return Ok((children, Span::new(p, gt + 1)));
                    }

                    match self.parse_jsx(p)? {
                        Expression::JsxElement(element) => {
                            children.push(JsxChild::Element(Box::new(element)))
                        }
                        Expression::JsxFragment(fragment) => {
                            children.push(JsxChild::Fragment(Box::new(fragment)))
                        }
                        other => {
                            return Err(ParseError::invalid_syntax(
                                other.span().start,
                                "expected JSX child",
                            ))
                        }
                    }
                    p = self.pos;
                }
                Some('{') => {
                    let container = self.parse_jsx_container(p)?;
                    p = container.span.end;
                    children.push(JsxChild::Container(container));
                }
                Some(_) => {
                    let end = self.source[p..]
                        .find(['{', '<'])
                        .map_or(self.source.len(), |i| p + i);
                    children.push(JsxChild::Text(JsxText {
                        raw: self.source[p..end].to_string(),
                        span: Span::new(p, end),
                    }));
                    p = end;
                }
            }
        }
    }

    fn scan_jsx_name(&self, start: usize) -> usize {
        let mut p = start;
        while let Some(c) = self.char_at(p) {
            if c.is_alphanumeric() || matches!(c, '_' | '$' | '-' | ':' | '.') {
                p += c.len_utf8();
            } else {
                break;
            }
        }
        p
    }

    /// Skip whitespace and comments inside a JSX tag
    fn skip_jsx_trivia(&self, start: usize) -> usize {
        let mut p = start;
        loop {
            let rest = &self.source[p..];
            if let Some(c) = rest.chars().next().filter(|c| c.is_whitespace()) {
                p += c.len_utf8();
            } else if rest.starts_with("/*") {
                p = rest.find("*/").map_or(self.source.len(), |i| p + i + 2);
            } else if rest.starts_with("//") {
                p = rest.find('\n').map_or(self.source.len(), |i| p + i);
            } else {
                return p;
            }
        }
    }

    // Skipping (types, balanced groups)

    /// Skip a bracketed group starting at the current `(`, `[` or `{`
    fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            let next = self.advance()?;
            match next.token {
                None => return Err(ParseError::unexpected_eof(next.start)),
                Some(Token::LParen | Token::LBracket | Token::LBrace) => depth += 1,
                Some(Token::RParen | Token::RBracket | Token::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(Token::Backtick) => {
                    self.scan_template(next.start)?;
                }
                _ => {}
            }
            if depth == 0 {
                return Err(self.unexpected(next, "'(', '[' or '{'"));
            }
        }
    }

    fn skip_parens(&mut self) -> ParseResult<()> {
        if !self.check("(")? {
            let next = self.peek()?;
            return Err(self.unexpected(next, "'('"));
        }
        self.skip_balanced()
    }

    /// Skip `<...>` type arguments or parameters, splitting `>>` as needed
    fn skip_type_args(&mut self) -> ParseResult<()> {
        self.expect("<")?;
        let mut depth = 1usize;

        while depth > 0 {
            let next = self.peek()?;
            match next.token {
                None => return Err(ParseError::unexpected_eof(next.start)),
                Some(Token::Lt) => {
                    self.advance()?;
                    depth += 1;
                }
                Some(Token::Gt) => {
                    self.advance()?;
                    depth -= 1;
                }
                Some(Token::Operator) => {
                    let text = self.text(&next);
                    if !text.is_empty() && text.chars().all(|c| c == '>') {
                        if text.len() > depth {
                            return Err(self.unexpected(next, "'>'"));
                        }
                        self.advance()?;
                        depth -= text.len();
                    } else if matches!(text, "|" | "&" | "-") {
                        self.advance()?;
                    } else {
                        return Err(self.unexpected(next, "'>'"));
                    }
                }
                Some(Token::LParen | Token::LBracket | Token::LBrace) => self.skip_balanced()?,
                Some(Token::Backtick) => {
                    self.advance()?;
                    self.scan_template(next.start)?;
                }
                Some(Token::Semicolon | Token::RParen | Token::RBracket | Token::RBrace) => {
                    return Err(self.unexpected(next, "'>'"));
                }
                _ => {
                    self.advance()?;
                }
            }
        }
        Ok(())
    }

    /// Skip a type annotation
    fn skip_type(&mut self) -> ParseResult<()> {
        'outer: loop {
            while self.check("|")? || self.check("&")? {
                self.advance()?;
            }

            loop {
                let next = self.peek()?;
                if !next.is(Token::Ident) || !TYPE_PREFIXES.contains(&self.text(&next)) {
                    break;
                }
                let ahead = self.peek_ahead()?;
                if matches!(
                    ahead.token,
                    Some(Token::Ident | Token::LParen | Token::LBracket | Token::LBrace | Token::Lt)
                ) {
                    self.advance()?;
                } else {
                    break;
                }
            }

            let next = self.peek()?;
            match next.token {
                Some(Token::LParen) => {
                    self.skip_balanced()?;
                    if self.match_token("=>")? {
                        continue 'outer;
                    }
                }
                Some(Token::LBracket | Token::LBrace) => self.skip_balanced()?,
                Some(Token::Lt) => {
                    // Generic function type
                    self.skip_type_args()?;
                    continue 'outer;
                }
                Some(Token::Backtick) => {
                    self.advance()?;
                    self.scan_template(next.start)?;
                }
                Some(Token::String | Token::Number) => {
                    self.advance()?;
                }
                Some(Token::Operator) if self.text(&next) == "-" => {
                    self.advance()?;
                    let number = self.peek()?;
                    if !number.is(Token::Number) {
                        return Err(self.unexpected(number, "number"));
                    }
                    self.advance()?;
                }
                Some(Token::Ident) => {
                    self.advance()?;
                }
                _ => return Err(self.unexpected(next, "type")),
            }

            loop {
                let next = self.peek()?;
                match next.token {
                    Some(Token::Lt) if !next.newline_before => self.skip_type_args()?,
                    Some(Token::LBracket) if !next.newline_before => self.skip_balanced()?,
                    Some(Token::Dot) => {
                        self.advance()?;
                        let name = self.peek()?;
                        if !name.is(Token::Ident) {
                            return Err(self.unexpected(name, "identifier"));
                        }
                        self.advance()?;
                    }
                    Some(Token::Ident) if !next.newline_before && self.text(&next) == "is" => {
                        // Type predicate: x is T
                        self.advance()?;
                        continue 'outer;
                    }
                    _ => break,
                }
            }

            if self.check("|")? || self.check("&")? {
                self.advance()?;
                continue;
            }

            let next = self.peek()?;
            if next.is(Token::Ident) && self.text(&next) == "extends" && !next.newline_before {
                // Conditional type
                self.advance()?;
                self.skip_type()?;
                self.expect("?")?;
                self.skip_type()?;
                self.expect(":")?;
                continue;
            }

            return Ok(());
        }
    }

    // Helpers

    fn peek(&mut self) -> ParseResult<Lexeme> {
        if let Some((pos, lexeme)) = self.lookahead {
            if pos == self.pos {
                return Ok(lexeme);
            }
        }
        let lexeme = lex_at(self.source, self.pos).map_err(ParseError::lexer_error)?;
        self.lookahead = Some((self.pos, lexeme));
        Ok(lexeme)
    }

    /// The token after the next one
    fn peek_ahead(&mut self) -> ParseResult<Lexeme> {
        let next = self.peek()?;
        self.lex_after(&next)
    }

    fn lex_after(&self, lexeme: &Lexeme) -> ParseResult<Lexeme> {
        lex_at(self.source, lexeme.end).map_err(ParseError::lexer_error)
    }

    fn advance(&mut self) -> ParseResult<Lexeme> {
        let lexeme = self.peek()?;
        self.pos = lexeme.end;
        Ok(lexeme)
    }

    fn text(&self, lexeme: &Lexeme) -> &'src str {
        &self.source[lexeme.start..lexeme.end]
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..).and_then(|rest| rest.chars().next())
    }

    /// Whether the next token is the punctuator or keyword `text`
    fn check(&mut self, text: &str) -> ParseResult<bool> {
        let next = self.peek()?;
        Ok(!next.is_eof() && !next.is(Token::String) && self.text(&next) == text)
    }

    fn check_token(&mut self, token: Token) -> ParseResult<bool> {
        Ok(self.peek()?.is(token))
    }

    fn match_token(&mut self, text: &str) -> ParseResult<bool> {
        if self.check(text)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, text: &str) -> ParseResult<Lexeme> {
        let next = self.peek()?;
        if self.check(text)? {
            self.advance()
        } else {
            Err(self.unexpected(next, &format!("'{}'", text)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Identifier> {
        let next = self.peek()?;
        if !next.is(Token::Ident) {
            return Err(self.unexpected(next, "identifier"));
        }
        self.advance()?;
        Ok(Identifier {
            name: self.text(&next).to_string(),
            span: Span::new(next.start, next.end),
        })
    }

    fn parse_string_literal(&mut self) -> ParseResult<Literal> {
        let next = self.peek()?;
        if !next.is(Token::String) {
            return Err(self.unexpected(next, "string literal"));
        }
        self.advance()?;
        Ok(self.literal(&next))
    }

    fn literal(&self, lexeme: &Lexeme) -> Literal {
        let raw = self.text(lexeme);
        let kind = match lexeme.token {
            Some(Token::String) => LiteralKind::String,
            _ if raw.ends_with('n') => LiteralKind::BigInt,
            _ => LiteralKind::Number,
        };
        Literal {
            kind,
            raw: raw.to_string(),
            span: Span::new(lexeme.start, lexeme.end),
        }
    }

    fn consume_semicolon(&mut self) -> ParseResult<()> {
        let next = self.peek()?;
        if next.is(Token::Semicolon) {
            self.advance()?;
            return Ok(());
        }
        if next.is_eof() || next.is(Token::RBrace) || next.newline_before {
            return Ok(());
        }
        Err(self.unexpected(next, "';'"))
    }

    /// Run `f`, rewinding if it fails or declines
    fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<Option<T>>) -> Option<T> {
        let checkpoint = self.pos;
        match f(self) {
            Ok(Some(value)) => Some(value),
            _ => {
                self.pos = checkpoint;
                None
            }
        }
    }

    /// Source text consumed by `f`
    fn capture(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<()>) -> ParseResult<String> {
        let start = self.peek()?.start;
        f(self)?;
        Ok(self.consumed_since(start))
    }

    /// Source text from `start` to the end of the last consumed token
    ///
    /// Empty when nothing was consumed after `start`.
    fn consumed_since(&self, start: usize) -> String {
        if start >= self.pos {
            return String::new();
        }
        self.source[start..self.pos].to_string()
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    fn opaque(&self, keyword: &str, start: usize) -> Statement {
        Statement::Opaque(OpaqueStatement {
            keyword: keyword.to_string(),
            text: self.source[start..self.pos].to_string(),
            span: self.span_from(start),
        })
    }

    fn unexpected(&self, lexeme: Lexeme, expected: &str) -> ParseError {
        if lexeme.is_eof() {
            ParseError::unexpected_eof(lexeme.start)
        } else {
            ParseError::unexpected_token(
                lexeme.start,
                expected,
                format!("'{}'", self.text(&lexeme)),
            )
        }
    }
}

const RELATIONAL_PRECEDENCE: u8 = 8;

fn binary_precedence(token: Option<Token>, text: &str) -> Option<u8> {
    match token? {
        Token::Ident => match text {
            "instanceof" | "in" => Some(RELATIONAL_PRECEDENCE),
            _ => None,
        },
        Token::Lt | Token::Gt | Token::Slash | Token::Star | Token::Operator => match text {
            "??" => Some(1),
            "||" => Some(2),
            "&&" => Some(3),
            "|" => Some(4),
            "^" => Some(5),
            "&" => Some(6),
            "==" | "!=" | "===" | "!==" => Some(7),
            "<" | ">" | "<=" | ">=" => Some(RELATIONAL_PRECEDENCE),
            "<<" | ">>" | ">>>" => Some(9),
            "+" | "-" => Some(10),
            "*" | "/" | "%" => Some(11),
            "**" => Some(12),
            _ => None,
        },
        _ => None,
    }
}

fn is_member_name_start(lexeme: &Lexeme) -> bool {
    matches!(
        lexeme.token,
        Some(
            Token::Ident
                | Token::String
                | Token::Number
                | Token::PrivateName
                | Token::LBracket
                | Token::Star
        )
    )
}

/// Parse a complete module
pub fn parse(source: &str) -> ParseResult<Program> {
    Parser::new(source).parse_program()
}

/// Parse a single expression spanning the whole input
pub fn parse_expression(source: &str) -> ParseResult<Expression> {
    Parser::new(source).parse_standalone_expression()
}
