use sprout_parser::ast::*;

/// Visitor pattern for traversing syntax trees immutably
///
/// This trait provides default implementations that walk the entire tree in
/// source order, descending into grafted fragments as if they were inline.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_class_member(&mut self, member: &ClassMember) {
        walk_class_member(self, member);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_jsx_child(&mut self, child: &JsxChild) {
        walk_jsx_child(self, child);
    }
}

/// Mutable visitor pattern for transforming syntax trees
///
/// Similar to Visitor, but provides mutable access to nodes.
/// Use this when you need to modify the tree during traversal.
pub trait VisitorMut: Sized {
    fn visit_program_mut(&mut self, program: &mut Program) {
        walk_program_mut(self, program);
    }

    fn visit_statement_mut(&mut self, statement: &mut Statement) {
        walk_statement_mut(self, statement);
    }

    fn visit_class_member_mut(&mut self, member: &mut ClassMember) {
        walk_class_member_mut(self, member);
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }

    fn visit_jsx_child_mut(&mut self, child: &mut JsxChild) {
        walk_jsx_child_mut(self, child);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) {
    for statement in &program.body {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::ExportDefault(export) => visitor.visit_expression(&export.expression),
        Statement::ExportNamed(export) => visitor.visit_statement(&export.declaration),
        Statement::Variable(variable) => {
            for declarator in &variable.declarations {
                if let Some(init) = &declarator.init {
                    visitor.visit_expression(init);
                }
            }
        }
        Statement::Function(function) => walk_function(visitor, function),
        Statement::Class(class) => walk_class(visitor, class),
        Statement::Expression(statement) => visitor.visit_expression(&statement.expression),
        Statement::Block(block) => walk_block(visitor, block),
        Statement::Return(ret) => {
            if let Some(argument) = &ret.argument {
                visitor.visit_expression(argument);
            }
        }
        Statement::If(statement) => {
            visitor.visit_expression(&statement.test);
            visitor.visit_statement(&statement.consequent);
            if let Some(alternate) = &statement.alternate {
                visitor.visit_statement(alternate);
            }
        }
        Statement::Graft(graft) => visitor.visit_statement(&graft.node),
        Statement::Import(_)
        | Statement::ExportList(_)
        | Statement::Empty(_)
        | Statement::Opaque(_) => {
            // Leaf nodes
        }
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &BlockStatement) {
    for statement in &block.body {
        visitor.visit_statement(statement);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, function: &Function) {
    if let Some(body) = &function.body {
        walk_block(visitor, body);
    }
}

pub fn walk_class<V: Visitor>(visitor: &mut V, class: &Class) {
    for member in &class.body.members {
        visitor.visit_class_member(member);
    }
}

pub fn walk_class_member<V: Visitor>(visitor: &mut V, member: &ClassMember) {
    match member {
        ClassMember::Method(method) => {
            walk_property_key(visitor, &method.key);
            walk_function(visitor, &method.value);
        }
        ClassMember::Field(field) => {
            walk_property_key(visitor, &field.key);
            if let Some(value) = &field.value {
                visitor.visit_expression(value);
            }
        }
        ClassMember::StaticBlock(block) => walk_block(visitor, &block.body),
        ClassMember::Signature(_) => {}
    }
}

fn walk_property_key<V: Visitor>(visitor: &mut V, key: &PropertyKey) {
    if let PropertyKey::Computed(expr) = key {
        visitor.visit_expression(expr);
    }
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Identifier(_) | Expression::Literal(_) | Expression::Elision(_) => {
            // Leaf nodes
        }
        Expression::Template(template) => {
            for expr in &template.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::TaggedTemplate(tagged) => {
            visitor.visit_expression(&tagged.tag);
            for expr in &tagged.quasi.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::Array(array) => {
            for element in &array.elements {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(object) => {
            for member in &object.properties {
                match member {
                    ObjectMember::Property(property) => {
                        walk_property_key(visitor, &property.key);
                        visitor.visit_expression(&property.value);
                    }
                    ObjectMember::Spread(spread) => visitor.visit_expression(&spread.argument),
                }
            }
        }
        Expression::Function(function) => walk_function(visitor, function),
        Expression::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expression(body) => visitor.visit_expression(body),
            ArrowBody::Block(block) => walk_block(visitor, block),
        },
        Expression::Class(class) => walk_class(visitor, class),
        Expression::Member(member) => {
            visitor.visit_expression(&member.object);
            if let MemberProperty::Computed(property) = &member.property {
                visitor.visit_expression(property);
            }
        }
        Expression::Call(call) | Expression::New(call) => {
            visitor.visit_expression(&call.callee);
            for arg in &call.arguments {
                visitor.visit_expression(arg);
            }
        }
        Expression::Unary(unary) => visitor.visit_expression(&unary.argument),
        Expression::Update(update) => visitor.visit_expression(&update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression(&binary.left);
            visitor.visit_expression(&binary.right);
        }
        Expression::Conditional(conditional) => {
            visitor.visit_expression(&conditional.test);
            visitor.visit_expression(&conditional.consequent);
            visitor.visit_expression(&conditional.alternate);
        }
        Expression::Assignment(assignment) => {
            visitor.visit_expression(&assignment.target);
            visitor.visit_expression(&assignment.value);
        }
        Expression::Sequence(sequence) => {
            for expr in &sequence.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::Paren(paren) => visitor.visit_expression(&paren.expression),
        Expression::Yield(expr) => {
            if let Some(argument) = &expr.argument {
                visitor.visit_expression(argument);
            }
        }
        Expression::TsAs(expr) => visitor.visit_expression(&expr.expression),
        Expression::NonNull(expr) => visitor.visit_expression(&expr.expression),
        Expression::Spread(spread) => visitor.visit_expression(&spread.argument),
        Expression::JsxElement(element) => walk_jsx_element(visitor, element),
        Expression::JsxFragment(fragment) => {
            for child in &fragment.children {
                visitor.visit_jsx_child(child);
            }
        }
        Expression::Graft(graft) => visitor.visit_expression(&graft.node),
    }
}

pub fn walk_jsx_element<V: Visitor>(visitor: &mut V, element: &JsxElement) {
    for attribute in &element.opening.attributes {
        match attribute {
            JsxAttribute::Attribute(named) => match &named.value {
                Some(JsxAttributeValue::Container(container)) => {
                    if let Some(expr) = &container.expression {
                        visitor.visit_expression(expr);
                    }
                }
                Some(JsxAttributeValue::Element(expr)) => visitor.visit_expression(expr),
                Some(JsxAttributeValue::String(_)) | None => {}
            },
            JsxAttribute::Spread(spread) => visitor.visit_expression(&spread.argument),
        }
    }
    for child in &element.children {
        visitor.visit_jsx_child(child);
    }
}

pub fn walk_jsx_child<V: Visitor>(visitor: &mut V, child: &JsxChild) {
    match child {
        JsxChild::Text(_) => {}
        JsxChild::Container(container) => {
            if let Some(expr) = &container.expression {
                visitor.visit_expression(expr);
            }
        }
        JsxChild::Element(element) => walk_jsx_element(visitor, element),
        JsxChild::Fragment(fragment) => {
            for child in &fragment.children {
                visitor.visit_jsx_child(child);
            }
        }
    }
}

// Default walk implementations for mutable visitor

pub fn walk_program_mut<V: VisitorMut>(visitor: &mut V, program: &mut Program) {
    for statement in &mut program.body {
        visitor.visit_statement_mut(statement);
    }
}

pub fn walk_statement_mut<V: VisitorMut>(visitor: &mut V, statement: &mut Statement) {
    match statement {
        Statement::ExportDefault(export) => visitor.visit_expression_mut(&mut export.expression),
        Statement::ExportNamed(export) => visitor.visit_statement_mut(&mut export.declaration),
        Statement::Variable(variable) => {
            for declarator in &mut variable.declarations {
                if let Some(init) = &mut declarator.init {
                    visitor.visit_expression_mut(init);
                }
            }
        }
        Statement::Function(function) => walk_function_mut(visitor, function),
        Statement::Class(class) => walk_class_mut(visitor, class),
        Statement::Expression(statement) => visitor.visit_expression_mut(&mut statement.expression),
        Statement::Block(block) => walk_block_mut(visitor, block),
        Statement::Return(ret) => {
            if let Some(argument) = &mut ret.argument {
                visitor.visit_expression_mut(argument);
            }
        }
        Statement::If(statement) => {
            visitor.visit_expression_mut(&mut statement.test);
            visitor.visit_statement_mut(&mut statement.consequent);
            if let Some(alternate) = &mut statement.alternate {
                visitor.visit_statement_mut(alternate);
            }
        }
        Statement::Graft(graft) => visitor.visit_statement_mut(&mut graft.node),
        Statement::Import(_)
        | Statement::ExportList(_)
        | Statement::Empty(_)
        | Statement::Opaque(_) => {
            // Leaf nodes
        }
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut BlockStatement) {
    for statement in &mut block.body {
        visitor.visit_statement_mut(statement);
    }
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, function: &mut Function) {
    if let Some(body) = &mut function.body {
        walk_block_mut(visitor, body);
    }
}

pub fn walk_class_mut<V: VisitorMut>(visitor: &mut V, class: &mut Class) {
    for member in &mut class.body.members {
        visitor.visit_class_member_mut(member);
    }
}

pub fn walk_class_member_mut<V: VisitorMut>(visitor: &mut V, member: &mut ClassMember) {
    match member {
        ClassMember::Method(method) => {
            walk_property_key_mut(visitor, &mut method.key);
            walk_function_mut(visitor, &mut method.value);
        }
        ClassMember::Field(field) => {
            walk_property_key_mut(visitor, &mut field.key);
            if let Some(value) = &mut field.value {
                visitor.visit_expression_mut(value);
            }
        }
        ClassMember::StaticBlock(block) => walk_block_mut(visitor, &mut block.body),
        ClassMember::Signature(_) => {}
    }
}

fn walk_property_key_mut<V: VisitorMut>(visitor: &mut V, key: &mut PropertyKey) {
    if let PropertyKey::Computed(expr) = key {
        visitor.visit_expression_mut(expr);
    }
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::Identifier(_) | Expression::Literal(_) | Expression::Elision(_) => {
            // Leaf nodes
        }
        Expression::Template(template) => {
            for expr in &mut template.expressions {
                visitor.visit_expression_mut(expr);
            }
        }
        Expression::TaggedTemplate(tagged) => {
            visitor.visit_expression_mut(&mut tagged.tag);
            for expr in &mut tagged.quasi.expressions {
                visitor.visit_expression_mut(expr);
            }
        }
        Expression::Array(array) => {
            for element in &mut array.elements {
                visitor.visit_expression_mut(element);
            }
        }
        Expression::Object(object) => {
            for member in &mut object.properties {
                match member {
                    ObjectMember::Property(property) => {
                        walk_property_key_mut(visitor, &mut property.key);
                        visitor.visit_expression_mut(&mut property.value);
                    }
                    ObjectMember::Spread(spread) => {
                        visitor.visit_expression_mut(&mut spread.argument)
                    }
                }
            }
        }
        Expression::Function(function) => walk_function_mut(visitor, function),
        Expression::Arrow(arrow) => match &mut arrow.body {
            ArrowBody::Expression(body) => visitor.visit_expression_mut(body),
            ArrowBody::Block(block) => walk_block_mut(visitor, block),
        },
        Expression::Class(class) => walk_class_mut(visitor, class),
        Expression::Member(member) => {
            visitor.visit_expression_mut(&mut member.object);
            if let MemberProperty::Computed(property) = &mut member.property {
                visitor.visit_expression_mut(property);
            }
        }
        Expression::Call(call) | Expression::New(call) => {
            visitor.visit_expression_mut(&mut call.callee);
            for arg in &mut call.arguments {
                visitor.visit_expression_mut(arg);
            }
        }
        Expression::Unary(unary) => visitor.visit_expression_mut(&mut unary.argument),
        Expression::Update(update) => visitor.visit_expression_mut(&mut update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression_mut(&mut binary.left);
            visitor.visit_expression_mut(&mut binary.right);
        }
        Expression::Conditional(conditional) => {
            visitor.visit_expression_mut(&mut conditional.test);
            visitor.visit_expression_mut(&mut conditional.consequent);
            visitor.visit_expression_mut(&mut conditional.alternate);
        }
        Expression::Assignment(assignment) => {
            visitor.visit_expression_mut(&mut assignment.target);
            visitor.visit_expression_mut(&mut assignment.value);
        }
        Expression::Sequence(sequence) => {
            for expr in &mut sequence.expressions {
                visitor.visit_expression_mut(expr);
            }
        }
        Expression::Paren(paren) => visitor.visit_expression_mut(&mut paren.expression),
        Expression::Yield(expr) => {
            if let Some(argument) = &mut expr.argument {
                visitor.visit_expression_mut(argument);
            }
        }
        Expression::TsAs(expr) => visitor.visit_expression_mut(&mut expr.expression),
        Expression::NonNull(expr) => visitor.visit_expression_mut(&mut expr.expression),
        Expression::Spread(spread) => visitor.visit_expression_mut(&mut spread.argument),
        Expression::JsxElement(element) => walk_jsx_element_mut(visitor, element),
        Expression::JsxFragment(fragment) => {
            for child in &mut fragment.children {
                visitor.visit_jsx_child_mut(child);
            }
        }
        Expression::Graft(graft) => visitor.visit_expression_mut(&mut graft.node),
    }
}

pub fn walk_jsx_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut JsxElement) {
    for attribute in &mut element.opening.attributes {
        match attribute {
            JsxAttribute::Attribute(named) => match &mut named.value {
                Some(JsxAttributeValue::Container(container)) => {
                    if let Some(expr) = &mut container.expression {
                        visitor.visit_expression_mut(expr);
                    }
                }
                Some(JsxAttributeValue::Element(expr)) => visitor.visit_expression_mut(expr),
                Some(JsxAttributeValue::String(_)) | None => {}
            },
            JsxAttribute::Spread(spread) => visitor.visit_expression_mut(&mut spread.argument),
        }
    }
    for child in &mut element.children {
        visitor.visit_jsx_child_mut(child);
    }
}

pub fn walk_jsx_child_mut<V: VisitorMut>(visitor: &mut V, child: &mut JsxChild) {
    match child {
        JsxChild::Text(_) => {}
        JsxChild::Container(container) => {
            if let Some(expr) = &mut container.expression {
                visitor.visit_expression_mut(expr);
            }
        }
        JsxChild::Element(element) => walk_jsx_element_mut(visitor, element),
        JsxChild::Fragment(fragment) => {
            for child in &mut fragment.children {
                visitor.visit_jsx_child_mut(child);
            }
        }
    }
}
