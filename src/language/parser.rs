use crate::language::ast::{Node, NodeKind};
use crate::language::builtin::{self, BindingDirection, Builtin};
use crate::language::location::SourceLocation;
use crate::language::scope::{IdentifierInfo, ScopeHandle};
use crate::language::token::{Token, TokenKind};
use crate::language::token_stream::TokenStream;
use crate::tools::diagnostics;
use std::rc::Rc;

/// Parse the token stream into an AST rooted at a block that shares the
/// global scope. Errors are reported inline and counted; a failing
/// production returns `None` and unwinds to the statement loop, which
/// stops there rather than resynchronizing.
pub fn parse(tokens: &mut TokenStream, global: ScopeHandle) -> (Option<Rc<Node>>, usize) {
    let mut parser = Parser::new(global);
    let root = parser.parse_program(tokens);
    (root, parser.error_count)
}

struct Parser {
    scope: ScopeHandle,
    /// One entry per enclosing body: `true` for loop bodies, `false` for
    /// function bodies (which wall off any outer loop).
    loop_stack: Vec<bool>,
    error_count: usize,
}

impl Parser {
    fn new(global: ScopeHandle) -> Self {
        Self {
            scope: global,
            loop_stack: Vec::new(),
            error_count: 0,
        }
    }

    fn error(&mut self, location: &SourceLocation, message: &str) {
        self.error_count += 1;
        diagnostics::report_error(location, message);
    }

    fn node(&self, location: SourceLocation, kind: NodeKind) -> Rc<Node> {
        Node::new(location, self.scope.clone(), kind)
    }

    /// Eat the current token if it spells `expected`.
    fn matches(&mut self, tokens: &mut TokenStream, expected: Builtin) -> bool {
        if tokens.peek().is_some_and(|t| t.is(expected)) {
            tokens.eat();
            return true;
        }
        false
    }

    fn check(&self, tokens: &TokenStream, expected: Builtin) -> bool {
        tokens.peek().is_some_and(|t| t.is(expected))
    }

    fn expect(
        &mut self,
        tokens: &mut TokenStream,
        expected: Builtin,
        message: &str,
    ) -> Option<SourceLocation> {
        let location = tokens.current_location();
        if self.matches(tokens, expected) {
            Some(location)
        } else {
            self.error(&location, message);
            None
        }
    }

    fn expect_identifier(&mut self, tokens: &mut TokenStream) -> Option<Token> {
        match tokens.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let token = token.clone();
                tokens.eat();
                Some(token)
            }
            _ => {
                let location = tokens.current_location();
                self.error(&location, "expected identifier");
                None
            }
        }
    }

    // <top> ::= <statement>*
    fn parse_program(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        if tokens.is_empty() {
            return None;
        }

        let location = tokens.current_location();
        let mut statements = Vec::new();

        while tokens.has_next() {
            match self.parse_statement(tokens) {
                Some(statement) => statements.push(statement),
                None => break,
            }
        }

        Some(self.node(
            location,
            NodeKind::Block {
                statements,
                introduces_scope: false,
            },
        ))
    }

    // <statement> ::= <if> | <while> | <for> | <block>
    //               | <declaration> ";" | "break" ";" | "continue" ";"
    //               | <expr> ";"
    fn parse_statement(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let token = tokens.peek()?.clone();

        if token.is(Builtin::IfStatement) {
            return self.parse_if(tokens);
        }
        if token.is(Builtin::WhileStatement) {
            return self.parse_while(tokens);
        }
        if token.is(Builtin::ForStatement) {
            return self.parse_for(tokens);
        }
        if token.is(Builtin::OpenBlock) {
            return self.parse_block(tokens);
        }

        let statement = if token.is(Builtin::VariableDeclarator)
            || token.is(Builtin::ConstantDeclarator)
        {
            self.parse_declaration(tokens)?
        } else if token.is(Builtin::Break) || token.is(Builtin::Continue) {
            self.parse_loop_control(tokens)?
        } else {
            self.parse_expression(tokens)?
        };

        self.expect(tokens, Builtin::StatementDelimiter, "expected semicolon")?;
        Some(statement)
    }

    // <block> ::= "{" <statement>* "}"
    fn parse_block(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location =
            self.expect(tokens, Builtin::OpenBlock, "expected opening curly brace")?;

        let enclosing = self.scope.clone();
        self.scope = enclosing.child(false);

        let mut statements = Vec::new();
        let mut closed = false;

        while tokens.has_next() {
            if self.check(tokens, Builtin::CloseBlock) {
                tokens.eat();
                closed = true;
                break;
            }
            match self.parse_statement(tokens) {
                Some(statement) => statements.push(statement),
                None => break,
            }
        }

        let block = self.node(
            location,
            NodeKind::Block {
                statements,
                introduces_scope: true,
            },
        );
        self.scope = enclosing;

        if !closed && tokens.is_empty() {
            let location = tokens.current_location();
            self.error(&location, "expected closing curly brace");
            return None;
        }
        if !closed {
            return None;
        }
        Some(block)
    }

    fn parse_block_or_statement(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        if self.check(tokens, Builtin::OpenBlock) {
            self.parse_block(tokens)
        } else {
            self.parse_statement(tokens)
        }
    }

    // <if> ::= "if" "(" <expr> ")" <block-or-statement>
    //          ["else" <block-or-statement>]
    fn parse_if(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        self.expect(tokens, Builtin::OpenCondition, "expected opening parenthesis")?;
        let condition = self.parse_expression(tokens)?;
        self.expect(
            tokens,
            Builtin::CloseCondition,
            "expected closing parenthesis",
        )?;

        let then_branch = self.parse_block_or_statement(tokens)?;

        let else_branch = if self.matches(tokens, Builtin::ElseStatement) {
            Some(self.parse_block_or_statement(tokens)?)
        } else {
            None
        };

        Some(self.node(
            location,
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            },
        ))
    }

    // <while> ::= "while" "(" <expr> ")" <block-or-statement>
    fn parse_while(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        self.expect(tokens, Builtin::OpenCondition, "expected opening parenthesis")?;
        let condition = self.parse_expression(tokens)?;
        self.expect(
            tokens,
            Builtin::CloseCondition,
            "expected closing parenthesis",
        )?;

        self.loop_stack.push(true);
        let body = self.parse_block_or_statement(tokens);
        self.loop_stack.pop();

        Some(self.node(
            location,
            NodeKind::WhileStatement {
                condition,
                body: body?,
            },
        ))
    }

    // <for> ::= "for" "(" ["var" | "let"] <id> ":" <expr> ")"
    //           <block-or-statement>
    fn parse_for(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        self.expect(tokens, Builtin::OpenCondition, "expected opening parenthesis")?;

        // A bare iterator name is a constant binding, like `let`.
        let is_const = if self.matches(tokens, Builtin::VariableDeclarator) {
            false
        } else {
            self.matches(tokens, Builtin::ConstantDeclarator);
            true
        };

        let binding = self.expect_identifier(tokens)?;
        self.expect(tokens, Builtin::PairSeparator, "expected a colon")?;
        let iterable = self.parse_expression(tokens)?;
        self.expect(
            tokens,
            Builtin::CloseCondition,
            "expected closing parenthesis",
        )?;

        let enclosing = self.scope.clone();
        self.scope = enclosing.child(false);
        if !self.scope.declare(&binding.text, IdentifierInfo { is_const }) {
            let message = format!("redeclaration of variable: {}", binding.text);
            self.error(&binding.location, &message);
        }

        self.loop_stack.push(true);
        let body = self.parse_block_or_statement(tokens);
        self.loop_stack.pop();
        self.scope = enclosing;

        Some(self.node(
            location,
            NodeKind::ForStatement {
                is_const,
                binding: binding.text,
                iterable,
                body: body?,
            },
        ))
    }

    // <declaration> ::= ("var" | "let") <id> ["=" <expr>]
    fn parse_declaration(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        let is_const = tokens
            .peek()
            .is_some_and(|t| t.is(Builtin::ConstantDeclarator));
        tokens.eat();

        let name = self.expect_identifier(tokens)?;

        // The name is visible to its own initializer so that a function
        // bound with `let` can call itself.
        if !self.scope.declare(&name.text, IdentifierInfo { is_const }) {
            let message = format!("redeclaration of variable: {}", name.text);
            self.error(&name.location, &message);
            return None;
        }

        let initializer = if self.matches(tokens, Builtin::VariableDeclarationOperator) {
            Some(self.parse_expression(tokens)?)
        } else {
            if is_const {
                self.error(
                    &name.location,
                    "constants must be assigned to when declared",
                );
                return None;
            }
            None
        };

        Some(self.node(
            location,
            NodeKind::Declaration {
                is_const,
                name: name.text,
                initializer,
            },
        ))
    }

    fn parse_loop_control(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        let is_break = tokens.peek().is_some_and(|t| t.is(Builtin::Break));
        tokens.eat();

        if self.loop_stack.last() != Some(&true) {
            self.error(&location, "unexpected loop control statement");
            return None;
        }

        let kind = if is_break {
            NodeKind::Break
        } else {
            NodeKind::Continue
        };
        Some(self.node(location, kind))
    }

    // <expr> ::= precedence climbing over unary/binary operators
    fn parse_expression(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        self.parse_expression_min(tokens, 0)
    }

    fn parse_expression_min(
        &mut self,
        tokens: &mut TokenStream,
        min_precedence: i32,
    ) -> Option<Rc<Node>> {
        let lhs = self.parse_unary(tokens)?;
        self.climb(tokens, lhs, min_precedence)
    }

    /// The climbing loop: while the next token is a binary operator at or
    /// above `min_precedence`, fold it in, parsing its right side with a
    /// floor one step higher (same step for right-associative operators).
    fn climb(
        &mut self,
        tokens: &mut TokenStream,
        mut lhs: Rc<Node>,
        min_precedence: i32,
    ) -> Option<Rc<Node>> {
        loop {
            let Some(token) = tokens.peek() else {
                break;
            };
            if token.kind != TokenKind::Builtin {
                break;
            }
            let Some(op) = builtin::binary_builtin_for(&token.text) else {
                break;
            };
            let op_info = builtin::info(op);
            if !op_info.is_operator || op_info.precedence < min_precedence {
                break;
            }

            if builtin::is_assignment_operator(op_info) {
                if !lhs.is_lvalue() {
                    let location = lhs.location.clone();
                    self.error(&location, "expected lvalue expression");
                    return None;
                }
                if lhs.is_const() {
                    let location = lhs.location.clone();
                    self.error(
                        &location,
                        "left hand side is immutable, and cannot be assigned to",
                    );
                    return None;
                }
            }

            let location = token.location.clone();
            tokens.eat();

            let next_min = if op_info.binding_direction == BindingDirection::RightAssociative {
                op_info.precedence
            } else {
                op_info.precedence + 1
            };
            let rhs = self.parse_expression_min(tokens, next_min)?;

            lhs = self.node(
                location,
                NodeKind::BinaryOperator {
                    op,
                    left: lhs,
                    right: rhs,
                },
            );
        }

        Some(lhs)
    }

    // <unary> ::= ("-" | "not" | "++" | "--") <unary> | <postfix>
    fn parse_unary(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let Some(token) = tokens.peek() else {
            let location = tokens.current_location();
            self.error(&location, "expected expression");
            return None;
        };

        if token.kind != TokenKind::Builtin {
            return self.parse_postfix(tokens);
        }
        let Some(op) = builtin::unary_builtin_for(&token.text) else {
            return self.parse_postfix(tokens);
        };
        let op_info = builtin::info(op);
        if !op_info.is_operator {
            return self.parse_postfix(tokens);
        }

        let location = token.location.clone();

        if op == Builtin::Exists {
            self.error(&location, "the exists operator is reserved");
            return None;
        }

        tokens.eat();

        // A prefix operator's operand extends through any tighter-binding
        // binary operators to its right, so `-2 ^ 2` negates `2 ^ 2`.
        let operand = self.parse_unary(tokens)?;
        let operand = self.climb(tokens, operand, op_info.precedence)?;

        if matches!(op, Builtin::Increment | Builtin::Decrement) {
            if !operand.is_lvalue() {
                self.error(&location, "expected lvalue expression");
                return None;
            }
            if operand.is_const() {
                self.error(
                    &location,
                    "left hand side is immutable, and cannot be assigned to",
                );
                return None;
            }
        }

        Some(self.node(location, NodeKind::UnaryOperator { op, operand }))
    }

    // <postfix> ::= <primary> ("(" <args> ")" | "[" <expr> "]" | "." <id>)*
    fn parse_postfix(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let mut expr = self.parse_primary(tokens)?;

        loop {
            let Some(token) = tokens.peek() else {
                break;
            };

            if token.is(Builtin::OpenFunctionCall) {
                let location = token.location.clone();
                tokens.eat();
                let arguments = self.parse_argument_list(tokens)?;
                expr = self.node(
                    location,
                    NodeKind::FunctionCall {
                        callee: expr,
                        arguments,
                    },
                );
            } else if token.is(Builtin::OpenSubscript) {
                let location = token.location.clone();
                tokens.eat();
                let index = self.parse_expression(tokens)?;
                self.expect(
                    tokens,
                    Builtin::CloseSubscript,
                    "expected closing square brace",
                )?;
                expr = self.node(
                    location,
                    NodeKind::Subscript {
                        target: expr,
                        index,
                    },
                );
            } else if token.is(Builtin::AccessMember) {
                let location = token.location.clone();
                tokens.eat();
                let member = self.expect_identifier(tokens)?;
                expr = self.node(
                    location,
                    NodeKind::AccessMember {
                        target: expr,
                        member: member.text,
                    },
                );
            } else {
                break;
            }
        }

        Some(expr)
    }

    fn parse_argument_list(&mut self, tokens: &mut TokenStream) -> Option<Vec<Rc<Node>>> {
        let mut arguments = Vec::new();

        if self.matches(tokens, Builtin::CloseFunctionCall) {
            return Some(arguments);
        }

        loop {
            arguments.push(self.parse_expression(tokens)?);

            if self.matches(tokens, Builtin::ArgumentDelimiter) {
                continue;
            }
            self.expect(
                tokens,
                Builtin::CloseFunctionCall,
                "expected closing parenthesis",
            )?;
            return Some(arguments);
        }
    }

    // <primary> ::= <number> | <string> | "true" | "false" | "null"
    //             | <id> | "(" <expr> ")" | <array> | <object>
    //             | <func-decl> | "return" [<expr>]
    fn parse_primary(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let Some(token) = tokens.peek() else {
            let location = tokens.current_location();
            self.error(&location, "expected expression");
            return None;
        };
        let token = token.clone();
        let location = token.location.clone();

        match token.kind {
            TokenKind::NumberLiteral => {
                tokens.eat();
                match token.text.parse::<f64>() {
                    Ok(value) => Some(self.node(location, NodeKind::NumberLiteral(value))),
                    Err(_) => {
                        self.error(&location, "invalid number literal");
                        None
                    }
                }
            }
            TokenKind::StringLiteral => {
                tokens.eat();
                Some(self.node(location, NodeKind::StringLiteral(token.text)))
            }
            TokenKind::Identifier => {
                tokens.eat();
                if !self.scope.is_declared(&token.text) {
                    let message = format!("undeclared identifier: {}", token.text);
                    self.error(&location, &message);
                    return None;
                }
                Some(self.node(location, NodeKind::Identifier(token.text)))
            }
            TokenKind::Builtin => {
                if token.is(Builtin::TrueLiteral) {
                    tokens.eat();
                    return Some(self.node(location, NodeKind::BooleanLiteral(true)));
                }
                if token.is(Builtin::FalseLiteral) {
                    tokens.eat();
                    return Some(self.node(location, NodeKind::BooleanLiteral(false)));
                }
                if token.is(Builtin::NullLiteral) {
                    tokens.eat();
                    return Some(self.node(location, NodeKind::NullLiteral));
                }
                if token.is(Builtin::FunctionDeclaration) {
                    return self.parse_function_declaration(tokens);
                }
                if token.is(Builtin::Return) {
                    tokens.eat();
                    let value = if tokens
                        .peek()
                        .is_some_and(|t| !t.is(Builtin::StatementDelimiter))
                    {
                        Some(self.parse_expression(tokens)?)
                    } else {
                        None
                    };
                    return Some(self.node(location, NodeKind::Return { value }));
                }
                if token.is(Builtin::OpenParen) {
                    tokens.eat();
                    let expr = self.parse_expression(tokens)?;
                    self.expect(tokens, Builtin::CloseParen, "expected closing parenthesis")?;
                    return Some(expr);
                }
                if token.is(Builtin::OpenArrayLiteral) {
                    return self.parse_array_literal(tokens);
                }
                if token.is(Builtin::OpenObjectLiteral) {
                    return self.parse_object_literal(tokens);
                }

                self.error(&location, "expected expression");
                None
            }
            TokenKind::Comment | TokenKind::Invalid => {
                self.error(&location, "expected expression");
                None
            }
        }
    }

    // <array> ::= "[" [<expr> ("," <expr>)*] "]"
    fn parse_array_literal(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        let mut elements = Vec::new();

        if self.matches(tokens, Builtin::CloseArrayLiteral) {
            return Some(self.node(location, NodeKind::ArrayLiteral { elements }));
        }

        loop {
            elements.push(self.parse_expression(tokens)?);

            if self.matches(tokens, Builtin::ElementDelimiter) {
                continue;
            }
            self.expect(
                tokens,
                Builtin::CloseArrayLiteral,
                "expected closing square brace",
            )?;
            return Some(self.node(location, NodeKind::ArrayLiteral { elements }));
        }
    }

    // <object> ::= "{" [<key> ":" <expr> ("," <key> ":" <expr>)*] "}"
    // <key>    ::= <id> | <string>
    fn parse_object_literal(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        let mut entries: Vec<(String, Rc<Node>)> = Vec::new();

        if self.matches(tokens, Builtin::CloseObjectLiteral) {
            return Some(self.node(location, NodeKind::ObjectLiteral { entries }));
        }

        loop {
            let key = match tokens.peek() {
                Some(token)
                    if matches!(
                        token.kind,
                        TokenKind::Identifier | TokenKind::StringLiteral
                    ) =>
                {
                    let key = token.clone();
                    tokens.eat();
                    key
                }
                _ => {
                    let location = tokens.current_location();
                    self.error(&location, "expected identifier or string literal");
                    return None;
                }
            };

            if entries.iter().any(|(existing, _)| *existing == key.text) {
                let message = format!("key included in object multiple times: {}", key.text);
                self.error(&key.location, &message);
                return None;
            }

            self.expect(tokens, Builtin::PairSeparator, "expected a colon")?;
            let value = self.parse_expression(tokens)?;
            entries.push((key.text, value));

            if self.matches(tokens, Builtin::ElementDelimiter) {
                continue;
            }
            self.expect(
                tokens,
                Builtin::CloseObjectLiteral,
                "expected closing curly brace",
            )?;
            return Some(self.node(location, NodeKind::ObjectLiteral { entries }));
        }
    }

    // <func-decl> ::= "func" "(" [<id> ("," <id>)*] ")" <block>
    fn parse_function_declaration(&mut self, tokens: &mut TokenStream) -> Option<Rc<Node>> {
        let location = tokens.current_location();
        tokens.eat();

        self.expect(
            tokens,
            Builtin::FunctionOpenArgumentList,
            "expected argument list",
        )?;

        let mut parameters: Vec<String> = Vec::new();
        let mut parameter_tokens: Vec<Token> = Vec::new();

        if !self.matches(tokens, Builtin::FunctionCloseArgumentList) {
            loop {
                let parameter = self.expect_identifier(tokens)?;
                parameters.push(parameter.text.clone());
                parameter_tokens.push(parameter);

                if self.matches(tokens, Builtin::ArgumentDelimiter) {
                    continue;
                }
                self.expect(
                    tokens,
                    Builtin::FunctionCloseArgumentList,
                    "expected closing parenthesis",
                )?;
                break;
            }
        }

        let enclosing = self.scope.clone();
        self.scope = enclosing.child(true);
        for parameter in &parameter_tokens {
            if !self
                .scope
                .declare(&parameter.text, IdentifierInfo { is_const: false })
            {
                let message = format!("redeclaration of variable: {}", parameter.text);
                self.error(&parameter.location, &message);
            }
        }

        if !self.check(tokens, Builtin::OpenBlock) {
            let at = tokens.current_location();
            self.error(&at, "expected opening curly brace");
            self.scope = enclosing;
            return None;
        }

        self.loop_stack.push(false);
        let body = self.parse_block(tokens);
        self.loop_stack.pop();
        self.scope = enclosing;

        Some(self.node(
            location,
            NodeKind::FunctionDeclaration {
                parameters,
                body: body?,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lexer::tokenize;

    fn parse_source(source: &str) -> (Option<Rc<Node>>, usize) {
        let (tokens, lex_errors) = tokenize(source, "test");
        assert_eq!(lex_errors, 0, "lex errors in {source:?}");
        let mut stream = TokenStream::new(tokens, "test");
        parse(&mut stream, ScopeHandle::global())
    }

    fn last_statement_tree(source: &str) -> String {
        let (root, errors) = parse_source(source);
        assert_eq!(errors, 0, "parse errors in {source:?}");
        let root = root.expect("no tree produced");
        match &root.kind {
            NodeKind::Block { statements, .. } => statements
                .last()
                .expect("no statements parsed")
                .to_tree_string(),
            _ => panic!("root is not a block"),
        }
    }

    #[test]
    fn lower_precedence_groups_to_the_right() {
        assert_eq!(
            last_statement_tree("1 + 2 * 3;"),
            "(+\n    1\n    (*\n        2\n        3\n    )\n)"
        );
    }

    #[test]
    fn equal_precedence_groups_left() {
        assert_eq!(
            last_statement_tree("1 - 2 + 3;"),
            "(+\n    (-\n        1\n        2\n    )\n    3\n)"
        );
    }

    #[test]
    fn exponent_groups_right() {
        assert_eq!(
            last_statement_tree("2 ^ 3 ^ 2;"),
            "(^\n    2\n    (^\n        3\n        2\n    )\n)"
        );
    }

    #[test]
    fn prefix_negation_binds_below_exponent() {
        assert_eq!(
            last_statement_tree("-2 ^ 2;"),
            "(-\n    (^\n        2\n        2\n    )\n)"
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            last_statement_tree("(1 + 2) * 3;"),
            "(*\n    (+\n        1\n        2\n    )\n    3\n)"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            last_statement_tree("var a; var b; a = b = 1;"),
            "(=\n    a\n    (=\n        b\n        1\n    )\n)"
        );
    }

    #[test]
    fn postfix_chain_folds_calls_subscripts_and_members() {
        let tree = last_statement_tree("var f; f(1)[2].m;");
        assert!(tree.starts_with("(member m"));
        assert!(tree.contains("(index"));
        assert!(tree.contains("(call "));
    }

    #[test]
    fn assignment_to_non_lvalue_is_one_error() {
        let (_, errors) = parse_source("1 = 2;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn assignment_to_constant_is_one_error() {
        let (_, errors) = parse_source("let x = 1; x = 2;");
        assert_eq!(errors, 1);
        let (_, errors) = parse_source("let x = 1; x += 2;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn element_assignment_through_const_binding_parses() {
        let (_, errors) = parse_source("let a = [1]; a[0] = 2;");
        assert_eq!(errors, 0);
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        let (_, errors) = parse_source("missing;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn let_requires_an_initializer() {
        let (_, errors) = parse_source("let x;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn redeclaration_is_an_error() {
        let (_, errors) = parse_source("var x; x = 1; let x = 2;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn block_shadowing_is_rejected_without_function_boundary() {
        let (_, errors) = parse_source("var x; { var x; }");
        assert_eq!(errors, 1);
    }

    #[test]
    fn function_scope_allows_shadowing() {
        let (_, errors) = parse_source("var x; var f = func() { var x; x = 1; };");
        assert_eq!(errors, 0);
    }

    #[test]
    fn sibling_blocks_may_reuse_names() {
        let (_, errors) = parse_source("{ var x; } { var x; }");
        assert_eq!(errors, 0);
    }

    #[test]
    fn break_outside_a_loop_is_rejected() {
        let (_, errors) = parse_source("break;");
        assert_eq!(errors, 1);
        let (_, errors) = parse_source("while (true) {} break;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn break_in_nested_block_inside_loop_is_accepted() {
        let (_, errors) = parse_source("while (true) { { break; } }");
        assert_eq!(errors, 0);
        let (_, errors) = parse_source("while (true) if (true) continue;");
        assert_eq!(errors, 0);
    }

    #[test]
    fn break_does_not_cross_a_function_boundary() {
        let (_, errors) = parse_source("while (true) { var f = func() { break; }; }");
        assert_eq!(errors, 1);
    }

    #[test]
    fn for_loop_binds_its_iterator() {
        let (_, errors) = parse_source("for (x : [1, 2]) { x; }");
        assert_eq!(errors, 0);
        // The bare binding is constant.
        let (_, errors) = parse_source("for (x : [1, 2]) { x = 1; }");
        assert_eq!(errors, 1);
        // A `var` binding is mutable.
        let (_, errors) = parse_source("for (var x : [1, 2]) { x = 1; }");
        assert_eq!(errors, 0);
    }

    #[test]
    fn object_literal_rejects_duplicate_keys() {
        let (_, errors) = parse_source("var o = { a: 1, a: 2 };");
        assert_eq!(errors, 1);
        let (_, errors) = parse_source("var o = { a: 1, \"b\": 2 };");
        assert_eq!(errors, 0);
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let (_, errors) = parse_source("var x = 1");
        assert_eq!(errors, 1);
    }

    #[test]
    fn unbalanced_parenthesis_is_reported() {
        let (_, errors) = parse_source("(1 + 2;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn exists_is_reserved() {
        let (_, errors) = parse_source("var x = 1; exists x;");
        assert!(errors >= 1);
    }

    #[test]
    fn increment_requires_a_mutable_lvalue() {
        let (_, errors) = parse_source("var x = 1; ++x;");
        assert_eq!(errors, 0);
        let (_, errors) = parse_source("++1;");
        assert_eq!(errors, 1);
        let (_, errors) = parse_source("let x = 1; ++x;");
        assert_eq!(errors, 1);
    }

    #[test]
    fn return_with_and_without_value() {
        let (_, errors) = parse_source("var f = func() { return; };");
        assert_eq!(errors, 0);
        let (_, errors) = parse_source("var f = func(a) { return a + 1; };");
        assert_eq!(errors, 0);
    }

    #[test]
    fn recursive_function_sees_its_own_name() {
        let (_, errors) =
            parse_source("let fact = func(n) { if (n < 2) { return 1; } return n * fact(n - 1); };");
        assert_eq!(errors, 0);
    }

    #[test]
    fn empty_input_produces_no_tree_and_no_errors() {
        let (root, errors) = parse_source("");
        assert!(root.is_none());
        assert_eq!(errors, 0);
    }
}
