use crate::language::builtin::{self, Builtin};
use crate::language::location::SourceLocation;
use crate::language::scope::ScopeHandle;
use std::io::{self, Write};
use std::rc::Rc;

/// A parsed node: what it is, where it came from, and the lexical scope in
/// effect at its location. Children are shared so function values can hold
/// their bodies after the tree is dropped.
pub struct Node {
    pub location: SourceLocation,
    pub scope: ScopeHandle,
    pub kind: NodeKind,
}

pub enum NodeKind {
    Identifier(String),
    NumberLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    ArrayLiteral {
        elements: Vec<Rc<Node>>,
    },
    ObjectLiteral {
        entries: Vec<(String, Rc<Node>)>,
    },
    Subscript {
        target: Rc<Node>,
        index: Rc<Node>,
    },
    AccessMember {
        target: Rc<Node>,
        member: String,
    },
    BinaryOperator {
        op: Builtin,
        left: Rc<Node>,
        right: Rc<Node>,
    },
    UnaryOperator {
        op: Builtin,
        operand: Rc<Node>,
    },
    FunctionCall {
        callee: Rc<Node>,
        arguments: Vec<Rc<Node>>,
    },
    Block {
        statements: Vec<Rc<Node>>,
        /// The root block shares the global scope; all others introduce a
        /// fresh runtime scope.
        introduces_scope: bool,
    },
    IfStatement {
        condition: Rc<Node>,
        then_branch: Rc<Node>,
        else_branch: Option<Rc<Node>>,
    },
    WhileStatement {
        condition: Rc<Node>,
        body: Rc<Node>,
    },
    ForStatement {
        is_const: bool,
        binding: String,
        iterable: Rc<Node>,
        body: Rc<Node>,
    },
    Declaration {
        is_const: bool,
        name: String,
        initializer: Option<Rc<Node>>,
    },
    FunctionDeclaration {
        parameters: Vec<String>,
        body: Rc<Node>,
    },
    Return {
        value: Option<Rc<Node>>,
    },
    Break,
    Continue,
}

impl Node {
    pub fn new(location: SourceLocation, scope: ScopeHandle, kind: NodeKind) -> Rc<Self> {
        Rc::new(Self {
            location,
            scope,
            kind,
        })
    }

    /// Does this expression denote a storage location?
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Identifier(_) | NodeKind::Subscript { .. } | NodeKind::AccessMember { .. }
        )
    }

    /// Is this lvalue immutable? Only identifier bindings can be const;
    /// container elements stay writable even through a const binding.
    pub fn is_const(&self) -> bool {
        match &self.kind {
            NodeKind::Identifier(name) => self
                .scope
                .info_of(name)
                .map(|info| info.is_const)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Render the subtree in the s-expression layout used by
    /// `--print-ast`.
    pub fn output(&self, out: &mut dyn Write, indent: usize) -> io::Result<()> {
        let pad = "    ".repeat(indent);
        match &self.kind {
            NodeKind::Identifier(name) => write!(out, "{pad}{name}"),
            NodeKind::NumberLiteral(value) => write!(out, "{pad}{value}"),
            NodeKind::StringLiteral(value) => write!(out, "{pad}{value:?}"),
            NodeKind::BooleanLiteral(value) => write!(out, "{pad}{value}"),
            NodeKind::NullLiteral => write!(out, "{pad}null"),
            NodeKind::ArrayLiteral { elements } => {
                writeln!(out, "{pad}(array")?;
                for element in elements {
                    element.output(out, indent + 1)?;
                    writeln!(out)?;
                }
                write!(out, "{pad})")
            }
            NodeKind::ObjectLiteral { entries } => {
                writeln!(out, "{pad}(object")?;
                for (key, value) in entries {
                    writeln!(out, "{pad}    ({key}")?;
                    value.output(out, indent + 2)?;
                    writeln!(out)?;
                    writeln!(out, "{pad}    )")?;
                }
                write!(out, "{pad})")
            }
            NodeKind::Subscript { target, index } => {
                writeln!(out, "{pad}(index")?;
                target.output(out, indent + 1)?;
                writeln!(out)?;
                index.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::AccessMember { target, member } => {
                writeln!(out, "{pad}(member {member}")?;
                target.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::BinaryOperator { op, left, right } => {
                writeln!(out, "{pad}({}", builtin::canonical_text(*op))?;
                left.output(out, indent + 1)?;
                writeln!(out)?;
                right.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::UnaryOperator { op, operand } => {
                writeln!(out, "{pad}({}", builtin::canonical_text(*op))?;
                operand.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::FunctionCall { callee, arguments } => {
                write!(out, "{pad}(call ")?;
                callee.output(out, 0)?;
                writeln!(out)?;
                for argument in arguments {
                    argument.output(out, indent + 1)?;
                    writeln!(out)?;
                }
                write!(out, "{pad})")
            }
            NodeKind::Block {
                statements,
                introduces_scope,
            } => {
                if *introduces_scope {
                    writeln!(out, "{pad}(block")?;
                } else {
                    writeln!(out, "{pad}(global scope")?;
                }
                for statement in statements {
                    statement.output(out, indent + 1)?;
                    writeln!(out)?;
                }
                write!(out, "{pad})")
            }
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                writeln!(out, "{pad}(if")?;
                writeln!(out, "{pad}    (condition")?;
                condition.output(out, indent + 2)?;
                writeln!(out)?;
                writeln!(out, "{pad}    )")?;
                writeln!(out, "{pad}    (then")?;
                then_branch.output(out, indent + 2)?;
                writeln!(out)?;
                writeln!(out, "{pad}    )")?;
                if let Some(else_branch) = else_branch {
                    writeln!(out, "{pad}    (else")?;
                    else_branch.output(out, indent + 2)?;
                    writeln!(out)?;
                    writeln!(out, "{pad}    )")?;
                }
                write!(out, "{pad})")
            }
            NodeKind::WhileStatement { condition, body } => {
                writeln!(out, "{pad}(while")?;
                writeln!(out, "{pad}    (condition")?;
                condition.output(out, indent + 2)?;
                writeln!(out)?;
                writeln!(out, "{pad}    )")?;
                body.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::ForStatement {
                is_const,
                binding,
                iterable,
                body,
            } => {
                let declarator = if *is_const { "let" } else { "var" };
                writeln!(out, "{pad}(for {declarator} {binding} in")?;
                iterable.output(out, indent + 1)?;
                writeln!(out)?;
                body.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::Declaration {
                is_const,
                name,
                initializer,
            } => {
                let declarator = if *is_const { "const " } else { "" };
                match initializer {
                    Some(initializer) => {
                        writeln!(out, "{pad}(decl {declarator}{name}")?;
                        initializer.output(out, indent + 1)?;
                        writeln!(out)?;
                        write!(out, "{pad})")
                    }
                    None => write!(out, "{pad}(decl {declarator}{name})"),
                }
            }
            NodeKind::FunctionDeclaration { parameters, body } => {
                writeln!(out, "{pad}(decl func")?;
                write!(out, "{pad}    (")?;
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        write!(out, " ")?;
                    }
                    write!(out, "{parameter}")?;
                }
                writeln!(out, ")")?;
                body.output(out, indent + 1)?;
                writeln!(out)?;
                write!(out, "{pad})")
            }
            NodeKind::Return { value } => match value {
                Some(value) => {
                    writeln!(out, "{pad}(return")?;
                    value.output(out, indent + 1)?;
                    writeln!(out)?;
                    write!(out, "{pad})")
                }
                None => write!(out, "{pad}(return)"),
            },
            NodeKind::Break => write!(out, "{pad}(break)"),
            NodeKind::Continue => write!(out, "{pad}(continue)"),
        }
    }

    /// The printed tree as a string, for diagnostics and tests.
    pub fn to_tree_string(&self) -> String {
        let mut buffer = Vec::new();
        self.output(&mut buffer, 0)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(buffer).expect("tree output is UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc as StdRc;

    fn node(kind: NodeKind) -> StdRc<Node> {
        let scope = ScopeHandle::global();
        Node::new(SourceLocation::start_of("test"), scope, kind)
    }

    #[test]
    fn lvalue_classification() {
        let identifier = node(NodeKind::Identifier("x".into()));
        let number = node(NodeKind::NumberLiteral(1.0));
        let subscript = node(NodeKind::Subscript {
            target: identifier.clone(),
            index: number.clone(),
        });
        let member = node(NodeKind::AccessMember {
            target: identifier.clone(),
            member: "m".into(),
        });

        assert!(identifier.is_lvalue());
        assert!(subscript.is_lvalue());
        assert!(member.is_lvalue());
        assert!(!number.is_lvalue());
    }

    #[test]
    fn const_ness_resolves_through_the_captured_scope() {
        use crate::language::scope::IdentifierInfo;

        let scope = ScopeHandle::global();
        scope.declare("k", IdentifierInfo { is_const: true });
        scope.declare("v", IdentifierInfo { is_const: false });

        let constant = Node::new(
            SourceLocation::start_of("test"),
            scope.clone(),
            NodeKind::Identifier("k".into()),
        );
        let variable = Node::new(
            SourceLocation::start_of("test"),
            scope,
            NodeKind::Identifier("v".into()),
        );
        assert!(constant.is_const());
        assert!(!variable.is_const());
    }

    #[test]
    fn printer_groups_binary_operators() {
        let left = node(NodeKind::NumberLiteral(1.0));
        let right = node(NodeKind::NumberLiteral(2.0));
        let sum = node(NodeKind::BinaryOperator {
            op: Builtin::Addition,
            left,
            right,
        });
        assert_eq!(sum.to_tree_string(), "(+\n    1\n    2\n)");
    }
}
