//! Abstract Syntax Tree definitions for Nachshon
//!
//! Every node owns its children and carries the span of its first token.

use serde::Serialize;

use crate::utils::Span;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    /// Is the last top-level statement a bare expression?
    ///
    /// Used to decide whether an evaluated snippet has a result to display.
    pub fn ends_with_expression(&self) -> bool {
        matches!(self.body.last(), Some(Stmt::Expr(_)))
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Try(TryStmt),
    With(WithStmt),
    Return { value: Option<Expr>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    Pass { span: Span },
    Raise { exc: Option<Expr>, cause: Option<Expr>, span: Span },
    Assert { test: Expr, msg: Option<Expr>, span: Span },
    Import { names: Vec<ImportAlias>, span: Span },
    /// `from module import names`; an empty name list means `*`
    ImportFrom { module: String, names: Vec<ImportAlias>, span: Span },
    Global { names: Vec<String>, span: Span },
    Nonlocal { names: Vec<String>, span: Span },
    /// `a = b = value`
    Assign { targets: Vec<Expr>, value: Expr, span: Span },
    AugAssign { target: Expr, op: BinOp, value: Expr, span: Span },
    AnnAssign { target: Expr, annotation: Expr, value: Option<Expr>, span: Span },
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::FunctionDef(f) => f.span,
            Stmt::ClassDef(c) => c.span,
            Stmt::If(i) => i.span,
            Stmt::While(w) => w.span,
            Stmt::For(f) => f.span,
            Stmt::Try(t) => t.span,
            Stmt::With(w) => w.span,
            Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Pass { span }
            | Stmt::Raise { span, .. }
            | Stmt::Assert { span, .. }
            | Stmt::Import { span, .. }
            | Stmt::ImportFrom { span, .. }
            | Stmt::Global { span, .. }
            | Stmt::Nonlocal { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::AugAssign { span, .. }
            | Stmt::AnnAssign { span, .. } => *span,
            Stmt::Expr(e) => e.span(),
        }
    }
}

/// Function definition, possibly wrapped in decorators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub name: String,
    /// Decorators in source order (the last one is applied first)
    pub decorators: Vec<Expr>,
    pub params: Vec<Param>,
    pub returns: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    /// `name` or `name=default`
    Normal,
    /// `*name`
    VarArgs,
    /// `**name`
    KwArgs,
}

/// Function or lambda parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Class definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDef {
    pub name: String,
    pub decorators: Vec<Expr>,
    pub bases: Vec<Arg>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Conditional chain: one primary branch, any number of secondary branches
/// and an optional final branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub elifs: Vec<ElifClause>,
    pub orelse: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElifClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub orelse: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub target: Expr,
    pub iter: Expr,
    pub body: Vec<Stmt>,
    pub orelse: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TryStmt {
    pub body: Vec<Stmt>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Option<Vec<Stmt>>,
    pub finalbody: Option<Vec<Stmt>>,
    pub span: Span,
}

/// `except [type [as name]]:` clause; a bare handler has no type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptHandler {
    pub exc_type: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithStmt {
    pub items: Vec<WithItem>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
    pub span: Span,
}

/// `dotted.name [as alias]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportAlias {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// Call argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Arg {
    Positional(Expr),
    Keyword { name: String, value: Expr, span: Span },
    /// `*iterable`
    Unpack(Expr),
    /// `**mapping`
    UnpackDict(Expr),
}

/// `for target in iter if cond...` inside a comprehension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Integer text as written (radix prefix kept, separators removed)
    Int(String),
    Float(String),
    Str(String),
    True,
    False,
    None,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Name { id: String, span: Span },
    Literal { value: Literal, span: Span },
    List { elts: Vec<Expr>, span: Span },
    Tuple { elts: Vec<Expr>, span: Span },
    Set { elts: Vec<Expr>, span: Span },
    Dict { entries: Vec<(Expr, Expr)>, span: Span },
    ListComp { elt: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    SetComp { elt: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    GenExp { elt: Box<Expr>, generators: Vec<Comprehension>, span: Span },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
        span: Span,
    },
    BinaryOp { left: Box<Expr>, op: BinOp, right: Box<Expr>, span: Span },
    UnaryOp { op: UnaryOp, operand: Box<Expr>, span: Span },
    /// Short-circuiting `and`/`or` over two or more operands
    BoolOp { op: BoolOp, values: Vec<Expr>, span: Span },
    /// Comparison chain `left op0 c0 op1 c1 ...`
    Compare { left: Box<Expr>, ops: Vec<CmpOp>, comparators: Vec<Expr>, span: Span },
    /// `body if test else orelse`
    IfExp { test: Box<Expr>, body: Box<Expr>, orelse: Box<Expr>, span: Span },
    Lambda { params: Vec<Param>, body: Box<Expr>, span: Span },
    Call { func: Box<Expr>, args: Vec<Arg>, span: Span },
    Attribute { value: Box<Expr>, attr: String, span: Span },
    Subscript { value: Box<Expr>, index: Box<Expr>, span: Span },
    /// Only valid as a subscript index, or inside a tuple index
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        span: Span,
    },
    /// `*value` inside a collection display or assignment target
    Starred { value: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Name { span, .. }
            | Expr::Literal { span, .. }
            | Expr::List { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::Set { span, .. }
            | Expr::Dict { span, .. }
            | Expr::ListComp { span, .. }
            | Expr::SetComp { span, .. }
            | Expr::GenExp { span, .. }
            | Expr::DictComp { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::BoolOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::IfExp { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Call { span, .. }
            | Expr::Attribute { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Starred { span, .. } => *span,
        }
    }

    /// Can this expression appear on the left of `=` or as a loop target?
    pub fn is_assign_target(&self) -> bool {
        match self {
            Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => true,
            Expr::Starred { value, .. } => value.is_assign_target(),
            Expr::Tuple { elts, .. } | Expr::List { elts, .. } => {
                elts.iter().all(Expr::is_assign_target)
                    && elts.iter().filter(|e| matches!(e, Expr::Starred { .. })).count() <= 1
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::MatMul => "@",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(id: &str) -> Expr {
        Expr::Name { id: id.to_string(), span: Span::dummy() }
    }

    fn int(text: &str) -> Expr {
        Expr::Literal { value: Literal::Int(text.to_string()), span: Span::dummy() }
    }

    #[test]
    fn test_assign_targets() {
        assert!(name("א").is_assign_target());
        assert!(!int("1").is_assign_target());

        let starred = |e: Expr| Expr::Starred { value: Box::new(e), span: Span::dummy() };
        let tuple = |elts: Vec<Expr>| Expr::Tuple { elts, span: Span::dummy() };
        assert!(tuple(vec![name("א"), starred(name("ב"))]).is_assign_target());
        assert!(!tuple(vec![starred(name("א")), starred(name("ב"))]).is_assign_target());
        assert!(!tuple(vec![name("א"), int("2")]).is_assign_target());
    }

    #[test]
    fn test_ends_with_expression() {
        let mut program = Program { body: vec![Stmt::Pass { span: Span::dummy() }] };
        assert!(!program.ends_with_expression());
        program.body.push(Stmt::Expr(name("x")));
        assert!(program.ends_with_expression());
        program.body.push(Stmt::Assign {
            targets: vec![name("x")],
            value: int("1"),
            span: Span::dummy(),
        });
        assert!(!program.ends_with_expression());
    }
}
