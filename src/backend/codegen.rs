//! Python code generator
//!
//! Walks the AST and emits Python 3 source. Indentation is re-derived from
//! nesting depth; parentheses are re-inserted only where the tree shape
//! requires them.

use std::collections::BTreeSet;

use log::debug;

use crate::frontend::ast::*;
use crate::utils::{GeneratorError, Span};

type GenResult<T> = std::result::Result<T, GeneratorError>;

/// Hebrew builtin names and the Python expression each one aliases.
/// Prelude lines are emitted in this order.
pub const BUILTINS: &[(&str, &str)] = &[
    ("הדפס", "print"),
    ("קלט", "input"),
    ("אורך", "len"),
    ("טווח", "range"),
    ("בטווח", "range"),
    ("טיפוס", "type"),
    ("סוג", "type"),
    ("מספר_שלם", "int"),
    ("מספר_עשרוני", "float"),
    ("מחרוזת", "str"),
    ("בוליאני", "bool"),
    ("רשימה", "list"),
    ("מילון", "dict"),
    ("קבוצה", "set"),
    ("צמד", "tuple"),
    ("סכום", "sum"),
    ("מינימום", "min"),
    ("מקסימום", "max"),
    ("ממוין", "sorted"),
    ("הפוך", "reversed"),
    ("כל", "all"),
    ("כלשהו", "any"),
    ("מפה", "map"),
    ("סנן", "filter"),
    ("צמצם", "__import__(\"functools\").reduce"),
    ("מספור", "enumerate"),
    ("זוגות", "zip"),
    ("ערך_מוחלט", "abs"),
    ("עגל", "round"),
    ("פתח", "open"),
    ("מופע_של", "isinstance"),
    ("יש_תכונה", "hasattr"),
    ("שגיאה", "Exception"),
    ("שגיאת_ערך", "ValueError"),
    ("שגיאת_טיפוס", "TypeError"),
    ("שגיאת_מפתח", "KeyError"),
    ("שגיאת_אינדקס", "IndexError"),
    ("שגיאת_חלוקה", "ZeroDivisionError"),
    ("שגיאת_שם", "NameError"),
    ("שגיאת_קובץ", "FileNotFoundError"),
];

/// Name bound to the echoed result of a trailing expression
const RESULT_NAME: &str = "_";

// Binding strength, loosest first
const PREC_LAMBDA: u8 = 0;
const PREC_IFEXP: u8 = 1;
const PREC_OR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_CMP: u8 = 5;
const PREC_BITOR: u8 = 6;
const PREC_BITXOR: u8 = 7;
const PREC_BITAND: u8 = 8;
const PREC_SHIFT: u8 = 9;
const PREC_ARITH: u8 = 10;
const PREC_TERM: u8 = 11;
const PREC_UNARY: u8 = 12;
const PREC_POWER: u8 = 13;
const PREC_POSTFIX: u8 = 14;
const PREC_ATOM: u8 = 15;

fn binop_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::BitOr => PREC_BITOR,
        BinOp::BitXor => PREC_BITXOR,
        BinOp::BitAnd => PREC_BITAND,
        BinOp::Shl | BinOp::Shr => PREC_SHIFT,
        BinOp::Add | BinOp::Sub => PREC_ARITH,
        BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod | BinOp::MatMul => PREC_TERM,
        BinOp::Pow => PREC_POWER,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Lambda { .. } => PREC_LAMBDA,
        Expr::IfExp { .. } => PREC_IFEXP,
        Expr::BoolOp { op: BoolOp::Or, .. } => PREC_OR,
        Expr::BoolOp { op: BoolOp::And, .. } => PREC_AND,
        Expr::UnaryOp { op: UnaryOp::Not, .. } => PREC_NOT,
        Expr::Compare { .. } => PREC_CMP,
        Expr::BinaryOp { op, .. } => binop_precedence(*op),
        Expr::UnaryOp { .. } => PREC_UNARY,
        Expr::Call { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => PREC_POSTFIX,
        _ => PREC_ATOM,
    }
}

/// Python code generator
pub struct Generator {
    indent_level: usize,
    output: String,
    source_file: Option<String>,
    prelude: bool,
    echo_result: bool,
    used_builtins: BTreeSet<usize>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
            source_file: None,
            prelude: true,
            echo_result: false,
            used_builtins: BTreeSet::new(),
        }
    }

    /// Record the source file in a provenance header
    pub fn with_source_file(mut self, path: &str) -> Self {
        self.source_file = Some(path.to_string());
        self
    }

    /// Leave Hebrew builtin names unbound
    pub fn without_prelude(mut self) -> Self {
        self.prelude = false;
        self
    }

    /// Print the value of a trailing top-level expression as `=> value`
    /// unless it is `None`
    pub fn with_result_echo(mut self) -> Self {
        self.echo_result = true;
        self
    }

    /// Generate Python source for a whole program
    pub fn generate(&mut self, program: &Program) -> GenResult<String> {
        self.indent_level = 0;
        self.output.clear();
        self.used_builtins.clear();

        let echo_last = self.echo_result && program.ends_with_expression();
        for (i, stmt) in program.body.iter().enumerate() {
            match stmt {
                Stmt::Expr(e) if echo_last && i + 1 == program.body.len() => self.gen_echo(e)?,
                _ => self.gen_stmt(stmt)?,
            }
        }
        let body = std::mem::take(&mut self.output);

        let mut text = String::new();
        if let Some(ref src) = self.source_file {
            text.push_str("# Auto-generated from Nachshon source - DO NOT EDIT\n");
            text.push_str(&format!("# Source: {}\n\n", src));
        }
        if self.prelude && !self.used_builtins.is_empty() {
            for &index in &self.used_builtins {
                let (hebrew, python) = BUILTINS[index];
                text.push_str(&format!("{} = {}\n", hebrew, python));
            }
            text.push('\n');
        }
        text.push_str(&body);

        debug!(
            "generated {} lines ({} builtin aliases)",
            text.lines().count(),
            self.used_builtins.len()
        );
        Ok(text)
    }

    // ==================== Statements ====================

    fn gen_block(&mut self, body: &[Stmt], span: Span) -> GenResult<()> {
        if body.is_empty() {
            return Err(GeneratorError::at("empty block", span));
        }
        self.indent_level += 1;
        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.indent_level -= 1;
        Ok(())
    }

    /// `header:` followed by an indented block
    fn gen_clause(&mut self, header: &str, body: &[Stmt], span: Span) -> GenResult<()> {
        self.emit_line(&format!("{}:", header));
        self.gen_block(body, span)
    }

    fn gen_else(&mut self, keyword: &str, body: &Option<Vec<Stmt>>, span: Span) -> GenResult<()> {
        match body {
            Some(body) => self.gen_clause(keyword, body, span),
            None => Ok(()),
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> GenResult<()> {
        match stmt {
            Stmt::FunctionDef(f) => self.gen_function(f),
            Stmt::ClassDef(c) => self.gen_class(c),
            Stmt::If(i) => {
                let condition = self.gen_expr(&i.condition)?;
                self.gen_clause(&format!("if {}", condition), &i.body, i.span)?;
                for elif in &i.elifs {
                    let condition = self.gen_expr(&elif.condition)?;
                    self.gen_clause(&format!("elif {}", condition), &elif.body, elif.span)?;
                }
                self.gen_else("else", &i.orelse, i.span)
            }
            Stmt::While(w) => {
                let condition = self.gen_expr(&w.condition)?;
                self.gen_clause(&format!("while {}", condition), &w.body, w.span)?;
                self.gen_else("else", &w.orelse, w.span)
            }
            Stmt::For(f) => {
                let target = self.gen_target(&f.target)?;
                let iter = self.gen_expr(&f.iter)?;
                self.gen_clause(&format!("for {} in {}", target, iter), &f.body, f.span)?;
                self.gen_else("else", &f.orelse, f.span)
            }
            Stmt::Try(t) => {
                self.gen_clause("try", &t.body, t.span)?;
                for handler in &t.handlers {
                    let header = match (&handler.exc_type, &handler.name) {
                        (Some(exc_type), Some(name)) => {
                            format!("except {} as {}", self.gen_expr(exc_type)?, name)
                        }
                        (Some(exc_type), None) => format!("except {}", self.gen_expr(exc_type)?),
                        (None, _) => "except".to_string(),
                    };
                    self.gen_clause(&header, &handler.body, handler.span)?;
                }
                self.gen_else("else", &t.orelse, t.span)?;
                self.gen_else("finally", &t.finalbody, t.span)
            }
            Stmt::With(w) => {
                let mut items = Vec::with_capacity(w.items.len());
                for item in &w.items {
                    let context = self.gen_expr(&item.context)?;
                    items.push(match &item.target {
                        Some(target) => format!("{} as {}", context, self.gen_target(target)?),
                        None => context,
                    });
                }
                self.gen_clause(&format!("with {}", items.join(", ")), &w.body, w.span)
            }
            Stmt::Return { value, .. } => {
                let line = match value {
                    Some(value) => format!("return {}", self.gen_expr(value)?),
                    None => "return".to_string(),
                };
                self.emit_line(&line);
                Ok(())
            }
            Stmt::Break { .. } => {
                self.emit_line("break");
                Ok(())
            }
            Stmt::Continue { .. } => {
                self.emit_line("continue");
                Ok(())
            }
            Stmt::Pass { .. } => {
                self.emit_line("pass");
                Ok(())
            }
            Stmt::Raise { exc, cause, .. } => {
                let mut line = "raise".to_string();
                if let Some(exc) = exc {
                    line = format!("{} {}", line, self.gen_expr(exc)?);
                }
                if let Some(cause) = cause {
                    line = format!("{} from {}", line, self.gen_expr(cause)?);
                }
                self.emit_line(&line);
                Ok(())
            }
            Stmt::Assert { test, msg, .. } => {
                let mut line = format!("assert {}", self.gen_expr(test)?);
                if let Some(msg) = msg {
                    line = format!("{}, {}", line, self.gen_expr(msg)?);
                }
                self.emit_line(&line);
                Ok(())
            }
            Stmt::Import { names, .. } => {
                self.emit_line(&format!("import {}", import_names(names)));
                Ok(())
            }
            Stmt::ImportFrom { module, names, .. } => {
                let names = if names.is_empty() { "*".to_string() } else { import_names(names) };
                self.emit_line(&format!("from {} import {}", module, names));
                Ok(())
            }
            Stmt::Global { names, .. } => {
                self.emit_line(&format!("global {}", names.join(", ")));
                Ok(())
            }
            Stmt::Nonlocal { names, .. } => {
                self.emit_line(&format!("nonlocal {}", names.join(", ")));
                Ok(())
            }
            Stmt::Assign { targets, value, .. } => {
                let mut parts = Vec::with_capacity(targets.len() + 1);
                for target in targets {
                    parts.push(self.gen_target(target)?);
                }
                parts.push(self.gen_expr(value)?);
                self.emit_line(&parts.join(" = "));
                Ok(())
            }
            Stmt::AugAssign { target, op, value, .. } => {
                let target = self.gen_target(target)?;
                let value = self.gen_expr(value)?;
                self.emit_line(&format!("{} {}= {}", target, op.symbol(), value));
                Ok(())
            }
            Stmt::AnnAssign { target, annotation, value, .. } => {
                let mut line =
                    format!("{}: {}", self.gen_target(target)?, self.gen_expr(annotation)?);
                if let Some(value) = value {
                    line = format!("{} = {}", line, self.gen_expr(value)?);
                }
                self.emit_line(&line);
                Ok(())
            }
            Stmt::Expr(e) => {
                let line = self.gen_expr(e)?;
                self.emit_line(&line);
                Ok(())
            }
        }
    }

    fn gen_echo(&mut self, expr: &Expr) -> GenResult<()> {
        let value = self.gen_expr(expr)?;
        self.emit_line(&format!("{} = {}", RESULT_NAME, value));
        self.emit_line(&format!("if {} is not None:", RESULT_NAME));
        self.indent_level += 1;
        self.emit_line(&format!("print(\"=>\", repr({}))", RESULT_NAME));
        self.indent_level -= 1;
        Ok(())
    }

    fn gen_decorators(&mut self, decorators: &[Expr]) -> GenResult<()> {
        for decorator in decorators {
            let line = format!("@{}", self.gen_expr(decorator)?);
            self.emit_line(&line);
        }
        Ok(())
    }

    fn gen_function(&mut self, f: &FunctionDef) -> GenResult<()> {
        self.gen_decorators(&f.decorators)?;
        let mut header = format!("def {}({})", f.name, self.gen_params(&f.params, true)?);
        if let Some(returns) = &f.returns {
            header = format!("{} -> {}", header, self.gen_expr(returns)?);
        }
        self.gen_clause(&header, &f.body, f.span)
    }

    fn gen_params(&mut self, params: &[Param], annotations: bool) -> GenResult<String> {
        let mut parts = Vec::with_capacity(params.len());
        for param in params {
            let mut part = match param.kind {
                ParamKind::Normal => param.name.clone(),
                ParamKind::VarArgs => format!("*{}", param.name),
                ParamKind::KwArgs => format!("**{}", param.name),
            };
            let annotated = match &param.annotation {
                Some(annotation) if annotations => {
                    part = format!("{}: {}", part, self.gen_expr(annotation)?);
                    true
                }
                _ => false,
            };
            if let Some(default) = &param.default {
                let sep = if annotated { " = " } else { "=" };
                part = format!("{}{}{}", part, sep, self.gen_expr(default)?);
            }
            parts.push(part);
        }
        Ok(parts.join(", "))
    }

    fn gen_class(&mut self, c: &ClassDef) -> GenResult<()> {
        self.gen_decorators(&c.decorators)?;
        let header = if c.bases.is_empty() {
            format!("class {}", c.name)
        } else {
            format!("class {}({})", c.name, self.gen_args(&c.bases)?)
        };
        self.gen_clause(&header, &c.body, c.span)
    }

    // ==================== Expressions ====================

    /// Assignment or loop target; a top-level tuple is written bare
    fn gen_target(&mut self, target: &Expr) -> GenResult<String> {
        match target {
            Expr::Tuple { elts, .. } if !elts.is_empty() => {
                let items = self.gen_elements(elts)?;
                Ok(if elts.len() == 1 { format!("{},", items) } else { items })
            }
            other => self.gen_expr(other),
        }
    }

    /// Expression in a position that accepts any expression
    fn gen_expr(&mut self, expr: &Expr) -> GenResult<String> {
        self.gen_expr_prec(expr, PREC_LAMBDA)
    }

    /// Emit `expr`, parenthesized if it binds looser than `min`
    fn gen_expr_prec(&mut self, expr: &Expr, min: u8) -> GenResult<String> {
        let text = self.gen_expr_inner(expr)?;
        if precedence(expr) < min {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    fn gen_expr_inner(&mut self, expr: &Expr) -> GenResult<String> {
        match expr {
            Expr::Name { id, .. } => {
                if let Some(index) = BUILTINS.iter().position(|(hebrew, _)| hebrew == id) {
                    self.used_builtins.insert(index);
                }
                Ok(id.clone())
            }
            Expr::Literal { value, .. } => Ok(match value {
                Literal::Int(text) | Literal::Float(text) => text.clone(),
                Literal::Str(text) => python_string(text),
                Literal::True => "True".to_string(),
                Literal::False => "False".to_string(),
                Literal::None => "None".to_string(),
            }),
            Expr::List { elts, .. } => Ok(format!("[{}]", self.gen_elements(elts)?)),
            Expr::Tuple { elts, .. } => {
                let items = self.gen_elements(elts)?;
                Ok(if elts.len() == 1 { format!("({},)", items) } else { format!("({})", items) })
            }
            Expr::Set { elts, .. } => Ok(format!("{{{}}}", self.gen_elements(elts)?)),
            Expr::Dict { entries, .. } => {
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    parts.push(format!("{}: {}", self.gen_expr(key)?, self.gen_expr(value)?));
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Expr::ListComp { elt, generators, .. } => {
                Ok(format!("[{}{}]", self.gen_expr(elt)?, self.gen_comprehensions(generators)?))
            }
            Expr::SetComp { elt, generators, .. } => {
                Ok(format!("{{{}{}}}", self.gen_expr(elt)?, self.gen_comprehensions(generators)?))
            }
            Expr::GenExp { elt, generators, .. } => {
                Ok(format!("({}{})", self.gen_expr(elt)?, self.gen_comprehensions(generators)?))
            }
            Expr::DictComp { key, value, generators, .. } => Ok(format!(
                "{{{}: {}{}}}",
                self.gen_expr(key)?,
                self.gen_expr(value)?,
                self.gen_comprehensions(generators)?
            )),
            Expr::BinaryOp { left, op: BinOp::Pow, right, .. } => Ok(format!(
                "{} ** {}",
                self.gen_expr_prec(left, PREC_POSTFIX)?,
                self.gen_expr_prec(right, PREC_UNARY)?
            )),
            Expr::BinaryOp { left, op, right, .. } => {
                let prec = binop_precedence(*op);
                Ok(format!(
                    "{} {} {}",
                    self.gen_expr_prec(left, prec)?,
                    op.symbol(),
                    self.gen_expr_prec(right, prec + 1)?
                ))
            }
            Expr::UnaryOp { op: UnaryOp::Not, operand, .. } => {
                Ok(format!("not {}", self.gen_expr_prec(operand, PREC_NOT)?))
            }
            Expr::UnaryOp { op, operand, .. } => {
                let symbol = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Pos => "+",
                    _ => "~",
                };
                Ok(format!("{}{}", symbol, self.gen_expr_prec(operand, PREC_UNARY)?))
            }
            Expr::BoolOp { op, values, .. } => {
                let (keyword, prec) = match op {
                    BoolOp::And => (" and ", PREC_AND),
                    BoolOp::Or => (" or ", PREC_OR),
                };
                let mut parts = Vec::with_capacity(values.len());
                for value in values {
                    parts.push(self.gen_expr_prec(value, prec + 1)?);
                }
                Ok(parts.join(keyword))
            }
            Expr::Compare { left, ops, comparators, .. } => {
                let mut text = self.gen_expr_prec(left, PREC_CMP + 1)?;
                for (op, comparator) in ops.iter().zip(comparators) {
                    let right = self.gen_expr_prec(comparator, PREC_CMP + 1)?;
                    text = format!("{} {} {}", text, op.symbol(), right);
                }
                Ok(text)
            }
            Expr::IfExp { test, body, orelse, .. } => Ok(format!(
                "{} if {} else {}",
                self.gen_expr_prec(body, PREC_OR)?,
                self.gen_expr_prec(test, PREC_OR)?,
                self.gen_expr_prec(orelse, PREC_LAMBDA)?
            )),
            Expr::Lambda { params, body, .. } => {
                let params = self.gen_params(params, false)?;
                let body = self.gen_expr(body)?;
                if params.is_empty() {
                    Ok(format!("lambda: {}", body))
                } else {
                    Ok(format!("lambda {}: {}", params, body))
                }
            }
            Expr::Call { func, args, .. } => {
                let func = self.gen_expr_prec(func, PREC_POSTFIX)?;
                Ok(format!("{}({})", func, self.gen_args(args)?))
            }
            Expr::Attribute { value, attr, .. } => {
                let object = match value.as_ref() {
                    // `1.real` would lex as a float
                    Expr::Literal { value: Literal::Int(_), .. } => {
                        format!("({})", self.gen_expr(value)?)
                    }
                    other => self.gen_expr_prec(other, PREC_POSTFIX)?,
                };
                Ok(format!("{}.{}", object, attr))
            }
            Expr::Subscript { value, index, .. } => {
                let object = self.gen_expr_prec(value, PREC_POSTFIX)?;
                Ok(format!("{}[{}]", object, self.gen_index(index)?))
            }
            Expr::Slice { span, .. } => {
                Err(GeneratorError::at("slice outside of a subscript", *span))
            }
            Expr::Starred { span, .. } => Err(GeneratorError::at(
                "starred expression outside of an unpacking context",
                *span,
            )),
        }
    }

    /// Collection elements, where `*value` unpacking is allowed
    fn gen_elements(&mut self, elts: &[Expr]) -> GenResult<String> {
        let mut parts = Vec::with_capacity(elts.len());
        for elt in elts {
            parts.push(match elt {
                Expr::Starred { value, .. } => format!("*{}", self.gen_expr_prec(value, PREC_BITOR)?),
                other => self.gen_expr(other)?,
            });
        }
        Ok(parts.join(", "))
    }

    fn gen_args(&mut self, args: &[Arg]) -> GenResult<String> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(match arg {
                Arg::Positional(value) => self.gen_expr(value)?,
                Arg::Keyword { name, value, .. } => format!("{}={}", name, self.gen_expr(value)?),
                Arg::Unpack(value) => format!("*{}", self.gen_expr(value)?),
                Arg::UnpackDict(value) => format!("**{}", self.gen_expr(value)?),
            });
        }
        Ok(parts.join(", "))
    }

    /// Subscript index: plain expression, slice, or a bare tuple of either
    fn gen_index(&mut self, index: &Expr) -> GenResult<String> {
        match index {
            Expr::Slice { lower, upper, step, .. } => {
                let mut text = String::new();
                if let Some(lower) = lower {
                    text.push_str(&self.gen_expr(lower)?);
                }
                text.push(':');
                if let Some(upper) = upper {
                    text.push_str(&self.gen_expr(upper)?);
                }
                if let Some(step) = step {
                    text.push(':');
                    text.push_str(&self.gen_expr(step)?);
                }
                Ok(text)
            }
            Expr::Tuple { elts, .. } if !elts.is_empty() => {
                let mut parts = Vec::with_capacity(elts.len());
                for elt in elts {
                    parts.push(self.gen_index(elt)?);
                }
                let text = parts.join(", ");
                Ok(if elts.len() == 1 { format!("{},", text) } else { text })
            }
            other => self.gen_expr(other),
        }
    }

    fn gen_comprehensions(&mut self, generators: &[Comprehension]) -> GenResult<String> {
        let mut text = String::new();
        for generator in generators {
            let target = self.gen_target(&generator.target)?;
            let iter = self.gen_expr_prec(&generator.iter, PREC_OR)?;
            text.push_str(&format!(" for {} in {}", target, iter));
            for condition in &generator.ifs {
                text.push_str(&format!(" if {}", self.gen_expr_prec(condition, PREC_OR)?));
            }
        }
        Ok(text)
    }

    // --- Emit Helpers ---

    fn emit_line(&mut self, s: &str) {
        self.emit_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("    ");
        }
    }
}

fn import_names(names: &[ImportAlias]) -> String {
    names
        .iter()
        .map(|n| match &n.alias {
            Some(alias) => format!("{} as {}", n.name, alias),
            None => n.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Double-quoted Python string literal for an already-unescaped value
fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
