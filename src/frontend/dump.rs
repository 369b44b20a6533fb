//! Human-readable AST outline, one node per line

use std::fmt::Write;

use crate::frontend::ast::*;

/// Render a program as an indented tree
pub fn dump_program(program: &Program) -> String {
    let mut dumper = Dumper { out: String::new(), depth: 0 };
    for stmt in &program.body {
        dumper.stmt(stmt);
    }
    dumper.out
}

struct Dumper {
    out: String,
    depth: usize,
}

impl Dumper {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn nested(&mut self, label: &str, f: impl FnOnce(&mut Self)) {
        self.line(label);
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn block(&mut self, label: &str, body: &[Stmt]) {
        self.nested(label, |d| body.iter().for_each(|s| d.stmt(s)));
    }

    fn opt_block(&mut self, label: &str, body: &Option<Vec<Stmt>>) {
        if let Some(body) = body {
            self.block(label, body);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        let line = stmt.span().line;
        match stmt {
            Stmt::FunctionDef(f) => self.nested(&format!("FunctionDef {} @{}", f.name, line), |d| {
                d.decorators(&f.decorators);
                d.params(&f.params);
                if let Some(returns) = &f.returns {
                    d.labeled("returns", returns);
                }
                d.block("body", &f.body);
            }),
            Stmt::ClassDef(c) => self.nested(&format!("ClassDef {} @{}", c.name, line), |d| {
                d.decorators(&c.decorators);
                if !c.bases.is_empty() {
                    d.nested("bases", |d| c.bases.iter().for_each(|a| d.arg(a)));
                }
                d.block("body", &c.body);
            }),
            Stmt::If(i) => self.nested(&format!("If @{}", line), |d| {
                d.labeled("condition", &i.condition);
                d.block("body", &i.body);
                for elif in &i.elifs {
                    d.nested("elif", |d| {
                        d.labeled("condition", &elif.condition);
                        d.block("body", &elif.body);
                    });
                }
                d.opt_block("else", &i.orelse);
            }),
            Stmt::While(w) => self.nested(&format!("While @{}", line), |d| {
                d.labeled("condition", &w.condition);
                d.block("body", &w.body);
                d.opt_block("else", &w.orelse);
            }),
            Stmt::For(f) => self.nested(&format!("For @{}", line), |d| {
                d.labeled("target", &f.target);
                d.labeled("iter", &f.iter);
                d.block("body", &f.body);
                d.opt_block("else", &f.orelse);
            }),
            Stmt::Try(t) => self.nested(&format!("Try @{}", line), |d| {
                d.block("body", &t.body);
                for handler in &t.handlers {
                    let label = match &handler.name {
                        Some(name) => format!("except as {}", name),
                        None => "except".to_string(),
                    };
                    d.nested(&label, |d| {
                        if let Some(exc_type) = &handler.exc_type {
                            d.labeled("type", exc_type);
                        }
                        d.block("body", &handler.body);
                    });
                }
                d.opt_block("else", &t.orelse);
                d.opt_block("finally", &t.finalbody);
            }),
            Stmt::With(w) => self.nested(&format!("With @{}", line), |d| {
                for item in &w.items {
                    d.nested("item", |d| {
                        d.expr(&item.context);
                        if let Some(target) = &item.target {
                            d.labeled("as", target);
                        }
                    });
                }
                d.block("body", &w.body);
            }),
            Stmt::Return { value, .. } => self.nested(&format!("Return @{}", line), |d| {
                if let Some(value) = value {
                    d.expr(value);
                }
            }),
            Stmt::Break { .. } => self.line(format!("Break @{}", line)),
            Stmt::Continue { .. } => self.line(format!("Continue @{}", line)),
            Stmt::Pass { .. } => self.line(format!("Pass @{}", line)),
            Stmt::Raise { exc, cause, .. } => self.nested(&format!("Raise @{}", line), |d| {
                if let Some(exc) = exc {
                    d.expr(exc);
                }
                if let Some(cause) = cause {
                    d.labeled("from", cause);
                }
            }),
            Stmt::Assert { test, msg, .. } => self.nested(&format!("Assert @{}", line), |d| {
                d.expr(test);
                if let Some(msg) = msg {
                    d.labeled("message", msg);
                }
            }),
            Stmt::Import { names, .. } => {
                self.line(format!("Import {} @{}", aliases(names), line));
            }
            Stmt::ImportFrom { module, names, .. } => {
                let names = if names.is_empty() { "*".to_string() } else { aliases(names) };
                self.line(format!("ImportFrom {} : {} @{}", module, names, line));
            }
            Stmt::Global { names, .. } => self.line(format!("Global {} @{}", names.join(", "), line)),
            Stmt::Nonlocal { names, .. } => {
                self.line(format!("Nonlocal {} @{}", names.join(", "), line))
            }
            Stmt::Assign { targets, value, .. } => self.nested(&format!("Assign @{}", line), |d| {
                targets.iter().for_each(|t| d.labeled("target", t));
                d.labeled("value", value);
            }),
            Stmt::AugAssign { target, op, value, .. } => {
                self.nested(&format!("AugAssign {}= @{}", op.symbol(), line), |d| {
                    d.labeled("target", target);
                    d.labeled("value", value);
                })
            }
            Stmt::AnnAssign { target, annotation, value, .. } => {
                self.nested(&format!("AnnAssign @{}", line), |d| {
                    d.labeled("target", target);
                    d.labeled("annotation", annotation);
                    if let Some(value) = value {
                        d.labeled("value", value);
                    }
                })
            }
            Stmt::Expr(e) => self.nested(&format!("Expr @{}", line), |d| d.expr(e)),
        }
    }

    fn decorators(&mut self, decorators: &[Expr]) {
        if !decorators.is_empty() {
            self.nested("decorators", |d| decorators.iter().for_each(|e| d.expr(e)));
        }
    }

    fn params(&mut self, params: &[Param]) {
        if params.is_empty() {
            return;
        }
        self.nested("params", |d| {
            for param in params {
                let prefix = match param.kind {
                    ParamKind::Normal => "",
                    ParamKind::VarArgs => "*",
                    ParamKind::KwArgs => "**",
                };
                d.nested(&format!("Param {}{}", prefix, param.name), |d| {
                    if let Some(annotation) = &param.annotation {
                        d.labeled("annotation", annotation);
                    }
                    if let Some(default) = &param.default {
                        d.labeled("default", default);
                    }
                });
            }
        });
    }

    fn labeled(&mut self, label: &str, expr: &Expr) {
        self.nested(label, |d| d.expr(expr));
    }

    fn arg(&mut self, arg: &Arg) {
        match arg {
            Arg::Positional(e) => self.expr(e),
            Arg::Keyword { name, value, .. } => self.labeled(&format!("{}=", name), value),
            Arg::Unpack(e) => self.labeled("*", e),
            Arg::UnpackDict(e) => self.labeled("**", e),
        }
    }

    fn generators(&mut self, generators: &[Comprehension]) {
        for gen in generators {
            self.nested("for", |d| {
                d.labeled("target", &gen.target);
                d.labeled("iter", &gen.iter);
                gen.ifs.iter().for_each(|cond| d.labeled("if", cond));
            });
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name { id, .. } => self.line(format!("Name {}", id)),
            Expr::Literal { value, .. } => self.line(match value {
                Literal::Int(text) => format!("Int {}", text),
                Literal::Float(text) => format!("Float {}", text),
                Literal::Str(text) => format!("Str {:?}", text),
                Literal::True => "True".to_string(),
                Literal::False => "False".to_string(),
                Literal::None => "None".to_string(),
            }),
            Expr::List { elts, .. } => self.nested("List", |d| elts.iter().for_each(|e| d.expr(e))),
            Expr::Tuple { elts, .. } => self.nested("Tuple", |d| elts.iter().for_each(|e| d.expr(e))),
            Expr::Set { elts, .. } => self.nested("Set", |d| elts.iter().for_each(|e| d.expr(e))),
            Expr::Dict { entries, .. } => self.nested("Dict", |d| {
                for (key, value) in entries {
                    d.labeled("key", key);
                    d.labeled("value", value);
                }
            }),
            Expr::ListComp { elt, generators, .. } => self.nested("ListComp", |d| {
                d.expr(elt);
                d.generators(generators);
            }),
            Expr::SetComp { elt, generators, .. } => self.nested("SetComp", |d| {
                d.expr(elt);
                d.generators(generators);
            }),
            Expr::GenExp { elt, generators, .. } => self.nested("GenExp", |d| {
                d.expr(elt);
                d.generators(generators);
            }),
            Expr::DictComp { key, value, generators, .. } => self.nested("DictComp", |d| {
                d.labeled("key", key);
                d.labeled("value", value);
                d.generators(generators);
            }),
            Expr::BinaryOp { left, op, right, .. } => {
                self.nested(&format!("BinaryOp {}", op.symbol()), |d| {
                    d.expr(left);
                    d.expr(right);
                })
            }
            Expr::UnaryOp { op, operand, .. } => {
                let symbol = match op {
                    UnaryOp::Not => "not",
                    UnaryOp::Neg => "-",
                    UnaryOp::Pos => "+",
                    UnaryOp::Invert => "~",
                };
                self.nested(&format!("UnaryOp {}", symbol), |d| d.expr(operand))
            }
            Expr::BoolOp { op, values, .. } => {
                let label = if *op == BoolOp::And { "BoolOp and" } else { "BoolOp or" };
                self.nested(label, |d| values.iter().for_each(|v| d.expr(v)))
            }
            Expr::Compare { left, ops, comparators, .. } => {
                let mut label = "Compare".to_string();
                for op in ops {
                    let _ = write!(label, " {}", op.symbol());
                }
                self.nested(&label, |d| {
                    d.expr(left);
                    comparators.iter().for_each(|c| d.expr(c));
                })
            }
            Expr::IfExp { test, body, orelse, .. } => self.nested("IfExp", |d| {
                d.labeled("test", test);
                d.labeled("body", body);
                d.labeled("else", orelse);
            }),
            Expr::Lambda { params, body, .. } => self.nested("Lambda", |d| {
                d.params(params);
                d.labeled("body", body);
            }),
            Expr::Call { func, args, .. } => self.nested("Call", |d| {
                d.expr(func);
                if !args.is_empty() {
                    d.nested("args", |d| args.iter().for_each(|a| d.arg(a)));
                }
            }),
            Expr::Attribute { value, attr, .. } => {
                self.nested(&format!("Attribute .{}", attr), |d| d.expr(value))
            }
            Expr::Subscript { value, index, .. } => self.nested("Subscript", |d| {
                d.expr(value);
                d.labeled("index", index);
            }),
            Expr::Slice { lower, upper, step, .. } => self.nested("Slice", |d| {
                for (label, part) in [("lower", lower), ("upper", upper), ("step", step)] {
                    if let Some(part) = part {
                        d.labeled(label, part);
                    }
                }
            }),
            Expr::Starred { value, .. } => self.nested("Starred", |d| d.expr(value)),
        }
    }
}

fn aliases(names: &[ImportAlias]) -> String {
    names
        .iter()
        .map(|a| match &a.alias {
            Some(alias) => format!("{} as {}", a.name, alias),
            None => a.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use pretty_assertions::assert_eq;

    fn dump(source: &str) -> String {
        let tokens = Lexer::new(source).tokenize().unwrap();
        dump_program(&Parser::new(tokens).parse_program().unwrap())
    }

    #[test]
    fn test_dump_function() {
        let expected = "\
FunctionDef ריבוע @1
  params
    Param מספר_
  body
    Return @2
      BinaryOp *
        Name מספר_
        Name מספר_
";
        assert_eq!(dump("הגדר ריבוע(מספר_):\n    החזר מספר_ * מספר_\n"), expected);
    }

    #[test]
    fn test_dump_statements_on_separate_lines() {
        let expected = "\
Assign @1
  target
    Name א
  value
    Int 1
Pass @2
Expr @3
  Call
    Name הדפס
    args
      Str \"שלום\"
      sep=
        Str \"\"
";
        assert_eq!(dump("א = 1\nהעבר\nהדפס(\"שלום\", sep=\"\")\n"), expected);
    }
}
