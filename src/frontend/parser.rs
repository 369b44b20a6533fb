//! Parser for Nachshon
//!
//! Recursive descent for statements, precedence climbing for binary
//! operators. Parsing stops at the first unexpected token.

use log::debug;

use crate::frontend::ast::*;
use crate::frontend::token::{Keyword, Token, TokenKind};
use crate::utils::{ParserError, Span};

type ParseResult<T> = std::result::Result<T, ParserError>;

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser from pre-tokenized input
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or_else(Span::dummy, |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(&TokenKind::Keyword(keyword))
    }

    fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        self.consume(&TokenKind::Keyword(keyword))
    }

    fn error(&self, message: impl Into<String>, expected: impl Into<String>) -> ParserError {
        let token = self.current();
        ParserError::new(message, expected, token.describe(), token.span)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {}", expected), expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<Token> {
        let expected = format!("'{}'", keyword.spelling());
        self.expect(TokenKind::Keyword(keyword), &expected)
    }

    fn expect_ident(&mut self, expected: &str) -> ParseResult<(String, Span)> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => Ok((name, self.advance().span)),
            _ => Err(self.error(format!("expected {}", expected), expected)),
        }
    }

    /// Can the current token begin an expression?
    fn starts_expression(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Integer(_)
                | TokenKind::Float(_)
                | TokenKind::String(_)
                | TokenKind::Keyword(
                    Keyword::True | Keyword::False | Keyword::None | Keyword::Not | Keyword::Lambda
                )
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Star
        )
    }

    fn at_simple_stmt_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof)
    }

    // ==================== Statements ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            if self.consume(&TokenKind::Newline) {
                continue;
            }
            body.extend(self.parse_statement()?);
        }
        debug!("parsed {} top-level statements", body.len());
        Ok(Program { body })
    }

    /// Parse one statement line. A line of `;`-separated simple statements
    /// yields several statements.
    fn parse_statement(&mut self) -> ParseResult<Vec<Stmt>> {
        let stmt = match self.current_kind() {
            TokenKind::Keyword(Keyword::If) => self.parse_if()?,
            TokenKind::Keyword(Keyword::While) => self.parse_while()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for()?,
            TokenKind::Keyword(Keyword::Try) => self.parse_try()?,
            TokenKind::Keyword(Keyword::With) => self.parse_with()?,
            TokenKind::Keyword(Keyword::Def) => {
                let span = self.current().span;
                Stmt::FunctionDef(self.parse_function(Vec::new(), span)?)
            }
            TokenKind::Keyword(Keyword::Class) => {
                let span = self.current().span;
                Stmt::ClassDef(self.parse_class(Vec::new(), span)?)
            }
            TokenKind::At => self.parse_decorated()?,
            TokenKind::Indent => return Err(self.error("unexpected indent", "statement")),
            _ => return self.parse_simple_line(),
        };
        Ok(vec![stmt])
    }

    /// `simple_stmt (';' simple_stmt)* [';'] NEWLINE`
    fn parse_simple_line(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_simple_stmt()?];
        while self.consume(&TokenKind::Semicolon) {
            if self.check(&TokenKind::Newline) {
                break;
            }
            stmts.push(self.parse_simple_stmt()?);
        }
        self.expect(TokenKind::Newline, "end of line")?;
        Ok(stmts)
    }

    fn parse_simple_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.current().span;
        let keyword = match self.current_kind() {
            TokenKind::Keyword(k) => Some(*k),
            _ => None,
        };
        match keyword {
            Some(Keyword::Return) => {
                self.advance();
                let value = if self.at_simple_stmt_end() {
                    None
                } else {
                    Some(self.parse_expr_list()?)
                };
                Ok(Stmt::Return { value, span })
            }
            Some(Keyword::Break) => {
                self.advance();
                Ok(Stmt::Break { span })
            }
            Some(Keyword::Continue) => {
                self.advance();
                Ok(Stmt::Continue { span })
            }
            Some(Keyword::Pass) => {
                self.advance();
                Ok(Stmt::Pass { span })
            }
            Some(Keyword::Raise) => {
                self.advance();
                let exc = if self.at_simple_stmt_end() { None } else { Some(self.parse_expr()?) };
                let cause = match exc {
                    Some(_) if self.consume_keyword(Keyword::From) => Some(self.parse_expr()?),
                    _ => None,
                };
                Ok(Stmt::Raise { exc, cause, span })
            }
            Some(Keyword::Assert) => {
                self.advance();
                let test = self.parse_expr()?;
                let msg = if self.consume(&TokenKind::Comma) { Some(self.parse_expr()?) } else { None };
                Ok(Stmt::Assert { test, msg, span })
            }
            Some(Keyword::Import) => {
                self.advance();
                let mut names = vec![self.parse_import_alias(true)?];
                while self.consume(&TokenKind::Comma) {
                    names.push(self.parse_import_alias(true)?);
                }
                Ok(Stmt::Import { names, span })
            }
            Some(Keyword::From) => self.parse_import_from(),
            Some(Keyword::Global) | Some(Keyword::Nonlocal) => {
                self.advance();
                let mut names = vec![self.expect_ident("name")?.0];
                while self.consume(&TokenKind::Comma) {
                    names.push(self.expect_ident("name")?.0);
                }
                if keyword == Some(Keyword::Global) {
                    Ok(Stmt::Global { names, span })
                } else {
                    Ok(Stmt::Nonlocal { names, span })
                }
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_dotted_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident("module name")?.0;
        while self.consume(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident("name after '.'")?.0);
        }
        Ok(name)
    }

    fn parse_import_alias(&mut self, dotted: bool) -> ParseResult<ImportAlias> {
        let span = self.current().span;
        let name = if dotted { self.parse_dotted_name()? } else { self.expect_ident("name")?.0 };
        let alias = if self.consume_keyword(Keyword::As) {
            Some(self.expect_ident("alias name")?.0)
        } else {
            None
        };
        Ok(ImportAlias { name, alias, span })
    }

    /// `from [.]*module import (names | '*' | '(' names ')')`
    fn parse_import_from(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let mut module = String::new();
        while self.consume(&TokenKind::Dot) {
            module.push('.');
        }
        if module.is_empty() || matches!(self.current_kind(), TokenKind::Ident(_)) {
            module.push_str(&self.parse_dotted_name()?);
        }
        self.expect_keyword(Keyword::Import)?;

        if self.consume(&TokenKind::Star) {
            return Ok(Stmt::ImportFrom { module, names: Vec::new(), span });
        }
        let parenthesized = self.consume(&TokenKind::LParen);
        let mut names = vec![self.parse_import_alias(false)?];
        while self.consume(&TokenKind::Comma) {
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
            names.push(self.parse_import_alias(false)?);
        }
        if parenthesized {
            self.expect(TokenKind::RParen, "')'")?;
        }
        Ok(Stmt::ImportFrom { module, names, span })
    }

    /// Expression statement, assignment, augmented or annotated assignment
    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.current().span;
        let first = self.parse_star_expr_list()?;

        if self.check(&TokenKind::Colon) {
            self.check_single_target(&first)?;
            self.advance();
            let annotation = self.parse_expr()?;
            let value = if self.consume(&TokenKind::Eq) {
                Some(self.parse_star_expr_list()?)
            } else {
                None
            };
            return Ok(Stmt::AnnAssign { target: first, annotation, value, span });
        }

        if let Some(op) = aug_assign_op(self.current_kind()) {
            self.check_single_target(&first)?;
            self.advance();
            let value = self.parse_expr_list()?;
            return Ok(Stmt::AugAssign { target: first, op, value, span });
        }

        if self.check(&TokenKind::Eq) {
            let mut targets = Vec::new();
            let mut value = first;
            while self.consume(&TokenKind::Eq) {
                let next = self.parse_star_expr_list()?;
                targets.push(std::mem::replace(&mut value, next));
            }
            for target in &targets {
                check_target(target)?;
            }
            self.check_no_star(&value)?;
            return Ok(Stmt::Assign { targets, value, span });
        }

        self.check_no_star(&first)?;
        Ok(Stmt::Expr(first))
    }

    fn check_single_target(&self, target: &Expr) -> ParseResult<()> {
        match target {
            Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => Ok(()),
            other => Err(ParserError::new(
                "only a single name, attribute or subscript can be the target here",
                "single assignment target",
                "expression",
                other.span(),
            )),
        }
    }

    fn check_no_star(&self, expr: &Expr) -> ParseResult<()> {
        match expr {
            Expr::Starred { span, .. } => Err(ParserError::new(
                "starred expression is only allowed inside a collection or assignment target",
                "expression",
                "'*'",
                *span,
            )),
            _ => Ok(()),
        }
    }

    // ==================== Compound Statements ====================

    /// `':' (simple_line | NEWLINE INDENT statement+ DEDENT)`
    fn parse_suite(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::Colon, "':'")?;
        if !self.consume(&TokenKind::Newline) {
            return self.parse_simple_line();
        }
        self.expect(TokenKind::Indent, "indented block")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.is_at_end() {
            stmts.extend(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent, "end of block")?;
        Ok(stmts)
    }

    fn parse_else_suite(&mut self) -> ParseResult<Option<Vec<Stmt>>> {
        if self.consume_keyword(Keyword::Else) {
            Ok(Some(self.parse_suite()?))
        } else {
            Ok(None)
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let condition = self.parse_expr()?;
        let body = self.parse_suite()?;

        let mut elifs = Vec::new();
        while self.check_keyword(Keyword::Elif) {
            let span = self.advance().span;
            let condition = self.parse_expr()?;
            let body = self.parse_suite()?;
            elifs.push(ElifClause { condition, body, span });
        }
        let orelse = self.parse_else_suite()?;

        Ok(Stmt::If(IfStmt { condition, body, elifs, orelse, span }))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let condition = self.parse_expr()?;
        let body = self.parse_suite()?;
        let orelse = self.parse_else_suite()?;
        Ok(Stmt::While(WhileStmt { condition, body, orelse, span }))
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let target = self.parse_target_list()?;
        self.expect_keyword(Keyword::In)?;
        let iter = self.parse_star_expr_list()?;
        let body = self.parse_suite()?;
        let orelse = self.parse_else_suite()?;
        Ok(Stmt::For(ForStmt { target, iter, body, orelse, span }))
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let body = self.parse_suite()?;

        let mut handlers: Vec<ExceptHandler> = Vec::new();
        while self.check_keyword(Keyword::Except) {
            if handlers.last().map_or(false, |h| h.exc_type.is_none()) {
                return Err(self.error("a bare 'תפוס' must be the last handler", "'אחרת' or 'לבסוף'"));
            }
            let span = self.advance().span;
            let mut exc_type = None;
            let mut name = None;
            if !self.check(&TokenKind::Colon) {
                exc_type = Some(self.parse_expr()?);
                if self.consume_keyword(Keyword::As) {
                    name = Some(self.expect_ident("exception name")?.0);
                }
            }
            let body = self.parse_suite()?;
            handlers.push(ExceptHandler { exc_type, name, body, span });
        }

        let orelse = if !handlers.is_empty() { self.parse_else_suite()? } else { None };
        let finalbody = if self.consume_keyword(Keyword::Finally) {
            Some(self.parse_suite()?)
        } else {
            None
        };
        if handlers.is_empty() && finalbody.is_none() {
            return Err(self.error("'נסה' needs at least one handler", "'תפוס' or 'לבסוף'"));
        }

        Ok(Stmt::Try(TryStmt { body, handlers, orelse, finalbody, span }))
    }

    fn parse_with(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let mut items = Vec::new();
        loop {
            let item_span = self.current().span;
            let context = self.parse_expr()?;
            let target = if self.consume_keyword(Keyword::As) {
                let target = self.parse_target()?;
                check_target(&target)?;
                Some(target)
            } else {
                None
            };
            items.push(WithItem { context, target, span: item_span });
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        let body = self.parse_suite()?;
        Ok(Stmt::With(WithStmt { items, body, span }))
    }

    /// `('@' expr NEWLINE)+ (def | class)`
    fn parse_decorated(&mut self) -> ParseResult<Stmt> {
        let span = self.current().span;
        let mut decorators = Vec::new();
        while self.consume(&TokenKind::At) {
            decorators.push(self.parse_expr()?);
            self.expect(TokenKind::Newline, "end of line after decorator")?;
        }
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Def) => {
                Ok(Stmt::FunctionDef(self.parse_function(decorators, span)?))
            }
            TokenKind::Keyword(Keyword::Class) => {
                Ok(Stmt::ClassDef(self.parse_class(decorators, span)?))
            }
            _ => Err(self.error(
                "a decorator must be followed by a function or class definition",
                "'הגדר' or 'מחלקה'",
            )),
        }
    }

    fn parse_function(&mut self, decorators: Vec<Expr>, span: Span) -> ParseResult<FunctionDef> {
        self.expect_keyword(Keyword::Def)?;
        let (name, _) = self.expect_ident("function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params(&TokenKind::RParen, true)?;
        self.expect(TokenKind::RParen, "')'")?;
        let returns = if self.consume(&TokenKind::Arrow) { Some(self.parse_expr()?) } else { None };
        let body = self.parse_suite()?;
        Ok(FunctionDef { name, decorators, params, returns, body, span })
    }

    /// Parameter list up to (not including) `closing`
    fn parse_params(&mut self, closing: &TokenKind, annotations: bool) -> ParseResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        let mut seen_default = false;

        while !self.check(closing) {
            let span = self.current().span;
            let kind = if self.consume(&TokenKind::DoubleStar) {
                ParamKind::KwArgs
            } else if self.consume(&TokenKind::Star) {
                ParamKind::VarArgs
            } else {
                ParamKind::Normal
            };

            if params.iter().any(|p| p.kind == ParamKind::KwArgs) {
                return Err(ParserError::new(
                    "no parameter may follow a '**' parameter",
                    "')'",
                    self.tokens[self.pos - 1].describe(),
                    span,
                ));
            }
            if kind == ParamKind::VarArgs && params.iter().any(|p| p.kind == ParamKind::VarArgs) {
                return Err(ParserError::new("duplicate '*' parameter", "parameter", "'*'", span));
            }

            let (name, _) = self.expect_ident("parameter name")?;
            let annotation = if annotations && self.consume(&TokenKind::Colon) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let default = if kind == ParamKind::Normal && self.consume(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };

            let after_varargs = params.iter().any(|p| p.kind == ParamKind::VarArgs);
            if kind == ParamKind::Normal && !after_varargs {
                if default.is_some() {
                    seen_default = true;
                } else if seen_default {
                    return Err(ParserError::new(
                        "parameter without a default follows a parameter with a default",
                        "'='",
                        format!("'{}'", name),
                        span,
                    ));
                }
            }

            params.push(Param { name, kind, annotation, default, span });
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_class(&mut self, decorators: Vec<Expr>, span: Span) -> ParseResult<ClassDef> {
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_ident("class name")?;
        let bases = if self.consume(&TokenKind::LParen) { self.parse_call_args()? } else { Vec::new() };
        let body = self.parse_suite()?;
        Ok(ClassDef { name, decorators, bases, body, span })
    }

    // ==================== Expression Lists & Targets ====================

    /// `expr (',' expr)* [',']`; a tuple when a comma is present
    fn parse_expr_list(&mut self) -> ParseResult<Expr> {
        self.parse_list_of(Self::parse_expr)
    }

    /// Like `parse_expr_list`, but elements may be `*starred`
    fn parse_star_expr_list(&mut self) -> ParseResult<Expr> {
        self.parse_list_of(Self::parse_star_or_expr)
    }

    fn parse_list_of(&mut self, item: fn(&mut Self) -> ParseResult<Expr>) -> ParseResult<Expr> {
        let span = self.current().span;
        let first = item(self)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.consume(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elts.push(item(self)?);
        }
        Ok(Expr::Tuple { elts, span })
    }

    fn parse_star_or_expr(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Star) {
            let span = self.advance().span;
            let value = self.parse_bitor()?;
            return Ok(Expr::Starred { value: Box::new(value), span });
        }
        self.parse_expr()
    }

    /// Single loop/`as` target, parsed below the comparison level so that
    /// a following `בתוך` is not swallowed
    fn parse_target(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Star) {
            let span = self.advance().span;
            let value = self.parse_bitor()?;
            return Ok(Expr::Starred { value: Box::new(value), span });
        }
        self.parse_bitor()
    }

    fn parse_target_list(&mut self) -> ParseResult<Expr> {
        let target = self.parse_list_of(Self::parse_target)?;
        check_target(&target)?;
        Ok(target)
    }

    // ==================== Expressions ====================

    /// Entry point: lambda > ternary > or > and > not > comparison > ...
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        if self.check_keyword(Keyword::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_or()?;
        if !self.check_keyword(Keyword::If) {
            return Ok(body);
        }
        self.advance();
        let test = self.parse_or()?;
        self.expect_keyword(Keyword::Else)?;
        let orelse = self.parse_expr()?;
        let span = body.span();
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
            span,
        })
    }

    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let span = self.advance().span;
        let params = self.parse_params(&TokenKind::Colon, false)?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_expr()?;
        Ok(Expr::Lambda { params, body: Box::new(body), span })
    }

    fn parse_bool_chain(
        &mut self,
        keyword: Keyword,
        op: BoolOp,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let first = operand(self)?;
        if !self.check_keyword(keyword) {
            return Ok(first);
        }
        let span = first.span();
        let mut values = vec![first];
        while self.consume_keyword(keyword) {
            values.push(operand(self)?);
        }
        Ok(Expr::BoolOp { op, values, span })
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        self.parse_bool_chain(Keyword::Or, BoolOp::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        self.parse_bool_chain(Keyword::And, BoolOp::And, Self::parse_not)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.check_keyword(Keyword::Not) {
            let span = self.advance().span;
            let operand = self.parse_not()?;
            return Ok(Expr::UnaryOp { op: UnaryOp::Not, operand: Box::new(operand), span });
        }
        self.parse_comparison()
    }

    /// Comparison chain; `a < b < c` keeps every operand
    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => CmpOp::Eq,
                TokenKind::NotEq => CmpOp::NotEq,
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::LtEq => CmpOp::LtE,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::GtEq => CmpOp::GtE,
                TokenKind::Keyword(Keyword::In) => CmpOp::In,
                TokenKind::Keyword(Keyword::Not)
                    if self.peek_kind() == Some(&TokenKind::Keyword(Keyword::In)) =>
                {
                    self.advance();
                    CmpOp::NotIn
                }
                TokenKind::Keyword(Keyword::Is) => {
                    if self.peek_kind() == Some(&TokenKind::Keyword(Keyword::Not)) {
                        self.advance();
                        CmpOp::IsNot
                    } else {
                        CmpOp::Is
                    }
                }
                _ => break,
            };
            self.advance();
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }

        if ops.is_empty() {
            return Ok(left);
        }
        let span = left.span();
        Ok(Expr::Compare { left: Box::new(left), ops, comparators, span })
    }

    fn parse_bitor(&mut self) -> ParseResult<Expr> {
        self.parse_binary(1)
    }

    /// Precedence climbing over `| ^ & << >> + - * / // % @`
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(prec) = self.current_kind().binary_precedence() {
            if prec < min_prec {
                break;
            }
            let op = binary_op(&self.advance().kind);
            let right = self.parse_binary(prec + 1)?;
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Tilde => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        let span = self.advance().span;
        let operand = self.parse_unary()?;
        Ok(Expr::UnaryOp { op, operand: Box::new(operand), span })
    }

    /// `postfix ['**' unary]`, right-associative
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_postfix()?;
        if !self.consume(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.parse_unary()?;
        let span = base.span();
        Ok(Expr::BinaryOp { left: Box::new(base), op: BinOp::Pow, right: Box::new(exponent), span })
    }

    /// Calls, attribute access and subscripts
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let span = expr.span();
            if self.consume(&TokenKind::LParen) {
                let args = self.parse_call_args()?;
                expr = Expr::Call { func: Box::new(expr), args, span };
            } else if self.consume(&TokenKind::Dot) {
                let (attr, _) = self.expect_ident("attribute name")?;
                expr = Expr::Attribute { value: Box::new(expr), attr, span };
            } else if self.consume(&TokenKind::LBracket) {
                let index = self.parse_subscript()?;
                expr = Expr::Subscript { value: Box::new(expr), index: Box::new(index), span };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Arguments after `(`, consuming the closing `)`
    fn parse_call_args(&mut self) -> ParseResult<Vec<Arg>> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let span = self.current().span;
            let arg = if self.consume(&TokenKind::DoubleStar) {
                Arg::UnpackDict(self.parse_expr()?)
            } else if self.consume(&TokenKind::Star) {
                if args.iter().any(|a| matches!(a, Arg::UnpackDict(_))) {
                    return Err(ParserError::new(
                        "iterable argument unpacking follows keyword argument unpacking",
                        "keyword argument",
                        "'*'",
                        span,
                    ));
                }
                Arg::Unpack(self.parse_expr()?)
            } else if matches!(self.current_kind(), TokenKind::Ident(_))
                && self.peek_kind() == Some(&TokenKind::Eq)
            {
                let (name, _) = self.expect_ident("argument name")?;
                self.advance();
                Arg::Keyword { name, value: self.parse_expr()?, span }
            } else {
                let value = self.parse_expr()?;
                if self.check_keyword(Keyword::For) {
                    let generators = self.parse_comprehensions()?;
                    let genexp = Expr::GenExp { elt: Box::new(value), generators, span };
                    if !args.is_empty() || !self.check(&TokenKind::RParen) {
                        return Err(ParserError::new(
                            "a generator expression must be parenthesized unless it is the sole argument",
                            "')'",
                            self.current().describe(),
                            span,
                        ));
                    }
                    args.push(Arg::Positional(genexp));
                    break;
                }
                if args.iter().any(|a| matches!(a, Arg::Keyword { .. } | Arg::UnpackDict(_))) {
                    return Err(ParserError::new(
                        "positional argument follows keyword argument",
                        "keyword argument",
                        "positional argument",
                        span,
                    ));
                }
                Arg::Positional(value)
            };
            args.push(arg);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// Subscript after `[`, consuming the closing `]`
    fn parse_subscript(&mut self) -> ParseResult<Expr> {
        let span = self.current().span;
        let first = self.parse_subscript_item()?;
        let index = if self.check(&TokenKind::Comma) {
            let mut elts = vec![first];
            while self.consume(&TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                elts.push(self.parse_subscript_item()?);
            }
            Expr::Tuple { elts, span }
        } else {
            first
        };
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(index)
    }

    /// Index expression or slice `[lower]:[upper][:[step]]`
    fn parse_subscript_item(&mut self) -> ParseResult<Expr> {
        let span = self.current().span;
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let index = self.parse_expr()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(index);
            }
            Some(Box::new(index))
        };
        self.advance();

        let slice_part_ends = |p: &Self| {
            matches!(p.current_kind(), TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket)
        };
        let upper = if slice_part_ends(self) { None } else { Some(self.parse_expr()?) };
        let step = if self.consume(&TokenKind::Colon) && !slice_part_ends(self) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Expr::Slice { lower, upper: upper.map(Box::new), step, span })
    }

    /// `(for target in or_test (if or_test)*)+`
    fn parse_comprehensions(&mut self) -> ParseResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.check_keyword(Keyword::For) {
            let span = self.advance().span;
            let target = self.parse_target_list()?;
            self.expect_keyword(Keyword::In)?;
            let iter = self.parse_or()?;
            let mut ifs = Vec::new();
            while self.consume_keyword(Keyword::If) {
                ifs.push(self.parse_or()?);
            }
            generators.push(Comprehension { target, iter, ifs, span });
        }
        Ok(generators)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        let span = token.span;
        let literal = |value| Ok(Expr::Literal { value, span });

        match token.kind {
            TokenKind::Ident(id) => {
                self.advance();
                Ok(Expr::Name { id, span })
            }
            TokenKind::Integer(text) => {
                self.advance();
                literal(Literal::Int(text))
            }
            TokenKind::Float(text) => {
                self.advance();
                literal(Literal::Float(text))
            }
            TokenKind::String(_) => {
                // adjacent literals concatenate
                let mut value = String::new();
                while let TokenKind::String(part) = self.current_kind() {
                    value.push_str(part);
                    self.advance();
                }
                literal(Literal::Str(value))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                literal(Literal::True)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                literal(Literal::False)
            }
            TokenKind::Keyword(Keyword::None) => {
                self.advance();
                literal(Literal::None)
            }
            TokenKind::LParen => {
                self.advance();
                self.parse_paren(span)
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_list_display(span)
            }
            TokenKind::LBrace => {
                self.advance();
                self.parse_brace_display(span)
            }
            TokenKind::Indent => Err(self.error("unexpected indent", "expression")),
            _ => Err(self.error("expected expression", "expression")),
        }
    }

    /// After `(`: empty tuple, parenthesized expression, tuple or generator
    fn parse_paren(&mut self, span: Span) -> ParseResult<Expr> {
        if self.consume(&TokenKind::RParen) {
            return Ok(Expr::Tuple { elts: Vec::new(), span });
        }
        let first = self.parse_star_or_expr()?;
        if self.check_keyword(Keyword::For) {
            let generators = self.parse_comprehensions()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(Expr::GenExp { elt: Box::new(first), generators, span });
        }
        if !self.check(&TokenKind::Comma) {
            self.expect(TokenKind::RParen, "')'")?;
            self.check_no_star(&first)?;
            return Ok(first);
        }
        let elts = self.parse_display_tail(first, &TokenKind::RParen)?;
        Ok(Expr::Tuple { elts, span })
    }

    fn parse_list_display(&mut self, span: Span) -> ParseResult<Expr> {
        if self.consume(&TokenKind::RBracket) {
            return Ok(Expr::List { elts: Vec::new(), span });
        }
        let first = self.parse_star_or_expr()?;
        if self.check_keyword(Keyword::For) {
            let generators = self.parse_comprehensions()?;
            self.expect(TokenKind::RBracket, "']'")?;
            return Ok(Expr::ListComp { elt: Box::new(first), generators, span });
        }
        let elts = self.parse_display_tail(first, &TokenKind::RBracket)?;
        Ok(Expr::List { elts, span })
    }

    /// After `{`: dict, set, or their comprehensions
    fn parse_brace_display(&mut self, span: Span) -> ParseResult<Expr> {
        if self.consume(&TokenKind::RBrace) {
            return Ok(Expr::Dict { entries: Vec::new(), span });
        }
        let first = self.parse_star_or_expr()?;

        if !self.consume(&TokenKind::Colon) {
            if self.check_keyword(Keyword::For) {
                let generators = self.parse_comprehensions()?;
                self.expect(TokenKind::RBrace, "'}'")?;
                return Ok(Expr::SetComp { elt: Box::new(first), generators, span });
            }
            let elts = self.parse_display_tail(first, &TokenKind::RBrace)?;
            return Ok(Expr::Set { elts, span });
        }

        self.check_no_star(&first)?;
        let value = self.parse_expr()?;
        if self.check_keyword(Keyword::For) {
            let generators = self.parse_comprehensions()?;
            self.expect(TokenKind::RBrace, "'}'")?;
            return Ok(Expr::DictComp {
                key: Box::new(first),
                value: Box::new(value),
                generators,
                span,
            });
        }
        let mut entries = vec![(first, value)];
        while self.consume(&TokenKind::Comma) {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            let key = self.parse_expr()?;
            self.expect(TokenKind::Colon, "':'")?;
            entries.push((key, self.parse_expr()?));
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Dict { entries, span })
    }

    /// Remaining comma-separated elements of a display, consuming `closing`
    fn parse_display_tail(&mut self, first: Expr, closing: &TokenKind) -> ParseResult<Vec<Expr>> {
        let mut elts = vec![first];
        while self.consume(&TokenKind::Comma) {
            if self.check(closing) {
                break;
            }
            elts.push(self.parse_star_or_expr()?);
        }
        let expected = match closing {
            TokenKind::RParen => "')'",
            TokenKind::RBracket => "']'",
            _ => "'}'",
        };
        self.expect(closing.clone(), expected)?;
        Ok(elts)
    }
}

fn check_target(target: &Expr) -> ParseResult<()> {
    if target.is_assign_target() {
        Ok(())
    } else {
        Err(ParserError::new(
            "cannot assign to this expression",
            "assignment target",
            "expression",
            target.span(),
        ))
    }
}

fn binary_op(kind: &TokenKind) -> BinOp {
    match kind {
        TokenKind::Pipe => BinOp::BitOr,
        TokenKind::Caret => BinOp::BitXor,
        TokenKind::Amp => BinOp::BitAnd,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::DoubleSlash => BinOp::FloorDiv,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::At => BinOp::MatMul,
        other => unreachable!("{:?} has no binary precedence", other),
    }
}

fn aug_assign_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::PlusEq => BinOp::Add,
        TokenKind::MinusEq => BinOp::Sub,
        TokenKind::StarEq => BinOp::Mul,
        TokenKind::SlashEq => BinOp::Div,
        TokenKind::DoubleSlashEq => BinOp::FloorDiv,
        TokenKind::PercentEq => BinOp::Mod,
        TokenKind::DoubleStarEq => BinOp::Pow,
        TokenKind::AmpEq => BinOp::BitAnd,
        TokenKind::PipeEq => BinOp::BitOr,
        TokenKind::CaretEq => BinOp::BitXor,
        TokenKind::ShlEq => BinOp::Shl,
        TokenKind::ShrEq => BinOp::Shr,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParseResult<Program> {
        let tokens = Lexer::new(source).tokenize().expect("lexing failed");
        Parser::new(tokens).parse_program()
    }

    fn parse_one(source: &str) -> Stmt {
        let mut program = parse(source).expect("parsing failed");
        assert_eq!(program.body.len(), 1, "expected one statement");
        program.body.remove(0)
    }

    fn expr(source: &str) -> Expr {
        match parse_one(source) {
            Stmt::Expr(e) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn name_of(e: &Expr) -> &str {
        match e {
            Expr::Name { id, .. } => id,
            other => panic!("expected name, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_func() {
        let input = "
הגדר ברך(שם, ברכה=\"שלום\") -> מחרוזת:
    הדפס(ברכה, שם)
    החזר שם
";
        match parse_one(input) {
            Stmt::FunctionDef(f) => {
                assert_eq!(f.name, "ברך");
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.params[0].name, "שם");
                assert!(f.params[1].default.is_some());
                assert!(f.returns.is_some());
                assert_eq!(f.body.len(), 2);
                assert!(matches!(&f.body[0], Stmt::Expr(Expr::Call { .. })));
                assert!(matches!(&f.body[1], Stmt::Return { value: Some(_), .. }));
            }
            other => panic!("Expected FunctionDef, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_blocks() {
        let input = "
הגדר בדיקה():
    אם x:
        y = 1
        אם z:
            העבר
    החזר y
";
        if let Stmt::FunctionDef(f) = parse_one(input) {
            assert_eq!(f.body.len(), 2);
            match &f.body[0] {
                Stmt::If(i) => assert_eq!(i.body.len(), 2),
                other => panic!("Expected If, got {:?}", other),
            }
        } else {
            panic!("Expected FunctionDef");
        }
    }

    #[test]
    fn test_top_level_statement_count() {
        let input = "א = 1\nב_ = 2; ג = 3\n\n# הערה\nהדפס(א)\nאם א:\n    העבר\n";
        assert_eq!(parse(input).unwrap().body.len(), 5);
    }

    #[test]
    fn test_if_elif_else_chain() {
        let input = "אם א:\n    העבר\nאחרת אם ב_:\n    העבר\nאחרת_אם ג:\n    העבר\nאחרת:\n    העבר\n";
        match parse_one(input) {
            Stmt::If(i) => {
                assert_eq!(i.elifs.len(), 2);
                assert!(i.orelse.is_some());
            }
            other => panic!("Expected If, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_tuple_target() {
        let input = "עבור מפתח, ערך בתוך פריטים:\n    הדפס(מפתח)\n";
        match parse_one(input) {
            Stmt::For(f) => {
                assert!(matches!(&f.target, Expr::Tuple { elts, .. } if elts.len() == 2));
                assert_eq!(name_of(&f.iter), "פריטים");
            }
            other => panic!("Expected For, got {:?}", other),
        }
    }

    #[test]
    fn test_while_with_inline_suite() {
        match parse_one("בעוד א < 10: א += 1\n") {
            Stmt::While(w) => {
                assert!(matches!(&w.condition, Expr::Compare { .. }));
                assert!(matches!(&w.body[0], Stmt::AugAssign { op: BinOp::Add, .. }));
            }
            other => panic!("Expected While, got {:?}", other),
        }
    }

    #[test]
    fn test_try_except_finally() {
        let input = "\
נסה:
    א = 1 / 0
תפוס שגיאת_חלוקה בתור ש:
    הדפס(ש)
תפוס:
    העבר
לבסוף:
    הדפס(\"סוף\")
";
        match parse_one(input) {
            Stmt::Try(t) => {
                assert_eq!(t.handlers.len(), 2);
                assert_eq!(t.handlers[0].name.as_deref(), Some("ש"));
                assert!(t.handlers[1].exc_type.is_none());
                assert!(t.finalbody.is_some());
            }
            other => panic!("Expected Try, got {:?}", other),
        }
    }

    #[test]
    fn test_try_errors() {
        let err = parse("נסה:\n    העבר\nהדפס(1)\n").unwrap_err();
        assert_eq!(err.expected, "'תפוס' or 'לבסוף'");
        assert_eq!(err.line, 3);

        let err = parse("נסה:\n    העבר\nתפוס:\n    העבר\nתפוס שגיאה:\n    העבר\n").unwrap_err();
        assert_eq!(err.line, 5);
    }

    #[test]
    fn test_with_statement() {
        match parse_one("עם פתח(\"ק\") בתור ק, נעילה:\n    הדפס(ק.קרא())\n") {
            Stmt::With(w) => {
                assert_eq!(w.items.len(), 2);
                assert!(w.items[0].target.is_some());
                assert!(w.items[1].target.is_none());
            }
            other => panic!("Expected With, got {:?}", other),
        }
    }

    #[test]
    fn test_decorators_and_class() {
        let input = "\
@מעטר
@רשום(\"x\")
הגדר פ(*ארגומנטים, **מילות):
    העבר

מחלקה כלב(חיה, מטא=סוג):
    הגדר נבח(עצמי):
        החזר \"הב\"
";
        let program = parse(input).unwrap();
        assert_eq!(program.body.len(), 2);
        match &program.body[0] {
            Stmt::FunctionDef(f) => {
                assert_eq!(f.decorators.len(), 2);
                assert_eq!(f.params[0].kind, ParamKind::VarArgs);
                assert_eq!(f.params[1].kind, ParamKind::KwArgs);
                assert_eq!(f.span.line, 1);
            }
            other => panic!("Expected FunctionDef, got {:?}", other),
        }
        match &program.body[1] {
            Stmt::ClassDef(c) => {
                assert_eq!(c.name, "כלב");
                assert_eq!(c.bases.len(), 2);
                assert!(matches!(&c.bases[1], Arg::Keyword { name, .. } if name == "מטא"));
            }
            other => panic!("Expected ClassDef, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_default_order() {
        let err = parse("הגדר פ(א=1, ב_):\n    העבר\n").unwrap_err();
        assert_eq!(err.message, "parameter without a default follows a parameter with a default");
        // keyword-only parameters after *args are fine
        assert!(parse("הגדר פ(א=1, *ר, ב_):\n    העבר\n").is_ok());
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 ** -4
        match expr("1 + 2 * 3 ** -4\n") {
            Expr::BinaryOp { op: BinOp::Add, right, .. } => match *right {
                Expr::BinaryOp { op: BinOp::Mul, right, .. } => match *right {
                    Expr::BinaryOp { op: BinOp::Pow, right, .. } => {
                        assert!(matches!(*right, Expr::UnaryOp { op: UnaryOp::Neg, .. }))
                    }
                    other => panic!("expected power, got {:?}", other),
                },
                other => panic!("expected mul, got {:?}", other),
            },
            other => panic!("expected add, got {:?}", other),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        match expr("2 ** 3 ** 2\n") {
            Expr::BinaryOp { op: BinOp::Pow, left, right, .. } => {
                assert!(matches!(*left, Expr::Literal { .. }));
                assert!(matches!(*right, Expr::BinaryOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected power, got {:?}", other),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        match expr("א - ב_ - ג\n") {
            Expr::BinaryOp { op: BinOp::Sub, left, right, .. } => {
                assert!(matches!(*left, Expr::BinaryOp { op: BinOp::Sub, .. }));
                assert_eq!(name_of(&right), "ג");
            }
            other => panic!("expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_precedence() {
        // not binds tighter than and, and tighter than or
        match expr("א או לא ב_ וגם ג\n") {
            Expr::BoolOp { op: BoolOp::Or, values, .. } => {
                assert_eq!(values.len(), 2);
                match &values[1] {
                    Expr::BoolOp { op: BoolOp::And, values, .. } => {
                        assert!(matches!(&values[0], Expr::UnaryOp { op: UnaryOp::Not, .. }))
                    }
                    other => panic!("expected and, got {:?}", other),
                }
            }
            other => panic!("expected or, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_chain() {
        match expr("0 <= א < 10 לא בתוך ר הוא לא ריק\n") {
            Expr::Compare { ops, comparators, .. } => {
                assert_eq!(ops, vec![CmpOp::LtE, CmpOp::Lt, CmpOp::NotIn, CmpOp::IsNot]);
                assert_eq!(comparators.len(), 4);
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_ternary_and_lambda() {
        match expr("למבדה א, ב_=2: א אם ב_ אחרת 0\n") {
            Expr::Lambda { params, body, .. } => {
                assert_eq!(params.len(), 2);
                assert!(matches!(*body, Expr::IfExp { .. }));
            }
            other => panic!("expected lambda, got {:?}", other),
        }
    }

    #[test]
    fn test_list_comprehension() {
        match expr("[א * 2 עבור א בתוך ר אם א > 1 אם א < 9 עבור ב_ בתוך ג]\n") {
            Expr::ListComp { elt, generators, .. } => {
                assert!(matches!(*elt, Expr::BinaryOp { op: BinOp::Mul, .. }));
                assert_eq!(generators.len(), 2);
                assert_eq!(generators[0].ifs.len(), 2);
                assert!(generators[1].ifs.is_empty());
            }
            other => panic!("expected list comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_comprehension_element_can_be_ternary() {
        match expr("[א אם א > 0 אחרת 0 עבור א בתוך ר]\n") {
            Expr::ListComp { elt, .. } => assert!(matches!(*elt, Expr::IfExp { .. })),
            other => panic!("expected list comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_collection_displays() {
        assert!(matches!(expr("{}\n"), Expr::Dict { entries, .. } if entries.is_empty()));
        assert!(matches!(expr("{1: 2, 3: 4,}\n"), Expr::Dict { entries, .. } if entries.len() == 2));
        assert!(matches!(expr("{1, 2}\n"), Expr::Set { elts, .. } if elts.len() == 2));
        assert!(matches!(expr("{א: ב_ עבור א, ב_ בתוך ר}\n"), Expr::DictComp { .. }));
        assert!(matches!(expr("{א עבור א בתוך ר}\n"), Expr::SetComp { .. }));
        assert!(matches!(expr("()\n"), Expr::Tuple { elts, .. } if elts.is_empty()));
        assert!(matches!(expr("(1,)\n"), Expr::Tuple { elts, .. } if elts.len() == 1));
        assert!(matches!(expr("(1)\n"), Expr::Literal { .. }));
        assert!(matches!(expr("[1, *ר]\n"), Expr::List { elts, .. } if elts.len() == 2));
        assert!(matches!(expr("(א עבור א בתוך ר)\n"), Expr::GenExp { .. }));
    }

    #[test]
    fn test_slices() {
        let slice_parts = |source: &str| match expr(source) {
            Expr::Subscript { index, .. } => match *index {
                Expr::Slice { lower, upper, step, .. } => {
                    (lower.is_some(), upper.is_some(), step.is_some())
                }
                other => panic!("expected slice, got {:?}", other),
            },
            other => panic!("expected subscript, got {:?}", other),
        };
        assert_eq!(slice_parts("ר[1:5]\n"), (true, true, false));
        assert_eq!(slice_parts("ר[:]\n"), (false, false, false));
        assert_eq!(slice_parts("ר[::2]\n"), (false, false, true));
        assert_eq!(slice_parts("ר[1::]\n"), (true, false, false));
        assert_eq!(slice_parts("ר[:-1:1]\n"), (false, true, true));

        match expr("ר[1]\n") {
            Expr::Subscript { index, .. } => assert!(matches!(*index, Expr::Literal { .. })),
            other => panic!("expected subscript, got {:?}", other),
        }
        match expr("מ_[1:2, 3]\n") {
            Expr::Subscript { index, .. } => {
                assert!(matches!(*index, Expr::Tuple { ref elts, .. } if matches!(elts[0], Expr::Slice { .. })))
            }
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_calls_and_attributes() {
        match expr("א.ב_(1, *ר, מפתח=2, **ד)[0].ג\n") {
            Expr::Attribute { value, attr, .. } => {
                assert_eq!(attr, "ג");
                match *value {
                    Expr::Subscript { value, .. } => match *value {
                        Expr::Call { args, .. } => {
                            assert_eq!(args.len(), 4);
                            assert!(matches!(args[1], Arg::Unpack(_)));
                            assert!(matches!(args[2], Arg::Keyword { .. }));
                            assert!(matches!(args[3], Arg::UnpackDict(_)));
                        }
                        other => panic!("expected call, got {:?}", other),
                    },
                    other => panic!("expected subscript, got {:?}", other),
                }
            }
            other => panic!("expected attribute, got {:?}", other),
        }
        assert!(matches!(expr("סכום(א עבור א בתוך ר)\n"), Expr::Call { args, .. }
            if matches!(args[0], Arg::Positional(Expr::GenExp { .. }))));
        let err = parse("פ(א=1, 2)\n").unwrap_err();
        assert_eq!(err.message, "positional argument follows keyword argument");
    }

    #[test]
    fn test_iterable_unpacking_after_mapping_unpacking() {
        assert!(parse("פ(*א, ב=1, *ג, **ד)\n").is_ok());
        let err = parse("פ(**ד, *א)\n").unwrap_err();
        assert_eq!(err.message, "iterable argument unpacking follows keyword argument unpacking");
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_assignments() {
        match parse_one("א = ב_ = 1, 2\n") {
            Stmt::Assign { targets, value, .. } => {
                assert_eq!(targets.len(), 2);
                assert!(matches!(value, Expr::Tuple { .. }));
            }
            other => panic!("Expected Assign, got {:?}", other),
        }
        assert!(matches!(parse_one("א, *ב_ = ר\n"), Stmt::Assign { .. }));
        assert!(matches!(parse_one("א.ב_[0] **= 2\n"), Stmt::AugAssign { op: BinOp::Pow, .. }));
        assert!(matches!(parse_one("א: int = 5\n"), Stmt::AnnAssign { value: Some(_), .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("א + 1 = 2\n").unwrap_err();
        assert_eq!(err.message, "cannot assign to this expression");
        assert_eq!((err.line, err.column), (1, 1));
        assert!(parse("פ() = 1\n").is_err());
        assert!(parse("(א, ב_) += 1\n").is_err());
    }

    #[test]
    fn test_simple_statements() {
        let input = "\
ייבא מתמטיקה בתור מ_, os.path
מ אוסף ייבא (א, ב_ בתור ג,)
מ . ייבא *
גלובלי א, ב_
זרוק שגיאה(\"x\") מ ש
טען א > 0, \"חיובי\"
החזר
";
        let program = parse(input).unwrap();
        assert_eq!(program.body.len(), 7);
        assert!(matches!(&program.body[0], Stmt::Import { names, .. } if names.len() == 2 && names[1].name == "os.path"));
        assert!(matches!(&program.body[1], Stmt::ImportFrom { names, .. } if names[1].alias.as_deref() == Some("ג")));
        assert!(matches!(&program.body[2], Stmt::ImportFrom { module, names, .. } if module == "." && names.is_empty()));
        assert!(matches!(&program.body[4], Stmt::Raise { cause: Some(_), .. }));
        assert!(matches!(&program.body[6], Stmt::Return { value: None, .. }));
    }

    #[test]
    fn test_string_concatenation() {
        match expr("\"שלום \" 'עולם'\n") {
            Expr::Literal { value, span } => {
                assert_eq!(value, Literal::Str("שלום עולם".into()));
                assert_eq!((span.line, span.column), (1, 1));
            }
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_error_reports_first_unexpected_token() {
        let err = parse("אם א\n    העבר\n").unwrap_err();
        assert_eq!(err.expected, "':'");
        assert_eq!(err.found, "newline");
        assert_eq!((err.line, err.column), (1, 5));

        let err = parse("הגדר פ(:):\n    העבר\n").unwrap_err();
        assert_eq!(err.expected, "parameter name");
        assert_eq!(err.found, "':'");
    }

    #[test]
    fn test_missing_block() {
        let err = parse("אם א:\nהדפס(1)\n").unwrap_err();
        assert_eq!(err.expected, "indented block");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unexpected_indent() {
        let err = parse("א = 1\n    ב_ = 2\n").unwrap_err();
        assert_eq!(err.message, "unexpected indent");
    }

    #[test]
    fn test_decorator_needs_definition() {
        let err = parse("@מעטר\nא = 1\n").unwrap_err();
        assert_eq!(err.expected, "'הגדר' or 'מחלקה'");
    }
}
