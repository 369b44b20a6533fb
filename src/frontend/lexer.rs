//! Lexer for Nachshon
//!
//! Converts source code into a stream of tokens. Indentation is tracked with
//! a stack of leading-whitespace prefixes and turned into INDENT/DEDENT
//! tokens; newlines inside brackets are ignored.

use log::{debug, trace};

use crate::frontend::token::{is_ident_continue, is_ident_start, Keyword, Token, TokenKind};
use crate::utils::{LexerError, Span};

type LexResult<T> = std::result::Result<T, LexerError>;

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    line: usize,
    col: usize,
    /// Leading whitespace of every open block, outermost first
    indent_stack: Vec<String>,
    /// Open brackets with their positions
    brackets: Vec<(char, Span)>,
    /// True until the indentation of the current line has been processed
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            indent_stack: vec![String::new()],
            brackets: Vec::new(),
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole input
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        while !self.is_at_end() {
            if self.at_line_start && self.brackets.is_empty() {
                self.read_indentation()?;
            } else {
                self.scan_token()?;
            }
        }
        self.finish()?;
        debug!("lexed {} tokens over {} lines", self.tokens.len(), self.line);
        Ok(self.tokens)
    }

    // ==================== Helper Methods ====================

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Span from a recorded start up to the current position
    fn span_from(&self, start: usize, line: usize, column: usize) -> Span {
        Span::new(start, self.pos, line, column)
    }

    fn text(&self, start: usize) -> String {
        self.source[start..self.pos].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let lexeme = self.text(start);
        let span = self.span_from(start, line, column);
        self.tokens.push(Token::new(kind, lexeme, span));
    }

    fn error(&self, message: impl Into<String>) -> LexerError {
        LexerError::new(message, self.line, self.col)
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    // ==================== Indentation ====================

    /// Measure the indentation of the current line. Blank and comment-only
    /// lines are consumed without touching the indentation stack.
    fn read_indentation(&mut self) -> LexResult<()> {
        let start = self.pos;
        let line = self.line;
        let mut indent = String::new();
        while let Some(c @ (' ' | '\t')) = self.peek() {
            indent.push(c);
            self.advance();
        }

        match self.peek() {
            None => return Ok(()),
            Some('\n') => {
                self.advance();
                return Ok(());
            }
            Some('\r') if self.peek_at(1) == Some('\n') => {
                self.advance();
                self.advance();
                return Ok(());
            }
            Some('#') => {
                self.skip_comment();
                return Ok(());
            }
            Some(_) => {}
        }

        self.at_line_start = false;
        if indent.contains(' ') && indent.contains('\t') {
            return Err(LexerError::new(
                "inconsistent indentation: tabs and spaces mixed in one indent",
                line,
                1,
            ));
        }

        let top = self.indent_stack.last().cloned().unwrap_or_default();
        if indent == top {
            return Ok(());
        }
        if indent.starts_with(&top) {
            trace!("line {}: indent {} -> {}", line, top.len(), indent.len());
            self.indent_stack.push(indent);
            self.push(TokenKind::Indent, start, line, 1);
            return Ok(());
        }
        if !top.starts_with(&indent) {
            return Err(LexerError::new(
                "inconsistent indentation: tabs and spaces do not match the enclosing block",
                line,
                1,
            ));
        }
        while self.indent_stack.last().map_or(false, |level| level.len() > indent.len()) {
            self.indent_stack.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", Span::new(self.pos, self.pos, line, 1)));
        }
        trace!("line {}: dedent to {}", line, indent.len());
        if self.indent_stack.last() != Some(&indent) {
            return Err(LexerError::new(
                "unindent does not match any outer indentation level",
                line,
                1,
            ));
        }
        Ok(())
    }

    /// Close the token stream: final newline, open brackets, dedents, EOF
    fn finish(&mut self) -> LexResult<()> {
        if let Some(&(open, span)) = self.brackets.last() {
            return Err(LexerError::new(
                format!("'{}' was never closed", open),
                span.line,
                span.column,
            ));
        }
        let eof = Span::new(self.pos, self.pos, self.line, self.col);
        if self.tokens.last().map_or(false, |t| t.kind != TokenKind::Newline) {
            self.tokens.push(Token::new(TokenKind::Newline, "", eof));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", eof));
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", eof));
        Ok(())
    }

    // ==================== Tokens ====================

    fn scan_token(&mut self) -> LexResult<()> {
        let Some(c) = self.peek() else {
            return Ok(());
        };
        let (start, line, column) = (self.pos, self.line, self.col);

        match c {
            ' ' | '\t' | '\r' | '\x0c' => {
                self.advance();
            }
            '\n' => {
                self.advance();
                if self.brackets.is_empty() {
                    self.tokens.push(Token::new(
                        TokenKind::Newline,
                        "\n",
                        Span::new(start, self.pos, line, column),
                    ));
                    self.at_line_start = true;
                }
            }
            '#' => self.skip_comment(),
            '\\' => {
                self.advance();
                if self.peek() == Some('\r') {
                    self.advance();
                }
                match self.peek() {
                    Some('\n') => {
                        self.advance();
                    }
                    None => return Err(self.error("unexpected end of input after line continuation")),
                    Some(_) => return Err(self.error("unexpected character after line continuation")),
                }
            }
            '"' | '\'' => self.read_string()?,
            c if c.is_ascii_digit() => self.read_number()?,
            '.' if self.peek_at(1).map_or(false, |n| n.is_ascii_digit()) => self.read_number()?,
            c if is_ident_start(c) => self.read_word(),
            _ => {
                let Some((kind, len)) = TokenKind::operator_at(&self.source[self.pos..]) else {
                    return Err(self.error(format!("invalid character '{}'", c)));
                };
                for _ in 0..len {
                    self.advance();
                }
                let span = self.span_from(start, line, column);
                self.track_bracket(c, span)?;
                self.push(kind, start, line, column);
            }
        }
        Ok(())
    }

    fn track_bracket(&mut self, c: char, span: Span) -> LexResult<()> {
        let expected_open = match c {
            '(' | '[' | '{' => {
                self.brackets.push((c, span));
                return Ok(());
            }
            ')' => '(',
            ']' => '[',
            '}' => '{',
            _ => return Ok(()),
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected_open => Ok(()),
            Some((open, _)) => Err(LexerError::new(
                format!("closing '{}' does not match '{}'", c, open),
                span.line,
                span.column,
            )),
            None => Err(LexerError::new(format!("unmatched '{}'", c), span.line, span.column)),
        }
    }

    /// Read a keyword (longest match) or an identifier
    fn read_word(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.col);
        if let Some((keyword, len)) = Keyword::longest_match(&self.source[self.pos..]) {
            for _ in 0..len {
                self.advance();
            }
            self.push(TokenKind::Keyword(keyword), start, line, column);
            return;
        }
        while self.peek().map_or(false, is_ident_continue) {
            self.advance();
        }
        let name = self.text(start);
        self.push(TokenKind::Ident(name), start, line, column);
    }

    fn read_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.advance();
        }
        digits
    }

    /// Read a number literal (integer or float)
    fn read_number(&mut self) -> LexResult<()> {
        let (start, line, column) = (self.pos, self.line, self.col);

        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => Some((16, 'x')),
            (Some('0'), Some('o' | 'O')) => Some((8, 'o')),
            (Some('0'), Some('b' | 'B')) => Some((2, 'b')),
            _ => None,
        };
        if let Some((radix, marker)) = radix {
            self.advance();
            self.advance();
            let digits = self.read_digits(radix);
            if digits.is_empty() {
                return Err(LexerError::new(
                    format!("missing digits after '0{}'", marker),
                    line,
                    column,
                ));
            }
            self.reject_trailing_word()?;
            self.push(TokenKind::Integer(format!("0{}{}", marker, digits)), start, line, column);
            return Ok(());
        }

        let mut text = self.read_digits(10);
        let mut is_float = false;
        if self.peek() == Some('.')
            && (!self.peek_at(1).map_or(false, is_ident_start) || self.exponent_at(1))
        {
            self.advance();
            is_float = true;
            text.push('.');
            text.push_str(&self.read_digits(10));
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            self.advance();
            is_float = true;
            text.push(e);
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.advance();
                text.push(sign);
            }
            let exponent = self.read_digits(10);
            if exponent.is_empty() {
                return Err(LexerError::new("missing digits in exponent", line, column));
            }
            text.push_str(&exponent);
        }
        self.reject_trailing_word()?;
        if !is_float && text.starts_with('0') && text.chars().any(|c| c != '0') {
            return Err(LexerError::new(
                "leading zeros in decimal integer literals are not permitted",
                line,
                column,
            ));
        }

        let kind = if is_float { TokenKind::Float(text) } else { TokenKind::Integer(text) };
        self.push(kind, start, line, column);
        Ok(())
    }

    /// Does an exponent (`e5`, `E-3`) start `offset` chars ahead?
    fn exponent_at(&self, offset: usize) -> bool {
        let digit_at = |i: usize| self.peek_at(i).map_or(false, |c: char| c.is_ascii_digit());
        match self.peek_at(offset) {
            Some('e' | 'E') => match self.peek_at(offset + 1) {
                Some('+' | '-') => digit_at(offset + 2),
                _ => digit_at(offset + 1),
            },
            _ => false,
        }
    }

    fn reject_trailing_word(&self) -> LexResult<()> {
        match self.peek() {
            Some(c) if is_ident_continue(c) => {
                Err(self.error(format!("invalid character '{}' in numeric literal", c)))
            }
            _ => Ok(()),
        }
    }

    fn read_hex_escape(&mut self, width: usize) -> LexResult<char> {
        let (line, column) = (self.line, self.col);
        let mut value = 0u32;
        for _ in 0..width {
            let digit = self.peek().and_then(|c| c.to_digit(16));
            let Some(digit) = digit else {
                return Err(LexerError::new("truncated hexadecimal escape", line, column));
            };
            value = value * 16 + digit;
            self.advance();
        }
        char::from_u32(value)
            .ok_or_else(|| LexerError::new("escape is not a valid code point", line, column))
    }

    /// `\u{...}` with one to six hex digits; the `u` is already consumed
    fn read_braced_escape(&mut self) -> LexResult<char> {
        let (line, column) = (self.line, self.col);
        self.advance();
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_hexdigit) {
            digits.push(c);
            self.advance();
        }
        if self.peek() != Some('}') {
            return Err(LexerError::new("unclosed '{' in unicode escape", line, column));
        }
        self.advance();
        if digits.is_empty() || digits.len() > 6 {
            return Err(LexerError::new(
                "unicode escape needs one to six hex digits",
                line,
                column,
            ));
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexerError::new("escape is not a valid code point", line, column))
    }

    /// Read a single- or triple-delimited string literal
    fn read_string(&mut self) -> LexResult<()> {
        let (start, line, column) = (self.pos, self.line, self.col);
        let unterminated = || LexerError::new("unterminated string literal", line, column);

        let quote = self.advance().ok_or_else(unterminated)?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(unterminated());
            };
            if c == quote {
                if !triple {
                    self.advance();
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
            }
            if c == '\n' && !triple {
                return Err(unterminated());
            }
            self.advance();
            if c != '\\' {
                value.push(c);
                continue;
            }

            let Some(escaped) = self.advance() else {
                return Err(unterminated());
            };
            match escaped {
                '\n' => {}
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                'a' => value.push('\x07'),
                'b' => value.push('\x08'),
                'f' => value.push('\x0c'),
                'v' => value.push('\x0b'),
                '\\' | '\'' | '"' => value.push(escaped),
                'x' => value.push(self.read_hex_escape(2)?),
                'u' if self.peek() == Some('{') => value.push(self.read_braced_escape()?),
                'u' => value.push(self.read_hex_escape(4)?),
                'U' => value.push(self.read_hex_escape(8)?),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
        }

        self.push(TokenKind::String(value), start, line, column);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    fn count(tokens: &[TokenKind], kind: &TokenKind) -> usize {
        tokens.iter().filter(|k| *k == kind).count()
    }

    #[test]
    fn test_indentation() {
        let input = "
הגדר ראשי():
    הדפס(\"שלום\")
    אם x:
        העבר
    החזר 0
";
        let mut iter = kinds(input).into_iter();

        macro_rules! check {
            ($p:pat) => {
                let t = iter.next().unwrap();
                assert!(matches!(t, $p), "Expected {}, got {:?}", stringify!($p), t);
            };
        }

        check!(TokenKind::Keyword(Keyword::Def));
        check!(TokenKind::Ident(_));
        check!(TokenKind::LParen);
        check!(TokenKind::RParen);
        check!(TokenKind::Colon);
        check!(TokenKind::Newline);

        check!(TokenKind::Indent);
        check!(TokenKind::Ident(_));
        check!(TokenKind::LParen);
        check!(TokenKind::String(_));
        check!(TokenKind::RParen);
        check!(TokenKind::Newline);

        check!(TokenKind::Keyword(Keyword::If));
        check!(TokenKind::Ident(_));
        check!(TokenKind::Colon);
        check!(TokenKind::Newline);

        check!(TokenKind::Indent);
        check!(TokenKind::Keyword(Keyword::Pass));
        check!(TokenKind::Newline);

        check!(TokenKind::Dedent);
        check!(TokenKind::Keyword(Keyword::Return));
        check!(TokenKind::Integer(_));
        check!(TokenKind::Newline);

        check!(TokenKind::Dedent);
        check!(TokenKind::Eof);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_deep_nesting_with_blank_and_comment_lines() {
        let input = "# כותרת
אם תנאי:
    # הערה
    בעוד מונה:

        עבור פריט בתוך רשימה:
            # עוד הערה
            הדפס(פריט)
\n   \nהדפס(1)\n\n\n";
        let tokens = kinds(input);
        assert_eq!(count(&tokens, &TokenKind::Indent), 3);
        assert_eq!(count(&tokens, &TokenKind::Dedent), 3);
        // one newline per logical line with code
        assert_eq!(count(&tokens, &TokenKind::Newline), 5);
        assert_eq!(tokens.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_dedents_at_end_of_input_without_newline() {
        let tokens = kinds("אם תנאי:\n    אם עוד:\n        ערך");
        assert_eq!(
            tokens[tokens.len() - 4..].to_vec(),
            vec![TokenKind::Newline, TokenKind::Dedent, TokenKind::Dedent, TokenKind::Eof]
        );
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("# רק הערה\n\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_longest_match_keywords() {
        assert_eq!(
            kinds("אחרת אם x:"),
            vec![
                TokenKind::Keyword(Keyword::Elif),
                ident("x"),
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("אחרת_אם")[0], TokenKind::Keyword(Keyword::Elif));
        assert_eq!(kinds("אחרת:")[0], TokenKind::Keyword(Keyword::Else));
        assert_eq!(kinds("בית")[0], ident("בית"));
        assert_eq!(kinds("אמת")[0], TokenKind::Keyword(Keyword::True));
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("א = 1\nבב = \"x\"").tokenize().unwrap();
        let bb = &tokens[4];
        assert_eq!(bb.kind, ident("בב"));
        assert_eq!((bb.span.line, bb.span.column), (2, 1));
        let string = &tokens[6];
        assert_eq!(string.lexeme, "\"x\"");
        assert_eq!((string.span.line, string.span.column), (2, 6));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1_000 3.14 .5 2e10 1.5E-3 0xff 0b1010 7. 1.e5 2.E-3 00 007.5"),
            vec![
                TokenKind::Integer("1000".into()),
                TokenKind::Float("3.14".into()),
                TokenKind::Float(".5".into()),
                TokenKind::Float("2e10".into()),
                TokenKind::Float("1.5E-3".into()),
                TokenKind::Integer("0xff".into()),
                TokenKind::Integer("0b1010".into()),
                TokenKind::Float("7.".into()),
                TokenKind::Float("1.e5".into()),
                TokenKind::Float("2.E-3".into()),
                TokenKind::Integer("00".into()),
                TokenKind::Float("007.5".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_errors() {
        let err = Lexer::new("x = 1e+").tokenize().unwrap_err();
        assert_eq!(err.message, "missing digits in exponent");
        assert!(Lexer::new("3ש").tokenize().is_err());
        assert!(Lexer::new("0x").tokenize().is_err());

        let err = Lexer::new("x = 007\n").tokenize().unwrap_err();
        assert_eq!(err.message, "leading zeros in decimal integer literals are not permitted");
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_attribute_after_integer_is_not_an_exponent() {
        assert_eq!(
            kinds("1.real 1.e")[..6].to_vec(),
            vec![
                TokenKind::Integer("1".into()),
                TokenKind::Dot,
                ident("real"),
                TokenKind::Integer("1".into()),
                TokenKind::Dot,
                ident("e"),
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'a\n' "ב\"ג" '\x41\u05d0' '\q'"#)[..4].to_vec(),
            vec![
                TokenKind::String("a\n".into()),
                TokenKind::String("ב\"ג".into()),
                TokenKind::String("Aא".into()),
                TokenKind::String("\\q".into()),
            ]
        );
    }

    #[test]
    fn test_braced_unicode_escape() {
        assert_eq!(kinds(r"'\u{5d0}\u{1F600}\u{0005d1}'")[0], TokenKind::String("א😀ב".into()));

        for (source, message) in [
            (r"'\u{}'", "unicode escape needs one to six hex digits"),
            (r"'\u{1234567}'", "unicode escape needs one to six hex digits"),
            (r"'\u{5d0'", "unclosed '{' in unicode escape"),
            (r"'\u{d800}'", "escape is not a valid code point"),
            (r"'\u{110000}'", "escape is not a valid code point"),
        ] {
            let err = Lexer::new(source).tokenize().unwrap_err();
            assert_eq!(err.message, message, "for {}", source);
        }
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let tokens = kinds("x = \"\"\"שורה\nשנייה\"\"\"\ny = 1\n");
        assert_eq!(tokens[2], TokenKind::String("שורה\nשנייה".into()));
        assert_eq!(count(&tokens, &TokenKind::Newline), 2);
    }

    #[test]
    fn test_unterminated_string_reports_opening_delimiter() {
        let err = Lexer::new("א = 1\nשם = \"לא נסגר\nג = 2\n").tokenize().unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!((err.line, err.column), (2, 6));

        let err = Lexer::new("x = '''פתוח\n\n").tokenize().unwrap_err();
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_implicit_line_joining() {
        let tokens = kinds("ר = [1,\n        2,\n  3]\nהדפס(ר)\n");
        assert_eq!(count(&tokens, &TokenKind::Indent), 0);
        assert_eq!(count(&tokens, &TokenKind::Newline), 2);
    }

    #[test]
    fn test_explicit_line_continuation() {
        let tokens = kinds("x = 1 + \\\n    2\n");
        assert_eq!(count(&tokens, &TokenKind::Indent), 0);
        assert_eq!(count(&tokens, &TokenKind::Newline), 1);
    }

    #[test]
    fn test_bracket_errors() {
        let err = Lexer::new("x = (1, 2]").tokenize().unwrap_err();
        assert_eq!(err.message, "closing ']' does not match '('");
        let err = Lexer::new("x = )").tokenize().unwrap_err();
        assert_eq!(err.message, "unmatched ')'");
        let err = Lexer::new("x = [1,\n2\n").tokenize().unwrap_err();
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::new("x = 5 $ 3").tokenize().unwrap_err();
        assert_eq!(err.message, "invalid character '$'");
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn test_mixed_tabs_and_spaces() {
        let err = Lexer::new("אם x:\n \ty = 1\n").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("tabs and spaces"));

        let err = Lexer::new("אם x:\n    אם y:\n    \tz = 1\n\t\tw = 2\n").tokenize().unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_dedent_to_unknown_level() {
        let err = Lexer::new("אם x:\n        y = 1\n    z = 2\n").tokenize().unwrap_err();
        assert_eq!(err.message, "unindent does not match any outer indentation level");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let tokens = kinds("אם x:\r\n    y = 1\r\n\r\nz = 2\r\n");
        assert_eq!(count(&tokens, &TokenKind::Indent), 1);
        assert_eq!(count(&tokens, &TokenKind::Dedent), 1);
        assert_eq!(count(&tokens, &TokenKind::Newline), 3);
    }
}
