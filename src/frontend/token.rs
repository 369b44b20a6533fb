//! Token definitions for Nachshon
//!
//! Holds the fixed keyword and operator tables. Both are read-only, so any
//! number of lexers may consult them concurrently.

use serde::Serialize;
use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the token (empty for synthetic tokens)
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self { kind, lexeme: lexeme.into(), span }
    }

    /// Short description used in parser diagnostics
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Indent => "indent".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            TokenKind::Newline => "newline".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.span, self.kind)?;
        if !self.lexeme.is_empty() {
            write!(f, " `{}`", self.lexeme)?;
        }
        Ok(())
    }
}

/// Canonical construct ids, independent of the localized spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Def,
    Class,
    Return,
    Break,
    Continue,
    Pass,
    Try,
    Except,
    Finally,
    Raise,
    Assert,
    With,
    As,
    Import,
    From,
    Global,
    Nonlocal,
    Lambda,
    True,
    False,
    None,
    And,
    Or,
    Not,
    Is,
}

/// Localized spellings. Several spellings may share one construct id;
/// multi-word spellings are separated by a single space.
pub const KEYWORDS: &[(&str, Keyword)] = &[
    ("אם", Keyword::If),
    ("אחרת_אם", Keyword::Elif),
    ("אחרת אם", Keyword::Elif),
    ("אחרת", Keyword::Else),
    ("בעוד", Keyword::While),
    ("כל_עוד", Keyword::While),
    ("כל עוד", Keyword::While),
    ("עבור", Keyword::For),
    ("לכל", Keyword::For),
    ("בתוך", Keyword::In),
    ("ב", Keyword::In),
    ("הגדר", Keyword::Def),
    ("פונקציה", Keyword::Def),
    ("מחלקה", Keyword::Class),
    ("החזר", Keyword::Return),
    ("הפסק", Keyword::Break),
    ("עצור", Keyword::Break),
    ("המשך", Keyword::Continue),
    ("העבר", Keyword::Pass),
    ("נסה", Keyword::Try),
    ("תפוס", Keyword::Except),
    ("לבסוף", Keyword::Finally),
    ("זרוק", Keyword::Raise),
    ("טען", Keyword::Assert),
    ("עם", Keyword::With),
    ("בתור", Keyword::As),
    ("כ", Keyword::As),
    ("ייבא", Keyword::Import),
    ("מ", Keyword::From),
    ("גלובלי", Keyword::Global),
    ("לא_מקומי", Keyword::Nonlocal),
    ("פונקציה_אנונימית", Keyword::Lambda),
    ("למבדה", Keyword::Lambda),
    ("אמת", Keyword::True),
    ("שקר", Keyword::False),
    ("ריק", Keyword::None),
    ("כלום", Keyword::None),
    ("וגם", Keyword::And),
    ("או", Keyword::Or),
    ("לא", Keyword::Not),
    ("הוא", Keyword::Is),
];

impl Keyword {
    /// Primary localized spelling, used in diagnostics
    pub fn spelling(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .map_or("", |&(spelling, _)| spelling)
    }

    /// Find the longest keyword spelling starting at `text[0]`.
    ///
    /// A spelling only matches when the character after it cannot continue
    /// an identifier. Returns the keyword and its length in chars.
    pub fn longest_match(text: &[char]) -> Option<(Keyword, usize)> {
        let mut best: Option<(Keyword, usize)> = None;
        for (spelling, keyword) in KEYWORDS {
            let len = spelling.chars().count();
            if len > text.len() || best.map_or(false, |(_, l)| l >= len) {
                continue;
            }
            if !spelling.chars().zip(&text[..len]).all(|(a, &b)| a == b) {
                continue;
            }
            if text.get(len).map_or(false, |&c| is_ident_continue(c)) {
                continue;
            }
            best = Some((*keyword, len));
        }
        best
    }
}

/// Can `c` start an identifier?
pub fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Can `c` continue an identifier?
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

/// Token kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // ============ Structure ============
    Indent,
    Dedent,
    Newline,
    Eof,

    // ============ Words ============
    Keyword(Keyword),
    Ident(String),

    // ============ Literals ============
    /// Integer literal text with `_` separators removed
    Integer(String),
    /// Float literal text with `_` separators removed
    Float(String),
    /// String literal value after escape processing
    String(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// //
    DoubleSlash,
    /// %
    Percent,
    /// **
    DoubleStar,
    /// @
    At,
    /// &
    Amp,
    /// |
    Pipe,
    /// ^
    Caret,
    /// ~
    Tilde,
    /// <<
    Shl,
    /// >>
    Shr,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    LtEq,
    /// >=
    GtEq,
    /// ==
    EqEq,
    /// !=
    NotEq,
    /// =
    Eq,
    /// ->
    Arrow,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    DoubleSlashEq,
    PercentEq,
    DoubleStarEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,

    // ============ Punctuation ============
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Dot,
    Semicolon,
}

/// Operator and punctuation table, ordered so that longer spellings come first.
pub const OPERATORS: &[(&str, TokenKind)] = &[
    ("**=", TokenKind::DoubleStarEq),
    ("//=", TokenKind::DoubleSlashEq),
    (">>=", TokenKind::ShrEq),
    ("<<=", TokenKind::ShlEq),
    ("**", TokenKind::DoubleStar),
    ("//", TokenKind::DoubleSlash),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("->", TokenKind::Arrow),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("@", TokenKind::At),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    (";", TokenKind::Semicolon),
];

impl TokenKind {
    /// Find the longest operator spelling at the start of `text`
    pub fn operator_at(text: &[char]) -> Option<(TokenKind, usize)> {
        OPERATORS.iter().find_map(|(spelling, kind)| {
            let len = spelling.chars().count();
            let matches = len <= text.len() && spelling.chars().zip(text).all(|(a, &b)| a == b);
            matches.then(|| (kind.clone(), len))
        })
    }

    /// Get the precedence of a binary bitwise/arithmetic operator
    /// (for precedence climbing). Returns None if not one.
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Pipe => Some(1),
            TokenKind::Caret => Some(2),
            TokenKind::Amp => Some(3),
            TokenKind::Shl | TokenKind::Shr => Some(4),
            TokenKind::Plus | TokenKind::Minus => Some(5),
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::DoubleSlash
            | TokenKind::Percent
            | TokenKind::At => Some(6),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_keyword_wins() {
        assert_eq!(Keyword::longest_match(&chars("אחרת אם x")), Some((Keyword::Elif, 7)));
        assert_eq!(Keyword::longest_match(&chars("אחרת:")), Some((Keyword::Else, 4)));
        assert_eq!(Keyword::longest_match(&chars("אחרת_אם x")), Some((Keyword::Elif, 7)));
        assert_eq!(Keyword::longest_match(&chars("כל עוד x")), Some((Keyword::While, 6)));
        assert_eq!(Keyword::longest_match(&chars("בתוך ר")), Some((Keyword::In, 4)));
    }

    #[test]
    fn test_keyword_needs_identifier_boundary() {
        // `ב` is a keyword but `בית` is an identifier
        assert_eq!(Keyword::longest_match(&chars("בית")), None);
        assert_eq!(Keyword::longest_match(&chars("ב ר")), Some((Keyword::In, 1)));
        assert_eq!(Keyword::longest_match(&chars("אחרתי")), None);
        // a multi-word spelling must also end on a boundary
        assert_eq!(Keyword::longest_match(&chars("אחרת אםא")), Some((Keyword::Else, 4)));
    }

    #[test]
    fn test_operator_longest_match() {
        assert_eq!(TokenKind::operator_at(&chars("**= 2")), Some((TokenKind::DoubleStarEq, 3)));
        assert_eq!(TokenKind::operator_at(&chars("**2")), Some((TokenKind::DoubleStar, 2)));
        assert_eq!(TokenKind::operator_at(&chars("*2")), Some((TokenKind::Star, 1)));
        assert_eq!(TokenKind::operator_at(&chars("!x")), None);
    }

    #[test]
    fn test_operator_table_is_longest_first() {
        let lens: Vec<usize> = OPERATORS.iter().map(|(s, _)| s.len()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_hebrew_identifier_chars() {
        assert!(is_ident_start('ש'));
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('3'));
        assert!(is_ident_continue('3'));
        assert!(!is_ident_continue('-'));
    }
}
