//! Tokenizer for query text.
//!
//! Whitespace (including newlines) is insignificant. Every token records the
//! byte offset it started at so parse errors can point into the source.

use crate::error::QueryError;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A field or agent name.
    Ident(String),
    /// `prev!`
    Prev,
    /// `agent!`
    Agent,
    /// `root!` or `$`
    Root,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
}

impl TokenKind {
    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Prev => "`prev!`".to_owned(),
            Self::Agent => "`agent!`".to_owned(),
            Self::Root => "`root!`".to_owned(),
            Self::LParen => "`(`".to_owned(),
            Self::RParen => "`)`".to_owned(),
            Self::Comma => "`,`".to_owned(),
            Self::Dot => "`.`".to_owned(),
        }
    }
}

/// A token and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Byte offset into the query text.
    pub offset: usize,
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split query text into tokens.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] on a character that cannot start a token
/// or on an unknown `name!` macro.
pub fn tokenize(text: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '$' => TokenKind::Root,
            c if is_ident_start(c) => {
                let mut name = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if !is_ident_continue(next) {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }

                if chars.next_if(|&(_, next)| next == '!').is_some() {
                    match name.as_str() {
                        "prev" => TokenKind::Prev,
                        "agent" => TokenKind::Agent,
                        "root" => TokenKind::Root,
                        _ => {
                            return Err(QueryError::parse(
                                offset,
                                format!("unknown macro `{name}!`"),
                            ));
                        }
                    }
                } else {
                    TokenKind::Ident(name)
                }
            }
            other => {
                return Err(QueryError::parse(
                    offset,
                    format!("unexpected character `{other}`"),
                ));
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}
