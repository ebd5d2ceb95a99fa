//! Recursive-descent parser producing [`Query`] trees.
//!
//! ```text
//! query   := primary ( '.' ident )*
//! primary := 'prev!' '(' query ')'
//!          | 'agent!' '(' ident ')'
//!          | 'root!'
//!          | '(' ')'
//!          | '(' query ( ',' query )* ','? ')'
//!          | ident
//! ```
//!
//! A parenthesized single query without a comma is grouping, not a tuple.

use modsim_types::Query;

use crate::error::QueryError;
use crate::lexer::{Token, TokenKind};

/// Parser state over a token slice.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned at the first token.
    pub const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream as exactly one query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the tokens do not form a query or if input
    /// remains after it.
    pub fn parse(mut self) -> Result<Query, QueryError> {
        if self.tokens.is_empty() {
            return Err(QueryError::UnexpectedEnd {
                expected: "a query".to_owned(),
            });
        }
        let query = self.query()?;
        if let Some(token) = self.peek() {
            return Err(QueryError::parse(
                token.offset,
                format!("unexpected {} after query", token.kind.describe()),
            ));
        }
        Ok(query)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos = self.pos.saturating_add(1);
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), QueryError> {
        match self.advance() {
            Some(token) if &token.kind == kind => Ok(()),
            Some(token) => Err(QueryError::parse(
                token.offset,
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
            )),
            None => Err(QueryError::UnexpectedEnd {
                expected: kind.describe(),
            }),
        }
    }

    fn ident(&mut self) -> Result<String, QueryError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name.clone()),
            Some(token) => Err(QueryError::parse(
                token.offset,
                format!("expected identifier, found {}", token.kind.describe()),
            )),
            None => Err(QueryError::UnexpectedEnd {
                expected: "identifier".to_owned(),
            }),
        }
    }

    fn query(&mut self) -> Result<Query, QueryError> {
        let mut query = self.primary()?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            let field = self.ident()?;
            query = Query::access(query, field);
        }
        Ok(query)
    }

    fn primary(&mut self) -> Result<Query, QueryError> {
        let Some(token) = self.advance() else {
            return Err(QueryError::UnexpectedEnd {
                expected: "a query".to_owned(),
            });
        };

        match &token.kind {
            TokenKind::Ident(name) => Ok(Query::base(name.clone())),
            TokenKind::Root => Ok(Query::Root),
            TokenKind::Prev => {
                self.expect(&TokenKind::LParen)?;
                let inner = self.query()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Query::prev(inner))
            }
            TokenKind::Agent => {
                self.expect(&TokenKind::LParen)?;
                let id = self.ident()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Query::agent(id))
            }
            TokenKind::LParen => self.parenthesized(),
            other => Err(QueryError::parse(
                token.offset,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    /// Parse what follows an opening parenthesis.
    fn parenthesized(&mut self) -> Result<Query, QueryError> {
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(Query::tuple(Vec::new()));
        }

        let first = self.query()?;
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RParen)?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance();
            if self.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.query()?);
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Query::tuple(items))
    }
}
