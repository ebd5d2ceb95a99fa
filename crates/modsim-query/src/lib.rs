//! Query compiler for the modsim agent simulator.
//!
//! Turns query text such as `(prev!(timeStep), agent!(Body2).position,)`
//! into the structured [`Query`] tree. The engine only ever sees the
//! compiled form; the compiler runs once per state-manager declaration when
//! a profile is loaded, never during stepping.
//!
//! # Syntax
//!
//! | Text | Query |
//! |------|-------|
//! | `name` | [`Query::Base`] |
//! | `prev!(q)` | [`Query::Prev`] |
//! | `root!` or `$` | [`Query::Root`] |
//! | `agent!(id)` | [`Query::Agent`] |
//! | `q.name` | [`Query::Access`] |
//! | `(a, b)`, `(a,)`, `()` | [`Query::Tuple`] |
//! | `(q)` | grouping, yields `q` |
//!
//! # Modules
//!
//! - [`lexer`] -- Tokenizer with byte offsets
//! - [`parser`] -- Recursive-descent parser over the token stream
//! - [`error`] -- [`QueryError`] diagnostics

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::QueryError;
pub use modsim_types::Query;

/// A service that compiles query text into a [`Query`] tree.
///
/// The graph builder is generic over this trait so that alternative
/// front-ends (a remote compiler, a pre-compiled cache) can be swapped in
/// without touching the engine.
pub trait QueryCompiler {
    /// Compile one query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] with a diagnostic when the text is malformed.
    fn compile(&self, text: &str) -> Result<Query, QueryError>;
}

/// The built-in compiler for the textual query syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextQueryCompiler;

impl TextQueryCompiler {
    /// Create a new compiler.
    pub const fn new() -> Self {
        Self
    }
}

impl QueryCompiler for TextQueryCompiler {
    fn compile(&self, text: &str) -> Result<Query, QueryError> {
        let tokens = lexer::tokenize(text)?;
        let query = parser::Parser::new(&tokens).parse()?;
        tracing::trace!(%query, "compiled query");
        Ok(query)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn compiles_velocity_inputs() {
        let text = "(
            prev!(timeStep),
            prev!(position),
            prev!(velocity),
            agent!(Body2).position,
            agent!(Body2).mass,
        )";
        let q = TextQueryCompiler::new().compile(text).unwrap();
        assert_eq!(
            q,
            Query::tuple(vec![
                Query::prev(Query::base("timeStep")),
                Query::prev(Query::base("position")),
                Query::prev(Query::base("velocity")),
                Query::access(Query::agent("Body2"), "position"),
                Query::access(Query::agent("Body2"), "mass"),
            ])
        );
    }

    #[test]
    fn display_output_compiles_back() {
        let q = Query::tuple(vec![
            Query::prev(Query::access(Query::Root, "mass")),
            Query::base("velocity"),
        ]);
        let again = TextQueryCompiler::new().compile(&q.to_string()).unwrap();
        assert_eq!(again, q);
    }

    #[test]
    fn compiled_form_matches_document_shape() {
        let q = TextQueryCompiler::new().compile("velocity").unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "Base", "content": "velocity"}));
    }
}
