//! Module for parsing gene reaction rule strings into AST values

use crate::io::gpr_parse::lexer::LexerError;
use crate::io::gpr_parse::parser::ParseError;
use crate::metabolic_model::model::Gpr;
use thiserror::Error;

mod lexer;
pub mod parser;
mod token;

/// Parse a gene reaction rule string into a GPR tree
///
/// # Examples
/// ```rust
/// use msrecon_core::io::gpr_parse::parse_gpr;
/// let gpr = parse_gpr("peg.1 and peg.2").unwrap();
/// assert_eq!(gpr.genes(), vec!["peg.1", "peg.2"]);
/// ```
pub fn parse_gpr(input: &str) -> Result<Gpr, GprParseError> {
    // Convert the rule string into tokens
    let tokens = lexer::Lexer::new(input).scan_tokens()?;
    // Now parse those tokens into a GPR tree
    let gpr = parser::GprParser::new(tokens).parse()?;
    Ok(gpr)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error)]
pub enum GprParseError {
    /// Lexing error
    #[error("error occurred during lexing (conversion of GPR string to tokens): {0}")]
    LexingError(#[from] LexerError),
    /// Parsing error
    #[error("error occurred during parsing (conversion of tokens to GPR tree): {0}")]
    ParsingError(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::{Gpr, GprOperation};

    #[test]
    fn parse_nested_rule() {
        let gpr = parse_gpr("peg.1 and (peg.2 or peg.3)").unwrap();
        let Gpr::Operation(GprOperation::And { left, right }) = gpr else {
            panic!("expected an And at the root");
        };
        assert_eq!(*left, Gpr::GeneNode("peg.1".to_string()));
        let Gpr::Operation(GprOperation::Or { left, right }) = *right else {
            panic!("expected an Or on the right");
        };
        assert_eq!(*left, Gpr::GeneNode("peg.2".to_string()));
        assert_eq!(*right, Gpr::GeneNode("peg.3".to_string()));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let gpr = parse_gpr("peg.1 and peg.2 or peg.3").unwrap();
        assert_eq!(format!("{}", gpr), "((peg.1 and peg.2) or peg.3)");
    }

    #[test]
    fn round_trip_through_display() {
        let gpr = parse_gpr("(peg.1 and peg.2) or peg.3").unwrap();
        let reparsed = parse_gpr(&gpr.to_string_id()).unwrap();
        assert_eq!(gpr, reparsed);
    }

    #[test]
    fn dangling_operator_is_an_error() {
        assert!(parse_gpr("peg.1 and").is_err());
        assert!(parse_gpr("(peg.1 or peg.2").is_err());
        assert!(parse_gpr("peg.1 peg.2").is_err());
    }
}
