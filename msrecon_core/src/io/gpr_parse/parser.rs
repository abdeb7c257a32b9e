use crate::io::gpr_parse::token::Token;
use crate::metabolic_model::model::Gpr;

use thiserror::Error;

/*
GPR Grammar:
expression -> or_expr
or_expr -> and_expr ("or" and_expr)* ;
and_expr -> primary ("and" primary)* ;
primary -> GENE | "(" expression ")" ;

"and" binds tighter than "or", so
Gene1 and Gene2 or Gene3 parses as (Gene1 and Gene2) or Gene3
 */

/// GPR parser over a lexed token stream
pub struct GprParser {
    /// Vector of tokens from the GPR string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl GprParser {
    /// Create a new GprParser
    pub fn new(tokens: Vec<Token>) -> GprParser {
        GprParser { tokens, current: 0 }
    }

    /// Parse the token vector into a GPR AST
    pub fn parse(&mut self) -> Result<Gpr, ParseError> {
        let gpr = self.or_expr()?;
        if !self.is_at_end() {
            // The whole rule must be consumed
            return Err(ParseError::TrailingTokens);
        }
        Ok(gpr)
    }

    fn or_expr(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.and_expr()?;
        while self.match_token(Token::Or) {
            let right = self.and_expr()?;
            expr = Gpr::new_or(expr, right);
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.primary()?;
        while self.match_token(Token::And) {
            let right = self.primary()?;
            expr = Gpr::new_and(expr, right);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Gpr, ParseError> {
        if let Some(identifier) = self.match_identifier() {
            return Ok(Gpr::new_gene_node(&identifier));
        }

        if self.match_token(Token::LeftParen) {
            let expr = self.or_expr()?;
            if !self.match_token(Token::RightParen) {
                return Err(ParseError::UnclosedParen);
            }
            return Ok(expr);
        }

        Err(ParseError::ExpectedExpression)
    }

    /// Check whether the token at the current position matches `token`,
    /// advancing past it when it does
    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.current += 1;
            return true;
        }
        false
    }

    /// Consume and return the identifier at the current position, if any
    fn match_identifier(&mut self) -> Option<String> {
        match self.tokens.get(self.current) {
            Some(Token::Identifier(id)) => {
                let id = id.clone();
                self.current += 1;
                Some(id)
            }
            _ => None,
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.tokens.get(self.current) == Some(token)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens.get(self.current), Some(Token::Eof) | None)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected a gene or parenthesized expression")]
    ExpectedExpression,
    #[error("expected ')' after expression")]
    UnclosedParen,
    #[error("unexpected tokens after the end of the rule")]
    TrailingTokens,
}
