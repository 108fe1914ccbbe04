//! dotenv parser for converting tokens into typed variables
//!
//! [`Parser`] holds immutable configuration only. Every call to
//! [`Parser::parse`] runs a private parse session that owns the scanner,
//! the grammar stack and the variables collected so far, so one parser can
//! serve any number of calls.

use std::fmt;

use crate::error::ParseError;
use crate::grammar::{GrammarId, TokenKind};
use crate::interpolate::{interpolate, unescape_double_quoted, unescape_single_quoted, unfold};
use crate::lexer::{Scanner, Token, TokenStream};
use crate::value::{ConstantResolver, EnvMap, EnvValue, NoConstants, cast};
use tracing::debug;

/// Behavior when a variable is assigned more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyBehavior {
    /// Use the last value, keeping the position of the first assignment
    #[default]
    Override,
    /// Return an error when a name is repeated
    Error,
}

/// Configuration options for the parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Behavior when duplicate keys are encountered
    pub duplicate_key_behavior: DuplicateKeyBehavior,
    /// Maximum number of tokens to prevent runaway inputs
    pub max_tokens: usize,
}

impl ParserConfig {
    /// Creates a new parser configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate key behavior
    pub fn with_duplicate_key_behavior(mut self, behavior: DuplicateKeyBehavior) -> Self {
        self.duplicate_key_behavior = behavior;
        self
    }

    /// Sets the token budget
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            duplicate_key_behavior: DuplicateKeyBehavior::Override,
            max_tokens: 1_000_000,
        }
    }
}

/// Reusable dotenv parser
pub struct Parser {
    config: ParserConfig,
    constants: Box<dyn ConstantResolver>,
}

impl Parser {
    /// Creates a parser with default configuration and no constants
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            constants: Box::new(NoConstants),
        }
    }

    /// Sets the resolver consulted for bare values naming a constant
    pub fn with_constants(mut self, constants: impl ConstantResolver + 'static) -> Self {
        self.constants = Box::new(constants);
        self
    }

    /// Returns the parser configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses dotenv text. `context` is only consulted by interpolation,
    /// after the variables already parsed from `input`.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn parse(&self, input: &str, context: &EnvMap) -> Result<EnvMap, ParseError> {
        let env = ParseSession::new(self, input, context).run()?;
        debug!(entries = env.len(), "parsed dotenv input");
        Ok(env)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State of a single parse call
struct ParseSession<'a> {
    parser: &'a Parser,
    scanner: Scanner<'a>,
    context: &'a EnvMap,
    env: EnvMap,
}

impl<'a> ParseSession<'a> {
    fn new(parser: &'a Parser, input: &'a str, context: &'a EnvMap) -> Self {
        let stream =
            TokenStream::new(input, GrammarId::Main).with_max_tokens(parser.config.max_tokens);
        Self {
            parser,
            scanner: Scanner::new(stream),
            context,
            env: EnvMap::new(),
        }
    }

    fn run(mut self) -> Result<EnvMap, ParseError> {
        while self.scanner.valid()? {
            self.parse_assignment()?;
        }
        Ok(self.env)
    }

    /// `NAME=value` followed by end of line or end of input
    fn parse_assignment(&mut self) -> Result<(), ParseError> {
        let name = self.scanner.demand(TokenKind::VarName)?;
        self.scanner.demand(TokenKind::Assign)?;

        let value = self.parse_value()?;

        if self.scanner.peek(TokenKind::Eos)?.is_none() {
            self.scanner.demand(TokenKind::Eol)?;
        }

        self.store(name, value)
    }

    fn parse_value(&mut self) -> Result<EnvValue, ParseError> {
        if let Some(token) = self.scanner.consume(TokenKind::VarValue)? {
            let value = cast(token.lexeme, self.parser.constants.as_ref());
            return Ok(match value {
                EnvValue::String(s) => {
                    EnvValue::String(interpolate(&s, &self.env, self.context))
                }
                other => other,
            });
        }

        if self.scanner.consume(TokenKind::SingleQuote)?.is_some() {
            let raw = self.quoted_body(TokenKind::SingleQuote)?;
            return Ok(EnvValue::String(unescape_single_quoted(&raw)));
        }

        if self.scanner.consume(TokenKind::DoubleQuote)?.is_some() {
            let raw = self.quoted_body(TokenKind::DoubleQuote)?;
            let expanded = interpolate(&unfold(&raw), &self.env, self.context);
            return Ok(EnvValue::String(unescape_double_quoted(&expanded)));
        }

        Ok(EnvValue::Null)
    }

    /// Collects raw text up to and including the closing quote
    fn quoted_body(&mut self, closing: TokenKind) -> Result<String, ParseError> {
        let mut raw = String::new();
        while let Some(token) = self.scanner.consume(TokenKind::RawText)? {
            raw.push_str(token.lexeme);
        }
        self.scanner.demand(closing)?;
        Ok(raw)
    }

    fn store(&mut self, name: Token<'a>, value: EnvValue) -> Result<(), ParseError> {
        if self.parser.config.duplicate_key_behavior == DuplicateKeyBehavior::Error
            && self.env.contains_key(name.lexeme)
        {
            return Err(ParseError::DuplicateKey {
                key: name.lexeme.to_string(),
                position: name.position,
            });
        }
        self.env.insert(name.lexeme.to_string(), value);
        Ok(())
    }
}
