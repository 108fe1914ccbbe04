//! # dotenv lexer
//!
//! A grammar-driven `.env` parser with typed values, placeholder
//! interpolation and serde integration.
//!
//! ## Overview
//!
//! Input is lexed by a stack of small grammars: one for the top level, one
//! for the value after a variable name and one for each quote style. The
//! parser walks the resulting tokens with a single-token lookahead and
//! produces an ordered map of variable names to [`EnvValue`]s.
//!
//! ## Key Features
//!
//! - **Typed values**: `null`, booleans (`true`/`on`/`yes`, `false`/`off`/`no`),
//!   integers and floats are recognised in bare values
//! - **Quoting**: single-quoted values are taken literally, double-quoted
//!   values support escapes and line continuations
//! - **Interpolation**: `${NAME}` and `${NAME:-default}` in bare and
//!   double-quoted values
//! - **Constants**: bare values can name constants supplied through a
//!   [`ConstantResolver`]
//! - **Serde Integration**: use `#[derive(Deserialize)]` on configuration structs
//!
//! ## Basic Usage
//!
//! ```rust
//! use dotenv_lexer::{EnvValue, parse};
//!
//! let env = parse("APP_NAME=demo\nPORT=8080\nDEBUG=on\n")?;
//!
//! assert_eq!(env["APP_NAME"], EnvValue::from("demo"));
//! assert_eq!(env["PORT"], EnvValue::Integer(8080));
//! assert_eq!(env["DEBUG"], EnvValue::Boolean(true));
//! # Ok::<(), dotenv_lexer::ParseError>(())
//! ```
//!
//! ## Interpolation
//!
//! Placeholders see the variables defined above them first and the context
//! map second.
//!
//! ```rust
//! use dotenv_lexer::{EnvMap, EnvValue, parse_with_context};
//!
//! let mut context = EnvMap::new();
//! context.insert("HOME".to_string(), EnvValue::from("/home/app"));
//!
//! let env = parse_with_context(
//!     "CACHE=\"${HOME}/cache\"\nLEVEL=${LOG_LEVEL:-info}\n",
//!     &context,
//! )?;
//!
//! assert_eq!(env["CACHE"], EnvValue::from("/home/app/cache"));
//! assert_eq!(env["LEVEL"], EnvValue::from("info"));
//! # Ok::<(), dotenv_lexer::ParseError>(())
//! ```
//!
//! ## Serde
//!
//! ```rust
//! use serde::Deserialize;
//! use dotenv_lexer::from_str;
//!
//! #[derive(Debug, Deserialize)]
//! #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
//! struct ServerConfig {
//!     host: String,
//!     port: u16,
//!     debug: bool,
//! }
//!
//! let config: ServerConfig = from_str("HOST=localhost\nPORT=8080\nDEBUG=no\n")?;
//! assert_eq!(config.port, 8080);
//! assert!(!config.debug);
//! # Ok::<(), dotenv_lexer::DotenvError>(())
//! ```
//!
//! ## Loading Files
//!
//! ```rust,no_run
//! use dotenv_lexer::{EnvMap, Loader};
//!
//! let loader = Loader::new("/srv/app");
//! let base = loader.require(".env", &EnvMap::new())?;
//! let local = loader.include(".env.local", &base)?;
//! # Ok::<(), dotenv_lexer::LoadError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use dotenv_lexer::{ParseError, parse};
//!
//! match parse("GREETING='unterminated") {
//!     Err(err @ ParseError::UnexpectedToken { .. }) => {
//!         let pos = err.position();
//!         println!("error at line {}, column {}: {}", pos.line, pos.column, err);
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

pub mod deserializer;
pub mod error;
pub mod grammar;
pub mod interpolate;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod value;


// Re-export main types and functions
pub use deserializer::{EnvValueDeserializer, from_env_map, from_str, from_str_with_context};
pub use error::{DotenvError, LexError, LoadError, ParseError, Position, SerdeError};
pub use grammar::{GrammarId, TokenKind};
pub use lexer::{Scanner, Token, TokenStream};
pub use loader::Loader;
pub use parser::{DuplicateKeyBehavior, Parser, ParserConfig};

// Re-export value and constant resolver types
pub use value::{
    ChainedConstantResolver, ConstantResolver, EnvMap, EnvValue, MapConstantResolver, NoConstants,
};

/// Parses dotenv text with a default [`Parser`]
pub fn parse(input: &str) -> Result<EnvMap, ParseError> {
    Parser::new().parse(input, &EnvMap::new())
}

/// Parses dotenv text, resolving placeholders against `context` as well
pub fn parse_with_context(input: &str, context: &EnvMap) -> Result<EnvMap, ParseError> {
    Parser::new().parse(input, context)
}
