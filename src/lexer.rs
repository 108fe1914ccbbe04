//! dotenv lexical analyzer
//!
//! [`TokenStream`] turns source text into a lazy sequence of tokens, switching
//! the active grammar as quoted strings and values are entered and left.
//! [`Scanner`] adds the single-token lookahead the parser works with.

use crate::error::{LexError, ParseError, Position};
use crate::grammar::{Action, GrammarId, TokenKind};
use smallvec::SmallVec;
use tracing::trace;

/// Longest excerpt of source shown in lexical error messages
const NEAR_CONTEXT_CHARS: usize = 24;

/// A lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub position: Position,
}

/// Grammar-driven token stream over one source text
///
/// The stream owns the grammar stack for the duration of one parse. It is
/// single pass: once end of input or a failure has been produced, iteration
/// stops.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    /// Input text being lexed
    source: &'a str,
    /// Current position in input
    position: Position,
    /// Active grammars, top is last
    stack: SmallVec<[GrammarId; 4]>,
    /// Token budget for resource limiting
    max_tokens: usize,
    /// Tokens produced so far
    token_count: usize,
    /// Set after end of input or an error has been yielded by the iterator
    finished: bool,
}

impl<'a> TokenStream<'a> {
    /// Creates a stream starting in `initial`
    pub fn new(source: &'a str, initial: GrammarId) -> Self {
        let mut stack = SmallVec::new();
        stack.push(initial);
        Self {
            source,
            position: Position::new(),
            stack,
            max_tokens: usize::MAX,
            token_count: 0,
            finished: false,
        }
    }

    /// Limits the number of tokens the stream will produce
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Returns the grammar on top of the stack
    pub fn active_grammar(&self) -> GrammarId {
        // the root grammar is never popped
        self.stack[self.stack.len() - 1]
    }

    /// Returns the number of grammars on the stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the current position in the input
    pub fn current_position(&self) -> Position {
        self.position
    }

    /// Produces the next token. At end of input this keeps returning
    /// [`TokenKind::Eos`].
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        let grammar = self.active_grammar().token_set();

        while let Some(len) = grammar.skip_at(self.source, self.position.offset) {
            self.advance(len);
        }

        if self.position.offset >= self.source.len() {
            return Ok(Token {
                kind: TokenKind::Eos,
                lexeme: "",
                position: self.position,
            });
        }

        if self.token_count >= self.max_tokens {
            return Err(LexError::TokenLimitExceeded {
                limit: self.max_tokens,
                position: self.position,
            });
        }

        let Some((kind, len)) = grammar.match_at(self.source, self.position.offset) else {
            return Err(LexError::NoMatch {
                grammar: grammar.name,
                position: self.position,
                near: self.near_text(),
            });
        };

        let position = self.position;
        let lexeme = self.advance(len);
        self.token_count += 1;
        self.apply(grammar.action_for(kind));

        Ok(Token {
            kind,
            lexeme,
            position,
        })
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let start = self.position.offset;
        let text = &self.source[start..start + len];
        self.position.advance_by(text);
        text
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Push(id) => {
                self.stack.push(id);
                trace!(grammar = id.token_set().name, depth = self.stack.len(), "push grammar");
            }
            Action::Pop if self.stack.len() > 1 => {
                self.stack.pop();
                trace!(
                    grammar = self.active_grammar().token_set().name,
                    depth = self.stack.len(),
                    "pop grammar"
                );
            }
            Action::Pop | Action::Stay => {}
        }
    }

    /// Rest of the current line, shortened for diagnostics
    fn near_text(&self) -> String {
        let rest = &self.source[self.position.offset..];
        let line = rest.split(['\r', '\n']).next().unwrap_or_default();
        line.chars().take(NEAR_CONTEXT_CHARS).collect()
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        self.finished = match &result {
            Ok(token) => token.kind == TokenKind::Eos,
            Err(_) => true,
        };
        Some(result)
    }
}

impl std::iter::FusedIterator for TokenStream<'_> {}

/// Pull-based cursor with single-token lookahead
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    stream: TokenStream<'a>,
    lookahead: Option<Token<'a>>,
}

impl<'a> Scanner<'a> {
    /// Wraps a token stream
    pub fn new(stream: TokenStream<'a>) -> Self {
        Self {
            stream,
            lookahead: None,
        }
    }

    fn fill(&mut self) -> Result<Token<'a>, LexError> {
        if let Some(token) = self.lookahead {
            return Ok(token);
        }
        let token = self.stream.next_token()?;
        self.lookahead = Some(token);
        Ok(token)
    }

    /// Returns the next token without consuming it if it is of `kind`
    pub fn peek(&mut self, kind: TokenKind) -> Result<Option<Token<'a>>, LexError> {
        let token = self.fill()?;
        Ok((token.kind == kind).then_some(token))
    }

    /// Consumes and returns the next token if it is of `kind`
    pub fn consume(&mut self, kind: TokenKind) -> Result<Option<Token<'a>>, LexError> {
        let token = self.peek(kind)?;
        if token.is_some() {
            self.lookahead = None;
        }
        Ok(token)
    }

    /// Consumes the next token, failing unless it is of `kind`
    pub fn demand(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.fill()?;
        if token.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                lexeme: token.lexeme.to_string(),
                position: token.position,
            });
        }
        self.lookahead = None;
        Ok(token)
    }

    /// Returns true while a token other than end of input remains
    pub fn valid(&mut self) -> Result<bool, LexError> {
        Ok(self.fill()?.kind != TokenKind::Eos)
    }

    /// Returns the current position of the underlying stream
    pub fn current_position(&self) -> Position {
        self.lookahead
            .map_or_else(|| self.stream.current_position(), |token| token.position)
    }
}
