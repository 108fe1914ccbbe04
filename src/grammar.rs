//! Grammar definitions for the dotenv lexer
//!
//! A grammar (token set) is an immutable table of patterns to emit, patterns
//! to skip silently, and per-kind actions applied to the grammar stack when a
//! token is emitted. Four grammars exist: the top level, the value after a
//! variable name, and the bodies of single- and double-quoted strings.

use std::fmt;

/// Kinds of tokens produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Comment,
    Export,
    VarName,
    VarValue,
    Assign,
    SingleQuote,
    RawText,
    DoubleQuote,
    Eol,
    Eos,
}

impl TokenKind {
    /// Returns the diagnostic name of the kind
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "T_WHITESPACE",
            TokenKind::Comment => "T_COMMENT",
            TokenKind::Export => "T_EXPORT",
            TokenKind::VarName => "T_VAR_NAME",
            TokenKind::VarValue => "T_VAR_VALUE",
            TokenKind::Assign => "T_ASSIGN",
            TokenKind::SingleQuote => "T_SINGLE_QUOTE",
            TokenKind::RawText => "T_RAW_TEXT",
            TokenKind::DoubleQuote => "T_DOUBLE_QUOTE",
            TokenKind::Eol => "T_EOL",
            TokenKind::Eos => "T_EOS",
        }
    }

    /// Returns a human readable description for error messages
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Export => "'export'",
            TokenKind::VarName => "variable name",
            TokenKind::VarValue => "value",
            TokenKind::Assign => "'='",
            TokenKind::SingleQuote => "single quote",
            TokenKind::RawText => "quoted text",
            TokenKind::DoubleQuote => "double quote",
            TokenKind::Eol => "end of line",
            TokenKind::Eos => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whitespace as the `\s` class understands it
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Anchored lexical patterns
///
/// Each variant reproduces one regular expression of the dotenv surface
/// syntax; [`Pattern::source`] returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// A single literal character
    Literal(char),
    /// `\s+`
    Whitespace,
    /// `#[^\r\n]*`
    LineComment,
    /// `[ \t]*#[^\r\n]*`
    TrailingComment,
    /// A whole word bounded on both sides, `\bexport\b`
    Keyword(&'static str),
    /// `(?i)[a-z][a-z0-9_\.]*`
    Identifier,
    /// `[^\s]+`
    NonWhitespace,
    /// `\r?\n`
    LineBreak,
    /// `([^q\\]|\\(q)?)+` for the quote character `q`
    QuotedBody(char),
}

impl Pattern {
    /// Returns the regular expression this pattern implements
    pub fn source(&self) -> String {
        match self {
            Pattern::Literal(c) => c.to_string(),
            Pattern::Whitespace => r"\s+".to_string(),
            Pattern::LineComment => r"#[^\r\n]*".to_string(),
            Pattern::TrailingComment => r"[ \t]*#[^\r\n]*".to_string(),
            Pattern::Keyword(word) => format!(r"\b{word}\b"),
            Pattern::Identifier => r"(?i)[a-z][a-z0-9_\.]*".to_string(),
            Pattern::NonWhitespace => r"[^\s]+".to_string(),
            Pattern::LineBreak => r"\r?\n".to_string(),
            Pattern::QuotedBody(q) => format!(r"([^{q}\\]|\\({q})?)+"),
        }
    }

    /// Matches the pattern anchored at `cursor`, returning the matched byte
    /// length. Empty matches are reported as no match.
    pub fn match_at(&self, source: &str, cursor: usize) -> Option<usize> {
        let rest = &source[cursor..];
        let len = match *self {
            Pattern::Literal(c) => {
                if rest.starts_with(c) {
                    c.len_utf8()
                } else {
                    0
                }
            }
            Pattern::Whitespace => prefix_len(rest, is_space),
            Pattern::LineComment => {
                if rest.starts_with('#') {
                    prefix_len(rest, |c| c != '\r' && c != '\n')
                } else {
                    0
                }
            }
            Pattern::TrailingComment => {
                let indent = prefix_len(rest, |c| c == ' ' || c == '\t');
                if rest[indent..].starts_with('#') {
                    indent + prefix_len(&rest[indent..], |c| c != '\r' && c != '\n')
                } else {
                    0
                }
            }
            Pattern::Keyword(word) => {
                let before = source[..cursor].chars().next_back();
                let after = rest.get(word.len()..).and_then(|tail| tail.chars().next());
                if rest.starts_with(word)
                    && !before.is_some_and(is_word)
                    && !after.is_some_and(is_word)
                {
                    word.len()
                } else {
                    0
                }
            }
            Pattern::Identifier => {
                if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    prefix_len(rest, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
                } else {
                    0
                }
            }
            Pattern::NonWhitespace => prefix_len(rest, |c| !is_space(c)),
            Pattern::LineBreak => {
                if rest.starts_with("\r\n") {
                    2
                } else if rest.starts_with('\n') {
                    1
                } else {
                    0
                }
            }
            Pattern::QuotedBody(quote) => quoted_body_len(rest, quote),
        };
        (len > 0).then_some(len)
    }
}

/// Byte length of the longest prefix whose characters all satisfy `pred`
fn prefix_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(text.len(), |(idx, _)| idx)
}

/// Runs of anything but the quote or a backslash, where a backslash may
/// swallow one following quote
fn quoted_body_len(text: &str, quote: char) -> usize {
    let mut chars = text.char_indices().peekable();
    let mut end = 0;
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            break;
        }
        end = idx + c.len_utf8();
        if c == '\\' {
            if let Some(&(next_idx, next)) = chars.peek() {
                if next == quote {
                    end = next_idx + next.len_utf8();
                    chars.next();
                }
            }
        }
    }
    end
}

/// Identifies one of the four grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarId {
    Main,
    Value,
    SingleQuoted,
    DoubleQuoted,
}

impl GrammarId {
    /// Returns the token set of this grammar
    pub fn token_set(self) -> &'static TokenSet {
        match self {
            GrammarId::Main => &MAIN,
            GrammarId::Value => &VALUE,
            GrammarId::SingleQuoted => &SINGLE_QUOTED,
            GrammarId::DoubleQuoted => &DOUBLE_QUOTED,
        }
    }
}

/// Grammar stack mutation triggered by an emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Push(GrammarId),
    Pop,
    Stay,
}

/// A token kind paired with the pattern that produces it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub kind: TokenKind,
    pub pattern: Pattern,
}

const fn rule(kind: TokenKind, pattern: Pattern) -> Rule {
    Rule { kind, pattern }
}

/// An immutable grammar: patterns to emit, patterns to skip, transitions
#[derive(Debug)]
pub struct TokenSet {
    pub name: &'static str,
    pub matches: &'static [Rule],
    pub skips: &'static [Rule],
    pub transitions: &'static [(TokenKind, Action)],
}

impl TokenSet {
    /// Returns the byte length of the first skip pattern matching at `cursor`
    pub fn skip_at(&self, source: &str, cursor: usize) -> Option<usize> {
        self.skips
            .iter()
            .find_map(|rule| rule.pattern.match_at(source, cursor))
    }

    /// Returns the kind and byte length of the first match pattern, in
    /// declaration order
    pub fn match_at(&self, source: &str, cursor: usize) -> Option<(TokenKind, usize)> {
        self.matches.iter().find_map(|rule| {
            rule.pattern
                .match_at(source, cursor)
                .map(|len| (rule.kind, len))
        })
    }

    /// Returns the stack action registered for `kind`
    pub fn action_for(&self, kind: TokenKind) -> Action {
        self.transitions
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(Action::Stay, |(_, action)| *action)
    }
}

pub static MAIN: TokenSet = TokenSet {
    name: "main",
    matches: &[rule(TokenKind::VarName, Pattern::Identifier)],
    skips: &[
        rule(TokenKind::Whitespace, Pattern::Whitespace),
        rule(TokenKind::Comment, Pattern::LineComment),
        rule(TokenKind::Export, Pattern::Keyword("export")),
    ],
    transitions: &[(TokenKind::VarName, Action::Push(GrammarId::Value))],
};

pub static VALUE: TokenSet = TokenSet {
    name: "value",
    matches: &[
        rule(TokenKind::Assign, Pattern::Literal('=')),
        rule(TokenKind::SingleQuote, Pattern::Literal('\'')),
        rule(TokenKind::DoubleQuote, Pattern::Literal('"')),
        rule(TokenKind::VarValue, Pattern::NonWhitespace),
        rule(TokenKind::Eol, Pattern::LineBreak),
    ],
    skips: &[rule(TokenKind::Comment, Pattern::TrailingComment)],
    transitions: &[
        (TokenKind::Eol, Action::Pop),
        (TokenKind::SingleQuote, Action::Push(GrammarId::SingleQuoted)),
        (TokenKind::DoubleQuote, Action::Push(GrammarId::DoubleQuoted)),
    ],
};

pub static SINGLE_QUOTED: TokenSet = TokenSet {
    name: "single-quoted string",
    matches: &[
        rule(TokenKind::RawText, Pattern::QuotedBody('\'')),
        rule(TokenKind::SingleQuote, Pattern::Literal('\'')),
    ],
    skips: &[],
    transitions: &[(TokenKind::SingleQuote, Action::Pop)],
};

pub static DOUBLE_QUOTED: TokenSet = TokenSet {
    name: "double-quoted string",
    matches: &[
        rule(TokenKind::RawText, Pattern::QuotedBody('"')),
        rule(TokenKind::DoubleQuote, Pattern::Literal('"')),
    ],
    skips: &[],
    transitions: &[(TokenKind::DoubleQuote, Action::Pop)],
};
