//! Typed dotenv values and the bare-value caster

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed scalar produced by parsing one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Parsed variables in file order
pub type EnvMap = IndexMap<String, EnvValue>;

impl EnvValue {
    /// Returns true if this is a Null variant
    pub fn is_null(&self) -> bool {
        matches!(self, EnvValue::Null)
    }

    /// Returns true if the value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, EnvValue::String(_))
    }

    /// Returns a reference to the string if this is a String variant
    pub fn as_str(&self) -> Option<&str> {
        if let EnvValue::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Returns the integer value if this is an Integer variant
    pub fn as_integer(&self) -> Option<i64> {
        if let EnvValue::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Returns the float value if this is a Float variant
    pub fn as_float(&self) -> Option<f64> {
        if let EnvValue::Float(f) = self {
            Some(*f)
        } else {
            None
        }
    }

    /// Returns the boolean value if this is a Boolean variant
    pub fn as_bool(&self) -> Option<bool> {
        if let EnvValue::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Text substituted for a `${NAME}` placeholder. Only strings and
    /// numbers have one.
    ///
    /// Floats are written with `Display`, which never uses exponent
    /// notation. A context value of `1e21` is substituted as
    /// `1000000000000000000000`. Floats produced by [`cast`] already
    /// print back as their source text.
    pub fn interpolation_text(&self) -> Option<String> {
        match self {
            EnvValue::String(s) => Some(s.clone()),
            EnvValue::Integer(i) => Some(i.to_string()),
            EnvValue::Float(f) => Some(f.to_string()),
            EnvValue::Null | EnvValue::Boolean(_) => None,
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Null => Ok(()),
            EnvValue::Boolean(b) => write!(f, "{b}"),
            EnvValue::Integer(i) => write!(f, "{i}"),
            EnvValue::Float(x) => write!(f, "{x}"),
            EnvValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::String(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        EnvValue::String(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        EnvValue::Integer(value)
    }
}

impl From<f64> for EnvValue {
    fn from(value: f64) -> Self {
        EnvValue::Float(value)
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        EnvValue::Boolean(value)
    }
}

/// Trait for resolving bare values that name a predefined constant
pub trait ConstantResolver: Send + Sync {
    /// Resolves a constant by name
    fn resolve_constant(&self, name: &str) -> Option<EnvValue>;
}

/// Resolver that knows no constants
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstants;

impl ConstantResolver for NoConstants {
    fn resolve_constant(&self, _name: &str) -> Option<EnvValue> {
        None
    }
}

/// Map-based constant resolver
#[derive(Debug, Clone, Default)]
pub struct MapConstantResolver {
    constants: IndexMap<String, EnvValue>,
}

impl MapConstantResolver {
    /// Creates an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from an existing map
    pub fn from_map(constants: IndexMap<String, EnvValue>) -> Self {
        Self { constants }
    }

    /// Registers a constant
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<EnvValue>) {
        self.constants.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`MapConstantResolver::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.insert(name, value);
        self
    }
}

impl ConstantResolver for MapConstantResolver {
    fn resolve_constant(&self, name: &str) -> Option<EnvValue> {
        self.constants.get(name).cloned()
    }
}

/// Chained resolver that tries multiple resolvers in order
#[derive(Default)]
pub struct ChainedConstantResolver {
    resolvers: Vec<Box<dyn ConstantResolver>>,
}

impl ChainedConstantResolver {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolver to the end of the chain
    pub fn add_resolver(&mut self, resolver: Box<dyn ConstantResolver>) {
        self.resolvers.push(resolver);
    }
}

impl ConstantResolver for ChainedConstantResolver {
    fn resolve_constant(&self, name: &str) -> Option<EnvValue> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve_constant(name))
    }
}

const TRUE_WORDS: [&str; 3] = ["true", "on", "yes"];
const FALSE_WORDS: [&str; 3] = ["false", "off", "no"];

/// Converts a bare (unquoted) lexeme into a typed value
///
/// `null` and the boolean words are matched case-insensitively. Numeric
/// text becomes an integer or float only when the number prints back as the
/// same text, so `007` or `1.50` stay strings.
pub fn cast(lexeme: &str, constants: &dyn ConstantResolver) -> EnvValue {
    let lowered = lexeme.to_lowercase();

    if lowered == "null" {
        return EnvValue::Null;
    }
    if TRUE_WORDS.contains(&lowered.as_str()) {
        return EnvValue::Boolean(true);
    }
    if FALSE_WORDS.contains(&lowered.as_str()) {
        return EnvValue::Boolean(false);
    }

    if is_numeric(&lowered) {
        if let Ok(int) = lowered.parse::<i64>() {
            if int.to_string() == lowered {
                return EnvValue::Integer(int);
            }
        }
        if let Ok(float) = lowered.parse::<f64>() {
            if float.to_string() == lowered {
                return EnvValue::Float(float);
            }
        }
    } else if let Some(constant) = constants.resolve_constant(lexeme) {
        return constant;
    }

    EnvValue::String(lexeme.to_string())
}

/// Decimal number text: optional surrounding whitespace, optional sign,
/// digits with an optional fraction (or a bare fraction), optional exponent
pub fn is_numeric(text: &str) -> bool {
    let is_ws = |b: u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C');
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() && is_ws(bytes[i]) {
        i += 1;
    }
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == exp_start {
            return false;
        }
        i = j;
    }

    while i < bytes.len() && is_ws(bytes[i]) {
        i += 1;
    }
    i == bytes.len()
}
