//! Serde deserializer implementation for parsed dotenv variables
//!
//! This module lets parsed variables be deserialized directly into Rust types
//! using the standard serde derive macros. Keys are the variable names as
//! written, so structs usually carry
//! `#[serde(rename_all = "SCREAMING_SNAKE_CASE")]`.

use crate::error::DotenvError;
use crate::parser::Parser;
use crate::value::{EnvMap, EnvValue};
use serde::de::value::{MapDeserializer, StringDeserializer};
use serde::de::{self, DeserializeOwned, IntoDeserializer, Visitor};

/// Deserializer over a single parsed value
#[derive(Debug, Clone)]
pub struct EnvValueDeserializer {
    value: EnvValue,
}

impl EnvValueDeserializer {
    /// Creates a deserializer for `value`
    pub fn new(value: EnvValue) -> Self {
        Self { value }
    }
}

impl<'de> IntoDeserializer<'de, DotenvError> for EnvValue {
    type Deserializer = EnvValueDeserializer;

    fn into_deserializer(self) -> Self::Deserializer {
        EnvValueDeserializer::new(self)
    }
}

impl<'de> de::Deserializer<'de> for EnvValueDeserializer {
    type Error = DotenvError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            EnvValue::Null => visitor.visit_unit(),
            EnvValue::Boolean(b) => visitor.visit_bool(b),
            EnvValue::Integer(i) => visitor.visit_i64(i),
            EnvValue::Float(f) => visitor.visit_f64(f),
            EnvValue::String(s) => visitor.visit_string(s),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            EnvValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    // Typed scalars read back as their text when a string is wanted
    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            EnvValue::Null => visitor.visit_unit(),
            EnvValue::String(s) => visitor.visit_string(s),
            other => visitor.visit_string(other.to_string()),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            EnvValue::String(s) => {
                let variant: StringDeserializer<DotenvError> = s.into_deserializer();
                visitor.visit_enum(variant)
            }
            other => Err(de::Error::invalid_type(unexpected(&other), &"a unit variant name")),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn unexpected(value: &EnvValue) -> de::Unexpected<'_> {
    match value {
        EnvValue::Null => de::Unexpected::Unit,
        EnvValue::Boolean(b) => de::Unexpected::Bool(*b),
        EnvValue::Integer(i) => de::Unexpected::Signed(*i),
        EnvValue::Float(f) => de::Unexpected::Float(*f),
        EnvValue::String(s) => de::Unexpected::Str(s),
    }
}

/// Deserializes an already parsed map into `T`
pub fn from_env_map<T>(env: EnvMap) -> Result<T, DotenvError>
where
    T: DeserializeOwned,
{
    let deserializer = MapDeserializer::<_, DotenvError>::new(env.into_iter());
    T::deserialize(deserializer)
}

/// Parses dotenv text and deserializes the variables into `T`
pub fn from_str<T>(input: &str) -> Result<T, DotenvError>
where
    T: DeserializeOwned,
{
    from_str_with_context(input, &EnvMap::new())
}

/// Like [`from_str`], with a context map for interpolation
pub fn from_str_with_context<T>(input: &str, context: &EnvMap) -> Result<T, DotenvError>
where
    T: DeserializeOwned,
{
    let env = Parser::new().parse(input, context)?;
    from_env_map(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    struct AppConfig {
        app_name: String,
        port: u16,
        debug: bool,
        ratio: f64,
        #[serde(default)]
        api_key: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Info,
        Warn,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Logging {
        level: Level,
        target: Option<String>,
    }

    #[test]
    fn test_struct_deserialization() {
        let input = "APP_NAME=demo\nPORT=8080\nDEBUG=on\nRATIO=0.25\nUNUSED=x\n";
        let config: AppConfig = from_str(input).unwrap();

        assert_eq!(
            config,
            AppConfig {
                app_name: "demo".to_string(),
                port: 8080,
                debug: true,
                ratio: 0.25,
                api_key: None,
            }
        );
    }

    #[test]
    fn test_null_maps_to_none() {
        let input = "APP_NAME=demo\nPORT=1\nDEBUG=no\nRATIO=1\nAPI_KEY=\n";
        let config: AppConfig = from_str(input).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.ratio, 1.0);
    }

    #[test]
    fn test_scalars_read_as_strings() {
        let input = "APP_NAME=1.5\nPORT=1\nDEBUG=yes\nRATIO=2\nAPI_KEY=12345\n";
        let config: AppConfig = from_str(input).unwrap();
        assert_eq!(config.app_name, "1.5");
        assert_eq!(config.api_key.as_deref(), Some("12345"));
    }

    #[test]
    fn test_enum_variants_from_strings() {
        let logging: Logging = from_str("level=warn\ntarget='stderr'").unwrap();
        assert_eq!(logging.level, Level::Warn);
        assert_eq!(logging.target.as_deref(), Some("stderr"));

        let logging: Logging = from_str("level=info").unwrap();
        assert_eq!(logging.level, Level::Info);
        assert_eq!(logging.target, None);
    }

    #[test]
    fn test_context_interpolation() {
        let mut context = EnvMap::new();
        context.insert("HOST".to_string(), EnvValue::from("db.local"));

        let logging: Logging =
            from_str_with_context("level=info\ntarget=\"tcp://${HOST}\"", &context).unwrap();
        assert_eq!(logging.target.as_deref(), Some("tcp://db.local"));
    }

    #[test]
    fn test_type_mismatch_is_serde_error() {
        let result: Result<AppConfig, _> = from_str("APP_NAME=x\nPORT=high\nDEBUG=1\nRATIO=1");
        assert!(matches!(result, Err(DotenvError::Serde(_))));
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let result: Result<Logging, _> = from_str("level='info");
        assert!(matches!(result, Err(DotenvError::Parse(_))));
    }

    #[test]
    fn test_into_hash_map() {
        let map: std::collections::HashMap<String, EnvValue> =
            from_str("A=1\nB=two\nC=null").unwrap();
        assert_eq!(map["A"], EnvValue::Integer(1));
        assert_eq!(map["B"], EnvValue::from("two"));
        assert_eq!(map["C"], EnvValue::Null);
    }
}
