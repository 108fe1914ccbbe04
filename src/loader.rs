//! Loading dotenv files relative to a root directory

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::LoadError;
use crate::parser::Parser;
use crate::value::EnvMap;
use tracing::debug;

/// Resolves dotenv files below a root directory and parses them
#[derive(Debug)]
pub struct Loader {
    root: PathBuf,
    parser: Parser,
}

impl Loader {
    /// Creates a loader with a default [`Parser`]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parser(root, Parser::new())
    }

    /// Creates a loader that parses with `parser`
    pub fn with_parser(root: impl Into<PathBuf>, parser: Parser) -> Self {
        Self {
            root: root.into(),
            parser,
        }
    }

    /// Returns the root directory files are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the parser used for file contents
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Resolves `file` below the root. Root and prefix components are
    /// dropped, so an absolute name still points inside the root.
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        let relative: PathBuf = file
            .as_ref()
            .components()
            .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.root.join(relative)
    }

    /// Loads `file` if it exists.
    ///
    /// Returns `Ok(None)` when there is no such file and an empty map when
    /// the file holds nothing but whitespace. Content that is not valid
    /// UTF-8 cannot be decoded and is reported as
    /// [`LoadError::UnreadableFile`], like a permission failure.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.as_ref().display()))]
    pub fn include(
        &self,
        file: impl AsRef<Path>,
        context: &EnvMap,
    ) -> Result<Option<EnvMap>, LoadError> {
        let path = self.resolve(file);

        if !path.is_file() {
            debug!(path = %path.display(), "dotenv file not found");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::PermissionDenied | ErrorKind::InvalidData => LoadError::UnreadableFile {
                path: path.clone(),
                source,
            },
            _ => LoadError::Io {
                path: path.clone(),
                source,
            },
        })?;

        let content = content.trim();
        if content.is_empty() {
            return Ok(Some(EnvMap::new()));
        }

        self.parser
            .parse(content, context)
            .map(Some)
            .map_err(|source| LoadError::SyntaxError { path, source })
    }

    /// Loads `file`, failing with [`LoadError::FileNotFound`] if it is absent
    pub fn require(&self, file: impl AsRef<Path>, context: &EnvMap) -> Result<EnvMap, LoadError> {
        let file = file.as_ref();
        self.include(file, context)?
            .ok_or_else(|| LoadError::FileNotFound {
                path: self.resolve(file),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DuplicateKeyBehavior, ParserConfig};

    #[test]
    fn test_accessors() {
        let loader = Loader::new("/srv/app");
        assert_eq!(loader.root(), Path::new("/srv/app"));
        assert_eq!(loader.parser().config().max_tokens, 1_000_000);

        let parser = Parser::with_config(
            ParserConfig::new().with_duplicate_key_behavior(DuplicateKeyBehavior::Error),
        );
        let loader = Loader::with_parser("conf", parser);
        assert_eq!(loader.root(), Path::new("conf"));
        assert_eq!(
            loader.parser().config().duplicate_key_behavior,
            DuplicateKeyBehavior::Error
        );
    }

    #[test]
    fn test_resolve_stays_below_root() {
        let loader = Loader::new("/srv/app");
        assert_eq!(loader.resolve(".env"), Path::new("/srv/app/.env"));
        assert_eq!(loader.resolve("conf/.env"), Path::new("/srv/app/conf/.env"));
        assert_eq!(loader.resolve("/etc/passwd"), Path::new("/srv/app/etc/passwd"));
        assert_eq!(loader.resolve("/"), Path::new("/srv/app"));
    }
}
