use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must be relative, found leading '/'")]
    Absolute,
    #[error("asset key must use '/' separators, found '\\\\'")]
    Backslash,
    #[error("asset key must not climb out of the assets directory")]
    ParentTraversal,
    #[error("asset key has empty segment")]
    EmptySegment,
    #[error("asset key contains '{character}'; allowed are a-z, 0-9, '_', '-', '/'")]
    InvalidCharacter { character: char },
}

/// Asset keys name files under the assets directory without an extension,
/// e.g. `backgrounds/profile`.
pub fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::Absolute);
    }
    if key.contains('\\') {
        return Err(AssetKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    if key.split('/').any(str::is_empty) {
        return Err(AssetKeyError::EmptySegment);
    }
    match key.chars().find(|&ch| !is_key_char(ch)) {
        Some(character) => Err(AssetKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')
}

pub fn resolve_asset_path(
    assets_dir: &Path,
    key: &str,
    extension: &str,
) -> Result<PathBuf, AssetKeyError> {
    validate_asset_key(key)?;
    let mut path = assets_dir.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path.set_extension(extension);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_lowercase_keys() {
        for key in ["profile", "backgrounds/hobbies", "worlds/skills-2", "a_b/c"] {
            assert!(validate_asset_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_escaping_or_malformed_keys() {
        let cases = [
            ("", AssetKeyError::Empty),
            ("/porto-world", AssetKeyError::Absolute),
            (r"a\b", AssetKeyError::Backslash),
            ("a/../b", AssetKeyError::ParentTraversal),
            ("a//b", AssetKeyError::EmptySegment),
            ("a/", AssetKeyError::EmptySegment),
            ("Porto", AssetKeyError::InvalidCharacter { character: 'P' }),
            ("porto.webp", AssetKeyError::InvalidCharacter { character: '.' }),
        ];
        for (key, expected) in cases {
            assert_eq!(validate_asset_key(key), Err(expected), "key={key}");
        }
    }

    #[test]
    fn resolves_key_to_file_under_assets_dir() {
        let path = resolve_asset_path(Path::new("assets"), "backgrounds/profile", "png")
            .expect("path");
        assert_eq!(path, Path::new("assets").join("backgrounds").join("profile.png"));
    }
}
