//!
//! Initialization utilities: creating a default configuration file.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// File name `doctag init` writes.
pub const DEFAULT_CONFIG_FILE: &str = "doctag.yml";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to write {path}: {source}")]
    Io { source: io::Error, path: String },
}

/// Default configuration content: one sensible rule per common tag, mostly
/// commented out.
pub const DEFAULT_CONFIG: &str = r#"# doctag configuration file

# Global options
global:
  # Glob patterns to process exclusively (default: the whole tree)
  # include:
  #   - "src/main/java/**"

  # Glob patterns to skip
  exclude:
    - "target"
    - "build"
    - "generated"

  # Respect .gitignore files when scanning directories (default: true)
  respect-gitignore: true

# One entry per managed tag. Entries are applied in order.
tags:
  - tag: since
    value: "1.0.0"
    # BEGINNING | END | NONE | PRESERVE
    insert-position: END
    # ALWAYS | NEVER | IF_LOWER | NONE
    overwrite: NEVER

  # - tag: author
  #   value: platform-team
  #   insert-position: BEGINNING
  #   overwrite: NEVER
  #   location:
  #     mode: MANUAL
  #     remove-if-misplaced: true
  #     target-elements: [CLASS, INTERFACE, ENUM]

  # - tag: version
  #   value: "2.0.0"
  #   overwrite: IF_LOWER
"#;

/// Create the default configuration file at `path`.
///
/// Returns `true` if the file was created, or `false` if it already exists.
pub fn create_default_config(path: &str) -> Result<bool, InitError> {
    if Path::new(path).exists() {
        return Ok(false);
    }
    fs::write(path, DEFAULT_CONFIG).map_err(|source| InitError::Io {
        source,
        path: path.to_string(),
    })?;
    Ok(true)
}
