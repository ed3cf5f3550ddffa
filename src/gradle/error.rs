use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Build file not found: {0}")]
    NotFound(PathBuf),

    #[error("Plugin block not added: no line matches {anchor}")]
    PluginBlockNotAdded { anchor: String },

    #[error(
        "Repository not added inside {closure} (classpath added: {classpath_added})"
    )]
    RepositoryNotAdded {
        closure: String,
        classpath_added: bool,
    },

    #[error(
        "Classpath not added inside {closure} (repository added: {repository_added})"
    )]
    ClasspathNotAdded {
        closure: String,
        repository_added: bool,
    },

    #[error("No insertion point found in closure {0}")]
    ClosureNotFound(String),

    #[error("Version {version} is lower than the required {minimum}")]
    VersionTooLow { version: String, minimum: String },

    #[error("Failed to access build file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
