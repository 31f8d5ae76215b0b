use crate::capability::Purpose;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("No content file connected. Run `blogdesk connect <file>` first")]
    NotConnected,

    #[error(
        "{} could not be loaded, so it was not overwritten. Fix it and run `blogdesk connect` again",
        .0.display()
    )]
    ContentNotLoaded(std::path::PathBuf),

    #[error("No {0} selected, operation cancelled")]
    Cancelled(Purpose),

    #[error("This site is opened read-only; editing is disabled")]
    ReadOnly,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, BlogError>;
