use std::path::PathBuf;

use color_eyre::{Report, Section};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential file exists yet
    #[error("no credential file at {0}")]
    NotFound(PathBuf),
    /// Refused to overwrite an existing credential file
    #[error("credential file already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("credential file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The refresh token was revoked or has expired
    #[error("spotify refused the refresh token: {0}")]
    AuthExpired(String),
    #[error("spotify rejected the access token [{code}]: {message}")]
    AuthError { code: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("slack rejected the status update: {0}")]
    PublishRejected(String),
    #[error("unexpected response [{code}]: {message}")]
    Remote { code: u16, message: String },

    #[error("setup failed: {0}")]
    Setup(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn setup<S: ToString>(message: S) -> Self {
        Self::Setup(message.to_string())
    }

    pub fn config<S: ToString>(message: S) -> Self {
        Self::Config(message.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(value.to_string())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(value: dialoguer::Error) -> Self {
        Error::Setup(value.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(value: serde_urlencoded::ser::Error) -> Self {
        Error::Setup(value.to_string())
    }
}

impl Error {
    /// Top level report with a hint on how to recover
    pub fn into_report(self) -> Report {
        let suggestion = match &self {
            Error::NotFound(_) => Some("Run the program from an interactive terminal to create it"),
            Error::AlreadyExists(_) => Some("Delete or move the file before running setup again"),
            Error::Corrupt { .. } => Some("Fix the file by hand or delete it to run setup again"),
            Error::AuthExpired(_) => Some("Delete the credential file and run setup again to re-authorize spotify"),
            Error::AuthError { .. } => Some("The access token is invalid, check the app's scopes and try again"),
            Error::Network(_) => Some("Check the network connection and try again later"),
            Error::PublishRejected(_) => {
                Some("Check that the slack token is valid and has the users.profile:write scope")
            }
            Error::Remote { .. } => Some("Try again later"),
            Error::Setup(_) | Error::Config(_) | Error::Io(_) => None,
        };
        let report = Report::new(self);
        match suggestion {
            Some(suggestion) => report.suggestion(suggestion),
            None => report,
        }
    }
}
