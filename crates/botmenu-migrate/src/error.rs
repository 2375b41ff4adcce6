use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Firestore is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Firestore rejected {path} ({status}): {body}")]
    Rejected {
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
