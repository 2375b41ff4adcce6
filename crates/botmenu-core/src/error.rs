use thiserror::Error;

use crate::MenuPath;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("No menu option at path {0}")]
    InvalidPath(MenuPath),

    #[error("Option at {0} is not a submenu")]
    InvalidParent(MenuPath),

    #[error("Option at {0} is already a submenu")]
    AlreadyBranch(MenuPath),

    #[error("Welcome text can only be edited from the home view")]
    NotAtHome,

    #[error("Invalid path: {0}")]
    ParsePath(String),

    #[error("Invalid tenant id: {0:?}")]
    InvalidTenant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
