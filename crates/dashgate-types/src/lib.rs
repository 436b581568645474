//! Wire and domain types shared across dashgate crates.

pub mod datasource;
pub mod folder;
pub mod login;

pub use datasource::{DataSource, DataSourceVersion};
pub use folder::{Folder, FolderChoice, FolderHit, FolderOption};
pub use login::{
    ChangePasswordRequest, Credentials, DEFAULT_PASSWORD, LoginOutcome, LoginResponse,
    ResetPasswordRequest, UserSession,
};
