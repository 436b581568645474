//! Login and session-conflict resolution.

mod negotiator;
mod redirect;

pub use negotiator::{
    CHANGE_PASSWORD_PATH, LOGIN_PATH, LoginState, NegotiatorOptions, RESET_PASSWORD_PATH,
    SessionNegotiator, classify_login,
};
pub use redirect::redirect_target;
