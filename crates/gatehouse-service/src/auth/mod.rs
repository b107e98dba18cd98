//! Registration, login and the current-session view.

pub mod service;

pub use service::{
    AuthService, CurrentUser, LoginInput, LoginResult, RegisterInput, RegisteredUser,
    RoleSummary, SessionUser,
};
