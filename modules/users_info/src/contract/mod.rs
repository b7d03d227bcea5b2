pub mod client;
pub mod error;
pub mod model;

pub use client::UsersInfoApi;
pub use error::{FieldViolation, UsersInfoError};
pub use model::{NewUser, User, UserPatch};
