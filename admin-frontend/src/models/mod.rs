pub mod user;

pub use user::{CurrentIdentity, UserProfile};
