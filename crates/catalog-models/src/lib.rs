pub mod decode;
pub mod movie;
pub mod profile;

pub use decode::DecodeError;
pub use movie::{Episode, Movie};
pub use profile::{AuthUser, UserProfile};
