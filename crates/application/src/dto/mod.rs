//! Data Transfer Objects (DTOs) for API layer
//!
//! Views returned by the services. Domain documents carry secrets
//! (password hashes, other members' emails) and raw id arrays; these
//! types expose what a caller is allowed to see, with user summaries
//! joined in where the API shows names.

mod group;
mod question;
mod user;

pub use group::*;
pub use question::*;
pub use user::*;
