pub mod disruption;
pub mod forecast;
pub mod overview;
pub mod user;
pub mod waste;

pub use disruption::*;
pub use forecast::*;
pub use overview::*;
pub use user::*;
pub use waste::*;
