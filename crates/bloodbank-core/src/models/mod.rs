//! Domain models for the blood bank.

mod blood_group;
mod camp;
mod donation;
mod hospital;
mod inventory;
mod request;
pub mod timestamp;
mod user;

pub use blood_group::*;
pub use camp::*;
pub use donation::*;
pub use hospital::*;
pub use inventory::*;
pub use request::*;
pub use timestamp::parse_timestamp;
pub use user::*;
