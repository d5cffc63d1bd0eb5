pub mod account;
pub mod item;

pub use account::{Account, AccountSettings, Currency, Lang};
pub use item::{Direction, TrackedItem};
