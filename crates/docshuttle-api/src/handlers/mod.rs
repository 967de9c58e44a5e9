pub mod convert;
pub mod events;
pub mod records;
