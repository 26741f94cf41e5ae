pub mod sign;
pub mod verify;
pub mod version;
