pub mod authorization;
pub mod mail;
