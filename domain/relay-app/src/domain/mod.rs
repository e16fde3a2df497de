pub mod message;
pub mod outcome;
pub mod submission;
