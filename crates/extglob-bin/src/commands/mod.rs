pub mod compile;
pub mod matches;
pub mod resolve;
