pub mod object;
pub mod pattern;
