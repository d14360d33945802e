pub mod display;
pub mod output;
