pub mod config;
pub mod convert;
pub mod parse;
pub mod run;
