pub mod config;
pub mod providers;
pub mod score;
pub mod serve;
pub mod suggest;
