pub mod bootstrap;
pub mod serve;
pub mod user;
