pub mod push;
pub mod serve;
