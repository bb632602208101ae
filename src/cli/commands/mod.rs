pub mod check;
pub mod code;
pub mod serve;
pub mod token;
