pub mod build;
pub mod check;
pub mod hash;
pub mod serve;
