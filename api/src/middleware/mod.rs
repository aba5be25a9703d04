pub mod cors;
pub mod panic;
pub mod rate_limit;
