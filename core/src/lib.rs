pub mod categorize;
pub mod error;
pub mod formula;
pub mod recovery;

/// Token the generator role appends to signal that its turn ends the exchange.
pub const TERMINATION_SENTINEL: &str = "TERMINATE";
