pub mod ballot_measure;

pub use ballot_measure::*;
