// Business domains
pub mod ballot_measures;
pub mod candidates;
pub mod engagement;
pub mod issues;
pub mod offices;
pub mod relationships;
