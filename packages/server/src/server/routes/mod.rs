// HTTP routes
pub mod ballot_measures;
pub mod candidates;
pub mod civic_data;
pub mod engagement;
pub mod health;
pub mod issues;
pub mod offices;

pub use ballot_measures::*;
pub use candidates::*;
pub use civic_data::*;
pub use engagement::*;
pub use health::*;
pub use issues::*;
pub use offices::*;
