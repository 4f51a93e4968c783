pub mod completion;
pub mod email_signup;
pub mod readiness;

pub use completion::*;
pub use email_signup::*;
pub use readiness::*;
