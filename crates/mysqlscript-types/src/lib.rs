//! Leaf types shared by the splitter, scanner and front end.

pub mod cancel;
pub mod charset;
pub mod sql_mode;

pub use cancel::Cancellation;
pub use charset::Charset;
pub use sql_mode::SqlMode;
