pub mod result;
pub mod runner;
pub mod sink;
pub mod summary;
pub mod testcase;

pub use result::*;
pub use runner::*;
pub use sink::*;
pub use summary::*;
pub use testcase::*;
