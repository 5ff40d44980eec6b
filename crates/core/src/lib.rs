//! Core types and computations for bookstore calendar and order reports.

pub mod calendar;
pub mod error;
pub mod orders;
pub mod report;
pub mod source;
pub mod window;

pub use calendar::*;
pub use error::{CoverageErrorCode, DataErrorCode, Error, Result};
pub use orders::*;
pub use report::*;
pub use source::*;
