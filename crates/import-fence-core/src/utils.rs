//! Utility modules for rule implementations.

pub mod allowance;
pub mod paths;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, AllowCheck};
#[doc(inline)]
pub use paths::{is_relative_specifier, split_segments, BoundaryEscape, DirectoryStack, Segment};
