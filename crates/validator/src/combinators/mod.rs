//! Composers and middleware
//!
//! - [`every`] / [`Every`]: sequential composition, short-circuiting
//! - [`props`] / [`Props`]: structural composition, one validator per field
//! - [`format_result`] / [`Formatted`]: result post-processing
//!
//! Bare sequences and field maps dispatch to the same algorithms; the
//! explicit forms exist to declare props on the composer itself.

pub mod every;
pub mod format;
pub mod props;

pub use every::{Every, every};
pub use format::{Formatted, format_result, validation_errors};
pub use props::{Props, props};
