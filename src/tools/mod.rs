//! External typing tools
//!
//! The MLST typer is an external program; this module builds its command
//! line, runs it, and reports where it left its result.
pub mod mlst;
pub mod traits;

pub use mlst::MlstTyper;
pub use traits::{Typer, TypingRequest};
