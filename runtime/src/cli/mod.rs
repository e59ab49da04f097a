//! Sample driver behind the `tc-unicode` binary.

pub mod lookup_cmd;
pub mod output;
