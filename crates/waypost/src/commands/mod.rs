//! CLI command implementations.

mod generate;
mod serve;

pub(crate) use generate::GenerateArgs;
pub(crate) use serve::ServeArgs;
