//! CLI command implementations.

pub(crate) mod outline;
pub(crate) mod serve;

pub(crate) use outline::OutlineArgs;
pub(crate) use serve::ServeArgs;
