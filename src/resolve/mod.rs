//! Turning the textual relations of extraction into graph edges.

pub mod imports;
pub mod symbols;

pub use imports::{KnownFiles, resolve_import};
pub use symbols::{ResolvedImports, SymbolResolver};
