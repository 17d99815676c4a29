//! Var metadata: the raw model produced by loading, and its normalized form

mod normalize;
mod value;

pub use normalize::{normalize, SymbolRecord, DROPPED_KEYS};
pub use value::{MetaValue, SymbolMeta};
