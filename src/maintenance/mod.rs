//! Text rewrites for subgraph mapping sources. Both are idempotent.

pub mod lowercase;
pub mod whitelist;
