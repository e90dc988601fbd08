pub mod client;

pub use client::{SubgraphClient, SubgraphError};

/// Latest indexed block as reported by the subgraph's `_meta` field.
pub const META_QUERY: &str = r#"
{
  _meta {
    block {
      number
      hash
      timestamp
    }
  }
}
"#;
