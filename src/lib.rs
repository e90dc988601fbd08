pub mod config;
pub mod maintenance;
pub mod prober;
pub mod rpc;
pub mod subgraph;
