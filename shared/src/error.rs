use thiserror::Error;

/// Reasons an incoming room snapshot is rejected during rehydration.
///
/// Any of these means the whole snapshot is discarded and the previous live
/// model stays current; a partially resolved graph is never observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("adjacency of node {node} references index {index}, node array has {len} entries")]
    AdjOutOfRange { node: u32, index: u32, len: usize },

    #[error("assign of node {node} references index {index}, node array has {len} entries")]
    AssignOutOfRange { node: u32, index: i32, len: usize },

    #[error("edge {edge} references index {index}, node array has {len} entries")]
    EdgeOutOfRange { edge: usize, index: u32, len: usize },

    #[error("army {army} references index {index}, node array has {len} entries")]
    ArmyOutOfRange { army: u32, index: u32, len: usize },

    #[error("army {army} has identical endpoints (node index {index})")]
    ArmyDegenerate { army: u32, index: u32 },
}
