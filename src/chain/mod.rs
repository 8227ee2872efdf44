//! Blockchain action execution.

pub mod disabled;
pub mod evm;
mod hexutil;
pub mod registry;
pub mod traits;

pub use disabled::DisabledExecutor;
pub use evm::{EvmAction, EvmExecutor};
pub use registry::ChainRegistry;
pub use traits::{
    ChainExecutor, ChainLog, ChainOutcome, ChainSnapshot, DeploymentReceipt, LogFilter,
};
