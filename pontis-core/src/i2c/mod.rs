//! I2C master interface
//!
//! One [`I2cMaster`] per hardware channel. Commands are decoded from the
//! channel's opcode block, executed as single blocking transactions or
//! registered as a streamed write that the scheduler drains tick by tick.

pub mod command;
pub mod error;
pub mod master;
pub mod state;
pub mod stream;
pub mod transaction;

pub use command::{decode_op, I2cCommand, INLINE_WRITE_CAPACITY, WRITE_READ_CAPACITY};
pub use error::{Phase, TransactionError, TransferError};
pub use master::I2cMaster;
pub use state::InterfaceStateTracker;
pub use stream::{StreamPoll, StreamState, StreamWriteController, STREAM_CHUNK_SIZE};
pub use transaction::TransactionExecutor;
