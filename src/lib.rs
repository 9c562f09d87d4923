// Module naming follows project convention (MSGQ = XSI message queues)
#[allow(non_snake_case)]
pub mod MSGQ;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Debug;

pub mod error;
pub mod ffi;

pub use error::{Errno, Result};
pub use MSGQ::{
    ControlCmd, GetFlags, Key, Limits, MessageRegistry, MsgFlags, QueueId, Received,
    RegistryBuilder, RegistryInfo,
};
