mod builder;
mod control;
mod debug;
mod receive;
mod registry;
mod send;

pub mod flags;
pub mod key;
pub mod message;
pub mod perm;
pub mod queue;

pub use builder::RegistryBuilder;
pub use control::ControlCmd;
pub use flags::{GetFlags, MsgFlags};
pub use key::{Key, QueueId};
pub use message::Message;
pub use perm::Permission;
pub use queue::MessageQueue;
pub use receive::Received;
pub use registry::{Limits, MessageRegistry, RegistryInfo};

pub mod Structs {
    pub mod Msqid_Structs;
    pub use Msqid_Structs::{IpcPerm, MsgInfo, MsqidDs}; // re-export for stable path
}
