pub mod client;
pub mod opcode;
pub mod packet;

pub use client::JbodClient;
pub use opcode::{Command, Opcode};
pub use packet::{Packet, HEADER_LEN};
