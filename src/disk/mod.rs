pub mod block_device;
pub mod file_disk;
pub mod layout;
pub mod super_block;
pub mod types;

pub use block_device::JbodDevice;
pub use file_disk::FileDisk;
pub use layout::{is_valid_block, linear_address, translate, Location};
pub use super_block::SuperBlock;
pub use types::*;
