use crate::{disk::types::Block, error::Result, net::Opcode};

/// 能够执行 JBOD 操作码的物理阵列（本地镜像或远程服务器）
///
/// `block` 对写操作是输入，对读操作是输出；控制类操作传 `None`。
pub trait JbodDevice {
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()>;
}

impl<D: JbodDevice + ?Sized> JbodDevice for Box<D> {
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()> {
        (**self).execute(op, block)
    }
}
