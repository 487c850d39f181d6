use mini_jbod::{
    disk::{Block, FileDisk, JbodDevice},
    net::{JbodClient, Opcode},
    Result,
};

/// shell 当前使用的阵列：远程服务器或本地镜像
#[derive(Debug)]
pub enum Backend {
    Remote(JbodClient),
    Local(FileDisk),
}

impl Backend {
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(client) => match client.peer() {
                Some(peer) => format!("remote {}", peer),
                None => "remote (not connected)".to_string(),
            },
            Self::Local(_) => "local image".to_string(),
        }
    }
}

impl JbodDevice for Backend {
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()> {
        match self {
            Self::Remote(client) => client.execute(op, block),
            Self::Local(disk) => disk.execute(op, block),
        }
    }
}
