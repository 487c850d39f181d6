use std::net::{Ipv4Addr, Shutdown, SocketAddrV4, TcpStream};

use log::{debug, info, warn};

use crate::{
    disk::{Block, JbodDevice},
    error::{JbodError, Result},
    net::{
        packet::{receive_response, send_request},
        Command, Opcode,
    },
};

/// 远程 JBOD 服务器的客户端，同一时间只持有一个连接
#[derive(Debug, Default)]
pub struct JbodClient {
    stream: Option<TcpStream>,
}

impl JbodClient {
    pub fn new() -> Self {
        Self { stream: None }
    }

    /// 连接到 `ip:port`，已有连接会被替换
    pub fn connect(&mut self, ip: &str, port: u16) -> Result<()> {
        let addr: Ipv4Addr = ip
            .parse()
            .map_err(|_| JbodError::InvalidAddress(ip.to_string()))?;

        let stream =
            TcpStream::connect(SocketAddrV4::new(addr, port)).map_err(JbodError::Connect)?;
        // 每个请求都很小，关闭 Nagle 避免往返被攒批
        stream.set_nodelay(true).map_err(JbodError::Connect)?;

        info!("connected to JBOD server {}:{}", addr, port);
        self.stream = Some(stream);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("socket shutdown failed: {}", e);
            }
            info!("disconnected from JBOD server");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer(&self) -> Option<String> {
        self.stream
            .as_ref()
            .and_then(|s| s.peer_addr().ok())
            .map(|a| a.to_string())
    }

    /// 帧边界已经错乱，这条连接不能再复用
    fn abandon(&mut self, err: &JbodError) {
        warn!("dropping JBOD connection: {}", err);
        self.disconnect();
    }
}

impl JbodDevice for JbodClient {
    /// 发送请求并等待响应；失败不重试
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(JbodError::NotConnected)?;

        let exchanged = send_request(stream, op, block.as_deref())
            .and_then(|_| receive_response(stream));
        let response = match exchanged {
            Ok(response) => response,
            Err(e) => {
                self.abandon(&e);
                return Err(e);
            }
        };

        let sent = op.encode();
        if response.opcode != sent {
            let err = JbodError::Malformed(format!(
                "opcode echo {:#010x} does not match request {:#010x}",
                response.opcode, sent
            ));
            self.abandon(&err);
            return Err(err);
        }
        if response.status != 0 {
            warn!("server rejected {:?} with status {}", op.command, response.status);
            return Err(JbodError::Rejected {
                opcode: sent,
                status: response.status,
            });
        }

        if op.command == Command::ReadBlock {
            let data = response
                .block
                .ok_or_else(|| JbodError::Malformed("read response without data".to_string()))?;
            if let Some(out) = block {
                out.copy_from_slice(&data);
            }
        }

        debug!("{:?} ok", op);
        Ok(())
    }
}

impl Drop for JbodClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_without_connection_fails() {
        let mut client = JbodClient::new();
        assert!(matches!(
            client.execute(Opcode::mount(), None),
            Err(JbodError::NotConnected)
        ));
    }

    #[test]
    fn bad_address_is_reported_as_such() {
        let mut client = JbodClient::new();
        assert!(matches!(
            client.connect("not-an-ip", 3333),
            Err(JbodError::InvalidAddress(_))
        ));
        assert!(!client.is_connected());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut client = JbodClient::new();
        client.disconnect();
        client.disconnect();
        assert!(!client.is_connected());
    }
}
