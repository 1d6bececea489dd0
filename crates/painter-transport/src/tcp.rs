//! TCP 适配器
//!
//! 一个 `TcpAdapter` 独占一条 TCP 连接。控制器的指令通道和状态通道
//! 是两条独立连接，各用一个适配器。

use crate::{LinkAdapter, TransportError};
use painter_protocol::FrameDecoder;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, trace, warn};

const READ_CHUNK: usize = 2048;

/// 基于 `std::net::TcpStream` 的帧适配器
#[derive(Debug)]
pub struct TcpAdapter {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: FrameDecoder,
    read_timeout: Option<Duration>,
}

impl TcpAdapter {
    /// 建立连接
    ///
    /// 依次尝试 `addr` 解析出的每个地址，直到一个成功。
    ///
    /// # 参数
    ///
    /// - `addr`: 目标地址，如 `("192.168.1.100", 10001)`
    /// - `connect_timeout`: 单个地址的连接超时
    ///
    /// # 错误
    ///
    /// 所有地址都失败时返回 `TransportError::Connect`（携带最后一次失败原因）。
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect {
                addr: String::from("<unresolved>"),
                source: e,
            })?
            .collect();

        let mut last_error = std::io::Error::new(ErrorKind::NotFound, "address resolved to nothing");
        let mut last_addr = String::from("<none>");
        for candidate in candidates {
            match TcpStream::connect_timeout(&candidate, connect_timeout) {
                Ok(stream) => return Self::from_stream(stream),
                Err(e) => {
                    debug!("Connect to {} failed: {}", candidate, e);
                    last_addr = candidate.to_string();
                    last_error = e;
                },
            }
        }

        Err(TransportError::Connect {
            addr: last_addr,
            source: last_error,
        })
    }

    /// 包装已建立的连接
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        let peer = stream.peer_addr()?;
        // 指令帧很小，关闭 Nagle 以免被合并延迟
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY on {}: {}", peer, e);
        }
        debug!("TCP link established with {}", peer);
        Ok(TcpAdapter {
            stream,
            peer,
            decoder: FrameDecoder::default(),
            read_timeout: None,
        })
    }

    /// 对端地址
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// 当前读超时
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// 设置读超时（`None` 表示无限阻塞）
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        // 零时长会被 std 拒绝
        let timeout = timeout.map(|t| t.max(Duration::from_millis(1)));
        self.stream.set_read_timeout(timeout)?;
        self.read_timeout = timeout;
        Ok(())
    }
}

impl LinkAdapter for TcpAdapter {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.stream.write_all(frame.as_bytes()).map_err(map_io)?;
        self.stream.flush().map_err(map_io)?;
        trace!("Sent frame to {}: {}", self.peer, frame);
        Ok(())
    }

    /// 接收一帧（阻塞直到取出完整对象、超时或连接关闭）
    ///
    /// 超时不会丢弃已经收到的半帧，下次调用会接着拼接。
    fn receive(&mut self) -> Result<String, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.decoder.next_frame()? {
                trace!("Received frame from {}: {}", self.peer, frame);
                return Ok(frame);
            }

            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => self.decoder.push(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io(e)),
            }
        }
    }

    fn set_receive_timeout(&mut self, timeout: Option<Duration>) {
        if let Err(e) = self.set_read_timeout(timeout) {
            warn!("Failed to set receive timeout: {}", e);
        }
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<String, TransportError> {
        let old_timeout = self.read_timeout;
        self.set_read_timeout(Some(timeout))?;
        let result = self.receive();
        if let Err(e) = self.set_read_timeout(old_timeout) {
            warn!("Failed to restore read timeout on {}: {}", self.peer, e);
        }
        result
    }

    /// 丢弃已到达的完整帧和未闭合的半帧
    fn discard_pending(&mut self) -> Result<usize, TransportError> {
        let mut discarded = 0;
        while self.try_receive()?.is_some() {
            discarded += 1;
        }
        if self.decoder.buffered_len() > 0 {
            debug!(
                "Dropping {} buffered bytes from {}",
                self.decoder.buffered_len(),
                self.peer
            );
            self.decoder.clear();
        }
        Ok(discarded)
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}

fn map_io(e: std::io::Error) -> TransportError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
        ErrorKind::UnexpectedEof => TransportError::Closed,
        _ => TransportError::Io(e),
    }
}
