use std::io;
use std::net::SocketAddr;
use tokio::net::{ToSocketAddrs, UdpSocket};

/// One UDP socket connected to the server side.  Only datagrams from that
/// peer are received, and everything sent goes to it.
#[derive(Debug)]
pub struct DatagramChannel {
    socket: UdpSocket,
}

impl DatagramChannel {
    pub async fn bind_connected(
        local: impl ToSocketAddrs,
        remote: impl ToSocketAddrs,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        tracing::info!(
            "datagram channel {} connected to {}",
            socket.local_addr()?,
            socket.peer_addr()?
        );
        Ok(Self { socket })
    }

    /// Resolves once a datagram may be waiting.  Readiness can be spurious,
    /// so `receive` may still find nothing.
    pub async fn wait_readable(&self) -> io::Result<()> {
        self.socket.readable().await
    }

    /// Take one datagram without waiting.  Returns `None` if there was
    /// nothing to take after all.
    pub fn receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.try_recv(buf) {
            Ok(len) => Ok(Some(len)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn send(&self, datagram: &[u8]) -> io::Result<usize> {
        self.socket.send(datagram).await
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn close(self) {
        tracing::debug!("datagram channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pair() -> (DatagramChannel, UdpSocket) {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let channel = DatagramChannel::bind_connected(
            "127.0.0.1:0",
            server.local_addr().unwrap(),
        )
        .await
        .unwrap();
        server.connect(channel.local_addr().unwrap()).await.unwrap();
        (channel, server)
    }

    #[tokio::test]
    async fn receives_what_the_server_sends() {
        let (channel, server) = pair().await;
        server.send(&[1, 2, 3]).await.unwrap();

        let mut buf = [0; 16];
        let len = loop {
            channel.wait_readable().await.unwrap();
            if let Some(len) = channel.receive(&mut buf).unwrap() {
                break len;
            }
        };
        assert_eq!(&buf[..len], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn sends_to_the_server() {
        let (channel, server) = pair().await;
        assert_eq!(channel.send(&[9; 5]).await.unwrap(), 5);

        let mut buf = [0; 16];
        let len = server.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], &[9; 5]);
    }

    #[tokio::test]
    async fn receive_with_nothing_queued_gives_none() {
        let (channel, _server) = pair().await;
        let mut buf = [0; 16];
        assert_eq!(channel.receive(&mut buf).unwrap(), None);
    }

    #[tokio::test]
    async fn zero_length_datagram_is_received() {
        let (channel, server) = pair().await;
        server.send(&[]).await.unwrap();

        let mut buf = [0; 16];
        let len = loop {
            channel.wait_readable().await.unwrap();
            if let Some(len) = channel.receive(&mut buf).unwrap() {
                break len;
            }
        };
        assert_eq!(len, 0);
    }
}
