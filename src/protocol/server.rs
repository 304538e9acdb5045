//! Wire-Protocol Server
//!
//! Accepts TCP connections and serves PING and GET over the framing in
//! [`crate::protocol::frame`], one task per connection, frames handled
//! strictly in order within a connection.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::error::{ProxyError, Result};
use crate::protocol::frame;
use crate::proxy::Proxy;

// == TCP Server ==
/// TCP front end over the read-through proxy.
pub struct TcpServer {
    proxy: Arc<Proxy>,
}

impl TcpServer {
    /// Creates a server dispatching to the given proxy.
    pub fn new(proxy: Arc<Proxy>) -> Self {
        Self { proxy }
    }

    /// Runs the accept loop on an already-bound listener.
    ///
    /// Every accepted connection gets its own task; there is no cap on
    /// concurrent connections. Dropping the future (or aborting its task)
    /// stops accepting; connections already open drain on their own.
    pub async fn run(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("new wire connection from {}", addr);
                    let proxy = Arc::clone(&self.proxy);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, proxy).await {
                            warn!("connection {} error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Serves one connection until EOF, a framing error, or a transport failure.
async fn handle_connection(stream: TcpStream, proxy: Arc<Proxy>) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let commands = match frame::read_frame(&mut reader).await {
            Ok(Some(commands)) => commands,
            Ok(None) => {
                info!("client disconnected");
                return Ok(());
            }
            Err(ProxyError::Protocol(msg)) => {
                // Framing errors are fatal: answer once, then hang up.
                write_half.write_all(&frame::error_reply(&msg)).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        dispatch(&commands, &proxy, &mut write_half).await?;
    }
}

/// Answers a single well-formed frame. The connection stays open afterwards
/// whatever the outcome.
async fn dispatch<W>(commands: &[String], proxy: &Proxy, writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let Some(command) = commands.first() else {
        writer
            .write_all(&frame::error_reply("no command in frame"))
            .await?;
        return Ok(());
    };

    if command.eq_ignore_ascii_case("ping") {
        writer.write_all(&frame::simple_string("PONG")).await?;
        return Ok(());
    }
    if command.eq_ignore_ascii_case("get") {
        return exec_get(commands, proxy, writer).await;
    }

    writer
        .write_all(&frame::error_reply(&format!(
            "command {} not supported",
            command.to_ascii_lowercase()
        )))
        .await?;
    Ok(())
}

async fn exec_get<W>(commands: &[String], proxy: &Proxy, writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if commands.len() != 2 {
        writer
            .write_all(&frame::error_reply("get command takes exactly one key"))
            .await?;
        return Ok(());
    }

    let reply = match proxy.get(&commands[1]).await {
        Ok(value) => frame::bulk_string(Some(&value)),
        Err(ProxyError::NotFound(_)) => frame::bulk_string(None),
        Err(e) => frame::error_reply(&e.to_string()),
    };
    writer.write_all(&reply).await?;
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::cache::LruTtlCache;
    use async_trait::async_trait;
    use std::time::Duration;

    struct EmptyBackend;

    #[async_trait]
    impl Backend for EmptyBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn test_proxy() -> Arc<Proxy> {
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(3600)));
        Arc::new(Proxy::new(cache, Arc::new(EmptyBackend)))
    }

    async fn dispatch_to_bytes(commands: &[&str]) -> Vec<u8> {
        let commands: Vec<String> = commands.iter().map(|s| s.to_string()).collect();
        let proxy = test_proxy();
        let mut out = Vec::new();
        dispatch(&commands, &proxy, &mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_ping_replies_pong() {
        assert_eq!(dispatch_to_bytes(&["PING"]).await, b"+PONG\r\n");
    }

    #[tokio::test]
    async fn test_ping_is_case_insensitive() {
        assert_eq!(dispatch_to_bytes(&["ping"]).await, b"+PONG\r\n");
        assert_eq!(dispatch_to_bytes(&["PiNg"]).await, b"+PONG\r\n");
    }

    #[tokio::test]
    async fn test_get_absent_key_is_null_bulk() {
        assert_eq!(dispatch_to_bytes(&["GET", "nope"]).await, b"$-1\r\n");
    }

    #[tokio::test]
    async fn test_get_cached_key_is_bulk() {
        let proxy = test_proxy();
        proxy.cache().add("k1".to_string(), "val".to_string());

        let mut out = Vec::new();
        let commands = vec!["GET".to_string(), "k1".to_string()];
        dispatch(&commands, &proxy, &mut out).await.unwrap();

        assert_eq!(out, b"$3\r\nval\r\n");
    }

    #[tokio::test]
    async fn test_get_wrong_arity_is_error() {
        let out = dispatch_to_bytes(&["GET"]).await;
        assert!(out.starts_with(b"-Error "));

        let out = dispatch_to_bytes(&["GET", "a", "b"]).await;
        assert!(out.starts_with(b"-Error "));
    }

    #[tokio::test]
    async fn test_unknown_command_is_error() {
        let out = dispatch_to_bytes(&["FOO"]).await;
        assert_eq!(out, b"-Error command foo not supported\r\n");
    }

    #[tokio::test]
    async fn test_empty_frame_is_error() {
        let out = dispatch_to_bytes(&[]).await;
        assert!(out.starts_with(b"-Error "));
    }
}
