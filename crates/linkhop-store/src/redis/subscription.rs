use async_trait::async_trait;
use deadpool_redis::redis::{self, aio::PubSub};
use futures_util::StreamExt;
use linkhop_core::store::Result;
use linkhop_core::{StoreError, Subscription};
use std::time::Duration;
use tracing::info;

/// A dedicated pub/sub connection subscribed to the delete channel.
pub struct RedisSubscription {
    pubsub: PubSub,
    op_timeout: Duration,
}

impl RedisSubscription {
    pub(crate) async fn open(
        client: &redis::Client,
        channel: &str,
        connect_timeout: Duration,
        op_timeout: Duration,
    ) -> Result<Self> {
        let mut pubsub = match tokio::time::timeout(connect_timeout, client.get_async_pubsub()).await
        {
            Ok(Ok(pubsub)) => pubsub,
            Ok(Err(e)) => {
                return Err(StoreError::Connection(format!(
                    "failed to open pub/sub connection: {e}"
                )))
            }
            Err(_) => {
                return Err(StoreError::Connection(format!(
                    "pub/sub connect timed out after {connect_timeout:?}"
                )))
            }
        };

        pubsub.subscribe(channel).await.map_err(|e| {
            StoreError::Connection(format!("failed to subscribe to '{channel}': {e}"))
        })?;
        info!(channel, "subscribed to invalidation channel");

        Ok(Self { pubsub, op_timeout })
    }
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn next_message(&mut self) -> Result<String> {
        let message = self.pubsub.on_message().next().await.ok_or_else(|| {
            StoreError::Connection("pub/sub connection closed".to_string())
        })?;

        message
            .get_payload::<String>()
            .map_err(|e| StoreError::Connection(format!("unreadable pub/sub payload: {e}")))
    }

    /// A subscribed RESP2 connection answers `PING` with `["pong", ""]`
    /// rather than `PONG`, so the reply is only checked for arrival.
    async fn ping(&mut self) -> Result<()> {
        match tokio::time::timeout(self.op_timeout, self.pubsub.ping::<()>()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StoreError::Connection(format!("pub/sub ping failed: {e}"))),
            Err(_) => Err(StoreError::Connection(format!(
                "pub/sub ping timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    /// Reads one command, sent as an array of bulk strings.
    async fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut buf = vec![0; len + 2];
            reader.read_exact(&mut buf).await.ok()?;
            buf.truncate(len);
            args.push(String::from_utf8(buf).ok()?);
        }
        Some(args)
    }

    /// Answers like a RESP2 Redis server whose connection is in
    /// subscribed mode.
    async fn serve_subscribed_resp2(listener: TcpListener) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let mut reader = BufReader::new(stream);

        while let Some(args) = read_command(&mut reader).await {
            let reply = match args[0].to_ascii_uppercase().as_str() {
                "SUBSCRIBE" => format!(
                    "*3\r\n$9\r\nsubscribe\r\n${}\r\n{}\r\n:1\r\n",
                    args[1].len(),
                    args[1]
                ),
                "PING" => "*2\r\n$4\r\npong\r\n$0\r\n\r\n".to_string(),
                _ => "+OK\r\n".to_string(),
            };
            if reader.get_mut().write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    #[tokio::test]
    async fn ping_accepts_subscribed_mode_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_subscribed_resp2(listener));

        let client = redis::Client::open(format!("redis://{addr}")).unwrap();
        let mut subscription = RedisSubscription::open(
            &client,
            "short_url:del",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        subscription.ping().await.unwrap();
        subscription.ping().await.unwrap();

        server.abort();
    }
}
