//! Per-connection lifecycle: register, relay lines, clean up on disconnect

use crate::session::Session;
use crate::store::ConnectionId;
use futures::StreamExt;
use log::warn;
use shared::ERROR_PREFIX;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// Longest request line accepted before the connection is dropped
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Drives one connection until its peer goes away
///
/// Lines read from `reader` are forwarded to the session in order. Lines the
/// session sends to this connection are written to `writer` by a separate
/// task, so delivery never waits on the read loop. End of stream or a read
/// error both end the loop and remove the connection from the session. A line
/// longer than [`MAX_LINE_LENGTH`] or not valid UTF-8 gets an error reply
/// before the connection is closed.
pub async fn handle_connection<R, W>(session: Arc<Session>, reader: R, writer: W) -> ConnectionId
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let notify = tx.clone();
    let connection_id = session.on_connect(tx).await;
    let writer_task = tokio::spawn(write_lines(connection_id, rx, writer));

    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    while let Some(frame) = lines.next().await {
        match frame {
            Ok(line) => {
                session.on_line(connection_id, shared::clean_line(&line)).await;
            }
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(
                    "Client {} sent a line longer than {} bytes, disconnecting",
                    connection_id, MAX_LINE_LENGTH
                );
                let _ = notify.send(format!("{}line too long", ERROR_PREFIX));
                break;
            }
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(
                    "Client {} sent a line that is not valid UTF-8, disconnecting: {}",
                    connection_id, e
                );
                let _ = notify.send(format!("{}line is not valid utf-8", ERROR_PREFIX));
                break;
            }
            Err(LinesCodecError::Io(e)) => {
                warn!("Error reading from client {}: {}", connection_id, e);
                break;
            }
        }
    }

    // Dropping both senders closes the channel and ends the writer
    drop(notify);
    session.on_disconnect(connection_id).await;
    if let Err(e) = writer_task.await {
        warn!("Writer task for client {} panicked: {}", connection_id, e);
    }

    connection_id
}

async fn write_lines<W>(connection_id: ConnectionId, mut rx: mpsc::UnboundedReceiver<String>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        let framed = format!("{}\n", line);
        if let Err(e) = writer.write_all(framed.as_bytes()).await {
            warn!("Failed to write to client {}: {}", connection_id, e);
            return;
        }
    }

    if let Err(e) = writer.shutdown().await {
        warn!("Failed to shut down client {}: {}", connection_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio_test::io::Builder;

    async fn run_session(session: Arc<Session>, reader: tokio_test::io::Mock) -> (ConnectionId, String) {
        let (writer, mut peer) = tokio::io::duplex(4096);
        let connection_id = handle_connection(session, reader, writer).await;

        let mut output = String::new();
        peer.read_to_string(&mut output).await.unwrap();
        (connection_id, output)
    }

    #[tokio::test]
    async fn test_lines_are_forwarded_and_replies_written() {
        let session = Arc::new(Session::new());
        let reader = Builder::new()
            .read(b"create g1 cat\n")
            .read(b"join g1\nguess g1 c\r\n")
            .read(b"bogus\n")
            .build();

        let (connection_id, output) = run_session(Arc::clone(&session), reader).await;

        assert_eq!(connection_id, 0);
        assert_eq!(
            output,
            "g1: c__ (c) (lives: 8)\nerror > unknown command 'bogus'\n"
        );
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let session = Arc::new(Session::new());
        let reader = Builder::new().read(b"crea").read(b"te g1 c").read(b"at\n").build();

        run_session(Arc::clone(&session), reader).await;

        assert!(session.inspect(|store| store.game("g1").is_some()).await);
    }

    #[tokio::test]
    async fn test_disconnect_cleans_up() {
        let session = Arc::new(Session::new());
        let reader = Builder::new().read(b"create g1 cat\njoin g1\n").build();

        run_session(Arc::clone(&session), reader).await;

        assert_eq!(session.client_count().await, 0);
        let participants = session
            .inspect(|store| store.game("g1").map(|g| g.participants.len()))
            .await;
        assert_eq!(participants, Some(0));
    }

    #[tokio::test]
    async fn test_read_error_is_treated_as_disconnect() {
        let session = Arc::new(Session::new());
        let reader = Builder::new()
            .read(b"list\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let (_, output) = run_session(Arc::clone(&session), reader).await;

        assert_eq!(output, "active:\nhistory:\n");
        assert_eq!(session.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_utf8_gets_error_reply_then_disconnect() {
        let session = Arc::new(Session::new());
        let reader = Builder::new().read(b"list\n\xff\xfe\n").build();

        let (_, output) = run_session(Arc::clone(&session), reader).await;

        assert_eq!(output, "active:\nhistory:\nerror > line is not valid utf-8\n");
        assert_eq!(session.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_overlong_line_gets_error_reply_then_disconnect() {
        let session = Arc::new(Session::new());
        let flood = vec![b'a'; MAX_LINE_LENGTH + 1];
        let reader = Builder::new().read(&flood).build();

        let (_, output) = run_session(Arc::clone(&session), reader).await;

        assert_eq!(output, "error > line too long\n");
        assert_eq!(session.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_line_at_limit_is_accepted() {
        let session = Arc::new(Session::new());
        let mut line = b"create g1 ".to_vec();
        line.resize(MAX_LINE_LENGTH, b'a');
        line.push(b'\n');
        let reader = Builder::new().read(&line).build();

        let (_, output) = run_session(Arc::clone(&session), reader).await;

        assert!(output.is_empty());
        assert!(session.inspect(|store| store.game("g1").is_some()).await);
    }
}
