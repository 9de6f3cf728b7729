use log::{info, warn};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Why a relay stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The source reached end of stream
    Closed,
    /// The source produced a blank line
    BlankLine,
}

/// Copies lines from `reader` to `writer` until the source is exhausted
///
/// Every line is trimmed and written back with a single `\n`. When
/// `stop_on_blank` is set an empty line ends the relay as well.
pub async fn relay<R, W>(reader: R, writer: &mut W, stop_on_blank: bool) -> io::Result<RelayEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = shared::clean_line(&line);
        if stop_on_blank && line.is_empty() {
            return Ok(RelayEnd::BlankLine);
        }

        writer.write_all(format!("{}\n", line).as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(RelayEnd::Closed)
}

/// Terminal pass-through connected to a game server
pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub async fn connect(server_addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(server_addr).await?;
        info!("Connected to {}", stream.peer_addr()?);
        Ok(Client { stream })
    }

    /// Relays stdin to the server and server lines to stdout until either side ends
    pub async fn run(self) -> io::Result<()> {
        let (server_reader, mut server_writer) = self.stream.into_split();
        let mut stdout = tokio::io::stdout();
        let stdin = BufReader::new(tokio::io::stdin());

        let notice = tokio::select! {
            result = relay(BufReader::new(server_reader), &mut stdout, false) => {
                log_relay_end("server", result);
                "server disconnected"
            }
            result = relay(stdin, &mut server_writer, true) => {
                log_relay_end("input", result);
                "client disconnected"
            }
        };

        stdout.write_all(format!("{}\n", notice).as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

fn log_relay_end(source: &str, result: io::Result<RelayEnd>) {
    match result {
        Ok(end) => info!("{} relay ended: {:?}", source, end),
        Err(e) => warn!("{} relay failed: {}", source, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_relay_copies_lines_until_closed() {
        let reader = BufReader::new(Builder::new().read(b"g1: c__ (c) (lives: 8)\n").read(b"active:\r\n").build());
        let mut output = Vec::new();

        let end = relay(reader, &mut output, false).await.unwrap();

        assert_eq!(end, RelayEnd::Closed);
        assert_eq!(output, b"g1: c__ (c) (lives: 8)\nactive:\n");
    }

    #[tokio::test]
    async fn test_relay_stops_on_blank_line() {
        let reader = BufReader::new(Builder::new().read(b"create g1 cat\n  \njoin g1\n").build());
        let mut output = Vec::new();

        let end = relay(reader, &mut output, true).await.unwrap();

        assert_eq!(end, RelayEnd::BlankLine);
        assert_eq!(output, b"create g1 cat\n");
    }

    #[tokio::test]
    async fn test_relay_keeps_blank_lines_when_allowed() {
        let reader = BufReader::new(Builder::new().read(b"history:\n\n").build());
        let mut output = Vec::new();

        relay(reader, &mut output, false).await.unwrap();

        assert_eq!(output, b"history:\n\n");
    }

    #[tokio::test]
    async fn test_relay_propagates_read_errors() {
        let reader = BufReader::new(
            Builder::new()
                .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
                .build(),
        );
        let mut output = Vec::new();

        assert!(relay(reader, &mut output, true).await.is_err());
        assert!(output.is_empty());
    }
}
