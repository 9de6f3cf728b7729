//! Server network layer accepting TCP connections

use crate::connection::handle_connection;
use crate::session::Session;
use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// TCP server handing every accepted connection to the shared session
pub struct Server {
    listener: TcpListener,
    session: Arc<Session>,
}

impl Server {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            session: Arc::new(Session::new()),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// Accepts connections forever, one task per connection
    pub async fn run(&self) -> io::Result<()> {
        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Accepted connection from {}", addr);
                    let session = Arc::clone(&self.session);

                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        let client_id = handle_connection(session, reader, writer).await;
                        info!("Connection {} from {} closed", client_id, addr);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}
