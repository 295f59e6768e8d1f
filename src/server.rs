use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::connection::Connection;
use crate::dispatch::Dispatcher;
use crate::frame::{self, Frame};
use crate::store::Store;
use crate::Result;

/// Binds the configured address and serves clients until the listener fails.
pub async fn run(config: Config) -> Result<()> {
    let listener = TcpListener::bind(config.address()).await?;

    serve(listener, config.max_frame_size).await
}

/// Serves clients accepted on `listener`, all sharing a single store.
pub async fn serve(listener: TcpListener, max_frame_size: usize) -> Result<()> {
    let store = Store::new();
    let dispatcher = Arc::new(Dispatcher::new());

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        let dispatcher = dispatcher.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, store, dispatcher, max_frame_size).await {
                error!(error = %e, "connection failed");
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, dispatcher, max_frame_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    store: Store,
    dispatcher: Arc<Dispatcher>,
    max_frame_size: usize,
) -> Result<()> {
    let mut conn = Connection::with_max_frame_size(stream, max_frame_size);

    let span = tracing::Span::current();
    span.record("connection_id", conn.id.to_string());
    if let Some(client_address) = conn.client_address {
        span.record("client_address", client_address.to_string());
    }

    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(frame::Error::Io(e)) => return Err(e.into()),
            Err(e) => {
                // The stream position is unknown past a framing error, so report it and hang up.
                warn!(error = %e, "protocol error, closing connection");
                let detail = e.to_string().replace(['\r', '\n'], " ");
                let reply = Frame::Error(format!("ERR Protocol error: {}", detail));
                conn.write_frame(reply).await?;
                return Ok(());
            }
        };

        debug!("Received frame from client: {:?}", frame);
        let res = dispatcher.process(frame, &store);
        debug!("Sending response to client: {:?}", res);

        conn.write_frame(res).await?;
    }

    info!("Connection closed");
    Ok(())
}
