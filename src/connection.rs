use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::{self, Frame};

/// A client connection, reading request frames from and writing reply frames to a TCP stream.
pub struct Connection {
    pub id: Uuid,
    pub client_address: Option<SocketAddr>,
    // The codec keeps the read buffer. A frame is only removed from it once fully parsed.
    framed: Framed<TcpStream, FrameCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection::with_codec(stream, FrameCodec::default())
    }

    /// Like [`Connection::new`], rejecting frames larger than `max_frame_size` bytes.
    pub fn with_max_frame_size(stream: TcpStream, max_frame_size: usize) -> Connection {
        Connection::with_codec(stream, FrameCodec::new(max_frame_size))
    }

    fn with_codec(stream: TcpStream, codec: FrameCodec) -> Connection {
        let client_address = stream.peer_addr().ok();

        Connection {
            id: Uuid::new_v4(),
            client_address,
            framed: Framed::new(stream, codec),
        }
    }

    /// Reads the next frame. Returns `None` once the peer closed the stream on a frame boundary.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, frame::Error> {
        self.framed.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), frame::Error> {
        self.framed.send(frame).await
    }
}
