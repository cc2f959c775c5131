//! Relay wire format.
//!
//! Each frame is a big-endian `u32` length followed by that many bytes of
//! CBOR. Both directions carry the same two frames:
//!
//! - `Subscribe`: send me every item of this namespace, then new ones
//! - `Put`: one item, with the id it was minted under

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest CBOR body accepted from the wire.
pub const MAX_FRAME_SIZE: u32 = 1 << 20;

/// Frame errors. Any of them ends the connection.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Socket error, including a clean close mid-frame.
    #[error("relay I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Length prefix above [`MAX_FRAME_SIZE`].
    #[error("frame of {0} bytes exceeds the limit")]
    TooLarge(u32),

    /// Body is not a frame.
    #[error("malformed frame: {0}")]
    Decode(String),

    /// Frame could not be serialized.
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

/// One message between a replica and a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayFrame {
    /// Start streaming a namespace.
    Subscribe {
        /// Namespace path string.
        path: String,
    },
    /// Store or forward one item.
    Put {
        /// Namespace path string.
        path: String,
        /// Id the item was minted under.
        id: String,
        /// Stored value, `None` for a tombstone.
        value: Option<Vec<u8>>,
    },
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, frame: &RelayFrame) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let mut body = Vec::new();
    ciborium::into_writer(frame, &mut body).map_err(|e| FrameError::Encode(e.to_string()))?;
    let len = u32::try_from(body.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or(FrameError::TooLarge(u32::MAX))?;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame.
///
/// Not cancellation safe: a partially read frame is lost if the future is
/// dropped. Run it in a task of its own rather than inside `select!`.
pub async fn read_frame<R>(reader: &mut R) -> Result<RelayFrame, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut len = [0u8; 4];
    reader.read_exact(&mut len).await?;
    let len = u32::from_be_bytes(len);
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(len));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    ciborium::from_reader(body.as_slice()).map_err(|e| FrameError::Decode(e.to_string()))
}
