//! Length-prefixed JSON framing over any blocking byte stream.
//!
//! Each frame is a little-endian `u32` payload length followed by the JSON
//! payload. Requests carry a command array, responses a [`FrameResponse`].

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{FrameResponse, PhysicsEngine};
use crate::command::EngineCommand;
use crate::error::EngineError;

pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

pub fn read_frame<R, T>(reader: &mut R) -> Result<T, EngineError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut len_buf) {
        return Err(if e.kind() == ErrorKind::UnexpectedEof {
            EngineError::Closed
        } else {
            EngineError::Io(e)
        });
    }
    let len = u32::from_le_bytes(len_buf) as usize;
    // The payload is left unread, so the stream cannot be resumed.
    if len > MAX_FRAME_BYTES {
        return Err(EngineError::Desync {
            reason: format!("frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit"),
        });
    }
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    serde_json::from_slice(&buffer).map_err(|e| EngineError::Desync {
        reason: e.to_string(),
    })
}

pub fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), EngineError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(value)?;
    if payload.len() > MAX_FRAME_BYTES {
        return Err(EngineError::FrameTooLarge {
            size: payload.len(),
            limit: MAX_FRAME_BYTES,
        });
    }
    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Engine reached over a framed stream (normally TCP).
pub struct FramedEngine<S> {
    stream: S,
    batches_sent: u64,
}

impl FramedEngine<TcpStream> {
    pub fn connect(addr: &str) -> Result<Self, EngineError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        debug!(addr, "connected to engine");
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> FramedEngine<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            batches_sent: 0,
        }
    }

    pub fn batches_sent(&self) -> u64 {
        self.batches_sent
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> PhysicsEngine for FramedEngine<S> {
    fn communicate(&mut self, commands: &[EngineCommand]) -> Result<FrameResponse, EngineError> {
        write_frame(&mut self.stream, commands)?;
        self.batches_sent += 1;
        read_frame(&mut self.stream)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reads from a canned buffer, captures everything written.
    struct Loopback {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_communicate_writes_prefixed_batch_and_reads_reply() {
        let reply = FrameResponse {
            frame: 7,
            ..Default::default()
        };
        let mut canned = Vec::new();
        write_frame(&mut canned, &reply).unwrap();

        let mut engine = FramedEngine::new(Loopback {
            input: Cursor::new(canned),
            output: Vec::new(),
        });
        let resp = engine.communicate(&[EngineCommand::Terminate]).unwrap();
        assert_eq!(resp.frame, 7);
        assert_eq!(engine.batches_sent(), 1);

        let written = engine.into_inner().output;
        let len = u32::from_le_bytes([written[0], written[1], written[2], written[3]]) as usize;
        assert_eq!(len, written.len() - 4);
        let sent: Vec<EngineCommand> = serde_json::from_slice(&written[4..]).unwrap();
        assert_eq!(sent, vec![EngineCommand::Terminate]);
    }

    #[test]
    fn test_eof_maps_to_closed() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        let err = read_frame::<_, FrameResponse>(&mut empty).unwrap_err();
        assert!(matches!(err, EngineError::Closed));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut bytes = Cursor::new(u32::MAX.to_le_bytes().to_vec());
        let err = read_frame::<_, FrameResponse>(&mut bytes).unwrap_err();
        assert!(matches!(err, EngineError::Desync { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_garbled_reply_is_fatal() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{{{");
        let err = read_frame::<_, FrameResponse>(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, EngineError::Desync { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_oversized_request_is_not_fatal() {
        let err = EngineError::FrameTooLarge {
            size: MAX_FRAME_BYTES + 1,
            limit: MAX_FRAME_BYTES,
        };
        assert!(!err.is_fatal());
    }
}
