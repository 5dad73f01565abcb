//! Buffered frame I/O over the borrowed transport.
//!
//! The codec owns a read buffer and drives the staged parsers in
//! [`crate::protocol`]: try to decode from what is buffered, refill from
//! the transport on `IncompleteFrame`, repeat. Partial reads therefore
//! never disturb the state machine; undecoded bytes simply stay buffered.
//! All read methods are cancel-safe for the same reason.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::frame::{self, Decoded};
use crate::protocol::{OpCode, legacy};

const READ_CHUNK: usize = 4096;

/// Framed reader/writer over an async transport.
pub struct WireCodec<T> {
    io: T,
    read_buf: BytesMut,
    write_buf: Vec<u8>,
}

impl<T> WireCodec<T> {
    #[must_use]
    pub fn new(io: T) -> Self {
        Self {
            io,
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            write_buf: Vec::new(),
        }
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> WireCodec<T> {
    /// Read the next Hybi frame, refilling from the transport as needed.
    pub async fn read_frame(&mut self) -> Result<Decoded> {
        loop {
            match frame::parse(&self.read_buf) {
                Ok((decoded, consumed)) => {
                    self.read_buf.advance(consumed);
                    return Ok(decoded);
                }
                Err(Error::IncompleteFrame { .. }) => {}
                Err(e) => return Err(e),
            }
            self.fill().await?;
        }
    }

    /// Read the next legacy (0x00/0xFF-delimited) text frame payload.
    pub async fn read_legacy(&mut self) -> Result<Vec<u8>> {
        loop {
            match legacy::parse(&self.read_buf)? {
                Some((payload, consumed)) => {
                    self.read_buf.advance(consumed);
                    return Ok(payload);
                }
                None => self.fill().await?,
            }
        }
    }

    /// Read exactly 8 raw bytes (the Hixie-76 handshake token).
    pub async fn read_token(&mut self) -> Result<[u8; 8]> {
        while self.read_buf.len() < 8 {
            self.fill().await?;
        }
        let mut token = [0u8; 8];
        token.copy_from_slice(&self.read_buf[..8]);
        self.read_buf.advance(8);
        Ok(token)
    }

    async fn fill(&mut self) -> Result<()> {
        self.read_buf.reserve(READ_CHUNK);
        let n = self.io.read_buf(&mut self.read_buf).await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }

    /// Encode and write one outbound Hybi frame.
    pub async fn write_frame(&mut self, opcode: OpCode, payload: &[u8]) -> Result<()> {
        self.write_buf.clear();
        frame::encode(opcode, payload, &mut self.write_buf);
        self.io.write_all(&self.write_buf).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Encode and write one outbound legacy text frame.
    pub async fn write_legacy(&mut self, text: &str) -> Result<()> {
        self.write_buf.clear();
        legacy::encode(text, &mut self.write_buf);
        self.io.write_all(&self.write_buf).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Write raw bytes (handshake response headers and body).
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.io.write_all(bytes).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Shut down the write half of the transport.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Frame;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    fn expect_frame(decoded: Decoded) -> Frame {
        match decoded {
            Decoded::Frame(frame) => frame,
            Decoded::Skipped { opcode } => panic!("unexpected skip of opcode {opcode:#x}"),
        }
    }

    #[tokio::test]
    async fn test_read_frame() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        // Masked "Hello" from the client side
        client
            .write_all(&[
                0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58,
            ])
            .await
            .unwrap();

        let frame = expect_frame(codec.read_frame().await.unwrap());
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"Hello");
    }

    #[tokio::test]
    async fn test_read_frame_across_partial_writes() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        let reader = tokio::spawn(async move {
            let frame = expect_frame(codec.read_frame().await.unwrap());
            assert_eq!(frame.payload(), b"Hello");
        });

        // Header, mask key, and payload arrive in separate writes.
        client.write_all(&[0x81, 0x85]).await.unwrap();
        client.write_all(&[0x37, 0xfa, 0x21, 0x3d]).await.unwrap();
        client
            .write_all(&[0x7f, 0x9f, 0x4d, 0x51, 0x58])
            .await
            .unwrap();

        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_two_frames_from_one_buffer() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        client
            .write_all(&[0x81, 0x02, 0x48, 0x69, 0x82, 0x02, 0x01, 0x02])
            .await
            .unwrap();

        let f1 = expect_frame(codec.read_frame().await.unwrap());
        assert_eq!(f1.payload(), b"Hi");
        let f2 = expect_frame(codec.read_frame().await.unwrap());
        assert_eq!(f2.opcode, OpCode::Binary);
        assert_eq!(f2.payload(), &[0x01, 0x02]);
    }

    #[tokio::test]
    async fn test_read_frame_eof() {
        let (client, server) = duplex(256);
        let mut codec = WireCodec::new(server);
        drop(client);

        let result = codec.read_frame().await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_legacy() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        client.write_all(b"\x00hello\xff\x00world\xff").await.unwrap();

        assert_eq!(codec.read_legacy().await.unwrap(), b"hello");
        assert_eq!(codec.read_legacy().await.unwrap(), b"world");
    }

    #[tokio::test]
    async fn test_read_legacy_binary_prefix() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        client.write_all(&[0x80, 0x05]).await.unwrap();

        let result = codec.read_legacy().await;
        assert!(matches!(result, Err(Error::UnsupportedLegacyFrame(0x80))));
    }

    #[tokio::test]
    async fn test_read_token() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        client.write_all(b"^n:ds[4U\x00rest\xff").await.unwrap();

        let token = codec.read_token().await.unwrap();
        assert_eq!(&token, b"^n:ds[4U");
        // Bytes after the token stay buffered for the data path.
        assert_eq!(codec.read_legacy().await.unwrap(), b"rest");
    }

    #[tokio::test]
    async fn test_write_frame_unmasked() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        codec.write_frame(OpCode::Text, b"Hi").await.unwrap();

        let mut out = [0u8; 4];
        client.read_exact(&mut out).await.unwrap();
        assert_eq!(out, [0x81, 0x02, 0x48, 0x69]);
    }

    #[tokio::test]
    async fn test_write_legacy() {
        let (mut client, server) = duplex(256);
        let mut codec = WireCodec::new(server);

        codec.write_legacy("hi").await.unwrap();

        let mut out = [0u8; 4];
        client.read_exact(&mut out).await.unwrap();
        assert_eq!(&out, b"\x00hi\xff");
    }
}
