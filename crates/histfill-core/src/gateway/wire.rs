//! Frame and field codec for the gateway socket protocol.
//!
//! A frame is a 4-byte big-endian length followed by that many payload bytes.
//! A payload is a run of NUL-terminated ASCII fields.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::GatewayError;

/// Upper bound on a single incoming frame.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Prefix written once before the version negotiation frame.
pub const API_SIGN: &[u8] = b"API\0";

/// Builder for one outgoing message payload.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldWriter {
    payload: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl std::fmt::Display) -> &mut Self {
        self.payload.extend_from_slice(value.to_string().as_bytes());
        self.payload.push(0);
        self
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.push(u8::from(value))
    }

    /// Floats go out with a decimal point, matching the reference client.
    pub fn push_f64(&mut self, value: f64) -> &mut Self {
        self.push(format!("{value:?}"))
    }

    pub fn push_empty(&mut self) -> &mut Self {
        self.payload.push(0);
        self
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_frame(self) -> Vec<u8> {
        frame(&self.payload)
    }
}

/// Length-prefixes `payload`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 4);
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Splits a payload into its fields. A trailing NUL does not produce an
/// extra empty field.
pub fn split_fields(payload: &[u8]) -> Result<Vec<String>, GatewayError> {
    let body = payload.strip_suffix(&[0]).unwrap_or(payload);
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split(|byte| *byte == 0)
        .map(|raw| {
            std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| GatewayError::protocol("field is not valid UTF-8"))
        })
        .collect()
}

pub async fn write_frame<W>(writer: &mut W, bytes: &[u8]) -> Result<(), GatewayError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(bytes)
        .await
        .map_err(|error| GatewayError::connection(format!("write failed: {error}")))?;
    writer
        .flush()
        .await
        .map_err(|error| GatewayError::connection(format!("flush failed: {error}")))
}

/// Accumulates socket bytes and hands out complete frames.
///
/// Bytes stay buffered until a whole frame is present, so a read abandoned by
/// a timeout never loses part of a message.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the next complete frame, if any, as decoded fields.
    pub fn try_next(&mut self) -> Result<Option<Vec<String>>, GatewayError> {
        let Some(header) = self.buf.get(..4) else {
            return Ok(None);
        };
        let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        if len > MAX_FRAME_LEN {
            return Err(GatewayError::protocol(format!(
                "frame of {len} bytes exceeds limit of {MAX_FRAME_LEN}"
            )));
        }
        if self.buf.len() < len + 4 {
            return Ok(None);
        }

        let fields = split_fields(&self.buf[4..len + 4])?;
        self.buf.drain(..len + 4);
        Ok(Some(fields))
    }

    /// Reads until one complete frame is buffered and returns it.
    pub async fn read_message<R>(&mut self, reader: &mut R) -> Result<Vec<String>, GatewayError>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(fields) = self.try_next()? {
                return Ok(fields);
            }
            let read = reader.read_buf(&mut self.buf).await.map_err(|error| {
                GatewayError::connection(format!("read from gateway failed: {error}"))
            })?;
            if read == 0 {
                return Err(GatewayError::connection("gateway closed the session"));
            }
        }
    }
}

/// Typed cursor over the fields of one incoming message.
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: &'a [String],
    position: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a [String]) -> Self {
        Self {
            fields,
            position: 0,
        }
    }

    pub fn next_str(&mut self) -> Result<&'a str, GatewayError> {
        let field = self.fields.get(self.position).ok_or_else(|| {
            GatewayError::protocol(format!("message ended before field {}", self.position))
        })?;
        self.position += 1;
        Ok(field.as_str())
    }

    pub fn skip(&mut self) -> Result<(), GatewayError> {
        self.next_str().map(|_| ())
    }

    /// Empty fields decode as zero.
    pub fn next_i64(&mut self) -> Result<i64, GatewayError> {
        let raw = self.next_str()?.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<i64>().map_err(|_| {
            GatewayError::protocol(format!("expected integer at field {}, got '{raw}'", self.position - 1))
        })
    }

    pub fn next_i32(&mut self) -> Result<i32, GatewayError> {
        let value = self.next_i64()?;
        i32::try_from(value).map_err(|_| {
            GatewayError::protocol(format!("integer {value} out of range at field {}", self.position - 1))
        })
    }

    /// Empty fields decode as zero. Accepts the decimal strings used for sizes.
    pub fn next_f64(&mut self) -> Result<f64, GatewayError> {
        let raw = self.next_str()?.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        raw.parse::<f64>().map_err(|_| {
            GatewayError::protocol(format!("expected number at field {}, got '{raw}'", self.position - 1))
        })
    }

    pub fn remaining(&self) -> usize {
        self.fields.len().saturating_sub(self.position)
    }
}
