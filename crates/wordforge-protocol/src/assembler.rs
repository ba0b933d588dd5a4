//! Per-connection line assembly.
//!
//! TCP delivers a byte stream, not messages. A client typing `alice\r\n` may
//! arrive as `ali` + `ce\r\n`, or together with the next line in a single
//! read. The [`LineAssembler`] buffers whatever has arrived and hands back
//! complete lines, exactly one per call, in arrival order. Bytes after a
//! terminator stay buffered for the next call, so no line is ever lost.

use serde::{Deserialize, Serialize};

/// Limits for a [`LineAssembler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Bytes buffered without a terminator before the excess is discarded.
    pub capacity: usize,

    /// Lines longer than this are truncated to their first `max_line_len`
    /// bytes.
    pub max_line_len: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_line_len: 128,
        }
    }
}

impl AssemblerConfig {
    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// - `max_line_len` is at least 1.
    /// - `capacity` leaves room for a full line plus its terminator.
    pub fn validated(mut self) -> Self {
        self.max_line_len = self.max_line_len.max(1);
        self.capacity = self.capacity.max(self.max_line_len + 2);
        self
    }
}

/// The result of feeding one read into a [`LineAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    /// A complete line, terminator stripped.
    Line(String),
    /// No terminator yet; keep waiting.
    Pending,
    /// The read was empty: the peer closed the connection.
    Disconnected,
}

/// Accumulates bytes until a network newline arrives.
#[derive(Debug, Clone)]
pub struct LineAssembler {
    buf: Vec<u8>,
    config: AssemblerConfig,
}

impl LineAssembler {
    /// Creates an empty assembler.
    pub fn new(config: AssemblerConfig) -> Self {
        let config = config.validated();
        Self {
            buf: Vec::with_capacity(config.capacity),
            config,
        }
    }

    /// Feeds the bytes of one read and returns the first complete line.
    ///
    /// An empty `chunk` stands for a zero-byte read and yields
    /// [`Assembled::Disconnected`]. Any further complete lines stay
    /// buffered; fetch them with [`next_line`](Self::next_line).
    pub fn push(&mut self, chunk: &[u8]) -> Assembled {
        if chunk.is_empty() {
            return Assembled::Disconnected;
        }
        self.buf.extend_from_slice(chunk);
        self.enforce_capacity();

        match self.next_line() {
            Some(line) => Assembled::Line(line),
            None => Assembled::Pending,
        }
    }

    /// Takes the next complete line out of the buffer, if there is one.
    pub fn next_line(&mut self) -> Option<String> {
        let at = find_network_newline(&self.buf)?;
        let rest = self.buf.split_off(at + 2);
        let mut line = std::mem::replace(&mut self.buf, rest);
        line.truncate(at);

        if line.len() > self.config.max_line_len {
            tracing::warn!(
                len = line.len(),
                max = self.config.max_line_len,
                "line truncated"
            );
            line.truncate(self.config.max_line_len);
        }

        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Keeps an unterminated buffer within `capacity`.
    ///
    /// Only the first `max_line_len` bytes can ever be surfaced, so the
    /// middle is dropped. The final byte is kept in case it is the `\r` of
    /// a terminator split across reads.
    fn enforce_capacity(&mut self) {
        if self.buf.len() <= self.config.capacity
            || find_network_newline(&self.buf).is_some()
        {
            return;
        }
        let last = self.buf.len() - 1;
        let keep = self.config.max_line_len.min(last);
        self.buf.drain(keep..last);
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}

/// Returns the index of the first `\r\n` in `buf`.
pub fn find_network_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
