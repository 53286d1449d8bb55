//! Byte cursor over the pickle input, with frame support
//!
//! A frame is a declared-length window of the input. While one is active
//! every read is served from it, and a read that would cross its end fails
//! even if the outer input still has bytes. Once fully consumed the frame
//! is dropped and reads continue from the outer input.

use crate::error::{Result, UnpickleError};

/// Read position over an input buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Unread input outside the current frame
    input: &'a [u8],

    /// Unread portion of the current frame; never empty while `Some`
    frame: Option<&'a [u8]>,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, frame: None }
    }

    /// Bytes left in the active frame, if one is active.
    pub fn frame_remaining(&self) -> Option<usize> {
        self.frame.map(<[u8]>::len)
    }

    /// Bytes left outside the active frame.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Read exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let source = self.source();
        if source.len() < n {
            return Err(UnpickleError::Truncated {
                needed: n,
                available: source.len(),
            });
        }
        let (out, rest) = source.split_at(n);
        self.advance(rest);
        Ok(out)
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let source = self.source();
        let (&first, rest) = source.split_first().ok_or(UnpickleError::Truncated {
            needed: 1,
            available: 0,
        })?;
        self.advance(rest);
        Ok(first)
    }

    /// Read up to the next line feed, returning the line without it.
    pub fn read_line(&mut self) -> Result<&'a [u8]> {
        let source = self.source();
        let end = source
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(UnpickleError::UnterminatedLine)?;
        let line = &source[..end];
        self.advance(&source[end + 1..]);
        Ok(line)
    }

    /// Enter a frame of `len` bytes taken from the outer input.
    pub fn begin_frame(&mut self, len: usize) -> Result<()> {
        if self.frame.is_some() {
            return Err(UnpickleError::NestedFrame);
        }
        if self.input.len() < len {
            return Err(UnpickleError::Truncated {
                needed: len,
                available: self.input.len(),
            });
        }
        let (frame, rest) = self.input.split_at(len);
        self.input = rest;
        if !frame.is_empty() {
            self.frame = Some(frame);
        }
        Ok(())
    }

    fn source(&self) -> &'a [u8] {
        self.frame.unwrap_or(self.input)
    }

    fn advance(&mut self, rest: &'a [u8]) {
        match self.frame {
            Some(_) if rest.is_empty() => self.frame = None,
            Some(_) => self.frame = Some(rest),
            None => self.input = rest,
        }
    }
}
