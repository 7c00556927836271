//! Blocking [`std::io::Read`] support for [`super::RawReader`].

use std::io::{self, Read};

use super::RawReader;

impl RawReader {
    /// Reads `source` to completion in fixed-size blocks (per the
    /// "moderate block size" guidance for stream input), feeding each
    /// block as it arrives. Returns the total number of bytes read.
    ///
    /// A block boundary that falls inside a multi-byte UTF-8 sequence is
    /// handled by holding the incomplete tail back and prepending it to
    /// the next block, so `source` may be read in arbitrary-sized
    /// chunks without corrupting multi-byte characters.
    ///
    /// # Errors
    ///
    /// Returns any [`io::Error`] raised by `source`, other than
    /// [`io::ErrorKind::Interrupted`], which is retried. Returns an
    /// [`io::ErrorKind::InvalidData`] error if the stream contains bytes
    /// that are not valid UTF-8.
    pub fn feed_reader<R: Read>(&mut self, source: &mut R) -> io::Result<usize> {
        let mut block = [0_u8; 4096];
        let mut pending: alloc::vec::Vec<u8> = alloc::vec::Vec::new();
        let mut total = 0;
        loop {
            match source.read(&mut block) {
                Ok(0) => {
                    if pending.is_empty() {
                        return Ok(total);
                    }
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "stream ended mid UTF-8 sequence",
                    ));
                }
                Ok(n) => {
                    total += n;
                    pending.extend_from_slice(&block[..n]);
                    let valid_len = match core::str::from_utf8(&pending) {
                        Ok(text) => {
                            self.feed(text);
                            pending.clear();
                            continue;
                        }
                        Err(e) => e.valid_up_to(),
                    };
                    if valid_len == 0 && pending.len() > 4 {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "invalid UTF-8 in stream",
                        ));
                    }
                    // SAFETY: `valid_len` is the boundary `str::from_utf8`
                    // reported as valid.
                    let text = unsafe {
                        core::str::from_utf8_unchecked(&pending[..valid_len])
                    };
                    self.feed(text);
                    pending.drain(..valid_len);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
