/// Read adapter that can go back to the start of a non-seekable stream once
///
/// Bytes read before `rewind` are kept in memory and replayed; after the
/// replay the adapter reads straight from the inner stream and keeps nothing.

use std::io::{self, Read};

pub struct RewindableReader<R: Read> {
    inner: R,
    recorded: Vec<u8>,
    position: usize,
    recording: bool,
}

impl<R: Read> RewindableReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, recorded: Vec::new(), position: 0, recording: true }
    }

    /// Go back to the first byte
    ///
    /// Only the first call rewinds; recording stops there.
    pub fn rewind(&mut self) -> io::Result<()> {
        if !self.recording {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "stream already rewound"));
        }
        self.recording = false;
        self.position = 0;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for RewindableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position < self.recorded.len() {
            let available = &self.recorded[self.position..];
            let count = available.len().min(buf.len());
            buf[..count].copy_from_slice(&available[..count]);
            self.position += count;
            if !self.recording && self.position == self.recorded.len() {
                self.recorded = Vec::new();
                self.position = 0;
            }
            return Ok(count);
        }
        let count = self.inner.read(buf)?;
        if self.recording {
            self.recorded.extend_from_slice(&buf[..count]);
            self.position += count;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader handing out at most 3 bytes per call
    struct Trickle(Vec<u8>, usize);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let rest = &self.0[self.1..];
            let count = rest.len().min(buf.len()).min(3);
            buf[..count].copy_from_slice(&rest[..count]);
            self.1 += count;
            Ok(count)
        }
    }

    #[test]
    fn test_rewind_replays_prefix() {
        let mut reader = RewindableReader::new(Trickle((0u8..20).collect(), 0));
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).unwrap();
        assert_eq!(magic, [0, 1, 2, 3]);
        reader.rewind().unwrap();

        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        assert_eq!(all, (0u8..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_rewind_only_once() {
        let mut reader = RewindableReader::new(&[1u8, 2, 3][..]);
        reader.rewind().unwrap();
        assert!(reader.rewind().is_err());
    }

    #[test]
    fn test_rewind_before_reading() {
        let mut reader = RewindableReader::new(&[9u8, 8][..]);
        reader.rewind().unwrap();
        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        assert_eq!(all, vec![9, 8]);
    }
}
