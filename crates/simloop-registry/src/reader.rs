//! Reader for persisted recorder logs.
//!
//! [`FrameReader`] reads frames from any `Read` source. The log has no
//! header: a clean end of stream ends it, a partial frame is an error.

use std::io::Read;

use crate::codec::decode_frame;
use crate::error::RegistryError;
use crate::recorder::RecordedFrame;

/// Reads recorder frames from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct FrameReader<R: Read> {
    reader: R,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    /// Read frames from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            frames_read: 0,
        }
    }

    /// Read the next frame, or `None` if the stream is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<RecordedFrame>, RegistryError> {
        let frame = decode_frame(&mut self.reader, self.frames_read)?;
        Ok(frame.map(|(time, payload)| {
            self.frames_read += 1;
            RecordedFrame { time, payload }
        }))
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            inner: self,
            done: false,
        }
    }
}

/// Iterator adapter over recorder frames.
pub struct FrameIter<R: Read> {
    inner: FrameReader<R>,
    done: bool,
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<RecordedFrame, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame;

    fn log(frames: &[(f64, Vec<u8>)]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (t, p) in frames {
            encode_frame(&mut buf, *t, p).unwrap();
        }
        buf
    }

    #[test]
    fn reads_frames_in_order() {
        let buf = log(&[(0.0, vec![1, 2]), (0.1, vec![]), (0.2, vec![3])]);
        let mut reader = FrameReader::new(buf.as_slice());
        let f0 = reader.next_frame().unwrap().unwrap();
        assert_eq!(f0.time, 0.0);
        assert_eq!(f0.payload, vec![1, 2]);
        let f1 = reader.next_frame().unwrap().unwrap();
        assert!(f1.payload.is_empty());
        reader.next_frame().unwrap().unwrap();
        assert!(reader.next_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 3);
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut buf = log(&[(0.0, vec![1, 2, 3]), (1.0, vec![4, 5, 6])]);
        buf.truncate(buf.len() - 2);
        let results: Vec<_> = FrameReader::new(buf.as_slice()).frames().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(RegistryError::MalformedFrame { index: 1, .. })
        ));
    }

    #[test]
    fn empty_log_has_no_frames() {
        assert_eq!(FrameReader::new(&[0u8; 0][..]).frames().count(), 0);
    }
}
