//! Byte-to-frame extraction.
//!
//! Chunks are appended to a byte buffer and split on the blank-line
//! delimiter. Buffering bytes rather than text keeps a multi-byte UTF-8
//! character intact when the transport splits it across two chunks.

/// Blank line separating two frames.
pub const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Prefix every data frame starts with.
pub const DATA_PREFIX: &str = "data: ";

/// One `data: <payload>` unit with the prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: String,
}

impl Frame {
    /// Parse a raw delimited segment. Segments without the data prefix
    /// (comments, `event:` lines, stray bytes) yield `None`.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        raw.strip_prefix(DATA_PREFIX.as_bytes()).map(|payload| Frame {
            payload: String::from_utf8_lossy(payload).into_owned(),
        })
    }
}

/// Stateful splitter that turns arbitrarily segmented chunks into frames.
///
/// The buffer only ever holds the bytes received so far minus the bytes of
/// segments already extracted; the unconsumed tail survives across chunks.
#[derive(Debug, Default)]
pub struct FrameExtractor {
    buffer: Vec<u8>,
    /// Buffer offset where the next delimiter search starts.
    scan_from: usize,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        let mut search = self.scan_from;

        while let Some(pos) = find_delimiter(&self.buffer[search..]) {
            let end = search + pos;
            if let Some(frame) = Frame::parse(&self.buffer[consumed..end]) {
                frames.push(frame);
            }
            consumed = end + FRAME_DELIMITER.len();
            search = consumed;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
        // A lone trailing '\n' may pair with the first byte of the next chunk.
        self.scan_from = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);

        frames
    }

    /// Flush the tail at end of stream. The tail becomes one last frame
    /// only if it carries the data prefix; otherwise it is discarded.
    pub fn finish(&mut self) -> Option<Frame> {
        self.scan_from = 0;
        let tail = std::mem::take(&mut self.buffer);
        if tail.is_empty() {
            return None;
        }
        Frame::parse(&tail)
    }

    /// Bytes received but not yet extracted.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.payload.as_str()).collect()
    }

    /// Feed `chunks` one after another and flush.
    fn extract_all(chunks: &[&[u8]]) -> Vec<Frame> {
        let mut extractor = FrameExtractor::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(extractor.push(chunk));
        }
        frames.extend(extractor.finish());
        frames
    }

    #[test]
    fn test_single_complete_frame() {
        let mut extractor = FrameExtractor::new();
        let frames = extractor.push(b"data: {\"a\":1}\n\n");
        assert_eq!(payloads(&frames), vec!["{\"a\":1}"]);
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut extractor = FrameExtractor::new();
        let frames = extractor.push(b"data: one\n\ndata: two\n\ndata: thr");
        assert_eq!(payloads(&frames), vec!["one", "two"]);
        assert_eq!(extractor.buffered(), b"data: thr");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut extractor = FrameExtractor::new();
        assert!(extractor.push(b"data: hel").is_empty());
        assert!(extractor.push(b"lo\n").is_empty());
        let frames = extractor.push(b"\ndata: next");
        assert_eq!(payloads(&frames), vec!["hello"]);
        assert_eq!(extractor.buffered(), b"data: next");
    }

    #[test]
    fn test_segment_without_prefix_is_discarded() {
        let mut extractor = FrameExtractor::new();
        let frames = extractor.push(b"event: ping\n\n: comment\n\ndata: kept\n\n");
        assert_eq!(payloads(&frames), vec!["kept"]);
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_finish_with_prefixed_tail() {
        let mut extractor = FrameExtractor::new();
        extractor.push(b"data: last");
        assert_eq!(
            extractor.finish(),
            Some(Frame {
                payload: "last".to_string()
            })
        );
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_finish_discards_unprefixed_tail() {
        let mut extractor = FrameExtractor::new();
        extractor.push(b"garbage");
        assert_eq!(extractor.finish(), None);
        assert!(extractor.is_empty());
        assert_eq!(FrameExtractor::new().finish(), None);
    }

    #[test]
    fn test_utf8_character_split_across_chunks() {
        let text = "data: {\"answer\":\"你好\"}\n\n".as_bytes();
        // Split inside the first multi-byte character.
        let split = text.iter().position(|b| *b >= 0x80).unwrap() + 1;
        let frames = extract_all(&[&text[..split], &text[split..]]);
        assert_eq!(payloads(&frames), vec!["{\"answer\":\"你好\"}"]);
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let stream: &[u8] = "data: {\"n\":1}\n\nevent: ping\n\ndata: {\"n\":\"é\"}\n\ndata: ping\n\ndata: {\"n\":3}"
            .as_bytes();
        let expected = extract_all(&[stream]);
        assert_eq!(expected.len(), 4);

        // Every two-way split.
        for i in 0..=stream.len() {
            assert_eq!(extract_all(&[&stream[..i], &stream[i..]]), expected, "split at {}", i);
        }

        // Every three-way split.
        for i in 0..=stream.len() {
            for j in i..=stream.len() {
                assert_eq!(
                    extract_all(&[&stream[..i], &stream[i..j], &stream[j..]]),
                    expected,
                    "split at {} and {}",
                    i,
                    j
                );
            }
        }

        // One byte at a time.
        let bytes: Vec<&[u8]> = stream.chunks(1).collect();
        assert_eq!(extract_all(&bytes), expected);
    }

    #[test]
    fn test_buffer_holds_only_unextracted_bytes() {
        let mut extractor = FrameExtractor::new();
        extractor.push(b"data: a\n\nda");
        assert_eq!(extractor.buffered(), b"da");
        extractor.push(b"ta: b\n");
        assert_eq!(extractor.buffered(), b"data: b\n");
        extractor.push(b"\n");
        assert!(extractor.is_empty());
    }

    #[test]
    fn test_empty_segment_between_delimiters() {
        let frames = extract_all(&[b"\n\n\n\ndata: x\n\n"]);
        assert_eq!(payloads(&frames), vec!["x"]);
    }
}
