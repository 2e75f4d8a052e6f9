use std::collections::VecDeque;

/// A finite-capacity FIFO of bytes with one writing side and one reading
/// side. The writer appends and eventually closes the stream; the reader
/// peeks and pops. Overflowing writes are silently truncated, so a writer
/// that cares should check `available_capacity` first.
#[derive(Debug)]
pub struct ByteStream {
    capacity: usize,
    buf: VecDeque<u8>,
    pushed: u64,
    popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
            pushed: 0,
            popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Append as much of `data` as fits in the remaining capacity. The
    /// rest is dropped. Writes after `close` are ignored entirely.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed {
            return;
        }
        let len = std::cmp::min(data.len(), self.available_capacity());
        self.buf.extend(&data[..len]);
        self.pushed += len as u64;
    }

    /// No more bytes will be pushed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    /// A contiguous prefix of the buffered bytes. The deque may be split
    /// in two internally, so this is not necessarily everything that is
    /// buffered, but it is non-empty whenever the stream is.
    pub fn peek(&self) -> &[u8] {
        self.buf.as_slices().0
    }

    /// Discard up to `len` bytes from the front.
    pub fn pop(&mut self, len: usize) {
        let len = std::cmp::min(len, self.buf.len());
        self.buf.drain(..len);
        self.popped += len as u64;
    }

    /// Pop up to `len` bytes from the front and return them.
    pub fn read(&mut self, len: usize) -> Vec<u8> {
        let len = std::cmp::min(len, self.buf.len());
        let data: Vec<u8> = self.buf.drain(..len).collect();
        self.popped += len as u64;
        data
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closed and fully drained.
    pub fn is_finished(&self) -> bool {
        self.closed && self.buf.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn bytes_buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.pushed
    }

    pub fn bytes_popped(&self) -> u64 {
        self.popped
    }
}
