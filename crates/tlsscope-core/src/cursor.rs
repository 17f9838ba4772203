/// Bounds-checked reader over a byte slice.
///
/// Any read that asks for more than [`Cursor::remaining`] bytes puts the
/// cursor into a sticky error state: the read yields `None`, nothing is
/// consumed, and every later read on the same cursor yields `None` too.
/// Wire-declared lengths can therefore be fed straight into `skip`/`take`
/// without pre-validation.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    error: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            error: false,
        }
    }

    /// Bytes left to read. Always zero once the cursor has errored.
    pub fn remaining(&self) -> usize {
        if self.error {
            0
        } else {
            self.data.len() - self.pos
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Unread bytes, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        if self.error {
            &[]
        } else {
            &self.data[self.pos..]
        }
    }

    /// Consume exactly `n` bytes and return them.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.error || n > self.data.len() - self.pos {
            self.error = true;
            return None;
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    pub fn skip(&mut self, n: usize) -> bool {
        self.take(n).is_some()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u24(&mut self) -> Option<u32> {
        self.take(3)
            .map(|b| u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Split off a sub-cursor over the next `min(n, remaining)` bytes and
    /// advance past them. Never errors; a hostile `n` is clamped.
    pub fn sub_clamped(&mut self, n: usize) -> Cursor<'a> {
        let n = n.min(self.remaining());
        Cursor::new(self.take(n).unwrap_or(&[]))
    }
}
