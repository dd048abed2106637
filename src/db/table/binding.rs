use std::fmt;

use super::cell::Cell;

/// A write did not fit the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub needed: usize,
    pub capacity: usize,
}

/// Capability the decoder writes values through.
///
/// Implementors own their storage; writers only see offsets and lengths.
pub trait BindTarget {
    fn capacity(&self) -> usize;

    /// Copies `bytes` to `offset`, failing without writing anything when the
    /// end would pass [`capacity`](Self::capacity).
    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CapacityExceeded>;

    fn set_len(&mut self, len: usize);

    fn set_null(&mut self, null: bool);
}

/// Fixed-capacity output buffer for one column position.
///
/// Allocated once when the table is opened and reused for every fetched
/// row. Contents are only meaningful until the next fetch.
#[derive(Debug, Clone)]
pub struct BindingBuffer {
    data: Box<[u8]>,
    len: usize,
    null: bool,
    bound: bool,
}

impl BindingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
            null: true,
            bound: true,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Whether the cursor decodes into this buffer.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The bound display text. Buffers are only ever filled from `str`
    /// data, so this never loses anything.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Display text, or `None` for SQL NULL.
    pub fn value(&self) -> Option<&str> {
        (!self.null).then(|| self.as_str())
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.null = true;
    }
}

impl BindTarget for BindingBuffer {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        let end = offset.saturating_add(bytes.len());
        if end > self.data.len() {
            return Err(CapacityExceeded {
                needed: end,
                capacity: self.data.len(),
            });
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    fn set_len(&mut self, len: usize) {
        self.len = len.min(self.data.len());
    }

    fn set_null(&mut self, null: bool) {
        self.null = null;
    }
}

/// Streams rendered text into a target, counting every byte so an
/// overflow reports the full size the value needed.
struct BindWriter<'a, T: BindTarget> {
    target: &'a mut T,
    written: usize,
    overflowed: bool,
}

impl<T: BindTarget> fmt::Write for BindWriter<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if !self.overflowed && self.target.write_at(self.written, s.as_bytes()).is_err() {
            self.overflowed = true;
        }
        self.written += s.len();
        Ok(())
    }
}

/// Renders a cell into a binding target.
///
/// On overflow the target is left null and empty; nothing is truncated.
pub(crate) fn bind_cell<T: BindTarget>(
    target: &mut T,
    cell: &Cell,
    date_format: &str,
) -> Result<(), CapacityExceeded> {
    if cell.is_null() {
        target.set_len(0);
        target.set_null(true);
        return Ok(());
    }

    let mut writer = BindWriter {
        target,
        written: 0,
        overflowed: false,
    };
    // BindWriter never fails, and date patterns are validated on open.
    let _ = cell.render(&mut writer, date_format);

    let (written, overflowed) = (writer.written, writer.overflowed);
    if overflowed {
        let capacity = target.capacity();
        target.set_len(0);
        target.set_null(true);
        return Err(CapacityExceeded {
            needed: written,
            capacity,
        });
    }

    target.set_len(written);
    target.set_null(false);
    Ok(())
}

/// One buffer per column position of an open table.
#[derive(Debug, Clone)]
pub struct Bindings {
    buffers: Vec<BindingBuffer>,
}

impl Bindings {
    /// Allocates and binds a buffer for each of `columns` positions.
    pub fn new(columns: usize, capacity: usize) -> Self {
        Self {
            buffers: (0..columns).map(|_| BindingBuffer::new(capacity)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&BindingBuffer> {
        self.buffers.get(position)
    }

    pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut BindingBuffer> {
        self.buffers.get_mut(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingBuffer> {
        self.buffers.iter()
    }

    /// Keeps only `positions` bound. Positions past the last column are
    /// ignored.
    pub fn bind_only(&mut self, positions: &[usize]) {
        for (j, buffer) in self.buffers.iter_mut().enumerate() {
            buffer.bound = positions.contains(&j);
            buffer.clear();
        }
    }

    pub fn bind_all(&mut self) {
        for buffer in &mut self.buffers {
            buffer.bound = true;
        }
    }

    pub fn clear(&mut self) {
        self.buffers.iter_mut().for_each(BindingBuffer::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_text() {
        let mut buffer = BindingBuffer::new(16);
        bind_cell(&mut buffer, &Cell::Text("hello".to_string()), "").expect("bind");

        assert_eq!(buffer.as_str(), "hello");
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.value(), Some("hello"));
    }

    #[test]
    fn test_buffers_are_reused() {
        let mut buffer = BindingBuffer::new(16);
        bind_cell(&mut buffer, &Cell::Text("longer value".to_string()), "").expect("bind");
        bind_cell(&mut buffer, &Cell::Int(7), "").expect("bind");

        assert_eq!(buffer.as_str(), "7");
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn test_null_cell() {
        let mut buffer = BindingBuffer::new(16);
        bind_cell(&mut buffer, &Cell::Int(1), "").expect("bind");
        bind_cell(&mut buffer, &Cell::Null, "").expect("bind");

        assert!(buffer.is_null());
        assert_eq!(buffer.value(), None);
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn test_overflow_reports_full_size() {
        let mut buffer = BindingBuffer::new(4);
        let err = bind_cell(&mut buffer, &Cell::Text("abcdefgh".to_string()), "").unwrap_err();

        assert_eq!(
            err,
            CapacityExceeded {
                needed: 8,
                capacity: 4
            }
        );
        assert!(buffer.is_null());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_value_filling_capacity_exactly() {
        let mut buffer = BindingBuffer::new(4);
        bind_cell(&mut buffer, &Cell::Binary(vec![0xDE, 0xAD]), "").expect("bind");
        assert_eq!(buffer.as_str(), "DEAD");
    }

    #[test]
    fn test_write_at_rejects_out_of_bounds() {
        let mut buffer = BindingBuffer::new(4);
        assert!(buffer.write_at(2, b"abc").is_err());
        assert!(buffer.write_at(usize::MAX, b"a").is_err());
        assert!(buffer.write_at(1, b"abc").is_ok());
    }

    #[test]
    fn test_bind_only() {
        let mut bindings = Bindings::new(3, 8);
        bindings.bind_only(&[0, 2, 9]);

        let bound: Vec<_> = bindings.iter().map(BindingBuffer::is_bound).collect();
        assert_eq!(bound, [true, false, true]);

        bindings.bind_all();
        assert!(bindings.iter().all(BindingBuffer::is_bound));
    }
}
