//! # Scratch buffer pool.
//!
//! Render calls borrow a `Vec<u8>` from a [`BufferPool`] and give it back when
//! the line is written, so steady-state logging does not allocate per line.

use parking_lot::Mutex;

/// Buffers larger than this are dropped instead of being pooled.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Bounded pool of reusable byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
    initial_capacity: usize,
}

impl BufferPool {
    /// Creates a pool keeping at most `max_pooled` idle buffers.
    pub fn new(max_pooled: usize) -> Self {
        Self::with_buffer_capacity(max_pooled, 256)
    }

    /// Creates a pool whose fresh buffers start with `initial_capacity` bytes.
    pub fn with_buffer_capacity(max_pooled: usize, initial_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_pooled)),
            max_pooled,
            initial_capacity,
        }
    }

    /// Takes an empty buffer from the pool, allocating one if none is idle.
    pub fn get(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity))
    }

    /// Clears the buffer and returns it to the pool.
    pub fn put(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buffer.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_pooled {
            free.push(buffer);
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_are_reused_and_cleared() {
        let pool = BufferPool::new(2);
        let mut buf = pool.get();
        buf.extend_from_slice(b"hello");
        let cap = buf.capacity();
        pool.put(buf);
        assert_eq!(pool.idle(), 1);

        let again = pool.get();
        assert!(again.is_empty());
        assert_eq!(again.capacity(), cap);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = BufferPool::new(1);
        pool.put(Vec::with_capacity(8));
        pool.put(Vec::with_capacity(8));
        assert_eq!(pool.idle(), 1);

        pool.put(Vec::with_capacity(MAX_RETAINED_CAPACITY + 1));
        assert_eq!(pool.idle(), 1);
    }
}
