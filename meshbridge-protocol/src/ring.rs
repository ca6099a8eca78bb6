//! Fixed-capacity ring buffer
//!
//! Decouples the UART receive path from frame parsing: the receive side
//! only pushes bytes, the control loop drains them later.
//!
//! Storage is an inline `[T; N]`, so the owner decides where it lives (a
//! `static`, a task's stack, a field of a larger struct) and nothing is
//! ever allocated. A zero capacity is rejected at compile time.

/// Circular FIFO of `N` elements of `T`
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    buffer: [T; N],
    /// Next slot to read
    head: usize,
    /// Next slot to write
    tail: usize,
    /// Occupied slots
    count: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    const NONZERO_CAPACITY: () = assert!(N > 0, "ring buffer capacity must be non-zero");

    /// Create an empty buffer whose slots are pre-filled with `fill`
    ///
    /// The fill value is never observable through the API; it only exists
    /// so the buffer can be built in a `const` context.
    pub const fn with_fill(fill: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;
        Self {
            buffer: [fill; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Total number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Append an element
    ///
    /// When the buffer is full the element is handed back in `Err` and the
    /// buffer is left untouched (the newest data is dropped).
    pub fn push(&mut self, element: T) -> Result<(), T> {
        if self.is_full() {
            return Err(element);
        }
        self.buffer[self.tail] = element;
        self.tail = (self.tail + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Append an element, evicting the oldest one if the buffer is full
    ///
    /// This is lossy: it always succeeds, keeping the most recent `N`
    /// elements, and returns the evicted element if there was one.
    pub fn push_cyclic(&mut self, element: T) -> Option<T> {
        let evicted = if self.is_full() { self.pop() } else { None };
        // Cannot fail: a slot was just freed or the buffer was not full
        let _ = self.push(element);
        evicted
    }

    /// Remove and return the oldest element
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let element = self.buffer[self.head];
        self.head = (self.head + 1) % N;
        self.count -= 1;
        Some(element)
    }

    /// Look at the `index`-th oldest element without removing it
    pub fn peek(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.buffer.get((self.head + index) % N)
    }

    /// Return to the empty state
    ///
    /// Slot contents are not cleared; they are unreachable until
    /// overwritten.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Iterate over the stored elements, oldest first, without removing them
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.count).filter_map(move |i| self.peek(i))
    }
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::with_fill(T::default())
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
