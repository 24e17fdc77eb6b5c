use crate::error::{JParseError, JParseResult};

/// Bounded last-in first-out stack.
#[derive(Debug)]
pub struct Stack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Stack<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// # Errors
    ///
    /// Returns [`JParseError::StackOverflow`] when the stack is full.
    pub fn push(&mut self, item: T) -> JParseResult<()> {
        if self.items.len() >= self.capacity {
            return Err(JParseError::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`JParseError::StackUnderflow`] when the stack is empty.
    pub fn pop(&mut self) -> JParseResult<T> {
        self.items.pop().ok_or(JParseError::StackUnderflow)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
