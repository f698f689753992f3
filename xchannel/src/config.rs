use crate::DEFAULT_BUFFER_SIZE;

/// Configuration for byte sources and duplex clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity in bytes of the read buffer (one chunk per completed read).
    pub buffer_size: usize,
}

impl Config {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Sets the read buffer capacity in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        assert!(size > 0, "buffer_size must be positive");
        self.buffer_size = size;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
