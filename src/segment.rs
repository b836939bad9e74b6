/// A run of bytes at consecutive addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start_address: u32,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(start_address: u32, data: Vec<u8>) -> Self {
        Self {
            start_address,
            data,
        }
    }

    /// Address just past the last byte. May be `u32::MAX + 1`.
    pub fn next_address(&self) -> u64 {
        u64::from(self.start_address) + self.data.len() as u64
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
