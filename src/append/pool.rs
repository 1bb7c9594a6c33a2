// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ops::Deref;
use std::ops::DerefMut;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;

const INITIAL_CAPACITY: usize = 256;

// Larger buffers are dropped instead of being kept alive by the pool.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// A bounded pool of scratch buffers, safe to share between threads.
#[derive(Debug)]
pub(crate) struct BufferPool {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
}

impl BufferPool {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Borrow an empty buffer. It goes back to the pool when the guard drops.
    pub(crate) fn get(&self) -> PooledBuffer<'_> {
        let buf = self
            .receiver
            .try_recv()
            .unwrap_or_else(|_| Vec::with_capacity(INITIAL_CAPACITY));
        PooledBuffer { pool: self, buf }
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // a full pool simply drops the buffer
        let _ = self.sender.try_send(buf);
    }
}

pub(crate) struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_are_reused_empty() {
        let pool = BufferPool::new(2);
        let ptr = {
            let mut buf = pool.get();
            buf.extend_from_slice(b"hello");
            buf.as_ptr()
        };

        let buf = pool.get();
        assert!(buf.is_empty());
        assert_eq!(buf.as_ptr(), ptr);
    }

    #[test]
    fn test_concurrent_borrowers_get_distinct_buffers() {
        let pool = BufferPool::new(4);
        let mut a = pool.get();
        let mut b = pool.get();
        a.push(1);
        b.push(2);
        assert_eq!(&a[..], [1]);
        assert_eq!(&b[..], [2]);
    }

    #[test]
    fn test_oversized_buffers_are_not_retained() {
        let pool = BufferPool::new(1);
        {
            let mut buf = pool.get();
            buf.reserve(MAX_RETAINED_CAPACITY + 1);
        }
        assert!(pool.receiver.is_empty());
    }
}
