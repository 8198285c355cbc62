//! The console keyboard ring.
//!
//! Keystrokes arrive asynchronously: in windowed builds the producer
//! runs on the host input thread while the consumer runs inside the
//! console's `io` callback.  The ring is therefore a fixed-size
//! single-producer/single-consumer queue built on atomics: `key_in`
//! is written only through [`KeyProducer`], `key_out` only through
//! [`KeyConsumer`].  Empty is `key_in == key_out`; a push onto a full
//! ring drops the newest key.
//!
//! The consumer is deliberately slow.  Real operators type at human
//! speed, and the DSD keyboard scanner expects that, so `get` hands
//! out at most one key per three calls.  The throttle counter
//! advances on every call that finds the ring non-empty, not on every
//! key delivered.
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Ring capacity; one slot is sacrificed to distinguish full from
/// empty, so 49 keys can be buffered.
pub const KEY_BUF_SIZE: usize = 50;

#[derive(Debug)]
struct KeyRing {
    slots: [AtomicU8; KEY_BUF_SIZE],
    key_in: AtomicUsize,
    key_out: AtomicUsize,
}

/// Create a connected producer/consumer pair around a fresh ring.
pub fn key_ring() -> (KeyProducer, KeyConsumer) {
    let ring = Arc::new(KeyRing {
        slots: std::array::from_fn(|_| AtomicU8::new(0)),
        key_in: AtomicUsize::new(0),
        key_out: AtomicUsize::new(0),
    });
    (
        KeyProducer {
            ring: Arc::clone(&ring),
        },
        KeyConsumer { ring, loops: 0 },
    )
}

/// The write end of the ring, handed to the windowing layer (and used
/// by the autodate injector).  Pushes from two producers must not
/// overlap in time; the autodate injector only runs while the
/// keyboard is quiet, which satisfies this.
#[derive(Debug, Clone)]
pub struct KeyProducer {
    ring: Arc<KeyRing>,
}

impl KeyProducer {
    /// Queue one 6-bit key code.  When the ring is full the key is
    /// dropped.
    pub fn push(&self, key: u8) {
        let key_in = self.ring.key_in.load(Ordering::Relaxed);
        let next_in = (key_in + 1) % KEY_BUF_SIZE;
        if next_in != self.ring.key_out.load(Ordering::Acquire) {
            self.ring.slots[key_in].store(key, Ordering::Relaxed);
            self.ring.key_in.store(next_in, Ordering::Release);
        }
    }
}

/// The read end of the ring, owned by the console device.
#[derive(Debug)]
pub struct KeyConsumer {
    ring: Arc<KeyRing>,
    loops: u64,
}

impl KeyConsumer {
    pub fn is_empty(&self) -> bool {
        self.ring.key_in.load(Ordering::Acquire) == self.ring.key_out.load(Ordering::Relaxed)
    }

    /// The next key code, or 0 when nothing is pending or the
    /// throttle holds the key back for another call.
    pub fn get(&mut self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        self.loops += 1;
        if self.loops % 3 != 1 {
            return 0;
        }
        let key_out = self.ring.key_out.load(Ordering::Relaxed);
        let key = self.ring.slots[key_out].load(Ordering::Relaxed);
        self.ring
            .key_out
            .store((key_out + 1) % KEY_BUF_SIZE, Ordering::Release);
        key
    }
}
