//! Bounded pools of per-operation scratch state.
//!
//! Each pooled instance is bound to the ruleset generation it was created for. Checkout skips and
//! drops idle instances from older generations, so a caller never works with scratch state left
//! over from a superseded ruleset. Instances return to the pool when their guard drops, on every
//! exit path.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

/// Scratch buffers above this size are released instead of being kept idle.
const RETAIN_LIMIT: usize = 64 * 1024;

/// State that can live in a [`Pool`].
pub trait Pooled: Default + Send {
	fn bind(&mut self, generation: u64);

	fn generation(&self) -> u64;

	/// Clears per-operation data before the instance goes idle.
	fn reset(&mut self);
}

/// Encoder scratch: the canonical bytes of the record being written.
#[derive(Debug, Default)]
pub struct EncoderState {
	generation: u64,
	pub(crate) buf: Vec<u8>,
}

/// Decoder scratch: the raw bytes of the record being read, kept for strict decoding.
#[derive(Debug, Default)]
pub struct DecoderState {
	generation: u64,
	pub(crate) raw: Vec<u8>,
	pub(crate) canonical: Vec<u8>,
}

impl Pooled for EncoderState {
	fn bind(&mut self, generation: u64) {
		self.generation = generation;
	}

	fn generation(&self) -> u64 {
		self.generation
	}

	fn reset(&mut self) {
		release(&mut self.buf);
	}
}

impl Pooled for DecoderState {
	fn bind(&mut self, generation: u64) {
		self.generation = generation;
	}

	fn generation(&self) -> u64 {
		self.generation
	}

	fn reset(&mut self) {
		release(&mut self.raw);
		release(&mut self.canonical);
	}
}

fn release(buf: &mut Vec<u8>) {
	if buf.capacity() > RETAIN_LIMIT {
		*buf = Vec::new();
	} else {
		buf.clear();
	}
}

pub struct Pool<S> {
	idle: Mutex<Vec<S>>,
	capacity: usize,
	created: AtomicUsize,
}

impl<S: Pooled> Pool<S> {
	pub fn new(capacity: usize) -> Self {
		Self {
			idle: Mutex::new(Vec::with_capacity(capacity)),
			capacity,
			created: AtomicUsize::new(0),
		}
	}

	/// Checks out an instance bound to `generation`, creating one when none is idle.
	pub fn checkout(&self, generation: u64) -> PoolGuard<'_, S> {
		let reused = {
			let mut idle = self.idle.lock();
			let mut found = None;
			while let Some(state) = idle.pop() {
				if state.generation() == generation {
					found = Some(state);
					break;
				}
				tracing::trace!(
					stale = state.generation(),
					current = generation,
					"discarding stale pooled instance"
				);
			}
			found
		};

		let state = match reused {
			Some(state) => state,
			None => {
				let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
				tracing::debug!(generation, total, "created pooled instance");
				let mut state = S::default();
				state.bind(generation);
				state
			}
		};

		PoolGuard { pool: self, state }
	}

	/// Instances created over the pool's lifetime.
	pub fn created(&self) -> usize {
		self.created.load(Ordering::Relaxed)
	}

	pub fn idle(&self) -> usize {
		self.idle.lock().len()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn give_back(&self, mut state: S) {
		state.reset();
		let mut idle = self.idle.lock();
		if idle.len() < self.capacity {
			idle.push(state);
		}
	}
}

impl<S> std::fmt::Debug for Pool<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Pool")
			.field("capacity", &self.capacity)
			.field("created", &self.created.load(Ordering::Relaxed))
			.finish_non_exhaustive()
	}
}

/// Exclusive checkout of one pooled instance.
pub struct PoolGuard<'a, S: Pooled> {
	pool: &'a Pool<S>,
	state: S,
}

impl<S: Pooled> Deref for PoolGuard<'_, S> {
	type Target = S;

	fn deref(&self) -> &S {
		&self.state
	}
}

impl<S: Pooled> DerefMut for PoolGuard<'_, S> {
	fn deref_mut(&mut self) -> &mut S {
		&mut self.state
	}
}

impl<S: Pooled> Drop for PoolGuard<'_, S> {
	fn drop(&mut self) {
		let state = std::mem::take(&mut self.state);
		self.pool.give_back(state);
	}
}

#[cfg(test)]
mod tests;
