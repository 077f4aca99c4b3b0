use std::thread;

use super::*;

#[test]
fn test_checkout_reuses_idle_instance() {
	let pool: Pool<EncoderState> = Pool::new(4);
	{
		let mut state = pool.checkout(1);
		state.buf.extend_from_slice(b"abc");
	}
	assert_eq!(pool.idle(), 1);

	let state = pool.checkout(1);
	assert!(state.buf.is_empty());
	assert_eq!(state.generation(), 1);
	assert_eq!(pool.created(), 1);
}

#[test]
fn test_stale_generation_is_discarded() {
	let pool: Pool<DecoderState> = Pool::new(4);
	drop(pool.checkout(1));
	assert_eq!(pool.idle(), 1);

	let state = pool.checkout(2);
	assert_eq!(state.generation(), 2);
	assert_eq!(pool.created(), 2);
	drop(state);
	assert_eq!(pool.idle(), 1);
}

#[test]
fn test_capacity_bounds_idle_instances() {
	let pool: Pool<EncoderState> = Pool::new(2);
	let held: Vec<_> = (0..5).map(|_| pool.checkout(7)).collect();
	assert_eq!(pool.created(), 5);
	drop(held);
	assert_eq!(pool.idle(), 2);
}

#[test]
fn test_instance_returns_on_panic() {
	let pool: Pool<EncoderState> = Pool::new(2);
	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
		let _state = pool.checkout(1);
		panic!("operation failed");
	}));
	assert!(result.is_err());
	assert_eq!(pool.idle(), 1);
}

#[test]
fn test_large_buffers_are_released() {
	let pool: Pool<EncoderState> = Pool::new(1);
	{
		let mut state = pool.checkout(1);
		state.buf.resize(RETAIN_LIMIT * 2, 0);
	}
	assert_eq!(pool.checkout(1).buf.capacity(), 0);
}

#[test]
fn test_concurrent_checkouts_never_share() {
	let pool: Pool<EncoderState> = Pool::new(8);
	thread::scope(|s| {
		for t in 0..8u8 {
			let pool = &pool;
			s.spawn(move || {
				for _ in 0..200 {
					let mut state = pool.checkout(1);
					assert!(state.buf.is_empty());
					state.buf.push(t);
					assert_eq!(state.buf, [t]);
				}
			});
		}
	});
	assert!(pool.created() <= 8);
	assert!(pool.idle() <= 8);
}
