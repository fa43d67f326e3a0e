//! Fail-fast wrappers over the standard collections' fallible reservations.
//!
//! `Vec::with_capacity` and friends already abort on exhaustion, but through
//! the standard library's handler and without naming the request. These
//! helpers go through `try_reserve_exact` and route failure to
//! [`fail_fast`] with the default configuration instead.

use crate::config::FailFastConfig;
use crate::error::AllocError;
use crate::failure::fail_fast;

/// Copy `s` into a freshly allocated `String` of exactly `s.len()` capacity.
pub fn string_from(s: &str) -> String {
    let mut out = String::new();
    reserve_string(&mut out, s.len());
    out.push_str(s);
    out
}

/// Reserve room for exactly `additional` more bytes in `s`.
pub fn reserve_string(s: &mut String, additional: usize) {
    if let Err(err) = s.try_reserve_exact(additional) {
        fail_fast(
            &AllocError::from_reserve::<u8>(err, s.len(), additional),
            &FailFastConfig::DEFAULT,
        );
    }
}

/// An empty `Vec` with room for exactly `capacity` elements.
pub fn vec_with_capacity<T>(capacity: usize) -> Vec<T> {
    let mut v = Vec::new();
    reserve_vec(&mut v, capacity);
    v
}

/// Reserve room for exactly `additional` more elements in `v`.
pub fn reserve_vec<T>(v: &mut Vec<T>, additional: usize) {
    if let Err(err) = v.try_reserve_exact(additional) {
        fail_fast(
            &AllocError::from_reserve::<T>(err, v.len(), additional),
            &FailFastConfig::DEFAULT,
        );
    }
}
