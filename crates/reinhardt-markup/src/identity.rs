//! Identity tokens for markup nodes.
//!
//! A node carries two tokens: a stable `uid` naming the physical slot it
//! occupies across renders, and a volatile `hash` that changes whenever the
//! rendered output of its subtree may have changed.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of a generated uid.
pub const UID_LEN: usize = 8;

/// Length of a generated hash.
pub const HASH_LEN: usize = 10;

/// Generates a random alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(len)
		.map(char::from)
		.collect()
}

/// Generates a new uid.
pub fn new_uid() -> String {
	random_token(UID_LEN)
}

/// Generates a new hash.
pub fn new_hash() -> String {
	random_token(HASH_LEN)
}

/// Generates a hash guaranteed to differ from `previous`.
pub fn fresh_hash(previous: &str) -> String {
	loop {
		let hash = new_hash();
		if hash != previous {
			return hash;
		}
	}
}

/// Builds the selector used to address a node by identity.
pub fn selector_for(tag: &str, uid: &str) -> String {
	format!("{}[uid='{}']", tag.to_lowercase(), uid)
}
