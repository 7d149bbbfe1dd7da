//! Proof module: canonical serialization, domain-separated hashing, digests.
//!
//! Depends on the model modules. Nothing in the model depends on `proof`.

pub mod canon;
pub mod digest;
pub mod hash;
pub mod hash_domain;
