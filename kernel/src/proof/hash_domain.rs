//! Typed domain separators for canonical hashing.
//!
//! Every hash computation selects a domain via [`HashDomain`]. This module is
//! the single authority for domain-separator byte strings; the enum,
//! `as_bytes()`, `ALL`, and `Display` come from one macro invocation.

macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used
        /// as a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    // Problem identity

    /// Canonical `(graph, palette)` problem form.
    Problem => b"CHROMA::PROBLEM::V1\0",

    // Search trace

    /// Canonical JSON of a full trace event list.
    TraceEvents => b"CHROMA::TRACE_EVENTS::V1\0",

    /// Trace tape header hashing (chain seed).
    TraceTape => b"CHROMA::TRACE_TAPE::V1\0",

    /// Trace tape chain step hashing.
    TraceTapeChain => b"CHROMA::TRACE_TAPE_CHAIN::V1\0",

    // Service

    /// Canonical response body hashing (cross-process comparison).
    Response => b"CHROMA::RESPONSE::V1\0",

    // Benchmarks

    /// Benchmark determinism guard.
    BenchGuard => b"CHROMA::BENCH_GUARD::V1\0",
}
