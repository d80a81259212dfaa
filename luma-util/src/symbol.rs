//! String interning (`Symbol`).
//!
//! All lexemes that flow through the pipeline — identifiers, keywords,
//! punctuation — are short, repeat constantly, and are compared far more
//! often than they are printed. Interning turns every comparison into an
//! integer comparison and every clone into a `Copy`.
//!
//! The table is a single process-wide [`DashMap`] behind a [`LazyLock`],
//! pre-populated with the language's keywords so they get stable, low
//! indices before any source file is touched.

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

/// An interned string.
///
/// Two symbols are equal iff the strings they were interned from are equal;
/// comparison never touches the backing string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    index: u32,
}

macro_rules! known_symbols {
    ($($konst:ident => $text:literal),+ $(,)?) => {
        known_symbols!(@count 0usize; $($konst => $text),+);

        /// All pre-interned symbols, in declaration order. Their index in
        /// this slice is their `Symbol`'s index.
        const KNOWN: &[&str] = &[$($text),+];
    };
    (@count $n:expr; $konst:ident => $text:literal $(, $rest_konst:ident => $rest_text:literal)*) => {
        pub const $konst: Symbol = Symbol { index: $n as u32 };
        known_symbols!(@count $n + 1usize; $($rest_konst => $rest_text),*);
    };
    (@count $n:expr;) => {};
}

known_symbols! {
    KW_IF => "if",
    KW_ELSE => "else",
    KW_THEN => "then",
    KW_END => "end",
    KW_FN => "fn",
    KW_RETURN => "return",
    KW_LET => "let",
    KW_NIL => "nil",
    KW_TRUE => "true",
    KW_FALSE => "false",
    KW_NOT => "not",
    KW_AND => "and",
    KW_OR => "or",
    KW_CLASS => "class",
    TY_INT => "int",
    TY_FLOAT => "float",
    TY_STRING => "string",
    TY_BOOL => "bool",
    TY_VOID => "void",
    ID_PRINT => "print",
}

/// Number of symbols reserved for [`KNOWN`]; dynamically interned symbols
/// start past this boundary.
const RESERVED_END: u32 = KNOWN.len() as u32;

static TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

struct StringTable {
    by_hash: DashMap<u64, (&'static str, u32)>,
    by_index: DashMap<u32, &'static str>,
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        let table = Self {
            by_hash: DashMap::with_capacity(256),
            by_index: DashMap::with_capacity(256),
            next_index: AtomicU32::new(RESERVED_END),
        };
        for (idx, text) in KNOWN.iter().enumerate() {
            table.insert_at(*text, idx as u32);
        }
        table
    }

    fn insert_at(&self, text: &str, index: u32) {
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        self.by_hash.insert(Self::hash(leaked), (leaked, index));
        self.by_index.insert(index, leaked);
    }

    fn hash(text: &str) -> u64 {
        let mut hasher = AHasher::default();
        text.hash(&mut hasher);
        hasher.finish()
    }

    fn intern(&self, text: &str) -> Symbol {
        let hash = Self::hash(text);
        if let Some(entry) = self.by_hash.get(&hash) {
            if entry.value().0 == text {
                return Symbol { index: entry.value().1 };
            }
        }
        // Hash collision or first sighting: DashMap's entry API keeps this
        // race-free without a global lock.
        match self.by_hash.entry(hash) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if entry.get().0 == text {
                    Symbol { index: entry.get().1 }
                } else {
                    self.insert_via_probe(text, hash)
                }
            },
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
                let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                entry.insert((leaked, index));
                self.by_index.insert(index, leaked);
                Symbol { index }
            },
        }
    }

    /// Linear probing with a golden-ratio offset, used once the primary
    /// hash bucket is occupied by a different string.
    fn insert_via_probe(&self, text: &str, original_hash: u64) -> Symbol {
        const MAX_PROBES: u64 = 32;
        const PROBE_STRIDE: u64 = 0x9e3779b97f4a7c15;

        for i in 1..=MAX_PROBES {
            let probe_hash = original_hash.wrapping_add(i.wrapping_mul(PROBE_STRIDE));
            match self.by_hash.entry(probe_hash) {
                dashmap::mapref::entry::Entry::Occupied(entry) => {
                    if entry.get().0 == text {
                        return Symbol { index: entry.get().1 };
                    }
                },
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
                    let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                    entry.insert((leaked, index));
                    self.by_index.insert(index, leaked);
                    return Symbol { index };
                },
            }
        }

        // Every probe slot within range was occupied by yet another string;
        // fall back to the original bucket rather than loop forever.
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.by_hash.insert(original_hash, (leaked, index));
        self.by_index.insert(index, leaked);
        Symbol { index }
    }

    fn resolve(&self, symbol: Symbol) -> &'static str {
        *self
            .by_index
            .get(&symbol.index)
            .expect("symbol was never interned through this table")
    }
}

impl Symbol {
    /// Intern `text`, returning the symbol for it. Interning the same text
    /// twice, from any thread, returns the same symbol.
    pub fn intern(text: &str) -> Self {
        TABLE.intern(text)
    }

    /// The original string this symbol was interned from.
    pub fn as_str(self) -> &'static str {
        TABLE.resolve(self)
    }

    /// True for the keywords and type names pre-interned at startup.
    pub fn is_known(self) -> bool {
        self.index < RESERVED_END
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_text_yields_the_same_symbol() {
        let a = Symbol::intern("frobnicate");
        let b = Symbol::intern("frobnicate");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_yields_distinct_symbols() {
        assert_ne!(Symbol::intern("alpha"), Symbol::intern("beta"));
    }

    #[test]
    fn known_keywords_are_pre_interned() {
        assert!(KW_FN.is_known());
        assert_eq!(KW_FN.as_str(), "fn");
        assert_eq!(Symbol::intern("fn"), KW_FN);
    }

    #[test]
    fn dynamic_symbols_are_not_known() {
        let sym = Symbol::intern("totally_unique_identifier_xyz");
        assert!(!sym.is_known());
    }

    #[test]
    fn hash_collisions_are_resolved_by_probing_not_aliased() {
        let table = StringTable::new();
        // Plant an unrelated entry at the exact bucket "collision_attacker"
        // would naturally hash to, simulating a genuine hash collision
        // without depending on finding two real colliding inputs.
        let hash = StringTable::hash("collision_attacker");
        table.by_hash.insert(hash, ("planted_other_string", 9999));
        table.by_index.insert(9999, "planted_other_string");

        let sym = table.intern("collision_attacker");
        assert_ne!(sym.index, 9999);
        assert_eq!(table.resolve(sym), "collision_attacker");
        // The planted entry must still resolve to its own text, untouched.
        assert_eq!(table.resolve(Symbol { index: 9999 }), "planted_other_string");
    }

    #[quickcheck_macros::quickcheck]
    fn round_trips_through_as_str(text: String) -> bool {
        if text.is_empty() {
            return true;
        }
        Symbol::intern(&text).as_str() == text.as_str()
    }
}
