//! Unique name allocation
//!
//! [`NameAllocator`] hands out one name per call to [`NameAllocator::next`]
//! and guarantees that no name is handed out twice. Collisions are detected
//! case-insensitively; the casing of the first request is kept in the
//! returned name.

use crate::error::{Error, Result};
use crate::replace::{Replace, default_replace};
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Default upper bound for the disambiguation loop
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// `Monitor_Name_1` → `Monitor_Name`
static SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)_\d*$").expect("suffix pattern is valid"));

/// Strip a trailing `_<digits>` disambiguation suffix.
///
/// Returns the candidate unchanged when there is no suffix or when
/// stripping it would leave nothing.
pub fn base_name(candidate: &str) -> &str {
    SUFFIX
        .captures(candidate)
        .and_then(|caps| caps.get(1))
        .map(|stem| stem.as_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(candidate)
}

#[derive(Debug, Default)]
struct State {
    /// lower-cased base name -> last index handed out
    counts: HashMap<String, u32>,
    /// full names that must not be returned again
    reserved: HashSet<String>,
    /// full names whose content has been written
    emitted: HashSet<String>,
}

/// Registry of names allocated during one export run.
///
/// All operations take `&self` and serialize on a single lock, so one
/// allocator can be shared between worker threads.
///
/// # Example
///
/// ```
/// use naming::{NameAllocator, resource_name};
///
/// let names = NameAllocator::new().with_replace(resource_name);
/// assert_eq!(names.next("Host").unwrap(), "Host");
/// assert_eq!(names.next("host").unwrap(), "host_1");
/// assert_eq!(names.next("Host_7").unwrap(), "Host_2");
/// ```
pub struct NameAllocator {
    state: Mutex<State>,
    replace: Box<dyn Replace>,
    max_attempts: u32,
}

impl NameAllocator {
    /// Create an empty allocator using [`default_replace`]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            replace: Box::new(default_replace),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Use a different disambiguation strategy
    pub fn with_replace(mut self, replace: impl Replace + 'static) -> Self {
        self.replace = Box::new(replace);
        self
    }

    /// Swap the disambiguation strategy in place
    pub fn set_replace(&mut self, replace: impl Replace + 'static) -> &mut Self {
        self.replace = Box::new(replace);
        self
    }

    /// Bound the number of suffixed candidates tried per call
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Allocate a unique name for `candidate`.
    ///
    /// The first request for a base name returns it unchanged. Later
    /// requests (compared case-insensitively) get a suffix from the
    /// configured strategy, skipping any name that is already reserved.
    pub fn next(&self, candidate: &str) -> Result<String> {
        let base = base_name(candidate);

        let mut guard = self.lock();
        let State {
            counts, reserved, ..
        } = &mut *guard;

        let count = match counts.entry(base.to_lowercase()) {
            Entry::Vacant(slot) => {
                let count = slot.insert(0);
                if reserved.insert(base.to_string()) {
                    return Ok(base.to_string());
                }
                log::debug!("'{base}' is blocked, disambiguating on first use");
                count
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        for _ in 0..self.max_attempts {
            let Some(index) = count.checked_add(1) else {
                break;
            };
            *count = index;

            let name = self.replace.replace(base, index);
            if reserved.insert(name.clone()) {
                return Ok(name);
            }
            log::trace!("'{name}' already reserved, trying next index");
        }

        Err(Error::AllocationExhausted {
            base: base.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Reserve `name` so that [`next`](Self::next) never returns it.
    pub fn block(&self, name: &str) {
        self.lock().reserved.insert(name.to_string());
    }

    /// Record that content for `name` has been written.
    ///
    /// Returns `true` if it had already been recorded, i.e. this is a
    /// duplicate write.
    pub fn mark_emitted(&self, name: &str) -> bool {
        !self.lock().emitted.insert(name.to_string())
    }

    /// Whether `name` has been returned or blocked
    pub fn is_reserved(&self, name: &str) -> bool {
        self.lock().reserved.contains(name)
    }

    /// Whether `name` has been marked as emitted
    pub fn is_emitted(&self, name: &str) -> bool {
        self.lock().emitted.contains(name)
    }

    /// Number of reserved names
    pub fn len(&self) -> usize {
        self.lock().reserved.len()
    }

    /// Check if nothing has been reserved yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every operation leaves the maps consistent, so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("NameAllocator")
            .field("bases", &state.counts.len())
            .field("reserved", &state.reserved.len())
            .field("emitted", &state.emitted.len())
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replace::resource_name;
    use std::sync::Arc;

    #[test]
    fn test_base_name_strips_suffix() {
        assert_eq!(base_name("Host_1"), "Host");
        assert_eq!(base_name("Monitor_Name_1"), "Monitor_Name");
        assert_eq!(base_name("Host_42"), "Host");
        assert_eq!(base_name("Host_"), "Host");
    }

    #[test]
    fn test_base_name_keeps_unsuffixed() {
        assert_eq!(base_name("Host"), "Host");
        assert_eq!(base_name("Monitor_Name"), "Monitor_Name");
        assert_eq!(base_name("Host_1a"), "Host_1a");
        assert_eq!(base_name("_1"), "_1");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn test_first_use_is_unsuffixed() {
        let names = NameAllocator::new();
        assert_eq!(names.next("Monitor").unwrap(), "Monitor");
        assert_eq!(names.next("Dashboard").unwrap(), "Dashboard");
    }

    #[test]
    fn test_repeated_names_get_suffixes() {
        let names = NameAllocator::new();
        assert_eq!(names.next("Monitor").unwrap(), "Monitor");
        assert_eq!(names.next("Monitor").unwrap(), "Monitor(1)");
        assert_eq!(names.next("Monitor").unwrap(), "Monitor(2)");
    }

    #[test]
    fn test_case_insensitive_collision() {
        let names = NameAllocator::new();
        let first = names.next("Foo").unwrap();
        let second = names.next("foo").unwrap();
        assert_eq!(first, "Foo");
        assert_eq!(second, "foo(1)");
        assert_ne!(first, second);
    }

    #[test]
    fn test_stem_stripping_counts_as_same_base() {
        let names = NameAllocator::new();
        assert_eq!(names.next("Host_1").unwrap(), "Host");
        assert_eq!(names.next("Host").unwrap(), "Host(1)");
        assert_eq!(names.next("Host_3").unwrap(), "Host(2)");
    }

    #[test]
    fn test_resource_name_strategy() {
        let names = NameAllocator::new().with_replace(resource_name);
        assert_eq!(names.next("Host").unwrap(), "Host");
        assert_eq!(names.next("Host").unwrap(), "Host_1");
        // A suffixed name coming back is folded onto its stem
        assert_eq!(names.next("Host_1").unwrap(), "Host_2");
    }

    #[test]
    fn test_set_replace_is_fluent() {
        let mut names = NameAllocator::new();
        names.set_replace(|base: &str, index: u32| format!("{base}-{index}"));
        names.next("a").unwrap();
        assert_eq!(names.next("a").unwrap(), "a-1");
    }

    #[test]
    fn test_block_then_next_disambiguates() {
        let names = NameAllocator::new();
        names.block("X");
        let name = names.next("X").unwrap();
        assert_ne!(name, "X");
        assert_eq!(name, "X(1)");
    }

    #[test]
    fn test_skips_reserved_suffixes() {
        let names = NameAllocator::new();
        names.block("Job(1)");
        names.block("Job(2)");
        assert_eq!(names.next("Job").unwrap(), "Job");
        assert_eq!(names.next("Job").unwrap(), "Job(3)");
    }

    #[test]
    fn test_literal_suffix_candidate_does_not_collide() {
        let names = NameAllocator::new();
        assert_eq!(names.next("Job(1)").unwrap(), "Job(1)");
        assert_eq!(names.next("Job").unwrap(), "Job");
        assert_eq!(names.next("Job").unwrap(), "Job(2)");
    }

    #[test]
    fn test_empty_candidate() {
        let names = NameAllocator::new();
        assert_eq!(names.next("").unwrap(), "");
        assert_eq!(names.next("").unwrap(), "(1)");
        assert_eq!(names.next("").unwrap(), "(2)");
    }

    #[test]
    fn test_all_names_distinct() {
        let names = NameAllocator::new();
        let candidates = [
            "a", "A", "a_1", "a(1)", "b", "a", "B_2", "b", "", "", "a_", "A_9",
        ];
        let mut seen = HashSet::new();
        for candidate in candidates {
            let name = names.next(candidate).unwrap();
            assert!(seen.insert(name.clone()), "duplicate name {name}");
        }
        assert_eq!(names.len(), candidates.len());
    }

    #[test]
    fn test_mark_emitted() {
        let names = NameAllocator::new();
        assert!(!names.mark_emitted("X"));
        assert!(names.mark_emitted("X"));
        assert!(names.mark_emitted("X"));
        assert!(names.is_emitted("X"));
        assert!(!names.is_emitted("Y"));
    }

    #[test]
    fn test_emitted_is_independent_of_reserved() {
        let names = NameAllocator::new();
        let name = names.next("Disk").unwrap();
        assert!(names.is_reserved(&name));
        assert!(!names.is_emitted(&name));
        assert!(!names.mark_emitted(&name));
        assert!(names.is_emitted(&name));
    }

    #[test]
    fn test_allocation_exhausted() {
        let names = NameAllocator::new()
            .with_replace(|_: &str, _: u32| "same".to_string())
            .with_max_attempts(5);
        assert_eq!(names.next("x").unwrap(), "x");
        assert_eq!(names.next("x").unwrap(), "same");

        let err = names.next("x").unwrap_err();
        match err {
            Error::AllocationExhausted { base, attempts } => {
                assert_eq!(base, "x");
                assert_eq!(attempts, 5);
            }
        }
    }

    #[test]
    fn test_concurrent_next_never_duplicates() {
        let names = Arc::new(NameAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let names = Arc::clone(&names);
                std::thread::spawn(move || {
                    (0..200)
                        .map(|i| {
                            let candidate = if i % 2 == 0 { "Shared" } else { "shared" };
                            names.next(candidate).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(seen.insert(name.clone()), "duplicate name {name}");
            }
        }
        assert_eq!(seen.len(), 8 * 200);
    }

    #[test]
    fn test_independent_allocators() {
        let first = NameAllocator::new();
        let second = NameAllocator::new();
        assert_eq!(first.next("Same").unwrap(), "Same");
        assert_eq!(second.next("Same").unwrap(), "Same");
    }
}
