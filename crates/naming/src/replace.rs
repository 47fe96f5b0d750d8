//! Disambiguation strategies
//!
//! A strategy turns a base name and an index (starting at 1) into a
//! candidate output name. Strategies must be injective in the index,
//! otherwise the allocator can only give up with
//! [`Error::AllocationExhausted`](crate::Error::AllocationExhausted).

/// Strategy used to synthesize a disambiguated name
pub trait Replace: Send + Sync {
    /// Build the name for `base` at disambiguation `index`
    fn replace(&self, base: &str, index: u32) -> String;
}

impl<F> Replace for F
where
    F: Fn(&str, u32) -> String + Send + Sync,
{
    fn replace(&self, base: &str, index: u32) -> String {
        self(base, index)
    }
}

/// `Name(1)`, `Name(2)`, ...
pub fn default_replace(base: &str, index: u32) -> String {
    format!("{base}({index})")
}

/// `Name_1`, `Name_2`, ... (valid as a block identifier)
pub fn resource_name(base: &str, index: u32) -> String {
    format!("{base}_{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_replace() {
        assert_eq!(default_replace("Monitor", 1), "Monitor(1)");
        assert_eq!(default_replace("", 3), "(3)");
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("Monitor", 2), "Monitor_2");
    }

    #[test]
    fn test_closure_is_a_strategy() {
        let strategy = |base: &str, index: u32| format!("{base}-v{index}");
        assert_eq!(strategy.replace("app", 4), "app-v4");
    }
}
