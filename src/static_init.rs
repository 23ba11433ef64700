//! Link-time initializer declarations.
//!
//! [`initializer!`](crate::initializer!) declares an initializer from any
//! crate in the final binary, without code that runs at startup to register
//! it. The process-wide [`registry`](crate::registry) picks up every declared
//! initializer when it is first accessed.

use crate::failure::InitError;
use crate::initializer::{InitializerEntry, Priority};
use crate::registry::InitRegistrant;

/// A statically declared initializer. Created by [`initializer!`](crate::initializer!).
pub struct StaticInitializer {
    name: &'static str,
    priority: Priority,
    init: fn() -> Result<(), InitError>,
}

impl StaticInitializer {
    #[doc(hidden)]
    pub const fn new(
        name: &'static str,
        priority: Priority,
        init: fn() -> Result<(), InitError>,
    ) -> Self {
        Self {
            name,
            priority,
            init,
        }
    }

    fn entry(&self) -> InitializerEntry {
        InitializerEntry::new(self.init)
            .name(self.name)
            .priority(self.priority.get())
    }
}

inventory::collect!(StaticInitializer);

/// Registers every statically declared initializer with `registry`.
///
/// Link order decides the relative order of declarations, so declarations
/// with equal priority run in an unspecified order.
pub(crate) fn absorb(registry: &impl InitRegistrant) -> usize {
    let mut count = 0;
    for decl in inventory::iter::<StaticInitializer> {
        registry.register_entry(decl.entry());
        count += 1;
    }
    count
}

/// Declares an initializer for the process-wide [`registry`](crate::registry).
///
/// The initializer is a function or non-capturing closure returning
/// `Result<(), InitError>`. Without a priority it runs after every prioritized
/// initializer.
///
/// # Examples
///
/// ```rust,standalone_crate
/// use initall::InitError;
///
/// initall::initializer!(olives, priority: 10, || Err(InitError::msg("olives failed")));
/// initall::initializer!(wine, || Ok(()));
/// ```
#[macro_export]
macro_rules! initializer {
    ($name:ident, priority: $priority:expr, $init:expr $(,)?) => {
        $crate::__private::inventory::submit! {
            $crate::StaticInitializer::new(
                ::core::stringify!($name),
                $crate::Priority::new($priority),
                $init,
            )
        }
    };
    ($name:ident, $init:expr $(,)?) => {
        $crate::__private::inventory::submit! {
            $crate::StaticInitializer::new(
                ::core::stringify!($name),
                $crate::Priority::LOWEST,
                $init,
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::registry::{InitAllOnce, PriorityRegistry};

    #[test]
    fn test_entry_carries_declaration() {
        let decl = StaticInitializer::new("figs", Priority::new(5), || {
            Err(InitError::msg("figs failed"))
        });
        let entry = decl.entry();
        assert_eq!(entry.label(), "figs");
        assert_eq!(entry.rank(), Priority::new(5));
    }

    #[test]
    fn test_absorb_without_declarations() {
        let registry = PriorityRegistry::with_config(RegistryConfig::default());
        assert_eq!(absorb(&registry), 0);
        assert!(registry.run_all_once().is_empty());
    }
}
