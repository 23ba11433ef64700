//! Opaque failure values produced by initializers.
//!
//! The registry never looks inside a failure. It only stores it, hands clones
//! back to callers and answers matching queries, so [`InitError`] is a shared,
//! type-erased handle around whatever error the initializer returned.

use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::Error;

/// A failure returned by an initializer.
///
/// Cloning an `InitError` shares the underlying error value, so every clone
/// handed out by [`errors`](crate::InitAllOnce::errors) refers to the same
/// failure and [`ptr_eq`](Self::ptr_eq) holds between them.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into an
/// `InitError`, which lets initializers use `?` on their own error types.
#[derive(Clone)]
pub struct InitError(Arc<dyn StdError + Send + Sync + 'static>);

impl InitError {
    /// Wraps an error value.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Creates a failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Error::Message(message.into()))
    }

    /// Wraps an already boxed error.
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self(Arc::from(err))
    }

    /// Wraps this failure in a new one that displays `message` and reports
    /// this failure as its [`source`](StdError::source).
    ///
    /// The wrapped handle stays reachable for [`wraps`](Self::wraps), so a
    /// shared sentinel failure can be annotated without losing its identity.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::new(Context {
            message: message.into(),
            source: self,
        })
    }

    /// Iterates the wrapped error followed by each of its transitive sources.
    pub fn chain(&self) -> Chain<'_> {
        let err: &(dyn StdError + 'static) = &*self.0;
        Chain { next: Some(err) }
    }

    /// Returns true when any error in the [`chain`](Self::chain) is an `E`
    /// equal to `target`.
    ///
    /// ```
    /// use initall::InitError;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Spoiled(&'static str);
    ///
    /// impl std::fmt::Display for Spoiled {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         write!(f, "{} spoiled", self.0)
    ///     }
    /// }
    ///
    /// impl std::error::Error for Spoiled {}
    ///
    /// let err = InitError::new(Spoiled("figs"));
    /// assert!(err.is(&Spoiled("figs")));
    /// assert!(!err.is(&Spoiled("olives")));
    /// ```
    pub fn is<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        self.chain()
            .any(|err| err.downcast_ref::<E>().is_some_and(|err| err == target))
    }

    /// Returns the first error of type `E` in the [`chain`](Self::chain).
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.chain().find_map(|err| err.downcast_ref::<E>())
    }

    /// Returns true when both handles refer to the same failure value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// Returns true when `target` is this failure or any error in its
    /// [`chain`](Self::chain), compared by identity.
    ///
    /// ```
    /// use initall::InitError;
    ///
    /// let olives = InitError::msg("olives failed");
    /// let wrapped = olives.clone().context("loading pantry");
    /// assert!(wrapped.wraps(&olives));
    /// assert!(!wrapped.wraps(&InitError::msg("olives failed")));
    /// ```
    pub fn wraps(&self, target: &Self) -> bool {
        let target = Arc::as_ptr(&target.0);
        self.chain()
            .any(|err| std::ptr::addr_eq(err as *const dyn StdError, target))
    }
}

/// Handles are equal when they share one failure value.
impl PartialEq for InitError {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for InitError {}

impl<E> From<E> for InitError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl Deref for InitError {
    type Target = dyn StdError + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug)]
struct Context {
    message: String,
    source: InitError,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Context {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let err: &(dyn StdError + 'static) = &*self.source.0;
        Some(err)
    }
}

/// Iterator over an [`InitError`] and its sources, outermost first.
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0} failed")]
    struct Crop(&'static str);

    #[derive(Debug, thiserror::Error)]
    #[error("harvest aborted")]
    struct Harvest(#[source] Crop);

    #[derive(Debug, thiserror::Error)]
    #[error("season lost")]
    struct Season(#[source] Harvest);

    #[test]
    fn test_is_matches_structurally() {
        let err = InitError::new(Crop("olives"));
        assert!(err.is(&Crop("olives")));
        assert!(!err.is(&Crop("figs")));
    }

    #[test]
    fn test_is_unwraps_transitively() {
        let err = InitError::new(Season(Harvest(Crop("figs"))));
        assert!(err.is(&Crop("figs")));
        assert!(!err.is(&Crop("wine")));
        assert_eq!(err.chain().count(), 3);
    }

    #[test]
    fn test_downcast_ref_finds_inner_error() {
        let err = InitError::new(Harvest(Crop("olives")));
        assert_eq!(err.downcast_ref::<Crop>(), Some(&Crop("olives")));
        assert!(err.downcast_ref::<Season>().is_none());
    }

    #[test]
    fn test_clones_share_identity() {
        let err = InitError::msg("olives failed");
        let clone = err.clone();
        assert!(err.ptr_eq(&clone));
        assert!(!err.ptr_eq(&InitError::msg("olives failed")));
    }

    #[test]
    fn test_display_and_source_pass_through() {
        let err: InitError = Harvest(Crop("wine")).into();
        assert_eq!(err.to_string(), "harvest aborted");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("wine failed"));
    }

    #[test]
    fn test_message_failures_match_structurally() {
        let err = InitError::msg("olives failed");
        assert!(err.is(&Error::Message("olives failed".into())));
        assert!(!err.is(&Error::Message("figs failed".into())));
    }

    #[test]
    fn test_wraps_matches_identity_through_context() {
        let olives = InitError::msg("olives failed");
        let wrapped = olives.clone().context("pantry").context("startup");
        assert_eq!(wrapped.to_string(), "startup");
        assert_eq!(wrapped.chain().count(), 3);
        assert!(wrapped.wraps(&olives));
        assert!(olives.wraps(&olives));
        assert!(!olives.wraps(&wrapped));
        assert!(!wrapped.wraps(&InitError::msg("olives failed")));
        assert!(wrapped.is(&Error::Message("olives failed".into())));
    }

    #[test]
    fn test_equality_is_identity() {
        let err = InitError::new(Crop("figs"));
        assert_eq!(err, err.clone());
        assert_ne!(err, InitError::new(Crop("figs")));
    }

    #[test]
    fn test_from_boxed() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(Crop("figs"));
        let err = InitError::from_boxed(boxed);
        assert!(err.is(&Crop("figs")));
    }
}
