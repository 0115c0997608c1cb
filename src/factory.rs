//! @ai:module:intent Single creation point for error bags and items
//! @ai:module:layer application
//! @ai:module:public_api ErrorBagFactoryTrait, ErrorBagFactory
//! @ai:module:depends_on item, stack, pool
//! @ai:module:stateless true

use crate::item::ErrorItem;
use crate::pool::ErrorPool;
use crate::stack::ErrorStack;

/// @ai:intent Trait for creating error bags, so callers can substitute their own
pub trait ErrorBagFactoryTrait: Send + Sync {
    /// @ai:intent Create an empty ordered stack
    fn new_error_stack(&self) -> ErrorStack;

    /// @ai:intent Create an empty keyed pool
    fn new_error_pool(&self) -> ErrorPool;

    /// @ai:intent Create an item carrying only a message; callers add code, data and tags
    fn new_error_item(&self, message: &str) -> ErrorItem;
}

/// @ai:intent Default factory backed by the concrete constructors
#[derive(Debug, Clone, Copy)]
pub struct ErrorBagFactory;

impl ErrorBagFactory {
    /// @ai:intent Create a new factory
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for ErrorBagFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorBagFactoryTrait for ErrorBagFactory {
    fn new_error_stack(&self) -> ErrorStack {
        ErrorStack::new()
    }

    fn new_error_pool(&self) -> ErrorPool {
        ErrorPool::new()
    }

    fn new_error_item(&self, message: &str) -> ErrorItem {
        ErrorItem::new(message)
    }
}
