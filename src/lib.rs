//! @ai:module:intent Collect, group and report multiple errors, then escalate them into one raisable error
//! @ai:module:layer domain
//! @ai:module:public_api config, error, factory, item, output, pool, stack, throwable
//! @ai:module:stateless true
//!
//! # errorbag
//!
//! Error bags accumulate recoverable errors instead of failing on the first one. An
//! [`ErrorStack`] keeps items in detection order, an [`ErrorPool`] groups stacks by subject
//! (for example one stack per form field). When the caller decides to stop, the bag escalates
//! into a [`ThrowableError`] that records the call site, the cause chain and any payload.
//!
//! ## Example
//!
//! ```rust
//! use errorbag::{output, BagConfig, ErrorBagFactory, ErrorBagFactoryTrait, ThrowableError};
//!
//! fn validate(name: &str, age: i64) -> Result<(), ThrowableError> {
//!     let factory = ErrorBagFactory::new();
//!     let mut pool = factory.new_error_pool();
//!
//!     if name.is_empty() {
//!         pool.push("name", factory.new_error_item("name is required"));
//!     }
//!     if age < 0 {
//!         pool.push("age", factory.new_error_item("age must not be negative").with_code(400));
//!     }
//!
//!     if pool.is_empty() {
//!         return Ok(());
//!     }
//!     println!("{}", output::format_pool(&pool, &BagConfig::default().report));
//!     Err(pool.into_throwable())
//! }
//!
//! let err = validate("", -1).unwrap_err();
//! assert_eq!(err.message(), "2 errors collected in 2 subjects");
//!
//! let raised = errorbag::throwable!(err, "signup rejected", 422);
//! assert_eq!(raised.code(), 422);
//! assert!(raised.cause().is_some());
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod item;
pub mod output;
pub mod pool;
pub mod stack;
pub mod throwable;

pub use config::{BagConfig, ReportConfig, ThrowableConfig};
pub use error::{Error, Result};
pub use factory::{ErrorBagFactory, ErrorBagFactoryTrait};
pub use item::{ErrorCode, ErrorData, ErrorItem};
pub use output::{format_pool, format_stack, format_throwable, to_json, OutputFormat};
pub use pool::ErrorPool;
pub use stack::ErrorStack;
pub use throwable::{
    CauseReport, MessageObject, ThrowableAdapter, ThrowableArg, ThrowableError, ThrowableReport,
    FALLBACK_MESSAGE,
};
