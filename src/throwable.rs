//! @ai:module:intent Normalize heterogeneous error-like inputs into one raisable error
//! @ai:module:layer domain
//! @ai:module:public_api ThrowableError, ThrowableArg, ThrowableAdapter, MessageObject, ThrowableReport, CauseReport
//! @ai:module:depends_on item, config
//! @ai:module:stateless true

use crate::config::ThrowableConfig;
use crate::item::{ErrorCode, ErrorData, ErrorItem};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use thiserror::Error;

/// Message used when no argument yields a usable message.
pub const FALLBACK_MESSAGE: &str = "Unknown error";

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// @ai:intent Something that renders its own message and may carry its own data
pub trait MessageObject: fmt::Debug + Send + Sync {
    /// @ai:intent Render the message text
    fn render(&self) -> String;

    /// @ai:intent Structured data belonging to the message
    fn data(&self) -> Option<&ErrorData> {
        None
    }
}

/// @ai:intent One error-like input to the adapter, tagged by shape
#[derive(Debug)]
pub enum ThrowableArg {
    Message(String),
    Code(i64),
    Cause(BoxedCause),
    Data(ErrorData),
    Object(Arc<dyn MessageObject>),
    /// Shape decided at classification time.
    Value(Value),
}

impl ThrowableArg {
    /// @ai:intent Wrap any error as the cause of the raised error
    pub fn cause<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Cause(Box::new(err))
    }

    /// @ai:intent Wrap a message object
    pub fn object<M>(object: M) -> Self
    where
        M: MessageObject + 'static,
    {
        Self::Object(Arc::new(object))
    }

    /// @ai:intent Turn a dynamic JSON value into the narrowest typed shape
    fn reshape(self) -> Self {
        match self {
            Self::Value(Value::String(message)) => Self::Message(message),
            Self::Value(Value::Number(number)) if number.is_i64() => {
                Self::Code(number.as_i64().unwrap_or_default())
            }
            Self::Value(Value::Object(data)) => Self::Data(data),
            other => other,
        }
    }

    /// @ai:intent Render the argument as JSON for storage under a generic key
    fn into_value(self) -> Value {
        match self {
            Self::Message(message) => Value::String(message),
            Self::Code(code) => Value::from(code),
            Self::Cause(cause) => Value::String(cause.to_string()),
            Self::Data(data) => Value::Object(data),
            Self::Object(object) => Value::String(object.render()),
            Self::Value(value) => value,
        }
    }
}

impl From<&str> for ThrowableArg {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for ThrowableArg {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<i64> for ThrowableArg {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

impl From<i32> for ThrowableArg {
    fn from(code: i32) -> Self {
        Self::Code(code.into())
    }
}

impl From<u32> for ThrowableArg {
    fn from(code: u32) -> Self {
        Self::Code(code.into())
    }
}

impl From<u64> for ThrowableArg {
    fn from(code: u64) -> Self {
        match i64::try_from(code) {
            Ok(code) => Self::Code(code),
            Err(_) => Self::Value(Value::from(code)),
        }
    }
}

impl From<usize> for ThrowableArg {
    fn from(code: usize) -> Self {
        match i64::try_from(code) {
            Ok(code) => Self::Code(code),
            Err(_) => Self::Value(Value::from(code)),
        }
    }
}

impl From<ErrorData> for ThrowableArg {
    fn from(data: ErrorData) -> Self {
        Self::Data(data)
    }
}

impl From<Value> for ThrowableArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<ThrowableError> for ThrowableArg {
    fn from(err: ThrowableError) -> Self {
        Self::cause(err)
    }
}

impl From<std::io::Error> for ThrowableArg {
    fn from(err: std::io::Error) -> Self {
        Self::cause(err)
    }
}

impl From<Arc<dyn MessageObject>> for ThrowableArg {
    fn from(object: Arc<dyn MessageObject>) -> Self {
        Self::Object(object)
    }
}

/// @ai:intent Raised error with normalized fields and the call site that built it
/// @ai:invariant message is never empty
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ThrowableError {
    message: String,
    code: i64,
    source_file: &'static str,
    source_line: u32,
    source_column: u32,
    #[source]
    cause: Option<BoxedCause>,
    message_data: Option<ErrorData>,
    message_object: Option<Arc<dyn MessageObject>>,
}

impl ThrowableError {
    /// @ai:intent Build an error from error-like arguments with the default adapter
    /// @ai:effects pure
    #[track_caller]
    pub fn new<I>(args: I) -> Self
    where
        I: IntoIterator<Item = ThrowableArg>,
    {
        ThrowableAdapter::default().throwable(args)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn source_file(&self) -> &'static str {
        self.source_file
    }

    pub fn source_line(&self) -> u32 {
        self.source_line
    }

    pub fn source_column(&self) -> u32 {
        self.source_column
    }

    /// @ai:intent Location formatted as file:line:column
    pub fn location(&self) -> String {
        format!(
            "{}:{}:{}",
            self.source_file, self.source_line, self.source_column
        )
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn message_data(&self) -> Option<&ErrorData> {
        self.message_data.as_ref()
    }

    pub fn message_object(&self) -> Option<&dyn MessageObject> {
        self.message_object.as_deref()
    }

    /// @ai:intent Iterate the cause chain, nearest cause first
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        let mut next = self.source();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.source();
            Some(current)
        })
    }

    /// @ai:intent Snapshot every field and the full cause chain in serializable form
    /// @ai:effects pure
    pub fn report(&self) -> ThrowableReport {
        ThrowableReport {
            message: self.message.clone(),
            code: self.code,
            location: self.location(),
            data: self.message_data.clone(),
            object: self.message_object.as_ref().map(|o| o.render()),
            causes: self.chain().map(CauseReport::from_error).collect(),
        }
    }
}

/// @ai:intent Serializable view of a raised error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrowableReport {
    pub message: String,
    pub code: i64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<CauseReport>,
}

/// @ai:intent One link of a cause chain; code and location only exist for raised errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CauseReport {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CauseReport {
    fn from_error(err: &(dyn StdError + 'static)) -> Self {
        match err.downcast_ref::<ThrowableError>() {
            Some(raised) => Self {
                message: raised.message.clone(),
                code: Some(raised.code),
                location: Some(raised.location()),
            },
            None => Self {
                message: err.to_string(),
                code: None,
                location: None,
            },
        }
    }
}

/// Fields resolved so far during one classification pass.
#[derive(Default)]
struct Resolved {
    message: Option<String>,
    code: Option<i64>,
    cause: Option<BoxedCause>,
    data: Option<ErrorData>,
    object: Option<Arc<dyn MessageObject>>,
}

/// Returns the argument back when it does not claim it.
type Classifier = fn(&mut Resolved, ThrowableArg) -> Option<ThrowableArg>;

/// Tie-break order: earlier classifiers see an argument first, and each field is first-wins.
const CLASSIFIERS: &[Classifier] = &[
    claim_message,
    claim_code,
    claim_cause,
    claim_data,
    claim_object,
];

fn claim_message(resolved: &mut Resolved, arg: ThrowableArg) -> Option<ThrowableArg> {
    match arg {
        ThrowableArg::Message(message) if resolved.message.is_none() && !message.is_empty() => {
            resolved.message = Some(message);
            None
        }
        other => Some(other),
    }
}

fn claim_code(resolved: &mut Resolved, arg: ThrowableArg) -> Option<ThrowableArg> {
    match arg {
        ThrowableArg::Code(code) if resolved.code.is_none() => {
            resolved.code = Some(code);
            None
        }
        other => Some(other),
    }
}

fn claim_cause(resolved: &mut Resolved, arg: ThrowableArg) -> Option<ThrowableArg> {
    match arg {
        ThrowableArg::Cause(cause) if resolved.cause.is_none() => {
            resolved.cause = Some(cause);
            None
        }
        other => Some(other),
    }
}

fn claim_data(resolved: &mut Resolved, arg: ThrowableArg) -> Option<ThrowableArg> {
    match arg {
        ThrowableArg::Data(data) => {
            let merged = resolved.data.get_or_insert_with(Map::new);
            let mut colliding = Map::new();
            for (key, value) in data {
                if merged.contains_key(&key) {
                    colliding.insert(key, value);
                } else {
                    merged.insert(key, value);
                }
            }
            // Keys an earlier map already set are handed back for spilling.
            if colliding.is_empty() {
                None
            } else {
                Some(ThrowableArg::Data(colliding))
            }
        }
        other => Some(other),
    }
}

fn claim_object(resolved: &mut Resolved, arg: ThrowableArg) -> Option<ThrowableArg> {
    match arg {
        ThrowableArg::Object(object) if resolved.object.is_none() => {
            resolved.object = Some(object);
            None
        }
        other => Some(other),
    }
}

/// First free key for a spilled argument: `arg{index}`, then `arg{index}_1`, `arg{index}_2`, ...
fn spill_key(data: &ErrorData, index: usize) -> String {
    let base = format!("arg{}", index);
    if !data.contains_key(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let key = format!("{}_{}", base, n);
        if !data.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}

/// Copies keys from `from` that `into` does not have yet.
fn merge_missing(into: &mut ErrorData, from: &ErrorData) {
    for (key, value) in from {
        if !into.contains_key(key) {
            into.insert(key.clone(), value.clone());
        }
    }
}

/// @ai:intent Build ThrowableErrors from argument lists using configured fallbacks
#[derive(Debug, Clone, Default)]
pub struct ThrowableAdapter {
    config: ThrowableConfig,
}

impl ThrowableAdapter {
    /// @ai:intent Create an adapter with the given fallbacks
    pub fn new(config: ThrowableConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThrowableConfig {
        &self.config
    }

    /// @ai:intent Classify the arguments and build the error at the caller's location
    /// @ai:effects pure
    /// @ai:edge_cases no arguments yields the fallback message and the default code
    #[track_caller]
    pub fn throwable<I>(&self, args: I) -> ThrowableError
    where
        I: IntoIterator<Item = ThrowableArg>,
    {
        let location = Location::caller();
        let mut resolved = Resolved::default();
        let mut spilled = Vec::new();

        for (index, arg) in args.into_iter().enumerate() {
            let mut pending = Some(arg.reshape());
            for classify in CLASSIFIERS {
                match pending.take() {
                    Some(arg) => pending = classify(&mut resolved, arg),
                    None => break,
                }
            }
            if let Some(arg) = pending {
                spilled.push((index, arg.into_value()));
            }
        }

        let mut data = resolved.data;
        if !spilled.is_empty() {
            let data = data.get_or_insert_with(Map::new);
            for (index, value) in spilled {
                let key = spill_key(data, index);
                tracing::debug!("Storing unclassified throwable argument as {}", key);
                data.insert(key, value);
            }
        }
        if let Some(object_data) = resolved.object.as_ref().and_then(|o| o.data()) {
            merge_missing(data.get_or_insert_with(Map::new), object_data);
        }

        let message = resolved
            .message
            .or_else(|| {
                resolved
                    .object
                    .as_ref()
                    .map(|o| o.render())
                    .filter(|m| !m.is_empty())
            })
            .unwrap_or_else(|| self.fallback_message().to_string());

        ThrowableError {
            message,
            code: resolved.code.unwrap_or(self.config.default_code),
            source_file: location.file(),
            source_line: location.line(),
            source_column: location.column(),
            cause: resolved.cause,
            message_data: data,
            message_object: resolved.object,
        }
    }

    fn fallback_message(&self) -> &str {
        if self.config.fallback_message.is_empty() {
            FALLBACK_MESSAGE
        } else {
            &self.config.fallback_message
        }
    }
}

impl ErrorItem {
    /// @ai:intent Raise a single item: message, integer code and data carry over
    /// @ai:effects pure
    #[track_caller]
    pub fn into_throwable(self) -> ThrowableError {
        let mut args = vec![ThrowableArg::Message(self.message().to_string())];
        match self.code() {
            Some(ErrorCode::Int(code)) => args.push(ThrowableArg::Code(*code)),
            Some(ErrorCode::Text(code)) => {
                let mut data = Map::new();
                data.insert("code".to_string(), Value::String(code.clone()));
                args.push(ThrowableArg::Data(data));
            }
            None => {}
        }
        if let Some(data) = self.data() {
            args.push(ThrowableArg::Data(data.clone()));
        }
        ThrowableError::new(args)
    }
}

/// Builds a [`ThrowableError`] at the invocation site from error-like arguments.
#[macro_export]
macro_rules! throwable {
    ($($arg:expr),* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::ThrowableArg> =
            ::std::vec![$($crate::ThrowableArg::from($arg)),*];
        $crate::ThrowableError::new(args)
    }};
}

/// Returns early with a [`ThrowableError`] built from error-like arguments.
#[macro_export]
macro_rules! throw {
    ($($arg:expr),* $(,)?) => {
        return ::std::result::Result::Err(::std::convert::From::from($crate::throwable!($($arg),*)))
    };
}
