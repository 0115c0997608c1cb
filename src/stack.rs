//! @ai:module:intent Ordered accumulation of error items from one linear pass
//! @ai:module:layer domain
//! @ai:module:public_api ErrorStack
//! @ai:module:depends_on item, throwable
//! @ai:module:stateless false

use crate::item::ErrorItem;
use crate::output::plural;
use crate::throwable::{ThrowableArg, ThrowableError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// @ai:intent Ordered sequence of error items in detection order
/// @ai:invariant every push increases len() by exactly one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ErrorStack {
    items: Vec<ErrorItem>,
}

impl ErrorStack {
    /// @ai:intent Create an empty stack
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Append an item
    pub fn push(&mut self, item: ErrorItem) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// @ai:intent Iterate items in push order; may be called any number of times
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorItem> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&ErrorItem> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&ErrorItem> {
        self.items.last()
    }

    /// @ai:intent Items carrying the given tag, in push order
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ErrorItem> + 'a {
        self.items.iter().filter(move |item| item.has_tag(tag))
    }

    /// @ai:intent Append every item of another stack, keeping its order
    pub fn merge(&mut self, other: ErrorStack) {
        self.items.extend(other.items);
    }

    /// @ai:intent Escalate the collected items into one raisable error
    /// @ai:effects pure
    #[track_caller]
    pub fn into_throwable(self) -> ThrowableError {
        match self.items.len() {
            0 => ThrowableError::new(Vec::new()),
            1 => {
                let mut items = self.items;
                match items.pop() {
                    Some(item) => item.into_throwable(),
                    None => ThrowableError::new(Vec::new()),
                }
            }
            count => {
                tracing::debug!("Escalating stack with {} errors", count);
                let mut data = serde_json::Map::new();
                data.insert(
                    "errors".to_string(),
                    serde_json::to_value(&self.items).unwrap_or_default(),
                );
                ThrowableError::new(vec![
                    ThrowableArg::Message(format!(
                        "{} {} collected",
                        count,
                        plural(count, "error")
                    )),
                    ThrowableArg::Data(data),
                ])
            }
        }
    }

    /// @ai:intent Serialize the items as a JSON array
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.items).unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a ErrorStack {
    type Item = &'a ErrorItem;
    type IntoIter = std::slice::Iter<'a, ErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ErrorStack {
    type Item = ErrorItem;
    type IntoIter = std::vec::IntoIter<ErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ErrorItem> for ErrorStack {
    fn from_iter<I: IntoIterator<Item = ErrorItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<ErrorItem> for ErrorStack {
    fn extend<I: IntoIterator<Item = ErrorItem>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throwable::FALLBACK_MESSAGE;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_push_preserves_order_and_count() {
        let mut stack = ErrorStack::new();
        for i in 0..5 {
            stack.push(ErrorItem::new(format!("error {}", i)));
        }

        assert_eq!(stack.len(), 5);
        let messages: Vec<_> = stack.iter().map(|i| i.message().to_string()).collect();
        assert_eq!(messages, vec!["error 0", "error 1", "error 2", "error 3", "error 4"]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let stack: ErrorStack = vec![ErrorItem::new("a"), ErrorItem::new("b")]
            .into_iter()
            .collect();

        let first: Vec<_> = (&stack).into_iter().map(|i| i.message()).collect();
        let second: Vec<_> = stack.iter().map(|i| i.message()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_empty_tracks_pushes() {
        let mut stack = ErrorStack::new();
        assert!(stack.is_empty());

        stack.push(ErrorItem::new("x"));
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut left: ErrorStack = vec![ErrorItem::new("a")].into_iter().collect();
        let right: ErrorStack = vec![ErrorItem::new("b"), ErrorItem::new("c")]
            .into_iter()
            .collect();

        left.merge(right);

        let messages: Vec<_> = left.iter().map(|i| i.message()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tagged_filters_items() {
        let mut stack = ErrorStack::new();
        stack.push(ErrorItem::new("a").with_tag("input"));
        stack.push(ErrorItem::new("b"));
        stack.push(ErrorItem::new("c").with_tag("input"));

        let tagged: Vec<_> = stack.tagged("input").map(|i| i.message()).collect();
        assert_eq!(tagged, vec!["a", "c"]);
    }

    #[test]
    fn test_into_throwable_many_items() {
        let mut stack = ErrorStack::new();
        stack.push(ErrorItem::new("a"));
        stack.push(ErrorItem::new("b").with_code(2));

        let err = stack.into_throwable();

        assert_eq!(err.message(), "2 errors collected");
        assert_eq!(err.code(), 0);
        assert_eq!(
            err.message_data().unwrap().get("errors"),
            Some(&json!([{"message": "a"}, {"message": "b", "code": 2}]))
        );
    }

    #[test]
    fn test_into_throwable_single_item_uses_its_fields() {
        let mut stack = ErrorStack::new();
        stack.push(ErrorItem::new("only").with_code(9));

        let err = stack.into_throwable();
        assert_eq!(err.message(), "only");
        assert_eq!(err.code(), 9);
    }

    #[test]
    fn test_into_throwable_empty_falls_back() {
        let err = ErrorStack::new().into_throwable();
        assert_eq!(err.message(), FALLBACK_MESSAGE);
        assert!(err.source_file().ends_with("stack.rs"));
    }
}
