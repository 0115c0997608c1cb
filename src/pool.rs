//! @ai:module:intent Group error stacks by subject key in insertion order
//! @ai:module:layer domain
//! @ai:module:public_api ErrorPool
//! @ai:module:depends_on item, stack, throwable
//! @ai:module:stateless false

use crate::item::ErrorItem;
use crate::output::plural;
use crate::stack::ErrorStack;
use crate::throwable::{ThrowableArg, ThrowableError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// @ai:intent Keyed collection of error stacks, e.g. one stack per form field
/// @ai:invariant keys are unique; push under an existing key appends
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ErrorPool {
    stacks: IndexMap<String, ErrorStack>,
}

impl ErrorPool {
    /// @ai:intent Create an empty pool
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Append an item to the stack for `key`, creating the stack on first use
    pub fn push(&mut self, key: impl Into<String>, item: ErrorItem) {
        self.stack_mut(key).push(item);
    }

    /// @ai:intent Mutable stack for `key`, created empty on first use
    pub fn stack_mut(&mut self, key: impl Into<String>) -> &mut ErrorStack {
        let key = key.into();
        if !self.stacks.contains_key(&key) {
            tracing::trace!("Creating error stack for subject {}", key);
        }
        self.stacks.entry(key).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&ErrorStack> {
        self.stacks.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.stacks.contains_key(key)
    }

    /// @ai:intent Overwrite the stack for `key`, keeping its position
    /// @ai:post returns the stack that was replaced, if any
    pub fn replace(&mut self, key: impl Into<String>, stack: ErrorStack) -> Option<ErrorStack> {
        self.stacks.insert(key.into(), stack)
    }

    /// @ai:intent Remove a subject, keeping the order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<ErrorStack> {
        self.stacks.shift_remove(key)
    }

    /// @ai:intent True when no stack holds any item
    pub fn is_empty(&self) -> bool {
        self.stacks.values().all(ErrorStack::is_empty)
    }

    /// @ai:intent Total number of items across all stacks
    pub fn len(&self) -> usize {
        self.stacks.values().map(ErrorStack::len).sum()
    }

    pub fn key_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }

    /// @ai:intent Iterate (key, stack) pairs in key insertion order
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ErrorStack> {
        self.stacks.iter()
    }

    /// @ai:intent Flatten into (key, item) pairs, keys in insertion order then push order
    pub fn items(&self) -> impl Iterator<Item = (&str, &ErrorItem)> {
        self.stacks
            .iter()
            .flat_map(|(key, stack)| stack.iter().map(move |item| (key.as_str(), item)))
    }

    /// @ai:intent Flattened (key, item) pairs whose item carries the tag
    pub fn tagged<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ErrorItem)> + 'a {
        self.items().filter(move |(_, item)| item.has_tag(tag))
    }

    /// @ai:intent Append each stack of another pool into the matching key
    pub fn merge(&mut self, other: ErrorPool) {
        for (key, stack) in other.stacks {
            self.stack_mut(key).merge(stack);
        }
    }

    /// @ai:intent Escalate every collected item into one raisable error
    /// @ai:effects pure
    #[track_caller]
    pub fn into_throwable(self) -> ThrowableError {
        let count = self.len();
        if count == 0 {
            return ThrowableError::new(Vec::new());
        }

        let subjects = self.stacks.values().filter(|s| !s.is_empty()).count();
        tracing::debug!(
            "Escalating pool with {} errors in {} subjects",
            count,
            subjects
        );

        let errors: Map<String, Value> = self
            .stacks
            .iter()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(key, stack)| (key.clone(), stack.to_value()))
            .collect();
        let mut data = Map::new();
        data.insert("errors".to_string(), Value::Object(errors));

        ThrowableError::new(vec![
            ThrowableArg::Message(format!(
                "{} {} collected in {} {}",
                count,
                plural(count, "error"),
                subjects,
                plural(subjects, "subject")
            )),
            ThrowableArg::Data(data),
        ])
    }
}

impl<'a> IntoIterator for &'a ErrorPool {
    type Item = (&'a String, &'a ErrorStack);
    type IntoIter = indexmap::map::Iter<'a, String, ErrorStack>;

    fn into_iter(self) -> Self::IntoIter {
        self.stacks.iter()
    }
}

impl IntoIterator for ErrorPool {
    type Item = (String, ErrorStack);
    type IntoIter = indexmap::map::IntoIter<String, ErrorStack>;

    fn into_iter(self) -> Self::IntoIter {
        self.stacks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throwable::FALLBACK_MESSAGE;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn messages(stack: &ErrorStack) -> Vec<&str> {
        stack.iter().map(|i| i.message()).collect()
    }

    #[test]
    fn test_push_same_key_appends() {
        let mut pool = ErrorPool::new();
        pool.push("a", ErrorItem::new("a1"));
        pool.push("b", ErrorItem::new("b1"));
        pool.push("a", ErrorItem::new("a2"));

        assert_eq!(pool.key_count(), 2);
        assert_eq!(pool.len(), 3);
        assert_eq!(messages(pool.get("a").unwrap()), vec!["a1", "a2"]);
        assert_eq!(messages(pool.get("b").unwrap()), vec!["b1"]);
        assert_eq!(pool.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_is_empty_until_first_push() {
        let mut pool = ErrorPool::new();
        assert!(pool.is_empty());

        pool.stack_mut("email");
        assert!(pool.is_empty());
        assert!(pool.contains_key("email"));

        pool.push("email", ErrorItem::new("invalid"));
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_items_flatten_in_order() {
        let mut pool = ErrorPool::new();
        pool.push("name", ErrorItem::new("required"));
        pool.push("age", ErrorItem::new("negative"));
        pool.push("name", ErrorItem::new("too long"));

        let flat: Vec<_> = pool.items().map(|(k, i)| (k, i.message())).collect();
        assert_eq!(
            flat,
            vec![("name", "required"), ("name", "too long"), ("age", "negative")]
        );
    }

    #[test]
    fn test_replace_keeps_position_and_returns_old() {
        let mut pool = ErrorPool::new();
        pool.push("a", ErrorItem::new("old"));
        pool.push("b", ErrorItem::new("b"));

        let fresh: ErrorStack = vec![ErrorItem::new("new")].into_iter().collect();
        let previous = pool.replace("a", fresh).unwrap();

        assert_eq!(messages(&previous), vec!["old"]);
        assert_eq!(messages(pool.get("a").unwrap()), vec!["new"]);
        assert_eq!(pool.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_preserves_remaining_order() {
        let mut pool = ErrorPool::new();
        for key in ["a", "b", "c"] {
            pool.push(key, ErrorItem::new(key));
        }

        assert!(pool.remove("b").is_some());
        assert!(pool.remove("missing").is_none());
        assert_eq!(pool.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_merge_appends_per_key() {
        let mut left = ErrorPool::new();
        left.push("a", ErrorItem::new("a1"));

        let mut right = ErrorPool::new();
        right.push("b", ErrorItem::new("b1"));
        right.push("a", ErrorItem::new("a2"));

        left.merge(right);

        assert_eq!(messages(left.get("a").unwrap()), vec!["a1", "a2"]);
        assert_eq!(left.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_tagged_across_subjects() {
        let mut pool = ErrorPool::new();
        pool.push("a", ErrorItem::new("x").with_tag("fatal"));
        pool.push("b", ErrorItem::new("y"));
        pool.push("c", ErrorItem::new("z").with_tag("fatal"));

        let keys: Vec<_> = pool.tagged("fatal").map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_serializes_in_key_order() {
        let mut pool = ErrorPool::new();
        pool.push("zeta", ErrorItem::new("z"));
        pool.push("alpha", ErrorItem::new("a"));

        let text = serde_json::to_string(&pool).unwrap();
        assert_eq!(
            text,
            r#"{"zeta":[{"message":"z"}],"alpha":[{"message":"a"}]}"#
        );
    }

    #[test]
    fn test_into_throwable_groups_by_subject() {
        let mut pool = ErrorPool::new();
        pool.push("email", ErrorItem::new("invalid"));
        pool.push("email", ErrorItem::new("taken"));
        pool.push("age", ErrorItem::new("negative"));
        pool.stack_mut("unused");

        let err = pool.into_throwable();

        assert_eq!(err.message(), "3 errors collected in 2 subjects");
        assert_eq!(
            err.message_data().unwrap().get("errors"),
            Some(&json!({
                "email": [{"message": "invalid"}, {"message": "taken"}],
                "age": [{"message": "negative"}]
            }))
        );
    }

    #[test]
    fn test_into_throwable_single_item_is_singular() {
        let mut pool = ErrorPool::new();
        pool.push("email", ErrorItem::new("invalid"));

        assert_eq!(
            pool.into_throwable().message(),
            "1 error collected in 1 subject"
        );
    }

    #[test]
    fn test_into_throwable_empty_falls_back() {
        assert_eq!(ErrorPool::new().into_throwable().message(), FALLBACK_MESSAGE);
    }
}
