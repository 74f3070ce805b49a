//! Lazy `(message, parts)` traversal over a message history.
//!
//! [`message_parts`] is a pure view: it never copies or mutates a message.
//! The redundancy scan walks it backwards (`.rev()`), the rebuild walks it
//! forwards, and because the adapter is `Clone` over a cloneable iterator a
//! traversal can be restarted from any saved position.

use crate::{Message, Part};
use std::iter::FusedIterator;

/// Iterator adapter yielding each message together with its part slice.
///
/// Created by [`message_parts`]. Inherits `Clone`, `DoubleEndedIterator` and
/// `ExactSizeIterator` from the underlying message iterator.
#[derive(Debug, Clone)]
pub struct MessageParts<I> {
    inner: I,
}

/// Enumerate `(message, parts)` pairs over an ordered message sequence.
///
/// A message with no parts yields an empty slice.
pub fn message_parts<'a, I>(history: I) -> MessageParts<I::IntoIter>
where
    I: IntoIterator<Item = &'a Message>,
{
    MessageParts {
        inner: history.into_iter(),
    }
}

impl<'a, I> Iterator for MessageParts<I>
where
    I: Iterator<Item = &'a Message>,
{
    type Item = (&'a Message, &'a [Part]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|m| (m, m.parts.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, I> DoubleEndedIterator for MessageParts<I>
where
    I: DoubleEndedIterator<Item = &'a Message>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|m| (m, m.parts.as_slice()))
    }
}

impl<'a, I> ExactSizeIterator for MessageParts<I> where I: ExactSizeIterator<Item = &'a Message> {}

impl<'a, I> FusedIterator for MessageParts<I> where I: FusedIterator<Item = &'a Message> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Message> {
        vec![
            Message::user("start"),
            Message::response(vec![Part::text("a"), Part::text("b")]),
            Message::request(vec![]),
        ]
    }

    #[test]
    fn forward_yields_each_message_with_its_parts() {
        let history = history();
        let counts: Vec<usize> = message_parts(&history).map(|(_, p)| p.len()).collect();
        assert_eq!(counts, vec![1, 2, 0]);
    }

    #[test]
    fn reversed_walks_newest_first() {
        let history = history();
        let counts: Vec<usize> = message_parts(&history)
            .rev()
            .map(|(_, p)| p.len())
            .collect();
        assert_eq!(counts, vec![0, 2, 1]);
    }

    #[test]
    fn parts_belong_to_the_yielded_message() {
        let history = history();
        for (message, parts) in message_parts(&history) {
            assert!(std::ptr::eq(message.parts.as_slice(), parts));
        }
    }

    #[test]
    fn clone_restarts_from_saved_position() {
        let history = history();
        let mut iter = message_parts(&history);
        iter.next();
        let saved = iter.clone();
        assert_eq!(iter.count(), 2);
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn empty_history_yields_nothing() {
        let history: Vec<Message> = Vec::new();
        assert_eq!(message_parts(&history).next(), None);
        assert_eq!(message_parts(&history).next_back(), None);
    }
}
