use std::fmt::Display;

use crate::encoding::percent_encode_query_component;

/// How a sequence-valued query parameter is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFormat<'a> {
  /// One pair whose value is the encoded elements joined by the separator.
  Separator(&'a str),
  /// One pair per element, all sharing the key.
  RepeatedKey,
}

/// Ordered query pairs.
///
/// Keys are kept raw so removals can match them; values are stored already
/// percent-encoded so a separator joining encoded elements stays literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs {
  pairs: Vec<(String, String)>,
}

impl QueryPairs {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a pair from an unencoded key and value.
  pub fn push_raw(&mut self, key: impl Into<String>, value: &str) {
    self.pairs.push((key.into(), percent_encode_query_component(value)));
  }

  pub fn push<V: Display + ?Sized>(&mut self, key: &str, value: &V) {
    self.push_raw(key, &value.to_string());
  }

  /// Appends a sequence. An empty sequence contributes nothing in either
  /// format; callers drop null elements before they get here.
  pub fn push_array<I>(&mut self, key: &str, values: I, format: ArrayFormat<'_>)
  where
    I: IntoIterator,
    I::Item: Display,
  {
    let encoded = values
      .into_iter()
      .map(|value| percent_encode_query_component(&value.to_string()));

    match format {
      ArrayFormat::Separator(separator) => {
        let joined = encoded.collect::<Vec<_>>();
        if !joined.is_empty() {
          self.pairs.push((key.to_string(), joined.join(separator)));
        }
      }
      ArrayFormat::RepeatedKey => {
        for value in encoded {
          self.pairs.push((key.to_string(), value));
        }
      }
    }
  }

  /// Drops every pair whose key equals `key` exactly.
  pub fn remove(&mut self, key: &str) {
    self.pairs.retain(|(existing, _)| existing != key);
  }

  pub fn extend(&mut self, other: &QueryPairs) {
    self.pairs.extend(other.pairs.iter().cloned());
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }

  /// Renders the query string without a leading `?`, or `None` when empty.
  #[must_use]
  pub fn encode(&self) -> Option<String> {
    if self.pairs.is_empty() {
      return None;
    }
    let rendered = self
      .pairs
      .iter()
      .map(|(key, value)| format!("{}={value}", percent_encode_query_component(key)))
      .collect::<Vec<_>>()
      .join("&");
    Some(rendered)
  }
}
