use tracing::trace;

/// A parsed search string.
///
/// The raw text is kept as typed so it can be persisted and restored verbatim;
/// matching only ever looks at the uppercased tokens.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct SearchQuery {
  raw:    String,
  tokens: Vec<String>
}

impl SearchQuery {
  /// Uppercases `raw`, splits it on runs of whitespace and drops empty and
  /// repeated tokens.
  pub fn parse(raw: &str) -> Self {
    let upper = raw.to_uppercase();
    let mut tokens: Vec<String> =
      Vec::new();
    for token in upper.split_whitespace()
    {
      if !tokens
        .iter()
        .any(|existing| existing == token)
      {
        tokens.push(token.to_string());
      }
    }

    trace!(raw, ?tokens, "parsed search query");
    Self {
      raw: raw.to_string(),
      tokens
    }
  }

  pub fn raw(&self) -> &str {
    &self.raw
  }

  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  /// An empty query filters nothing out.
  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// True when any token occurs in `key_text`, compared case-insensitively.
  /// Every key matches the empty query.
  pub fn matches(
    &self,
    key_text: &str
  ) -> bool {
    if self.is_empty() {
      return true;
    }

    let key = key_text.to_uppercase();
    self
      .tokens
      .iter()
      .any(|token| {
        key.contains(token.as_str())
      })
  }
}
