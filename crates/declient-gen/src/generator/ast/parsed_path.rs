use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PathParseError {
  #[strum(to_string = "unclosed '{{' at position {position} in segment '{segment}'")]
  UnclosedBrace { segment: String, position: usize },
  #[strum(to_string = "empty parameter '{{}}' in segment '{segment}'")]
  EmptyParameter { segment: String },
  #[strum(to_string = "unmatched '}}' at position {position} in segment '{segment}'")]
  UnmatchedClosingBrace { segment: String, position: usize },
  #[strum(to_string = "nested '{{' at position {position} in segment '{segment}'")]
  NestedBraces { segment: String, position: usize },
  #[strum(to_string = "query string at position {position} in template '{template}'")]
  QueryInTemplate { template: String, position: usize },
}

impl std::error::Error for PathParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPart {
  Literal(String),
  Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentPart<'a> {
  Literal(&'a str),
  Param(&'a str),
}

/// A path template split into literal text and `{name}` placeholders.
///
/// Templates are normalized to start with `/`; an empty template is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedPath {
  template: String,
  parts: Vec<PathPart>,
}

impl Default for ParsedPath {
  fn default() -> Self {
    Self {
      template: "/".to_string(),
      parts: vec![PathPart::Literal("/".to_string())],
    }
  }
}

impl ParsedPath {
  pub fn parse(template: &str) -> Result<Self, PathParseError> {
    if let Some(position) = template.find('?') {
      return Err(PathParseError::QueryInTemplate {
        template: template.to_string(),
        position,
      });
    }

    let normalized = if template.starts_with('/') {
      template.to_string()
    } else {
      format!("/{template}")
    };

    let mut parts = vec![];
    for (index, segment) in normalized.split('/').enumerate() {
      if index > 0 {
        push_literal(&mut parts, "/");
      }
      for part in tokenize(segment)? {
        match part {
          SegmentPart::Literal(lit) => push_literal(&mut parts, lit),
          SegmentPart::Param(name) => parts.push(PathPart::Param(name.to_string())),
        }
      }
    }

    Ok(Self {
      template: normalized,
      parts,
    })
  }

  #[must_use]
  pub fn template(&self) -> &str {
    &self.template
  }

  #[must_use]
  pub fn parts(&self) -> &[PathPart] {
    &self.parts
  }

  /// Placeholder names in template order, duplicates included.
  pub fn placeholders(&self) -> impl Iterator<Item = &str> {
    self.parts.iter().filter_map(|part| match part {
      PathPart::Param(name) => Some(name.as_str()),
      PathPart::Literal(_) => None,
    })
  }

  #[must_use]
  pub fn is_static(&self) -> bool {
    self.placeholders().next().is_none()
  }

  /// The template as a `format!` string with `{}` for every placeholder.
  #[must_use]
  pub fn format_string(&self) -> String {
    self.parts.iter().fold(String::new(), |mut acc, part| {
      match part {
        PathPart::Literal(lit) => acc.push_str(lit),
        PathPart::Param(_) => acc.push_str("{}"),
      }
      acc
    })
  }
}

fn push_literal(parts: &mut Vec<PathPart>, lit: &str) {
  if lit.is_empty() {
    return;
  }
  if let Some(PathPart::Literal(existing)) = parts.last_mut() {
    existing.push_str(lit);
  } else {
    parts.push(PathPart::Literal(lit.to_string()));
  }
}

fn tokenize(segment: &str) -> Result<Vec<SegmentPart<'_>>, PathParseError> {
  let mut parts = vec![];
  let mut rest = segment;
  let mut offset = 0;

  while !rest.is_empty() {
    let Some(open_pos) = rest.find('{') else {
      break;
    };

    if let Some(stray_close) = rest[..open_pos].find('}') {
      return Err(PathParseError::UnmatchedClosingBrace {
        segment: segment.to_string(),
        position: offset + stray_close,
      });
    }

    if open_pos > 0 {
      parts.push(SegmentPart::Literal(&rest[..open_pos]));
    }

    let after_open = &rest[open_pos + 1..];
    let Some(close_pos) = after_open.find('}') else {
      return Err(PathParseError::UnclosedBrace {
        segment: segment.to_string(),
        position: offset + open_pos,
      });
    };

    if let Some(nested) = after_open[..close_pos].find('{') {
      return Err(PathParseError::NestedBraces {
        segment: segment.to_string(),
        position: offset + open_pos + 1 + nested,
      });
    }

    let param_name = after_open[..close_pos].trim();
    if param_name.is_empty() {
      return Err(PathParseError::EmptyParameter {
        segment: segment.to_string(),
      });
    }

    parts.push(SegmentPart::Param(param_name));

    let consumed = open_pos + 1 + close_pos + 1;
    offset += consumed;
    rest = &rest[consumed..];
  }

  if let Some(stray_close) = rest.find('}') {
    return Err(PathParseError::UnmatchedClosingBrace {
      segment: segment.to_string(),
      position: offset + stray_close,
    });
  }

  if !rest.is_empty() {
    parts.push(SegmentPart::Literal(rest));
  }

  Ok(parts)
}
