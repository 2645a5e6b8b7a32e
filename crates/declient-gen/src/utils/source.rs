use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};

/// A declaration file's text plus the names used to label its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
  /// Path as given on the command line; identifies the file in keys and
  /// diagnostics.
  pub id: String,
  /// File stem, used to name the generated file in directory output.
  pub stem: String,
  pub text: String,
}

impl SourceFile {
  pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
    let id = id.into();
    let stem = Path::new(&id)
      .file_stem()
      .and_then(OsStr::to_str)
      .unwrap_or("generated")
      .to_string();
    Self {
      id,
      stem,
      text: text.into(),
    }
  }
}

pub struct SourceLoader {
  path: PathBuf,
  file: AsyncMmapFile,
}

impl SourceLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Self {
      path: path.to_path_buf(),
      file,
    })
  }

  pub fn load(&self) -> anyhow::Result<SourceFile> {
    let text = std::str::from_utf8(self.file.as_slice())
      .with_context(|| format!("{} is not valid UTF-8", self.path.display()))?;
    Ok(SourceFile::new(self.path.display().to_string(), text))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_source_file_stem() {
    struct Case {
      id: &'static str,
      expected: &'static str,
    }

    let cases = [
      Case {
        id: "api/users.rs",
        expected: "users",
      },
      Case {
        id: "orders",
        expected: "orders",
      },
      Case {
        id: "",
        expected: "generated",
      },
    ];

    for case in cases {
      assert_eq!(SourceFile::new(case.id, "").stem, case.expected, "{}", case.id);
    }
  }

  #[tokio::test]
  async fn test_loader_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.rs");
    std::fs::write(&path, "pub struct User;").unwrap();

    let source = SourceLoader::open(&path).await.unwrap().load().unwrap();
    assert_eq!(source.stem, "users");
    assert_eq!(source.text, "pub struct User;");
    assert!(source.id.ends_with("users.rs"));
  }
}
