use std::fs;
use std::io;
use std::path::Path;

pub fn exists(path: &Path) -> bool {
  fs::metadata(path).is_ok()
}

/// Creates the directory for `path`, or its parent when it names a file.
pub fn with_dir(path: &Path) -> io::Result<()> {
  // Check if the path's final component is likely a file (by checking for an extension)
  let dir = if path.extension().is_some() {
    path.parent().unwrap_or_else(|| Path::new("/"))
  } else {
    path
  };

  if dir.as_os_str().is_empty() || dir.exists() {
    return Ok(());
  }
  fs::create_dir_all(dir)
}
