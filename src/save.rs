use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::form::Form;
use crate::options::FormOptions;

/// Record of one file field written to disk by [`save_files`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    /// Form field name the file arrived under.
    pub field_name: String,
    /// Original filename from the Content-Disposition header, if any.
    pub file_name: Option<String>,
    /// Path the bytes were written to.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}

/// Writes every file field of `form` into `options.upload_dir`, creating the
/// directory if needed. Each file gets a fresh unique name; with
/// `keep_extension` set, the original filename's extension is appended.
///
/// This is the persistence collaborator around the decoder core: it only
/// sees `(raw bytes, suggested extension)` pairs and owns naming and disk
/// layout. With no `upload_dir` configured it writes nothing.
pub fn save_files(form: &Form, options: &FormOptions) -> io::Result<Vec<SavedFile>> {
    let dir = match &options.upload_dir {
        Some(dir) => dir,
        None => return Ok(Vec::new()),
    };

    fs::create_dir_all(dir)?;

    let mut saved = Vec::new();
    for info in form.files() {
        let bytes = match info.bytes() {
            Some(bytes) => bytes,
            None => continue,
        };

        let extension = if options.keep_extension {
            info.extension()
        } else {
            ""
        };

        let (path, mut file) = create_unique(dir, extension)?;
        file.write_all(bytes)?;
        log::debug!(
            "stored field '{}' ({} bytes) at {}",
            info.name(),
            bytes.len(),
            path.display()
        );

        saved.push(SavedFile {
            field_name: info.name().to_owned(),
            file_name: info.file_name().map(|name| name.to_owned()),
            path,
            size: bytes.len() as u64,
        });
    }

    Ok(saved)
}

/// Creates a file under a name no other upload holds. `create_new` makes the
/// filesystem arbitrate collisions, so two concurrent saves can never share a
/// path.
fn create_unique(dir: &Path, extension: &str) -> io::Result<(PathBuf, File)> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?
        .as_nanos();

    let mut attempt: u32 = 0;
    loop {
        let name = format!("upload-{:x}-{}{}", stamp, attempt, extension);
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(err) => return Err(err),
        }
    }
}
