use std::path::PathBuf;

use crate::constants;

/// Decoding limits and behavior switches.
///
/// The size limits bound memory per request: `max_field_size` caps a single
/// part's body, `max_file_size` is a running budget across all parts,
/// decremented as they are consumed and never allowed to go negative.
/// `upload_dir` and `keep_extension` are consumed only by the persistence
/// collaborator ([`save_files`](crate::save_files)), never by the decoder.
#[derive(Debug, Clone)]
pub struct FormOptions {
    pub(crate) max_field_size: u64,
    pub(crate) max_file_size: u64,
    pub(crate) multiple: bool,
    pub(crate) upload_dir: Option<PathBuf>,
    pub(crate) keep_extension: bool,
}

impl FormOptions {
    /// Defaults: 20 MiB per field, 200 MiB cumulative, single-field mode, no
    /// persistence.
    pub fn new() -> FormOptions {
        FormOptions::default()
    }

    /// Caps a single field's body size.
    pub fn max_field_size(mut self, limit: u64) -> FormOptions {
        self.max_field_size = limit;
        self
    }

    /// Caps the cumulative size of all field bodies in one request.
    pub fn max_file_size(mut self, limit: u64) -> FormOptions {
        self.max_file_size = limit;
        self
    }

    /// When false, decoding stops after the first extracted field and the
    /// rest of the stream is left to the caller.
    pub fn multiple(mut self, multiple: bool) -> FormOptions {
        self.multiple = multiple;
        self
    }

    /// Directory the persistence collaborator writes file fields into.
    pub fn upload_dir<P: Into<PathBuf>>(mut self, dir: P) -> FormOptions {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Keep the original filename's extension on stored files.
    pub fn keep_extension(mut self, keep: bool) -> FormOptions {
        self.keep_extension = keep;
        self
    }
}

impl Default for FormOptions {
    fn default() -> Self {
        FormOptions {
            max_field_size: constants::DEFAULT_FIELD_SIZE_LIMIT,
            max_file_size: constants::DEFAULT_TOTAL_SIZE_LIMIT,
            multiple: false,
            upload_dir: None,
            keep_extension: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormOptions::new();
        assert_eq!(options.max_field_size, 20 * 1024 * 1024);
        assert_eq!(options.max_file_size, 200 * 1024 * 1024);
        assert!(!options.multiple);
        assert_eq!(options.upload_dir, None);
        assert!(!options.keep_extension);
    }

    #[test]
    fn test_builder_chain() {
        let options = FormOptions::new()
            .max_field_size(512)
            .max_file_size(4096)
            .multiple(true)
            .upload_dir("/tmp/uploads")
            .keep_extension(true);

        assert_eq!(options.max_field_size, 512);
        assert_eq!(options.max_file_size, 4096);
        assert!(options.multiple);
        assert_eq!(options.upload_dir, Some(PathBuf::from("/tmp/uploads")));
        assert!(options.keep_extension);
    }
}
