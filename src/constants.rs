use lazy_static::lazy_static;
use regex::bytes::Regex;

/// Per-field body cap, 20 MiB.
pub(crate) const DEFAULT_FIELD_SIZE_LIMIT: u64 = 20 * 1024 * 1024;
/// Cumulative cap across all fields of one request, 200 MiB.
pub(crate) const DEFAULT_TOTAL_SIZE_LIMIT: u64 = 200 * 1024 * 1024;

pub(crate) const MAX_HEADERS: usize = 32;
pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CRLF: &str = "\r\n";

/// Default extension for text parts carrying no filename.
pub(crate) const TEXT_EXTENSION: &str = ".txt";

lazy_static! {
    // Anchored to a parameter position so `filename="x"` can never be
    // mistaken for the `name` parameter.
    pub(crate) static ref CONTENT_DISPOSITION_FIELD_NAME_RE: Regex =
        Regex::new(r#"(?-u)(?:^|[;\s])name="([^"]+)""#).unwrap();
    // `filename=""` is what browsers send for an unselected file input.
    pub(crate) static ref CONTENT_DISPOSITION_FILE_NAME_RE: Regex =
        Regex::new(r#"(?-u)filename="([^"]*)""#).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_field_name_re() {
        let val = br#"form-data; name="my_field""#;
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_bytes(), b"my_field");

        let val = br#"form-data; name="my field""#;
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_bytes(), b"my field");

        let val = br#"form-data; name="my_field"; filename="file abc.txt""#;
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_bytes(), b"my_field");

        let val = "form-data; name=\"你好\"; filename=\"file abc.txt\"".as_bytes();
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_bytes(), "你好".as_bytes());
    }

    #[test]
    fn test_field_name_re_ignores_filename_param() {
        let val = br#"form-data; filename="orphan.txt""#;
        assert!(CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).is_none());
    }

    #[test]
    fn test_content_disposition_file_name_re() {
        let val = br#"form-data; name="my_field"; filename="file_name.txt""#;
        let file_name = CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).unwrap();
        assert_eq!(file_name.get(1).unwrap().as_bytes(), b"file_name.txt");

        let val = br#"form-data; name="my_field"; filename="file name.txt""#;
        let file_name = CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).unwrap();
        assert_eq!(file_name.get(1).unwrap().as_bytes(), b"file name.txt");

        let val = br#"form-data; name="my_field"; filename="""#;
        let file_name = CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).unwrap();
        assert_eq!(file_name.get(1).unwrap().as_bytes(), b"");

        let val = "form-data; filename=\"কখগ-你好.txt\"".as_bytes();
        let file_name = CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).unwrap();
        assert_eq!(file_name.get(1).unwrap().as_bytes(), "কখগ-你好.txt".as_bytes());
    }
}
