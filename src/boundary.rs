use bytes::Bytes;

use crate::constants;

/// The three verbatim byte sequences delimiting parts of one request:
/// `--b` opens a part, `\r\n--b` terminates a part body, `--b--` closes the
/// stream. Lines and body bytes are compared against these exactly; no
/// unescaping of the boundary token is performed.
pub(crate) struct BoundaryMarkers {
    pub(crate) start: Bytes,
    pub(crate) repeated: Bytes,
    pub(crate) end: Bytes,
}

impl BoundaryMarkers {
    pub fn derive(boundary: &str) -> BoundaryMarkers {
        let start = format!("{}{}", constants::BOUNDARY_EXT, boundary);
        let repeated = format!("{}{}", constants::CRLF, start);
        let end = format!("{}{}", start, constants::BOUNDARY_EXT);

        BoundaryMarkers {
            start: Bytes::from(start),
            repeated: Bytes::from(repeated),
            end: Bytes::from(end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_markers() {
        let markers = BoundaryMarkers::derive("X-BOUNDARY");
        assert_eq!(&markers.start[..], b"--X-BOUNDARY");
        assert_eq!(&markers.repeated[..], b"\r\n--X-BOUNDARY");
        assert_eq!(&markers.end[..], b"--X-BOUNDARY--");
    }
}
