/// Container formats recognised by their leading magic bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Gzip,
    Zstd,
    Xz,
}

impl ArchiveFormat {
    /// Whether [`crate::decode`] can read this format.
    pub fn is_supported(self) -> bool { matches!(self, Self::Zip) }
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        // local file header, or end-of-central-directory of an empty archive
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Gzip),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(ArchiveFormat::Zstd),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::Xz),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_zip_format() {
        let zip_header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x00, 0x00];
        assert_eq!(detect_format(&zip_header), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn detect_empty_zip_format() {
        let eocd = [0x50, 0x4B, 0x05, 0x06, 0x00, 0x00];
        assert_eq!(detect_format(&eocd), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn detect_gzip_is_unsupported() {
        let gz_header = [0x1F, 0x8B, 0x08, 0x00];
        let format = detect_format(&gz_header).unwrap();
        assert_eq!(format, ArchiveFormat::Gzip);
        assert!(!format.is_supported());
    }

    #[test]
    fn detect_xz_and_zstd() {
        let xz_header = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, 0x00, 0x00];
        let zstd_header = [0x28, 0xB5, 0x2F, 0xFD, 0x00];
        assert_eq!(detect_format(&xz_header), Some(ArchiveFormat::Xz));
        assert_eq!(detect_format(&zstd_header), Some(ArchiveFormat::Zstd));
    }

    #[test]
    fn detect_unknown_and_short_input() {
        assert_eq!(detect_format(b"{\"uri\":"), None);
        assert_eq!(detect_format(&[0x50]), None);
        assert_eq!(detect_format(&[]), None);
    }
}
