// [libs/domain/sharder/src/classify.rs]
//! Payload classification (spec §4.5 step 2): a type tag derived from
//! extension, falling back to a content heuristic, plus size in KB.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadClass {
    pub type_tag: String,
    pub size_kb: f64,
}

const KNOWN_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image"),
    ("jpeg", "image"),
    ("png", "image"),
    ("gif", "image"),
    ("mp4", "video"),
    ("mov", "video"),
    ("mp3", "audio"),
    ("wav", "audio"),
    ("pdf", "document"),
    ("txt", "document"),
    ("json", "document"),
    ("zip", "archive"),
    ("tar", "archive"),
    ("gz", "archive"),
];

/// Classifies by filename extension when given one; otherwise falls back
/// to a magic-byte heuristic, and finally to `"binary"`.
pub fn classify_payload(payload: &[u8], file_name: Option<&str>) -> PayloadClass {
    let type_tag = file_name
        .and_then(extension_of)
        .and_then(lookup_extension)
        .map(str::to_string)
        .unwrap_or_else(|| heuristic_type_tag(payload));

    PayloadClass { type_tag, size_kb: payload.len() as f64 / 1024.0 }
}

fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

fn lookup_extension(extension: &str) -> Option<&'static str> {
    let lowered = extension.to_ascii_lowercase();
    KNOWN_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == lowered)
        .map(|(_, tag)| *tag)
}

/// Magic-byte sniffing for the common container formats; anything
/// unrecognized is tagged `"binary"` rather than guessed.
fn heuristic_type_tag(payload: &[u8]) -> String {
    const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
    const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];
    const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

    if payload.starts_with(&PNG_MAGIC) || payload.starts_with(&JPEG_MAGIC) {
        "image".to_string()
    } else if payload.starts_with(&GZIP_MAGIC) {
        "archive".to_string()
    } else if payload.iter().all(|&b| b.is_ascii_graphic() || b.is_ascii_whitespace()) {
        "document".to_string()
    } else {
        "binary".to_string()
    }
}
