use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Where downloaded media ends up. One instance per process, constructed
/// from the config and handed to the pipeline.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// Extension of the remote path (with the leading dot), or `default_ext`
/// when the source omits one.
fn extension_of(remote_path: &str, default_ext: &str) -> String {
    Path::new(remote_path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| default_ext.to_string())
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Hash of the remote path salted with the current time, so two downloads
/// of different files never share a name within a run.
fn content_hash(remote_path: &str) -> String {
    let input = format!("{remote_path}{}", unix_millis());
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

fn short_hash(remote_path: &str) -> String {
    content_hash(remote_path)[..16].to_string()
}

pub fn photo_filename(remote_path: &str) -> String {
    format!(
        "telegram_photo_{}{}",
        short_hash(remote_path),
        extension_of(remote_path, ".jpg")
    )
}

pub fn video_filename(remote_path: &str) -> String {
    format!(
        "{}{}",
        content_hash(remote_path),
        extension_of(remote_path, ".mp4")
    )
}

/// Documents keep their declared name when the platform provides one.
pub fn document_filename(declared: Option<&str>, remote_path: &str) -> String {
    match declared {
        Some(name) => name.to_string(),
        None => format!(
            "{}{}",
            content_hash(remote_path),
            extension_of(remote_path, ".file")
        ),
    }
}

/// Audio naming priority: declared file name, then `<title>.mp3`, then a
/// hash with the source extension.
pub fn audio_filename(declared: Option<&str>, title: Option<&str>, remote_path: &str) -> String {
    if let Some(name) = declared {
        return name.to_string();
    }
    if let Some(title) = title {
        return format!("{title}.mp3");
    }
    format!(
        "{}{}",
        content_hash(remote_path),
        extension_of(remote_path, ".mp3")
    )
}

/// Voice messages produce two names sharing one hash: the intermediate
/// recording downloaded from Telegram and the MP3 it is transcoded into.
pub fn voice_filenames(remote_path: &str) -> (String, String) {
    let hash = short_hash(remote_path);
    (format!("temp_voice_{hash}.ogg"), format!("voice_{hash}.mp3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_document_name_is_used_as_is() {
        let name = document_filename(Some("report.pdf"), "documents/file_42.pdf");
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn undeclared_document_falls_back_to_hash_with_source_extension() {
        let name = document_filename(None, "documents/file_42.pdf");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 64 + ".pdf".len());
    }

    #[test]
    fn document_without_extension_gets_file_suffix() {
        let name = document_filename(None, "documents/file_42");
        assert!(name.ends_with(".file"));
    }

    #[test]
    fn photo_keeps_source_extension() {
        let name = photo_filename("photos/file_7.png");
        assert!(name.starts_with("telegram_photo_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn photo_defaults_to_jpg() {
        let name = photo_filename("photos/file_7");
        assert!(name.ends_with(".jpg"));
        // prefix + 16 hash chars + extension
        assert_eq!(name.len(), "telegram_photo_".len() + 16 + ".jpg".len());
    }

    #[test]
    fn audio_prefers_declared_then_title() {
        assert_eq!(
            audio_filename(Some("track.flac"), Some("Track"), "music/file_1.mp3"),
            "track.flac"
        );
        assert_eq!(
            audio_filename(None, Some("My Song"), "music/file_1.ogg"),
            "My Song.mp3"
        );
        assert!(audio_filename(None, None, "music/file_1").ends_with(".mp3"));
    }

    #[test]
    fn voice_names_share_a_hash() {
        let (ogg, mp3) = voice_filenames("voice/file_9.oga");
        let ogg_hash = ogg
            .strip_prefix("temp_voice_")
            .and_then(|s| s.strip_suffix(".ogg"))
            .unwrap();
        let mp3_hash = mp3
            .strip_prefix("voice_")
            .and_then(|s| s.strip_suffix(".mp3"))
            .unwrap();
        assert_eq!(ogg_hash, mp3_hash);
        assert_eq!(ogg_hash.len(), 16);
    }

    #[test]
    fn different_sources_get_different_names() {
        let a = video_filename("videos/file_1.mp4");
        let b = video_filename("videos/file_2.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn store_joins_names_onto_its_directory() {
        let store = AssetStore::new(PathBuf::from("/tmp/journal/assets"));
        assert_eq!(
            store.path_for("a.jpg"),
            PathBuf::from("/tmp/journal/assets/a.jpg")
        );
    }
}
