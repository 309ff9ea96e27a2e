use chrono::{Local, NaiveTime};

/// What kind of message a note line describes. Media kinds carry the
/// pieces that end up in the note header (declared names, voice duration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteKind<'a> {
    Text(&'a str),
    Photo,
    Video,
    Document { name: &'a str },
    Audio { name: &'a str },
    Voice { duration_secs: Option<u32> },
}

/// Build a journal note line for the current wall-clock time.
pub fn format_note(kind: &NoteKind, caption: Option<&str>, asset: Option<&str>) -> String {
    format_note_at(Local::now().time(), kind, caption, asset)
}

/// Build a journal note line with an explicit timestamp.
///
/// The line starts with a single `[HH:MM]` prefix (24-hour). Media notes get
/// a second line referencing the asset relative to the journal page:
/// documents as a plain link, everything else as an embed.
pub fn format_note_at(
    time: NaiveTime,
    kind: &NoteKind,
    caption: Option<&str>,
    asset: Option<&str>,
) -> String {
    let stamp = time.format("%H:%M");

    let header = match kind {
        NoteKind::Text(text) => return format!("[{stamp}] {text}"),
        NoteKind::Photo => "📷 Image".to_string(),
        NoteKind::Video => "🎬 Video".to_string(),
        NoteKind::Document { name } => format!("📄 File: {name}"),
        NoteKind::Audio { name } => format!("🎵 Audio: {name}"),
        NoteKind::Voice { duration_secs } => match duration_secs {
            Some(secs) => format!("🎤 Voice message ({secs}s)"),
            None => "🎤 Voice message".to_string(),
        },
    };

    let caption = caption.map(|c| format!(" {c}")).unwrap_or_default();

    let mut line = format!("[{stamp}] {header}{caption}");
    if let Some(name) = asset {
        let embed = match kind {
            // Logseq renders documents as plain links, not embeds
            NoteKind::Document { .. } => "",
            _ => "!",
        };
        line.push_str(&format!("\n{embed}[{name}](../assets/{name})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn text_note_is_timestamp_plus_text() {
        let line = format_note_at(at(9, 5), &NoteKind::Text("buy milk"), None, None);
        assert_eq!(line, "[09:05] buy milk");
    }

    #[test]
    fn timestamp_is_24_hour() {
        let line = format_note_at(at(21, 30), &NoteKind::Text("late note"), None, None);
        assert_eq!(line, "[21:30] late note");
    }

    #[test]
    fn photo_note_embeds_asset() {
        let line = format_note_at(
            at(12, 0),
            &NoteKind::Photo,
            None,
            Some("telegram_photo_abc123.jpg"),
        );
        assert_eq!(
            line,
            "[12:00] 📷 Image\n![telegram_photo_abc123.jpg](../assets/telegram_photo_abc123.jpg)"
        );
    }

    #[test]
    fn photo_caption_comes_after_label() {
        let line = format_note_at(
            at(12, 0),
            &NoteKind::Photo,
            Some("the whiteboard"),
            Some("p.jpg"),
        );
        assert_eq!(line, "[12:00] 📷 Image the whiteboard\n![p.jpg](../assets/p.jpg)");
    }

    #[test]
    fn document_note_uses_plain_link() {
        let line = format_note_at(
            at(8, 15),
            &NoteKind::Document { name: "report.pdf" },
            None,
            Some("report.pdf"),
        );
        assert_eq!(
            line,
            "[08:15] 📄 File: report.pdf\n[report.pdf](../assets/report.pdf)"
        );
    }

    #[test]
    fn audio_note_names_the_track() {
        let line = format_note_at(
            at(17, 45),
            &NoteKind::Audio { name: "Song.mp3" },
            Some("from the gig"),
            Some("Song.mp3"),
        );
        assert_eq!(
            line,
            "[17:45] 🎵 Audio: Song.mp3 from the gig\n![Song.mp3](../assets/Song.mp3)"
        );
    }

    #[test]
    fn voice_note_includes_duration_when_known() {
        let line = format_note_at(
            at(7, 0),
            &NoteKind::Voice {
                duration_secs: Some(14),
            },
            None,
            Some("voice_abc.mp3"),
        );
        assert_eq!(
            line,
            "[07:00] 🎤 Voice message (14s)\n![voice_abc.mp3](../assets/voice_abc.mp3)"
        );
    }

    #[test]
    fn voice_note_omits_zero_duration() {
        let line = format_note_at(
            at(7, 0),
            &NoteKind::Voice {
                duration_secs: None,
            },
            None,
            Some("voice_abc.mp3"),
        );
        assert!(line.starts_with("[07:00] 🎤 Voice message\n"));
    }

    #[test]
    fn every_line_has_exactly_one_timestamp_prefix() {
        let line = format_note_at(at(10, 10), &NoteKind::Video, Some("clip"), Some("v.mp4"));
        assert_eq!(line.matches("[10:10]").count(), 1);
        assert!(line.starts_with("[10:10] 🎬 Video clip"));
    }
}
