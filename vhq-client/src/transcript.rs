use vhq_api::api::transcript::post::TranscriptEntry;

use crate::format::format_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    /// Offset into the video, formatted as `m:ss`
    pub time: String,
    pub text: String,
}

/// A transcript as shown in the transcript modal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    pub lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn from_entries(entries: &[TranscriptEntry]) -> Self {
        let lines = entries
            .iter()
            .map(|entry| TranscriptLine {
                time: format_timestamp(entry.start),
                text: entry.text.clone(),
            })
            .collect();
        Self { lines }
    }

    /// Plain text copied to the clipboard: one `[m:ss] text` line per entry.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("[{}] {}\n", line.time, line.text))
            .collect()
    }

    /// Contents of the exported text file.
    pub fn export(&self, title: Option<&str>) -> String {
        format!("Transcript - {}\n\n{}", title.unwrap_or("Video"), self.to_text())
    }
}

/// Name of the exported transcript file
pub fn export_filename(unix_millis: i64) -> String {
    format!("transcript-{unix_millis}.txt")
}
