//! AudioClip - A recorded voice message awaiting transcription

use bytes::Bytes;

/// Encoded audio handed over by the recorder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Bytes,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Build a clip from a file name, inferring the MIME type from its extension.
    pub fn from_file_name(data: impl Into<Bytes>, file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "ogg" | "oga" => "audio/ogg",
            "mp4" | "m4a" => "audio/mp4",
            "wav" => "audio/wav",
            "mp3" => "audio/mpeg",
            _ => "audio/webm",
        };
        Self::new(data, mime_type)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File name sent with the multipart part.
    pub fn file_name(&self) -> String {
        let base = self.mime_type.split(';').next().unwrap_or_default();
        let ext = match base {
            "audio/ogg" => "ogg",
            "audio/mp4" => "mp4",
            "audio/wav" | "audio/wave" => "wav",
            "audio/mpeg" | "audio/mp3" => "mp3",
            _ => "webm",
        };
        format!("recording.{ext}")
    }
}
