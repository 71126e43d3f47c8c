//! Speech synthesis, transcription and translation.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::Client;
use crate::error::Result;
use crate::multipart::MultipartForm;
use crate::operation::Operation;
use crate::request::{Query, RequestBody};

/// Default text-to-speech model.
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";

/// Default speech-to-text model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Synthesized voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// `alloy`
    #[default]
    Alloy,
    /// `echo`
    Echo,
    /// `fable`
    Fable,
    /// `onyx`
    Onyx,
    /// `nova`
    Nova,
    /// `shimmer`
    Shimmer,
}

/// Encoding of synthesized audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    /// MPEG audio, the default.
    #[default]
    Mp3,
    /// Ogg Opus.
    Opus,
    /// AAC.
    Aac,
    /// FLAC.
    Flac,
}

/// Text-to-speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Speech model, `tts-1` by default.
    pub model: String,
    /// Up to 4096 characters.
    pub input: String,
    /// Voice to speak with.
    pub voice: Voice,
    /// Output encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<SpeechFormat>,
    /// 0.25 to 4.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl SpeechRequest {
    /// Creates a request with [`DEFAULT_SPEECH_MODEL`].
    #[must_use]
    pub fn new(input: impl Into<String>, voice: Voice) -> Self {
        Self {
            model: DEFAULT_SPEECH_MODEL.to_owned(),
            input: input.into(),
            voice,
            response_format: None,
            speed: None,
        }
    }

    /// Sets the audio encoding.
    #[must_use]
    pub const fn response_format(mut self, format: SpeechFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Sets the playback speed.
    #[must_use]
    pub const fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Output format of transcriptions and translations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptFormat {
    /// `{"text": ...}`
    #[default]
    Json,
    /// Plain text.
    Text,
    /// SubRip subtitles.
    Srt,
    /// JSON with segments and timing.
    VerboseJson,
    /// WebVTT subtitles.
    Vtt,
}

impl TranscriptFormat {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::VerboseJson => "verbose_json",
            Self::Vtt => "vtt",
        }
    }

    /// Whether the server answers with JSON.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::VerboseJson)
    }
}

/// Speech-to-text request. Sent as multipart.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    /// Audio file name, e.g. `meeting.m4a`.
    pub filename: String,
    /// Raw audio bytes.
    pub file: Bytes,
    /// Transcription model, `whisper-1` by default.
    pub model: String,
    /// ISO-639-1 input language.
    pub language: Option<String>,
    /// Text to guide style or continue a previous segment.
    pub prompt: Option<String>,
    /// Output format.
    pub response_format: Option<TranscriptFormat>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl TranscriptionRequest {
    /// Creates a request with [`DEFAULT_TRANSCRIPTION_MODEL`].
    #[must_use]
    pub fn new(filename: impl Into<String>, file: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            file: file.into(),
            model: DEFAULT_TRANSCRIPTION_MODEL.to_owned(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    /// Sets the input language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn response_format(mut self, format: TranscriptFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .file("file", self.filename.as_str(), self.file.clone())
            .text("model", self.model.as_str())
            .text_opt("language", self.language.as_deref())
            .text_opt("prompt", self.prompt.as_deref())
            .text_opt(
                "response_format",
                self.response_format.map(TranscriptFormat::as_str),
            )
            .text_opt("temperature", self.temperature)
    }
}

/// Audio-to-English translation request. Sent as multipart.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Name of the uploaded file.
    pub filename: String,
    /// Raw audio bytes.
    pub file: Bytes,
    /// Speech model, `whisper-1` by default.
    pub model: String,
    /// English text to guide style.
    pub prompt: Option<String>,
    /// Output format.
    pub response_format: Option<TranscriptFormat>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl TranslationRequest {
    /// Creates a request with [`DEFAULT_TRANSCRIPTION_MODEL`].
    #[must_use]
    pub fn new(filename: impl Into<String>, file: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            file: file.into(),
            model: DEFAULT_TRANSCRIPTION_MODEL.to_owned(),
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    fn to_form(&self) -> MultipartForm {
        MultipartForm::new()
            .file("file", self.filename.as_str(), self.file.clone())
            .text("model", self.model.as_str())
            .text_opt("prompt", self.prompt.as_deref())
            .text_opt(
                "response_format",
                self.response_format.map(TranscriptFormat::as_str),
            )
            .text_opt("temperature", self.temperature)
    }
}

/// Transcribed or translated text.
///
/// For `text`, `srt` and `vtt` formats `text` holds the raw body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text, or the raw body for text formats.
    pub text: String,
    /// Detected language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Seconds, `verbose_json` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Client {
    /// Generates audio from text. Returns the encoded audio bytes.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction or transport.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_speech(&self, request: &SpeechRequest) -> Result<Bytes> {
        let audio = self
            .send_raw(
                Operation::CreateSpeech,
                &[],
                RequestBody::json(request)?,
                &Query::new(),
            )
            .await?;
        debug!(bytes = audio.len(), "Speech generated");
        Ok(audio)
    }

    /// Transcribes audio into the input language.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model, file = %request.filename))]
    pub async fn create_transcription(&self, request: &TranscriptionRequest) -> Result<Transcription> {
        let format = request.response_format.unwrap_or_default();
        self.transcribe(Operation::CreateTranscription, request.to_form(), format)
            .await
    }

    /// Translates audio into English.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) from request construction, transport or
    /// decoding.
    #[instrument(skip(self, request), fields(model = %request.model, file = %request.filename))]
    pub async fn create_translation(&self, request: &TranslationRequest) -> Result<Transcription> {
        let format = request.response_format.unwrap_or_default();
        self.transcribe(Operation::CreateTranslation, request.to_form(), format)
            .await
    }

    async fn transcribe(
        &self,
        operation: Operation,
        form: MultipartForm,
        format: TranscriptFormat,
    ) -> Result<Transcription> {
        let body = self
            .send_raw(operation, &[], RequestBody::Multipart(form), &Query::new())
            .await?;
        if format.is_json() {
            return Self::decode(operation, &body);
        }
        Ok(Transcription {
            text: String::from_utf8_lossy(&body).into_owned(),
            ..Transcription::default()
        })
    }
}
