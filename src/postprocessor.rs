//! Post-processing steps and the audio conversion format table
//!
//! A job's post-processing chain is an ordered list of [`PostprocessorStep`]s
//! handed to the extraction engine. Requesting a conversion looks the
//! `convert_to` token up in a fixed table and prepends the matching step.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// When a step runs relative to the extraction lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepTiming {
    /// After each downloaded item (default)
    PostProcess,
    /// Once after the whole playlist has been processed
    Playlist,
}

/// A single processing step applied after retrieval
///
/// The engine interprets these; the job subsystem only orders them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "key")]
pub enum PostprocessorStep {
    /// Extract the audio track, optionally transcoding it
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        /// Target codec; `None` keeps the best available codec
        #[serde(
            rename = "preferredcodec",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        preferred_codec: Option<String>,
        /// VBR quality (0 best .. 10 worst) or a bitrate such as "192K"
        #[serde(
            rename = "preferredquality",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        preferred_quality: Option<String>,
    },

    /// Concatenate the entries of a multi-video playlist into one file
    #[serde(rename = "FFmpegConcat")]
    Concat {
        /// Only concatenate playlists flagged as multi-video
        #[serde(default)]
        only_multi_video: bool,
        /// When the step runs
        #[serde(default = "default_concat_timing")]
        when: StepTiming,
    },
}

fn default_concat_timing() -> StepTiming {
    StepTiming::Playlist
}

impl PostprocessorStep {
    /// Audio extraction keeping the source codec at the given quality
    pub fn extract_audio(quality: impl Into<String>) -> Self {
        PostprocessorStep::ExtractAudio {
            preferred_codec: None,
            preferred_quality: Some(quality.into()),
        }
    }

    /// Stable key naming the step kind
    pub fn key(&self) -> &'static str {
        match self {
            PostprocessorStep::ExtractAudio { .. } => "FFmpegExtractAudio",
            PostprocessorStep::Concat { .. } => "FFmpegConcat",
        }
    }
}

/// A supported conversion target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostprocessorSpec {
    /// Token accepted in `convert_to` (e.g. "mp3")
    pub id: &'static str,
    /// Extension of the produced file
    pub target_extension: &'static str,
    /// Codec name passed to the extract-audio step
    codec: &'static str,
}

impl PostprocessorSpec {
    /// The step to prepend to the processing chain
    pub fn step(&self) -> PostprocessorStep {
        PostprocessorStep::ExtractAudio {
            preferred_codec: Some(self.codec.to_string()),
            preferred_quality: None,
        }
    }
}

const FORMAT_TABLE: &[PostprocessorSpec] = &[
    PostprocessorSpec {
        id: "mp3",
        target_extension: "mp3",
        codec: "mp3",
    },
    PostprocessorSpec {
        id: "m4a",
        target_extension: "m4a",
        codec: "m4a",
    },
    PostprocessorSpec {
        id: "aac",
        target_extension: "m4a",
        codec: "aac",
    },
    PostprocessorSpec {
        id: "opus",
        target_extension: "opus",
        codec: "opus",
    },
    PostprocessorSpec {
        id: "vorbis",
        target_extension: "ogg",
        codec: "vorbis",
    },
    PostprocessorSpec {
        id: "flac",
        target_extension: "flac",
        codec: "flac",
    },
    PostprocessorSpec {
        id: "wav",
        target_extension: "wav",
        codec: "wav",
    },
    PostprocessorSpec {
        id: "alac",
        target_extension: "m4a",
        codec: "alac",
    },
];

/// Resolve a `convert_to` token to its conversion spec
///
/// Unknown tokens resolve to `None` so the request proceeds with the default
/// chain instead of failing.
pub fn select(convert_to: Option<&str>) -> Option<&'static PostprocessorSpec> {
    let token = convert_to?.trim();
    let spec = FORMAT_TABLE
        .iter()
        .find(|spec| spec.id.eq_ignore_ascii_case(token));

    if spec.is_none() {
        debug!(convert_to = token, "ignoring unrecognized conversion format");
    }

    spec
}

/// All tokens accepted by [`select`], in table order
pub fn supported_formats() -> Vec<&'static str> {
    FORMAT_TABLE.iter().map(|spec| spec.id).collect()
}
