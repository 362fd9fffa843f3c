//! Per-job extraction options
//!
//! The service holds one immutable base [`JobOptions`]. Every download job
//! derives its own copy from it, so concurrent jobs never observe each
//! other's post-processing chains.

use crate::postprocessor::{self, PostprocessorStep, StepTiming};
use crate::types::DownloadRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which formats the engine probes before selecting one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckFormats {
    /// Do not probe formats
    Never,
    /// Probe only the selected format (default)
    #[default]
    Selected,
}

/// How deeply playlist entries are resolved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractFlat {
    /// Resolve every entry
    Never,
    /// Resolve entries while downloading, keep them flat when only listing (default)
    #[default]
    DiscardInPlaylist,
    /// Never resolve entries
    Always,
}

/// Which errors the engine skips over instead of aborting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreErrors {
    /// Abort on the first error
    Never,
    /// Skip download errors, fail on extraction errors (default)
    #[default]
    OnlyDownload,
    /// Skip every error
    Always,
}

/// Options handed to the extraction engine for a single run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobOptions {
    /// Format selector (default: "bestaudio/best")
    #[serde(default = "default_format")]
    pub format: String,

    /// Output filename template (default: "cache/%(id)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Retries for the whole request (default: 10)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Retries for individual fragments (default: 10)
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,

    /// Format probing policy
    #[serde(default)]
    pub check_formats: CheckFormats,

    /// Playlist flattening policy
    #[serde(default)]
    pub extract_flat: ExtractFlat,

    /// Error skipping policy
    #[serde(default)]
    pub ignore_errors: IgnoreErrors,

    /// Ordered post-processing chain
    #[serde(default = "default_postprocessors")]
    pub postprocessors: Vec<PostprocessorStep>,

    /// Extension of the final file when a conversion was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_ext: Option<String>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_template: default_output_template(),
            retries: default_retries(),
            fragment_retries: default_retries(),
            check_formats: CheckFormats::default(),
            extract_flat: ExtractFlat::default(),
            ignore_errors: IgnoreErrors::default(),
            postprocessors: default_postprocessors(),
            final_ext: None,
        }
    }
}

impl JobOptions {
    /// Derive the options for one download job
    ///
    /// Returns an independent copy of `self`. When `request.convert_to` names a
    /// supported format its step is inserted at the front of the chain and the
    /// target extension is recorded; otherwise the chain is left as is.
    pub fn for_request(&self, request: &DownloadRequest) -> JobOptions {
        let mut options = self.clone();

        if let Some(spec) = postprocessor::select(request.convert_to.as_deref()) {
            options.postprocessors.insert(0, spec.step());
            options.final_ext = Some(spec.target_extension.to_string());
        }

        options
    }
}

fn default_format() -> String {
    "bestaudio/best".to_string()
}

fn default_output_template() -> String {
    "cache/%(id)s".to_string()
}

fn default_retries() -> u32 {
    10
}

fn default_postprocessors() -> Vec<PostprocessorStep> {
    vec![
        PostprocessorStep::extract_audio("5"),
        PostprocessorStep::Concat {
            only_multi_video: true,
            when: StepTiming::Playlist,
        },
    ]
}
