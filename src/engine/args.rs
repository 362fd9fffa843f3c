//! Translation of [`JobOptions`] into yt-dlp command line arguments

use crate::options::{CheckFormats, ExtractFlat, IgnoreErrors, JobOptions};
use crate::postprocessor::PostprocessorStep;

/// Prefix yt-dlp writes in front of every progress line
pub(crate) const PROGRESS_MARKER: &str = "[ytm-progress]";

/// Arguments shared by metadata and download runs
fn common_args(options: &JobOptions) -> Vec<String> {
    let mut args = vec![
        "--format".to_string(),
        options.format.clone(),
        "--retries".to_string(),
        options.retries.to_string(),
        "--fragment-retries".to_string(),
        options.fragment_retries.to_string(),
        "--no-color".to_string(),
    ];

    args.push(
        match options.check_formats {
            CheckFormats::Never => "--no-check-formats",
            CheckFormats::Selected => "--check-formats",
        }
        .to_string(),
    );

    args.push(
        match options.ignore_errors {
            IgnoreErrors::Never => "--abort-on-error",
            IgnoreErrors::OnlyDownload => "--no-abort-on-error",
            IgnoreErrors::Always => "--ignore-errors",
        }
        .to_string(),
    );

    args
}

/// Arguments for a metadata-only run
pub(crate) fn info_args(options: &JobOptions, process: bool) -> Vec<String> {
    let mut args = common_args(options);
    args.push("--dump-single-json".to_string());
    args.push("--skip-download".to_string());

    if !process || options.extract_flat != ExtractFlat::Never {
        args.push("--flat-playlist".to_string());
    }

    args
}

/// Arguments for a download run that reports progress and prints the final metadata
pub(crate) fn download_args(options: &JobOptions) -> Vec<String> {
    let mut args = common_args(options);
    args.extend([
        "--output".to_string(),
        options.output_template.clone(),
    ]);

    if options.extract_flat == ExtractFlat::Always {
        args.push("--flat-playlist".to_string());
    }

    args.extend(postprocessor_args(&options.postprocessors));

    args.extend([
        "--newline".to_string(),
        "--progress".to_string(),
        "--no-simulate".to_string(),
        "--dump-single-json".to_string(),
        "--progress-template".to_string(),
        format!("download:{PROGRESS_MARKER}%(progress)j"),
        "--progress-template".to_string(),
        format!("postprocess:{PROGRESS_MARKER}%(progress)j"),
    ]);

    args
}

/// Flatten the post-processing chain into CLI flags
///
/// The CLI accepts a single audio extraction, so the first extract step picks
/// the codec. A later extract step only supplies a quality the first one left
/// unset.
pub(crate) fn postprocessor_args(steps: &[PostprocessorStep]) -> Vec<String> {
    let mut codec: Option<String> = None;
    let mut quality: Option<String> = None;
    let mut extract = false;
    let mut concat: Option<&'static str> = None;

    for step in steps {
        match step {
            PostprocessorStep::ExtractAudio {
                preferred_codec,
                preferred_quality,
            } => {
                if !extract {
                    extract = true;
                    codec = preferred_codec.clone();
                }
                if quality.is_none() {
                    quality = preferred_quality.clone();
                }
            }
            PostprocessorStep::Concat {
                only_multi_video, ..
            } => {
                concat.get_or_insert(if *only_multi_video {
                    "multi_video"
                } else {
                    "always"
                });
            }
        }
    }

    let mut args = Vec::new();
    if extract {
        args.push("--extract-audio".to_string());
        args.push("--audio-format".to_string());
        args.push(codec.unwrap_or_else(|| "best".to_string()));
        if let Some(quality) = quality {
            args.push("--audio-quality".to_string());
            args.push(quality);
        }
    }
    if let Some(mode) = concat {
        args.push("--concat-playlist".to_string());
        args.push(mode.to_string());
    }

    args
}
