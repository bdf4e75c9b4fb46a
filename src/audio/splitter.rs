//! Audio normalization and fixed-duration segmentation via ffmpeg.
//!
//! Produces the ordered segment sequence the pipeline consumes. Any failure
//! here is fatal to the run: with no segments there is nothing to process.

use crate::audio::exec::{CommandExecutor, SystemCommandExecutor};
use crate::defaults;
use crate::error::{Result, ScribaError};
use crate::pipeline::types::Segment;
use std::fs;
use std::path::{Path, PathBuf};

/// File name prefix and extension of split output.
const SEGMENT_PREFIX: &str = "segment_";
const SEGMENT_EXT: &str = ".mp3";

/// Configuration for audio preparation.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Duration of each segment in seconds.
    pub segment_duration_secs: u64,
    /// Run the loudness-normalization pre-pass before splitting.
    pub normalize: bool,
    /// Directory receiving normalized audio and segment files.
    pub work_dir: PathBuf,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: defaults::SEGMENT_DURATION_SECS,
            normalize: true,
            work_dir: PathBuf::from(defaults::WORK_DIR),
        }
    }
}

/// Splits one input recording into ordered fixed-duration segments.
pub struct AudioSplitter<E: CommandExecutor> {
    executor: E,
    config: SplitterConfig,
}

impl AudioSplitter<SystemCommandExecutor> {
    /// Create a splitter that shells out to ffmpeg (production use).
    pub fn system(config: SplitterConfig) -> Self {
        Self::new(SystemCommandExecutor::new(), config)
    }
}

impl<E: CommandExecutor> AudioSplitter<E> {
    /// Create a splitter with a custom executor (testing/library use).
    pub fn new(executor: E, config: SplitterConfig) -> Self {
        Self { executor, config }
    }

    /// Prepare `input` for transcription: normalize (optional), split, and
    /// enumerate the resulting segments in source order.
    pub fn prepare(&self, input: &Path) -> Result<Vec<Segment>> {
        fs::create_dir_all(&self.config.work_dir)?;
        self.remove_stale_segments()?;

        let source = if self.config.normalize {
            self.normalize(input)?
        } else {
            input.to_path_buf()
        };

        self.split(&source)?;
        self.collect_segments()
    }

    /// Loudness-normalize the whole recording before splitting, so quiet
    /// speakers transcribe as well as loud ones.
    fn normalize(&self, input: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let output = self
            .config
            .work_dir
            .join(format!("{}.normalized{}", stem, SEGMENT_EXT));

        let input_arg = input.to_string_lossy();
        let output_arg = output.to_string_lossy();
        self.executor.execute(
            "ffmpeg",
            &[
                "-y",
                "-i",
                input_arg.as_ref(),
                "-af",
                defaults::LOUDNORM_FILTER,
                output_arg.as_ref(),
            ],
        )?;

        Ok(output)
    }

    /// Split into `segment_%03d.mp3` files without re-encoding.
    fn split(&self, input: &Path) -> Result<()> {
        let pattern = self
            .config
            .work_dir
            .join(format!("{}%03d{}", SEGMENT_PREFIX, SEGMENT_EXT));

        let input_arg = input.to_string_lossy();
        let pattern_arg = pattern.to_string_lossy();
        let duration = self.config.segment_duration_secs.to_string();
        self.executor.execute(
            "ffmpeg",
            &[
                "-y",
                "-i",
                input_arg.as_ref(),
                "-f",
                "segment",
                "-segment_time",
                &duration,
                "-c",
                "copy",
                pattern_arg.as_ref(),
            ],
        )?;

        Ok(())
    }

    /// Remove segment files left by a previous run so stale audio can never
    /// leak into this run's sequence.
    fn remove_stale_segments(&self) -> Result<()> {
        for entry in fs::read_dir(&self.config.work_dir)? {
            let entry = entry?;
            if is_segment_file(&entry.file_name().to_string_lossy()) {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Enumerate produced segments, ordered by file name, indexed by
    /// position.
    fn collect_segments(&self) -> Result<Vec<Segment>> {
        let mut names: Vec<String> = fs::read_dir(&self.config.work_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| is_segment_file(name))
            .collect();
        names.sort();

        if names.is_empty() {
            return Err(ScribaError::NoSegments {
                dir: self.config.work_dir.display().to_string(),
            });
        }

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Segment::new(index, self.config.work_dir.join(name)))
            .collect())
    }
}

fn is_segment_file(name: &str) -> bool {
    name.starts_with(SEGMENT_PREFIX) && name.ends_with(SEGMENT_EXT)
}
