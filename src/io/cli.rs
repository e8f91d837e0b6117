//! Command-line interface for batch compression and decompression of images

use crate::algorithm::decoder::{ResidualImage, decompress};
use crate::algorithm::encoder::{CompressionConfig, CompressionSession, StepOutcome};
use crate::analysis::quality::QualityReport;
use crate::io::configuration::{
    DECODED_SUFFIX, DEFAULT_BLOCK_SIZE, DEFAULT_TILE_SIZE, DEFAULT_TOLERANCE, GIF_FRAME_DELAY_MS,
    IMAGE_EXTENSIONS, LOG_EXTENSION, PREVIEW_SUFFIX, REPLAY_SUFFIX, RESIDUAL_SUFFIX, SCALE_RATE,
};
use crate::io::error::{CodecError, Result, invalid_parameter};
use crate::io::format::{LogHeader, read_log, write_log};
use crate::io::image::{load_image, save_image};
use crate::io::progress::ProgressManager;
use crate::io::visualization::ReplayCapture;
use crate::spatial::downsample::{block_average, upscale_nearest};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fractile")]
#[command(
    author,
    version,
    about = "Compress images into self-similar tile transforms and reconstruct them"
)]
/// Command-line arguments for the compressor
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image, transform log, or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Side length of destination tiles in pixels
    #[arg(short, long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: usize,

    /// Match tolerance; a match is accepted when its summed squared error is at most tolerance²
    #[arg(short = 'T', long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: u32,

    /// Block size of the coarse preview
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Convert input images to gray before compressing
    #[arg(short, long)]
    pub grayscale: bool,

    /// Write a block-averaged preview of each input at full resolution
    #[arg(short, long)]
    pub preview: bool,

    /// Write an animated GIF replaying discovery and reconstruction
    #[arg(short, long)]
    pub visualize: bool,

    /// Reconstruct from transform logs instead of compressing images
    #[arg(short, long)]
    pub decode: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Encoding parameters selected on the command line
    pub const fn compression_config(&self) -> CompressionConfig {
        CompressionConfig {
            tile_size: self.tile_size,
            tolerance: self.tolerance,
        }
    }
}

/// Orchestrates batch processing of images or transform logs with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            if self.cli.decode {
                self.decode_file(file, index)?;
            } else {
                self.encode_file(file, index)?;
            }
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Check whether a path is an input for the selected mode
    ///
    /// Images carrying one of this tool's output suffixes are not inputs
    pub fn is_input(&self, path: &Path) -> bool {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if self.cli.decode {
            return extension == LOG_EXTENSION;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        IMAGE_EXTENSIONS.contains(&extension.as_str())
            && ![DECODED_SUFFIX, RESIDUAL_SUFFIX, PREVIEW_SUFFIX]
                .iter()
                .any(|suffix| stem.ends_with(suffix))
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if self.is_input(&self.cli.target) {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else if self.cli.decode {
                Err(crate::io::error::io_error(
                    "Target file must be a transform log (.ftl)",
                ))
            } else {
                Err(crate::io::error::io_error(
                    "Target file must be a PNG or JPEG image",
                ))
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            let entries = std::fs::read_dir(&self.cli.target).map_err(|e| CodecError::FileSystem {
                path: self.cli.target.clone(),
                operation: "read directory",
                source: e,
            })?;
            for entry in entries {
                let path = entry?.path();
                if path.is_file() && self.is_input(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(crate::io::error::io_error(
                "Target must be an image, a transform log, or a directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::sibling_path(input_path, DECODED_SUFFIX, "png");
        if output_path.exists() {
            warn!(input = %input_path.display(), "Skipping, output exists");
            false
        } else {
            true
        }
    }

    fn encode_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();

        let mut source = load_image(input_path)?;
        if self.cli.grayscale {
            source = source.to_grayscale();
        }

        let tile_size = self.cli.tile_size;
        if source.width() < tile_size || source.height() < tile_size {
            warn!(
                input = %input_path.display(),
                width = source.width(),
                height = source.height(),
                tile_size,
                "Skipping, image holds no whole tile"
            );
            if let Some(ref mut pm) = self.progress_manager {
                pm.complete_file(index);
            }
            return Ok(());
        }

        let mut session = CompressionSession::new(source, self.cli.compression_config())?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, session.tiles_total());
        }

        while session.step()? != StepOutcome::Finished {
            if let Some(ref mut pm) = self.progress_manager {
                pm.update_tiles(index, session.tiles_processed(), session.log().len());
            }
        }

        let config = *session.config();
        let residual = session.residual()?;
        let reconstructed = decompress(&residual, session.log(), config.tile_size, SCALE_RATE)?;

        save_image(
            residual.image(),
            &Self::sibling_path(input_path, RESIDUAL_SUFFIX, "png"),
        )?;
        write_log(
            &Self::sibling_path(input_path, "", LOG_EXTENSION),
            &Self::log_header(session.source().width(), session.source().height(), &config)?,
            session.log(),
        )?;
        save_image(
            &reconstructed,
            &Self::sibling_path(input_path, DECODED_SUFFIX, "png"),
        )?;

        if self.cli.preview {
            let coarse = block_average(session.source(), self.cli.block_size)?;
            let preview = upscale_nearest(
                &coarse,
                self.cli.block_size,
                session.source().width(),
                session.source().height(),
            )?;
            save_image(
                &preview,
                &Self::sibling_path(input_path, PREVIEW_SUFFIX, "png"),
            )?;
        }

        if self.cli.visualize {
            if session.log().is_empty() {
                warn!(input = %input_path.display(), "No transforms found, skipping replay");
            } else {
                ReplayCapture::new(session.source(), &residual, session.log(), config.tile_size)
                    .export_gif(
                        &Self::sibling_path(input_path, REPLAY_SUFFIX, "gif"),
                        GIF_FRAME_DELAY_MS,
                    )?;
            }
        }

        let report = QualityReport::measure(
            session.source(),
            &reconstructed,
            session.occupancy(),
            session.log(),
        )?;
        info!(
            input = %input_path.display(),
            transforms = report.transform_count,
            claimed = %format!("{:.1}%", report.claimed_ratio * 100.0),
            psnr_db = %format!("{:.2}", report.psnr),
            ratio = %format!("{:.2}", report.compression_ratio),
            checksum = %format!("{:016x}", reconstructed.checksum()),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Compressed"
        );

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        Ok(())
    }

    fn decode_file(&mut self, log_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();
        let (header, log) = read_log(log_path)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, log_path, log.len());
        }

        let residual_path = Self::sibling_path(log_path, RESIDUAL_SUFFIX, "png");
        let residual = ResidualImage::from_log(
            load_image(&residual_path)?,
            &log,
            header.tile_size as usize,
        );
        let dims = (residual.image().width(), residual.image().height());
        if dims != (header.width as usize, header.height as usize) {
            return Err(CodecError::InvalidSourceData {
                reason: format!(
                    "residual '{}' is {}x{} but the log describes {}x{}",
                    residual_path.display(),
                    dims.0,
                    dims.1,
                    header.width,
                    header.height
                ),
            });
        }

        let reconstructed = decompress(
            &residual,
            &log,
            header.tile_size as usize,
            header.scale_rate as usize,
        )?;
        save_image(
            &reconstructed,
            &Self::sibling_path(log_path, DECODED_SUFFIX, "png"),
        )?;

        info!(
            input = %log_path.display(),
            transforms = log.len(),
            checksum = %format!("{:016x}", reconstructed.checksum()),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Decompressed"
        );

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        Ok(())
    }

    fn log_header(width: usize, height: usize, config: &CompressionConfig) -> Result<LogHeader> {
        let to_u32 = |parameter: &'static str, value: usize| {
            u32::try_from(value)
                .ok()
                .ok_or_else(|| invalid_parameter(parameter, &value, &"exceeds u32 range"))
        };

        Ok(LogHeader {
            width: to_u32("width", width)?,
            height: to_u32("height", height)?,
            tile_size: to_u32("tile_size", config.tile_size)?,
            scale_rate: to_u32("scale_rate", SCALE_RATE)?,
        })
    }

    /// Path next to `input_path` named `<stem><suffix>.<extension>`
    pub fn sibling_path(input_path: &Path, suffix: &str, extension: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(name)
        } else {
            PathBuf::from(name)
        }
    }
}
