use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use image::{DynamicImage, ImageFormat};
use snaptext_config::ocr::OcrConfig;
use snaptext_core::error::{RecognizeError, StartupError};
use snaptext_core::pipeline::TextRecognizer;

use crate::locate::EngineLocation;

/// Tesseract driven as a subprocess: PNG on stdin, UTF-8 text on stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
    language: String,
    oem: u8,
    psm: u8,
}

impl TesseractEngine {
    pub fn new(program: impl Into<PathBuf>, config: &OcrConfig) -> Self {
        Self {
            program: program.into(),
            language: config.language.clone(),
            oem: config.oem,
            psm: config.psm,
        }
    }

    /// Builds the engine for a resolved location. When relying on the search
    /// path the engine is queried once so a broken install fails here rather
    /// than on the first capture.
    pub fn from_location(location: &EngineLocation, config: &OcrConfig) -> Result<Self, StartupError> {
        Self::from_location_with(location, config.executable_name(), config)
    }

    /// [`TesseractEngine::from_location`] with the name used for a search
    /// path lookup given explicitly.
    pub fn from_location_with(
        location: &EngineLocation,
        search_name: &str,
        config: &OcrConfig,
    ) -> Result<Self, StartupError> {
        match location {
            EngineLocation::Path(path) => Ok(Self::new(path, config)),
            EngineLocation::SearchPath => {
                let engine = Self::new(search_name, config);
                tracing::info!("Verifying Tesseract accessibility via system PATH...");
                match engine.version() {
                    Ok(version) => {
                        tracing::info!("Tesseract {version} reachable via PATH");
                        Ok(engine)
                    }
                    Err(e) => Err(StartupError::EngineInaccessible(e.to_string())),
                }
            }
            EngineLocation::NotFound => Err(StartupError::EngineNotFound),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for a stdin-to-stdout recognition run
    pub fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
            "-l".to_string(),
            self.language.clone(),
        ]
    }

    /// First line of `tesseract --version`, e.g. `tesseract 5.3.4`
    pub fn version(&self) -> Result<String, RecognizeError> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_error)?;
        check_status(&output)?;

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };

        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }
        command
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RecognizeError::Invocation(format!("Failed to encode image: {e}")))?;

        tracing::debug!(
            "Running {} {} on {} bytes",
            self.program.display(),
            self.args().join(" "),
            png.len()
        );

        let mut child = self
            .command()
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(&png)
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            // Reap the child before bailing
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        let output = child.wait_with_output()?;
        check_status(&output)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn spawn_error(e: io::Error) -> RecognizeError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => RecognizeError::EngineNotFound,
        _ => RecognizeError::Io(e),
    }
}

fn check_status(output: &Output) -> Result<(), RecognizeError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    Err(RecognizeError::Invocation(if stderr.is_empty() {
        format!("Tesseract exited with {}", output.status)
    } else {
        stderr.to_string()
    }))
}

#[cfg(test)]
mod tests {
    use image::GrayImage;

    use super::*;

    fn missing() -> TesseractEngine {
        TesseractEngine::new("/nonexistent/snaptext/tesseract", &OcrConfig::default())
    }

    #[test]
    fn test_args_match_engine_config() {
        let engine = missing();
        assert_eq!(
            engine.args(),
            vec!["stdin", "stdout", "--oem", "3", "--psm", "6", "-l", "eng"]
        );
    }

    #[test]
    fn test_missing_binary_is_not_found() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(matches!(missing().recognize(&image), Err(RecognizeError::EngineNotFound)));
        assert!(matches!(missing().version(), Err(RecognizeError::EngineNotFound)));
    }

    #[test]
    fn test_not_found_location_is_fatal() {
        let result = TesseractEngine::from_location(&EngineLocation::NotFound, &OcrConfig::default());
        assert!(matches!(result, Err(StartupError::EngineNotFound)));
    }

    #[test]
    fn test_explicit_location_used_verbatim() {
        let path = PathBuf::from("/opt/tesseract/bin/tesseract");
        let engine =
            TesseractEngine::from_location(&EngineLocation::Path(path.clone()), &OcrConfig::default())
                .unwrap();
        assert_eq!(engine.program(), path);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_engine_on_search_path_is_fatal() {
        let result =
            TesseractEngine::from_location_with(&EngineLocation::SearchPath, "false", &OcrConfig::default());
        assert!(matches!(result, Err(StartupError::EngineInaccessible(_))));
    }

    #[test]
    fn test_unreachable_engine_on_search_path_is_fatal() {
        let result = TesseractEngine::from_location_with(
            &EngineLocation::SearchPath,
            "snaptext-no-such-tesseract",
            &OcrConfig::default(),
        );
        assert!(matches!(result, Err(StartupError::EngineInaccessible(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_working_engine_on_search_path_is_kept() {
        // `true` accepts any arguments and exits 0 with empty output
        let engine =
            TesseractEngine::from_location_with(&EngineLocation::SearchPath, "true", &OcrConfig::default())
                .unwrap();
        assert_eq!(engine.program(), Path::new("true"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_engine_is_invocation_error() {
        let engine = TesseractEngine::new("false", &OcrConfig::default());
        let image = DynamicImage::ImageLuma8(GrayImage::new(64, 64));

        match engine.recognize(&image) {
            Err(RecognizeError::Invocation(message)) => assert!(message.contains("exited")),
            other => panic!("expected invocation error, got {other:?}"),
        }
    }
}
