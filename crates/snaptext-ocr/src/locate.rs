use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use snaptext_config::ocr::OcrConfig;

/// Where the OCR engine lives. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLocation {
    Path(PathBuf),
    /// Invoke by bare name and let the OS search path resolve it
    SearchPath,
    NotFound,
}

/// Prioritized search for the engine executable; first match wins.
pub struct Locator {
    override_path: Option<PathBuf>,
    app_dir: Option<PathBuf>,
    /// Resource directory when running from a packaged bundle
    bundle_dir: Option<PathBuf>,
    bundled_dir_name: String,
    executable: String,
    fallback_paths: Vec<PathBuf>,
    path_probe: fn(&str) -> bool,
}

impl Locator {
    pub fn from_config(config: &OcrConfig) -> Self {
        let app_dir = application_dir();
        let bundle_dir = app_dir.as_deref().and_then(bundle_resources);

        Self {
            override_path: config.override_path.clone(),
            app_dir,
            bundle_dir,
            bundled_dir_name: config.bundled_dir.clone(),
            executable: config.executable_name().to_string(),
            fallback_paths: config.fallback_paths.clone(),
            path_probe: probe_search_path,
        }
    }

    pub fn locate(&self) -> EngineLocation {
        if let Some(path) = &self.override_path {
            if path.exists() {
                tracing::info!("Using explicitly configured Tesseract path: {}", path.display());
                return EngineLocation::Path(path.clone());
            }
            tracing::warn!("Configured Tesseract path {} does not exist", path.display());
        }

        if let Some(app_dir) = &self.app_dir {
            tracing::debug!("Application base path: {}", app_dir.display());
            let bundled = app_dir.join(&self.bundled_dir_name).join(&self.executable);
            if let Some(found) = check("bundled", bundled) {
                return found;
            }
        }

        if let Some(bundle_dir) = &self.bundle_dir
            && let Some(found) = check("package resources", bundle_dir.join(&self.executable))
        {
            return found;
        }

        tracing::debug!("Checking for '{}' in system PATH...", self.executable);
        if (self.path_probe)(&self.executable) {
            tracing::info!("Found Tesseract via system PATH: '{}'", self.executable);
            return EngineLocation::SearchPath;
        }
        tracing::debug!("'{}' not found or failed in system PATH", self.executable);

        for path in &self.fallback_paths {
            if let Some(found) = check("default install", path.clone()) {
                return found;
            }
        }

        tracing::error!("Tesseract executable could not be located");
        EngineLocation::NotFound
    }
}

pub fn locate(config: &OcrConfig) -> EngineLocation {
    Locator::from_config(config).locate()
}

fn check(kind: &str, candidate: PathBuf) -> Option<EngineLocation> {
    tracing::debug!("Checking {kind} path: {}", candidate.display());
    if candidate.is_file() {
        tracing::info!("Found Tesseract at {kind} location: {}", candidate.display());
        Some(EngineLocation::Path(candidate))
    } else {
        None
    }
}

/// Directory containing the running executable, or the working directory
/// if that cannot be determined.
fn application_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
}

/// `Foo.app/Contents/MacOS` -> `Foo.app/Contents/Resources`
fn bundle_resources(app_dir: &Path) -> Option<PathBuf> {
    let contents = app_dir.parent()?;
    let is_bundle = app_dir.file_name()? == "MacOS"
        && contents.file_name()? == "Contents"
        && contents.parent()?.extension()? == "app";

    is_bundle.then(|| contents.join("Resources"))
}

fn probe_search_path(executable: &str) -> bool {
    Command::new(executable)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = env::temp_dir().join(format!("snaptext-locate-{}-{name}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn touch(&self, relative: &str) -> PathBuf {
            let path = self.0.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"").unwrap();
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn locator(scratch: &Scratch) -> Locator {
        Locator {
            override_path: None,
            app_dir: Some(scratch.0.clone()),
            bundle_dir: None,
            bundled_dir_name: "Tesseract-OCR".to_string(),
            executable: "tesseract".to_string(),
            fallback_paths: Vec::new(),
            path_probe: |_| false,
        }
    }

    #[test]
    fn test_existing_override_wins() {
        let scratch = Scratch::new("override");
        let custom = scratch.touch("custom/tess");
        scratch.touch("Tesseract-OCR/tesseract");

        let mut locator = locator(&scratch);
        locator.override_path = Some(custom.clone());
        locator.path_probe = |_| panic!("search path must not be probed");

        assert_eq!(locator.locate(), EngineLocation::Path(custom));
    }

    #[test]
    fn test_missing_override_falls_through_to_bundled() {
        let scratch = Scratch::new("bundled");
        let bundled = scratch.touch("Tesseract-OCR/tesseract");

        let mut locator = locator(&scratch);
        locator.override_path = Some(scratch.0.join("nope"));

        assert_eq!(locator.locate(), EngineLocation::Path(bundled));
    }

    #[test]
    fn test_package_resources_checked() {
        let scratch = Scratch::new("package");
        let packaged = scratch.touch("Resources/tesseract");

        let mut locator = locator(&scratch);
        locator.bundle_dir = Some(scratch.0.join("Resources"));

        assert_eq!(locator.locate(), EngineLocation::Path(packaged));
    }

    #[test]
    fn test_search_path_before_fallbacks() {
        let scratch = Scratch::new("search");
        let fallback = scratch.touch("usr/bin/tesseract");

        let mut locator = locator(&scratch);
        locator.fallback_paths = vec![fallback.clone()];
        locator.path_probe = |_| true;
        assert_eq!(locator.locate(), EngineLocation::SearchPath);

        locator.path_probe = |_| false;
        assert_eq!(locator.locate(), EngineLocation::Path(fallback));
    }

    #[test]
    fn test_nothing_found() {
        let scratch = Scratch::new("none");
        let mut locator = locator(&scratch);
        locator.fallback_paths = vec![scratch.0.join("missing/tesseract")];

        assert_eq!(locator.locate(), EngineLocation::NotFound);
    }

    #[test]
    fn test_bundle_resources_detection() {
        assert_eq!(
            bundle_resources(Path::new("/Applications/SnapText.app/Contents/MacOS")),
            Some(PathBuf::from("/Applications/SnapText.app/Contents/Resources"))
        );
        assert_eq!(bundle_resources(Path::new("/usr/local/bin")), None);
    }
}
