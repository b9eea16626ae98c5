use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the motion photo extractor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files are considered motion photo candidates
    pub discovery: DiscoveryConfig,

    /// Where and how extracted assets are written
    pub output: OutputConfig,

    /// Concurrency settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Accepted source extensions, compared case-insensitively
    pub extensions: Vec<String>,

    /// Descend into directories given as inputs
    pub recursive: bool,

    /// Ignore `*_photo.jpg` files left by an earlier run
    pub skip_generated_outputs: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for extracted files; next to each source when unset
    pub output_dir: Option<PathBuf>,

    /// Remove the source once both assets are written
    pub delete_original: bool,

    /// Leave sources alone whose outputs already exist
    pub skip_existing: bool,

    /// Split but write and delete nothing
    pub dry_run: bool,

    /// Write a JSON batch report here
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Maximum number of files processed at once
    pub max_workers: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            recursive: false,
            skip_generated_outputs: true,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get().min(8),
        }
    }
}

impl Config {
    /// Load configuration from the first readable config file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = ["motion-extract.toml", "config/motion-extract.toml"];

        let mut config = Self::default();
        for path in &config_paths {
            if !Path::new(path).is_file() {
                continue;
            }
            match Self::load_from(Path::new(path)) {
                Ok(loaded) => {
                    tracing::info!("📄 Loaded configuration from: {}", path);
                    config = loaded;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {:#}", path, e);
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load an explicitly chosen config file, then apply environment overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::load_file_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load_file`] with the environment supplied by `lookup`
    pub fn load_file_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from(path)?;
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Override settings from `MOTION_EXTRACT_*` variables provided by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup("MOTION_EXTRACT_WORKERS") {
            self.performance.max_workers = workers
                .parse()
                .with_context(|| format!("MOTION_EXTRACT_WORKERS is not a number: {}", workers))?;
        }

        if let Some(output_dir) = lookup("MOTION_EXTRACT_OUTPUT_DIR") {
            self.output.output_dir = Some(PathBuf::from(output_dir));
        }

        if let Some(delete) = lookup("MOTION_EXTRACT_DELETE_ORIGINAL") {
            self.output.delete_original = parse_flag(&delete)
                .ok_or_else(|| anyhow!("MOTION_EXTRACT_DELETE_ORIGINAL is not a boolean: {}", delete))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.discovery.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(anyhow!("at least one source extension is required"));
        }

        if let Some(ref dir) = self.output.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(anyhow!("output directory is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Motion Extract Configuration:\n\
            - Workers: {}\n\
            - Extensions: {}\n\
            - Recursive: {}\n\
            - Output Directory: {}\n\
            - Delete Original: {}\n\
            - Dry Run: {}",
            self.performance.max_workers,
            self.discovery.extensions.join(", "),
            self.discovery.recursive,
            self.output
                .output_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "(next to source)".to_string()),
            self.output.delete_original,
            self.output.dry_run,
        )
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.output_dir = Some(dir);
        self
    }

    pub fn with_report_path(mut self, path: PathBuf) -> Self {
        self.config.output.report_path = Some(path);
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.discovery.extensions = extensions;
        self
    }

    pub fn delete_original(mut self, enable: bool) -> Self {
        self.config.output.delete_original = enable;
        self
    }

    pub fn skip_existing(mut self, enable: bool) -> Self {
        self.config.output.skip_existing = enable;
        self
    }

    pub fn dry_run(mut self, enable: bool) -> Self {
        self.config.output.dry_run = enable;
        self
    }

    pub fn recursive(mut self, enable: bool) -> Self {
        self.config.discovery.recursive = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
