//! Expansion of CLI inputs into motion photo candidates

use motion_core::OutputNames;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::{ExtractError, Result};

/// Turns paths and glob patterns into a deduplicated list of source files
#[derive(Debug, Clone)]
pub struct CandidateFinder {
    extension_filter: Regex,
    recursive: bool,
    skip_generated_outputs: bool,
}

impl CandidateFinder {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(ExtractError::Config("no source extensions configured".to_string()));
        }

        let extension_filter = Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|")))
            .map_err(|e| ExtractError::Config(e.to_string()))?;

        Ok(Self {
            extension_filter,
            recursive: config.recursive,
            skip_generated_outputs: config.skip_generated_outputs,
        })
    }

    /// Expand every input, in order, keeping the first occurrence of each file
    pub fn discover<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for input in inputs {
            for path in self.expand(input.as_ref())? {
                if seen.insert(path.clone()) {
                    candidates.push(path);
                }
            }
        }

        Ok(candidates)
    }

    fn expand(&self, input: &str) -> Result<Vec<PathBuf>> {
        // Existing paths win over glob syntax so names containing '[' still work
        let matched: Vec<PathBuf> = if Path::new(input).exists() {
            vec![PathBuf::from(input)]
        } else {
            let paths = glob::glob(input).map_err(|e| ExtractError::InvalidPattern {
                pattern: input.to_string(),
                message: e.to_string(),
            })?;
            paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("Cannot read {}: {}", e.path().display(), e.error());
                        None
                    }
                })
                .collect()
        };

        if matched.is_empty() {
            warn!("No files match {}", input);
        }

        let mut files = Vec::new();
        for path in matched {
            if path.is_dir() {
                if self.recursive {
                    files.extend(self.walk(&path));
                } else {
                    warn!("Skipping directory {} (use --recursive)", path.display());
                }
            } else if self.is_candidate(&path) {
                files.push(path);
            } else {
                debug!("Not a motion photo candidate: {}", path.display());
            }
        }

        Ok(files)
    }

    fn walk(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    warn!("Cannot read directory entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|path| self.is_candidate(path))
            .collect()
    }

    /// Regular file with an accepted extension, not produced by an earlier run.
    /// A `_photo.jpg` only counts as produced when its `_video.mp4` sibling exists.
    pub fn is_candidate(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }

        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extension_filter.is_match(ext))
            .unwrap_or(false);

        if !extension_ok {
            return false;
        }

        if self.skip_generated_outputs && OutputNames::is_generated_photo(path) {
            info!("Skipping output of an earlier run: {}", path.display());
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn finder(recursive: bool) -> CandidateFinder {
        CandidateFinder::new(&DiscoveryConfig {
            recursive,
            ..DiscoveryConfig::default()
        })
        .unwrap()
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let upper = temp_dir.path().join("A.JPG");
        let jpeg = temp_dir.path().join("b.Jpeg");
        let png = temp_dir.path().join("c.png");
        let none = temp_dir.path().join("jpg");
        for path in [&upper, &jpeg, &png, &none] {
            touch(path);
        }

        let finder = finder(false);
        assert!(finder.is_candidate(&upper));
        assert!(finder.is_candidate(&jpeg));
        assert!(!finder.is_candidate(&png));
        assert!(!finder.is_candidate(&none));
        assert!(!finder.is_candidate(&temp_dir.path().join("missing.jpg")));
    }

    #[test]
    fn test_glob_expansion_skips_generated_outputs() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("one.jpg"));
        touch(&temp_dir.path().join("one_photo.jpg"));
        touch(&temp_dir.path().join("one_video.mp4"));
        touch(&temp_dir.path().join("two.jpeg"));
        touch(&temp_dir.path().join("notes.txt"));

        let pattern = format!("{}/*", temp_dir.path().display());
        let mut found = finder(false).discover(&[pattern]).unwrap();
        found.sort();

        assert_eq!(
            found,
            vec![temp_dir.path().join("one.jpg"), temp_dir.path().join("two.jpeg")]
        );
    }

    #[test]
    fn test_photo_suffix_without_video_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let beach = temp_dir.path().join("beach_photo.jpg");
        touch(&beach);

        let pattern = format!("{}/*.jpg", temp_dir.path().display());
        assert_eq!(finder(false).discover(&[pattern]).unwrap(), vec![beach]);
    }

    #[test]
    fn test_duplicates_collapse_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.jpg");
        let b = temp_dir.path().join("b.jpg");
        touch(&a);
        touch(&b);

        let inputs = vec![
            b.display().to_string(),
            format!("{}/*.jpg", temp_dir.path().display()),
        ];
        let found = finder(false).discover(&inputs[..]).unwrap();

        assert_eq!(found, vec![b, a]);
    }

    #[test]
    fn test_directories_need_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2024/01/shot.jpg");
        touch(&nested);
        let inputs = [temp_dir.path().display().to_string()];

        assert!(finder(false).discover(&inputs).unwrap().is_empty());
        assert_eq!(finder(true).discover(&inputs).unwrap(), vec![nested]);
    }

    #[test]
    fn test_unmatched_pattern_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.jpg", temp_dir.path().display());
        assert!(finder(false).discover(&[pattern]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = finder(false).discover(&["photos/[*.jpg"]).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_extension_list_is_rejected() {
        let config = DiscoveryConfig {
            extensions: vec![" ".to_string()],
            ..DiscoveryConfig::default()
        };
        assert!(CandidateFinder::new(&config).is_err());
    }
}
