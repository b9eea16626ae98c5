//! Naming of the files produced from a motion photo

use std::path::{Path, PathBuf};

/// Suffix appended to the source stem for the extracted image
pub const PHOTO_SUFFIX: &str = "_photo.jpg";

/// Suffix appended to the source stem for the extracted clip
pub const VIDEO_SUFFIX: &str = "_video.mp4";

/// Destination paths for the two assets of one source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputNames {
    pub photo: PathBuf,
    pub video: PathBuf,
}

impl OutputNames {
    /// Outputs land in `output_dir` when given, otherwise next to the source
    pub fn for_source(source: &Path, output_dir: Option<&Path>) -> Self {
        let dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source.parent().unwrap_or(Path::new("")).to_path_buf());
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            photo: dir.join(format!("{}{}", stem, PHOTO_SUFFIX)),
            video: dir.join(format!("{}{}", stem, VIDEO_SUFFIX)),
        }
    }

    /// Whether a path is an image this tool already extracted: a `_photo.jpg`
    /// name whose matching `_video.mp4` sits next to it
    pub fn is_generated_photo(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let Some(stem_len) = name.len().checked_sub(PHOTO_SUFFIX.len()) else {
            return false;
        };
        let (Some(stem), Some(suffix)) = (name.get(..stem_len), name.get(stem_len..)) else {
            return false;
        };
        if !suffix.eq_ignore_ascii_case(PHOTO_SUFFIX) {
            return false;
        }

        path.with_file_name(format!("{}{}", stem, VIDEO_SUFFIX)).is_file()
    }

    /// Both outputs are present on disk
    pub fn exist(&self) -> bool {
        self.photo.is_file() && self.video.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_next_to_source() {
        let names = OutputNames::for_source(Path::new("camera/PXL_0001.MP.jpg"), None);
        assert_eq!(names.photo, PathBuf::from("camera/PXL_0001.MP_photo.jpg"));
        assert_eq!(names.video, PathBuf::from("camera/PXL_0001.MP_video.mp4"));
    }

    #[test]
    fn test_names_in_output_dir() {
        let names = OutputNames::for_source(Path::new("camera/IMG_1.jpeg"), Some(Path::new("out")));
        assert_eq!(names.photo, PathBuf::from("out/IMG_1_photo.jpg"));
        assert_eq!(names.video, PathBuf::from("out/IMG_1_video.mp4"));
    }

    #[test]
    fn test_bare_file_name() {
        let names = OutputNames::for_source(Path::new("shot.jpg"), None);
        assert_eq!(names.photo, PathBuf::from("shot_photo.jpg"));
    }

    #[test]
    fn test_generated_photo_needs_sibling_video() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let photo = temp_dir.path().join("shot_photo.jpg");
        let upper = temp_dir.path().join("BEACH_PHOTO.JPG");
        std::fs::write(&photo, b"x").unwrap();
        std::fs::write(&upper, b"x").unwrap();

        assert!(!OutputNames::is_generated_photo(&photo));
        assert!(!OutputNames::is_generated_photo(&upper));

        std::fs::write(temp_dir.path().join("shot_video.mp4"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("BEACH_video.mp4"), b"x").unwrap();

        assert!(OutputNames::is_generated_photo(&photo));
        assert!(OutputNames::is_generated_photo(&upper));
        assert!(!OutputNames::is_generated_photo(&temp_dir.path().join("shot.jpg")));
        assert!(!OutputNames::is_generated_photo(Path::new("photo.jpg")));
    }
}
