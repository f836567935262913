//! src/loader.rs

/********************************************************************************
 *                              LOADER MODULE
 *-------------------------------------------------------------------------------*
 * The host contract behind `import`/`netImport`: given a path or URL, yield
 * UTF-8 source text. Resolution policy (relative paths, caching, URL schemes)
 * is a host concern; this crate ships the two thin implementations a
 * conforming host needs and nothing more.
 ********************************************************************************/

use crate::error::MindError;

pub trait ModuleLoader {
    fn load(&self, path: &str) -> Result<String, MindError>;
}

pub struct FsLoader;

impl ModuleLoader for FsLoader {
    fn load(&self, path: &str) -> Result<String, MindError> {
        std::fs::read_to_string(path)
            .map_err(|e| MindError::value_error(format!("cannot read '{}': {}", path, e), None))
    }
}

pub struct HttpLoader;

impl ModuleLoader for HttpLoader {
    fn load(&self, url: &str) -> Result<String, MindError> {
        reqwest::blocking::get(url)
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| MindError::value_error(format!("cannot fetch '{}': {}", url, e), None))?
            .text()
            .map_err(|e| MindError::value_error(format!("invalid response body from '{}': {}", url, e), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_fs_loader_reads_file() {
        // Arrange
        let mut path = std::env::temp_dir();
        path.push("mindscript_loader_test.ms");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "let x = 1; x").unwrap();

        // Act
        let source = FsLoader.load(path.to_str().unwrap()).unwrap();

        // Assert
        assert_eq!(source, "let x = 1; x");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_fs_loader_errors_on_missing_file() {
        // Arrange / Act
        let result = FsLoader.load("/nonexistent/path/does-not-exist.ms");

        // Assert
        assert!(result.is_err());
    }
}
