//! Zip bundle of generated files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ExportResult;

/// Deflate `files` into a new archive at `archive`, each stored under its
/// bare file name.
pub fn write_archive(archive: &Path, files: &[PathBuf]) -> ExportResult<()> {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(archive)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = fs::read(path)?;
        zip.start_file(name, options)?;
        zip.write_all(&content)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_archive_stores_bare_names() {
        let dir = tempfile::tempdir().unwrap();
        let marts = dir.path().join("Data_Marts");
        fs::create_dir_all(&marts).unwrap();
        let a = marts.join("Customer_Dimension.csv");
        let b = marts.join("Sales_Fact.csv");
        fs::write(&a, "Customer ID\nC1\n").unwrap();
        fs::write(&b, "Order ID\nO1\n").unwrap();

        let archive = dir.path().join("Data_Marts.zip");
        write_archive(&archive, &[a, b]).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        let mut content = String::new();
        zip.by_name("Sales_Fact.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "Order ID\nO1\n");
    }

    #[test]
    fn test_missing_input_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_archive(&dir.path().join("out.zip"), &[dir.path().join("nope.csv")]);
        assert!(result.is_err());
    }
}
