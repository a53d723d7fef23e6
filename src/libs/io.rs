use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::libs::error::FilterError;

/// ```
/// use std::io::BufRead;
/// let reader = synpl::reader("tests/blast/example.blast").unwrap();
/// assert_eq!(reader.lines().count(), 4);
///
/// assert!(synpl::reader("tests/blast/not_exists.blast").is_err());
/// ```
pub fn reader(input: &str) -> Result<Box<dyn BufRead>, FilterError> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path).map_err(|why| FilterError::InputNotFound {
            path: path.display().to_string(),
            reason: why.to_string(),
        })?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// A writer that only touches its destination on [`AtomicWriter::commit`].
///
/// File output is staged in a temporary file next to the destination and renamed
/// over it once complete. Dropping the writer without committing removes the
/// temporary file. `stdout` is written through directly.
pub struct AtomicWriter {
    path: String,
    sink: Sink,
}

enum Sink {
    Stdout(BufWriter<std::io::Stdout>),
    Staged(BufWriter<NamedTempFile>),
}

impl AtomicWriter {
    pub fn create(output: &str) -> Result<Self, FilterError> {
        let sink = if output == "stdout" {
            Sink::Stdout(BufWriter::new(std::io::stdout()))
        } else {
            let dir = match Path::new(output).parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => std::path::PathBuf::from("."),
            };
            let mut builder = tempfile::Builder::new();
            // 0666 is masked by the umask at creation, like File::create
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                builder.permissions(std::fs::Permissions::from_mode(0o666));
            }
            let temp = builder
                .tempfile_in(&dir)
                .map_err(|why| FilterError::OutputWrite {
                    path: output.to_string(),
                    reason: why.to_string(),
                })?;
            Sink::Staged(BufWriter::new(temp))
        };

        Ok(Self {
            path: output.to_string(),
            sink,
        })
    }

    /// Wraps an I/O error with the destination path
    pub fn error(&self, why: std::io::Error) -> FilterError {
        FilterError::OutputWrite {
            path: self.path.clone(),
            reason: why.to_string(),
        }
    }

    /// Flushes everything and moves the staged file into place.
    pub fn commit(self) -> Result<(), FilterError> {
        let path = self.path;
        let failed = |reason: String| FilterError::OutputWrite {
            path: path.clone(),
            reason,
        };

        match self.sink {
            Sink::Stdout(mut w) => w.flush().map_err(|why| failed(why.to_string())),
            Sink::Staged(w) => {
                let temp = w.into_inner().map_err(|why| failed(why.error().to_string()))?;
                // an overwritten file keeps its mode
                if let Ok(meta) = std::fs::metadata(&path) {
                    temp.as_file()
                        .set_permissions(meta.permissions())
                        .map_err(|why| failed(why.to_string()))?;
                }
                temp.persist(&path)
                    .map_err(|why| failed(why.error.to_string()))?;
                Ok(())
            }
        }
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.sink {
            Sink::Stdout(w) => w.write(buf),
            Sink::Staged(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.sink {
            Sink::Stdout(w) => w.flush(),
            Sink::Staged(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_reader_gz() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.blast.gz");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            gz.write_all(b"a b 1\nb c 2\n").unwrap();
            gz.finish().unwrap();
        }

        let mut content = String::new();
        reader(path.to_str().unwrap())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "a b 1\nb c 2\n");
    }

    #[test]
    fn test_reader_missing() {
        match reader("tests/blast/not_exists.blast") {
            Err(FilterError::InputNotFound { path, .. }) => {
                assert_eq!(path, "tests/blast/not_exists.blast")
            }
            _ => panic!("expected InputNotFound"),
        }
    }

    #[test]
    fn test_atomic_writer_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        let output = path.to_str().unwrap();

        let mut writer = AtomicWriter::create(output).unwrap();
        writer.write_all(b"a\tb\t1\n").unwrap();
        assert!(!path.exists());
        writer.commit().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\tb\t1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_writer_mode_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        let plain = dir.path().join("plain.tsv");
        std::fs::File::create(&plain).unwrap();

        let mut writer = AtomicWriter::create(path.to_str().unwrap()).unwrap();
        writer.write_all(b"a\tb\t1\n").unwrap();
        writer.commit().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let expected = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_writer_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        std::fs::write(&path, "old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let mut writer = AtomicWriter::create(path.to_str().unwrap()).unwrap();
        writer.write_all(b"new\n").unwrap();
        writer.commit().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_atomic_writer_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");

        {
            let mut writer = AtomicWriter::create(path.to_str().unwrap()).unwrap();
            writer.write_all(b"partial").unwrap();
        }

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_atomic_writer_bad_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.tsv");
        assert!(matches!(
            AtomicWriter::create(path.to_str().unwrap()),
            Err(FilterError::OutputWrite { .. })
        ));
    }
}
