use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Result, anyhow};

/// Input reader that handles both file and pipe input.
///
/// Captures are decoded as a whole, so the reader only offers reading
/// everything at once.
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();
        let is_pipe = path.to_string_lossy() == "-";

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(path)
                .map_err(|e| anyhow!("File not found or unreadable: {}: {e}", path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// Read all remaining data
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Reads a complete capture from a file path or stdin.
pub fn read_capture<P: AsRef<Path>>(input_path: P) -> Result<Vec<u8>> {
    let mut reader = InputReader::new(&input_path)?;
    let data = reader.read_all()?;

    log::debug!(
        "Read {} bytes from {}",
        data.len(),
        if reader.is_pipe() {
            "stdin".to_string()
        } else {
            input_path.as_ref().display().to_string()
        }
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_whole_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&[0x80, 0x7F, 0x7F, 0x80])?;

        assert_eq!(read_capture(file.path())?, vec![0x80, 0x7F, 0x7F, 0x80]);
        Ok(())
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(read_capture(dir.path().join("missing.dat")).is_err());
    }
}
