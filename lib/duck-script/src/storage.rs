use std::{fmt::Display, fs::{self, File}, io::{self, BufRead, BufReader, Read, Seek, SeekFrom}, path::{Path, PathBuf}};

#[derive(Debug)]
/// Script storage error
pub enum StorageError {
    IO(io::Error),
    /// Read or seek without an open script
    NotOpen,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IO(e) => f.write_fmt(format_args!("IO error, {}", e)),
            StorageError::NotOpen => f.write_str("No script open"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(value: io::Error) -> Self {
        StorageError::IO(value)
    }
}

/// Where scripts are read from. One script is open at a time.
pub trait Storage {
    /// Open a script, closing the previous one
    fn open(&mut self, path: &str) -> Result<(), StorageError>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;
    /// Read one line into `buf`, see [`FileStorage::read_line`]. 0 at end of script.
    fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;
    /// Bytes consumed from the open script
    fn position(&self) -> u64;
    fn seek(&mut self, pos: u64) -> Result<(), StorageError>;
    fn exists(&self, path: &str) -> bool;
    /// True if the last `read_line` stopped because the buffer was full
    fn in_line(&self) -> bool;
}

/// Scripts stored as files below a root directory
pub struct FileStorage {
    root: PathBuf,
    file: Option<BufReader<File>>,
    pos: u64,
    in_line: bool,
}

fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn peek_byte(file: &mut BufReader<File>) -> io::Result<Option<u8>> {
    Ok(file.fill_buf()?.first().copied())
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> FileStorage {
        FileStorage { root: root.as_ref().to_path_buf(), file: None, pos: 0, in_line: false }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Script paths are relative to the root, a leading `/` is ignored
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Create or replace a script
    pub fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Every script below the root with its size, sorted by path
    pub fn list(&self) -> Result<Vec<(String, u64)>, StorageError> {
        let mut scripts = Vec::new();
        let mut dirs = vec![self.root.clone()];
        while let Some(dir) = dirs.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let meta = entry.metadata()?;
                if meta.is_dir() {
                    dirs.push(entry.path());
                } else if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                    scripts.push((rel.to_string_lossy().to_string(), meta.len()));
                }
            }
        }
        scripts.sort();
        Ok(scripts)
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };
        let b = peek_byte(file)?;
        if b.is_some() {
            file.consume(1);
            self.pos += 1;
        }
        Ok(b)
    }

    fn skip_line_breaks(&mut self) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        while let Some(b) = peek_byte(file)? {
            if !is_line_break(b) {
                break;
            }
            file.consume(1);
            self.pos += 1;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn open(&mut self, path: &str) -> Result<(), StorageError> {
        self.close();
        let file = File::open(self.resolve(path))?;
        self.file = Some(BufReader::new(file));
        Ok(())
    }

    fn close(&mut self) {
        self.file = None;
        self.pos = 0;
        self.in_line = false;
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let file = self.file.as_mut().ok_or(StorageError::NotOpen)?;
        let len = file.read(buf)?;
        self.pos += len as u64;
        Ok(len)
    }

    /// Fill at most `buf.len() - 1` bytes with one line.
    ///
    /// `\r` becomes `\n` and the line breaks directly after it are skipped, so
    /// blank lines never reach the caller. The last line of a script is always
    /// terminated, even when the file is not. When the buffer fills before the
    /// line ends [`Storage::in_line`] is set and the rest follows on the next call.
    fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.file.is_none() {
            return Err(StorageError::NotOpen);
        }
        let max = buf.len().saturating_sub(1);
        let continued = self.in_line;
        self.in_line = false;

        let mut len = 0;
        while len < max {
            match self.next_byte()? {
                None => {
                    if len > 0 || continued {
                        buf[len] = b'\n';
                        len += 1;
                    }
                    return Ok(len);
                },
                Some(b) if is_line_break(b) => {
                    buf[len] = b'\n';
                    self.skip_line_breaks()?;
                    return Ok(len + 1);
                },
                Some(b) => {
                    buf[len] = b;
                    len += 1;
                },
            }
        }

        self.in_line = len > 0;
        Ok(len)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<(), StorageError> {
        let file = self.file.as_mut().ok_or(StorageError::NotOpen)?;
        file.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        self.in_line = false;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn in_line(&self) -> bool {
        self.in_line
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStorage, Storage, StorageError};

    fn storage_with(name: &str, content: &[u8]) -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write(name, content).unwrap();
        (dir, storage)
    }

    fn read_lines(storage: &mut FileStorage, size: usize) -> Vec<String> {
        let mut buf = vec![0; size];
        let mut lines = Vec::new();
        loop {
            let len = storage.read_line(&mut buf).unwrap();
            if len == 0 {
                break;
            }
            lines.push(String::from_utf8(buf[..len].to_vec()).unwrap());
        }
        lines
    }

    #[test]
    fn test_read_line() {
        let (_dir, mut storage) = storage_with("a.txt", b"STRING a\r\n\r\nENTER\n\nDELAY 5");
        storage.open("a.txt").unwrap();
        assert_eq!(read_lines(&mut storage, 256), vec!["STRING a\n", "ENTER\n", "DELAY 5\n"]);
        assert_eq!(storage.position(), 26);
    }

    #[test]
    fn test_read_line_fragments() {
        let (_dir, mut storage) = storage_with("a.txt", b"STRING abcdef\nB\n");
        storage.open("a.txt").unwrap();
        let mut buf = [0; 8];
        assert_eq!(storage.read_line(&mut buf).unwrap(), 7);
        assert_eq!(&buf[..7], b"STRING ");
        assert!(storage.in_line());
        assert_eq!(storage.read_line(&mut buf).unwrap(), 7);
        assert_eq!(&buf[..7], b"abcdef\n");
        assert!(!storage.in_line());
        assert_eq!(storage.read_line(&mut buf).unwrap(), 2);
        assert_eq!(storage.read_line(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_unterminated_fragment_at_eof() {
        let (_dir, mut storage) = storage_with("a.txt", b"ABC");
        storage.open("a.txt").unwrap();
        let mut buf = [0; 4];
        assert_eq!(storage.read_line(&mut buf).unwrap(), 3);
        assert!(storage.in_line());
        assert_eq!(storage.read_line(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'\n');
        assert_eq!(storage.read_line(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seek() {
        let (_dir, mut storage) = storage_with("a.txt", b"A\nB\nC\n");
        storage.open("a.txt").unwrap();
        let mut buf = [0; 16];
        storage.read_line(&mut buf).unwrap();
        let pos = storage.position();
        assert_eq!(pos, 2);
        assert_eq!(read_lines(&mut storage, 16), vec!["B\n", "C\n"]);
        storage.seek(pos).unwrap();
        assert_eq!(read_lines(&mut storage, 16), vec!["B\n", "C\n"]);
    }

    #[test]
    fn test_not_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        let mut buf = [0; 16];
        assert!(matches!(storage.read_line(&mut buf), Err(StorageError::NotOpen)));
        assert!(matches!(storage.seek(0), Err(StorageError::NotOpen)));
        assert!(matches!(storage.open("missing.txt"), Err(StorageError::IO(_))));
        assert!(!storage.is_open());
    }

    #[test]
    fn test_exists_and_list() {
        let (_dir, storage) = storage_with("main.txt", b"A\n");
        storage.write("sub/child.txt", b"BB\n").unwrap();
        assert!(storage.exists("main.txt"));
        assert!(storage.exists("/sub/child.txt"));
        assert!(!storage.exists("sub"));
        let listed = storage.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], ("main.txt".to_string(), 2));
        assert_eq!(listed[1].1, 3);
    }
}
