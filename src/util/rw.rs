use std::{cell::RefCell, fmt::Write, io, path::PathBuf, rc::Rc};

// Shared, single-threaded mutable handle.
pub type RcRefCell<T> = Rc<RefCell<T>>;

pub struct StringBuffer {
    s: String,
}

impl StringBuffer {
    pub fn new() -> StringBuffer {
        StringBuffer{s: String::new()}
    }

    pub fn as_str(&self) -> &str {
        self.s.as_str()
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// String only implements fmt::Write
impl io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str_rep = std::str::from_utf8(buf)
            .map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, e)
            })?;
        let res = self.s.write_str(str_rep);
        match res {
            Ok(_) => Ok(buf.len()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// For convenience, so we can pass around a shared stream writer.
//
// Used to capture errors and warnings of interest to users, so they can
// be presented either to the stderr, or buffered and inspected (in tests).
#[derive(Clone)]
pub struct WriteHandle {
    w: RcRefCell<dyn io::Write>,
}

impl WriteHandle {
    pub fn stdout_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::stdout()))
        }
    }

    pub fn stderr_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::stderr()))
        }
    }

    pub fn string_buff_write_handle() -> (WriteHandle, RcRefCell<StringBuffer>) {
        let buffer = Rc::new(RefCell::new(StringBuffer::new()));
        let h = WriteHandle{
            w: buffer.clone()
        };
        (h, buffer)
    }

    pub fn empty_write_handle() -> WriteHandle {
        WriteHandle{
            w: Rc::new(RefCell::new(io::empty()))
        }
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The test framework cannot capture direct writes to stdout or stderr,
        // so leave a trace of everything that goes through here.
        tracing::trace!("WriteHandle::write {}", String::from_utf8_lossy(buf));
        self.w.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.borrow_mut().flush()
    }
}

/// writeln! to a WriteHandle (or any io::Write), ignoring write failures.
/// There is nowhere left to report a failure to write an error.
#[macro_export]
macro_rules! write_errln {
    ($dst:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = writeln!($dst, $($arg)*);
    }};
}

// Generally, this will represent a file that has been opened,
// where we want to track the name along with it.
// Though it may be pre-read, in which case, we can just store
// the string.
pub enum DescribedReader {
    String((String, String)),
    FilePath(PathBuf),
}

impl DescribedReader {
    pub fn from_string(desc: String, data: String) -> DescribedReader {
        DescribedReader::String((desc, data))
    }

    pub fn from_file_path(path: PathBuf) -> DescribedReader {
        DescribedReader::FilePath(path)
    }

    pub fn desc(&self) -> &str {
        match self {
            DescribedReader::String((name, _)) => name,
            DescribedReader::FilePath(path) =>
                path.to_str().unwrap_or("<unknown path>"),
        }
    }

    pub fn reader<'a>(&'a self) -> Result<Box<dyn io::Read + 'a>,
                                          std::io::Error> {
        match self {
            DescribedReader::String((_, text)) => {
                Ok(Box::new(text.as_bytes()))
            },
            DescribedReader::FilePath(path) => {
                let f = std::fs::File::open(path)?;
                Ok(Box::new(f))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::{DescribedReader, StringBuffer, WriteHandle};

    #[test]
    fn test_string_buffer() {
        let mut buff = StringBuffer::new();
        let _ = write!(buff, "Some {}", "text");
        let _ = writeln!(buff, " 1");
        assert_eq!(buff.as_str(), "Some text 1\n");
    }

    #[test]
    fn test_write_handle() {
        let (mut handle, buff)
            = WriteHandle::string_buff_write_handle();
        let _ = write!(handle, "Some {}", "text");
        write_errln!(handle, " {}", 1);
        assert_eq!(buff.borrow().as_str(), "Some text 1\n");

        // Clones share the same underlying buffer
        let mut handle2 = handle.clone();
        write_errln!(handle2, "more");
        assert_eq!(buff.borrow().as_str(), "Some text 1\nmore\n");
    }

    #[test]
    fn test_described_reader() {
        let r = DescribedReader::from_string(
            "ledger.csv".to_string(), "a,b\n1,2\n".to_string());
        assert_eq!(r.desc(), "ledger.csv");
        let mut s = String::new();
        r.reader().unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "a,b\n1,2\n");

        let missing = DescribedReader::from_file_path(
            "/nonexistent/dir/ledger.csv".into());
        assert!(missing.reader().is_err());
    }
}
