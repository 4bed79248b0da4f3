//! Output streams and process termination, injected into the parser.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub trait Terminal {
    fn stdout(&mut self) -> &mut dyn Write;
    fn stderr(&mut self) -> &mut dyn Write;
    /// Terminate with `status`. Implementations may return instead of
    /// exiting; the parser halts either way.
    fn exit(&mut self, status: i32);
}

/// The real process streams; `exit` ends the process.
pub struct ProcessTerminal {
    out: io::Stdout,
    err: io::Stderr,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        ProcessTerminal {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        ProcessTerminal::new()
    }
}

impl Terminal for ProcessTerminal {
    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }

    fn exit(&mut self, status: i32) {
        let _ = self.out.flush();
        let _ = self.err.flush();
        tracing::debug!(status, "exiting");
        std::process::exit(status);
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory terminal. Clones share the same buffers, so a test keeps one
/// clone and hands the other to the parser.
#[derive(Clone, Default)]
pub struct Capture {
    out: SharedBuf,
    err: SharedBuf,
    exits: Rc<RefCell<Vec<i32>>>,
}

impl Capture {
    pub fn new() -> Self {
        Capture::default()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.out.0.borrow()).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.err.0.borrow()).into_owned()
    }

    /// Every status passed to `exit`, oldest first.
    pub fn exits(&self) -> Vec<i32> {
        self.exits.borrow().clone()
    }

    pub fn clear(&self) {
        self.out.0.borrow_mut().clear();
        self.err.0.borrow_mut().clear();
        self.exits.borrow_mut().clear();
    }
}

impl Terminal for Capture {
    fn stdout(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn stderr(&mut self) -> &mut dyn Write {
        &mut self.err
    }

    fn exit(&mut self, status: i32) {
        self.exits.borrow_mut().push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_clones_share_buffers() {
        let capture = Capture::new();
        let mut term: Box<dyn Terminal> = Box::new(capture.clone());
        let _ = write!(term.stdout(), "out");
        let _ = write!(term.stderr(), "err");
        term.exit(3);

        assert_eq!(capture.stdout_text(), "out");
        assert_eq!(capture.stderr_text(), "err");
        assert_eq!(capture.exits(), vec![3]);

        capture.clear();
        assert!(capture.stdout_text().is_empty());
        assert!(capture.exits().is_empty());
    }
}
