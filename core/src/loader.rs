use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::errors::ProbeError;

/// Serialized graph bytes, as read from disk. Owned by whoever loaded them and
/// dropped once the engine has imported the graph.
#[derive(Clone, Debug)]
pub struct GraphBuffer {
    origin: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl GraphBuffer {
    /// Reads a whole model file.
    ///
    /// The file is sized by seeking to its end before reading, and exactly that
    /// many bytes must come back. A zero-length file is an error.
    pub fn for_path(p: impl AsRef<Path>) -> Result<GraphBuffer, ProbeError> {
        let path = p.as_ref();
        let io = |step| move |source| ProbeError::Io { path: path.to_path_buf(), step, source };
        let mut file = fs_err::File::open(path).map_err(io("open"))?;
        let len = file.seek(SeekFrom::End(0)).map_err(io("seek"))?;
        if len == 0 {
            return Err(ProbeError::EmptyModel(path.to_path_buf()));
        }
        let len = usize::try_from(len).map_err(|_| ProbeError::Io {
            path: path.to_path_buf(),
            step: "size",
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "file too large"),
        })?;
        file.seek(SeekFrom::Start(0)).map_err(io("seek"))?;
        let mut bytes = vec![0u8; len];
        file.read_exact(&mut bytes).map_err(io("read"))?;
        debug!("Read {} bytes from {:?}", len, path);
        Ok(GraphBuffer { origin: Some(path.to_path_buf()), bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<GraphBuffer, ProbeError> {
        if bytes.is_empty() {
            return Err(ProbeError::EmptyModel(PathBuf::from("<memory>")));
        }
        Ok(GraphBuffer { origin: None, bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.pb");
        std::fs::write(&path, b"\x0a\x03foo").unwrap();
        let buf = GraphBuffer::for_path(&path).unwrap();
        assert_eq!(buf.as_bytes(), b"\x0a\x03foo");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.origin(), Some(path.as_path()));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphBuffer::for_path(dir.path().join("nope.pb")).unwrap_err();
        assert!(matches!(err, ProbeError::Io { step: "open", .. }), "{err}");
        assert!(err.to_string().contains("nope.pb"), "{err}");
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pb");
        std::fs::write(&path, b"").unwrap();
        let err = GraphBuffer::for_path(&path).unwrap_err();
        assert!(matches!(err, ProbeError::EmptyModel(_)), "{err}");
    }

    #[test]
    fn empty_bytes() {
        assert!(matches!(GraphBuffer::from_bytes(vec![]), Err(ProbeError::EmptyModel(_))));
    }
}
