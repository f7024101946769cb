//! Byte-stream operations that report their progress.
//!
//! Each helper sizes the reporter from the stream length (or switches it to
//! indeterminate when the length is unknown), advances it after every chunk
//! and stops early once the reporter reports a cancellation. An empty stream
//! still gets a maximum of 1, since child reporters reject a zero maximum.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use sha2::{Digest as _, Sha256};

use crate::error::OperationError;
use crate::reporter::ProgressReporter;

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationOptions {
    pub buffer_size: usize,
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Result of an operation that can be canceled part-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Canceled { processed: u64 },
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Canceled { .. } => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

/// A SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

fn pump<R, P>(
    from: &mut R,
    length: Option<u64>,
    progress: &mut P,
    options: &OperationOptions,
    mut sink: impl FnMut(&[u8]) -> io::Result<()>,
) -> Result<Outcome<u64>, OperationError>
where
    R: Read + ?Sized,
    P: ProgressReporter + ?Sized,
{
    match length {
        Some(len) => {
            progress.set_maximum(len.max(1))?;
            progress.set_progress(Some(0))?;
        }
        None => progress.set_progress(None)?,
    }

    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut processed = 0u64;
    loop {
        if progress.was_canceled() {
            tracing::debug!(processed, "Operation canceled");
            return Ok(Outcome::Canceled { processed });
        }
        let read = match from.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        sink(&buffer[..read])?;
        processed += read as u64;
        if let Some(len) = length {
            progress.set_progress(Some(processed.min(len)))?;
        }
    }
    if length.is_some() {
        progress.set_progress(Some(progress.maximum()))?;
    }
    Ok(Outcome::Completed(processed))
}

/// Copies `from` into `to`, returning the number of bytes copied.
///
/// `length` only drives the progress display; pass `None` when it is unknown.
pub fn copy_with_progress<R, W, P>(
    from: &mut R,
    to: &mut W,
    length: Option<u64>,
    progress: &mut P,
    options: &OperationOptions,
) -> Result<Outcome<u64>, OperationError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    P: ProgressReporter + ?Sized,
{
    let outcome = pump(from, length, progress, options, |chunk| to.write_all(chunk))?;
    to.flush()?;
    Ok(outcome)
}

/// Copies a file. A copy that is canceled or fails after the destination was
/// created removes the partial destination.
pub fn copy_file<P>(
    src: &Path,
    dst: &Path,
    progress: &mut P,
    options: &OperationOptions,
) -> Result<Outcome<u64>, OperationError>
where
    P: ProgressReporter + ?Sized,
{
    let mut input = File::open(src)?;
    let length = input.metadata()?.len();
    let mut output = BufWriter::new(File::create(dst)?);
    let result = copy_with_progress(&mut input, &mut output, Some(length), progress, options);
    drop(output);
    match result {
        Ok(outcome) if outcome.is_canceled() => {
            tracing::debug!("Removing partial copy {}", dst.display());
            std::fs::remove_file(dst)?;
            Ok(outcome)
        }
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            tracing::debug!("Removing partial copy {} after error: {}", dst.display(), e);
            if let Err(remove) = std::fs::remove_file(dst) {
                tracing::warn!("Could not remove {}: {}", dst.display(), remove);
            }
            Err(e)
        }
    }
}

/// Computes the SHA-256 digest of a stream.
pub fn hash_with_progress<R, P>(
    from: &mut R,
    length: Option<u64>,
    progress: &mut P,
    options: &OperationOptions,
) -> Result<Outcome<Digest>, OperationError>
where
    R: Read + ?Sized,
    P: ProgressReporter + ?Sized,
{
    let mut hasher = Sha256::new();
    let outcome = pump(from, length, progress, options, |chunk| {
        hasher.update(chunk);
        Ok(())
    })?;
    Ok(match outcome {
        Outcome::Completed(_) => Outcome::Completed(Digest(hasher.finalize().into())),
        Outcome::Canceled { processed } => Outcome::Canceled { processed },
    })
}

pub fn hash_file<P>(
    path: &Path,
    progress: &mut P,
    options: &OperationOptions,
) -> Result<Outcome<Digest>, OperationError>
where
    P: ProgressReporter + ?Sized,
{
    let mut input = File::open(path)?;
    let length = input.metadata()?.len();
    hash_with_progress(&mut input, Some(length), progress, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgressError;
    use crate::memory::MemoryReporter;
    use crate::null::NullReporter;
    use crate::scaled::ScaledValue;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    fn small_buffer() -> OperationOptions {
        OperationOptions { buffer_size: 1024 }
    }

    #[test]
    fn test_copy_copies_data() {
        let data = sample(70_000);
        let mut target = Vec::new();
        let outcome = copy_with_progress(
            &mut Cursor::new(&data),
            &mut target,
            None,
            &mut NullReporter,
            &OperationOptions::default(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Completed(70_000));
        assert_eq!(target, data);
    }

    #[test]
    fn test_copy_fills_progress() {
        let data = sample(10_000);
        let mut r = MemoryReporter::new();
        copy_with_progress(&mut Cursor::new(&data), &mut io::sink(), Some(10_000), &mut r, &small_buffer())
            .unwrap();
        assert_eq!(r.maximum(), 10_000);
        assert_eq!(r.progress(), Some(10_000));
    }

    #[test]
    fn test_unknown_length_is_indeterminate() {
        let data = sample(3_000);
        let mut r = MemoryReporter::new();
        copy_with_progress(&mut Cursor::new(&data), &mut io::sink(), None, &mut r, &small_buffer()).unwrap();
        assert_eq!(r.progress(), None);
    }

    #[test]
    fn test_understated_length_is_clamped() {
        let data = sample(5_000);
        let mut r = MemoryReporter::new();
        let outcome =
            copy_with_progress(&mut Cursor::new(&data), &mut io::sink(), Some(2_000), &mut r, &small_buffer())
                .unwrap();
        assert_eq!(outcome, Outcome::Completed(5_000));
        assert_eq!(r.progress(), Some(2_000));
    }

    /// Cancels through the reporter's handle once `after` bytes were read.
    struct CancelAfter<'a> {
        inner: Cursor<&'a [u8]>,
        after: u64,
        handle: crate::cancel::CancelSignal,
    }

    impl Read for CancelAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inner.position() >= self.after {
                let _ = self.handle.cancel();
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_cancellation_stops_copy() {
        let data = sample(10_000);
        let mut r = MemoryReporter::new();
        r.set_allow_cancellation(true);
        let mut from = CancelAfter {
            inner: Cursor::new(data.as_slice()),
            after: 3_000,
            handle: r.cancel_handle(),
        };
        let mut target = Vec::new();
        let outcome = copy_with_progress(&mut from, &mut target, Some(10_000), &mut r, &small_buffer()).unwrap();
        assert_eq!(outcome, Outcome::Canceled { processed: 4_096 });
        assert_eq!(target.len(), 4_096);
        assert_eq!(r.progress(), Some(4_096));
    }

    #[test]
    fn test_hash_known_digest() {
        let outcome = hash_with_progress(
            &mut Cursor::new(b"abc"),
            Some(3),
            &mut NullReporter,
            &OperationOptions::default(),
        )
        .unwrap();
        assert_eq!(
            outcome.completed().unwrap().to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_chunking_does_not_change_digest() {
        let data = sample(50_000);
        let whole = hash_with_progress(&mut Cursor::new(&data), None, &mut NullReporter, &OperationOptions::default())
            .unwrap();
        let chunked = hash_with_progress(
            &mut Cursor::new(&data),
            None,
            &mut NullReporter,
            &OperationOptions { buffer_size: 7 },
        )
        .unwrap();
        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_copy_file_and_hash_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, sample(20_000)).unwrap();

        let mut r = MemoryReporter::new();
        let copied = copy_file(&src, &dst, &mut r, &small_buffer()).unwrap();
        assert_eq!(copied, Outcome::Completed(20_000));
        assert_eq!(std::fs::read(&dst).unwrap(), sample(20_000));

        let a = hash_file(&src, &mut r, &small_buffer()).unwrap();
        let b = hash_file(&dst, &mut NullReporter, &small_buffer()).unwrap();
        assert_eq!(a, b);
        assert_eq!(r.progress(), Some(20_000));
    }

    #[test]
    fn test_canceled_copy_file_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, sample(4_000)).unwrap();

        let mut r = MemoryReporter::new();
        r.set_allow_cancellation(true);
        r.cancel().unwrap();
        let outcome = copy_file(&src, &dst, &mut r, &small_buffer()).unwrap();
        assert_eq!(outcome, Outcome::Canceled { processed: 0 });
        assert!(!dst.exists());
    }

    #[test]
    fn test_failed_copy_file_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, sample(4_000)).unwrap();

        // The child's 4000 units overflow the parent after the first chunk.
        let mut parent = MemoryReporter::with_progress(10, Some(0)).unwrap();
        let mut child = parent.child_operation().unwrap();
        let err = copy_file(&src, &dst, &mut child, &small_buffer()).unwrap_err();
        assert!(matches!(err, OperationError::Progress(ProgressError::OutOfRange { .. })));
        assert!(!dst.exists());
        assert!(src.exists());
    }

    #[test]
    fn test_empty_stream_into_child() {
        let mut parent = MemoryReporter::with_progress(10, Some(2)).unwrap();
        let mut child = parent.scaled_child_operation(5).unwrap();
        let outcome =
            copy_with_progress(&mut Cursor::new(Vec::<u8>::new()), &mut io::sink(), Some(0), &mut child, &small_buffer())
                .unwrap();
        assert_eq!(outcome, Outcome::Completed(0));
        drop(child);
        assert_eq!(parent.progress(), Some(7));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = hash_file(Path::new("/nonexistent/file.bin"), &mut NullReporter, &small_buffer()).unwrap_err();
        assert!(matches!(err, OperationError::Io(_)));
    }

    #[test]
    fn test_channel_reporter_sees_percentages() {
        let (mut reporter, mut rx) = crate::display::channel();
        let data = sample(4_096);
        copy_with_progress(&mut Cursor::new(&data), &mut io::sink(), Some(4_096), &mut reporter, &small_buffer())
            .unwrap();
        let updates: Vec<_> = std::iter::from_fn(|| rx.try_recv()).collect();
        assert_eq!(
            updates.last(),
            Some(&crate::display::ProgressUpdate::Progress(ScaledValue::Determinate(100)))
        );
        assert_eq!(updates.len(), 4);
    }
}
