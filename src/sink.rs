use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::codec::{self, Encoding, MAX_TEXT_LEN};
use crate::primitive::Pixel;

pub const BATCH_SIZE: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub pixels: u64,
    pub bytes: u64,
}

/// Pixels sent so far, readable from another thread (e.g. an interrupt handler).
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<AtomicU64>);

impl Progress {
    pub fn pixels(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn add(&self, pixels: u64) {
        self.0.fetch_add(pixels, Ordering::Relaxed);
    }
}

/// Encodes pixels onto a stream, optionally batching commands and echoing
/// their text form.
pub struct PixelSink<'a, W: Write> {
    stream: W,
    encoding: Encoding,
    batched: bool,
    echo: Option<&'a mut dyn Write>,
    buf: Vec<u8>,
    /// pixels sitting in `buf`, not sent yet
    pending: u64,
    summary: Summary,
    progress: Progress,
}

impl<'a, W: Write> PixelSink<'a, W> {
    pub fn new(stream: W, encoding: Encoding) -> Self {
        Self {
            stream,
            encoding,
            batched: false,
            echo: None,
            buf: Vec::with_capacity(BATCH_SIZE),
            pending: 0,
            summary: Summary::default(),
            progress: Progress::default(),
        }
    }

    pub fn batched(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }

    pub fn echo(mut self, echo: Option<&'a mut dyn Write>) -> Self {
        self.echo = echo;
        self
    }

    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// What reached the stream so far; batched pixels count once flushed.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn write_pixel(&mut self, px: &Pixel) -> io::Result<()> {
        if let Some(echo) = self.echo.as_mut() {
            echo.write_all(codec::text_line(px).as_bytes())?;
        }

        if self.batched {
            if self.buf.len() + MAX_TEXT_LEN >= BATCH_SIZE {
                self.send_buffered()?;
            }
            self.encoding.encode(px, &mut self.buf);
            self.pending += 1;
        } else {
            self.buf.clear();
            self.encoding.encode(px, &mut self.buf);
            self.pending = 1;
            self.send_buffered()?;
        }

        Ok(())
    }

    pub fn write_all<I>(&mut self, pixels: I) -> io::Result<()>
    where
        I: IntoIterator<Item = Pixel>,
    {
        for px in pixels {
            self.write_pixel(&px)?;
        }
        Ok(())
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.stream.write_all(&self.buf)?;
            self.summary.bytes += self.buf.len() as u64;
            self.summary.pixels += self.pending;
            self.progress.add(self.pending);
            self.buf.clear();
            self.pending = 0;
        }
        Ok(())
    }

    /// Sends whatever is still batched and hands back the stream.
    pub fn finish(mut self) -> io::Result<(W, Summary)> {
        self.send_buffered()?;
        self.stream.flush()?;
        if let Some(echo) = self.echo.as_mut() {
            echo.flush()?;
        }
        Ok((self.stream, self.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Color;

    /// Counts the individual `write` calls reaching the stream.
    #[derive(Default)]
    struct Recorder {
        data: Vec<u8>,
        writes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn pixels(n: usize) -> impl Iterator<Item = Pixel> {
        (0..n).map(|i| Pixel::new(i, i * 2, Color(i as u8, 0, 0xff)))
    }

    #[test]
    fn batching_does_not_change_the_byte_stream() {
        let mut direct = PixelSink::new(Recorder::default(), Encoding::Text);
        direct.write_all(pixels(500)).unwrap();
        let (direct, direct_summary) = direct.finish().unwrap();

        let mut batched = PixelSink::new(Recorder::default(), Encoding::Text).batched(true);
        batched.write_all(pixels(500)).unwrap();
        let (batched, batched_summary) = batched.finish().unwrap();

        assert_eq!(direct.data, batched.data);
        assert_eq!(direct_summary, batched_summary);
        assert_eq!(direct.writes, 500);
        assert!(batched.writes < 500 / 10);
    }

    #[test]
    fn batches_never_exceed_buffer_size() {
        struct Bounded;

        impl Write for Bounded {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                assert!(buf.len() < BATCH_SIZE);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = PixelSink::new(Bounded, Encoding::Text).batched(true);
        sink.write_all(pixels(2000)).unwrap();
        let (_, summary) = sink.finish().unwrap();
        assert_eq!(summary.pixels, 2000);
    }

    #[test]
    fn echo_receives_text_even_for_binary_stream() {
        let mut echo = Vec::new();
        let mut sink = PixelSink::new(Vec::new(), Encoding::Binary).echo(Some(&mut echo));
        sink.write_pixel(&Pixel::new(1, 2, Color::WHITE)).unwrap();
        let (stream, summary) = sink.finish().unwrap();

        assert_eq!(stream.len(), 8);
        assert_eq!(summary, Summary { pixels: 1, bytes: 8 });
        assert_eq!(echo, b"PX 1 2 ffffff\n");
    }

    #[test]
    fn failed_batch_is_not_counted() {
        /// Accepts `budget` writes, then fails.
        struct Flaky {
            budget: usize,
            data: Vec<u8>,
        }

        impl Write for Flaky {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.budget == 0 {
                    return Err(io::ErrorKind::BrokenPipe.into());
                }
                self.budget -= 1;
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let progress = Progress::default();
        let mut sink = PixelSink::new(Flaky { budget: 1, data: Vec::new() }, Encoding::Text)
            .batched(true)
            .progress(progress.clone());

        let err = sink.write_all(pixels(200)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let summary = sink.summary();
        let sent = String::from_utf8(sink.stream.data.clone()).unwrap();
        assert_eq!(summary.bytes, sent.len() as u64);
        assert_eq!(summary.pixels, sent.lines().count() as u64);
        assert_eq!(progress.pixels(), summary.pixels);
        assert!(summary.pixels < 200);
    }

    #[test]
    fn progress_follows_unbatched_writes() {
        let progress = Progress::default();
        let mut sink = PixelSink::new(Vec::new(), Encoding::Text).progress(progress.clone());
        sink.write_all(pixels(7)).unwrap();
        assert_eq!(progress.pixels(), 7);
    }

    #[test]
    fn write_error_is_propagated() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = PixelSink::new(Broken, Encoding::Text);
        let err = sink.write_pixel(&Pixel::new(0, 0, Color::BLACK)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.summary().pixels, 0);
    }
}
