use std::io::Write;
use std::net::{Shutdown, TcpStream, ToSocketAddrs as _};

use anyhow::Context as _;
use core::time::Duration;

use crate::config::DrawCfg;
use crate::sink::{PixelSink, Progress, Summary};

fn connect(addr: &str, timeout: Option<Duration>) -> anyhow::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect(addr).with_context(|| format!("couldn't connect to {addr}"));
    };

    let mut last_error = None;
    for sock_addr in addr.to_socket_addrs().with_context(|| format!("couldn't resolve {addr}"))? {
        trace!(%sock_addr, ?timeout, "Trying address");
        match TcpStream::connect_timeout(&sock_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e).with_context(|| format!("couldn't connect to {addr}")),
        None => anyhow::bail!("{addr} resolved to no address"),
    }
}

/// Connects to the canvas, sends every pixel of the configured pattern and
/// closes the connection. Nothing is read back from the server.
pub fn draw(cfg: &DrawCfg, echo: Option<&mut dyn Write>) -> anyhow::Result<Summary> {
    draw_with_progress(cfg, echo, Progress::default())
}

/// Same as [`draw`], publishing the number of pixels sent to `progress` as it goes.
#[instrument(skip_all, fields(addr = %cfg.addr))]
pub fn draw_with_progress(cfg: &DrawCfg, echo: Option<&mut dyn Write>, progress: Progress) -> anyhow::Result<Summary> {
    debug!(?cfg);

    let pixels = cfg.pattern.pixels(fastrand::Rng::new()).context("couldn't prepare pattern")?;

    let stream = connect(&cfg.addr, cfg.connect_timeout)?;
    info!(peer = ?stream.peer_addr().ok(), "Connected");

    let mut sink = PixelSink::new(stream, cfg.encoding)
        .batched(cfg.batched)
        .echo(echo)
        .progress(progress);

    sink.write_all(pixels)
        .with_context(|| format!("couldn't send pixels ({} sent)", sink.summary().pixels))?;

    let (stream, summary) = sink.finish().context("couldn't flush pending pixels")?;

    stream
        .shutdown(Shutdown::Write)
        .context("couldn't shut down the connection")?;

    info!(pixels = summary.pixels, bytes = summary.bytes, "Pixels written");

    Ok(summary)
}
