#[macro_use]
extern crate tracing;

use std::env;
use std::io::{self, Write};

use anyhow::Context as _;
use pixelflut_client::codec::Encoding;
use pixelflut_client::pattern::{Pattern, PATTERN_FORMATS};
use pixelflut_client::{DrawCfg, Preset, Progress, Summary};
use seahorse::{App, Command, Context, Flag, FlagType};

fn main() {
    let args: Vec<String> = if let Ok(args_str) = env::var("PIXELFLUT_ARGS") {
        env::args()
            .take(1)
            .chain(parse_env_variable_as_args(&args_str))
            .collect()
    } else {
        env::args().collect()
    };

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [command]", env!("CARGO_PKG_NAME")))
        .command(square_command())
        .command(dot_command())
        .command(draw_command());

    app.run(args);
}

fn setup_logger() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("PIXELFLUT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the echoed commands
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn run(cfg: DrawCfg) {
    setup_logger();

    let progress = Progress::default();
    let interrupted = progress.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\n{} pixels written", interrupted.pixels());
        std::process::exit(1);
    }) {
        warn!(error = %e, "Failed to register Ctrl-C handler");
    }

    let mut stdout = io::stdout();
    let echo = if cfg.echo { Some(&mut stdout as &mut dyn Write) } else { None };

    let res = pixelflut_client::draw_with_progress(&cfg, echo, progress);
    report(res, &mut stdout);
}

/// Failures go to `out` and keep the exit status at 0.
fn report(res: anyhow::Result<Summary>, out: &mut dyn Write) {
    match res {
        Ok(summary) => info!(pixels = summary.pixels, "Terminated successfully"),
        Err(e) => {
            error!("{:#}", e);
            if let Err(write_error) = writeln!(out, "{:?}", e) {
                warn!(error = %write_error, "Couldn't print the failure");
            }
        }
    }
}

fn exit_on_bad_args(res: anyhow::Result<DrawCfg>) -> DrawCfg {
    match res {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{:?}", e);
            std::process::exit(1);
        }
    }
}

// square

const SQUARE_SUBCOMMAND: &str = "square";

fn square_command() -> Command {
    let usage = format!(
        "{command} {subcommand} [flags]\n\n\
        Draws a 5x5 yellow square at the origin of {addr} and prints every command sent.",
        command = env!("CARGO_PKG_NAME"),
        subcommand = SQUARE_SUBCOMMAND,
        addr = Preset::Local,
    );

    let cmd = Command::new(SQUARE_SUBCOMMAND)
        .description("Draw a small yellow square on the local canvas")
        .alias("s")
        .usage(usage)
        .action(square_action);

    apply_common_flags(cmd)
}

fn square_action(c: &Context) {
    let cfg = exit_on_bad_args(CommonArgs::parse(c).map(|args| args.apply(DrawCfg::square())));
    run(cfg);
}

// dot

const DOT_SUBCOMMAND: &str = "dot";

fn dot_command() -> Command {
    let usage = format!(
        "{command} {subcommand} [flags]\n\n\
        Sets the origin pixel of {addr} to white and prints the command sent.",
        command = env!("CARGO_PKG_NAME"),
        subcommand = DOT_SUBCOMMAND,
        addr = Preset::Remote,
    );

    let cmd = Command::new(DOT_SUBCOMMAND)
        .description("Draw a single white pixel on the remote canvas")
        .usage(usage)
        .action(dot_action);

    apply_common_flags(cmd)
}

fn dot_action(c: &Context) {
    let cfg = exit_on_bad_args(CommonArgs::parse(c).map(|args| args.apply(DrawCfg::dot())));
    run(cfg);
}

// draw

const DRAW_SUBCOMMAND: &str = "draw";

fn draw_command() -> Command {
    let usage = format!(
        r##"{command} {subcommand} <PATTERN> [flags]

{pattern_formats}

Example: fill a rectangle on the local canvas, batching commands

    {command} {subcommand} "rect:10 10 100 50 ff0000" --batched

Example: Barnsley fern on the remote canvas

    {command} {subcommand} barnsley:50000 --preset remote"##,
        command = env!("CARGO_PKG_NAME"),
        subcommand = DRAW_SUBCOMMAND,
        pattern_formats = PATTERN_FORMATS,
    );

    let cmd = Command::new(DRAW_SUBCOMMAND)
        .description("Draw any pattern")
        .alias("d")
        .usage(usage)
        .action(draw_action);

    apply_common_flags(cmd)
}

fn draw_action(c: &Context) {
    let res = CommonArgs::parse(c).and_then(|args| {
        let arg_pattern = c.args.first().context("<PATTERN> is missing")?;
        let pattern: Pattern = arg_pattern.parse().context("bad <PATTERN>")?;
        Ok(args.apply(DrawCfg::new(Preset::Local.addr(), pattern)))
    });
    run(exit_on_bad_args(res));
}

// args parsing

fn parse_env_variable_as_args(env_var_str: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut arg = String::new();
    let mut iter = env_var_str.chars();

    loop {
        match iter.next() {
            Some('"') => loop {
                match iter.next() {
                    Some('"') | None => break,
                    Some(c) => arg.push(c),
                }
            },
            Some('\'') => loop {
                match iter.next() {
                    Some('\'') | None => break,
                    Some(c) => arg.push(c),
                }
            },
            Some(' ') => {
                if !arg.is_empty() {
                    args.push(std::mem::take(&mut arg));
                }
            }
            Some(c) => arg.push(c),
            None => break,
        }
    }

    if !arg.is_empty() {
        args.push(arg);
    }

    args
}

fn apply_common_flags(cmd: Command) -> Command {
    cmd.flag(Flag::new("addr", FlagType::String).description("Canvas server as <HOST>:<PORT>"))
        .flag(Flag::new("preset", FlagType::String).description("Known canvas server: `local` or `remote`"))
        .flag(Flag::new("binary", FlagType::Bool).description("Send compact 8-byte binary commands"))
        .flag(Flag::new("batched", FlagType::Bool).description("Group commands into 1 KiB writes"))
        .flag(Flag::new("echo", FlagType::Bool).description("Print every command sent to stdout"))
        .flag(Flag::new("quiet", FlagType::Bool).description("Don't print commands sent"))
        .flag(Flag::new("timeout", FlagType::String).description("Timeout when connecting (e.g. `3s`)"))
}

/// Flags shared by every subcommand; unset flags keep the subcommand defaults.
#[derive(Debug, Default, PartialEq)]
struct CommonArgs {
    addr: Option<String>,
    encoding: Option<Encoding>,
    batched: bool,
    echo: Option<bool>,
    timeout: Option<core::time::Duration>,
}

impl CommonArgs {
    fn parse(c: &Context) -> anyhow::Result<Self> {
        let addr = if let Ok(addr) = c.string_flag("addr") {
            Some(addr)
        } else if let Ok(preset) = c.string_flag("preset") {
            let preset: Preset = preset.parse()?;
            Some(preset.addr().to_owned())
        } else {
            None
        };

        let encoding = c.bool_flag("binary").then_some(Encoding::Binary);

        let echo = if c.bool_flag("quiet") {
            Some(false)
        } else if c.bool_flag("echo") {
            Some(true)
        } else {
            None
        };

        let timeout = if let Ok(timeout) = c.string_flag("timeout") {
            let timeout = humantime::parse_duration(&timeout).context("invalid value for timeout")?;
            Some(timeout)
        } else {
            None
        };

        Ok(Self {
            addr,
            encoding,
            batched: c.bool_flag("batched"),
            echo,
            timeout,
        })
    }

    fn apply(self, mut cfg: DrawCfg) -> DrawCfg {
        if let Some(addr) = self.addr {
            cfg.addr = addr;
        }
        if let Some(encoding) = self.encoding {
            cfg.encoding = encoding;
        }
        if let Some(echo) = self.echo {
            cfg.echo = echo;
        }
        cfg.batched |= self.batched;
        cfg.connect_timeout = self.timeout.or(cfg.connect_timeout);
        cfg
    }
}
