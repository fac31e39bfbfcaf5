use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use anyhow::bail;

use crate::codec::Encoding;
use crate::pattern::Pattern;

/// Canvas servers the client knows by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Preset {
    Local,
    Remote,
}

impl Preset {
    pub fn addr(self) -> &'static str {
        match self {
            Preset::Local => "127.0.0.1:1337",
            Preset::Remote => "193.196.38.83:8000",
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "local" => Ok(Preset::Local),
            "remote" => Ok(Preset::Remote),
            _ => bail!("unknown preset `{s}` (expected `local` or `remote`)"),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.addr())
    }
}

#[derive(Debug, Clone)]
pub struct DrawCfg {
    pub addr: String,
    pub pattern: Pattern,
    pub encoding: Encoding,
    pub batched: bool,
    pub echo: bool,
    pub connect_timeout: Option<Duration>,
}

impl DrawCfg {
    pub fn new(addr: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            addr: addr.into(),
            pattern,
            encoding: Encoding::Text,
            batched: false,
            echo: false,
            connect_timeout: None,
        }
    }

    /// Yellow 5×5 square on the local canvas, echoing every command.
    pub fn square() -> Self {
        Self {
            echo: true,
            ..Self::new(Preset::Local.addr(), Pattern::Square)
        }
    }

    /// Single white pixel on the remote canvas, echoing the command.
    pub fn dot() -> Self {
        Self {
            echo: true,
            ..Self::new(Preset::Remote.addr(), Pattern::Dot)
        }
    }
}
