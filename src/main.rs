//! dotstui — connect same-coloured dots on a square board in the terminal.

mod app;
mod cascade;
mod game;
mod grid;
mod highscores;
mod input;
mod matcher;
mod path;
mod score;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use grid::DotColor;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect the game and front end.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub size: BoardSize,
    pub colors: usize,
    pub seed: Option<u64>,
    pub no_animation: bool,
    pub sound: bool,
    pub scores_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default theme");
        theme::Theme::default()
    });
    let config = GameConfig {
        size: args.size,
        colors: args.colors as usize,
        seed: args.seed,
        no_animation: args.no_animation,
        sound: args.sound,
        scores_file: args.scores_file.unwrap_or_else(highscores::default_path),
    };
    tracing::info!(?config, "starting");
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Log to a file; the terminal belongs to the game. Level from RUST_LOG, default info.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Connect-the-dots colour matching puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "dotstui",
    version,
    about = "Connect same-coloured dots in the terminal. Close a loop to clear every dot of that colour.",
    long_about = "dotstui is a terminal take on connect-the-dots colour matching.\n\n\
        Drag across orthogonally adjacent dots of one colour and release to clear them; \
        the dots above fall down and new ones drop in. Return to the first dot of a path \
        of four or more to close a loop and clear every dot of that colour for double points.\n\n\
        CONTROLS:\n  Mouse        Drag to connect, release to clear\n  Arrows/hjkl  Move cursor    Space/Enter  Start / finish a path\n  6 / 8 / 0    Board size 6x6, 8x8, 10x10\n  R            Restart        Q / Esc      Quit"
)]
pub struct Args {
    /// Board edge length: 6, 8 or 10. Fewer moves on smaller boards.
    #[arg(short, long, default_value = "6")]
    pub size: BoardSize,

    /// Number of dot colours in play (3 to 6).
    #[arg(short, long, default_value_t = DotColor::DEFAULT_PALETTE as u8, value_name = "N",
          value_parser = clap::value_parser!(u8).range(DotColor::MIN_PALETTE as i64..=DotColor::MAX_PALETTE as i64))]
    pub colors: u8,

    /// Seed for dot colours, for reproducible boards.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the pop-in animation for refilled dots.
    #[arg(long)]
    pub no_animation: bool,

    /// Ring the terminal bell on matches and board changes.
    #[arg(long)]
    pub sound: bool,

    /// Where the best score is kept. Defaults to the user config directory.
    #[arg(long, value_name = "FILE")]
    pub scores_file: Option<PathBuf>,

    /// Write logs to this file (RUST_LOG controls the level).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Supported board sizes. Each carries its own move budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum BoardSize {
    #[default]
    #[value(name = "6")]
    Six,
    #[value(name = "8")]
    Eight,
    #[value(name = "10")]
    Ten,
}

impl BoardSize {
    pub const ALL: [Self; 3] = [Self::Six, Self::Eight, Self::Ten];

    /// Rows and columns.
    pub fn dim(self) -> usize {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
            Self::Ten => 10,
        }
    }

    /// Moves granted at the start of a game.
    pub fn moves(self) -> u32 {
        match self {
            Self::Six => 30,
            Self::Eight => 40,
            Self::Ten => 50,
        }
    }

    pub fn from_dim(n: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.dim() == n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_size_from_dim() {
        assert_eq!(BoardSize::from_dim(6), Some(BoardSize::Six));
        assert_eq!(BoardSize::from_dim(8), Some(BoardSize::Eight));
        assert_eq!(BoardSize::from_dim(10), Some(BoardSize::Ten));
        assert_eq!(BoardSize::from_dim(7), None);
        assert_eq!(BoardSize::from_dim(0), None);
    }

    #[test]
    fn test_moves_grow_with_board() {
        assert_eq!(BoardSize::Six.moves(), 30);
        assert_eq!(BoardSize::Eight.moves(), 40);
        assert_eq!(BoardSize::Ten.moves(), 50);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["dotstui", "--size", "10", "--colors", "4", "--seed", "9"]).unwrap();
        assert_eq!(args.size, BoardSize::Ten);
        assert_eq!(args.colors, 4);
        assert_eq!(args.seed, Some(9));
        assert!(Args::try_parse_from(["dotstui", "--size", "7"]).is_err());
        assert!(Args::try_parse_from(["dotstui", "--colors", "9"]).is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["dotstui"]).unwrap();
        assert_eq!(args.size, BoardSize::Six);
        assert_eq!(args.colors as usize, DotColor::DEFAULT_PALETTE);
        assert!(Args::try_parse_from(["dotstui", "--colors", "2"]).is_err());
    }
}
