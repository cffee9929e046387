use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Default)]
#[command(name = "termfolio", about = "Animated portfolio page for the terminal")]
pub(crate) struct Args {
    /// frame rate cap (10..=240)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// upper bound on background particles
    #[arg(long)]
    pub(crate) max_particles: Option<usize>,

    /// rng seed for the particle field
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// static background, no animation
    #[arg(long, default_value_t = false)]
    pub(crate) reduced_motion: bool,

    /// monochrome output
    #[arg(long, default_value_t = false)]
    pub(crate) no_color: bool,

    /// skip the boot sequence
    #[arg(long, default_value_t = false)]
    pub(crate) no_boot: bool,

    /// portfolio content as JSON
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,

    /// section to open at (hero, about, experience, skills, projects, contact)
    #[arg(long)]
    pub(crate) section: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) max_particles: usize,
    pub(crate) enable_color: bool,
    pub(crate) reduced_motion: bool,
    pub(crate) show_boot: bool,
    pub(crate) resize_debounce_ms: u64,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            max_particles: 150,
            enable_color: true,
            reduced_motion: false,
            show_boot: true,
            resize_debounce_ms: 150,
            seed: 0xC0FFEE_u64,
        }
    }
}

impl Settings {
    /// Command line beats the settings file; the environment can only turn
    /// reduced motion on.
    pub(crate) fn apply(&mut self, args: &Args, env_reduce_motion: bool) {
        if let Some(fps) = args.fps {
            self.fps_cap = fps;
        }
        if let Some(n) = args.max_particles {
            self.max_particles = n;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if args.reduced_motion || env_reduce_motion {
            self.reduced_motion = true;
        }
        if args.no_color {
            self.enable_color = false;
        }
        if args.no_boot {
            self.show_boot = false;
        }
        self.fps_cap = self.fps_cap.clamp(10, 240);
    }
}

pub(crate) fn env_reduce_motion() -> bool {
    ["REDUCE_MOTION", "NO_MOTION"]
        .iter()
        .any(|k| std::env::var(k).map(|v| !v.is_empty()).unwrap_or(false))
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "termfolio", "Termfolio")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("termfolio.log"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings"),
        }
    }
    Settings::default()
}
