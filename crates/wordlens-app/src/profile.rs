use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wordlens_config::Config;

const REPO_DEFAULT_CONFIG: &str = "config.json";
const MAIN_PROFILE: &str = "main";

/// Load the default config shipped next to the binary, or built-in defaults
fn load_repo_default_config() -> anyhow::Result<Config> {
    if !Path::new(REPO_DEFAULT_CONFIG).exists() {
        return Ok(Config::default());
    }

    tracing::info!("Loading repo default config...");
    let file = File::open(REPO_DEFAULT_CONFIG)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Named configs stored as `<root>/profiles/<name>.json`
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<config dir>/wordlens` for the current user
    pub fn user() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir().context("no per-user config directory")?;
        Ok(Self::new(config_dir.join("wordlens")))
    }

    fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}.json"))
    }

    /// Create the profiles folder and the main profile if missing
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.profiles_dir())?;

        let main_profile = self.profile_path(MAIN_PROFILE);
        if !main_profile.exists() {
            let profile = Profile {
                name: MAIN_PROFILE.into(),
                value: load_repo_default_config()?,
            };
            fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
            tracing::info!("Created main profile at {}", main_profile.display());
        }

        Ok(())
    }

    /// Load a profile by name, falling back to main and then to the repo default
    pub fn load(&self, name: &str) -> anyhow::Result<Config> {
        let profile_file = self.profile_path(name);
        if profile_file.exists() {
            return read_profile(&profile_file);
        }

        tracing::warn!("Profile {name} not found, falling back to main profile or repo default");
        let main_file = self.profile_path(MAIN_PROFILE);
        if main_file.exists() {
            read_profile(&main_file)
        } else {
            load_repo_default_config()
        }
    }

    /// Add a new profile cloned from main
    pub fn add_from_default(&self, new_name: &str) -> anyhow::Result<PathBuf> {
        let profile = Profile {
            name: new_name.into(),
            value: self.load(MAIN_PROFILE)?,
        };
        let file = self.profile_path(new_name);
        fs::create_dir_all(self.profiles_dir())?;
        fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created new profile: {new_name}");
        Ok(file)
    }
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("invalid profile {}", path.display()))?;
    Ok(profile.value)
}
