use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET: &str = "typescript-learning-path.md";
pub const TARGET_ENV: &str = "FENCE_COLLAPSE_TARGET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_target")]
    pub target: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
        }
    }
}

fn default_target() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET)
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    target: Option<PathBuf>,
}

impl Config {
    /// Resolves the target document. Later sources win: built-in default,
    /// global file, project file, `--config` file, environment, CLI path.
    pub fn load(config_path: Option<&PathBuf>, target: Option<PathBuf>) -> Result<Self> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        let env_target = std::env::var(TARGET_ENV).ok();

        Self::load_layered(
            global.as_deref(),
            project.as_deref(),
            config_path.map(PathBuf::as_path),
            env_target,
            target,
        )
    }

    fn load_layered(
        global: Option<&Path>,
        project: Option<&Path>,
        custom: Option<&Path>,
        env_target: Option<String>,
        target: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load global config
        if let Some(global_path) = global {
            tracing::debug!("Loading global config: {:?}", global_path);
            config.merge(Self::load_from_file(global_path)?);
        }

        // 2. Load project config
        if let Some(project_path) = project {
            tracing::debug!("Loading project config: {:?}", project_path);
            config.merge(Self::load_from_file(project_path)?);
        }

        // 3. Load custom config file
        if let Some(path) = custom {
            tracing::debug!("Loading custom config: {:?}", path);
            config.merge(Self::load_from_file(path)?);
        }

        // 4. Environment variable override
        if let Some(val) = env_target
            && !val.trim().is_empty()
        {
            config.target = PathBuf::from(val.trim());
        }

        // 5. CLI argument override (highest priority)
        if let Some(target) = target {
            config.target = target;
        }

        tracing::debug!("Resolved target: {:?}", config.target);
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<ConfigFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        #[cfg(unix)]
        Self::check_permissions(path)?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
            .permissions()
            .mode();

        // Writable by group or others (0o022)
        if mode & 0o022 != 0 {
            tracing::warn!(
                "Config file {:?} is writable by group or others: {:o}. \
                 Recommend: chmod 644 {:?}",
                path,
                mode,
                path
            );
        }

        Ok(())
    }

    fn merge(&mut self, other: ConfigFile) {
        if let Some(target) = other.target {
            self.target = target;
        }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/fence-collapse/config.toml"))
    }

    pub fn project_config_path() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_config(&current)
    }

    fn find_project_config(start: &Path) -> Option<PathBuf> {
        let mut dir = start;

        loop {
            let candidate = dir.join(".fence-collapse.toml");
            if candidate.exists() {
                return Some(candidate);
            }

            dir = dir.parent()?;
        }
    }

    pub fn init_config(global: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().context("Failed to determine global config path")?
        } else {
            PathBuf::from(".fence-collapse.toml")
        };

        Self::write_template(&path)?;
        Ok(path)
    }

    fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists: {:?}", path);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let template = format!(
            r#"# Markdown document rewritten by fence-collapse.
# Overridden by {TARGET_ENV} and by the path given on the command line.
target = "{DEFAULT_TARGET}"
"#
        );

        fs::write(path, template)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }
}
