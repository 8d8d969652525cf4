use std::env;
use std::path::PathBuf;

/// Process-wide settings, resolved once at startup. There is no runtime
/// reconfiguration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub images_dir: PathBuf,
    pub default_image: Option<PathBuf>,
    pub receipts_dir: PathBuf,
}

impl Config {
    /// Reads settings from the environment, honoring a `.env` file when one
    /// is present. Unset variables fall back to local defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_path =
            PathBuf::from(env::var("POS_DATABASE_PATH").unwrap_or_else(|_| "pizzeria.db".into()));
        let images_dir =
            PathBuf::from(env::var("POS_IMAGES_DIR").unwrap_or_else(|_| "images/pizzas".into()));
        let default_image = env::var("POS_DEFAULT_IMAGE")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let candidate = images_dir.join("default_pizza.jpg");
                candidate.exists().then_some(candidate)
            });
        let receipts_dir =
            PathBuf::from(env::var("POS_RECEIPTS_DIR").unwrap_or_else(|_| "receipts".into()));

        Config {
            database_path,
            images_dir,
            default_image,
            receipts_dir,
        }
    }
}
