use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::models::Product;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-z0-9]+").unwrap());

/// "Pepperoni Classic" -> "pepperoni_classic"
pub fn normalized_image_name(name: &str) -> String {
    NON_ALNUM
        .replace_all(&name.trim().to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Resolves the image to show for a product. The precedence is fixed:
///
/// 1. the stored `image_path`, when set and resolvable;
/// 2. `<images_dir>/<normalized name>.{jpg,jpeg,png}`;
/// 3. the configured default image, when it exists;
/// 4. `None` — the caller substitutes a placeholder.
///
/// Always yields exactly one decision for a given filesystem state.
pub fn find_image_for_product(config: &Config, product: &Product) -> Option<PathBuf> {
    if let Some(stored) = &product.image_path {
        if !stored.trim().is_empty() {
            let path = PathBuf::from(stored);
            if path.exists() {
                return Some(path);
            }
        }
    }

    let safe = normalized_image_name(&product.name);
    if !safe.is_empty() {
        for ext in ["jpg", "jpeg", "png"] {
            let candidate = config.images_dir.join(format!("{safe}.{ext}"));
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    if let Some(default) = &config.default_image {
        if default.exists() {
            return Some(default.clone());
        }
    }

    None
}
