//! Stock pool and helper definitions.
//!
//! One data table per concern, consulted by a generic initialiser: the
//! eight XDG pools with their fallback display names and default helper
//! sets, and the stock helper bindings. Pool directories come from the
//! user's `~/.config/user-dirs.dirs` when the key is present there.

use std::path::PathBuf;

use crate::types::{Helper, Pool};

/// Fallbacks for one XDG pool, used when neither the configuration store
/// nor `user-dirs.dirs` knows better.
pub struct PoolDefaults {
    pub key: &'static str,
    pub display_name: &'static str,
    pub helpers: &'static [&'static str],
}

pub const POOL_DEFAULTS: [PoolDefaults; 8] = [
    PoolDefaults {
        key: "XDG_DESKTOP_DIR",
        display_name: "Desktop",
        helpers: &["odt", "image"],
    },
    PoolDefaults {
        key: "XDG_TEMPLATES_DIR",
        display_name: "Templates",
        helpers: &["odt", "text"],
    },
    PoolDefaults {
        key: "XDG_PUBLICSHARE_DIR",
        display_name: "PublicShare",
        helpers: &["odt", "image", "pdf"],
    },
    PoolDefaults {
        key: "XDG_DOCUMENTS_DIR",
        display_name: "Documents",
        helpers: &["odt", "pdf"],
    },
    PoolDefaults {
        key: "XDG_MUSIC_DIR",
        display_name: "Music",
        helpers: &["music"],
    },
    PoolDefaults {
        key: "XDG_PICTURES_DIR",
        display_name: "Pictures",
        helpers: &["image"],
    },
    PoolDefaults {
        key: "XDG_VIDEOS_DIR",
        display_name: "Videos",
        helpers: &["video"],
    },
    PoolDefaults {
        key: "XDG_SOURCES_DIR",
        display_name: "Sources",
        helpers: &["text"],
    },
];

/// The stock helper bindings.
pub fn default_helpers() -> Vec<Helper> {
    let table: [(&str, &[&str], &str, u32); 6] = [
        ("text", &["txt", "cpp", "h"], "/bin/cat", 6),
        ("pdf", &["pdf"], "/usr/bin/pdftotext", 6),
        ("odt", &["odt"], "/usr/bin/odt2txt", 6),
        ("image", &["jpg", "jpeg", "png"], "/usr/bin/iinfo -v", 0),
        ("music", &["mp3", "ogg"], "/usr/bin/mediainfo", 0),
        ("video", &["mpg", "avi", "webm"], "/usr/bin/mediainfo", 0),
    ];
    table
        .iter()
        .map(|(name, exts, command, granularity)| Helper {
            name: (*name).to_string(),
            extensions: exts.iter().map(|e| (*e).to_string()).collect(),
            command: (*command).to_string(),
            granularity: *granularity,
        })
        .collect()
}

/// Build the default definition of one XDG pool.
pub fn default_pool(key: &str) -> Option<Pool> {
    let d = POOL_DEFAULTS.iter().find(|d| d.key == key)?;
    let (mut display_name, root) =
        user_dir(key).unwrap_or_else(|| (d.display_name.to_string(), PathBuf::new()));
    if display_name.is_empty() {
        display_name = d.display_name.to_string();
    }
    let index_name = Pool::derive_index_name(&display_name);
    Some(Pool {
        key: d.key.to_string(),
        display_name,
        root,
        helpers: d.helpers.iter().map(|h| (*h).to_string()).collect(),
        stemming: "none".to_string(),
        stopwords: "none".to_string(),
        index_name,
    })
}

pub fn default_pools() -> Vec<Pool> {
    POOL_DEFAULTS
        .iter()
        .filter_map(|d| default_pool(d.key))
        .collect()
}

/// Look a pool key up in `~/.config/user-dirs.dirs`, returning the display
/// name (the path relative to `$HOME`) and the expanded directory.
pub fn user_dir(key: &str) -> Option<(String, PathBuf)> {
    let file = shellexpand::tilde("~/.config/user-dirs.dirs");
    let content = std::fs::read_to_string(file.as_ref()).ok()?;
    let value = parse_user_dirs(&content, key)?;
    let display = value
        .strip_prefix("$HOME/")
        .map_or_else(String::new, str::to_string);
    let expanded = shellexpand::env(&value)
        .map(|c| c.into_owned())
        .unwrap_or(value);
    Some((display, PathBuf::from(expanded)))
}

fn parse_user_dirs(content: &str, key: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() == key {
            return Some(v.trim().trim_matches('"').to_string());
        }
    }
    None
}
