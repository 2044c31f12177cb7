// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration file location.

use std::path::PathBuf;

/// Default configuration file: `<config dir>/etikett/config.json`.
pub fn config_file() -> PathBuf {
    resolve(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve(xdg_config_home: Option<String>, home: Option<String>) -> PathBuf {
    let base = match (xdg_config_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg),
        (_, Some(home)) if !home.is_empty() => PathBuf::from(home).join(".config"),
        // Last resort
        _ => PathBuf::from("."),
    };
    base.join("etikett").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        assert_eq!(
            resolve(Some("/xdg".into()), Some("/home/ops".into())),
            PathBuf::from("/xdg/etikett/config.json")
        );
    }

    #[test]
    fn home_fallback() {
        assert_eq!(
            resolve(Some(String::new()), Some("/home/ops".into())),
            PathBuf::from("/home/ops/.config/etikett/config.json")
        );
    }

    #[test]
    fn working_directory_as_last_resort() {
        assert_eq!(
            resolve(None, None),
            PathBuf::from("./etikett/config.json")
        );
    }
}
