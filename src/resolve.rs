use std::path;

use serde::Serialize;

use crate::{defaults::Defaults, options::Options};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPaths {
    pub exe_path: path::PathBuf,
    pub src_path: path::PathBuf,
    /// Either an existing file or empty, in which case narrange uses its own default
    pub config_file_path: path::PathBuf,
}

pub fn tabs_config_file(tabs: u8) -> String {
    format!("narrange-tabs-{}.xml", tabs)
}

pub fn exe_path(opts: &Options, defaults: &Defaults) -> path::PathBuf {
    match &opts.exe_path {
        Some(exe) => path::PathBuf::from(exe.as_path()),
        None => defaults.exe_path(),
    }
}

pub fn src_path(opts: &Options, defaults: &Defaults) -> path::PathBuf {
    match &opts.src_path {
        Some(src) => path::PathBuf::from(src.as_path()),
        None => path::PathBuf::from(defaults.src_path.as_path()),
    }
}

pub fn config_path(opts: &Options, defaults: &Defaults) -> path::PathBuf {
    let requested = opts
        .config_file_path
        .as_ref()
        .or(opts.config_path.as_ref())
        .unwrap_or(&defaults.config_file_path);

    // `exists` is false for paths that cannot be accessed, it never fails
    if requested.exists() {
        return path::PathBuf::from(requested.as_path());
    }

    let tabs = match opts.tabs {
        None => {
            log::debug!(
                "Configuration '{}' not found, using the narrange default",
                requested.to_string_lossy()
            );
            return path::PathBuf::new();
        }
        Some(tabs) => tabs,
    };

    let fallback = defaults.config_dir().join(tabs_config_file(tabs));
    if !fallback.exists() {
        log::warn!(
            "Configuration '{}' not found and no bundled configuration for {} tabs at '{}', \
                using the narrange default",
            requested.to_string_lossy(),
            tabs,
            fallback.to_string_lossy()
        );
        return path::PathBuf::new();
    }

    log::debug!(
        "Configuration '{}' not found, using bundled configuration '{}'",
        requested.to_string_lossy(),
        fallback.to_string_lossy()
    );
    fallback
}

pub fn paths(opts: &Options, defaults: &Defaults) -> ResolvedPaths {
    ResolvedPaths {
        exe_path: exe_path(opts, defaults),
        src_path: src_path(opts, defaults),
        config_file_path: config_path(opts, defaults),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn defaults(root: &path::Path) -> Defaults {
        Defaults::from_lookup(|_| None).with_root(root)
    }

    fn bundle(root: &path::Path, tabs: &[u8]) {
        fs::create_dir_all(root.join("config")).unwrap();
        for t in tabs {
            fs::write(root.join("config").join(tabs_config_file(*t)), "<x/>").unwrap();
        }
    }

    #[test]
    fn test_existing_config_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("custom.xml");
        fs::write(&cfg, "<x/>").unwrap();
        bundle(dir.path(), &[4]);

        // the existing file wins, regardless of `tabs`
        for opts in [
            Options::new().config_file_path(&cfg),
            Options::new().config_file_path(&cfg).tabs(4),
        ] {
            assert_eq!(cfg, config_path(&opts, &defaults(dir.path())));
        }
    }

    #[test]
    fn test_missing_config_without_tabs() {
        let dir = tempfile::tempdir().unwrap();
        bundle(dir.path(), &[2, 4]);

        let opts = Options::new().config_file_path(dir.path().join("missing.xml"));
        assert_eq!(
            path::PathBuf::new(),
            config_path(&opts, &defaults(dir.path()))
        );
    }

    #[test]
    fn test_missing_config_with_tabs() {
        let dir = tempfile::tempdir().unwrap();
        bundle(dir.path(), &[2, 4]);

        for t in [2u8, 4] {
            let opts = Options::new()
                .config_file_path(dir.path().join("missing.xml"))
                .tabs(t);
            assert_eq!(
                dir.path().join("config").join(format!("narrange-tabs-{}.xml", t)),
                config_path(&opts, &defaults(dir.path()))
            );
        }

        // no bundled file for the requested width
        let opts = Options::new()
            .config_file_path(dir.path().join("missing.xml"))
            .tabs(3);
        assert_eq!(
            path::PathBuf::new(),
            config_path(&opts, &defaults(dir.path()))
        );
    }

    #[test]
    fn test_config_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xml");
        let b = dir.path().join("b.xml");
        let c = dir.path().join("c.xml");
        for f in [&a, &b, &c] {
            fs::write(f, "<x/>").unwrap();
        }

        let defaults = Defaults {
            config_file_path: c.clone(),
            ..defaults(dir.path())
        };

        let mut opts = Options::new();
        assert_eq!(c, config_path(&opts, &defaults));
        opts.config_path = Some(b.clone());
        assert_eq!(b, config_path(&opts, &defaults));
        opts.config_file_path = Some(a.clone());
        assert_eq!(a, config_path(&opts, &defaults));
    }

    #[test]
    fn test_exe_and_src() {
        let defaults = Defaults {
            src_path: "from-env".into(),
            ..Defaults::from_lookup(|_| None).with_root("/res")
        };

        let resolved = paths(&Options::new(), &defaults);
        assert_eq!(path::PathBuf::from("from-env"), resolved.src_path);
        assert_eq!(
            path::PathBuf::from("/res").join("lib").join("narrange.exe"),
            resolved.exe_path
        );

        let resolved = paths(&Options::new().src_path("proj").exe_path("tool"), &defaults);
        assert_eq!(path::PathBuf::from("proj"), resolved.src_path);
        assert_eq!(path::PathBuf::from("tool"), resolved.exe_path);
    }
}
