use std::path;

/// Formats the narrange configuration switch, empty if no configuration is used.
pub fn config_flag<P>(config: P) -> String
where
    P: AsRef<path::Path>,
{
    let config = config.as_ref();
    if config.as_os_str().is_empty() {
        return "".to_string();
    }
    format!("/c:{}", config.to_string_lossy())
}

/// Builds the shell command line `<exe> <src> <flag>`.
///
/// The paths are not escaped, the command is executed as is by the system shell.
pub fn build_command<E, S>(exe: E, src: S, flag: &str) -> String
where
    E: AsRef<path::Path>,
    S: AsRef<path::Path>,
{
    let (exe, src) = (exe.as_ref(), src.as_ref());
    let re = shell_chars();
    for p in [exe, src] {
        if has_shell_chars(&re, p) {
            log::warn!(
                "Path '{}' contains characters interpreted by the shell, it is passed unescaped",
                p.to_string_lossy()
            );
        }
    }
    format!("{} {} {}", exe.to_string_lossy(), src.to_string_lossy(), flag)
}

fn shell_chars() -> regex::Regex {
    // whitespace is included since it splits the argument
    regex::Regex::new(r#"[\s;&|<>()$`"'*?!]"#).unwrap()
}

fn has_shell_chars(re: &regex::Regex, path: &path::Path) -> bool {
    re.is_match(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag() {
        assert_eq!("", config_flag(""));
        assert_eq!("", config_flag(path::PathBuf::new()));
        assert_eq!("/c:/path", config_flag("/path"));
        assert_eq!("/c:config/narrange.xml", config_flag("config/narrange.xml"));
    }

    #[test]
    fn test_build_command() {
        assert_eq!("exe src ", build_command("exe", "src", ""));
        assert_eq!("exe src /c:/path", build_command("exe", "src", "/c:/path"));
        assert_eq!(
            "lib/narrange.exe project /c:config/narrange-tabs-4.xml",
            build_command(
                "lib/narrange.exe",
                "project",
                &config_flag("config/narrange-tabs-4.xml")
            )
        );
    }

    #[test]
    fn test_shell_chars() {
        // a single expression is used for all checks
        let re = shell_chars();
        assert!(!has_shell_chars(&re, path::Path::new("some/path/to/src")));
        assert!(!has_shell_chars(&re, path::Path::new("C:\\src\\project")));
        assert!(has_shell_chars(&re, path::Path::new("some path")));
        assert!(has_shell_chars(&re, path::Path::new("src;rm")));
        assert!(has_shell_chars(&re, path::Path::new("$HOME/src")));

        // paths are passed unchanged
        assert_eq!("a b c d ", build_command("a b", "c d", ""));
    }
}
