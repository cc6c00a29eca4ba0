use std::{fs, path};

use color_eyre::{eyre::eyre, eyre::WrapErr};

pub fn file_or_err<P>(path: P) -> eyre::Result<path::PathBuf>
where
    P: AsRef<path::Path>,
{
    let path_as_buf = path::PathBuf::from(path.as_ref());

    if !path_as_buf.is_file() {
        return Err(eyre!("File not found or permission denied"))
            .wrap_err(format!("'{}' is not a file", path_as_buf.to_string_lossy()));
    }

    Ok(path_as_buf)
}

pub fn dir_or_err<P>(path: P) -> eyre::Result<path::PathBuf>
where
    P: AsRef<path::Path>,
{
    let path_as_buf = path::PathBuf::from(path.as_ref());
    let meta = fs::metadata(path.as_ref()).wrap_err(format!(
        "'{}' is not a directory",
        path_as_buf.to_string_lossy()
    ))?;

    if !meta.is_dir() {
        return Err(eyre!("Directory not found")).wrap_err(format!(
            "'{}' is not a directory",
            path_as_buf.to_string_lossy()
        ));
    }

    Ok(path_as_buf)
}

/// Checks that `path` is a file with the extension `ext`. A leading `.` in `ext` is only
/// accepted if `strict` is false.
pub fn file_with_ext<P>(path: P, ext: &str, strict: bool) -> eyre::Result<path::PathBuf>
where
    P: AsRef<path::Path>,
{
    let buf = file_or_err(path.as_ref())?;
    let name = buf.to_string_lossy();

    let file_ext = path
        .as_ref()
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or(eyre!(format!(
            "Expected file with extension '{}', got file '{}'",
            ext, name
        )))?;

    let ext_minus = match ext.strip_prefix('.') {
        Some(stripped) if !strict => stripped,
        _ => ext,
    };

    if ext_minus.to_lowercase() != file_ext.to_lowercase() {
        return Err(eyre!(format!(
            "Expected file extension '{}', got '{}'",
            ext_minus, file_ext
        )));
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("narrange.xml");
        fs::write(&file, "<x/>").unwrap();

        assert!(file_or_err(&file).is_ok());
        assert!(file_or_err(dir.path()).is_err());
        assert!(file_or_err(dir.path().join("missing.xml")).is_err());

        assert!(dir_or_err(dir.path()).is_ok());
        assert!(dir_or_err(&file).is_err());
        assert!(dir_or_err(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_file_with_ext() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("options.JSON");
        let xml = dir.path().join("narrange.xml");
        let bare = dir.path().join("options");
        for f in [&json, &xml, &bare] {
            fs::write(f, "").unwrap();
        }

        assert!(file_with_ext(&json, "json", true).is_ok());
        assert!(file_with_ext(&json, ".json", false).is_ok());
        assert!(file_with_ext(&json, ".json", true).is_err());
        assert!(file_with_ext(&xml, "json", true).is_err());
        assert!(file_with_ext(&bare, "json", true).is_err());
    }
}
