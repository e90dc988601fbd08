use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"0x[a-fA-F0-9]{40}").expect("valid address regex"))
}

/// Lowercase every contract address found in `content`.
pub fn lowercase_addresses(content: &str) -> Cow<'_, str> {
    address_pattern().replace_all(content, |caps: &Captures| caps[0].to_lowercase())
}

/// Rewrite `path` in place. Returns `true` if the file changed.
pub fn lowercase_file(path: &Path) -> io::Result<bool> {
    let content = fs::read_to_string(path)?;
    let updated = lowercase_addresses(&content);

    if updated == content {
        return Ok(false);
    }

    fs::write(path, updated.as_bytes())?;
    log::info!("Updated contract addresses in: {}", path.display());
    Ok(true)
}

/// Process every regular file directly inside `dir`. Non-UTF-8 files are
/// skipped.
pub fn lowercase_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut changed = Vec::new();
    for path in files {
        match lowercase_file(&path) {
            Ok(true) => changed.push(path),
            Ok(false) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                log::warn!("Skipping non-text file {}", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    log::info!("All files have been processed ({} updated)", changed.len());
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "0xEeeeeB57642040bE42185f49C52F7E9B38F8eeee";
    const LOWER: &str = "0xeeeeeb57642040be42185f49c52f7e9b38f8eeee";

    #[test]
    fn test_lowercases_addresses_only() {
        let source = format!(
            "const ELK = '{}' // ELK\nlet ZERO_BD = BigDecimal.fromString('0xABCDEF')\n",
            MIXED
        );
        let updated = lowercase_addresses(&source);

        assert_eq!(
            updated,
            format!(
                "const ELK = '{}' // ELK\nlet ZERO_BD = BigDecimal.fromString('0xABCDEF')\n",
                LOWER
            )
        );
    }

    #[test]
    fn test_unchanged_content_is_borrowed() {
        let source = format!("'{}', // ELK\n", LOWER);
        assert!(matches!(lowercase_addresses(&source), Cow::Borrowed(_)));
    }

    #[test]
    fn test_idempotent() {
        let source = format!("{} and {}", MIXED, MIXED.to_uppercase().replace("0X", "0x"));
        let once = lowercase_addresses(&source).into_owned();
        let twice = lowercase_addresses(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lowercase_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mixed_path = dir.path().join("pricing.ts");
        let clean_path = dir.path().join("core.ts");
        let binary_path = dir.path().join("logo.bin");
        fs::write(&mixed_path, format!("let WETH_ADDRESS = '{}'\n", MIXED)).unwrap();
        fs::write(&clean_path, format!("let WETH_ADDRESS = '{}'\n", LOWER)).unwrap();
        fs::write(&binary_path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let changed = lowercase_dir(dir.path()).unwrap();

        assert_eq!(changed, vec![mixed_path.clone()]);
        assert_eq!(
            fs::read_to_string(&mixed_path).unwrap(),
            format!("let WETH_ADDRESS = '{}'\n", LOWER)
        );
        assert_eq!(fs::read(&binary_path).unwrap(), vec![0xff, 0xfe, 0x00, 0x80]);

        assert!(lowercase_dir(dir.path()).unwrap().is_empty());
    }
}
