use std::env;
use std::path::PathBuf;

/// Which native engine a library lookup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineLibrary {
    Mecab,
    Cabocha,
}

impl EngineLibrary {
    fn stem(self) -> &'static str {
        match self {
            EngineLibrary::Mecab => "mecab",
            EngineLibrary::Cabocha => "cabocha",
        }
    }
}

pub(crate) fn default_library_candidates(engine: EngineLibrary) -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        match engine {
            EngineLibrary::Mecab => &["libmecab.dll", "mecab.dll"],
            EngineLibrary::Cabocha => &["libcabocha.dll", "cabocha.dll"],
        }
    }
    #[cfg(target_os = "macos")]
    {
        match engine {
            EngineLibrary::Mecab => &[
                "libmecab.dylib",
                "libmecab.2.dylib",
                "/usr/local/lib/libmecab.dylib",
                "/opt/homebrew/lib/libmecab.dylib",
                "@rpath/libmecab.dylib",
            ],
            EngineLibrary::Cabocha => &[
                "libcabocha.dylib",
                "libcabocha.5.dylib",
                "/usr/local/lib/libcabocha.dylib",
                "/opt/homebrew/lib/libcabocha.dylib",
            ],
        }
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        match engine {
            EngineLibrary::Mecab => &[
                "libmecab.so.2",
                "libmecab.so",
                "/usr/local/lib/libmecab.so",
                "/usr/lib/x86_64-linux-gnu/libmecab.so.2",
                "/usr/lib/libmecab.so.2",
            ],
            EngineLibrary::Cabocha => &[
                "libcabocha.so.5",
                "libcabocha.so",
                "/usr/local/lib/libcabocha.so",
                "/usr/lib/x86_64-linux-gnu/libcabocha.so.5",
                "/usr/lib/libcabocha.so.5",
            ],
        }
    }
}

fn platform_library_filename(engine: EngineLibrary) -> String {
    #[cfg(target_os = "windows")]
    {
        format!("lib{}.dll", engine.stem())
    }
    #[cfg(target_os = "macos")]
    {
        format!("lib{}.dylib", engine.stem())
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        format!("lib{}.so", engine.stem())
    }
}

/// Looks for a user-local install before the loader's search path is tried.
pub(crate) fn discover_default_library_path(engine: EngineLibrary) -> Option<PathBuf> {
    let file_name = platform_library_filename(engine);

    #[cfg(target_os = "windows")]
    {
        if let Some(local_app_data) = env::var_os("LOCALAPPDATA") {
            let path = PathBuf::from(local_app_data)
                .join(engine.stem())
                .join("bin")
                .join(&file_name);
            if path.exists() {
                return Some(path);
            }
        }
        let well_known = [
            PathBuf::from(format!("C:\\Program Files\\MeCab\\bin\\{file_name}")),
            PathBuf::from(format!("C:\\Program Files (x86)\\MeCab\\bin\\{file_name}")),
        ];
        for path in well_known {
            if path.exists() {
                return Some(path);
            }
        }
    }

    #[cfg(unix)]
    {
        if let Some(home) = env::var_os("HOME") {
            let path = PathBuf::from(home)
                .join(".local")
                .join("lib")
                .join(&file_name);
            if path.exists() {
                return Some(path);
            }
        }
    }

    None
}
