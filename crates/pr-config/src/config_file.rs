use std::{
    env,
    path::{Path, PathBuf},
};

/// Config file name, looked up in the working directory and in `$HOME`
pub const CONFIG_FILE: &str = ".pr-briefing.toml";

/// Load config file content from CWD first, then home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(home_config) = get_home_config_path() {
        candidates.push(home_config);
    }
    load_config_file_from(&candidates)
}

/// Return the content of the first readable file among `candidates`
pub fn load_config_file_from<P: AsRef<Path>>(candidates: &[P]) -> Option<String> {
    candidates.iter().find_map(|path| {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("Loaded config from {}", path.display());
                Some(content)
            }
            Err(_) => None,
        }
    })
}

/// Get the path to the config file in the home directory
fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
