use std::env;
use std::path::PathBuf;

use revue_wxr::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok().and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    let cur_dir = env::current_dir().ok();
    let cfg_dir = dirs::config_dir();

    [exe_dir, cur_dir, cfg_dir].into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

/// Reads the configuration from `cfg_path`, or from the first `revue-wxr.toml` found
/// next to the executable, in the current directory or in the user config dir.
/// Without any file the defaults are used.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let Some(config_path) = cfg_path.or_else(get_config_path) else {
        return Ok(Config::default());
    };

    match read_config(&config_path) {
        Ok(config) => Ok(config),
        Err(e) => Err(e.to_string()),
    }
}
