use mcx_pack::PackOptions;
use sculptor::{AppAuthor, FileIO, ProjectInfo, impl_serde_str_toml};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// the namespace every function is emitted under
    pub namespace: String,
    /// interleave comments on the stack traffic in emitted functions
    pub debug: bool,
    /// how deep the evaluator unfolds definitions before residualizing a call
    pub unfold_limit: usize,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            namespace: "minecraft".to_string(),
            debug: false,
            unfold_limit: mcx_dynamics::DEFAULT_UNFOLD_LIMIT,
        }
    }
}

impl_serde_str_toml!(Conf);

impl AppAuthor for Conf {
    fn app_name() -> &'static str {
        "mcx"
    }

    fn author() -> &'static str {
        "mcx"
    }
}

impl Conf {
    pub fn path() -> PathBuf {
        Conf::config_dir().join("mcx.toml")
    }
    /// Reads the user configuration, writing out the default when there is
    /// none to read.
    pub fn load() -> Self {
        let path = Self::path();
        let file_conf = FileIO::new(path.clone());
        file_conf.load().unwrap_or_else(|_| {
            log::warn!("Using default configuration; suppose to find one at `{}`.", path.display());
            let conf: Conf = Default::default();
            if let Err(err) = file_conf.save(&conf) {
                log::warn!("Failed to save the default configuration: {:?}", err);
            }
            conf
        })
    }
    pub fn pack_options(&self) -> PackOptions {
        PackOptions { namespace: self.namespace.clone(), debug: self.debug }
    }
}
