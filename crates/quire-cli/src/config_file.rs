use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub zotero: Option<ZoteroConfig>,
    pub contact: Option<ContactConfig>,
    pub page: Option<PageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoteroConfig {
    /// "user" or "group".
    pub library: Option<String>,
    pub user_id: Option<u64>,
    pub group_id: Option<u64>,
    pub link_slug: Option<String>,
    pub api_base: Option<String>,
    pub link_base: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactConfig {
    pub endpoint: Option<String>,
    pub post_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    pub default_listing: Option<String>,
}

/// Platform config directory path: `<config_dir>/quire/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quire").join("config.toml"))
}

/// Load config by cascading CWD `.quire.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".quire.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        zotero: Some(ZoteroConfig {
            library: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.library.clone())
                .or_else(|| base.zotero.as_ref().and_then(|z| z.library.clone())),
            user_id: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.user_id)
                .or_else(|| base.zotero.as_ref().and_then(|z| z.user_id)),
            group_id: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.group_id)
                .or_else(|| base.zotero.as_ref().and_then(|z| z.group_id)),
            link_slug: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.link_slug.clone())
                .or_else(|| base.zotero.as_ref().and_then(|z| z.link_slug.clone())),
            api_base: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.api_base.clone())
                .or_else(|| base.zotero.as_ref().and_then(|z| z.api_base.clone())),
            link_base: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.link_base.clone())
                .or_else(|| base.zotero.as_ref().and_then(|z| z.link_base.clone())),
            fetch_timeout_secs: overlay
                .zotero
                .as_ref()
                .and_then(|z| z.fetch_timeout_secs)
                .or_else(|| base.zotero.as_ref().and_then(|z| z.fetch_timeout_secs)),
        }),
        contact: Some(ContactConfig {
            endpoint: overlay
                .contact
                .as_ref()
                .and_then(|c| c.endpoint.clone())
                .or_else(|| base.contact.as_ref().and_then(|c| c.endpoint.clone())),
            post_timeout_secs: overlay
                .contact
                .as_ref()
                .and_then(|c| c.post_timeout_secs)
                .or_else(|| base.contact.as_ref().and_then(|c| c.post_timeout_secs)),
        }),
        page: Some(PageConfig {
            default_listing: overlay
                .page
                .as_ref()
                .and_then(|p| p.default_listing.clone())
                .or_else(|| base.page.as_ref().and_then(|p| p.default_listing.clone())),
        }),
    }
}
