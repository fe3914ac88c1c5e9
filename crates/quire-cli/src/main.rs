use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use quire_page::contract::PageContract;
use quire_page::controller::{ControllerConfig, PageController};
use quire_page::event::PageEvent;
use quire_page::gateway::HttpContactGateway;
use quire_page::mock::{MockKeys, MockSource};
use quire_page::page::{DEFAULT_LISTING_URL, PageLinks, PageModel};
use quire_page::source::{BibliographySource, ZoteroSource};
use quire_zotero::{Library, ZoteroClient};

mod config_file;
mod output;

use config_file::ConfigFile;
use output::ColorMode;

/// Default contact endpoint on the catalogue backend.
const DEFAULT_CONTACT_ENDPOINT: &str = "https://medieval.bodleian.ox.ac.uk/contact";

/// Quire - Headless driver for the manuscripts catalogue page logic
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind a saved catalogue page against the markup contract
    Check {
        /// Path to the HTML file to check
        file_path: PathBuf,

        /// Address to treat the page as loaded from
        #[arg(long)]
        url: Option<String>,

        /// Print the binding as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Replay the page-load pass and print every patch it produces
    Run {
        /// Path to the HTML file to run
        file_path: PathBuf,

        /// Address to treat the page as loaded from (nav matching uses it)
        #[arg(long)]
        url: Option<String>,

        /// Skip the live bibliography lookup
        #[arg(long)]
        no_fetch: bool,

        /// Print patches and the final summary as JSON, one object per line
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output log file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Zotero library kind: "user" or "group"
        #[arg(long)]
        zotero_library: Option<String>,

        /// Zotero user library id
        #[arg(long)]
        zotero_user: Option<u64>,

        /// Zotero group library id
        #[arg(long)]
        zotero_group: Option<u64>,

        /// Slug used in zotero.org tag-page links
        #[arg(long)]
        link_slug: Option<String>,

        /// Zotero API base URL
        #[arg(long)]
        api_base: Option<String>,

        /// Bibliography lookup timeout in seconds
        #[arg(long)]
        fetch_timeout: Option<u64>,
    },

    /// Print the encoded lookup tag and derived URLs for a title
    Tag {
        /// Manuscript title as it appears in the item heading
        title: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            file_path,
            url,
            json,
            no_color,
        } => check(file_path, url, json, no_color),
        Command::Run {
            file_path,
            url,
            no_fetch,
            json,
            no_color,
            output,
            zotero_library,
            zotero_user,
            zotero_group,
            link_slug,
            api_base,
            fetch_timeout,
        } => {
            run(
                file_path,
                url,
                no_fetch,
                json,
                no_color,
                output,
                zotero_library,
                zotero_user,
                zotero_group,
                link_slug,
                api_base,
                fetch_timeout,
            )
            .await
        }
        Command::Tag { title } => tag(&title),
    }
}

/// Zotero settings after applying flags > env > config file > defaults.
struct ZoteroSettings {
    library: Library,
    api_base: Option<String>,
    link_base: Option<String>,
    link_slug: Option<String>,
    fetch_timeout: Duration,
}

impl ZoteroSettings {
    fn client(&self) -> ZoteroClient {
        let mut client = ZoteroClient::with_library(self.library);
        if let Some(ref base) = self.api_base {
            client = client.with_api_base(base.clone());
        }
        if let Some(ref base) = self.link_base {
            client = client.with_link_base(base.clone());
        }
        if let Some(ref slug) = self.link_slug {
            client = client.with_link_slug(slug.clone());
        }
        client
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn resolve_zotero(
    config: &ConfigFile,
    zotero_library: Option<String>,
    zotero_user: Option<u64>,
    zotero_group: Option<u64>,
    link_slug: Option<String>,
    api_base: Option<String>,
    fetch_timeout: Option<u64>,
) -> ZoteroSettings {
    let zotero = config.zotero.as_ref();

    let kind = zotero_library
        .or_else(|| std::env::var("QUIRE_ZOTERO_LIBRARY").ok())
        .or_else(|| zotero.and_then(|z| z.library.clone()))
        .unwrap_or_else(|| "user".to_string());
    let user_id = zotero_user
        .or_else(|| env_parse("QUIRE_ZOTERO_USER"))
        .or_else(|| zotero.and_then(|z| z.user_id))
        .unwrap_or(quire_zotero::DEFAULT_USER_ID);
    let group_id = zotero_group
        .or_else(|| env_parse("QUIRE_ZOTERO_GROUP"))
        .or_else(|| zotero.and_then(|z| z.group_id))
        .unwrap_or(quire_zotero::DEFAULT_GROUP_ID);

    let library = if kind.eq_ignore_ascii_case("group") {
        Library::Group(group_id)
    } else {
        Library::User(user_id)
    };

    let fetch_timeout_secs = fetch_timeout
        .or_else(|| env_parse("QUIRE_FETCH_TIMEOUT"))
        .or_else(|| zotero.and_then(|z| z.fetch_timeout_secs))
        .unwrap_or(10);

    ZoteroSettings {
        library,
        api_base: api_base
            .or_else(|| std::env::var("QUIRE_API_BASE").ok())
            .or_else(|| zotero.and_then(|z| z.api_base.clone())),
        link_base: std::env::var("QUIRE_LINK_BASE")
            .ok()
            .or_else(|| zotero.and_then(|z| z.link_base.clone())),
        link_slug: link_slug
            .or_else(|| std::env::var("QUIRE_LINK_SLUG").ok())
            .or_else(|| zotero.and_then(|z| z.link_slug.clone())),
        fetch_timeout: Duration::from_secs(fetch_timeout_secs),
    }
}

fn read_page(file_path: &PathBuf) -> anyhow::Result<String> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    Ok(std::fs::read_to_string(file_path)?)
}

fn page_url(url: Option<String>, file_path: &PathBuf) -> String {
    url.unwrap_or_else(|| format!("file://{}", file_path.display()))
}

fn check(
    file_path: PathBuf,
    url: Option<String>,
    json: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    let html = read_page(&file_path)?;
    let address = page_url(url, &file_path);
    let color = ColorMode(!no_color && !json);

    let contract = PageContract::default();
    let binding = contract
        .bind(&html, &address)
        .map_err(|e| anyhow::anyhow!("Page contract violated: {}", e))?;

    let mut stdout = std::io::stdout();
    output::print_binding_report(&mut stdout, &binding, color, json)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run(
    file_path: PathBuf,
    url: Option<String>,
    no_fetch: bool,
    json: bool,
    no_color: bool,
    output: Option<PathBuf>,
    zotero_library: Option<String>,
    zotero_user: Option<u64>,
    zotero_group: Option<u64>,
    link_slug: Option<String>,
    api_base: Option<String>,
    fetch_timeout: Option<u64>,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let settings = resolve_zotero(
        &config,
        zotero_library,
        zotero_user,
        zotero_group,
        link_slug,
        api_base,
        fetch_timeout,
    );

    let html = read_page(&file_path)?;
    let address = page_url(url, &file_path);

    // Determine color mode and output writer
    let use_color = !no_color && output.is_none() && !json;
    let color = ColorMode(use_color);

    let writer: Box<dyn Write + Send> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let contract = PageContract::default();
    let binding = contract
        .bind(&html, &address)
        .map_err(|e| anyhow::anyhow!("Page contract violated: {}", e))?;

    let client = settings.client();
    let links = PageLinks {
        default_listing: config
            .page
            .as_ref()
            .and_then(|p| p.default_listing.clone())
            .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string()),
        tag_page_base: client.tag_page_base(),
    };
    let model = PageModel::with_links(&binding, links);

    let source: Arc<dyn BibliographySource> = if no_fetch {
        Arc::new(MockSource::new(MockKeys::Keys(Vec::new())))
    } else {
        Arc::new(ZoteroSource::new(client, settings.fetch_timeout))
    };

    let contact_endpoint = std::env::var("QUIRE_CONTACT_ENDPOINT")
        .ok()
        .or_else(|| config.contact.as_ref().and_then(|c| c.endpoint.clone()))
        .unwrap_or_else(|| DEFAULT_CONTACT_ENDPOINT.to_string());
    let post_timeout_secs = env_parse("QUIRE_POST_TIMEOUT")
        .or_else(|| config.contact.as_ref().and_then(|c| c.post_timeout_secs))
        .unwrap_or(15);
    let gateway = Arc::new(HttpContactGateway::new(
        contact_endpoint,
        Duration::from_secs(post_timeout_secs),
    ));

    let controller_config = ControllerConfig {
        fetch_timeout: settings.fetch_timeout,
        contact_timeout: Duration::from_secs(post_timeout_secs),
    };

    let renderer = output::ConsoleRenderer::new(writer, color, json);
    let mut controller = PageController::new(model, renderer, source, gateway, controller_config);

    // Ctrl+C aborts the outstanding lookup; the page settles as Unavailable.
    let cancel = controller.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    controller.step(PageEvent::Loaded);
    controller.run_until_settled().await;

    let model = controller.model.clone();
    output::print_run_summary(controller.renderer_mut().writer(), &model, no_fetch, color, json)?;
    Ok(())
}

fn tag(title: &str) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let settings = resolve_zotero(&config, None, None, None, None, None, None);
    let client = settings.client();

    let encoded = quire_zotero::encode_tag(title);
    let mut stdout = std::io::stdout();
    output::print_tag_report(
        &mut stdout,
        title,
        &encoded,
        &client.keys_url(title),
        &client.tag_page_url(title),
        ColorMode(true),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::ZoteroConfig;

    fn file_config() -> ConfigFile {
        ConfigFile {
            zotero: Some(ZoteroConfig {
                library: Some("group".to_string()),
                user_id: Some(555),
                group_id: Some(99),
                fetch_timeout_secs: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_falls_back_to_defaults() {
        let settings = resolve_zotero(&ConfigFile::default(), None, None, None, None, None, None);
        assert_eq!(settings.library, Library::User(quire_zotero::DEFAULT_USER_ID));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(10));
        assert!(settings.api_base.is_none());
        assert!(settings.link_slug.is_none());
    }

    #[test]
    fn resolve_prefers_file_over_defaults() {
        let settings = resolve_zotero(&file_config(), None, None, None, None, None, None);
        assert_eq!(settings.library, Library::Group(99));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn resolve_prefers_flags_over_file() {
        let settings = resolve_zotero(
            &file_config(),
            Some("user".to_string()),
            Some(42),
            None,
            None,
            None,
            Some(7),
        );
        assert_eq!(settings.library, Library::User(42));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(7));
    }

    #[test]
    fn library_kind_is_case_insensitive() {
        let settings = resolve_zotero(
            &ConfigFile::default(),
            Some("Group".to_string()),
            None,
            Some(77),
            None,
            None,
            None,
        );
        assert_eq!(settings.library, Library::Group(77));
    }
}
