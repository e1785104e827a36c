use clap::{Parser, Subcommand};
use respond_pages::amp::BasicAmpConverter;
use respond_pages::site::{Site, User};
use respond_pages::types::{Change, Page, PageSettings};
use respond_pages::{catalog, config, output, pages};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "respond-pages")]
#[command(about = "Manage the pages and page catalog of static HTML sites")]
#[command(long_about = "\
Manage the pages and page catalog of static HTML sites

Each site is a directory of HTML pages under the sites root. Page metadata
is extracted from the HTML and cached in data/pages.json.

Site structure:

  sites/
  ├── config.toml                  # Root config (optional, cascades to sites)
  └── portfolio/
      ├── config.toml              # Per-site config (overrides root)
      ├── data/pages.json          # Page catalog
      ├── templates/default.html   # Template for new pages
      ├── fragments/page/          # Fragments (reserve page names)
      ├── index.html               # Pages: <url>.html
      └── blog/hello.html

Templates may use {{page.title}} and {{page.description}} placeholders.

Run 'respond-pages gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Sites root directory
    #[arg(long, default_value = "sites", global = true)]
    root: PathBuf,

    /// Acting user's email (overrides [user] in config)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Acting user's first name
    #[arg(long, global = true)]
    first_name: Option<String>,

    /// Acting user's last name
    #[arg(long, global = true)]
    last_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild a site's page catalog from its HTML files
    Rebuild { site: String },
    /// List a site's pages, newest first
    List {
        site: String,
        /// Print the stored catalog as-is (no rebuild, no sorting)
        #[arg(long)]
        raw: bool,
    },
    /// Show the catalog entry of one page
    Show { site: String, url: String },
    /// Create a page from the site template or a content file
    Add {
        site: String,
        /// Requested URL; a numeric suffix is added if taken
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long, default_value = "")]
        callout: String,
        /// Template name (defaults to the site's default_template)
        #[arg(long, default_value = "")]
        template: String,
        /// HTML file to use instead of the template
        #[arg(long)]
        content: Option<PathBuf>,
    },
    /// Apply content changes from a JSON file: [{"selector": "...", "html": "..."}]
    Edit {
        site: String,
        url: String,
        changes: PathBuf,
    },
    /// Replace a page's title, description, and other display metadata
    Settings {
        site: String,
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long, default_value = "")]
        callout: String,
        #[arg(long, default_value = "")]
        language: String,
        #[arg(long, default_value = "")]
        direction: String,
    },
    /// Delete a page and rebuild the catalog
    Remove { site: String, url: String },
    /// Write the AMP copy of a page (requires the amp setting)
    Amp { site: String, url: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let open = |id: &str| -> Result<(Site, User), Box<dyn std::error::Error>> {
        let (site, config) = Site::open(&cli.root, id)?;
        if !site.root.is_dir() {
            return Err(format!("site directory not found: {}", site.root.display()).into());
        }
        init_thread_pool(&config.processing);
        let mut user = User::from(&config.user);
        if let Some(email) = &cli.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &cli.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &cli.last_name {
            user.last_name = last_name.clone();
        }
        Ok((site, user))
    };

    match &cli.command {
        Command::Rebuild { site } => {
            let (site, user) = open(site)?;
            let pages = catalog::refresh(&site, &user)?;
            output::print_rebuild_summary(&site.id, &pages);
        }
        Command::List { site, raw } => {
            let pages = if *raw {
                catalog::list_all_by_site(&cli.root, site)
            } else {
                let (site, user) = open(site)?;
                catalog::list_all(&site, &user)?
            };
            output::print_page_list(&pages);
        }
        Command::Show { site, url } => {
            let (site, _) = open(site)?;
            match catalog::get_by_url(&site, url) {
                Some(page) => output::print_page_detail(&page),
                None => return Err(format!("page not found: {url}").into()),
            }
        }
        Command::Add {
            site,
            url,
            title,
            description,
            keywords,
            callout,
            template,
            content,
        } => {
            let (site, user) = open(site)?;
            let content = content.as_ref().map(std::fs::read_to_string).transpose()?;
            let draft = Page {
                keywords: keywords.clone(),
                callout: callout.clone(),
                template: template.clone(),
                ..Page::draft(url, title, description)
            };
            let page = pages::add(&draft, &site, &user, content.as_deref())?;
            output::print_created(url, &page);
        }
        Command::Edit { site, url, changes } => {
            let (site, user) = open(site)?;
            let changes: Vec<Change> = serde_json::from_str(&std::fs::read_to_string(changes)?)?;
            if !pages::edit(url, &changes, &site, &user)? {
                return Err(format!("page not found: {url}").into());
            }
            println!("Edited {url}");
        }
        Command::Settings {
            site,
            url,
            title,
            description,
            keywords,
            callout,
            language,
            direction,
        } => {
            let (site, user) = open(site)?;
            let settings = PageSettings {
                title: title.clone(),
                description: description.clone(),
                keywords: keywords.clone(),
                callout: callout.clone(),
                language: language.clone(),
                direction: direction.clone(),
            };
            if !pages::edit_settings(url, &settings, &site, &user)? {
                return Err(format!("page not found: {url}").into());
            }
            println!("Updated {url}");
        }
        Command::Remove { site, url } => {
            let (site, user) = open(site)?;
            let pages = pages::remove(url, &site, &user)?;
            output::print_rebuild_summary(&site.id, &pages);
        }
        Command::Amp { site, url } => {
            let (site, _) = open(site)?;
            let page = catalog::get_by_url(&site, url)
                .ok_or_else(|| format!("page not found: {url}"))?;
            if pages::amplify(&page, &site, &BasicAmpConverter)? {
                println!("Wrote {}", site.amp_file(&page.url).display());
            } else {
                println!("No AMP copy written for {url} (amp disabled or no main region)");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
