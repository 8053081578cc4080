use clap::{Parser, Subcommand};
use project_gallery::gallery::{GalleryReport, GalleryState};
use project_gallery::site::{self, ProbeSource};
use project_gallery::{config, logging, output};
use std::path::PathBuf;

/// Where to look for candidate images.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Pages or directories of pages (walked recursively for *.html)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory that root-relative image URLs (`/assets/...`) resolve against
    #[arg(long)]
    site_root: Option<PathBuf>,

    /// Probe the deployed site instead: URL of the directory holding the pages
    #[arg(long, conflicts_with = "site_root")]
    base_url: Option<String>,
}

impl SourceArgs {
    fn probe_source(&self) -> ProbeSource {
        match &self.base_url {
            Some(base_url) => ProbeSource::Http {
                base_url: base_url.clone(),
            },
            None => ProbeSource::Filesystem {
                site_root: self.site_root.clone(),
            },
        }
    }
}

#[derive(Parser)]
#[command(name = "project-gallery")]
#[command(about = "Populate portfolio page carousels with the screenshots that exist")]
#[command(long_about = "\
Populate portfolio page carousels with the screenshots that exist

Each page's project is its file name (trashscan.html → trashscan). Candidate
images come from the [projects] table in gallery.toml, or from a fallback
naming scheme when the project is not listed:

  assets/img/portfolio/
  ├── trashscan-imgs/
  │   ├── 6.jpg                # configured: trashscan = [\"6.jpg\", \"7.jpg\"]
  │   └── 7.jpg
  ├── glutaga-imgs/
  │   ├── 1.png                # fallback: 1..20, 01..20, screenshot1.., img1..
  │   └── screenshot2.jpg
  └── glutaga.png              # fallback: single root image

Candidates are probed (local files, or HTTP with --base-url), ordered by the
first number in the file name, and written into the page's
.screenshot-carousel .swiper-wrapper as slides.

Run 'project-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Gallery config file (stock defaults when missing)
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render galleries into pages, in place or under --out-dir
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Write pages here (keeping their relative paths) instead of in place
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Run the pipeline without writing and report what would be rendered
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match cli.command {
        Command::Render { source, out_dir } => {
            let config = config::load_config(&cli.config)?;
            let probe_source = source.probe_source();
            let pages = site::collect_pages(&source.paths)?;

            let mut reports = Vec::with_capacity(pages.len());
            let mut failed_pages = 0;
            for input in &pages {
                let outcome = site::render_page(input, &config, &probe_source).and_then(|result| {
                    let written = site::write_page(&result, out_dir.as_deref())?;
                    Ok((result, written))
                });
                match outcome {
                    Ok((result, written)) => {
                        output::print_report(&result.report, written.as_deref());
                        reports.push(result.report);
                    }
                    Err(e) => {
                        output::print_page_error(&input.relative, &e);
                        page_failed(input, &e);
                        failed_pages += 1;
                    }
                }
            }
            output::print_summary(&reports.iter().collect::<Vec<_>>(), failed_pages);
            fail_on_errors(&reports, failed_pages)?;
        }
        Command::Check { source, json } => {
            let config = config::load_config(&cli.config)?;
            let probe_source = source.probe_source();
            let pages = site::collect_pages(&source.paths)?;

            let mut reports = Vec::with_capacity(pages.len());
            let mut failed_pages = 0;
            for input in &pages {
                match site::render_page(input, &config, &probe_source) {
                    Ok(result) => {
                        if !json {
                            output::print_report(&result.report, None);
                        }
                        reports.push(result.report);
                    }
                    Err(e) => {
                        if !json {
                            output::print_page_error(&input.relative, &e);
                        }
                        page_failed(input, &e);
                        failed_pages += 1;
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                output::print_summary(&reports.iter().collect::<Vec<_>>(), failed_pages);
            }
            fail_on_errors(&reports, failed_pages)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log a page that could not be processed; the run carries on with the next one.
fn page_failed(input: &site::PageInput, error: &site::PageError) {
    tracing::error!(page = %input.path.display(), error = %error, "page failed");
}

fn fail_on_errors(reports: &[GalleryReport], failed_pages: usize) -> Result<(), String> {
    let failed = failed_pages
        + reports
            .iter()
            .filter(|r| matches!(r.state, GalleryState::Error { .. }))
            .count();
    if failed > 0 {
        return Err(format!("{failed} page(s) failed to load their gallery"));
    }
    Ok(())
}
