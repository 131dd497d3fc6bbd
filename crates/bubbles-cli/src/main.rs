mod fetch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bubbles_core::{Idea, NewIdea, RankedLists, SourceKind, aggregate_with_report};
use bubbles_store::{Board, MAX_PAGE_SIZE};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use uuid::Uuid;

use crate::fetch::Refresher;

#[derive(Parser)]
#[command(name = "bubbles", about = "Crowd idea board with floating bubbles")]
struct Cli {
    /// Data directory (default: $BUBBLES_DATA_DIR or ~/.idea-bubbles)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new idea
    Submit {
        title: String,
        description: String,

        /// Your name, shown with the idea
        #[arg(long)]
        name: Option<String>,

        /// Lightning address for tips
        #[arg(long)]
        lightning: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Add one vote to an idea
    Vote { id: Uuid },

    /// Hide an idea from the board (or show it again)
    Hide {
        id: Uuid,

        /// Make the idea visible again
        #[arg(long)]
        show: bool,
    },

    /// List ideas by score, one page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the five ranked lists and the merged set as JSON
    Groups {
        /// Seed the random lists
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the bubble layout headless and print frames as JSON lines
    Simulate {
        /// Number of frames to advance
        #[arg(long, default_value_t = 60)]
        ticks: u32,

        /// Frame multiplier per tick
        #[arg(long, default_value_t = 1.0)]
        dt: f64,

        /// Seed for layout and random lists
        #[arg(long)]
        seed: Option<u64>,

        /// Print every Nth frame (0: only the last)
        #[arg(long, default_value_t = 0)]
        every: u32,

        /// Expand this bubble before the first tick
        #[arg(long)]
        expand: Option<Uuid>,

        /// Vote for this idea before the first tick
        #[arg(long)]
        vote: Option<Uuid>,

        /// Resume from a saved scene instead of fetching
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Save the scene after the last tick
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn open_board(cli: &Cli) -> Result<Board> {
    Board::open(cli.data_dir.as_deref()).context("failed to open idea board")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Submit {
            title,
            description,
            name,
            lightning,
            tags,
        } => {
            let new = NewIdea {
                title: title.clone(),
                description: description.clone(),
                submitter_name: name.clone(),
                lightning_address: lightning.clone(),
                tags: tags.clone(),
            };
            cmd_submit(&cli, &new)
        }
        Commands::Vote { id } => cmd_vote(&cli, *id),
        Commands::Hide { id, show } => cmd_hide(&cli, *id, !show),
        Commands::List { page, limit } => cmd_list(&cli, *page, *limit),
        Commands::Groups { seed } => cmd_groups(&cli, *seed).await,
        Commands::Simulate {
            ticks,
            dt,
            seed,
            every,
            expand,
            vote,
            resume,
            save,
        } => {
            let opts = SimulateOpts {
                ticks: *ticks,
                dt: *dt,
                seed: *seed,
                every: *every,
                expand: *expand,
                vote: *vote,
                resume: resume.as_deref(),
                save: save.as_deref(),
            };
            cmd_simulate(&cli, opts).await
        }
    }
}

fn cmd_submit(cli: &Cli, new: &NewIdea) -> Result<()> {
    let board = open_board(cli)?;
    let idea = board
        .store()
        .insert_idea(new)
        .context("failed to submit idea")?;
    println!("submitted {}", idea.id);
    Ok(())
}

fn cmd_vote(cli: &Cli, id: Uuid) -> Result<()> {
    let board = open_board(cli)?;
    let score = board
        .store()
        .increment_score(id)
        .context("failed to vote")?;
    println!("voted. score={score}");
    Ok(())
}

fn cmd_hide(cli: &Cli, id: Uuid, hidden: bool) -> Result<()> {
    let board = open_board(cli)?;
    board
        .store()
        .set_hidden(id, hidden)
        .context("failed to update visibility")?;
    println!("{} {id}", if hidden { "hidden" } else { "shown" });
    Ok(())
}

fn cmd_list(cli: &Cli, page: usize, limit: usize) -> Result<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        bail!("--limit must be between 1 and {MAX_PAGE_SIZE}");
    }
    let board = open_board(cli)?;
    let listing = board
        .store()
        .list_page(page, limit)
        .context("failed to list ideas")?;

    if listing.ideas.is_empty() {
        println!("(no ideas)");
    }
    for idea in &listing.ideas {
        println!("{:>4}  {}  {}", idea.score, idea.id, idea.title);
    }
    println!(
        "page {}/{} ({} ideas)",
        listing.current_page,
        listing.total_pages.max(1),
        listing.total_ideas
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupsView<'a> {
    newest: &'a [Idea],
    most_voted: &'a [Idea],
    oldest: &'a [Idea],
    random: &'a [Idea],
    random_voted: &'a [Idea],
    combined: &'a [Idea],
    failed: Vec<SourceKind>,
}

async fn fetch_lists(board: &Board, seed: Option<u64>) -> Result<RankedLists> {
    let refresher = Refresher::new(board.sources(seed), board.config().sources);
    refresher
        .refresh()
        .await
        .context("fetch superseded by a newer one")
}

async fn cmd_groups(cli: &Cli, seed: Option<u64>) -> Result<()> {
    let board = open_board(cli)?;
    let lists = fetch_lists(&board, seed).await?;
    let (set, report) = aggregate_with_report(&lists);
    tracing::info!(?report, "aggregated");

    let view = GroupsView {
        newest: lists.newest.ideas(),
        most_voted: lists.most_voted.ideas(),
        oldest: lists.oldest.ideas(),
        random: lists.random.ideas(),
        random_voted: lists.random_voted.ideas(),
        combined: set.ideas(),
        failed: SourceKind::ALL
            .into_iter()
            .filter(|k| lists.get(*k).is_failed())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&view).context("failed to serialize groups")?;
    println!("{json}");
    Ok(())
}

struct SimulateOpts<'a> {
    ticks: u32,
    dt: f64,
    seed: Option<u64>,
    every: u32,
    expand: Option<Uuid>,
    vote: Option<Uuid>,
    resume: Option<&'a Path>,
    save: Option<&'a Path>,
}

async fn cmd_simulate(cli: &Cli, opts: SimulateOpts<'_>) -> Result<()> {
    if !opts.dt.is_finite() || opts.dt < 0.0 {
        bail!("--dt must be a non-negative number");
    }
    let board = open_board(cli)?;
    let mut rng = match opts.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let mut scene = match opts.resume {
        Some(path) => board
            .import_scene_file(path)
            .with_context(|| format!("failed to resume from {}", path.display()))?,
        None => {
            let lists = fetch_lists(&board, opts.seed).await?;
            let (set, report) = aggregate_with_report(&lists);
            tracing::info!(?report, "aggregated");
            board.scene_from(&set, &mut rng)
        }
    };

    if let Some(id) = opts.vote {
        board
            .store()
            .increment_score(id)
            .context("failed to vote")?;
        if !scene.apply_score_increment(id) {
            tracing::debug!(%id, "voted idea is not on screen");
        }
    }
    if let Some(id) = opts.expand {
        scene.request_expand(id);
    }

    let mut frame = scene.frame();
    for n in 1..=opts.ticks {
        frame = scene.tick(opts.dt);
        if opts.every > 0 && n % opts.every == 0 {
            println!("{}", serde_json::to_string(&frame).context("failed to serialize frame")?);
        }
    }
    if opts.every == 0 || opts.ticks == 0 || opts.ticks % opts.every != 0 {
        println!("{}", serde_json::to_string(&frame).context("failed to serialize frame")?);
    }

    if let Some(path) = opts.save {
        board
            .export_scene_file(&scene, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
