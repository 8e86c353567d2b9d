mod runtime;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use roulette_core::achievements::{in_category, AchievementCategory};
use roulette_core::session::CountdownView;
use roulette_core::*;
use runtime::{IdleSource, InputEvent, InputSource, Runner, StdinSource};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "roulette")]
#[command(about = "Workout roulette: spin for a random exercise and amount", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the spin delay in milliseconds
    #[arg(long, global = true)]
    spin_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a spin session (default)
    Spin {
        /// Only spin exercises with this tag
        #[arg(long)]
        tag: Option<String>,

        /// Never spin exercises with this tag (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Seed the random source for reproducible spins
        #[arg(long)]
        seed: Option<u64>,

        /// Complete this many selections unattended, then exit
        #[arg(long)]
        auto: Option<usize>,
    },

    /// Add an exercise to the catalog
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        tag: String,

        /// nouveau, primaire, facile, moyen, difficile or extreme
        #[arg(long, default_value = "moyen")]
        difficulty: Difficulty,

        /// reps or time
        #[arg(long, default_value = "reps")]
        measure: MeasureType,
    },

    /// List the catalog
    List,

    /// Delete an exercise by id
    Delete { id: String },

    /// List the distinct tags in the catalog
    Tags,
}

struct SpinOptions {
    tag: Option<String>,
    exclude: Vec<String>,
    seed: Option<u64>,
    auto: Option<usize>,
}

fn main() -> Result<()> {
    // Initialize logging (stderr, quiet by default so it doesn't clutter the session)
    roulette_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    if let Some(ms) = cli.spin_delay_ms {
        config.session.spin_delay_ms = ms;
    }

    tracing::debug!(
        "Data dir {:?}, spin delay {}ms",
        config.data.data_dir,
        config.session.spin_delay_ms
    );
    let store = JsonFileStore::in_dir(&config.data.data_dir);

    match cli.command {
        Some(Commands::Add {
            name,
            tag,
            difficulty,
            measure,
        }) => cmd_add(store, &config, NewExercise {
            name,
            tag,
            difficulty,
            measure_type: measure,
        }),
        Some(Commands::List) => cmd_list(store, &config),
        Some(Commands::Delete { id }) => cmd_delete(store, &config, &id),
        Some(Commands::Tags) => cmd_tags(store, &config),
        Some(Commands::Spin {
            tag,
            exclude,
            seed,
            auto,
        }) => cmd_spin(store, &config, SpinOptions {
            tag,
            exclude,
            seed,
            auto,
        }),
        None => cmd_spin(store, &config, SpinOptions {
            tag: None,
            exclude: Vec::new(),
            seed: None,
            auto: None,
        }),
    }
}

fn cmd_add(store: JsonFileStore, config: &Config, new: NewExercise) -> Result<()> {
    let mut app = App::open(store, config)?;
    let exercise = app.add_exercise(new)?;
    println!("✓ Added {} [{}]", exercise.name, exercise.tag);
    println!("  id: {}", exercise.id);
    Ok(())
}

fn cmd_list(store: JsonFileStore, config: &Config) -> Result<()> {
    let app = App::open(store, config)?;
    let catalog = app.session().catalog();

    if catalog.is_empty() {
        println!("No exercises yet. Add one with `roulette add --name <name> --tag <tag>`.");
        return Ok(());
    }

    for exercise in catalog {
        let range = amount_range(exercise.measure_type, exercise.difficulty);
        println!(
            "{}  {:<24} {:<12} {:<10} {}-{} {}",
            exercise.id,
            exercise.name,
            exercise.tag,
            exercise.difficulty,
            range.min,
            range.max,
            exercise.measure_type.unit()
        );
    }
    Ok(())
}

fn cmd_delete(store: JsonFileStore, config: &Config, id: &str) -> Result<()> {
    let mut app = App::open(store, config)?;
    let removed = app.delete_exercise(id)?;
    println!("✓ Deleted {}", removed.name);
    Ok(())
}

fn cmd_tags(store: JsonFileStore, config: &Config) -> Result<()> {
    let app = App::open(store, config)?;
    for tag in app.session().catalog().tags() {
        println!("{}", tag);
    }
    Ok(())
}

fn cmd_spin(store: JsonFileStore, config: &Config, opts: SpinOptions) -> Result<()> {
    let mut app = App::open(store, config)?;
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let now = Instant::now();
    if opts.tag.is_some() {
        app.dispatch(Intent::SetIncludeTag(opts.tag), now);
    }
    for tag in opts.exclude {
        app.dispatch(Intent::ToggleExcludeTag(tag), now);
    }

    let tick = config.session.countdown_tick();
    match opts.auto {
        Some(count) => run_session(&mut app, &mut rng, Runner::new(IdleSource, tick), Some(count)),
        None => {
            print_help();
            run_session(&mut app, &mut rng, Runner::new(StdinSource::default(), tick), None)
        }
    }
}

enum Command {
    Intent(Intent),
    ShowLog,
    ShowAchievements(Option<AchievementCategory>),
    ShowTags,
    Help,
    Quit,
    Invalid(String),
}

fn run_session<I: InputSource>(
    app: &mut App<JsonFileStore>,
    rng: &mut StdRng,
    runner: Runner<I>,
    auto: Option<usize>,
) -> Result<()> {
    let mut completed = 0usize;
    if let Some(target) = auto {
        tracing::info!("Unattended session: {} completions", target);
    }

    let events = app.dispatch(Intent::Spin, Instant::now());
    render_events(&events, &mut completed);

    loop {
        let mut events = Vec::new();

        match runner.step(app.next_deadline()) {
            Some(InputEvent::Line(line)) => match parse_command(&line) {
                Command::Intent(intent) => events.extend(app.dispatch(intent, Instant::now())),
                Command::ShowLog => print_log(&app.snapshot()),
                Command::ShowAchievements(category) => {
                    print_achievements(&app.snapshot(), category)
                }
                Command::ShowTags => println!("Tags: {}", app.session().catalog().tags().join(", ")),
                Command::Help => print_help(),
                Command::Quit => break,
                Command::Invalid(msg) => println!("? {}", msg),
            },
            Some(InputEvent::Closed) => break,
            None => {}
        }

        events.extend(app.advance(Instant::now(), rng));
        render_events(&events, &mut completed);

        if let Some(target) = auto {
            if completed >= target {
                break;
            }
            match app.snapshot().phase {
                Phase::Presenting => {
                    let events = app.dispatch(Intent::Complete, Instant::now());
                    render_events(&events, &mut completed);
                }
                // nothing left to spin
                Phase::Idle => break,
                Phase::Spinning => {}
            }
            if completed >= target {
                break;
            }
        }
    }

    print_log(&app.snapshot());
    Ok(())
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "" | "d" | "done" => Command::Intent(Intent::Complete),
        "s" | "skip" => Command::Intent(Intent::Skip),
        "n" | "spin" => Command::Intent(Intent::Spin),
        "c" | "clear" => Command::Intent(Intent::ClearLog),
        "p" | "pause" => Command::Intent(Intent::PauseCountdown),
        "r" | "resume" => Command::Intent(Intent::ResumeCountdown),
        "i" | "include" => Command::Intent(Intent::SetIncludeTag(
            Some(rest.to_string()).filter(|t| !t.is_empty()),
        )),
        "x" | "exclude" if !rest.is_empty() => {
            Command::Intent(Intent::ToggleExcludeTag(rest.to_string()))
        }
        "a" | "add" => match parse_new_exercise(rest) {
            Ok(new) => Command::Intent(Intent::AddExercise(new)),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "del" | "delete" if !rest.is_empty() => {
            Command::Intent(Intent::DeleteExercise(rest.to_string()))
        }
        "l" | "log" => Command::ShowLog,
        "ach" | "achievements" if rest.is_empty() => Command::ShowAchievements(None),
        "ach" | "achievements" => match rest.parse() {
            Ok(category) => Command::ShowAchievements(Some(category)),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "t" | "tags" => Command::ShowTags,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Invalid(format!("Unknown command '{}' (h for help)", line)),
    }
}

/// `name|tag[|difficulty[|measure]]`
fn parse_new_exercise(input: &str) -> Result<NewExercise> {
    let parts: Vec<&str> = input.split('|').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(Error::Validation(
            "usage: a name|tag[|difficulty[|reps|time]]".into(),
        ));
    }

    let difficulty = match parts.get(2) {
        Some(d) if !d.is_empty() => d.parse()?,
        _ => Difficulty::default(),
    };
    let measure_type = match parts.get(3) {
        Some(m) if !m.is_empty() => m.parse()?,
        _ => MeasureType::default(),
    };

    Ok(NewExercise {
        name: parts[0].to_string(),
        tag: parts[1].to_string(),
        difficulty,
        measure_type,
    })
}

fn render_events(events: &[SessionEvent], completed: &mut usize) {
    for event in events {
        match event {
            SessionEvent::Spin(SpinOutcome::Started) => println!("\n🎡 Spinning..."),
            SessionEvent::Spin(SpinOutcome::AlreadySpinning) => {}
            SessionEvent::Spin(SpinOutcome::NoEligibleExercises) => println!(
                "\nNo exercise matches the current filters. Add exercises or change the tag filters."
            ),
            SessionEvent::Presented(selection) => display_selection(selection),
            SessionEvent::SpinAbandoned => {
                println!("\nThe filters changed while spinning and nothing is left to pick.")
            }
            SessionEvent::CountdownTick { remaining_secs } => {
                if *remaining_secs % 10 == 0 || *remaining_secs <= 3 {
                    println!("  ⏱ {}", format_seconds(*remaining_secs));
                }
            }
            SessionEvent::CountdownPaused => println!("  ⏸ Paused"),
            SessionEvent::CountdownResumed => println!("  ▶ Resumed"),
            SessionEvent::Completed {
                name,
                amount,
                measure_type,
                ..
            } => {
                *completed += 1;
                println!("✓ {} x{} {} logged", name, amount, measure_type.unit());
            }
            SessionEvent::Skipped { .. } => println!("↷ Skipped"),
            SessionEvent::LogCleared => println!("Session log cleared."),
            SessionEvent::FilterChanged { eligible } => {
                println!("Filters updated: {} eligible exercise(s)", eligible)
            }
            SessionEvent::AchievementUnlocked { title, .. } => {
                println!("🏆 Achievement unlocked: {}", title)
            }
            SessionEvent::ExerciseAdded(exercise) => {
                println!("✓ Added {} [{}] ({})", exercise.name, exercise.tag, exercise.id)
            }
            SessionEvent::ExerciseDeleted { id } => println!("✓ Deleted {}", id),
            SessionEvent::StorageFailed(msg) => {
                println!("! Could not save changes: {} (nothing was changed)", msg)
            }
            SessionEvent::Rejected(msg) => println!("! {}", msg),
        }
    }
}

fn display_selection(selection: &SelectionResult) {
    let exercise = &selection.exercise;
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", exercise.name.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    match exercise.measure_type {
        MeasureType::Reps => println!("  → {} reps", selection.amount),
        MeasureType::TimeSeconds => println!(
            "  → {} (countdown started)",
            format_seconds(selection.amount)
        ),
    }
    println!("  Tag: {}  ·  Difficulty: {}", exercise.tag, exercise.difficulty);
    println!();
}

fn print_log(snapshot: &Snapshot) {
    println!("\n── Session log ──");
    if snapshot.log.is_empty() {
        println!("  (empty)");
    }
    for entry in &snapshot.log {
        println!(
            "  {:<24} {:>5} {:<4} ({}x)",
            entry.name,
            entry.total_amount,
            entry.measure_type.unit(),
            entry.count
        );
    }

    let stats = &snapshot.stats;
    println!(
        "  Total: {} reps, {} of timed work, {} completions",
        stats.total_reps,
        format_seconds(stats.total_seconds.min(u64::from(u32::MAX)) as u32),
        stats.completions
    );

    for achievement in snapshot.achievements.iter().filter(|a| a.unlocked_at.is_some()) {
        println!("  {} {}", achievement.icon, achievement.title);
    }

    if let Some(CountdownView { remaining_secs, paused }) = snapshot.countdown {
        println!(
            "  Countdown: {}{}",
            format_seconds(remaining_secs),
            if paused { " (paused)" } else { "" }
        );
    }
}

fn print_achievements(snapshot: &Snapshot, category: Option<AchievementCategory>) {
    match category {
        Some(c) => println!("\n── Achievements: {} ──", c),
        None => println!("\n── Achievements ──"),
    }

    let shown = in_category(&snapshot.achievements, category);
    if shown.is_empty() {
        println!("  (none)");
    }
    for a in shown {
        println!(
            "  {} {:<24} {:>4}/{:<4} {}{}",
            a.icon,
            a.title,
            a.progress,
            a.requirement,
            a.description,
            if a.unlocked_at.is_some() { "  ✓" } else { "" }
        );
    }
}

fn format_seconds(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn print_help() {
    println!("─────────────────────────────────────────");
    println!("Enter / d     done (log it and spin again)");
    println!("s             skip");
    println!("n             spin now");
    println!("p / r         pause / resume the countdown");
    println!("i [tag]       only spin this tag (no tag: all)");
    println!("x <tag>       exclude / re-include a tag");
    println!("a name|tag|difficulty|reps|time   add an exercise");
    println!("del <id>      delete an exercise");
    println!("l             show the session log");
    println!("ach [category] achievements (reps, variety, time, streak, difficulty)");
    println!("t             list tags");
    println!("c             clear the session log");
    println!("q             quit");
    println!("─────────────────────────────────────────");
}
