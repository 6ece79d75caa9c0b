//! CLI entry point for the matchday statistics tool.
//!
//! Loads the configured season files once per invocation and answers one
//! question about them: summaries, splits, form, league tables, trends,
//! comparisons, tactical insights or the data-quality report.

mod infra;

use crate::infra::SeasonConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matchday_stats::analyzers::explorer::match_context;
use matchday_stats::analyzers::trend::{TrendMetric, cumulative_points, rolling_team_series};
use matchday_stats::analyzers::types::{ResultLine, StandingRow, TeamSeasonSummary};
use matchday_stats::analyzers::{
    calculate_league_position, compare_teams, get_form, get_home_away_split, get_season_summary,
};
use matchday_stats::cache::TableCache;
use matchday_stats::metrics::Insight;
use matchday_stats::metrics::attacking::{
    SetPieceMetrics, ShotOutcome, ShotQualityMetrics, shot_outcome_breakdown, tactical_insights,
};
use matchday_stats::metrics::possession::{
    PossessionBracketResult, PossessionEffectiveness, possession_insights, possession_vs_results,
};
use matchday_stats::output::{print_json, print_pretty, write_records};
use matchday_stats::{MatchTable, filter_by_season};
use serde::Serialize;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "matchday_stats")]
#[command(
    about = "Season statistics for football teams from per-match CSV files",
    long_about = None
)]
struct Cli {
    /// Season config file (defaults to $MATCHDAY_CONFIG, then seasons.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded seasons
    Seasons,
    /// List teams, optionally of a single season
    Teams {
        #[arg(short, long)]
        season: Option<String>,
    },
    /// Season summary of one team
    Summary {
        #[arg(short, long)]
        team: Option<String>,
        #[arg(short, long)]
        season: Option<String>,
    },
    /// Home and away summaries of one team
    Split {
        #[arg(short, long)]
        team: Option<String>,
        #[arg(short, long)]
        season: Option<String>,
    },
    /// Most recent results of one team
    Form {
        #[arg(short, long)]
        team: Option<String>,
        #[arg(short, long)]
        season: Option<String>,
        /// Number of matches
        #[arg(short = 'n', long, default_value_t = 5)]
        last: usize,
    },
    /// League table of a season
    Table {
        #[arg(short, long)]
        season: Option<String>,
        /// CSV file to export the table to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Match list of one team, or a single match in context
    Matches {
        #[arg(short, long)]
        team: Option<String>,
        #[arg(short, long)]
        season: Option<String>,
        /// Row index of a match to show with its opponent's figures
        #[arg(short, long)]
        index: Option<usize>,
        /// Matches shown on each side of --index
        #[arg(short, long, default_value_t = 2)]
        radius: usize,
        /// CSV file to export the match list to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rolling averages or cumulative points of one team
    Trend {
        #[arg(short, long)]
        team: Option<String>,
        #[arg(short, long)]
        season: Option<String>,
        /// goals, goals_conceded, xg or possession
        #[arg(short, long, default_value = "goals")]
        metric: TrendMetric,
        /// Rolling window (defaults to the configured rolling_window)
        #[arg(short, long)]
        window: Option<usize>,
        /// Show the running points total instead
        #[arg(long, default_value_t = false)]
        cumulative: bool,
    },
    /// Attacking, defensive and possession metrics of several teams
    Compare {
        #[arg(short, long)]
        season: Option<String>,
        /// Teams to compare
        #[arg(required = true, num_args = 1..)]
        teams: Vec<String>,
    },
    /// Tactical findings for a team measured against another
    Insights {
        #[arg(short, long)]
        team: Option<String>,
        /// Team to measure against
        #[arg(short, long)]
        against: String,
        #[arg(short, long)]
        season: Option<String>,
    },
    /// Data-quality report of the loaded files
    Quality {
        #[arg(short, long)]
        season: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/matchday_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("matchday_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config_path = SeasonConfig::locate(cli.config);
    let config = SeasonConfig::load(&config_path)?;
    info!(config = %config_path.display(), seasons = config.seasons.len(), "Config loaded");

    let cache = TableCache::new();
    let table = cache
        .get_or_load(&config.seasons)
        .context("loading season files")?;

    if !table.quality().is_clean() {
        warn!("Data-quality issues found; run `quality` for details");
    }

    let mut out = io::stdout().lock();
    let json = cli.json;

    match cli.command {
        Commands::Seasons => {
            let seasons: Vec<SeasonLine> = table
                .available_seasons()
                .iter()
                .map(|s| SeasonLine {
                    season: s.clone(),
                    rows: table.rows().iter().filter(|r| &r.season == s).count(),
                })
                .collect();
            emit(&mut out, json, &seasons, |out| {
                for s in &seasons {
                    writeln!(out, "{:<12} {:>5} rows", s.season, s.rows)?;
                }
                Ok(())
            })?;
        }
        Commands::Teams { season } => {
            let teams = match &season {
                Some(season) => table.season_teams(season)?,
                None => table.available_teams(),
            };
            emit(&mut out, json, &teams, |out| {
                for team in &teams {
                    writeln!(out, "{team}")?;
                }
                Ok(())
            })?;
        }
        Commands::Summary { team, season } => {
            let team = config.team(team)?;
            let season = config.season(season);
            let summary = get_season_summary(&table, &team, &season)?;
            print_pretty(&summary);
            emit(&mut out, json, &summary, |out| write_summary(out, &summary))?;
        }
        Commands::Split { team, season } => {
            let team = config.team(team)?;
            let season = config.season(season);
            let split = get_home_away_split(&table, &team, &season)?;
            emit(&mut out, json, &split, |out| {
                writeln!(out, "Home")?;
                write_summary(out, &split.home)?;
                writeln!(out, "\nAway")?;
                write_summary(out, &split.away)
            })?;
        }
        Commands::Form { team, season, last } => {
            let team = config.team(team)?;
            let season = config.season(season);
            let form = get_form(&table, &team, &season, last)?;
            emit(&mut out, json, &form, |out| {
                writeln!(
                    out,
                    "{} form ({}): {}  {}/{} pts",
                    form.team, form.season, form.form, form.points, form.max_points
                )?;
                for e in &form.entries {
                    writeln!(
                        out,
                        "{}  {} {:<4} {:<24} {}",
                        e.date,
                        e.outcome.letter(),
                        e.side,
                        e.opponent,
                        e.score
                    )?;
                }
                Ok(())
            })?;
        }
        Commands::Table { season, output } => {
            let season = config.season(season);
            let standing = calculate_league_position(&table, &season)?;
            if let Some(path) = output {
                write_records(&path, StandingRow::CSV_HEADER, &standing.rows)?;
            }
            emit(&mut out, json, &standing, |out| {
                writeln!(
                    out,
                    "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
                    "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
                )?;
                for r in &standing.rows {
                    writeln!(
                        out,
                        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
                        r.position,
                        r.team,
                        r.played,
                        r.won,
                        r.drawn,
                        r.lost,
                        r.goals_for,
                        r.goals_against,
                        r.goal_difference,
                        r.points
                    )?;
                }
                Ok(())
            })?;
        }
        Commands::Matches {
            team,
            season,
            index,
            radius,
            output,
        } => {
            let team = config.team(team)?;
            let season = config.season(season);

            if let Some(index) = index {
                let ctx = match_context(&table, &team, &season, index, radius)?;
                emit(&mut out, json, &ctx, |out| {
                    writeln!(out, "{}", ctx.focus.score)?;
                    for s in &ctx.head_to_head {
                        writeln!(
                            out,
                            "{:<22} {:>8} {:>8}",
                            s.stat,
                            fmt_opt(s.team),
                            fmt_opt(s.opponent)
                        )?;
                    }
                    writeln!(out)?;
                    for (i, line) in ctx.surrounding.iter().enumerate() {
                        let marker = if i == ctx.focus_position { ">" } else { " " };
                        write!(out, "{marker} ")?;
                        write_result_line(out, line)?;
                    }
                    Ok(())
                })?;
            } else {
                let lines: Vec<ResultLine> = table
                    .team_rows(&team, &season)?
                    .into_iter()
                    .map(ResultLine::from)
                    .collect();
                if let Some(path) = output {
                    write_records(&path, ResultLine::CSV_HEADER, &lines)?;
                }
                emit(&mut out, json, &lines, |out| {
                    for line in &lines {
                        write_result_line(out, line)?;
                    }
                    Ok(())
                })?;
            }
        }
        Commands::Trend {
            team,
            season,
            metric,
            window,
            cumulative,
        } => {
            let team = config.team(team)?;
            let season = config.season(season);

            if cumulative {
                let points = cumulative_points(&table, &team, &season)?;
                emit(&mut out, json, &points, |out| {
                    for p in &points {
                        writeln!(
                            out,
                            "{:>3}  {}  {} {:<24} {:>3}",
                            p.round.map(|r| r.to_string()).unwrap_or_default(),
                            p.date,
                            p.outcome.letter(),
                            p.opponent,
                            p.cumulative_points
                        )?;
                    }
                    Ok(())
                })?;
            } else {
                let window = window.unwrap_or(config.rolling_window);
                let series = rolling_team_series(&table, &team, &season, window, metric)?;
                emit(&mut out, json, &series, |out| {
                    writeln!(out, "{metric} ({window}-match rolling mean)")?;
                    for p in &series {
                        writeln!(
                            out,
                            "{}  {:<24} {:>6.2} {:>6.2}",
                            p.date, p.opponent, p.value, p.rolling
                        )?;
                    }
                    Ok(())
                })?;
            }
        }
        Commands::Compare { season, teams } => {
            let season = config.season(season);
            let names: Vec<&str> = teams.iter().map(String::as_str).collect();
            let comparison = compare_teams(&table, &names, &season)?;
            emit(&mut out, json, &comparison, |out| {
                for c in &comparison {
                    writeln!(out, "{}", c.team)?;
                    writeln!(
                        out,
                        "  goals/game {:.2}  xG/game {:.2}  conversion {:.1}%",
                        c.attacking.goals_per_game,
                        c.attacking.xg_per_game,
                        c.attacking.shot_conversion_pct
                    )?;
                    writeln!(
                        out,
                        "  conceded/game {:.2}  clean sheets {:.1}%  def. actions/game {:.1}",
                        c.defensive.goals_conceded_per_game,
                        c.defensive.clean_sheet_pct,
                        c.defensive.defensive_actions_per_game
                    )?;
                    writeln!(
                        out,
                        "  possession {}  passes/game {:.0}  pass accuracy {}",
                        fmt_opt(c.possession.avg_possession),
                        c.possession.passes_per_game,
                        fmt_opt(c.possession.pass_accuracy_pct)
                    )?;
                }
                Ok(())
            })?;
        }
        Commands::Insights {
            team,
            against,
            season,
        } => {
            let team = config.team(team)?;
            let season = config.season(season);
            let report = insights_report(&table, &team, &against, &season)?;
            emit(&mut out, json, &report, |out| {
                if report.insights.is_empty() {
                    writeln!(out, "No findings for {team} against {against}")?;
                }
                for i in &report.insights {
                    writeln!(out, "[{:?}] {}", i.severity, i.title)?;
                    writeln!(out, "  {}", i.finding)?;
                    writeln!(out, "  -> {}", i.action)?;
                }
                Ok(())
            })?;
        }
        Commands::Quality { season } => {
            let scoped: MatchTable;
            let quality = match &season {
                Some(season) => {
                    scoped = filter_by_season(&table, season)?;
                    scoped.quality()
                }
                None => table.quality(),
            };
            emit(&mut out, json, quality, |out| {
                writeln!(out, "rows read          {}", quality.rows_read)?;
                writeln!(out, "rows kept          {}", quality.rows_kept)?;
                writeln!(out, "rows excluded      {}", quality.excluded_rows.len())?;
                writeln!(out, "corrupt records    {}", quality.corrupt_records.len())?;
                writeln!(out, "points mismatches  {}", quality.points_mismatches.len())?;
                writeln!(out, "pair issues        {}", quality.pair_issues.len())?;
                writeln!(out, "cell warnings      {}", quality.cell_warnings.len())?;
                for (column, n) in quality.warnings_by_column() {
                    writeln!(out, "  {column:<28} {n}")?;
                }
                for row in &quality.excluded_rows {
                    writeln!(out, "excluded {}:{} {:?}", row.season, row.line, row.reason)?;
                }
                Ok(())
            })?;
        }
    }

    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SeasonLine {
    season: String,
    rows: usize,
}

/// Everything the `insights` command reports, for JSON output.
#[derive(Serialize)]
struct InsightsReport {
    team: String,
    against: String,
    season: String,
    set_pieces: SetPieceMetrics,
    shot_quality: ShotQualityMetrics,
    shot_outcomes: Vec<ShotOutcome>,
    possession_effectiveness: Option<PossessionEffectiveness>,
    possession_vs_results: Vec<PossessionBracketResult>,
    insights: Vec<Insight>,
}

fn insights_report(
    table: &MatchTable,
    team: &str,
    against: &str,
    season: &str,
) -> Result<InsightsReport> {
    let team_rows = table.team_rows(team, season)?;
    let other_rows = table.team_rows(against, season)?;

    let mut insights = tactical_insights(&team_rows, &other_rows, team, against);
    insights.extend(possession_insights(&team_rows, &other_rows, team, against));
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));

    Ok(InsightsReport {
        team: team.to_string(),
        against: against.to_string(),
        season: season.to_string(),
        set_pieces: SetPieceMetrics::from_rows(&team_rows),
        shot_quality: ShotQualityMetrics::from_rows(&team_rows),
        shot_outcomes: shot_outcome_breakdown(&team_rows),
        possession_effectiveness: PossessionEffectiveness::from_rows(&team_rows),
        possession_vs_results: possession_vs_results(&team_rows),
        insights,
    })
}

/// Writes `value` as JSON, or runs `text` to render it for people.
fn emit<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    json: bool,
    value: &T,
    text: impl FnOnce(&mut W) -> io::Result<()>,
) -> Result<()> {
    if json {
        print_json(out, value)
    } else {
        Ok(text(out)?)
    }
}

fn write_summary(out: &mut impl Write, s: &TeamSeasonSummary) -> io::Result<()> {
    writeln!(out, "{} {}", s.team, s.season)?;
    writeln!(
        out,
        "  played {}  W{} D{} L{}  {} pts ({:.2} per game)",
        s.matches_played, s.wins, s.draws, s.losses, s.points, s.points_per_game
    )?;
    writeln!(
        out,
        "  goals {}-{} (GD {:+})  clean sheets {}",
        s.goals_for, s.goals_against, s.goal_difference, s.clean_sheets
    )?;
    writeln!(
        out,
        "  xG {:.2} ({:+.2} vs goals)  shots/game {:.1}  possession {}",
        s.attacking.total_xg,
        s.attacking.xg_overperformance,
        s.attacking.shots_per_game,
        fmt_opt(s.possession.avg_possession)
    )
}

fn write_result_line(out: &mut impl Write, line: &ResultLine) -> io::Result<()> {
    writeln!(
        out,
        "[{:>4}] {}  {} {:<4} {:<24} {:<7} xG {:.2}",
        line.index, line.date, line.result, line.side, line.opponent, line.score, line.xg
    )
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}
