use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use salesdash::format::{format_currency, format_percentage, format_ratio};
use salesdash::{DashboardFilters, Quarter, SalesDash, ScenarioPreset};

#[derive(Parser)]
#[command(name = "salesdash", about = "Sales management dashboard metrics")]
struct Cli {
    /// Snapshot directory or dataset file (default: ~/.salesdash/data)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Metrics policy file (default: ~/.salesdash/policy.json if present)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Reference date for "now"-relative windows (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Quarter of the reference year: Q1, Q2, Q3, Q4
    #[arg(long)]
    quarter: Option<String>,
    /// Segment: all, seed, series_a, series_b_plus
    #[arg(long)]
    segment: Option<String>,
    /// Region: all, emea, na, apac
    #[arg(long)]
    region: Option<String>,
    /// Free-text search over account, owner and next step
    #[arg(short = 'q', long = "search")]
    search: Option<String>,
}

impl FilterArgs {
    fn to_filters(&self) -> salesdash::Result<DashboardFilters> {
        let pairs = [
            ("quarter", &self.quarter),
            ("segment", &self.segment),
            ("region", &self.region),
            ("q", &self.search),
        ];
        salesdash::parse_filters(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (key, v))),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Executive overview with manager questions and actions
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Account list, weakest health first
    Accounts {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detail for one account
    Account {
        /// Account id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Funnel, scenario defaults and deal desk
    Pipeline {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recalculate the forecast under stage probability overrides
    Scenario {
        /// Quarter: Q1, Q2, Q3, Q4
        #[arg(long, default_value = "Q1")]
        quarter: Quarter,
        /// Stage override as STAGE=PCT (repeatable)
        #[arg(long = "override", value_name = "STAGE=PCT")]
        overrides: Vec<String>,
        /// Shift stage defaults first: conservative, current, aggressive
        #[arg(long)]
        preset: Option<ScenarioPreset>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-AE scorecards
    Team {
        /// Quarter: Q1, Q2, Q3, Q4
        #[arg(long)]
        quarter: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect the metrics policy
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Print the effective policy as JSON
    Show,
    /// Check the policy file and report problems
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Commands::Policy { action } = &cli.command {
        let policy = salesdash::source::load_policy(cli.policy.as_deref()).await?;
        match action {
            PolicyAction::Show => println!("{}", serde_json::to_string_pretty(&policy)?),
            PolicyAction::Validate => println!("Policy OK"),
        }
        return Ok(());
    }

    let data = match cli.data {
        Some(path) => path,
        None => salesdash::source::default_data_dir()?,
    };
    let dash = SalesDash::open(&data, cli.policy.as_deref()).await?;
    let today = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    log::debug!("Reference date {today}");

    match cli.command {
        Commands::Dashboard { filters, json } => {
            let view = dash.dashboard(&filters.to_filters()?, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_dashboard(&view);
            }
        }
        Commands::Accounts { filters, json } => {
            let rows = dash.accounts(&filters.to_filters()?, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_accounts(&rows);
            }
        }
        Commands::Account { id, json } => {
            let detail = dash.account(&id, today)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_account(&detail);
            }
        }
        Commands::Pipeline { filters, json } => {
            let view = dash.pipeline(&filters.to_filters()?, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_pipeline(&view);
            }
        }
        Commands::Scenario {
            quarter,
            overrides,
            preset,
            json,
        } => {
            let overrides = salesdash::parse_stage_overrides(&overrides)?;
            let result = dash.scenario(quarter, &overrides, preset, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_scenario(&result);
            }
        }
        Commands::Team { quarter, json } => {
            let filters = FilterArgs {
                quarter,
                ..Default::default()
            };
            let team = dash.team(&filters.to_filters()?, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&team)?);
            } else {
                print_team(&team);
            }
        }
        Commands::Policy { .. } => {}
    }
    Ok(())
}

fn print_dashboard(view: &salesdash::DashboardView) {
    let snap = &view.executive_snapshot;
    println!("Dashboard: {}", view.quarter_key);
    println!("  NRR:            {:.1}% ({:+.1}%)", snap.nrr.value, snap.nrr.delta);
    println!(
        "  Expansion ARR:  {} ({:+.1}%)",
        format_currency(snap.expansion_arr.value),
        snap.expansion_arr.delta
    );
    println!(
        "  Renewal ARR:    {} ({:+.1}%)",
        format_currency(snap.renewal_arr.value),
        snap.renewal_arr.delta
    );
    println!(
        "  Coverage:       {} ({:+.1}%)",
        format_ratio(snap.pipeline_coverage.value),
        snap.pipeline_coverage.delta
    );
    let fvt = &snap.forecast_vs_target;
    println!(
        "  Forecast:       commit {} | best {} | upside {} | target {}",
        format_currency(fvt.commit),
        format_currency(fvt.best_case),
        format_currency(fvt.upside),
        format_currency(fvt.target)
    );
    println!(
        "  Forecast error: {}",
        format_percentage(snap.forecast_accuracy.average_error, 1)
    );

    let health = &view.customer_health;
    println!();
    println!(
        "Customer health: {} at risk, {} ARR at risk",
        health.at_risk_count,
        format_currency(health.arr_at_risk)
    );
    for row in health.rows.iter().take(10) {
        println!(
            "  {:>3}  {:<28} {:<16} {:>12}  {}",
            row.health_score,
            row.account,
            row.owner,
            format_currency(row.arr),
            row.renewal_date
        );
    }

    println!();
    println!("Manager questions:");
    for q in &view.manager_questions {
        println!("  [{:?}] {}", q.status, q.question);
        println!("      {}", q.evidence);
    }

    if !view.team_performance.coaching_flags.is_empty() {
        println!();
        println!("Coaching flags:");
        for flag in &view.team_performance.coaching_flags {
            println!("  [{:?}] {}: {}", flag.severity, flag.ae_name, flag.detail);
        }
    }

    println!();
    println!("Manager actions:");
    for action in &view.manager_actions {
        println!(
            "  {}  [{:?}/{:?}] {} ({})",
            action.due_date, action.impact, action.status, action.title, action.owner
        );
    }
}

fn print_accounts(rows: &[salesdash::AccountRow]) {
    if rows.is_empty() {
        println!("No accounts match the filters.");
        return;
    }
    for row in rows {
        println!(
            "{:<10} {:<28} {:>5.0} {:>12} {:>12}  {}  plan {}%  {:?}",
            row.id,
            row.name,
            row.health_score,
            format_currency(row.arr),
            format_currency(row.open_pipeline),
            row.renewal_date,
            row.account_plan_completeness,
            row.qbr_status
        );
    }
}

fn print_account(detail: &salesdash::AccountDetail) {
    println!("{} ({})", detail.name, detail.id);
    println!("  Owner:    {}", detail.owner);
    println!("  Region:   {}", detail.region);
    println!("  ARR:      {}", format_currency(detail.arr));
    println!("  Renewal:  {}", detail.renewal_date);
    println!(
        "  Health:   {:.0} ({:?})",
        detail.health.weighted_score, detail.health_band
    );
    for row in &detail.health_rows {
        println!("    {:<24} {:>4}  {:.0}", row.metric, row.weight, row.value);
    }
    println!("  Plan:     {}% complete", detail.plan_completeness);
    if !detail.risks.is_empty() {
        println!("  Risks:");
        for risk in &detail.risks {
            println!("    {}  {:?} {} ({})", risk.date, risk.severity, risk.id, risk.status);
        }
    }
    if !detail.next_actions.is_empty() {
        println!("  Next actions:");
        for action in &detail.next_actions {
            println!(
                "    {}  {:<12} {:>12}  {}",
                action.close_date,
                action.stage.label(),
                format_currency(action.amount),
                action.next_step
            );
        }
    }
}

fn print_pipeline(view: &salesdash::PipelineView) {
    println!("Pipeline: {}", view.quarter_key);
    println!("  Funnel:");
    for row in &view.funnel {
        println!("    {:<12} {}", row.stage, row.count);
    }
    println!(
        "  Base forecast: commit {} | best {} | upside {}",
        format_currency(view.scenario_base.commit),
        format_currency(view.scenario_base.best_case),
        format_currency(view.scenario_base.upside)
    );
    println!("  Stage defaults:");
    for (stage, pct) in &view.scenario_defaults {
        println!("    {stage:<12} {pct:.0}%");
    }
    if !view.deal_desk.is_empty() {
        println!("  Deal desk:");
        for row in &view.deal_desk {
            println!(
                "    {:<24} {:>12} {:>7}  {:<18} {:?}",
                row.deal,
                format_currency(row.amount),
                format_percentage(row.requested_discount, 1),
                row.guardrail,
                row.approval_status
            );
        }
    }
}

fn print_scenario(result: &salesdash::ScenarioResult) {
    println!("Commit:    {}", format_currency(result.commit));
    println!("Best case: {}", format_currency(result.best_case));
    println!("Upside:    {}", format_currency(result.upside));
    for row in &result.by_stage {
        println!(
            "  {:<12} commit {:>12}  best {:>12}  pipeline {:>12}",
            row.stage.label(),
            format_currency(row.commit),
            format_currency(row.best_case),
            format_currency(row.pipeline)
        );
    }
}

fn print_team(team: &[salesdash::AePerformance]) {
    for ae in team {
        println!("{} ({})", ae.name, ae.region);
        println!("  Coverage:    {}", format_ratio(ae.pipeline_coverage));
        println!("  Win rate:    {:.1}%", ae.win_rate);
        println!("  Discount:    {}", format_percentage(ae.avg_discount, 1));
        println!("  Touchpoints: {}", ae.renewal_touchpoints);
        println!("  Working:     {}", ae.talking_points.working);
        println!("  Stuck:       {}", ae.talking_points.stuck);
        println!("  Next week:   {}", ae.talking_points.next_week);
    }
}
