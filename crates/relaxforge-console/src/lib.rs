//! Colorful console output for relaxation sessions.
//!
//! Provides a custom `tracing` layer that renders the engine's structured
//! events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Session start/end
//! - **DEBUG**: One line per subgradient iteration, dualized constraints
//! - **TRACE**: Individual multiplier updates
//!
//! Warnings (failed relaxations) are always shown. Set `RUST_LOG` to
//! override the default `relaxforge_solver=info` filter, e.g.
//! `RUST_LOG=relaxforge_solver=debug`.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SESSION_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_FILTER: &str = "relaxforge_solver=info,relaxforge_microlp=warn";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and installs the tracing subscriber.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(LrConsoleLayer)
            .try_init();
    });
}

fn mark_session_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SESSION_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SESSION_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 ____      _              _____
|  _ \ ___| | __ ___  __ |  ___|__  _ __ __ _  ___
| |_) / _ \ |/ _` \ \/ / | |_ / _ \| '__/ _` |/ _ \
|  _ <  __/ | (_| |>  <  |  _| (_) | | | (_| |  __/
|_| \_\___|_|\__,_/_/\_\ |_|  \___/|_|  \__, |\___|
                                        |___/
"#;

    let version_line = format!(
        "              v{} - Lagrangian Relaxation Engine\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats relaxation events with colors.
pub struct LrConsoleLayer;

impl<S: Subscriber> Layer<S> for LrConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("relaxforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    status: Option<String>,
    reason: Option<String>,
    sense: Option<String>,
    constraint_text: Option<String>,
    error: Option<String>,
    dualized: Option<u64>,
    max_iterations: Option<u64>,
    update_period: Option<u64>,
    iteration: Option<u64>,
    iterations: Option<u64>,
    duration_ms: Option<u64>,
    penalty_var: Option<u64>,
    constraint: Option<u64>,
    epsilon: Option<f64>,
    objective: Option<f64>,
    step_size: Option<f64>,
    max_penalty: Option<f64>,
    penalty: Option<f64>,
    before: Option<f64>,
    after: Option<f64>,
    feasible: Option<bool>,
    slackness: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "status" => self.status = Some(s),
            "reason" => self.reason = Some(s),
            "sense" => self.sense = Some(s),
            "constraint" => self.constraint_text = Some(s),
            "error" => self.error = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "dualized" => self.dualized = Some(value),
            "max_iterations" => self.max_iterations = Some(value),
            "update_period" => self.update_period = Some(value),
            "iteration" => self.iteration = Some(value),
            "iterations" => self.iterations = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "penalty" => self.penalty_var = Some(value),
            "constraint" => self.constraint = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "epsilon" => self.epsilon = Some(value),
            "objective" => self.objective = Some(value),
            "step_size" => self.step_size = Some(value),
            "max_penalty" => self.max_penalty = Some(value),
            "penalty" => self.penalty = Some(value),
            "before" => self.before = Some(value),
            "after" => self.after = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "feasible" => self.feasible = Some(value),
            "slackness" => self.slackness = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            "reason" => self.reason = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "session_start" => format_session_start(v),
        "session_end" => format_session_end(v),
        "iteration" => format_iteration(v),
        "dualize" => format_dualize(v),
        "multiplier_update" if level == Level::TRACE => format_multiplier_update(v),
        "relaxation_infeasible" | "relaxation_unbounded" | "restore_failed" => {
            format_warning(v)
        }
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_session_start(v: &EventVisitor) -> String {
    mark_session_start();
    let dualized = v.dualized.unwrap_or(0);
    let max_iterations = v.max_iterations.unwrap_or(0);
    let update_period = v.update_period.unwrap_or(0);

    let mut output = format!(
        "{} {} Relaxing │ {} dualized │ {} iterations max │ step every {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        dualized.to_formatted_string(&Locale::en).bright_yellow(),
        max_iterations
            .to_formatted_string(&Locale::en)
            .bright_yellow(),
        update_period.to_formatted_string(&Locale::en).bright_yellow(),
    );

    if let Some(epsilon) = v.epsilon {
        output.push_str(&format!(" │ ε {}", format!("{:e}", epsilon).bright_magenta()));
    }

    output
}

fn format_session_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("unknown");
    let iterations = v.iterations.unwrap_or(0);
    let converged = status == "converged";

    let status_colored = if converged {
        "CONVERGED".bright_green().bold().to_string()
    } else {
        "EXHAUSTED".bright_yellow().bold().to_string()
    };

    let mut output = format!(
        "{} {} Relaxation complete │ {} iterations │ {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        iterations.to_formatted_string(&Locale::en).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        status_colored,
    );

    output.push_str("\n\n");
    output.push_str(&box_line('╔', '╗'));
    output.push('\n');

    let headline = end_headline(v);
    let total_pad = BOX_WIDTH.saturating_sub(headline.len());
    let left_pad = total_pad / 2;
    let headline_colored = match v.reason.as_deref() {
        _ if converged => headline.bright_green().bold().to_string(),
        Some("relaxation_infeasible" | "relaxation_unbounded" | "error") => {
            headline.bright_red().bold().to_string()
        }
        _ => headline.bright_yellow().bold().to_string(),
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        headline_colored,
        " ".repeat(total_pad - left_pad),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&box_line('╠', '╣'));
    output.push('\n');
    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Final Objective:",
        format_number(v.objective.unwrap_or(f64::NAN)),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&box_line('╚', '╝'));
    output.push('\n');

    output
}

/// Summary box headline for a `session_end` event.
fn end_headline(v: &EventVisitor) -> &'static str {
    match v.reason.as_deref() {
        Some("converged") => "PRIMAL FEASIBLE AND COMPLEMENTARY SLACK",
        Some("iteration_limit") => "ITERATION LIMIT REACHED",
        Some("relaxation_infeasible") => "RELAXATION INFEASIBLE",
        Some("relaxation_unbounded") => "RELAXATION UNBOUNDED",
        Some("dropped") => "STOPPED BEFORE TERMINATION",
        Some("error") => "SOLVER ERROR",
        _ if v.status.as_deref() == Some("converged") => {
            "PRIMAL FEASIBLE AND COMPLEMENTARY SLACK"
        }
        _ => "SESSION ENDED",
    }
}

const BOX_WIDTH: usize = 58;

fn box_line(left: char, right: char) -> String {
    format!("{}{}{}", left, "═".repeat(BOX_WIDTH), right)
        .bright_cyan()
        .to_string()
}

fn format_iteration(v: &EventVisitor) -> String {
    let iteration = v.iteration.unwrap_or(0);
    let feasible = flag(v.feasible.unwrap_or(false), "feasible", "infeasible");
    let slack = flag(v.slackness.unwrap_or(false), "slack", "not slack");

    format!(
        "{} {} Iteration {:>8} │ obj {:>14} │ step {:>10} │ max |p| {:>10} │ {} │ {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        iteration.to_formatted_string(&Locale::en).white(),
        format_number(v.objective.unwrap_or(f64::NAN)).bright_magenta(),
        format_number(v.step_size.unwrap_or(0.0)),
        format_number(v.max_penalty.unwrap_or(0.0)),
        feasible,
        slack,
    )
}

fn format_dualize(v: &EventVisitor) -> String {
    format!(
        "{} {} Dualized {} │ penalty x{} {}",
        format_elapsed(),
        "↳".bright_blue(),
        v.constraint_text.as_deref().unwrap_or("?").white().bold(),
        v.penalty_var.unwrap_or(0),
        v.sense.as_deref().unwrap_or("").bright_black(),
    )
}

fn format_multiplier_update(v: &EventVisitor) -> String {
    format!(
        "{}   u[{}] {} → {} (penalty {})",
        format_elapsed(),
        v.constraint.unwrap_or(0),
        format_number(v.before.unwrap_or(0.0)).bright_black(),
        format_number(v.after.unwrap_or(0.0)).white(),
        format_number(v.penalty.unwrap_or(0.0)).bright_black(),
    )
}

fn format_warning(v: &EventVisitor) -> String {
    let event = v.event.as_deref().unwrap_or("");
    let detail = match (v.iteration, v.error.as_deref()) {
        (Some(iteration), _) => format!("at iteration {}", iteration),
        (None, Some(error)) => error.to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{} {} {} {}",
        format_elapsed(),
        "!".bright_red().bold(),
        event.replace('_', " ").bright_red(),
        detail
    )
}

fn flag(value: bool, yes: &str, no: &str) -> String {
    if value {
        yes.bright_green().to_string()
    } else {
        no.bright_red().to_string()
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let whole = value as i64;
        return whole.to_formatted_string(&Locale::en);
    }
    if value.abs() >= 1e-3 && value.abs() < 1e6 {
        format!("{:.4}", value)
    } else {
        format!("{:.3e}", value)
    }
}
