//! dna-runner: headless driver for the Customer DNA risk engine.
//!
//! Usage:
//!   dna-runner --data-dir ./data --customer "David"
//!   dna-runner --db model.db --seed 7
//!   dna-runner --ipc-mode < commands.jsonl

use anyhow::Result;
use customer_dna_core::{
    command::SessionCommand,
    config::RiskConfig,
    engine::{Assessment, RiskEngine},
    event::SessionEvent,
    profile::{CustomerProfile, ProfileRegistry},
    session::SessionActivity,
    store::ModelStore,
    types::Location,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    Select { customer: String },
    Command { command: SessionCommand },
    Evaluate,
    ResetModel,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let db = string_arg(&args, "--db");
    let customer = string_arg(&args, "--customer");

    let mut config = RiskConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in risk config");
        RiskConfig::default()
    });
    config.regressor.bootstrap_seed =
        parse_arg(&args, "--seed", config.regressor.bootstrap_seed);

    let registry = ProfileRegistry::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in profiles");
        ProfileRegistry::builtin()
    });

    if !ipc_mode {
        println!("Customer DNA - dna-runner");
        println!("  data_dir:  {data_dir}");
        println!("  db:        {}", db.unwrap_or("(none)"));
        println!("  seed:      {}", config.regressor.bootstrap_seed);
        println!("  profiles:  {}", registry.len());
        println!();
    }

    let mut engine = match db {
        Some(":memory:") => RiskEngine::with_store(config, ModelStore::in_memory()?)?,
        Some(path) => RiskEngine::with_store(config, ModelStore::open(path)?)?,
        None => RiskEngine::new(config)?,
    };

    if ipc_mode {
        return run_ipc_loop(&mut engine, &registry);
    }

    let selected: Vec<&CustomerProfile> = match customer {
        Some(needle) => {
            let needle = needle.to_lowercase();
            registry
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .collect()
        }
        None => registry.iter().collect(),
    };
    if selected.is_empty() {
        anyhow::bail!("No profile matches {:?}", customer.unwrap_or_default());
    }

    for profile in selected {
        run_scripted_session(&mut engine, profile)?;
    }

    println!("=== MODEL ===");
    println!("  buffered samples: {}", engine.regressor().buffer_len());
    println!("  samples seen:     {}", engine.regressor().samples_seen());
    println!("  trained:          {}", engine.regressor().is_trained());
    Ok(())
}

/// Walk one customer through a short escalating session, assessing after each step.
fn run_scripted_session(engine: &mut RiskEngine, profile: &CustomerProfile) -> Result<()> {
    println!("=== {} ===", profile.name);
    let mut session = engine.start_session(profile);

    let baseline = engine.evaluate(profile, &mut session);
    print_assessment("baseline", &baseline);

    let script = [
        SessionCommand::Deposit { amount: 500.0 },
        SessionCommand::Deposit { amount: 400.0 },
        SessionCommand::SetLocation { location: Location::Casino },
        SessionCommand::Wager { amount: 300.0 },
        SessionCommand::Wager { amount: 500.0 },
        SessionCommand::ContactSupport,
        SessionCommand::ContactSupport,
        SessionCommand::SetSessionTime {
            minutes: profile.avg_session_minutes.saturating_mul(2).saturating_add(30),
        },
    ];

    for command in script {
        let label = command.name();
        match engine.apply(profile, &mut session, command) {
            Ok(events) => print_events(&events),
            Err(e) => println!("  ! {label} rejected: {e}"),
        }
        let assessment = engine.evaluate(profile, &mut session);
        print_assessment(label, &assessment);
    }

    print_interventions(&engine.evaluate(profile, &mut session));
    println!();
    Ok(())
}

fn run_ipc_loop(engine: &mut RiskEngine, registry: &ProfileRegistry) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    let mut current: Option<(CustomerProfile, SessionActivity)> = registry
        .first()
        .map(|p| (p.clone(), engine.start_session(p)));

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                reply_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::Select { customer } => match registry.get(&customer) {
                Ok(profile) => {
                    let session = engine.start_session(profile);
                    writeln!(stdout, "{}", serde_json::to_string(&session)?)?;
                    current = Some((profile.clone(), session));
                }
                Err(e) => reply_error(&mut stdout, &e.to_string())?,
            },
            IpcRequest::Command { command } => match current.as_mut() {
                Some((profile, session)) => match engine.apply(profile, session, command) {
                    Ok(events) => writeln!(stdout, "{}", serde_json::to_string(&events)?)?,
                    Err(e) => reply_error(&mut stdout, &e.to_string())?,
                },
                None => reply_error(&mut stdout, "no customer selected")?,
            },
            IpcRequest::Evaluate => match current.as_mut() {
                Some((profile, session)) => {
                    let assessment = engine.evaluate(profile, session);
                    writeln!(stdout, "{}", serde_json::to_string(&assessment)?)?;
                }
                None => reply_error(&mut stdout, "no customer selected")?,
            },
            IpcRequest::ResetModel => match engine.reset_model() {
                Ok(()) => writeln!(stdout, "{}", serde_json::json!({ "ok": true }))?,
                Err(e) => reply_error(&mut stdout, &e.to_string())?,
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn reply_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn print_assessment(step: &str, a: &Assessment) {
    println!(
        "  {step:<18} score {:>3} {:<8} via {:<6} (rules {:>3}, model {:>3} @ {:.2}) crisis in {} days",
        a.result.score,
        a.result.level.to_string(),
        format!("{:?}", a.result.method),
        a.rule.score,
        a.prediction.score,
        a.prediction.confidence,
        a.days_to_crisis,
    );
}

fn print_events(events: &[SessionEvent]) {
    for alert in events.iter().filter_map(SessionEvent::as_alert) {
        println!("    [{:?}] {}", alert.severity, alert.message);
    }
}

fn print_interventions(a: &Assessment) {
    if a.interventions.is_empty() {
        println!("  no interventions");
        return;
    }
    println!("  interventions:");
    for i in &a.interventions {
        println!("    {:?} {}: {}", i.urgency, i.kind.label(), i.action);
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
