//! Pledge conformance runner.
//!
//! Runs every conformance scenario against the core crate and prints one line
//! per scenario. Exits non-zero if any scenario fails.
//!
//! ```text
//! pledge            run everything
//! pledge race       run scenarios whose name contains "race"
//! pledge --list     print scenario names and exit
//! ```

mod scenarios;

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::Result;
use tokio::task::LocalSet;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pledge_config::PledgeConfig;
use scenarios::{Harness, SCENARIOS};

const LOCAL_SET_SCENARIO: &str = "local_set_await";

fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| match config_filter {
            Some(filter) => EnvFilter::try_new(filter),
            None => EnvFilter::try_new("info"),
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn report(name: &str, result: &Result<()>) -> bool {
    match result {
        Ok(()) => {
            println!("ok    {name}");
            true
        }
        Err(err) => {
            println!("FAIL  {name}: {err:#}");
            false
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let loaded = PledgeConfig::load();
    let config = match &loaded {
        Ok(Some(config)) => Some(config),
        _ => None,
    };
    init_tracing(config.and_then(PledgeConfig::log_filter));
    if let Err(err) = &loaded {
        tracing::warn!("Ignoring config: {err}");
    }

    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--list") {
        for scenario in SCENARIOS {
            println!("{}", scenario.name);
        }
        println!("{LOCAL_SET_SCENARIO}");
        return Ok(ExitCode::SUCCESS);
    }
    let selected = |name: &str| arg.as_deref().is_none_or(|filter| name.contains(filter));

    let harness = Harness::new(
        config.map(PledgeConfig::conformance).unwrap_or_default(),
        config.and_then(PledgeConfig::max_turns),
    );

    let mut ran = 0_usize;
    let mut failed = 0_usize;
    for scenario in SCENARIOS.iter().filter(|s| selected(s.name)) {
        tracing::debug!(scenario = scenario.name, "Running scenario");
        ran += 1;
        if !report(scenario.name, &scenario.run(&harness)) {
            failed += 1;
        }
    }

    if selected(LOCAL_SET_SCENARIO) {
        ran += 1;
        let result = LocalSet::new().run_until(scenarios::local_set_await()).await;
        if !report(LOCAL_SET_SCENARIO, &result) {
            failed += 1;
        }
    }

    println!();
    println!("{} passed, {failed} failed", ran - failed);
    if failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
