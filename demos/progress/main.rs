use bounded_counter::{run, trace, Config, ProgressBar};

/* ---------- */

fn main() -> anyhow::Result<()> {
    trace::init_tracing();

    let config = Config::default().graceful_shutdown(true);
    let summary = run(&config, ProgressBar::stdout())?;

    println!();
    println!("current count: {}", summary.count);

    if summary.interrupted {
        anyhow::bail!("interrupted before all producers and consumers completed");
    }

    println!("All producers and consumers completed.");
    Ok(())
}
