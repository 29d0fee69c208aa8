pub(crate) mod check;
mod executions;
mod health;
pub(crate) mod helpers;
mod push;
pub(crate) mod rules;
mod trigger;
mod version;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(subcommand)]
    Rules(rules::RulesCmd),
    Trigger(trigger::TriggerArgs),
    Push(push::PushArgs),
    Executions(executions::ExecutionsArgs),
    Check(check::CheckArgs),
    Health(health::HealthArgs),
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    match opts.cmd {
        Commands::Rules(cmd) => rules::execute(cmd, mode, opts.server, opts.config).await,
        Commands::Trigger(args) => trigger::execute(args, mode, opts.server, opts.config).await,
        Commands::Push(args) => push::execute(args, mode, opts.server, opts.config).await,
        Commands::Executions(args) => {
            executions::execute(args, mode, opts.server, opts.config).await
        }
        Commands::Check(args) => check::execute(args, mode),
        Commands::Health(args) => health::execute(args, mode, opts.server, opts.config).await,
        Commands::Version => {
            version::execute(mode);
            Ok(())
        }
    }
}
