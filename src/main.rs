use clap::Parser;
use miette::Result;
use costbook::cli::commands;
use costbook::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Die quietly on a closed pipe (`costbook cost lines | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    costbook::logging::init(global.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::Cost(cmd) => commands::cost::run(cmd, &global),
        Commands::Product(cmd) => commands::product::run(cmd, &global),
        Commands::Master(cmd) => commands::master::run(cmd, &global),
        Commands::Category(cmd) => commands::category::run(cmd, &global),
        Commands::Data(cmd) => commands::data::run(cmd, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
