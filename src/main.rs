use clap::Parser;
use folder_index::{Cli, Command, VaultContext};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> folder_index::Result<()> {
    let ctx = VaultContext::new(cli.vault.as_deref(), cli.config.as_deref(), cli.json)?;

    match cli.command {
        Command::Outline { document, ignore, recursion_limit } => {
            cmd::outline::run(&ctx, &document, ignore.as_deref(), recursion_limit)
        }
        Command::Render { document } => cmd::render::run(&ctx, &document),
        Command::Graph { active, tags, orphans, attachments, hide_unresolved } => {
            let options = folder_index::RenderOptions {
                show_tags: tags,
                show_attachments: attachments,
                show_orphans: orphans,
                hide_unresolved,
                ..Default::default()
            };
            cmd::graph::run(&ctx, active.as_deref(), &options)
        }
        Command::IsIndex { path } => cmd::is_index::run(&ctx, &path),
        Command::InitIndex { folder } => cmd::init_index::run(&ctx, &folder),
        Command::RenameFolder { old, new } => cmd::rename_folder::run(&ctx, &old, &new),
        Command::Settings => cmd::settings::run(&ctx),
    }
}

mod cmd {
    pub mod outline;
    pub mod render;
    pub mod graph;
    pub mod is_index;
    pub mod init_index;
    pub mod rename_folder;
    pub mod settings;
    pub mod write;
}
