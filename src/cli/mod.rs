use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::clipboard::{create_provider, ClipboardGateway};
use crate::config::Config;
use crate::dispatch::{DispatchEnd, Dispatcher, InputHook};
use crate::inject::EnigoInjector;
use crate::orchestrator::Orchestrator;
use crate::selection::SelectionClassifier;

#[derive(Parser)]
#[command(name = "selclip")]
#[command(about = "Linux-style selection clipboard: select to copy, middle-click to paste")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log threshold (lower shows more); overrides DEBUG
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub debug: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Watch the mouse and keep the selection clipboard (default)")]
    Run,

    #[command(about = "Copy text to the system clipboard")]
    Copy { text: String },

    #[command(about = "Print the current system clipboard text")]
    Paste,

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Generate example configuration")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate configuration")]
    Validate,
}

pub struct CliHandler {
    config: Arc<Config>,
}

impl CliHandler {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub async fn handle_command(&self, command: Option<Commands>) -> Result<()> {
        match command.unwrap_or(Commands::Run) {
            Commands::Run => self.run().await,
            Commands::Copy { text } => self.copy_text(&text).await,
            Commands::Paste => self.paste_text().await,
            Commands::Config { action } => self.handle_config_action(action),
        }
    }

    fn gateway() -> Result<ClipboardGateway> {
        info!("Initializing clipboard provider");
        Ok(ClipboardGateway::new(create_provider()?))
    }

    async fn run(&self) -> Result<()> {
        let exit_key = self.config.exit_key()?;
        print_banner(&self.config, &exit_key.to_string());

        let orchestrator = Arc::new(Orchestrator::new(
            Self::gateway()?,
            Arc::new(EnigoInjector::new()),
            self.config.timings(),
        ));
        let classifier = SelectionClassifier::new(self.config.classifier_settings());
        let dispatcher = Dispatcher::new(classifier, orchestrator, exit_key);

        let (sender, receiver) = mpsc::unbounded_channel();
        let hook = InputHook::start(sender)?;
        let mut dispatch_task = tokio::spawn(dispatcher.run(receiver));
        info!("selclip started");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut liveness = tokio::time::interval(self.config.main_loop_sleep());

        // The hook thread cannot be stopped from outside; returning from main
        // ends it together with any in-flight operation.
        loop {
            tokio::select! {
                end = &mut dispatch_task => {
                    return match end {
                        Ok(DispatchEnd::ExitKey(key)) => {
                            println!("{} key pressed, exiting...", key);
                            Ok(())
                        }
                        Ok(DispatchEnd::HookClosed) => Err(anyhow!("Input hook stopped delivering events")),
                        Err(e) => Err(anyhow!("Dispatcher failed: {}", e)),
                    };
                }
                _ = &mut ctrl_c => {
                    println!("\nKeyboard interrupt detected (Ctrl+C). Exiting...");
                    return Ok(());
                }
                _ = liveness.tick() => {
                    if !hook.is_alive() {
                        error!("Input hook thread terminated");
                        return Err(anyhow!("Input hook thread terminated"));
                    }
                }
            }
        }
    }

    async fn copy_text(&self, text: &str) -> Result<()> {
        Self::gateway()?.write(text).await;
        println!("Text copied to clipboard");
        Ok(())
    }

    async fn paste_text(&self) -> Result<()> {
        let text = Self::gateway()?.read().await;
        println!("{}", text);
        Ok(())
    }

    fn handle_config_action(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                println!("Current Configuration:");
                print!("{}", toml::to_string_pretty(self.config.as_ref())?);
            }
            ConfigAction::Init { force } => {
                let path = Config::generate_example_config(force)?;
                println!("Example configuration written to {}", path.display());
            }
            ConfigAction::Validate => {
                // Config is already loaded and validated before the handler exists
                println!("Configuration is valid");
            }
        }
        Ok(())
    }
}

fn print_banner(config: &Config, exit_key: &str) {
    println!("------------- selclip v{} -------------", crate::VERSION);
    println!("  DEBUG level: {}", config.debug);
    println!("  Select text (left drag or double-click) to capture it.");
    println!("  Click the middle mouse button to paste it.");
    println!("  Press Ctrl+C in this console or {} to exit.", exit_key);
    println!("----------------------------------------------");
}
