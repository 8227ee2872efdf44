use crate::cli::commands::{ChainCommands, Cli, Commands};
use anyhow::{Context, Result};
use chainpilot::Config;
use chainpilot::agent::{RequestContext, build_agent};
use chainpilot::chain::{ChainRegistry, LogFilter};
use chainpilot::task::create_task_store;

/// Run one goal under the configured deadline; Ctrl-C cancels it.
async fn run_goal(
    config: &Config,
    goal: &str,
    action: Option<&str>,
    address: Option<&str>,
) -> Result<()> {
    let agent = build_agent(config).await?;
    let ctx = RequestContext::with_timeout(config.agent.request_timeout());

    let canceller = ctx.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling run");
            canceller.cancel();
        }
    });

    let outcome = agent
        .run(&ctx, goal, action.unwrap_or(""), address.unwrap_or(""))
        .await;
    watcher.abort();

    let task = outcome?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

fn print_networks(config: &Config, registry: &ChainRegistry) {
    if registry.is_empty() {
        println!("No chain networks configured.");
    }
    let default = config.chain.default_network_name();
    for name in registry.names() {
        let marker = if Some(name) == default { " (default)" } else { "" };
        println!("{name}{marker}");
    }
}

async fn run_chain(config: &Config, network: Option<&str>, command: ChainCommands) -> Result<()> {
    let registry = ChainRegistry::from_config(&config.chain, config.agent.chain_timeout());
    let executor = || {
        registry
            .resolve(network)
            .with_context(|| format!("Unknown chain network: {}", network.unwrap_or_default()))
    };

    let output = match command {
        ChainCommands::Networks => {
            print_networks(config, &registry);
            return Ok(());
        }
        ChainCommands::Snapshot => serde_json::to_string_pretty(&executor()?.snapshot().await?)?,
        ChainCommands::Logs {
            address,
            topics,
            from_block,
            to_block,
        } => {
            let filter = LogFilter {
                address,
                topics,
                from_block,
                to_block,
            };
            serde_json::to_string_pretty(&executor()?.fetch_logs(&filter).await?)?
        }
        ChainCommands::Deploy { raw_tx } => {
            serde_json::to_string_pretty(&executor()?.deploy_contract(&raw_tx).await?)?
        }
        ChainCommands::Send { raw_txs } => {
            serde_json::to_string_pretty(&executor()?.send_batch_transactions(&raw_txs).await?)?
        }
    };
    println!("{output}");
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            chainpilot::gateway::run_gateway(&host, port, config).await
        }
        Commands::Run {
            goal,
            action,
            address,
        } => run_goal(&config, &goal, action.as_deref(), address.as_deref()).await,
        Commands::Task { id } => {
            let store = create_task_store(&config).await?;
            let task = store
                .get(id)
                .await
                .with_context(|| format!("Failed to load task {id}"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            Ok(())
        }
        Commands::History { limit } => {
            let store = create_task_store(&config).await?;
            let tasks = store.recent_by_time(limit).await?;
            if tasks.is_empty() {
                println!("No tasks recorded yet.");
            }
            for task in tasks {
                let action = if task.chain_requested() {
                    format!(" [{}]", task.chain_action)
                } else {
                    String::new()
                };
                println!(
                    "#{} {}{} -> {}",
                    task.id,
                    chainpilot::utils::preview(&task.goal, 60),
                    action,
                    chainpilot::utils::preview(&task.reply, 80)
                );
            }
            Ok(())
        }
        Commands::Chain { network, command } => {
            run_chain(&config, network.as_deref(), command).await
        }
    }
}
