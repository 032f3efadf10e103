use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use slog::Drain;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tunable_kv::{KvNodeConfig, KvOptions, KvRemoteClient, ReadConcern};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replicated key-value store with tunable consistency", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a node until interrupted.
    Serve(ServeArgs),
    /// Read a key.
    Read {
        #[command(flatten)]
        node: NodeArg,
        key: String,
        /// local, majority or all. Defaults to the node's configured concern.
        #[arg(long)]
        concern: Option<ReadConcern>,
    },
    /// Write a key through the leader.
    Write {
        #[command(flatten)]
        node: NodeArg,
        key: String,
        value: String,
        /// Follower acknowledgments to wait for.
        #[arg(long)]
        write_concern: Option<u32>,
    },
    /// Delete a key through the leader.
    Delete {
        #[command(flatten)]
        node: NodeArg,
        key: String,
        #[arg(long)]
        write_concern: Option<u32>,
    },
    /// Add a peer to the node's cluster.
    AddPeer {
        #[command(flatten)]
        node: NodeArg,
        address: String,
        /// Fail if the peer is already a member.
        #[arg(long)]
        strict: bool,
    },
    /// Remove a peer from the node's cluster.
    RemovePeer {
        #[command(flatten)]
        node: NodeArg,
        address: String,
        /// Fail if the peer isn't a member.
        #[arg(long)]
        strict: bool,
    },
    /// Print the node's view of the cluster.
    Status {
        #[command(flatten)]
        node: NodeArg,
    },
    /// Make the node leader.
    Promote {
        #[command(flatten)]
        node: NodeArg,
    },
    /// Make the node give up leadership.
    Demote {
        #[command(flatten)]
        node: NodeArg,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// "host:port" to listen on. Peers must be able to reach this node under the same address.
    #[arg(long, default_value = "127.0.0.1:7000")]
    listen: String,
    /// Cluster member address. Repeat for each member; including this node's own is fine.
    #[arg(long = "peer")]
    peers: Vec<String>,
    /// Read concern for requests that don't specify one.
    #[arg(long, default_value = "local")]
    read_concern: ReadConcern,
    /// Write concern for requests that don't specify one.
    #[arg(long, default_value_t = 0)]
    write_concern: u32,
    /// Become leader once started.
    #[arg(long)]
    promote: bool,
    /// Write logs to a timestamped file in this directory instead of the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NodeArg {
    /// Address of the node to talk to.
    #[arg(long, default_value = "127.0.0.1:7000")]
    node: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    run(cli.command).await
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    let info_logger = match &args.log_file {
        Some(directory) => create_root_logger_for_file(directory)?,
        None => create_root_logger_for_stdout(),
    };

    let config = KvNodeConfig {
        my_address: args.listen,
        initial_peers: args.peers,
        info_logger: info_logger.clone(),
        options: KvOptions {
            default_read_concern: Some(args.read_concern),
            default_write_concern: Some(args.write_concern),
            ..KvOptions::default()
        },
        store: None,
        missed_write_sink: None,
    };
    let node = tunable_kv::try_create_kv_node(config).await?;

    if args.promote {
        match node.promote().await {
            Ok(output) => slog::info!(info_logger, "Promoted to leader at epoch {}", output.epoch),
            Err(e) => slog::warn!(info_logger, "Couldn't promote: {}", e),
        }
    }

    tokio::signal::ctrl_c().await?;
    slog::info!(info_logger, "Interrupted. Shutting down.");
    drop(node);

    Ok(())
}

async fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Serve(args) => serve(args).await?,
        Command::Read { node, key, concern } => {
            let value = connect(&node).await?.read(&key, concern).await?;
            println!("{} (version {}.{})", value.value, value.version.epoch, value.version.sequence);
        }
        Command::Write {
            node,
            key,
            value,
            write_concern,
        } => {
            let version = connect(&node).await?.write(&key, &value, write_concern).await?;
            println!("OK (version {}.{})", version.epoch, version.sequence);
        }
        Command::Delete {
            node,
            key,
            write_concern,
        } => {
            let version = connect(&node).await?.delete(&key, write_concern).await?;
            println!("OK (version {}.{})", version.epoch, version.sequence);
        }
        Command::AddPeer { node, address, strict } => {
            let output = connect(&node).await?.add_peer(&address, strict).await?;
            println!("changed: {}", output.changed);
        }
        Command::RemovePeer { node, address, strict } => {
            let output = connect(&node).await?.remove_peer(&address, strict).await?;
            println!("changed: {}", output.changed);
        }
        Command::Status { node } => {
            let status = connect(&node).await?.status().await?;
            println!("{} {:?} epoch {}", status.my_address, status.role, status.epoch);
            for member in status.members {
                let marker = if member.is_leader { " (leader)" } else { "" };
                println!("  {} {:?}{}", member.address, member.liveness, marker);
            }
        }
        Command::Promote { node } => {
            let output = connect(&node).await?.promote().await?;
            println!("epoch: {}, changed: {}", output.epoch, output.changed);
        }
        Command::Demote { node } => {
            let output = connect(&node).await?.demote().await?;
            println!("epoch: {}, changed: {}", output.epoch, output.changed);
        }
    }

    Ok(())
}

async fn connect(node: &NodeArg) -> Result<KvRemoteClient, Box<dyn Error>> {
    Ok(KvRemoteClient::connect(&node.node).await?)
}

fn create_root_logger_for_file(directory: &Path) -> Result<slog::Logger, Box<dyn Error>> {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = directory.join(format!("{}_info.log", now));
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(slog::Logger::root(drain, slog::o!()))
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}
