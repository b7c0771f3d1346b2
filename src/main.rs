use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use colored::*;

use sysdeck::commands::{self, RunContext};
use sysdeck::core::config::Config;
use sysdeck::CancelToken;

fn main() {
    if let Err(e) = run() {
        sysdeck::ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("sysdeck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live system statistics from background samplers")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging (RUST_LOG overrides)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(streaming(
            Command::new("stats").about("CPU, RAM, swap, network throughput and battery"),
        ))
        .subcommand(streaming(
            Command::new("disks").about("Mounted volumes with free and total space"),
        ))
        .subcommand(streaming(
            Command::new("net").about("Network download and upload speed"),
        ))
        .subcommand(streaming(
            Command::new("connections").about("Established TCP connections and their owners"),
        ))
        .subcommand(streaming(
            Command::new("procs")
                .about("Running processes (task manager view)")
                .arg(
                    Arg::new("top")
                        .short('t')
                        .long("top")
                        .value_name("N")
                        .help("Show only the first N processes (default from config)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .value_name("KEY")
                        .help("Sort by cpu or mem")
                        .value_parser(["cpu", "mem", "memory"])
                        .default_value("cpu"),
                ),
        ))
        .subcommand(
            Command::new("kill")
                .about("Terminate a process by PID (as listed by 'sysdeck procs')")
                .arg(
                    Arg::new("pid")
                        .help("Process ID")
                        .required(true)
                        .index(1)
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(streaming(
            Command::new("ip").about("Local and public IP address"),
        ))
        .subcommand(
            Command::new("update")
                .about("Check the release manifest for a newer version")
                .arg(
                    Arg::new("current")
                        .long("current")
                        .value_name("VERSION")
                        .help("Version to compare against (defaults to this build)"),
                )
                .arg(json_flag()),
        )
        .subcommand(streaming(
            Command::new("watch").about("Run every continuous sampler at once"),
        ))
        .subcommand(
            Command::new("config")
                .about("Show or change settings (use 'sysdeck config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("show")
                        .about("Print the active configuration")
                        .arg(json_flag()),
                )
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("reset").about("Restore the default configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Set one value, e.g. 'period.disks 10000' or 'rate_clock nominal'")
                        .arg(Arg::new("key").help("Setting name").required(true).index(1))
                        .arg(Arg::new("value").help("New value").required(true).index(2)),
                ),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print one JSON object per line instead of tables")
        .action(ArgAction::SetTrue)
}

/// Flags shared by every command that streams snapshots
fn streaming(command: Command) -> Command {
    command
        .arg(json_flag())
        .arg(
            Arg::new("count")
                .short('n')
                .long("count")
                .value_name("N")
                .help("Exit after N snapshots")
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Override the sampling period in milliseconds")
                .value_parser(value_parser!(u64).range(1..)),
        )
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();

    sysdeck::init_logging(matches.get_flag("verbose"));

    let (name, sub_matches) = match matches.subcommand() {
        Some(pair) => pair,
        None => {
            println!("{}", "Welcome to sysdeck!".cyan().bold());
            println!("Use 'sysdeck --help' for more information.");
            return Ok(());
        }
    };

    match name {
        "config" => return commands::config::execute(sub_matches),
        "kill" => return commands::kill::execute(sub_matches),
        _ => {}
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "Stopping samplers...".yellow().bold());
        handler_token.cancel();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let config = Config::load().context("Failed to load configuration")?;
    let ctx = RunContext::from_matches(sub_matches, config, cancel);

    match name {
        "stats" => commands::sample::stats(&ctx),
        "disks" => commands::sample::disks(&ctx),
        "net" => commands::sample::net(&ctx),
        "connections" => commands::sample::connections(&ctx),
        "procs" => commands::sample::procs(sub_matches, &ctx),
        "ip" => commands::sample::ip(&ctx),
        "update" => commands::sample::update(sub_matches, &ctx),
        "watch" => commands::watch(&ctx),
        _ => {
            println!("Use 'sysdeck --help' for more information.");
            Ok(())
        }
    }
}
