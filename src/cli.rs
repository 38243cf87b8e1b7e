//! Command-line interface

use anyhow::Context;
use clap::Parser;
use kms_epid_gen::epid::activation_floor;
use kms_epid_gen::{ApplicationId, Epid, EpidGenerator, HostOs, HOST_OS_PROFILES, KEY_CONFIGS};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "kms_epid_gen")]
#[command(author = "kms_epid_gen Contributors")]
#[command(version = "1.0.0")]
#[command(
    about = "Generate KMS host Extended Product IDs",
    long_about = "Generate KMS host Extended Product IDs (ePIDs)\n\n\
                  Run with --tui to launch the terminal interface."
)]
pub struct Cli {
    /// Launch TUI mode (terminal interface)
    #[arg(long)]
    pub tui: bool,

    /// Requesting application: windows, office14, office15 or a GUID
    #[arg(long, default_value = "windows")]
    pub app: ApplicationId,

    /// KMS protocol version of the request (4, 5 or 6)
    #[arg(long, default_value_t = 6)]
    pub protocol: u32,

    /// Number of ePIDs to generate (1-1000)
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Impersonate a specific host OS (2008r2, 2012, 2012r2) instead of a random one
    #[arg(long)]
    pub host: Option<HostOs>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Decode an existing ePID instead of generating
    #[arg(long, conflicts_with_all = ["app", "protocol", "count", "host", "seed"])]
    pub parse: Option<String>,

    /// List host OS profiles and key configs
    #[arg(long)]
    pub list: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    // Handle --list flag
    if cli.list {
        list_tables();
        return Ok(());
    }

    if let Some(text) = &cli.parse {
        let epid: Epid = text.parse()?;
        print_epid(&epid);
        return Ok(());
    }

    if !(1..=1000).contains(&cli.count) {
        anyhow::bail!("Count must be between 1 and 1000");
    }

    let generator = EpidGenerator::system().context("Reference tables or system clock rejected")?;
    let mut rng: Box<dyn RngCore> = match cli.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    for _ in 0..cli.count {
        let epid = match cli.host {
            Some(host) => generator.generate_for_host(&mut rng, cli.app, cli.protocol, host)?,
            None => generator.generate(&mut rng, cli.app, cli.protocol)?,
        };
        println!("{}", epid);
    }

    Ok(())
}

fn print_epid(epid: &Epid) {
    let host = HOST_OS_PROFILES
        .iter()
        .find(|p| p.type_code == epid.host_type && p.os_build == epid.os_build)
        .map(|p| p.description)
        .unwrap_or("unknown host");
    let config = KEY_CONFIGS
        .iter()
        .find(|c| c.group_id == epid.group_id && c.contains(epid.key_id))
        .map(|c| c.description)
        .unwrap_or("unknown key range");

    println!("{}", "=".repeat(60));
    println!("  Host OS type     : {:05} ({})", epid.host_type, host);
    println!("  Host OS build    : {}", epid.os_build);
    println!("  Group ID         : {}", epid.group_id);
    println!("  Product key ID   : {:03}-{:06} ({})", epid.key_major(), epid.key_minor(), config);
    println!("  License channel  : {:02}", epid.license_channel);
    println!("  Language         : {}", epid.language);
    println!("  Activation date  : {} (day {:03})", epid.activation_date, epid.day_of_year());
    println!("{}", "=".repeat(60));
}

fn list_tables() {
    println!("\nHost OS profiles:\n");
    for profile in HOST_OS_PROFILES {
        println!(
            "  {:8} - {:28} type {:05}  build {:4}  released {}",
            profile.short_name,
            profile.description,
            profile.type_code,
            profile.os_build,
            profile.release
        );
    }

    println!("\nKey configs:\n");
    for config in KEY_CONFIGS {
        println!(
            "  {:14} - {:32} group {:05}  ids {:09}..={:09}",
            config.name,
            config.description,
            config.group_id,
            config.pid_range_min,
            config.pid_range_max
        );
    }

    println!("\nApplications:\n");
    for app in ApplicationId::ALL {
        let floor = activation_floor(app, 4, HostOs::Server2008R2Sp1.profile());
        println!(
            "  {:8} - {:12} {}  earliest activation {}",
            app.name(),
            app.description(),
            app.uuid().hyphenated().to_string().to_uppercase(),
            floor
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kms_epid_gen"]).unwrap();
        assert_eq!(cli.app, ApplicationId::Windows);
        assert_eq!(cli.protocol, 6);
        assert_eq!(cli.count, 1);
        assert!(cli.host.is_none());
        assert!(!cli.list);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_full_arguments() {
        let cli = Cli::try_parse_from([
            "kms_epid_gen",
            "--app",
            "0FF1CE15-A989-479D-AF46-F275C6370663",
            "--protocol",
            "5",
            "--count",
            "3",
            "--host",
            "2012",
            "--seed",
            "42",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.app, ApplicationId::Office15);
        assert_eq!(cli.protocol, 5);
        assert_eq!(cli.count, 3);
        assert_eq!(cli.host, Some(HostOs::Server2012));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["kms_epid_gen", "--app", "office2099"]).is_err());
        assert!(Cli::try_parse_from(["kms_epid_gen", "--host", "2019"]).is_err());
        assert!(Cli::try_parse_from(["kms_epid_gen", "--parse", "x", "--seed", "1"]).is_err());
    }

    #[test]
    fn test_parse_conflicts_with_generation_options() {
        let epid = "06401-00206-271-478249-03-1033-9600.0000-3422016";
        for extra in [
            ["--app", "office14"],
            ["--protocol", "5"],
            ["--count", "3"],
            ["--host", "2012"],
            ["--seed", "1"],
        ] {
            let args = ["kms_epid_gen", "--parse", epid, extra[0], extra[1]];
            assert!(Cli::try_parse_from(args).is_err(), "{:?} accepted with --parse", extra);
        }

        let cli = Cli::try_parse_from(["kms_epid_gen", "--parse", epid]).unwrap();
        assert_eq!(cli.parse.as_deref(), Some(epid));
        assert!(run_cli(cli).is_ok());
    }

    #[test]
    fn test_count_out_of_range() {
        let cli = Cli::try_parse_from(["kms_epid_gen", "--count", "0"]).unwrap();
        assert!(run_cli(cli).is_err());
    }

    #[test]
    fn test_parse_malformed_epid_fails() {
        let cli = Cli::try_parse_from(["kms_epid_gen", "--parse", "not-an-epid"]).unwrap();
        assert!(run_cli(cli).is_err());
    }
}
