use clap::{Parser, Subcommand};

use cfdns::dns::{DnsRecords, RecordMap, RecordSelector};
use cfdns::error::{Error, Result};
use cfdns::record::{RecordSpec, RecordType, Ttl};

mod config;

#[derive(Parser)]
#[command(name = "cfdns", about = "Manage Cloudflare DNS records")]
struct Args {
    #[clap(short, long)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the zones on the account
    Zones,

    /// List the DNS records of a zone
    Records {
        #[clap(long)]
        zone: String,
    },

    /// Create a record, or update the existing record with the same name
    /// and type
    Set {
        #[clap(long)]
        zone: String,

        #[clap(long = "type")]
        rtype: RecordType,

        #[clap(long)]
        name: String,

        #[clap(long)]
        content: String,

        /// TTL in seconds, 1 means automatic
        #[clap(long, default_value_t = 1)]
        ttl: u32,

        #[clap(long)]
        priority: Option<u16>,

        #[clap(long)]
        proxied: bool,

        #[clap(long)]
        comment: Option<String>,
    },

    /// Delete a record, addressed by id or by name and type
    Delete {
        #[clap(long)]
        zone: String,

        #[clap(long)]
        id: Option<String>,

        #[clap(long)]
        name: Option<String>,

        #[clap(long = "type")]
        rtype: Option<RecordType>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = config::Parser::parse_yaml(&args.config)?;
    let mut dns = DnsRecords::new(cfg.authentication);

    match args.command {
        Command::Zones => {
            for (name, zone) in dns.zones().await? {
                println!("{}\t{}\t{}", zone.id, name, zone.status);
            }
        }
        Command::Records { zone } => {
            print_records(&dns.records(&zone).await?);
        }
        Command::Set {
            zone,
            rtype,
            name,
            content,
            ttl,
            priority,
            proxied,
            comment,
        } => {
            let spec = RecordSpec {
                rtype,
                name,
                content,
                ttl: match ttl {
                    1 => Ttl::Auto,
                    v => Ttl::Value(v),
                },
                priority,
                proxied,
                comment,
            };
            print_records(&dns.upsert(&zone, spec).await?);
        }
        Command::Delete {
            zone,
            id,
            name,
            rtype,
        } => {
            let selector = match (id, name, rtype) {
                (Some(id), _, _) => RecordSelector::Id(id),
                (None, Some(name), Some(rtype)) => RecordSelector::NameType(name, rtype),
                _ => {
                    return Err(Error::RecordNotFound(
                        "pass --id, or --name together with --type".to_string(),
                    ));
                }
            };
            print_records(&dns.delete(&zone, selector).await?);
        }
    }

    Ok(())
}

fn print_records(records: &RecordMap) {
    for record in records.values() {
        println!(
            "{}\t{}\t{}\t{}\tttl={}\tproxied={}",
            record.id, record.rtype, record.name, record.content, record.ttl, record.proxied
        );
    }
}
