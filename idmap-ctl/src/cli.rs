use clap::Parser;
use sandbox_idmap::HostIdConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "idmap-ctl")]
#[command(version, about = "Show uid/gid mappings of nested sandboxes", long_about = None)]
#[command(after_help = "FILE FORMAT:
    One sandbox per line, parents before children:
        <name> [b:]<namespace start>:<host start>:<length>
    For nested sandboxes the host start is the position inside the parent's namespace.

EXAMPLES:
    # Show the default allocation of this host
    idmap-ctl
    idmap-ctl --user lxd

    # Show the host ranges used by the sandboxes in a file
    idmap-ctl sandboxes.txt
    idmap-ctl --json sandboxes.txt
")]
pub struct Cli {
    /// Sandbox definition file (show the default allocation if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// User whose subordinate ids form the default allocation
    #[arg(short, long, value_name = "USER", default_value = "root")]
    pub user: String,

    /// Subordinate uid file
    #[arg(long, value_name = "PATH", default_value = "/etc/subuid")]
    pub subuid: PathBuf,

    /// Subordinate gid file
    #[arg(long, value_name = "PATH", default_value = "/etc/subgid")]
    pub subgid: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn host_config(&self) -> HostIdConfig {
        HostIdConfig {
            user: self.user.clone(),
            subuid_path: self.subuid.clone(),
            subgid_path: self.subgid.clone(),
        }
    }
}
