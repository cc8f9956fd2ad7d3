use crate::logic::sources::FlagMap;
use clap::Parser;

/// pi-cloud-init - first-boot cloud-init documents for a single-board computer
///
/// Every setting can be passed as a flag; anything missing is asked for
/// interactively. Toggles accept an optional yes/no value (`--static`,
/// `--static=false`).
#[derive(Parser, Debug, Default)]
#[command(name = "pi-cloud-init")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print both documents instead of writing files
    #[arg(short = 'D', long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub dry_run: Option<String>,

    /// Directory that receives user-data and network-config
    #[arg(short = 'F', long, value_name = "DIR")]
    pub file: Option<String>,

    /// Hostname for the device
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// IANA time zone, e.g. Europe/Berlin
    #[arg(short = 'T', long)]
    pub time_zone: Option<String>,

    /// Unprivileged user name
    #[arg(short = 'U', long)]
    pub user: Option<String>,

    /// Password for the user; empty locks password login
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Path to an SSH public key (~ is expanded)
    #[arg(short = 'k', long, value_name = "PATH")]
    pub ssh_key: Option<String>,

    /// Tailscale auth key (also read from TAILSCALE_AUTHKEY)
    #[arg(short = 'K', long, value_name = "KEY")]
    pub tailscale_key: Option<String>,

    /// Advertise the device as a Tailscale exit node
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exit_node: Option<String>,

    /// Use static addressing instead of DHCP
    #[arg(long = "static", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub use_static: Option<String>,

    /// Wired address with prefix length, e.g. 192.168.1.20/24
    #[arg(long, value_name = "CIDR")]
    pub ethernet_ip: Option<String>,

    /// Gateway address for static addressing
    #[arg(long, value_name = "IP")]
    pub router: Option<String>,

    /// Comma-separated nameserver addresses
    #[arg(long, value_name = "IP[,IP...]")]
    pub nameservers: Option<String>,

    /// Connect to a wireless network (implied by --ssid/--ssid-password)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub wireless: Option<String>,

    /// Wireless network to join
    #[arg(short = 'S', long)]
    pub ssid: Option<String>,

    /// Password for the wireless network
    #[arg(short = 'W', long)]
    pub ssid_password: Option<String>,

    /// Wireless regulatory domain (ISO 3166 alpha-2)
    #[arg(long, value_name = "CC")]
    pub country: Option<String>,

    /// Wireless address with prefix length
    #[arg(long, value_name = "CIDR")]
    pub wireless_ip: Option<String>,

    /// Never prompt; missing required values are an error
    #[arg(long)]
    pub non_interactive: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Flags that were given, keyed by long name.
    pub fn flag_map(&self) -> FlagMap {
        let bound = [
            ("dry-run", &self.dry_run),
            ("file", &self.file),
            ("hostname", &self.hostname),
            ("time-zone", &self.time_zone),
            ("user", &self.user),
            ("password", &self.password),
            ("ssh-key", &self.ssh_key),
            ("tailscale-key", &self.tailscale_key),
            ("exit-node", &self.exit_node),
            ("static", &self.use_static),
            ("ethernet-ip", &self.ethernet_ip),
            ("router", &self.router),
            ("nameservers", &self.nameservers),
            ("wireless", &self.wireless),
            ("ssid", &self.ssid),
            ("ssid-password", &self.ssid_password),
            ("country", &self.country),
            ("wireless-ip", &self.wireless_ip),
        ];

        bound
            .into_iter()
            .filter_map(|(flag, value)| value.as_ref().map(|v| (flag, v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QuestionGraph;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["pi-cloud-init"]).unwrap();
        assert!(cli.flag_map().is_empty());
        assert!(!cli.non_interactive);
    }

    #[test]
    fn test_cli_flags_map_to_bindings() {
        let cli = Cli::try_parse_from([
            "pi-cloud-init",
            "--hostname",
            "nodeA",
            "-T",
            "UTC",
            "-U",
            "pi",
            "-S",
            "HomeNet",
            "--dry-run",
        ])
        .unwrap();
        let flags = cli.flag_map();

        assert_eq!(flags.get("hostname"), Some("nodeA"));
        assert_eq!(flags.get("time-zone"), Some("UTC"));
        assert_eq!(flags.get("user"), Some("pi"));
        assert_eq!(flags.get("ssid"), Some("HomeNet"));
        assert_eq!(flags.get("dry-run"), Some("true"));
        assert!(!flags.contains("wireless"));
    }

    #[test]
    fn test_cli_toggle_with_explicit_value() {
        let cli = Cli::try_parse_from(["pi-cloud-init", "--static=false", "--wireless", "no"])
            .unwrap();
        let flags = cli.flag_map();
        assert_eq!(flags.get("static"), Some("false"));
        assert_eq!(flags.get("wireless"), Some("no"));
    }

    #[test]
    fn test_every_flag_has_a_field() {
        let cli = Cli::try_parse_from([
            "pi-cloud-init",
            "--dry-run",
            "--file=.",
            "--hostname=a",
            "--time-zone=UTC",
            "--user=pi",
            "--password=x",
            "--ssh-key=k",
            "--tailscale-key=t",
            "--exit-node",
            "--static",
            "--ethernet-ip=1.2.3.4/24",
            "--router=1.2.3.1",
            "--nameservers=1.1.1.1",
            "--wireless",
            "--ssid=s",
            "--ssid-password=p",
            "--country=US",
            "--wireless-ip=1.2.3.5/24",
        ])
        .unwrap();
        let flags = cli.flag_map();
        assert_eq!(flags.len(), 18);

        let graph = QuestionGraph::standard();
        let bindings: Vec<&str> = graph.iter().filter_map(|f| f.cli_binding).collect();
        assert_eq!(bindings.len(), flags.len());
        for binding in bindings {
            assert!(flags.contains(binding), "flag --{binding} not mapped");
        }
    }
}
