use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use xplorer::formatters::{
    format_bytes, format_number, format_relative_time, format_uptime, parse_timestamp,
};
use xplorer::{GlobalOutcome, NetworkDataAggregator, NodeRecord, PageOutcome};

#[derive(Subcommand)]
pub enum Commands {
    /// Show network-wide counters
    Stats,
    /// List nodes, loading pages until exhausted or the page limit
    Nodes(NodesArgs),
    /// Show one node by id or full address
    Node(NodeArgs),
    /// Show the network history series
    History,
}

impl Commands {
    pub async fn run(self, aggregator: &NetworkDataAggregator) -> Result<()> {
        match self {
            Commands::Stats => stats(aggregator).await,
            Commands::Nodes(args) => args.run(aggregator).await,
            Commands::Node(args) => args.run(aggregator).await,
            Commands::History => history(aggregator).await,
        }
    }
}

#[derive(Args)]
pub struct LoadArgs {
    /// Maximum number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Wait until every pending location is resolved
    #[arg(long)]
    wait_geo: bool,
}

impl LoadArgs {
    async fn load(&self, aggregator: &NetworkDataAggregator) {
        if let Some((page, _)) = aggregator.activate().await {
            report_page(&page);
        }
        for _ in 1..self.pages {
            match aggregator.load_more().await {
                Some(outcome @ PageOutcome::Appended { .. }) => report_page(&outcome),
                Some(outcome) => {
                    report_page(&outcome);
                    break;
                }
                None => break,
            }
        }
        if self.wait_geo {
            let pending = aggregator.enrichment().pending();
            tracing::info!(pending, "waiting for geo enrichment");
            aggregator.enrichment().wait_idle().await;
        }
    }
}

fn report_page(outcome: &PageOutcome) {
    match outcome {
        PageOutcome::Appended {
            page,
            received,
            added,
            scheduled,
        } => tracing::info!(page, received, added, scheduled, "page loaded"),
        PageOutcome::Exhausted { page } => tracing::info!(page, "no more pages"),
        PageOutcome::Failed { page, error } => {
            eprintln!("warning: page {page} failed: {error}");
        }
    }
}

#[derive(Args)]
pub struct NodesArgs {
    #[command(flatten)]
    load: LoadArgs,

    /// Only show nodes whose address contains this text (case-insensitive)
    #[arg(long)]
    search: Option<String>,
}

impl NodesArgs {
    async fn run(self, aggregator: &NetworkDataAggregator) -> Result<()> {
        self.load.load(aggregator).await;

        let nodes = match &self.search {
            Some(query) => aggregator.search(query),
            None => aggregator.nodes(),
        };

        println!(
            "{:<24} {:<8} {:<10} {:>10}  {:<14} LOCATION",
            "ADDRESS", "STATUS", "VERSION", "STORAGE", "LAST SEEN"
        );
        for node in &nodes {
            println!(
                "{:<24} {:<8} {:<10} {:>10}  {:<14} {}",
                node.full_address,
                node.status,
                node.version,
                node.formatted_storage,
                format_relative_time(node.last_seen),
                node.location
            );
        }

        let coverage = aggregator.geo_coverage();
        println!(
            "\n{} nodes shown, {}/{} located{}",
            nodes.len(),
            coverage.resolved,
            coverage.total,
            if coverage.scanning { " (scanning)" } else { "" }
        );
        Ok(())
    }
}

#[derive(Args)]
pub struct NodeArgs {
    /// Node id or full address (`ip:port`)
    key: String,

    #[command(flatten)]
    load: LoadArgs,
}

impl NodeArgs {
    async fn run(self, aggregator: &NetworkDataAggregator) -> Result<()> {
        self.load.load(aggregator).await;

        let Some(node) = aggregator.node(&self.key) else {
            bail!(
                "node '{}' not found in the {} loaded nodes",
                self.key,
                aggregator.node_count()
            );
        };
        print_node(&node);
        Ok(())
    }
}

fn print_node(node: &NodeRecord) {
    let m = &node.metrics;
    println!("Id:           {}", node.id);
    println!("Address:      {}", node.full_address);
    println!("Type:         {}", m.node_type);
    if node.source_status == node.status.as_str() {
        println!("Status:       {}", node.status);
    } else {
        println!("Status:       {} ({:?})", node.status, node.source_status);
    }
    println!("Version:      {}", node.version);
    println!("Location:     {}", node.location);
    if let Some(geo) = node.geo {
        println!("Coordinates:  {:.4}, {:.4}", geo.lat, geo.lng);
    }
    println!("Last seen:    {}", format_relative_time(node.last_seen));
    println!("Uptime:       {}", format_uptime(m.uptime_seconds));
    println!(
        "Storage:      {} used of {} committed",
        format_bytes(m.storage_used_bytes),
        node.formatted_storage
    );
    println!("CPU:          {:.1}%", m.cpu_percent);
    println!(
        "RAM:          {} / {}",
        format_bytes(m.ram_used_bytes),
        format_bytes(m.ram_total_bytes)
    );
    if let Some(port) = m.rpc_port {
        println!("RPC port:     {port}");
    }
    println!(
        "Packets:      {} sent, {} received",
        format_number(Some(m.packets_sent)),
        format_number(Some(m.packets_received))
    );
}

async fn stats(aggregator: &NetworkDataAggregator) -> Result<()> {
    if let GlobalOutcome::Failed { error } = aggregator.refresh_global().await {
        bail!("could not load network stats: {error}");
    }

    let stats = aggregator.stats();
    println!("Total nodes:     {}", format_number(Some(stats.total_nodes)));
    println!("Online nodes:    {}", format_number(Some(stats.online_nodes)));
    println!("Total storage:   {}", stats.total_storage);
    println!("Network health:  {:.1}%", stats.network_health);
    Ok(())
}

async fn history(aggregator: &NetworkDataAggregator) -> Result<()> {
    if let GlobalOutcome::Failed { error } = aggregator.refresh_global().await {
        bail!("could not load network history: {error}");
    }

    println!(
        "{:<28} {:<14} {:>8} {:>8} {:>12}",
        "TIMESTAMP", "AGE", "NODES", "ONLINE", "STORAGE"
    );
    for point in aggregator.history() {
        println!(
            "{:<28} {:<14} {:>8} {:>8} {:>12}",
            point.timestamp,
            format_relative_time(parse_timestamp(&point.timestamp)),
            format_number(Some(point.total_nodes)),
            format_number(point.online_nodes),
            format_bytes(point.total_storage_committed)
        );
    }
    Ok(())
}
