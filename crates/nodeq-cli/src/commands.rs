//! CLI command implementations.

use crate::config::{Config, CONFIG_FILE};
use crate::repl::Repl;
use colored::Colorize;
use nodeq_graph::Graph;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Run the shell, interactively or from a script.
pub fn repl(
    config: &Config,
    file: Option<&Path>,
    script: Option<&Path>,
    continue_on_error: bool,
) -> Result<()> {
    match script {
        Some(path) if path.as_os_str() == "-" => {
            let stdin = io::stdin();
            run_shell(stdin.lock(), config, file, Some(continue_on_error))
        }
        Some(path) => {
            debug!("Running script {}", path.display());
            let input = BufReader::new(File::open(path)?);
            run_shell(input, config, file, Some(continue_on_error))
        }
        None => {
            let stdin = io::stdin();
            run_shell(stdin.lock(), config, file, None)
        }
    }
}

/// `continue_on_error` is `None` for an interactive session.
fn run_shell<R: BufRead>(
    input: R,
    config: &Config,
    file: Option<&Path>,
    continue_on_error: Option<bool>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut shell = Repl::new(input, stdout.lock(), config.clone());
    if let Some(keep_going) = continue_on_error {
        shell = shell.scripted(keep_going);
    }

    if let Some(path) = file {
        if let Err(e) = shell.load_initial(path) {
            if continue_on_error == Some(false) {
                return Err(e.into());
            }
            shell.report(&e)?;
        }
    }

    shell.run()?;
    if shell.session().has_unsaved_changes() {
        warn!("Exited with unsaved changes");
    }
    Ok(())
}

/// Write a default config file.
pub fn init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path)?;
    fs::write(&config_path, serde_json::to_string_pretty(&Config::default())?)?;
    info!("Wrote default config to {}", config_path.display());

    println!("{} Created {}", "✓".green(), config_path.display());
    println!("  Run {} to start the shell", "nodeq".cyan());

    Ok(())
}

/// Print every node with its children.
pub fn show(file: &Path) -> Result<()> {
    let graph = Graph::read_from_file(file)?;

    for (name, _) in graph.nodes() {
        let children = graph.get_children(name)?;
        if children.is_empty() {
            println!("{}", name.cyan());
        } else {
            let list: Vec<String> = children.iter().map(|c| format!("'{}'", c)).collect();
            println!("{} {} {}", name.cyan(), "→".dimmed(), list.join(", "));
        }
    }

    println!();
    println!(
        "{} nodes, {} edges",
        graph.node_count().to_string().bold(),
        graph.edge_count().to_string().bold()
    );

    Ok(())
}

/// Validate a graph file and show statistics.
pub fn check(file: &Path) -> Result<()> {
    let graph = Graph::read_from_file(file)?;
    let stats = graph.stats();

    println!("{} {} is a valid graph file", "✓".green(), file.display());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    println!("  {} {}", "Edges:".dimmed(), stats.edge_count);
    println!("  {} {}", "Self-loops:".dimmed(), stats.self_loops);

    Ok(())
}

/// Export a graph file to JSON.
pub fn export(file: &Path, output: &Path) -> Result<()> {
    let graph = Graph::read_from_file(file)?;
    export_graph(&graph, output)
}

fn export_graph(graph: &Graph, path: &Path) -> Result<()> {
    let export = serde_json::json!({
        "version": "1.0",
        "stats": graph.stats(),
        "graph": graph.snapshot(),
    });

    fs::write(path, serde_json::to_string_pretty(&export)?)?;
    info!("Exported {} nodes to {}", graph.node_count(), path.display());
    println!("{} Exported to {}", "✓".green(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_writes_snapshot() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("graph.json");

        let mut graph = Graph::new();
        graph.add_node("A").unwrap();
        graph.add_node("B").unwrap();
        graph.add_edge("A", "B").unwrap();

        export_graph(&graph, &out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["stats"]["edge_count"], 1);
        assert_eq!(json["graph"]["nodes"][1], "B");
        assert_eq!(json["graph"]["edges"][0]["source"], "A");
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();

        let config = Config::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());

        // A second run leaves the file alone.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_check_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "1\nA\nzero\n0\n").unwrap();

        let err = check(&path).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }
}
