use crate::output::{print_json, print_table};
use forge_core::agents::AGENTS;

pub fn run(json: bool) -> anyhow::Result<()> {
    let git = which::which("git").is_ok();
    let tools: Vec<_> = AGENTS.iter().filter(|a| a.requires_cli).collect();

    if json {
        let agents: Vec<_> = tools
            .iter()
            .map(|a| {
                serde_json::json!({
                    "key": a.key,
                    "name": a.name,
                    "installed": a.is_installed(),
                    "install_url": a.install_url,
                })
            })
            .collect();
        print_json(&serde_json::json!({ "git": git, "agents": agents }))?;
        return Ok(());
    }

    let mut rows = vec![vec![
        "git".to_string(),
        "Git".to_string(),
        if git { "yes" } else { "no" }.to_string(),
    ]];
    rows.extend(tools.iter().map(|a| {
        vec![
            a.key.to_string(),
            a.name.to_string(),
            if a.is_installed() { "yes" } else { "no" }.to_string(),
        ]
    }));
    print_table(&["TOOL", "NAME", "INSTALLED"], rows);

    if !git {
        println!("\nGit not found: version control features are unavailable.");
    }
    Ok(())
}
