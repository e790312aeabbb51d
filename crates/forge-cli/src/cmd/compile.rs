use crate::output::{emit, print_json};
use crate::project::Project;
use anyhow::Context;
use std::path::Path;

pub fn run(
    root: &Path,
    templates: Option<&Path>,
    file: &Path,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let project = Project::open(root, templates)?;
    let compiler = project.compiler();
    let compiled = compiler
        .compile_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    if json {
        if let Some(out) = output {
            emit(&compiled, Some(out))
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        print_json(&serde_json::json!({
            "source": file,
            "output": output,
            "content": compiled,
        }))?;
        return Ok(());
    }

    emit(&compiled, output).with_context(|| match output {
        Some(out) => format!("failed to write {}", out.display()),
        None => "failed to write to stdout".to_string(),
    })?;
    if let Some(out) = output {
        eprintln!("Compiled {} -> {}", file.display(), out.display());
    }
    Ok(())
}
