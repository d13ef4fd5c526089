//! Status command - roster versus repositories on disk

use std::collections::BTreeSet;

use fleet_core::{GitVcs, MemberId, Project};

use super::print_json;

pub fn show(project: &Project<GitVcs>, json: bool) -> anyhow::Result<()> {
    let status = project.status();

    if json {
        return print_json(&status);
    }

    println!("Project: {}", status.project);
    println!("  Roster members:       {}", status.roster);
    println!("  Located repositories: {}", status.located);
    println!("  Missing:              {}", format_ids(&status.missing));
    println!("  Not on roster:        {}", format_ids(&status.extra));

    Ok(())
}

fn format_ids(ids: &BTreeSet<MemberId>) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }

    let list: Vec<&str> = ids.iter().map(MemberId::as_str).collect();
    format!("{} ({})", ids.len(), list.join(", "))
}
