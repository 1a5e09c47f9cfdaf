use std::path::Path;

use pdbx_core::{DataCategory, DataContainer};

use crate::cli::{GlobalOpts, InspectArgs};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `inspect` command: summarize data blocks, or dump one category.
pub fn run(args: InspectArgs, _global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let containers = super::read_and_parse(&args.file)?;

    match &args.category {
        Some(name) => {
            let found: Vec<(&DataContainer, &DataCategory)> = containers
                .iter()
                .filter_map(|c| c.category(name).map(|category| (c, category)))
                .collect();
            if found.is_empty() {
                return Err(CliError::CategoryNotFound {
                    name: name.clone(),
                    file: args.file.clone(),
                });
            }
            render_category(&found, output);
        }
        None => render_summary(&args.file, &containers, output),
    }

    Ok(())
}

fn render_summary(file: &Path, containers: &[DataContainer], output: &OutputContext) {
    match output.mode {
        OutputMode::Human => {
            if containers.is_empty() {
                output.status("No data blocks.");
                return;
            }
            for container in containers {
                println!("{}", block_header(container));
                println!("  {:<32} {:>10} {:>8}", "Category", "Attributes", "Rows");
                println!("  {:<32} {:>10} {:>8}", "--------", "----------", "----");
                for category in container {
                    println!(
                        "  {:<32} {:>10} {:>8}",
                        category.name(),
                        category.attribute_count(),
                        category.row_count()
                    );
                }
            }
        }
        OutputMode::Json => {
            let json_containers: Vec<serde_json::Value> =
                containers.iter().map(container_to_json).collect();
            output.print_json(&serde_json::json!({
                "file": file.display().to_string(),
                "containers": json_containers,
            }));
        }
        OutputMode::Plain => {
            for container in containers {
                for category in container {
                    println!(
                        "{}\t{}\t{}\t{}",
                        container.name(),
                        category.name(),
                        category.attribute_count(),
                        category.row_count()
                    );
                }
            }
        }
    }
}

fn container_to_json(container: &DataContainer) -> serde_json::Value {
    let categories: Vec<serde_json::Value> = container
        .categories()
        .map(|category| {
            serde_json::json!({
                "name": category.name(),
                "attributes": category.attributes(),
                "rows": category.row_count(),
            })
        })
        .collect();
    serde_json::json!({
        "name": container.name(),
        "global": container.is_global(),
        "categories": categories,
    })
}

fn block_header(container: &DataContainer) -> String {
    if container.is_global() {
        "global_".to_string()
    } else {
        format!("data_{}", container.name())
    }
}

fn render_category(found: &[(&DataContainer, &DataCategory)], output: &OutputContext) {
    match output.mode {
        OutputMode::Human => {
            for (container, category) in found {
                println!("{} / {}", block_header(container), category.name());
                print_table(category);
            }
        }
        OutputMode::Json => {
            let blocks: Vec<serde_json::Value> = found
                .iter()
                .map(|(container, category)| {
                    let rows: Vec<&[String]> = category.rows().map(|row| row.values()).collect();
                    serde_json::json!({
                        "container": container.name(),
                        "category": category.name(),
                        "attributes": category.attributes(),
                        "rows": rows,
                    })
                })
                .collect();
            output.print_json(&serde_json::json!({ "categories": blocks }));
        }
        OutputMode::Plain => {
            for (_, category) in found {
                println!("{}", category.attributes().join("\t"));
                for row in category.rows() {
                    println!("{}", row.values().join("\t"));
                }
            }
        }
    }
}

/// Column-aligned table; multi-line values show their first line only.
fn print_table(category: &DataCategory) {
    let first_line = |value: &str| value.lines().next().unwrap_or("").to_string();
    let rows: Vec<Vec<String>> = category
        .rows()
        .map(|row| row.values().iter().map(|v| first_line(v)).collect())
        .collect();

    let mut widths: Vec<usize> = category
        .attributes()
        .iter()
        .map(|a| a.chars().count())
        .collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("  {}", padded.join("  ").trim_end());
    };
    line(category.attributes());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&rule);
    for row in &rows {
        line(row);
    }
}
