use docker_sweep::domain::{Resource, ResourceType};
use docker_sweep::services::DeletionError;
use std::fmt::Write;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Human readable size with one decimal, e.g. `1.5 GB`.
pub fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

pub fn header() -> String {
    "\n  🧹 docker-sweep\n".to_string()
}

pub fn no_resources() -> String {
    "\n  ✅ No resources to delete.\n\n".to_string()
}

pub fn kind_title(kind: ResourceType) -> &'static str {
    match kind {
        ResourceType::Container => "📦 Containers",
        ResourceType::Image => "🖼  Images",
        ResourceType::Volume => "💾 Volumes",
        ResourceType::Network => "🌐 Networks",
    }
}

pub fn dry_run(resources: &[&dyn Resource]) -> String {
    let mut out = String::from("\n  ⚠️  Dry run - would delete:\n\n");
    for resource in resources {
        let _ = writeln!(
            out,
            "    ○ {} ({})",
            resource.display_name(),
            resource.resource_type()
        );
    }
    out.push('\n');
    out
}

pub fn deletion_error(error: &DeletionError) -> String {
    format!("  ❌ {error}")
}

pub fn summary(deleted: usize, total: usize) -> String {
    format!("\n  Deleted {deleted} of {total} resources\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * MB), "10.0 MB");
        assert_eq!(format_size(3 * GB + GB / 2), "3.5 GB");
    }

    #[test]
    fn summary_counts() {
        assert!(summary(2, 3).contains("Deleted 2 of 3 resources"));
    }
}
