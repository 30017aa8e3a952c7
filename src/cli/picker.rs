use super::render::{format_size, kind_title};
use anyhow::{Context, Result};
use docker_sweep::domain::{Resource, ResourceType, compose_project};
use docker_sweep::services::SweepResult;
use std::io::{BufRead, Write};

const HELP: &str = "  <numbers> toggle (e.g. 1 3 5-7)  a all  n none  s suggested  enter confirm  q quit";

struct PickerItem<'a> {
    resource: &'a dyn Resource,
    selected: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Confirm,
    Quit,
}

/// Line-based selection over every deletable resource of a sweep.
///
/// Suggested resources start selected; protected resources are not listed.
pub struct Picker<'a> {
    items: Vec<PickerItem<'a>>,
}

impl<'a> Picker<'a> {
    pub fn new(result: &'a SweepResult) -> Self {
        let items = result
            .all()
            .into_iter()
            .map(|resource| PickerItem {
                resource,
                selected: resource.is_suggested(),
            })
            .collect();
        Self { items }
    }

    /// Runs the prompt loop. `None` means the user quit without confirming.
    pub fn run<R: BufRead, W: Write>(
        mut self,
        mut input: R,
        out: &mut W,
    ) -> Result<Option<Vec<&'a dyn Resource>>> {
        loop {
            self.render(out)?;
            write!(out, "  > ")?;
            out.flush()?;

            let mut line = String::new();
            let read = input.read_line(&mut line).context("reading selection")?;
            if read == 0 {
                return Ok(None);
            }

            match self.apply(&line) {
                Ok(Step::Continue) => {}
                Ok(Step::Confirm) => return Ok(Some(self.selected())),
                Ok(Step::Quit) => return Ok(None),
                Err(message) => writeln!(out, "  {message}")?,
            }
        }
    }

    fn apply(&mut self, line: &str) -> Result<Step, String> {
        match line.trim() {
            "" | "y" | "yes" => return Ok(Step::Confirm),
            "q" | "quit" => return Ok(Step::Quit),
            "a" | "all" => self.items.iter_mut().for_each(|i| i.selected = true),
            "n" | "none" => self.items.iter_mut().for_each(|i| i.selected = false),
            "s" => self
                .items
                .iter_mut()
                .for_each(|i| i.selected = i.resource.is_suggested()),
            other => {
                for index in parse_indexes(other, self.items.len())? {
                    let item = &mut self.items[index];
                    item.selected = !item.selected;
                }
            }
        }
        Ok(Step::Continue)
    }

    fn selected(&self) -> Vec<&'a dyn Resource> {
        self.items
            .iter()
            .filter(|i| i.selected)
            .map(|i| i.resource)
            .collect()
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut current: Option<ResourceType> = None;

        for (n, item) in self.items.iter().enumerate() {
            let kind = item.resource.resource_type();
            if current != Some(kind) {
                let count = self
                    .items
                    .iter()
                    .filter(|i| i.resource.resource_type() == kind)
                    .count();
                writeln!(out, "\n  {} ({count})", kind_title(kind))?;
                current = Some(kind);
            }

            let mark = if item.selected { "x" } else { " " };
            let size = match item.resource.size() {
                0 => String::new(),
                bytes => format_size(bytes),
            };
            let project = compose_project(item.resource)
                .map(|p| format!("  [{p}]"))
                .unwrap_or_default();
            writeln!(
                out,
                "  [{mark}] {:>3}  {:<30}  {:>9}  {}{project}",
                n + 1,
                item.resource.display_name(),
                size,
                item.resource.details(),
            )?;
        }

        let selected = self.selected();
        let total: u64 = selected.iter().map(|r| r.size()).sum();
        writeln!(
            out,
            "\n  {} selected, {}\n{HELP}",
            selected.len(),
            format_size(total)
        )?;
        Ok(())
    }
}

/// Parses 1-based numbers and ranges into 0-based indexes.
fn parse_indexes(input: &str, len: usize) -> Result<Vec<usize>, String> {
    let mut indexes = Vec::new();
    let invalid = |token: &str| format!("invalid selection: {token}");

    for token in input.split([' ', ',']).filter(|t| !t.is_empty()) {
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (a.parse::<usize>(), b.parse::<usize>()),
            None => (token.parse::<usize>(), token.parse::<usize>()),
        };
        let (Ok(start), Ok(end)) = (start, end) else {
            return Err(invalid(token));
        };
        if start == 0 || end < start || end > len {
            return Err(invalid(token));
        }
        indexes.extend((start - 1)..end);
    }

    Ok(indexes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docker_sweep::domain::{Category, ContainerResource, ImageResource, Labels};
    use docker_sweep::test_support::{container, image};

    fn sample() -> SweepResult {
        SweepResult {
            containers: vec![
                ContainerResource::new(
                    container("c1", "web", "running"),
                    Category::Protected,
                    Labels::new(),
                    None,
                    Some("running".into()),
                ),
                ContainerResource::new(
                    container("c2", "job", "exited"),
                    Category::Suggested,
                    Labels::new(),
                    None,
                    None,
                ),
            ],
            images: vec![ImageResource::new(
                image("i1", "app", "1.0", 2048),
                Category::Unused,
                false,
                2048,
                Labels::new(),
                None,
                None,
            )],
            ..Default::default()
        }
    }

    fn pick(result: &SweepResult, input: &str) -> (Option<Vec<String>>, String) {
        let mut out = Vec::new();
        let picked = Picker::new(result)
            .run(input.as_bytes(), &mut out)
            .unwrap()
            .map(|rs| rs.iter().map(|r| r.id().to_string()).collect());
        (picked, String::from_utf8(out).unwrap())
    }

    #[test]
    fn confirms_suggested_by_default() {
        let result = sample();
        let (picked, out) = pick(&result, "\n");

        assert_eq!(picked, Some(vec!["c2".to_string()]));
        assert!(!out.contains("web"));
        assert!(out.contains("2.0 KB"));
    }

    #[test]
    fn toggles_by_number() {
        let result = sample();
        let (picked, _) = pick(&result, "1 2\n\n");
        assert_eq!(picked, Some(vec!["i1".to_string()]));
    }

    #[test]
    fn select_all_and_none() {
        let result = sample();
        assert_eq!(pick(&result, "a\n\n").0.map(|p| p.len()), Some(2));
        assert_eq!(pick(&result, "n\n\n").0, Some(vec![]));
        assert_eq!(
            pick(&result, "a\ns\n\n").0,
            Some(vec!["c2".to_string()])
        );
    }

    #[test]
    fn quit_and_eof_cancel() {
        let result = sample();
        assert_eq!(pick(&result, "q\n").0, None);
        assert_eq!(pick(&result, "").0, None);
    }

    #[test]
    fn rejects_bad_numbers_and_keeps_going() {
        let result = sample();
        let (picked, out) = pick(&result, "9\n\n");
        assert!(out.contains("invalid selection: 9"));
        assert_eq!(picked, Some(vec!["c2".to_string()]));
    }

    #[test]
    fn parses_ranges() {
        assert_eq!(parse_indexes("1-3, 5", 5).unwrap(), vec![0, 1, 2, 4]);
        assert!(parse_indexes("0", 5).is_err());
        assert!(parse_indexes("3-1", 5).is_err());
        assert!(parse_indexes("x", 5).is_err());
    }
}
