use std::fs;
use std::path::Path;

use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::error::Result;

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em auto; max-width: 960px; color: #222; }
header { border-bottom: 2px solid #444; margin-bottom: 1.5em; }
section { margin-bottom: 2em; }
table { border-collapse: collapse; margin: 0.5em 0; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
.diagonal { background-color: #e6f4ea; font-weight: bold; }
.code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; white-space: pre-wrap; }
.note { color: #8a5300; }
";

/// A titled block of report content.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div { (block) }
                }
            }
        }
    }
}

/// Single-page HTML document made of sections.
pub struct Report {
    name: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(name: &str, version: &str, title: &str) -> Self {
        Report {
            name: name.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    header {
                        h1 { (self.title) }
                        p { (self.name) " v" (self.version) " \u{b7} generated " (generated) }
                    }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }
}
