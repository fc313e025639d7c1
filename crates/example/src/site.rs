//! The `site` plugin: renders text pages into HTML.

use std::fs;
use std::path::Path;

use keel::prelude::*;

/// Name the site plugin is registered under.
pub const SITE_PLUGIN: &str = "site";

/// Renders every `.md` and `.txt` file in `$dir_pages` into `$dir_site`.
///
/// | Property      | Default             |
/// |---------------|---------------------|
/// | `dir_pages`   | `pages`             |
/// | `dir_site`    | `$dir_target/site`  |
/// | `site_banner` | `preview`, or `release` in the `release` environment |
#[derive(Debug, Default, Clone, Copy)]
pub struct SitePlugin;

impl RegistrationSource for SitePlugin {
    fn name(&self) -> &str {
        SITE_PLUGIN
    }

    fn register(&self, registry: &mut Registry) -> Result<(), BuildError> {
        registry.use_plugin(CORE_PLUGIN);

        registry
            .initializer(Initializer::new(
                Executable::new("init_site_properties", |inputs| {
                    let mut project = inputs.get_mut::<Project>()?;
                    project.set_property_if_unset("dir_pages", "pages");
                    project.set_property_if_unset("dir_site", "$dir_target/site");
                    project.set_property_if_unset("site_banner", "preview");
                    Ok(())
                })?
                .needs::<Project>(),
            ))
            .initializer(
                Initializer::new(
                    Executable::new("init_release_banner", |inputs| {
                        inputs.get_mut::<Project>()?.set_property("site_banner", "release");
                        Ok(())
                    })?
                    .needs::<Project>(),
                )
                .in_environment("release"),
            );

        registry
            .task(
                Task::new(
                    Executable::new("render_pages", render_pages)?
                        .needs::<Project>()
                        .describe("Renders pages into HTML"),
                )
                .depends_on("compile_sources"),
            )
            .task(
                Task::named(
                    "package",
                    Executable::new("index_site", index_site)?.needs::<Project>(),
                )?
                .depends_on("render_pages"),
            )
            .action(
                Action::new(Executable::new("report_site", report_site)?.needs::<Project>())
                    .after("package")
                    .only_once(),
            );

        Ok(())
    }
}

fn render_pages(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let project = inputs.get::<Project>()?;
    let pages = project.expand_path(&["$dir_pages"])?;
    let site = project.expand_path(&["$dir_site"])?;
    let banner = project.expand("$site_banner")?;

    if !pages.is_dir() {
        tracing::warn!(path = %pages.display(), "no pages directory, nothing to render");
        return Ok(());
    }

    fs::create_dir_all(&site)?;
    let mut rendered = 0usize;
    for entry in fs::read_dir(&pages)? {
        let path = entry?.path();
        if !is_page(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let html = render_html(&fs::read_to_string(&path)?, &banner);
        fs::write(site.join(format!("{stem}.html")), html)?;
        rendered += 1;
    }

    tracing::info!(pages = rendered, site = %site.display(), "rendered pages");
    Ok(())
}

fn index_site(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let project = inputs.get::<Project>()?;
    let site = project.expand_path(&["$dir_site"])?;
    if !site.is_dir() {
        return Ok(());
    }

    let mut pages = site_pages(&site)?;
    pages.retain(|page| page != "index.html");
    let links: String = pages
        .iter()
        .map(|page| format!("<li><a href=\"{page}\">{page}</a></li>\n"))
        .collect();
    let index = format!(
        "<html><head><title>{}</title></head><body>\n<h1>{} {}</h1>\n<ul>\n{links}</ul>\n</body></html>\n",
        escape(&project.name),
        escape(&project.name),
        escape(&project.version),
    );
    fs::write(site.join("index.html"), index)?;
    Ok(())
}

fn report_site(inputs: &Inputs<'_>) -> Result<(), BoxError> {
    let project = inputs.get::<Project>()?;
    let site = project.expand_path(&["$dir_site"])?;
    let reports = project.expand_path(&["$dir_reports"])?;

    let pages = if site.is_dir() { site_pages(&site)? } else { Vec::new() };
    fs::create_dir_all(&reports)?;
    fs::write(reports.join("site.txt"), format!("{}\n", pages.join("\n")))?;
    tracing::info!(pages = pages.len(), "wrote site report");
    Ok(())
}

fn is_page(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "md" || ext == "txt")
}

/// Lists the HTML files in `site`, sorted.
fn site_pages(site: &Path) -> Result<Vec<String>, BoxError> {
    let mut pages = Vec::new();
    for entry in fs::read_dir(site)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with(".html") {
            pages.push(name);
        }
    }
    pages.sort();
    Ok(pages)
}

/// Renders a page: `# ` lines become headings, other non-empty lines
/// paragraphs.
fn render_html(source: &str, banner: &str) -> String {
    let mut html = format!("<html><body>\n<p class=\"banner\">{}</p>\n", escape(banner));
    for line in source.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match line.strip_prefix("# ") {
            Some(heading) => html.push_str(&format!("<h1>{}</h1>\n", escape(heading))),
            None => html.push_str(&format!("<p>{}</p>\n", escape(line))),
        }
    }
    html.push_str("</body></html>\n");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_paragraphs() {
        let html = render_html("# Title\n\nSome <text>\n", "preview");
        assert!(html.contains("<p class=\"banner\">preview</p>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some &lt;text&gt;</p>"));
    }

    #[test]
    fn only_text_files_are_pages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("b.png"), "").unwrap();
        assert!(is_page(&dir.path().join("a.md")));
        assert!(!is_page(&dir.path().join("b.png")));
        assert!(!is_page(&dir.path().join("missing.md")));
    }
}
